// ABOUTME: Validated domain types shared across the crate.
// ABOUTME: Pipeline names, action handles, and image references.

mod id;
mod image_ref;
mod pipeline_name;

pub use id::{ActionId, ActionMarker, Id};
pub use image_ref::{DEFAULT_REGISTRY, ImageRef, ParseImageRefError};
pub use pipeline_name::{PipelineName, PipelineNameError};
