// ABOUTME: Deploy command implementation.
// ABOUTME: Builds the request from CLI flags, submits it, and optionally waits for readiness.

use crate::cli::DeployArgs;
use pipedeploy::client::HttpClient;
use pipedeploy::config::{ClientConfig, WaitOptions};
use pipedeploy::deploy::{
    DeployError, DeployOutcome, Deployment, DeploymentRequest, LogSink, Requested,
    WaitCoordinator,
};
use pipedeploy::diagnostics::{Diagnostics, Warning};
use pipedeploy::error::Result;
use pipedeploy::output::Output;
use pipedeploy::types::PipelineName;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const TRANSIENT_HINT: &str = "This looks like a temporary failure, retrying may succeed.";

/// Deploy a pipeline and report the outcome.
///
/// Configuration problems are returned as errors; anything that goes wrong
/// once the control plane is involved is reported and returned as an outcome.
pub async fn deploy(
    config: &ClientConfig,
    args: DeployArgs,
    mut output: Output,
    interrupt: CancellationToken,
) -> Result<DeployOutcome> {
    let mut diag = Diagnostics::default();

    let name = match args.name.as_deref().filter(|n| !n.is_empty()) {
        Some(name) => PipelineName::new(name)?,
        None => PipelineName::from_repository(&args.repository)?,
    };
    let namespace = config.namespace_or(args.namespace)?;
    let file = resolve_file(args.file, args.filename, &mut diag);

    let request = DeploymentRequest::new(name.clone(), args.repository, namespace)?
        .with_branch(args.branch)
        .with_file(file)
        .with_variables(args.variables);
    let options = WaitOptions::new(args.wait)
        .with_timeout(args.timeout)
        .with_skip_if_exists(args.skip_if_exists);

    let client = Arc::new(config.client(request.namespace())?);

    output.start_timer();
    let output = Arc::new(output);

    let outcome = run_deployment(Deployment::new(request), client, &output, options, &interrupt)
        .await
        .unwrap_or_else(DeployOutcome::from);

    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    report(&output, &name, &outcome);
    Ok(outcome)
}

async fn run_deployment(
    deployment: Deployment<Requested>,
    client: Arc<HttpClient>,
    output: &Arc<Output>,
    options: WaitOptions,
    interrupt: &CancellationToken,
) -> std::result::Result<DeployOutcome, DeployError> {
    let name = deployment.name().clone();

    if options.skip_if_exists && deployment.already_exists(client.as_ref(), interrupt).await? {
        return Ok(DeployOutcome::Skipped);
    }

    output.progress(&format!("Deploying repository '{name}'..."));
    let submitted = deployment.submit(&client, interrupt).await?;

    if !options.wait {
        return Ok(DeployOutcome::Scheduled);
    }

    output.progress(&format!("Waiting for repository '{name}' to be deployed..."));
    let sink: Arc<dyn LogSink> = output.clone();
    let coordinator = WaitCoordinator::new(client, sink);

    Ok(submitted
        .wait(&coordinator, options.timeout, interrupt)
        .await
        .into())
}

/// `--file` wins over the deprecated `--filename`.
fn resolve_file(
    file: Option<String>,
    filename: Option<String>,
    diag: &mut Diagnostics,
) -> Option<String> {
    if filename.is_some() {
        diag.warn(Warning::deprecated_flag("--filename", "--file"));
    }

    match (file, filename) {
        (Some(file), Some(_)) => {
            diag.warn(Warning::conflicting_flags("--file", "--filename"));
            Some(file)
        }
        (file, filename) => file.or(filename),
    }
}

fn report(output: &Output, name: &PipelineName, outcome: &DeployOutcome) {
    match outcome {
        DeployOutcome::Deployed => {
            output.success(&format!("Repository '{name}' successfully deployed"))
        }
        DeployOutcome::Scheduled => {
            output.success(&format!("Repository '{name}' scheduled for deployment"))
        }
        DeployOutcome::Skipped => output.success(&format!(
            "Skipping repository '{name}' because it's already deployed"
        )),
        DeployOutcome::Interrupted => output.error(&DeployError::Interrupted.to_string(), None),
        DeployOutcome::Failed(err) | DeployOutcome::TimedOut(err) => present_error(output, err),
    }
}

/// Classified registry failures are shown with their remediation hint;
/// other failures verbatim, with a retry hint when they look transient.
fn present_error(output: &Output, err: &DeployError) {
    if let Some(classified) = err.classification() {
        output.error(&classified.message, classified.hint.as_deref());
        return;
    }

    let hint = err.is_transient().then_some(TRANSIENT_HINT);
    output.error(&err.to_string(), hint);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipedeploy::diagnostics::WarningKind;

    #[test]
    fn file_flag_used_as_is() {
        let mut diag = Diagnostics::default();
        let file = resolve_file(Some("a.yml".to_string()), None, &mut diag);
        assert_eq!(file.as_deref(), Some("a.yml"));
        assert!(!diag.has_warnings());
    }

    #[test]
    fn deprecated_filename_still_works() {
        let mut diag = Diagnostics::default();
        let file = resolve_file(None, Some("b.yml".to_string()), &mut diag);
        assert_eq!(file.as_deref(), Some("b.yml"));
        assert_eq!(diag.warnings()[0].kind, WarningKind::DeprecatedFlag);
    }

    #[test]
    fn file_wins_over_filename() {
        let mut diag = Diagnostics::default();
        let file = resolve_file(
            Some("a.yml".to_string()),
            Some("b.yml".to_string()),
            &mut diag,
        );
        assert_eq!(file.as_deref(), Some("a.yml"));
        assert_eq!(diag.warnings().len(), 2);
        assert_eq!(diag.warnings()[1].kind, WarningKind::ConflictingFlags);
    }
}
