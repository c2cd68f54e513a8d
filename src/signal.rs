// ABOUTME: Adapter from the process interrupt signal to a cancellation token.
// ABOUTME: The first Ctrl-C cancels the token; a second one exits the process immediately.

use tokio_util::sync::CancellationToken;

use crate::deploy::DeployOutcome;

/// Return a token that is cancelled on the first Ctrl-C.
///
/// Listening replaces the default SIGINT handler for the rest of the
/// process, so a second Ctrl-C exits with the interrupt status instead of
/// waiting for the cancelled work to wind down.
///
/// Must be called from within a tokio runtime.
pub fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let armed = token.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for interrupt signal: {}", e);
            return;
        }
        tracing::info!("interrupt signal received");
        armed.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("second interrupt signal received, exiting");
            std::process::exit(DeployOutcome::Interrupted.exit_code());
        }
    });

    token
}
