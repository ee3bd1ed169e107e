use std::future::Future;
use tfpilot_core::error::{Error, Result};
use tokio_util::sync::CancellationToken;

/// Await `fut`, or give up with `Error::Cancelled` as soon as `cancel` fires.
///
/// Cancellation wins ties, so an already-cancelled token never starts work.
pub(crate) async fn until_cancelled<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = T>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        value = fut => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn completes_when_not_cancelled() {
        let cancel = CancellationToken::new();
        assert_eq!(until_cancelled(&cancel, async { 7 }).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn pre_cancelled_token_wins() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = until_cancelled(&cancel, async { 7 }).await;
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_interrupts_pending_work() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let result = until_cancelled(&cancel, tokio::time::sleep(Duration::from_secs(3600))).await;
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}
