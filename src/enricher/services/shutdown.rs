//! Eager installation of shutdown listeners.

use std::future::Future;
use tracing::warn;

/// Spawns `signal` immediately and returns a future resolving when it does.
///
/// Listeners such as `tokio::signal::ctrl_c` only register on first poll.
/// Spawning them up front keeps a signal that arrives during the first
/// polling cycle from reaching the default handler.
pub fn listen_for_shutdown<F>(signal: F) -> impl Future<Output = ()> + Send + 'static
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::spawn(signal);
    async move {
        if let Err(err) = listener.await {
            warn!(error = %err, "shutdown listener ended abnormally, stopping");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::listen_for_shutdown;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test(flavor = "multi_thread")]
    async fn listener_is_polled_before_the_returned_future() -> eyre::Result<()> {
        let (armed_tx, armed_rx) = oneshot::channel();
        let shutdown = listen_for_shutdown(async move {
            drop(armed_tx.send(()));
            std::future::pending::<()>().await;
        });

        tokio::time::timeout(Duration::from_secs(5), armed_rx).await??;
        drop(shutdown);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn returned_future_resolves_with_the_signal() -> eyre::Result<()> {
        let (fire_tx, fire_rx) = oneshot::channel::<()>();
        let shutdown = listen_for_shutdown(async move {
            drop(fire_rx.await);
        });

        fire_tx
            .send(())
            .map_err(|()| eyre::eyre!("listener dropped the receiver"))?;
        tokio::time::timeout(Duration::from_secs(5), shutdown).await?;
        Ok(())
    }
}
