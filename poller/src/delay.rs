use async_trait::async_trait;
use std::time::Duration;

/// Sleep source for the poll loop. Production uses [`TokioDelay`]; tests
/// substitute a recorder so the loop runs instantly.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[async_trait]
impl<T: Delay + ?Sized> Delay for std::sync::Arc<T> {
    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await;
    }
}

/// The real thing.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
