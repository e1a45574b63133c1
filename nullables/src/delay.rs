//! Counting delay — the poll loop runs instantly, sleeps are recorded.

use async_trait::async_trait;
use idgate_poller::Delay;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct CountingDelay {
    slept: Mutex<Vec<Duration>>,
}

impl CountingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// All sleeps requested so far, in order.
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.slept.lock().unwrap().len()
    }
}

#[async_trait]
impl Delay for CountingDelay {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}
