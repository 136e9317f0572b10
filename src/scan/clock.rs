use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Time source for the scan banners: pacing pauses and the login timestamp.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by tokio timers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
