use std::time::Duration;

use tokio_retry::strategy::{ExponentialBackoff, FixedInterval};

use crate::ytdlp::ResolveStream;

/// Backoff is capped so a long-offline page still gets checked occasionally.
const MAX_BACKOFF: Duration = Duration::from_secs(900);

#[derive(thiserror::Error, Debug)]
pub enum PollError {
    #[error("no livestream appeared after {0} checks")]
    AttemptsExhausted(u32),
}

/// Retry policy for the livestream poll loop.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Give up after this many checks. `None` polls forever. At least one
    /// check is always made, so `Some(0)` behaves like `Some(1)`.
    pub max_attempts: Option<u32>,
    /// Double the wait after every missed check instead of a fixed interval.
    pub backoff: bool,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            max_attempts: None,
            backoff: false,
        }
    }
}

impl PollPolicy {
    /// Delays slept between checks. N attempts means N-1 delays.
    fn delays(&self) -> Box<dyn Iterator<Item = Duration> + Send> {
        let retries = match self.max_attempts {
            Some(n) => n.saturating_sub(1) as usize,
            None => usize::MAX,
        };
        if self.backoff {
            // base 2 with factor interval/2 yields interval, 2*interval, ...
            Box::new(
                ExponentialBackoff::from_millis(2)
                    .factor(self.interval.as_millis() as u64 / 2)
                    .max_delay(MAX_BACKOFF)
                    .take(retries),
            )
        } else {
            Box::new(FixedInterval::new(self.interval).take(retries))
        }
    }
}

/// Keeps checking the page until the resolver yields a stream URL.
///
/// Only returns early when a bounded policy runs out of attempts; with the
/// default unbounded policy this waits for as long as it takes.
pub async fn wait_for_stream<R>(resolver: &R, policy: &PollPolicy) -> Result<String, PollError>
where
    R: ResolveStream,
{
    let mut delays = policy.delays();
    let mut attempts = 0u32;

    loop {
        println!("Checking for livestream...");
        attempts += 1;
        if let Some(url) = resolver.resolve().await {
            return Ok(url);
        }
        match delays.next() {
            Some(delay) => {
                println!(
                    "No livestream yet. Checking again in {} seconds.",
                    delay.as_secs()
                );
                tokio::time::sleep(delay).await;
            }
            None => return Err(PollError::AttemptsExhausted(attempts)),
        }
    }
}
