use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    max_delay: Duration,
    max_retries: u32,
    current_attempt: u32,
}

#[derive(Debug)]
pub struct MaxRetriesExceeded;

impl std::fmt::Display for MaxRetriesExceeded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Maximum retry attempts exceeded")
    }
}

impl std::error::Error for MaxRetriesExceeded {}

impl ExponentialBackoff {
    pub fn new(initial: Duration, max: Duration, retries: u32) -> Self {
        Self {
            initial_delay: initial,
            max_delay: max,
            max_retries: retries,
            current_attempt: 0,
        }
    }

    /// Delay for the current attempt, raised to `hint` when the server asked
    /// for a longer wait (Retry-After) and capped at the max delay
    pub fn next_delay(&self, hint: Option<Duration>) -> Duration {
        let factor = 2_u32.saturating_pow(self.current_attempt);
        let exp = self.initial_delay.saturating_mul(factor);
        std::cmp::min(exp.max(hint.unwrap_or_default()), self.max_delay)
    }

    pub async fn sleep(&mut self, hint: Option<Duration>) -> Result<(), MaxRetriesExceeded> {
        if self.current_attempt >= self.max_retries {
            return Err(MaxRetriesExceeded);
        }

        let delay = self.next_delay(hint);

        log::warn!(
            "⏳ Retry attempt {} of {} in {:.1}s",
            self.current_attempt + 1,
            self.max_retries,
            delay.as_secs_f64()
        );

        sleep(delay).await;
        self.current_attempt += 1;
        Ok(())
    }

    pub fn attempts(&self) -> u32 {
        self.current_attempt
    }

    pub fn reset(&mut self) {
        self.current_attempt = 0;
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(60), 5)
    }
}
