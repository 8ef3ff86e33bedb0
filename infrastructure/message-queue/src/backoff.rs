use std::time::Duration;

use rand::Rng;
use typed_builder::TypedBuilder;

/// Delay policy between retries of a fetch loop.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct RetryPolicy {
    #[builder(default = Duration::from_secs(1))]
    pub base: Duration,
    #[builder(default = Duration::from_secs(30))]
    pub max: Duration,
    /// Randomize each delay within its upper half.
    #[builder(default = true)]
    pub jitter: bool,
}

impl RetryPolicy {
    /// Same delay every time.
    pub fn flat(delay: Duration) -> Self {
        Self {
            base: delay,
            max: delay,
            jitter: false,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Exponential backoff state of one fetch loop.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: RetryPolicy,
    attempt: u32,
}

impl Backoff {
    const MAX_EXPONENT: u32 = 16;

    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    pub fn next_delay(&mut self) -> Duration {
        let RetryPolicy { base, max, jitter } = self.policy;
        if base >= max {
            return max;
        }
        let delay = base.saturating_mul(1 << self.attempt.min(Self::MAX_EXPONENT)).min(max);
        self.attempt = self.attempt.saturating_add(1);
        if jitter {
            rand::thread_rng().gen_range(delay / 2..=delay)
        } else {
            delay
        }
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}
