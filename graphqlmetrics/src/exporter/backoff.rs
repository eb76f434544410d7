use std::time::Duration;

use rand::Rng;

use super::RetryOptions;

/// Exponential delays between retries, each jittered by up to half in either direction.
#[derive(Debug)]
pub(crate) struct Backoff {
    current: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(options: &RetryOptions) -> Self {
        Self {
            current: options.interval,
            max: options.max_duration,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        let base = self.current.min(self.max);
        self.current = self.current.saturating_mul(2);
        let jitter = rand::thread_rng().gen_range(0.5..=1.5);
        Duration::try_from_secs_f64(base.as_secs_f64() * jitter)
            .unwrap_or(self.max)
            .min(self.max)
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use crate::exporter::RetryOptions;

    use super::Backoff;

    #[test_log::test]
    fn delays_grow_and_stay_capped() {
        let mut backoff = Backoff::new(&RetryOptions {
            enabled: true,
            max_retry: 10,
            interval: Duration::from_millis(100),
            max_duration: Duration::from_secs(1),
        });

        let first = backoff.next_delay();
        assert!(Duration::from_millis(50) <= first && first <= Duration::from_millis(150));
        let second = backoff.next_delay();
        assert!(Duration::from_millis(100) <= second && second <= Duration::from_millis(300));

        for _ in 0..20 {
            assert!(backoff.next_delay() <= Duration::from_secs(1));
        }
        assert!(Duration::from_millis(500) <= backoff.next_delay());
    }

    #[test_log::test]
    fn huge_settings_saturate_instead_of_overflowing() {
        let mut backoff = Backoff::new(&RetryOptions {
            enabled: true,
            max_retry: 10,
            interval: Duration::MAX,
            max_duration: Duration::MAX,
        });

        for _ in 0..100 {
            let delay = backoff.next_delay();
            assert!(Duration::from_secs(u64::MAX / 4) <= delay);
        }
    }
}
