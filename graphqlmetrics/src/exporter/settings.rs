use std::time::Duration;

use super::ExporterError;

/// How failed exports are retried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryOptions {
    /// Retry at all. When false, a failed batch is dropped after its first attempt.
    pub enabled: bool,
    /// Attempts after the first one
    pub max_retry: usize,
    /// First backoff delay; each following delay doubles
    pub interval: Duration,
    /// Upper bound for any single backoff delay
    pub max_duration: Duration,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retry: 5,
            interval: Duration::from_secs(5),
            max_duration: Duration::from_secs(10),
        }
    }
}

/// Fixed configuration of an [`Exporter`](super::Exporter).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExporterSettings {
    /// Most items in one batch. A full batch is sent right away.
    pub batch_size: usize,
    /// Most items waiting for a batch. Past this, new items are dropped.
    pub queue_size: usize,
    /// Longest a partial batch waits before it is sent
    pub interval: Duration,
    /// Deadline for each export attempt
    pub export_timeout: Duration,
    pub retry: RetryOptions,
}

impl Default for ExporterSettings {
    fn default() -> Self {
        Self {
            batch_size: 1024,
            queue_size: 1024 * 10,
            interval: Duration::from_secs(10),
            export_timeout: Duration::from_secs(10),
            retry: RetryOptions::default(),
        }
    }
}

impl ExporterSettings {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = queue_size;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_export_timeout(mut self, export_timeout: Duration) -> Self {
        self.export_timeout = export_timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryOptions) -> Self {
        self.retry = retry;
        self
    }

    /// Every size and duration must be greater than zero. Retry values are only
    /// checked when retry is enabled.
    pub fn validate(&self) -> Result<(), ExporterError> {
        let must_be_positive = [
            ("batch_size", self.batch_size == 0),
            ("queue_size", self.queue_size == 0),
            ("interval", self.interval.is_zero()),
            ("export_timeout", self.export_timeout.is_zero()),
        ];
        let retry_must_be_positive = [
            ("retry.max_retry", self.retry.max_retry == 0),
            ("retry.interval", self.retry.interval.is_zero()),
            ("retry.max_duration", self.retry.max_duration.is_zero()),
        ];
        let retry_checks: &[(&'static str, bool)] = if self.retry.enabled {
            &retry_must_be_positive
        } else {
            &[]
        };

        match must_be_positive
            .iter()
            .chain(retry_checks)
            .find(|(_, invalid)| *invalid)
        {
            Some((field, _)) => Err(ExporterError::InvalidSettings(field)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use crate::exporter::ExporterError;

    use super::{ExporterSettings, RetryOptions};

    #[test_log::test]
    fn defaults_are_valid() {
        let settings = ExporterSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(1024, settings.batch_size);
        assert_eq!(10240, settings.queue_size);
        assert!(settings.retry.enabled);
    }

    #[test_log::test]
    fn zero_values_are_rejected_by_name() {
        let cases = [
            (ExporterSettings::default().with_batch_size(0), "batch_size"),
            (ExporterSettings::default().with_queue_size(0), "queue_size"),
            (ExporterSettings::default().with_interval(Duration::ZERO), "interval"),
            (
                ExporterSettings::default().with_export_timeout(Duration::ZERO),
                "export_timeout",
            ),
            (
                ExporterSettings::default().with_retry(RetryOptions {
                    max_retry: 0,
                    ..Default::default()
                }),
                "retry.max_retry",
            ),
            (
                ExporterSettings::default().with_retry(RetryOptions {
                    max_duration: Duration::ZERO,
                    ..Default::default()
                }),
                "retry.max_duration",
            ),
        ];
        for (settings, expected) in cases {
            match settings.validate() {
                Err(ExporterError::InvalidSettings(field)) => assert_eq!(expected, field),
                other => panic!("expected {expected} to be rejected, got {other:?}"),
            }
        }
    }

    #[test_log::test]
    fn disabled_retry_is_not_validated() {
        let settings = ExporterSettings::default().with_retry(RetryOptions {
            enabled: false,
            max_retry: 0,
            interval: Duration::ZERO,
            max_duration: Duration::ZERO,
        });
        assert!(settings.validate().is_ok());
    }
}
