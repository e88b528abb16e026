use std::time::Duration;

use table_grid::OcrTable;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{service} request failed (transient): {message}")]
    Transient { service: String, message: String },

    #[error("{service} request failed: {message}")]
    Permanent { service: String, message: String },
}

impl ServiceError {
    pub fn transient(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transient {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn permanent(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Permanent {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

pub trait Storage {
    fn download(&self, url: &str) -> Result<Vec<u8>, ServiceError>;

    /// Stores `bytes` under `name` and returns the URL it can be read from.
    fn upload(&self, name: &str, bytes: &[u8]) -> Result<String, ServiceError>;
}

pub trait TableOcr {
    fn analyze_table_image(&self, image: &[u8]) -> Result<OcrTable, ServiceError>;
}

pub trait Summarizer {
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, ServiceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(10),
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Sleep before retry number `attempt` (1-based), doubling up to the cap.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Runs `operation` until it succeeds, fails permanently, or the attempts
    /// run out. Blocks the calling thread while backing off.
    pub fn run<T, F>(&self, operation: &str, mut call: F) -> Result<T, ServiceError>
    where
        F: FnMut() -> Result<T, ServiceError>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match call() {
                Ok(value) => return Ok(value),
                Err(error) if error.is_transient() && attempt < attempts => {
                    let delay = self.backoff(attempt);
                    warn!(
                        operation,
                        attempt,
                        max_attempts = attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        %error,
                        "collaborator call failed, retrying"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Retrying<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> Retrying<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: Storage> Storage for Retrying<T> {
    fn download(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
        self.policy.run("storage download", || self.inner.download(url))
    }

    fn upload(&self, name: &str, bytes: &[u8]) -> Result<String, ServiceError> {
        self.policy
            .run("storage upload", || self.inner.upload(name, bytes))
    }
}

impl<T: TableOcr> TableOcr for Retrying<T> {
    fn analyze_table_image(&self, image: &[u8]) -> Result<OcrTable, ServiceError> {
        self.policy
            .run("table ocr", || self.inner.analyze_table_image(image))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::{RetryPolicy, Retrying, ServiceError, Storage};

    struct FlakyStorage {
        failures_left: Cell<u32>,
        calls: Cell<u32>,
    }

    impl Storage for FlakyStorage {
        fn download(&self, _url: &str) -> Result<Vec<u8>, ServiceError> {
            self.calls.set(self.calls.get() + 1);
            if self.failures_left.get() > 0 {
                self.failures_left.set(self.failures_left.get() - 1);
                return Err(ServiceError::transient("storage", "connection reset"));
            }
            Ok(b"png".to_vec())
        }

        fn upload(&self, _name: &str, _bytes: &[u8]) -> Result<String, ServiceError> {
            self.calls.set(self.calls.get() + 1);
            Err(ServiceError::permanent("storage", "forbidden"))
        }
    }

    fn flaky(failures: u32) -> Retrying<FlakyStorage> {
        Retrying::new(
            FlakyStorage {
                failures_left: Cell::new(failures),
                calls: Cell::new(0),
            },
            RetryPolicy::immediate(3),
        )
    }

    #[test]
    fn retries_transient_failures_until_success() {
        let storage = flaky(2);
        assert_eq!(storage.download("u").expect("third attempt succeeds"), b"png");
        assert_eq!(storage.inner().calls.get(), 3);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let storage = flaky(5);
        let error = storage.download("u").expect_err("attempts exhausted");
        assert!(error.is_transient());
        assert_eq!(storage.inner().calls.get(), 3);
    }

    #[test]
    fn permanent_failures_are_not_retried() {
        let storage = flaky(0);
        assert!(storage.upload("a.csv", b"x").is_err());
        assert_eq!(storage.inner().calls.get(), 1);
    }

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(10));
        assert_eq!(policy.backoff(2), Duration::from_secs(20));
        assert_eq!(policy.backoff(3), Duration::from_secs(40));
        assert_eq!(policy.backoff(4), Duration::from_secs(60));
    }
}
