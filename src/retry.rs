use std::time::Duration;

/// Bounded polling used while waiting for a lazily configured collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 30,
            interval: Duration::from_millis(100),
        }
    }
}

/// Outcome of a single readiness check.
#[derive(Debug)]
pub enum Poll<T> {
    Ready(T),
    /// Not there yet; keep polling.
    Pending,
    /// Will never become ready; stop polling.
    Gone,
}

#[derive(Debug)]
pub enum Readiness<T> {
    Ready(T),
    Unavailable,
}

impl<T> Readiness<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            Readiness::Ready(v) => Some(v),
            Readiness::Unavailable => None,
        }
    }
}

/// Poll up to `policy.attempts` times, sleeping `policy.interval` between
/// attempts. No sleep follows the final attempt.
pub async fn wait_until_ready<T, F>(policy: RetryPolicy, mut check: F) -> Readiness<T>
where
    F: FnMut() -> Poll<T>,
{
    for attempt in 0..policy.attempts {
        match check() {
            Poll::Ready(v) => return Readiness::Ready(v),
            Poll::Gone => return Readiness::Unavailable,
            Poll::Pending if attempt + 1 < policy.attempts => {
                tokio::time::sleep(policy.interval).await;
            }
            Poll::Pending => {}
        }
    }
    Readiness::Unavailable
}
