//! Shared provider traits for dependency injection.
//!
//! Time and randomness are the only non-deterministic inputs of the
//! interpreter. Both sit behind traits so tests can replace them with
//! predictable implementations.

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

/// Trait for suspending the current task.
///
/// The tour runner awaits this between steps and between simulated
/// keystrokes. Tests inject an implementation that returns immediately.
///
/// # Example
///
/// ```
/// use repoterm::providers::{Delay, TokioDelay};
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// TokioDelay.sleep(Duration::from_millis(1)).await;
/// # }
/// ```
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Default delay backed by the tokio timer.
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Trait for picking a random position in a collection.
pub trait RandomSource: Send + Sync {
    /// Returns an index in `0..len`. `len` is never zero.
    fn index(&self, len: usize) -> usize;
}

/// Default random source using the thread-local RNG.
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_random_stays_in_range() {
        let random = ThreadRandom;
        for len in 1..50 {
            assert!(random.index(len) < len);
        }
    }

    #[test]
    fn test_thread_random_tolerates_zero_len() {
        assert_eq!(ThreadRandom.index(0), 0);
    }

    #[tokio::test]
    async fn test_tokio_delay_zero_returns_immediately() {
        let started = std::time::Instant::now();
        TokioDelay.sleep(Duration::ZERO).await;
        assert!(started.elapsed() < Duration::from_millis(50));
    }
}
