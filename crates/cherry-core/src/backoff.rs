//! Polling with randomized exponential backoff.
//!
//! Resources that go through a transitional state (a server being deployed,
//! a backup storage being provisioned) are polled through their [`Refresh`]
//! capability until they reach the wanted state.
//!
//! The timeout is compared against the *next projected delay*, not against
//! total elapsed time: polling stops as soon as a single wait step would be
//! longer than `timeout`. With the delay ceiling at 20 seconds, any timeout of
//! 20 seconds or more therefore never expires on its own.

use crate::{Error, Result};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Upper bound for a single backoff delay.
pub const MAX_BACKOFF_DELAY: Duration = Duration::from_secs(20);

const MAX_BACKOFF_SECS: f64 = 20.0;

/// Status reported by a resource once it is ready.
pub const DEPLOYED_STATUS: &str = "deployed";

/// A resource whose state can be re-read from the API.
#[async_trait]
pub trait Refresh: Send {
    /// Resource type name used in diagnostics
    const KIND: &'static str;

    /// Perform one round-trip and replace the local state with the result.
    async fn refresh(&mut self) -> Result<()>;
}

/// A resource with a deployment status.
pub trait Deployable: Refresh {
    /// Current status, as of the last refresh.
    fn status(&self) -> Option<&str>;
}

/// Source of the random jitter added to each delay.
#[cfg_attr(test, mockall::automock)]
pub trait JitterSource: Send {
    /// Return a value in `[0, upper]`.
    fn sample(&mut self, upper: f64) -> f64;
}

/// Uniform jitter from an entropy-seeded [`StdRng`].
#[derive(Debug, Clone)]
pub struct RandomJitter {
    rng: StdRng,
}

impl RandomJitter {
    /// Create a jitter source seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a reproducible jitter source.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomJitter {
    fn default() -> Self {
        Self::new()
    }
}

impl JitterSource for RandomJitter {
    fn sample(&mut self, upper: f64) -> f64 {
        if upper <= 0.0 {
            return 0.0;
        }
        self.rng.gen_range(0.0..=upper)
    }
}

/// Backoff schedule and the polling loops built on it.
///
/// A `Backoff` holds no retry state; each wait call keeps its own retry
/// counter, starting from zero.
#[derive(Debug, Clone, Default)]
pub struct Backoff<J = RandomJitter> {
    jitter: J,
}

impl Backoff<RandomJitter> {
    /// Create a backoff using [`RandomJitter`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            jitter: RandomJitter::new(),
        }
    }
}

impl<J: JitterSource> Backoff<J> {
    /// Create a backoff drawing jitter from `jitter`.
    #[must_use]
    pub const fn with_jitter(jitter: J) -> Self {
        Self { jitter }
    }

    /// Delay before the poll following `retries` unsuccessful ones.
    ///
    /// `min(2^retries + uniform(0, 2^retries), 20s)`. Once `2^retries`
    /// alone reaches the ceiling the result is exactly 20 seconds.
    pub fn next_delay(&mut self, retries: u32) -> Duration {
        let base = i32::try_from(retries).map_or(f64::INFINITY, |n| 2f64.powi(n));
        if base >= MAX_BACKOFF_SECS {
            return MAX_BACKOFF_DELAY;
        }

        let jitter = self.jitter.sample(base).clamp(0.0, base);
        Duration::from_secs_f64((base + jitter).min(MAX_BACKOFF_SECS))
    }

    /// Poll `target` until its status is `deployed`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeploymentTimeout`] when the next delay would exceed
    /// `timeout`, or any error raised by [`Refresh::refresh`].
    pub async fn wait_until_deployed<T>(&mut self, target: &mut T, timeout: Duration) -> Result<()>
    where
        T: Deployable,
    {
        let mut retries: u32 = 0;

        while target.status() != Some(DEPLOYED_STATUS) {
            let delay = self.next_delay(retries);
            if delay > timeout {
                warn!(
                    kind = T::KIND,
                    retries,
                    ?delay,
                    ?timeout,
                    status = ?target.status(),
                    "Gave up waiting for deployment"
                );
                return Err(Error::DeploymentTimeout(format!(
                    "timeout waiting for {} to deploy",
                    T::KIND
                )));
            }

            debug!(kind = T::KIND, retries, ?delay, status = ?target.status(), "Waiting for deployment");
            tokio::time::sleep(delay).await;
            target.refresh().await?;
            retries = retries.saturating_add(1);
        }

        info!(kind = T::KIND, retries, "Resource deployed");
        Ok(())
    }

    /// Poll `target` until `predicate` holds.
    ///
    /// The predicate is evaluated before the first poll and after every
    /// refresh.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceTimeout`] when the next delay would exceed
    /// `timeout`, or any error raised by [`Refresh::refresh`].
    pub async fn wait_for_condition<T, F>(
        &mut self,
        target: &mut T,
        timeout: Duration,
        mut predicate: F,
    ) -> Result<()>
    where
        T: Refresh,
        F: FnMut(&T) -> bool,
    {
        let mut retries: u32 = 0;

        while !predicate(target) {
            let delay = self.next_delay(retries);
            if delay > timeout {
                warn!(kind = T::KIND, retries, ?delay, ?timeout, "Gave up waiting for condition");
                return Err(Error::ResourceTimeout(format!(
                    "timeout waiting for {} condition",
                    T::KIND
                )));
            }

            debug!(kind = T::KIND, retries, ?delay, "Waiting for condition");
            tokio::time::sleep(delay).await;
            target.refresh().await?;
            retries = retries.saturating_add(1);
        }

        info!(kind = T::KIND, retries, "Condition met");
        Ok(())
    }
}

/// Compute one backoff delay with fresh random jitter.
#[must_use]
pub fn next_backoff_delay(retries: u32) -> Duration {
    Backoff::new().next_delay(retries)
}

/// Poll `target` until it is deployed. See [`Backoff::wait_until_deployed`].
///
/// # Errors
///
/// Returns [`Error::DeploymentTimeout`] or a refresh error.
pub async fn wait_until_deployed<T>(target: &mut T, timeout: Duration) -> Result<()>
where
    T: Deployable,
{
    Backoff::new().wait_until_deployed(target, timeout).await
}

/// Poll `target` until `predicate` holds. See [`Backoff::wait_for_condition`].
///
/// # Errors
///
/// Returns [`Error::ResourceTimeout`] or a refresh error.
pub async fn wait_for_condition<T, F>(target: &mut T, timeout: Duration, predicate: F) -> Result<()>
where
    T: Refresh,
    F: FnMut(&T) -> bool,
{
    Backoff::new()
        .wait_for_condition(target, timeout, predicate)
        .await
}
