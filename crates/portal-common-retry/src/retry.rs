// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Retry loop and backoff policy.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

/// How the delay grows between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
	/// `base_delay * attempt`.
	Linear,
	/// `base_delay * factor^(attempt - 1)`.
	Exponential { factor: f64 },
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
	/// Total number of attempts, including the first. Zero is treated as one.
	pub max_attempts: u32,
	pub base_delay: Duration,
	/// Upper bound on a single inter-attempt delay.
	pub max_delay: Option<Duration>,
	pub backoff: Backoff,
	pub jitter: bool,
	/// Wall-clock ceiling for the whole loop, measured from the first attempt.
	pub max_elapsed: Option<Duration>,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			base_delay: Duration::from_millis(1000),
			max_delay: None,
			backoff: Backoff::Linear,
			jitter: false,
			max_elapsed: None,
		}
	}
}

impl RetryConfig {
	/// Linear backoff without jitter or ceilings.
	pub fn linear(max_attempts: u32, base_delay: Duration) -> Self {
		Self {
			max_attempts,
			base_delay,
			..Self::default()
		}
	}

	pub fn with_max_elapsed(mut self, max_elapsed: Option<Duration>) -> Self {
		self.max_elapsed = max_elapsed;
		self
	}

	fn attempt_budget(&self) -> u32 {
		self.max_attempts.max(1)
	}
}

pub trait RetryableError {
	fn is_retryable(&self) -> bool;
}

/// Delay to wait after `attempt` (1-based) has failed.
pub fn delay_for_attempt(cfg: &RetryConfig, attempt: u32) -> Duration {
	let attempt = attempt.max(1);
	let raw = match cfg.backoff {
		Backoff::Linear => cfg.base_delay.saturating_mul(attempt),
		Backoff::Exponential { factor } => {
			let secs = cfg.base_delay.as_secs_f64() * factor.powi(attempt as i32 - 1);
			Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
		}
	};

	let capped = match cfg.max_delay {
		Some(max) => raw.min(max),
		None => raw,
	};

	if cfg.jitter {
		let scaled = capped.as_secs_f64() * (0.5 + fastrand::f64());
		Duration::try_from_secs_f64(scaled).unwrap_or(Duration::MAX)
	} else {
		capped
	}
}

/// Run `f` until it succeeds, returns a non-retryable error, or the budget is spent.
///
/// `f` receives the 1-based attempt number. The last error is returned on
/// exhaustion.
pub async fn retry<F, Fut, T, E>(cfg: &RetryConfig, mut f: F) -> Result<T, E>
where
	F: FnMut(u32) -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: RetryableError + std::fmt::Debug,
{
	let budget = cfg.attempt_budget();
	let started = Instant::now();
	let mut attempt = 0;

	loop {
		attempt += 1;
		debug!(attempt, max_attempts = budget, "starting attempt");

		let err = match f(attempt).await {
			Ok(value) => return Ok(value),
			Err(err) => err,
		};

		if !err.is_retryable() {
			warn!(error = ?err, attempt, "non-retryable error encountered");
			return Err(err);
		}

		if attempt >= budget {
			warn!(
				error = ?err,
				attempt,
				max_attempts = budget,
				"max retry attempts exhausted"
			);
			return Err(err);
		}

		let delay = delay_for_attempt(cfg, attempt);

		if let Some(limit) = cfg.max_elapsed {
			if started.elapsed().saturating_add(delay) > limit {
				warn!(
					error = ?err,
					attempt,
					elapsed_ms = started.elapsed().as_millis() as u64,
					limit_ms = limit.as_millis() as u64,
					"retry deadline reached"
				);
				return Err(err);
			}
		}

		warn!(
			error = ?err,
			attempt,
			max_attempts = budget,
			delay_ms = delay.as_millis() as u64,
			"retrying after error"
		);

		tokio::time::sleep(delay).await;
	}
}


#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn linear_backoff_strictly_increases(base_ms in 1u64..10_000, attempt in 1u32..50) {
			let cfg = RetryConfig::linear(attempt + 1, Duration::from_millis(base_ms));
			prop_assert!(delay_for_attempt(&cfg, attempt + 1) > delay_for_attempt(&cfg, attempt));
		}

		#[test]
		fn capped_delay_never_exceeds_max(base_ms in 1u64..10_000, cap_ms in 1u64..10_000, attempt in 1u32..50) {
			let cfg = RetryConfig {
				max_delay: Some(Duration::from_millis(cap_ms)),
				..RetryConfig::linear(attempt, Duration::from_millis(base_ms))
			};
			prop_assert!(delay_for_attempt(&cfg, attempt) <= Duration::from_millis(cap_ms));
		}
	}
}
