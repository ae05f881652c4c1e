// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bounded retry for async operations.
//!
//! Attempts are strictly sequential. Between attempts the loop sleeps for a
//! delay derived from the [`Backoff`] policy, and it stops when the attempt
//! budget (or the optional wall-clock ceiling) is spent.
//!
//! ```ignore
//! use portal_common_retry::{retry, RetryConfig};
//!
//! let cfg = RetryConfig::linear(3, Duration::from_secs(1));
//! let identity = retry(&cfg, |attempt| session.current_identity()).await?;
//! ```

pub mod retry;

pub use retry::{delay_for_attempt, retry, Backoff, RetryConfig, RetryableError};
