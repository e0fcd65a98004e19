//! Bounded exponential backoff and the single reconnect timer.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{error, info};

use pairlink_runtime::TimerSlot;

/// Backoff parameters for automatic reconnects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
	pub min_delay: Duration,
	pub max_delay: Duration,
	/// Jitter upper bound as a fraction of the base delay, in `[0, 1]`.
	pub jitter_ratio: f64,
	pub max_attempts: u32,
}

impl BackoffPolicy {
	/// `min(min_delay * 2^(attempt-1), max_delay)`; attempts are 1-based.
	pub fn base_delay(&self, attempt: u32) -> Duration {
		let exponent = attempt.saturating_sub(1).min(31);
		self.min_delay.saturating_mul(1u32 << exponent).min(self.max_delay)
	}

	/// Base delay plus `sample * jitter_ratio` of it, `sample` clamped to `[0, 1]`.
	pub fn delay_with_jitter(&self, attempt: u32, sample: f64) -> Duration {
		let base = self.base_delay(attempt);
		let fraction = (self.jitter_ratio * sample.clamp(0.0, 1.0)).clamp(0.0, 1.0);
		base + base.mul_f64(fraction)
	}

	pub fn delay(&self, attempt: u32) -> Duration {
		self.delay_with_jitter(attempt, rand::thread_rng().gen_range(0.0..=1.0))
	}
}

/// Result of [`ReconnectScheduler::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduled {
	Armed { attempt: u32, delay: Duration, generation: u64 },
	/// The budget was spent; the counter was reset and nothing is armed.
	Exhausted { attempts: u32 },
}

/// Owns the reconnect counter and the one outstanding reconnect timer.
#[derive(Debug)]
pub struct ReconnectScheduler {
	policy: BackoffPolicy,
	attempts: u32,
	timer: TimerSlot,
}

impl ReconnectScheduler {
	pub fn new(policy: BackoffPolicy) -> Self {
		Self {
			policy,
			attempts: 0,
			timer: TimerSlot::new("reconnect"),
		}
	}

	pub fn policy(&self) -> &BackoffPolicy {
		&self.policy
	}

	pub fn attempts(&self) -> u32 {
		self.attempts
	}

	pub fn is_pending(&self) -> bool {
		self.timer.is_armed()
	}

	/// Counts an attempt and arms the timer, replacing any pending one.
	///
	/// `fixed` overrides the backoff delay. `task` builds the future that runs
	/// when the timer fires; it must [`claim`](Self::claim) its generation first.
	pub fn schedule<F, Fut>(&mut self, fixed: Option<Duration>, task: F) -> Scheduled
	where
		F: FnOnce(u64) -> Fut,
		Fut: Future<Output = ()> + Send + 'static,
	{
		if self.attempts >= self.policy.max_attempts {
			error!(
				target = "pairlink.reconnect",
				attempts = self.attempts,
				max_attempts = self.policy.max_attempts,
				"reconnect budget exhausted; staying disconnected until initialize() is called"
			);
			let attempts = self.attempts;
			self.reset();
			return Scheduled::Exhausted { attempts };
		}

		self.attempts += 1;
		let delay = fixed.unwrap_or_else(|| self.policy.delay(self.attempts));
		let generation = self.timer.arm(delay, task);
		info!(
			target = "pairlink.reconnect",
			attempt = self.attempts,
			max_attempts = self.policy.max_attempts,
			delay_ms = delay.as_millis() as u64,
			fixed = fixed.is_some(),
			"reconnect scheduled"
		);
		Scheduled::Armed {
			attempt: self.attempts,
			delay,
			generation,
		}
	}

	/// Claims a fired reconnect. `false` means it was superseded or cancelled.
	pub fn claim(&mut self, generation: u64) -> bool {
		self.timer.claim(generation)
	}

	/// Cancels a pending reconnect without touching the counter.
	pub fn cancel(&mut self) -> bool {
		self.timer.cancel()
	}

	/// Zeroes the counter and cancels a pending reconnect.
	pub fn reset(&mut self) {
		self.attempts = 0;
		self.timer.cancel();
	}
}
