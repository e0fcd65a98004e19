//! Cancelable one-shot deferred tasks.
//!
//! A [`TimerSlot`] owns at most one pending task. Arming a slot always
//! aborts the previous task first, and every armed task is tagged with a
//! generation number. A task that has fired must [`claim`](TimerSlot::claim)
//! its generation (under whatever lock guards the slot) before acting, so a
//! task that woke up just as it was superseded can tell it is stale.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

/// Holder for a single cancelable deferred task.
#[derive(Debug)]
pub struct TimerSlot {
	name: &'static str,
	generation: u64,
	handle: Option<JoinHandle<()>>,
}

impl TimerSlot {
	pub fn new(name: &'static str) -> Self {
		Self {
			name,
			generation: 0,
			handle: None,
		}
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Arms the slot, cancelling any pending task.
	///
	/// `task` receives the generation assigned to this arming and builds the
	/// future that runs once `delay` has elapsed. Must be called from within a
	/// tokio runtime.
	pub fn arm<F, Fut>(&mut self, delay: Duration, task: F) -> u64
	where
		F: FnOnce(u64) -> Fut,
		Fut: Future<Output = ()> + Send + 'static,
	{
		self.cancel();
		self.generation = self.generation.wrapping_add(1);
		let generation = self.generation;
		let fut = task(generation);
		self.handle = Some(tokio::spawn(async move {
			tokio::time::sleep(delay).await;
			fut.await;
		}));
		trace!(target = "pairlink.timer", timer = self.name, generation, delay_ms = delay.as_millis() as u64, "timer armed");
		generation
	}

	/// Aborts the pending task, if any. Returns `true` when one was pending.
	pub fn cancel(&mut self) -> bool {
		match self.handle.take() {
			Some(handle) => {
				handle.abort();
				trace!(target = "pairlink.timer", timer = self.name, generation = self.generation, "timer cancelled");
				true
			}
			None => false,
		}
	}

	/// Claims a fired task. Returns `false` if the slot was cancelled or re-armed
	/// after `generation` was handed out, in which case the caller must do nothing.
	pub fn claim(&mut self, generation: u64) -> bool {
		if self.handle.is_some() && self.generation == generation {
			// Dropping the handle detaches; the claiming task keeps running.
			self.handle = None;
			true
		} else {
			false
		}
	}

	/// Returns `true` while a task is pending and unclaimed.
	pub fn is_armed(&self) -> bool {
		self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
	}
}

impl Drop for TimerSlot {
	fn drop(&mut self) {
		self.cancel();
	}
}
