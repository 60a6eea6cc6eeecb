//! Drives resumable work within a time budget. Work is expressed as a step
//! closure returning whether more remains, steps are taken until either the
//! work completes or the budget runs out. At least one step is always taken
//! so that a tiny budget still makes progress
//!

use std::time::{Duration, Instant};

/// What happened during a slice of work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceOutcome {
	/// Number of steps taken
	pub steps: usize,
	/// Whether the work reported completion
	pub finished: bool,
}

/// Call `step` until it returns `false` or `max_duration` has elapsed
pub fn run_bounded_slice<F: FnMut() -> bool>(max_duration: Duration, mut step: F) -> SliceOutcome {
	let start = Instant::now();
	let mut steps = 0;
	loop {
		let more = step();
		steps += 1;
		if !more {
			return SliceOutcome {
				steps,
				finished: true,
			};
		}
		if start.elapsed() >= max_duration {
			return SliceOutcome {
				steps,
				finished: false,
			};
		}
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn runs_to_completion() {
		let mut remaining = 10;
		let result = run_bounded_slice(Duration::from_secs(60), || {
			remaining -= 1;
			remaining > 0
		});
		let actual = SliceOutcome {
			steps: 10,
			finished: true,
		};
		assert_eq!(actual, result);
	}
	#[test]
	fn zero_budget_still_steps() {
		let mut calls = 0;
		let result = run_bounded_slice(Duration::ZERO, || {
			calls += 1;
			true
		});
		assert_eq!(1, calls);
		assert!(!result.finished);
	}
	#[test]
	fn stops_when_budget_spent() {
		let result = run_bounded_slice(Duration::from_millis(5), || {
			std::thread::sleep(Duration::from_millis(2));
			true
		});
		assert!(!result.finished);
		assert!(result.steps >= 1 && result.steps <= 4);
	}
}
