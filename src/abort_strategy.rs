use crate::Primitive;

/// Enum with possible abort strategies.
/// These strategies specify when a running iteration (with the k-means calculation) is aborted.
/// Independent of the strategy, a calculation always stops after `max_iter` iterations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AbortStrategy<T: Primitive> {
	/// This strategy aborts the calculation as soon as the SSE changed by less than **threshold**
	/// (`|sse - previous_sse| < threshold`).
	/// The first iteration has no predecessor, its change is the SSE itself (as if the previous SSE was 0),
	/// so only an SSE that already is (almost) 0 stops the calculation after the first iteration.
	/// A `NaN` SSE never counts as settled.
	/// ## Fields:
	/// - **threshold**: Threshold, used to detect a settled SSE
	SseDelta { threshold: T },
	/// This strategy never aborts early: every calculation runs exactly `max_iter` iterations.
	FixedIterations
}
impl<T: Primitive> Default for AbortStrategy<T> {
	fn default() -> Self {
		AbortStrategy::SseDelta { threshold: T::from(0.001).unwrap_or_else(T::epsilon) }
	}
}
impl<T: Primitive> AbortStrategy<T> {
	pub(crate) fn create_logic(&self) -> Box<dyn AbortStrategyLogic<T>> {
		match *self {
			AbortStrategy::SseDelta{threshold} => Box::new(SseDeltaLogic {
				threshold,
				prev_error: None
			}),
			AbortStrategy::FixedIterations => Box::new(FixedIterationsLogic)
		}
	}

	/// `NaN` thresholds would silently turn the strategy into [`AbortStrategy::FixedIterations`].
	pub(crate) fn is_valid(&self) -> bool {
		match *self {
			AbortStrategy::SseDelta{threshold} => !threshold.is_nan(),
			AbortStrategy::FixedIterations => true
		}
	}
}

pub(crate) trait AbortStrategyLogic<T: Primitive> {
	/// Function that has to be called once an iteration of the calculation ended, a new error was calculated.
	/// ## Arguments
	/// - **error**: The new **error** (SSE), after an iteration
	/// ## Returns
	/// - **true** if the calculation should continue
	/// - **false** if the calculation should abort
	fn next(&mut self, error: T) -> bool;
}


pub(crate) struct SseDeltaLogic<T: Primitive> {
	threshold: T,
	prev_error: Option<T>
}
impl<T: Primitive> AbortStrategyLogic<T> for SseDeltaLogic<T> {
	fn next(&mut self, error: T) -> bool {
		let delta = match self.prev_error {
			None => error,
			Some(prev_error) => (error - prev_error).abs()
		};
		self.prev_error = Some(error);
		!(delta < self.threshold)
	}
}


pub(crate) struct FixedIterationsLogic;
impl<T: Primitive> AbortStrategyLogic<T> for FixedIterationsLogic {
	fn next(&mut self, _error: T) -> bool { true }
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test] fn test_sse_delta_f32() { test_sse_delta::<f32>(); }
	#[test] fn test_sse_delta_f64() { test_sse_delta::<f64>(); }

	fn test_sse_delta<T: Primitive>() {
		let strategy = || AbortStrategy::SseDelta { threshold: T::from(0.001).unwrap() }.create_logic();
		{
			let mut abort_strategy = strategy();
			assert_eq!(abort_strategy.next( T::from(3000.0).unwrap() ), true);
			assert_eq!(abort_strategy.next( T::from(3000.0).unwrap() ), false);
		}
		{
			let mut abort_strategy = strategy();
			assert_eq!(abort_strategy.next( T::from(40.0).unwrap() ), true);
			assert_eq!(abort_strategy.next( T::from(39.9995).unwrap() ), false);
		}
		{
			let mut abort_strategy = strategy();
			assert_eq!(abort_strategy.next( T::from(40.0).unwrap() ), true);
			assert_eq!(abort_strategy.next( T::from(39.998).unwrap() ), true);
		}
		{ // Increasing SSE counts as a change as well
			let mut abort_strategy = strategy();
			assert_eq!(abort_strategy.next( T::from(10.0).unwrap() ), true);
			assert_eq!(abort_strategy.next( T::from(12.0).unwrap() ), true);
			assert_eq!(abort_strategy.next( T::from(12.0).unwrap() ), false);
		}
		{ // First iteration is compared against 0
			let mut abort_strategy = strategy();
			assert_eq!(abort_strategy.next( T::from(0.0005).unwrap() ), false);
		}
		{
			let mut abort_strategy = strategy();
			assert_eq!(abort_strategy.next( T::zero() ), false);
		}
	}

	#[test]
	fn test_sse_delta_nan_never_settles() {
		let mut abort_strategy = AbortStrategy::SseDelta { threshold: 0.001f64 }.create_logic();
		assert_eq!(abort_strategy.next(f64::NAN), true);
		assert_eq!(abort_strategy.next(f64::NAN), true);
		assert_eq!(abort_strategy.next(1.0), true);
	}

	#[test]
	fn test_fixed_iterations() {
		let mut abort_strategy = AbortStrategy::<f32>::FixedIterations.create_logic();
		for _ in 0..10 {
			assert_eq!(abort_strategy.next(1.0), true);
		}
	}

	#[test]
	fn test_validity() {
		assert!(AbortStrategy::<f64>::default().is_valid());
		assert!(AbortStrategy::SseDelta { threshold: -1.0f64 }.is_valid());
		assert!(!AbortStrategy::SseDelta { threshold: f32::NAN }.is_valid());
		assert_eq!(AbortStrategy::<f64>::default(), AbortStrategy::SseDelta { threshold: 0.001 });
	}
}
