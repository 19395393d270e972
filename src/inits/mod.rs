pub(crate) mod precomputed;
pub(crate) mod randomsample;

use rand::RngCore;

/// Source of randomness for the k-means engine: picks distinct sample indices.
///
/// Implemented by [`RandomIndexSampler`] for any random number generator. Provide a custom
/// implementation to make the initialization deterministic (e.g. in tests).
pub trait IndexSampler {
    /// Choose `k` distinct indices out of `0..n`, uniformly at random, without replacement.
    /// Only called with `k <= n`.
    fn choose_distinct(&mut self, n: usize, k: usize) -> Vec<usize>;
}

impl<S: IndexSampler + ?Sized> IndexSampler for &mut S {
    fn choose_distinct(&mut self, n: usize, k: usize) -> Vec<usize> {
        (**self).choose_distinct(n, k)
    }
}

/// [`IndexSampler`] backed by a [`rand`] random number generator.
#[derive(Clone, Debug)]
pub struct RandomIndexSampler<R: RngCore> {
    rnd: R
}
impl<R: RngCore> RandomIndexSampler<R> {
    pub fn new(rnd: R) -> Self { Self { rnd } }
}
impl<R: RngCore> IndexSampler for RandomIndexSampler<R> {
    fn choose_distinct(&mut self, n: usize, k: usize) -> Vec<usize> {
        rand::seq::index::sample(&mut self.rnd, n, k).into_vec()
    }
}
