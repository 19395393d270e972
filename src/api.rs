use crate::{error::invalid_config, AbortStrategy, IndexSampler, KMeansError, Primitive, RandomIndexSampler, Result};
use crate::sweep::{SweepConfig, SweepReport};
use std::cell::RefCell;
use rand::prelude::*;

pub type InitDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>);
pub type IterationDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>, usize, T);

/// What happens to a centroid, whose cluster did not receive a single sample during an iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmptyClusterPolicy {
    /// The centroid becomes the mean of an empty set: every coordinate is `NaN`. Distances to it are `NaN`
    /// and never win an assignment, except for centroid 0, which then captures every sample for one iteration.
    /// A run that ends like this is reported by [`KMeansState::is_degenerate`], and its `NaN` values flow
    /// into everything computed from its centroids.
    Propagate,
    /// The centroid is moved onto one randomly chosen sample (drawn with the run's [`IndexSampler`]).
    Reinitialize
}
impl Default for EmptyClusterPolicy {
    fn default() -> Self { EmptyClusterPolicy::Propagate }
}

/// This is a structure holding various configuration options for a single k-means calculation, such as
/// the index sampler to use for initialization, or a couple of callbacks, that can be set to get status information from
/// a running k-means calculation.
///
/// For a more detailed information about all possible options, have a look at [`KMeansConfigBuilder`].
pub struct KMeansConfig<'a, T: Primitive> {
    /// Callback that is called, when the initialization phase finished
    /// ## Arguments
    /// - **state**: Current [`KMeansState`] after the initialization
    pub(crate) init_done: InitDoneCallbackFn<'a, T>,
    /// Callback that is called after each iteration
    /// ## Arguments
    /// - **state**: Current [`KMeansState`] after the iteration
    /// - **iteration_id**: Number of the current iteration
    /// - **distsum**: New SSE (**state** contains the SSE from the previous iteration)
    pub(crate) iteration_done: IterationDoneCallbackFn<'a, T>,
    /// Source of "k distinct sample indices"
    pub(crate) sampler: RefCell<Box<dyn IndexSampler + 'a>>,
    /// The abort-strategy to use for the running calculation
    pub(crate) abort_strategy: AbortStrategy<T>,
    /// How clusters without samples are treated
    pub(crate) empty_cluster_policy: EmptyClusterPolicy
}
impl<'a, T: Primitive> Default for KMeansConfig<'a, T> {
    fn default() -> Self {
        Self {
            init_done: &|_| {},
            iteration_done: &|_,_,_| {},
            sampler: RefCell::new(Box::new(RandomIndexSampler::new(StdRng::from_entropy()))),
            abort_strategy: AbortStrategy::default(),
            empty_cluster_policy: EmptyClusterPolicy::default()
        }
    }
}
impl<'a, T: Primitive> KMeansConfig<'a, T> {
    /// Use the [`KMeansConfigBuilder`] to build a [`KMeansConfig`] instance.
    pub fn build() -> KMeansConfigBuilder<'a, T> {
        KMeansConfigBuilder { config: KMeansConfig::default() }
    }

    /// Draw `k` distinct sample indices out of `0..n` from the configured sampler.
    ///
    /// The picks have to be exactly `k` indices, all below `n`, without duplicates.
    /// Anything else is a [`KMeansError::InvalidConfiguration`].
    pub(crate) fn choose_distinct(&self, n: usize, k: usize) -> Result<Vec<usize>> {
        let picks = self.sampler.borrow_mut().choose_distinct(n, k);
        if picks.len() != k {
            return invalid_config(format!("index sampler returned {} indices, {} were requested", picks.len(), k));
        }
        if let Some(&idx) = picks.iter().find(|&&idx| idx >= n) {
            return invalid_config(format!("index sampler returned index {}, which is not below {}", idx, n));
        }
        let mut sorted = picks.clone();
        sorted.sort_unstable();
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
            return invalid_config(format!("index sampler returned index {} more than once", pair[0]));
        }
        Ok(picks)
    }
}
impl<'a, T: Primitive> std::fmt::Debug for KMeansConfig<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KMeansConfig")
            .field("abort_strategy", &self.abort_strategy)
            .field("empty_cluster_policy", &self.empty_cluster_policy)
            .finish()
    }
}

pub struct KMeansConfigBuilder<'a, T: Primitive> {
    config: KMeansConfig<'a, T>
}
impl<'a, T: Primitive> KMeansConfigBuilder<'a, T> {
    /// Set the callback that should be called after the centroid initialization, before the iteration starts.
    pub fn init_done(mut self, init_done: InitDoneCallbackFn<'a, T>) -> Self {
        self.config.init_done = init_done; self
    }
    /// Set the callback that should be called after each iteration during a running k-means calculation.
    pub fn iteration_done(mut self, iteration_done: IterationDoneCallbackFn<'a, T>) -> Self {
        self.config.iteration_done = iteration_done; self
    }
    /// Set the random number generator that should be used in the k-means calculation.
    /// Use a seeded generator for deterministically repeatable results.
    pub fn random_generator<R: RngCore + 'a>(self, rnd: R) -> Self {
        self.index_sampler(RandomIndexSampler::new(rnd))
    }
    /// Replace the index sampler (the source of randomness) altogether. Useful to pin the
    /// initialization to known samples.
    pub fn index_sampler<S: IndexSampler + 'a>(mut self, sampler: S) -> Self {
        self.config.sampler = RefCell::new(Box::new(sampler)); self
    }
    /// Set the abort-strategy to use during a running k-means calculation. For more information,
    /// see documentation of [`AbortStrategy`].
    /// ## Default
    /// [`AbortStrategy::SseDelta`] `{ threshold: 0.001 }`
    pub fn abort_strategy(mut self, abort_strategy: AbortStrategy<T>) -> Self {
        self.config.abort_strategy = abort_strategy; self
    }
    /// Set the treatment of clusters that end up without samples.
    /// ## Default
    /// [`EmptyClusterPolicy::Propagate`]
    pub fn empty_cluster_policy(mut self, policy: EmptyClusterPolicy) -> Self {
        self.config.empty_cluster_policy = policy; self
    }
    /// Return the internally built configuration structure.
    pub fn build(self) -> KMeansConfig<'a, T> { self.config }
}


/// This is the internally used data-structure, storing the current state during calculation, as
/// well as the final result, as returned by the API.
/// All mutations are done in this structure, making [`KMeans`] immutable, and therefore allowing
/// it to be used in parallel, without having to duplicate the input-data.
///
/// ## Generics
/// - **T**: Underlying primitive type that was used for the calculation
///
/// ## Fields
/// - **k**: The amount of clusters that were requested when calculating this k-means result
/// - **distsum**: The SSE: total sum of squared distances from all samples to their respective centroids
/// - **centroids**: Calculated cluster centers [row-major] = [<centroid0>,<centroid1>,<centroid2>,...]
/// - **centroid_frequency**: Amount of samples in each centroid
/// - **assignments**: Vector mapping each sample to its respective nearest cluster
/// - **iterations**: Amount of assign/update/evaluate iterations that were run
/// - **sample_dims**: Dimensionality of samples and centroids
#[derive(Clone, Debug)]
pub struct KMeansState<T: Primitive> {
    pub k: usize,
    pub distsum: T,
    pub centroids: Vec<T>,
    pub centroid_frequency: Vec<usize>,
    pub assignments: Vec<usize>,
    pub iterations: usize,
    pub sample_dims: usize
}
impl<T: Primitive> KMeansState<T> {
    pub(crate) fn new(sample_cnt: usize, sample_dims: usize, k: usize) -> Self {
        Self {
            k,
            distsum: T::nan(),
            centroids: vec![T::zero();sample_dims * k],
            centroid_frequency: vec![0usize;k],
            assignments: vec![0usize;sample_cnt],
            iterations: 0,
            sample_dims
        }
    }
    pub(crate) fn set_centroid_from_iter(&mut self, idx: usize, src: impl Iterator<Item = T>) {
        self.centroids.iter_mut().skip(self.sample_dims * idx).take(self.sample_dims)
                .zip(src)
                .for_each(|(c,s)| *c = s);
    }

    /// Centroid of the cluster with the given index.
    pub fn centroid(&self, idx: usize) -> &[T] {
        &self.centroids[idx * self.sample_dims..(idx + 1) * self.sample_dims]
    }

    /// Whether the calculation ended with a degenerate cluster: a cluster that received no samples
    /// and therefore holds a `NaN` centroid (see [`EmptyClusterPolicy::Propagate`]).
    pub fn is_degenerate(&self) -> bool {
        self.centroids.iter().any(|c| c.is_nan())
    }
}




/// Entrypoint of this crate's API-Surface.
///
/// Create an instance of this struct, giving the samples you want to operate on. The primitive type
/// of the passed samples array will be the type used internaly for all calculations, as well as the result
/// as stored in the returned [`KMeansState`] structure.
///
/// ## Operations
/// - Single building blocks: [`KMeans::assign`], [`KMeans::update_centroids`], [`KMeans::sse`]
/// - One complete k-Means run (Lloyd) [`KMeans::kmeans_lloyd`]
/// - Random-restart sweep over multiple k [`KMeans::sweep`]
///
/// ## Supported initialization methods
/// - Random-Sample [`KMeans::init_random_sample`]
/// - Precomputed [`KMeans::init_precomputed`]
#[derive(Clone, Debug)]
pub struct KMeans<T: Primitive> {
    pub(crate) sample_cnt: usize,
    pub(crate) sample_dims: usize,
    pub(crate) samples: Vec<T>
}
impl<T: Primitive> KMeans<T> {
    /// Create a new instance of the [`KMeans`] structure.
    ///
    /// ## Arguments
    /// - **samples**: Vector of samples [row-major] = [<sample0>,<sample1>,<sample2>,...]
    /// - **sample_cnt**: Amount of samples, contained in the passed **samples** vector
    /// - **sample_dims**: Amount of dimensions each sample from the **sample** vector has
    ///
    /// ## Errors
    /// - [`KMeansError::InvalidConfiguration`] for an empty dataset (no samples or no dimensions)
    /// - [`KMeansError::DimensionMismatch`] if `samples.len() != sample_cnt * sample_dims`
    pub fn new(samples: Vec<T>, sample_cnt: usize, sample_dims: usize) -> Result<Self> {
        if sample_cnt == 0 || sample_dims == 0 {
            return invalid_config(format!("dataset must not be empty ({} samples with {} dimensions)", sample_cnt, sample_dims));
        }
        if samples.len() != sample_cnt * sample_dims {
            return Err(KMeansError::DimensionMismatch { expected: sample_cnt * sample_dims, found: samples.len() });
        }
        Ok(Self { sample_cnt, sample_dims, samples })
    }

    /// Create a new instance from one vector per sample. All samples need the same length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let sample_dims = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some(bad) = rows.iter().find(|r| r.len() != sample_dims) {
            return Err(KMeansError::DimensionMismatch { expected: sample_dims, found: bad.len() });
        }
        let sample_cnt = rows.len();
        Self::new(rows.into_iter().flatten().collect(), sample_cnt, sample_dims)
    }

    /// Amount of samples (N)
    pub fn sample_cnt(&self) -> usize { self.sample_cnt }
    /// Dimensionality of each sample (D)
    pub fn sample_dims(&self) -> usize { self.sample_dims }
    /// All samples [row-major]
    pub fn samples(&self) -> &[T] { &self.samples }
    /// The sample with the given index
    pub fn sample(&self, idx: usize) -> &[T] {
        &self.samples[idx * self.sample_dims..(idx + 1) * self.sample_dims]
    }

    /// Normal K-Means algorithm implementation (Lloyd): assign, update, evaluate SSE, until the SSE settles
    /// or **max_iter** iterations were run.
    ///
    /// ## Arguments
    /// - **k**: Amount of clusters to search for
    /// - **max_iter**: Limit the maximum amount of iterations (at least 1)
    /// - **init**: Initialization-Method to use for the initialization of the **k** centroids
    /// - **config**: [`KMeansConfig`] instance, containing several configuration options for the calculation.
    ///
    /// ## Returns
    /// Instance of [`KMeansState`], containing the final state (result).
    ///
    /// ## Errors
    /// [`KMeansError::InvalidConfiguration`] if `k == 0`, `k > sample_cnt` or `max_iter == 0`. Nothing
    /// is sampled in that case.
    ///
    /// ## Example
    /// ```rust
    /// use kmeans_sweep::*;
    /// use rand::prelude::*;
    ///
    /// let samples = vec![0.0f64, 0.0, 0.0, 1.0, 10.0, 0.0, 10.0, 1.0];
    /// let kmean = KMeans::new(samples, 4, 2).unwrap();
    /// let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(7)).build();
    /// let result = kmean.kmeans_lloyd(2, 100, KMeans::init_random_sample, &conf).unwrap();
    ///
    /// println!("Centroids: {:?}", result.centroids);
    /// println!("Cluster-Assignments: {:?}", result.assignments);
    /// println!("SSE: {}", result.distsum);
    /// ```
    pub fn kmeans_lloyd<'a, F>(&self, k: usize, max_iter: usize, init: F, config: &KMeansConfig<'a, T>) -> Result<KMeansState<T>>
                where for<'c> F: FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<()> {
        crate::variants::Lloyd::calculate(self, k, max_iter, init, config)
    }

    /// Run the complete experiment: for every configured k, several independently initialized
    /// [`KMeans::kmeans_lloyd`] runs, reduced to the mean of their final SSE.
    /// Every run gets its own [`RandomIndexSampler`], seeded from [`SweepConfig`]'s seed.
    ///
    /// ## Example
    /// ```rust
    /// use kmeans_sweep::*;
    ///
    /// let samples: Vec<f64> = (0..40).map(|v| (v % 7) as f64 + (v / 20) as f64 * 30.0).collect();
    /// let kmean = KMeans::new(samples, 20, 2).unwrap();
    /// let conf = SweepConfig::build().k_values(vec![2, 3]).restarts_per_k(4).seed(42).build();
    /// let report = kmean.sweep(&conf).unwrap();
    /// for (k, mean_sse) in report.mean_sse_pairs() {
    ///     println!("The average SSE for k= {} is {}", k, mean_sse);
    /// }
    /// ```
    pub fn sweep(&self, config: &SweepConfig<T>) -> Result<SweepReport<T>> {
        crate::sweep::calculate(self, config)
    }

    /// Same as [`KMeans::sweep`], but every run's [`IndexSampler`] is created by **make_sampler**,
    /// which receives the run's `k` and its restart number.
    pub fn sweep_with<S, F>(&self, config: &SweepConfig<T>, make_sampler: F) -> Result<SweepReport<T>>
                where S: IndexSampler, F: Fn(usize, usize) -> S + Sync {
        crate::sweep::calculate_with(self, config, make_sampler)
    }

    /// Random sample initialization method (a.k.a. Forgy)
    ///
    /// ## Description
    /// This initialization method asks the configured [`IndexSampler`] for k distinct sample indices and
    /// uses these samples as initial centroids (in the returned order).
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to an instance-method of [`KMeans`].
    pub fn init_random_sample<'a>(kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'a, T>) -> Result<()> {
        crate::inits::randomsample::calculate(kmean, state, config)
    }

    /// Precomputed initialization method
    ///
    /// ## Description
    /// Uses the given centroids [row-major] as initial centroids. Their amount has to match k.
    pub fn init_precomputed(centroids: Vec<T>) -> impl for<'c> FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<()> {
        move |kmean, state, config| crate::inits::precomputed::calculate(kmean, state, config, centroids)
    }
}
