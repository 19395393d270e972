use crate::{error::invalid_config, helpers, AbortStrategy, EmptyClusterPolicy, IndexSampler, KMeans, KMeansConfig, Primitive, RandomIndexSampler, Result};
use log::{debug, warn};
use rand::prelude::*;
use rayon::prelude::*;

/// Configuration of a complete sweep: which k to try, how often, and how each single run is configured.
///
/// For a more detailed information about all possible options, have a look at [`SweepConfigBuilder`].
#[derive(Clone, Debug, PartialEq)]
pub struct SweepConfig<T: Primitive> {
    pub(crate) k_values: Vec<usize>,
    pub(crate) restarts_per_k: usize,
    pub(crate) max_iter: usize,
    pub(crate) abort_strategy: AbortStrategy<T>,
    pub(crate) empty_cluster_policy: EmptyClusterPolicy,
    pub(crate) seed: Option<u64>,
    pub(crate) parallel: bool
}
impl<T: Primitive> Default for SweepConfig<T> {
    fn default() -> Self {
        Self {
            k_values: vec![3, 5, 7],
            restarts_per_k: 10,
            max_iter: 100,
            abort_strategy: AbortStrategy::default(),
            empty_cluster_policy: EmptyClusterPolicy::default(),
            seed: None,
            parallel: false
        }
    }
}
impl<T: Primitive> SweepConfig<T> {
    /// Use the [`SweepConfigBuilder`] to build a [`SweepConfig`] instance.
    pub fn build() -> SweepConfigBuilder<T> {
        SweepConfigBuilder { config: SweepConfig::default() }
    }

    pub fn k_values(&self) -> &[usize] { &self.k_values }
    pub fn restarts_per_k(&self) -> usize { self.restarts_per_k }
    pub fn max_iter(&self) -> usize { self.max_iter }
    pub fn abort_strategy(&self) -> AbortStrategy<T> { self.abort_strategy }
    pub fn empty_cluster_policy(&self) -> EmptyClusterPolicy { self.empty_cluster_policy }
    pub fn seed(&self) -> Option<u64> { self.seed }
    pub fn parallel(&self) -> bool { self.parallel }

    /// Check everything that can be checked without running anything.
    pub(crate) fn validate(&self, kmean: &KMeans<T>) -> Result<()> {
        if self.k_values.is_empty() {
            return invalid_config("no k values to evaluate");
        }
        if let Some(&k) = self.k_values.iter().find(|&&k| k == 0 || k > kmean.sample_cnt) {
            return invalid_config(format!("k = {} is not within 1..={} (amount of samples)", k, kmean.sample_cnt));
        }
        if self.restarts_per_k == 0 {
            return invalid_config("restarts_per_k must be at least 1");
        }
        if self.max_iter == 0 {
            return invalid_config("max_iter must be at least 1");
        }
        if !self.abort_strategy.is_valid() {
            return invalid_config(format!("unusable abort strategy {:?}", self.abort_strategy));
        }
        Ok(())
    }
}

pub struct SweepConfigBuilder<T: Primitive> {
    config: SweepConfig<T>
}
impl<T: Primitive> SweepConfigBuilder<T> {
    /// Set the candidate cluster counts, evaluated (and reported) in the given order.
    /// ## Default
    /// `[3, 5, 7]`
    pub fn k_values(mut self, k_values: Vec<usize>) -> Self {
        self.config.k_values = k_values; self
    }
    /// Set the amount of independently initialized runs per k.
    /// ## Default
    /// `10`
    pub fn restarts_per_k(mut self, restarts_per_k: usize) -> Self {
        self.config.restarts_per_k = restarts_per_k; self
    }
    /// Set the iteration limit of each run.
    /// ## Default
    /// `100`
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.config.max_iter = max_iter; self
    }
    /// Shorthand for [`AbortStrategy::SseDelta`] with the given threshold.
    pub fn convergence_threshold(self, threshold: T) -> Self {
        self.abort_strategy(AbortStrategy::SseDelta { threshold })
    }
    /// Set the abort-strategy of each run.
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
    /// Seed for the random initializations. Sweeps with the same seed (and configuration) produce identical reports.
    /// Without a seed, the generator is seeded from system entropy.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed); self
    }
    /// Run the independent runs on the rayon thread pool. Does not change the result.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel; self
    }
    /// Return the internally built configuration structure.
    pub fn build(self) -> SweepConfig<T> { self.config }
}


/// Aggregated outcome of all runs for one k.
///
/// ## Fields
/// - **k**: The evaluated amount of clusters
/// - **mean_sse**: Arithmetic mean of the final SSE of all runs (`NaN` if any run's SSE is `NaN`)
/// - **sse**: Final SSE of each run, in restart order
/// - **iterations**: Amount of iterations of each run, in restart order
/// - **degenerate_runs**: Amount of runs that ended with an empty (`NaN`) cluster
#[derive(Clone, Debug, PartialEq)]
pub struct SweepResult<T: Primitive> {
    pub k: usize,
    pub mean_sse: T,
    pub sse: Vec<T>,
    pub iterations: Vec<usize>,
    pub degenerate_runs: usize
}

/// Outcome of a sweep: one [`SweepResult`] per configured k, in configuration order.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepReport<T: Primitive> {
    pub results: Vec<SweepResult<T>>
}
impl<T: Primitive> SweepReport<T> {
    /// `(k, mean SSE)` pairs in the order k was evaluated.
    pub fn mean_sse_pairs(&self) -> Vec<(usize, T)> {
        self.results.iter().map(|r| (r.k, r.mean_sse)).collect()
    }

    /// Result of the first evaluation of the given k.
    pub fn get(&self, k: usize) -> Option<&SweepResult<T>> {
        self.results.iter().find(|r| r.k == k)
    }
}


struct RunOutcome<T> {
    sse: T,
    iterations: usize,
    degenerate: bool
}

/// Runs every (k, restart) task, each with its own sampler, and reduces them per k.
/// Tasks are numbered in configuration order; the outcome only depends on that order,
/// not on the order in which tasks finish.
fn run_tasks<T, S, F>(kmean: &KMeans<T>, config: &SweepConfig<T>, make_sampler: F) -> Result<SweepReport<T>>
            where T: Primitive, S: IndexSampler, F: Fn(usize, usize, usize) -> S + Sync {
    config.validate(kmean)?;
    let tasks: Vec<(usize, usize)> = config.k_values.iter().cloned()
        .flat_map(|k| (0..config.restarts_per_k).map(move |restart| (k, restart)))
        .collect();
    debug!("Sweeping k = {:?} with {} restart(s) each ({} runs, parallel: {})",
        config.k_values, config.restarts_per_k, tasks.len(), config.parallel);

    let run = |(task_id, &(k, restart)): (usize, &(usize, usize))| -> Result<RunOutcome<T>> {
        let conf = KMeansConfig::build()
            .index_sampler(make_sampler(task_id, k, restart))
            .abort_strategy(config.abort_strategy)
            .empty_cluster_policy(config.empty_cluster_policy)
            .build();
        let state = kmean.kmeans_lloyd(k, config.max_iter, KMeans::init_random_sample, &conf)?;
        Ok(RunOutcome { sse: state.distsum, iterations: state.iterations, degenerate: state.is_degenerate() })
    };
    let outcomes: Vec<RunOutcome<T>> = if config.parallel {
        tasks.par_iter().enumerate().map(run).collect::<Result<_>>()?
    } else {
        tasks.iter().enumerate().map(run).collect::<Result<_>>()?
    };

    let results = config.k_values.iter().cloned()
        .zip(outcomes.chunks(config.restarts_per_k))
        .map(|(k, runs)| {
            let sse: Vec<T> = runs.iter().map(|r| r.sse).collect();
            let result = SweepResult {
                k,
                mean_sse: helpers::mean(&sse),
                iterations: runs.iter().map(|r| r.iterations).collect(),
                degenerate_runs: runs.iter().filter(|r| r.degenerate).count(),
                sse
            };
            if result.degenerate_runs > 0 {
                warn!("k = {}: {} of {} run(s) ended with an empty cluster", k, result.degenerate_runs, runs.len());
            }
            debug!("k = {}: mean SSE {} over {} run(s)", k, result.mean_sse, runs.len());
            result
        })
        .collect();
    Ok(SweepReport { results })
}

#[inline(always)] pub(crate) fn calculate_with<T, S, F>(kmean: &KMeans<T>, config: &SweepConfig<T>, make_sampler: F) -> Result<SweepReport<T>>
            where T: Primitive, S: IndexSampler, F: Fn(usize, usize) -> S + Sync {
    run_tasks(kmean, config, |_, k, restart| make_sampler(k, restart))
}

pub(crate) fn calculate<T: Primitive>(kmean: &KMeans<T>, config: &SweepConfig<T>) -> Result<SweepReport<T>> {
    // One seed per task, drawn up front, so parallel execution cannot reorder the random streams
    let mut master = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy()
    };
    let seeds: Vec<u64> = (0..config.k_values.len() * config.restarts_per_k).map(|_| master.next_u64()).collect();
    run_tasks(kmean, config, |task_id, _, _| RandomIndexSampler::new(StdRng::seed_from_u64(seeds[task_id])))
}
