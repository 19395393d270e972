use crate::{error::invalid_config, EmptyClusterPolicy, KMeans, KMeansConfig, KMeansState, Primitive, Result};
use log::{debug, trace, warn};

pub(crate) struct Lloyd<T> where T: Primitive {
	_p: std::marker::PhantomData<T>
}
impl<T> Lloyd<T> where T: Primitive {
    /// Move the centroids of all clusters without samples onto randomly chosen samples.
    /// All replacements are drawn at once, so no two empty clusters end up on the same sample.
    fn reinitialize_empty_clusters(data: &KMeans<T>, state: &KMeansState<T>, config: &KMeansConfig<'_, T>, new_centroids: &mut [T]) -> Result<()> {
        let empty_clusters: Vec<usize> = state.centroid_frequency.iter().enumerate()
            .filter(|(_, &freq)| freq == 0)
            .map(|(i, _)| i)
            .collect();
        let sample_ids = config.choose_distinct(data.sample_cnt, empty_clusters.len())?;
        for (i, sample_id) in empty_clusters.into_iter().zip(sample_ids) {
            trace!("Reinitializing empty cluster {} with sample {}", i, sample_id);
            new_centroids.iter_mut().skip(i * data.sample_dims).take(data.sample_dims)
                .zip(data.sample(sample_id).iter().cloned())
                .for_each(|(cv, sv)| *cv = sv);
        }
        Ok(())
    }

    #[inline(always)] pub fn calculate<'a, F>(data: &KMeans<T>, k: usize, max_iter: usize, init: F, config: &KMeansConfig<'a, T>) -> Result<KMeansState<T>>
                where for<'c> F: FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<()> {
        if k == 0 || k > data.sample_cnt {
            return invalid_config(format!("k = {} is not within 1..={} (amount of samples)", k, data.sample_cnt));
        }
        if max_iter == 0 {
            return invalid_config("max_iter must be at least 1");
        }

        let mut state = KMeansState::new(data.sample_cnt, data.sample_dims, k);

        // Initialize clusters and notify subscriber
        init(data, &mut state, config)?;
        (config.init_done)(&state);
        debug!("Starting k-means (lloyd) with k = {} on {} samples ({} dimensions)", k, data.sample_cnt, data.sample_dims);
        let mut abort_strategy = config.abort_strategy.create_logic();

        for i in 1..=max_iter {
            let assignments = data.assign(&state.centroids)?;
            let used_centroids_cnt = data.update_cluster_frequencies(&assignments, &mut state.centroid_frequency);
            let mut new_centroids = data.update_centroids(&assignments, k)?;

            if used_centroids_cnt != k {
                debug!("Iteration {}: {} of {} clusters are empty", i, k - used_centroids_cnt, k);
                if config.empty_cluster_policy == EmptyClusterPolicy::Reinitialize {
                    Self::reinitialize_empty_clusters(data, &state, config, &mut new_centroids)?;
                }
            }
            let new_distsum = data.sse(&assignments, k, &new_centroids)?;
            state.assignments = assignments;
            state.centroids = new_centroids;
            state.iterations = i;

			// Notify subscriber about finished iteration
			(config.iteration_done)(&state, i, new_distsum);
            trace!("Iteration {} - SSE: {} -> {}", i, state.distsum, new_distsum);
            let proceed = abort_strategy.next(new_distsum);
            state.distsum = new_distsum;
            if !proceed {
                break;
            }
        }

        if state.is_degenerate() {
            warn!("k-means (k = {}) finished with {} empty cluster(s), their centroids are NaN", k,
                state.centroid_frequency.iter().filter(|&&f| f == 0).count());
        }
        debug!("Finished k-means (k = {}) after {} iteration(s) with SSE {}", k, state.iterations, state.distsum);
        Ok(state)
    }
}




#[cfg(test)]
mod tests {
    use crate::helpers::testing::*;
    use crate::*;
    use std::cell::Cell;

    #[test] fn two_pairs_f32() { two_pairs_converge::<f32>(1e-5); }
    #[test] fn two_pairs_f64() { two_pairs_converge::<f64>(1e-12); }

    fn two_pairs_converge<T: Primitive>(max_diff: T) {
        let kmean = two_pairs::<T>();
        let conf = KMeansConfig::build().index_sampler(ScriptedSampler::new(vec![vec![0, 2]])).build();
        let res = kmean.kmeans_lloyd(2, 100, KMeans::init_random_sample, &conf).unwrap();

        assert_eq!(res.assignments, vec![0, 0, 1, 1]);
        assert_eq!(res.centroids, cast::<T>(&[0.0, 0.5, 10.0, 0.5]));
        assert_eq!(res.centroid_frequency, vec![2, 2]);
        // 4 samples, each 0.5 away from its centroid
        assert_approx_eq!(res.distsum, T::from(1.0).unwrap(), max_diff);
        // second iteration reproduces the SSE of the first one
        assert_eq!(res.iterations, 2);
        assert!(!res.is_degenerate());
    }

    #[test]
    fn bad_initialization_gets_stuck_in_local_optimum() {
        let kmean = two_pairs::<f64>();
        let conf = KMeansConfig::build().index_sampler(ScriptedSampler::new(vec![vec![0, 1]])).build();
        let res = kmean.kmeans_lloyd(2, 100, KMeans::init_random_sample, &conf).unwrap();
        assert_eq!(res.assignments, vec![0, 1, 0, 1]);
        assert_eq!(res.centroids, vec![5.0, 0.0, 5.0, 1.0]);
        assert_eq!(res.distsum, 100.0);
    }

    #[test]
    fn every_sample_its_own_cluster() {
        let kmean = two_pairs::<f64>();
        let conf = KMeansConfig::build().index_sampler(ScriptedSampler::new(vec![vec![2, 0, 3, 1]])).build();
        let res = kmean.kmeans_lloyd(4, 100, KMeans::init_random_sample, &conf).unwrap();
        assert_eq!(res.distsum, 0.0);
        assert_eq!(res.iterations, 1);
        assert_eq!(res.assignments, vec![1, 3, 0, 2]);
        assert_eq!(res.centroid_frequency, vec![1, 1, 1, 1]);
    }

    #[test]
    fn stops_at_max_iter() {
        let kmean = two_blobs::<f64>();
        for max_iter in 1..5 {
            let conf = KMeansConfig::build()
                .index_sampler(ScriptedSampler::new(vec![vec![0, 1]]))
                .abort_strategy(AbortStrategy::FixedIterations)
                .build();
            let res = kmean.kmeans_lloyd(2, max_iter, KMeans::init_random_sample, &conf).unwrap();
            assert_eq!(res.iterations, max_iter);
        }
    }

    #[test]
    fn invalid_configuration_is_rejected_before_sampling() {
        let kmean = two_pairs::<f64>();
        for &(k, max_iter) in &[(0, 100), (5, 100), (2, 0)] {
            let conf = KMeansConfig::build().index_sampler(PanickingSampler).build();
            let res = kmean.kmeans_lloyd(k, max_iter, KMeans::init_random_sample, &conf);
            assert!(matches!(res, Err(KMeansError::InvalidConfiguration(_))), "k = {}, max_iter = {}", k, max_iter);
        }
    }

    #[test]
    fn callbacks() {
        let kmean = two_pairs::<f64>();
        let init_calls = Cell::new(0);
        let iterations = Cell::new(0);
        let init_done = |s: &KMeansState<f64>| {
            assert_eq!(s.centroids, vec![0.0, 0.0, 10.0, 0.0]);
            init_calls.set(init_calls.get() + 1);
        };
        let iteration_done = |s: &KMeansState<f64>, nr: usize, new_distsum: f64| {
            assert_eq!(nr, iterations.get() + 1);
            assert_eq!(new_distsum, 1.0);
            if nr == 1 {
                assert!(s.distsum.is_nan()); // no previous SSE yet
            }
            iterations.set(nr);
        };
        let conf = KMeansConfig::build()
            .index_sampler(ScriptedSampler::new(vec![vec![0, 2]]))
            .init_done(&init_done)
            .iteration_done(&iteration_done)
            .build();
        let res = kmean.kmeans_lloyd(2, 100, KMeans::init_random_sample, &conf).unwrap();
        assert_eq!(init_calls.get(), 1);
        assert_eq!(iterations.get(), res.iterations);
    }

    #[test]
    fn empty_cluster_propagates_nan() {
        let samples = vec![1.0f64, 0.0, 2.0, 0.0, 3.0, 0.0];
        let kmean = KMeans::new(samples, 3, 2).unwrap();
        let conf = KMeansConfig::build().index_sampler(PanickingSampler).build();

        let res = kmean.kmeans_lloyd(2, 100, KMeans::init_precomputed(vec![2.0, 0.0, 1337.0, 0.0]), &conf).unwrap();
        assert_eq!(&res.assignments, &[0, 0, 0]);
        assert_eq!(&res.centroid_frequency, &[3, 0]);
        assert_eq!(res.centroid(0), &[2.0, 0.0]);
        assert!(res.centroid(1).iter().all(|v| v.is_nan()));
        // The empty cluster holds no samples, so the SSE itself stays finite
        assert_eq!(res.distsum, 2.0);
        assert!(res.is_degenerate());
    }

    #[test]
    fn empty_cluster_reinitialization() {
        let samples = vec![1.0f64, 0.0, 2.0, 0.0, 3.0, 0.0];
        let kmean = KMeans::new(samples, 3, 2).unwrap();
        let conf = KMeansConfig::build()
            .index_sampler(ScriptedSampler::new(vec![vec![2]]))
            .empty_cluster_policy(EmptyClusterPolicy::Reinitialize)
            .build();

        let res = kmean.kmeans_lloyd(2, 100, KMeans::init_precomputed(vec![2.0, 0.0, 1337.0, 0.0]), &conf).unwrap();
        assert_eq!(res.distsum, 0.5);
        assert_eq!(&res.assignments, &[0, 0, 1]);
        assert_eq!(&res.centroids, &[1.5, 0.0, 3.0, 0.0]);
        assert_eq!(&res.centroid_frequency, &[2, 1]);
        assert_eq!(res.iterations, 3);
        assert!(!res.is_degenerate());
    }

    #[test]
    fn empty_clusters_reinitialized_on_distinct_samples() {
        let kmean = KMeans::new(vec![0.0f64, 1.0, 2.0, 3.0], 4, 1).unwrap();
        let mut sampler = ScriptedSampler::new(vec![vec![0, 3]]);
        {
            let conf = KMeansConfig::build()
                .index_sampler(&mut sampler)
                .empty_cluster_policy(EmptyClusterPolicy::Reinitialize)
                .build();
            let res = kmean.kmeans_lloyd(3, 100, KMeans::init_precomputed(vec![1.5, 100.0, 200.0]), &conf).unwrap();
            assert_eq!(&res.centroids, &[1.5, 0.0, 3.0]);
            assert_eq!(&res.assignments, &[1, 0, 0, 2]);
            assert_eq!(&res.centroid_frequency, &[2, 1, 1]);
            assert_eq!(res.distsum, 0.5);
            assert_eq!(res.iterations, 3);
        }
        // both empty clusters were served by a single draw
        assert_eq!(sampler.calls, vec![(4, 2)]);
    }

    #[test]
    fn empty_cluster_reinitialization_rejects_broken_picks() {
        let kmean = KMeans::new(vec![0.0f64, 1.0, 2.0, 3.0], 4, 1).unwrap();
        for picks in vec![vec![3, 3], vec![7, 1], vec![2]] {
            let conf = KMeansConfig::build()
                .index_sampler(UncheckedSampler::new(picks.clone()))
                .empty_cluster_policy(EmptyClusterPolicy::Reinitialize)
                .build();
            let res = kmean.kmeans_lloyd(3, 100, KMeans::init_precomputed(vec![1.5, 100.0, 200.0]), &conf);
            assert!(matches!(res, Err(KMeansError::InvalidConfiguration(_))), "{:?}", picks);
        }
    }
}
