use crate::{distances::*, error::invalid_config, KMeans, KMeansError, Primitive, Result};

impl<T: Primitive> KMeans<T> {
    /// Amount of centroids contained in a row-major centroid buffer.
    fn centroid_cnt(&self, centroids: &[T]) -> Result<usize> {
        if centroids.len() % self.sample_dims != 0 {
            return Err(KMeansError::DimensionMismatch {
                expected: (centroids.len() / self.sample_dims + 1) * self.sample_dims,
                found: centroids.len()
            });
        }
        Ok(centroids.len() / self.sample_dims)
    }

    fn check_assignments(&self, assignments: &[usize], k: usize) -> Result<()> {
        if k == 0 {
            return invalid_config("k must be at least 1");
        }
        if assignments.len() != self.sample_cnt {
            return Err(KMeansError::DimensionMismatch { expected: self.sample_cnt, found: assignments.len() });
        }
        if let Some(&label) = assignments.iter().find(|&&a| a >= k) {
            return invalid_config(format!("cluster assignment {} out of range for k = {}", label, k));
        }
        Ok(())
    }

    /// Assign every sample to its nearest centroid.
    ///
    /// ## Arguments
    /// - **centroids**: Centroids [row-major] = [<centroid0>,<centroid1>,...]; k is derived from its length
    ///
    /// ## Returns
    /// One cluster index per sample. Ties go to the centroid with the lower index: a later centroid only
    /// wins with a strictly smaller distance. A `NaN` distance never wins, so a `NaN` centroid 0 captures
    /// every sample, while any other `NaN` centroid stays empty.
    ///
    /// ## Errors
    /// - [`KMeansError::InvalidConfiguration`] when no centroid is given
    /// - [`KMeansError::DimensionMismatch`] if the centroid buffer is not a multiple of the sample dimensionality
    pub fn assign(&self, centroids: &[T]) -> Result<Vec<usize>> {
        if self.centroid_cnt(centroids)? == 0 {
            return invalid_config("k must be at least 1");
        }
        self.samples.chunks_exact(self.sample_dims)
            .map(|s| -> Result<usize> {
                let mut centroid_iter = centroids.chunks_exact(self.sample_dims);
                let mut best_idx = 0;
                let mut best_dist = euclidean_distance(s, centroid_iter.next().unwrap_or_default())?;
                for (ci, c) in centroid_iter.enumerate() {
                    let dist = euclidean_distance(s, c)?;
                    if dist < best_dist {
                        best_idx = ci + 1;
                        best_dist = dist;
                    }
                }
                Ok(best_idx)
            })
            .collect()
    }

    /// Recalculate all **k** centroids as the coordinate-wise mean of their assigned samples.
    ///
    /// ## Returns
    /// New centroids [row-major]. A cluster without samples gets a centroid consisting of `NaN`
    /// (mean of an empty set).
    ///
    /// ## Errors
    /// - [`KMeansError::DimensionMismatch`] if there is not exactly one assignment per sample
    /// - [`KMeansError::InvalidConfiguration`] if `k == 0` or an assignment is `>= k`
    pub fn update_centroids(&self, assignments: &[usize], k: usize) -> Result<Vec<T>> {
        self.check_assignments(assignments, k)?;
        let mut centroid_frequency = vec![0usize;k];
        self.update_cluster_frequencies(assignments, &mut centroid_frequency);

        // Sum all samples in a cluster together into new_centroids
        let mut new_centroids = vec![T::zero();k * self.sample_dims];
        self.samples.chunks_exact(self.sample_dims)
            .zip(assignments.iter().cloned())
            .for_each(|(s, centroid_id)| {
                new_centroids.iter_mut().skip(centroid_id * self.sample_dims).take(self.sample_dims)
                    .zip(s.iter().cloned())
                    .for_each(|(c, sv)| *c += sv);
            });
        // 0 / 0 leaves NaN for empty clusters
        new_centroids.chunks_exact_mut(self.sample_dims)
            .zip(centroid_frequency.iter().cloned())
            .for_each(|(c, cfreq)| {
                let cfreq = T::from(cfreq).unwrap_or_else(T::nan);
                c.iter_mut().for_each(|cv| *cv = *cv / cfreq);
            });
        Ok(new_centroids)
    }

    /// Sum of squared errors: for every cluster, the squared distances of its samples to its centroid,
    /// summed up over all clusters.
    ///
    /// ## Returns
    /// The SSE (>= 0), or `NaN` if a sample is assigned to a `NaN` centroid.
    ///
    /// ## Errors
    /// Same as [`KMeans::update_centroids`], plus [`KMeansError::DimensionMismatch`] if **centroids**
    /// does not hold exactly **k** centroids.
    pub fn sse(&self, assignments: &[usize], k: usize, centroids: &[T]) -> Result<T> {
        self.check_assignments(assignments, k)?;
        if centroids.len() != k * self.sample_dims {
            return Err(KMeansError::DimensionMismatch { expected: k * self.sample_dims, found: centroids.len() });
        }
        let mut cluster_errors = vec![T::zero();k];
        for (s, centroid_id) in self.samples.chunks_exact(self.sample_dims).zip(assignments.iter().cloned()) {
            let centroid = &centroids[centroid_id * self.sample_dims..(centroid_id + 1) * self.sample_dims];
            cluster_errors[centroid_id] += squared_euclidean_distance(s, centroid)?;
        }
        Ok(cluster_errors.into_iter().sum())
    }

    pub(crate) fn update_cluster_frequencies(&self, assignments: &[usize], centroid_frequency: &mut[usize]) -> usize {
        centroid_frequency.iter_mut().for_each(|v| *v = 0);
        let mut used_centroids_cnt = 0;
        assignments.iter().cloned()
            .for_each(|centroid_id| {
                if centroid_frequency[centroid_id] == 0 {
                    used_centroids_cnt += 1; // Count the amount of centroids with more than 0 samples
                }
                centroid_frequency[centroid_id] += 1;
            });
        used_centroids_cnt
    }
}


#[cfg(test)]
mod tests {
    use crate::helpers::testing::*;
    use crate::*;

    #[test] fn assignments_f32() { assignments::<f32>(); }
    #[test] fn assignments_f64() { assignments::<f64>(); }

    fn assignments<T: Primitive>() {
        let kmean = two_pairs::<T>();
        let centroids = cast::<T>(&[0.0, 0.0, 10.0, 0.0]);
        assert_eq!(kmean.assign(&centroids).unwrap(), vec![0, 0, 1, 1]);
        // deterministic
        assert_eq!(kmean.assign(&centroids).unwrap(), kmean.assign(&centroids).unwrap());
    }

    #[test]
    fn assignment_ties_go_to_first_centroid() {
        let kmean = KMeans::new(vec![5.0f64, 0.0], 1, 2).unwrap();
        // both centroids have distance 5
        assert_eq!(kmean.assign(&[0.0, 0.0, 10.0, 0.0]).unwrap(), vec![0]);
        assert_eq!(kmean.assign(&[10.0, 0.0, 0.0, 0.0]).unwrap(), vec![0]);
        assert_eq!(kmean.assign(&[10.0, 0.0, 0.0, 0.0, 5.0, 0.0]).unwrap(), vec![2]);
    }

    #[test]
    fn assignment_with_nan_centroids() {
        let kmean = two_pairs::<f64>();
        let nan = f64::NAN;
        // NaN centroid 0 captures everything
        assert_eq!(kmean.assign(&[nan, nan, 10.0, 0.0]).unwrap(), vec![0, 0, 0, 0]);
        // any other NaN centroid is never chosen
        assert_eq!(kmean.assign(&[0.0, 0.0, nan, nan, 10.0, 0.0]).unwrap(), vec![0, 0, 2, 2]);
    }

    #[test]
    fn assignment_errors() {
        let kmean = two_pairs::<f64>();
        assert!(matches!(kmean.assign(&[]), Err(KMeansError::InvalidConfiguration(_))));
        assert!(matches!(kmean.assign(&[0.0, 0.0, 1.0]), Err(KMeansError::DimensionMismatch { expected: 4, found: 3 })));
    }

    #[test] fn centroid_update_f32() { centroid_update::<f32>(); }
    #[test] fn centroid_update_f64() { centroid_update::<f64>(); }

    fn centroid_update<T: Primitive>() {
        let kmean = two_pairs::<T>();
        let centroids = kmean.update_centroids(&[0, 0, 1, 1], 2).unwrap();
        assert_eq!(centroids, cast::<T>(&[0.0, 0.5, 10.0, 0.5]));
        let centroids = kmean.update_centroids(&[0, 1, 0, 1], 2).unwrap();
        assert_eq!(centroids, cast::<T>(&[5.0, 0.0, 5.0, 1.0]));
    }

    #[test]
    fn centroid_update_empty_cluster_is_nan() {
        let kmean = two_pairs::<f64>();
        let centroids = kmean.update_centroids(&[0, 0, 2, 2], 3).unwrap();
        assert_eq!(&centroids[0..2], &[0.0, 0.5]);
        assert!(centroids[2].is_nan() && centroids[3].is_nan());
        assert_eq!(&centroids[4..6], &[10.0, 0.5]);
    }

    #[test]
    fn centroid_update_errors() {
        let kmean = two_pairs::<f64>();
        assert!(matches!(kmean.update_centroids(&[0, 0, 1], 2), Err(KMeansError::DimensionMismatch { expected: 4, found: 3 })));
        assert!(matches!(kmean.update_centroids(&[0, 0, 1, 2], 2), Err(KMeansError::InvalidConfiguration(_))));
        assert!(matches!(kmean.update_centroids(&[0, 0, 0, 0], 0), Err(KMeansError::InvalidConfiguration(_))));
    }

    #[test] fn sse_f32() { sse::<f32>(1e-2); }
    #[test] fn sse_f64() { sse::<f64>(1e-12); }

    fn sse<T: Primitive>(max_diff: T) {
        let kmean = two_pairs::<T>();
        let centroids = cast::<T>(&[0.0, 0.5, 10.0, 0.5]);
        assert_approx_eq!(kmean.sse(&[0, 0, 1, 1], 2, &centroids).unwrap(), T::from(1.0).unwrap(), max_diff);

        // cross-check against naive per-sample recomputation
        let kmean = two_blobs::<T>();
        let assignments = vec![1, 0, 1, 0, 1, 0, 1, 0, 1, 0];
        let centroids = cast::<T>(&[3.0, -2.0, 7.5, 11.0]);
        assert_approx_eq!(kmean.sse(&assignments, 2, &centroids).unwrap(),
            naive_sse(&kmean, &assignments, &centroids), max_diff);
    }

    #[test]
    fn sse_is_zero_only_for_coinciding_centroids() {
        let kmean = two_pairs::<f64>();
        let centroids = kmean.samples().to_vec();
        assert_eq!(kmean.sse(&[0, 1, 2, 3], 4, &centroids).unwrap(), 0.0);
        assert!(kmean.sse(&[0, 0, 2, 3], 4, &centroids).unwrap() > 0.0);
    }

    #[test]
    fn sse_with_nan_centroid() {
        let kmean = two_pairs::<f64>();
        let nan = f64::NAN;
        // empty NaN cluster does not contribute
        assert_eq!(kmean.sse(&[0, 0, 0, 0], 2, &[0.0, 0.5, nan, nan]).unwrap(), 201.0);
        // NaN centroid with samples poisons the SSE
        assert!(kmean.sse(&[0, 0, 1, 1], 2, &[0.0, 0.5, nan, nan]).unwrap().is_nan());
    }

    #[test]
    fn sse_errors() {
        let kmean = two_pairs::<f64>();
        assert!(matches!(kmean.sse(&[0, 0, 1, 1], 2, &[0.0, 0.0]), Err(KMeansError::DimensionMismatch { expected: 4, found: 2 })));
        assert!(matches!(kmean.sse(&[0, 0, 1, 1], 1, &[0.0, 0.0]), Err(KMeansError::InvalidConfiguration(_))));
    }

    #[test]
    fn lloyd_step_does_not_increase_sse() {
        let kmean = two_blobs::<f64>();
        // rough initial centroids: one sample of each blob
        let initial = [kmean.sample(1), kmean.sample(7)].concat();
        let assignments = kmean.assign(&initial).unwrap();
        let before = kmean.sse(&assignments, 2, &initial).unwrap();
        let updated = kmean.update_centroids(&assignments, 2).unwrap();
        let after = kmean.sse(&assignments, 2, &updated).unwrap();
        assert!(after <= before + 1e-9, "SSE increased from {} to {}", before, after);

        let reassigned = kmean.assign(&updated).unwrap();
        assert!(kmean.sse(&reassigned, 2, &updated).unwrap() <= after + 1e-9);
    }

    #[test]
    fn cluster_frequencies() {
        let kmean = two_pairs::<f64>();
        let mut freq = vec![7usize; 3];
        assert_eq!(kmean.update_cluster_frequencies(&[0, 2, 2, 2], &mut freq), 2);
        assert_eq!(freq, vec![1, 0, 3]);
    }
}
