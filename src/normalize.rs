use crate::{KMeans, Primitive};

impl<T: Primitive> KMeans<T> {
    /// Min-max normalized copy of the dataset: every dimension is rescaled to `[0, 1]` using
    /// `(x - min) / (max - min)` of that dimension.
    ///
    /// Dimensions with a single value (`max == min`) are mapped to `0` instead of dividing by zero.
    /// `NaN` inputs stay `NaN` and are ignored for min / max.
    pub fn minmax_normalized(&self) -> KMeans<T> {
        let dims = self.sample_dims;
        let mut min = vec![T::infinity();dims];
        let mut max = vec![T::neg_infinity();dims];
        for s in self.samples.chunks_exact(dims) {
            for (d, &v) in s.iter().enumerate() {
                min[d] = min[d].min(v);
                max[d] = max[d].max(v);
            }
        }

        let samples = self.samples.chunks_exact(dims)
            .flat_map(|s| {
                s.iter().zip(min.iter().zip(max.iter()))
                    .map(|(&v, (&lo, &hi))| {
                        let range = hi - lo;
                        if range > T::zero() { (v - lo) / range } else if v.is_nan() { v } else { T::zero() }
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        KMeans { sample_cnt: self.sample_cnt, sample_dims: dims, samples }
    }
}
