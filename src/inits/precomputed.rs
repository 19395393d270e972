use crate::{KMeans, KMeansConfig, KMeansError, KMeansState, Primitive, Result};

#[inline(always)]
pub fn calculate<T: Primitive>(
    kmean: &KMeans<T>, state: &mut KMeansState<T>, _config: &KMeansConfig<'_, T>, computed: Vec<T>,
) -> Result<()> {
    if computed.len() != state.k * kmean.sample_dims {
        return Err(KMeansError::DimensionMismatch { expected: state.k * kmean.sample_dims, found: computed.len() });
    }
    computed.chunks_exact(kmean.sample_dims).enumerate().for_each(|(ci, c)| {
        state.set_centroid_from_iter(ci, c.iter().cloned());
    });
    Ok(())
}
