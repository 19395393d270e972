use crate::{KMeans, KMeansState, KMeansConfig, Primitive, Result};

#[inline(always)] pub fn calculate<'a, T: Primitive>(kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'a, T>) -> Result<()> {
	config.choose_distinct(kmean.sample_cnt, state.k)?.into_iter()
		.enumerate()
		.for_each(|(ci, si)| { // Copy randomly chosen samples into state.centroids
			state.set_centroid_from_iter(ci, kmean.sample(si).iter().cloned());
		});
	Ok(())
}
