use kmeans_sweep::*;
use rand::prelude::*;

fn main() -> Result<()> {
    let (sample_cnt, sample_dims, k, max_iter) = (20000, 200, 4, 100);

    // Generate some random data
    let mut samples = vec![0.0f64;sample_cnt * sample_dims];
    samples.iter_mut().for_each(|v| *v = rand::random());

    // Calculate kmeans, using random samples as initial centroids
    let kmean = KMeans::new(samples, sample_cnt, sample_dims)?;
    let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(1337)).build();
    let result = kmean.kmeans_lloyd(k, max_iter, KMeans::init_random_sample, &conf)?;

    println!("Centroids: {:?}", result.centroids);
    println!("Cluster-Assignments: {:?}", result.assignments);
    println!("SSE: {} after {} iteration(s)", result.distsum, result.iterations);
    Ok(())
}
