use kmeans_sweep::*;
use rand::prelude::*;

fn main() -> Result<()> {
    let (sample_dims, points_per_blob) = (3, 200);
    let blob_centers = [[0.0, 0.0, 0.0], [8.0, 8.0, 0.0], [0.0, 8.0, 8.0], [8.0, 0.0, 8.0], [4.0, 4.0, 4.0]];

    // Five gaussian-ish blobs: the elbow should show up at k = 5
    let mut rnd = StdRng::seed_from_u64(42);
    let mut samples = Vec::with_capacity(blob_centers.len() * points_per_blob * sample_dims);
    for center in blob_centers.iter() {
        for _ in 0..points_per_blob {
            samples.extend(center.iter().map(|c| c + (rnd.gen::<f64>() - 0.5) * 2.0 + (rnd.gen::<f64>() - 0.5) * 2.0));
        }
    }
    let kmean = KMeans::new(samples, blob_centers.len() * points_per_blob, sample_dims)?;

    let conf = SweepConfig::build()
        .k_values((1..=8).collect())
        .restarts_per_k(10)
        .max_iter(100)
        .convergence_threshold(0.001)
        .seed(1337)
        .parallel(true)
        .build();
    let report = kmean.sweep(&conf)?;

    for result in report.results.iter() {
        println!("The average SSE for k= {} is {} (degenerate runs: {})", result.k, result.mean_sse, result.degenerate_runs);
    }
    Ok(())
}
