use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use kmeans_sweep::{io::{load_table, TableOptions}, EmptyClusterPolicy, KMeans, SweepConfig};
use log::info;
use std::path::PathBuf;

/// Mean k-means SSE over random restarts, for several candidate cluster counts.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Opts {
    /// Numeric table, one sample per line (whitespace and/or comma separated)
    file: PathBuf,

    /// Candidate cluster count (repeatable)
    #[arg(short = 'k', value_name = "K", default_values_t = vec![3, 5, 7])]
    k: Vec<usize>,

    /// Independently initialized runs per k
    #[arg(long, default_value_t = 10)]
    restarts: usize,

    /// Iteration limit of each run
    #[arg(long, default_value_t = 100)]
    max_iter: usize,

    /// A run stops, once its SSE changes by less than this
    #[arg(long, default_value_t = 0.001)]
    threshold: f64,

    /// Seed for the random initializations (system entropy if unset)
    #[arg(long)]
    seed: Option<u64>,

    /// Min-max normalize every column to [0, 1] before clustering
    #[arg(long)]
    normalize: bool,

    /// Move centroids of empty clusters onto a random sample instead of letting them become NaN
    #[arg(long)]
    reinit_empty: bool,

    /// Run on all cores
    #[arg(long)]
    parallel: bool,

    /// The first line of the table holds column names
    #[arg(long)]
    header: bool,

    /// Amount of leading columns (e.g. an id) to ignore
    #[arg(long, default_value_t = 0)]
    skip_columns: usize,
}

impl Opts {
    fn sweep_config(&self) -> SweepConfig<f64> {
        let mut builder = SweepConfig::build()
            .k_values(self.k.clone())
            .restarts_per_k(self.restarts)
            .max_iter(self.max_iter)
            .convergence_threshold(self.threshold)
            .parallel(self.parallel);
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        if self.reinit_empty {
            builder = builder.empty_cluster_policy(EmptyClusterPolicy::Reinitialize);
        }
        builder.build()
    }
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    env_logger::init_from_env(Env::default().filter_or("RUST_LOG", "info"));

    let table_options = TableOptions { header: opts.header, skip_columns: opts.skip_columns };
    let mut kmean: KMeans<f64> = load_table(&opts.file, &table_options)
        .with_context(|| format!("failed to read dataset from {}", opts.file.display()))?;
    info!("Loaded {} samples with {} dimensions", kmean.sample_cnt(), kmean.sample_dims());
    if opts.normalize {
        kmean = kmean.minmax_normalized();
    }

    let report = kmean.sweep(&opts.sweep_config()).context("sweep failed")?;
    for (k, mean_sse) in report.mean_sse_pairs() {
        println!("The average SSE for k= {} is {}", k, mean_sse);
    }
    Ok(())
}
