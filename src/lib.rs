//! # kmeans-sweep - API documentation
//!
//! kmeans-sweep is a small rust library that answers one question about a dataset: how well does k-means
//! clustering fit it, for each of several candidate cluster counts?
//!
//! ## Design target
//! For every candidate k, k-means (Lloyd) is run several times from independent random initializations,
//! and the final sum of squared errors (SSE) of these runs is averaged. The result is one `(k, mean SSE)`
//! pair per candidate, comparable across k (e.g. to look for an "elbow"). Picking the best k is left to the reader.
//!
//! The samples are given using a raw row-major vector, instead of any high-level arithmetics / matrix crate.
//! All single building blocks of the algorithm are exposed as well, so they can be used (and checked) on their own.
//!
//! ## Randomness
//! The only random decision is "which k distinct samples become the initial centroids". It is made by an
//! [`IndexSampler`]. [`RandomIndexSampler`] wraps any [`rand`] generator, custom implementations make
//! the initialization deterministic.
//!
//! ## Empty clusters
//! A cluster that receives no samples has no mean. By default ([`EmptyClusterPolicy::Propagate`]) its centroid
//! becomes `NaN` and the run is reported as degenerate; [`EmptyClusterPolicy::Reinitialize`] moves it onto a random sample instead.
//!
//! ## Supported primitive types
//! - [`f32`]
//! - [`f64`]
//!
//! ## Example
//! Here is an example sweeping k = 3, 5, 7 with 10 random restarts each:
//!
//! ```rust
//! use kmeans_sweep::*;
//! use rand::prelude::*;
//!
//! let (sample_cnt, sample_dims) = (500, 4);
//!
//! // Generate some random data
//! let mut rnd = StdRng::seed_from_u64(1337);
//! let mut samples = vec![0.0f64;sample_cnt * sample_dims];
//! samples.iter_mut().for_each(|v| *v = rnd.gen());
//!
//! let kmean = KMeans::new(samples, sample_cnt, sample_dims).unwrap();
//! let conf = SweepConfig::build()
//!     .k_values(vec![3, 5, 7])
//!     .restarts_per_k(10)
//!     .max_iter(100)
//!     .convergence_threshold(0.001)
//!     .seed(42)
//!     .build();
//! let report = kmean.sweep(&conf).unwrap();
//!
//! for (k, mean_sse) in report.mean_sse_pairs() {
//!     println!("The average SSE for k= {} is {}", k, mean_sse);
//! }
//! ```
//!
//! ## Example (a single run, using the status event callbacks)
//! ```rust
//! use kmeans_sweep::*;
//! use rand::prelude::*;
//!
//! let (sample_cnt, sample_dims, k, max_iter) = (2000, 8, 4, 100);
//!
//! // Generate some random data
//! let mut samples = vec![0.0f64;sample_cnt * sample_dims];
//! samples.iter_mut().for_each(|v| *v = rand::random());
//!
//! let conf = KMeansConfig::build()
//!     .random_generator(StdRng::seed_from_u64(7))
//!     .init_done(&|_| println!("Initialization completed."))
//!     .iteration_done(&|s, nr, new_distsum|
//!         println!("Iteration {} - SSE: {:.2} -> {:.2}", nr, s.distsum, new_distsum))
//!     .build();
//!
//! let kmean = KMeans::new(samples, sample_cnt, sample_dims).unwrap();
//! let result = kmean.kmeans_lloyd(k, max_iter, KMeans::init_random_sample, &conf).unwrap();
//!
//! println!("Centroids: {:?}", result.centroids);
//! println!("Cluster-Assignments: {:?}", result.assignments);
//! println!("SSE: {}", result.distsum);
//! ```
//!
//! ## Short API-Overview / Description
//! Entry-point of the library is the [`KMeans`] struct, taking over the sample data into its ownership.
//! It is generic over the underlying primitive type used for all calculations.
//!
//! Its instance-methods do not mutate it, so multiple runs can be done in parallel on the same instance:
//! - [`KMeans::assign`], [`KMeans::update_centroids`] and [`KMeans::sse`] are the single steps of an iteration
//! - [`KMeans::kmeans_lloyd`] is one complete run, returning a [`KMeansState`]
//! - [`KMeans::sweep`] is the complete experiment, returning a [`SweepReport`]
//!
//! Datasets can be read from numeric tables with [`io::load_table`], and rescaled with [`KMeans::minmax_normalized`].

#[macro_use] mod helpers;
mod primitive;
mod error;
mod api;
mod kmeans_impl;
mod variants;
mod inits;
mod abort_strategy;
mod sweep;
mod normalize;
pub mod distances;
pub mod io;

pub use abort_strategy::AbortStrategy;
pub use api::{EmptyClusterPolicy, KMeans, KMeansConfig, KMeansConfigBuilder, KMeansState, InitDoneCallbackFn, IterationDoneCallbackFn};
pub use error::{KMeansError, Result};
pub use inits::{IndexSampler, RandomIndexSampler};
pub use primitive::Primitive;
pub use sweep::{SweepConfig, SweepConfigBuilder, SweepReport, SweepResult};
