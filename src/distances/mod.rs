mod euclideandistance;

pub use euclideandistance::{euclidean_distance, squared_euclidean_distance};
