use crate::{KMeansError, Primitive, Result};

#[inline(always)]
fn ensure_same_dims<T>(a: &[T], b: &[T]) -> Result<()> {
    if a.len() != b.len() {
        return Err(KMeansError::DimensionMismatch { expected: a.len(), found: b.len() });
    }
    Ok(())
}

/// Squared euclidean distance (`sum((a_i - b_i)^2)`) between two points of identical dimensionality.
///
/// ## Errors
/// [`KMeansError::DimensionMismatch`] if `a` and `b` differ in length.
#[inline(always)]
pub fn squared_euclidean_distance<T: Primitive>(a: &[T], b: &[T]) -> Result<T> {
    ensure_same_dims(a, b)?;
    Ok(a.iter().zip(b.iter())
        .map(|(&av, &bv)| av - bv)          // <a> - <b>
        .map(|v| v * v)                     // <vec_components> ^2
        .sum())
}

/// Euclidean (L2) distance between two points of identical dimensionality.
///
/// ## Errors
/// [`KMeansError::DimensionMismatch`] if `a` and `b` differ in length.
#[inline(always)]
pub fn euclidean_distance<T: Primitive>(a: &[T], b: &[T]) -> Result<T> {
    squared_euclidean_distance(a, b).map(|d| d.sqrt())
}
