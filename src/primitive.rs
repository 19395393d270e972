use num::{Float, NumCast, Zero};
use std::{
    fmt::{Debug, Display, LowerExp},
    iter::Sum,
    ops::{AddAssign, SubAssign},
    str::FromStr,
};

/// Floating point type all calculations (and results) of this crate are done in.
/// Implemented for [`f32`] and [`f64`].
pub trait Primitive: AddAssign + Sum + SubAssign + Zero + Float + NumCast + FromStr
                + PartialOrd + Copy + Default + Display + Debug + Sync + Send + LowerExp + 'static {}
impl Primitive for f32 {}
impl Primitive for f64 {}
