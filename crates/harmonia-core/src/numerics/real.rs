use num_traits::{Float, FloatConst};
use std::fmt::Debug;

/// Floating-point precision the special functions and engines are generic over.
///
/// Conversions go through `f64`, which represents every `f32` and every
/// integer argument this crate produces exactly.
pub trait Real: Float + FloatConst + Send + Sync + Debug + 'static {
    fn from_f64(value: f64) -> Self;

    fn as_f64(self) -> f64;

    fn from_u32(value: u32) -> Self {
        Self::from_f64(f64::from(value))
    }

    fn from_i32(value: i32) -> Self {
        Self::from_f64(f64::from(value))
    }

    /// Converts between two precisions, e.g. compute precision to atomics precision.
    fn cast<Other: Real>(self) -> Other {
        Other::from_f64(self.as_f64())
    }
}

impl Real for f32 {
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn as_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Real for f64 {
    fn from_f64(value: f64) -> Self {
        value
    }

    fn as_f64(self) -> f64 {
        self
    }
}
