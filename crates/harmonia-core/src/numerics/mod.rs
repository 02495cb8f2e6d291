pub mod real;
pub mod special;
pub mod tolerance;

pub use real::Real;
pub use tolerance::{
    compare_with_policy_tolerance, format_numeric_for_policy, load_numeric_tolerance_policy,
    stable_sum, NumericTolerance, NumericToleranceCategory, NumericTolerancePolicy,
    NumericTolerancePolicyError, PolicyToleranceComparison, NUMERIC_TOLERANCE_POLICY_PATH,
};
