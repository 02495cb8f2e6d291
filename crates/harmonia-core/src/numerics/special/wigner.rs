use super::clebsch_gordan::clebsch_gordan_doubled;
use super::sign::parity_sign;
use crate::numerics::real::Real;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wigner3jInput {
    pub two_j1: i32,
    pub two_j2: i32,
    pub two_j3: i32,
    pub two_m1: i32,
    pub two_m2: i32,
    pub two_m3: i32,
}

impl Wigner3jInput {
    pub fn new(
        two_j1: i32,
        two_j2: i32,
        two_j3: i32,
        two_m1: i32,
        two_m2: i32,
        two_m3: i32,
    ) -> Self {
        Self {
            two_j1,
            two_j2,
            two_j3,
            two_m1,
            two_m2,
            two_m3,
        }
    }
}

/// Computes the Wigner 3j symbol using doubled quantum numbers.
///
/// All `two_*` values represent `2*j` or `2*m` (e.g., `two_j=3` means `j=3/2`).
/// The symbol is obtained from the Clebsch-Gordan coefficient:
/// `(j1 j2 j3; m1 m2 m3) = (-1)^(j1-j2-m3) / sqrt(2 j3 + 1) <j1 m1; j2 m2 | j3 -m3>`.
pub fn wigner_3j<T: Real>(input: Wigner3jInput) -> T {
    let Wigner3jInput {
        two_j1,
        two_j2,
        two_j3,
        two_m1,
        two_m2,
        two_m3,
    } = input;

    let coupling = clebsch_gordan_doubled::<T>(two_j1, two_j2, two_j3, two_m1, two_m2, -two_m3);
    if coupling == T::zero() {
        return coupling;
    }

    // j1 - j2 - m3 is integral whenever the coefficient survived the selection rules.
    let phase = parity_sign::<T>((two_j1 - two_j2 - two_m3) / 2);
    phase * coupling / T::from_i32(two_j3 + 1).sqrt()
}
