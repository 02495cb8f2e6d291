use super::factorial::ln_factorial;
use super::sign::parity_sign;
use crate::numerics::real::Real;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClebschGordanInput {
    pub j1: u32,
    pub j2: u32,
    pub j3: u32,
    pub m1: i32,
    pub m2: i32,
    pub m3: i32,
}

impl ClebschGordanInput {
    pub fn new(j1: u32, j2: u32, j3: u32, m1: i32, m2: i32, m3: i32) -> Self {
        Self {
            j1,
            j2,
            j3,
            m1,
            m2,
            m3,
        }
    }
}

/// Clebsch-Gordan coefficient `<j1 m1; j2 m2 | j3 m3>` for integer angular momenta.
///
/// Returns zero when the triangle rule, `m1 + m2 = m3` or any `|mi| <= ji`
/// fails.
pub fn clebsch_gordan<T: Real>(input: ClebschGordanInput) -> T {
    let ClebschGordanInput {
        j1,
        j2,
        j3,
        m1,
        m2,
        m3,
    } = input;

    clebsch_gordan_doubled(
        2 * j1 as i32,
        2 * j2 as i32,
        2 * j3 as i32,
        2 * m1,
        2 * m2,
        2 * m3,
    )
}

/// Clebsch-Gordan coefficient from doubled quantum numbers (`two_j = 3` is `j = 3/2`).
///
/// Racah's closed form with every factorial taken in log space, so the
/// alternating sum never forms a factorial directly.
pub fn clebsch_gordan_doubled<T: Real>(
    two_j1: i32,
    two_j2: i32,
    two_j3: i32,
    two_m1: i32,
    two_m2: i32,
    two_m3: i32,
) -> T {
    if two_j1 < 0 || two_j2 < 0 || two_j3 < 0 {
        return T::zero();
    }

    if two_m1 + two_m2 != two_m3 {
        return T::zero();
    }

    if two_m1.abs() > two_j1 || two_m2.abs() > two_j2 || two_m3.abs() > two_j3 {
        return T::zero();
    }

    if (two_j1 - two_m1).rem_euclid(2) != 0
        || (two_j2 - two_m2).rem_euclid(2) != 0
        || (two_j3 - two_m3).rem_euclid(2) != 0
    {
        return T::zero();
    }

    if (two_j1 + two_j2 + two_j3).rem_euclid(2) != 0 {
        return T::zero();
    }

    if two_j1 + two_j2 < two_j3 || two_j1 + two_j3 < two_j2 || two_j2 + two_j3 < two_j1 {
        return T::zero();
    }

    // <j1 0; j2 0 | j3 0> is exactly zero for odd j1 + j2 + j3.
    if two_m1 == 0 && two_m2 == 0 && ((two_j1 + two_j2 + two_j3) / 2) % 2 == 1 {
        return T::zero();
    }

    // Every combination below is even once the selection rules hold.
    let half = |doubled: i32| doubled / 2;
    let j1_plus_j2_minus_j3 = half(two_j1 + two_j2 - two_j3);
    let j1_minus_m1 = half(two_j1 - two_m1);
    let j2_plus_m2 = half(two_j2 + two_m2);
    let j3_minus_j2_plus_m1 = half(two_j3 - two_j2 + two_m1);
    let j3_minus_j1_minus_m2 = half(two_j3 - two_j1 - two_m2);

    let lf = |n: i32| ln_factorial::<T>(n as u32);

    let log_triangle = lf(j1_plus_j2_minus_j3)
        + lf(half(two_j1 - two_j2 + two_j3))
        + lf(half(two_j2 + two_j3 - two_j1))
        - lf(half(two_j1 + two_j2 + two_j3) + 1);
    let log_projections = lf(half(two_j1 + two_m1))
        + lf(j1_minus_m1)
        + lf(j2_plus_m2)
        + lf(half(two_j2 - two_m2))
        + lf(half(two_j3 + two_m3))
        + lf(half(two_j3 - two_m3));
    let log_prefactor = T::from_f64(0.5)
        * (T::from_i32(two_j3 + 1).ln() + log_triangle + log_projections);

    let k_min = 0.max(-j3_minus_j2_plus_m1).max(-j3_minus_j1_minus_m2);
    let k_max = j1_plus_j2_minus_j3.min(j1_minus_m1).min(j2_plus_m2);

    let mut sum = T::zero();
    for k in k_min..=k_max {
        let log_denominator = lf(k)
            + lf(j1_plus_j2_minus_j3 - k)
            + lf(j1_minus_m1 - k)
            + lf(j2_plus_m2 - k)
            + lf(j3_minus_j2_plus_m1 + k)
            + lf(j3_minus_j1_minus_m2 + k);
        sum = sum + parity_sign::<T>(k) * (log_prefactor - log_denominator).exp();
    }

    sum
}
