use crate::numerics::real::Real;

/// Associated Legendre polynomial `P_l^m(x)` including the Condon-Shortley phase.
///
/// Evaluated by upward recurrence in `l` from the closed forms of `P_m^m` and
/// `P_{m+1}^m`. Requires `m <= l` and `x` in `[-1, 1]`; neither is checked in
/// release builds.
pub fn associated_legendre<T: Real>(l: u32, m: u32, x: T) -> T {
    debug_assert!(m <= l, "associated_legendre requires m <= l (l={l}, m={m})");

    // P_m^m = (-1)^m (2m - 1)!! (1 - x^2)^(m/2)
    let mut p_mm = T::one();
    if m > 0 {
        let root = (T::one() - x * x).max(T::zero()).sqrt();
        let mut odd = T::one();
        for _ in 0..m {
            p_mm = -p_mm * odd * root;
            odd = odd + T::from_u32(2);
        }
    }

    raise_degree(l, m, x, p_mm)
}

/// Carries `P_m^m(x)`, or any constant multiple of it, up to degree `l` with
/// the three-term recurrence. The result carries the same multiple.
pub(super) fn raise_degree<T: Real>(l: u32, m: u32, x: T, p_mm: T) -> T {
    if l == m {
        return p_mm;
    }

    let p_m1m = x * T::from_u32(2 * m + 1) * p_mm;
    if l == m + 1 {
        return p_m1m;
    }

    let mut p_lm2 = p_mm;
    let mut p_lm1 = p_m1m;
    for ll in (m + 2)..=l {
        let p_ll = (x * T::from_u32(2 * ll - 1) * p_lm1 - T::from_u32(ll + m - 1) * p_lm2)
            / T::from_u32(ll - m);
        p_lm2 = p_lm1;
        p_lm1 = p_ll;
    }

    p_lm1
}
