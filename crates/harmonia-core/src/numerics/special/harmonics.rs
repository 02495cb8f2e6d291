//! Real spherical harmonic basis and flat coefficient indexing.
//!
//! Angles follow the graphics convention: `theta` is the azimuth in
//! `[0, 2 pi)` and `phi` the polar angle in `[0, pi]`. Coefficients of a
//! truncated expansion are stored flat, `index = l (l + 1) + m`.

use super::factorial::ln_factorial;
use super::legendre::raise_degree;
use crate::domain::DegreeOrder;
use crate::numerics::real::Real;
use crate::numerics::tolerance::stable_sum;

/// Largest degree fully covered by `coefficient_count` coefficients.
///
/// Zero coefficients report degree zero.
pub const fn maximum_degree(coefficient_count: u32) -> u32 {
    coefficient_count.isqrt().saturating_sub(1)
}

/// Number of coefficients of an expansion truncated at degree `max_l`, `(max_l + 1)^2`.
pub const fn coefficient_count(max_l: u32) -> u32 {
    (max_l + 1) * (max_l + 1)
}

/// Flat index of `(l, m)`. Requires `|m| <= l`.
pub const fn coefficient_index(l: u32, m: i32) -> u32 {
    (l * (l + 1)).wrapping_add_signed(m)
}

/// Inverse of [`coefficient_index`].
pub const fn coefficient_lm(index: u32) -> DegreeOrder {
    let degree = index.isqrt();
    let order = index as i64 - (degree as i64) * (degree as i64) - degree as i64;
    DegreeOrder {
        degree,
        order: order as i32,
    }
}

/// `N_l^m P_m^m(x)`, where `N_l^m = sqrt((2l + 1) (l - m)! / (4 pi (l + m)!))`.
///
/// The normalization and `(2m - 1)!!` are combined as logarithms in `f64`;
/// separately they leave the floating point range once `l` reaches about 90.
fn normalized_seed<T: Real>(l: u32, m: u32, x: T) -> T {
    let ln_normalization = 0.5
        * (f64::from(2 * l + 1).ln() - (4.0 * std::f64::consts::PI).ln()
            + ln_factorial::<f64>(l - m)
            - ln_factorial::<f64>(l + m));
    if m == 0 {
        return T::from_f64(ln_normalization.exp());
    }

    let x = x.as_f64();
    let root = (1.0 - x * x).max(0.0).sqrt();
    if root == 0.0 {
        return T::zero();
    }

    // (2m - 1)!! = (2m)! / (2^m m!)
    let ln_double_factorial =
        ln_factorial::<f64>(2 * m) - f64::from(m) * std::f64::consts::LN_2 - ln_factorial::<f64>(m);
    let magnitude = (ln_normalization + ln_double_factorial + f64::from(m) * root.ln()).exp();
    // Condon-Shortley phase
    T::from_f64(if m % 2 == 0 { magnitude } else { -magnitude })
}

/// Real spherical harmonic `Y_l^m(theta, phi)`.
///
/// Positive orders use `cos(m theta)`, negative orders `sin(|m| theta)`, both
/// scaled by `sqrt(2)`; order zero is the bare zonal harmonic.
pub fn evaluate<T: Real>(l: u32, m: i32, theta: T, phi: T) -> T {
    let abs_m = m.unsigned_abs();
    debug_assert!(abs_m <= l, "evaluate requires |m| <= l (l={l}, m={m})");

    let x = phi.cos();
    let legendre = raise_degree(l, abs_m, x, normalized_seed(l, abs_m, x));

    match m.signum() {
        1 => T::SQRT_2() * (T::from_u32(abs_m) * theta).cos() * legendre,
        -1 => T::SQRT_2() * (T::from_u32(abs_m) * theta).sin() * legendre,
        _ => legendre,
    }
}

/// [`evaluate`] addressed by flat coefficient index.
pub fn evaluate_index<T: Real>(index: u32, theta: T, phi: T) -> T {
    let DegreeOrder { degree, order } = coefficient_lm(index);
    evaluate(degree, order, theta, phi)
}

/// Serial reconstruction of a truncated expansion at one direction.
///
/// This is the reference the parallel engines are checked against.
/// `coefficients` must hold at least `coefficient_count(max_l)` values.
pub fn evaluate_sum<T: Real>(max_l: u32, coefficients: &[T], theta: T, phi: T) -> T {
    let mut sum = T::zero();
    for l in 0..=max_l {
        for m in -(l as i32)..=(l as i32) {
            let index = coefficient_index(l, m) as usize;
            sum = sum + evaluate(l, m, theta, phi) * coefficients[index];
        }
    }
    sum
}

/// Euclidean distance between two coefficient vectors.
///
/// Per-degree energy is rotation invariant, so this doubles as a shape
/// similarity measure. Extra trailing coefficients on either side are ignored.
pub fn compare<T: Real>(lhs_coefficients: &[T], rhs_coefficients: &[T]) -> T {
    debug_assert_eq!(lhs_coefficients.len(), rhs_coefficients.len());

    stable_sum(
        lhs_coefficients
            .iter()
            .zip(rhs_coefficients)
            .map(|(&lhs, &rhs)| (lhs - rhs) * (lhs - rhs)),
    )
    .sqrt()
}
