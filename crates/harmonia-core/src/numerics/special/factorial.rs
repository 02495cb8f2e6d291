use crate::numerics::real::Real;

/// Largest `n` whose factorial is finite in `f64`.
pub const MAX_FINITE_FACTORIAL: u32 = 170;

/// Below this argument `ln(n!)` is accumulated term by term; above it the
/// Stirling series is already accurate to machine precision.
const LOG_SUM_LIMIT: u32 = 32;

/// `n!` in the requested precision. Overflows to infinity past the range of `T`.
pub fn factorial<T: Real>(n: u32) -> T {
    if n > MAX_FINITE_FACTORIAL {
        return T::infinity();
    }

    let mut value = T::one();
    for k in 2..=n {
        value = value * T::from_u32(k);
    }
    value
}

/// `ln(n!)`, finite for every `n`.
pub fn ln_factorial<T: Real>(n: u32) -> T {
    if n <= LOG_SUM_LIMIT {
        let mut value = T::zero();
        for k in 2..=n {
            value = value + T::from_u32(k).ln();
        }
        return value;
    }

    // Stirling series: n ln n - n + ln(2 pi n) / 2 + 1/(12n) - 1/(360n^3) + 1/(1260n^5).
    let n = T::from_u32(n);
    let inverse = n.recip();
    let inverse_squared = inverse * inverse;
    let correction = inverse
        * (T::from_f64(1.0 / 12.0)
            - inverse_squared * (T::from_f64(1.0 / 360.0) - inverse_squared / T::from_f64(1260.0)));

    n * n.ln() - n + T::from_f64(0.5) * (T::TAU() * n).ln() + correction
}

/// Binomial coefficient `n! / (m! (n - m)!)`.
///
/// Requires `m <= n`; this is not checked.
pub fn choose<T: Real>(n: u32, m: u32) -> T {
    debug_assert!(m <= n, "choose requires m <= n (n={n}, m={m})");

    let numerator = factorial::<T>(n);
    if numerator.is_finite() {
        // The ratio is integral; rounding recovers the ulps lost in the factorials.
        return (numerator / (factorial::<T>(m) * factorial::<T>(n - m))).round();
    }

    ln_choose::<T>(n, m).exp().round()
}

/// `ln(choose(n, m))`, evaluated with the smaller of `m` and `n - m`.
///
/// Requires `m <= n`; this is not checked.
pub fn ln_choose<T: Real>(n: u32, m: u32) -> T {
    debug_assert!(m <= n, "ln_choose requires m <= n (n={n}, m={m})");

    if m == n || m == 0 {
        return T::zero();
    }

    let m = m.min(n - m);
    ln_factorial::<T>(n) - ln_factorial::<T>(m) - ln_factorial::<T>(n - m)
}
