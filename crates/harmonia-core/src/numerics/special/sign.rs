use crate::numerics::real::Real;

/// -1, 0 or 1 according to the sign of `value`.
pub fn sign<T: PartialOrd + Default>(value: T) -> i32 {
    let zero = T::default();
    i32::from(zero < value) - i32::from(value < zero)
}

/// `(-1)^k` for any integer `k`.
pub fn parity_sign<T: Real>(k: i32) -> T {
    if k.rem_euclid(2) == 0 {
        T::one()
    } else {
        -T::one()
    }
}
