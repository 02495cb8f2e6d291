//! Triple-product coupling of two expansions in coefficient space.
//!
//! Coefficients arrive in the storage precision `P`; Clebsch-Gordan factors
//! and the accumulation run in the atomics precision `A`.

use crate::domain::{ComputeResult, DegreeOrder, ShapeError, VolumeDimensions};
use crate::launch::{dispatch, AccumulationBuffer, AtomicScalar, BlockSizes, Dim3, LaunchConfig};
use crate::numerics::real::Real;
use crate::numerics::special::{clebsch_gordan, coefficient_lm, ClebschGordanInput};
use rayon::prelude::*;
use tracing::{debug, trace};

/// Gaunt-style weight of the `(lhs, rhs) -> out` term.
///
/// `sqrt((2 l1 + 1)(2 l2 + 1) / (4 pi (2 l3 + 1))) <l1 0; l2 0 | l3 0> <l1 m1; l2 m2 | l3 m3>`.
pub fn coupling_coefficient<A: Real>(lhs: DegreeOrder, rhs: DegreeOrder, out: DegreeOrder) -> A {
    let parity = clebsch_gordan::<A>(ClebschGordanInput::new(
        lhs.degree, rhs.degree, out.degree, 0, 0, 0,
    ));
    if parity == A::zero() {
        return parity;
    }

    let projection = clebsch_gordan::<A>(ClebschGordanInput::new(
        lhs.degree,
        rhs.degree,
        out.degree,
        lhs.order,
        rhs.order,
        out.order,
    ));
    let weight = (A::from_u32(2 * lhs.degree + 1) * A::from_u32(2 * rhs.degree + 1)
        / (A::from_u32(4) * A::PI() * A::from_u32(2 * out.degree + 1)))
    .sqrt();

    weight * parity * projection
}

/// Adds the coupling of `lhs_coefficients` and `rhs_coefficients` into
/// `out_coefficients`; all three hold the same number of coefficients.
pub fn product<P, A>(
    sizes: &BlockSizes,
    lhs_coefficients: &[P],
    rhs_coefficients: &[P],
    out_coefficients: &mut [A],
) -> ComputeResult<()>
where
    P: Real,
    A: AtomicScalar,
{
    let count = lhs_coefficients.len();
    ShapeError::check("rhs coefficients", count, rhs_coefficients.len())?;
    ShapeError::check("out coefficients", count, out_coefficients.len())?;

    let extent = Dim3::new(count as u32, count as u32, count as u32);
    let config = LaunchConfig::for_extent_3d(extent, sizes);
    debug!(
        coefficients = count,
        units = extent.volume(),
        launch = %config,
        "dispatching coefficient product"
    );

    let totals = AccumulationBuffer::<A>::zeroed(count);
    dispatch(&config, extent, |unit| {
        let coupling = coupling_coefficient::<A>(
            coefficient_lm(unit.x),
            coefficient_lm(unit.y),
            coefficient_lm(unit.z),
        );
        if coupling == A::zero() {
            return;
        }

        let lhs = lhs_coefficients[unit.x as usize].cast::<A>();
        let rhs = rhs_coefficients[unit.y as usize].cast::<A>();
        totals.add(unit.z as usize, coupling * lhs * rhs);
    });
    totals.add_into(out_coefficients);

    Ok(())
}

/// [`product`] over a volume of independent coefficient triples, each
/// `coefficient_count` long at the same offset in all three buffers.
pub fn products<P, A>(
    sizes: &BlockSizes,
    dimensions: VolumeDimensions,
    coefficient_count: usize,
    lhs_coefficients: &[P],
    rhs_coefficients: &[P],
    out_coefficients: &mut [A],
) -> ComputeResult<()>
where
    P: Real,
    A: AtomicScalar,
{
    let total = dimensions.volume() * coefficient_count;
    ShapeError::check("lhs coefficients", total, lhs_coefficients.len())?;
    ShapeError::check("rhs coefficients", total, rhs_coefficients.len())?;
    ShapeError::check("out coefficients", total, out_coefficients.len())?;
    if coefficient_count == 0 {
        return Ok(());
    }

    debug!(%dimensions, coefficient_count, "dispatching coefficient product volume");
    out_coefficients
        .par_chunks_mut(coefficient_count)
        .zip(lhs_coefficients.par_chunks(coefficient_count))
        .zip(rhs_coefficients.par_chunks(coefficient_count))
        .enumerate()
        .try_for_each(|(volume_index, ((out, lhs), rhs))| {
            trace!(position = ?dimensions.position(volume_index), "product slice");
            product(sizes, lhs, rhs, out)
        })
}
