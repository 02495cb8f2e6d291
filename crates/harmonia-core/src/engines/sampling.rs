//! Reconstruction of spherical harmonic content on a longitude/latitude grid.
//!
//! Cell `(lon, lat)` sits at `theta = 2 pi lon / res.x`, `phi = pi lat / res.y`
//! and owns point `lon * res.y + lat` plus the four quad indices starting at
//! four times that. Quads connect a cell to its next neighbours in longitude
//! and latitude with wraparound on both axes, so the pole rows produce
//! degenerate quads.

use crate::common::constants::QUAD_INDICES_PER_CELL;
use crate::domain::{ComputeResult, Resolution, SamplePoint, ShapeError, VolumeDimensions};
use crate::launch::{dispatch, AccumulationBuffer, AtomicScalar, BlockSizes, Dim3, LaunchConfig};
use crate::numerics::real::Real;
use crate::numerics::special::{coefficient_count, evaluate, evaluate_index};
use rayon::prelude::*;
use tracing::{debug, trace};

/// Grid angles `(theta, phi)` of cell `(longitude, latitude)`.
pub fn cell_angles<T: Real>(resolution: Resolution, longitude: u32, latitude: u32) -> (T, T) {
    let theta = T::TAU() * T::from_u32(longitude) / T::from_u32(resolution.x);
    let phi = T::PI() * T::from_u32(latitude) / T::from_u32(resolution.y);
    (theta, phi)
}

/// Vertex ids of the quad anchored at `(longitude, latitude)`.
pub fn quad_indices(resolution: Resolution, longitude: u32, latitude: u32) -> [u32; 4] {
    let next_longitude = (longitude + 1) % resolution.x;
    let next_latitude = (latitude + 1) % resolution.y;
    let vertex = |lon: u32, lat: u32| lon * resolution.y + lat;
    [
        vertex(longitude, latitude),
        vertex(longitude, next_latitude),
        vertex(next_longitude, next_latitude),
        vertex(next_longitude, latitude),
    ]
}

fn check_grid<T>(
    resolution: Resolution,
    output_points: &[SamplePoint<T>],
    output_indices: &[u32],
) -> ComputeResult<()> {
    ShapeError::check("sample points", resolution.cell_count(), output_points.len())?;
    ShapeError::check(
        "sample indices",
        QUAD_INDICES_PER_CELL * resolution.cell_count(),
        output_indices.len(),
    )
}

/// Writes the angles and quad indices of every cell, one owner per cell.
fn fill_cells<T: Real>(
    resolution: Resolution,
    output_points: &mut [SamplePoint<T>],
    output_indices: &mut [u32],
) {
    output_points
        .par_iter_mut()
        .zip(output_indices.par_chunks_mut(QUAD_INDICES_PER_CELL))
        .enumerate()
        .for_each(|(cell, (point, quad))| {
            let longitude = (cell / resolution.y as usize) as u32;
            let latitude = (cell % resolution.y as usize) as u32;
            let (theta, phi) = cell_angles(resolution, longitude, latitude);
            point.theta = theta;
            point.phi = phi;
            quad.copy_from_slice(&quad_indices(resolution, longitude, latitude));
        });
}

/// Samples the single basis function `Y_l^m` on the grid.
///
/// Point values are overwritten with the basis value.
pub fn sample<T: AtomicScalar>(
    sizes: &BlockSizes,
    l: u32,
    m: i32,
    resolution: Resolution,
    output_points: &mut [SamplePoint<T>],
    output_indices: &mut [u32],
) -> ComputeResult<()> {
    check_grid(resolution, output_points, output_indices)?;
    fill_cells(resolution, output_points, output_indices);

    let extent = Dim3::planar(resolution.x, resolution.y);
    let config = LaunchConfig::for_extent_2d(extent.x, extent.y, sizes);
    debug!(l, m, %resolution, launch = %config, "sampling basis function");

    let points: &[SamplePoint<T>] = output_points;
    let values = AccumulationBuffer::<T>::zeroed(points.len());
    dispatch(&config, extent, |unit| {
        let cell = resolution.cell_index(unit.x, unit.y);
        let point = &points[cell];
        values.add(cell, evaluate(l, m, point.theta, point.phi));
    });

    for (point, value) in output_points.iter_mut().zip(values.into_values()) {
        point.value = value;
    }
    Ok(())
}

/// Samples the expansion `sum_c coefficients[c] Y_c` truncated at `max_l`.
///
/// Point values are accumulated into, one contribution per coefficient.
pub fn sample_sum<T: AtomicScalar>(
    sizes: &BlockSizes,
    max_l: u32,
    resolution: Resolution,
    coefficients: &[T],
    output_points: &mut [SamplePoint<T>],
    output_indices: &mut [u32],
) -> ComputeResult<()> {
    let count = coefficient_count(max_l);
    ShapeError::check("coefficients", count as usize, coefficients.len())?;
    check_grid(resolution, output_points, output_indices)?;

    fill_cells(resolution, output_points, output_indices);

    let extent = Dim3::new(resolution.x, resolution.y, count);
    let config = LaunchConfig::for_extent_3d(extent, sizes);
    debug!(
        max_l,
        coefficients = count,
        %resolution,
        launch = %config,
        "sampling expansion"
    );

    let points: &[SamplePoint<T>] = output_points;
    let values = AccumulationBuffer::<T>::zeroed(points.len());
    dispatch(&config, extent, |unit| {
        let cell = resolution.cell_index(unit.x, unit.y);
        let point = &points[cell];
        values.add(
            cell,
            evaluate_index(unit.z, point.theta, point.phi) * coefficients[unit.z as usize],
        );
    });

    for (point, total) in output_points.iter_mut().zip(values.into_values()) {
        point.value = point.value + total;
    }
    Ok(())
}

/// [`sample`] over a volume of independent grids.
pub fn sample_volume<T: AtomicScalar>(
    sizes: &BlockSizes,
    dimensions: VolumeDimensions,
    l: u32,
    m: i32,
    resolution: Resolution,
    output_points: &mut [SamplePoint<T>],
    output_indices: &mut [u32],
) -> ComputeResult<()> {
    let cells = resolution.cell_count();
    ShapeError::check("sample points", dimensions.volume() * cells, output_points.len())?;
    ShapeError::check(
        "sample indices",
        dimensions.volume() * cells * QUAD_INDICES_PER_CELL,
        output_indices.len(),
    )?;
    if cells == 0 {
        return Ok(());
    }

    debug!(%dimensions, l, m, %resolution, "sampling basis function volume");
    output_points
        .par_chunks_mut(cells)
        .zip(output_indices.par_chunks_mut(cells * QUAD_INDICES_PER_CELL))
        .enumerate()
        .try_for_each(|(volume_index, (points, indices))| {
            trace!(position = ?dimensions.position(volume_index), "sample slice");
            sample(sizes, l, m, resolution, points, indices)
        })
}

/// [`sample_sum`] over a volume of independent expansions and grids.
pub fn sample_sums<T: AtomicScalar>(
    sizes: &BlockSizes,
    dimensions: VolumeDimensions,
    max_l: u32,
    resolution: Resolution,
    coefficients: &[T],
    output_points: &mut [SamplePoint<T>],
    output_indices: &mut [u32],
) -> ComputeResult<()> {
    let count = coefficient_count(max_l) as usize;
    let cells = resolution.cell_count();
    ShapeError::check("coefficients", dimensions.volume() * count, coefficients.len())?;
    ShapeError::check("sample points", dimensions.volume() * cells, output_points.len())?;
    ShapeError::check(
        "sample indices",
        dimensions.volume() * cells * QUAD_INDICES_PER_CELL,
        output_indices.len(),
    )?;
    if cells == 0 {
        return Ok(());
    }

    debug!(%dimensions, max_l, %resolution, "sampling expansion volume");
    output_points
        .par_chunks_mut(cells)
        .zip(output_indices.par_chunks_mut(cells * QUAD_INDICES_PER_CELL))
        .zip(coefficients.par_chunks(count))
        .enumerate()
        .try_for_each(|(volume_index, ((points, indices), expansion))| {
            trace!(position = ?dimensions.position(volume_index), "sample sum slice");
            sample_sum(sizes, max_l, resolution, expansion, points, indices)
        })
}

#[cfg(test)]
mod tests {
    use super::{cell_angles, quad_indices, sample, sample_sum, sample_sums, sample_volume};
    use crate::common::config::LaunchSettings;
    use crate::domain::{Resolution, SamplePoint, ShapeError, VolumeDimensions};
    use crate::launch::BlockSizes;
    use crate::numerics::special::{coefficient_count, evaluate, evaluate_sum};
    use std::f64::consts::{FRAC_PI_2, PI};

    fn grid(resolution: Resolution) -> (Vec<SamplePoint<f64>>, Vec<u32>) {
        (
            vec![SamplePoint::default(); resolution.cell_count()],
            vec![u32::MAX; 4 * resolution.cell_count()],
        )
    }

    fn test_coefficients(max_l: u32) -> Vec<f64> {
        (0..coefficient_count(max_l))
            .map(|index| ((index * 7 + 3) % 11) as f64 / 11.0 - 0.5)
            .collect()
    }

    #[test]
    fn cell_angles_cover_the_sphere_without_the_closing_seam() {
        let resolution = Resolution::new(8, 4);
        assert_eq!(cell_angles::<f64>(resolution, 0, 0), (0.0, 0.0));
        assert_eq!(cell_angles::<f64>(resolution, 2, 2), (FRAC_PI_2, FRAC_PI_2));
        let (theta, phi) = cell_angles::<f64>(resolution, 7, 3);
        assert!((theta - 7.0 * PI / 4.0).abs() <= 1.0e-15);
        assert!((phi - 3.0 * PI / 4.0).abs() <= 1.0e-15);
    }

    #[test]
    fn quads_wrap_on_both_axes() {
        let resolution = Resolution::new(4, 3);
        assert_eq!(quad_indices(resolution, 0, 0), [0, 1, 4, 3]);
        assert_eq!(quad_indices(resolution, 1, 2), [5, 3, 6, 8]);
        assert_eq!(quad_indices(resolution, 3, 2), [11, 9, 0, 2]);
        assert_eq!(quad_indices(resolution, 3, 0), [9, 10, 1, 0]);
    }

    #[test]
    fn sample_writes_every_cell_and_quad() {
        let resolution = Resolution::new(6, 5);
        let (mut points, mut indices) = grid(resolution);
        sample(&BlockSizes::default(), 3, -2, resolution, &mut points, &mut indices)
            .expect("shape");

        for lon in 0..resolution.x {
            for lat in 0..resolution.y {
                let cell = resolution.cell_index(lon, lat);
                let point = points[cell];
                let (theta, phi) = cell_angles::<f64>(resolution, lon, lat);
                assert_eq!((point.theta, point.phi), (theta, phi));
                assert_eq!(point.value, evaluate(3, -2, theta, phi));
                assert_eq!(&indices[4 * cell..4 * cell + 4], &quad_indices(resolution, lon, lat));
            }
        }
        assert!(indices.iter().all(|&index| (index as usize) < resolution.cell_count()));
    }

    #[test]
    fn sample_overwrites_stale_values_with_uneven_blocks() {
        let sizes = BlockSizes::from(LaunchSettings {
            block2d: [5, 3],
            block3d: [2, 2, 2],
        });
        let resolution = Resolution::new(7, 4);
        let mut points = vec![
            SamplePoint {
                value: 9.0,
                theta: 0.0,
                phi: 0.0,
            };
            resolution.cell_count()
        ];
        let mut indices = vec![0_u32; 4 * resolution.cell_count()];
        sample(&sizes, 2, 1, resolution, &mut points, &mut indices).expect("shape");

        for point in &points {
            assert_eq!(point.value, evaluate(2, 1, point.theta, point.phi));
        }
    }

    #[test]
    fn sample_sum_matches_serial_reconstruction() {
        let resolution = Resolution::new(12, 7);
        let max_l = 5;
        let coefficients = test_coefficients(max_l);
        let (mut points, mut indices) = grid(resolution);
        sample_sum(
            &BlockSizes::default(),
            max_l,
            resolution,
            &coefficients,
            &mut points,
            &mut indices,
        )
        .expect("shape");

        for (cell, point) in points.iter().enumerate() {
            let expected = evaluate_sum(max_l, &coefficients, point.theta, point.phi);
            let diff = (point.value - expected).abs();
            assert!(diff <= 1.0e-12, "cell={cell} expected={expected} actual={} diff={diff:e}", point.value);
        }
        assert!(indices.iter().all(|&index| index != u32::MAX));
    }

    #[test]
    fn sample_sum_rejects_wrong_coefficient_count() {
        let resolution = Resolution::new(2, 2);
        let (mut points, mut indices) = grid(resolution);
        let error = sample_sum(
            &BlockSizes::default(),
            2,
            resolution,
            &[1.0; 4],
            &mut points,
            &mut indices,
        )
        .expect_err("coefficient count");
        assert_eq!(error.buffer, "coefficients");
        assert_eq!((error.expected, error.actual), (9, 4));

        let mut short_indices = vec![0; 15];
        assert_eq!(
            sample(&BlockSizes::default(), 0, 0, resolution, &mut points, &mut short_indices),
            Err(ShapeError {
                buffer: "sample indices",
                expected: 16,
                actual: 15,
            })
        );
    }

    #[test]
    fn volume_variants_match_independent_grids() {
        let dimensions = VolumeDimensions::new(1, 2, 2);
        let resolution = Resolution::new(5, 4);
        let max_l = 3;
        let count = coefficient_count(max_l) as usize;
        let cells = resolution.cell_count();
        let coefficients: Vec<f64> = (0..dimensions.volume())
            .flat_map(|slice| test_coefficients(max_l).into_iter().map(move |c| c * (slice + 1) as f64))
            .collect();

        let mut points = vec![SamplePoint::default(); dimensions.volume() * cells];
        let mut indices = vec![0; dimensions.volume() * cells * 4];
        sample_sums(
            &BlockSizes::default(),
            dimensions,
            max_l,
            resolution,
            &coefficients,
            &mut points,
            &mut indices,
        )
        .expect("shape");

        for slice in 0..dimensions.volume() {
            let expansion = &coefficients[slice * count..(slice + 1) * count];
            for point in &points[slice * cells..(slice + 1) * cells] {
                let expected = evaluate_sum(max_l, expansion, point.theta, point.phi);
                assert!((point.value - expected).abs() <= 1.0e-12);
            }
            assert_eq!(&indices[slice * cells * 4..(slice + 1) * cells * 4], &indices[..cells * 4]);
        }

        let mut basis_points = vec![SamplePoint::default(); dimensions.volume() * cells];
        sample_volume(
            &BlockSizes::default(),
            dimensions,
            2,
            1,
            resolution,
            &mut basis_points,
            &mut indices,
        )
        .expect("shape");
        let (mut single, mut single_indices) = grid(resolution);
        sample(&BlockSizes::default(), 2, 1, resolution, &mut single, &mut single_indices)
            .expect("shape");
        for slice in basis_points.chunks(cells) {
            assert_eq!(slice, single.as_slice());
        }
    }
}
