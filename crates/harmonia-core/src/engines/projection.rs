//! Batch projection of directions onto the real spherical harmonic basis.

use crate::domain::{ComputeResult, Direction, ShapeError, VolumeDimensions};
use crate::launch::{dispatch, AccumulationBuffer, AtomicScalar, BlockSizes, Dim3, LaunchConfig};
use crate::numerics::special::{coefficient_count, evaluate_index};
use rayon::prelude::*;
use tracing::{debug, trace};

/// Column-major cell `(vector_index, coefficient_index)`; the vector index varies fastest.
pub const fn matrix_index(vectors_size: usize, vector_index: usize, coefficient_index: usize) -> usize {
    vector_index + vectors_size * coefficient_index
}

/// Adds `Y_c(vector)` into cell `(v, c)` of `output_matrix` for every vector
/// `v` and coefficient `c` up to `max_l`.
///
/// `output_matrix` holds `vectors.len() * coefficient_count(max_l)` values and
/// is accumulated into, not overwritten.
pub fn calculate_matrix<T, V>(
    sizes: &BlockSizes,
    max_l: u32,
    vectors: &[V],
    output_matrix: &mut [T],
) -> ComputeResult<()>
where
    T: AtomicScalar,
    V: Direction<T> + Sync,
{
    let coefficients = coefficient_count(max_l);
    let vectors_size = vectors.len();
    ShapeError::check(
        "projection matrix",
        vectors_size * coefficients as usize,
        output_matrix.len(),
    )?;

    let extent = Dim3::planar(vectors_size as u32, coefficients);
    let config = LaunchConfig::for_extent_2d(extent.x, extent.y, sizes);
    debug!(
        max_l,
        coefficients,
        vectors = vectors_size,
        launch = %config,
        "dispatching projection matrix"
    );

    let cells = AccumulationBuffer::<T>::zeroed(output_matrix.len());
    dispatch(&config, extent, |unit| {
        let vector = &vectors[unit.x as usize];
        cells.add(
            matrix_index(vectors_size, unit.x as usize, unit.y as usize),
            evaluate_index(unit.y, vector.theta(), vector.phi()),
        );
    });
    cells.add_into(output_matrix);

    Ok(())
}

/// [`calculate_matrix`] over a volume of independent batches.
///
/// Batch `volume_index(x, y, z)` reads `vectors_size` directions and writes one
/// matrix at the matching offsets of `vectors` and `output_matrices`.
pub fn calculate_matrices<T, V>(
    sizes: &BlockSizes,
    dimensions: VolumeDimensions,
    max_l: u32,
    vectors_size: usize,
    vectors: &[V],
    output_matrices: &mut [T],
) -> ComputeResult<()>
where
    T: AtomicScalar,
    V: Direction<T> + Sync,
{
    let matrix_len = vectors_size * coefficient_count(max_l) as usize;
    ShapeError::check("vectors", dimensions.volume() * vectors_size, vectors.len())?;
    ShapeError::check(
        "projection matrices",
        dimensions.volume() * matrix_len,
        output_matrices.len(),
    )?;
    if vectors_size == 0 {
        return Ok(());
    }

    debug!(%dimensions, max_l, vectors_size, "dispatching projection volume");
    output_matrices
        .par_chunks_mut(matrix_len)
        .zip(vectors.par_chunks(vectors_size))
        .enumerate()
        .try_for_each(|(volume_index, (matrix, batch))| {
            trace!(position = ?dimensions.position(volume_index), "projection slice");
            calculate_matrix(sizes, max_l, batch, matrix)
        })
}
