pub mod coupling;
pub mod projection;
pub mod sampling;

pub use coupling::{coupling_coefficient, product, products};
pub use projection::{calculate_matrices, calculate_matrix, matrix_index};
pub use sampling::{cell_angles, quad_indices, sample, sample_sum, sample_sums, sample_volume};
