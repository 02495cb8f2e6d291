//! Launch geometry defaults and buffer layout constants shared by the engines.

/// Lanes per block along each axis of two-dimensional dispatches.
pub const DEFAULT_BLOCK_SIZE_2D: [u32; 2] = [16, 16];
/// Lanes per block along each axis of three-dimensional dispatches.
pub const DEFAULT_BLOCK_SIZE_3D: [u32; 3] = [8, 8, 8];

/// Vertex indices emitted per sample grid cell (one quad).
pub const QUAD_INDICES_PER_CELL: usize = 4;
