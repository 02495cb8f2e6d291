//! Launch geometry and guarded data-parallel dispatch.
//!
//! An engine describes its work as an extent of up to three axes. The extent
//! is covered by a grid of fixed-size blocks (ceiling division per axis), so
//! the trailing blocks may contain lanes past the extent; [`dispatch`] skips
//! those lanes. Blocks run in parallel on the rayon pool and the lanes of one
//! block run in order on the worker that picked the block up.

pub mod atomic;

pub use atomic::{AccumulationBuffer, AtomicF32, AtomicF64, AtomicScalar};

use crate::common::config::LaunchSettings;
use rayon::prelude::*;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dim3 {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Dim3 {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    pub const fn planar(x: u32, y: u32) -> Self {
        Self { x, y, z: 1 }
    }

    pub const fn volume(&self) -> u64 {
        self.x as u64 * self.y as u64 * self.z as u64
    }

    /// True when every axis of `self` lies below the matching axis of `extent`.
    pub const fn is_within(&self, extent: Dim3) -> bool {
        self.x < extent.x && self.y < extent.y && self.z < extent.z
    }
}

impl Default for Dim3 {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl fmt::Display for Dim3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Block shapes used by the two- and three-dimensional dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSizes {
    pub planar: Dim3,
    pub volumetric: Dim3,
}

impl BlockSizes {
    pub fn block_size_2d(&self) -> Dim3 {
        self.planar
    }

    pub fn block_size_3d(&self) -> Dim3 {
        self.volumetric
    }
}

impl From<LaunchSettings> for BlockSizes {
    fn from(settings: LaunchSettings) -> Self {
        let [px, py] = settings.block2d;
        let [vx, vy, vz] = settings.block3d;
        Self {
            planar: Dim3::planar(px.max(1), py.max(1)),
            volumetric: Dim3::new(vx.max(1), vy.max(1), vz.max(1)),
        }
    }
}

impl Default for BlockSizes {
    fn default() -> Self {
        Self::from(LaunchSettings::default())
    }
}

/// Blocks needed to cover `extent` with `block`, rounding up per axis.
pub const fn grid_size(extent: Dim3, block: Dim3) -> Dim3 {
    Dim3::new(
        extent.x.div_ceil(block.x),
        extent.y.div_ceil(block.y),
        extent.z.div_ceil(block.z),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchConfig {
    pub grid: Dim3,
    pub block: Dim3,
}

impl LaunchConfig {
    pub fn for_extent_2d(x: u32, y: u32, sizes: &BlockSizes) -> Self {
        Self::covering(Dim3::planar(x, y), sizes.block_size_2d())
    }

    pub fn for_extent_3d(extent: Dim3, sizes: &BlockSizes) -> Self {
        Self::covering(extent, sizes.block_size_3d())
    }

    pub fn covering(extent: Dim3, block: Dim3) -> Self {
        Self {
            grid: grid_size(extent, block),
            block,
        }
    }

    /// Lanes launched, including the guarded ones past the extent.
    pub const fn unit_count(&self) -> u64 {
        self.grid.volume() * self.block.volume()
    }
}

impl fmt::Display for LaunchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grid={} block={}", self.grid, self.block)
    }
}

/// Runs `body` once for every global index inside `extent`.
///
/// `config` must cover `extent`; lanes of the trailing blocks that fall
/// outside it are no-ops. No ordering holds between calls of `body`.
pub fn dispatch<F>(config: &LaunchConfig, extent: Dim3, body: F)
where
    F: Fn(Dim3) + Sync,
{
    debug_assert!(
        config.grid.x as u64 * config.block.x as u64 >= extent.x as u64
            && config.grid.y as u64 * config.block.y as u64 >= extent.y as u64
            && config.grid.z as u64 * config.block.z as u64 >= extent.z as u64,
        "launch {config} does not cover extent {extent}"
    );

    let grid = config.grid;
    let block = config.block;
    let blocks_per_row = grid.x as u64;
    let blocks_per_slice = grid.x as u64 * grid.y as u64;

    (0..grid.volume()).into_par_iter().for_each(|block_index| {
        let block_z = (block_index / blocks_per_slice) as u32;
        let block_y = ((block_index % blocks_per_slice) / blocks_per_row) as u32;
        let block_x = (block_index % blocks_per_row) as u32;

        for lane_z in 0..block.z {
            for lane_y in 0..block.y {
                for lane_x in 0..block.x {
                    let global = Dim3::new(
                        block_x * block.x + lane_x,
                        block_y * block.y + lane_y,
                        block_z * block.z + lane_z,
                    );
                    if global.is_within(extent) {
                        body(global);
                    }
                }
            }
        }
    });
}
