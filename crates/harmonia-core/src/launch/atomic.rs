//! Lock-free floating-point accumulation cells.
//!
//! Concurrent units of one dispatch add into shared output cells. The cells
//! hold the IEEE bit pattern in an unsigned atomic and add through a
//! compare-exchange loop, so the final value is independent of which units
//! ran first up to floating-point reassociation.

use crate::numerics::real::Real;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// A precision with a lock-free atomic add.
pub trait AtomicScalar: Real {
    type Cell: Send + Sync;

    fn new_cell(value: Self) -> Self::Cell;

    /// Adds `value` to the cell and returns the previous contents.
    fn fetch_add(cell: &Self::Cell, value: Self) -> Self;

    fn load(cell: &Self::Cell) -> Self;

    fn into_value(cell: Self::Cell) -> Self;
}

#[derive(Debug, Default)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    pub fn fetch_add(&self, value: f32, order: Ordering) -> f32 {
        let previous = self
            .0
            .fetch_update(order, Ordering::Relaxed, |bits| {
                Some((f32::from_bits(bits) + value).to_bits())
            })
            .unwrap_or_else(|bits| bits);
        f32::from_bits(previous)
    }

    pub fn load(&self, order: Ordering) -> f32 {
        f32::from_bits(self.0.load(order))
    }

    pub fn into_inner(self) -> f32 {
        f32::from_bits(self.0.into_inner())
    }
}

#[derive(Debug, Default)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    pub fn fetch_add(&self, value: f64, order: Ordering) -> f64 {
        let previous = self
            .0
            .fetch_update(order, Ordering::Relaxed, |bits| {
                Some((f64::from_bits(bits) + value).to_bits())
            })
            .unwrap_or_else(|bits| bits);
        f64::from_bits(previous)
    }

    pub fn load(&self, order: Ordering) -> f64 {
        f64::from_bits(self.0.load(order))
    }

    pub fn into_inner(self) -> f64 {
        f64::from_bits(self.0.into_inner())
    }
}

impl AtomicScalar for f32 {
    type Cell = AtomicF32;

    fn new_cell(value: Self) -> Self::Cell {
        AtomicF32::new(value)
    }

    fn fetch_add(cell: &Self::Cell, value: Self) -> Self {
        cell.fetch_add(value, Ordering::Relaxed)
    }

    fn load(cell: &Self::Cell) -> Self {
        cell.load(Ordering::Relaxed)
    }

    fn into_value(cell: Self::Cell) -> Self {
        cell.into_inner()
    }
}

impl AtomicScalar for f64 {
    type Cell = AtomicF64;

    fn new_cell(value: Self) -> Self::Cell {
        AtomicF64::new(value)
    }

    fn fetch_add(cell: &Self::Cell, value: Self) -> Self {
        cell.fetch_add(value, Ordering::Relaxed)
    }

    fn load(cell: &Self::Cell) -> Self {
        cell.load(Ordering::Relaxed)
    }

    fn into_value(cell: Self::Cell) -> Self {
        cell.into_inner()
    }
}

/// Zero-initialised cells shared by every unit of one dispatch.
///
/// After the dispatch joins, [`AccumulationBuffer::add_into`] adds the totals
/// onto the caller's buffer, so pre-filled outputs keep accumulating across
/// calls.
pub struct AccumulationBuffer<A: AtomicScalar> {
    cells: Vec<A::Cell>,
}

impl<A: AtomicScalar> AccumulationBuffer<A> {
    pub fn zeroed(len: usize) -> Self {
        Self {
            cells: (0..len).map(|_| A::new_cell(A::zero())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn add(&self, index: usize, value: A) {
        A::fetch_add(&self.cells[index], value);
    }

    pub fn load(&self, index: usize) -> A {
        A::load(&self.cells[index])
    }

    pub fn into_values(self) -> impl Iterator<Item = A> {
        self.cells.into_iter().map(A::into_value)
    }

    pub fn add_into(self, target: &mut [A]) {
        debug_assert_eq!(self.cells.len(), target.len());
        for (slot, total) in target.iter_mut().zip(self.into_values()) {
            *slot = *slot + total;
        }
    }
}
