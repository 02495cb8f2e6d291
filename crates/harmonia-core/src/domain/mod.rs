pub mod errors;

pub use errors::{ComputeResult, ErrorKind, HarmoniaError, ShapeError};

use crate::numerics::real::Real;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Degree `l` and order `m` of one basis function, `|m| <= l`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DegreeOrder {
    pub degree: u32,
    pub order: i32,
}

impl DegreeOrder {
    pub const fn new(degree: u32, order: i32) -> Self {
        Self { degree, order }
    }
}

impl Display for DegreeOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "(l={}, m={})", self.degree, self.order)
    }
}

/// Anything that can be read as an evaluation direction.
pub trait Direction<T> {
    /// Azimuth.
    fn theta(&self) -> T;
    /// Polar angle.
    fn phi(&self) -> T;
}

/// Spherical coordinates `(radius, theta, phi)` with `theta` the azimuth and
/// `phi` the polar angle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct SphericalVector<T> {
    #[serde(default)]
    pub radius: T,
    pub theta: T,
    pub phi: T,
}

impl<T: Real> SphericalVector<T> {
    pub fn new(radius: T, theta: T, phi: T) -> Self {
        Self { radius, theta, phi }
    }

    /// Converts a Cartesian vector; the zero vector maps to all zeros.
    pub fn from_cartesian(x: T, y: T, z: T) -> Self {
        let radius = (x * x + y * y + z * z).sqrt();
        if radius == T::zero() {
            return Self::new(T::zero(), T::zero(), T::zero());
        }

        let cos_polar = (z / radius).max(-T::one()).min(T::one());
        Self::new(radius, y.atan2(x), cos_polar.acos())
    }
}

impl<T: Copy> Direction<T> for SphericalVector<T> {
    fn theta(&self) -> T {
        self.theta
    }

    fn phi(&self) -> T {
        self.phi
    }
}

/// Packed `(radius, theta, phi)` triple.
impl<T: Copy> Direction<T> for [T; 3] {
    fn theta(&self) -> T {
        self[1]
    }

    fn phi(&self) -> T {
        self[2]
    }
}

/// One cell of a longitude/latitude sample grid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SamplePoint<T> {
    pub value: T,
    pub theta: T,
    pub phi: T,
}

/// Longitude (`x`) by latitude (`y`) sample grid size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub x: u32,
    pub y: u32,
}

impl Resolution {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub const fn cell_count(&self) -> usize {
        self.x as usize * self.y as usize
    }

    /// Flat cell index; latitude varies fastest.
    pub const fn cell_index(&self, longitude: u32, latitude: u32) -> usize {
        longitude as usize * self.y as usize + latitude as usize
    }
}

impl Display for Resolution {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

/// Outer batch dimensions of the volume variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VolumeDimensions {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl VolumeDimensions {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    pub const fn volume(&self) -> usize {
        self.x as usize * self.y as usize * self.z as usize
    }

    /// Flat slice index `z + dim.z * (y + dim.y * x)`.
    pub const fn volume_index(&self, x: u32, y: u32, z: u32) -> usize {
        z as usize + self.z as usize * (y as usize + self.y as usize * x as usize)
    }

    /// Inverse of [`Self::volume_index`].
    pub const fn position(&self, volume_index: usize) -> (u32, u32, u32) {
        let z = volume_index % self.z as usize;
        let rest = volume_index / self.z as usize;
        let y = rest % self.y as usize;
        let x = rest / self.y as usize;
        (x as u32, y as u32, z as u32)
    }
}

impl Display for VolumeDimensions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}
