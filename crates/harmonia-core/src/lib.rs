pub mod common;
pub mod domain;
pub mod engines;
pub mod launch;
pub mod numerics;
