//! Services built on top of the platform scanners.

pub mod catalog;
pub mod icons;
