//! Individual checks, grouped by what they look at.

pub mod metadata;
pub mod platform;
