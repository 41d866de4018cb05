//! Core topology model types for maptrie

mod access;
mod digest;
mod join;
mod location;

pub use access::{Access, Link, Side, SIDE_COUNT};
pub use digest::Digest;
pub use join::Join;
pub use location::{Location, LocationFlags};
