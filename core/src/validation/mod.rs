//! FLUXUM Validation Framework
//! Flow-conservation, capacity, and optimality checks over finished runs

pub mod correctness;

pub use self::correctness::*;
