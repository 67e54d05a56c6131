//! FLUXUM data structures
//!
//! The flow network is the single mutable structure every engine operates
//! on; arcs are stored in a flat pool and referenced by stable indices.

pub mod flow_network;

pub use self::flow_network::*;
