//! FLUXUM Algorithm Framework
//! Stepwise maximum-flow engines over residual flow networks

pub mod augmenting;
pub mod blocking_flow;
pub mod push_relabel;
pub mod search;
pub mod traits;

pub use self::augmenting::*;
pub use self::blocking_flow::*;
pub use self::push_relabel::*;
pub use self::traits::*;
