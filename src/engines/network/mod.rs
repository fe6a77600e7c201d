pub mod index;
pub mod matrix;
pub mod reachability;

pub use index::GraphIndex;
pub use matrix::BoolMatrix;
pub use reachability::{Reachability, ReachabilityMethod, TargetProjection};
