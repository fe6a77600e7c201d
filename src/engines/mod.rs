pub mod network;
pub mod evaluation;
pub mod generation;
pub mod scheduling;
