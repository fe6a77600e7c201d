//! Genetic search for control configurations of directed networks.
//!
//! A run takes a graph, its target nodes and a bound on path length, and
//! evolves assignments of one driver node per target that keep every target
//! structurally controllable while using as few distinct drivers as possible
//! and favoring preferred nodes. Runs are queued in a [`data::RunStore`] and
//! executed one at a time by the [`engines::scheduling::Scheduler`], which
//! checkpoints after every generation and resumes after restarts.

pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod types;

pub use error::{NetControlError, Result};
