pub mod fitness;

pub use fitness::{evaluate, fitness_score, Evaluation};
