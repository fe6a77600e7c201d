pub mod chromosome;
pub mod operators;
pub mod population;
pub mod evolution_engine;
pub mod progress;

pub use chromosome::Chromosome;
pub use population::Population;
pub use evolution_engine::GeneticEngine;
pub use progress::{ChannelProgressCallback, LogProgressCallback, ProgressCallback, ProgressMessage};
