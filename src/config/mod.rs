pub mod traits;
pub mod parameters;
pub mod scheduler;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use parameters::Parameters;
pub use scheduler::SchedulerConfig;
pub use traits::ConfigSection;
