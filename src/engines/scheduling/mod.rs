pub mod status;
pub mod run;
pub mod solution;
pub mod shutdown;
pub mod scheduler;

pub use status::RunStatus;
pub use run::{Checkpoint, Run};
pub use solution::{ControlPath, ControlSolution};
pub use shutdown::ShutdownSignal;
pub use scheduler::{RunOutcome, Scheduler, SchedulerHandle};
