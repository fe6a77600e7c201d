use crate::engines::scheduling::status::RunStatus;

/// Observer of the runs driven by the scheduler
pub trait ProgressCallback: Send {
    fn on_run_started(&mut self, run_id: &str, iteration: usize);
    fn on_generation_complete(
        &mut self,
        run_id: &str,
        iteration: usize,
        best_fitness: f64,
        average_fitness: f64,
    );
    fn on_run_finished(&mut self, run_id: &str, status: RunStatus);
}

pub struct LogProgressCallback;

impl ProgressCallback for LogProgressCallback {
    fn on_run_started(&mut self, run_id: &str, iteration: usize) {
        log::info!("Run {} starting at iteration {}", run_id, iteration);
    }

    fn on_generation_complete(
        &mut self,
        run_id: &str,
        iteration: usize,
        best_fitness: f64,
        average_fitness: f64,
    ) {
        log::debug!(
            "Run {} iteration {} complete. Best fitness: {:.4}, average: {:.4}",
            run_id,
            iteration,
            best_fitness,
            average_fitness
        );
    }

    fn on_run_finished(&mut self, run_id: &str, status: RunStatus) {
        log::info!("Run {} finished as {:?}", run_id, status);
    }
}

// For hosts that watch progress from another thread
pub struct ChannelProgressCallback {
    sender: std::sync::mpsc::Sender<ProgressMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMessage {
    RunStarted { run_id: String, iteration: usize },
    GenerationComplete {
        run_id: String,
        iteration: usize,
        best_fitness: f64,
        average_fitness: f64,
    },
    RunFinished { run_id: String, status: RunStatus },
}

impl ChannelProgressCallback {
    pub fn new(sender: std::sync::mpsc::Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_run_started(&mut self, run_id: &str, iteration: usize) {
        let _ = self.sender.send(ProgressMessage::RunStarted {
            run_id: run_id.to_string(),
            iteration,
        });
    }

    fn on_generation_complete(
        &mut self,
        run_id: &str,
        iteration: usize,
        best_fitness: f64,
        average_fitness: f64,
    ) {
        let _ = self.sender.send(ProgressMessage::GenerationComplete {
            run_id: run_id.to_string(),
            iteration,
            best_fitness,
            average_fitness,
        });
    }

    fn on_run_finished(&mut self, run_id: &str, status: RunStatus) {
        let _ = self.sender.send(ProgressMessage::RunFinished {
            run_id: run_id.to_string(),
            status,
        });
    }
}
