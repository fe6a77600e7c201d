use super::run::{Checkpoint, Run};
use super::shutdown::ShutdownSignal;
use super::status::RunStatus;
use crate::config::{ConfigSection, SchedulerConfig};
use crate::data::{RunStore, RunUpdate};
use crate::engines::generation::{GeneticEngine, LogProgressCallback, ProgressCallback};
use crate::engines::network::{GraphIndex, Reachability};
use crate::error::{NetControlError, Result};
use chrono::Utc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::thread::{self, JoinHandle};

/// How the scheduler let go of a claimed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Stopped,
    Failed,
    /// Interrupted by shutdown and put back in the queue
    Requeued,
    /// Removed from the store while it was being processed
    Deleted,
    /// No longer queued when the scheduler tried to claim it
    Skipped,
}

enum Commit {
    Saved,
    Deleted,
    Interrupted,
}

/// Runs queued algorithm runs one at a time, oldest first.
///
/// Each claimed run is advanced one generation at a time and checkpointed to
/// the store after every generation, so a crash loses at most the generation
/// being computed. Shutdown and external stop requests are only looked at
/// between generations.
pub struct Scheduler<S: RunStore> {
    store: S,
    config: SchedulerConfig,
    callback: Box<dyn ProgressCallback>,
    shutdown: ShutdownSignal,
}

impl<S: RunStore> Scheduler<S> {
    pub fn new(store: S, config: SchedulerConfig) -> Self {
        Self {
            store,
            config,
            callback: Box::new(LogProgressCallback),
            shutdown: ShutdownSignal::new(),
        }
    }

    pub fn with_callback(mut self, callback: Box<dyn ProgressCallback>) -> Self {
        self.callback = callback;
        self
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Requeue runs left `Ongoing` by a previous process and finish runs that
    /// were asked to stop before it died. Returns the number of runs touched.
    pub fn recover_interrupted_runs(&mut self) -> Result<usize> {
        let mut recovered = 0;

        for listed in self.store.list_runs_by_status(RunStatus::Ongoing)? {
            let mut requeued = false;
            let saved = self.store.update_run(&listed.id, &mut |run| {
                requeued = run.status() == RunStatus::Ongoing;
                if requeued {
                    run.close_interrupted_window();
                    run.transition(RunStatus::Scheduled)?;
                }
                Ok(())
            })?;
            if let (Some(run), true) = (saved, requeued) {
                log::info!(
                    "Requeued interrupted run {} at iteration {}",
                    run.id,
                    run.current_iteration
                );
                recovered += 1;
            }
        }

        for listed in self.store.list_runs_by_status(RunStatus::ScheduledToStop)? {
            let precomputed = match self.precompute(&listed) {
                Ok(precomputed) => Some(precomputed),
                Err(e) => {
                    log::warn!(
                        "Run {} is stopped without solutions, its network is invalid: {}",
                        listed.id,
                        e
                    );
                    None
                }
            };

            let mut stopped = false;
            let saved = self.store.update_run(&listed.id, &mut |run| {
                stopped = run.status() == RunStatus::ScheduledToStop;
                if stopped {
                    run.close_interrupted_window();
                    run.transition(RunStatus::Stopped)?;
                    run.date_time_ended = run
                        .date_time_periods
                        .last()
                        .and_then(|period| period.date_time_ended)
                        .or(run.last_checkpoint);
                    if let Some((index, reachability)) = &precomputed {
                        run.update_solutions(index, reachability);
                    }
                }
                Ok(())
            })?;
            if let (Some(run), true) = (saved, stopped) {
                log::info!("Stopped run {} that was scheduled to stop", run.id);
                self.callback.on_run_finished(&run.id, run.status());
                recovered += 1;
            }
        }

        Ok(recovered)
    }

    /// Claim and process the oldest scheduled run, if any
    pub fn run_once(&mut self) -> Result<Option<(String, RunOutcome)>> {
        let Some(run) = self
            .store
            .list_runs_by_status(RunStatus::Scheduled)?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };

        let id = run.id.clone();
        let outcome = self.process_run(run)?;
        Ok(Some((id, outcome)))
    }

    /// Recover, then poll the queue until shutdown
    pub fn run(&mut self) -> Result<()> {
        let idle_delay = self.config.idle_delay();

        loop {
            match self.recover_interrupted_runs() {
                Ok(count) => {
                    if count > 0 {
                        log::info!("Recovered {} interrupted runs", count);
                    }
                    break;
                }
                Err(e) => {
                    log::warn!("Recovery failed, retrying: {}", e);
                    if self.shutdown.wait_timeout(idle_delay) {
                        return Ok(());
                    }
                }
            }
        }

        while !self.shutdown.is_triggered() {
            match self.run_once() {
                Ok(Some((id, outcome))) => {
                    log::info!("Released run {} ({:?})", id, outcome);
                }
                Ok(None) => {
                    if self.shutdown.wait_timeout(idle_delay) {
                        break;
                    }
                }
                Err(e) => {
                    log::error!("Scheduler iteration failed: {}", e);
                    if self.shutdown.wait_timeout(idle_delay) {
                        break;
                    }
                }
            }
        }

        log::info!("Scheduler stopped");
        Ok(())
    }

    /// Start the polling loop on a background thread
    pub fn spawn(self) -> Result<SchedulerHandle>
    where
        S: 'static,
    {
        self.config.validate()?;
        let shutdown = self.shutdown.clone();
        let mut scheduler = self;
        let handle = thread::Builder::new()
            .name("netcontrol-scheduler".to_string())
            .spawn(move || scheduler.run())?;

        Ok(SchedulerHandle { shutdown, handle })
    }

    fn precompute(&self, run: &Run) -> Result<(GraphIndex, Reachability)> {
        let index = GraphIndex::build(&run.graph)?;
        let reachability = Reachability::compute(
            &run.graph,
            &index,
            run.parameters.maximum_path_length,
            self.config.reachability_method,
        )?;
        Ok((index, reachability))
    }

    /// Build the starting checkpoint: the persisted one if a previous session
    /// left it, a fresh population otherwise
    fn starting_checkpoint(
        &self,
        run: &Run,
        engine: &GeneticEngine,
        index: &GraphIndex,
        reachability: &Reachability,
    ) -> Result<Checkpoint> {
        let mut random_state = run
            .random_state
            .clone()
            .unwrap_or_else(|| ChaCha8Rng::seed_from_u64(run.parameters.random_seed));

        let population = match &run.population {
            Some(population) if !population.is_empty() => {
                let mut population = population.clone();
                population.validate(reachability, index.preferred_flags())?;
                log::info!(
                    "Resuming run {} from iteration {}",
                    run.id,
                    run.current_iteration
                );
                population
            }
            _ => engine.initial_population(&mut random_state),
        };

        Ok(Checkpoint {
            population,
            random_state,
            current_iteration: run.current_iteration,
            current_iteration_without_improvement: run.current_iteration_without_improvement,
        })
    }

    fn process_run(&mut self, listed: Run) -> Result<RunOutcome> {
        // Claim against the stored state, a stop may have landed since listing
        let now = Utc::now();
        let claimed = self.store.update_run(&listed.id, &mut |run| {
            run.transition(RunStatus::Ongoing)?;
            run.open_window(now);
            Ok(())
        });
        let mut run = match claimed {
            Ok(Some(run)) => run,
            Ok(None) => return Ok(self.deleted(&listed.id)),
            Err(NetControlError::InvalidTransition { from, .. }) => {
                log::info!("Run {} is no longer queued ({:?}), skipping", listed.id, from);
                return Ok(RunOutcome::Skipped);
            }
            Err(e) => return Err(e),
        };
        log::info!("Claimed run {} ({})", run.id, run.name);
        self.callback.on_run_started(&run.id, run.current_iteration);

        let (index, reachability) = match self.precompute(&run) {
            Ok(precomputed) => precomputed,
            Err(e) if e.is_configuration() => return self.fail_run(run, e),
            Err(e) => return Err(e),
        };
        let parameters = run.parameters.clone();
        if let Err(e) = parameters.validate() {
            return self.fail_run(run, e);
        }
        let engine = GeneticEngine::new(&reachability, &index, &parameters);

        let mut current = match self.starting_checkpoint(&run, &engine, &index, &reachability) {
            Ok(checkpoint) => checkpoint,
            Err(e) if e.is_configuration() => return self.fail_run(run, e),
            Err(e) => return Err(e),
        };

        let mut interrupted = match self.commit(&mut run, &current)? {
            Commit::Saved => false,
            Commit::Deleted => return Ok(self.deleted(&run.id)),
            Commit::Interrupted => true,
        };

        while !interrupted {
            if self.shutdown.is_triggered() {
                interrupted = true;
                break;
            }
            if run.status() != RunStatus::Ongoing
                || current.current_iteration >= parameters.maximum_iterations
                || current.current_iteration_without_improvement
                    >= parameters.maximum_iterations_without_improvement
            {
                break;
            }

            let best_fitness = current.population.best_historic_fitness();
            let mut random_state = current.random_state.clone();
            let population = engine.next_generation(&current.population, &mut random_state);
            let fitness = population
                .historic_best_fitness
                .last()
                .copied()
                .unwrap_or(f64::NEG_INFINITY);
            let without_improvement = if fitness > best_fitness {
                0
            } else {
                current.current_iteration_without_improvement + 1
            };

            let next = Checkpoint {
                population,
                random_state,
                current_iteration: current.current_iteration + 1,
                current_iteration_without_improvement: without_improvement,
            };

            match self.commit(&mut run, &next)? {
                Commit::Saved => {
                    self.callback.on_generation_complete(
                        &run.id,
                        next.current_iteration,
                        fitness,
                        next.population.average_fitness(),
                    );
                    current = next;
                }
                Commit::Deleted => return Ok(self.deleted(&run.id)),
                Commit::Interrupted => interrupted = true,
            }
        }

        if interrupted && run.status() == RunStatus::Ongoing {
            return self.requeue(run, &index, &reachability);
        }
        self.finish(run, &index, &reachability)
    }

    /// Move the run to `Stopped` if a stop was requested, `Completed`
    /// otherwise, and save it with its solutions
    fn finish(
        &mut self,
        run: Run,
        index: &GraphIndex,
        reachability: &Reachability,
    ) -> Result<RunOutcome> {
        let saved = self.save_final(&run, &mut |stored| {
            let mut candidate = run.clone();
            merge_stop_request(stored, &mut candidate)?;
            let terminal = if candidate.status() == RunStatus::ScheduledToStop {
                RunStatus::Stopped
            } else {
                RunStatus::Completed
            };
            candidate.transition(terminal)?;
            let now = Utc::now();
            candidate.date_time_ended = Some(now);
            candidate.close_window(now);
            candidate.update_solutions(index, reachability);
            *stored = candidate;
            Ok(())
        })?;
        let Some(run) = saved else {
            return Ok(self.deleted(&run.id));
        };

        let terminal = run.status();
        log::info!(
            "Run {} {:?} after {} iterations, best fitness {:.4}",
            run.id,
            terminal,
            run.current_iteration,
            run.population
                .as_ref()
                .map(|p| p.best_historic_fitness())
                .unwrap_or(f64::NEG_INFINITY)
        );
        self.callback.on_run_finished(&run.id, terminal);

        Ok(match terminal {
            RunStatus::Stopped => RunOutcome::Stopped,
            _ => RunOutcome::Completed,
        })
    }

    /// Persist a checkpoint, retrying until it is durable. The run record is
    /// only updated once the save succeeds.
    fn commit(&mut self, run: &mut Run, checkpoint: &Checkpoint) -> Result<Commit> {
        loop {
            match self.try_commit(run, checkpoint) {
                Ok(commit) => return Ok(commit),
                Err(e @ NetControlError::InvalidTransition { .. }) => return Err(e),
                Err(e) => {
                    log::warn!(
                        "Checkpoint {} of run {} not saved, retrying: {}",
                        checkpoint.current_iteration,
                        run.id,
                        e
                    );
                    if self.shutdown.wait_timeout(self.config.save_retry_delay()) {
                        return Ok(Commit::Interrupted);
                    }
                }
            }
        }
    }

    fn try_commit(&self, run: &mut Run, checkpoint: &Checkpoint) -> Result<Commit> {
        let at = Utc::now();
        let saved = self.store.update_run(&run.id, &mut |stored| {
            let mut candidate = run.clone();
            merge_stop_request(stored, &mut candidate)?;
            candidate.apply_checkpoint(checkpoint, at);
            *stored = candidate;
            Ok(())
        })?;
        let Some(saved) = saved else {
            return Ok(Commit::Deleted);
        };

        if saved.status() != run.status() {
            log::info!("Run {} was asked to stop", run.id);
        }
        *run = saved;
        Ok(Commit::Saved)
    }

    /// Apply a final update, retrying on storage failure unless shutting
    /// down. `None` if the run was deleted.
    fn save_final(&self, run: &Run, update: RunUpdate<'_>) -> Result<Option<Run>> {
        loop {
            match self.store.update_run(&run.id, &mut *update) {
                Ok(saved) => return Ok(saved),
                Err(e @ NetControlError::InvalidTransition { .. }) => return Err(e),
                Err(e) => {
                    log::warn!("Final state of run {} not saved, retrying: {}", run.id, e);
                    if self.shutdown.wait_timeout(self.config.save_retry_delay()) {
                        return Err(e);
                    }
                }
            }
        }
    }

    /// Put an interrupted run back in the queue. A stop requested meanwhile
    /// finishes it instead.
    fn requeue(
        &mut self,
        run: Run,
        index: &GraphIndex,
        reachability: &Reachability,
    ) -> Result<RunOutcome> {
        let mut stop_requested = false;
        let saved = self.store.update_run(&run.id, &mut |stored| {
            stop_requested = stored.status() == RunStatus::ScheduledToStop;
            if stop_requested {
                return Ok(());
            }
            let mut candidate = run.clone();
            candidate.transition(RunStatus::Scheduled)?;
            candidate.close_window(Utc::now());
            *stored = candidate;
            Ok(())
        })?;

        if saved.is_none() {
            return Ok(self.deleted(&run.id));
        }
        if stop_requested {
            return self.finish(run, index, reachability);
        }
        log::info!(
            "Run {} requeued at iteration {} for shutdown",
            run.id,
            run.current_iteration
        );
        Ok(RunOutcome::Requeued)
    }

    fn fail_run(&mut self, run: Run, error: NetControlError) -> Result<RunOutcome> {
        log::error!("Run {} cannot be processed: {}", run.id, error);
        let reason = error.to_string();
        let saved = self.save_final(&run, &mut |stored| {
            let mut candidate = run.clone();
            candidate.failure = Some(reason.clone());
            candidate.transition(RunStatus::Failed)?;
            let now = Utc::now();
            candidate.date_time_ended = Some(now);
            candidate.close_window(now);
            *stored = candidate;
            Ok(())
        })?;
        if saved.is_none() {
            return Ok(self.deleted(&run.id));
        }
        self.callback.on_run_finished(&run.id, RunStatus::Failed);
        Ok(RunOutcome::Failed)
    }

    fn deleted(&self, id: &str) -> RunOutcome {
        log::info!("Run {} was deleted while being processed", id);
        RunOutcome::Deleted
    }
}

/// Carry a stop request written to the store over to the scheduler's copy
fn merge_stop_request(stored: &Run, candidate: &mut Run) -> Result<()> {
    if stored.status() == RunStatus::ScheduledToStop && candidate.status() == RunStatus::Ongoing {
        candidate.transition(RunStatus::ScheduledToStop)?;
    }
    Ok(())
}

/// Background scheduler thread
pub struct SchedulerHandle {
    shutdown: ShutdownSignal,
    handle: JoinHandle<Result<()>>,
}

impl SchedulerHandle {
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Signal shutdown and wait for the current generation to finish
    pub fn stop(self) -> Result<()> {
        self.shutdown.trigger();
        self.join()
    }

    pub fn join(self) -> Result<()> {
        self.handle
            .join()
            .map_err(|_| NetControlError::Worker("Scheduler thread panicked".to_string()))?
    }
}
