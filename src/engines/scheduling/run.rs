use super::solution::ControlSolution;
use super::status::RunStatus;
use crate::config::{ConfigSection, Parameters};
use crate::engines::generation::Population;
use crate::engines::network::{GraphIndex, Reachability, ReachabilityMethod};
use crate::error::Result;
use crate::types::{DateTimePeriod, Graph};
use chrono::{DateTime, Utc};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// State written to the store after every generation
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub population: Population,
    pub random_state: ChaCha8Rng,
    pub current_iteration: usize,
    pub current_iteration_without_improvement: usize,
}

/// Persisted record of one algorithm run.
///
/// Created by a submitter in `Scheduled` state; afterwards only the scheduler
/// changes it, except for stop requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub name: String,
    status: RunStatus,
    pub graph: Graph,
    pub parameters: Parameters,
    pub population: Option<Population>,
    /// Random stream position after the last checkpoint
    pub random_state: Option<ChaCha8Rng>,
    pub current_iteration: usize,
    pub current_iteration_without_improvement: usize,
    pub date_time_created: DateTime<Utc>,
    pub date_time_started: Option<DateTime<Utc>>,
    pub date_time_ended: Option<DateTime<Utc>>,
    pub last_checkpoint: Option<DateTime<Utc>>,
    pub date_time_periods: Vec<DateTimePeriod>,
    pub solutions: Vec<ControlSolution>,
    pub failure: Option<String>,
}

impl Run {
    /// Create a scheduled run after checking the graph, the parameters and
    /// that every target can be reached
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        graph: Graph,
        parameters: Parameters,
    ) -> Result<Self> {
        parameters.validate()?;
        let index = GraphIndex::build(&graph)?;
        Reachability::compute(
            &graph,
            &index,
            parameters.maximum_path_length,
            ReachabilityMethod::Frontier,
        )?;

        Ok(Self {
            id: id.into(),
            name: name.into(),
            status: RunStatus::Scheduled,
            graph,
            parameters,
            population: None,
            random_state: None,
            current_iteration: 0,
            current_iteration_without_improvement: 0,
            date_time_created: Utc::now(),
            date_time_started: None,
            date_time_ended: None,
            last_checkpoint: None,
            date_time_periods: Vec::new(),
            solutions: Vec::new(),
            failure: None,
        })
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn transition(&mut self, to: RunStatus) -> Result<()> {
        self.status = self.status.transition(to)?;
        Ok(())
    }

    /// Ask for the run to stop. A queued run stops at once, an ongoing one at
    /// its next generation boundary. Returns whether the status changed.
    pub fn request_stop(&mut self) -> Result<bool> {
        match self.status {
            RunStatus::Scheduled => {
                self.transition(RunStatus::Stopped)?;
                self.date_time_ended = Some(Utc::now());
                Ok(true)
            }
            RunStatus::Ongoing => {
                self.transition(RunStatus::ScheduledToStop)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn open_window(&mut self, now: DateTime<Utc>) {
        self.date_time_started = Some(now);
        self.date_time_periods.push(DateTimePeriod::open(now));
    }

    /// Close the last execution window if it is still open
    pub fn close_window(&mut self, at: DateTime<Utc>) {
        if let Some(period) = self.date_time_periods.last_mut() {
            if period.is_open() {
                period.date_time_ended = Some(at);
            }
        }
    }

    /// Close the window left open by a process that died, at the last
    /// checkpoint written inside it (or its start time if there was none)
    pub fn close_interrupted_window(&mut self) {
        let Some(period) = self.date_time_periods.last_mut() else {
            return;
        };
        if period.is_open() {
            let started = period.date_time_started;
            let ended = self
                .last_checkpoint
                .filter(|&checkpoint| checkpoint >= started)
                .unwrap_or(started);
            period.date_time_ended = Some(ended);
        }
    }

    pub fn apply_checkpoint(&mut self, checkpoint: &Checkpoint, at: DateTime<Utc>) {
        self.population = Some(checkpoint.population.clone());
        self.random_state = Some(checkpoint.random_state.clone());
        self.current_iteration = checkpoint.current_iteration;
        self.current_iteration_without_improvement =
            checkpoint.current_iteration_without_improvement;
        self.last_checkpoint = Some(at);
    }

    pub fn has_open_window(&self) -> bool {
        self.date_time_periods
            .last()
            .map(DateTimePeriod::is_open)
            .unwrap_or(false)
    }

    pub fn historic_best_fitness(&self) -> &[f64] {
        self.population
            .as_ref()
            .map(|p| p.historic_best_fitness.as_slice())
            .unwrap_or(&[])
    }

    pub fn historic_average_fitness(&self) -> &[f64] {
        self.population
            .as_ref()
            .map(|p| p.historic_average_fitness.as_slice())
            .unwrap_or(&[])
    }

    /// Rebuild `solutions` from the best chromosomes of the current population
    pub fn update_solutions(&mut self, index: &GraphIndex, reachability: &Reachability) {
        self.solutions = self
            .population
            .as_ref()
            .map(|population| {
                population
                    .best_chromosomes()
                    .into_iter()
                    .map(|c| ControlSolution::from_chromosome(c, index, reachability))
                    .collect()
            })
            .unwrap_or_default();
    }
}
