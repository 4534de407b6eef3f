//! Discrete-time simulation driver.
//!
//! [`Simulator`] applies one [`Policy`] to a slice of [`TaskSpec`]s on a
//! single logical core and returns a [`SimulationResult`]: the execution
//! timeline, idle periods, energy figures and the set of tasks that finished
//! after their deadline.
//!
//! # Loop
//! ```text
//! clock = 0
//! while some task is not completed:
//!     admit every pending task with arrival_time <= clock (in arrival order)
//!     if the ready queue is non-empty:
//!         policy picks a task, it runs min(remaining, slice_limit) units
//!         emit ScheduleEntry, charge busy energy, advance clock
//!         admit again                      ← mid-slice arrivals queue first
//!         re-queue the task at the tail if it still has work left
//!     else:
//!         idle until the next arrival, charging idle energy per unit
//! ```
//!
//! The second admission step matters only for round robin: a task that
//! arrived while another one was running is queued *ahead of* the preempted
//! task.
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | State | Stateless `run()` — all per-run state lives in a private `RunContext` |
//! | Task reuse | Specs are never mutated; each run builds fresh `TaskState`s |
//! | Idle stepping | Consecutive idle units are coalesced into one [`IdlePeriod`]; energy is still one idle charge per unit |
//! | Determinism | Pending queue is a stable sort by arrival; every policy has a total tie-break |
//!
//! # Example
//! ```rust
//! use greenos_sim::scheduler::{Policy, Simulator};
//! use greenos_sim::task::TaskSet;
//!
//! let mut set = TaskSet::new();
//! set.add_task("A", 0, 4, 10).unwrap();
//! set.add_task("C", 2, 2, 5).unwrap();
//!
//! let result = Simulator::new(Policy::RatioGreen).run(set.specs());
//! assert_eq!(result.timeline().len(), 2);
//! assert_eq!(result.missed_deadlines(), ["C"]);
//! ```

pub mod comparison;
pub mod error;
pub mod metrics;
pub mod policy;

pub use comparison::{best_by_energy, compare_policies};
pub use error::{SchedulerError, TaskRejection};
pub use metrics::{ScheduleSummary, TaskOutcome};
pub use policy::{Policy, DEFAULT_QUANTUM};

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::energy::{baseline_energy, EnergyMeter, EnergyReport, SubsystemBreakdown};
use crate::task::{completion_horizon, IdlePeriod, ScheduleEntry, TaskSpec, TaskState};

// ── SimulationResult ──────────────────────────────────────────────────────────

/// Output of one simulation run.
///
/// Fields are read-only; a result is never modified once produced.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    policy: Policy,
    timeline: Vec<ScheduleEntry>,
    idle_periods: Vec<IdlePeriod>,
    energy: EnergyReport,
    missed_deadlines: Vec<String>,
    outcomes: Vec<TaskOutcome>,
}

impl SimulationResult {
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Dispatch intervals in chronological order, non-overlapping.
    pub fn timeline(&self) -> &[ScheduleEntry] {
        &self.timeline
    }

    pub fn idle_periods(&self) -> &[IdlePeriod] {
        &self.idle_periods
    }

    pub fn energy(&self) -> &EnergyReport {
        &self.energy
    }

    pub fn total_energy(&self) -> f64 {
        self.energy.total()
    }

    /// Baseline energy minus this run's energy.
    pub fn energy_saved(&self) -> f64 {
        self.energy.saved()
    }

    pub fn subsystems(&self) -> Option<&SubsystemBreakdown> {
        self.energy.subsystems.as_ref()
    }

    /// Names of tasks with `finish_time > deadline`, in completion order.
    pub fn missed_deadlines(&self) -> &[String] {
        &self.missed_deadlines
    }

    /// Per-task final timings, in input order.
    pub fn outcomes(&self) -> &[TaskOutcome] {
        &self.outcomes
    }

    /// Time at which the last task finished (`0` for an empty run).
    pub fn makespan(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|o| o.finish_time)
            .max()
            .unwrap_or(0)
    }

    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary::calculate(
            &self.outcomes,
            &self.timeline,
            self.energy.busy_time,
            self.energy.idle_time,
        )
    }
}

// ── Simulator ─────────────────────────────────────────────────────────────────

/// Single-core simulation driver for one policy.
///
/// Holds no per-run state, so one `Simulator` may be reused for any number
/// of runs and shared between threads.
#[derive(Debug, Clone, Copy)]
pub struct Simulator {
    policy: Policy,
}

impl Simulator {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Simulate `specs` to completion.
    ///
    /// An empty slice yields an empty timeline and zero energy.
    ///
    /// # Panics
    /// * If a spec has `burst_time == 0` (see [`TaskState::new`]).
    /// * If the [`completion_horizon`] of `specs` does not fit in a `u64`.
    ///   Specs taken from a [`TaskSet`](crate::task::TaskSet) never trigger
    ///   either.
    pub fn run(&self, specs: &[TaskSpec]) -> SimulationResult {
        assert!(
            completion_horizon(specs).is_some(),
            "completion horizon of {} task(s) overflows u64; specs must be validated before simulation",
            specs.len()
        );

        info!(
            policy = %self.policy,
            task_count = specs.len(),
            "=== Simulator::run() ==="
        );

        let mut ctx = RunContext::new(specs, self.policy);
        let slice_limit = self.policy.slice_limit();

        while ctx.completed < ctx.tasks.len() {
            ctx.admit();

            match self.policy.select(&mut ctx.ready, &ctx.tasks) {
                Some(idx) => {
                    ctx.dispatch(idx, slice_limit);
                }
                None => ctx.idle(),
            }
        }

        let result = ctx.finish(self.policy, baseline_energy(specs));

        info!(
            policy = %self.policy,
            entries = result.timeline.len(),
            makespan = result.makespan(),
            energy = result.total_energy(),
            missed = result.missed_deadlines.len(),
            "=== Simulation complete ==="
        );

        result
    }
}

// ── Per-run context ───────────────────────────────────────────────────────────

/// Everything one run mutates.  Created and dropped inside
/// [`Simulator::run`].
struct RunContext {
    /// Execution state, indexed by input position.
    tasks: Vec<TaskState>,
    /// Not yet arrived, sorted by `(arrival_time, input position)`.
    pending: VecDeque<usize>,
    /// Arrived and not completed.  FIFO for FCFS / round robin.
    ready: VecDeque<usize>,
    clock: u64,
    completed: usize,
    timeline: Vec<ScheduleEntry>,
    idle_periods: Vec<IdlePeriod>,
    missed: Vec<String>,
    meter: EnergyMeter,
}

impl RunContext {
    fn new(specs: &[TaskSpec], policy: Policy) -> Self {
        let tasks: Vec<TaskState> = specs.iter().cloned().map(TaskState::new).collect();

        // Stable: equal arrivals keep input order
        let mut order: Vec<usize> = (0..tasks.len()).collect();
        order.sort_by_key(|&i| tasks[i].spec().arrival_time);

        Self {
            tasks,
            pending: order.into(),
            ready: VecDeque::new(),
            clock: 0,
            completed: 0,
            timeline: Vec::new(),
            idle_periods: Vec::new(),
            missed: Vec::new(),
            meter: EnergyMeter::new(policy.energy_rates()),
        }
    }

    /// Move every pending task with `arrival_time <= clock` to the ready
    /// queue tail.
    fn admit(&mut self) {
        while let Some(&idx) = self.pending.front() {
            if self.tasks[idx].spec().arrival_time > self.clock {
                break;
            }
            self.pending.pop_front();
            debug!(task = %self.tasks[idx].name(), clock = self.clock, "arrived");
            self.ready.push_back(idx);
        }
    }

    fn dispatch(&mut self, idx: usize, slice_limit: u64) {
        let start = self.clock;
        let slice = self.tasks[idx].run(start, slice_limit);
        self.clock += slice;
        self.meter.accrue_busy(slice);

        let task = &self.tasks[idx];
        debug!(
            task = %task.name(),
            start,
            end = self.clock,
            remaining = task.remaining_time(),
            "executed"
        );
        self.timeline.push(ScheduleEntry {
            task_name: task.name().to_string(),
            start,
            end: self.clock,
        });

        // Arrivals during the slice are queued before the preempted task
        self.admit();

        let task = &self.tasks[idx];
        if task.is_completed() {
            self.completed += 1;
            if task.missed_deadline() {
                debug!(
                    task = %task.name(),
                    finish = self.clock,
                    deadline = task.spec().deadline,
                    "✗ deadline missed"
                );
                self.missed.push(task.name().to_string());
            }
        } else {
            self.ready.push_back(idx);
        }
    }

    /// No task is ready: advance to the next arrival, one idle unit per
    /// time unit.
    fn idle(&mut self) {
        let next_arrival = self
            .pending
            .front()
            .map(|&i| self.tasks[i].spec().arrival_time)
            .unwrap_or(self.clock + 1);
        let end = next_arrival.max(self.clock + 1);

        debug!(start = self.clock, end, "idle");
        self.meter.accrue_idle(end - self.clock);
        self.idle_periods.push(IdlePeriod {
            start: self.clock,
            end,
        });
        self.clock = end;
    }

    fn finish(self, policy: Policy, baseline: f64) -> SimulationResult {
        let outcomes = self
            .tasks
            .iter()
            .filter_map(TaskOutcome::from_state)
            .collect();

        SimulationResult {
            policy,
            timeline: self.timeline,
            idle_periods: self.idle_periods,
            energy: self.meter.finish(baseline, policy.tracks_subsystems()),
            missed_deadlines: self.missed,
            outcomes,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
