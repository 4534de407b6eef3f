/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core task data structures for the GreenOS simulator.
//!
//! Two distinct types model the two sides of a simulation run:
//!
//! ```text
//! loader / caller ──(add_task)──►  TaskSpec  ──(Simulator::run)──►  TaskState  ──►  ScheduleEntry
//!                                   ↑ input                           ↑ per-run
//!                                   immutable, validated              mutable, private to one run
//! ```
//!
//! # Ownership model
//! A [`TaskSpec`] is a plain value and is never mutated by the simulator.
//! Every run builds its own `Vec<TaskState>` from the specs it is given, so
//! running several policies over the same [`TaskSet`] needs no reset step and
//! cannot leak execution state from one run into the next.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::scheduler::error::{SchedulerError, TaskRejection};

// ── TaskSpec (input) ──────────────────────────────────────────────────────────

/// Immutable description of one schedulable unit.
///
/// All times are in abstract simulation time units.
///
/// # Preconditions
/// Values built through [`TaskSpec::new`] or [`TaskSet::add_task`] always
/// satisfy `burst_time >= 1` and `deadline >= arrival_time`.  Code that fills
/// the public fields directly must uphold the same rules; a zero burst time is
/// treated as a programming error by [`TaskState::new`].
///
/// Names should be unique within one run.  This is not enforced, but two
/// tasks sharing a name produce a timeline in which their entries cannot be
/// told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    /// Task identifier.
    pub name: String,

    /// Logical time the task becomes eligible to run.
    pub arrival_time: u64,

    /// Total execution demand.
    pub burst_time: u64,

    /// Target completion time.  Never enforced, only evaluated after the run.
    pub deadline: u64,
}

impl TaskSpec {
    /// Validate raw (possibly negative) values and build a spec.
    ///
    /// # Errors
    /// The first violated condition, checked in this order:
    /// 1. [`TaskRejection::InvalidArrivalTime`] – `arrival_time < 0`
    /// 2. [`TaskRejection::InvalidBurstTime`] – `burst_time <= 0`
    /// 3. [`TaskRejection::InvalidDeadline`] – `deadline < arrival_time`
    pub fn new(
        name: impl Into<String>,
        arrival_time: i64,
        burst_time: i64,
        deadline: i64,
    ) -> Result<Self, TaskRejection> {
        if arrival_time < 0 {
            return Err(TaskRejection::InvalidArrivalTime { arrival_time });
        }
        if burst_time <= 0 {
            return Err(TaskRejection::InvalidBurstTime { burst_time });
        }
        if deadline < arrival_time {
            return Err(TaskRejection::InvalidDeadline {
                deadline,
                arrival_time,
            });
        }

        Ok(Self {
            name: name.into(),
            arrival_time: arrival_time as u64,
            burst_time: burst_time as u64,
            deadline: deadline as u64,
        })
    }
}

/// Latest time at which a run over `specs` can still be busy:
/// `max(arrival_time) + Σ burst_time`.
///
/// The core is never idle once every task has arrived, so no clock value,
/// start or finish time of a run exceeds this.  Returns `None` when it does
/// not fit in a `u64`.
pub fn completion_horizon(specs: &[TaskSpec]) -> Option<u64> {
    let total_burst = specs
        .iter()
        .try_fold(0u64, |acc, s| acc.checked_add(s.burst_time))?;
    let latest_arrival = specs.iter().map(|s| s.arrival_time).max().unwrap_or(0);
    latest_arrival.checked_add(total_burst)
}

// ── TaskSet (validated batch) ─────────────────────────────────────────────────

/// A task specification refused by [`TaskSet::add_task`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedTask {
    pub name: String,
    pub reason: TaskRejection,
}

/// Ordered batch of validated task specifications.
///
/// Rejections are recorded alongside the accepted specs so a front end can
/// display them; they never abort the batch.
///
/// The accepted specs always have a [`completion_horizon`] that fits in a
/// `u64`.
#[derive(Debug, Clone, Default)]
pub struct TaskSet {
    specs: Vec<TaskSpec>,
    rejected: Vec<RejectedTask>,
    latest_arrival: u64,
    total_burst: u64,
}

impl TaskSet {
    /// Creates a new, empty `TaskSet`.
    pub fn new() -> Self {
        Self::default()
    }

    /// The four-task workload used when no workload file is supplied.
    pub fn demo() -> Self {
        let tasks = [
            ("T1", 0, 4, 10),
            ("T2", 1, 3, 8),
            ("T3", 2, 2, 5),
            ("T4", 3, 1, 6),
        ];

        let mut set = Self::new();
        for (name, at, bt, dl) in tasks {
            // Constant input, always valid
            let _ = set.add_task(name, at, bt, dl);
        }
        set
    }

    /// Validate and append one task.
    ///
    /// On failure the task is not added, the reason is recorded in
    /// [`rejected`](Self::rejected) and returned to the caller.  Earlier and
    /// later tasks in the batch are unaffected.
    ///
    /// # Errors
    /// [`SchedulerError::TaskRejected`] carrying the first violated condition.
    /// A task that is valid on its own is still refused with
    /// [`TaskRejection::HorizonOverflow`] if the batch's
    /// [`completion_horizon`] would no longer fit in a `u64`.
    pub fn add_task(
        &mut self,
        name: impl Into<String>,
        arrival_time: i64,
        burst_time: i64,
        deadline: i64,
    ) -> Result<(), SchedulerError> {
        let name = name.into();

        let checked = TaskSpec::new(name.clone(), arrival_time, burst_time, deadline)
            .and_then(|spec| {
                let latest_arrival = self.latest_arrival.max(spec.arrival_time);
                match self.total_burst.checked_add(spec.burst_time) {
                    Some(total) if latest_arrival.checked_add(total).is_some() => Ok(spec),
                    _ => Err(TaskRejection::HorizonOverflow {
                        arrival_time,
                        burst_time,
                    }),
                }
            });

        match checked {
            Ok(spec) => {
                if self.specs.iter().any(|s| s.name == spec.name) {
                    warn!(
                        task = %spec.name,
                        "duplicate task name accepted — timeline entries will be ambiguous"
                    );
                }
                debug!(
                    task = %spec.name,
                    arrival = spec.arrival_time,
                    burst = spec.burst_time,
                    deadline = spec.deadline,
                    "task accepted"
                );
                self.latest_arrival = self.latest_arrival.max(spec.arrival_time);
                self.total_burst += spec.burst_time;
                self.specs.push(spec);
                Ok(())
            }
            Err(reason) => {
                warn!(task = %name, %reason, "✗ task rejected — skipping");
                self.rejected.push(RejectedTask {
                    name: name.clone(),
                    reason: reason.clone(),
                });
                Err(SchedulerError::TaskRejected { task: name, reason })
            }
        }
    }

    /// Accepted specs in insertion order.
    pub fn specs(&self) -> &[TaskSpec] {
        &self.specs
    }

    /// Rejected tasks in insertion order.
    pub fn rejected(&self) -> &[RejectedTask] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Returns `true` if two accepted specs share a name.
    pub fn has_duplicate_names(&self) -> bool {
        let mut seen = HashSet::new();
        !self.specs.iter().all(|s| seen.insert(s.name.as_str()))
    }

    /// Consume the set, keeping only the accepted specs.
    pub fn into_specs(self) -> Vec<TaskSpec> {
        self.specs
    }
}

// ── TaskState (per-run working copy) ──────────────────────────────────────────

/// Mutable execution state of one task during one simulation run.
///
/// Fields are private so the invariants hold by construction:
///
/// * `0 <= remaining_time <= burst_time`
/// * `start_time` is set once, on the first dispatch
/// * `finish_time` is set once, exactly when `remaining_time` reaches 0
#[derive(Debug, Clone)]
pub struct TaskState {
    spec: TaskSpec,
    remaining_time: u64,
    start_time: Option<u64>,
    finish_time: Option<u64>,
}

impl TaskState {
    /// Fresh state for one run.
    ///
    /// # Panics
    /// If `spec.burst_time == 0`.  Validated specs never trigger this; a spec
    /// assembled by hand with a zero burst would otherwise never complete.
    pub fn new(spec: TaskSpec) -> Self {
        assert!(
            spec.burst_time >= 1,
            "task '{}' has zero burst time; specs must be validated before simulation",
            spec.name
        );
        Self {
            remaining_time: spec.burst_time,
            spec,
            start_time: None,
            finish_time: None,
        }
    }

    pub fn spec(&self) -> &TaskSpec {
        &self.spec
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn remaining_time(&self) -> u64 {
        self.remaining_time
    }

    pub fn start_time(&self) -> Option<u64> {
        self.start_time
    }

    pub fn finish_time(&self) -> Option<u64> {
        self.finish_time
    }

    pub fn is_completed(&self) -> bool {
        self.finish_time.is_some()
    }

    /// `true` once the task has finished after its deadline.
    pub fn missed_deadline(&self) -> bool {
        self.finish_time.is_some_and(|f| f > self.spec.deadline)
    }

    /// Execute for at most `max_slice` units starting at `now`.
    ///
    /// Returns the number of units actually executed
    /// (`min(remaining_time, max_slice)`).
    pub fn run(&mut self, now: u64, max_slice: u64) -> u64 {
        debug_assert!(
            !self.is_completed(),
            "task '{}' dispatched after completion",
            self.spec.name
        );
        debug_assert!(max_slice >= 1);

        let slice = self.remaining_time.min(max_slice);
        if self.start_time.is_none() {
            self.start_time = Some(now);
        }
        self.remaining_time -= slice;
        if self.remaining_time == 0 {
            self.finish_time = Some(now + slice);
        }
        slice
    }
}

// ── Timeline records ──────────────────────────────────────────────────────────

/// One contiguous dispatch interval on the single core.  `end > start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub task_name: String,
    pub start: u64,
    pub end: u64,
}

impl ScheduleEntry {
    pub fn duration(&self) -> u64 {
        self.end - self.start
    }
}

/// A stretch of time with no eligible task.  `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdlePeriod {
    pub start: u64,
    pub end: u64,
}

impl IdlePeriod {
    pub fn duration(&self) -> u64 {
        self.end - self.start
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
