/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Post-run schedule analysis.
//!
//! Deadlines are never enforced while a simulation runs; they are only
//! evaluated here, after every task has finished.
//!
//! | Metric | Definition |
//! |---|---|
//! | turnaround | `finish − arrival` |
//! | waiting | `turnaround − burst` |
//! | response | `start − arrival` |
//! | tardiness | `max(0, finish − deadline)` |
//! | makespan | finish time of the last task |
//! | utilisation | `busy / makespan` |
//! | context switches | adjacent timeline entries belonging to different tasks |

use crate::task::{ScheduleEntry, TaskState};

// ── TaskOutcome ───────────────────────────────────────────────────────────────

/// Final timing of one task after a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub name: String,
    pub arrival_time: u64,
    pub burst_time: u64,
    pub deadline: u64,
    pub start_time: u64,
    pub finish_time: u64,
}

impl TaskOutcome {
    /// Snapshot a completed task.  Returns `None` if it never finished.
    pub fn from_state(state: &TaskState) -> Option<Self> {
        let spec = state.spec();
        Some(Self {
            name: spec.name.clone(),
            arrival_time: spec.arrival_time,
            burst_time: spec.burst_time,
            deadline: spec.deadline,
            start_time: state.start_time()?,
            finish_time: state.finish_time()?,
        })
    }

    pub fn turnaround(&self) -> u64 {
        self.finish_time - self.arrival_time
    }

    pub fn waiting(&self) -> u64 {
        self.turnaround() - self.burst_time
    }

    pub fn response(&self) -> u64 {
        self.start_time - self.arrival_time
    }

    pub fn tardiness(&self) -> u64 {
        self.finish_time.saturating_sub(self.deadline)
    }

    pub fn missed_deadline(&self) -> bool {
        self.finish_time > self.deadline
    }
}

// ── ScheduleSummary ───────────────────────────────────────────────────────────

/// Aggregate indicators for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSummary {
    pub task_count: usize,
    pub makespan: u64,
    pub busy_time: u64,
    pub idle_time: u64,
    /// `busy_time / makespan`, `0.0` for an empty run.
    pub utilization: f64,
    pub avg_turnaround: f64,
    pub avg_waiting: f64,
    /// Saturates at `u64::MAX`.
    pub total_tardiness: u64,
    /// Fraction of tasks finishing by their deadline, `1.0` for an empty run.
    pub on_time_rate: f64,
    pub context_switches: usize,
}

impl ScheduleSummary {
    pub fn calculate(
        outcomes: &[TaskOutcome],
        timeline: &[ScheduleEntry],
        busy_time: u64,
        idle_time: u64,
    ) -> Self {
        let n = outcomes.len();
        let makespan = outcomes.iter().map(|o| o.finish_time).max().unwrap_or(0);

        let on_time = outcomes.iter().filter(|o| !o.missed_deadline()).count();

        Self {
            task_count: n,
            makespan,
            busy_time,
            idle_time,
            utilization: if makespan == 0 {
                0.0
            } else {
                busy_time as f64 / makespan as f64
            },
            avg_turnaround: mean(outcomes.iter().map(TaskOutcome::turnaround)),
            avg_waiting: mean(outcomes.iter().map(TaskOutcome::waiting)),
            total_tardiness: outcomes
                .iter()
                .fold(0u64, |acc, o| acc.saturating_add(o.tardiness())),
            on_time_rate: if n == 0 {
                1.0
            } else {
                on_time as f64 / n as f64
            },
            context_switches: context_switches(timeline),
        }
    }
}

/// Mean of `values`, `0.0` when empty.  Summed as `f64`: every per-task
/// time fits in a `u64`, their sum need not.
fn mean(values: impl Iterator<Item = u64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0u64), |(sum, count), v| (sum + v as f64, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Count adjacent timeline entries that belong to different tasks.
pub fn context_switches(timeline: &[ScheduleEntry]) -> usize {
    timeline
        .windows(2)
        .filter(|w| w[0].task_name != w[1].task_name)
        .count()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
