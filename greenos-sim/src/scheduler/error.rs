/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the GreenOS simulator.
//!
//! Two error enums model the two failure layers:
//!
//! * [`TaskRejection`] — why a single task specification was refused by
//!   [`TaskSet::add_task`](crate::task::TaskSet::add_task) (low-level, carries
//!   the offending values).
//! * [`SchedulerError`] — top-level failure returned from the public API.
//!
//! A rejection is never fatal for a batch: the offending task is skipped and
//! every other accepted task stays eligible for simulation.

use thiserror::Error;

// ── Task validation ───────────────────────────────────────────────────────────

/// Reason a task specification was rejected.
///
/// Conditions are checked in declaration order; the first violated one is
/// reported even if several apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskRejection {
    /// `arrival_time < 0`.
    InvalidArrivalTime { arrival_time: i64 },

    /// `burst_time <= 0`.
    InvalidBurstTime { burst_time: i64 },

    /// `deadline < arrival_time`.
    InvalidDeadline { deadline: i64, arrival_time: i64 },

    /// Accepting the task would make the latest possible completion time of
    /// the batch (`max(arrival_time) + Σ burst_time`) exceed `u64::MAX`.
    HorizonOverflow { arrival_time: i64, burst_time: i64 },
}

impl std::fmt::Display for TaskRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskRejection::InvalidArrivalTime { arrival_time } => {
                write!(f, "arrival time {} is negative", arrival_time)
            }

            TaskRejection::InvalidBurstTime { burst_time } => write!(
                f,
                "burst time {} must be at least one time unit",
                burst_time
            ),

            TaskRejection::InvalidDeadline {
                deadline,
                arrival_time,
            } => write!(
                f,
                "deadline {} is earlier than arrival time {}",
                deadline, arrival_time
            ),

            TaskRejection::HorizonOverflow {
                arrival_time,
                burst_time,
            } => write!(
                f,
                "arrival time {} with burst time {} overflows the simulation horizon",
                arrival_time, burst_time
            ),
        }
    }
}

impl std::error::Error for TaskRejection {}

// ── Top-level errors ──────────────────────────────────────────────────────────

/// Top-level error type of the simulator API.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A task specification failed validation.
    #[error("task '{task}' rejected: {reason}")]
    TaskRejected { task: String, reason: TaskRejection },

    /// A policy name could not be parsed.
    #[error("unknown scheduling policy: '{0}' (valid: fcfs, rr, edf, green)")]
    UnknownPolicy(String),

    /// Round robin was configured with a zero-length quantum.
    #[error("round-robin quantum must be at least 1 time unit")]
    InvalidQuantum,

    /// A comparison worker did not return a result (it panicked or was
    /// cancelled).
    #[error("simulation worker for policy '{policy}' failed: {source}")]
    WorkerFailed {
        policy: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_messages_carry_values() {
        let r = TaskRejection::InvalidDeadline {
            deadline: 2,
            arrival_time: 5,
        };
        assert_eq!(r.to_string(), "deadline 2 is earlier than arrival time 5");

        let err = SchedulerError::TaskRejected {
            task: "X".into(),
            reason: TaskRejection::InvalidArrivalTime { arrival_time: -1 },
        };
        assert_eq!(err.to_string(), "task 'X' rejected: arrival time -1 is negative");
    }

    #[test]
    fn unknown_policy_lists_valid_names() {
        let msg = SchedulerError::UnknownPolicy("lottery".into()).to_string();
        assert!(msg.contains("lottery"));
        assert!(msg.contains("fcfs, rr, edf, green"));
    }
}
