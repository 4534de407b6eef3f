/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Dispatch policies.
//!
//! [`Policy`] is a closed enum: every place that needs per-policy behaviour
//! matches on it exhaustively, so adding a variant is a compile error until
//! each site handles it.  Policy names from the command line or a config file
//! are parsed once at the boundary via [`FromStr`].
//!
//! # Selection rules
//!
//! | Policy | Picks | Preemptive | Tie-break |
//! |---|---|---|---|
//! | FCFS | head of the arrival-ordered queue | no | input position |
//! | RoundRobin | head of the FIFO queue, one quantum | yes | queue order |
//! | EDF | minimum `deadline` | no | `arrival_time`, then input position |
//! | RatioGreen | minimum `deadline / burst_time` | no | `arrival_time`, then input position |
//!
//! RatioGreen compares ratios exactly by cross-multiplying in `u128`, so two
//! ratios that are mathematically equal (e.g. `10/4` and `5/2`) always tie and
//! fall through to the arrival-time rule.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use tracing::debug;

use crate::energy::EnergyRates;
use crate::scheduler::error::SchedulerError;
use crate::task::{TaskSpec, TaskState};

/// Round-robin time slice used unless configured otherwise.
pub const DEFAULT_QUANTUM: NonZeroU64 = match NonZeroU64::new(2) {
    Some(q) => q,
    None => panic!("quantum must be non-zero"),
};

/// Single-core dispatch policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// First-come-first-served, run to completion.
    Fcfs,
    /// Preemptive round robin with a fixed quantum.
    RoundRobin { quantum: NonZeroU64 },
    /// Earliest deadline first, run to completion.
    Edf,
    /// Smallest `deadline / burst_time` first, run to completion ("GreenOS").
    RatioGreen,
}

impl Policy {
    /// Round robin with a caller-supplied quantum.
    ///
    /// # Errors
    /// [`SchedulerError::InvalidQuantum`] if `quantum == 0`.
    pub fn round_robin(quantum: u64) -> Result<Self, SchedulerError> {
        NonZeroU64::new(quantum)
            .map(|quantum| Policy::RoundRobin { quantum })
            .ok_or(SchedulerError::InvalidQuantum)
    }

    /// All four policies in canonical order.
    pub fn all(quantum: NonZeroU64) -> [Policy; 4] {
        [
            Policy::Fcfs,
            Policy::RoundRobin { quantum },
            Policy::Edf,
            Policy::RatioGreen,
        ]
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Policy::Fcfs => "FCFS",
            Policy::RoundRobin { .. } => "Round Robin",
            Policy::Edf => "EDF",
            Policy::RatioGreen => "GreenOS",
        }
    }

    pub fn is_preemptive(&self) -> bool {
        matches!(self, Policy::RoundRobin { .. })
    }

    /// Longest slice one dispatch may run.
    ///
    /// Non-preemptive policies are unbounded: the task runs its whole
    /// remaining burst.
    pub fn slice_limit(&self) -> u64 {
        match self {
            Policy::RoundRobin { quantum } => quantum.get(),
            Policy::Fcfs | Policy::Edf | Policy::RatioGreen => u64::MAX,
        }
    }

    /// Busy / idle energy rates charged while this policy runs.
    pub fn energy_rates(&self) -> EnergyRates {
        match self {
            Policy::Fcfs => EnergyRates::FCFS,
            Policy::RoundRobin { .. } => EnergyRates::ROUND_ROBIN,
            Policy::Edf => EnergyRates::EDF,
            Policy::RatioGreen => EnergyRates::RATIO_GREEN,
        }
    }

    /// Whether busy time is apportioned to hardware subsystems.
    pub fn tracks_subsystems(&self) -> bool {
        matches!(self, Policy::RatioGreen)
    }

    /// Remove and return the index of the next task to dispatch from `ready`.
    ///
    /// `ready` holds indices into `tasks`; index order is input order and is
    /// the final tie-break.  `ready` is filled in arrival order by the driver,
    /// which is what FCFS and RoundRobin rely on.
    pub(crate) fn select(
        &self,
        ready: &mut VecDeque<usize>,
        tasks: &[TaskState],
    ) -> Option<usize> {
        match self {
            Policy::Fcfs | Policy::RoundRobin { .. } => ready.pop_front(),
            Policy::Edf => take_min_by(ready, |a, b| {
                edf_order(tasks[a].spec(), tasks[b].spec()).then(a.cmp(&b))
            }),
            Policy::RatioGreen => {
                let picked = take_min_by(ready, |a, b| {
                    ratio_green_order(tasks[a].spec(), tasks[b].spec()).then(a.cmp(&b))
                })?;
                debug!(
                    task = %tasks[picked].name(),
                    ratio = urgency_ratio(tasks[picked].spec()),
                    "lowest deadline/burst ratio"
                );
                Some(picked)
            }
        }
    }
}

/// Remove the minimum element of `ready` under `cmp`.
fn take_min_by<F>(ready: &mut VecDeque<usize>, mut cmp: F) -> Option<usize>
where
    F: FnMut(usize, usize) -> Ordering,
{
    let pos = ready
        .iter()
        .enumerate()
        .min_by(|&(_, &a), &(_, &b)| cmp(a, b))
        .map(|(pos, _)| pos)?;
    ready.remove(pos)
}

/// `(deadline, arrival_time)` ascending.
pub fn edf_order(a: &TaskSpec, b: &TaskSpec) -> Ordering {
    a.deadline
        .cmp(&b.deadline)
        .then(a.arrival_time.cmp(&b.arrival_time))
}

/// `(deadline / burst_time, arrival_time)` ascending, ratio compared exactly.
pub fn ratio_green_order(a: &TaskSpec, b: &TaskSpec) -> Ordering {
    // a.d / a.b  <=>  b.d / b.b   ⇔   a.d * b.b  <=>  b.d * a.b   (bursts > 0)
    let lhs = u128::from(a.deadline) * u128::from(b.burst_time);
    let rhs = u128::from(b.deadline) * u128::from(a.burst_time);
    lhs.cmp(&rhs).then(a.arrival_time.cmp(&b.arrival_time))
}

/// `deadline / burst_time` as a float, for logging and display only.
/// Selection uses the exact [`ratio_green_order`].
pub fn urgency_ratio(spec: &TaskSpec) -> f64 {
    spec.deadline as f64 / spec.burst_time as f64
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::RoundRobin { quantum } => write!(f, "{} (q={})", self.label(), quantum),
            _ => f.write_str(self.label()),
        }
    }
}

impl FromStr for Policy {
    type Err = SchedulerError;

    /// Parses `fcfs`, `rr` / `round_robin`, `edf`, `green` / `greenos` /
    /// `ratio_green` (case-insensitive, `-` and `_` interchangeable).  Round
    /// robin gets [`DEFAULT_QUANTUM`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        match key.as_str() {
            "fcfs" => Ok(Policy::Fcfs),
            "rr" | "round_robin" | "roundrobin" => Ok(Policy::RoundRobin {
                quantum: DEFAULT_QUANTUM,
            }),
            "edf" => Ok(Policy::Edf),
            "green" | "greenos" | "ratio_green" => Ok(Policy::RatioGreen),
            _ => Err(SchedulerError::UnknownPolicy(s.to_string())),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn state(name: &str, arrival: u64, burst: u64, deadline: u64) -> TaskState {
        TaskState::new(TaskSpec {
            name: name.into(),
            arrival_time: arrival,
            burst_time: burst,
            deadline,
        })
    }

    fn pick_all(policy: Policy, tasks: &[TaskState]) -> Vec<String> {
        let mut ready: VecDeque<usize> = (0..tasks.len()).collect();
        let mut order = Vec::new();
        while let Some(i) = policy.select(&mut ready, tasks) {
            order.push(tasks[i].name().to_string());
        }
        order
    }

    // ── FromStr / Display ─────────────────────────────────────────────────────

    #[test]
    fn parses_known_names() {
        assert_eq!("fcfs".parse::<Policy>().unwrap(), Policy::Fcfs);
        assert_eq!("EDF".parse::<Policy>().unwrap(), Policy::Edf);
        assert_eq!("GreenOS".parse::<Policy>().unwrap(), Policy::RatioGreen);
        assert_eq!("ratio-green".parse::<Policy>().unwrap(), Policy::RatioGreen);
        assert_eq!(
            "round_robin".parse::<Policy>().unwrap(),
            Policy::RoundRobin {
                quantum: DEFAULT_QUANTUM
            }
        );
    }

    #[test]
    fn unknown_name_is_an_error() {
        let err = "lottery".parse::<Policy>().unwrap_err();
        assert!(matches!(err, SchedulerError::UnknownPolicy(ref s) if s == "lottery"));
    }

    #[test]
    fn zero_quantum_is_rejected() {
        assert!(matches!(
            Policy::round_robin(0),
            Err(SchedulerError::InvalidQuantum)
        ));
        assert_eq!(Policy::round_robin(3).unwrap().slice_limit(), 3);
    }

    #[test]
    fn display_includes_quantum_for_round_robin() {
        assert_eq!(Policy::round_robin(2).unwrap().to_string(), "Round Robin (q=2)");
        assert_eq!(Policy::RatioGreen.to_string(), "GreenOS");
    }

    // ── Rates ─────────────────────────────────────────────────────────────────

    #[test]
    fn busy_rates_per_policy() {
        assert_eq!(Policy::Fcfs.energy_rates().busy, 2.0);
        assert_eq!(Policy::round_robin(2).unwrap().energy_rates().busy, 1.5);
        assert_eq!(Policy::Edf.energy_rates().busy, 1.2);
        assert_eq!(Policy::RatioGreen.energy_rates().busy, 1.0);
        for p in Policy::all(DEFAULT_QUANTUM) {
            assert_eq!(p.energy_rates().idle, 0.5, "{p}");
        }
    }

    #[test]
    fn only_round_robin_preempts() {
        let preemptive: Vec<_> = Policy::all(DEFAULT_QUANTUM)
            .into_iter()
            .filter(Policy::is_preemptive)
            .collect();
        assert_eq!(preemptive, [Policy::RoundRobin { quantum: DEFAULT_QUANTUM }]);
        assert_eq!(Policy::Edf.slice_limit(), u64::MAX);
    }

    // ── select ────────────────────────────────────────────────────────────────

    #[test]
    fn fcfs_and_round_robin_take_queue_head() {
        let tasks = [state("A", 0, 1, 9), state("B", 0, 1, 1)];
        assert_eq!(pick_all(Policy::Fcfs, &tasks), ["A", "B"]);
        assert_eq!(pick_all(Policy::round_robin(2).unwrap(), &tasks), ["A", "B"]);
    }

    #[test]
    fn edf_orders_by_deadline() {
        let tasks = [state("A", 0, 4, 10), state("B", 1, 3, 8), state("C", 2, 2, 5)];
        assert_eq!(pick_all(Policy::Edf, &tasks), ["C", "B", "A"]);
    }

    #[test]
    fn edf_breaks_ties_by_arrival_then_position() {
        let tasks = [
            state("late", 3, 1, 7),
            state("first", 1, 1, 7),
            state("second", 1, 1, 7),
        ];
        assert_eq!(pick_all(Policy::Edf, &tasks), ["first", "second", "late"]);
    }

    #[test]
    fn ratio_green_orders_by_ratio() {
        // ratios: A=2.5, B≈2.67, D=6.0
        let tasks = [state("D", 3, 1, 6), state("B", 1, 3, 8), state("A", 0, 4, 10)];
        assert_eq!(pick_all(Policy::RatioGreen, &tasks), ["A", "B", "D"]);
    }

    #[test]
    fn ratio_green_exact_tie_falls_back_to_arrival() {
        // 10/4 == 5/2 exactly; C listed first but arrives later
        let tasks = [state("C", 2, 2, 5), state("A", 0, 4, 10)];
        assert_eq!(pick_all(Policy::RatioGreen, &tasks), ["A", "C"]);
    }

    #[test]
    fn ratio_order_does_not_overflow_on_large_values() {
        let a = TaskSpec {
            name: "a".into(),
            arrival_time: 0,
            burst_time: u64::MAX,
            deadline: u64::MAX,
        };
        let b = TaskSpec {
            name: "b".into(),
            arrival_time: 0,
            burst_time: 1,
            deadline: u64::MAX,
        };
        assert_eq!(ratio_green_order(&a, &b), Ordering::Less);
        assert!((urgency_ratio(&a) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn logged_ratio_matches_ratio_green_pick_order() {
        let tasks = [
            state("T1", 0, 4, 10),
            state("T2", 1, 3, 8),
            state("T3", 2, 2, 5),
            state("T4", 3, 1, 6),
        ];
        let ratios: Vec<f64> = pick_all(Policy::RatioGreen, &tasks)
            .iter()
            .map(|name| {
                let t = tasks.iter().find(|t| t.name() == *name).unwrap();
                urgency_ratio(t.spec())
            })
            .collect();
        assert!(ratios.windows(2).all(|w| w[0] <= w[1]), "{ratios:?}");
    }

    #[test]
    fn select_on_empty_queue_is_none() {
        let mut ready = VecDeque::new();
        for p in Policy::all(DEFAULT_QUANTUM) {
            assert_eq!(p.select(&mut ready, &[]), None);
        }
    }
}
