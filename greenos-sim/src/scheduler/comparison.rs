/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Side-by-side policy comparison.
//!
//! Each policy runs on its own `spawn_blocking` worker.  Workers share only
//! the immutable spec slice (behind an `Arc`); every [`Simulator::run`]
//! builds its own task state, so there is nothing to synchronise.

use std::sync::Arc;

use tracing::{info, warn};

use super::{Policy, SchedulerError, SimulationResult, Simulator};
use crate::task::TaskSpec;

/// Run every policy in `policies` over the same task specs.
///
/// Results are returned in the order the policies were given, regardless of
/// which worker finishes first.
///
/// # Errors
/// [`SchedulerError::WorkerFailed`] if a worker panicked (e.g. a hand-built
/// spec with a zero burst time) or was cancelled.
pub async fn compare_policies(
    specs: impl Into<Arc<[TaskSpec]>>,
    policies: &[Policy],
) -> Result<Vec<SimulationResult>, SchedulerError> {
    let specs: Arc<[TaskSpec]> = specs.into();

    info!(
        policies = policies.len(),
        task_count = specs.len(),
        "comparing policies"
    );

    let handles: Vec<_> = policies
        .iter()
        .map(|&policy| {
            let specs = Arc::clone(&specs);
            let handle = tokio::task::spawn_blocking(move || Simulator::new(policy).run(&specs));
            (policy, handle)
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (policy, handle) in handles {
        let result = handle.await.map_err(|source| {
            warn!(policy = %policy, error = %source, "simulation worker failed");
            SchedulerError::WorkerFailed {
                policy: policy.to_string(),
                source,
            }
        })?;
        results.push(result);
    }

    Ok(results)
}

/// The result with the lowest total energy.  Ties go to the earliest entry.
pub fn best_by_energy(results: &[SimulationResult]) -> Option<&SimulationResult> {
    results.iter().fold(None, |best, r| match best {
        Some(b) if b.total_energy() <= r.total_energy() => Some(b),
        _ => Some(r),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::DEFAULT_QUANTUM;
    use crate::task::TaskSet;

    #[tokio::test]
    async fn results_follow_policy_order() {
        let policies = Policy::all(DEFAULT_QUANTUM);
        let results = compare_policies(TaskSet::demo().into_specs(), &policies)
            .await
            .unwrap();

        let got: Vec<Policy> = results.iter().map(SimulationResult::policy).collect();
        assert_eq!(got, policies);
    }

    #[tokio::test]
    async fn concurrent_runs_match_sequential_runs() {
        let specs = TaskSet::demo().into_specs();
        let policies = Policy::all(DEFAULT_QUANTUM);
        let results = compare_policies(specs.as_slice(), &policies).await.unwrap();

        for (policy, concurrent) in policies.iter().zip(&results) {
            let sequential = Simulator::new(*policy).run(&specs);
            assert_eq!(concurrent.timeline(), sequential.timeline(), "{policy}");
            assert_eq!(concurrent.total_energy(), sequential.total_energy(), "{policy}");
        }
    }

    #[tokio::test]
    async fn same_policy_twice_gives_identical_results() {
        let results = compare_policies(TaskSet::demo().into_specs(), &[Policy::RatioGreen; 2])
            .await
            .unwrap();
        assert_eq!(results[0].timeline(), results[1].timeline());
        assert_eq!(results[0].missed_deadlines(), results[1].missed_deadlines());
    }

    #[tokio::test]
    async fn green_is_cheapest_on_demo_workload() {
        let policies = Policy::all(DEFAULT_QUANTUM);
        let results = compare_policies(TaskSet::demo().into_specs(), &policies)
            .await
            .unwrap();
        let best = best_by_energy(&results).unwrap();
        assert_eq!(best.policy(), Policy::RatioGreen);
        assert!((best.total_energy() - 10.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn panicking_worker_surfaces_as_error() {
        let bad = vec![TaskSpec {
            name: "Z".into(),
            arrival_time: 0,
            burst_time: 0,
            deadline: 1,
        }];
        let err = compare_policies(bad, &[Policy::Fcfs]).await.unwrap_err();
        assert!(matches!(err, SchedulerError::WorkerFailed { ref policy, .. } if policy == "FCFS"));
    }

    #[tokio::test]
    async fn empty_inputs() {
        let results = compare_policies(Vec::<TaskSpec>::new(), &[]).await.unwrap();
        assert!(results.is_empty());
        assert!(best_by_energy(&results).is_none());
    }

    #[test]
    fn best_by_energy_prefers_first_on_tie() {
        // FCFS costs 20.0, both GreenOS runs 10.0
        let specs = TaskSet::demo().into_specs();
        let results: Vec<_> = [Policy::Fcfs, Policy::RatioGreen, Policy::RatioGreen]
            .into_iter()
            .map(|p| Simulator::new(p).run(&specs))
            .collect();
        let best = best_by_energy(&results).unwrap();
        assert!(std::ptr::eq(best, &results[1]));
    }
}
