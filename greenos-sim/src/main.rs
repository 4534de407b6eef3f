/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use greenos_sim::config::load_workload;
use greenos_sim::scheduler::policy::urgency_ratio;
use greenos_sim::scheduler::{best_by_energy, compare_policies, Policy, SimulationResult};
use greenos_sim::task::TaskSet;

// ── CLI argument definition ───────────────────────────────────────────────────

/// GreenOS single-core scheduling simulator.
///
/// Example:
///   greenos-sim -w workload.csv -p all -q 2
#[derive(Debug, Parser)]
#[command(
    name = "greenos-sim",
    about = "GreenOS energy-aware scheduling simulator",
    long_about = None,
)]
struct Cli {
    /// Workload file (.yaml, .yml, .json or .csv).  Uses the built-in demo
    /// workload when omitted.
    #[arg(short = 'w', long = "workload")]
    workload: Option<PathBuf>,

    /// Policy to simulate: fcfs, rr, edf, green, or all.
    #[arg(short = 'p', long = "policy", default_value = "all")]
    policy: String,

    /// Round-robin time quantum.
    #[arg(short = 'q', long = "quantum", default_value_t = 2)]
    quantum: u64,
}

impl Cli {
    fn policies(&self) -> Result<Vec<Policy>> {
        let rr = Policy::round_robin(self.quantum)?;
        if self.policy.eq_ignore_ascii_case("all") {
            return Ok(vec![Policy::Fcfs, rr, Policy::Edf, Policy::RatioGreen]);
        }

        let policy: Policy = self
            .policy
            .parse()
            .with_context(|| format!("invalid --policy '{}'", self.policy))?;
        Ok(vec![match policy {
            Policy::RoundRobin { .. } => rr,
            other => other,
        }])
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!(
        workload = ?cli.workload,
        policy   = %cli.policy,
        quantum  = cli.quantum,
        "Configuration"
    );

    if let Err(e) = run(&cli).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let policies = cli.policies()?;

    let set = match &cli.workload {
        Some(path) => load_workload(path)?,
        None => {
            warn!("No workload file provided, using the built-in demo workload");
            TaskSet::demo()
        }
    };

    for r in set.rejected() {
        warn!(task = %r.name, reason = %r.reason, "skipped invalid task");
    }
    info!("Simulating {} task(s):", set.len());
    for s in set.specs() {
        info!(
            "  [{name}]  arrival={at}  burst={bt}  deadline={dl}  ratio={ratio:.2}",
            name = s.name,
            at = s.arrival_time,
            bt = s.burst_time,
            dl = s.deadline,
            ratio = urgency_ratio(s),
        );
    }

    let results = compare_policies(set.into_specs(), &policies).await?;
    for result in &results {
        report(result);
    }

    if results.len() > 1 {
        if let Some(best) = best_by_energy(&results) {
            info!(
                policy = %best.policy(),
                energy = best.total_energy(),
                "Most energy-efficient policy"
            );
        }
    }
    Ok(())
}

fn report(result: &SimulationResult) {
    info!("── {} ──", result.policy());

    for (label, start, end) in schedule_rows(result) {
        info!("  {:<12} {:>5} → {:<5}", label, start, end);
    }

    let energy = result.energy();
    info!(
        total = energy.total(),
        busy = energy.busy_energy,
        idle = energy.idle_energy,
        baseline = energy.baseline,
        saved = energy.saved(),
        "Energy"
    );
    if let Some(b) = result.subsystems() {
        for (name, value) in b.entries() {
            info!("  {name:<12} {value:.2}");
        }
        info!("  {:<12} {:.2}", "unattributed", b.unattributed());
    }

    let missed = result.missed_deadlines();
    if missed.is_empty() {
        info!("Missed deadlines: none");
    } else {
        info!("Missed deadlines: {}", missed.join(", "));
    }

    let s = result.summary();
    info!(
        makespan = s.makespan,
        utilization = s.utilization,
        avg_turnaround = s.avg_turnaround,
        avg_waiting = s.avg_waiting,
        total_tardiness = s.total_tardiness,
        on_time_rate = s.on_time_rate,
        context_switches = s.context_switches,
        "Summary"
    );
}

/// Dispatch intervals and idle periods merged into one list ordered by start
/// time.  Intervals never overlap, so starts are distinct.
fn schedule_rows(result: &SimulationResult) -> Vec<(&str, u64, u64)> {
    let mut rows: Vec<_> = result
        .timeline()
        .iter()
        .map(|e| (e.task_name.as_str(), e.start, e.end))
        .chain(
            result
                .idle_periods()
                .iter()
                .map(|i| ("(idle)", i.start, i.end)),
        )
        .collect();
    rows.sort_by_key(|&(_, start, _)| start);
    rows
}
