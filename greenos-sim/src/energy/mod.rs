//! Linear energy accounting.
//!
//! Every simulated time unit costs a fixed amount that depends only on
//! whether the core was busy or idle and on which policy is running:
//!
//! | Policy | Busy / unit | Idle / unit |
//! |---|---|---|
//! | FCFS | 2.0 | 0.5 |
//! | Round Robin | 1.5 | 0.5 |
//! | EDF | 1.2 | 0.5 |
//! | GreenOS (RatioGreen) | 1.0 | 0.5 |
//!
//! A baseline figure of `1.5 × Σ burst_time` (no idle-time optimisation,
//! arrival gaps ignored) is attached to every report so the caller can read
//! off the energy saved by a policy.
//!
//! Time is accumulated as integer units in an [`EnergyMeter`] and multiplied
//! by the rate once at the end, so the totals do not drift from repeated
//! floating-point additions.

pub mod subsystem;

use tracing::debug;

use crate::task::TaskSpec;
pub use subsystem::SubsystemBreakdown;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Energy per idle (sleep-state) unit, identical for every policy.
pub const IDLE_RATE: f64 = 0.5;

/// Flat rate per unit of burst time used for the baseline comparison.
pub const BASELINE_RATE: f64 = 1.5;

// ── EnergyRates ───────────────────────────────────────────────────────────────

/// Busy and idle energy cost per simulated time unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyRates {
    pub busy: f64,
    pub idle: f64,
}

impl EnergyRates {
    pub const FCFS: Self = Self {
        busy: 2.0,
        idle: IDLE_RATE,
    };
    pub const ROUND_ROBIN: Self = Self {
        busy: 1.5,
        idle: IDLE_RATE,
    };
    pub const EDF: Self = Self {
        busy: 1.2,
        idle: IDLE_RATE,
    };
    pub const RATIO_GREEN: Self = Self {
        busy: 1.0,
        idle: IDLE_RATE,
    };
}

/// Baseline energy for a task set: `BASELINE_RATE × Σ burst_time`.
pub fn baseline_energy(specs: &[TaskSpec]) -> f64 {
    let total_burst: f64 = specs.iter().map(|s| s.burst_time as f64).sum();
    total_burst * BASELINE_RATE
}

// ── EnergyMeter ───────────────────────────────────────────────────────────────

/// Per-run accumulator of busy and idle time.
#[derive(Debug, Clone)]
pub struct EnergyMeter {
    rates: EnergyRates,
    busy_time: u64,
    idle_time: u64,
}

impl EnergyMeter {
    pub fn new(rates: EnergyRates) -> Self {
        Self {
            rates,
            busy_time: 0,
            idle_time: 0,
        }
    }

    pub fn accrue_busy(&mut self, units: u64) {
        self.busy_time += units;
    }

    pub fn accrue_idle(&mut self, units: u64) {
        self.idle_time += units;
    }

    /// Close the meter and produce the final report.
    ///
    /// `with_subsystems` attaches a [`SubsystemBreakdown`] of the busy time;
    /// `baseline` is the figure from [`baseline_energy`].
    pub fn finish(self, baseline: f64, with_subsystems: bool) -> EnergyReport {
        let busy_energy = self.busy_time as f64 * self.rates.busy;
        let idle_energy = self.idle_time as f64 * self.rates.idle;
        let subsystems =
            with_subsystems.then(|| SubsystemBreakdown::from_busy(self.busy_time, busy_energy));

        if let Some(b) = &subsystems {
            debug!(
                attributed = b.attributed(),
                unattributed = b.unattributed(),
                "subsystem breakdown"
            );
        }

        EnergyReport {
            rates: self.rates,
            busy_time: self.busy_time,
            idle_time: self.idle_time,
            busy_energy,
            idle_energy,
            subsystems,
            baseline,
        }
    }
}

// ── EnergyReport ──────────────────────────────────────────────────────────────

/// Energy figures of one completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyReport {
    pub rates: EnergyRates,
    pub busy_time: u64,
    pub idle_time: u64,
    pub busy_energy: f64,
    pub idle_energy: f64,
    /// Present only for policies that track subsystems (RatioGreen).
    pub subsystems: Option<SubsystemBreakdown>,
    /// Baseline figure for the same task set.
    pub baseline: f64,
}

impl EnergyReport {
    pub fn total(&self) -> f64 {
        self.busy_energy + self.idle_energy
    }

    /// `baseline − total`.  Negative when the policy costs more than the
    /// baseline.
    pub fn saved(&self) -> f64 {
        self.baseline - self.total()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
