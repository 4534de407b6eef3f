/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Per-subsystem apportioning of busy time.
//!
//! Only the RatioGreen policy reports a breakdown.  Each busy time unit is
//! charged to four hardware subsystems at fixed fractions:
//!
//! | Subsystem | Fraction per busy unit |
//! |---|---|
//! | processor | 0.50 |
//! | accelerator | 0.20 |
//! | memory | 0.15 |
//! | display | 0.10 |
//!
//! The fractions add up to 0.95 while RatioGreen charges 1.0 per busy unit.
//! The breakdown is reported as-is, without renormalising; the remaining
//! 0.05 per unit shows up in [`SubsystemBreakdown::unattributed`].

pub const PROCESSOR_FRACTION: f64 = 0.5;
pub const ACCELERATOR_FRACTION: f64 = 0.2;
pub const MEMORY_FRACTION: f64 = 0.15;
pub const DISPLAY_FRACTION: f64 = 0.1;

/// Energy attributed to each subsystem over one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubsystemBreakdown {
    pub processor: f64,
    pub accelerator: f64,
    pub memory: f64,
    pub display: f64,

    /// Busy energy the breakdown was taken from.
    busy_energy: f64,
}

impl SubsystemBreakdown {
    /// Apportion `busy_time` units whose total charge was `busy_energy`.
    pub fn from_busy(busy_time: u64, busy_energy: f64) -> Self {
        let t = busy_time as f64;
        Self {
            processor: t * PROCESSOR_FRACTION,
            accelerator: t * ACCELERATOR_FRACTION,
            memory: t * MEMORY_FRACTION,
            display: t * DISPLAY_FRACTION,
            busy_energy,
        }
    }

    /// Sum of the four subsystem figures.
    pub fn attributed(&self) -> f64 {
        self.processor + self.accelerator + self.memory + self.display
    }

    /// Busy energy not charged to any subsystem.
    pub fn unattributed(&self) -> f64 {
        self.busy_energy - self.attributed()
    }

    /// `(label, value)` pairs in a fixed order, for display.
    pub fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("processor", self.processor),
            ("accelerator", self.accelerator),
            ("memory", self.memory),
            ("display", self.display),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
