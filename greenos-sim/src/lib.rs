/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! GreenOS – single-core scheduling simulator with energy accounting
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── task/           – task specs, per-run task state, timeline records
//! ├── scheduler/      – policies, simulation driver, metrics, comparison
//! ├── energy/         – linear energy model, subsystem breakdown, baseline
//! └── config/         – workload file loading (YAML / JSON / CSV)
//! ```

pub mod config;
pub mod energy;
pub mod scheduler;
pub mod task;
