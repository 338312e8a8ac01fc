//! # CyberClub Scheduler
//!
//! Lightweight recurring-job runner for the bot process.
//! Tokio timers only — zero overhead when idle, no job queue, no broker.
//!
//! ## Architecture
//! ```text
//! SchedulerEngine (one tokio task per job)
//!   ├── IntervalTrigger: every 60s  → prune expired events
//!   └── CronTrigger:     "0 7 * * *" @ zone → post the daily fact
//! ```
//!
//! Jobs are registered once at startup and run for the process lifetime;
//! `start`/`stop` bound the Running state. A job tick is awaited inline, so
//! a job never overlaps itself; independent jobs interleave freely.

pub mod engine;
pub mod trigger;

pub use engine::{Job, SchedulerEngine};
pub use trigger::Trigger;
