/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Operation sequencer: cancellable, time-ordered execution of one
//! open/close/auto-cycle sequence.
//!
//! # Architecture
//!
//! - A sequence is a fixed, ordered list of [`SequenceStep`]s built as plain
//!   data from the configured timings
//! - The executor runs on its own spawned task so its timed holds never
//!   block the dispatcher
//! - Holds are the only suspension points; preemption is checked there and
//!   around every state transition, which bounds worst-case preemption
//!   latency to one step's duration
//! - Terminal outcomes are stamped atomically with the mutation that
//!   produces the final snapshot, then appended to the audit log

pub mod run;
pub mod steps;

pub(crate) use run::SequenceRun;
pub use steps::{SequenceKind, SequenceStep, scheduled_duration, steps_for};
