/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! # boomgate-rs
//!
//! A concurrency-safe boom-gate actuator simulator.
//!
//! Two unrelated call paths can trigger a physical gate: an operator on a
//! real-time control channel, and an automated trigger fired when a payment
//! completes. This crate is the arbitration core that makes that safe:
//!
//! - **[`dispatcher`]** — the single entry point both paths submit through.
//!   One operation slot with acquire-or-fail semantics guarantees at most
//!   one in-flight sequence per gate; emergency stop bypasses the slot and
//!   preempts whatever is running.
//! - **[`sequencer`]** — executes one open/close/auto-cycle sequence as a
//!   fixed step list with cancellable holds, on its own task.
//! - **[`gate`]** — the state machine owning barrier position, enforcing
//!   legal transitions and stamping operation outcomes, all under one lock
//!   with strictly version-ordered snapshots.
//! - **[`sound`]** — timed audio-cue timelines per phase; fire-and-forget
//!   playback whose failure never disturbs the mechanical sequence.
//! - **[`broadcast`]** — snapshot fan-out to any number of observers with
//!   per-observer failure isolation.
//! - **[`audit`]** — one record per terminal operation outcome.
//!
//! # Examples
//!
//! ```no_run
//! use boomgate_rs::dispatcher::{Dispatcher, TriggerSource};
//! use boomgate_rs::GateConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Dispatcher::new(GateConfig::default());
//! let mut observer = dispatcher.subscribe();
//!
//! // Operator path.
//! dispatcher.submit_json(r#"{"command": "open"}"#, TriggerSource::ControlChannel)?;
//!
//! // Payment path: never raises, a busy gate is logged and absorbed.
//! dispatcher.trigger_for_payment("tx-1", "ABC 1234", Some(8.0));
//!
//! while let Some(snapshot) = observer.recv().await {
//!     println!("{} v{}: {}", snapshot.gate_id, snapshot.sequence_version, snapshot.position);
//! }
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod broadcast;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod gate;
pub mod sequencer;
pub mod sound;

// Re-export main types
pub use audit::{AuditLog, InMemoryAuditLog, OperationRecord, TracingAuditLog};
pub use broadcast::{Broadcaster, StatusSubscription};
pub use config::{GateConfig, SequenceTimings};
pub use dispatcher::{Dispatcher, GateCommand, OperationRequest, SubmitOutcome, TriggerSource};
pub use error::GateError;
pub use gate::{Gate, GatePosition, GateSnapshot, GateStatus, LastOperation, OperationOutcome};
pub use sequencer::{SequenceKind, SequenceStep};
pub use sound::{AudioSink, ClipId, SoundCue, SoundPhase, Timeline, TracingSink};
