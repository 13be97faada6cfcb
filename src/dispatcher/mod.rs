/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Trigger dispatcher: serializes every trigger path onto one gate.
//!
//! # Architecture
//!
//! - One [`Dispatcher`] instance per gate; both the control channel and the
//!   automated payment trigger submit through it
//! - A single-permit semaphore is the operation slot: acquire-or-fail,
//!   never queue
//! - Emergency stop bypasses the slot, signals preemption through a watch
//!   channel and applies the stopped position directly
//! - Accepted sequences run on their own task; `submit` returns immediately
//!
//! # Examples
//!
//! ```no_run
//! use boomgate_rs::dispatcher::{Dispatcher, TriggerSource};
//! use boomgate_rs::GateConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Dispatcher::new(GateConfig::default());
//!
//! // Control channel speaks JSON.
//! let outcome = dispatcher.submit_json(
//!     r#"{"command": "open"}"#,
//!     TriggerSource::ControlChannel,
//! )?;
//!
//! // The payment collaborator uses the convenience trigger.
//! dispatcher.trigger_for_payment("tx-1", "ABC 1234", None);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod outcome;
pub mod request;

#[cfg(test)]
mod tests;

pub use core::Dispatcher;
pub use outcome::SubmitOutcome;
pub use request::{GateCommand, OperationRequest, TriggerSource};
