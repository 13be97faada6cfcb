/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Trigger dispatcher: the single arbitration point for every call path.
//!
//! Both the operator control channel and the automated payment trigger call
//! [`Dispatcher::submit`]. The dispatcher owns the one operation slot (a
//! single-permit semaphore with acquire-or-fail semantics), the preemption
//! signal, and the source-dependent error policy. Because every entry path
//! goes through the same instance, the at-most-one-sequence guarantee holds
//! no matter where a request came from.

use super::outcome::SubmitOutcome;
use super::request::{GateCommand, OperationRequest, TriggerSource};
use crate::audit::{AuditLog, TracingAuditLog};
use crate::broadcast::{Broadcaster, StatusSubscription};
use crate::config::GateConfig;
use crate::error::GateError;
use crate::gate::{Gate, GatePosition, GateSnapshot};
use crate::sequencer::{SequenceKind, SequenceRun, steps_for};
use crate::sound::{SharedSink, SoundPhase, Timeline, TracingSink};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, watch};
use tracing::{info, warn};
use uuid::Uuid;

/// Longest accepted auto-cycle dwell. Anything above this is a typo, not a
/// parking lot.
const MAX_OPEN_HOLD_SECS: f64 = 86_400.0;

/// Single entry point for gate triggers.
///
/// Cheap to clone: every call path holds its own clone and all shared state
/// sits behind `Arc`. `submit` never blocks on a running sequence — it
/// answers immediately with an acknowledgement or a typed failure.
///
/// # Examples
///
/// ```no_run
/// use boomgate_rs::dispatcher::{Dispatcher, GateCommand, OperationRequest, TriggerSource};
/// use boomgate_rs::GateConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let dispatcher = Dispatcher::new(GateConfig::default());
/// let request = OperationRequest::new(GateCommand::Open, TriggerSource::ControlChannel);
/// let outcome = dispatcher.submit(request)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    gate: Arc<Gate>,
    timeline: Arc<Timeline>,
    sink: SharedSink,
    audit: Arc<dyn AuditLog>,
    slot: Arc<Semaphore>,
    preempt: Arc<watch::Sender<u64>>,
    config: GateConfig,
}

impl Dispatcher {
    /// Wires a gate with the default collaborators: a fresh broadcaster, the
    /// tracing audio sink and the tracing audit log.
    #[must_use]
    pub fn new(config: GateConfig) -> Self {
        Self::with_parts(
            config,
            Broadcaster::new(),
            Arc::new(TracingSink),
            Arc::new(TracingAuditLog),
        )
    }

    /// Wires a gate with explicit collaborators. Listeners must already be
    /// registered on the broadcaster; it is consumed here.
    #[must_use]
    pub fn with_parts(
        config: GateConfig,
        broadcaster: Broadcaster,
        sink: SharedSink,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        let gate = Arc::new(Gate::new(
            config.gate_id.clone(),
            config.sound_enabled,
            broadcaster,
        ));
        let (preempt, _) = watch::channel(0);
        Self {
            gate,
            timeline: Arc::new(Timeline::new(&config.timings)),
            sink,
            audit,
            slot: Arc::new(Semaphore::new(1)),
            preempt: Arc::new(preempt),
            config,
        }
    }

    /// Handles one trigger request, applying the source policy.
    ///
    /// Control-channel callers see every failure. Automated callers see only
    /// boundary-fatal ones (`InvalidParameter`, `UnknownCommand`,
    /// `MalformedRequest`); anything else — a busy gate, a mispositioned
    /// gate — is logged and answered [`SubmitOutcome::NotAccepted`], because
    /// the payment behind the trigger has already succeeded.
    ///
    /// Must be called within a tokio runtime: accepted sequences are spawned
    /// onto it.
    ///
    /// # Errors
    ///
    /// [`GateError::GateBusy`] when a sequence is already running,
    /// [`GateError::InvalidParameter`] for an unusable open duration,
    /// [`GateError::InvalidTransition`] when the gate cannot start the
    /// requested sequence from its current position.
    pub fn submit(&self, request: OperationRequest) -> Result<SubmitOutcome, GateError> {
        let source = request.source;
        match self.dispatch(request) {
            Err(err) if source == TriggerSource::AutomatedTrigger && !err.is_fatal_for_automated() => {
                warn!(%err, "automated trigger not accepted");
                Ok(SubmitOutcome::NotAccepted { error: err })
            }
            other => other,
        }
    }

    /// Parses a wire payload and submits it.
    ///
    /// # Errors
    ///
    /// Parse failures ([`GateError::MalformedRequest`],
    /// [`GateError::UnknownCommand`]) plus everything `submit` returns.
    pub fn submit_json(&self, payload: &str, source: TriggerSource) -> Result<SubmitOutcome, GateError> {
        self.submit(OperationRequest::from_json(payload, source)?)
    }

    /// Convenience entry for the payment-completion collaborator: fire an
    /// auto-cycle for a paid vehicle. Never raises — a busy gate is logged
    /// and reported as `false`, which the payment flow ignores.
    pub fn trigger_for_payment(
        &self,
        transaction_id: impl Into<String>,
        vehicle_plate: impl Into<String>,
        open_duration_seconds: Option<f64>,
    ) -> bool {
        let mut request =
            OperationRequest::new(GateCommand::AutoCycle, TriggerSource::AutomatedTrigger)
                .with_transaction(transaction_id)
                .with_plate(vehicle_plate);
        request.open_duration_seconds = open_duration_seconds;
        match self.submit(request) {
            Ok(outcome) => outcome.is_accepted(),
            Err(err) => {
                warn!(%err, "payment trigger rejected");
                false
            }
        }
    }

    /// Current snapshot, answered synchronously from the gate.
    #[must_use]
    pub fn status(&self) -> GateSnapshot {
        self.gate.snapshot()
    }

    /// Registers an observer for all subsequent snapshots.
    #[must_use]
    pub fn subscribe(&self) -> StatusSubscription {
        self.gate.subscribe()
    }

    /// Removes an observer on transport disconnect.
    pub fn unsubscribe(&self, observer_id: u64) {
        self.gate.unsubscribe(observer_id);
    }

    /// The gate this dispatcher drives.
    #[must_use]
    pub fn gate(&self) -> &Arc<Gate> {
        &self.gate
    }

    fn dispatch(&self, request: OperationRequest) -> Result<SubmitOutcome, GateError> {
        info!(command = %request.command, source = %request.source, "trigger received");
        match request.command {
            GateCommand::GetStatus => Ok(SubmitOutcome::Status {
                snapshot: self.gate.snapshot(),
            }),
            GateCommand::ToggleSound => Ok(SubmitOutcome::SoundToggled {
                snapshot: self.gate.toggle_sound(),
            }),
            GateCommand::EmergencyStop => Ok(self.emergency_stop()),
            GateCommand::Open | GateCommand::Close | GateCommand::AutoCycle => {
                self.start_sequence(request)
            }
        }
    }

    /// Bypasses the slot entirely. The preemption signal reaches any running
    /// sequence at its next check; the position change is applied here so it
    /// is immediate even mid-sequence.
    fn emergency_stop(&self) -> SubmitOutcome {
        self.preempt.send_modify(|n| *n = n.wrapping_add(1));
        let idle = self.slot.try_acquire();
        let snapshot = match self.gate.emergency_stop() {
            Some(snapshot) => {
                warn!(gate_id = %snapshot.gate_id, "emergency stop applied");
                // A running sequence plays its own alert when it aborts.
                if idle.is_ok() && self.gate.sound_enabled() {
                    self.timeline
                        .dispatch_phase(SoundPhase::EmergencyAlert, &self.sink);
                }
                snapshot
            }
            None => self.gate.snapshot(),
        };
        SubmitOutcome::EmergencyApplied { snapshot }
    }

    fn start_sequence(&self, request: OperationRequest) -> Result<SubmitOutcome, GateError> {
        let open_hold = self.validate_open_hold(&request)?;

        // Acquire-or-fail: a second trigger while a sequence runs must fail
        // fast, never queue.
        let permit = self
            .slot
            .clone()
            .try_acquire_owned()
            .map_err(|_| GateError::GateBusy)?;

        // Subscribe before the position pre-flight: a stop signalled any
        // time after this line is seen by the run.
        let preempt_rx = self.preempt.subscribe();
        let position = self.gate.position();
        if request.command == GateCommand::Close && position == GatePosition::EmergencyStopped {
            let snapshot = self.gate.reset()?;
            drop(permit);
            return Ok(SubmitOutcome::ResetApplied { snapshot });
        }

        let kind = match request.command {
            GateCommand::Open => SequenceKind::Open,
            GateCommand::Close => SequenceKind::Close,
            _ => SequenceKind::AutoCycle,
        };
        if position != kind.expected_start() {
            // Report the impossible sequence to the caller now instead of
            // letting the run die on its first edge.
            drop(permit);
            return Err(GateError::InvalidTransition {
                from: position,
                attempted: match kind {
                    SequenceKind::Close => GatePosition::Closing,
                    _ => GatePosition::Opening,
                },
            });
        }

        let operation_id = Uuid::new_v4();
        self.gate
            .begin_operation(request.transaction_id.clone(), request.vehicle_plate.clone());
        let run = SequenceRun::new(
            self.gate.clone(),
            self.timeline.clone(),
            self.sink.clone(),
            self.audit.clone(),
            preempt_rx,
            operation_id,
            kind,
            steps_for(kind, &self.config.timings, open_hold),
        );
        info!(%operation_id, %kind, source = %request.source, "sequence started");
        tokio::spawn(run.run(permit));
        Ok(SubmitOutcome::SequenceStarted { operation_id, kind })
    }

    /// Validated before the slot is touched, so a bad parameter never
    /// occupies the gate.
    fn validate_open_hold(&self, request: &OperationRequest) -> Result<Duration, GateError> {
        match request.open_duration_seconds {
            None => Ok(self.config.timings.default_open_hold()),
            Some(secs) if secs.is_finite() && secs > 0.0 && secs <= MAX_OPEN_HOLD_SECS => {
                Ok(Duration::from_secs_f64(secs))
            }
            Some(secs) => Err(GateError::InvalidParameter(format!(
                "open_duration_seconds must be a positive number of seconds, got {secs}"
            ))),
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("gate_id", &self.config.gate_id)
            .field("slot_available", &(self.slot.available_permits() > 0))
            .finish()
    }
}
