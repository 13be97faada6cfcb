use boomgate_rs::audit::InMemoryAuditLog;
use boomgate_rs::broadcast::Broadcaster;
use boomgate_rs::dispatcher::{Dispatcher, GateCommand, OperationRequest, TriggerSource};
use boomgate_rs::error::GateError;
use boomgate_rs::gate::{GatePosition, OperationOutcome};
use boomgate_rs::sound::{AudioSink, SoundCue, TracingSink};
use boomgate_rs::GateConfig;
use std::sync::Arc;
use std::time::Duration;

/// Sink that fails every play call, simulating a dead audio device.
struct DeadSink;

impl AudioSink for DeadSink {
    fn play(&self, cue: &SoundCue) -> Result<(), GateError> {
        Err(GateError::AudioUnavailable {
            clip: cue.clip.to_string(),
        })
    }
}

fn dispatcher_with_audit() -> (Dispatcher, Arc<InMemoryAuditLog>) {
    let audit = Arc::new(InMemoryAuditLog::new());
    let dispatcher = Dispatcher::with_parts(
        GateConfig::default(),
        Broadcaster::new(),
        Arc::new(TracingSink),
        audit.clone(),
    );
    (dispatcher, audit)
}

fn control(command: GateCommand) -> OperationRequest {
    OperationRequest::new(command, TriggerSource::ControlChannel)
}

/// Drains the observer stream until a snapshot carries a terminal outcome,
/// returning every position seen along the way.
async fn positions_until_terminal(
    observer: &mut boomgate_rs::StatusSubscription,
) -> (Vec<GatePosition>, OperationOutcome) {
    let mut positions = Vec::new();
    loop {
        let snapshot = observer.recv().await.expect("gate dropped");
        positions.push(snapshot.position);
        if let Some(outcome) = snapshot.last_operation.and_then(|op| op.outcome) {
            return (positions, outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_open_sequence_walks_every_position() {
        let (dispatcher, _audit) = dispatcher_with_audit();
        let mut observer = dispatcher.subscribe();

        dispatcher.submit(control(GateCommand::Open)).unwrap();
        let (positions, outcome) = positions_until_terminal(&mut observer).await;

        assert_eq!(positions, vec![GatePosition::Opening, GatePosition::Open]);
        assert_eq!(outcome, OperationOutcome::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_cycle_wall_time_is_open_hold_close() {
        let (dispatcher, _audit) = dispatcher_with_audit();
        let mut observer = dispatcher.subscribe();
        let started = tokio::time::Instant::now();

        dispatcher
            .submit(control(GateCommand::AutoCycle).with_open_duration(5.0))
            .unwrap();
        let (_, outcome) = positions_until_terminal(&mut observer).await;
        assert_eq!(outcome, OperationOutcome::Completed);

        // Open sequence 4.5 s + hold 5 s + close sequence 4 s.
        let elapsed = started.elapsed();
        let expected = Duration::from_millis(13_500);
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(100),
            "elapsed {elapsed:?}, expected {expected:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_trip_returns_closed_with_exact_version_count() {
        let (dispatcher, audit) = dispatcher_with_audit();
        let mut observer = dispatcher.subscribe();

        dispatcher.submit(control(GateCommand::Open)).unwrap();
        positions_until_terminal(&mut observer).await;
        dispatcher.submit(control(GateCommand::Close)).unwrap();
        positions_until_terminal(&mut observer).await;

        let snapshot = dispatcher.status();
        assert_eq!(snapshot.position, GatePosition::Closed);
        // Two transitions per sequence, nothing else broadcast.
        assert_eq!(snapshot.sequence_version, 4);
        assert_eq!(audit.records().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_hold_applies_when_caller_gives_none() {
        let (dispatcher, _audit) = dispatcher_with_audit();
        let mut observer = dispatcher.subscribe();
        let started = tokio::time::Instant::now();

        dispatcher.submit(control(GateCommand::AutoCycle)).unwrap();
        positions_until_terminal(&mut observer).await;

        let elapsed = started.elapsed();
        assert!(
            elapsed >= Duration::from_millis(13_500),
            "default 5 s hold missing: {elapsed:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dead_audio_leaves_transitions_identical() {
        let (healthy, _) = dispatcher_with_audit();
        let mut healthy_observer = healthy.subscribe();
        healthy.submit(control(GateCommand::AutoCycle)).unwrap();
        let (healthy_positions, healthy_outcome) =
            positions_until_terminal(&mut healthy_observer).await;

        let audit = Arc::new(InMemoryAuditLog::new());
        let deaf = Dispatcher::with_parts(
            GateConfig::default(),
            Broadcaster::new(),
            Arc::new(DeadSink),
            audit.clone(),
        );
        let mut deaf_observer = deaf.subscribe();
        deaf.submit(control(GateCommand::AutoCycle)).unwrap();
        let (deaf_positions, deaf_outcome) = positions_until_terminal(&mut deaf_observer).await;

        assert_eq!(deaf_positions, healthy_positions);
        assert_eq!(deaf_outcome, healthy_outcome);
        assert_eq!(deaf_outcome, OperationOutcome::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequence_version_strictly_increases_across_everything() {
        super::super::init_tracing();
        let (dispatcher, _audit) = dispatcher_with_audit();
        let mut observer = dispatcher.subscribe();

        dispatcher.submit(control(GateCommand::Open)).unwrap();
        positions_until_terminal(&mut observer).await;
        dispatcher.submit(control(GateCommand::ToggleSound)).unwrap();
        dispatcher.submit(control(GateCommand::EmergencyStop)).unwrap();
        dispatcher.submit(control(GateCommand::Close)).unwrap();

        let mut versions = Vec::new();
        while let Some(snapshot) = observer.try_recv() {
            versions.push(snapshot.sequence_version);
        }
        assert!(versions.len() >= 3);
        assert!(
            versions.windows(2).all(|w| w[1] > w[0]),
            "versions not strictly increasing: {versions:?}"
        );
    }
}
