use boomgate_rs::audit::InMemoryAuditLog;
use boomgate_rs::broadcast::Broadcaster;
use boomgate_rs::dispatcher::{Dispatcher, GateCommand, OperationRequest, TriggerSource};
use boomgate_rs::error::GateError;
use boomgate_rs::gate::{GatePosition, OperationOutcome};
use boomgate_rs::sound::TracingSink;
use boomgate_rs::{GateConfig, SubmitOutcome};
use std::sync::Arc;
use std::time::Duration;

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

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_dual_path_contention_admits_exactly_one() {
        let (dispatcher, audit) = dispatcher_with_audit();

        // Back-to-back with zero delay: operator first, payment second.
        let control = dispatcher
            .submit(OperationRequest::new(
                GateCommand::AutoCycle,
                TriggerSource::ControlChannel,
            ))
            .unwrap();
        assert!(matches!(control, SubmitOutcome::SequenceStarted { .. }));

        let automated = dispatcher
            .submit(
                OperationRequest::new(GateCommand::AutoCycle, TriggerSource::AutomatedTrigger)
                    .with_transaction("tx-1")
                    .with_plate("ABC 1234"),
            )
            .unwrap();
        match automated {
            SubmitOutcome::NotAccepted { error } => assert_eq!(error, GateError::GateBusy),
            other => panic!("payment path must never raise on contention: {other:?}"),
        }

        // The accepted cycle runs to completion; the declined one leaves no
        // trace beyond its log line.
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(dispatcher.status().position, GatePosition::Closed);
        let records = audit.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outcome, OperationOutcome::Completed);
        assert!(records[0].transaction_id.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_post_open_hold_never_closes() {
        let (dispatcher, audit) = dispatcher_with_audit();
        let mut observer = dispatcher.subscribe();

        dispatcher
            .submit(
                OperationRequest::new(GateCommand::AutoCycle, TriggerSource::ControlChannel)
                    .with_open_duration(5.0),
            )
            .unwrap();

        // Open sequence finishes at 4.5 s; six seconds in we are inside the
        // post-open hold.
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(dispatcher.status().position, GatePosition::Open);

        dispatcher
            .submit(OperationRequest::new(
                GateCommand::EmergencyStop,
                TriggerSource::ControlChannel,
            ))
            .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        let snapshot = dispatcher.status();
        assert_eq!(snapshot.position, GatePosition::EmergencyStopped);
        assert_eq!(
            snapshot.last_operation.unwrap().outcome,
            Some(OperationOutcome::Aborted)
        );

        let mut seen = Vec::new();
        while let Some(s) = observer.try_recv() {
            seen.push(s.position);
        }
        assert!(
            !seen.contains(&GatePosition::Closing),
            "no close-sequence transition may ever apply: {seen:?}"
        );

        let records = audit.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outcome, OperationOutcome::Aborted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bad_duration_leaves_slot_free_for_next_caller() {
        let (dispatcher, _audit) = dispatcher_with_audit();

        let err = dispatcher
            .submit(
                OperationRequest::new(GateCommand::AutoCycle, TriggerSource::ControlChannel)
                    .with_open_duration(-1.0),
            )
            .unwrap_err();
        assert!(matches!(err, GateError::InvalidParameter(_)));

        let outcome = dispatcher
            .submit(OperationRequest::new(
                GateCommand::Open,
                TriggerSource::ControlChannel,
            ))
            .unwrap();
        assert!(matches!(outcome, SubmitOutcome::SequenceStarted { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_payment_trigger_reports_bool_and_audits_transaction() {
        let (dispatcher, audit) = dispatcher_with_audit();

        assert!(dispatcher.trigger_for_payment("tx-7", "XYZ 987", None));
        // Same instant, second paid vehicle: quietly declined.
        assert!(!dispatcher.trigger_for_payment("tx-8", "LMN 456", None));

        tokio::time::sleep(Duration::from_secs(20)).await;
        let records = audit.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].transaction_id.as_deref(), Some("tx-7"));
        assert_eq!(records[0].vehicle_plate.as_deref(), Some("XYZ 987"));
        assert_eq!(records[0].outcome, OperationOutcome::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_observer_sees_only_subsequent_snapshots() {
        let (dispatcher, _audit) = dispatcher_with_audit();

        dispatcher
            .submit(OperationRequest::new(
                GateCommand::Open,
                TriggerSource::ControlChannel,
            ))
            .unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        // Joined after the open sequence: its history is the status query,
        // not the stream.
        let mut late = dispatcher.subscribe();
        assert!(late.try_recv().is_none());
        assert_eq!(dispatcher.status().position, GatePosition::Open);

        dispatcher
            .submit(OperationRequest::new(
                GateCommand::ToggleSound,
                TriggerSource::ControlChannel,
            ))
            .unwrap();
        let snapshot = late.try_recv().unwrap();
        assert!(!snapshot.sound_enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wire_boundary_round_trip() {
        let (dispatcher, _audit) = dispatcher_with_audit();

        let outcome = dispatcher
            .submit_json(
                r#"{"command": "auto_cycle", "transaction_id": "tx-2", "open_duration_seconds": 2}"#,
                TriggerSource::ControlChannel,
            )
            .unwrap();
        assert!(matches!(outcome, SubmitOutcome::SequenceStarted { .. }));

        tokio::time::sleep(Duration::from_secs(15)).await;
        let snapshot = dispatcher.status();
        assert_eq!(snapshot.position, GatePosition::Closed);

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"closed\""), "{json}");
        assert!(json.contains("tx-2"), "{json}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_timings_drive_the_sequence() {
        let config = GateConfig::from_json(
            r#"{"timings": {"warning_interval_ms": 100, "open_warning_beeps": 1, "travel_ms": 200}}"#,
        )
        .unwrap();
        let dispatcher = Dispatcher::new(config);
        let mut observer = dispatcher.subscribe();
        let started = tokio::time::Instant::now();

        dispatcher
            .submit(OperationRequest::new(
                GateCommand::Open,
                TriggerSource::ControlChannel,
            ))
            .unwrap();
        loop {
            let snapshot = observer.recv().await.unwrap();
            if snapshot.position == GatePosition::Open {
                break;
            }
        }
        // 100 ms warning + 200 ms travel.
        let elapsed = started.elapsed();
        assert!(
            elapsed >= Duration::from_millis(300) && elapsed < Duration::from_millis(400),
            "elapsed {elapsed:?}"
        );
    }
}
