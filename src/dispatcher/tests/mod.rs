/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Tests for the Dispatcher.


use crate::audit::InMemoryAuditLog;
use crate::broadcast::Broadcaster;
use crate::config::GateConfig;
use crate::dispatcher::Dispatcher;
use crate::sound::TracingSink;
use std::sync::Arc;

/// Timings scaled down two orders of magnitude so paused-clock tests stay
/// readable: open sequence 45 ms, close sequence 40 ms.
pub(crate) fn fast_config() -> GateConfig {
    let mut config = GateConfig::default();
    config.timings.warning_interval_ms = 5;
    config.timings.motor_lead_ms = 5;
    config.timings.travel_ms = 30;
    config.timings.default_open_secs = 0.05;
    config
}

pub(crate) fn fast_dispatcher() -> (Dispatcher, Arc<InMemoryAuditLog>) {
    fast_dispatcher_with(Broadcaster::new())
}

pub(crate) fn fast_dispatcher_with(
    broadcaster: Broadcaster,
) -> (Dispatcher, Arc<InMemoryAuditLog>) {
    let audit = Arc::new(InMemoryAuditLog::new());
    let dispatcher = Dispatcher::with_parts(
        fast_config(),
        broadcaster,
        Arc::new(TracingSink),
        audit.clone(),
    );
    (dispatcher, audit)
}
