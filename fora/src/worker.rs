//! Background service calls.
//!
//! Every `Request` the dashboard emits runs on its own tokio task. The task owns
//! an `Arc` to the service and reports back only through the event channel as
//! `AppEvent::Api`, so the dashboard itself never leaves the main loop.

use std::sync::Arc;

use fora_core::api::AnalysisService;
use fora_core::controller::{execute, Request};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::event::AppEvent;

/// Spawns `request` and forwards its outcome to `event_tx`.
///
/// Requests have no timeout or cancellation; a stalled service leaves the
/// topic's busy flag set until the process exits.
pub fn spawn_request(
    service: Arc<dyn AnalysisService>,
    request: Request,
    event_tx: UnboundedSender<AppEvent>,
) {
    debug!(?request, "dispatching request");
    tokio::spawn(async move {
        let outcome = execute(service.as_ref(), request).await;
        let _ = event_tx.send(AppEvent::Api(Box::new(outcome)));
    });
}

/// Spawns every request in `requests`.
pub fn spawn_all(
    service: &Arc<dyn AnalysisService>,
    requests: impl IntoIterator<Item = Request>,
    event_tx: &UnboundedSender<AppEvent>,
) {
    for request in requests {
        spawn_request(Arc::clone(service), request, event_tx.clone());
    }
}
