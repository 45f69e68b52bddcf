use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::controller::{ActiveSession, SessionController};

/// Periodically ask the controller whether `session` has gone idle.
///
/// Ends when the session is stopped by any path or the controller is gone.
pub(crate) async fn run_idle_monitor(
    controller: Weak<SessionController>,
    session: Arc<ActiveSession>,
    every: Duration,
) {
    let mut ticks = tokio::time::interval(every);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = session.stopped() => break,
            _ = ticks.tick() => {
                let Some(controller) = controller.upgrade() else { break };
                if controller.expire_if_idle(&session) {
                    break;
                }
            }
        }
    }
    debug!(session_id = %session.id(), "idle monitor finished");
}
