use crate::registry::ActiveTarget;
use tracing::error;
use trackcast_core::{EventTime, Track};

/// Delivers one accepted event to every active target in priority order.
///
/// Each call is guarded individually: a failing target is logged with its
/// id and never blocks delivery to the rest. This and [`close_all`] are the
/// only two guarded call sites in the core.
pub fn dispatch_track(targets: &mut [ActiveTarget], track: &Track, start_time: EventTime) {
    for target in targets.iter_mut() {
        if let Err(err) = target.instance.log_track(track, start_time) {
            error!(
                target_id = target.id,
                error = %err,
                track = %track.summary(),
                "target failed to log track"
            );
        }
    }
}

/// Closes every active target exactly once, in priority order, with the same
/// per-call isolation as dispatch.
pub fn close_all(targets: &mut [ActiveTarget]) {
    for target in targets.iter_mut() {
        if let Err(err) = target.instance.close() {
            error!(target_id = target.id, error = %err, "target failed to close");
        }
    }
}
