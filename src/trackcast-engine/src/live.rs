use crate::detector::ChangeDetector;
use crate::dispatch::dispatch_track;
use crate::registry::ActiveTarget;
use chrono::Local;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use trackcast_core::{RunContext, Track, TrackSource};

/// Outcome of a single poll tick. Exposed so tests can drive the loop
/// tick-by-tick without sleeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A track-change event was forwarded to the targets.
    Dispatched,
    /// Same artist/title as the previous forwarded event; dropped silently.
    Duplicate,
    /// Withheld by intro suppression.
    Suppressed,
    /// Nothing playing and stop values are not in use.
    Idle,
    /// The source query failed; tick skipped, loop continues.
    SourceError,
}

enum LivePhase {
    /// Waiting for the configured intro album to stop playing. `started`
    /// latches once the intro has actually been observed, so a silent
    /// source before the show begins keeps suppressing.
    Intro { started: bool },
    Steady,
}

/// The live polling state machine: intro suppression, change detection, and
/// dispatch, one source query per tick.
pub struct LiveLoop {
    detector: ChangeDetector,
    phase: LivePhase,
}

impl LiveLoop {
    pub fn new(ctx: &RunContext) -> Self {
        let phase = match ctx.intro_album {
            Some(_) => LivePhase::Intro { started: false },
            None => LivePhase::Steady,
        };
        Self {
            detector: ChangeDetector::new(ctx.ignore_album.clone()),
            phase,
        }
    }

    /// Polls the source once and feeds the observation through suppression,
    /// the change detector, and dispatch.
    pub fn tick(
        &mut self,
        source: &mut dyn TrackSource,
        targets: &mut [ActiveTarget],
        ctx: &RunContext,
    ) -> TickOutcome {
        let observed = match source.poll() {
            Ok(observed) => observed,
            Err(err) => {
                warn!(error = %err, "track source query failed, skipping tick");
                return TickOutcome::SourceError;
            }
        };

        if let LivePhase::Intro { started } = &mut self.phase {
            let leave = match &observed {
                // A track outside the intro album means the show has begun.
                Some(now) => {
                    if now.album.as_deref() == ctx.intro_album.as_deref() {
                        *started = true;
                        false
                    } else {
                        true
                    }
                }
                // Silence only ends the phase once the intro has been heard.
                None => *started,
            };
            if !leave {
                return TickOutcome::Suppressed;
            }
            debug!("intro finished, starting dispatch");
            self.phase = LivePhase::Steady;
        }

        let track = match observed {
            Some(now) => Track::from(now),
            None if ctx.use_stop_values => ctx.stop_track(),
            None => return TickOutcome::Idle,
        };

        match self.detector.observe(track) {
            Some(track) => {
                info!("{}", track.summary());
                dispatch_track(targets, &track, Local::now().naive_local());
                TickOutcome::Dispatched
            }
            None => TickOutcome::Duplicate,
        }
    }

    /// Runs until the shutdown flag is set, sleeping `poll_time` seconds
    /// between ticks.
    pub fn run(
        &mut self,
        source: &mut dyn TrackSource,
        targets: &mut [ActiveTarget],
        ctx: &RunContext,
        shutdown: &AtomicBool,
    ) {
        while !shutdown.load(Ordering::SeqCst) {
            self.tick(source, targets, ctx);
            sleep_until(ctx.poll_time, shutdown);
        }
        info!("live loop interrupted, shutting down");
    }
}

// Sliced sleep so an interrupt does not have to wait out a full poll
// interval.
fn sleep_until(seconds: u64, shutdown: &AtomicBool) {
    let deadline = Instant::now() + Duration::from_secs(seconds);
    while Instant::now() < deadline {
        if shutdown.load(Ordering::SeqCst) {
            return;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
}
