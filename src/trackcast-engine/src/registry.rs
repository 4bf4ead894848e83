use std::cmp::Reverse;
use tracing::{debug, error, info};
use trackcast_core::{RunContext, RunMode, Settings, Target, TargetSpec};

/// Explicit registration table mapping target ids to factories.
///
/// Built once at startup and passed by reference; tests supply synthetic
/// tables instead of the built-in one.
#[derive(Default)]
pub struct TargetRegistry {
    specs: Vec<TargetSpec>,
}

/// A constructed target plus its declared identity; lives for the whole run.
pub struct ActiveTarget {
    pub id: &'static str,
    pub priority: i32,
    pub archive_safe: bool,
    pub instance: Box<dyn Target>,
}

/// Why a registered target did not make it into the active list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Did not match the name pattern.
    Filtered,
    /// No `enabled = true` for its section; targets are opt-in.
    Disabled,
    /// Enabled, but the run is an archive replay and the target is not
    /// archive-capable.
    NotArchiveSafe,
    /// Its factory returned an error; the rest of the run continues.
    ConstructFailed(String),
}

#[derive(Debug)]
pub struct SkippedTarget {
    pub id: &'static str,
    pub reason: SkipReason,
}

pub struct LoadOutcome {
    /// Priority-descending; ties keep lexicographic id order.
    pub active: Vec<ActiveTarget>,
    pub skipped: Vec<SkippedTarget>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spec: TargetSpec) {
        self.specs.push(spec);
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Constructs the active target list for this run.
    ///
    /// Candidates are considered in lexicographic id order so that equal
    /// priorities resolve the same way on every run, then filtered by the
    /// name pattern, the per-target `enabled` switch, and (for archive runs)
    /// the archive-capability flag. A factory error excludes only that
    /// target.
    pub fn load(&self, settings: &Settings, ctx: &RunContext, pattern: &str) -> LoadOutcome {
        let mut candidates: Vec<&TargetSpec> = self.specs.iter().collect();
        candidates.sort_by_key(|spec| spec.id);

        let mut active = Vec::new();
        let mut skipped = Vec::new();

        for spec in candidates {
            if !matches_pattern(spec.id, pattern) {
                skipped.push(SkippedTarget {
                    id: spec.id,
                    reason: SkipReason::Filtered,
                });
                continue;
            }
            if !settings.target_enabled(spec.id) {
                debug!(target_id = spec.id, "target disabled in config, skipping");
                skipped.push(SkippedTarget {
                    id: spec.id,
                    reason: SkipReason::Disabled,
                });
                continue;
            }
            if ctx.mode() == RunMode::Archive && !spec.archive_safe {
                debug!(
                    target_id = spec.id,
                    "target is not archive-capable, skipping for archive run"
                );
                skipped.push(SkippedTarget {
                    id: spec.id,
                    reason: SkipReason::NotArchiveSafe,
                });
                continue;
            }

            match (spec.factory)(settings, ctx) {
                Ok(instance) => {
                    info!(target_id = spec.id, name = instance.name(), "loaded target");
                    active.push(ActiveTarget {
                        id: spec.id,
                        priority: spec.priority,
                        archive_safe: spec.archive_safe,
                        instance,
                    });
                }
                Err(err) => {
                    error!(
                        target_id = spec.id,
                        error = %err,
                        "failed to construct target, excluding it from this run"
                    );
                    skipped.push(SkippedTarget {
                        id: spec.id,
                        reason: SkipReason::ConstructFailed(err.to_string()),
                    });
                }
            }
        }

        // Stable sort: equal priorities keep the candidate order from above.
        active.sort_by_key(|target| Reverse(target.priority));

        LoadOutcome { active, skipped }
    }
}

fn matches_pattern(id: &str, pattern: &str) -> bool {
    pattern == "all" || id.to_ascii_lowercase().contains(&pattern.to_ascii_lowercase())
}
