use trackcast_core::Track;

/// Decides whether a newly observed track is a real change from the
/// previously forwarded one.
///
/// Only artist and title participate in the comparison, byte-for-byte.
/// Album and length are deliberately excluded: some sources report them
/// inconsistently mid-track, and a change in either alone is not a new song.
#[derive(Debug)]
pub struct ChangeDetector {
    previous: Option<LastForwarded>,
    ignore_album: Option<String>,
}

#[derive(Debug)]
struct LastForwarded {
    title: String,
    artist: String,
}

impl ChangeDetector {
    pub fn new(ignore_album: Option<String>) -> Self {
        Self {
            previous: None,
            ignore_album,
        }
    }

    /// Returns the track with `ignore` freshly computed when it differs from
    /// the previous forwarded track, or `None` for a duplicate observation.
    ///
    /// The uninitialized state is `None`, not an empty-field sentinel, so the
    /// very first observation is always a change even when its fields are all
    /// empty.
    pub fn observe(&mut self, mut track: Track) -> Option<Track> {
        let changed = match &self.previous {
            None => true,
            Some(last) => last.artist != track.artist || last.title != track.title,
        };
        if !changed {
            return None;
        }

        self.previous = Some(LastForwarded {
            title: track.title.clone(),
            artist: track.artist.clone(),
        });
        track.ignore = self.ignore_album.as_deref() == Some(track.album.as_str());
        Some(track)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(artist: &str, title: &str, album: &str) -> Track {
        Track {
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            length: "3:30".into(),
            artwork: String::new(),
            unique_id: title.into(),
            ignore: false,
        }
    }

    #[test]
    fn first_observation_always_forwards() {
        let mut detector = ChangeDetector::new(None);
        let forwarded = detector.observe(track("", "", ""));
        assert!(forwarded.is_some(), "all-empty first track must forward");
    }

    #[test]
    fn album_only_change_is_not_a_track_change() {
        let mut detector = ChangeDetector::new(None);
        assert!(detector.observe(track("A", "X", "First")).is_some());
        assert!(detector.observe(track("A", "X", "Different")).is_none());
        assert!(detector.observe(track("B", "X", "Different")).is_some());
    }

    #[test]
    fn length_only_change_is_not_a_track_change() {
        let mut detector = ChangeDetector::new(None);
        assert!(detector.observe(track("A", "X", "Album")).is_some());
        let mut same = track("A", "X", "Album");
        same.length = "4:01".into();
        assert!(detector.observe(same).is_none());
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let mut detector = ChangeDetector::new(None);
        assert!(detector.observe(track("A", "x", "Album")).is_some());
        assert!(detector.observe(track("A", "X", "Album")).is_some());
    }

    #[test]
    fn ignore_is_recomputed_per_event() {
        let mut detector = ChangeDetector::new(Some("Bumpers".into()));

        let first = detector.observe(track("A", "X", "Bumpers")).unwrap();
        assert!(first.ignore);

        let second = detector.observe(track("B", "Y", "Album")).unwrap();
        assert!(!second.ignore, "ignore must not carry over from a prior event");

        let third = detector.observe(track("C", "Z", "Bumpers")).unwrap();
        assert!(third.ignore);
    }

    #[test]
    fn no_ignore_album_means_never_ignored() {
        let mut detector = ChangeDetector::new(None);
        let forwarded = detector.observe(track("A", "X", "")).unwrap();
        assert!(!forwarded.ignore, "empty album must not match an unset ignore album");
    }

    #[test]
    fn duplicate_then_change_sequence() {
        // Source reports A/X, then A/X with a different album, then B/X.
        let mut detector = ChangeDetector::new(None);
        let mut forwarded = 0;
        for observed in [
            track("A", "X", "one"),
            track("A", "X", "different"),
            track("B", "X", "different"),
        ] {
            if detector.observe(observed).is_some() {
                forwarded += 1;
            }
        }
        assert_eq!(forwarded, 2);
    }
}
