use serde::{Deserialize, Serialize};

/// One song's announceable metadata at a point in time.
///
/// Constructed fresh for every forwarded track change (live mode) or read
/// from a persisted row (archive mode). Never mutated after being handed to
/// targets, except for `ignore`, which the change detector sets once before
/// dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Display-formatted duration ("M:SS" or "H:MM:SS"); may be empty.
    pub length: String,
    /// Artwork file name or URL; may be empty.
    pub artwork: String,
    /// Stable identifier: source id, database key, or the title as a fallback.
    pub unique_id: String,
    /// Whether targets should skip side effects for this event. Recomputed
    /// per event from the configured ignore album; never carried over.
    pub ignore: bool,
}

impl Track {
    /// The conventional one-line rendering used by announcement targets.
    pub fn summary(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }
}

/// Raw record returned by a live track source for one poll.
///
/// Every field is optional; conversion to [`Track`] substitutes empty
/// strings, mirroring sources that only report a subset of tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NowPlaying {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub length: Option<String>,
    pub artwork: Option<String>,
    pub id: Option<String>,
}

impl From<NowPlaying> for Track {
    fn from(now: NowPlaying) -> Self {
        let title = now.title.unwrap_or_default();
        let unique_id = now
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| title.clone());
        Track {
            unique_id,
            title,
            artist: now.artist.unwrap_or_default(),
            album: now.album.unwrap_or_default(),
            length: now.length.unwrap_or_default(),
            artwork: now.artwork.unwrap_or_default(),
            ignore: false,
        }
    }
}
