//! File-writing targets.
//!
//! `TrackListTarget` and `CsvTarget` share the `[ListCommon]` settings
//! section; both stamp each entry with its offset from the first logged
//! event so the files line up with a recording of the show.

mod csv;
mod nowplaying;
mod tracklist;

pub use csv::CsvTarget;
pub use nowplaying::NowPlayingTarget;
pub use tracklist::TrackListTarget;

/// Settings section shared by the list-style file targets.
pub const LIST_SECTION: &str = "ListCommon";

/// Renders an offset as "M:SS", growing to "H:MM:SS" past an hour.
pub(crate) fn format_offset(delta: chrono::Duration) -> String {
    let total = delta.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn offsets_render_like_track_lengths() {
        assert_eq!(format_offset(Duration::seconds(0)), "0:00");
        assert_eq!(format_offset(Duration::seconds(65)), "1:05");
        assert_eq!(format_offset(Duration::seconds(3725)), "1:02:05");
        assert_eq!(format_offset(Duration::seconds(-3)), "0:00");
    }
}
