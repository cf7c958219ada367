// SRT subtitle format
use super::{SubtitleEvent, SubtitleTrack};
use crate::error::{PolysubError, Result};
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

fn timestamp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{2}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{2}):(\d{2}):(\d{2})[,.](\d{3})")
            .unwrap()
    })
}

/// Parse SRT content into a track.
///
/// Tolerates CRLF line endings and a UTF-8 BOM. A block whose timestamp line
/// doesn't parse is an error rather than being skipped: a file with broken
/// timing is an unreadable source, not something to silently repair.
pub fn parse(content: &str) -> Result<SubtitleTrack> {
    let content = content.trim_start_matches('\u{feff}');
    let mut track = SubtitleTrack::new();

    for block in content.replace("\r\n", "\n").split("\n\n") {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }

        let mut lines = block.lines();

        // First line is the sequence number; the numbering itself is ignored
        // since insertion order is display order.
        let index_line = lines.next().unwrap_or_default().trim();
        if index_line.parse::<usize>().is_err() {
            return Err(PolysubError::SubtitleParse(format!(
                "Expected sequence number, got '{}'",
                index_line
            )));
        }

        let timing_line = lines.next().unwrap_or_default();
        let caps = timestamp_regex().captures(timing_line).ok_or_else(|| {
            PolysubError::SubtitleParse(format!("Invalid timestamp line '{}'", timing_line.trim()))
        })?;

        let start = capture_to_duration(&caps, 1);
        let end = capture_to_duration(&caps, 5);

        let text = lines.collect::<Vec<_>>().join("\n");
        if text.trim().is_empty() {
            // Empty cues carry no information; drop them
            continue;
        }

        track.push(SubtitleEvent::new(start, end, text.trim().to_string()));
    }

    Ok(track)
}

fn capture_to_duration(caps: &regex::Captures<'_>, first_group: usize) -> Duration {
    // Groups matched \d{2}/\d{3}, so the parses cannot fail
    let hours: u64 = caps[first_group].parse().unwrap();
    let minutes: u64 = caps[first_group + 1].parse().unwrap();
    let seconds: u64 = caps[first_group + 2].parse().unwrap();
    let millis: u64 = caps[first_group + 3].parse().unwrap();

    Duration::from_millis(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
}

/// Format a track as SRT content.
pub fn format(track: &SubtitleTrack) -> String {
    track
        .iter()
        .enumerate()
        .map(|(i, event)| {
            format!(
                "{}\n{} --> {}\n{}\n",
                i + 1,
                format_timestamp(event.start),
                format_timestamp(event.end),
                event.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_timestamp(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = d.subsec_millis();
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}
