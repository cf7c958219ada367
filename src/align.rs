//! Index-based timing alignment between two subtitle tracks.

use crate::subtitle::{SubtitleEvent, SubtitleTrack};
use tracing::{info, warn};

/// Produce a new track carrying the target's text with the master's timing,
/// paired positionally by index.
///
/// If the tracks differ in length the result is truncated to the shorter one
/// and a warning is logged; lines beyond the shorter length are dropped from
/// both sides. Alignment is strictly positional with no interpolation or
/// fuzzy time matching, so if the two tracks segment speech into lines
/// differently, text lands on the wrong timing from the first divergence
/// onward. That is an accepted limitation of the approach.
pub fn align_by_index(master: &SubtitleTrack, target: &SubtitleTrack) -> SubtitleTrack {
    let master_len = master.len();
    let target_len = target.len();

    if master_len != target_len {
        warn!(
            "Track line counts differ ({} vs {}); alignment truncated to the shorter length",
            master_len, target_len
        );
    }

    let aligned: SubtitleTrack = master
        .iter()
        .zip(target.iter())
        .map(|(m, t)| SubtitleEvent::new(m.start, m.end, t.text.clone()))
        .collect();

    info!("Aligned {} subtitle event(s)", aligned.len());
    aligned
}
