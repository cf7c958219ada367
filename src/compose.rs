//! Merging of aligned subtitle tracks into a single styled document.

use crate::subtitle::{Role, SubtitleEvent, SubtitleTrack};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// An RGB color, written as "#RRGGBB" in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const YELLOW: Color = Color::new(255, 255, 0);
    pub const CYAN: Color = Color::new(0, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        let hex = s.strip_prefix('#').unwrap_or(&s);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("Invalid color '{}'. Use '#RRGGBB'", s));
        }
        Ok(Color {
            r: u8::from_str_radix(&hex[0..2], 16).unwrap(),
            g: u8::from_str_radix(&hex[2..4], 16).unwrap(),
            b: u8::from_str_radix(&hex[4..6], 16).unwrap(),
        })
    }
}

impl From<Color> for String {
    fn from(c: Color) -> String {
        format!("#{:02X}{:02X}{:02X}", c.r, c.g, c.b)
    }
}

/// On-screen position of a subtitle, following the SSA numpad layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alignment {
    BottomLeft,
    BottomCenter,
    BottomRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    TopLeft,
    TopCenter,
    TopRight,
}

impl Alignment {
    /// The numpad code used by the ASS "Alignment" style field.
    pub fn numpad_code(&self) -> u8 {
        match self {
            Alignment::BottomLeft => 1,
            Alignment::BottomCenter => 2,
            Alignment::BottomRight => 3,
            Alignment::MiddleLeft => 4,
            Alignment::MiddleCenter => 5,
            Alignment::MiddleRight => 6,
            Alignment::TopLeft => 7,
            Alignment::TopCenter => 8,
            Alignment::TopRight => 9,
        }
    }
}

/// Visual presentation assigned to one role in the merged output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleProfile {
    pub font_size: u32,
    pub color: Color,
    pub alignment: Alignment,
    pub margin_v: u32,
}

impl StyleProfile {
    /// Default style for a role: original on top in white, dub in the middle
    /// in yellow, translated at the bottom in cyan.
    pub fn default_for(role: Role) -> Self {
        match role {
            Role::Original => StyleProfile {
                font_size: 20,
                color: Color::WHITE,
                alignment: Alignment::TopCenter,
                margin_v: 10,
            },
            Role::Dub => StyleProfile {
                font_size: 24,
                color: Color::YELLOW,
                alignment: Alignment::MiddleCenter,
                margin_v: 10,
            },
            Role::Translated => StyleProfile {
                font_size: 22,
                color: Color::CYAN,
                alignment: Alignment::BottomCenter,
                margin_v: 10,
            },
        }
    }
}

/// The full role-to-style table, read-only for the lifetime of a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSet {
    pub original: StyleProfile,
    pub dub: StyleProfile,
    pub translated: StyleProfile,
}

impl Default for StyleSet {
    fn default() -> Self {
        Self {
            original: StyleProfile::default_for(Role::Original),
            dub: StyleProfile::default_for(Role::Dub),
            translated: StyleProfile::default_for(Role::Translated),
        }
    }
}

impl StyleSet {
    pub fn get(&self, role: Role) -> &StyleProfile {
        match role {
            Role::Original => &self.original,
            Role::Dub => &self.dub,
            Role::Translated => &self.translated,
        }
    }
}

/// An event tagged with the role whose style it renders under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledEvent {
    pub role: Role,
    pub event: SubtitleEvent,
}

/// The merged, styled output of one compose invocation.
///
/// Holds one style per role actually present and the concatenation of all
/// input tracks' events tagged with their role. Every event's role maps to
/// exactly one registered style.
#[derive(Debug, Clone, Default)]
pub struct OutputDocument {
    styles: BTreeMap<Role, StyleProfile>,
    events: Vec<StyledEvent>,
}

impl OutputDocument {
    pub fn styles(&self) -> &BTreeMap<Role, StyleProfile> {
        &self.styles
    }

    pub fn events(&self) -> &[StyledEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events_for(&self, role: Role) -> impl Iterator<Item = &StyledEvent> {
        self.events.iter().filter(move |e| e.role == role)
    }

    fn register(&mut self, role: Role, style: StyleProfile) {
        self.styles.insert(role, style);
    }

    fn append_track(&mut self, role: Role, track: &SubtitleTrack) {
        debug_assert!(self.styles.contains_key(&role));
        for event in track {
            self.events.push(StyledEvent {
                role,
                event: event.clone(),
            });
        }
    }
}

/// Merge a dub track, its translated text lines, and an optional original
/// track into a single styled document.
///
/// If the translation came back with a different number of lines than the dub
/// track has events, both are truncated to the shorter length and a warning is
/// logged, mirroring the aligner's policy. Timings are never altered: the
/// translated track reuses the (possibly truncated) dub track's timing
/// event-for-event. Events are appended original, then dub, then translated,
/// not interleaved by time; display-time ordering across roles is the
/// renderer's concern.
pub fn compose(
    dub_track: &SubtitleTrack,
    translated_texts: &[String],
    orig_track: Option<&SubtitleTrack>,
    styles: &StyleSet,
) -> OutputDocument {
    let dub_len = dub_track.len();
    let keep = dub_len.min(translated_texts.len());

    if translated_texts.len() != dub_len {
        warn!(
            "Translation returned {} line(s) for {} dub event(s); truncating both to {}",
            translated_texts.len(),
            dub_len,
            keep
        );
    }

    let dub_kept: SubtitleTrack = dub_track.iter().take(keep).cloned().collect();

    let translated: SubtitleTrack = dub_kept
        .iter()
        .zip(translated_texts)
        .map(|(event, text)| SubtitleEvent::new(event.start, event.end, text.clone()))
        .collect();

    let mut document = OutputDocument::default();

    if let Some(orig) = orig_track {
        document.register(Role::Original, styles.get(Role::Original).clone());
        document.append_track(Role::Original, orig);
    }
    document.register(Role::Dub, styles.get(Role::Dub).clone());
    document.register(Role::Translated, styles.get(Role::Translated).clone());
    document.append_track(Role::Dub, &dub_kept);
    document.append_track(Role::Translated, &translated);

    debug!(
        "Composed document with {} role(s) and {} event(s)",
        document.styles.len(),
        document.events.len()
    );

    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn track(specs: &[(u64, u64, &str)]) -> SubtitleTrack {
        specs
            .iter()
            .map(|&(start, end, text)| {
                SubtitleEvent::new(
                    Duration::from_millis(start),
                    Duration::from_millis(end),
                    text,
                )
            })
            .collect()
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_color_parse() {
        let color = Color::try_from("#FFFF00".to_string()).unwrap();
        assert_eq!(color, Color::YELLOW);

        let no_hash = Color::try_from("00ffff".to_string()).unwrap();
        assert_eq!(no_hash, Color::CYAN);

        assert!(Color::try_from("#12345".to_string()).is_err());
        assert!(Color::try_from("#GGGGGG".to_string()).is_err());
    }

    #[test]
    fn test_alignment_numpad_codes() {
        assert_eq!(Alignment::BottomCenter.numpad_code(), 2);
        assert_eq!(Alignment::MiddleCenter.numpad_code(), 5);
        assert_eq!(Alignment::TopCenter.numpad_code(), 8);
        assert_eq!(Alignment::TopRight.numpad_code(), 9);
    }

    #[test]
    fn test_default_styles_match_roles() {
        let styles = StyleSet::default();

        assert_eq!(styles.get(Role::Original).alignment, Alignment::TopCenter);
        assert_eq!(styles.get(Role::Dub).color, Color::YELLOW);
        assert_eq!(styles.get(Role::Translated).font_size, 22);
    }

    #[test]
    fn test_compose_full() {
        let orig = track(&[(0, 1000, "Hi"), (2000, 3000, "Bye")]);
        let dub = track(&[(0, 1000, "Szia"), (2000, 3000, "Viszlát")]);
        let translated = texts(&["Hello", "Goodbye"]);

        let doc = compose(&dub, &translated, Some(&orig), &StyleSet::default());

        assert_eq!(doc.styles().len(), 3);
        assert_eq!(doc.events().len(), 6);

        // Fixed append order: original, then dub, then translated
        assert_eq!(doc.events()[0].role, Role::Original);
        assert_eq!(doc.events()[2].role, Role::Dub);
        assert_eq!(doc.events()[4].role, Role::Translated);

        // Translated events borrow the dub timing
        assert_eq!(doc.events()[4].event.start, Duration::from_millis(0));
        assert_eq!(doc.events()[4].event.text, "Hello");
    }

    #[test]
    fn test_compose_without_original() {
        let dub = track(&[(0, 1000, "Szia")]);
        let doc = compose(&dub, &texts(&["Hello"]), None, &StyleSet::default());

        assert!(!doc.styles().contains_key(&Role::Original));
        assert_eq!(doc.styles().len(), 2);
        assert_eq!(doc.events().len(), 2);
    }

    #[test]
    fn test_compose_truncates_to_translation_length() {
        let dub = track(&[
            (0, 1000, "a"),
            (1000, 2000, "b"),
            (2000, 3000, "c"),
            (3000, 4000, "d"),
            (4000, 5000, "e"),
        ]);
        let translated = texts(&["A", "B", "C"]);

        let doc = compose(&dub, &translated, None, &StyleSet::default());

        // 2 roles x min(5, 3) events
        assert_eq!(doc.events().len(), 6);
        assert_eq!(doc.events_for(Role::Dub).count(), 3);
        assert_eq!(doc.events_for(Role::Translated).count(), 3);
    }

    #[test]
    fn test_compose_truncates_to_dub_length() {
        let dub = track(&[(0, 1000, "a")]);
        let translated = texts(&["A", "B", "C"]);

        let doc = compose(&dub, &translated, None, &StyleSet::default());

        assert_eq!(doc.events_for(Role::Translated).count(), 1);
        assert_eq!(
            doc.events_for(Role::Translated).next().unwrap().event.text,
            "A"
        );
    }

    #[test]
    fn test_compose_never_alters_timing() {
        let orig = track(&[(100, 900, "x")]);
        let dub = track(&[(150, 950, "y")]);

        let doc = compose(&dub, &texts(&["Y"]), Some(&orig), &StyleSet::default());

        for styled in doc.events() {
            match styled.role {
                Role::Original => {
                    assert_eq!(styled.event.start, Duration::from_millis(100));
                    assert_eq!(styled.event.end, Duration::from_millis(900));
                }
                Role::Dub | Role::Translated => {
                    assert_eq!(styled.event.start, Duration::from_millis(150));
                    assert_eq!(styled.event.end, Duration::from_millis(950));
                }
            }
        }
    }

    #[test]
    fn test_compose_empty_dub() {
        let doc = compose(
            &SubtitleTrack::new(),
            &texts(&["A"]),
            None,
            &StyleSet::default(),
        );

        assert!(doc.is_empty());
        // Styles are still registered for the roles the document declares
        assert_eq!(doc.styles().len(), 2);
    }

    #[test]
    fn test_every_event_role_has_style() {
        let orig = track(&[(0, 1000, "o")]);
        let dub = track(&[(0, 1000, "d")]);
        let doc = compose(&dub, &texts(&["t"]), Some(&orig), &StyleSet::default());

        for styled in doc.events() {
            assert!(doc.styles().contains_key(&styled.role));
        }
    }
}
