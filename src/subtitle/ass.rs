// Advanced SubStation Alpha (.ass) output
//
// Only the subset of the format needed for per-role styled dialogue lines:
// a V4+ style per registered role and one Dialogue line per event.
use super::Role;
use crate::compose::{Color, OutputDocument, StyleProfile};
use std::fmt::Write;
use std::time::Duration;

const STYLES_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

const EVENTS_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// The ASS style name used for a role's events.
pub fn style_name(role: Role) -> &'static str {
    match role {
        Role::Original => "Original",
        Role::Dub => "Dub",
        Role::Translated => "Translated",
    }
}

/// Render a merged document as a complete .ass file.
pub fn render(document: &OutputDocument) -> String {
    let mut out = String::new();

    out.push_str("[Script Info]\n");
    out.push_str("ScriptType: v4.00+\n");
    out.push_str("WrapStyle: 0\n");
    out.push_str("ScaledBorderAndShadow: yes\n");
    out.push('\n');

    out.push_str("[V4+ Styles]\n");
    out.push_str(STYLES_FORMAT);
    out.push('\n');
    for (role, style) in document.styles() {
        writeln!(out, "{}", style_line(*role, style)).unwrap();
    }
    out.push('\n');

    out.push_str("[Events]\n");
    out.push_str(EVENTS_FORMAT);
    out.push('\n');
    for styled in document.events() {
        writeln!(
            out,
            "Dialogue: 0,{},{},{},,0,0,0,,{}",
            format_timestamp(styled.event.start),
            format_timestamp(styled.event.end),
            style_name(styled.role),
            escape_text(&styled.event.text)
        )
        .unwrap();
    }

    out
}

fn style_line(role: Role, style: &StyleProfile) -> String {
    format!(
        "Style: {},Arial,{},{},{},{},{},0,0,0,0,100,100,0,0,1,1,0.5,{},10,10,{},1",
        style_name(role),
        style.font_size,
        ass_color(style.color),
        ass_color(style.color),
        ass_color(Color::BLACK),
        ass_color(Color::BLACK),
        style.alignment.numpad_code(),
        style.margin_v,
    )
}

/// ASS colors are &HAABBGGRR with alpha first and channels reversed.
fn ass_color(color: Color) -> String {
    format!("&H00{:02X}{:02X}{:02X}", color.b, color.g, color.r)
}

/// ASS timestamps are H:MM:SS.cc with centisecond precision.
fn format_timestamp(d: Duration) -> String {
    let centis = d.as_millis() / 10;
    let hours = centis / 360_000;
    let minutes = (centis % 360_000) / 6_000;
    let seconds = (centis % 6_000) / 100;
    let centis = centis % 100;
    format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
}

fn escape_text(text: &str) -> String {
    text.replace('\n', "\\N")
}
