//! SSA/ASS subtitle scanner (component B)
//!
//! Walks the decoded text of one subtitle file and reports every distinct
//! family name referenced by `Style:` rows and `\fn` override tags in
//! `Dialogue:`/`Comment:` rows. The scanner never fails: malformed lines are
//! skipped, and only `\r`/`\n` structure the scan, so binary noise in an
//! otherwise-text file is tolerated.

mod block;
mod csv;

use block::scan_override_blocks;
use csv::{nth_field, remainder_from_field};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Styles,
    Events,
}

fn classify_header(line: &str) -> Section {
    let lower = line.to_ascii_lowercase();
    match lower.as_str() {
        "[v4 styles]" | "[v4+ styles]" => Section::Styles,
        "[events]" => Section::Events,
        _ => Section::None,
    }
}

fn is_header(line: &str) -> bool {
    line.starts_with('[') && line.ends_with(']')
}

fn strip_prefix_ci<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    if line.len() >= prefix.len() && line[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&line[prefix.len()..])
    } else {
        None
    }
}

fn parse_format_fields(rest: &str) -> Vec<String> {
    rest.split(',').map(|f| f.trim().to_ascii_lowercase()).collect()
}

/// Scan one subtitle file's decoded text, invoking `report` once per family
/// name occurrence found (not yet deduplicated — callers own deduplication,
/// typically via [`crate::family::FamilySet`]).
pub fn scan(text: &str, mut report: impl FnMut(&str)) {
    let mut section = Section::None;
    let mut style_format: Option<Vec<String>> = None;
    let mut event_format: Option<Vec<String>> = None;

    for raw_line in text.split(['\r', '\n']) {
        let line = raw_line;
        if line.is_empty() {
            continue;
        }
        if is_header(line) {
            section = classify_header(line);
            continue;
        }
        match section {
            Section::Styles => {
                if let Some(rest) = strip_prefix_ci(line, "format:") {
                    style_format = Some(parse_format_fields(rest));
                } else if let Some(rest) = strip_prefix_ci(line, "style:") {
                    handle_style_row(rest, &style_format, &mut report);
                }
            }
            Section::Events => {
                if let Some(rest) = strip_prefix_ci(line, "format:") {
                    event_format = Some(parse_format_fields(rest));
                } else if let Some(rest) = strip_prefix_ci(line, "dialogue:") {
                    handle_event_row(rest, &event_format, &mut report);
                } else if let Some(rest) = strip_prefix_ci(line, "comment:") {
                    handle_event_row(rest, &event_format, &mut report);
                }
            }
            Section::None => {}
        }
    }
}

fn handle_style_row(rest: &str, format: &Option<Vec<String>>, report: &mut impl FnMut(&str)) {
    let value = match format {
        Some(fields) => {
            let idx = fields.iter().position(|f| f == "fontname");
            match idx {
                Some(idx) => nth_field(rest, idx),
                None => return,
            }
        }
        None => nth_field(rest, 1),
    };
    if let Some(name) = value {
        emit_family(&name, report);
    }
}

fn handle_event_row(rest: &str, format: &Option<Vec<String>>, report: &mut impl FnMut(&str)) {
    let text = match format {
        Some(fields) => {
            let idx = fields.iter().position(|f| f == "text");
            match idx {
                Some(idx) => remainder_from_field(rest, idx),
                None => return,
            }
        }
        None => remainder_from_field(rest, 9),
    };
    if let Some(text) = text {
        scan_override_blocks(&text, &mut |name| emit_family(name, report));
    }
}

/// Strip a leading `@` (vertical-writing marker); discard if empty.
fn emit_family(raw: &str, report: &mut impl FnMut(&str)) {
    let stripped = raw.strip_prefix('@').unwrap_or(raw);
    if !stripped.is_empty() {
        report(stripped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str) -> Vec<String> {
        let mut out = Vec::new();
        scan(text, |name| out.push(name.to_string()));
        out
    }

    #[test]
    fn style_fallback_path_no_format() {
        let text = "[V4+ Styles]\nStyle: Default,MyFont,20,&H00FFFFFF\n";
        assert_eq!(collect(text), vec!["MyFont"]);
    }

    #[test]
    fn style_uses_format_defined_fontname_column() {
        let text = "[V4+ Styles]\nFormat: Name, Fontname, Fontsize\nStyle: Default,Comic Sans,18\n";
        assert_eq!(collect(text), vec!["Comic Sans"]);
    }

    #[test]
    fn dialogue_override_emits_fn_argument() {
        let text = "[Events]\nFormat: Layer,Start,End,Style,Name,MarginL,MarginR,MarginV,Effect,Text\nDialogue: 0,0,1,Default,,0,0,0,,Hello {\\fn Comic}world{\\fn0} end.\n";
        assert_eq!(collect(text), vec!["Comic"]);
    }

    #[test]
    fn leading_at_glyph_is_stripped() {
        let text = "[Events]\nFormat: Layer,Start,End,Style,Name,MarginL,MarginR,MarginV,Effect,Text\nDialogue: 0,0,1,Default,,0,0,0,,{\\fn @Sans}x\n";
        assert_eq!(collect(text), vec!["Sans"]);
    }

    #[test]
    fn fn_zero_is_a_reset_and_never_emits() {
        let text = "[Events]\nFormat: Layer,Start,End,Style,Name,MarginL,MarginR,MarginV,Effect,Text\nDialogue: 0,0,1,Default,,0,0,0,,{\\fn0}plain text\n";
        assert!(collect(text).is_empty());
    }

    #[test]
    fn event_fallback_skips_nine_fields_without_format() {
        let text = "[Events]\nDialogue: 0,0,1,Default,,0,0,0,,{\\fnArial}hi\n";
        assert_eq!(collect(text), vec!["Arial"]);
    }

    #[test]
    fn missing_fontname_or_text_column_yields_no_emission() {
        let text = "[V4+ Styles]\nFormat: Name, Fontsize\nStyle: Default,18\n";
        assert!(collect(text).is_empty());

        let text2 = "[Events]\nFormat: Layer,Start,End,Style,Name\nDialogue: 0,0,1,Default,\n";
        assert!(collect(text2).is_empty());
    }

    #[test]
    fn empty_input_produces_no_families() {
        assert!(collect("").is_empty());
    }

    #[test]
    fn binary_noise_between_newlines_is_tolerated() {
        let text = "[Events]\nFormat: Layer,Start,End,Style,Name,MarginL,MarginR,MarginV,Effect,Text\n\u{0}\u{1}garbage\u{2}\nDialogue: 0,0,1,Default,,0,0,0,,{\\fnOk}y\n";
        assert_eq!(collect(text), vec!["Ok"]);
    }

    #[test]
    fn transform_tag_parenthesized_args_do_not_trigger_emission() {
        let text = "[Events]\nFormat: Layer,Start,End,Style,Name,MarginL,MarginR,MarginV,Effect,Text\nDialogue: 0,0,1,Default,,0,0,0,,{\\t(0,500,\\fnNested)}{\\fnReal}text\n";
        assert_eq!(collect(text), vec!["Real"]);
    }

    #[test]
    fn unmatched_brace_is_treated_as_literal_text() {
        let text = "[Events]\nFormat: Layer,Start,End,Style,Name,MarginL,MarginR,MarginV,Effect,Text\nDialogue: 0,0,1,Default,,0,0,0,,{\\fn unterminated text\n";
        assert!(collect(text).is_empty());
    }

    #[test]
    fn comment_rows_are_scanned_like_dialogue() {
        let text = "[Events]\nFormat: Layer,Start,End,Style,Name,MarginL,MarginR,MarginV,Effect,Text\nComment: 0,0,1,Default,,0,0,0,,{\\fnHidden}note\n";
        assert_eq!(collect(text), vec!["Hidden"]);
    }
}
