//! Greedy line breaking against a maximum width.
//!
//! Break opportunities come from UAX#14 via `unicode-linebreak`; widths come
//! from the standard-font metrics. A word wider than the whole line is
//! force-broken mid-word rather than overflowing.

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::font::FontContext;

/// Break opportunities indexed by char position: entry `i` answers "may a
/// line end before `chars[i]`?". Index 0 is always `None`.
fn break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    // linebreaks() yields (byte_offset, opportunity) where the offset is the
    // start of the next segment; map byte offsets back to char indices.
    let mut byte_to_char = vec![0usize; text.len() + 1];
    for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
        byte_to_char[byte_idx] = char_idx;
    }
    byte_to_char[text.len()] = char_count;

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
        // an offset of text.len() means "break at end", irrelevant here
    }

    result
}

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn push_line(chars: &[char], lines: &mut Vec<String>) {
    let line: String = chars
        .iter()
        .copied()
        .filter(|ch| !is_line_terminator(*ch))
        .collect();
    lines.push(line.trim_end().to_string());
}

/// Break `text` into lines no wider than `max_width` points.
///
/// Always returns at least one line; empty input yields one empty line.
pub fn wrap_text(
    fonts: &FontContext,
    text: &str,
    font_size: f64,
    bold: bool,
    max_width: f64,
) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }

    let chars: Vec<char> = text.chars().collect();
    let widths: Vec<f64> = chars
        .iter()
        .map(|&ch| fonts.char_width(ch, font_size, bold))
        .collect();
    let opps = break_opportunities(text);

    let mut lines = Vec::new();
    let mut line_start = 0usize;
    let mut line_width = 0.0f64;
    // Char index a line may start at, i.e. a break is allowed before it.
    let mut last_break: Option<usize> = None;

    for i in 0..chars.len() {
        if i > 0 {
            match opps[i] {
                Some(BreakOpportunity::Mandatory) => {
                    let end = if is_line_terminator(chars[i - 1]) { i - 1 } else { i };
                    push_line(&chars[line_start..end], &mut lines);
                    line_start = i;
                    line_width = 0.0;
                    last_break = None;
                }
                Some(BreakOpportunity::Allowed) => last_break = Some(i),
                None => {}
            }
        }

        let ch = chars[i];
        if is_line_terminator(ch) {
            continue;
        }

        if line_width + widths[i] > max_width && line_start < i {
            // Overflow: break at the last opportunity, or force mid-word.
            let break_at = match last_break {
                Some(bp) if bp > line_start => bp,
                _ => i,
            };
            push_line(&chars[line_start..break_at], &mut lines);
            line_start = break_at;
            line_width = widths[line_start..=i].iter().sum();
            last_break = None;
        } else {
            line_width += widths[i];
        }
    }

    if line_start < chars.len() {
        push_line(&chars[line_start..], &mut lines);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(text: &str, max_width: f64) -> Vec<String> {
        wrap_text(&FontContext::new(), text, 12.0, false, max_width)
    }

    #[test]
    fn test_single_line() {
        assert_eq!(wrap("Hello", 200.0), vec!["Hello"]);
    }

    #[test]
    fn test_break_at_space() {
        let lines = wrap("Hello World", 40.0);
        assert_eq!(lines, vec!["Hello", "World"]);
    }

    #[test]
    fn test_explicit_newline() {
        assert_eq!(wrap("Hello\nWorld", 200.0), vec!["Hello", "World"]);
    }

    #[test]
    fn test_blank_line_preserved() {
        assert_eq!(wrap("Hello\n\nWorld", 200.0), vec!["Hello", "", "World"]);
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(wrap("", 200.0), vec![""]);
    }

    #[test]
    fn test_force_break_overlong_word() {
        let lines = wrap("incomprehensibilities", 40.0);
        assert!(lines.len() >= 2, "expected a forced break, got {:?}", lines);
        let rejoined: String = lines.concat();
        assert_eq!(rejoined, "incomprehensibilities");
    }

    #[test]
    fn test_prefers_space_over_mid_word() {
        let lines = wrap("Site walkthrough completed", 90.0);
        assert_eq!(lines, vec!["Site", "walkthrough", "completed"]);
    }

    #[test]
    fn test_no_trailing_spaces() {
        let lines = wrap("alpha beta gamma", 45.0);
        for line in &lines {
            assert_eq!(line.trim_end(), line);
        }
    }
}
