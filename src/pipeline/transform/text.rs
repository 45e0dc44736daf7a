//! Best-effort cleanup of mangled legacy text.
//!
//! Applied to titles and bodies before anything else looks at them:
//!
//! | Step              | Example                         |
//! |-------------------|---------------------------------|
//! | terminal escapes  | `\x1b[1mbold` → `bold`          |
//! | mojibake          | `GrÃ¶ÃŸe` → `Größe`             |
//! | entities          | `Fish &amp; Chips` (no markup)  |
//! | ligatures         | `ﬁne` → `fine`                  |
//! | fullwidth         | `ＡＢＣ` → `ABC`                |
//! | quotes            | `“a”` → `"a"`                   |
//! | line breaks       | `\r\n`, U+2028 → `\n`           |
//! | control chars     | NUL, BOM, ... removed           |
//!
//! The result is NFC-normalized.

use unicode_normalization::UnicodeNormalization;

use crate::utils::exec::strip_ansi;
use crate::utils::html;

/// Repair a title or any other single text field.
pub fn fix_text(text: &str) -> String {
    let text = strip_ansi(text);
    let text = fix_mojibake(&text);
    let text = if text.contains('<') {
        text
    } else {
        html::unescape(&text).into_owned()
    };

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            '\u{2028}' | '\u{2029}' | '\u{0085}' => out.push('\n'),
            _ if is_removed_control(c) => {}
            _ => push_simplified(&mut out, c),
        }
    }

    out.nfc().collect()
}

/// Repair a body: literal `\t` and `\n` escapes become real characters first.
pub fn fix_body(body: &str) -> String {
    let unescaped = body.replace("\\t", "\t").replace("\\n", "\n");
    fix_text(&unescaped)
}

/// Ligatures, fullwidth forms and curly quotes.
fn push_simplified(out: &mut String, c: char) {
    match c {
        '\u{FB00}' => out.push_str("ff"),
        '\u{FB01}' => out.push_str("fi"),
        '\u{FB02}' => out.push_str("fl"),
        '\u{FB03}' => out.push_str("ffi"),
        '\u{FB04}' => out.push_str("ffl"),
        '\u{FB05}' | '\u{FB06}' => out.push_str("st"),
        '\u{3000}' => out.push(' '),
        '\u{FF01}'..='\u{FF5E}' => {
            out.push(char::from_u32(c as u32 - 0xFF01 + 0x21).unwrap_or(c));
        }
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => out.push('\''),
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => out.push('"'),
        _ => out.push(c),
    }
}

/// Control characters dropped from text. Tab, newline and form feed stay.
fn is_removed_control(c: char) -> bool {
    matches!(
        c,
        '\u{0000}'..='\u{0008}'
            | '\u{000B}'
            | '\u{000E}'..='\u{001F}'
            | '\u{007F}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFC}'
    )
}

// ============================================================================
// Mojibake
// ============================================================================

/// Undo UTF-8 that was decoded as Windows-1252 (or Latin-1).
///
/// Every maximal run of non-ASCII characters that map to a single
/// Windows-1252 byte is re-encoded; the run is replaced only when the bytes
/// form valid UTF-8. Correct Latin-1 text (`café`, `Straße`) never decodes
/// and is left alone.
fn fix_mojibake(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = Vec::new();
    let mut run_start = 0;

    for (i, c) in text.char_indices() {
        match cp1252_byte(c) {
            Some(byte) if byte >= 0x80 => {
                if run.is_empty() {
                    run_start = i;
                }
                run.push(byte);
            }
            _ => {
                flush_run(&mut out, &mut run, &text[run_start..i]);
                out.push(c);
            }
        }
    }
    flush_run(&mut out, &mut run, &text[run_start..]);
    out
}

fn flush_run(out: &mut String, run: &mut Vec<u8>, original: &str) {
    if run.is_empty() {
        return;
    }
    match std::str::from_utf8(run) {
        Ok(decoded) => out.push_str(decoded),
        Err(_) => out.push_str(original),
    }
    run.clear();
}

/// Byte that `c` was decoded from under sloppy Windows-1252.
///
/// Undefined Windows-1252 bytes pass through as the C1 control of the same
/// value, as Latin-1 would decode them.
fn cp1252_byte(c: char) -> Option<u8> {
    let byte = match c {
        '\u{0000}'..='\u{00FF}' => c as u8,
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mojibake_repaired() {
        assert_eq!(fix_text("GrÃ¶ÃŸe"), "Größe");
        assert_eq!(fix_text("FrÃ¼hling in KÃ¶ln"), "Frühling in Köln");
        assert_eq!(fix_text("price: 5 â‚¬"), "price: 5 €");
    }

    #[test]
    fn test_mojibake_quotes_then_uncurled() {
        // â€™ is a mangled right single quote
        assert_eq!(fix_text("donâ€™t"), "don't");
    }

    #[test]
    fn test_correct_text_untouched() {
        assert_eq!(fix_text("Straße café"), "Straße café");
        assert_eq!(fix_text("日本語のテキスト"), "日本語のテキスト");
        assert_eq!(fix_text("plain ascii"), "plain ascii");
    }

    #[test]
    fn test_entities_only_without_markup() {
        assert_eq!(fix_text("Fish &amp; Chips"), "Fish & Chips");
        assert_eq!(fix_text("<p>Fish &amp; Chips</p>"), "<p>Fish &amp; Chips</p>");
    }

    #[test]
    fn test_simplifications() {
        assert_eq!(fix_text("ﬁne ﬂow"), "fine flow");
        assert_eq!(fix_text("ＡＢＣ１２３"), "ABC123");
        assert_eq!(fix_text("“quoted” ‘single’"), "\"quoted\" 'single'");
    }

    #[test]
    fn test_line_breaks_and_controls() {
        assert_eq!(fix_text("a\r\nb\rc\u{2028}d"), "a\nb\nc\nd");
        assert_eq!(fix_text("\u{FEFF}x\u{0000}y\tz"), "xy\tz");
        assert_eq!(fix_text("\x1b[1mbold\x1b[0m"), "bold");
    }

    #[test]
    fn test_nfc() {
        assert_eq!(fix_text("e\u{0301}"), "\u{00E9}");
    }

    #[test]
    fn test_fix_body_unescapes_literal_sequences() {
        assert_eq!(fix_body("<p>a</p>\\n<p>b\\tc</p>"), "<p>a</p>\n<p>b\tc</p>");
    }
}
