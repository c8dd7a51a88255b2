use std::borrow::Cow;

/// Marker appended to text cut by [`truncate_chars`].
pub const ELLIPSIS: char = '…';

/// Removes control characters from feed-supplied text.
///
/// Feed XML is attacker-controlled, and anything we copy into an event ends
/// up rendered by arbitrary clients. Tabs, newlines and carriage returns are
/// kept because they carry layout; everything else in the C0/C1 ranges and
/// DEL is dropped. ANSI escape sequences (`ESC [ ... final`) are removed as a
/// whole so no stray parameter bytes leak through.
///
/// Returns `Cow::Borrowed` when nothing needs stripping.
///
/// # Examples
///
/// ```
/// use feedbridge::util::strip_control_chars;
///
/// assert_eq!(strip_control_chars("plain"), "plain");
/// assert_eq!(strip_control_chars("a\x1b[31mb"), "ab");
/// assert_eq!(strip_control_chars("line\nbreak"), "line\nbreak");
/// ```
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_stripped) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            // CSI: parameter and intermediate bytes, then one final byte in 0x40..=0x7e
            for c in chars.by_ref() {
                if ('\x40'..='\x7e').contains(&c) {
                    break;
                }
            }
            continue;
        }
        if !is_stripped(c) {
            out.push(c);
        }
    }

    Cow::Owned(out)
}

fn is_stripped(c: char) -> bool {
    c.is_control() && !matches!(c, '\t' | '\n' | '\r')
}

/// Cuts `s` down to `max_chars` characters.
///
/// Text that fits is returned borrowed. Longer text keeps its first
/// `max_chars - 1` characters followed by [`ELLIPSIS`], so the result is
/// exactly `max_chars` characters long. Counting is by `char`, never by
/// byte, so multi-byte text is never split inside a code point.
///
/// # Examples
///
/// ```
/// use feedbridge::util::truncate_chars;
///
/// assert_eq!(truncate_chars("short", 10), "short");
/// assert_eq!(truncate_chars("abcdefgh", 5), "abcd…");
/// ```
pub fn truncate_chars(s: &str, max_chars: usize) -> Cow<'_, str> {
    if max_chars == 0 {
        return Cow::Borrowed("");
    }

    match s.char_indices().nth(max_chars) {
        None => Cow::Borrowed(s),
        Some(_) => {
            // nth(max_chars - 1) exists because nth(max_chars) does
            let cut = s
                .char_indices()
                .nth(max_chars - 1)
                .map_or(s.len(), |(idx, _)| idx);
            let mut out = String::with_capacity(cut + ELLIPSIS.len_utf8());
            out.push_str(&s[..cut]);
            out.push(ELLIPSIS);
            Cow::Owned(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strip_clean_text_returns_borrowed() {
        assert!(matches!(
            strip_control_chars("Hello, world"),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_strip_preserves_tabs_newlines_cr() {
        assert_eq!(strip_control_chars("a\tb\nc\rd"), "a\tb\nc\rd");
    }

    #[test]
    fn test_strip_removes_bell_and_del() {
        assert_eq!(strip_control_chars("About\x07 things\x7f"), "About things");
    }

    #[test]
    fn test_strip_ansi_color_codes() {
        assert_eq!(strip_control_chars("Evil\x1b[31m Feed\x1b[0m"), "Evil Feed");
    }

    #[test]
    fn test_strip_bare_esc() {
        assert_eq!(strip_control_chars("a\x1bb"), "ab");
    }

    #[test]
    fn test_strip_unicode_preserved() {
        assert_eq!(strip_control_chars("日本語 ✓"), "日本語 ✓");
    }

    #[test]
    fn test_truncate_fits() {
        assert!(matches!(truncate_chars("exact", 5), Cow::Borrowed("exact")));
    }

    #[test]
    fn test_truncate_one_over() {
        assert_eq!(truncate_chars("abcdef", 5), "abcd…");
    }

    #[test]
    fn test_truncate_zero() {
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_truncate_multibyte_boundary() {
        let s = "日本語のテキスト";
        let out = truncate_chars(s, 4);
        assert_eq!(out, "日本語…");
    }

    proptest! {
        #[test]
        fn truncated_text_never_exceeds_limit(s in "\\PC{0,400}", max in 1usize..300) {
            let out = truncate_chars(&s, max);
            prop_assert!(out.chars().count() <= max);
            if s.chars().count() > max {
                prop_assert!(out.ends_with(ELLIPSIS));
                prop_assert_eq!(out.chars().count(), max);
            } else {
                prop_assert_eq!(out.as_ref(), s.as_str());
            }
        }
    }
}
