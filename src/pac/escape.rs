/// Escapes `s` for use inside a quoted JavaScript string literal.
///
/// Quotes and backslashes get a backslash, `<`, `>`, `&` and `=` become `\xNN`,
/// and control characters become `\uNNNN`. Everything else passes through.
pub fn js_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '<' => out.push_str("\\x3C"),
            '>' => out.push_str("\\x3E"),
            '&' => out.push_str("\\x26"),
            '=' => out.push_str("\\x3D"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(js_escape("alkasir.com"), "alkasir.com");
        assert_eq!(js_escape("\n\n<>>''"), r"\u000A\u000A\x3C\x3E\x3E\'\'");
        assert_eq!(js_escape("\"buu\""), r#"\"buu\""#);
        assert_eq!(js_escape(r"a\b"), r"a\\b");
        assert_eq!(js_escape("a=b&c"), r"a\x3Db\x26c");
        assert_eq!(js_escape("\u{7f}"), r"\u007F");
        assert_eq!(js_escape("bücher.de"), "bücher.de");
    }
}
