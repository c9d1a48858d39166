use crate::models::FormatType;

/// Common interface for the line grammars
pub trait LineGrammar {
    /// True when the grammar recognizes at least part of the line
    fn can_parse(&self, line: &str) -> bool;
    fn get_format_type(&self) -> FormatType;
}

pub mod klog_parser;
pub mod kv_parser;

pub use klog_parser::{KlogHeader, KlogParser};
pub use kv_parser::KvParser;

/// Resolve backslash escapes: every `\X` becomes `X`.
/// A lone trailing backslash is kept as is.
pub fn unescape(input: &str) -> String {
    if !input.contains('\\') {
        return input.to_string();
    }

    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(escaped) => output.push(escaped),
                None => output.push('\\'),
            }
        } else {
            output.push(c);
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r#"a\"b"#), "a\"b");
        assert_eq!(unescape(r"c:\\dir"), r"c:\dir");
        assert_eq!(unescape(r"\n"), "n");
        assert_eq!(unescape("plain"), "plain");
        assert_eq!(unescape("tail\\"), "tail\\");
    }
}
