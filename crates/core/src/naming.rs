//! Kotlin identifier rules for generated declarations.

use once_cell::sync::Lazy;
use regex::Regex;

static BARE_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}_][\p{L}\p{Nd}_]*$").expect("identifier pattern must compile")
});

/// Kotlin hard keywords. They stay reserved even inside backticks for the
/// purpose of generated accessors.
pub const RESERVED_WORDS: &[&str] = &[
    "as",
    "break",
    "class",
    "continue",
    "do",
    "else",
    "false",
    "for",
    "fun",
    "if",
    "in",
    "interface",
    "is",
    "null",
    "object",
    "package",
    "return",
    "super",
    "this",
    "throw",
    "true",
    "try",
    "typealias",
    "typeof",
    "val",
    "var",
    "when",
    "while",
];

/// Characters that would break generated declarations even when quoted.
const STRUCTURAL_CHARS: &[char] = &['.', '/', '\\'];

/// Characters Kotlin does not accept between backticks on the JVM.
const UNQUOTABLE_CHARS: &[char] = &['`', '\r', '\n', ';', '[', ']', '<', '>', ':'];

/// Whether `name` can be emitted as the name of a generated declaration.
pub fn is_legal_name(name: &str) -> bool {
    if name.trim().is_empty() {
        return false;
    }
    if RESERVED_WORDS.contains(&name) || name.contains(STRUCTURAL_CHARS) {
        return false;
    }
    BARE_IDENTIFIER.is_match(name) || is_quotable(name)
}

fn is_quotable(name: &str) -> bool {
    !name
        .chars()
        .any(|c| UNQUOTABLE_CHARS.contains(&c) || c.is_control())
}

/// Backtick-quotes an identifier for emission.
pub fn quote(name: &str) -> String {
    format!("`{}`", name)
}

/// Renders `value` as a Kotlin string literal.
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
