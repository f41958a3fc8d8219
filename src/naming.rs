//! Identifier normalisation for raw schema strings.

use heck::{ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};

/// Replace tabs and newlines with single spaces so raw text fits on one comment line.
pub fn notabs(s: &str) -> String {
    s.chars()
        .map(|c| if c == '\t' || c == '\n' { ' ' } else { c })
        .collect()
}

pub fn lower(s: &str) -> String {
    s.to_lowercase()
}

pub fn upper(s: &str) -> String {
    s.to_uppercase()
}

/// Uppercase the first letter of every word. A word starts after any character
/// that is neither alphanumeric nor `_`.
pub fn title(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }
    out
}

/// Type name for a message: `"NAV-POSLLH"` -> `"Posllh"`.
///
/// The leading category segment is dropped, so a name without `-` yields `""`.
pub fn msg_type_name(s: &str) -> String {
    s.to_lowercase()
        .split('-')
        .skip(1)
        .map(title)
        .collect()
}

/// `iTOW` -> `i_tow`, `numSV` -> `num_sv`, `gnssFixOK` -> `gnss_fix_ok`.
pub fn snake_case(s: &str) -> String {
    s.to_snake_case()
}

pub fn upper_snake(s: &str) -> String {
    s.to_shouty_snake_case()
}

/// `"meas"` -> `"Meas"`, `"svInfo"` -> `"SvInfo"`, `"NAV-STATUS"` -> `"NavStatus"`.
pub fn pascal_case(s: &str) -> String {
    s.to_upper_camel_case()
}

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern", "false",
    "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
    "return", "static", "struct", "trait", "true", "type", "unsafe", "use", "where", "while",
    "abstract", "become", "box", "do", "final", "macro", "override", "priv", "try", "typeof",
    "unsized", "virtual", "yield",
];

/// Field identifier for a raw block name. `position` names unnamed blocks.
pub fn field_ident(name: &str, position: usize) -> String {
    let snake = snake_case(name);
    if snake.is_empty() {
        return format!("field_{}", position);
    }
    if snake.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("_{}", snake);
    }
    match snake.as_str() {
        "self" | "super" | "crate" => format!("{}_", snake),
        s if KEYWORDS.contains(&s) => format!("r#{}", s),
        _ => snake,
    }
}
