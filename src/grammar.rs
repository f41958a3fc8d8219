//! PEST grammar shared by the type-code, literal and bit-specifier parsers.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub(crate) struct CodeParser;

/// Parse `text` against `rule`, returning the top-level pair on success.
pub(crate) fn parse_rule(rule: Rule, text: &str) -> Option<Pair<'_, Rule>> {
    CodeParser::parse(rule, text).ok()?.next()
}

/// Value of a `hex_literal` or `dec_literal` pair. `None` on u64 overflow.
pub(crate) fn literal_value(pair: &Pair<'_, Rule>) -> Option<u64> {
    match pair.as_rule() {
        Rule::hex_literal => u64::from_str_radix(&pair.as_str()[2..], 16).ok(),
        Rule::dec_literal => pair.as_str().parse().ok(),
        _ => None,
    }
}

/// Parse an unsigned integer literal: decimal (`"12"`) or `0x`-prefixed hex (`"0x0c"`).
///
/// Leading zeros are decimal (`"010"` is ten). Surrounding whitespace is not accepted;
/// callers trim document text before handing it over.
pub fn parse_uint(text: &str) -> Option<u64> {
    let top = parse_rule(Rule::uint_literal, text)?;
    let inner = top.into_inner().next()?;
    literal_value(&inner)
}
