//! Bit specifiers (`"3"`, `"7:4"`) to masks.
//!
//! A single index `i` selects bit `i`; a range `hi:lo` selects bits `lo..=hi`.
//! Masks are 64 bits wide.

use crate::grammar::{literal_value, parse_rule, parse_uint, Rule};
use std::fmt;

/// How malformed specifiers are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskPolicy {
    /// Reject anything that is not a valid index or `hi:lo` range with `63 >= hi >= lo`.
    #[default]
    Strict,
    /// Unparsable or out-of-range components count as zero and a reversed range still
    /// applies the range formula (`"3:7"` is `0x70`). Never fails.
    ///
    /// Components are read like any other literal, decimal or `0x` hex, so `"010"` is bit
    /// ten and `0o`/`0b` prefixes count as unparsable.
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MaskError {
    #[error("invalid bit index {component:?} in {spec:?}")]
    InvalidIndex { spec: String, component: String },
    #[error("reversed bit range {spec:?}: high bit {hi} is below low bit {lo}")]
    ReversedRange { spec: String, hi: u64, lo: u64 },
    #[error("bit {bit} in {spec:?} does not fit a 64-bit mask")]
    OutOfRange { spec: String, bit: u64 },
}

/// An inclusive bit range; a single index has `hi == lo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitRange {
    pub hi: u32,
    pub lo: u32,
}

impl BitRange {
    pub fn single(bit: u32) -> Self {
        BitRange { hi: bit, lo: bit }
    }

    /// Parse a specifier strictly.
    pub fn parse(spec: &str) -> Result<Self, MaskError> {
        let invalid = || MaskError::InvalidIndex {
            spec: spec.to_string(),
            component: first_bad_component(spec),
        };
        let top = parse_rule(Rule::bit_spec, spec).ok_or_else(invalid)?;
        let mut values = Vec::with_capacity(2);
        for part in top
            .into_inner()
            .filter(|p| matches!(p.as_rule(), Rule::hex_literal | Rule::dec_literal))
        {
            let v = literal_value(&part).ok_or_else(|| MaskError::InvalidIndex {
                spec: spec.to_string(),
                component: part.as_str().to_string(),
            })?;
            values.push(v);
        }
        let (hi, lo) = match values.as_slice() {
            [i] => (*i, *i),
            [hi, lo] => (*hi, *lo),
            _ => return Err(invalid()),
        };
        if hi < lo {
            return Err(MaskError::ReversedRange {
                spec: spec.to_string(),
                hi,
                lo,
            });
        }
        if hi > 63 {
            return Err(MaskError::OutOfRange {
                spec: spec.to_string(),
                bit: hi,
            });
        }
        Ok(BitRange {
            hi: hi as u32,
            lo: lo as u32,
        })
    }

    pub fn width(&self) -> u32 {
        self.hi - self.lo + 1
    }

    /// `((1 << (hi+1)) - 1) ^ ((1 << lo) - 1)`, without overflow at `hi == 63`.
    pub fn mask(&self) -> u64 {
        low_bits(self.hi + 1) ^ low_bits(self.lo)
    }
}

/// Mask with the lowest `n` bits set, `n <= 64`.
fn low_bits(n: u32) -> u64 {
    if n >= 64 {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

fn first_bad_component(spec: &str) -> String {
    spec.split(':')
        .find(|c| parse_uint(c).is_none())
        .unwrap_or(spec)
        .to_string()
}

/// A resolved mask; displays as a hex literal (`0xf0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mask(pub u64);

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Resolve a specifier under the given policy.
pub fn resolve(spec: &str, policy: MaskPolicy) -> Result<Mask, MaskError> {
    match policy {
        MaskPolicy::Strict => BitRange::parse(spec).map(|r| Mask(r.mask())),
        MaskPolicy::Lenient => Ok(Mask(lenient(spec))),
    }
}

/// Strict resolution formatted as a hex literal: `mask("7:4") == Ok("0xf0")`.
pub fn mask(spec: &str) -> Result<String, MaskError> {
    resolve(spec, MaskPolicy::Strict).map(|m| m.to_string())
}

fn lenient(spec: &str) -> u64 {
    let bit = |s: &str| parse_uint(s).filter(|&b| b <= 63).unwrap_or(0) as u32;
    let parts: Vec<&str> = spec.split(':').collect();
    if let [hi, lo] = parts.as_slice() {
        return low_bits(bit(hi) + 1) ^ low_bits(bit(lo));
    }
    BitRange::single(bit(spec)).mask()
}
