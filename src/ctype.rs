//! Scalar type resolution: protocol type codes (`U4`, `CH[30]`, `RU1_3`) to concrete
//! fixed-width types.
//!
//! A code is a scalar tag optionally followed by an array suffix `[<N>]`. Resolution is
//! pure; the same text always yields the same [`ScalarType`] or the same error.

use crate::grammar::{parse_rule, Rule};
use std::fmt;

/// Protocol scalar codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarCode {
    /// 8-bit scaled float (custom narrow encoding).
    Ru1_3,
    R4,
    R8,
    I1,
    U1,
    /// Character.
    Ch,
    /// Bitmask byte.
    X1,
    I2,
    U2,
    X2,
    I4,
    U4,
    X4,
    I8,
    U8,
}

/// Concrete element type a scalar code maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Float8,
    F32,
    F64,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
}

impl ScalarCode {
    pub const ALL: [ScalarCode; 15] = [
        ScalarCode::Ru1_3,
        ScalarCode::R4,
        ScalarCode::R8,
        ScalarCode::I1,
        ScalarCode::U1,
        ScalarCode::Ch,
        ScalarCode::X1,
        ScalarCode::I2,
        ScalarCode::U2,
        ScalarCode::X2,
        ScalarCode::I4,
        ScalarCode::U4,
        ScalarCode::X4,
        ScalarCode::I8,
        ScalarCode::U8,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "RU1_3" => ScalarCode::Ru1_3,
            "R4" => ScalarCode::R4,
            "R8" => ScalarCode::R8,
            "I1" => ScalarCode::I1,
            "U1" => ScalarCode::U1,
            "CH" => ScalarCode::Ch,
            "X1" => ScalarCode::X1,
            "I2" => ScalarCode::I2,
            "U2" => ScalarCode::U2,
            "X2" => ScalarCode::X2,
            "I4" => ScalarCode::I4,
            "U4" => ScalarCode::U4,
            "X4" => ScalarCode::X4,
            "I8" => ScalarCode::I8,
            "U8" => ScalarCode::U8,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScalarCode::Ru1_3 => "RU1_3",
            ScalarCode::R4 => "R4",
            ScalarCode::R8 => "R8",
            ScalarCode::I1 => "I1",
            ScalarCode::U1 => "U1",
            ScalarCode::Ch => "CH",
            ScalarCode::X1 => "X1",
            ScalarCode::I2 => "I2",
            ScalarCode::U2 => "U2",
            ScalarCode::X2 => "X2",
            ScalarCode::I4 => "I4",
            ScalarCode::U4 => "U4",
            ScalarCode::X4 => "X4",
            ScalarCode::I8 => "I8",
            ScalarCode::U8 => "U8",
        }
    }

    pub fn element(self) -> Element {
        match self {
            ScalarCode::Ru1_3 => Element::Float8,
            ScalarCode::R4 => Element::F32,
            ScalarCode::R8 => Element::F64,
            ScalarCode::I1 => Element::I8,
            ScalarCode::U1 | ScalarCode::Ch | ScalarCode::X1 => Element::U8,
            ScalarCode::I2 => Element::I16,
            ScalarCode::U2 | ScalarCode::X2 => Element::U16,
            ScalarCode::I4 => Element::I32,
            ScalarCode::U4 | ScalarCode::X4 => Element::U32,
            ScalarCode::I8 => Element::I64,
            ScalarCode::U8 => Element::U64,
        }
    }

    /// Wire width of one element in bytes.
    pub fn width(self) -> usize {
        self.element().width()
    }

    /// `X1`/`X2`/`X4`: values meant to be read as packed bits.
    pub fn is_bitmask(self) -> bool {
        matches!(self, ScalarCode::X1 | ScalarCode::X2 | ScalarCode::X4)
    }
}

impl Element {
    pub fn width(self) -> usize {
        match self {
            Element::Float8 | Element::I8 | Element::U8 => 1,
            Element::I16 | Element::U16 => 2,
            Element::F32 | Element::I32 | Element::U32 => 4,
            Element::F64 | Element::I64 | Element::U64 => 8,
        }
    }

    pub fn rust_name(self) -> &'static str {
        match self {
            Element::Float8 => "Float8",
            Element::F32 => "f32",
            Element::F64 => "f64",
            Element::I8 => "i8",
            Element::U8 => "u8",
            Element::I16 => "i16",
            Element::U16 => "u16",
            Element::I32 => "i32",
            Element::U32 => "u32",
            Element::I64 => "i64",
            Element::U64 => "u64",
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, Element::Float8 | Element::F32 | Element::F64)
    }
}

impl fmt::Display for ScalarCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved type code: scalar plus optional fixed array length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScalarType {
    pub code: ScalarCode,
    pub array_len: Option<usize>,
}

impl ScalarType {
    pub fn element(&self) -> Element {
        self.code.element()
    }

    pub fn is_array(&self) -> bool {
        self.array_len.is_some()
    }

    /// Total wire width: element width times array length (zero for `[0]`).
    pub fn byte_width(&self) -> usize {
        self.code.width() * self.array_len.unwrap_or(1)
    }

    /// Rust spelling: `u32`, `[u32; 12]`, `Float8`.
    pub fn rust_type(&self) -> String {
        let elem = self.element().rust_name();
        match self.array_len {
            Some(n) => format!("[{}; {}]", elem, n),
            None => elem.to_string(),
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.array_len {
            Some(n) => write!(f, "{}[{}]", self.code, n),
            None => write!(f, "{}", self.code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CtypeError {
    #[error("cannot parse {ctype:?} as ctype([arraylen])")]
    Unparsable { ctype: String },
    #[error("cannot parse {ctype:?} as a ctype (invalid scalar part {scalar:?})")]
    UnknownScalar { ctype: String, scalar: String },
    #[error("cannot parse {ctype:?} as a ctype (invalid array part {suffix:?})")]
    MalformedArray { ctype: String, suffix: String },
}

/// Resolve a type code such as `"U4"` or `"U4[12]"`.
pub fn resolve(ctype: &str) -> Result<ScalarType, CtypeError> {
    let unparsable = || CtypeError::Unparsable {
        ctype: ctype.to_string(),
    };
    let top = parse_rule(Rule::ctype, ctype).ok_or_else(unparsable)?;
    let mut scalar = None;
    let mut suffix = None;
    for part in top.into_inner() {
        match part.as_rule() {
            Rule::scalar => scalar = Some(part.as_str()),
            Rule::suffix => suffix = Some(part.as_str()),
            _ => {}
        }
    }
    let scalar = scalar.ok_or_else(unparsable)?;
    let code = ScalarCode::from_code(scalar).ok_or_else(|| CtypeError::UnknownScalar {
        ctype: ctype.to_string(),
        scalar: scalar.to_string(),
    })?;
    let array_len = match suffix {
        None => None,
        Some(suffix) => Some(parse_array_len(suffix).ok_or_else(|| CtypeError::MalformedArray {
            ctype: ctype.to_string(),
            suffix: suffix.to_string(),
        })?),
    };
    Ok(ScalarType { code, array_len })
}

fn parse_array_len(suffix: &str) -> Option<usize> {
    let top = parse_rule(Rule::array_suffix, suffix)?;
    let len = top
        .into_inner()
        .find(|p| p.as_rule() == Rule::array_len)?;
    len.as_str().parse().ok()
}
