//! Deserialize an XML message catalogue into the [`Definitions`] arena.
//!
//! The document is read with `quick-xml`'s serde support into raw mirror structs, which
//! are then flattened into the arena in document order. Any malformed node aborts the
//! whole parse.

use crate::ast::*;
use crate::grammar::parse_uint;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("malformed schema document: {0}")]
    Xml(#[from] quick_xml::DeError),
    #[error("message {message:?}: {field} {value:?} is not a decimal or 0x-hex unsigned integer")]
    InvalidLiteral {
        message: String,
        field: &'static str,
        value: String,
    },
    #[error("message {message:?}: block {block:?} has unknown cardinality {value:?} (expected \"optional\" or \"repeated\")")]
    UnknownCardinality {
        message: String,
        block: String,
        value: String,
    },
}

#[derive(Debug, Deserialize)]
struct RawDefinitions {
    #[serde(rename = "Message", default)]
    messages: Vec<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Type", default)]
    msg_type: String,
    #[serde(rename = "Description", default)]
    description: String,
    #[serde(rename = "Comment", default)]
    comment: String,
    #[serde(rename = "Firmware", default)]
    firmware: String,
    #[serde(rename = "Structure")]
    structure: RawStructure,
}

#[derive(Debug, Deserialize)]
struct RawStructure {
    #[serde(rename = "Class")]
    class: String,
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Length", default)]
    length: String,
    #[serde(rename = "Payload", default)]
    payload: RawPayload,
}

#[derive(Debug, Default, Deserialize)]
struct RawPayload {
    #[serde(rename = "Block", default)]
    blocks: Vec<RawBlock>,
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    #[serde(rename = "@type", default)]
    cardinality: Option<String>,
    #[serde(rename = "@name", default)]
    count_field: Option<String>,
    #[serde(rename = "Offset", default)]
    offset: String,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Type", default)]
    type_code: String,
    #[serde(rename = "Comment", default)]
    comment: String,
    #[serde(rename = "Scale", default)]
    scale: String,
    #[serde(rename = "Unit", default)]
    unit: String,
    #[serde(rename = "Bitfield", default)]
    bitfield: RawBitfield,
    #[serde(rename = "Block", default)]
    nested: Vec<RawBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct RawBitfield {
    #[serde(rename = "Type", default)]
    bits: Vec<RawBitDef>,
}

#[derive(Debug, Deserialize)]
struct RawBitDef {
    #[serde(rename = "Index", default)]
    index: String,
    #[serde(rename = "Type", default)]
    type_code: String,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Description", default)]
    description: String,
}

/// Parse an XML catalogue into an unlinked [`Definitions`] graph.
pub fn parse(xml: &str) -> Result<Definitions, SchemaError> {
    let raw: RawDefinitions = quick_xml::de::from_str(xml)?;
    let mut defs = Definitions::default();
    for m in raw.messages {
        build_message(&mut defs, m)?;
    }
    tracing::debug!(
        messages = defs.messages.len(),
        blocks = defs.blocks.len(),
        bitdefs = defs.bitdefs.len(),
        "parsed schema"
    );
    Ok(defs)
}

/// Parse and link in one step.
pub fn compile(xml: &str) -> Result<Definitions, SchemaError> {
    let mut defs = parse(xml)?;
    defs.link();
    Ok(defs)
}

fn build_message(defs: &mut Definitions, raw: RawMessage) -> Result<MessageId, SchemaError> {
    let class = parse_literal(&raw.name, "class", &raw.structure.class)?;
    let id = parse_literal(&raw.name, "id", &raw.structure.id)?;
    let mut blocks = Vec::with_capacity(raw.structure.payload.blocks.len());
    for b in raw.structure.payload.blocks {
        blocks.push(build_block(defs, &raw.name, b)?);
    }
    tracing::trace!(name = %raw.name, class, id, "message");
    Ok(defs.push_message(Message {
        name: raw.name,
        msg_type: raw.msg_type,
        description: raw.description,
        comment: raw.comment,
        firmware: raw.firmware,
        class,
        id,
        length: raw.structure.length,
        blocks,
    }))
}

fn build_block(defs: &mut Definitions, message: &str, raw: RawBlock) -> Result<BlockId, SchemaError> {
    let cardinality = parse_cardinality(message, &raw)?;
    let id = defs.push_block(Block {
        cardinality,
        count_field: raw.count_field.filter(|s| !s.is_empty()),
        offset: raw.offset,
        name: raw.name,
        type_code: raw.type_code,
        comment: raw.comment,
        scale: raw.scale,
        unit: raw.unit,
        bitfield: Vec::new(),
        nested: Vec::new(),
        message: None,
    });
    let mut bitfield = Vec::with_capacity(raw.bitfield.bits.len());
    for bit in raw.bitfield.bits {
        bitfield.push(defs.push_bitdef(BitDef {
            index: bit.index,
            type_code: bit.type_code,
            name: bit.name,
            description: bit.description,
            field: None,
        }));
    }
    let mut nested = Vec::with_capacity(raw.nested.len());
    for child in raw.nested {
        nested.push(build_block(defs, message, child)?);
    }
    let block = defs.block_mut(id);
    block.bitfield = bitfield;
    block.nested = nested;
    Ok(id)
}

fn parse_cardinality(message: &str, raw: &RawBlock) -> Result<Cardinality, SchemaError> {
    match raw.cardinality.as_deref().map(str::trim) {
        None | Some("") => Ok(Cardinality::Singular),
        Some("optional") => Ok(Cardinality::Optional),
        Some("repeated") => Ok(Cardinality::Repeated),
        Some(other) => Err(SchemaError::UnknownCardinality {
            message: message.to_string(),
            block: raw.name.clone(),
            value: other.to_string(),
        }),
    }
}

fn parse_literal(message: &str, field: &'static str, value: &str) -> Result<u64, SchemaError> {
    parse_uint(value.trim()).ok_or_else(|| SchemaError::InvalidLiteral {
        message: message.to_string(),
        field,
        value: value.to_string(),
    })
}
