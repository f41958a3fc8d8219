//! Code generation from a linked [`Definitions`] graph.
//!
//! [`generate`] writes the machine-generated marker line and then hands the graph to the
//! selected [`Render`] implementation. Renderers resolve type codes, bit masks and names
//! per field through [`ctype`], [`mask`] and [`naming`].

use crate::ast::{Block, BlockId, Cardinality, Definitions, Message, MessageId};
use crate::ctype::{self, CtypeError, ScalarType};
use crate::dump::DumpRenderer;
use crate::mask::{self, MaskError, MaskPolicy};
use crate::naming::{field_ident, msg_type_name, notabs, pascal_case, upper_snake};
use crate::parser::SchemaError;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::{self, Write};

/// Built-in output templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Template {
    /// Rust struct definitions with class/id and bit-mask constants.
    #[default]
    Rust,
    /// Human-readable layout listing.
    Dump,
}

impl Template {
    pub fn name(self) -> &'static str {
        match self {
            Template::Rust => "rust",
            Template::Dump => "dump",
        }
    }

    pub fn renderer(self) -> &'static dyn Render {
        match self {
            Template::Rust => &RustRenderer,
            Template::Dump => &DumpRenderer,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub template: Template,
    pub mask_policy: MaskPolicy,
    /// Tool name written into the generated-file marker.
    pub tool_name: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            template: Template::default(),
            mask_policy: MaskPolicy::default(),
            tool_name: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{message}: block {block:?}: {source}")]
    Ctype {
        message: String,
        block: String,
        source: CtypeError,
    },
    #[error("{message}: bit {bit:?} of {block:?}: {source}")]
    Mask {
        message: String,
        block: String,
        bit: String,
        source: MaskError,
    },
    #[error("{message}: block {block:?} has neither a type nor nested blocks")]
    EmptyBlock { message: String, block: String },
    #[error("{message}: bitfield {block:?} has non-integer or array type {type_code:?}")]
    BitfieldType {
        message: String,
        block: String,
        type_code: String,
    },
    #[error("{message}: mask {mask} of bit {bit:?} does not fit {block:?} ({type_code})")]
    MaskTooWide {
        message: String,
        block: String,
        bit: String,
        mask: mask::Mask,
        type_code: String,
    },
    #[error("{message}: {field} {value:#x} does not fit in a byte")]
    DiscriminatorRange {
        message: String,
        field: &'static str,
        value: u64,
    },
    #[error("{message}: duplicate {kind} `{ident}`")]
    DuplicateIdent {
        message: String,
        kind: &'static str,
        ident: String,
    },
    #[error("formatting: {0}")]
    Fmt(#[from] fmt::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// A template turning the linked graph into text.
pub trait Render {
    fn render(
        &self,
        defs: &Definitions,
        opts: &GenerateOptions,
        out: &mut String,
    ) -> Result<(), RenderError>;
}

/// First line of every generated file.
pub fn marker(opts: &GenerateOptions) -> String {
    format!(
        "// Code generated by {} --template {}; DO NOT EDIT.\n",
        opts.tool_name,
        opts.template.name()
    )
}

/// Render `defs` with the configured template. The result always starts with [`marker`].
pub fn generate(defs: &Definitions, opts: &GenerateOptions) -> Result<String, GenerateError> {
    tracing::debug!(template = opts.template.name(), messages = defs.len(), "rendering");
    let mut out = marker(opts);
    opts.template.renderer().render(defs, opts, &mut out)?;
    Ok(out)
}

/// Parse, link and render an XML catalogue.
pub fn generate_from_xml(xml: &str, opts: &GenerateOptions) -> Result<String, GenerateError> {
    let defs = crate::parser::compile(xml)?;
    generate(&defs, opts)
}

/// Resolve a block's type code with message/block context on failure.
pub(crate) fn resolve_block_type(msg: &Message, name: &str, type_code: &str) -> Result<ScalarType, RenderError> {
    ctype::resolve(type_code).map_err(|source| RenderError::Ctype {
        message: msg.name.clone(),
        block: name.to_string(),
        source,
    })
}

/// Type name of the struct generated for a message: `NAV-POSLLH` -> `Posllh`.
/// Names without a category prefix fall back to the whole name.
pub fn struct_name(msg: &Message) -> String {
    let name = msg_type_name(&msg.name);
    if name.is_empty() {
        pascal_case(&msg.name)
    } else {
        name
    }
}

/// Struct names for every message in document order. Messages whose short names collide
/// are qualified with their category: `NAV-STATUS` and `ESF-STATUS` give `NavStatus` and
/// `EsfStatus`.
pub fn struct_names(defs: &Definitions) -> Vec<String> {
    let short: Vec<String> = defs.messages().map(|(_, m)| struct_name(m)).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in &short {
        *counts.entry(name.as_str()).or_default() += 1;
    }
    defs.messages()
        .zip(&short)
        .map(|((_, m), name)| {
            if counts[name.as_str()] > 1 {
                pascal_case(&m.name)
            } else {
                name.clone()
            }
        })
        .collect()
}

/// Renders Rust structs. `RU1_3` fields use a `Float8` type the consuming crate provides.
pub struct RustRenderer;

struct StructDef {
    name: String,
    docs: Vec<String>,
    blocks: Vec<BlockId>,
    top_level: bool,
}

impl Render for RustRenderer {
    fn render(
        &self,
        defs: &Definitions,
        opts: &GenerateOptions,
        out: &mut String,
    ) -> Result<(), RenderError> {
        let names = struct_names(defs);
        let mut types = HashSet::new();
        for ((id, msg), name) in defs.messages().zip(names) {
            tracing::trace!(name = %msg.name, ty = %name, "rust struct");
            render_message(defs, id, name, opts, &mut types, out)?;
        }
        Ok(())
    }
}

fn render_message(
    defs: &Definitions,
    id: MessageId,
    name: String,
    opts: &GenerateOptions,
    types: &mut HashSet<String>,
    out: &mut String,
) -> Result<(), RenderError> {
    let msg = defs.message(id);
    let mut queue = VecDeque::new();
    queue.push_back(StructDef {
        name,
        docs: message_docs(msg),
        blocks: msg.blocks.clone(),
        top_level: true,
    });
    while let Some(def) = queue.pop_front() {
        claim(msg, "struct", types, &def.name)?;
        writeln!(out)?;
        for line in &def.docs {
            doc_line(out, "", line)?;
        }
        writeln!(out, "#[derive(Debug, Clone, PartialEq)]")?;
        writeln!(out, "pub struct {} {{", def.name)?;
        let mut consts = Vec::new();
        let mut fields = HashSet::new();
        let mut const_names: HashSet<String> = if def.top_level {
            ["NAME", "CLASS", "ID"].iter().map(|s| s.to_string()).collect()
        } else {
            HashSet::new()
        };
        for (pos, &bid) in def.blocks.iter().enumerate() {
            let block = defs.block(bid);
            for line in block_docs(block) {
                doc_line(out, "    ", &line)?;
            }
            let ty = field_type(defs, msg, &def.name, pos, bid, &mut queue)?;
            let ident = field_ident(&block.name, pos);
            claim(msg, "field", &mut fields, &ident)?;
            writeln!(out, "    pub {}: {},", ident, ty)?;
            if block.is_bitfield() {
                bit_consts(defs, msg, bid, opts.mask_policy, &mut const_names, &mut consts)?;
            }
        }
        writeln!(out, "}}")?;

        if def.top_level || !consts.is_empty() {
            writeln!(out)?;
            writeln!(out, "impl {} {{", def.name)?;
            if def.top_level {
                writeln!(out, "    pub const NAME: &'static str = {:?};", msg.name)?;
                writeln!(out, "    pub const CLASS: u8 = {:#04x};", discriminator(msg, "class", msg.class)?)?;
                writeln!(out, "    pub const ID: u8 = {:#04x};", discriminator(msg, "id", msg.id)?)?;
            }
            for c in &consts {
                out.push_str(c);
            }
            writeln!(out, "}}")?;
        }
    }
    Ok(())
}

/// Record a generated identifier, failing if it is already taken in its scope.
fn claim(msg: &Message, kind: &'static str, taken: &mut HashSet<String>, ident: &str) -> Result<(), RenderError> {
    if taken.insert(ident.to_string()) {
        Ok(())
    } else {
        Err(RenderError::DuplicateIdent {
            message: msg.name.clone(),
            kind,
            ident: ident.to_string(),
        })
    }
}

fn discriminator(msg: &Message, field: &'static str, value: u64) -> Result<u8, RenderError> {
    u8::try_from(value).map_err(|_| RenderError::DiscriminatorRange {
        message: msg.name.clone(),
        field,
        value,
    })
}

fn field_type(
    defs: &Definitions,
    msg: &Message,
    owner: &str,
    pos: usize,
    id: BlockId,
    queue: &mut VecDeque<StructDef>,
) -> Result<String, RenderError> {
    let block = defs.block(id);
    let inner = if block.is_group() {
        let suffix = if block.name.is_empty() {
            format!("Item{}", pos)
        } else {
            pascal_case(&block.name)
        };
        let name = format!("{}{}", owner, suffix);
        queue.push_back(StructDef {
            name: name.clone(),
            docs: vec![format!("Element of `{}::{}`.", owner, field_ident(&block.name, pos))],
            blocks: block.nested.clone(),
            top_level: false,
        });
        name
    } else if !block.type_code.trim().is_empty() {
        resolve_block_type(msg, &block.name, block.type_code.trim())?.rust_type()
    } else {
        return Err(RenderError::EmptyBlock {
            message: msg.name.clone(),
            block: block.name.clone(),
        });
    };
    Ok(match block.cardinality {
        Cardinality::Singular => inner,
        Cardinality::Optional => format!("Option<{}>", inner),
        Cardinality::Repeated => format!("Vec<{}>", inner),
    })
}

fn bit_consts(
    defs: &Definitions,
    msg: &Message,
    id: BlockId,
    policy: MaskPolicy,
    names: &mut HashSet<String>,
    consts: &mut Vec<String>,
) -> Result<(), RenderError> {
    let block = defs.block(id);
    let ty = resolve_block_type(msg, &block.name, block.type_code.trim())?;
    let elem = ty.element();
    if ty.is_array() || !elem.is_integer() {
        return Err(RenderError::BitfieldType {
            message: msg.name.clone(),
            block: block.name.clone(),
            type_code: block.type_code.clone(),
        });
    }
    for (_, bit) in defs.bitfield(id) {
        let m = mask::resolve(bit.index.trim(), policy).map_err(|source| RenderError::Mask {
            message: msg.name.clone(),
            block: block.name.clone(),
            bit: bit.name.clone(),
            source,
        })?;
        let bits = elem.width() as u32 * 8;
        if bits < 64 && m.0 >> bits != 0 {
            return Err(RenderError::MaskTooWide {
                message: msg.name.clone(),
                block: block.name.clone(),
                bit: bit.name.clone(),
                mask: m,
                type_code: block.type_code.clone(),
            });
        }
        let ident = format!("{}_{}", upper_snake(&block.name), upper_snake(&bit.name));
        claim(msg, "constant", names, &ident)?;
        let mut c = String::new();
        let desc = notabs(bit.description.trim());
        if desc.is_empty() {
            doc_line(&mut c, "    ", &format!("Bits {} of `{}`.", bit.index.trim(), block.name))?;
        } else {
            doc_line(&mut c, "    ", &format!("{} (bits {})", desc, bit.index.trim()))?;
        }
        writeln!(c, "    pub const {}: {} = {};", ident, elem.rust_name(), m)?;
        consts.push(c);
    }
    Ok(())
}

fn message_docs(msg: &Message) -> Vec<String> {
    let mut docs = Vec::new();
    let mut head = msg.name.clone();
    if !msg.msg_type.trim().is_empty() {
        head.push_str(&format!(" ({})", notabs(msg.msg_type.trim())));
    }
    if !msg.description.trim().is_empty() {
        head.push_str(&format!(": {}", notabs(msg.description.trim())));
    }
    docs.push(head);
    if !msg.comment.trim().is_empty() {
        docs.push(String::new());
        docs.push(notabs(msg.comment.trim()));
    }
    if !msg.firmware.trim().is_empty() {
        docs.push(String::new());
        docs.push(format!("Firmware: {}", notabs(msg.firmware.trim())));
    }
    if !msg.length.trim().is_empty() {
        docs.push(String::new());
        docs.push(format!("Payload length: {}", notabs(msg.length.trim())));
    }
    docs
}

fn block_docs(block: &Block) -> Vec<String> {
    let mut line = notabs(block.comment.trim());
    let mut extras = Vec::new();
    if !block.offset.trim().is_empty() {
        extras.push(format!("offset {}", notabs(block.offset.trim())));
    }
    if !block.unit.trim().is_empty() {
        extras.push(format!("unit {}", notabs(block.unit.trim())));
    }
    if !block.scale.trim().is_empty() {
        extras.push(format!("scale {}", notabs(block.scale.trim())));
    }
    if let (Cardinality::Repeated, Some(count)) = (block.cardinality, &block.count_field) {
        extras.push(format!("repeated `{}` times", count));
    }
    if !extras.is_empty() {
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&format!("[{}]", extras.join(", ")));
    }
    if line.is_empty() {
        Vec::new()
    } else {
        vec![line]
    }
}

/// Write one `///` line with carriage returns dropped.
fn doc_line(out: &mut String, indent: &str, line: &str) -> fmt::Result {
    let line: String = line.chars().filter(|&c| c != '\r').collect();
    if line.is_empty() {
        writeln!(out, "{}///", indent)
    } else {
        writeln!(out, "{}/// {}", indent, line)
    }
}
