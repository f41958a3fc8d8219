//! Layout listing of a linked graph: one line per message, block and bit definition.
//!
//! ```text
//! NAV-STATUS class=0x01 id=0x03 length="16"
//!   [0] iTOW: U4 -> u32 (4 bytes) ms
//!   [5] flags: X1 -> u8 (1 byte)
//!       gpsFixOk 0 mask=0x1
//! ```

use crate::ast::{BlockId, Cardinality, Definitions, Message};
use crate::codegen::{resolve_block_type, GenerateOptions, Render, RenderError};
use crate::mask;
use crate::naming::notabs;
use std::fmt::Write;

pub struct DumpRenderer;

impl Render for DumpRenderer {
    fn render(
        &self,
        defs: &Definitions,
        opts: &GenerateOptions,
        out: &mut String,
    ) -> Result<(), RenderError> {
        for (_, msg) in defs.messages() {
            writeln!(
                out,
                "{} class={:#04x} id={:#04x} length={:?}",
                msg.name,
                msg.class,
                msg.id,
                notabs(msg.length.trim())
            )?;
            for &block in &msg.blocks {
                dump_block(defs, msg, block, 1, opts, out)?;
            }
        }
        Ok(())
    }
}

fn dump_block(
    defs: &Definitions,
    msg: &Message,
    id: BlockId,
    depth: usize,
    opts: &GenerateOptions,
    out: &mut String,
) -> Result<(), RenderError> {
    let block = defs.block(id);
    let indent = "  ".repeat(depth);
    write!(out, "{}", indent)?;
    match block.cardinality {
        Cardinality::Singular => {}
        Cardinality::Optional => write!(out, "{} ", block.cardinality.as_str())?,
        Cardinality::Repeated => match &block.count_field {
            Some(count) => write!(out, "{}({}) ", block.cardinality.as_str(), count)?,
            None => write!(out, "{} ", block.cardinality.as_str())?,
        },
    }
    if !block.offset.trim().is_empty() {
        write!(out, "[{}] ", notabs(block.offset.trim()))?;
    }
    let name = if block.name.is_empty() { "-" } else { block.name.as_str() };
    let code = block.type_code.trim();
    if code.is_empty() {
        write!(out, "{}:", name)?;
    } else {
        let ty = resolve_block_type(msg, &block.name, code)?;
        let width = ty.byte_width();
        let unit = if width == 1 { "byte" } else { "bytes" };
        write!(out, "{}: {} -> {} ({} {})", name, code, ty.rust_type(), width, unit)?;
    }
    if !block.unit.trim().is_empty() {
        write!(out, " {}", notabs(block.unit.trim()))?;
    }
    if !block.scale.trim().is_empty() {
        write!(out, " scale={}", notabs(block.scale.trim()))?;
    }
    writeln!(out)?;

    for (_, bit) in defs.bitfield(id) {
        let m = mask::resolve(bit.index.trim(), opts.mask_policy).map_err(|source| RenderError::Mask {
            message: msg.name.clone(),
            block: block.name.clone(),
            bit: bit.name.clone(),
            source,
        })?;
        writeln!(out, "{}    {} {} mask={}", indent, bit.name, bit.index.trim(), m)?;
    }
    for &child in &block.nested {
        dump_block(defs, msg, child, depth + 1, opts, out)?;
    }
    Ok(())
}
