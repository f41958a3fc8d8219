//! # ubxgen: UBX message catalogue compiler
//!
//! Compiles an XML description of a UBX-style binary message family (class/id framed
//! messages with fixed and repeated fields, nested groups and packed bitfields) into a
//! linked, type-resolved layout model, and renders that model into source text.
//!
//! ## Pipeline
//!
//! - [`parse`]: XML document into the [`Definitions`] arena (document order preserved)
//! - [`Definitions::link`]: back-references from blocks to messages and bits to blocks
//! - [`generate`]: generated-file marker plus the selected [`Template`]
//!
//! ## Resolvers
//!
//! - [`ctype::resolve`]: `"U4[12]"` to a 32-bit unsigned array of 12
//! - [`mask::mask`]: `"7:4"` to `"0xf0"`
//! - [`naming`]: `"NAV-POSLLH"` to `"Posllh"`, whitespace collapse, case folding
//!
//! ## Example document
//!
//! ```text
//! <Definitions>
//!   <Message>
//!     <Name>NAV-STATUS</Name>
//!     <Structure>
//!       <Class>0x01</Class><Id>0x03</Id><Length>16</Length>
//!       <Payload>
//!         <Block><Offset>0</Offset><Name>iTOW</Name><Type>U4</Type><Unit>ms</Unit></Block>
//!         <Block><Offset>5</Offset><Name>flags</Name><Type>X1</Type>
//!           <Bitfield><Type><Index>0</Index><Name>gpsFixOk</Name></Type></Bitfield>
//!         </Block>
//!       </Payload>
//!     </Structure>
//!   </Message>
//! </Definitions>
//! ```

pub mod ast;
pub mod codegen;
pub mod ctype;
pub mod dump;
mod grammar;
mod link;
pub mod mask;
pub mod naming;
pub mod parser;

pub use ast::{BitDef, BitDefId, Block, BlockId, Cardinality, Definitions, Message, MessageId};
pub use codegen::{generate, generate_from_xml, GenerateError, GenerateOptions, Render, RenderError, Template};
pub use ctype::{CtypeError, ScalarCode, ScalarType};
pub use grammar::parse_uint;
pub use mask::{BitRange, Mask, MaskError, MaskPolicy};
pub use parser::{compile, parse, SchemaError};
