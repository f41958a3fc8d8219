//! Compiled schema model: an arena of messages, blocks and bit definitions.
//!
//! Entities refer to each other through copyable ids. Parents own their children by
//! listing child ids; children point back at their parents through `Option` ids that
//! only [`Definitions::link`] fills in.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitDefId(pub(crate) usize);

/// Root of the graph. Owns every message, block and bit definition.
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    pub(crate) messages: Vec<Message>,
    pub(crate) blocks: Vec<Block>,
    pub(crate) bitdefs: Vec<BitDef>,
}

/// One wire message type.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Raw schema name, e.g. `NAV-POSLLH`.
    pub name: String,
    pub msg_type: String,
    pub description: String,
    pub comment: String,
    pub firmware: String,
    pub class: u64,
    pub id: u64,
    /// Payload length expression (`28`, `8 + 12*numCh`), never evaluated.
    pub length: String,
    pub blocks: Vec<BlockId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cardinality {
    #[default]
    Singular,
    Optional,
    Repeated,
}

impl Cardinality {
    pub fn as_str(self) -> &'static str {
        match self {
            Cardinality::Singular => "singular",
            Cardinality::Optional => "optional",
            Cardinality::Repeated => "repeated",
        }
    }
}

/// A field or field group within a message payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub cardinality: Cardinality,
    /// For repeated blocks: the sibling field holding the repeat count.
    pub count_field: Option<String>,
    pub offset: String,
    pub name: String,
    /// Scalar type code; empty for pure containers.
    pub type_code: String,
    pub comment: String,
    pub scale: String,
    pub unit: String,
    pub bitfield: Vec<BitDefId>,
    pub nested: Vec<BlockId>,
    pub(crate) message: Option<MessageId>,
}

impl Block {
    /// Owning message, once linked.
    pub fn message(&self) -> Option<MessageId> {
        self.message
    }

    pub fn is_group(&self) -> bool {
        !self.nested.is_empty()
    }

    pub fn is_bitfield(&self) -> bool {
        !self.bitfield.is_empty()
    }
}

/// A named bit or bit range inside a bitfield block.
#[derive(Debug, Clone, PartialEq)]
pub struct BitDef {
    /// `"3"` or `"7:4"`.
    pub index: String,
    pub type_code: String,
    pub name: String,
    pub description: String,
    pub(crate) field: Option<BlockId>,
}

impl BitDef {
    /// Owning block, once linked.
    pub fn field(&self) -> Option<BlockId> {
        self.field
    }
}

impl Definitions {
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages in document order.
    pub fn messages(&self) -> impl Iterator<Item = (MessageId, &Message)> {
        self.messages.iter().enumerate().map(|(i, m)| (MessageId(i), m))
    }

    /// Every block in the graph, in document pre-order.
    pub fn all_blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks.iter().enumerate().map(|(i, b)| (BlockId(i), b))
    }

    /// Every bit definition in the graph, in document order.
    pub fn all_bitdefs(&self) -> impl Iterator<Item = (BitDefId, &BitDef)> {
        self.bitdefs.iter().enumerate().map(|(i, b)| (BitDefId(i), b))
    }

    pub fn message(&self, id: MessageId) -> &Message {
        &self.messages[id.0]
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    pub fn bitdef(&self, id: BitDefId) -> &BitDef {
        &self.bitdefs[id.0]
    }

    /// Top-level blocks of a message.
    pub fn blocks(&self, id: MessageId) -> impl Iterator<Item = (BlockId, &Block)> {
        self.message(id).blocks.iter().map(move |&b| (b, self.block(b)))
    }

    pub fn nested(&self, id: BlockId) -> impl Iterator<Item = (BlockId, &Block)> {
        self.block(id).nested.iter().map(move |&b| (b, self.block(b)))
    }

    pub fn bitfield(&self, id: BlockId) -> impl Iterator<Item = (BitDefId, &BitDef)> {
        self.block(id).bitfield.iter().map(move |&d| (d, self.bitdef(d)))
    }

    /// Enclosing message of a block; `None` before linking.
    pub fn message_of(&self, id: BlockId) -> Option<&Message> {
        self.block(id).message.map(|m| self.message(m))
    }

    /// Enclosing block of a bit definition; `None` before linking.
    pub fn field_of(&self, id: BitDefId) -> Option<&Block> {
        self.bitdef(id).field.map(|b| self.block(b))
    }

    pub fn message_by_name(&self, name: &str) -> Option<(MessageId, &Message)> {
        self.messages().find(|(_, m)| m.name == name)
    }

    pub fn message_by_discriminator(&self, class: u64, id: u64) -> Option<(MessageId, &Message)> {
        self.messages().find(|(_, m)| m.class == class && m.id == id)
    }

    /// Class/id pairs used by more than one message, with the names sharing each pair.
    /// Uniqueness is a precondition on the input, so this only reports.
    pub fn duplicate_discriminators(&self) -> Vec<((u64, u64), Vec<String>)> {
        let mut seen: HashMap<(u64, u64), Vec<String>> = HashMap::new();
        let mut order = Vec::new();
        for (_, m) in self.messages() {
            let key = (m.class, m.id);
            let names = seen.entry(key).or_default();
            if names.is_empty() {
                order.push(key);
            }
            names.push(m.name.clone());
        }
        order
            .into_iter()
            .filter_map(|key| {
                let names = seen.remove(&key)?;
                (names.len() > 1).then_some((key, names))
            })
            .collect()
    }

    pub(crate) fn push_message(&mut self, message: Message) -> MessageId {
        self.messages.push(message);
        MessageId(self.messages.len() - 1)
    }

    /// Reserve a block slot so parents precede their children in the arena.
    pub(crate) fn push_block(&mut self, block: Block) -> BlockId {
        self.blocks.push(block);
        BlockId(self.blocks.len() - 1)
    }

    pub(crate) fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.0]
    }

    pub(crate) fn push_bitdef(&mut self, bitdef: BitDef) -> BitDefId {
        self.bitdefs.push(bitdef);
        BitDefId(self.bitdefs.len() - 1)
    }
}
