//! Linking: fill in child-to-parent back-references after deserialization.

use crate::ast::{BlockId, Definitions, MessageId};

impl Definitions {
    /// Point every block (nested ones included) at its message and every bit
    /// definition at its block. Re-running sets the same ids again.
    pub fn link(&mut self) {
        for m in 0..self.messages.len() {
            let msg = MessageId(m);
            for i in 0..self.messages[m].blocks.len() {
                let block = self.messages[m].blocks[i];
                self.link_block(block, msg);
            }
        }
        tracing::debug!(
            messages = self.messages.len(),
            blocks = self.blocks.len(),
            bitdefs = self.bitdefs.len(),
            "linked definitions"
        );
    }

    fn link_block(&mut self, id: BlockId, msg: MessageId) {
        self.blocks[id.0].message = Some(msg);
        for i in 0..self.blocks[id.0].bitfield.len() {
            let bit = self.blocks[id.0].bitfield[i];
            self.bitdefs[bit.0].field = Some(id);
        }
        for i in 0..self.blocks[id.0].nested.len() {
            let child = self.blocks[id.0].nested[i];
            self.link_block(child, msg);
        }
    }

    /// True when every block and bit definition carries its back-reference.
    pub fn is_linked(&self) -> bool {
        self.blocks.iter().all(|b| b.message.is_some())
            && self.bitdefs.iter().all(|d| d.field.is_some())
    }
}
