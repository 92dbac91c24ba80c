//! Ordered bit-pattern tables.
//!
//! Instruction classes of both instruction sets are told apart by masks that
//! overlap, so a table is walked top to bottom and the first entry that
//! matches wins. Some entries also carry an exclusion pattern: the entry does
//! not match when the excluded bits are present, even if its own mask does.

/// One row of a decode table.
#[derive(Debug, Clone, Copy)]
pub struct Archetype<C> {
    pub mask: u32,
    pub bits: u32,
    pub exclude: Option<(u32, u32)>,
    pub class: C,
}

impl<C: Copy> Archetype<C> {
    pub const fn new(mask: u32, bits: u32, class: C) -> Self {
        Self {
            mask,
            bits,
            exclude: None,
            class,
        }
    }

    /// Same as [`Archetype::new`] but rejects words where `word & mask == bits`.
    pub const fn excluding(self, mask: u32, bits: u32) -> Self {
        Self {
            mask: self.mask,
            bits: self.bits,
            exclude: Some((mask, bits)),
            class: self.class,
        }
    }

    #[must_use]
    pub fn matches(&self, word: u32) -> bool {
        word & self.mask == self.bits
            && self
                .exclude
                .is_none_or(|(mask, bits)| word & mask != bits)
    }
}

/// First class whose pattern accepts `word`.
pub fn classify<C: Copy>(table: &[Archetype<C>], word: u32) -> Option<C> {
    table
        .iter()
        .find(|archetype| archetype.matches(word))
        .map(|archetype| archetype.class)
}
