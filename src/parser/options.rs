//! Which syntactic forms are legal where an expression is parsed.

use bitflags::bitflags;

bitflags! {
    /// Forms accepted by the expression parser.
    ///
    /// Property references are always legal. A form whose flag is off is
    /// turned into an error node instead of being parsed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ExpressionOptions: u8 {
        /// `@(...)` item references.
        const ITEMS = 1 << 0;
        /// `%(...)` metadata references.
        const METADATA = 1 << 1;
        /// Split the value into `;` separated entries.
        const LISTS = 1 << 2;
        /// Split the value into `,` separated entries.
        const COMMA_LISTS = 1 << 3;

        const ITEMS_AND_METADATA = Self::ITEMS.bits() | Self::METADATA.bits();
        const ITEMS_AND_LISTS = Self::ITEMS.bits() | Self::LISTS.bits();
        const METADATA_AND_LISTS = Self::METADATA.bits() | Self::LISTS.bits();
        const ITEMS_METADATA_AND_LISTS =
            Self::ITEMS.bits() | Self::METADATA.bits() | Self::LISTS.bits();
    }
}

impl ExpressionOptions {
    /// Whether `c` separates list entries under these options.
    pub fn is_list_separator(self, c: char) -> bool {
        (c == ';' && self.contains(Self::LISTS)) || (c == ',' && self.contains(Self::COMMA_LISTS))
    }

    pub fn splits_lists(self) -> bool {
        self.intersects(Self::LISTS | Self::COMMA_LISTS)
    }

    /// The same options with list splitting switched off, for nested
    /// expressions such as quoted arguments.
    pub fn without_lists(self) -> Self {
        self - (Self::LISTS | Self::COMMA_LISTS)
    }
}
