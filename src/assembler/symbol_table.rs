//! Symbol table management for labels and data names

use crate::assembler::{Symbol, SymbolKind};

/// Symbol table for label and data definitions
///
/// Labels and data live in separate namespaces: `:buffer` and `.buffer` may
/// coexist.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    /// Create a new empty symbol table
    pub fn new() -> Self {
        Self {
            symbols: Vec::new(),
        }
    }

    /// Add a symbol to the table
    ///
    /// Returns Ok(()) on success, Err with the existing symbol if the name is
    /// already defined in the same namespace
    pub fn add_symbol(
        &mut self,
        name: String,
        kind: SymbolKind,
        address: u16,
        defined_at: usize,
    ) -> Result<(), Symbol> {
        let existing = match kind {
            SymbolKind::Label => self.lookup_label(&name),
            SymbolKind::Data { .. } => self.lookup_data(&name),
        };
        if let Some(existing) = existing {
            return Err(existing.clone());
        }

        self.symbols.push(Symbol {
            name,
            kind,
            address,
            defined_at,
        });

        Ok(())
    }

    /// Look up a label by name (without the `:` prefix)
    pub fn lookup_label(&self, name: &str) -> Option<&Symbol> {
        self.symbols
            .iter()
            .find(|s| s.name == name && s.kind == SymbolKind::Label)
    }

    /// Look up a data declaration by name (without the `.` prefix)
    pub fn lookup_data(&self, name: &str) -> Option<&Symbol> {
        self.symbols
            .iter()
            .find(|s| s.name == name && matches!(s.kind, SymbolKind::Data { .. }))
    }

    /// Get all symbols, labels first in definition order
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
