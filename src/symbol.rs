// Symbol Table
//
// Interned symbols compare by id. ISLISP has no packages, so there is one
// flat namespace plus uninterned symbols minted by `gensym`.

use crate::fastmap::HashMap;

/// Unique identifier for a symbol (index into symbol table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

#[derive(Debug, Clone)]
pub struct Symbol {
    /// The symbol's name (e.g., "CAR", "MY-VAR")
    pub name: String,
    /// False for symbols that no name lookup can reach
    pub interned: bool,
}

/// The global symbol table
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    /// Name -> SymbolId for interned symbols only
    names: HashMap<String, SymbolId>,
    gensym_counter: u64,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a symbol, returning the existing one if the name is known.
    pub fn intern(&mut self, name: &str) -> SymbolId {
        let upper = name.to_uppercase();
        if let Some(&id) = self.names.get(&upper) {
            return id;
        }
        let id = self.push(upper.clone(), true);
        self.names.insert(upper, id);
        id
    }

    /// Look up an interned symbol without creating it.
    pub fn find(&self, name: &str) -> Option<SymbolId> {
        self.names.get(&name.to_uppercase()).copied()
    }

    /// Create an uninterned symbol
    pub fn make_symbol(&mut self, name: &str) -> SymbolId {
        self.push(name.to_string(), false)
    }

    /// Mint a fresh uninterned symbol named `prefix` followed by a counter.
    ///
    /// The symbol never enters the name table, so no reader lookup can return
    /// it even if some text spells the same name.
    pub fn gensym(&mut self, prefix: &str) -> SymbolId {
        self.gensym_counter += 1;
        let name = format!("{}{}", prefix, self.gensym_counter);
        let id = self.make_symbol(&name);
        log::trace!("gensym {} -> {:?}", name, id);
        id
    }

    fn push(&mut self, name: String, interned: bool) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol { name, interned });
        id
    }

    /// Get a symbol by ID
    pub fn get_symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    /// Get the name of a symbol
    pub fn symbol_name(&self, id: SymbolId) -> Option<&str> {
        self.get_symbol(id).map(|s| s.name.as_str())
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_symbol() {
        let mut table = SymbolTable::new();
        let sym1 = table.intern("foo");
        let sym2 = table.intern("FOO");
        assert_eq!(sym1, sym2);

        let sym3 = table.intern("BAR");
        assert_ne!(sym1, sym3);
        assert_eq!(table.symbol_name(sym1), Some("FOO"));
        assert_eq!(table.symbol_count(), 2);
    }

    #[test]
    fn test_uninterned() {
        let mut table = SymbolTable::new();
        let sym = table.make_symbol("G123");
        assert!(!table.get_symbol(sym).unwrap().interned);
        assert_eq!(table.find("G123"), None);
    }

    #[test]
    fn test_gensym_unreachable_by_name() {
        let mut table = SymbolTable::new();
        let g1 = table.gensym("#:");
        let g2 = table.gensym("#:");
        assert_ne!(g1, g2);
        assert_eq!(table.symbol_name(g1), Some("#:1"));

        let spelled = table.intern("#:1");
        assert_ne!(spelled, g1);
        assert_eq!(table.symbol_count(), 3);
    }
}
