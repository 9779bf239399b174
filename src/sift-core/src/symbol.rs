//! Symbols and the symbol table.
//!
//! A [`Symbol`] is the identity of one column flowing through a plan. Two
//! symbols are equal only when they were produced by the same allocation:
//! display names are for humans and may repeat across allocators, so equality,
//! ordering and hashing all go through [`SymbolId`].

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use common_error::{SiftError, SiftResult};
use serde::{Deserialize, Serialize};

use crate::types::DataType;

/// Identifier of a symbol, unique within one [`SymbolAllocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

impl std::fmt::Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A column identity with a display name and a value type.
///
/// Symbols are immutable and cheap to clone; plan nodes hold them by value.
#[derive(Clone, Serialize, Deserialize)]
pub struct Symbol {
    id: SymbolId,
    name: Arc<str>,
    data_type: DataType,
}

impl Symbol {
    fn new(id: SymbolId, name: Arc<str>, data_type: DataType) -> Self {
        Self {
            id,
            name,
            data_type,
        }
    }

    /// The unique identifier of this symbol.
    pub const fn id(&self) -> SymbolId {
        self.id
    }

    /// The display name of this symbol.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value type of this symbol.
    pub const fn data_type(&self) -> &DataType {
        &self.data_type
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.name, self.id)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An ordered set of symbols (ordered by allocation id).
pub type SymbolSet = BTreeSet<Symbol>;

/// The symbol table of one optimization run.
///
/// Allocates fresh symbols with unique display names. Each planning invocation
/// owns its own allocator; nothing is shared across runs.
#[derive(Debug, Clone, Default)]
pub struct SymbolAllocator {
    symbols: BTreeMap<SymbolId, Symbol>,
    by_name: HashMap<Arc<str>, SymbolId>,
    next_id: u32,
}

impl SymbolAllocator {
    /// Create an empty symbol table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new symbol.
    ///
    /// The display name is `name` when it is still free, otherwise `name_<n>`
    /// for the smallest free `n`.
    pub fn new_symbol(&mut self, name: &str, data_type: DataType) -> Symbol {
        let unique: Arc<str> = if self.by_name.contains_key(name) {
            let mut suffix = 1usize;
            loop {
                let candidate = format!("{name}_{suffix}");
                if !self.by_name.contains_key(candidate.as_str()) {
                    break candidate.into();
                }
                suffix += 1;
            }
        } else {
            name.into()
        };

        let id = SymbolId(self.next_id);
        self.next_id += 1;

        let symbol = Symbol::new(id, Arc::clone(&unique), data_type);
        self.by_name.insert(unique, id);
        self.symbols.insert(id, symbol.clone());
        symbol
    }

    /// Return the symbol with exactly this display name, allocating an `Int64`
    /// symbol if there is none yet.
    pub fn symbol(&mut self, name: &str) -> Symbol {
        match self.lookup(name) {
            Some(symbol) => symbol.clone(),
            None => self.new_symbol(name, DataType::default()),
        }
    }

    /// Find a symbol by id.
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(&id)
    }

    /// Find a symbol by exact display name.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.by_name.get(name).and_then(|id| self.symbols.get(id))
    }

    /// Check whether this table allocated (or registered) the given symbol.
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.symbols
            .get(&symbol.id)
            .is_some_and(|known| known.name == symbol.name)
    }

    /// Register a symbol created elsewhere, e.g. one read back from a serialized plan.
    ///
    /// Registering the same symbol twice is a no-op; an id or name clash with a
    /// different symbol is an error.
    pub fn register(&mut self, symbol: &Symbol) -> SiftResult<()> {
        if let Some(known) = self.symbols.get(&symbol.id) {
            if known.name == symbol.name {
                return Ok(());
            }
            return Err(SiftError::symbol(format!(
                "symbol id {} is already bound to '{}', cannot register '{}'",
                symbol.id, known.name, symbol.name
            )));
        }
        if let Some(other) = self.by_name.get(&symbol.name) {
            return Err(SiftError::symbol(format!(
                "symbol name '{}' is already bound to id {}",
                symbol.name, other
            )));
        }

        self.next_id = self.next_id.max(symbol.id.0 + 1);
        self.by_name.insert(Arc::clone(&symbol.name), symbol.id);
        self.symbols.insert(symbol.id, symbol.clone());
        Ok(())
    }

    /// Number of symbols in the table.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterate over all symbols in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }
}
