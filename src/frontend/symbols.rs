//! Symbol table and scope management for Ren'Py scripts
//!
//! Scopes form a tree stored in an arena. Each scope holds two independent namespaces: ordinary symbols (variables,
//! parameters) and labels. Parent links are arena indices, so the table owns every scope and symbol and there are no
//! ownership cycles.
//!
//! ## Notes
//! - [`SymbolTable::resolve`] walks the symbol namespace up the parent chain.
//! - [`SymbolTable::resolve_label`] checks the scope's own labels, then falls back to the parent chain's **symbol**
//!   namespace. Labels are only visible in the scope that defines them, but an enclosing value of the same name is
//!   still reachable.
//! - Failed definitions never insert anything; the first definition always stays in place.

use std::collections::HashMap;

use rpy_syntax::document::Location;
use thiserror::Error;

/// Unique identifier for symbols
pub type SymbolId = usize;

/// Unique identifier for scopes
pub type ScopeId = usize;

/// The root scope of every table.
pub const GLOBAL_SCOPE: ScopeId = 0;

/// A definition rejected because its identifier is already taken.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct DuplicateDefinitionError {
    pub message: String,
    pub location: Location,
    /// The definition that stays in place.
    pub existing: SymbolId,
    /// The rejected definition. It is never inserted into the table.
    pub duplicate: Symbol,
}

/// Symbol table managing all scopes and named definitions of one program
#[derive(Debug)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    scopes: Vec<Scope>,
    current_scope: ScopeId,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            symbols: Vec::new(),
            scopes: vec![Scope::new(None, ScopeKind::Global)],
            current_scope: GLOBAL_SCOPE,
        }
    }

    /// Enter a new child scope of the current scope
    pub fn enter_scope(&mut self, kind: ScopeKind, parent_label: Option<SymbolId>) -> ScopeId {
        let mut scope = Scope::new(Some(self.current_scope), kind);
        scope.parent_label = parent_label;
        self.scopes.push(scope);
        self.current_scope = self.scopes.len() - 1;
        self.current_scope
    }

    /// Exit the current scope
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current_scope].parent {
            self.current_scope = parent;
        }
    }

    pub fn current_scope(&self) -> ScopeId {
        self.current_scope
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Get a symbol by ID
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    /// Get a mutable symbol by ID
    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id)
    }

    /// All symbols and labels in definition order
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Record a reference site on a symbol
    pub fn add_reference(&mut self, id: SymbolId, location: Location) {
        if let Some(symbol) = self.symbols.get_mut(id) {
            symbol.references.push(location);
        }
    }

    // ========================================================================
    // Symbols
    // ========================================================================

    /// Define an ordinary symbol in `scope`.
    ///
    /// ## Parameters
    /// - `no_shadow`: also reject the definition if `identifier` already resolves through an ancestor scope.
    ///
    /// ## Errors
    /// Returns a [`DuplicateDefinitionError`] if `identifier` is already defined in `scope`, or (with `no_shadow`)
    /// visible from it. Nothing is inserted in that case.
    pub fn define_symbol(
        &mut self,
        scope: ScopeId,
        identifier: &str,
        location: Location,
        no_shadow: bool,
    ) -> Result<SymbolId, DuplicateDefinitionError> {
        let symbol = Symbol::new(identifier, location, scope, SymbolKind::Variable);

        if let Some(existing) = self.lookup_local(scope, identifier) {
            return Err(self.duplicate(
                format!("A symbol with the identifier \"{identifier}\" has already been defined."),
                existing,
                symbol,
            ));
        }
        if let Some(existing) = self.resolve(scope, identifier).filter(|_| no_shadow) {
            return Err(self.duplicate(
                format!("A symbol with the identifier \"{identifier}\" has already been defined in this scope."),
                existing,
                symbol,
            ));
        }

        Ok(self.insert(symbol, |scope| &mut scope.symbols))
    }

    /// Like [`SymbolTable::define_symbol`], but the symbol is a label parameter
    pub fn define_parameter(
        &mut self,
        scope: ScopeId,
        identifier: &str,
        location: Location,
    ) -> Result<SymbolId, DuplicateDefinitionError> {
        let id = self.define_symbol(scope, identifier, location, false)?;
        self.symbols[id].kind = SymbolKind::Parameter;
        Ok(id)
    }

    /// Look up `identifier` in `scope`'s symbol namespace only
    pub fn lookup_local(&self, scope: ScopeId, identifier: &str) -> Option<SymbolId> {
        self.scopes.get(scope)?.symbols.get(identifier).copied()
    }

    /// Look up a symbol by name through the scope chain starting at `scope`
    pub fn resolve(&self, scope: ScopeId, identifier: &str) -> Option<SymbolId> {
        let mut scope_idx = scope;
        loop {
            let current = self.scopes.get(scope_idx)?;
            if let Some(&id) = current.symbols.get(identifier) {
                return Some(id);
            }
            scope_idx = current.parent?;
        }
    }

    // ========================================================================
    // Labels
    // ========================================================================

    /// Define a label in `scope`.
    ///
    /// ## Notes
    /// - The shadow check consults the symbol namespace of the scope chain, matching [`SymbolTable::resolve_label`]'s
    ///   fallback.
    ///
    /// ## Errors
    /// Same conditions as [`SymbolTable::define_symbol`], checked against the label namespace first.
    pub fn define_label(
        &mut self,
        scope: ScopeId,
        identifier: &str,
        location: Location,
        no_shadow: bool,
    ) -> Result<SymbolId, DuplicateDefinitionError> {
        let label = Symbol::new(identifier, location, scope, SymbolKind::Label);

        if let Some(existing) = self.scopes.get(scope).and_then(|s| s.labels.get(identifier).copied()) {
            return Err(self.duplicate(
                format!("A label with the identifier \"{identifier}\" has already been defined."),
                existing,
                label,
            ));
        }
        if let Some(existing) = self.resolve(scope, identifier).filter(|_| no_shadow) {
            return Err(self.duplicate(
                format!("A label with the identifier \"{identifier}\" has already been defined in this scope."),
                existing,
                label,
            ));
        }

        Ok(self.insert(label, |scope| &mut scope.labels))
    }

    /// Look up a label in `scope`, falling back to the parent chain's symbol namespace
    pub fn resolve_label(&self, scope: ScopeId, identifier: &str) -> Option<SymbolId> {
        let current = self.scopes.get(scope)?;
        if let Some(&id) = current.labels.get(identifier) {
            return Some(id);
        }
        self.resolve(current.parent?, identifier)
    }

    /// The nearest enclosing global (non-local) label, walking up from `scope`
    pub fn enclosing_global_label(&self, scope: ScopeId) -> Option<SymbolId> {
        let mut scope_idx = scope;
        loop {
            let current = self.scopes.get(scope_idx)?;
            if let Some(label) = current.parent_label.filter(|&l| !self.symbols[l].identifier.contains('.')) {
                return Some(label);
            }
            scope_idx = current.parent?;
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn insert(&mut self, symbol: Symbol, namespace: impl FnOnce(&mut Scope) -> &mut HashMap<String, SymbolId>) -> SymbolId {
        let id = self.symbols.len();
        let scope = &mut self.scopes[symbol.scope];
        namespace(scope).insert(symbol.identifier.clone(), id);
        self.symbols.push(symbol);
        id
    }

    fn duplicate(&self, message: String, existing: SymbolId, duplicate: Symbol) -> DuplicateDefinitionError {
        tracing::debug!(identifier = %duplicate.identifier, %message, "duplicate definition");
        DuplicateDefinitionError {
            message,
            location: duplicate.definition_location.clone(),
            existing,
            duplicate,
        }
    }
}

/// A lexical scope: two namespaces plus a parent link
#[derive(Debug, Clone)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    /// The label whose block this scope is, if any
    pub parent_label: Option<SymbolId>,
    pub symbols: HashMap<String, SymbolId>,
    pub labels: HashMap<String, SymbolId>,
    pub kind: ScopeKind,
}

impl Scope {
    pub fn new(parent: Option<ScopeId>, kind: ScopeKind) -> Self {
        Self {
            parent,
            parent_label: None,
            symbols: HashMap::new(),
            labels: HashMap::new(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Label,
}

/// A named definition and every place it is referenced
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub identifier: String,
    pub definition_location: Location,
    /// Reference sites in discovery order
    pub references: Vec<Location>,
    pub scope: ScopeId,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn new(identifier: &str, definition_location: Location, scope: ScopeId, kind: SymbolKind) -> Self {
        Self {
            identifier: identifier.to_string(),
            definition_location,
            references: Vec::new(),
            scope,
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Label,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpy_syntax::document::{DocumentRange, Position};

    fn loc(line: usize) -> Location {
        Location::new(
            "script.rpy",
            DocumentRange::new(Position::new(line, 0, 0), Position::new(line, 1, 1)),
        )
    }

    #[test]
    fn test_scope_lookup() {
        let mut table = SymbolTable::new();
        let x = table.define_symbol(GLOBAL_SCOPE, "x", loc(0), true).unwrap();

        let inner = table.enter_scope(ScopeKind::Label, None);
        assert_eq!(table.resolve(inner, "x"), Some(x));

        let y = table.define_symbol(inner, "y", loc(1), true).unwrap();
        assert_eq!(table.resolve(inner, "y"), Some(y));

        table.exit_scope();
        assert_eq!(table.current_scope(), GLOBAL_SCOPE);
        assert_eq!(table.resolve(GLOBAL_SCOPE, "x"), Some(x));
        assert_eq!(table.resolve(GLOBAL_SCOPE, "y"), None);
    }

    #[test]
    fn test_undefined_resolves_to_none_at_every_depth() {
        let mut table = SymbolTable::new();
        let a = table.enter_scope(ScopeKind::Label, None);
        let b = table.enter_scope(ScopeKind::Label, None);
        for scope in [GLOBAL_SCOPE, a, b] {
            assert_eq!(table.resolve(scope, "missing"), None);
            assert_eq!(table.resolve_label(scope, "missing"), None);
        }
    }

    #[test]
    fn test_duplicate_in_same_scope_keeps_first() {
        let mut table = SymbolTable::new();
        let first = table.define_symbol(GLOBAL_SCOPE, "x", loc(0), true).unwrap();
        let err = table.define_symbol(GLOBAL_SCOPE, "x", loc(1), true).unwrap_err();

        assert_eq!(err.message, "A symbol with the identifier \"x\" has already been defined.");
        assert_eq!(err.existing, first);
        assert_eq!(err.location, loc(1));
        assert_eq!(table.symbols().len(), 1);
        assert_eq!(table.get(first).unwrap().definition_location, loc(0));
    }

    #[test]
    fn test_no_shadow_rejects_ancestor_definition() {
        let mut table = SymbolTable::new();
        let outer = table.define_symbol(GLOBAL_SCOPE, "x", loc(0), true).unwrap();
        let inner = table.enter_scope(ScopeKind::Label, None);

        let err = table.define_symbol(inner, "x", loc(1), true).unwrap_err();
        assert_eq!(
            err.message,
            "A symbol with the identifier \"x\" has already been defined in this scope."
        );
        assert_eq!(err.existing, outer);
        assert_eq!(table.resolve(inner, "x"), Some(outer));
    }

    #[test]
    fn test_shadowing_allowed_nearest_scope_wins() {
        let mut table = SymbolTable::new();
        let outer = table.define_symbol(GLOBAL_SCOPE, "x", loc(0), true).unwrap();
        let inner = table.enter_scope(ScopeKind::Label, None);

        let shadow = table.define_symbol(inner, "x", loc(1), false).unwrap();
        assert_ne!(shadow, outer);
        assert_eq!(table.resolve(inner, "x"), Some(shadow));
        assert_eq!(table.resolve(GLOBAL_SCOPE, "x"), Some(outer));
    }

    #[test]
    fn test_labels_are_a_separate_namespace() {
        let mut table = SymbolTable::new();
        let label = table.define_label(GLOBAL_SCOPE, "start", loc(0), true).unwrap();
        assert_eq!(table.resolve(GLOBAL_SCOPE, "start"), None);
        assert_eq!(table.resolve_label(GLOBAL_SCOPE, "start"), Some(label));
    }

    #[test]
    fn test_duplicate_label_reports_existing_label() {
        let mut table = SymbolTable::new();
        let first = table.define_label(GLOBAL_SCOPE, "start", loc(0), true).unwrap();
        let err = table.define_label(GLOBAL_SCOPE, "start", loc(3), true).unwrap_err();
        assert_eq!(err.message, "A label with the identifier \"start\" has already been defined.");
        assert_eq!(err.existing, first);
        assert_eq!(err.duplicate.kind, SymbolKind::Label);
    }

    #[test]
    fn test_resolve_label_falls_back_to_parent_symbols() {
        let mut table = SymbolTable::new();
        let value = table.define_symbol(GLOBAL_SCOPE, "ending", loc(0), true).unwrap();
        let label = table.define_label(GLOBAL_SCOPE, "other", loc(1), true).unwrap();
        let child = table.enter_scope(ScopeKind::Label, Some(label));

        // parent symbols are visible, parent labels are not
        assert_eq!(table.resolve_label(child, "ending"), Some(value));
        assert_eq!(table.resolve_label(child, "other"), None);
    }

    #[test]
    fn test_references_append_in_order() {
        let mut table = SymbolTable::new();
        let x = table.define_symbol(GLOBAL_SCOPE, "x", loc(0), true).unwrap();
        table.add_reference(x, loc(2));
        table.add_reference(x, loc(1));
        assert_eq!(table.get(x).unwrap().references, vec![loc(2), loc(1)]);
    }

    #[test]
    fn test_enclosing_global_label_skips_local_labels() {
        let mut table = SymbolTable::new();
        let start = table.define_label(GLOBAL_SCOPE, "start", loc(0), true).unwrap();
        let outer = table.enter_scope(ScopeKind::Label, Some(start));
        let local = table.define_label(GLOBAL_SCOPE, "start.loop", loc(1), true).unwrap();
        let inner = table.enter_scope(ScopeKind::Label, Some(local));

        assert_eq!(table.enclosing_global_label(inner), Some(start));
        assert_eq!(table.enclosing_global_label(outer), Some(start));
        assert_eq!(table.enclosing_global_label(GLOBAL_SCOPE), None);
    }
}
