//! The result of parsing one document: statements, scopes and symbols, and every error found.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use rpy_syntax::document::Location;

use crate::frontend::ast::{JumpTarget, MenuItem, Statement};
use crate::frontend::diagnostics::CompileError;
use crate::frontend::symbols::{DuplicateDefinitionError, GLOBAL_SCOPE, ScopeId, Symbol, SymbolId, SymbolTable};

/// Root aggregate of a document-level parse.
///
/// ## Notes
/// - Owns the scope arena; scopes and symbols live as long as the program.
/// - `errors` is ordered by discovery and is the single channel for parse and definition errors.
#[derive(Debug)]
pub struct Program {
    pub path: PathBuf,
    pub symbols: SymbolTable,
    pub errors: Vec<CompileError>,
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            symbols: SymbolTable::new(),
            errors: Vec::new(),
            statements: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn global_scope(&self) -> ScopeRef<'_> {
        self.scope(GLOBAL_SCOPE)
    }

    pub fn scope(&self, id: ScopeId) -> ScopeRef<'_> {
        ScopeRef {
            table: &self.symbols,
            id,
        }
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: CompileError) {
        self.errors.push(error);
    }

    /// Define a symbol, recording a duplicate definition as an error instead of failing.
    pub fn define_symbol(
        &mut self,
        scope: ScopeId,
        identifier: &str,
        location: Location,
        no_shadow: bool,
    ) -> Option<SymbolId> {
        let result = self.symbols.define_symbol(scope, identifier, location, no_shadow);
        self.record(result)
    }

    pub fn define_parameter(&mut self, scope: ScopeId, identifier: &str, location: Location) -> Option<SymbolId> {
        let result = self.symbols.define_parameter(scope, identifier, location);
        self.record(result)
    }

    /// Define a label, recording a duplicate definition as an error instead of failing.
    pub fn define_label(
        &mut self,
        scope: ScopeId,
        identifier: &str,
        location: Location,
        no_shadow: bool,
    ) -> Option<SymbolId> {
        let result = self.symbols.define_label(scope, identifier, location, no_shadow);
        self.record(result)
    }

    fn record(&mut self, result: Result<SymbolId, DuplicateDefinitionError>) -> Option<SymbolId> {
        match result {
            Ok(id) => Some(id),
            Err(error) => {
                self.errors.push(CompileError::duplicate_definition(error));
                None
            }
        }
    }

    /// Indented outline of the statement tree, one statement per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        dump_block(&mut out, &self.statements, 0);
        out
    }
}

fn dump_block(out: &mut String, statements: &[Statement], depth: usize) {
    for statement in statements {
        let range = statement.range();
        let _ = write!(
            out,
            "{:indent$}{} [{}]",
            "",
            statement.kind_name(),
            range.start,
            indent = depth * 2
        );
        let detail = describe(statement);
        if !detail.is_empty() {
            let _ = write!(out, " {detail}");
        }
        out.push('\n');
        for block in statement.children() {
            dump_block(out, block, depth + 1);
        }
    }
}

fn describe(statement: &Statement) -> String {
    let target = |t: &JumpTarget| match t {
        JumpTarget::Label(id) => id.name.clone(),
        JumpTarget::Expression(e) => format!("expression {}", e.text),
    };
    match statement {
        Statement::Label(s) => s.name.name.clone(),
        Statement::Jump(s) => target(&s.target),
        Statement::Call(s) => target(&s.target),
        Statement::Define(s) => match &s.value {
            Some(value) => format!("{} = {}", s.name.name, value.text),
            None => s.name.name.clone(),
        },
        Statement::PythonLine(s) => s.code.text.clone(),
        Statement::Menu(s) => {
            let choices = s.items.iter().filter(|i| matches!(i, MenuItem::Choice(_))).count();
            match &s.name {
                Some(name) => format!("{} ({choices} choices)", name.name),
                None => format!("({choices} choices)"),
            }
        }
        Statement::Image(s) => s
            .image
            .iter()
            .map(|part| part.name.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        Statement::Say(s) => match &s.who {
            Some(who) => format!("{} {:?}", who.name, s.what.text),
            None => format!("{:?}", s.what.text),
        },
        Statement::While(s) => s.condition.text.clone(),
        Statement::With(s) => s.transition.text.clone(),
        _ => String::new(),
    }
}

/// A read-only view of one scope of a program.
#[derive(Debug, Clone, Copy)]
pub struct ScopeRef<'p> {
    table: &'p SymbolTable,
    id: ScopeId,
}

impl<'p> ScopeRef<'p> {
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// Resolve an ordinary symbol from this scope outward.
    pub fn resolve(&self, identifier: &str) -> Option<&'p Symbol> {
        self.table.resolve(self.id, identifier).and_then(|id| self.table.get(id))
    }

    /// Resolve a label, falling back to the parent chain's symbols.
    pub fn resolve_label(&self, identifier: &str) -> Option<&'p Symbol> {
        self.table.resolve_label(self.id, identifier).and_then(|id| self.table.get(id))
    }

    pub fn parent(&self) -> Option<ScopeRef<'p>> {
        let parent = self.table.scope(self.id)?.parent?;
        Some(ScopeRef {
            table: self.table,
            id: parent,
        })
    }

    pub fn parent_label(&self) -> Option<&'p Symbol> {
        let label = self.table.scope(self.id)?.parent_label?;
        self.table.get(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::symbols::ScopeKind;
    use rpy_syntax::document::{DocumentRange, Position};

    fn loc(line: usize) -> Location {
        Location::new(
            "script.rpy",
            DocumentRange::new(Position::new(line, 0, 0), Position::new(line, 1, 1)),
        )
    }

    #[test]
    fn test_duplicate_definition_is_recorded_not_returned() {
        let mut program = Program::new("script.rpy");
        let first = program.define_symbol(GLOBAL_SCOPE, "x", loc(0), true);
        let second = program.define_symbol(GLOBAL_SCOPE, "x", loc(1), true);

        assert!(first.is_some());
        assert_eq!(second, None);
        assert_eq!(program.errors.len(), 1);
        let dup = program.errors[0].duplicate_definition_error().unwrap();
        assert_eq!(Some(dup.existing), first);
        assert_eq!(program.global_scope().resolve("x").unwrap().definition_location, loc(0));
    }

    #[test]
    fn test_scope_ref_navigation() {
        let mut program = Program::new("script.rpy");
        let label = program.define_label(GLOBAL_SCOPE, "start", loc(0), false).unwrap();
        let child = program.symbols.enter_scope(ScopeKind::Label, Some(label));

        let scope = program.scope(child);
        assert_eq!(scope.parent().map(|p| p.id()), Some(GLOBAL_SCOPE));
        assert_eq!(scope.parent_label().map(|s| s.identifier.as_str()), Some("start"));
        assert!(program.global_scope().resolve_label("start").is_some());
        assert!(program.global_scope().parent().is_none());
    }
}
