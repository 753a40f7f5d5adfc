//! Statement parsing and indentation blocks.

use rpy_core::lang::tokens::TokenType;
use rpy_syntax::document::DocumentRange;

use super::DocumentParser;
use super::rules::{STATEMENT_RULES, StringRule};
use crate::frontend::ast::*;
use crate::frontend::diagnostics::ParseErrorType;
use crate::frontend::symbols::{GLOBAL_SCOPE, ScopeKind};

/// Header range extended over the last statement of a body
fn block_span(header: DocumentRange, body: &[Statement]) -> DocumentRange {
    body.last().map_or(header, |last| header.merge(last.range()))
}

impl<'a> DocumentParser<'a> {
    /// Parse a run of items sharing one indentation level.
    ///
    /// ## Parameters
    /// - `parent`: column of the owning statement; the block ends at the first line indented at or left of it.
    ///   `None` parses to the end of input.
    ///
    /// ## Notes
    /// - The first line fixes the block's column. A later line left of it (but right of `parent`) also ends the block.
    /// - If an item consumes nothing the lookahead is consumed anyway, so the loop always progresses.
    pub(super) fn parse_indented<T>(
        &mut self,
        parent: Option<usize>,
        mut item: impl FnMut(&mut Self) -> Option<T>,
    ) -> Vec<T> {
        let mut items = Vec::new();
        let mut block_indent = None;
        loop {
            self.skip_empty_lines();
            let Some(first) = self.it.token() else {
                break;
            };
            let indent = first.start.character;
            if let Some(parent) = parent {
                if indent <= parent {
                    break;
                }
                let block = *block_indent.get_or_insert(indent);
                if indent < block {
                    break;
                }
            }

            self.indent = indent;
            let before = self.it.index();
            if let Some(value) = item(self) {
                items.push(value);
            }
            if self.it.index() == before {
                self.next();
            }
        }
        items
    }

    fn block(&mut self, header_indent: usize) -> Vec<Statement> {
        self.parse_indented(Some(header_indent), |p| p.statement())
    }

    /// `:` and the end of the header line
    fn block_header(&mut self) {
        if self.require_token(TokenType::Colon) {
            self.expect_eol();
        } else {
            self.skip_to_eol();
        }
    }

    /// Skip a block whose contents are not Ren'Py statements (python, screen language, ATL).
    fn skip_raw_block(&mut self, header_indent: usize) {
        loop {
            self.skip_empty_lines();
            match self.it.token() {
                Some(token) if token.start.character > header_indent => self.skip_to_eol(),
                _ => break,
            }
        }
    }

    pub(super) fn statement(&mut self) -> Option<Statement> {
        let statement = self.any_of(STATEMENT_RULES);
        if statement.is_none() {
            self.debug_print_line();
            self.skip_to_eol();
        }
        statement
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    pub(super) fn label_statement(&mut self) -> Option<Statement> {
        let indent = self.indent;
        let start = self.peek().start;
        self.next();

        let name = self.label_name()?;
        let parameters = if self.test(TokenType::OpenParenthesis) {
            self.parameter_list()
        } else {
            Vec::new()
        };
        self.block_header();
        let header = self.range_from(start);

        // labels share one global namespace; a label and a variable may have the same name
        let location = self.location(name.range);
        let symbol = self.program.define_label(GLOBAL_SCOPE, &name.name, location, false);
        let parent_label = symbol.or_else(|| self.program.symbols.resolve_label(GLOBAL_SCOPE, &name.name));

        let scope = self.program.symbols.enter_scope(ScopeKind::Label, parent_label);
        for parameter in &parameters {
            let location = self.location(parameter.range);
            self.program.define_parameter(scope, &parameter.name, location);
        }
        let body = self.block(indent);
        self.program.symbols.exit_scope();

        Some(Statement::Label(LabelStatement {
            range: block_span(header, &body),
            name,
            parameters,
            body,
            symbol,
            scope,
        }))
    }

    /// `name`, `global.local` or `.local`, always returned in full `global.local` form.
    fn label_name(&mut self) -> Option<Identifier> {
        let start = self.peek().start;

        if self.optional_token(TokenType::Period) {
            if !self.require_token(TokenType::Identifier) {
                return None;
            }
            let local = self.current_value();
            let global = self
                .program
                .symbols
                .enclosing_global_label(self.scope())
                .and_then(|id| self.program.symbol(id))
                .map(|label| label.identifier.clone());
            let Some(global) = global else {
                self.add_error(ParseErrorType::UnexpectedToken, None);
                return None;
            };
            return Some(Identifier {
                name: format!("{global}.{local}"),
                range: self.range_from(start),
            });
        }

        if !self.require_token(TokenType::Identifier) {
            return None;
        }
        let mut name = self.current_value().to_string();
        if self.test(TokenType::Period) && self.peek_nth(1).is(TokenType::Identifier) {
            self.next();
            self.next();
            name.push('.');
            name.push_str(self.current_value());
        }
        Some(Identifier {
            name,
            range: self.range_from(start),
        })
    }

    /// `(a, b=1, *args)`: the parameter names of a label
    fn parameter_list(&mut self) -> Vec<Identifier> {
        let mut parameters = Vec::new();
        let mut depth = 0usize;
        let mut expect_name = true;
        self.next();

        while !self.at_eol() {
            let token = self.peek().clone();
            match token.token_type {
                TokenType::CloseParenthesis if depth == 0 => break,
                TokenType::Comma if depth == 0 => {
                    expect_name = true;
                    self.next();
                    continue;
                }
                TokenType::Multiply | TokenType::Exponent if depth == 0 => {
                    self.next();
                    continue;
                }
                TokenType::Identifier if depth == 0 && expect_name => parameters.push(Identifier {
                    name: self.peek_value().to_string(),
                    range: self.token_range(&token),
                }),
                TokenType::OpenParenthesis | TokenType::OpenSquareBracket | TokenType::OpenBracket => depth += 1,
                TokenType::CloseParenthesis | TokenType::CloseSquareBracket | TokenType::CloseBracket => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            expect_name = false;
            self.next();
        }
        self.require_token(TokenType::CloseParenthesis);
        parameters
    }

    fn jump_target(&mut self, stops: &[TokenType]) -> Option<JumpTarget> {
        if self.optional_token(TokenType::Expression) {
            let expression = self.required_expression(stops)?;
            return Some(JumpTarget::Expression(expression));
        }
        let name = self.label_name()?;
        self.reference_label(&name);
        Some(JumpTarget::Label(name))
    }

    pub(super) fn jump_statement(&mut self) -> Option<Statement> {
        let start = self.peek().start;
        self.next();
        let target = self.jump_target(&[])?;
        self.expect_eol();
        Some(Statement::Jump(JumpStatement {
            target,
            range: self.range_from(start),
        }))
    }

    pub(super) fn call_statement(&mut self) -> Option<Statement> {
        let start = self.peek().start;
        self.next();
        let target = self.jump_target(&[TokenType::Pass, TokenType::From])?;
        if matches!(target, JumpTarget::Expression(_)) {
            self.optional_token(TokenType::Pass);
        }
        let arguments = if self.test(TokenType::OpenParenthesis) {
            self.parenthesized()
        } else {
            None
        };

        let mut from = None;
        if self.optional_token(TokenType::From) && self.require_token(TokenType::Identifier) {
            let name = Identifier {
                name: self.current_value().to_string(),
                range: self.token_range(&self.current),
            };
            let location = self.location(name.range);
            self.program.define_label(GLOBAL_SCOPE, &name.name, location, false);
            from = Some(name);
        }
        self.expect_eol();

        Some(Statement::Call(CallStatement {
            target,
            arguments,
            from,
            range: self.range_from(start),
        }))
    }

    pub(super) fn return_statement(&mut self) -> Option<Statement> {
        let start = self.peek().start;
        self.next();
        let value = self.expression(&[]);
        self.expect_eol();
        Some(Statement::Return(ReturnStatement {
            value,
            range: self.range_from(start),
        }))
    }

    pub(super) fn pass_statement(&mut self) -> Option<Statement> {
        let start = self.peek().start;
        self.next();
        self.expect_eol();
        Some(Statement::Pass(self.range_from(start)))
    }

    /// `if`/`elif`/`else` arms at the same column as the `if`
    pub(super) fn if_statement(&mut self) -> Option<Statement> {
        let indent = self.indent;
        let start = self.peek().start;
        let mut branches = Vec::new();
        let mut header = DocumentRange::new(start, start);

        self.next();
        loop {
            let is_else = self.current.is(TokenType::Else);
            let condition = if is_else {
                None
            } else {
                self.required_expression(&[TokenType::Colon])
            };
            self.block_header();
            header = header.merge(self.range_from(start));
            let body = self.block(indent);
            header = block_span(header, &body);
            branches.push(ConditionalBlock { condition, body });

            let continues = !is_else
                && (self.test(TokenType::Elif) || self.test(TokenType::Else))
                && self.peek().start.character == indent;
            if !continues {
                break;
            }
            self.next();
        }

        Some(Statement::If(IfStatement {
            branches,
            range: header,
        }))
    }

    pub(super) fn while_statement(&mut self) -> Option<Statement> {
        let indent = self.indent;
        let start = self.peek().start;
        self.next();
        let condition = self.required_expression(&[TokenType::Colon])?;
        self.block_header();
        let header = self.range_from(start);
        let body = self.block(indent);
        Some(Statement::While(WhileStatement {
            range: block_span(header, &body),
            condition,
            body,
        }))
    }

    // ========================================================================
    // Menus
    // ========================================================================

    pub(super) fn menu_statement(&mut self) -> Option<Statement> {
        let indent = self.indent;
        let start = self.peek().start;
        self.next();

        let mut name = None;
        if self.optional_token(TokenType::Identifier) {
            let label = Identifier {
                name: self.current_value().to_string(),
                range: self.token_range(&self.current),
            };
            let location = self.location(label.range);
            self.program.define_label(GLOBAL_SCOPE, &label.name, location, false);
            name = Some(label);
        }
        if self.test(TokenType::OpenParenthesis) {
            self.parenthesized();
        }
        self.block_header();
        let mut range = self.range_from(start);

        let items = self.parse_indented(Some(indent), |p| p.menu_item());
        for item in &items {
            let end = match item {
                MenuItem::Caption(say) => say.range,
                MenuItem::Choice(choice) => block_span(choice.caption.range, &choice.body),
            };
            range = range.merge(end);
        }

        Some(Statement::Menu(MenuStatement { name, items, range }))
    }

    fn menu_item(&mut self) -> Option<MenuItem> {
        let indent = self.indent;

        if self.test_value("set") {
            self.skip_to_eol();
            return None;
        }
        if !self.test(TokenType::StringLiteral) {
            if self.say_follows() {
                return self.say_statement().map(MenuItem::Caption);
            }
            self.add_error(ParseErrorType::UnexpectedToken, Some(TokenType::StringLiteral));
            self.skip_to_eol();
            return None;
        }

        let start = self.peek().start;
        let caption = self.require(&StringRule)?;
        if !self.test(TokenType::If) && !self.test(TokenType::Colon) {
            let clauses = self.expression(&[]);
            self.expect_eol();
            return Some(MenuItem::Caption(SayStatement {
                who: None,
                what: caption,
                clauses,
                range: self.range_from(start),
            }));
        }

        let condition = if self.optional_token(TokenType::If) {
            self.required_expression(&[TokenType::Colon])
        } else {
            None
        };
        self.block_header();
        let body = self.block(indent);
        Some(MenuItem::Choice(MenuChoice {
            caption,
            condition,
            body,
        }))
    }

    // ========================================================================
    // Definitions
    // ========================================================================

    pub(super) fn define_statement(&mut self) -> Option<Statement> {
        let start = self.peek().start;
        let kind = if self.test(TokenType::Default) {
            DefineKind::Default
        } else {
            DefineKind::Define
        };
        self.next();

        let priority = self.priority();
        let name = self.dotted_name()?;
        if !self.any_of_token(&[
            TokenType::Assign,
            TokenType::PlusAssign,
            TokenType::MinusAssign,
            TokenType::MultiplyAssign,
            TokenType::DivideAssign,
        ]) {
            self.skip_to_eol();
            return None;
        }
        let value = self.required_expression(&[]);
        self.expect_eol();

        let location = self.location(name.range);
        let symbol = self.program.define_symbol(GLOBAL_SCOPE, &name.name, location, true);

        Some(Statement::Define(DefineStatement {
            kind,
            priority,
            name,
            value,
            symbol,
            range: self.range_from(start),
        }))
    }

    /// Optional signed integer init priority
    fn priority(&mut self) -> Option<Expression> {
        let signed = self.test(TokenType::Minus) && self.peek_nth(1).is(TokenType::Integer);
        if !signed && !self.test(TokenType::Integer) {
            return None;
        }
        let mut tokens = Vec::with_capacity(2);
        if signed {
            self.next();
            tokens.push(self.current.clone());
        }
        self.next();
        tokens.push(self.current.clone());
        self.expression_from(&tokens)
    }

    /// `a.b.c`, where components after the first may be keywords
    fn dotted_name(&mut self) -> Option<Identifier> {
        if !self.require_token(TokenType::Identifier) {
            return None;
        }
        let start = self.current.start;
        let mut name = self.current_value().to_string();
        while self.test(TokenType::Period) {
            let part = self.peek_nth(1);
            if !(part.is(TokenType::Identifier) || part.token_type.is_keyword()) {
                break;
            }
            self.next();
            self.next();
            name.push('.');
            name.push_str(self.current_value());
        }
        Some(Identifier {
            name,
            range: self.range_from(start),
        })
    }

    pub(super) fn python_line_statement(&mut self) -> Option<Statement> {
        let start = self.peek().start;
        self.next();
        let code = self.expression(&[]).unwrap_or_else(|| Expression {
            text: String::new(),
            range: DocumentRange::new(self.current.end, self.current.end),
            identifiers: Vec::new(),
        });
        self.expect_eol();
        Some(Statement::PythonLine(PythonLineStatement {
            code,
            range: self.range_from(start),
        }))
    }

    pub(super) fn init_statement(&mut self) -> Option<Statement> {
        let indent = self.indent;
        let start = self.peek().start;
        self.next();
        let priority = self.priority();

        if self.optional_token(TokenType::Python) {
            self.expression(&[TokenType::Colon]);
            self.block_header();
            let range = self.range_from(start);
            self.skip_raw_block(indent);
            return Some(Statement::Init(InitStatement {
                priority,
                python: true,
                body: Vec::new(),
                range,
            }));
        }

        let body = if self.test(TokenType::Colon) {
            self.block_header();
            self.block(indent)
        } else {
            // single statement form: `init 5 image bg = "bg.png"`
            self.statement().into_iter().collect()
        };
        let header = self.range_from(start);
        Some(Statement::Init(InitStatement {
            priority,
            python: false,
            range: block_span(header, &body),
            body,
        }))
    }

    pub(super) fn python_block_statement(&mut self) -> Option<Statement> {
        let indent = self.indent;
        let start = self.peek().start;
        self.next();
        let modifiers = self.expression(&[TokenType::Colon]);
        self.block_header();
        let range = self.range_from(start);
        self.skip_raw_block(indent);
        Some(Statement::PythonBlock(PythonBlockStatement { modifiers, range }))
    }

    pub(super) fn other_statement(&mut self) -> Option<Statement> {
        let indent = self.indent;
        let start = self.peek().start;
        let keyword = self.peek().token_type;
        self.next();
        let rest = self.expression(&[TokenType::Colon]);
        let has_block = self.test(TokenType::Colon);
        if has_block {
            self.block_header();
        } else {
            self.expect_eol();
        }
        let range = self.range_from(start);
        if has_block {
            self.skip_raw_block(indent);
        }
        Some(Statement::Other(OtherStatement {
            keyword,
            rest,
            has_block,
            range,
        }))
    }

    // ========================================================================
    // Presentation
    // ========================================================================

    pub(super) fn image_statement(&mut self) -> Option<Statement> {
        const CLAUSES: [TokenType; 6] = [
            TokenType::At,
            TokenType::As,
            TokenType::Behind,
            TokenType::Onlayer,
            TokenType::Zorder,
            TokenType::With,
        ];

        let start = self.peek().start;
        let command = match self.peek().token_type {
            TokenType::Scene => ImageCommand::Scene,
            TokenType::Show => ImageCommand::Show,
            _ => ImageCommand::Hide,
        };
        self.next();

        let mut expression = None;
        let mut image: Vec<Identifier> = Vec::new();
        if self.optional_token(TokenType::Expression) {
            expression = self.required_expression(&CLAUSES);
        } else {
            while !self.at_eol() && !CLAUSES.iter().any(|&c| self.test(c)) {
                self.next();
                let range = self.token_range(&self.current);
                let value = self.current_value();
                match image.last_mut() {
                    // `bg-room` is one component
                    Some(last) if last.range.end.absolute_offset == range.start.absolute_offset => {
                        last.name.push_str(value);
                        last.range = last.range.merge(range);
                    }
                    _ => image.push(Identifier {
                        name: value.to_string(),
                        range,
                    }),
                }
            }
        }
        let clauses = self.expression(&[]);
        self.expect_eol();

        Some(Statement::Image(ImageStatement {
            command,
            image,
            expression,
            clauses,
            range: self.range_from(start),
        }))
    }

    pub(super) fn with_statement(&mut self) -> Option<Statement> {
        let start = self.peek().start;
        self.next();
        let transition = self.required_expression(&[])?;
        self.expect_eol();
        Some(Statement::With(WithStatement {
            transition,
            range: self.range_from(start),
        }))
    }

    pub(super) fn pause_statement(&mut self) -> Option<Statement> {
        let start = self.peek().start;
        self.next();
        let duration = self.expression(&[]);
        self.expect_eol();
        Some(Statement::Pause(PauseStatement {
            duration,
            range: self.range_from(start),
        }))
    }

    /// Whether the lookahead starts `who [attributes] "what"`.
    pub(super) fn say_follows(&self) -> bool {
        if !self.test(TokenType::Identifier) {
            return false;
        }
        let mut it = self.it.clone();
        it.next();
        while let Some(token) = it.token() {
            if token.has_meta(TokenType::StringLiteral) {
                return true;
            }
            if !matches!(
                token.token_type,
                TokenType::Identifier | TokenType::Minus | TokenType::Integer
            ) {
                return false;
            }
            it.next();
        }
        false
    }

    pub(super) fn say_statement(&mut self) -> Option<SayStatement> {
        let start = self.peek().start;
        let mut who = None;
        if self.optional_token(TokenType::Identifier) {
            let speaker = Identifier {
                name: self.current_value().to_string(),
                range: self.token_range(&self.current),
            };
            self.reference_symbol(&speaker);
            who = Some(speaker);
            // image attributes
            while !self.test(TokenType::StringLiteral) && !self.at_eol() {
                self.next();
            }
        }

        let what = self.require(&StringRule)?;
        let clauses = self.expression(&[]);
        self.expect_eol();
        Some(SayStatement {
            who,
            what,
            clauses,
            range: self.range_from(start),
        })
    }
}
