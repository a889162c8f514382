//! Backtracking recursive-descent parser for the template language.
//!
//! There is no separate lexer: productions match literals directly against
//! the byte cursor and rewind to a saved checkpoint when an attempt fails.
//! At each `mixed` choice point the alternatives are tried in a fixed
//! order — comment, rust-block, for, if, plain, expression — and the first
//! match wins. Plain is tried before expression so bare text is preferred;
//! expression is the fallback that still captures a leading `@identifier`.
//!
//! Grammar:
//!
//! ```text
//! template    := ws? comment* params? import* mixed*
//! params      := '@(' balanced ')' '\n'?
//! import      := '@import ' text-until-newline
//! mixed       := comment | rustBlock | forExpr | ifExpr | plain | expression
//! comment     := '@*' text-until('*@') '*@'
//! rustBlock   := '@{' balanced('{','}')
//! forExpr     := '@for' text-until('{') block
//! ifExpr      := '@if' text-until('{') block elseIf* else?
//! elseIf      := ws? '@else if' text-until('{') block
//! else        := ws? '@else' ws? block
//! block       := wsNoBreak? '{' mixed* '}'
//! plain       := ( '@@' | '@}' | any-but('@','}') )+
//! expression  := '@' '!'? ( '(' balanced ')'
//!                         | ident parens? ('.' ident parens?)* block? )
//! ```
//!
//! Errors never abort: they accumulate on the parser and a best-effort
//! template is always returned.

use tracing::trace;

use super::ast::{
    Else, ElseIf, ParseError, ParseResult, PosString, Template, TemplateTree, TreeKind,
};
use super::input::Cursor;
use super::position::Position;

pub struct Parser<'a> {
    input: Cursor<'a>,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            input: Cursor::new(source),
            errors: Vec::new(),
        }
    }

    /// Parses the whole source into a [`ParseResult`].
    ///
    /// `name` becomes the generated callable's name; the parser itself only
    /// records it on the template.
    pub fn parse(mut self, name: &str) -> ParseResult {
        self.whitespace();
        let comment = self.last_comment();
        self.whitespace();
        let params = self
            .maybe_template_params()
            .unwrap_or_else(|| PosString::new("()", Position::default()));
        let top_imports = self.top_imports();
        let content = self.template_content();

        if !self.errors.is_empty() {
            trace!(errors = self.errors.len(), "parse finished with errors");
        }

        ParseResult {
            template: Template {
                name: name.to_string(),
                comment,
                params,
                top_imports,
                content,
            },
            errors: self.errors,
        }
    }

    // ── low-level helpers ────────────────────────────────────────────────

    fn position_of(&self, offset: usize) -> Position {
        Position::of(self.input.source(), offset)
    }

    fn error(&mut self, message: impl Into<String>, offset: usize) {
        let position = self.position_of(offset);
        self.errors.push(ParseError::new(message, position));
    }

    fn node(&self, kind: TreeKind, offset: usize) -> TemplateTree {
        TemplateTree::new(kind, self.position_of(offset))
    }

    /// Consumes `literal` if it is next. Returns false only at end of
    /// input, so callers can use it for "consume if present, complain at
    /// EOF" closers like `}` and `*@`.
    fn accept(&mut self, literal: &str) -> bool {
        if self.input.is_past_eof(literal.len()) {
            return false;
        }
        if self.input.matches(literal) {
            self.input.advance(literal.len());
        }
        true
    }

    /// Consumes `literal` and reports whether it matched.
    fn check_str(&mut self, literal: &str) -> bool {
        if !self.input.is_past_eof(literal.len()) && self.input.matches(literal) {
            self.input.advance(literal.len());
            true
        } else {
            false
        }
    }

    /// Consumes characters until the next byte satisfies `stop` (or EOF).
    /// With `inclusive`, the stopping character is consumed too.
    fn any_until(&mut self, stop: impl Fn(u8) -> bool, inclusive: bool) -> String {
        let mut out = String::new();
        while let Some(b) = self.input.peek() {
            if stop(b) {
                break;
            }
            if let Some(c) = self.input.take_char() {
                out.push(c);
            }
        }
        if inclusive {
            if let Some(c) = self.input.take_char() {
                out.push(c);
            }
        }
        out
    }

    /// Consumes characters until `stop` is next (or EOF).
    fn any_until_str(&mut self, stop: &str, inclusive: bool) -> String {
        let mut out = String::new();
        while !self.input.is_past_eof(stop.len()) && !self.input.matches(stop) {
            if let Some(c) = self.input.take_char() {
                out.push(c);
            }
        }
        if inclusive && !self.input.is_past_eof(stop.len()) {
            out.push_str(stop);
            self.input.advance(stop.len());
        }
        out
    }

    fn whitespace(&mut self) {
        self.any_until(|b| b > 32, false);
    }

    fn whitespace_no_break(&mut self) {
        self.any_until(|b| b != b' ' && b != b'\t', false);
    }

    fn identifier(&mut self) -> Option<String> {
        match self.input.peek() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => {
                Some(self.any_until(|b| !(b.is_ascii_alphanumeric() || b == b'_'), false))
            }
            _ => None,
        }
    }

    /// Matches a balanced `open`..`close` span, depth-counted for nesting.
    ///
    /// With `string_aware` set, double-quoted string literals inside the
    /// span are consumed whole so delimiter bytes inside them are not
    /// mistaken for structural delimiters. Hitting end of input before the
    /// depth returns to zero records a delimiter error positioned there.
    fn recursive_tag(&mut self, open: &str, close: &str, string_aware: bool) -> Option<String> {
        if !self.check_str(open) {
            return None;
        }
        let mut depth = 1usize;
        let mut out = String::from(open);
        while depth > 0 {
            if self.check_str(open) {
                depth += 1;
                out.push_str(open);
            } else if self.check_str(close) {
                depth -= 1;
                out.push_str(close);
            } else if self.input.is_eof() {
                let offset = self.input.offset();
                self.error(format!("expected `{close}`, found end of input"), offset);
                depth = 0;
            } else if string_aware {
                match self.string_literal() {
                    Some(s) => out.push_str(&s),
                    None => {
                        if let Some(c) = self.input.take_char() {
                            out.push(c);
                        }
                    }
                }
            } else if let Some(c) = self.input.take_char() {
                out.push(c);
            }
        }
        Some(out)
    }

    /// Consumes a double-quoted string literal, honoring `\"` and `\\`.
    fn string_literal(&mut self) -> Option<String> {
        if !self.check_str("\"") {
            return None;
        }
        let mut out = String::from("\"");
        loop {
            if self.check_str("\"") {
                out.push('"');
                break;
            }
            if self.check_str("\\") {
                out.push('\\');
                if self.check_str("\"") {
                    out.push('"');
                } else if self.check_str("\\") {
                    out.push('\\');
                }
            } else if self.input.is_eof() {
                break;
            } else if let Some(c) = self.input.take_char() {
                out.push(c);
            }
        }
        Some(out)
    }

    fn parentheses(&mut self) -> Option<String> {
        self.recursive_tag("(", ")", true)
    }

    fn brackets(&mut self) -> Option<String> {
        // An EOF inside the span yields a partial result without the
        // closing brace; the delimiter error is already recorded.
        self.recursive_tag("{", "}", false)
    }

    // ── productions ──────────────────────────────────────────────────────

    /// `@* ... *@`
    fn comment(&mut self) -> Option<TemplateTree> {
        let start = self.input.checkpoint();
        if self.check_str("@*") {
            let text = self.any_until_str("*@", false);
            if !self.accept("*@") {
                let offset = self.input.offset();
                self.error("expected `*@`, found end of input", offset);
            }
            Some(self.node(TreeKind::BlockComment { text }, start))
        } else {
            None
        }
    }

    /// Skips whitespace-separated comments, keeping only the last one.
    fn last_comment(&mut self) -> Option<TemplateTree> {
        let mut last = None;
        loop {
            self.whitespace();
            match self.comment() {
                Some(c) => last = Some(c),
                None => return last,
            }
        }
    }

    /// `@{ ... }` — a verbatim Rust statement block.
    fn rust_block(&mut self) -> Option<TemplateTree> {
        if !self.check_str("@{") {
            return None;
        }
        self.input.regress(1); // keep the '{' for the balanced scan
        let start = self.input.checkpoint();
        let code = self.brackets()?;
        Some(self.node(TreeKind::RustBlock { code }, start))
    }

    /// `@import path::to::Item` — stored as a complete `use ...;` line.
    fn import_expression(&mut self) -> Option<PosString> {
        let start = self.input.checkpoint();
        if self.check_str("@import ") {
            let line = self.any_until_str("\n", true);
            let path = line.trim().trim_end_matches(';');
            Some(PosString::new(
                format!("use {path};"),
                self.position_of(start + 1),
            ))
        } else {
            None
        }
    }

    fn top_imports(&mut self) -> Vec<PosString> {
        let mut imports = Vec::new();
        loop {
            self.whitespace();
            match self.import_expression() {
                Some(import) => imports.push(import),
                None => return imports,
            }
        }
    }

    /// `identifier` with optional call arguments: `name` or `name(...)`.
    fn method_call(&mut self) -> String {
        let Some(name) = self.identifier() else {
            return String::new();
        };
        match self.parentheses() {
            Some(parens) => format!("{name}{parens}"),
            None => name,
        }
    }

    /// `('.' methodCall)*` — the chained tail of an expression.
    fn chained_methods(&mut self) -> String {
        let mut out = String::new();
        while self.check_str(".") {
            out.push('.');
            out.push_str(&self.method_call());
        }
        out
    }

    /// `@expr`, `@expr(...)`, `@expr(...).chain`, `@(expr)` and the raw
    /// `@!` variants. A transclusion block is attempted only after the
    /// call form, when the expression text ends in `)`.
    fn expression(&mut self) -> Option<TemplateTree> {
        let start = self.input.checkpoint();
        if !self.check_str("@") {
            return None;
        }
        let escape = !self.check_str("!");
        let pos = self.input.offset();

        // Parenthesized safe-expression form: the recorded text is the
        // body with the outer parentheses stripped.
        if self.input.matches("(") {
            let Some(parens) = self.parentheses() else {
                self.input.rewind(start);
                return None;
            };
            let code = parens[1..parens.len() - 1].to_string();
            return Some(self.node(
                TreeKind::RustExpr {
                    code,
                    escape,
                    transclusions: Vec::new(),
                },
                pos,
            ));
        }

        let call = self.method_call();
        if call.is_empty() {
            self.input.rewind(start);
            return None;
        }
        let code = format!("{call}{}", self.chained_methods());

        let transclusions = if code.ends_with(')') {
            match self.block() {
                Some(block) => vec![block],
                None => Vec::new(),
            }
        } else {
            Vec::new()
        };

        Some(self.node(
            TreeKind::RustExpr {
                code,
                escape,
                transclusions,
            },
            pos,
        ))
    }

    /// `wsNoBreak? '{' mixed* '}'`
    fn block(&mut self) -> Option<Vec<TemplateTree>> {
        let cp = self.input.checkpoint();
        self.whitespace_no_break();
        if !self.check_str("{") {
            self.input.rewind(cp);
            return None;
        }
        let mut trees = Vec::new();
        while let Some(tree) = self.mixed() {
            trees.push(tree);
        }
        if !self.accept("}") {
            let offset = self.input.offset();
            self.error("expected `}`, found end of input", offset);
        }
        Some(trees)
    }

    /// Opaque condition/clause text: everything up to the opening brace,
    /// with the whitespace after the keyword skipped. Trailing whitespace
    /// stays part of the text.
    fn if_or_for_declaration(&mut self) -> String {
        self.whitespace();
        self.any_until_str("{", false)
    }

    /// `@for clause { ... }`
    fn for_expression(&mut self) -> Option<TemplateTree> {
        let start = self.input.checkpoint();
        if self.check_str("@for") {
            let clause = self.if_or_for_declaration();
            if !clause.is_empty() {
                if let Some(block) = self.block() {
                    return Some(self.node(TreeKind::For { clause, block }, start + 1));
                }
            }
        }
        self.input.rewind(start);
        None
    }

    /// `@if cond { ... }` with trailing `@else if` / `@else` branches.
    fn if_expression(&mut self) -> Option<TemplateTree> {
        let start = self.input.checkpoint();
        if self.check_str("@if") {
            let condition = self.if_or_for_declaration();
            if !condition.is_empty() {
                if let Some(then_block) = self.block() {
                    let else_ifs = self.else_ifs();
                    let else_block = self.else_call();
                    return Some(self.node(
                        TreeKind::If {
                            condition,
                            then_block,
                            else_ifs,
                            else_block,
                        },
                        start + 1,
                    ));
                }
            }
        }
        self.input.rewind(start);
        None
    }

    fn else_ifs(&mut self) -> Vec<ElseIf> {
        let mut branches = Vec::new();
        loop {
            let cp = self.input.checkpoint();
            self.whitespace();
            let kw = self.input.offset();
            if !self.check_str("@else if") {
                self.input.rewind(cp);
                break;
            }
            let condition = self.if_or_for_declaration();
            if condition.is_empty() {
                let offset = self.input.offset();
                self.error("no condition found for else if", offset);
                break;
            }
            match self.block() {
                Some(block) => branches.push(ElseIf {
                    condition,
                    block,
                    pos: self.position_of(kw + 1),
                }),
                None => {
                    let offset = self.input.offset();
                    self.error("no block found for else if", offset);
                    break;
                }
            }
        }
        branches
    }

    fn else_call(&mut self) -> Option<Else> {
        let cp = self.input.checkpoint();
        self.whitespace();
        let kw = self.input.offset();
        if !self.check_str("@else") {
            self.input.rewind(cp);
            return None;
        }
        self.whitespace_no_break();
        match self.block() {
            Some(block) => Some(Else {
                block,
                pos: self.position_of(kw + 1),
            }),
            None => {
                let offset = self.input.offset();
                self.error("no block found for else", offset);
                None
            }
        }
    }

    /// One unit of plain text: an escape pair or any character that is not
    /// a structural `@` or `}`.
    fn plain_single(&mut self, out: &mut String) -> bool {
        if self.check_str("@@") {
            out.push('@');
            return true;
        }
        if self.check_str("@}") {
            out.push('}');
            return true;
        }
        match self.input.peek() {
            None | Some(b'@') | Some(b'}') => false,
            _ => match self.input.take_char() {
                Some(c) => {
                    out.push(c);
                    true
                }
                None => false,
            },
        }
    }

    fn plain(&mut self) -> Option<TemplateTree> {
        let start = self.input.checkpoint();
        let mut text = String::new();
        while self.plain_single(&mut text) {}
        if text.is_empty() {
            None
        } else {
            Some(self.node(TreeKind::Plain { text }, start))
        }
    }

    /// The `mixed` choice point. Attempt order is fixed and significant.
    fn mixed(&mut self) -> Option<TemplateTree> {
        trace!(offset = self.input.offset(), "trying mixed");
        self.comment()
            .or_else(|| self.rust_block())
            .or_else(|| self.for_expression())
            .or_else(|| self.if_expression())
            .or_else(|| self.plain())
            .or_else(|| self.expression())
    }

    /// The top-level content loop.
    ///
    /// Halts once no `mixed` production consumes input. If the unconsumed
    /// next byte is `@`, one "invalid '@' symbol" error is recorded there
    /// and the loop still halts: any remaining source is dropped, not
    /// captured as trailing plain text.
    fn template_content(&mut self) -> Vec<TemplateTree> {
        let mut content = Vec::new();
        loop {
            let before = self.input.offset();
            if let Some(tree) = self.mixed() {
                // A production that matched without consuming anything
                // would loop forever.
                if self.input.offset() > before {
                    content.push(tree);
                    continue;
                }
            }
            let offset = self.input.offset();
            if self.input.matches("@") {
                self.error("invalid '@' symbol", offset);
            }
            break;
        }
        content
    }

    /// `@(params)` before any imports or content.
    fn maybe_template_params(&mut self) -> Option<PosString> {
        if !self.check_str("@(") {
            return None;
        }
        self.input.regress(1); // keep the '(' for the balanced scan
        let start = self.input.checkpoint();
        let params = self.parentheses()?;
        self.check_str("\n");
        Some(PosString::new(params, self.position_of(start)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(source: &str) -> TemplateTree {
        let mut p = Parser::new(source);
        p.expression().expect("expression should parse")
    }

    fn expr_code(tree: &TemplateTree) -> (&str, bool, usize) {
        match &tree.kind {
            TreeKind::RustExpr {
                code,
                escape,
                transclusions,
            } => (code.as_str(), *escape, transclusions.len()),
            other => panic!("expected RustExpr, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_expression() {
        let t = expr("@foobar\"");
        assert_eq!(expr_code(&t), ("foobar", true, 0));
    }

    #[test]
    fn test_simple_method() {
        let t = expr("@foobar()\"");
        assert_eq!(expr_code(&t), ("foobar()", true, 0));
    }

    #[test]
    fn test_chained_method() {
        let t = expr("@foo.bar().something.other\"");
        assert_eq!(expr_code(&t), ("foo.bar().something.other", true, 0));
    }

    #[test]
    fn test_method_with_params_and_chaining() {
        let t = expr("@foo.bar(param1, param2).something.other\"");
        assert_eq!(
            expr_code(&t),
            ("foo.bar(param1, param2).something.other", true, 0)
        );
    }

    #[test]
    fn test_nested_parens_preserved() {
        let t = expr("@expr(a(b)c)");
        assert_eq!(expr_code(&t), ("expr(a(b)c)", true, 0));
    }

    #[test]
    fn test_paren_inside_string_literal() {
        let t = expr("@expr(\"a)b\")");
        assert_eq!(expr_code(&t), ("expr(\"a)b\")", true, 0));
    }

    #[test]
    fn test_safe_expression() {
        let t = expr("@(foobar)a");
        assert_eq!(expr_code(&t), ("foobar", true, 0));
    }

    #[test]
    fn test_safe_expression_chained() {
        let t = expr("@(foo.bar(param1, param2).something.other)a");
        assert_eq!(
            expr_code(&t),
            ("foo.bar(param1, param2).something.other", true, 0)
        );
    }

    #[test]
    fn test_raw_safe_expression() {
        let t = expr("@!(foobar)a");
        assert_eq!(expr_code(&t), ("foobar", false, 0));
    }

    #[test]
    fn test_raw_method_call() {
        let t = expr("@!foo.bar()\"");
        assert_eq!(expr_code(&t), ("foo.bar()", false, 0));
    }

    #[test]
    fn test_transclusion_attaches_after_call() {
        let t = expr("@foobar() {\n\t<div>Hello</div>\n}");
        let (code, escape, transclusions) = expr_code(&t);
        assert_eq!(code, "foobar()");
        assert!(escape);
        assert_eq!(transclusions, 1);
    }

    #[test]
    fn test_no_transclusion_without_call() {
        // `foobar` does not end in `)`, so the brace is not attached.
        let t = expr("@foobar {x}");
        assert_eq!(expr_code(&t), ("foobar", true, 0));
    }

    #[test]
    fn test_plain_escapes() {
        let mut p = Parser::new("a@@b@}c");
        let t = p.plain().expect("plain should parse");
        assert_eq!(
            t.kind,
            TreeKind::Plain {
                text: "a@b}c".into()
            }
        );
    }

    #[test]
    fn test_comment() {
        let mut p = Parser::new("@* hello *@rest");
        let t = p.comment().expect("comment should parse");
        assert_eq!(
            t.kind,
            TreeKind::BlockComment {
                text: " hello ".into()
            }
        );
    }

    #[test]
    fn test_rust_block() {
        let mut p = Parser::new("@{ let x = 5; }after");
        let t = p.rust_block().expect("rust block should parse");
        assert_eq!(
            t.kind,
            TreeKind::RustBlock {
                code: "{ let x = 5; }".into()
            }
        );
    }

    #[test]
    fn test_rust_block_nested_braces() {
        let mut p = Parser::new("@{ if x { y(); } }");
        let t = p.rust_block().expect("rust block should parse");
        assert_eq!(
            t.kind,
            TreeKind::RustBlock {
                code: "{ if x { y(); } }".into()
            }
        );
    }

    #[test]
    fn test_if_else_if_else() {
        let result = Parser::new("@if a {X} @else if b {Y} @else {Z}").parse("t");
        assert!(result.is_ok(), "unexpected errors: {:?}", result.errors);
        assert_eq!(result.template.content.len(), 1);
        match &result.template.content[0].kind {
            TreeKind::If {
                condition,
                then_block,
                else_ifs,
                else_block,
            } => {
                assert_eq!(condition, "a ");
                assert_eq!(then_block[0].kind, TreeKind::Plain { text: "X".into() });
                assert_eq!(else_ifs.len(), 1);
                assert_eq!(else_ifs[0].condition, "b ");
                assert_eq!(
                    else_ifs[0].block[0].kind,
                    TreeKind::Plain { text: "Y".into() }
                );
                let e = else_block.as_ref().expect("else branch");
                assert_eq!(e.block[0].kind, TreeKind::Plain { text: "Z".into() });
            }
            other => panic!("expected If, got {other:?}"),
        }
    }

    #[test]
    fn test_else_on_next_line_attaches() {
        let result = Parser::new("@if a {X}\n@else {Z}").parse("t");
        assert!(result.is_ok(), "unexpected errors: {:?}", result.errors);
        match &result.template.content[0].kind {
            TreeKind::If { else_block, .. } => assert!(else_block.is_some()),
            other => panic!("expected If, got {other:?}"),
        }
    }

    #[test]
    fn test_else_without_block_records_error() {
        let result = Parser::new("@if a {X} @else ").parse("t");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "no block found for else");
    }

    #[test]
    fn test_for_expression() {
        let result = Parser::new("@for i in items { <li>@i</li> }").parse("t");
        assert!(result.is_ok(), "unexpected errors: {:?}", result.errors);
        match &result.template.content[0].kind {
            TreeKind::For { clause, block } => {
                assert_eq!(clause, "i in items ");
                assert_eq!(
                    block[0].kind,
                    TreeKind::Plain {
                        text: " <li>".into()
                    }
                );
                assert!(matches!(block[1].kind, TreeKind::RustExpr { .. }));
                assert_eq!(
                    block[2].kind,
                    TreeKind::Plain {
                        text: "</li> ".into()
                    }
                );
            }
            other => panic!("expected For, got {other:?}"),
        }
    }

    #[test]
    fn test_mixed_sequence() {
        let result = Parser::new("Hi @name, you have @count() items.").parse("t");
        assert!(result.is_ok());
        let kinds: Vec<_> = result.template.content.iter().map(|t| &t.kind).collect();
        assert_eq!(kinds.len(), 5);
        assert_eq!(*kinds[0], TreeKind::Plain { text: "Hi ".into() });
        assert_eq!(
            *kinds[1],
            TreeKind::RustExpr {
                code: "name".into(),
                escape: true,
                transclusions: vec![]
            }
        );
        assert_eq!(
            *kinds[2],
            TreeKind::Plain {
                text: ", you have ".into()
            }
        );
        assert_eq!(
            *kinds[3],
            TreeKind::RustExpr {
                code: "count()".into(),
                escape: true,
                transclusions: vec![]
            }
        );
        assert_eq!(
            *kinds[4],
            TreeKind::Plain {
                text: " items.".into()
            }
        );
    }

    #[test]
    fn test_no_at_is_single_plain_node() {
        let source = "just some text\nwith <b>markup</b>\n";
        let result = Parser::new(source).parse("t");
        assert!(result.is_ok());
        assert_eq!(result.template.content.len(), 1);
        assert_eq!(
            result.template.content[0].kind,
            TreeKind::Plain {
                text: source.into()
            }
        );
    }

    #[test]
    fn test_template_header() {
        let source =
            "@* renders a greeting *@\n@(name: &str)\n@import std::fmt::Write\nHello @name!";
        let result = Parser::new(source).parse("greeting");
        assert!(result.is_ok(), "unexpected errors: {:?}", result.errors);
        let t = &result.template;
        assert!(t.comment.is_some());
        assert_eq!(t.params.text, "(name: &str)");
        assert_eq!(t.top_imports.len(), 1);
        assert_eq!(t.top_imports[0].text, "use std::fmt::Write;");
        assert_eq!(t.content.len(), 3);
    }

    #[test]
    fn test_imports_only_before_content() {
        let result = Parser::new("text\n@import foo::Bar\n").parse("t");
        // Once content has begun, `@import` is no longer an import; the
        // fallback expression production picks up `@import` as a bare
        // identifier instead.
        assert!(result.template.top_imports.is_empty());
    }

    #[test]
    fn test_invalid_at_symbol_halts_and_drops_rest() {
        let result = Parser::new("before @ after").parse("t");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "invalid '@' symbol");
        assert_eq!(result.errors[0].position, Position::new(1, 7));
        // Everything after the bad '@' is dropped.
        assert_eq!(result.template.content.len(), 1);
        assert_eq!(
            result.template.content[0].kind,
            TreeKind::Plain {
                text: "before ".into()
            }
        );
    }

    #[test]
    fn test_two_delimiter_errors_accumulate() {
        let result = Parser::new("@if a { X@if b { Y").parse("t");
        assert_eq!(result.errors.len(), 2);
        for e in &result.errors {
            assert_eq!(e.message, "expected `}`, found end of input");
        }
    }

    #[test]
    fn test_unclosed_paren_reports_at_eof() {
        let source = "@foo(bar";
        let result = Parser::new(source).parse("t");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "expected `)`, found end of input");
        assert_eq!(
            result.errors[0].position,
            Position::of(source, source.len())
        );
    }

    #[test]
    fn test_unterminated_comment_records_error() {
        let result = Parser::new("@* never closed").parse("t");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "expected `*@`, found end of input");
    }

    #[test]
    fn test_positions_recorded() {
        let result = Parser::new("Hello\n@if x {Y}").parse("t");
        assert!(result.is_ok());
        let if_node = &result.template.content[1];
        // Node position points at the keyword, one byte past the '@'.
        assert_eq!(if_node.pos, Position::new(2, 1));
    }

    #[test]
    fn test_expression_position_after_sigil() {
        let result = Parser::new("ab@name").parse("t");
        let expr_node = &result.template.content[1];
        assert_eq!(expr_node.pos, Position::new(1, 3));
    }
}
