//! AST model for parsed templates.
//!
//! One [`Template`] per source file, holding ordered [`TemplateTree`]
//! content. Node order always equals source order equals output order.
//! Every node carries the [`Position`] of the construct that produced it,
//! fixed once at creation.

use std::fmt;

use super::position::Position;

/// A string paired with the position it was read from, used for the
/// parameter list and the top-level import statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosString {
    pub text: String,
    pub pos: Position,
}

impl PosString {
    pub fn new(text: impl Into<String>, pos: Position) -> Self {
        Self {
            text: text.into(),
            pos,
        }
    }
}

/// One node of template content plus the position it started at.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateTree {
    pub kind: TreeKind,
    pub pos: Position,
}

/// The closed set of template content variants.
///
/// Each variant carries exactly the payload it needs; there are no shared
/// text/metadata/children fields that stay empty for some kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeKind {
    /// Literal text, escapes (`@@`, `@}`) already resolved.
    Plain { text: String },
    /// A verbatim Rust statement block from `@{ ... }`, braces included.
    RustBlock { code: String },
    /// `@if cond { ... }` with any attached `@else if` / `@else` branches.
    If {
        condition: String,
        then_block: Vec<TemplateTree>,
        else_ifs: Vec<ElseIf>,
        else_block: Option<Else>,
    },
    /// `@for clause { ... }`.
    For {
        clause: String,
        block: Vec<TemplateTree>,
    },
    /// An embedded Rust expression whose value is written to the output.
    ///
    /// `escape` is true for the default HTML-escaped form and false for the
    /// raw `@!` form. `transclusions` is non-empty only when a `{ ... }`
    /// content block immediately followed the call's closing parenthesis.
    RustExpr {
        code: String,
        escape: bool,
        transclusions: Vec<Vec<TemplateTree>>,
    },
    /// `@* ... *@`, carried through into the generated source.
    BlockComment { text: String },
    /// A single-line comment. The parser does not currently produce these;
    /// the generator still knows how to emit them.
    LineComment { text: String },
}

/// One `@else if cond { ... }` branch of an [`TreeKind::If`].
#[derive(Debug, Clone, PartialEq)]
pub struct ElseIf {
    pub condition: String,
    pub block: Vec<TemplateTree>,
    pub pos: Position,
}

/// The `@else { ... }` branch of an [`TreeKind::If`].
#[derive(Debug, Clone, PartialEq)]
pub struct Else {
    pub block: Vec<TemplateTree>,
    pub pos: Position,
}

impl TemplateTree {
    pub fn new(kind: TreeKind, pos: Position) -> Self {
        Self { kind, pos }
    }

    /// The nested content lists of this node, in source order.
    ///
    /// Tooling descends through these to find the innermost node for a
    /// cursor position; leaf kinds return nothing.
    pub fn child_blocks(&self) -> Vec<&[TemplateTree]> {
        match &self.kind {
            TreeKind::If {
                then_block,
                else_ifs,
                else_block,
                ..
            } => {
                let mut blocks: Vec<&[TemplateTree]> = vec![then_block.as_slice()];
                for ei in else_ifs {
                    blocks.push(ei.block.as_slice());
                }
                if let Some(e) = else_block {
                    blocks.push(e.block.as_slice());
                }
                blocks
            }
            TreeKind::For { block, .. } => vec![block.as_slice()],
            TreeKind::RustExpr { transclusions, .. } => {
                transclusions.iter().map(|t| t.as_slice()).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// A parsed template: one per source file, one generated callable.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// The callable's name, supplied by the caller of the parser.
    pub name: String,
    /// Leading `@* ... *@` doc comment, if the template had one.
    pub comment: Option<TemplateTree>,
    /// Raw parameter-list text, outer parentheses included.
    pub params: PosString,
    /// Ordered `use ...;` statements built from `@import` lines.
    pub top_imports: Vec<PosString>,
    /// Ordered template content.
    pub content: Vec<TemplateTree>,
}

/// A single accumulated parse error: message plus source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub position: Position,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.position.line, self.position.column, self.message
        )
    }
}

/// What a parse produces: a best-effort template plus every error found.
///
/// Errors accumulate in source order and never abort the parse; callers
/// decide whether the template is sound enough to generate from.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    pub template: Template,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}
