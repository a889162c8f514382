//! Code generation from the parsed AST to Rust source text.
//!
//! The generator walks the template content in order and appends lines to
//! an internal buffer, tracking nesting with a depth counter so the output
//! is readably indented. Nothing reaches the caller's sink until the whole
//! template has been generated: a failed template writes no partial output.
//!
//! Transclusion blocks are lowered before the call that receives them:
//! each block becomes a `let transclusion_<line>_<col>_<idx> = { ... }`
//! binding that renders into its own builder, and the binding names are
//! spliced into the call's argument list.

use std::io::{self, Write};

use thiserror::Error;
use tracing::trace;

use super::ast::{Template, TemplateTree, TreeKind};

/// How generated code is indented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndentStyle {
    /// Four spaces per level.
    #[default]
    Spaces,
    /// One tab per level.
    Tabs,
}

impl IndentStyle {
    fn unit(self) -> &'static str {
        match self {
            IndentStyle::Spaces => "    ",
            IndentStyle::Tabs => "\t",
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerateError {
    /// A transclusion block followed an expression that is not a call, so
    /// there is no argument list to splice the rendered content into.
    #[error("transclusion block attached to `{0}`, which is not a call")]
    TransclusionWithoutCall(String),
    #[error("failed to write generated code: {0}")]
    Io(#[from] io::Error),
}

/// Configuration for code generation.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Module name the generated function is nested in, from the middle
    /// segment of the template filename.
    pub output_kind: String,
    pub indent: IndentStyle,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_kind: "html".to_string(),
            indent: IndentStyle::default(),
        }
    }
}

/// Generates Rust source for one parsed template.
pub struct Generator {
    config: GeneratorConfig,
    out: String,
    depth: usize,
}

impl Generator {
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        Self {
            config,
            out: String::new(),
            depth: 0,
        }
    }

    /// Generates the complete source file into `sink`.
    ///
    /// The output is accumulated in full before anything is written, so an
    /// error leaves the sink untouched.
    pub fn generate<W: Write>(&mut self, template: &Template, sink: &mut W) -> Result<(), GenerateError> {
        let source = self.generate_to_string(template)?;
        sink.write_all(source.as_bytes())?;
        Ok(())
    }

    pub fn generate_to_string(&mut self, template: &Template) -> Result<String, GenerateError> {
        trace!(name = %template.name, "generating template");
        self.out.clear();
        self.depth = 0;

        self.line("// Code generated by weft. DO NOT EDIT.");
        self.blank();
        self.line(format!("pub mod {} {{", self.config.output_kind));
        self.indent();

        for import in &template.top_imports {
            self.line(import.text.clone());
        }
        self.line("use weft::TemplateBuilder;");
        self.blank();

        if let Some(comment) = &template.comment {
            if let TreeKind::BlockComment { text } = &comment.kind {
                for doc_line in text.trim().lines() {
                    self.line(format!("/// {}", doc_line.trim()));
                }
            }
        }
        self.line(format!(
            "pub fn {}{} -> String {{",
            template.name, template.params.text
        ));
        self.indent();
        self.line("let mut sb_ = TemplateBuilder::new();");
        self.blank();

        for tree in &template.content {
            self.tree(tree)?;
            self.blank();
        }

        self.line("sb_.into_string()");
        self.dedent();
        self.line("}");
        self.dedent();
        self.line("}");

        Ok(std::mem::take(&mut self.out))
    }

    // ── emission helpers ─────────────────────────────────────────────────

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.out.push_str(self.config.indent.unit());
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn block_body(&mut self, trees: &[TemplateTree]) -> Result<(), GenerateError> {
        self.indent();
        for tree in trees {
            self.tree(tree)?;
        }
        self.dedent();
        Ok(())
    }

    fn tree(&mut self, tree: &TemplateTree) -> Result<(), GenerateError> {
        match &tree.kind {
            TreeKind::Plain { text } => {
                self.line(format!("sb_.write_str({});", raw_string(text)));
            }
            TreeKind::RustBlock { code } => {
                let body = code
                    .strip_prefix('{')
                    .and_then(|c| c.strip_suffix('}'))
                    .unwrap_or(code);
                for code_line in body.trim_matches('\n').lines() {
                    self.line(code_line.trim());
                }
            }
            TreeKind::If {
                condition,
                then_block,
                else_ifs,
                else_block,
            } => {
                self.line(format!("if {condition}{{"));
                self.block_body(then_block)?;
                for branch in else_ifs {
                    self.line(format!("}} else if {}{{", branch.condition));
                    self.block_body(&branch.block)?;
                }
                if let Some(branch) = else_block {
                    self.line("} else {");
                    self.block_body(&branch.block)?;
                }
                self.line("}");
            }
            TreeKind::For { clause, block } => {
                self.line(format!("for {clause}{{"));
                self.block_body(block)?;
                self.line("}");
            }
            TreeKind::RustExpr {
                code,
                escape,
                transclusions,
            } => {
                let code = self.lower_transclusions(tree, code, transclusions)?;
                let writer = if *escape {
                    "weft::write_escaped_html"
                } else {
                    "weft::write_raw_html"
                };
                self.line(format!("{writer}(&mut sb_, {code});"));
            }
            TreeKind::BlockComment { text } => {
                self.line(format!("/*{text}*/"));
            }
            TreeKind::LineComment { text } => {
                self.line(format!("// {text}"));
            }
        }
        Ok(())
    }

    /// Emits a `let` binding per transclusion block and returns the call
    /// expression with the binding names spliced into its argument list.
    fn lower_transclusions(
        &mut self,
        tree: &TemplateTree,
        code: &str,
        transclusions: &[Vec<TemplateTree>],
    ) -> Result<String, GenerateError> {
        if transclusions.is_empty() {
            return Ok(code.to_string());
        }
        if !code.ends_with(')') {
            return Err(GenerateError::TransclusionWithoutCall(code.to_string()));
        }

        let mut names = Vec::with_capacity(transclusions.len());
        for (index, block) in transclusions.iter().enumerate() {
            let name = format!(
                "transclusion_{}_{}_{}",
                tree.pos.line, tree.pos.column, index
            );
            self.line(format!("let {name} = {{"));
            self.indent();
            self.line("let mut sb_ = TemplateBuilder::new();");
            for child in block {
                self.tree(child)?;
            }
            self.line("sb_.into_string()");
            self.dedent();
            self.line("};");
            names.push(name);
        }

        let spliced = names.join(", ");
        let head = &code[..code.len() - 1];
        if head.ends_with('(') {
            Ok(format!("{head}{spliced})"))
        } else {
            Ok(format!("{head}, {spliced})"))
        }
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

/// Quotes `text` as a Rust raw string literal, with enough `#` marks that
/// nothing inside the text can terminate the literal early.
fn raw_string(text: &str) -> String {
    let mut hashes = 0;
    while text.contains(&format!("\"{}", "#".repeat(hashes))) {
        hashes += 1;
    }
    let guard = "#".repeat(hashes);
    format!("r{guard}\"{text}\"{guard}")
}
