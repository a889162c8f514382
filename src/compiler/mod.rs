//! Compiler for the template language.
//!
//! The pipeline has two stages:
//! - Parser: backtracking recursive descent over the raw source, producing
//!   a best-effort [`Template`] plus accumulated [`ParseError`]s
//! - Generator: walks the template and emits the Rust source of a
//!   rendering function
//!
//! [`compile_template`] ties them together and refuses to generate from a
//! template that parsed with errors.

mod ast;
mod codegen;
mod error_fmt;
mod input;
mod parser;
mod position;

pub use ast::{Else, ElseIf, ParseError, ParseResult, PosString, Template, TemplateTree, TreeKind};
pub use codegen::{GenerateError, Generator, GeneratorConfig, IndentStyle};
pub use error_fmt::ErrorFormat;
pub use parser::Parser;
pub use position::Position;

use thiserror::Error;

/// Options for one compilation.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Module name for the generated function, from the middle segment of
    /// the template filename.
    pub output_kind: String,
    pub indent: IndentStyle,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            output_kind: "html".to_string(),
            indent: IndentStyle::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    /// The source did not parse cleanly; all accumulated errors are carried.
    #[error("template has {} parse error(s)", .errors.len())]
    Parse { errors: Vec<ParseError> },
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

/// Parses `source` and generates the Rust source of its rendering function.
///
/// `name` becomes the generated function's name. Generation only runs when
/// the parse produced no errors.
pub fn compile_template(
    source: &str,
    name: &str,
    options: &CompileOptions,
) -> Result<String, CompileError> {
    let result = Parser::new(source).parse(name);
    if !result.is_ok() {
        return Err(CompileError::Parse {
            errors: result.errors,
        });
    }

    let mut generator = Generator::with_config(GeneratorConfig {
        output_kind: options.output_kind.clone(),
        indent: options.indent,
    });
    Ok(generator.generate_to_string(&result.template)?)
}
