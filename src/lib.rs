//! Compiles `.weft` templates into Rust rendering functions.
//!
//! A template is literal text with embedded Rust: `@expr` writes an
//! HTML-escaped value, `@!expr` writes it raw, `@if`/`@for` wrap blocks of
//! content in control flow, and `@{ ... }` inlines statements. Compiling
//! `templates/index.html.weft` produces `views/html/index_weft.rs`, which
//! contains an ordinary `pub fn index(...) -> String`.
//!
//! The crate splits into:
//!
//! - [`compiler`] - parser, code generator, and error rendering
//! - [`runtime`] - the small support module generated code links against
//! - [`tooling`] - AST lookups for editors: position resolution,
//!   highlight classification, parameter extraction
//! - [`cli`] - the `weft` binary's argument handling and file driver
//!
//! Generated code refers to the runtime through `weft::` paths, so the
//! runtime items are re-exported at the crate root.

pub mod cli;
pub mod compiler;
pub mod runtime;
pub mod tooling;

pub use runtime::{escape_html, write_escaped_html, write_raw_html, TemplateBuilder};
