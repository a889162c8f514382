//! Runtime support for generated rendering functions.
//!
//! Generated code builds its output through a [`TemplateBuilder`] and
//! writes expression values with [`write_escaped_html`] or
//! [`write_raw_html`]. This module is the only part of the crate a
//! consumer of generated templates needs at runtime.

use std::fmt::{Display, Write};

/// Accumulates rendered template output.
#[derive(Debug, Default)]
pub struct TemplateBuilder {
    out: String,
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends literal text verbatim.
    pub fn write_str(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// The finished output.
    pub fn into_string(self) -> String {
        self.out
    }

    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }
}

impl Display for TemplateBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.out)
    }
}

/// Writes `value`, HTML-escaping its display form.
pub fn write_escaped_html<T: Display>(sb: &mut TemplateBuilder, value: T) {
    let rendered = value.to_string();
    sb.out.push_str(&escape_html(&rendered));
}

/// Writes `value` verbatim. Only for content that is already trusted HTML.
pub fn write_raw_html<T: Display>(sb: &mut TemplateBuilder, value: T) {
    // Infallible: writing into a String cannot fail.
    let _ = write!(sb.out, "{value}");
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
