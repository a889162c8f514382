//! Rustc-style rendering of parse errors for terminal output.
//!
//! Output format:
//! ```text
//! error: message
//!  --> file:line:column
//!   N | source line content
//!     |       ^
//! ```
//!
//! The column in the location header is the 0-based byte column the parser
//! recorded, matching the positions tooling consumers see.

use super::ast::ParseError;

/// Configuration for formatting one error with source context.
pub struct ErrorFormat<'a> {
    error: &'a ParseError,
    source: &'a str,
    filename: &'a str,
}

impl<'a> ErrorFormat<'a> {
    pub fn new(error: &'a ParseError, source: &'a str) -> Self {
        Self {
            error,
            source,
            filename: "input",
        }
    }

    /// Sets the filename shown in the location header.
    pub fn filename(mut self, filename: &'a str) -> Self {
        self.filename = filename;
        self
    }

    /// Renders the error with its source line and a caret under the column.
    pub fn format(&self) -> String {
        let line = self.error.position.line;
        let column = self.error.position.column;

        let mut msg = format!("error: {}\n", self.error.message);
        msg.push_str(&format!(" --> {}:{}:{}\n", self.filename, line, column));

        if let Some(line_content) = self.source.lines().nth(line - 1) {
            let line_num_width = line.to_string().len();
            msg.push_str(&format!("{line} | {line_content}\n"));
            msg.push_str(&format!(
                "{:>width$} | {:>col$}^\n",
                "",
                "",
                width = line_num_width,
                col = column
            ));
        }

        msg
    }
}
