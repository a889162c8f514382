//! Helpers for editor tooling built on top of the parsed AST: innermost
//! node lookup for a cursor position, highlight-span classification, and
//! parameter-name extraction.

use crate::compiler::{Position, Template, TemplateTree, TreeKind};

/// Finds the innermost node whose start strictly precedes `pos`.
///
/// Walks each level in source order, keeping the last node that starts
/// before the position, then descends into that node's child blocks. A
/// node starting exactly at the position belongs to the previous node's
/// span. Positions past the final node resolve to the last node rather
/// than nothing, so end-of-line cursors still land somewhere useful.
pub fn tree_at_position<'a>(
    content: &'a [TemplateTree],
    pos: Position,
) -> Option<&'a TemplateTree> {
    let mut last = None;
    for node in content {
        if node.pos < pos {
            last = Some(node);
        } else {
            break;
        }
    }
    let node = last?;

    let mut innermost = None;
    for block in node.child_blocks() {
        if let Some(inner) = tree_at_position(block, pos) {
            innermost = Some(inner);
        }
    }
    innermost.or(Some(node))
}

/// Highlight categories for template constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightKind {
    /// The `@` expression forms.
    Operator,
    /// `if`, `else if`, `else`, `for`, imports.
    Keyword,
    /// Template parameter names.
    Parameter,
    Comment,
    String,
    /// Template parameter types.
    Type,
}

/// One classified span, positioned like the AST node it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    pub kind: HighlightKind,
    pub pos: Position,
    pub length: usize,
}

/// Classifies every highlightable construct in the template, sorted by
/// position.
pub fn highlight_spans(template: &Template) -> Vec<HighlightSpan> {
    let mut spans = Vec::new();

    if let Some(comment) = &template.comment {
        if let TreeKind::BlockComment { text } = &comment.kind {
            spans.push(HighlightSpan {
                kind: HighlightKind::Comment,
                pos: comment.pos,
                length: text.len() + 4,
            });
        }
    }

    params_spans(template, &mut spans);

    for import in &template.top_imports {
        spans.push(HighlightSpan {
            kind: HighlightKind::Keyword,
            pos: import.pos,
            length: "import".len(),
        });
    }

    content_spans(&template.content, &mut spans);
    spans.sort_by_key(|s| s.pos);
    spans
}

/// One Parameter span per name and one Type span per annotation, laid out
/// within the parameter list's recorded position.
fn params_spans(template: &Template, spans: &mut Vec<HighlightSpan>) {
    let text = &template.params.text;
    let base = template.params.pos;
    let inner = text.trim_start_matches('(').trim_end_matches(')');
    if inner.trim().is_empty() {
        return;
    }

    // Column offset of a byte offset within the (single-line) param list.
    let col = |offset: usize| Position::new(base.line, base.column + 1 + offset);

    let mut consumed = 0;
    for part in inner.split(',') {
        let (name, ty) = match part.split_once(':') {
            Some((n, t)) => (n, Some(t)),
            None => (part, None),
        };
        let name_trimmed = name.trim();
        if !name_trimmed.is_empty() {
            let at = consumed + (name.len() - name.trim_start().len());
            spans.push(HighlightSpan {
                kind: HighlightKind::Parameter,
                pos: col(at),
                length: name_trimmed.len(),
            });
        }
        if let Some(ty) = ty {
            let ty_trimmed = ty.trim();
            if !ty_trimmed.is_empty() {
                let at = consumed + name.len() + 1 + (ty.len() - ty.trim_start().len());
                spans.push(HighlightSpan {
                    kind: HighlightKind::Type,
                    pos: col(at),
                    length: ty_trimmed.len(),
                });
            }
        }
        consumed += part.len() + 1;
    }
}

fn content_spans(content: &[TemplateTree], spans: &mut Vec<HighlightSpan>) {
    for node in content {
        match &node.kind {
            TreeKind::Plain { text } => {
                spans.push(HighlightSpan {
                    kind: HighlightKind::String,
                    pos: node.pos,
                    length: text.len(),
                });
            }
            TreeKind::RustBlock { code } => {
                spans.push(HighlightSpan {
                    kind: HighlightKind::Operator,
                    pos: node.pos,
                    length: code.len(),
                });
            }
            TreeKind::If {
                then_block,
                else_ifs,
                else_block,
                ..
            } => {
                spans.push(HighlightSpan {
                    kind: HighlightKind::Keyword,
                    pos: node.pos,
                    length: "if".len(),
                });
                content_spans(then_block, spans);
                for branch in else_ifs {
                    spans.push(HighlightSpan {
                        kind: HighlightKind::Keyword,
                        pos: branch.pos,
                        length: "else if".len(),
                    });
                    content_spans(&branch.block, spans);
                }
                if let Some(branch) = else_block {
                    spans.push(HighlightSpan {
                        kind: HighlightKind::Keyword,
                        pos: branch.pos,
                        length: "else".len(),
                    });
                    content_spans(&branch.block, spans);
                }
            }
            TreeKind::For { block, .. } => {
                spans.push(HighlightSpan {
                    kind: HighlightKind::Keyword,
                    pos: node.pos,
                    length: "for".len(),
                });
                content_spans(block, spans);
            }
            TreeKind::RustExpr {
                code, transclusions, ..
            } => {
                spans.push(HighlightSpan {
                    kind: HighlightKind::Operator,
                    pos: node.pos,
                    length: code.len(),
                });
                for block in transclusions {
                    content_spans(block, spans);
                }
            }
            TreeKind::BlockComment { text } => {
                spans.push(HighlightSpan {
                    kind: HighlightKind::Comment,
                    pos: node.pos,
                    length: text.len() + 4,
                });
            }
            TreeKind::LineComment { text } => {
                spans.push(HighlightSpan {
                    kind: HighlightKind::Comment,
                    pos: node.pos,
                    length: text.len(),
                });
            }
        }
    }
}

/// The names of the template's parameters, in declaration order.
pub fn param_names(template: &Template) -> Vec<String> {
    let inner = template
        .params
        .text
        .trim_start_matches('(')
        .trim_end_matches(')');
    inner
        .split(',')
        .map(|part| match part.split_once(':') {
            Some((name, _)) => name.trim(),
            None => part.trim(),
        })
        .map(|name| name.trim_start_matches("mut ").trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
