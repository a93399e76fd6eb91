//! Replace the visible text of a component.

use std::path::Path;

use oxc::allocator::Allocator;
use oxc::ast::ast::JSXChild;
use oxc::span::Span;

use super::component::find_component;
use super::markup::{MarkupNode, first_match};
use super::source::{file_stem, parse};
use super::splice::{self, Splice};
use super::PatchError;

/// Replace the first literal text child found in `component` with `new_text`.
///
/// Surrounding whitespace of the original text child is kept, only the
/// trimmed run is replaced.
pub fn replace_text(
    source: &str,
    path: &Path,
    component: &str,
    new_text: &str,
) -> Result<String, PatchError> {
    let allocator = Allocator::default();
    let program = parse(&allocator, source, path)?;

    let found = find_component(&program, component, file_stem(path)).ok_or_else(|| {
        PatchError::ComponentNotFound {
            component: component.to_string(),
            file: path.display().to_string(),
        }
    })?;

    let span = first_match(found.body, |node| first_text_span(node, source)).ok_or_else(|| {
        PatchError::NoTextNodeFound { component: component.to_string() }
    })?;

    Ok(splice::apply(source, vec![Splice::replace(span, escape_text(new_text))]))
}

fn first_text_span(node: MarkupNode<'_, '_>, source: &str) -> Option<Span> {
    node.children().find_map(|child| match child {
        JSXChild::Text(text) => trimmed(text.span, source),
        _ => None,
    })
}

/// Shrink `span` to its non-whitespace content; `None` if nothing is left.
fn trimmed(span: Span, source: &str) -> Option<Span> {
    let raw = source.get(span.start as usize..span.end as usize)?;
    let body = raw.trim();
    if body.is_empty() {
        return None;
    }
    let lead = raw.len() - raw.trim_start().len();
    let start = span.start + lead as u32;
    Some(Span::new(start, start + body.len() as u32))
}

/// Escape characters that would change meaning inside markup text.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
