//! Replace or insert an attribute on the element carrying a component's image.
//!
//! The carrier is the first element, in document order, that matches, in
//! priority order: has the requested attribute, has `src`, or is one of
//! [`CARRIER_TAGS`].

use std::path::Path;

use oxc::allocator::Allocator;
use oxc::ast::ast::{FunctionBody, JSXAttributeItem, JSXOpeningElement};
use oxc::span::{GetSpan, Span};

use super::component::find_component;
use super::markup::first_match;
use super::source::{file_stem, parse};
use super::splice::{self, Splice};
use super::{AttributeEdit, PatchError};

pub const DEFAULT_ATTR: &str = "src";
pub const ALT_ATTR: &str = "alt";

/// Tags that carry an image-like attribute even when it is not written yet.
pub const CARRIER_TAGS: &[&str] = &["img", "Image", "source", "video", "audio", "iframe", "embed"];

#[derive(Debug)]
struct AttrSlot {
    name: String,
    span: Span,
    value: Option<Span>,
}

#[derive(Debug)]
struct Carrier {
    tag: String,
    attrs: Vec<AttrSlot>,
    /// Offset right after the last attribute, before `/>` or `>`.
    insert_at: u32,
}

impl Carrier {
    fn has(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }
}

/// Apply `edit` to the carrier element of `component`.
pub fn replace_attribute(
    source: &str,
    path: &Path,
    component: &str,
    edit: &AttributeEdit,
) -> Result<String, PatchError> {
    let allocator = Allocator::default();
    let program = parse(&allocator, source, path)?;

    let found = find_component(&program, component, file_stem(path)).ok_or_else(|| {
        PatchError::ComponentNotFound {
            component: component.to_string(),
            file: path.display().to_string(),
        }
    })?;

    let requested = edit.attr_name.as_deref().unwrap_or(DEFAULT_ATTR);
    let (carrier, written) = find_carrier(found.body, source, requested).ok_or_else(|| {
        PatchError::NoTargetAttributeCarrier {
            component: component.to_string(),
            attr: requested.to_string(),
        }
    })?;

    let mut splices = vec![set_attribute(&carrier, written, &edit.new_value)];
    if let Some(alt) = edit.alt_value.as_deref()
        && written != ALT_ATTR
    {
        splices.push(set_attribute(&carrier, ALT_ATTR, alt));
    }

    Ok(splice::apply(source, splices))
}

/// Returns the carrier and the attribute name to write on it.
fn find_carrier<'r>(
    body: &FunctionBody<'_>,
    source: &str,
    requested: &'r str,
) -> Option<(Carrier, &'r str)> {
    if let Some(carrier) = first_carrier(body, source, |c| c.has(requested)) {
        return Some((carrier, requested));
    }
    if let Some(carrier) = first_carrier(body, source, |c| c.has(DEFAULT_ATTR)) {
        return Some((carrier, DEFAULT_ATTR));
    }
    first_carrier(body, source, |c| CARRIER_TAGS.contains(&c.tag.as_str()))
        .map(|carrier| (carrier, requested))
}

fn first_carrier(
    body: &FunctionBody<'_>,
    source: &str,
    accept: impl Fn(&Carrier) -> bool,
) -> Option<Carrier> {
    first_match(body, |node| {
        node.opening()
            .and_then(|opening| describe(opening, source))
            .filter(|carrier| accept(carrier))
    })
}

fn describe(opening: &JSXOpeningElement<'_>, source: &str) -> Option<Carrier> {
    let tag = slice(source, opening.name.span())?.to_string();
    let attrs = opening
        .attributes
        .iter()
        .filter_map(|item| match item {
            JSXAttributeItem::Attribute(attr) => Some(AttrSlot {
                name: slice(source, attr.name.span())?.to_string(),
                span: attr.span,
                value: attr.value.as_ref().map(|value| value.span()),
            }),
            JSXAttributeItem::SpreadAttribute(_) => None,
        })
        .collect();
    let insert_at = insertion_point(source, opening.span)?;
    Some(Carrier { tag, attrs, insert_at })
}

fn slice(source: &str, span: Span) -> Option<&str> {
    source.get(span.start as usize..span.end as usize)
}

fn insertion_point(source: &str, opening: Span) -> Option<u32> {
    let text = slice(source, opening)?;
    let inner = text.strip_suffix("/>").or_else(|| text.strip_suffix('>'))?;
    Some(opening.start + inner.trim_end().len() as u32)
}

fn set_attribute(carrier: &Carrier, name: &str, value: &str) -> Splice {
    let literal = attribute_literal(value);
    match carrier.attrs.iter().find(|a| a.name == name) {
        Some(AttrSlot { value: Some(span), .. }) => Splice::replace(*span, literal),
        // Bare boolean attribute (`<video autoplay>`): rewrite the whole thing.
        Some(slot) => Splice::replace(slot.span, format!("{name}={literal}")),
        None => Splice::insert(carrier.insert_at, format!(" {name}={literal}")),
    }
}

fn attribute_literal(value: &str) -> String {
    if !value.contains('"') {
        format!("\"{value}\"")
    } else if !value.contains('\'') {
        format!("'{value}'")
    } else {
        let json = serde_json::to_string(value).unwrap_or_default();
        format!("{{{json}}}")
    }
}
