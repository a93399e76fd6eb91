//! Byte-range splices over the original source text.

use oxc::span::Span;

/// Replace `start..end` of the source with `text` (an insert when empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub start: u32,
    pub end: u32,
    pub text: String,
}

impl Splice {
    pub fn replace(span: Span, text: impl Into<String>) -> Self {
        Self { start: span.start, end: span.end, text: text.into() }
    }

    pub fn insert(at: u32, text: impl Into<String>) -> Self {
        Self { start: at, end: at, text: text.into() }
    }
}

/// Apply non-overlapping splices. Bytes outside every splice are copied
/// unchanged. Inserts at the same offset keep their given order.
pub fn apply(source: &str, mut splices: Vec<Splice>) -> String {
    splices.sort_by_key(|s| (s.start, s.end));

    let added: usize = splices.iter().map(|s| s.text.len()).sum();
    let mut out = String::with_capacity(source.len() + added);
    let mut cursor = 0usize;
    for splice in &splices {
        let start = splice.start as usize;
        debug_assert!(start >= cursor, "overlapping splices");
        out.push_str(&source[cursor..start.max(cursor)]);
        out.push_str(&splice.text);
        cursor = cursor.max(splice.end as usize);
    }
    out.push_str(&source[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_replace_and_insert() {
        let src = "<img src=\"a.png\" />";
        let out = apply(
            src,
            vec![
                Splice::insert(16, " alt=\"x\""),
                Splice::replace(Span::new(9, 16), "\"b.png\""),
            ],
        );
        assert_eq!(out, "<img src=\"b.png\" alt=\"x\" />");
    }

    #[test]
    fn test_apply_same_offset_keeps_order() {
        let out = apply("ab", vec![Splice::insert(1, "1"), Splice::insert(1, "2")]);
        assert_eq!(out, "a12b");
    }

    #[test]
    fn test_apply_nothing() {
        assert_eq!(apply("unchanged", Vec::new()), "unchanged");
    }
}
