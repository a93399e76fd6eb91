//! Document-order search over markup nodes (elements and fragments).

use oxc::ast::ast::{FunctionBody, JSXChild, JSXElement, JSXFragment, JSXOpeningElement};
use oxc::ast_visit::{Visit, walk};

/// An element or fragment node inside a component body.
#[derive(Clone, Copy)]
pub enum MarkupNode<'n, 'a> {
    Element(&'n JSXElement<'a>),
    Fragment(&'n JSXFragment<'a>),
}

impl<'n, 'a> MarkupNode<'n, 'a> {
    pub fn children(self) -> std::slice::Iter<'n, JSXChild<'a>> {
        match self {
            Self::Element(element) => element.children.iter(),
            Self::Fragment(fragment) => fragment.children.iter(),
        }
    }

    /// Opening tag of an element. Fragments have no attributes.
    pub fn opening(self) -> Option<&'n JSXOpeningElement<'a>> {
        match self {
            Self::Element(element) => Some(&*element.opening_element),
            Self::Fragment(_) => None,
        }
    }
}

struct FirstMatch<F, T> {
    predicate: F,
    found: Option<T>,
}

impl<'a, F, T> Visit<'a> for FirstMatch<F, T>
where
    F: FnMut(MarkupNode<'_, 'a>) -> Option<T>,
{
    fn visit_jsx_element(&mut self, it: &JSXElement<'a>) {
        if self.found.is_some() {
            return;
        }
        if let Some(hit) = (self.predicate)(MarkupNode::Element(it)) {
            self.found = Some(hit);
            return;
        }
        walk::walk_jsx_element(self, it);
    }

    fn visit_jsx_fragment(&mut self, it: &JSXFragment<'a>) {
        if self.found.is_some() {
            return;
        }
        if let Some(hit) = (self.predicate)(MarkupNode::Fragment(it)) {
            self.found = Some(hit);
            return;
        }
        walk::walk_jsx_fragment(self, it);
    }
}

/// Visit markup nodes of `body` in document order (parents before children)
/// and return the first value `predicate` produces.
pub fn first_match<'a, T>(
    body: &FunctionBody<'a>,
    predicate: impl FnMut(MarkupNode<'_, 'a>) -> Option<T>,
) -> Option<T> {
    let mut search = FirstMatch { predicate, found: None };
    search.visit_function_body(body);
    search.found
}
