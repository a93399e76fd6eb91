//! Parsed markup tree and DOM path computation.
//!
//! Mirrors the path the preview client computes in the browser, so rendered
//! snapshots can be indexed under the same keys clicks will produce.

use super::LocatorError;

/// Path segment separator.
pub const SEPARATOR: &str = " > ";

/// Maximum number of classes kept per segment.
const MAX_CLASSES: usize = 2;

#[derive(Debug, Clone)]
pub struct DomElement {
    /// Lowercase tag name.
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

impl DomElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id").filter(|id| !id.is_empty())
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    /// Attribute most likely targeted by an image edit on this element.
    pub fn target_attr_hint(&self) -> Option<&'static str> {
        if self.tag == "img" || self.attr("src").is_some() {
            Some("src")
        } else if self.attr("href").is_some() {
            Some("href")
        } else {
            None
        }
    }
}

/// Arena of the element nodes of one HTML document.
#[derive(Debug, Default)]
pub struct DomTree {
    elements: Vec<DomElement>,
    roots: Vec<usize>,
}

impl DomTree {
    pub fn parse(html: &str) -> Result<Self, LocatorError> {
        let dom = tl::parse(html, tl::ParserOptions::default()).map_err(|_| LocatorError::Markup)?;
        let parser = dom.parser();

        let mut tree = Self::default();
        for handle in dom.children() {
            tree.collect(*handle, parser, None);
        }
        Ok(tree)
    }

    fn collect(&mut self, handle: tl::NodeHandle, parser: &tl::Parser, parent: Option<usize>) {
        let Some(tl::Node::Tag(tag)) = handle.get(parser) else {
            return;
        };

        let attrs = tag
            .attributes()
            .iter()
            .map(|(key, value)| {
                let key: &str = key.as_ref();
                (key.to_ascii_lowercase(), value.map(|v| v.to_string()).unwrap_or_default())
            })
            .collect();

        let idx = self.elements.len();
        self.elements.push(DomElement {
            tag: tag.name().as_utf8_str().to_ascii_lowercase(),
            attrs,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.elements[p].children.push(idx),
            None => self.roots.push(idx),
        }

        for child in tag.children().top().iter() {
            self.collect(*child, parser, Some(idx));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &DomElement)> {
        self.elements.iter().enumerate()
    }

    /// DOM path of the element at `idx`, excluding `body` and everything above.
    pub fn compute_path(&self, idx: usize) -> String {
        let mut segments = Vec::new();
        let mut current = Some(idx);

        while let Some(i) = current {
            let element = &self.elements[i];
            if matches!(element.tag.as_str(), "body" | "html") {
                break;
            }
            segments.push(self.segment(i));
            current = element.parent;
        }

        segments.reverse();
        segments.join(SEPARATOR)
    }

    fn segment(&self, idx: usize) -> String {
        let element = &self.elements[idx];
        let mut selector = element.tag.clone();

        if let Some(id) = element.id() {
            selector.push('#');
            selector.push_str(id);
        }

        let classes: Vec<&str> = element.classes().take(MAX_CLASSES).collect();
        if !classes.is_empty() {
            selector.push('.');
            selector.push_str(&classes.join("."));
        }

        if element.id().is_none() && classes.is_empty() {
            let siblings = match element.parent {
                Some(p) => &self.elements[p].children,
                None => &self.roots,
            };
            let same_tag: Vec<usize> = siblings
                .iter()
                .copied()
                .filter(|&s| self.elements[s].tag == element.tag)
                .collect();
            if same_tag.len() > 1
                && let Some(position) = same_tag.iter().position(|&s| s == idx)
            {
                selector.push_str(&format!(":nth-of-type({})", position + 1));
            }
        }

        selector
    }
}

/// Canonical form of a DOM path: trimmed segments joined by `" > "`.
pub fn normalize_dom_path(path: &str) -> String {
    path.split('>')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Tag name of the last segment (`section.hero > img#logo` -> `img`).
pub fn last_segment_tag(path: &str) -> Option<String> {
    let last = path.rsplit('>').next()?.trim();
    let end = last.find(['#', '.', ':']).unwrap_or(last.len());
    let tag = &last[..end];
    (!tag.is_empty()).then(|| tag.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head><title>t</title></head><body>
<main>
  <section class="hero dark wide"><h1 id="title">Hi</h1><img src="/a.png" id="logo"></section>
  <ul><li>One</li><li>Two</li><li class="x">Three</li></ul>
  <p>solo</p>
</main>
</body></html>"#;

    fn path_of(tree: &DomTree, pred: impl Fn(&DomElement) -> bool) -> String {
        let (idx, _) = tree.iter().find(|(_, e)| pred(e)).unwrap();
        tree.compute_path(idx)
    }

    #[test]
    fn test_path_with_id_and_classes() {
        let tree = DomTree::parse(PAGE).unwrap();
        let title = path_of(&tree, |e| e.id() == Some("title"));
        assert_eq!(title, "main > section.hero.dark > h1#title");
    }

    #[test]
    fn test_nth_of_type_only_without_id_or_class() {
        let tree = DomTree::parse(PAGE).unwrap();
        let first = path_of(&tree, |e| e.tag == "li");
        assert_eq!(first, "main > ul > li:nth-of-type(1)");

        let classed = path_of(&tree, |e| e.attr("class") == Some("x"));
        assert_eq!(classed, "main > ul > li.x");
    }

    #[test]
    fn test_single_sibling_has_no_index() {
        let tree = DomTree::parse(PAGE).unwrap();
        assert_eq!(path_of(&tree, |e| e.tag == "p"), "main > p");
    }

    #[test]
    fn test_target_attr_hint() {
        let tree = DomTree::parse(r#"<a href="/x"></a><img><video src="v.mp4"></video><b></b>"#)
            .unwrap();
        let hints: Vec<_> = tree.iter().map(|(_, e)| e.target_attr_hint()).collect();
        assert_eq!(hints, vec![Some("href"), Some("src"), Some("src"), None]);
    }

    #[test]
    fn test_normalize_dom_path() {
        assert_eq!(normalize_dom_path("  main>section.hero >   h1 "), "main > section.hero > h1");
        assert_eq!(normalize_dom_path(""), "");
    }

    #[test]
    fn test_last_segment_tag() {
        assert_eq!(last_segment_tag("main > section.hero > IMG#logo").as_deref(), Some("img"));
        assert_eq!(last_segment_tag("li:nth-of-type(2)").as_deref(), Some("li"));
        assert_eq!(last_segment_tag(""), None);
    }
}
