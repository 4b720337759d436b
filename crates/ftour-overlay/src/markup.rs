#![forbid(unsafe_code)]

//! A minimal markup tree.
//!
//! Step content and the overlay itself are described as [`Node`] trees. The
//! tree is inert data: the web host serialises it into the portal container,
//! tests inspect it directly. Interactive nodes carry their
//! [`crate::action::OverlayAction`] in the `data-ftour-action` attribute so a
//! single delegated click listener can route every click.

use smallvec::SmallVec;

use crate::action::{ACTION_ATTR, OverlayAction};

type Pairs = SmallVec<[(String, String); 4]>;

/// A markup node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    /// Text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Paragraph holding `text`.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Element::new("p").child(Node::text(text)).into()
    }

    /// The element, if this is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) => None,
        }
    }

    /// Concatenated text of this node and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(text),
            Self::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Depth-first search for the first element satisfying `pred`.
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        let el = self.as_element()?;
        if pred(el) {
            return Some(el);
        }
        el.children.iter().find_map(|child| child.find(pred))
    }

    /// Every element satisfying `pred`, depth-first.
    pub fn find_all(&self, pred: &dyn Fn(&Element) -> bool) -> Vec<&Element> {
        let mut out = Vec::new();
        self.walk(&mut |el| {
            if pred(el) {
                out.push(el);
            }
        });
        out
    }

    fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Element)) {
        if let Self::Element(el) = self {
            visit(el);
            for child in &el.children {
                child.walk(visit);
            }
        }
    }

    /// First element with the class.
    pub fn find_class(&self, class: &str) -> Option<&Element> {
        self.find(&|el| el.has_class(class))
    }

    /// Every action reachable in this tree, depth-first.
    pub fn actions(&self) -> Vec<OverlayAction> {
        self.find_all(&|el| el.action_binding().is_some())
            .into_iter()
            .filter_map(Element::action_binding)
            .collect()
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

/// An element node.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: &'static str,
    pub classes: SmallVec<[String; 4]>,
    pub attrs: Pairs,
    pub style: Pairs,
    pub children: Vec<Node>,
}

impl Element {
    /// Empty element.
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            classes: SmallVec::new(),
            attrs: SmallVec::new(),
            style: SmallVec::new(),
            children: Vec::new(),
        }
    }

    /// Add one or more space-separated classes.
    #[must_use]
    pub fn class(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(str::to_owned));
        self
    }

    /// Set an attribute, replacing any previous value.
    #[must_use]
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_owned(), value)),
        }
        self
    }

    /// Set an inline style property, replacing any previous value.
    #[must_use]
    pub fn style(mut self, property: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.style.iter_mut().find(|(p, _)| p == property) {
            Some(slot) => slot.1 = value,
            None => self.style.push((property.to_owned(), value)),
        }
        self
    }

    /// Bind a click action.
    #[must_use]
    pub fn action(self, action: OverlayAction) -> Self {
        self.attr(ACTION_ATTR, action.to_string())
    }

    /// Append a child.
    #[must_use]
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several children.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Attribute value.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Inline style value.
    pub fn get_style(&self, property: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the class is present.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// The bound action, if any.
    pub fn action_binding(&self) -> Option<OverlayAction> {
        self.get_attr(ACTION_ATTR)?.parse().ok()
    }

    /// Whether the element carries the `disabled` attribute.
    pub fn is_disabled(&self) -> bool {
        self.get_attr("disabled").is_some()
    }

    /// Concatenated descendant text.
    pub fn text_content(&self) -> String {
        self.children.iter().map(Node::text_content).collect()
    }
}
