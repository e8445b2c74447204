//! Headless UI tree.
//!
//! A small arena-backed element tree standing in for the host page. Nodes
//! carry classes, attributes and inline styles; a class-based [`Stylesheet`]
//! answers computed-style lookups. Renderers produce owned [`Markup`] which
//! the document instantiates, and any subtree serializes back to HTML.

use std::fmt::{self, Write as _};

// ─────────────────────────────────────────────────────────────────────────────
// Markup
// ─────────────────────────────────────────────────────────────────────────────

/// Owned markup produced by renderers.
#[derive(Debug, Clone, PartialEq)]
pub enum Markup {
    Element(Element),
    Text(String),
}

/// An element description with its children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    pub style: Vec<(String, String)>,
    pub children: Vec<Markup>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    #[must_use]
    pub fn class_if(self, cond: bool, class: &str) -> Self {
        if cond {
            self.class(class)
        } else {
            self
        }
    }

    #[must_use]
    pub fn attr(mut self, name: &str, value: impl ToString) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn style(mut self, property: &str, value: impl ToString) -> Self {
        self.style.push((property.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn child(mut self, child: impl Into<Markup>) -> Self {
        self.children.push(child.into());
        self
    }

    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Markup::Text(text.into()))
    }
}

impl From<Element> for Markup {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(&escape(text, false)),
            Self::Element(el) => {
                write!(f, "<{}", el.tag)?;
                if !el.classes.is_empty() {
                    write!(f, " class=\"{}\"", escape(&el.classes.join(" "), true))?;
                }
                for (name, value) in &el.attrs {
                    write!(f, " {name}=\"{}\"", escape(value, true))?;
                }
                if !el.style.is_empty() {
                    write!(f, " style=\"{}\"", escape(&style_text(&el.style), true))?;
                }
                f.write_char('>')?;
                for child in &el.children {
                    write!(f, "{child}")?;
                }
                write!(f, "</{}>", el.tag)
            }
        }
    }
}

fn style_text(style: &[(String, String)]) -> String {
    style
        .iter()
        .map(|(p, v)| format!("{p}: {v};"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Escapes text for HTML content, or for a double-quoted attribute value.
pub fn escape(s: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Stylesheet
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
struct StyleRule {
    classes: Vec<String>,
    property: String,
    value: String,
}

/// Class-selector rules used to answer computed-style queries.
///
/// A rule matches when the node carries every class of its selector. The
/// rule with the most classes wins; among equals, the later one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    rules: Vec<StyleRule>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule. `selector` is a compound class selector like `.group.failed`.
    #[must_use]
    pub fn rule(mut self, selector: &str, property: &str, value: &str) -> Self {
        self.rules.push(StyleRule {
            classes: selector
                .split('.')
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect(),
            property: property.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn lookup(&self, classes: &[String], property: &str) -> Option<&str> {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, r)| r.property == property)
            .filter(|(_, r)| r.classes.iter().all(|c| classes.contains(c)))
            .max_by_key(|(i, r)| (r.classes.len(), *i))
            .map(|(_, r)| r.value.as_str())
    }

    /// Renders the rules as CSS text.
    pub fn to_css(&self) -> String {
        self.rules
            .iter()
            .map(|rule| {
                format!(
                    ".{} {{ {}: {}; }}\n",
                    rule.classes.join("."),
                    rule.property,
                    rule.value
                )
            })
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Document
// ─────────────────────────────────────────────────────────────────────────────

/// Handle to a node. Handles of removed nodes never resolve again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

#[derive(Debug)]
enum NodeData {
    Element {
        tag: String,
        classes: Vec<String>,
        attrs: Vec<(String, String)>,
        style: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// The UI tree.
#[derive(Debug)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
    stylesheet: Stylesheet,
    root: NodeId,
}

impl Document {
    /// Creates a document with an empty `body` root.
    pub fn new(stylesheet: Stylesheet) -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            free: Vec::new(),
            stylesheet,
            root: NodeId {
                index: 0,
                generation: 0,
            },
        };
        doc.root = doc.create_element("body");
        doc
    }

    pub const fn root(&self) -> NodeId {
        self.root
    }

    pub const fn stylesheet(&self) -> &Stylesheet {
        &self.stylesheet
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_live(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_mut())
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let node = Node {
            data,
            parent: None,
            children: Vec::new(),
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index: self.slots.len() - 1,
                generation: 0,
            }
        }
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element {
            tag: tag.to_string(),
            classes: Vec::new(),
            attrs: Vec::new(),
            style: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(text.to_string()))
    }

    // ── Structure ───────────────────────────────────────────────────────────

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Appends `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if !self.is_live(parent) || !self.is_live(child) || self.contains(child, parent) {
            return;
        }
        self.detach(child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            if let Some(node) = self.node_mut(parent) {
                node.children.retain(|c| *c != id);
            }
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }

    /// Detaches `id` and frees it together with its whole subtree.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_live(id) {
            return;
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let slot = &mut self.slots[next.index];
            if let Some(node) = slot.node.take() {
                stack.extend(node.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(next.index);
            }
        }
    }

    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.children(id).to_vec() {
            self.remove(child);
        }
    }

    /// Builds nodes for `markup` and returns the new (detached) subtree root.
    pub fn instantiate(&mut self, markup: &Markup) -> NodeId {
        match markup {
            Markup::Text(text) => self.create_text(text),
            Markup::Element(el) => {
                let id = self.alloc(NodeData::Element {
                    tag: el.tag.clone(),
                    classes: el.classes.clone(),
                    attrs: el.attrs.clone(),
                    style: el.style.clone(),
                });
                for child in &el.children {
                    let child_id = self.instantiate(child);
                    self.append_child(id, child_id);
                }
                id
            }
        }
    }

    /// Instantiates `markup` as the last child of `parent`.
    pub fn append_markup(&mut self, parent: NodeId, markup: &Markup) -> NodeId {
        let id = self.instantiate(markup);
        self.append_child(parent, id);
        id
    }

    /// Replaces all children of `parent` with freshly built `markup`.
    pub fn replace_children(&mut self, parent: NodeId, markup: &[Markup]) -> Vec<NodeId> {
        self.clear_children(parent);
        markup
            .iter()
            .map(|m| self.append_markup(parent, m))
            .collect()
    }

    /// True if `node` is `ancestor` or lies beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    pub fn query(&self, root: NodeId, class: &str) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|id| self.has_class(*id, class))
    }

    /// Walks from `id` up through its ancestors, stopping before `boundary`,
    /// and returns the first node carrying `attr`.
    pub fn closest_with_attr(&self, id: NodeId, attr: &str, boundary: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == boundary {
                return None;
            }
            if self.attr(node, attr).is_some() {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    // ── Element data ────────────────────────────────────────────────────────

    pub fn classes(&self, id: NodeId) -> &[String] {
        match self.node(id).map(|n| &n.data) {
            Some(NodeData::Element { classes, .. }) => classes.as_slice(),
            _ => &[],
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).iter().any(|c| c == class)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id)?.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            NodeData::Text(_) => None,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(Node {
            data: NodeData::Element { attrs, .. },
            ..
        }) = self.node_mut(id)
        {
            set_pair(attrs, name, value);
        }
    }

    pub fn inline_style(&self, id: NodeId, property: &str) -> Option<&str> {
        match &self.node(id)?.data {
            NodeData::Element { style, .. } => style
                .iter()
                .find(|(p, _)| p == property)
                .map(|(_, v)| v.as_str()),
            NodeData::Text(_) => None,
        }
    }

    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        if let Some(Node {
            data: NodeData::Element { style, .. },
            ..
        }) = self.node_mut(id)
        {
            set_pair(style, property, value);
        }
    }

    pub fn remove_style(&mut self, id: NodeId, property: &str) {
        if let Some(Node {
            data: NodeData::Element { style, .. },
            ..
        }) = self.node_mut(id)
        {
            style.retain(|(p, _)| p != property);
        }
    }

    /// Inline style if set, else the best stylesheet match.
    pub fn computed_style(&self, id: NodeId, property: &str) -> Option<String> {
        self.inline_style(id, property)
            .or_else(|| self.stylesheet.lookup(self.classes(id), property))
            .map(str::to_string)
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(NodeData::Text(text)) = self.node(id).map(|n| &n.data) {
            out.push_str(text);
        }
        for node in self.descendants(id) {
            if let Some(NodeData::Text(text)) = self.node(node).map(|n| &n.data) {
                out.push_str(text);
            }
        }
        out
    }

    // ── Serialization ───────────────────────────────────────────────────────

    /// Snapshot of the subtree rooted at `id`.
    pub fn to_markup(&self, id: NodeId) -> Option<Markup> {
        let node = self.node(id)?;
        Some(match &node.data {
            NodeData::Text(text) => Markup::Text(text.clone()),
            NodeData::Element {
                tag,
                classes,
                attrs,
                style,
            } => Markup::Element(Element {
                tag: tag.clone(),
                classes: classes.clone(),
                attrs: attrs.clone(),
                style: style.clone(),
                children: node
                    .children
                    .iter()
                    .filter_map(|c| self.to_markup(*c))
                    .collect(),
            }),
        })
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        self.to_markup(id).map(|m| m.to_string()).unwrap_or_default()
    }
}

fn set_pair(pairs: &mut Vec<(String, String)>, name: &str, value: &str) {
    if let Some(pair) = pairs.iter_mut().find(|(n, _)| n == name) {
        pair.1 = value.to_string();
    } else {
        pairs.push((name.to_string(), value.to_string()));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Markup {
        Element::new("div")
            .class("row")
            .class_if(true, "failed")
            .class_if(false, "skipped")
            .attr("data-index", 2)
            .child(Element::new("span").class("title").text("a < b"))
            .into()
    }

    #[test]
    fn markup_serializes_to_escaped_html() {
        assert_eq!(
            sample().to_string(),
            r#"<div class="row failed" data-index="2"><span class="title">a &lt; b</span></div>"#
        );
        let quoted: Markup = Element::new("div").attr("title", "say \"hi\"").into();
        assert_eq!(quoted.to_string(), r#"<div title="say &quot;hi&quot;"></div>"#);
    }

    #[test]
    fn instantiate_round_trips_through_snapshot() {
        let mut doc = Document::new(Stylesheet::new());
        let id = doc.append_markup(doc.root(), &sample());
        assert_eq!(doc.to_markup(id), Some(sample()));
        assert_eq!(doc.attr(id, "data-index"), Some("2"));
        assert_eq!(doc.text_content(id), "a < b");
    }

    #[test]
    fn remove_frees_whole_subtree() {
        let mut doc = Document::new(Stylesheet::new());
        let before = doc.len();
        let id = doc.append_markup(doc.root(), &sample());
        let title = doc.query(id, "title").unwrap();
        assert_eq!(doc.len(), before + 3);

        doc.remove(id);
        assert_eq!(doc.len(), before);
        assert!(!doc.is_live(id));
        assert!(!doc.is_live(title));
        assert!(doc.children(doc.root()).is_empty());
    }

    #[test]
    fn stale_handles_do_not_resolve_after_slot_reuse() {
        let mut doc = Document::new(Stylesheet::new());
        let old = doc.create_element("div");
        doc.remove(old);
        let new = doc.create_element("span");
        assert!(!doc.is_live(old));
        assert!(doc.is_live(new));
        assert_eq!(doc.outer_html(old), "");
        assert_eq!(doc.outer_html(new), "<span></span>");
    }

    #[test]
    fn replace_children_drops_previous_content() {
        let mut doc = Document::new(Stylesheet::new());
        let root = doc.root();
        let first = doc.replace_children(root, &[sample(), sample()]);
        let after_first = doc.len();
        let second = doc.replace_children(root, &[sample()]);
        assert_eq!(doc.children(root), second.as_slice());
        assert!(first.iter().all(|id| !doc.is_live(*id)));
        assert_eq!(doc.len(), after_first - 3);
    }

    #[test]
    fn closest_with_attr_stops_at_boundary() {
        let mut doc = Document::new(Stylesheet::new());
        let root = doc.root();
        let row = doc.append_markup(root, &sample());
        let title = doc.query(row, "title").unwrap();
        assert_eq!(doc.closest_with_attr(title, "data-index", root), Some(row));
        assert_eq!(doc.closest_with_attr(title, "data-index", row), None);
        assert_eq!(doc.closest_with_attr(title, "missing", root), None);
    }

    #[test]
    fn computed_style_prefers_inline_then_most_specific_rule() {
        let sheet = Stylesheet::new()
            .rule(".group.failed", "background-color", "red")
            .rule(".group", "background-color", "green");
        let mut doc = Document::new(sheet);
        let plain = doc.append_markup(doc.root(), &Element::new("div").class("group").into());
        let failed = doc.append_markup(
            doc.root(),
            &Element::new("div").class("group").class("failed").into(),
        );
        assert_eq!(doc.computed_style(plain, "background-color").as_deref(), Some("green"));
        assert_eq!(doc.computed_style(failed, "background-color").as_deref(), Some("red"));
        assert_eq!(doc.computed_style(doc.root(), "background-color"), None);

        doc.set_style(plain, "background-color", "black");
        assert_eq!(doc.computed_style(plain, "background-color").as_deref(), Some("black"));
        doc.remove_style(plain, "background-color");
        assert_eq!(doc.inline_style(plain, "background-color"), None);
    }

    #[test]
    fn append_child_rejects_cycles() {
        let mut doc = Document::new(Stylesheet::new());
        let outer = doc.append_markup(doc.root(), &sample());
        let inner = doc.query(outer, "title").unwrap();
        doc.append_child(inner, outer);
        assert_eq!(doc.parent(outer), Some(doc.root()));
    }

    #[test]
    fn stylesheet_css_text() {
        let sheet = Stylesheet::new().rule(".group.failed", "background-color", "red");
        assert_eq!(sheet.to_css(), ".group.failed { background-color: red; }\n");
    }
}
