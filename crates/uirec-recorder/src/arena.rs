//! In-memory widget tree
//!
//! Useful for tests and for hosts that mirror their toolkit's hierarchy
//! into plain data. Parent links can be rewired freely, including into
//! cycles, to model malformed hierarchies.

use crate::tree::{Capabilities, WidgetRole, WidgetTree};
use uirec_core::ProbeData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(usize);

/// Description of a widget to insert
#[derive(Debug, Clone, Default)]
pub struct WidgetSpec {
    class: String,
    object_name: Option<String>,
    title: Option<String>,
    role: WidgetRole,
    widget_type: bool,
    text: Option<String>,
    lines: Option<Vec<String>>,
    checked: Option<bool>,
    number: Option<i64>,
    custom_probe: Option<ProbeData>,
}

impl WidgetSpec {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            widget_type: true,
            ..Default::default()
        }
    }

    pub fn main_window(class: impl Into<String>) -> Self {
        Self::new(class).role(WidgetRole::MainWindow)
    }

    pub fn dialog(class: impl Into<String>) -> Self {
        Self::new(class).role(WidgetRole::Dialog)
    }

    /// A child object that is not a widget
    pub fn object(class: impl Into<String>) -> Self {
        Self {
            widget_type: false,
            ..Self::new(class)
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.object_name = Some(name.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn role(mut self, role: WidgetRole) -> Self {
        self.role = role;
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn lines(mut self, lines: Vec<String>) -> Self {
        self.lines = Some(lines);
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    pub fn number(mut self, value: i64) -> Self {
        self.number = Some(value);
        self
    }

    pub fn custom_probe(mut self, data: ProbeData) -> Self {
        self.custom_probe = Some(data);
        self
    }
}

#[derive(Debug)]
struct Node {
    spec: WidgetSpec,
    parent: Option<WidgetId>,
    children: Vec<WidgetId>,
}

#[derive(Debug, Default)]
pub struct WidgetArena {
    nodes: Vec<Node>,
    top_level: Vec<WidgetId>,
    focus: Option<WidgetId>,
}

impl WidgetArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_top_level(&mut self, spec: WidgetSpec) -> WidgetId {
        let id = self.insert(spec, None);
        self.top_level.push(id);
        id
    }

    pub fn add_child(&mut self, parent: WidgetId, spec: WidgetSpec) -> WidgetId {
        let id = self.insert(spec, Some(parent));
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.push(id);
        }
        id
    }

    /// Rewire a parent link without touching any child lists
    pub fn set_parent(&mut self, widget: WidgetId, parent: Option<WidgetId>) {
        if let Some(node) = self.nodes.get_mut(widget.0) {
            node.parent = parent;
        }
    }

    pub fn set_focus(&mut self, widget: Option<WidgetId>) {
        self.focus = widget;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn insert(&mut self, spec: WidgetSpec, parent: Option<WidgetId>) -> WidgetId {
        let id = WidgetId(self.nodes.len());
        self.nodes.push(Node {
            spec,
            parent,
            children: Vec::new(),
        });
        id
    }

    fn node(&self, widget: WidgetId) -> Option<&Node> {
        self.nodes.get(widget.0)
    }

    fn spec(&self, widget: WidgetId) -> Option<&WidgetSpec> {
        self.node(widget).map(|n| &n.spec)
    }
}

impl WidgetTree for WidgetArena {
    type Id = WidgetId;

    fn class_name(&self, widget: WidgetId) -> Option<String> {
        self.spec(widget).map(|s| s.class.clone())
    }

    fn object_name(&self, widget: WidgetId) -> Option<String> {
        self.spec(widget).and_then(|s| s.object_name.clone())
    }

    fn title(&self, widget: WidgetId) -> Option<String> {
        self.spec(widget).and_then(|s| s.title.clone())
    }

    fn parent(&self, widget: WidgetId) -> Option<WidgetId> {
        self.node(widget).and_then(|n| n.parent)
    }

    fn children(&self, widget: WidgetId) -> Vec<WidgetId> {
        self.node(widget).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn top_level_widgets(&self) -> Vec<WidgetId> {
        self.top_level.clone()
    }

    fn role(&self, widget: WidgetId) -> WidgetRole {
        self.spec(widget).map(|s| s.role).unwrap_or_default()
    }

    fn is_widget_type(&self, widget: WidgetId) -> bool {
        self.spec(widget).is_some_and(|s| s.widget_type)
    }

    fn has_focus(&self, widget: WidgetId) -> bool {
        self.focus == Some(widget)
    }

    fn capabilities(&self, widget: WidgetId) -> Capabilities {
        let Some(spec) = self.spec(widget) else {
            return Capabilities::empty();
        };
        let mut caps = Capabilities::empty();
        caps.set(Capabilities::TEXT, spec.text.is_some());
        caps.set(Capabilities::LINES, spec.lines.is_some());
        caps.set(Capabilities::CHECKED, spec.checked.is_some());
        caps.set(Capabilities::NUMERIC, spec.number.is_some());
        caps
    }

    fn text(&self, widget: WidgetId) -> Option<String> {
        self.spec(widget).and_then(|s| s.text.clone())
    }

    fn lines(&self, widget: WidgetId) -> Option<Vec<String>> {
        self.spec(widget).and_then(|s| s.lines.clone())
    }

    fn is_checked(&self, widget: WidgetId) -> Option<bool> {
        self.spec(widget).and_then(|s| s.checked)
    }

    fn numeric_value(&self, widget: WidgetId) -> Option<i64> {
        self.spec(widget).and_then(|s| s.number)
    }

    fn custom_probe(&self, widget: WidgetId) -> Option<ProbeData> {
        self.spec(widget).and_then(|s| s.custom_probe.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_parent_child_links() {
        let mut arena = WidgetArena::new();
        let main = arena.add_top_level(WidgetSpec::main_window("QMainWindow").named("main"));
        let edit = arena.add_child(main, WidgetSpec::new("QLineEdit").text("abc"));

        assert_eq!(arena.parent(edit), Some(main));
        assert_eq!(arena.children(main), vec![edit]);
        assert_eq!(arena.top_level_widgets(), vec![main]);
        assert_eq!(arena.role(main), WidgetRole::MainWindow);
        assert_eq!(arena.capabilities(edit), Capabilities::TEXT);
    }

    #[test]
    fn unknown_ids_are_absent() {
        let arena = WidgetArena::new();
        let ghost = WidgetId(7);
        assert_eq!(arena.class_name(ghost), None);
        assert!(arena.children(ghost).is_empty());
        assert!(!arena.is_widget_type(ghost));
    }

    #[test]
    fn focus_is_exclusive() {
        let mut arena = WidgetArena::new();
        let a = arena.add_top_level(WidgetSpec::dialog("QDialog"));
        let b = arena.add_child(a, WidgetSpec::new("QLineEdit"));
        arena.set_focus(Some(b));
        assert!(arena.has_focus(b));
        assert!(!arena.has_focus(a));
    }
}
