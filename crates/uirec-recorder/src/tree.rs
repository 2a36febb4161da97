//! Widget tree adapter
//!
//! The recorder never talks to a GUI toolkit directly. A host implements
//! [`WidgetTree`] over its own widget handles; [`crate::arena::WidgetArena`]
//! is an in-memory implementation.

use std::fmt::Debug;
use std::hash::Hash;
use uirec_core::ProbeData;

/// Structural role of a widget, as far as recording cares
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WidgetRole {
    MainWindow,
    Dialog,
    ToolBar,
    MenuBar,
    Menu,
    #[default]
    Widget,
}

impl WidgetRole {
    /// Widgets that may sit at the top of a recordable hierarchy
    pub fn is_window(self) -> bool {
        matches!(self, WidgetRole::MainWindow | WidgetRole::Dialog)
    }

    /// Chrome whose events are handled through actions, not raw input
    pub fn is_chrome(self) -> bool {
        matches!(self, WidgetRole::ToolBar | WidgetRole::MenuBar | WidgetRole::Menu)
    }
}

bitflags::bitflags! {
    /// Values a widget can report when probed
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u8 {
        const TEXT = 1 << 0;
        const LINES = 1 << 1;
        const CHECKED = 1 << 2;
        const NUMERIC = 1 << 3;
    }
}

pub trait WidgetTree {
    /// Identity of a widget; used for cycle detection and sibling matching
    type Id: Copy + Eq + Hash + Debug;

    /// Class name, or `None` if the widget no longer exists
    fn class_name(&self, widget: Self::Id) -> Option<String>;

    fn object_name(&self, widget: Self::Id) -> Option<String>;

    fn title(&self, _widget: Self::Id) -> Option<String> {
        None
    }

    fn parent(&self, widget: Self::Id) -> Option<Self::Id>;

    /// Children in stacking order. May include non-widget objects.
    fn children(&self, widget: Self::Id) -> Vec<Self::Id>;

    fn top_level_widgets(&self) -> Vec<Self::Id>;

    fn role(&self, _widget: Self::Id) -> WidgetRole {
        WidgetRole::Widget
    }

    /// False for child objects that are not widgets (timers, layouts, ...)
    fn is_widget_type(&self, _widget: Self::Id) -> bool {
        true
    }

    fn has_focus(&self, _widget: Self::Id) -> bool {
        false
    }

    fn capabilities(&self, _widget: Self::Id) -> Capabilities {
        Capabilities::empty()
    }

    fn text(&self, _widget: Self::Id) -> Option<String> {
        None
    }

    fn lines(&self, _widget: Self::Id) -> Option<Vec<String>> {
        None
    }

    fn is_checked(&self, _widget: Self::Id) -> Option<bool> {
        None
    }

    fn numeric_value(&self, _widget: Self::Id) -> Option<i64> {
        None
    }

    /// Widget-specific probe handler; takes precedence over the standard probe
    fn custom_probe(&self, _widget: Self::Id) -> Option<ProbeData> {
        None
    }
}
