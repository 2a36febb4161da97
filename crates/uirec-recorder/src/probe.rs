//! Capturing widget values for probe events

use crate::tree::{Capabilities, WidgetTree};
use std::collections::HashSet;
use uirec_core::ProbeData;

/// Value of `widget` through its declared capabilities.
///
/// Capabilities are tried in a fixed order (text, lines, checked, numeric);
/// the first one whose accessor yields a value wins.
pub fn standard_probe<T: WidgetTree>(tree: &T, widget: T::Id) -> Option<ProbeData> {
    let caps = tree.capabilities(widget);
    if caps.contains(Capabilities::TEXT) {
        if let Some(text) = tree.text(widget) {
            return Some(ProbeData::Text(text));
        }
    }
    if caps.contains(Capabilities::LINES) {
        if let Some(lines) = tree.lines(widget) {
            return Some(ProbeData::Lines(lines));
        }
    }
    if caps.contains(Capabilities::CHECKED) {
        if let Some(checked) = tree.is_checked(widget) {
            return Some(ProbeData::Checked(checked));
        }
    }
    if caps.contains(Capabilities::NUMERIC) {
        if let Some(value) = tree.numeric_value(widget) {
            return Some(ProbeData::Number(value));
        }
    }
    None
}

/// Nearest widget from `widget` upward that yields probe data.
///
/// Custom probe handlers are consulted along the whole ancestor chain before
/// falling back to the standard probe, so a custom handler on an outer widget
/// beats a plain text value on the widget that was clicked.
pub fn probe_ancestors<T: WidgetTree>(tree: &T, widget: T::Id) -> Option<(T::Id, ProbeData)> {
    let chain = ancestry(tree, widget);
    chain
        .iter()
        .find_map(|&id| tree.custom_probe(id).map(|data| (id, data)))
        .or_else(|| {
            chain
                .iter()
                .find_map(|&id| standard_probe(tree, id).map(|data| (id, data)))
        })
}

/// `widget` followed by its ancestors, stopping at the first repeat
fn ancestry<T: WidgetTree>(tree: &T, widget: T::Id) -> Vec<T::Id> {
    let mut visited = HashSet::new();
    let mut chain = Vec::new();
    let mut current = Some(widget);
    while let Some(id) = current {
        if !visited.insert(id) {
            tracing::warn!(widget = ?widget, "cycle in widget ancestry while probing");
            break;
        }
        chain.push(id);
        current = tree.parent(id);
    }
    chain
}
