//! Computing widget addresses from a live widget tree

use crate::tree::WidgetTree;
use std::collections::{BTreeMap, HashSet};
use uirec_core::address::{PROP_OBJECT_ID, PROP_TITLE};
use uirec_core::{Address, AddressSegment, Error, Result};

/// Upper bound on path length, independent of cycle detection
pub const MAX_ADDRESS_DEPTH: usize = 64;

/// Address of `widget`, root first.
///
/// Fails only when `widget` itself cannot be described. A cyclic or broken
/// ancestor chain truncates the path at the first repeated or missing widget.
pub fn address_of<T: WidgetTree>(tree: &T, widget: T::Id) -> Result<Address> {
    let leaf = segment_for(tree, widget)
        .ok_or_else(|| Error::widget_not_found(&format!("{:?}", widget)))?;

    let mut segments = vec![leaf];
    let mut visited = HashSet::from([widget]);
    let mut current = tree.parent(widget);

    while let Some(ancestor) = current {
        if !visited.insert(ancestor) {
            tracing::warn!(widget = ?widget, ancestor = ?ancestor, "cycle in widget ancestry, truncating address");
            break;
        }
        if segments.len() >= MAX_ADDRESS_DEPTH {
            tracing::warn!(widget = ?widget, depth = segments.len(), "widget ancestry too deep, truncating address");
            break;
        }
        let Some(segment) = segment_for(tree, ancestor) else {
            tracing::debug!(widget = ?widget, ancestor = ?ancestor, "ancestor vanished, truncating address");
            break;
        };
        segments.push(segment);
        current = tree.parent(ancestor);
    }

    segments.reverse();
    Ok(Address::new(segments))
}

fn segment_for<T: WidgetTree>(tree: &T, widget: T::Id) -> Option<AddressSegment> {
    let class = tree.class_name(widget)?;
    let name = non_empty(tree.object_name(widget));

    let mut properties = BTreeMap::new();
    if let Some(name) = &name {
        properties.insert(PROP_OBJECT_ID.to_string(), name.clone());
    }
    if let Some(title) = non_empty(tree.title(widget)) {
        properties.insert(PROP_TITLE.to_string(), title);
    }

    Some(AddressSegment {
        name,
        sibling_index: Some(sibling_index(tree, widget, &class)),
        class,
        discriminating_properties: properties,
    })
}

/// 1-based occurrence of `widget` among widget siblings with the same name and class
fn sibling_index<T: WidgetTree>(tree: &T, widget: T::Id, class: &str) -> u32 {
    let siblings = match tree.parent(widget) {
        Some(parent) => tree.children(parent),
        None => tree.top_level_widgets(),
    };
    let name = non_empty(tree.object_name(widget));

    let mut index = 1;
    for sibling in siblings {
        if sibling == widget {
            break;
        }
        if !tree.is_widget_type(sibling) {
            continue;
        }
        if non_empty(tree.object_name(sibling)) == name
            && tree.class_name(sibling).as_deref() == Some(class)
        {
            index += 1;
        }
    }
    index
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}
