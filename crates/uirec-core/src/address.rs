//! Widget addresses - stable structural paths used as the "same target" key
//!
//! An [`Address`] is plain owned data. Two addresses compare equal iff their
//! segments are equal element-wise, so a target captured earlier can be
//! compared against a fresh one without touching the GUI toolkit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Property key used for the widget's object name
pub const PROP_OBJECT_ID: &str = "oid";
/// Property key used for the widget's title
pub const PROP_TITLE: &str = "title";

/// Root-to-leaf path of a widget
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address {
    segments: Vec<AddressSegment>,
}

/// One step of an [`Address`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressSegment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub class: String,
    /// 1-based occurrence among siblings sharing name and class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sibling_index: Option<u32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub discriminating_properties: BTreeMap<String, String>,
}

impl Address {
    pub fn new(segments: Vec<AddressSegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[AddressSegment] {
        &self.segments
    }

    pub fn leaf(&self) -> Option<&AddressSegment> {
        self.segments.last()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// XPath-like rendering, e.g. `QMainWindow[@oid='main']/QDialog[2]`
    pub fn xpath(&self) -> String {
        self.segments
            .iter()
            .map(AddressSegment::xpath)
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl FromIterator<AddressSegment> for Address {
    fn from_iter<I: IntoIterator<Item = AddressSegment>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl AddressSegment {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            name: None,
            class: class.into(),
            sibling_index: None,
            discriminating_properties: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_sibling_index(mut self, index: u32) -> Self {
        self.sibling_index = Some(index);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.discriminating_properties.insert(key.into(), value.into());
        self
    }

    /// Property filter wins over the positional index; index 1 is implied.
    pub fn xpath(&self) -> String {
        let mut s = self.class.clone();
        if !self.discriminating_properties.is_empty() {
            let filters: Vec<String> = self
                .discriminating_properties
                .iter()
                .map(|(k, v)| format!("@{}='{}'", k, v.replace('\'', "\\'")))
                .collect();
            s.push('[');
            s.push_str(&filters.join(" and "));
            s.push(']');
        } else if let Some(i) = self.sibling_index.filter(|i| *i > 1) {
            s.push_str(&format!("[{}]", i));
        }
        s
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.xpath())
    }
}

impl fmt::Display for AddressSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.xpath())
    }
}
