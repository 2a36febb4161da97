//! Event types flowing through the recording pipeline
//!
//! An [`Event`] is a target address plus a tagged payload. The kind is derived
//! from the payload variant, so the two can never disagree. Events serialize to
//! flat JSON objects, one per line.

use crate::address::Address;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Single event - target plus payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub target: Address,
    #[serde(flatten)]
    pub payload: Payload,
}

impl Event {
    pub fn new(target: Address, payload: Payload) -> Self {
        Self { target, payload }
    }

    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// Parse one JSON line
    pub fn from_json(line: &str) -> Result<Self> {
        serde_json::from_str(line).map_err(|e| Error::invalid_event(&e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Mouse,
    Key,
    Resize,
    Action,
    Probe,
    Type,
    Click,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Mouse => "mouse",
            EventKind::Key => "key",
            EventKind::Resize => "resize",
            EventKind::Action => "action",
            EventKind::Probe => "probe",
            EventKind::Type => "type",
            EventKind::Click => "click",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event data - tagged union keyed by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Mouse(MousePayload),
    Key(KeyPayload),
    Resize(ResizePayload),
    Action(ActionPayload),
    Probe(ProbePayload),
    /// Synthesized from key press/release pairs
    Type(TypePayload),
    /// Synthesized from mouse press/release pairs
    Click(ClickPayload),
}

impl Payload {
    pub fn kind(&self) -> EventKind {
        match self {
            Payload::Mouse(_) => EventKind::Mouse,
            Payload::Key(_) => EventKind::Key,
            Payload::Resize(_) => EventKind::Resize,
            Payload::Action(_) => EventKind::Action,
            Payload::Probe(_) => EventKind::Probe,
            Payload::Type(_) => EventKind::Type,
            Payload::Click(_) => EventKind::Click,
        }
    }
}

// ============================================================================
// Low-level payloads
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseSubtype {
    ButtonPress,
    ButtonRelease,
    ButtonDblClick,
    Move,
}

impl MouseSubtype {
    /// Press-like subtypes open a click digraph
    pub fn is_press(self) -> bool {
        matches!(self, MouseSubtype::ButtonPress | MouseSubtype::ButtonDblClick)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MousePayload {
    pub subtype: MouseSubtype,
    pub position: Point,
    pub global_position: Point,
    #[serde(default)]
    pub button: MouseButton,
    #[serde(default)]
    pub buttons: MouseButtons,
    #[serde(default)]
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySubtype {
    Press,
    Release,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPayload {
    pub subtype: KeySubtype,
    pub key_code: u32,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizePayload {
    pub old_size: Size,
    pub new_size: Size,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPayload {
    pub action_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbePayload {
    pub data: ProbeData,
}

/// Value captured from a probed widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ProbeData {
    Text(String),
    Lines(Vec<String>),
    Checked(bool),
    Number(i64),
}

// ============================================================================
// High-level payloads
// ============================================================================

/// Text typed by a run of key press/release pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypePayload {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickPayload {
    pub button: MouseButton,
    pub position: Point,
    pub global_position: Point,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Press/release pairs folded into this click (2 = double click)
    pub count: u32,
}

impl ClickPayload {
    pub fn from_press(press: &MousePayload) -> Self {
        Self {
            button: press.button,
            position: press.position,
            global_position: press.global_position,
            modifiers: press.modifiers,
            count: 1,
        }
    }
}

// ============================================================================
// Geometry
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// `None` if either coordinate overflows
    pub fn checked_add(self, rhs: Point) -> Option<Point> {
        Some(Point::new(self.x.checked_add(rhs.x)?, self.y.checked_add(rhs.y)?))
    }

    pub fn checked_sub(self, rhs: Point) -> Option<Point> {
        Some(Point::new(self.x.checked_sub(rhs.x)?, self.y.checked_sub(rhs.y)?))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

// ============================================================================
// Buttons and modifiers
// ============================================================================

/// Button that caused a mouse event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    None,
    Left,
    Right,
    Middle,
    Back,
    Forward,
}

/// Buttons held during a mouse event, packed into a single byte
/// Bit 0: left, 1: right, 2: middle, 3: back, 4: forward
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MouseButtons(pub u8);

impl MouseButtons {
    pub const LEFT: u8 = 1 << 0;
    pub const RIGHT: u8 = 1 << 1;
    pub const MIDDLE: u8 = 1 << 2;
    pub const BACK: u8 = 1 << 3;
    pub const FORWARD: u8 = 1 << 4;

    pub fn is_empty(&self) -> bool { self.0 == 0 }
    pub fn has_left(&self) -> bool { self.0 & Self::LEFT != 0 }
}

/// Keyboard modifier flags packed into a single byte
/// Bit 0: shift, 1: ctrl, 2: alt, 3: meta, 4: keypad
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const SHIFT: u8 = 1 << 0;
    pub const CTRL: u8 = 1 << 1;
    pub const ALT: u8 = 1 << 2;
    pub const META: u8 = 1 << 3;
    pub const KEYPAD: u8 = 1 << 4;

    pub fn is_empty(&self) -> bool { self.0 == 0 }
    pub fn has_shift(&self) -> bool { self.0 & Self::SHIFT != 0 }
    pub fn has_ctrl(&self) -> bool { self.0 & Self::CTRL != 0 }
    pub fn has_alt(&self) -> bool { self.0 & Self::ALT != 0 }
    pub fn any(&self, mask: u8) -> bool { self.0 & mask != 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AddressSegment;

    fn target() -> Address {
        Address::new(vec![AddressSegment::new("QMainWindow").with_sibling_index(1)])
    }

    #[test]
    fn kind_follows_payload() {
        let e = Event::new(target(), Payload::Type(TypePayload { text: "ab".into() }));
        assert_eq!(e.kind(), EventKind::Type);
        assert_eq!(e.kind().to_string(), "type");
    }

    #[test]
    fn serializes_flat_with_kind_tag() {
        let e = Event::new(
            target(),
            Payload::Key(KeyPayload {
                subtype: KeySubtype::Press,
                key_code: 65,
                text: "a".into(),
                modifiers: Modifiers(Modifiers::SHIFT),
            }),
        );
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["kind"], "key");
        assert_eq!(json["subtype"], "press");
        assert_eq!(json["modifiers"], 1);
        assert_eq!(json["target"][0]["class"], "QMainWindow");
    }

    #[test]
    fn parses_mouse_line_with_defaults() {
        let line = r#"{"target":[{"class":"QWidget"}],"kind":"mouse","subtype":"move","position":{"x":1,"y":2},"global_position":{"x":11,"y":12}}"#;
        let e = Event::from_json(line).unwrap();
        match e.payload {
            Payload::Mouse(m) => {
                assert_eq!(m.subtype, MouseSubtype::Move);
                assert_eq!(m.global_position, Point::new(11, 12));
                assert_eq!(m.button, MouseButton::None);
                assert!(m.buttons.is_empty());
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = Event::from_json(r#"{"target":[],"kind":"scroll"}"#).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidEvent);
    }

    #[test]
    fn probe_data_is_adjacently_tagged() {
        let json = serde_json::to_value(ProbeData::Checked(true)).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "checked", "value": true }));
    }

    #[test]
    fn point_arithmetic() {
        let delta = Point::new(10, 20).checked_sub(Point::new(7, 8)).unwrap();
        assert_eq!(Point::new(3, 4).checked_add(delta), Some(Point::new(6, 16)));
    }

    #[test]
    fn point_arithmetic_reports_overflow() {
        assert_eq!(Point::new(i32::MAX, 0).checked_sub(Point::new(i32::MIN + 1, 0)), None);
        assert_eq!(Point::new(0, i32::MAX).checked_add(Point::new(0, 1)), None);
    }
}
