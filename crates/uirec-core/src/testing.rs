//! Event builders shared by the unit tests

use crate::address::{Address, AddressSegment, PROP_OBJECT_ID};
use crate::event::*;

pub fn target(name: &str) -> Address {
    Address::new(vec![
        AddressSegment::new("QMainWindow")
            .with_name("main")
            .with_sibling_index(1)
            .with_property(PROP_OBJECT_ID, "main"),
        AddressSegment::new("QWidget")
            .with_name(name)
            .with_sibling_index(1)
            .with_property(PROP_OBJECT_ID, name),
    ])
}

fn mouse(name: &str, subtype: MouseSubtype, pos: (i32, i32), global: (i32, i32)) -> Event {
    let button = match subtype {
        MouseSubtype::Move => MouseButton::None,
        _ => MouseButton::Left,
    };
    Event::new(
        target(name),
        Payload::Mouse(MousePayload {
            subtype,
            position: Point::new(pos.0, pos.1),
            global_position: Point::new(global.0, global.1),
            button,
            buttons: MouseButtons::default(),
            modifiers: Modifiers::default(),
        }),
    )
}

pub fn mouse_move(name: &str, pos: (i32, i32), global: (i32, i32)) -> Event {
    mouse(name, MouseSubtype::Move, pos, global)
}

pub fn mouse_press(name: &str, pos: (i32, i32)) -> Event {
    mouse(name, MouseSubtype::ButtonPress, pos, (pos.0 + 100, pos.1 + 100))
}

pub fn mouse_release(name: &str, pos: (i32, i32)) -> Event {
    mouse(name, MouseSubtype::ButtonRelease, pos, (pos.0 + 100, pos.1 + 100))
}

pub fn mouse_dbl_click(name: &str, pos: (i32, i32)) -> Event {
    mouse(name, MouseSubtype::ButtonDblClick, pos, (pos.0 + 100, pos.1 + 100))
}

fn key(name: &str, subtype: KeySubtype, c: char) -> Event {
    Event::new(
        target(name),
        Payload::Key(KeyPayload {
            subtype,
            key_code: c.to_ascii_uppercase() as u32,
            text: c.to_string(),
            modifiers: Modifiers::default(),
        }),
    )
}

pub fn key_press(name: &str, c: char) -> Event {
    key(name, KeySubtype::Press, c)
}

pub fn key_release(name: &str, c: char) -> Event {
    key(name, KeySubtype::Release, c)
}

pub fn resize(name: &str, old: (i32, i32), new: (i32, i32)) -> Event {
    Event::new(
        target(name),
        Payload::Resize(ResizePayload {
            old_size: Size::new(old.0, old.1),
            new_size: Size::new(new.0, new.1),
        }),
    )
}

pub fn action(name: &str, action_name: &str) -> Event {
    Event::new(
        target(name),
        Payload::Action(ActionPayload {
            action_name: action_name.to_string(),
        }),
    )
}

pub fn typed(name: &str, text: &str) -> Event {
    Event::new(target(name), Payload::Type(TypePayload { text: text.to_string() }))
}
