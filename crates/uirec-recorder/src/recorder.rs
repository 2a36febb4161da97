//! Event recorder - turns toolkit input into addressed events
//!
//! The host calls [`EventRecorder::filter`] for every input event it sees,
//! in the place a toolkit would install an application-wide event filter.
//! Accepted inputs are addressed and pushed into the handler chain; `stop()`
//! flushes whatever the combiners still hold.

use crate::address::address_of;
use crate::config::RecorderConfig;
use crate::probe::probe_ancestors;
use crate::tree::WidgetTree;
use std::collections::HashSet;
use uirec_core::pipeline;
use uirec_core::{
    ActionPayload, Event, EventHandler, KeyPayload, Modifiers, MouseButton, MousePayload,
    MouseSubtype, Payload, ProbeData, ProbePayload, ResizePayload,
};

/// Toolkit key codes for bare modifier keys
pub mod key_codes {
    pub const SHIFT: u32 = 0x0100_0020;
    pub const CONTROL: u32 = 0x0100_0021;
    pub const META: u32 = 0x0100_0022;
    pub const ALT: u32 = 0x0100_0023;

    pub fn is_modifier(key_code: u32) -> bool {
        matches!(key_code, SHIFT | CONTROL | META | ALT)
    }
}

/// Input as delivered by the toolkit, before addressing
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    Key(KeyPayload),
    Mouse {
        payload: MousePayload,
        /// False for events the toolkit re-dispatched to a parent
        spontaneous: bool,
    },
    Resize(ResizePayload),
}

pub struct EventRecorder<H: EventHandler> {
    handler: H,
    config: RecorderConfig,
    recording: bool,
}

impl EventRecorder<Box<dyn EventHandler>> {
    /// Recorder feeding `sink` through the stages enabled in `config`
    pub fn with_pipeline<S: EventHandler + 'static>(sink: S, config: RecorderConfig) -> Self {
        let handler = pipeline::build(sink, config.pipeline_options());
        Self::with_config(handler, config)
    }
}

impl<H: EventHandler> EventRecorder<H> {
    pub fn new(handler: H) -> Self {
        Self::with_config(handler, RecorderConfig::default())
    }

    pub fn with_config(handler: H, config: RecorderConfig) -> Self {
        Self {
            handler,
            config,
            recording: false,
        }
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn start(&mut self) {
        if self.recording {
            tracing::debug!("recorder already running, ignoring start");
            return;
        }
        tracing::debug!("recorder started");
        self.recording = true;
    }

    /// Stop recording and flush the handler chain
    pub fn stop(&mut self) {
        if !self.recording {
            tracing::debug!("recorder already stopped, ignoring stop");
            return;
        }
        self.recording = false;
        self.handler.flush();
        tracing::debug!("recorder stopped");
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Push an already addressed event, e.g. one replayed from a file
    pub fn record(&mut self, event: Event) {
        if self.recording {
            self.handler.handle_event(event);
        }
    }

    /// Inspect one toolkit input aimed at `widget`.
    ///
    /// Returns true when the input was consumed (probe gestures) and must not
    /// reach the application.
    pub fn filter<T: WidgetTree>(&mut self, tree: &T, widget: T::Id, input: RawInput) -> bool {
        if !self.recording || !tree.is_widget_type(widget) {
            return false;
        }

        match input {
            RawInput::Key(key) => {
                // unfocused widgets only see keys propagated from the focused
                // one, which replay reproduces by itself
                if !tree.has_focus(widget) {
                    return false;
                }
                if self.config.skip_modifier_keys && key_codes::is_modifier(key.key_code) {
                    return false;
                }
                self.emit(tree, widget, Payload::Key(key));
            }
            RawInput::Mouse { payload, spontaneous } => {
                if !spontaneous {
                    return false;
                }
                if self.config.probe_enabled && is_probe_gesture(&payload) {
                    self.probe_gesture(tree, widget);
                    return true;
                }
                if payload.subtype == MouseSubtype::Move && !self.config.record_mouse_moves {
                    return false;
                }
                if is_recordable(tree, widget) {
                    self.emit(tree, widget, Payload::Mouse(payload));
                } else {
                    tracing::trace!(widget = ?widget, "mouse event outside a recordable window");
                }
            }
            RawInput::Resize(resize) => {
                if self.config.record_resizes
                    && tree.parent(widget).is_none()
                    && is_recordable(tree, widget)
                {
                    self.emit(tree, widget, Payload::Resize(resize));
                }
            }
        }
        false
    }

    /// Record a named action triggered on `widget`
    pub fn action<T: WidgetTree>(&mut self, tree: &T, widget: T::Id, action_name: &str) {
        if !self.recording {
            return;
        }
        tracing::debug!(widget = ?widget, action_name, "recording action");
        self.emit(
            tree,
            widget,
            Payload::Action(ActionPayload {
                action_name: action_name.to_string(),
            }),
        );
    }

    /// Record a value captured from `widget`
    pub fn probe<T: WidgetTree>(&mut self, tree: &T, widget: T::Id, data: ProbeData) {
        if !self.recording {
            return;
        }
        tracing::debug!(widget = ?widget, ?data, "recording probe");
        self.emit(tree, widget, Payload::Probe(ProbePayload { data }));
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    fn probe_gesture<T: WidgetTree>(&mut self, tree: &T, widget: T::Id) {
        match probe_ancestors(tree, widget) {
            Some((probed, data)) => self.probe(tree, probed, data),
            None => tracing::debug!(widget = ?widget, "probe gesture on a widget with no value"),
        }
    }

    fn emit<T: WidgetTree>(&mut self, tree: &T, widget: T::Id, payload: Payload) {
        match address_of(tree, widget) {
            Ok(target) => self.handler.handle_event(Event::new(target, payload)),
            Err(e) => {
                tracing::warn!(widget = ?widget, kind = %payload.kind(), error = %e, "skipping event");
            }
        }
    }
}

/// Left press with Alt or Ctrl held
fn is_probe_gesture(mouse: &MousePayload) -> bool {
    mouse.subtype == MouseSubtype::ButtonPress
        && mouse.button == MouseButton::Left
        && mouse.modifiers.any(Modifiers::ALT | Modifiers::CTRL)
}

/// Whether `widget` lives inside a main window or dialog and outside tool
/// bars and menus. Cyclic ancestry is never recordable.
pub fn is_recordable<T: WidgetTree>(tree: &T, widget: T::Id) -> bool {
    let mut visited = HashSet::new();
    let mut current = widget;
    loop {
        if !visited.insert(current) {
            return false;
        }
        let role = tree.role(current);
        if role.is_chrome() {
            return false;
        }
        match tree.parent(current) {
            Some(parent) => current = parent,
            None => return role.is_window(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{WidgetArena, WidgetId, WidgetSpec};
    use crate::tree::WidgetRole;
    use uirec_core::{
        CollectingSink, EventKind, KeySubtype, MouseButtons, Point, Size,
    };

    struct Fixture {
        arena: WidgetArena,
        main: WidgetId,
        edit: WidgetId,
        tool_button: WidgetId,
        popup: WidgetId,
    }

    fn fixture() -> Fixture {
        let mut arena = WidgetArena::new();
        let main = arena.add_top_level(WidgetSpec::main_window("QMainWindow").named("main"));
        let edit = arena.add_child(main, WidgetSpec::new("QLineEdit").named("name").text("abc"));
        let toolbar = arena.add_child(main, WidgetSpec::new("QToolBar").role(WidgetRole::ToolBar));
        let tool_button = arena.add_child(toolbar, WidgetSpec::new("QToolButton"));
        let popup = arena.add_top_level(WidgetSpec::new("QFrame").named("popup"));
        arena.set_focus(Some(edit));
        Fixture { arena, main, edit, tool_button, popup }
    }

    fn key(subtype: KeySubtype, key_code: u32, text: &str) -> RawInput {
        RawInput::Key(KeyPayload {
            subtype,
            key_code,
            text: text.to_string(),
            modifiers: Modifiers::default(),
        })
    }

    fn mouse(subtype: MouseSubtype, modifiers: u8, spontaneous: bool) -> RawInput {
        let button = match subtype {
            MouseSubtype::Move => MouseButton::None,
            _ => MouseButton::Left,
        };
        RawInput::Mouse {
            payload: MousePayload {
                subtype,
                position: Point::new(5, 5),
                global_position: Point::new(105, 105),
                button,
                buttons: MouseButtons::default(),
                modifiers: Modifiers(modifiers),
            },
            spontaneous,
        }
    }

    fn resize() -> RawInput {
        RawInput::Resize(ResizePayload {
            old_size: Size::new(100, 100),
            new_size: Size::new(200, 150),
        })
    }

    fn recorder() -> (EventRecorder<CollectingSink>, CollectingSink) {
        let sink = CollectingSink::new();
        let mut recorder = EventRecorder::new(sink.clone());
        recorder.start();
        (recorder, sink)
    }

    #[test]
    fn ignores_input_while_stopped() {
        let f = fixture();
        let sink = CollectingSink::new();
        let mut recorder = EventRecorder::new(sink.clone());
        recorder.filter(&f.arena, f.edit, key(KeySubtype::Press, 0x41, "a"));
        recorder.action(&f.arena, f.main, "file_open");
        assert!(sink.is_empty());
        assert!(!recorder.is_recording());
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let (mut recorder, _sink) = recorder();
        recorder.start();
        assert!(recorder.is_recording());
        recorder.stop();
        recorder.stop();
        assert!(!recorder.is_recording());
    }

    #[test]
    fn records_focused_keys_only() {
        let f = fixture();
        let (mut recorder, sink) = recorder();
        recorder.filter(&f.arena, f.edit, key(KeySubtype::Press, 0x41, "a"));
        recorder.filter(&f.arena, f.main, key(KeySubtype::Press, 0x41, "a"));
        assert_eq!(sink.kinds(), vec![EventKind::Key]);
        assert_eq!(
            sink.events()[0].target.xpath(),
            "QMainWindow[@oid='main']/QLineEdit[@oid='name']"
        );
    }

    #[test]
    fn skips_bare_modifier_keys() {
        let f = fixture();
        let (mut recorder, sink) = recorder();
        recorder.filter(&f.arena, f.edit, key(KeySubtype::Press, key_codes::SHIFT, ""));
        recorder.filter(&f.arena, f.edit, key(KeySubtype::Release, key_codes::CONTROL, ""));
        assert!(sink.is_empty());
    }

    #[test]
    fn modifier_keys_kept_when_configured() {
        let f = fixture();
        let sink = CollectingSink::new();
        let config = RecorderConfig {
            skip_modifier_keys: false,
            ..Default::default()
        };
        let mut recorder = EventRecorder::with_config(sink.clone(), config);
        recorder.start();
        recorder.filter(&f.arena, f.edit, key(KeySubtype::Press, key_codes::ALT, ""));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn drops_propagated_mouse_events() {
        let f = fixture();
        let (mut recorder, sink) = recorder();
        recorder.filter(&f.arena, f.edit, mouse(MouseSubtype::ButtonPress, 0, false));
        assert!(sink.is_empty());
        recorder.filter(&f.arena, f.edit, mouse(MouseSubtype::ButtonPress, 0, true));
        assert_eq!(sink.kinds(), vec![EventKind::Mouse]);
    }

    #[test]
    fn drops_mouse_events_outside_windows_and_on_chrome() {
        let f = fixture();
        let (mut recorder, sink) = recorder();
        recorder.filter(&f.arena, f.tool_button, mouse(MouseSubtype::ButtonPress, 0, true));
        recorder.filter(&f.arena, f.popup, mouse(MouseSubtype::Move, 0, true));
        assert!(sink.is_empty());
    }

    #[test]
    fn mouse_moves_can_be_disabled() {
        let f = fixture();
        let sink = CollectingSink::new();
        let config = RecorderConfig {
            record_mouse_moves: false,
            ..Default::default()
        };
        let mut recorder = EventRecorder::with_config(sink.clone(), config);
        recorder.start();
        recorder.filter(&f.arena, f.edit, mouse(MouseSubtype::Move, 0, true));
        recorder.filter(&f.arena, f.edit, mouse(MouseSubtype::ButtonRelease, 0, true));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn resizes_recorded_for_top_level_windows_only() {
        let f = fixture();
        let (mut recorder, sink) = recorder();
        recorder.filter(&f.arena, f.edit, resize());
        recorder.filter(&f.arena, f.popup, resize());
        recorder.filter(&f.arena, f.main, resize());
        assert_eq!(sink.kinds(), vec![EventKind::Resize]);
        assert_eq!(sink.events()[0].target.xpath(), "QMainWindow[@oid='main']");
    }

    #[test]
    fn probe_gesture_is_consumed_and_recorded() {
        let f = fixture();
        let (mut recorder, sink) = recorder();
        let consumed = recorder.filter(
            &f.arena,
            f.edit,
            mouse(MouseSubtype::ButtonPress, Modifiers::CTRL, true),
        );
        assert!(consumed);
        let events = sink.take();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].payload,
            Payload::Probe(ProbePayload {
                data: ProbeData::Text("abc".into())
            })
        );
    }

    #[test]
    fn probe_gesture_without_value_is_still_consumed() {
        let f = fixture();
        let (mut recorder, sink) = recorder();
        assert!(recorder.filter(
            &f.arena,
            f.main,
            mouse(MouseSubtype::ButtonPress, Modifiers::ALT, true)
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn probe_gesture_disabled_records_a_plain_press() {
        let f = fixture();
        let sink = CollectingSink::new();
        let config = RecorderConfig {
            probe_enabled: false,
            ..Default::default()
        };
        let mut recorder = EventRecorder::with_config(sink.clone(), config);
        recorder.start();
        let consumed = recorder.filter(
            &f.arena,
            f.edit,
            mouse(MouseSubtype::ButtonPress, Modifiers::ALT, true),
        );
        assert!(!consumed);
        assert_eq!(sink.kinds(), vec![EventKind::Mouse]);
    }

    #[test]
    fn skips_unaddressable_widgets() {
        let f = fixture();
        let (mut recorder, sink) = recorder();
        // an id from a larger tree does not exist in the fixture
        let mut other = WidgetArena::new();
        let mut ghost = other.add_top_level(WidgetSpec::new("QWidget"));
        while other.len() <= f.arena.len() {
            ghost = other.add_top_level(WidgetSpec::new("QWidget"));
        }
        recorder.action(&f.arena, ghost, "noop");
        assert!(sink.is_empty());
    }

    #[test]
    fn cyclic_hierarchy_is_not_recordable() {
        let mut arena = WidgetArena::new();
        let a = arena.add_top_level(WidgetSpec::dialog("QDialog"));
        let b = arena.add_child(a, WidgetSpec::new("QWidget"));
        arena.set_parent(a, Some(b));
        assert!(!is_recordable(&arena, b));
    }

    #[test]
    fn with_pipeline_respects_stage_flags() {
        let f = fixture();
        let sink = CollectingSink::new();
        let config = RecorderConfig {
            high_level_combining: false,
            ..Default::default()
        };
        let mut recorder = EventRecorder::with_pipeline(sink.clone(), config);
        recorder.start();
        recorder.filter(&f.arena, f.edit, key(KeySubtype::Press, 0x41, "a"));
        recorder.filter(&f.arena, f.edit, key(KeySubtype::Release, 0x41, "a"));
        recorder.stop();
        assert_eq!(sink.kinds(), vec![EventKind::Key, EventKind::Key]);
    }
}
