//! High-level combiner - reduces press/release digraphs into Type and Click
//!
//! This is a tiny shift-reduce parser over the event stream. A press is
//! shifted onto the run stack, its matching release reduces the pair into a
//! synthesized event, and anything that breaks the grammar flushes the stack.
//!
//! | top of stack        | incoming                  | step              |
//! |---------------------|---------------------------|-------------------|
//! | empty               | key press                 | shift             |
//! | empty               | mouse button press        | shift             |
//! | empty               | anything else             | forward           |
//! | key press           | key release               | reduce to Type    |
//! | Type                | key press                 | shift             |
//! | mouse press         | mouse release             | reduce to Click   |
//! | Click               | double click, same button | shift             |
//! | Click               | mouse button press        | emit, then shift  |
//! | anything            | anything else / new target| flush and forward |

use crate::event::{
    ClickPayload, Event, KeySubtype, MouseButton, MousePayload, MouseSubtype, Payload,
    TypePayload,
};
use crate::handler::EventHandler;

/// Maximum depth of the run stack: one synthesized run plus one pending press
pub const MAX_RUN_DEPTH: usize = 2;

/// Pending events of the high-level combiner, pushed and popped at the tail
#[derive(Debug, Default)]
pub struct RunStack {
    events: Vec<Event>,
}

impl RunStack {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(MAX_RUN_DEPTH),
        }
    }

    pub fn push(&mut self, event: Event) {
        debug_assert!(self.events.len() < MAX_RUN_DEPTH, "run stack overflow");
        self.events.push(event);
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop()
    }

    pub fn top(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Event> {
        self.events.last_mut()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove every pending event, bottom first
    pub fn drain(&mut self) -> std::vec::Drain<'_, Event> {
        self.events.drain(..)
    }
}

/// Grammar symbol on top of the run stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Top {
    Empty,
    Key(KeySubtype),
    Type,
    Mouse(MouseSubtype),
    Click(MouseButton),
    Other,
}

impl Top {
    fn of(event: Option<&Event>) -> Self {
        match event.map(|e| &e.payload) {
            None => Top::Empty,
            Some(Payload::Key(k)) => Top::Key(k.subtype),
            Some(Payload::Type(_)) => Top::Type,
            Some(Payload::Mouse(m)) => Top::Mouse(m.subtype),
            Some(Payload::Click(c)) => Top::Click(c.button),
            Some(_) => Top::Other,
        }
    }
}

/// Grammar symbol of the incoming event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Incoming {
    Key(KeySubtype),
    Mouse(MouseSubtype, MouseButton),
    Other,
}

impl Incoming {
    fn of(event: &Event) -> Self {
        match &event.payload {
            Payload::Key(k) => Incoming::Key(k.subtype),
            Payload::Mouse(m) => Incoming::Mouse(m.subtype, m.button),
            _ => Incoming::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HighLevelStep {
    FlushAndForward,
    Shift,
    ReduceKey,
    ReduceMouse,
    /// Emit the finished run, then open a new one with the incoming press
    Restart,
    Forward,
}

/// The digraph table. Target continuity is checked by the caller.
fn transition(top: Top, incoming: Incoming) -> HighLevelStep {
    use HighLevelStep::*;

    match (top, incoming) {
        (Top::Empty, Incoming::Key(KeySubtype::Press)) => Shift,
        (Top::Empty, Incoming::Mouse(MouseSubtype::ButtonPress, _)) => Shift,
        (Top::Empty, _) => Forward,

        (Top::Key(KeySubtype::Press), Incoming::Key(KeySubtype::Release)) => ReduceKey,
        (Top::Type, Incoming::Key(KeySubtype::Press)) => Shift,

        (Top::Mouse(held), Incoming::Mouse(MouseSubtype::ButtonRelease, _)) if held.is_press() => {
            ReduceMouse
        }
        (Top::Click(held), Incoming::Mouse(MouseSubtype::ButtonDblClick, button)) if button == held => {
            Shift
        }
        (Top::Click(_), Incoming::Mouse(MouseSubtype::ButtonPress, _)) => Restart,

        _ => FlushAndForward,
    }
}

pub struct HighLevelCombiner<H> {
    delegate: H,
    previous_events: RunStack,
}

impl<H: EventHandler> HighLevelCombiner<H> {
    pub fn new(delegate: H) -> Self {
        Self {
            delegate,
            previous_events: RunStack::new(),
        }
    }

    pub fn delegate(&self) -> &H {
        &self.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut H {
        &mut self.delegate
    }

    pub fn into_inner(self) -> H {
        self.delegate
    }

    pub fn previous_event(&self) -> Option<&Event> {
        self.previous_events.top()
    }

    pub fn pending(&self) -> usize {
        self.previous_events.len()
    }

    fn step(&self, event: &Event) -> HighLevelStep {
        let top = self.previous_events.top();
        if top.is_some_and(|previous| previous.target != event.target) {
            return HighLevelStep::FlushAndForward;
        }
        transition(Top::of(top), Incoming::of(event))
    }

    /// True when `event` breaks the run being built.
    pub fn needs_flush(&self, event: &Event) -> bool {
        !self.previous_events.is_empty() && self.step(event) == HighLevelStep::FlushAndForward
    }

    /// Shift or reduce a key event. Hands the event back if it does not fit.
    pub fn try_combine_key_event(&mut self, event: Event) -> Option<Event> {
        if !matches!(event.payload, Payload::Key(_)) {
            return Some(event);
        }
        match self.step(&event) {
            HighLevelStep::Shift => {
                self.previous_events.push(event);
                None
            }
            HighLevelStep::ReduceKey => {
                self.reduce_key(event);
                None
            }
            _ => Some(event),
        }
    }

    /// Shift or reduce a mouse event. Hands the event back if it does not fit.
    pub fn try_combine_mouse_event(&mut self, event: Event) -> Option<Event> {
        if !matches!(event.payload, Payload::Mouse(_)) {
            return Some(event);
        }
        match self.step(&event) {
            HighLevelStep::Shift => {
                self.previous_events.push(event);
                None
            }
            HighLevelStep::ReduceMouse => {
                self.reduce_mouse(event);
                None
            }
            HighLevelStep::Restart => {
                self.emit_pending();
                self.previous_events.push(event);
                None
            }
            _ => Some(event),
        }
    }

    fn reduce_key(&mut self, release: Event) {
        self.previous_events.pop();
        let Payload::Key(key) = release.payload else {
            return;
        };

        if let Some(Payload::Type(run)) = self.previous_events.top_mut().map(|e| &mut e.payload) {
            run.text.push_str(&key.text);
            return;
        }
        self.previous_events.push(Event::new(
            release.target,
            Payload::Type(TypePayload { text: key.text }),
        ));
    }

    fn reduce_mouse(&mut self, release: Event) {
        let press = match self.previous_events.pop() {
            Some(Event { payload: Payload::Mouse(press), .. }) => press,
            other => {
                if let Some(other) = other {
                    self.previous_events.push(other);
                }
                self.delegate.handle_event(release);
                return;
            }
        };

        if let Some(Payload::Click(click)) = self.previous_events.top_mut().map(|e| &mut e.payload) {
            click.count += 1;
            return;
        }
        self.previous_events.push(Event::new(release.target, click_from(&press)));
    }

    fn emit_pending(&mut self) {
        for event in self.previous_events.drain() {
            self.delegate.handle_event(event);
        }
    }
}

fn click_from(press: &MousePayload) -> Payload {
    Payload::Click(ClickPayload::from_press(press))
}

impl<H: EventHandler> EventHandler for HighLevelCombiner<H> {
    fn handle_event(&mut self, event: Event) {
        if self.needs_flush(&event) {
            tracing::trace!(kind = %event.kind(), pending = self.pending(), "high-level combiner: flush");
            self.emit_pending();
            self.delegate.handle_event(event);
            return;
        }

        let Some(event) = self.try_combine_key_event(event) else {
            tracing::trace!(pending = self.pending(), "high-level combiner: key combined");
            return;
        };
        let Some(event) = self.try_combine_mouse_event(event) else {
            tracing::trace!(pending = self.pending(), "high-level combiner: mouse combined");
            return;
        };

        tracing::trace!(kind = %event.kind(), "high-level combiner: forward");
        self.delegate.handle_event(event);
    }

    fn flush(&mut self) {
        self.emit_pending();
        self.delegate.flush();
    }
}
