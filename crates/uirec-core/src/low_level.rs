//! Low-level combiner - coalesces mouse-move and resize storms
//!
//! Holds at most one pending event. A burst of moves (or resizes) on one target
//! collapses into the first event of the burst, carrying the latest
//! coordinates (or size).

use crate::event::{Event, MousePayload, MouseSubtype, Payload, Point};
use crate::handler::EventHandler;

/// What to do with an incoming event given the pending slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LowLevelStep {
    /// Emit the pending event, then forward the incoming one
    FlushAndForward,
    /// Nothing pending; keep the incoming event back
    Hold,
    /// Fold the incoming event into the pending one
    Merge,
    /// Pass straight through
    Forward,
}

pub struct LowLevelCombiner<H> {
    delegate: H,
    previous_event: Option<Event>,
}

impl<H: EventHandler> LowLevelCombiner<H> {
    pub fn new(delegate: H) -> Self {
        Self {
            delegate,
            previous_event: None,
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
        self.previous_event.as_ref()
    }

    /// True when the pending event can no longer absorb `event`.
    pub fn needs_flush(&self, event: &Event) -> bool {
        let Some(previous) = &self.previous_event else {
            return false;
        };
        if previous.target != event.target {
            return true;
        }
        match (&previous.payload, &event.payload) {
            (Payload::Mouse(held), Payload::Mouse(next)) if next.subtype == MouseSubtype::Move => {
                !same_move_state(held, next) || translated(held, next).is_none()
            }
            (Payload::Resize(_), Payload::Resize(_)) => false,
            _ => true,
        }
    }

    fn step(&self, event: &Event) -> LowLevelStep {
        if self.needs_flush(event) {
            return LowLevelStep::FlushAndForward;
        }
        let pending = self.previous_event.is_some();
        match &event.payload {
            Payload::Mouse(m) if m.subtype == MouseSubtype::Move => {
                if pending { LowLevelStep::Merge } else { LowLevelStep::Hold }
            }
            Payload::Resize(_) => {
                if pending { LowLevelStep::Merge } else { LowLevelStep::Hold }
            }
            _ => LowLevelStep::Forward,
        }
    }

    fn merge(&mut self, event: Event) {
        if let Some(previous) = self.previous_event.as_mut() {
            match (&mut previous.payload, &event.payload) {
                (Payload::Mouse(held), Payload::Mouse(next)) => {
                    if let Some((position, global_position)) = translated(held, next) {
                        held.position = position;
                        held.global_position = global_position;
                        return;
                    }
                }
                (Payload::Resize(held), Payload::Resize(next)) => {
                    held.new_size = next.new_size;
                    return;
                }
                _ => {}
            }
        }
        self.emit_pending();
        self.delegate.handle_event(event);
    }

    fn emit_pending(&mut self) {
        if let Some(previous) = self.previous_event.take() {
            self.delegate.handle_event(previous);
        }
    }
}

/// Positions of `held` moved by the global distance to `next`; `None` on overflow
fn translated(held: &MousePayload, next: &MousePayload) -> Option<(Point, Point)> {
    let delta = next.global_position.checked_sub(held.global_position)?;
    Some((
        held.position.checked_add(delta)?,
        held.global_position.checked_add(delta)?,
    ))
}

/// Moves only merge while buttons and modifiers stay the same (hover vs. drag).
fn same_move_state(held: &MousePayload, next: &MousePayload) -> bool {
    held.subtype == next.subtype
        && held.button == next.button
        && held.buttons == next.buttons
        && held.modifiers == next.modifiers
}

impl<H: EventHandler> EventHandler for LowLevelCombiner<H> {
    fn handle_event(&mut self, event: Event) {
        let step = self.step(&event);
        tracing::trace!(kind = %event.kind(), ?step, "low-level combiner");

        match step {
            LowLevelStep::FlushAndForward => {
                self.emit_pending();
                self.delegate.handle_event(event);
            }
            LowLevelStep::Hold => self.previous_event = Some(event),
            LowLevelStep::Merge => self.merge(event),
            LowLevelStep::Forward => self.delegate.handle_event(event),
        }
    }

    fn flush(&mut self) {
        self.emit_pending();
        self.delegate.flush();
    }
}
