//! The handler protocol shared by combiners and sinks
//!
//! Handlers form a linear decorator chain: every combiner owns exactly one
//! delegate and forwards whatever it does not hold back.

use crate::event::Event;

pub trait EventHandler {
    /// Consume one event. May emit downstream, buffer, or both.
    fn handle_event(&mut self, event: Event);

    /// Release everything buffered so no event is lost or held indefinitely.
    ///
    /// Combiners emit their own pending events first, then flush their
    /// delegate, so one call at the head drains the whole chain.
    fn flush(&mut self);
}

impl<H: EventHandler + ?Sized> EventHandler for Box<H> {
    fn handle_event(&mut self, event: Event) {
        (**self).handle_event(event)
    }

    fn flush(&mut self) {
        (**self).flush()
    }
}

impl<H: EventHandler + ?Sized> EventHandler for &mut H {
    fn handle_event(&mut self, event: Event) {
        (**self).handle_event(event)
    }

    fn flush(&mut self) {
        (**self).flush()
    }
}
