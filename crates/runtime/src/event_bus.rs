use crate::frame::Frame;

/// An event stamped with the frame it happened in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event<E> {
    pub frame_index: u64,
    pub kind: E,
}

/// Append-only trace of what happened between frames.
///
/// Input handlers run between frames, so events carry the index of the last
/// frame that was rendered.
#[derive(Debug)]
pub struct EventBus<E> {
    events: Vec<Event<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, frame: Frame, kind: E) {
        self.events.push(Event {
            frame_index: frame.index,
            kind,
        });
    }

    pub fn events(&self) -> &[Event<E>] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<Event<E>> {
        std::mem::take(&mut self.events)
    }
}
