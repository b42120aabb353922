//! Utilities for reacting to runtime events inside UI layers.
use runtime::Event;

use crate::message::MessageLog;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventImpact {
    pub requires_redraw: bool,
}

impl EventImpact {
    pub const fn none() -> Self {
        Self {
            requires_redraw: false,
        }
    }

    pub const fn redraw() -> Self {
        Self {
            requires_redraw: true,
        }
    }

    pub fn combine(self, other: Self) -> Self {
        Self {
            requires_redraw: self.requires_redraw || other.requires_redraw,
        }
    }
}

pub trait EventConsumer {
    fn on_event(&mut self, event: &Event) -> EventImpact;
    fn message_log(&self) -> &MessageLog;

    /// Applies a burst of events in order; one redraw covers all of them.
    fn on_events<'a>(&mut self, events: impl IntoIterator<Item = &'a Event>) -> EventImpact
    where
        Self: Sized,
    {
        events
            .into_iter()
            .fold(EventImpact::none(), |impact, event| {
                impact.combine(self.on_event(event))
            })
    }
}
