//! Typed game events and the listener port.
//!
//! The shot state machine and contact tracker emit events through an
//! [`EventSink`] injected by the caller, rather than through field-assigned
//! callback closures. [`EventQueue`] collects events for a frame-loop
//! consumer to drain; [`EventFanout`] broadcasts to multiple subscribers.

use std::collections::VecDeque;

use sim::{SpinVector, Vec3};

use crate::entity::EntityId;
use crate::powerup::PowerUpKind;
use crate::roller::ShotState;

/// Discrete events produced for rendering/UI collaborators.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameEvent {
    ShotStateChanged {
        state: ShotState,
    },
    /// Bar fill in [0, 1] and the resulting shot power.
    PowerMeterUpdated {
        value: f32,
        power: f32,
    },
    SpinUpdated {
        spin: SpinVector,
    },
    EnergyChanged {
        energy: u32,
    },
    /// A mid-flight bounce was applied at this position.
    Bounce {
        position: Vec3,
    },
    PowerUpCollected {
        entity: EntityId,
        kind: PowerUpKind,
    },
    PowerUpActivated {
        kind: PowerUpKind,
    },
    PowerUpDeactivated {
        kind: PowerUpKind,
    },
    HoleCompleted {
        hole: EntityId,
    },
    HoleAnimationStarted,
    HoleAnimationCompleted,
    /// Solid or trigger contact lifecycle, for surface/impact feedback.
    ContactEnter {
        a: EntityId,
        b: EntityId,
        trigger: bool,
    },
    ContactStay {
        a: EntityId,
        b: EntityId,
        trigger: bool,
    },
    ContactExit {
        a: EntityId,
        b: EntityId,
        trigger: bool,
    },
}

/// Injected listener port for game events.
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

/// Queue-backed sink: collects events for the frame loop to drain.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return all queued events in emission order.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for EventQueue {
    fn emit(&mut self, event: GameEvent) {
        self.events.push_back(event);
    }
}

/// Broadcast sink: forwards every event to all registered subscribers.
#[derive(Default)]
pub struct EventFanout {
    sinks: Vec<Box<dyn EventSink>>,
}

impl EventFanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }
}

impl EventSink for EventFanout {
    fn emit(&mut self, event: GameEvent) {
        for sink in &mut self.sinks {
            sink.emit(event);
        }
    }
}
