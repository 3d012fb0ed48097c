/*!
Collision/trigger bookkeeping: derives enter/stay/exit semantics from the
engine's raw begin/end event stream, and detects the two gameplay-relevant
overlaps (power-up pickup, hole capture).

Model
- Per entity, two contact sets ("currently touching" maps keyed by the other
  entity id, valued with the step the contact entered): one for solid
  collisions, one for sensor/trigger contacts. A pair lives in exactly one
  channel — the trigger channel iff either side's collider is a sensor.
- An entity present in a set has had a `begin` observed with no matching
  `end` since. Entries are cleared one by one as `end` events arrive or as
  an entity is unregistered (the end-of-frame sweep for released entities).

Failure semantics
- Events referencing entities the tracker does not know are silently
  dropped; the engine may emit events for colliders the game layer has
  already released.
*/

use std::collections::{HashMap, HashSet};

use sim::settings::HOLE_CAPTURE_SPEED;

use crate::entity::{EntityId, EntityKind};
use crate::events::{EventSink, GameEvent};
use crate::powerup::PowerUpKind;

/// One engine contact event mapped to entity ids and classified by channel.
#[derive(Clone, Copy, Debug)]
pub struct PairEvent {
    pub a: EntityId,
    pub b: EntityId,
    /// `true` when either side's collider is a sensor.
    pub trigger: bool,
    /// `true` for contact begin, `false` for contact end.
    pub started: bool,
}

/// Gameplay detection produced while draining contacts, for the shot state
/// machine to act on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ContactOutcome {
    PowerUpCollected {
        entity: EntityId,
        kind: PowerUpKind,
    },
    HoleReached {
        hole: EntityId,
    },
}

#[derive(Debug, Default)]
struct ContactChannels {
    solid: HashMap<EntityId, u64>,
    trigger: HashMap<EntityId, u64>,
}

impl ContactChannels {
    fn channel_mut(&mut self, trigger: bool) -> &mut HashMap<EntityId, u64> {
        if trigger { &mut self.trigger } else { &mut self.solid }
    }
}

/// Tracks "currently touching" sets for every registered entity and emits
/// enter/stay/exit events plus pickup/capture detections.
#[derive(Debug, Default)]
pub struct ContactTracker {
    /// Simulation step counter; the entered-at timestamp source.
    step: u64,
    kinds: HashMap<EntityId, EntityKind>,
    roller: Option<EntityId>,
    contacts: HashMap<EntityId, ContactChannels>,
    /// Power-ups already granted; guarantees at-most-once collection even if
    /// multiple begin events arrive in the same step.
    collected: HashSet<EntityId>,
    /// Holes already completed.
    completed: HashSet<EntityId>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `entity` known to the tracker. Events for unknown entities are
    /// dropped, so registration gates all bookkeeping.
    pub fn register(&mut self, entity: EntityId, kind: EntityKind) {
        if kind.is_roller() {
            self.roller = Some(entity);
        }
        self.kinds.insert(entity, kind);
    }

    /// Forget `entity`, clearing its contact entries on both sides and
    /// firing exits for any pair still touching.
    pub fn unregister(&mut self, entity: EntityId, sink: &mut dyn EventSink) {
        self.kinds.remove(&entity);
        if self.roller == Some(entity) {
            self.roller = None;
        }
        let Some(channels) = self.contacts.remove(&entity) else {
            return;
        };
        for (other, trigger) in channels
            .solid
            .keys()
            .map(|&o| (o, false))
            .chain(channels.trigger.keys().map(|&o| (o, true)))
        {
            if let Some(other_channels) = self.contacts.get_mut(&other) {
                other_channels.channel_mut(trigger).remove(&entity);
            }
            sink.emit(GameEvent::ContactExit {
                a: entity,
                b: other,
                trigger,
            });
        }
    }

    pub fn is_collected(&self, entity: EntityId) -> bool {
        self.collected.contains(&entity)
    }

    pub fn is_completed(&self, hole: EntityId) -> bool {
        self.completed.contains(&hole)
    }

    /// Drain one step's worth of contact events.
    ///
    /// `roller_horizontal_speed` is the roller's current planar speed, read
    /// from the adapter by the caller; the hole-capture check compares it
    /// against [`HOLE_CAPTURE_SPEED`]. The capture check runs on trigger
    /// enter and on every stay step, so a roller that enters the hole
    /// sensor fast and settles inside it is still captured; the completed
    /// set keeps the detection exactly-once.
    pub fn process(
        &mut self,
        events: &[PairEvent],
        roller_horizontal_speed: f32,
        sink: &mut dyn EventSink,
    ) -> Vec<ContactOutcome> {
        self.step += 1;
        let mut outcomes = Vec::new();

        for event in events {
            if !self.kinds.contains_key(&event.a) || !self.kinds.contains_key(&event.b) {
                log::debug!(
                    "dropping contact event for untracked pair ({}, {})",
                    event.a,
                    event.b
                );
                continue;
            }

            if event.started {
                self.begin(event, roller_horizontal_speed, sink, &mut outcomes);
            } else {
                self.end(event, sink);
            }
        }

        self.stay_sweep(roller_horizontal_speed, sink, &mut outcomes);
        outcomes
    }

    /// Transition `NotTouching -> Touching`; duplicate begins are ignored.
    fn begin(
        &mut self,
        event: &PairEvent,
        roller_horizontal_speed: f32,
        sink: &mut dyn EventSink,
        outcomes: &mut Vec<ContactOutcome>,
    ) {
        let already_touching = self
            .contacts
            .get(&event.a)
            .map(|c| {
                if event.trigger {
                    c.trigger.contains_key(&event.b)
                } else {
                    c.solid.contains_key(&event.b)
                }
            })
            .unwrap_or(false);
        if already_touching {
            return;
        }

        let step = self.step;
        self.contacts
            .entry(event.a)
            .or_default()
            .channel_mut(event.trigger)
            .insert(event.b, step);
        self.contacts
            .entry(event.b)
            .or_default()
            .channel_mut(event.trigger)
            .insert(event.a, step);

        sink.emit(GameEvent::ContactEnter {
            a: event.a,
            b: event.b,
            trigger: event.trigger,
        });

        if event.trigger {
            self.detect(event.a, event.b, roller_horizontal_speed, sink, outcomes);
        }
    }

    /// Transition `Touching -> NotTouching`; ends without a matching begin
    /// are ignored.
    fn end(&mut self, event: &PairEvent, sink: &mut dyn EventSink) {
        let removed = self
            .contacts
            .get_mut(&event.a)
            .map(|c| c.channel_mut(event.trigger).remove(&event.b).is_some())
            .unwrap_or(false);
        if let Some(channels) = self.contacts.get_mut(&event.b) {
            channels.channel_mut(event.trigger).remove(&event.a);
        }
        if removed {
            sink.emit(GameEvent::ContactExit {
                a: event.a,
                b: event.b,
                trigger: event.trigger,
            });
        }
    }

    /// Fire `ContactStay` once per step for every pair that was already
    /// touching before this step, and re-run the hole-capture check.
    fn stay_sweep(
        &mut self,
        roller_horizontal_speed: f32,
        sink: &mut dyn EventSink,
        outcomes: &mut Vec<ContactOutcome>,
    ) {
        let mut staying: Vec<(EntityId, EntityId, bool)> = Vec::new();
        for (&a, channels) in &self.contacts {
            for (&b, &entered) in &channels.solid {
                if a < b && entered < self.step {
                    staying.push((a, b, false));
                }
            }
            for (&b, &entered) in &channels.trigger {
                if a < b && entered < self.step {
                    staying.push((a, b, true));
                }
            }
        }
        // Deterministic emission order regardless of map iteration order.
        staying.sort_unstable();

        for (a, b, trigger) in staying {
            sink.emit(GameEvent::ContactStay { a, b, trigger });
            if trigger {
                self.detect(a, b, roller_horizontal_speed, sink, outcomes);
            }
        }
    }

    /// Trigger-channel gameplay detection for the (a, b) pair.
    fn detect(
        &mut self,
        a: EntityId,
        b: EntityId,
        roller_horizontal_speed: f32,
        sink: &mut dyn EventSink,
        outcomes: &mut Vec<ContactOutcome>,
    ) {
        let Some(roller) = self.roller else {
            return;
        };
        let other = if a == roller {
            b
        } else if b == roller {
            a
        } else {
            return;
        };

        match self.kinds.get(&other) {
            Some(EntityKind::PowerUp(kind)) => {
                if self.collected.insert(other) {
                    let kind = *kind;
                    sink.emit(GameEvent::PowerUpCollected {
                        entity: other,
                        kind,
                    });
                    outcomes.push(ContactOutcome::PowerUpCollected {
                        entity: other,
                        kind,
                    });
                }
            }
            Some(EntityKind::Hole) => {
                if roller_horizontal_speed < HOLE_CAPTURE_SPEED && !self.completed.contains(&other)
                {
                    self.completed.insert(other);
                    sink.emit(GameEvent::HoleCompleted { hole: other });
                    outcomes.push(ContactOutcome::HoleReached { hole: other });
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventQueue;

    const ROLLER: EntityId = 1;
    const WALL: EntityId = 2;
    const PICKUP: EntityId = 3;
    const HOLE: EntityId = 4;

    fn tracker() -> ContactTracker {
        let mut t = ContactTracker::new();
        t.register(ROLLER, EntityKind::Roller);
        t.register(WALL, EntityKind::Wall);
        t.register(PICKUP, EntityKind::PowerUp(PowerUpKind::Energy { amount: 2 }));
        t.register(HOLE, EntityKind::Hole);
        t
    }

    fn begin(a: EntityId, b: EntityId, trigger: bool) -> PairEvent {
        PairEvent {
            a,
            b,
            trigger,
            started: true,
        }
    }

    fn end(a: EntityId, b: EntityId, trigger: bool) -> PairEvent {
        PairEvent {
            a,
            b,
            trigger,
            started: false,
        }
    }

    fn count<F: Fn(&GameEvent) -> bool>(events: &[GameEvent], pred: F) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }

    #[test]
    fn duplicate_begin_fires_enter_once_and_end_fires_exit_once() {
        let mut t = tracker();
        let mut sink = EventQueue::new();

        t.process(
            &[
                begin(ROLLER, WALL, false),
                begin(ROLLER, WALL, false),
                end(ROLLER, WALL, false),
            ],
            0.0,
            &mut sink,
        );

        let events = sink.drain();
        assert_eq!(
            count(&events, |e| matches!(e, GameEvent::ContactEnter { .. })),
            1
        );
        assert_eq!(
            count(&events, |e| matches!(e, GameEvent::ContactExit { .. })),
            1
        );
    }

    #[test]
    fn stay_fires_once_per_step_while_touching() {
        let mut t = tracker();
        let mut sink = EventQueue::new();

        t.process(&[begin(ROLLER, WALL, false)], 0.0, &mut sink);
        // Entered this step: no stay yet.
        assert_eq!(
            count(&sink.drain(), |e| matches!(e, GameEvent::ContactStay { .. })),
            0
        );

        t.process(&[], 0.0, &mut sink);
        t.process(&[], 0.0, &mut sink);
        let events = sink.drain();
        assert_eq!(
            count(&events, |e| matches!(e, GameEvent::ContactStay { .. })),
            2
        );

        t.process(&[end(ROLLER, WALL, false)], 0.0, &mut sink);
        t.process(&[], 0.0, &mut sink);
        assert_eq!(
            count(&sink.drain(), |e| matches!(e, GameEvent::ContactStay { .. })),
            0
        );
    }

    #[test]
    fn power_up_is_collected_exactly_once() {
        let mut t = tracker();
        let mut sink = EventQueue::new();

        // Two begins in the same logical window, no intervening end.
        let outcomes = t.process(
            &[begin(ROLLER, PICKUP, true), begin(ROLLER, PICKUP, true)],
            0.0,
            &mut sink,
        );
        assert_eq!(outcomes.len(), 1);
        assert!(t.is_collected(PICKUP));

        // Later re-entry still grants nothing.
        let outcomes = t.process(
            &[end(ROLLER, PICKUP, true), begin(ROLLER, PICKUP, true)],
            0.0,
            &mut sink,
        );
        assert!(outcomes.is_empty());

        let events = sink.drain();
        assert_eq!(
            count(&events, |e| matches!(e, GameEvent::PowerUpCollected { .. })),
            1
        );
    }

    #[test]
    fn power_up_needs_the_trigger_channel() {
        let mut t = tracker();
        let mut sink = EventQueue::new();
        let outcomes = t.process(&[begin(ROLLER, PICKUP, false)], 0.0, &mut sink);
        assert!(outcomes.is_empty());
        assert!(!t.is_collected(PICKUP));
    }

    #[test]
    fn fast_roller_skips_the_hole_then_settles_in() {
        let mut t = tracker();
        let mut sink = EventQueue::new();

        // Enters the hole sensor above the capture speed: no detection.
        let outcomes = t.process(&[begin(ROLLER, HOLE, true)], 5.0, &mut sink);
        assert!(outcomes.is_empty());
        assert!(!t.is_completed(HOLE));

        // Still overlapping next step, now slow enough: captured once.
        let outcomes = t.process(&[], 0.5, &mut sink);
        assert_eq!(outcomes, vec![ContactOutcome::HoleReached { hole: HOLE }]);

        // Further steps detect nothing new.
        let outcomes = t.process(&[], 0.0, &mut sink);
        assert!(outcomes.is_empty());

        let events = sink.drain();
        assert_eq!(
            count(&events, |e| matches!(e, GameEvent::HoleCompleted { .. })),
            1
        );
    }

    #[test]
    fn unknown_entities_are_silently_dropped() {
        let mut t = tracker();
        let mut sink = EventQueue::new();
        let outcomes = t.process(&[begin(ROLLER, 999, true)], 0.0, &mut sink);
        assert!(outcomes.is_empty());
        assert!(sink.drain().is_empty());
    }

    #[test]
    fn unregister_fires_exit_for_live_contacts() {
        let mut t = tracker();
        let mut sink = EventQueue::new();

        t.process(&[begin(ROLLER, WALL, false)], 0.0, &mut sink);
        sink.drain();

        t.unregister(WALL, &mut sink);
        let events = sink.drain();
        assert_eq!(
            count(&events, |e| matches!(e, GameEvent::ContactExit { .. })),
            1
        );

        // The roller's side was cleared too: no stale stay events.
        t.process(&[], 0.0, &mut sink);
        assert_eq!(
            count(&sink.drain(), |e| matches!(e, GameEvent::ContactStay { .. })),
            0
        );
    }
}
