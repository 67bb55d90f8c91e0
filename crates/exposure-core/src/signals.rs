//! Events published by the orchestrator and the observers that receive them.
//!
//! Observers are called synchronously, in registration order, at the point
//! where the orchestrator changes state. They receive a shared reference
//! and cannot reach back into the orchestrator.

use std::sync::{Arc, Mutex};

use exposure_types::{
    FadeDirection, GameOutcome, MinigameKind, Phase, Pose, ResourceDelta, SessionId, UiPanel,
    UnitId, UnitKind,
};
use serde::Serialize;

use crate::roster::MinigameResult;
use crate::selection::EntryTrigger;

/// Something observable that happened in the game.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// The phase changed.
    PhaseChanged {
        /// Previous phase.
        from: Phase,
        /// New phase.
        to: Phase,
    },
    /// A new turn began.
    TurnAdvanced {
        /// The new turn number.
        turn: u32,
    },
    /// The difficulty ramp raised the maximums.
    DifficultyRamped {
        /// Turn on which the ramp applied.
        turn: u32,
        /// New energy capacity.
        max_energy: i32,
        /// New pollution tolerance.
        max_pollution: i32,
    },
    /// Show a UI panel after `delay` seconds.
    UiEnabled {
        /// Stable panel id (see [`UiPanel::panel_id`]).
        panel_id: u8,
        /// Seconds before the panel appears.
        delay: f32,
    },
    /// Hide a UI panel.
    UiDisabled {
        /// Stable panel id.
        panel_id: u8,
    },
    /// A fade timer expired; play the fade now.
    FadeFired {
        /// Which fade.
        direction: FadeDirection,
        /// How long the fade should take.
        duration: f32,
    },
    /// The camera switched to a new target.
    CameraTarget {
        /// The new target.
        pose: Pose,
    },
    /// A unit was committed to the world.
    UnitPlaced {
        /// Registry handle.
        unit_id: UnitId,
        /// Unit kind.
        kind: UnitKind,
    },
    /// A placed unit was removed and its contribution withdrawn.
    UnitRemoved {
        /// Registry handle.
        unit_id: UnitId,
        /// Unit kind.
        kind: UnitKind,
    },
    /// Resources started animating toward the placed unit's contribution.
    SimulationStarted {
        /// The placed unit kind.
        kind: UnitKind,
        /// What it contributes.
        delta: ResourceDelta,
    },
    /// A minigame was selected and the camera is on its way.
    MinigameEntered {
        /// Selected minigame.
        kind: MinigameKind,
        /// Why it was selected.
        trigger: EntryTrigger,
    },
    /// The camera arrived and the session started.
    MinigameStarted {
        /// Session handle.
        session_id: SessionId,
        /// Minigame kind.
        kind: MinigameKind,
    },
    /// The session was dropped and the camera is heading home.
    MinigameExited {
        /// Frozen outcome of the session.
        result: MinigameResult,
    },
    /// The player has been idle long enough that the host should reset.
    ResetRequested,
    /// The game ended.
    GameOver {
        /// Won or lost.
        outcome: GameOutcome,
    },
}

impl GameEvent {
    /// Convenience constructor for [`GameEvent::UiEnabled`].
    pub const fn ui_enabled(panel: UiPanel, delay: f32) -> Self {
        Self::UiEnabled {
            panel_id: panel.panel_id(),
            delay,
        }
    }

    /// Convenience constructor for [`GameEvent::UiDisabled`].
    pub const fn ui_disabled(panel: UiPanel) -> Self {
        Self::UiDisabled {
            panel_id: panel.panel_id(),
        }
    }
}

/// Receives every [`GameEvent`] as it happens.
pub trait GameObserver: Send {
    /// Called once per event.
    fn on_event(&mut self, event: &GameEvent);
}

/// An observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl GameObserver for NoOpObserver {
    fn on_event(&mut self, _event: &GameEvent) {}
}

/// An observer that appends every event to a shared list.
///
/// Clone the recorder before registering it to keep a handle for reading.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<GameEvent>>>,
}

impl EventRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<GameEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Recorded events matching `predicate`.
    pub fn filtered(&self, predicate: impl Fn(&GameEvent) -> bool) -> Vec<GameEvent> {
        self.events().into_iter().filter(|event| predicate(event)).collect()
    }
}

impl GameObserver for EventRecorder {
    fn on_event(&mut self, event: &GameEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn recorder_clones_share_storage() {
        let recorder = EventRecorder::new();
        let mut registered = recorder.clone();
        registered.on_event(&GameEvent::TurnAdvanced { turn: 2 });
        registered.on_event(&GameEvent::ResetRequested);
        assert_eq!(recorder.events().len(), 2);
        assert_eq!(
            recorder.filtered(|e| matches!(e, GameEvent::ResetRequested)),
            vec![GameEvent::ResetRequested]
        );
    }

    #[test]
    fn ui_helpers_use_panel_ids() {
        assert_eq!(
            GameEvent::ui_enabled(UiPanel::MineGame, 2.0),
            GameEvent::UiEnabled {
                panel_id: 6,
                delay: 2.0
            }
        );
        assert_eq!(
            GameEvent::ui_disabled(UiPanel::Turn),
            GameEvent::UiDisabled { panel_id: 1 }
        );
    }

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_value(GameEvent::TurnAdvanced { turn: 3 }).unwrap();
        assert_eq!(json["event"], "turn_advanced");
        assert_eq!(json["turn"], 3);
    }
}
