//! Enumeration types shared by every Exposure crate.
//!
//! Numeric identifiers (`type_index`, `id`, `panel_id`) are part of the
//! contract with the presentation layer and must stay stable.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Turn phases
// ---------------------------------------------------------------------------

/// One discrete mode of the turn orchestrator.
///
/// Exactly one phase is active at a time. `GameOver` is terminal: no command
/// or tick ever leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// A unit is held and follows the cursor, waiting to be committed.
    Placing,
    /// The placement UI is open but no unit is held.
    AwaitingInput,
    /// Resources animate toward the values contributed by the placed unit.
    Simulating,
    /// The camera travels to a minigame; the session has not started yet.
    EnteringMinigame,
    /// A minigame session is running and receives input.
    InMinigame,
    /// The camera travels back from a minigame; the turn advances on arrival.
    ExitingMinigame,
    /// The game has ended; see [`GameOutcome`].
    GameOver,
}

impl Phase {
    /// Whether the phase belongs to a minigame interlude (entering, running,
    /// or leaving).
    pub const fn is_minigame(self) -> bool {
        matches!(
            self,
            Self::EnteringMinigame | Self::InMinigame | Self::ExitingMinigame
        )
    }

    /// Whether the player may spawn, drag, or commit units in this phase.
    pub const fn accepts_placement(self) -> bool {
        matches!(self, Self::Placing | Self::AwaitingInput)
    }
}

impl core::fmt::Display for Phase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Placing => "placing",
            Self::AwaitingInput => "awaiting_input",
            Self::Simulating => "simulating",
            Self::EnteringMinigame => "entering_minigame",
            Self::InMinigame => "in_minigame",
            Self::ExitingMinigame => "exiting_minigame",
            Self::GameOver => "game_over",
        };
        f.write_str(name)
    }
}

/// Terminal result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    /// The player met the win condition.
    Won,
    /// The player did not meet the win condition.
    Lost,
}

impl GameOutcome {
    /// Build an outcome from the boolean used by `end_game(won)`.
    pub const fn from_won(won: bool) -> Self {
        if won { Self::Won } else { Self::Lost }
    }
}

// ---------------------------------------------------------------------------
// Units and minigames
// ---------------------------------------------------------------------------

/// A production unit the player can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// High output, moderate pollution. Type index 1.
    NuclearReactor,
    /// Low output, clean. Type index 2.
    Windmill,
    /// High output, heavy pollution. Type index 3.
    OilRig,
}

impl UnitKind {
    /// Every unit kind in type-index order.
    pub const ALL: [Self; 3] = [Self::NuclearReactor, Self::Windmill, Self::OilRig];

    /// Stable numeric type index (1-based) shared with the presentation layer.
    pub const fn type_index(self) -> u8 {
        match self {
            Self::NuclearReactor => 1,
            Self::Windmill => 2,
            Self::OilRig => 3,
        }
    }

    /// Resolve a type index back to a unit kind.
    pub const fn from_type_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Self::NuclearReactor),
            2 => Some(Self::Windmill),
            3 => Some(Self::OilRig),
            _ => None,
        }
    }

    /// The minigame associated with this unit's fuel or energy source.
    pub const fn minigame(self) -> MinigameKind {
        match self {
            Self::NuclearReactor => MinigameKind::Mine,
            Self::Windmill => MinigameKind::Solar,
            Self::OilRig => MinigameKind::Drill,
        }
    }
}

/// A minigame variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinigameKind {
    /// Uranium mine cart catcher. Id 1.
    Mine,
    /// Solar mirror/beam puzzle. Id 2.
    Solar,
    /// Oil drilling game. Id 3.
    Drill,
}

impl MinigameKind {
    /// Every minigame kind in id order.
    pub const ALL: [Self; 3] = [Self::Mine, Self::Solar, Self::Drill];

    /// Stable numeric id (0 is reserved for "no minigame").
    pub const fn id(self) -> u8 {
        match self {
            Self::Mine => 1,
            Self::Solar => 2,
            Self::Drill => 3,
        }
    }

    /// Resolve a numeric id; `0` and unknown ids map to `None`.
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::Mine),
            2 => Some(Self::Solar),
            3 => Some(Self::Drill),
            _ => None,
        }
    }

    /// Whether this kind takes part in the mine/drill rotation.
    pub const fn is_rotation(self) -> bool {
        matches!(self, Self::Mine | Self::Drill)
    }

    /// The other member of the mine/drill rotation, if this kind is one.
    pub const fn rotation_partner(self) -> Option<Self> {
        match self {
            Self::Mine => Some(Self::Drill),
            Self::Drill => Some(Self::Mine),
            Self::Solar => None,
        }
    }

    /// The UI panel that hosts this minigame.
    pub const fn panel(self) -> UiPanel {
        match self {
            Self::Mine => UiPanel::MineGame,
            Self::Solar => UiPanel::SolarGame,
            Self::Drill => UiPanel::DrillGame,
        }
    }
}

impl core::fmt::Display for MinigameKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Mine => "mine",
            Self::Solar => "solar",
            Self::Drill => "drill",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Presentation contract
// ---------------------------------------------------------------------------

/// Direction of a screen fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FadeDirection {
    /// Fade from black to the scene.
    In,
    /// Fade from the scene to black.
    Out,
}

/// UI panels the orchestrator toggles. The presentation layer owns the
/// mapping from [`UiPanel::panel_id`] to a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UiPanel {
    /// Unit picker shown while placing.
    Placement,
    /// Turn counter.
    Turn,
    /// Energy and pollution bars.
    Resources,
    /// Controls shown while a simulation runs.
    Simulation,
    /// Optional minigame invitation.
    MinigameMessage,
    /// Confirmation prompt for removing a placed unit.
    RemovePrompt,
    /// Mine cart minigame HUD.
    MineGame,
    /// Solar puzzle minigame HUD.
    SolarGame,
    /// Drill minigame HUD.
    DrillGame,
    /// End-of-game screen.
    GameOver,
}

impl UiPanel {
    /// Stable numeric panel identifier.
    pub const fn panel_id(self) -> u8 {
        match self {
            Self::Placement => 0,
            Self::Turn => 1,
            Self::Resources => 2,
            Self::Simulation => 3,
            Self::MinigameMessage => 4,
            Self::RemovePrompt => 5,
            Self::MineGame => 6,
            Self::SolarGame => 7,
            Self::DrillGame => 8,
            Self::GameOver => 9,
        }
    }
}

/// Who currently receives discrete player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputTarget {
    /// Clicks drive unit placement and prompts.
    Placement,
    /// Clicks only matter for the tagged message entity.
    Simulation,
    /// Input is forwarded to the running minigame session.
    Minigame(MinigameKind),
    /// Input is ignored (camera travelling, game over).
    Nobody,
}

/// Tag carried by clickable prompt entities in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// The optional-minigame message box.
    MinigameMessage,
    /// The "remove this unit" confirmation box.
    RemoveConfirm,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_type_index_roundtrip() {
        for kind in UnitKind::ALL {
            assert_eq!(UnitKind::from_type_index(kind.type_index()), Some(kind));
        }
        assert_eq!(UnitKind::from_type_index(0), None);
        assert_eq!(UnitKind::from_type_index(4), None);
    }

    #[test]
    fn minigame_ids_reserve_zero() {
        assert_eq!(MinigameKind::from_id(0), None);
        for kind in MinigameKind::ALL {
            assert_eq!(MinigameKind::from_id(kind.id()), Some(kind));
        }
    }

    #[test]
    fn rotation_pairs_mine_and_drill() {
        assert_eq!(MinigameKind::Mine.rotation_partner(), Some(MinigameKind::Drill));
        assert_eq!(MinigameKind::Drill.rotation_partner(), Some(MinigameKind::Mine));
        assert_eq!(MinigameKind::Solar.rotation_partner(), None);
        assert!(!MinigameKind::Solar.is_rotation());
    }

    #[test]
    fn every_unit_maps_to_a_distinct_minigame() {
        let kinds: Vec<MinigameKind> = UnitKind::ALL.iter().map(|u| u.minigame()).collect();
        assert_eq!(
            kinds,
            vec![MinigameKind::Mine, MinigameKind::Solar, MinigameKind::Drill]
        );
    }

    #[test]
    fn panel_ids_are_unique() {
        let panels = [
            UiPanel::Placement,
            UiPanel::Turn,
            UiPanel::Resources,
            UiPanel::Simulation,
            UiPanel::MinigameMessage,
            UiPanel::RemovePrompt,
            UiPanel::MineGame,
            UiPanel::SolarGame,
            UiPanel::DrillGame,
            UiPanel::GameOver,
        ];
        let mut ids: Vec<u8> = panels.iter().map(|p| p.panel_id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), panels.len());
    }

    #[test]
    fn minigame_phases() {
        assert!(Phase::EnteringMinigame.is_minigame());
        assert!(Phase::InMinigame.is_minigame());
        assert!(Phase::ExitingMinigame.is_minigame());
        assert!(!Phase::Simulating.is_minigame());
        assert!(Phase::AwaitingInput.accepts_placement());
        assert!(!Phase::GameOver.accepts_placement());
    }
}
