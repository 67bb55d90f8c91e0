//! Which minigame to play, and the bookkeeping behind that choice.
//!
//! Selection order:
//!
//! 1. The first time a unit kind's minigame comes up, that minigame is
//!    played ([`EntryTrigger::FirstPlacement`]).
//! 2. A solar turn plays the solar minigame.
//! 3. Everything else goes through the mine/drill rotation. The first
//!    rotation entry is a coin flip on the seeded RNG (or the configured
//!    fixed pick); every later one alternates.
//!
//! Only rotation entries move the rotation forward. Playing the mine
//! because a reactor was placed for the first time does not count, and the
//! first rotation entry still draws its coin flip even when
//! [`MinigameSelection::first_played`] is already set.

use std::collections::BTreeSet;

use exposure_types::{MinigameKind, UnitKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

/// Why a minigame is being entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryTrigger {
    /// The placed unit's minigame has never been played.
    FirstPlacement(UnitKind),
    /// The turn is listed in `solar_turns`.
    SolarTurn,
    /// The turn is listed in `scheduled_turns`.
    ScheduledTurn,
    /// The player clicked the optional minigame message.
    OptIn,
}

/// Minigame selection state.
#[derive(Debug, Clone)]
pub struct MinigameSelection {
    active: Option<MinigameKind>,
    played: BTreeSet<MinigameKind>,
    first_played: Option<MinigameKind>,
    last_rotation: Option<MinigameKind>,
    fixed_first_rotation: Option<MinigameKind>,
    rng: StdRng,
}

impl MinigameSelection {
    /// Create selection state with a seeded RNG.
    ///
    /// `fixed_first_rotation` replaces the coin flip for the first rotation
    /// entry; non-rotation kinds are ignored.
    pub fn new(seed: u64, fixed_first_rotation: Option<MinigameKind>) -> Self {
        Self {
            active: None,
            played: BTreeSet::new(),
            first_played: None,
            last_rotation: None,
            fixed_first_rotation: fixed_first_rotation.filter(|kind| kind.is_rotation()),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Pick the trigger for an entry, or `None` if no minigame is due.
    ///
    /// `placed` is the unit placed this turn.
    pub fn trigger_for(
        &self,
        placed: Option<UnitKind>,
        solar_turn: bool,
        scheduled_turn: bool,
        opted_in: bool,
    ) -> Option<EntryTrigger> {
        if let Some(kind) = placed
            && !self.has_played(kind.minigame())
        {
            return Some(EntryTrigger::FirstPlacement(kind));
        }
        if solar_turn {
            Some(EntryTrigger::SolarTurn)
        } else if scheduled_turn {
            Some(EntryTrigger::ScheduledTurn)
        } else if opted_in {
            Some(EntryTrigger::OptIn)
        } else {
            None
        }
    }

    /// Decide which minigame `trigger` leads to and record the entry.
    pub fn enter(&mut self, trigger: EntryTrigger) -> MinigameKind {
        let kind = match trigger {
            EntryTrigger::FirstPlacement(unit) => unit.minigame(),
            EntryTrigger::SolarTurn => MinigameKind::Solar,
            EntryTrigger::ScheduledTurn | EntryTrigger::OptIn => {
                let kind = self.next_rotation();
                self.last_rotation = Some(kind);
                kind
            }
        };

        self.active = Some(kind);
        self.played.insert(kind);
        if self.first_played.is_none() {
            self.first_played = Some(kind);
        }
        debug!(?trigger, %kind, "Minigame selected");
        kind
    }

    /// Forget the active minigame after its exit committed.
    pub const fn clear_active(&mut self) {
        self.active = None;
    }

    /// The minigame being entered, played, or left.
    pub const fn active(&self) -> Option<MinigameKind> {
        self.active
    }

    /// Numeric id of the active minigame, `0` when none.
    pub fn active_id(&self) -> u8 {
        self.active.map_or(0, MinigameKind::id)
    }

    /// Whether `kind` has been entered at least once.
    pub fn has_played(&self, kind: MinigameKind) -> bool {
        self.played.contains(&kind)
    }

    /// The first minigame ever entered.
    pub const fn first_played(&self) -> Option<MinigameKind> {
        self.first_played
    }

    /// The most recent rotation pick.
    pub const fn last_rotation(&self) -> Option<MinigameKind> {
        self.last_rotation
    }

    fn next_rotation(&mut self) -> MinigameKind {
        if let Some(partner) = self.last_rotation.and_then(MinigameKind::rotation_partner) {
            return partner;
        }
        if let Some(fixed) = self.fixed_first_rotation {
            return fixed;
        }
        if self.rng.random_bool(0.5) {
            MinigameKind::Mine
        } else {
            MinigameKind::Drill
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_placement_wins_over_schedule() {
        let selection = MinigameSelection::new(1, None);
        assert_eq!(
            selection.trigger_for(Some(UnitKind::Windmill), true, true, false),
            Some(EntryTrigger::FirstPlacement(UnitKind::Windmill))
        );
    }

    #[test]
    fn played_kind_falls_through_to_schedule() {
        let mut selection = MinigameSelection::new(1, None);
        let kind = selection.enter(EntryTrigger::FirstPlacement(UnitKind::OilRig));
        assert_eq!(kind, MinigameKind::Drill);
        assert_eq!(
            selection.trigger_for(Some(UnitKind::OilRig), false, true, false),
            Some(EntryTrigger::ScheduledTurn)
        );
        assert_eq!(
            selection.trigger_for(Some(UnitKind::OilRig), false, false, true),
            Some(EntryTrigger::OptIn)
        );
        assert_eq!(
            selection.trigger_for(Some(UnitKind::OilRig), false, false, false),
            None
        );
    }

    #[test]
    fn rotation_alternates_after_first_draw() {
        let mut selection = MinigameSelection::new(7, None);
        let first = selection.enter(EntryTrigger::ScheduledTurn);
        assert!(first.is_rotation());
        let second = selection.enter(EntryTrigger::ScheduledTurn);
        let third = selection.enter(EntryTrigger::OptIn);
        assert_eq!(Some(second), first.rotation_partner());
        assert_eq!(third, first);
    }

    #[test]
    fn first_placement_does_not_move_rotation() {
        let mut selection = MinigameSelection::new(3, Some(MinigameKind::Drill));
        let _ = selection.enter(EntryTrigger::FirstPlacement(UnitKind::NuclearReactor));
        assert_eq!(selection.last_rotation(), None);
        assert_eq!(selection.enter(EntryTrigger::ScheduledTurn), MinigameKind::Drill);
        assert_eq!(selection.enter(EntryTrigger::ScheduledTurn), MinigameKind::Mine);
    }

    #[test]
    fn first_rotation_draw_ignores_first_played() {
        for seed in 0..20 {
            let mut fresh = MinigameSelection::new(seed, None);
            let mut placed_first = MinigameSelection::new(seed, None);
            let _ = placed_first.enter(EntryTrigger::FirstPlacement(UnitKind::NuclearReactor));
            assert_eq!(placed_first.first_played(), Some(MinigameKind::Mine));

            assert_eq!(
                placed_first.enter(EntryTrigger::ScheduledTurn),
                fresh.enter(EntryTrigger::ScheduledTurn),
                "seed {seed}"
            );
        }
    }

    #[test]
    fn same_seed_same_first_draw() {
        for seed in 0..20 {
            let mut a = MinigameSelection::new(seed, None);
            let mut b = MinigameSelection::new(seed, None);
            assert_eq!(
                a.enter(EntryTrigger::ScheduledTurn),
                b.enter(EntryTrigger::ScheduledTurn)
            );
        }
    }

    #[test]
    fn draws_cover_both_rotation_kinds() {
        let picks: BTreeSet<MinigameKind> = (0..64)
            .map(|seed| MinigameSelection::new(seed, None).enter(EntryTrigger::ScheduledTurn))
            .collect();
        assert_eq!(
            picks,
            BTreeSet::from([MinigameKind::Mine, MinigameKind::Drill])
        );
    }

    #[test]
    fn solar_turn_and_bookkeeping() {
        let mut selection = MinigameSelection::new(0, Some(MinigameKind::Solar));
        assert_eq!(selection.active_id(), 0);
        assert_eq!(selection.enter(EntryTrigger::SolarTurn), MinigameKind::Solar);
        assert_eq!(selection.active_id(), 2);
        assert_eq!(selection.first_played(), Some(MinigameKind::Solar));
        let _ = selection.enter(EntryTrigger::ScheduledTurn);
        assert_eq!(selection.first_played(), Some(MinigameKind::Solar));
        selection.clear_active();
        assert_eq!(selection.active(), None);
        assert!(selection.has_played(MinigameKind::Solar));
    }
}
