//! Session factories and per-game minigame results.
//!
//! The orchestrator never holds a minigame between entries. On each entry
//! it asks the [`MinigameRoster`] for a fresh session; on exit the session
//! is dropped and its score is kept as a [`MinigameResult`].

use core::fmt;

use exposure_minigames::{
    CartSession, DrillSession, MinigameSession, MinigameTuning, SolarSession,
};
use exposure_types::{MinigameKind, SessionId};
use serde::Serialize;
use tracing::debug;

use crate::selection::EntryTrigger;

/// Builds a session from a per-entry seed.
pub type SessionFactory = Box<dyn Fn(u64) -> Box<dyn MinigameSession> + Send>;

/// A session created for one minigame entry.
#[derive(Debug)]
pub struct ActiveSession {
    /// Handle for logs and results.
    pub id: SessionId,
    /// What caused the entry.
    pub trigger: EntryTrigger,
    /// Turn on which the entry happened.
    pub turn: u32,
    /// The running session.
    pub session: Box<dyn MinigameSession>,
}

impl ActiveSession {
    /// Freeze the session's outcome.
    pub fn result(&self) -> MinigameResult {
        MinigameResult {
            session_id: self.id,
            kind: self.session.kind(),
            trigger: self.trigger,
            turn: self.turn,
            score: self.session.score(),
            finished: self.session.is_finished(),
        }
    }
}

/// Outcome of one minigame entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MinigameResult {
    /// Session handle.
    pub session_id: SessionId,
    /// Which minigame was played.
    pub kind: MinigameKind,
    /// Why it was entered.
    pub trigger: EntryTrigger,
    /// Turn of the entry.
    pub turn: u32,
    /// Score when the session was dropped.
    pub score: i32,
    /// `false` when the player left before the end condition.
    pub finished: bool,
}

/// One factory per minigame kind.
pub struct MinigameRoster {
    mine: SessionFactory,
    solar: SessionFactory,
    drill: SessionFactory,
    seed: u64,
    entries: u64,
}

impl MinigameRoster {
    /// Roster of the reference minigames with the given tuning.
    pub fn new(tuning: &MinigameTuning, seed: u64) -> Self {
        let cart = tuning.cart;
        let drill = tuning.drill;
        let solar = tuning.solar;
        Self {
            mine: Box::new(move |seed| Box::new(CartSession::new(cart, seed))),
            solar: Box::new(move |_| Box::new(SolarSession::new(solar))),
            drill: Box::new(move |_| Box::new(DrillSession::new(drill))),
            seed,
            entries: 0,
        }
    }

    /// Replace the factory for `kind`.
    pub fn register(&mut self, kind: MinigameKind, factory: SessionFactory) {
        match kind {
            MinigameKind::Mine => self.mine = factory,
            MinigameKind::Solar => self.solar = factory,
            MinigameKind::Drill => self.drill = factory,
        }
    }

    /// Create a fresh session for `kind`.
    ///
    /// Each entry gets its own seed derived from the game seed, so replays
    /// with the same seed see the same sessions.
    pub fn create(&mut self, kind: MinigameKind, trigger: EntryTrigger, turn: u32) -> ActiveSession {
        self.entries = self.entries.wrapping_add(1);
        let seed = self.seed.wrapping_add(self.entries);
        let factory = match kind {
            MinigameKind::Mine => &self.mine,
            MinigameKind::Solar => &self.solar,
            MinigameKind::Drill => &self.drill,
        };
        let session = factory(seed);
        let id = SessionId::new();
        debug!(session_id = %id, %kind, seed, "Minigame session created");
        ActiveSession {
            id,
            trigger,
            turn,
            session,
        }
    }
}

impl fmt::Debug for MinigameRoster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinigameRoster")
            .field("seed", &self.seed)
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use exposure_minigames::MinigameInput;

    use super::*;

    #[derive(Debug)]
    struct Instant(i32);

    impl MinigameSession for Instant {
        fn kind(&self) -> MinigameKind {
            MinigameKind::Solar
        }
        fn start(&mut self) {}
        fn update(&mut self, _delta_seconds: f32) {}
        fn handle_input(&mut self, _input: MinigameInput) {}
        fn is_finished(&self) -> bool {
            true
        }
        fn score(&self) -> i32 {
            self.0
        }
    }

    #[test]
    fn creates_matching_kinds() {
        let mut roster = MinigameRoster::new(&MinigameTuning::default(), 5);
        for kind in MinigameKind::ALL {
            let active = roster.create(kind, EntryTrigger::ScheduledTurn, 1);
            assert_eq!(active.session.kind(), kind);
            assert!(!active.session.is_finished());
        }
    }

    #[test]
    fn registered_factory_replaces_reference_game() {
        let mut roster = MinigameRoster::new(&MinigameTuning::default(), 5);
        roster.register(MinigameKind::Solar, Box::new(|_| Box::new(Instant(77))));
        let active = roster.create(MinigameKind::Solar, EntryTrigger::SolarTurn, 4);
        let result = active.result();
        assert_eq!(result.score, 77);
        assert!(result.finished);
        assert_eq!(result.turn, 4);
        assert_eq!(result.trigger, EntryTrigger::SolarTurn);
    }

    #[test]
    fn every_entry_gets_a_new_session_id() {
        let mut roster = MinigameRoster::new(&MinigameTuning::default(), 0);
        let a = roster.create(MinigameKind::Drill, EntryTrigger::OptIn, 2);
        let b = roster.create(MinigameKind::Drill, EntryTrigger::OptIn, 2);
        assert_ne!(a.id, b.id);
    }
}
