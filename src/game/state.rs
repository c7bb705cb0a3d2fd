//! Run state machine
//!
//! `Idle -> Active -> Ended(Victory | Defeat)`. A run controller owns the grid
//! and the hero for one run at a time and is the only way to reveal rooms.
//! Every reveal takes `&mut self`, so one reveal always finishes (including
//! its victory/defeat check) before the next can start.

use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

use crate::data::GameConfig;
use crate::dungeon::{self, Composition, Grid, Hero, RevealEvent};
use super::outcome::{DefeatScoring, RunOutcome};

/// Where the current run stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No run started yet
    Idle,
    /// Rooms can be revealed
    Active,
    /// Run is over
    Ended(RunEnd),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    Victory,
    Defeat,
}

/// Why a reveal was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RevealRejection {
    #[error("no run in progress")]
    NotActive,
    #[error("room {0} is out of bounds")]
    OutOfBounds(usize),
    #[error("room {0} is already revealed")]
    AlreadyRevealed(usize),
}

/// Engine errors. None of them are fatal; a rejected reveal changes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid reveal: {0}")]
    InvalidReveal(RevealRejection),
    #[error("no hidden rooms left on the grid")]
    ExhaustedGrid,
}

/// Everything the presentation layer needs after one reveal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealReport {
    pub index: usize,
    /// Hero after the reveal
    pub hero: Hero,
    pub event: RevealEvent,
    /// Set when this reveal ended the run
    pub outcome: Option<RunOutcome>,
}

/// Owns one run's grid and hero
pub struct RunController {
    state: RunState,
    grid: Option<Grid>,
    hero: Hero,
    outcome: Option<RunOutcome>,
    composition: Composition,
    defeat_scoring: DefeatScoring,
    rng: StdRng,
}

impl RunController {
    /// Controller with an entropy-seeded rng
    pub fn new(composition: Composition, defeat_scoring: DefeatScoring) -> Self {
        Self::with_rng(composition, defeat_scoring, StdRng::from_entropy())
    }

    /// Controller with a fixed seed, for reproducible runs
    pub fn with_seed(composition: Composition, defeat_scoring: DefeatScoring, seed: u64) -> Self {
        Self::with_rng(composition, defeat_scoring, StdRng::seed_from_u64(seed))
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.composition, config.defeat_scoring)
    }

    fn with_rng(composition: Composition, defeat_scoring: DefeatScoring, rng: StdRng) -> Self {
        Self {
            state: RunState::Idle,
            grid: None,
            hero: Hero::new(),
            outcome: None,
            composition,
            defeat_scoring,
            rng,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == RunState::Active
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn hero(&self) -> &Hero {
        &self.hero
    }

    /// Outcome of the last finished run, cleared when a new run starts
    pub fn outcome(&self) -> Option<RunOutcome> {
        self.outcome
    }

    /// Rooms not yet counted as explored
    pub fn rooms_left(&self) -> usize {
        let total = self.grid.as_ref().map_or(dungeon::GRID_CELLS, Grid::len);
        total.saturating_sub(self.hero.revealed_count)
    }

    /// Throw away any current run and start a fresh one
    pub fn start_run(&mut self) -> (&Grid, &Hero) {
        let grid = Grid::generate(&self.composition, &mut self.rng);
        self.begin(grid)
    }

    fn begin(&mut self, grid: Grid) -> (&Grid, &Hero) {
        log::info!("Starting run ({} rooms)", grid.len());
        self.hero = Hero::new();
        self.outcome = None;
        self.state = RunState::Active;
        let grid = self.grid.insert(grid);
        (grid, &self.hero)
    }

    /// Start a run on a prepared grid
    #[cfg(test)]
    pub(crate) fn start_run_with(&mut self, grid: Grid) {
        self.begin(grid);
    }

    /// Reveal a room, silently ignoring anything that is not a legal move
    pub fn reveal(&mut self, index: usize) -> Option<RevealReport> {
        match self.try_reveal(index) {
            Ok(report) => Some(report),
            Err(e) => {
                log::debug!("Ignoring reveal of room {}: {}", index, e);
                None
            }
        }
    }

    /// Reveal a room. On error nothing has changed.
    pub fn try_reveal(&mut self, index: usize) -> Result<RevealReport, EngineError> {
        if self.state != RunState::Active {
            return Err(EngineError::InvalidReveal(RevealRejection::NotActive));
        }
        let grid = self
            .grid
            .as_mut()
            .ok_or(EngineError::InvalidReveal(RevealRejection::NotActive))?;
        if self.hero.revealed_count >= grid.len() {
            return Err(EngineError::ExhaustedGrid);
        }
        let room = grid
            .get_mut(index)
            .ok_or(EngineError::InvalidReveal(RevealRejection::OutOfBounds(index)))?;
        if room.is_revealed() {
            return Err(EngineError::InvalidReveal(RevealRejection::AlreadyRevealed(index)));
        }

        let (hero, event) = dungeon::reveal(self.hero, room);
        self.hero = hero;

        let total = grid.len();
        let outcome = if !self.hero.is_alive() {
            grid.reveal_all();
            let explored = match self.defeat_scoring {
                DefeatScoring::FullGrid => {
                    self.hero.revealed_count = total;
                    total
                }
                DefeatScoring::RoomsExplored => self.hero.revealed_count,
            };
            self.state = RunState::Ended(RunEnd::Defeat);
            Some(RunOutcome::defeat(explored))
        } else if self.hero.revealed_count == total {
            self.state = RunState::Ended(RunEnd::Victory);
            Some(RunOutcome::victory(total))
        } else {
            None
        };

        if let Some(outcome) = outcome {
            log::info!(
                "Run ended: {} (explored {}, score {})",
                if outcome.victory { "victory" } else { "defeat" },
                outcome.explored,
                outcome.score()
            );
            self.outcome = Some(outcome);
        }

        Ok(RevealReport { index, hero: self.hero, event, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{RoomKind, GRID_CELLS};

    fn controller() -> RunController {
        RunController::with_seed(Composition::CANONICAL, DefeatScoring::FullGrid, 42)
    }

    /// `prefix` followed by empty rooms up to a full grid
    fn scripted(prefix: &[RoomKind]) -> Grid {
        let mut kinds = prefix.to_vec();
        kinds.resize(GRID_CELLS, RoomKind::Empty);
        Grid::from_kinds(&kinds)
    }

    #[test]
    fn test_starts_idle() {
        let mut run = controller();
        assert_eq!(run.state(), RunState::Idle);
        assert!(run.grid().is_none());
        assert_eq!(
            run.try_reveal(0),
            Err(EngineError::InvalidReveal(RevealRejection::NotActive))
        );
        assert!(run.reveal(0).is_none());
    }

    #[test]
    fn test_start_run_resets() {
        let mut run = controller();
        run.start_run();
        run.reveal(0);
        let (grid, hero) = run.start_run();
        assert_eq!(grid.hidden_count(), GRID_CELLS);
        assert_eq!(*hero, Hero::new());
        assert_eq!(run.state(), RunState::Active);
        assert_eq!(run.rooms_left(), GRID_CELLS);
    }

    #[test]
    fn test_second_reveal_of_same_room_is_noop() {
        let mut run = controller();
        run.start_run();
        assert!(run.reveal(5).is_some());

        let hero_before = *run.hero();
        let grid_before = run.grid().cloned();
        assert_eq!(
            run.try_reveal(5),
            Err(EngineError::InvalidReveal(RevealRejection::AlreadyRevealed(5)))
        );
        assert!(run.reveal(5).is_none());
        assert_eq!(*run.hero(), hero_before);
        assert_eq!(run.grid().cloned(), grid_before);
    }

    #[test]
    fn test_out_of_bounds_is_rejected() {
        let mut run = controller();
        run.start_run();
        assert_eq!(
            run.try_reveal(GRID_CELLS),
            Err(EngineError::InvalidReveal(RevealRejection::OutOfBounds(GRID_CELLS)))
        );
        assert_eq!(*run.hero(), Hero::new());
    }

    #[test]
    fn test_full_clear_is_victory() {
        let mut run = controller();
        run.start_run_with(scripted(&[RoomKind::Ogre, RoomKind::Potion]));

        let mut last = None;
        for index in 0..GRID_CELLS {
            let report = run.reveal(index).expect("reveal should succeed");
            assert_eq!(report.outcome.is_some(), index == GRID_CELLS - 1);
            last = report.outcome;
        }

        let outcome = last.unwrap();
        assert_eq!(outcome, RunOutcome::victory(GRID_CELLS));
        assert_eq!(outcome.score(), 114);
        assert_eq!(run.state(), RunState::Ended(RunEnd::Victory));
        assert_eq!(run.outcome(), Some(outcome));
        assert_eq!(run.rooms_left(), 0);
    }

    #[test]
    fn test_defeat_forces_full_reveal() {
        let mut prefix = vec![RoomKind::Empty; 8];
        prefix.extend([RoomKind::Goblin, RoomKind::Goblin]);
        let mut run = controller();
        run.start_run_with(scripted(&prefix));

        for index in 0..9 {
            assert!(run.reveal(index).unwrap().outcome.is_none());
        }
        let report = run.reveal(9).unwrap();
        let outcome = report.outcome.unwrap();

        assert!(outcome.defeat && !outcome.victory);
        assert_eq!(outcome.explored, GRID_CELLS);
        assert_eq!(outcome.score(), 64);
        assert_eq!(report.hero.lives, -1);
        assert_eq!(report.hero.revealed_count, GRID_CELLS);
        assert_eq!(run.grid().unwrap().hidden_count(), 0);
        assert_eq!(run.state(), RunState::Ended(RunEnd::Defeat));
    }

    #[test]
    fn test_defeat_scoring_by_rooms_explored() {
        let mut run = RunController::with_seed(Composition::CANONICAL, DefeatScoring::RoomsExplored, 1);
        run.start_run_with(scripted(&[RoomKind::Empty, RoomKind::Goblin, RoomKind::Ogre]));

        run.reveal(0);
        run.reveal(1);
        let outcome = run.reveal(2).unwrap().outcome.unwrap();
        assert_eq!(outcome, RunOutcome::defeat(3));
        assert_eq!(run.hero().revealed_count, 3);
        assert_eq!(run.grid().unwrap().hidden_count(), 0);
    }

    #[test]
    fn test_no_reveals_after_run_ends() {
        let mut run = controller();
        run.start_run_with(scripted(&[RoomKind::Goblin, RoomKind::Goblin]));
        run.reveal(0);
        run.reveal(1);
        assert_eq!(run.state(), RunState::Ended(RunEnd::Defeat));

        let hero = *run.hero();
        assert_eq!(
            run.try_reveal(2),
            Err(EngineError::InvalidReveal(RevealRejection::NotActive))
        );
        assert_eq!(*run.hero(), hero);
    }

    #[test]
    fn test_party_invariant_holds_for_random_runs() {
        for seed in 0..40 {
            let mut run = RunController::with_seed(Composition::HARSH, DefeatScoring::FullGrid, seed);
            run.start_run();
            let mut outcome = None;
            for index in 0..GRID_CELLS {
                if let Some(report) = run.reveal(index) {
                    assert_eq!(report.hero.party_size, 1 + report.hero.allies, "seed {}", seed);
                    assert!(report.hero.lives <= 3);
                    outcome = outcome.or(report.outcome);
                }
            }
            let outcome = outcome.expect("every full sweep ends the run");
            assert_eq!(outcome.explored, GRID_CELLS);
            if outcome.victory {
                assert_eq!(outcome.score(), 114);
            } else {
                assert_eq!(outcome.score(), 64);
            }
        }
    }
}
