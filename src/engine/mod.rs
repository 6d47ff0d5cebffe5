use crate::board::{Board, Occupant};
use crate::constants::AUTOMATION_BATCH;
use crate::layout::Layout;
use crate::rng::Rng;
use crate::types::{Direction, FinishReason, GameEvent, GameMode, ItemKind, Snapshot};

mod entity;
mod ghost;
mod pacman;
mod turn;
mod utils;

pub use self::entity::{Entity, LegalMoves, PlanContext, Planner};
pub use self::ghost::{Ghost, GhostState};
pub use self::pacman::Pacman;

/// Inputs the turn controller understands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signal {
    /// Bank the current score and start a fresh round.
    Initialize,
    /// Zero every counter and start a fresh round.
    Reset,
    /// Swap the floor items; agents and counters are untouched.
    ReplaceItems(Vec<Vec<ItemKind>>),
    /// Like `Initialize`, then queue a batch of unattended rounds.
    SetAutomationRounds,
    Tick,
}

#[derive(Clone, Debug)]
pub struct GameState {
    layout: Layout,
    board: Board,
    pacman: Pacman,
    ghosts: Vec<Ghost>,
    rng: Rng,
    events: Vec<GameEvent>,

    pill_timer: u32,
    mode: GameMode,
    finish_reason: Option<FinishReason>,
    turn: u64,

    running_score: i64,
    iteration: u64,
    automation_remaining: u32,
}

/// Reducer-shaped entry point: every signal yields a next state.
pub fn reduce(mut state: GameState, signal: Signal) -> GameState {
    state.dispatch(signal);
    state
}

impl GameState {
    /// Classic maze round. Panics only if the built-in maze is malformed.
    pub fn new(seed: u32) -> Self {
        Self::with_layout(Layout::classic(), seed).expect("built-in maze should build a board")
    }

    /// Returns `None` when the layout cannot produce a board.
    pub fn with_layout(layout: Layout, seed: u32) -> Option<Self> {
        let board = layout.build_board()?;
        let (pacman, ghosts) = spawn_agents(&layout);
        Some(Self {
            layout,
            board,
            pacman,
            ghosts,
            rng: Rng::new(seed),
            events: Vec::new(),
            pill_timer: 0,
            mode: GameMode::Playing,
            finish_reason: None,
            turn: 0,
            running_score: 0,
            iteration: 0,
            automation_remaining: 0,
        })
    }

    pub fn dispatch(&mut self, signal: Signal) {
        match signal {
            Signal::Initialize => {
                self.fold_round();
                self.rebuild();
            }
            Signal::Reset => {
                self.running_score = 0;
                self.iteration = 0;
                self.automation_remaining = 0;
                self.rebuild();
            }
            Signal::ReplaceItems(rows) => self.board.replace_items(&rows),
            Signal::SetAutomationRounds => {
                self.fold_round();
                self.rebuild();
                self.automation_remaining = AUTOMATION_BATCH;
            }
            Signal::Tick => self.tick(),
        }
    }

    /// Input adapter hook: stores the direction for the player's next plan.
    pub fn handle_key(&mut self, key: &str) -> bool {
        self.pacman.handle_key(key)
    }

    pub fn set_desired_direction(&mut self, dir: Direction) {
        self.pacman.set_desired(dir);
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn pill_timer(&self) -> u32 {
        self.pill_timer
    }

    pub fn score(&self) -> i32 {
        self.pacman.score
    }

    pub fn running_score(&self) -> i64 {
        self.running_score
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn automation_remaining(&self) -> u32 {
        self.automation_remaining
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn pacman(&self) -> &Pacman {
        &self.pacman
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let snapshot = Snapshot {
            turn: self.turn,
            mode: self.mode,
            finish_reason: self.finish_reason,
            pill_timer: self.pill_timer,
            score: self.pacman.score,
            running_score: self.running_score,
            iteration: self.iteration,
            automation_remaining: self.automation_remaining,
            width: self.board.width(),
            height: self.board.height(),
            tiles: self.board.render_rows(),
            pacman: self.pacman.view(),
            ghosts: self.ghosts.iter().map(Ghost::view).collect(),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    fn fold_round(&mut self) {
        self.running_score += self.pacman.score as i64;
        self.iteration += 1;
    }

    /// Fresh board and agents; running counters and the RNG carry over.
    fn rebuild(&mut self) {
        if let Some(board) = self.layout.build_board() {
            self.board = board;
        }
        let (pacman, ghosts) = spawn_agents(&self.layout);
        self.pacman = pacman;
        self.ghosts = ghosts;
        self.pill_timer = 0;
        self.mode = GameMode::Playing;
        self.finish_reason = None;
        self.turn = 0;
    }
}

fn spawn_agents(layout: &Layout) -> (Pacman, Vec<Ghost>) {
    let pacman = Pacman::new(layout.pacman_spawn);
    let ghosts = layout
        .ghost_homes
        .iter()
        .enumerate()
        .map(|(id, home)| Ghost::new(id, *home))
        .collect();
    (pacman, ghosts)
}
