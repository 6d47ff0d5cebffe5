use crate::board::{Board, Occupant};
use crate::constants::{
    PILL_MAX, PRIORITY_BISCUIT_BASE, PRIORITY_BLOCKED, PRIORITY_DISTANCE_STEP,
    PRIORITY_FLEE_BASE, PRIORITY_HUNT_BASE, PRIORITY_JITTER, PRIORITY_PILL,
    PRIORITY_POWERED_IDLE,
};
use crate::types::{Direction, GameEvent, ItemKind, Move, PacmanView, Vec2};

use super::entity::{Entity, PlanContext, Planner};
use super::ghost::Ghost;
use super::utils::pick_highest;

#[derive(Clone, Debug)]
pub struct Pacman {
    pub entity: Entity,
    pub score: i32,
    /// Single-slot mailbox written by the input adapter; the last write wins.
    desired: Option<Direction>,
}

impl Pacman {
    pub fn new(pos: Vec2) -> Self {
        Self {
            entity: Entity::new(pos),
            score: 0,
            desired: None,
        }
    }

    pub fn desired(&self) -> Option<Direction> {
        self.desired
    }

    pub fn set_desired(&mut self, dir: Direction) {
        self.desired = (dir != Direction::None).then_some(dir);
    }

    /// Returns `false` for keys outside the symbol table; the mailbox is left as is.
    pub fn handle_key(&mut self, key: &str) -> bool {
        match Direction::from_key(key) {
            Some(dir) => {
                self.desired = Some(dir);
                true
            }
            None => false,
        }
    }

    /// Per-direction preference in `Direction::CARDINALS` order.
    fn priorities(&self, ctx: &mut PlanContext<'_>) -> [f64; 4] {
        let board = ctx.board;
        let moves = self.entity.legal_moves(board);
        let mut priorities = [0.0; 4];

        for (idx, dir) in Direction::CARDINALS.iter().enumerate() {
            if moves.get(*dir).is_none() {
                priorities[idx] = PRIORITY_BLOCKED;
                continue;
            }
            if dir.is_reverse_of(self.entity.dir) {
                continue;
            }

            let mut priority = 0.0;
            if let Some(distance) = self.entity.scan_for(board, *dir, ItemKind::Ghost) {
                let distance = distance as f64 * PRIORITY_DISTANCE_STEP;
                priority = if ctx.powered() {
                    PRIORITY_HUNT_BASE - distance
                } else {
                    PRIORITY_FLEE_BASE + distance
                };
            } else if self.entity.has_item_adjacent(board, *dir, ItemKind::Pill) {
                priority = PRIORITY_PILL;
            } else if let Some(distance) = self.entity.scan_for(board, *dir, ItemKind::Biscuit) {
                priority = PRIORITY_BISCUIT_BASE - distance as f64 * PRIORITY_DISTANCE_STEP;
            } else if ctx.powered() {
                priority = PRIORITY_POWERED_IDLE;
            }
            priorities[idx] = priority + ctx.rng.jitter(PRIORITY_JITTER);
        }
        priorities
    }

    /// Eats whatever stands on the target, then relocates onto it.
    pub fn move_to(
        &mut self,
        board: &mut Board,
        mv: Move,
        pill_timer: &mut u32,
        ghosts: &mut [Ghost],
        events: &mut Vec<GameEvent>,
    ) {
        let (x, y) = (mv.target.x, mv.target.y);
        if let Some(cell) = board.cell_at(mv.target).copied() {
            let item = cell.item();
            self.score += item.weight();
            match item {
                ItemKind::Pill => {
                    *pill_timer = PILL_MAX;
                    events.push(GameEvent::PillTaken { x, y });
                }
                ItemKind::Biscuit => events.push(GameEvent::BiscuitEaten { x, y }),
                ItemKind::Cherry => events.push(GameEvent::CherryTaken { x, y }),
                ItemKind::Ghost => {
                    if let Some(Occupant::Ghost(id)) = cell.occupant {
                        if let Some(ghost) = ghosts.iter_mut().find(|ghost| ghost.id == id) {
                            ghost.retreat(board);
                        }
                        events.push(GameEvent::GhostEaten { ghost: id });
                    }
                }
                _ => {}
            }
        }

        board.set_background(mv.target, ItemKind::Empty);
        self.entity.commit_move(board, Occupant::Pacman, mv);
    }

    pub fn view(&self) -> PacmanView {
        PacmanView {
            x: self.entity.pos.x,
            y: self.entity.pos.y,
            dir: self.entity.dir,
            score: self.score,
            desired_dir: self.desired,
        }
    }
}

impl Planner for Pacman {
    fn next_move(&mut self, ctx: &mut PlanContext<'_>) -> Option<Move> {
        let moves = self.entity.legal_moves(ctx.board);

        if let Some(desired) = self.desired {
            if let Some(mv) = moves.get(desired) {
                self.desired = None;
                return Some(mv);
            }
        }

        let priorities = self.priorities(ctx);
        let best = pick_highest(
            Direction::CARDINALS
                .iter()
                .zip(priorities)
                .filter_map(|(dir, priority)| moves.get(*dir).map(|mv| (mv, priority))),
        );
        if best.is_some() {
            return best;
        }

        if self.entity.dir != Direction::None {
            return moves.get(self.entity.dir);
        }
        None
    }
}
