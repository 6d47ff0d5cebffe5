use crate::board::{Board, Occupant};
use crate::rng::Rng;
use crate::types::{Direction, ItemKind, Move, Vec2};

/// Read-only view of the round handed to a planner, plus the shared jitter source.
pub struct PlanContext<'a> {
    pub board: &'a Board,
    pub pill_timer: u32,
    pub pacman: Vec2,
    pub rng: &'a mut Rng,
}

impl PlanContext<'_> {
    pub fn powered(&self) -> bool {
        self.pill_timer > 0
    }
}

/// Movement decision capability shared by the player and the ghosts.
pub trait Planner {
    /// `None` means the agent has nowhere to go this tick.
    fn next_move(&mut self, ctx: &mut PlanContext<'_>) -> Option<Move>;
}

/// Legal moves keyed by direction, in `Direction::CARDINALS` order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LegalMoves([Option<Move>; 4]);

impl LegalMoves {
    pub fn get(&self, dir: Direction) -> Option<Move> {
        let idx = Direction::CARDINALS.iter().position(|d| *d == dir)?;
        self.0[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = Move> + '_ {
        self.0.iter().flatten().copied()
    }

    pub fn count(&self) -> usize {
        self.0.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&Move) -> bool) {
        for slot in &mut self.0 {
            if slot.as_ref().is_some_and(|mv| !keep(mv)) {
                *slot = None;
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub pos: Vec2,
    pub dir: Direction,
}

impl Entity {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            dir: Direction::None,
        }
    }

    pub fn legal_moves(&self, board: &Board) -> LegalMoves {
        let mut moves = LegalMoves::default();
        for (idx, dir) in Direction::CARDINALS.iter().enumerate() {
            let target = self.pos.step(*dir);
            if board.in_bounds(target) && !board.is_wall(target) {
                moves.0[idx] = Some(Move {
                    target,
                    direction: *dir,
                });
            }
        }
        moves
    }

    /// Steps from the current cell towards `dir` and reports how far the first
    /// `kind` is. Walls and the grid edge end the scan without a match.
    pub fn scan_for(&self, board: &Board, dir: Direction, kind: ItemKind) -> Option<u32> {
        if dir == Direction::None {
            return None;
        }
        let mut cursor = self.pos;
        let mut distance = 0;
        loop {
            cursor = cursor.step(dir);
            distance += 1;
            let cell = board.cell_at(cursor)?;
            if cell.background == kind || cell.occupant.map(Occupant::kind) == Some(kind) {
                return Some(distance);
            }
            if cell.background == ItemKind::Wall {
                return None;
            }
        }
    }

    pub fn has_item_along(&self, board: &Board, dir: Direction, kind: ItemKind) -> bool {
        self.scan_for(board, dir, kind).is_some()
    }

    pub fn has_item_adjacent(&self, board: &Board, dir: Direction, kind: ItemKind) -> bool {
        self.scan_for(board, dir, kind) == Some(1)
    }

    /// Leaves the current cell (its floor item shows again) and stands on the target.
    /// The source is vacated first so a zero-length move keeps the occupant.
    pub fn commit_move(&mut self, board: &mut Board, who: Occupant, mv: Move) {
        board.vacate(self.pos, who);
        board.set_occupant(mv.target, Some(who));
        self.pos = mv.target;
        self.dir = mv.direction;
    }

    /// Random pick among `moves` that avoids turning straight back unless nothing else is open.
    pub fn wander(&self, moves: &LegalMoves, rng: &mut Rng) -> Option<Move> {
        let forward: Vec<Move> = moves
            .iter()
            .filter(|mv| !mv.direction.is_reverse_of(self.dir))
            .collect();
        let pool: Vec<Move> = if forward.is_empty() {
            moves.iter().collect()
        } else {
            forward
        };
        if pool.is_empty() {
            return None;
        }
        Some(pool[rng.pick_index(pool.len())])
    }
}
