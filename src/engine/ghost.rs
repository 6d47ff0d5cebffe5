use crate::board::{Board, Occupant};
use crate::constants::{GHOST_CHASE_RANGE, GHOST_PEN_TICKS, PRIORITY_JITTER};
use crate::types::{Direction, GhostView, ItemKind, Move, Vec2};

use super::entity::{Entity, LegalMoves, PlanContext, Planner};
use super::utils::{manhattan, pick_highest};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GhostState {
    Active,
    /// Eaten and waiting to re-enter at home.
    Penned { remaining: u32 },
    /// Eaten without a home to return to.
    Removed,
}

#[derive(Clone, Debug)]
pub struct Ghost {
    pub id: usize,
    pub entity: Entity,
    home: Option<Vec2>,
    state: GhostState,
}

impl Ghost {
    pub fn new(id: usize, home: Vec2) -> Self {
        Self {
            id,
            entity: Entity::new(home),
            home: Some(home),
            state: GhostState::Active,
        }
    }

    /// A ghost that cannot be sent home; eating it takes it out of the round.
    #[cfg(test)]
    pub fn without_retreat(id: usize, pos: Vec2) -> Self {
        Self {
            home: None,
            ..Self::new(id, pos)
        }
    }

    pub fn occupant(&self) -> Occupant {
        Occupant::Ghost(self.id)
    }

    #[cfg(test)]
    pub fn state(&self) -> GhostState {
        self.state
    }

    pub fn in_play(&self) -> bool {
        self.state == GhostState::Active
    }

    #[cfg(test)]
    pub fn can_retreat(&self) -> bool {
        self.home.is_some()
    }

    /// Takes the ghost off the board after the player ate it.
    pub fn retreat(&mut self, board: &mut Board) {
        board.vacate(self.entity.pos, self.occupant());
        self.entity.dir = Direction::None;
        self.state = match self.home {
            Some(_) => GhostState::Penned {
                remaining: GHOST_PEN_TICKS,
            },
            None => GhostState::Removed,
        };
    }

    /// Counts down the pen and puts the ghost back on its home cell once that cell is free.
    /// Returns `true` on the tick the ghost re-enters.
    pub fn tick_pen(&mut self, board: &mut Board) -> bool {
        let GhostState::Penned { remaining } = self.state else {
            return false;
        };
        if remaining > 0 {
            self.state = GhostState::Penned {
                remaining: remaining - 1,
            };
            return false;
        }
        let Some(home) = self.home else {
            return false;
        };
        if board.occupant_at(home).is_some() {
            return false;
        }
        board.set_occupant(home, Some(self.occupant()));
        self.entity.pos = home;
        self.entity.dir = Direction::None;
        self.state = GhostState::Active;
        true
    }

    pub fn commit_move(&mut self, board: &mut Board, mv: Move) {
        let who = self.occupant();
        self.entity.commit_move(board, who, mv);
    }

    pub fn view(&self) -> GhostView {
        GhostView {
            id: self.id,
            x: self.entity.pos.x,
            y: self.entity.pos.y,
            dir: self.entity.dir,
            in_play: self.in_play(),
            penned_for: match self.state {
                GhostState::Penned { remaining } => remaining,
                _ => 0,
            },
        }
    }

    fn open_moves(&self, board: &Board) -> LegalMoves {
        let mut moves = self.entity.legal_moves(board);
        moves.retain(|mv| match board.occupant_at(mv.target) {
            Some(Occupant::Ghost(other)) => other == self.id,
            _ => true,
        });
        moves
    }

    fn chase_move(&self, board: &Board, moves: &LegalMoves) -> Option<Move> {
        Direction::CARDINALS
            .iter()
            .filter_map(|dir| {
                let distance = self.entity.scan_for(board, *dir, ItemKind::Pacman)?;
                let mv = moves.get(*dir)?;
                (distance <= GHOST_CHASE_RANGE).then_some((mv, distance))
            })
            .min_by_key(|(_, distance)| *distance)
            .map(|(mv, _)| mv)
    }
}

impl Planner for Ghost {
    fn next_move(&mut self, ctx: &mut PlanContext<'_>) -> Option<Move> {
        if !self.in_play() {
            return None;
        }
        let moves = self.open_moves(ctx.board);
        if moves.is_empty() {
            return None;
        }

        if ctx.powered() {
            let pacman = ctx.pacman;
            let scored: Vec<(Move, f64)> = moves
                .iter()
                .map(|mv| {
                    let distance = manhattan(mv.target, pacman) as f64;
                    (mv, distance + ctx.rng.jitter(PRIORITY_JITTER))
                })
                .collect();
            return pick_highest(scored);
        }

        if let Some(mv) = self.chase_move(ctx.board, &moves) {
            return Some(mv);
        }
        self.entity.wander(&moves, ctx.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Rng;

    fn plan(ghost: &mut Ghost, board: &Board, pill_timer: u32, pacman: Vec2, seed: u32) -> Option<Move> {
        let mut rng = Rng::new(seed);
        let mut ctx = PlanContext {
            board,
            pill_timer,
            pacman,
            rng: &mut rng,
        };
        ghost.next_move(&mut ctx)
    }

    #[test]
    fn chases_player_in_sight_when_unpowered() {
        let mut board = Board::from_glyphs(&["       ", "       ", "       "]);
        let pacman = Vec2::new(5, 1);
        board.set_occupant(pacman, Some(Occupant::Pacman));
        let mut ghost = Ghost::new(0, Vec2::new(1, 1));
        board.set_occupant(ghost.entity.pos, Some(ghost.occupant()));

        for seed in 0..20 {
            let mv = plan(&mut ghost, &board, 0, pacman, seed).expect("open board");
            assert_eq!(mv.direction, Direction::Right);
        }
    }

    #[test]
    fn flees_player_while_powered() {
        let mut board = Board::from_glyphs(&["       "]);
        let pacman = Vec2::new(4, 0);
        board.set_occupant(pacman, Some(Occupant::Pacman));
        let mut ghost = Ghost::new(0, Vec2::new(3, 0));

        for seed in 0..20 {
            let mv = plan(&mut ghost, &board, 5, pacman, seed).expect("open corridor");
            assert_eq!(mv.direction, Direction::Left);
        }
    }

    #[test]
    fn never_steps_onto_another_ghost() {
        let mut board = Board::from_glyphs(&["###", "   ", "###"]);
        board.set_occupant(Vec2::new(2, 1), Some(Occupant::Ghost(1)));
        let mut ghost = Ghost::new(0, Vec2::new(1, 1));
        ghost.entity.dir = Direction::Left;
        for seed in 0..20 {
            let mv = plan(&mut ghost, &board, 0, Vec2::new(9, 9), seed).expect("left is open");
            assert_eq!(mv.direction, Direction::Left);
        }

        board.set_occupant(Vec2::new(0, 1), Some(Occupant::Ghost(2)));
        assert_eq!(plan(&mut ghost, &board, 0, Vec2::new(9, 9), 1), None);
    }

    #[test]
    fn wander_does_not_reverse_at_junction() {
        let board = Board::from_glyphs(&["   ", "   ", "   "]);
        let mut ghost = Ghost::new(0, Vec2::new(1, 1));
        ghost.entity.dir = Direction::Down;
        for seed in 0..50 {
            let mv = plan(&mut ghost, &board, 0, Vec2::new(40, 40), seed).expect("open board");
            assert_ne!(mv.direction, Direction::Up);
        }
    }

    #[test]
    fn retreat_pens_then_returns_home() {
        let mut board = Board::from_glyphs(&["   "]);
        let home = Vec2::new(0, 0);
        let mut ghost = Ghost::new(0, home);
        board.set_occupant(home, Some(ghost.occupant()));
        ghost.commit_move(
            &mut board,
            Move {
                target: Vec2::new(1, 0),
                direction: Direction::Right,
            },
        );

        ghost.retreat(&mut board);
        assert!(!ghost.in_play());
        assert_eq!(board.occupant_at(Vec2::new(1, 0)), None);
        assert_eq!(plan(&mut ghost, &board, 0, Vec2::new(2, 0), 1), None);

        for _ in 0..GHOST_PEN_TICKS {
            assert!(!ghost.tick_pen(&mut board));
        }
        board.set_occupant(home, Some(Occupant::Pacman));
        assert!(!ghost.tick_pen(&mut board));
        board.set_occupant(home, None);
        assert!(ghost.tick_pen(&mut board));
        assert!(ghost.in_play());
        assert_eq!(ghost.entity.pos, home);
        assert_eq!(board.occupant_at(home), Some(Occupant::Ghost(0)));
    }

    #[test]
    fn ghost_without_home_is_removed_when_eaten() {
        let mut board = Board::from_glyphs(&["  "]);
        let mut ghost = Ghost::without_retreat(2, Vec2::new(1, 0));
        board.set_occupant(ghost.entity.pos, Some(ghost.occupant()));
        assert!(!ghost.can_retreat());
        ghost.retreat(&mut board);
        assert_eq!(ghost.state(), GhostState::Removed);
        assert!(!ghost.tick_pen(&mut board));
        assert_eq!(board.occupant_at(Vec2::new(1, 0)), None);
    }
}
