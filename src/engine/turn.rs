use super::*;

impl GameState {
    /// One discrete step: player, then ghosts (paced while powered), then the pill timer.
    pub(super) fn tick(&mut self) {
        if self.mode == GameMode::Playing {
            self.turn += 1;
            self.resolve_pacman();
            self.update_pens();
            if self.turn % 2 == 1 || self.pill_timer == 0 {
                self.resolve_ghosts();
            }
            if self.pill_timer > 0 {
                self.pill_timer -= 1;
            }
        }

        if self.mode == GameMode::Finished && self.automation_remaining > 0 {
            self.roll_over();
        }
    }

    pub(super) fn resolve_pacman(&mut self) {
        let planned = {
            let mut ctx = PlanContext {
                board: &self.board,
                pill_timer: self.pill_timer,
                pacman: self.pacman.entity.pos,
                rng: &mut self.rng,
            };
            self.pacman.next_move(&mut ctx)
        };
        // No move: the player keeps its cell and heading.
        let Some(mv) = planned else {
            return;
        };

        if self.pill_timer == 0 {
            if let Some(Occupant::Ghost(id)) = self.board.occupant_at(mv.target) {
                self.caught_by(id);
                return;
            }
        }

        self.pacman.move_to(
            &mut self.board,
            mv,
            &mut self.pill_timer,
            &mut self.ghosts,
            &mut self.events,
        );
    }

    pub(super) fn update_pens(&mut self) {
        for ghost in &mut self.ghosts {
            if ghost.tick_pen(&mut self.board) {
                self.events.push(GameEvent::GhostReturned { ghost: ghost.id });
            }
        }
    }

    pub(super) fn resolve_ghosts(&mut self) {
        for idx in 0..self.ghosts.len() {
            let planned = {
                let mut ctx = PlanContext {
                    board: &self.board,
                    pill_timer: self.pill_timer,
                    pacman: self.pacman.entity.pos,
                    rng: &mut self.rng,
                };
                self.ghosts[idx].next_move(&mut ctx)
            };
            let Some(mv) = planned else {
                continue;
            };

            if self.board.occupant_at(mv.target) == Some(Occupant::Pacman) {
                // A powered player is hunting; the ghost does not walk into it.
                if self.pill_timer == 0 {
                    self.ghosts[idx].commit_move(&mut self.board, mv);
                    let id = self.ghosts[idx].id;
                    self.caught_by(id);
                }
                continue;
            }
            self.ghosts[idx].commit_move(&mut self.board, mv);
        }
    }

    fn caught_by(&mut self, ghost: usize) {
        if self.mode != GameMode::Playing {
            return;
        }
        self.events.push(GameEvent::PlayerCaught { ghost });
        self.finish(FinishReason::Caught);
    }

    fn finish(&mut self, reason: FinishReason) {
        if self.mode != GameMode::Playing {
            return;
        }
        self.mode = GameMode::Finished;
        self.finish_reason = Some(reason);
        self.events.push(GameEvent::RoundFinished {
            reason,
            score: self.pacman.score,
            turn: self.turn,
        });
    }

    fn roll_over(&mut self) {
        self.fold_round();
        self.automation_remaining -= 1;
        self.rebuild();
        self.events.push(GameEvent::RoundRolledOver {
            iteration: self.iteration,
            rounds_remaining: self.automation_remaining,
        });
    }
}
