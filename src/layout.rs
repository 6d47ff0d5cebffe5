use crate::board::{Board, Occupant};
use crate::types::{ItemKind, Vec2};

/// Fixed maze shape. `P` marks the player spawn and each `G` a ghost home;
/// both stand on empty floor.
pub const CLASSIC_MAZE: [&str; 17] = [
    "###################",
    "#o.......#.......o#",
    "#.##.###.#.###.##.#",
    "#.................#",
    "#.##.#.#####.#.##.#",
    "#....#...#...#....#",
    "####.###.#.###.####",
    "#....  GG GG  ....#",
    "####.#.#####.#.####",
    "#........%........#",
    "#.##.###.#.###.##.#",
    "#o.#.....P.....#.o#",
    "##.#.#.#####.#.#.##",
    "#....#...#...#....#",
    "#.######.#.######.#",
    "#.................#",
    "###################",
];

/// Initial item grid and agent placement handed to every fresh round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    pub items: Vec<Vec<ItemKind>>,
    pub pacman_spawn: Vec2,
    pub ghost_homes: Vec<Vec2>,
}

impl Layout {
    /// Parses glyph rows. Requires a rectangular grid, known glyphs and exactly one player spawn.
    pub fn parse(lines: &[&str]) -> Option<Self> {
        let mut items = Vec::with_capacity(lines.len());
        let mut pacman_spawn = None;
        let mut ghost_homes = Vec::new();

        for (y, line) in lines.iter().enumerate() {
            let mut row = Vec::with_capacity(line.len());
            for (x, glyph) in line.chars().enumerate() {
                let kind = ItemKind::from_glyph(glyph)?;
                let pos = Vec2::new(x as i32, y as i32);
                match kind {
                    ItemKind::Pacman => {
                        if pacman_spawn.replace(pos).is_some() {
                            return None;
                        }
                    }
                    ItemKind::Ghost => ghost_homes.push(pos),
                    _ => {}
                }
                row.push(kind);
            }
            items.push(row);
        }

        let width = items.first()?.len();
        if width == 0 || items.iter().any(|row| row.len() != width) {
            return None;
        }
        Some(Self {
            items,
            pacman_spawn: pacman_spawn?,
            ghost_homes,
        })
    }

    pub fn classic() -> Self {
        Self::parse(&CLASSIC_MAZE).expect("built-in maze should parse")
    }

    /// Fresh board with every agent standing on its spawn cell.
    pub fn build_board(&self) -> Option<Board> {
        let mut board = Board::from_items(&self.items)?;
        board.set_occupant(self.pacman_spawn, Some(Occupant::Pacman));
        for (idx, home) in self.ghost_homes.iter().enumerate() {
            board.set_occupant(*home, Some(Occupant::Ghost(idx)));
        }
        Some(board)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::classic()
    }
}
