use crate::types::{ItemKind, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Occupant {
    Pacman,
    Ghost(usize),
}

impl Occupant {
    pub fn kind(self) -> ItemKind {
        match self {
            Self::Pacman => ItemKind::Pacman,
            Self::Ghost(_) => ItemKind::Ghost,
        }
    }
}

/// One grid slot: what lies on the floor plus whoever stands on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub background: ItemKind,
    pub occupant: Option<Occupant>,
}

impl Cell {
    /// The item this slot presents to planners: the occupant hides the floor.
    pub fn item(&self) -> ItemKind {
        self.occupant
            .map(Occupant::kind)
            .unwrap_or(self.background)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Board {
    /// Builds a board from background rows. Agent markers become empty floor.
    /// Returns `None` for an empty or ragged grid.
    pub fn from_items(rows: &[Vec<ItemKind>]) -> Option<Self> {
        let height = rows.len();
        let width = rows.first()?.len();
        if width == 0 || rows.iter().any(|row| row.len() != width) {
            return None;
        }
        let cells = rows
            .iter()
            .flat_map(|row| row.iter())
            .map(|kind| Cell {
                background: floor_kind(*kind),
                occupant: None,
            })
            .collect();
        Some(Self {
            width: width as i32,
            height: height as i32,
            cells,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: Vec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Vec2) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some((pos.y * self.width + pos.x) as usize)
    }

    pub fn cell_at(&self, pos: Vec2) -> Option<&Cell> {
        self.index(pos).and_then(|idx| self.cells.get(idx))
    }

    pub fn item_at(&self, pos: Vec2) -> Option<ItemKind> {
        self.cell_at(pos).map(Cell::item)
    }

    pub fn is_wall(&self, pos: Vec2) -> bool {
        self.cell_at(pos)
            .map(|cell| cell.background == ItemKind::Wall)
            .unwrap_or(false)
    }

    pub fn occupant_at(&self, pos: Vec2) -> Option<Occupant> {
        self.cell_at(pos).and_then(|cell| cell.occupant)
    }

    /// Returns `false` when `pos` is outside the grid.
    pub fn set_occupant(&mut self, pos: Vec2, occupant: Option<Occupant>) -> bool {
        let Some(idx) = self.index(pos) else {
            return false;
        };
        self.cells[idx].occupant = occupant;
        true
    }

    pub fn set_background(&mut self, pos: Vec2, kind: ItemKind) -> bool {
        let Some(idx) = self.index(pos) else {
            return false;
        };
        self.cells[idx].background = floor_kind(kind);
        true
    }

    /// Clears `occupant` from `pos` only if it is still the one standing there.
    pub fn vacate(&mut self, pos: Vec2, occupant: Occupant) {
        if let Some(idx) = self.index(pos) {
            if self.cells[idx].occupant == Some(occupant) {
                self.cells[idx].occupant = None;
            }
        }
    }

    /// Overwrites every background item while leaving occupants in place.
    /// A grid of a different shape leaves the board untouched.
    pub fn replace_items(&mut self, rows: &[Vec<ItemKind>]) {
        if rows.len() != self.height as usize
            || rows.iter().any(|row| row.len() != self.width as usize)
        {
            return;
        }
        for (cell, kind) in self.cells.iter_mut().zip(rows.iter().flatten()) {
            cell.background = floor_kind(*kind);
        }
    }

    pub fn render_rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width as usize)
            .map(|row| row.iter().map(|cell| cell.item().glyph()).collect())
            .collect()
    }
}

fn floor_kind(kind: ItemKind) -> ItemKind {
    match kind {
        ItemKind::Pacman | ItemKind::Ghost => ItemKind::Empty,
        other => other,
    }
}

/// Glyph rows for hand-drawn test boards.
#[cfg(test)]
pub(crate) fn glyph_rows(lines: &[&str]) -> Vec<Vec<ItemKind>> {
    lines
        .iter()
        .map(|line| {
            line.chars()
                .map(|c| ItemKind::from_glyph(c).expect("known glyph"))
                .collect()
        })
        .collect()
}

#[cfg(test)]
impl Board {
    pub(crate) fn from_glyphs(lines: &[&str]) -> Self {
        Self::from_items(&glyph_rows(lines)).expect("valid grid")
    }
}
