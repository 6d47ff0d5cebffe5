use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    /// Canonical planning order. Ties that survive jitter resolve to the earliest entry.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// `(dx, dy)` step on the grid; rows grow downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::None => (0, 0),
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::None => Self::None,
        }
    }

    pub fn is_reverse_of(self, other: Self) -> bool {
        self != Self::None && other != Self::None && self.reverse() == other
    }

    /// Keyboard symbol table. Unknown keys map to nothing.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_uppercase().as_str() {
            "W" | "K" | "ARROWUP" => Some(Self::Up),
            "S" | "J" | "ARROWDOWN" => Some(Self::Down),
            "A" | "H" | "ARROWLEFT" => Some(Self::Left),
            "D" | "L" | "ARROWRIGHT" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// What a grid slot shows. The discriminant is the points awarded for eating it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum ItemKind {
    Empty = 0,
    Wall = 1,
    Pacman = 2,
    Biscuit = 10,
    Pill = 30,
    Cherry = 50,
    Ghost = 100,
}

impl ItemKind {
    pub fn weight(self) -> i32 {
        self as i32
    }

    pub fn glyph(self) -> char {
        match self {
            Self::Empty => ' ',
            Self::Wall => '#',
            Self::Pacman => 'P',
            Self::Biscuit => '.',
            Self::Pill => 'o',
            Self::Cherry => '%',
            Self::Ghost => 'G',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            ' ' => Some(Self::Empty),
            '#' => Some(Self::Wall),
            'P' => Some(Self::Pacman),
            '.' => Some(Self::Biscuit),
            'o' => Some(Self::Pill),
            '%' => Some(Self::Cherry),
            'G' => Some(Self::Ghost),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Playing,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Caught,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Candidate relocation: the cell an agent would enter and the heading it ends up with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    pub target: Vec2,
    pub direction: Direction,
}

#[derive(Clone, Debug, Serialize)]
pub struct PacmanView {
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    pub score: i32,
    #[serde(rename = "desiredDir")]
    pub desired_dir: Option<Direction>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub id: usize,
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    #[serde(rename = "inPlay")]
    pub in_play: bool,
    #[serde(rename = "pennedFor")]
    pub penned_for: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    BiscuitEaten {
        x: i32,
        y: i32,
    },
    PillTaken {
        x: i32,
        y: i32,
    },
    CherryTaken {
        x: i32,
        y: i32,
    },
    GhostEaten {
        ghost: usize,
    },
    GhostReturned {
        ghost: usize,
    },
    PlayerCaught {
        ghost: usize,
    },
    RoundFinished {
        reason: FinishReason,
        score: i32,
        turn: u64,
    },
    RoundRolledOver {
        iteration: u64,
        #[serde(rename = "roundsRemaining")]
        rounds_remaining: u32,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub turn: u64,
    pub mode: GameMode,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<FinishReason>,
    #[serde(rename = "pillTimer")]
    pub pill_timer: u32,
    pub score: i32,
    #[serde(rename = "runningScore")]
    pub running_score: i64,
    pub iteration: u64,
    #[serde(rename = "automationRemaining")]
    pub automation_remaining: u32,
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<String>,
    pub pacman: PacmanView,
    pub ghosts: Vec<GhostView>,
    pub events: Vec<GameEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_cardinal_reverses_back_to_itself() {
        for dir in Direction::CARDINALS {
            assert_ne!(dir.reverse(), dir);
            assert_eq!(dir.reverse().reverse(), dir);
            let (dx, dy) = dir.delta();
            let (rx, ry) = dir.reverse().delta();
            assert_eq!((dx + rx, dy + ry), (0, 0));
        }
        assert_eq!(Direction::None.reverse(), Direction::None);
        assert!(!Direction::None.is_reverse_of(Direction::Up));
        assert!(Direction::Left.is_reverse_of(Direction::Right));
    }

    #[test]
    fn key_mapping_is_case_insensitive_and_lenient() {
        assert_eq!(Direction::from_key("w"), Some(Direction::Up));
        assert_eq!(Direction::from_key("W"), Some(Direction::Up));
        assert_eq!(Direction::from_key("ArrowLeft"), Some(Direction::Left));
        assert_eq!(Direction::from_key("arrowright"), Some(Direction::Right));
        assert_eq!(Direction::from_key("j"), Some(Direction::Down));
        assert_eq!(Direction::from_key("q"), None);
        assert_eq!(Direction::from_key(""), None);
    }

    #[test]
    fn item_weights_double_as_score() {
        assert_eq!(ItemKind::Empty.weight(), 0);
        assert!(ItemKind::Biscuit.weight() > 0);
        assert!(ItemKind::Pill.weight() > ItemKind::Biscuit.weight());
        assert!(ItemKind::Cherry.weight() > 0);
        for kind in [
            ItemKind::Empty,
            ItemKind::Wall,
            ItemKind::Pacman,
            ItemKind::Biscuit,
            ItemKind::Pill,
            ItemKind::Cherry,
            ItemKind::Ghost,
        ] {
            assert_eq!(ItemKind::from_glyph(kind.glyph()), Some(kind));
        }
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let text = serde_json::to_string(&GameEvent::GhostEaten { ghost: 2 })
            .expect("event should serialize");
        assert_eq!(text, r#"{"type":"ghost_eaten","ghost":2}"#);
    }
}
