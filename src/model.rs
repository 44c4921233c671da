use serde::{Deserialize, Serialize};

/// Axis-aligned box in PDF user space; y grows upward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    #[must_use]
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

/// A positioned piece of text as laid out on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub bounds: Rect,
    pub text: String,
}

impl TextFragment {
    #[must_use]
    pub fn new(bounds: Rect, text: impl Into<String>) -> Self {
        Self {
            bounds,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageFragments {
    pub page_number: u32,
    pub fragments: Vec<TextFragment>,
}

/// The seven report columns, in left-to-right order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    GameDate,
    GameTime,
    Matchup,
    Team,
    PlayerName,
    CurrentStatus,
    Reason,
}

impl Column {
    pub const COUNT: usize = 7;

    pub const ALL: [Column; Self::COUNT] = [
        Self::GameDate,
        Self::GameTime,
        Self::Matchup,
        Self::Team,
        Self::PlayerName,
        Self::CurrentStatus,
        Self::Reason,
    ];

    #[must_use]
    pub const fn rank(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_rank(rank: usize) -> Option<Self> {
        Self::ALL.get(rank).copied()
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::GameDate => "Game Date",
            Self::GameTime => "Game Time",
            Self::Matchup => "Matchup",
            Self::Team => "Team",
            Self::PlayerName => "Player Name",
            Self::CurrentStatus => "Current Status",
            Self::Reason => "Reason",
        }
    }

    /// Date, time, matchup and team persist across rows until re-supplied.
    #[must_use]
    pub const fn is_sticky(self) -> bool {
        matches!(
            self,
            Self::GameDate | Self::GameTime | Self::Matchup | Self::Team
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub game_date: Option<String>,
    pub game_time: Option<String>,
    pub matchup: Option<String>,
    pub team: Option<String>,
    pub player_name: Option<String>,
    pub current_status: Option<String>,
    pub reason: Option<String>,
}

impl Record {
    #[must_use]
    pub fn from_slots(slots: [Option<String>; Column::COUNT]) -> Self {
        let [
            game_date,
            game_time,
            matchup,
            team,
            player_name,
            current_status,
            reason,
        ] = slots;
        Self {
            game_date,
            game_time,
            matchup,
            team,
            player_name,
            current_status,
            reason,
        }
    }

    #[must_use]
    pub fn get(&self, column: Column) -> Option<&str> {
        let value = match column {
            Column::GameDate => &self.game_date,
            Column::GameTime => &self.game_time,
            Column::Matchup => &self.matchup,
            Column::Team => &self.team,
            Column::PlayerName => &self.player_name,
            Column::CurrentStatus => &self.current_status,
            Column::Reason => &self.reason,
        };
        value.as_deref()
    }

    /// CSV cells in header order; absent fields become empty cells.
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        Column::ALL
            .iter()
            .map(|&column| self.get(column).unwrap_or_default().to_string())
            .collect()
    }
}
