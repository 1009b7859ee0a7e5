use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

impl Street {
    pub const ALL: [Street; 4] = [Street::Preflop, Street::Flop, Street::Turn, Street::River];
}

/// A parsed betting action. `to_amount` on a raise is the total bet size
/// for the street, not the increment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Action {
    Fold,
    Check,
    Call { amount: f64 },
    Bet { amount: f64 },
    Raise { amount: f64, to_amount: f64 },
    PostSmallBlind { amount: f64 },
    PostBigBlind { amount: f64 },
    Show,
    Muck,
}

impl Action {
    pub fn is_blind_post(&self) -> bool {
        matches!(
            self,
            Action::PostSmallBlind { .. } | Action::PostBigBlind { .. }
        )
    }

    pub fn is_raise(&self) -> bool {
        matches!(self, Action::Raise { .. } | Action::Bet { .. })
    }

    /// The decision type this action resolves to, if it is a voluntary
    /// betting decision. Blind posts and showdown bookkeeping yield `None`.
    pub fn decision_kind(&self) -> Option<HeroActionKind> {
        match self {
            Action::Fold => Some(HeroActionKind::Fold),
            Action::Check => Some(HeroActionKind::Check),
            Action::Call { .. } => Some(HeroActionKind::Call),
            Action::Bet { .. } | Action::Raise { .. } => Some(HeroActionKind::Raise),
            _ => None,
        }
    }
}

/// The action types a final preflop decision can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeroActionKind {
    Fold,
    Check,
    Call,
    Raise,
}

/// One betting action attributed to a seated player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub player: String,
    pub action: Action,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub seat: u32,
    pub stack: f64,
    pub position: Option<Position>,
    pub hole_cards: Option<[Card; 2]>,
    pub is_hero: bool,
}

/// A fully parsed hand transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hand {
    pub id: String,
    pub timestamp: NaiveDateTime,
    pub table_name: String,
    pub small_blind: f64,
    pub big_blind: f64,
    pub max_seats: u32,
    pub button_seat: u32,
    pub players: Vec<Player>,
    pub preflop: Vec<ActionEntry>,
    pub flop: Vec<ActionEntry>,
    pub turn: Vec<ActionEntry>,
    pub river: Vec<ActionEntry>,
    /// Community cards in reveal order: 0, 3, 4 or 5 entries.
    pub board: Vec<Card>,
    pub pot: Option<f64>,
    pub rake: Option<f64>,
    pub winners: BTreeMap<String, f64>,
    /// Original transcript text, kept for audit and debugging.
    pub raw: String,
}

impl Hand {
    pub fn hero(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_hero)
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn street_actions(&self, street: Street) -> &[ActionEntry] {
        match street {
            Street::Preflop => &self.preflop,
            Street::Flop => &self.flop,
            Street::Turn => &self.turn,
            Street::River => &self.river,
        }
    }
}
