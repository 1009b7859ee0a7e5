use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Table position relative to the button. `Early(k)` covers the extra
/// early-position seats at tables larger than 6-max.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Position {
    Utg,
    Hj,
    Co,
    Btn,
    Sb,
    Bb,
    Early(u8),
}

impl Position {
    /// The label used in frequency-table scenario keys.
    pub fn key(&self) -> String {
        match self {
            Position::Utg => "UTG".to_string(),
            Position::Hj => "HJ".to_string(),
            Position::Co => "CO".to_string(),
            Position::Btn => "BTN".to_string(),
            Position::Sb => "SB".to_string(),
            Position::Bb => "BB".to_string(),
            Position::Early(k) => format!("EP{k}"),
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "UTG" => Ok(Position::Utg),
            "HJ" => Ok(Position::Hj),
            "CO" => Ok(Position::Co),
            "BTN" => Ok(Position::Btn),
            "SB" => Ok(Position::Sb),
            "BB" => Ok(Position::Bb),
            other => {
                if let Some(k) = other.strip_prefix("EP") {
                    k.parse::<u8>()
                        .map(Position::Early)
                        .map_err(|_| format!("Invalid position '{s}'"))
                } else {
                    Err(format!("Invalid position '{s}'"))
                }
            }
        }
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.key())
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Assigns a position to every occupied seat, button-relative.
///
/// `seats` must be the occupied seat numbers sorted ascending. For 6-max
/// tables the standard fixed mapping applies; other table sizes fall back
/// to a generic rule that keeps BTN/SB/BB and fills in from CO backwards.
/// The returned pairs are a bijection over the occupied seats.
pub fn seat_positions(button_seat: u32, seats: &[u32]) -> Vec<(u32, Position)> {
    let n = seats.len();
    if n == 0 {
        return Vec::new();
    }

    let button_index = seats
        .iter()
        .position(|&seat| seat == button_seat)
        .unwrap_or(0);

    seats
        .iter()
        .enumerate()
        .map(|(i, &seat)| {
            let r = (i + n - button_index) % n;
            (seat, position_for_offset(r, n))
        })
        .collect()
}

fn position_for_offset(r: usize, n: usize) -> Position {
    if n == 6 {
        return match r {
            0 => Position::Btn,
            1 => Position::Sb,
            2 => Position::Bb,
            3 => Position::Utg,
            4 => Position::Hj,
            _ => Position::Co,
        };
    }

    match r {
        0 => Position::Btn,
        1 => Position::Sb,
        2 => Position::Bb,
        r if r == n - 1 => Position::Co,
        r if r == n - 2 => Position::Hj,
        r => Position::Early((r - 2) as u8),
    }
}
