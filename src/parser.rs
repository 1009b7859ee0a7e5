use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::game::{Action, ActionEntry, Hand, Player, Street};
use crate::position::seat_positions;

const HAND_MARKER: &str = "Poker Hand #";
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^Poker Hand #([A-Za-z0-9]+): (.+?) \(\$([0-9.]+)/\$([0-9.]+)\) - (\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2})",
    )
    .expect("header regex")
});
static TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Table '(.+?)' (\d+)-max Seat #(\d+) is the button").expect("table regex")
});
static SEAT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Seat (\d+): (.+?) \(\$([0-9.]+) in chips\)").expect("seat regex"));
static DEALT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Dealt to (.+?) \[(\S+) (\S+)\]").expect("dealt regex"));
static BRACKET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\[\]]+)\]").expect("board regex"));
static POT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Total pot \$?([0-9.]+)(?:.*?Rake\D*?([0-9.]+))?").expect("pot regex")
});
static COLLECTED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?) collected \$?([0-9.]+) from (?:the )?pot").expect("collected regex")
});
static WON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:Seat \d+: )?(.+?)(?: \([a-z ]+\))? won \(\$?([0-9.]+)\)").expect("won regex")
});
static CALLS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^calls \$?([0-9.]+)").expect("calls regex"));
static BETS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^bets \$?([0-9.]+)").expect("bets regex"));
static RAISES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^raises \$?([0-9.]+) to \$?([0-9.]+)").expect("raises regex"));
static POSTS_SB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^posts small blind \$?([0-9.]+)").expect("small blind regex"));
static POSTS_BB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^posts big blind \$?([0-9.]+)").expect("big blind regex"));

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("missing or malformed hand header")]
    MissingHeader,
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
    #[error("missing or malformed table line")]
    MissingTableLine,
    #[error("hand {0} has no seated players")]
    NoPlayers(String),
    #[error("hand {0} repeats seat {1}")]
    DuplicateSeat(String, u32),
}

/// Result of parsing a transcript blob. Unparseable hands are skipped and
/// counted; unrecognized action phrasing inside an otherwise valid hand is
/// dropped and only tallied here.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub hands: Vec<Hand>,
    pub skipped_hands: usize,
    pub ignored_action_lines: usize,
}

/// Parses a blob of zero or more concatenated hand transcripts.
///
/// A structurally broken hand (bad header or table line) is logged and
/// skipped; the rest of the blob is still processed. An empty input yields
/// an empty outcome, never an error.
pub fn parse(text: &str) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    for block in split_blocks(text) {
        match parse_block(&block) {
            Ok((hand, ignored)) => {
                outcome.ignored_action_lines += ignored;
                outcome.hands.push(hand);
            }
            Err(err) => {
                warn!(error = %err, "skipping unparseable hand block");
                outcome.skipped_hands += 1;
            }
        }
    }

    outcome
}

/// Splits the blob on blank-line boundaries that precede the hand header
/// marker. Content before the first marker stays attached to the first
/// block and is rejected there if it is not a valid header.
fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();
    let mut prev_blank = true;

    for line in text.lines() {
        if line.starts_with(HAND_MARKER) && prev_blank && !current.trim().is_empty() {
            blocks.push(std::mem::take(&mut current));
        }
        prev_blank = line.trim().is_empty();
        current.push_str(line);
        current.push('\n');
    }
    if !current.trim().is_empty() {
        blocks.push(current);
    }

    blocks
}

/// Per-street running state threaded through line processing.
struct StreetCursor {
    street: Street,
    /// Highest total bet seen on the current street, used to flag
    /// out-of-order raise sizes in malformed fixtures.
    highest_bet: f64,
    in_summary: bool,
    ignored_action_lines: usize,
}

impl StreetCursor {
    fn new() -> Self {
        Self {
            street: Street::Preflop,
            highest_bet: 0.0,
            in_summary: false,
            ignored_action_lines: 0,
        }
    }

    fn advance(&mut self, street: Street) {
        self.street = street;
        self.highest_bet = 0.0;
    }
}

fn parse_block(block: &str) -> Result<(Hand, usize), ParseError> {
    let mut lines = block.lines().map(str::trim).filter(|l| !l.is_empty());

    let header_line = lines.next().ok_or(ParseError::MissingHeader)?;
    let header = HEADER_RE
        .captures(header_line)
        .ok_or(ParseError::MissingHeader)?;
    let id = header[1].to_string();
    let small_blind = parse_amount(&header[3]);
    let big_blind = parse_amount(&header[4]);
    let timestamp = NaiveDateTime::parse_from_str(&header[5], TIMESTAMP_FORMAT)
        .map_err(|_| ParseError::InvalidTimestamp(header[5].to_string()))?;

    let table_line = lines.next().ok_or(ParseError::MissingTableLine)?;
    let table = TABLE_RE
        .captures(table_line)
        .ok_or(ParseError::MissingTableLine)?;
    let table_name = table[1].to_string();
    let max_seats: u32 = table[2].parse().map_err(|_| ParseError::MissingTableLine)?;
    let button_seat: u32 = table[3].parse().map_err(|_| ParseError::MissingTableLine)?;

    let mut hand = Hand {
        id,
        timestamp,
        table_name,
        small_blind,
        big_blind,
        max_seats,
        button_seat,
        players: Vec::new(),
        preflop: Vec::new(),
        flop: Vec::new(),
        turn: Vec::new(),
        river: Vec::new(),
        board: Vec::new(),
        pot: None,
        rake: None,
        winners: BTreeMap::new(),
        raw: block.to_string(),
    };

    // Seat block: consume until a line stops matching the seat grammar.
    let mut pending: Option<&str> = None;
    for line in lines.by_ref() {
        let Some(seat) = SEAT_RE.captures(line) else {
            pending = Some(line);
            break;
        };
        let seat_no: u32 = seat[1].parse().map_err(|_| ParseError::MissingTableLine)?;
        if hand.players.iter().any(|p| p.seat == seat_no) {
            return Err(ParseError::DuplicateSeat(hand.id, seat_no));
        }
        let name = seat[2].to_string();
        hand.players.push(Player {
            is_hero: name == "Hero",
            name,
            seat: seat_no,
            stack: parse_amount(&seat[3]),
            position: None,
            hole_cards: None,
        });
    }
    if hand.players.is_empty() {
        return Err(ParseError::NoPlayers(hand.id));
    }

    resolve_positions(&mut hand);

    let mut cursor = StreetCursor::new();
    if let Some(line) = pending {
        process_line(&mut hand, &mut cursor, line);
    }
    for line in lines {
        process_line(&mut hand, &mut cursor, line);
    }

    let ignored = cursor.ignored_action_lines;
    Ok((hand, ignored))
}

fn resolve_positions(hand: &mut Hand) {
    let mut seats: Vec<u32> = hand.players.iter().map(|p| p.seat).collect();
    seats.sort_unstable();
    for (seat, position) in seat_positions(hand.button_seat, &seats) {
        if let Some(player) = hand.players.iter_mut().find(|p| p.seat == seat) {
            player.position = Some(position);
        }
    }
}

fn process_line(hand: &mut Hand, cursor: &mut StreetCursor, line: &str) {
    if line.is_empty() {
        return;
    }

    if line.starts_with("*** ") {
        process_street_marker(hand, cursor, line);
        return;
    }

    if let Some(dealt) = DEALT_RE.captures(line) {
        assign_hole_cards(hand, &dealt[1], &dealt[2], &dealt[3]);
        return;
    }

    if let Some(pot) = POT_RE.captures(line) {
        hand.pot = Some(parse_amount(&pot[1]));
        hand.rake = pot.get(2).map(|m| parse_amount(m.as_str()));
        return;
    }

    if let Some(win) = COLLECTED_RE.captures(line) {
        let amount = parse_amount(&win[2]);
        *hand.winners.entry(win[1].to_string()).or_insert(0.0) += amount;
        return;
    }
    if let Some(win) = WON_RE.captures(line) {
        let amount = parse_amount(&win[2]);
        *hand.winners.entry(win[1].to_string()).or_insert(0.0) += amount;
        return;
    }

    if cursor.in_summary {
        return;
    }

    process_action_line(hand, cursor, line);
}

fn process_street_marker(hand: &mut Hand, cursor: &mut StreetCursor, line: &str) {
    if line.contains("HOLE CARDS") {
        cursor.advance(Street::Preflop);
    } else if line.contains("FLOP") {
        cursor.advance(Street::Flop);
        if let Some(group) = BRACKET_RE.captures(line) {
            hand.board = parse_cards(&group[1]);
        }
    } else if line.contains("TURN") || line.contains("RIVER") {
        cursor.advance(if line.contains("TURN") {
            Street::Turn
        } else {
            Street::River
        });
        // The newly revealed card is the last bracket group on the line.
        if let Some(group) = BRACKET_RE.captures_iter(line).last() {
            hand.board.extend(parse_cards(&group[1]));
        }
    } else if line.contains("SHOW DOWN") || line.contains("SHOWDOWN") || line.contains("SUMMARY") {
        cursor.in_summary = true;
    }
}

fn assign_hole_cards(hand: &mut Hand, name: &str, first: &str, second: &str) {
    let (Ok(first), Ok(second)) = (first.parse(), second.parse()) else {
        debug!(player = name, "unreadable hole cards");
        return;
    };
    // Hero status comes from the seat name alone; a dealt line for
    // anyone else is recorded as noise, not a promotion.
    match hand.players.iter_mut().find(|p| p.name == name) {
        Some(player) if player.is_hero => player.hole_cards = Some([first, second]),
        _ => debug!(player = name, "dealt line for non-hero player"),
    }
}

/// Offers a line to the action grammar. Unrecognized phrasing is dropped
/// silently; only a diagnostic counter records that something was there.
fn process_action_line(hand: &mut Hand, cursor: &mut StreetCursor, line: &str) {
    if line.contains("collected")
        || line.contains("returned")
        || line.contains("shows")
        || line.contains("mucks")
    {
        return;
    }
    let Some((player, text)) = line.split_once(": ") else {
        return;
    };
    if hand.player(player).is_none() {
        return;
    }
    let text = text.trim();

    let action = if text.eq_ignore_ascii_case("folds") {
        Some(Action::Fold)
    } else if text.eq_ignore_ascii_case("checks") {
        Some(Action::Check)
    } else if let Some(c) = CALLS_RE.captures(text) {
        Some(Action::Call {
            amount: parse_amount(&c[1]),
        })
    } else if let Some(c) = BETS_RE.captures(text) {
        let amount = parse_amount(&c[1]);
        cursor.highest_bet = cursor.highest_bet.max(amount);
        Some(Action::Bet { amount })
    } else if let Some(c) = RAISES_RE.captures(text) {
        let amount = parse_amount(&c[1]);
        let to_amount = parse_amount(&c[2]);
        if to_amount < cursor.highest_bet {
            debug!(
                hand = %hand.id,
                player,
                to_amount,
                highest = cursor.highest_bet,
                "raise total below prior street bet"
            );
        }
        cursor.highest_bet = cursor.highest_bet.max(to_amount);
        Some(Action::Raise { amount, to_amount })
    } else if let Some(c) = POSTS_SB_RE.captures(text) {
        Some(Action::PostSmallBlind {
            amount: parse_amount(&c[1]),
        })
    } else if let Some(c) = POSTS_BB_RE.captures(text) {
        Some(Action::PostBigBlind {
            amount: parse_amount(&c[1]),
        })
    } else {
        cursor.ignored_action_lines += 1;
        None
    };

    if let Some(action) = action {
        let entry = ActionEntry {
            player: player.to_string(),
            action,
        };
        match cursor.street {
            Street::Preflop => hand.preflop.push(entry),
            Street::Flop => hand.flop.push(entry),
            Street::Turn => hand.turn.push(entry),
            Street::River => hand.river.push(entry),
        }
    }
}

fn parse_cards(group: &str) -> Vec<crate::cards::Card> {
    group
        .split_whitespace()
        .filter_map(|token| token.parse().ok())
        .collect()
}

fn parse_amount(text: &str) -> f64 {
    text.parse().unwrap_or_default()
}
