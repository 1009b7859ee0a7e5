use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::game::{Hand, HeroActionKind};
use crate::position::Position;

/// The preflop situation the hero ended up resolving. Frequency tables are
/// keyed by scenario, so anything the tables do not model maps to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scenario {
    #[serde(rename = "rfi")]
    Rfi,
    #[serde(rename = "vs_rfi")]
    VsRfi,
    #[serde(rename = "vs_3bet")]
    Vs3Bet,
    #[serde(rename = "vs_4bet")]
    Vs4Bet,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Scenario {
    pub fn key_fragment(&self) -> &'static str {
        match self {
            Scenario::Rfi => "rfi",
            Scenario::VsRfi => "vs_rfi",
            Scenario::Vs3Bet => "vs_3bet",
            Scenario::Vs4Bet => "vs_4bet",
            Scenario::Unknown => "unknown",
        }
    }
}

/// The hero's classified preflop spot: scenario, the villain position that
/// defines it (if any), and the hero's final decision type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub scenario: Scenario,
    pub villain: Option<Position>,
    pub hero_action: Option<HeroActionKind>,
}

impl Classification {
    fn unknown() -> Self {
        Self {
            scenario: Scenario::Unknown,
            villain: None,
            hero_action: None,
        }
    }
}

#[derive(Debug, Clone)]
struct Raiser {
    player: String,
    position: Option<Position>,
}

/// Classifies the hero's final preflop decision.
///
/// A player can pass through several roles in one hand (opener, then
/// 3-bet victim, then caller); only the last role they resolved matters,
/// so the hero's final action is always the last of their recorded
/// preflop action types.
pub fn classify(hand: &Hand) -> Classification {
    let Some(hero) = hand.hero() else {
        return Classification::unknown();
    };

    // Blind posts are forced bets, not decisions.
    let voluntary: Vec<_> = hand
        .preflop
        .iter()
        .filter(|entry| !entry.action.is_blind_post())
        .collect();

    let raisers: Vec<Raiser> = voluntary
        .iter()
        .filter(|entry| entry.action.is_raise())
        .map(|entry| Raiser {
            player: entry.player.clone(),
            position: hand.player(&entry.player).and_then(|p| p.position),
        })
        .collect();

    let hero_kinds: Vec<HeroActionKind> = voluntary
        .iter()
        .filter(|entry| entry.player == hero.name)
        .filter_map(|entry| entry.action.decision_kind())
        .collect();

    let Some(&final_action) = hero_kinds.last() else {
        return Classification::unknown();
    };

    if raisers.is_empty() {
        // Unopened pot: limps and blind checks, which the reference
        // frequency tables do not model.
        return Classification {
            scenario: Scenario::Unknown,
            villain: None,
            hero_action: Some(final_action),
        };
    }

    let first = &raisers[0];
    let second = raisers.get(1);
    let third = raisers.get(2);
    let is_hero = |r: &Raiser| r.player == hero.name;

    if hero_kinds.len() == 1 && is_hero(first) && second.is_none() {
        return Classification {
            scenario: Scenario::Rfi,
            villain: None,
            hero_action: Some(final_action),
        };
    }

    if hero_kinds.len() == 1 && !is_hero(first) {
        return Classification {
            scenario: Scenario::VsRfi,
            villain: first.position,
            hero_action: Some(final_action),
        };
    }

    if hero_kinds.len() >= 2
        && is_hero(first)
        && let Some(second) = second
        && !is_hero(second)
    {
        match third {
            None => {
                return Classification {
                    scenario: Scenario::Vs3Bet,
                    villain: second.position,
                    hero_action: Some(final_action),
                };
            }
            Some(third) if is_hero(third) => {
                return Classification {
                    scenario: Scenario::Vs3Bet,
                    villain: second.position,
                    hero_action: Some(final_action),
                };
            }
            Some(_) => {
                // A third party re-raised after the hero's 4-bet: a
                // 5-bet-or-later spot the tables do not cover.
                debug!(hand = %hand.id, "unclassified deep raise sequence");
                return Classification::unknown();
            }
        }
    }

    if let Some(second) = second
        && is_hero(second)
    {
        if let Some(third) = third {
            if hero_kinds.len() >= 2 && !is_hero(third) {
                return Classification {
                    scenario: Scenario::Vs4Bet,
                    villain: third.position,
                    hero_action: Some(final_action),
                };
            }
        } else {
            // The hero's 3-bet was itself the response to the open, so
            // this is really a vs-RFI spot resolved with a raise.
            return Classification {
                scenario: Scenario::VsRfi,
                villain: first.position,
                hero_action: Some(HeroActionKind::Raise),
            };
        }
    }

    Classification::unknown()
}
