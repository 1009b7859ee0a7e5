use tracing::debug;

use crate::cards::hand_notation;
use crate::frequency::{Decision, FrequencyTables, evaluate};
use crate::game::Hand;
use crate::parser::{self, ParseOutcome};
use crate::report::LeakReport;
use crate::scenario::{Scenario, classify};

/// The full result of an analysis run: the aggregated report plus the
/// per-hand decisions it was folded from, in original hand order.
#[derive(Debug)]
pub struct Analysis {
    pub report: LeakReport,
    pub decisions: Vec<Decision>,
    pub skipped_hands: usize,
    pub ignored_action_lines: usize,
}

/// Runs the whole pipeline over a transcript blob: parse, classify each
/// hand's hero decision, score it against the reference tables and fold
/// everything into a leak report.
pub fn analyze(text: &str, tables: &mut dyn FrequencyTables) -> Analysis {
    let ParseOutcome {
        hands,
        skipped_hands,
        ignored_action_lines,
    } = parser::parse(text);

    // Decisions stay in input order so ranking tie-breaks are stable.
    let decisions: Vec<Decision> = hands
        .iter()
        .filter_map(|hand| decision_for_hand(hand, tables))
        .collect();

    let report = LeakReport::from_decisions(&decisions, hands.len() as u32, skipped_hands as u32);

    Analysis {
        report,
        decisions,
        skipped_hands,
        ignored_action_lines,
    }
}

fn decision_for_hand(hand: &Hand, tables: &mut dyn FrequencyTables) -> Option<Decision> {
    let hero = hand.hero()?;
    let cards = hero.hole_cards?;
    let position = hero.position?;

    let classification = classify(hand);
    if classification.scenario == Scenario::Unknown {
        debug!(hand = %hand.id, "scenario not classifiable, hand excluded");
        return None;
    }
    let action = classification.hero_action?;

    let notation = hand_notation(cards[0], cards[1]);
    Some(evaluate(
        &hand.id,
        &notation,
        classification.scenario,
        position,
        classification.villain,
        action,
        tables,
    ))
}
