use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt::Write as _;

use itertools::Itertools;
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};

use crate::frequency::{Decision, scenario_key};

const TOP_LEAKS: usize = 20;
const MIN_HAND_SAMPLES: u32 = 3;

/// Aggregate counters for one scenario key, position or starting hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LeakBucket {
    pub count: u32,
    pub mistakes: u32,
    pub ev_loss: f64,
}

impl LeakBucket {
    fn record(&mut self, decision: &Decision) {
        self.count += 1;
        if decision.is_mistake {
            self.mistakes += 1;
            self.ev_loss += decision.ev_loss;
        }
    }
}

/// One ranked leak: a scenario key or a starting-hand notation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeakEntry {
    pub label: String,
    pub count: u32,
    pub mistakes: u32,
    pub ev_loss: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeakReport {
    pub total_hands: u32,
    pub analyzed_hands: u32,
    pub skipped_hands: u32,
    pub unevaluated_decisions: u32,
    pub total_mistakes: u32,
    pub total_ev_loss: f64,
    pub by_scenario: BTreeMap<String, LeakBucket>,
    pub by_position: BTreeMap<String, LeakBucket>,
    pub top_leaks: Vec<LeakEntry>,
}

impl LeakReport {
    /// Folds per-hand decisions into the report. `decisions` must be in
    /// original hand order: ranking ties break by first encounter, which
    /// keeps reports reproducible.
    pub fn from_decisions(decisions: &[Decision], total_hands: u32, skipped_hands: u32) -> Self {
        let mut report = LeakReport {
            total_hands,
            skipped_hands,
            ..LeakReport::default()
        };

        let mut by_hand: BTreeMap<String, LeakBucket> = BTreeMap::new();
        let mut first_seen: HashMap<String, usize> = HashMap::new();

        for (index, decision) in decisions.iter().enumerate() {
            if !decision.is_evaluated() {
                report.unevaluated_decisions += 1;
                continue;
            }
            report.analyzed_hands += 1;
            if decision.is_mistake {
                report.total_mistakes += 1;
                report.total_ev_loss += decision.ev_loss;
            }

            // Evaluated decisions always came from a resolvable key.
            let Some(scenario_label) = scenario_key(
                decision.scenario,
                decision.hero_position,
                decision.villain_position,
            ) else {
                continue;
            };

            first_seen.entry(scenario_label.clone()).or_insert(index);
            first_seen.entry(decision.hand.clone()).or_insert(index);

            report
                .by_scenario
                .entry(scenario_label)
                .or_default()
                .record(decision);
            report
                .by_position
                .entry(decision.hero_position.key())
                .or_default()
                .record(decision);
            by_hand
                .entry(decision.hand.clone())
                .or_default()
                .record(decision);
        }

        report.top_leaks = rank_leaks(&report.by_scenario, &by_hand, &first_seen);
        report
    }

    /// Renders the report for terminal consumption, colored unless asked
    /// not to.
    pub fn render_text(&self, colored: bool) -> String {
        let mut out = String::new();

        let header = if colored {
            format!("{}", "Preflop leak report".bold().magenta())
        } else {
            "Preflop leak report".to_string()
        };
        let _ = writeln!(out, "{header}");
        let _ = writeln!(
            out,
            "Hands: {} parsed, {} analyzed, {} skipped, {} without reference data",
            self.total_hands, self.analyzed_hands, self.skipped_hands, self.unevaluated_decisions
        );
        let _ = writeln!(
            out,
            "Mistakes: {} for {:.2}bb total EV loss",
            self.total_mistakes, self.total_ev_loss
        );

        if !self.by_position.is_empty() {
            let summary = self
                .by_position
                .iter()
                .map(|(pos, bucket)| {
                    format!("{pos} {}/{} ({:.2}bb)", bucket.mistakes, bucket.count, bucket.ev_loss)
                })
                .join(", ");
            let _ = writeln!(out, "By position: {summary}");
        }

        if self.top_leaks.is_empty() {
            let _ = writeln!(out, "No leaks found.");
            return out;
        }

        let title = if colored {
            format!("{}", "Worst leaks".bold().yellow())
        } else {
            "Worst leaks".to_string()
        };
        let _ = writeln!(out, "{title}");
        for (rank, leak) in self.top_leaks.iter().enumerate() {
            let label = if colored {
                format!("{}", leak.label.bold().green())
            } else {
                leak.label.clone()
            };
            let _ = writeln!(
                out,
                "  {}. {label}: {}/{} mistakes, {:.2}bb lost",
                rank + 1,
                leak.mistakes,
                leak.count,
                leak.ev_loss
            );
        }

        out
    }
}

/// Builds the ranked worst-offender list: every scenario key with at least
/// one mistake, plus every starting hand with enough samples and a mistake
/// rate above one half. Sorted by EV loss descending, ties by first
/// encounter, truncated to the top 20.
fn rank_leaks(
    by_scenario: &BTreeMap<String, LeakBucket>,
    by_hand: &BTreeMap<String, LeakBucket>,
    first_seen: &HashMap<String, usize>,
) -> Vec<LeakEntry> {
    let scenario_entries = by_scenario
        .iter()
        .filter(|(_, bucket)| bucket.mistakes >= 1);
    let hand_entries = by_hand.iter().filter(|(_, bucket)| {
        bucket.count >= MIN_HAND_SAMPLES && bucket.mistakes * 2 > bucket.count
    });

    let mut leaks: Vec<(usize, LeakEntry)> = scenario_entries
        .chain(hand_entries)
        .map(|(label, bucket)| {
            let order = first_seen.get(label).copied().unwrap_or(usize::MAX);
            (
                order,
                LeakEntry {
                    label: label.clone(),
                    count: bucket.count,
                    mistakes: bucket.mistakes,
                    ev_loss: bucket.ev_loss,
                },
            )
        })
        .collect();

    leaks.sort_by(|(order_a, a), (order_b, b)| {
        b.ev_loss
            .total_cmp(&a.ev_loss)
            .then_with(|| order_a.cmp(order_b))
    });
    leaks.truncate(TOP_LEAKS);
    leaks.into_iter().map(|(_, leak)| leak).collect()
}
