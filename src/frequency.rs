use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::game::HeroActionKind;
use crate::position::Position;
use crate::scenario::Scenario;

/// Reference action frequencies for one starting hand, in percent.
/// Percentages need not sum to 100: fold may be left implicit.
pub type FrequencyMap = BTreeMap<String, f64>;

/// Point penalties, in big blinds. These rank leak severity; they are not
/// solved equity and must not be presented as exact monetary loss.
const PENALTY_NEVER_RAISE: f64 = 2.0;
const PENALTY_RARE_RAISE: f64 = 1.0;
const PENALTY_CLEAR_SPOT: f64 = 1.5;
const PENALTY_MIXED_SPOT: f64 = 0.5;
const RARE_THRESHOLD: f64 = 30.0;
const CLEAR_CUT_THRESHOLD: f64 = 70.0;

/// Keyed lookup of reference frequency tables.
pub trait FrequencyTables {
    /// Returns the action distribution for a hand in a scenario, or `None`
    /// when the table has no data for it.
    fn lookup(&mut self, scenario_key: &str, hand: &str) -> Option<FrequencyMap>;
}

/// Caller-owned, lazily memoizing loader of `<scenario_key>.json` files.
///
/// Each file maps hand notation to an action distribution. Load failures
/// are memoized as missing so a bad file is read (and logged) only once;
/// `invalidate` drops everything so edited files are picked up.
pub struct RangeCache {
    dir: PathBuf,
    loaded: HashMap<String, Option<HashMap<String, FrequencyMap>>>,
}

impl RangeCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            loaded: HashMap::new(),
        }
    }

    pub fn invalidate(&mut self) {
        self.loaded.clear();
    }

    fn table(&mut self, scenario_key: &str) -> Option<&HashMap<String, FrequencyMap>> {
        if !self.loaded.contains_key(scenario_key) {
            let path = self.dir.join(format!("{scenario_key}.json"));
            let table = match fs::read_to_string(&path) {
                Ok(text) => match serde_json::from_str(&text) {
                    Ok(table) => Some(table),
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "unreadable range file");
                        None
                    }
                },
                Err(_) => {
                    debug!(path = %path.display(), "no range file for scenario");
                    None
                }
            };
            self.loaded.insert(scenario_key.to_string(), table);
        }
        self.loaded
            .get(scenario_key)
            .and_then(|entry| entry.as_ref())
    }
}

impl FrequencyTables for RangeCache {
    fn lookup(&mut self, scenario_key: &str, hand: &str) -> Option<FrequencyMap> {
        self.table(scenario_key)
            .and_then(|table| table.get(hand).cloned())
    }
}

/// In-memory tables, mainly for tests and embedded defaults.
#[derive(Debug, Default)]
pub struct StaticTables {
    tables: HashMap<String, HashMap<String, FrequencyMap>>,
}

impl StaticTables {
    pub fn insert(
        &mut self,
        scenario_key: impl Into<String>,
        hand: impl Into<String>,
        frequencies: FrequencyMap,
    ) {
        self.tables
            .entry(scenario_key.into())
            .or_default()
            .insert(hand.into(), frequencies);
    }
}

impl FrequencyTables for StaticTables {
    fn lookup(&mut self, scenario_key: &str, hand: &str) -> Option<FrequencyMap> {
        self.tables
            .get(scenario_key)
            .and_then(|table| table.get(hand).cloned())
    }
}

/// Builds the table key for a classified spot: `rfi_<POS>` or
/// `<scenario>_<heroPos>_vs_<villainPos>`. `Unknown` has no key.
pub fn scenario_key(scenario: Scenario, hero: Position, villain: Option<Position>) -> Option<String> {
    match (scenario, villain) {
        (Scenario::Unknown, _) => None,
        (Scenario::Rfi, _) => Some(format!("rfi_{}", hero.key())),
        (_, Some(villain)) => Some(format!(
            "{}_{}_vs_{}",
            scenario.key_fragment(),
            hero.key(),
            villain.key()
        )),
        (_, None) => None,
    }
}

/// One evaluated preflop decision. Identifiers are copied out of the hand;
/// nothing borrows back into the parsed transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub hand_id: String,
    pub hero_position: Position,
    pub hand: String,
    pub scenario: Scenario,
    pub villain_position: Option<Position>,
    pub hero_action: HeroActionKind,
    /// Empty when no reference data was found: the decision is recorded
    /// but unevaluated, which is distinct from evaluated-and-correct.
    pub frequencies: FrequencyMap,
    pub is_mistake: bool,
    pub ev_loss: f64,
}

impl Decision {
    pub fn is_evaluated(&self) -> bool {
        !self.frequencies.is_empty()
    }
}

/// Scores a classified decision against the reference tables.
pub fn evaluate(
    hand_id: &str,
    hand_notation: &str,
    scenario: Scenario,
    hero_position: Position,
    villain_position: Option<Position>,
    hero_action: HeroActionKind,
    tables: &mut dyn FrequencyTables,
) -> Decision {
    let frequencies = scenario_key(scenario, hero_position, villain_position)
        .and_then(|key| tables.lookup(&key, hand_notation))
        .unwrap_or_default();

    let (is_mistake, ev_loss) = if frequencies.is_empty() {
        (false, 0.0)
    } else {
        judge(hero_action, &frequencies)
    };

    Decision {
        hand_id: hand_id.to_string(),
        hero_position,
        hand: hand_notation.to_string(),
        scenario,
        villain_position,
        hero_action,
        frequencies,
        is_mistake,
        ev_loss,
    }
}

fn judge(action: HeroActionKind, frequencies: &FrequencyMap) -> (bool, f64) {
    match action {
        HeroActionKind::Raise => {
            let raise_total: f64 = frequencies
                .iter()
                .filter(|(label, _)| is_raise_label(label))
                .map(|(_, pct)| pct)
                .sum();
            if raise_total <= 0.0 {
                (true, PENALTY_NEVER_RAISE)
            } else if raise_total < RARE_THRESHOLD {
                (true, PENALTY_RARE_RAISE)
            } else {
                (false, 0.0)
            }
        }
        HeroActionKind::Fold => judge_passive(fold_frequency(frequencies), frequencies, "fold"),
        HeroActionKind::Call => {
            let freq = frequencies.get("call").copied().unwrap_or(0.0);
            judge_passive(freq, frequencies, "call")
        }
        HeroActionKind::Check => (false, 0.0),
    }
}

/// Shared rule for fold and call: a zero-frequency action is a mistake
/// whose weight depends on how clear-cut the preferred alternative is; a
/// rarely taken action is a light mistake.
fn judge_passive(freq: f64, frequencies: &FrequencyMap, chosen: &str) -> (bool, f64) {
    if freq <= 0.0 {
        let best_alternative = frequencies
            .iter()
            .filter(|(label, _)| !label.eq_ignore_ascii_case(chosen))
            .map(|(_, pct)| *pct)
            .fold(0.0, f64::max);
        let penalty = if best_alternative >= CLEAR_CUT_THRESHOLD {
            PENALTY_CLEAR_SPOT
        } else {
            PENALTY_MIXED_SPOT
        };
        (true, penalty)
    } else if freq < RARE_THRESHOLD {
        (true, PENALTY_MIXED_SPOT)
    } else {
        (false, 0.0)
    }
}

/// Whether a table action label denotes any kind of raise. Tables use
/// open/3bet/4bet/5bet terminology interchangeably with plain "raise".
fn is_raise_label(label: &str) -> bool {
    let label = label.to_ascii_lowercase();
    label.contains("raise") || label.contains("bet") || label == "open"
}

/// The table's fold frequency; when no explicit fold bucket exists the
/// remainder up to 100 is implicit fold.
fn fold_frequency(frequencies: &FrequencyMap) -> f64 {
    match frequencies.get("fold") {
        Some(pct) => *pct,
        None => (100.0 - frequencies.values().sum::<f64>()).max(0.0),
    }
}
