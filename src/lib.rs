pub mod analyzer;
pub mod cards;
pub mod frequency;
pub mod game;
pub mod parser;
pub mod position;
pub mod report;
pub mod scenario;

pub use analyzer::{Analysis, analyze};
pub use frequency::{Decision, FrequencyTables, RangeCache, StaticTables};
pub use report::LeakReport;
pub use scenario::Scenario;
