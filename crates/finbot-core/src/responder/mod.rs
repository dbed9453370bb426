//! Rule-based response selection.
//!
//! # Module Structure
//!
//! - `table`: Ordered lookup tables (`GlossaryTable`, `ScenarioTable`, `KeywordTable`)
//! - `builtin`: The tables shipped with FinBot
//! - `choice`: Injectable randomness (`ChoiceSource`)
//! - `resolver`: Tiered matching from input text to one reply (`Resolver`)

pub mod builtin;
mod choice;
mod resolver;
mod table;

pub use builtin::builtin_tables;
pub use choice::{ChoiceSource, FixedChoice, SeededChoice, ThreadRngChoice};
pub use resolver::{EXPLAIN_TRIGGERS, Intent, Resolver};
pub use table::{
    FixedReplies, GlossaryEntry, GlossaryTable, KeywordEntry, KeywordTable, ResponseTableSet,
    ScenarioEntry, ScenarioTable,
};
