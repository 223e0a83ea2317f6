//! ES|QL lexical grammar: the lexer modes and their ordered rule tables

pub mod modes;
pub mod rules;

pub use modes::Mode;
pub use rules::{all_rules, Matcher, ModeAction, Rule};
