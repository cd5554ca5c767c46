//! Rule records and the reactive rule catalog.

mod catalog;
mod rule;

pub use catalog::{distinct_sorted, RuleCatalog};
pub use rule::{Rule, RuleOrigin};
