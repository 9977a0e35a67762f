mod condition;
mod error;
mod facet;
mod location;
mod matches;
mod policy;
mod query;
mod rule;
mod ruleset;

pub use condition::Condition;
pub use error::{CompileError, HierarchyError, MatchError};
pub use facet::Facet;
pub use location::{Ancestors, LocationHierarchyBuilder, LocationHierarchyIndex};
pub use matches::{Match, MatchList};
pub use policy::{PolicyKind, PolicyMap};
pub use query::Query;
pub use rule::RuleLine;
pub use ruleset::{CompiledRuleSet, LineBuilder, RuleSetBuilder};
