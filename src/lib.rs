//! Circulation rule compiler and matcher.
//!
//! Compiles circulation rule text into an immutable [`CompiledRuleSet`] and
//! resolves, for an item type, loan type, patron group and shelving location,
//! which loan, request or notice policy applies and which rule line fired.
//!
//! ```
//! use circ_rules::{CompiledRuleSet, LocationHierarchyIndex, PolicyResolver};
//!
//! let rules = CompiledRuleSet::from_text(
//!     "fallback-policy: l no-loan\n\
//!      m book: l three-week\n",
//! )
//! .unwrap();
//! let locations = LocationHierarchyIndex::builder()
//!     .institution("nottingham")
//!     .campus("jubilee", "nottingham")
//!     .library("djanogly", "jubilee")
//!     .location("3rd-floor", "djanogly")
//!     .build()
//!     .unwrap();
//!
//! let resolver = PolicyResolver::new(rules, locations);
//! let policy = resolver
//!     .loan_policy("book", "can-circulate", "staff", "3rd-floor")
//!     .unwrap();
//! assert_eq!(policy, "three-week");
//! ```

mod compile;
mod error;
mod matcher;
pub mod parse;
mod resolver;
#[cfg(feature = "binary-cache")]
pub mod serial;
mod types;

pub use error::Error;
pub use matcher::RuleMatcher;
pub use resolver::PolicyResolver;
#[cfg(feature = "binary-cache")]
pub use serial::{DeserializeError, SerializeError};
pub use types::{
    Ancestors, CompileError, CompiledRuleSet, Condition, Facet, HierarchyError, LineBuilder,
    LocationHierarchyBuilder, LocationHierarchyIndex, Match, MatchError, MatchList, PolicyKind,
    PolicyMap, Query, RuleLine, RuleSetBuilder,
};
