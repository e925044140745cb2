//! cfg-engine works with context-free grammars in two directions.
//!
//! It generates random strings in a grammar's language, bounded by length and
//! recursion depth, and it decides membership of a string by searching for a
//! leftmost derivation under a step budget. A counting recognizer for the
//! non-context-free language `aⁿ bⁿ cⁿ` is included for contrast.
//!
//! # Example
//!
//! ```rust
//! use cfg_engine::GrammarBuilder;
//!
//! // S -> aSb | ε
//! let grammar = GrammarBuilder::new("S")
//!     .rule("S", &["a", "<S>", "b"])
//!     .epsilon("S")
//!     .build()
//!     .unwrap();
//!
//! let result = grammar.derive_membership("aabb", 30);
//! assert!(result.is_member);
//! assert_eq!(result.trace, vec!["S", "aSb", "aaSbb", "aabb"]);
//!
//! for text in grammar.generate_seeded(7, 5, 10, 15) {
//!     assert!(grammar.derive_membership(&text, 30).is_member);
//! }
//! ```

pub mod derivation;
pub mod fixtures;
pub mod generator;
pub mod grammar;
pub mod loader;
pub mod recognizer;
pub mod report;
pub mod utils;

pub use derivation::Membership;
pub use generator::Generator;
pub use grammar::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_STEPS, Element, Grammar, GrammarBuilder, GrammarConfig,
    GrammarDefinition, Production,
};
pub use utils::{EPSILON, GrammarError, Result};
