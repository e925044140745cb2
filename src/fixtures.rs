//! Small grammars used by the demo report, the benchmarks and the tests.

use crate::grammar::{Grammar, GrammarBuilder};
use crate::utils::Result;

/// `S → aSb | ε`
pub fn a_n_b_n() -> Result<Grammar> {
    GrammarBuilder::new("S")
        .rule("S", &["a", "<S>", "b"])
        .epsilon("S")
        .build()
}

/// `S → (S)S | ε`
pub fn balanced_parens() -> Result<Grammar> {
    GrammarBuilder::new("S")
        .rule("S", &["(", "<S>", ")", "<S>"])
        .epsilon("S")
        .build()
}

/// Right-recursive sums and products over `x`: `E → T+E | T`, `T → F*T | F`, `F → (E) | x`
pub fn arithmetic() -> Result<Grammar> {
    GrammarBuilder::new("E")
        .rule("E", &["<T>", "+", "<E>"])
        .rule("E", &["<T>"])
        .rule("T", &["<F>", "*", "<T>"])
        .rule("T", &["<F>"])
        .rule("F", &["(", "<E>", ")"])
        .rule("F", &["x"])
        .build()
}

/// Look a fixture up by name.
pub fn by_name(name: &str) -> Option<Result<Grammar>> {
    match name {
        "anbn" | "a_n_b_n" => Some(a_n_b_n()),
        "parens" | "balanced_parens" => Some(balanced_parens()),
        "arithmetic" => Some(arithmetic()),
        _ => None,
    }
}

/// Names accepted by [`by_name`].
pub const NAMES: [&str; 3] = ["anbn", "parens", "arithmetic"];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::DEFAULT_MAX_STEPS;

    #[test]
    fn test_fixtures_build() {
        for name in NAMES {
            assert!(by_name(name).unwrap().is_ok(), "{}", name);
        }
        assert!(by_name("nope").is_none());
    }

    #[test]
    fn test_balanced_parens() {
        let grammar = balanced_parens().unwrap();
        for target in ["", "()", "(())", "()()", "(()())"] {
            assert!(grammar.derive_membership(target, DEFAULT_MAX_STEPS).is_member, "{}", target);
        }
        for target in ["(", ")(", "(()"] {
            assert!(!grammar.derive_membership(target, DEFAULT_MAX_STEPS).is_member, "{}", target);
        }
    }

    #[test]
    fn test_arithmetic() {
        let grammar = arithmetic().unwrap();
        let result = grammar.derive_membership("x+x", DEFAULT_MAX_STEPS);
        assert_eq!(
            result.trace,
            vec!["E", "T+E", "F+E", "x+E", "x+T", "x+F", "x+x"]
        );
        assert!(grammar.derive_membership("(x*x)+x", DEFAULT_MAX_STEPS).is_member);
        assert!(!grammar.derive_membership("x+", DEFAULT_MAX_STEPS).is_member);
    }
}
