//! Bounded random generation of strings in a grammar's language.
//!
//! Each attempt is a randomized leftmost expansion of the start symbol with
//! backtracking: at every non-terminal the alternatives are shuffled and tried
//! in turn until one leads to a complete string. The search keeps its frames
//! on an explicit stack so deep grammars do not grow the call stack.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::grammar::{Element, Grammar};
use crate::utils::{substitute, terminal_yield};

/// What to do with a sentential form reached during an attempt.
enum Step {
    /// The attempt produced this string.
    Emit(String),
    /// This branch cannot produce a string within bounds.
    Fail,
    /// Expand the non-terminal at this index.
    Expand(usize),
}

struct Frame<'g> {
    form: Vec<&'g Element>,
    depth: usize,
    /// Index of the leftmost non-terminal in `form`.
    position: usize,
    /// Alternatives of that non-terminal, in shuffled order.
    order: Vec<usize>,
    next: usize,
}

/// Random string generator over a borrowed grammar.
pub struct Generator<'g, R> {
    grammar: &'g Grammar,
    rng: R,
}

impl<'g> Generator<'g, StdRng> {
    /// Create a generator whose output is reproducible for `seed`.
    pub fn seeded(grammar: &'g Grammar, seed: u64) -> Self {
        Generator::new(grammar, StdRng::seed_from_u64(seed))
    }
}

impl<'g, R: Rng> Generator<'g, R> {
    pub fn new(grammar: &'g Grammar, rng: R) -> Self {
        Generator { grammar, rng }
    }

    /// Produce up to `count` distinct strings of at most `max_length` characters.
    ///
    /// Gives up after the grammar's attempt budget is spent, so the result may
    /// hold fewer than `count` strings. Strings completed through the
    /// `max_depth` cutoff keep only the terminals already in the form and are
    /// not guaranteed to be in the language.
    pub fn generate(&mut self, count: usize, max_length: usize, max_depth: usize) -> BTreeSet<String> {
        let budget = self.grammar.config().attempt_budget(count);
        let mut found = BTreeSet::new();
        let mut attempts = 0;

        while found.len() < count && attempts < budget {
            if let Some(text) = self.attempt(max_length, max_depth) {
                found.insert(text);
            }
            attempts += 1;
        }

        debug!(
            requested = count,
            found = found.len(),
            attempts,
            budget,
            "generation finished"
        );
        found
    }

    /// Run one randomized expansion from the start symbol.
    pub fn attempt(&mut self, max_length: usize, max_depth: usize) -> Option<String> {
        let grammar = self.grammar;
        let root = vec![grammar.start()];
        let mut stack = Vec::new();

        match examine(&root, 0, max_length, max_depth) {
            Step::Emit(text) => return Some(text),
            Step::Fail => return None,
            Step::Expand(position) => {
                let frame = self.frame(root, 0, position);
                stack.push(frame);
            }
        }

        while let Some(frame) = stack.last_mut() {
            let Some(&choice) = frame.order.get(frame.next) else {
                stack.pop();
                continue;
            };
            frame.next += 1;

            let non_terminal = frame.form[frame.position].name();
            let production = &grammar.alternatives(non_terminal)[choice];
            let depth = frame.depth + 1;
            let form = substitute(&frame.form, frame.position, &production.elements);

            match examine(&form, depth, max_length, max_depth) {
                Step::Emit(text) => {
                    trace!(depth, text = %text, "attempt emitted");
                    return Some(text);
                }
                Step::Fail => {}
                Step::Expand(position) => {
                    let frame = self.frame(form, depth, position);
                    stack.push(frame);
                }
            }
        }

        None
    }

    fn frame(&mut self, form: Vec<&'g Element>, depth: usize, position: usize) -> Frame<'g> {
        let count = self.grammar.alternatives(form[position].name()).len();
        let mut order: Vec<usize> = (0..count).collect();
        order.shuffle(&mut self.rng);
        Frame {
            form,
            depth,
            position,
            order,
            next: 0,
        }
    }
}

fn examine(form: &[&Element], depth: usize, max_length: usize, max_depth: usize) -> Step {
    // Past the cutoff, unexpanded non-terminals contribute nothing.
    if depth > max_depth {
        let text = terminal_yield(form);
        return if text.chars().count() <= max_length {
            Step::Emit(text)
        } else {
            Step::Fail
        };
    }

    // Terminals never disappear, so an overrun here is final.
    let terminal_length: usize = form
        .iter()
        .filter(|e| e.is_terminal())
        .map(|e| e.name().chars().count())
        .sum();
    if terminal_length > max_length {
        return Step::Fail;
    }

    match form.iter().position(|e| e.is_non_terminal()) {
        Some(position) => Step::Expand(position),
        None => Step::Emit(terminal_yield(form)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{GrammarBuilder, GrammarConfig};
    use pretty_assertions::assert_eq;

    fn a_n_b_n() -> Grammar {
        GrammarBuilder::new("S")
            .rule("S", &["a", "<S>", "b"])
            .epsilon("S")
            .build()
            .unwrap()
    }

    fn is_a_n_b_n(text: &str) -> bool {
        let half = text.len() / 2;
        text.len() % 2 == 0
            && text[..half].chars().all(|c| c == 'a')
            && text[half..].chars().all(|c| c == 'b')
    }

    #[test]
    fn test_generate_respects_length_bound() {
        let grammar = a_n_b_n();
        let strings = Generator::seeded(&grammar, 7).generate(10, 10, 15);

        assert!(!strings.is_empty());
        for text in &strings {
            assert!(text.len() <= 10, "{} is too long", text);
            assert!(is_a_n_b_n(text), "{} is not a^n b^n", text);
        }
    }

    #[test]
    fn test_generate_finds_whole_language_under_bound() {
        let grammar = a_n_b_n().with_config(GrammarConfig {
            attempts_per_string: 20,
            base_attempts: 2000,
        });
        let strings = Generator::seeded(&grammar, 1).generate(6, 10, 15);

        let expected: BTreeSet<String> = (0..=5)
            .map(|n| format!("{}{}", "a".repeat(n), "b".repeat(n)))
            .collect();
        assert_eq!(strings, expected);
    }

    #[test]
    fn test_generate_stops_at_attempt_budget() {
        // Only one string exists, so asking for more must stop early.
        let grammar = GrammarBuilder::new("S")
            .rule("S", &["x"])
            .config(GrammarConfig {
                attempts_per_string: 1,
                base_attempts: 0,
            })
            .build()
            .unwrap();

        let strings = Generator::seeded(&grammar, 3).generate(5, 10, 15);
        assert_eq!(strings.into_iter().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn test_generate_stops_at_count() {
        // Eleven strings fit in twenty characters; only three are asked for.
        let grammar = a_n_b_n();
        for seed in 0..5 {
            let strings = Generator::seeded(&grammar, seed).generate(3, 20, 15);
            assert_eq!(strings.len(), 3);
            assert!(strings.iter().all(|s| is_a_n_b_n(s)));
        }
    }

    #[test]
    fn test_generate_zero_count() {
        let grammar = a_n_b_n();
        assert!(Generator::seeded(&grammar, 0).generate(0, 10, 15).is_empty());
    }

    #[test]
    fn test_same_seed_same_output() {
        let grammar = a_n_b_n();
        let first = Generator::seeded(&grammar, 42).generate(4, 12, 15);
        let second = Generator::seeded(&grammar, 42).generate(4, 12, 15);
        assert_eq!(first, second);
    }

    #[test]
    fn test_attempt_fails_when_nothing_fits() {
        let grammar = GrammarBuilder::new("S")
            .rule("S", &["a", "a", "a"])
            .build()
            .unwrap();

        assert_eq!(Generator::seeded(&grammar, 5).attempt(2, 15), None);
    }

    #[test]
    fn test_depth_cutoff_keeps_present_terminals() {
        // S -> aSb has no base case; the cutoff is the only way out.
        let grammar = GrammarBuilder::new("S")
            .rule("S", &["a", "<S>", "b"])
            .build()
            .unwrap();

        let text = Generator::seeded(&grammar, 9).attempt(10, 2);
        assert_eq!(text.as_deref(), Some("aaabbb"));
    }

    #[test]
    fn test_backtracks_past_dead_alternatives() {
        // The long alternative always overruns, so every attempt must fall back to "y".
        let grammar = GrammarBuilder::new("S")
            .rule("S", &["x", "x", "x", "x"])
            .rule("S", &["y"])
            .build()
            .unwrap();

        for seed in 0..8 {
            assert_eq!(
                Generator::seeded(&grammar, seed).attempt(3, 15).as_deref(),
                Some("y")
            );
        }
    }

    #[test]
    fn test_multi_character_terminals_count_characters() {
        let grammar = GrammarBuilder::new("S")
            .rule("S", &["ab", "<S>"])
            .epsilon("S")
            .build()
            .unwrap();

        let strings = Generator::seeded(&grammar, 11).generate(10, 5, 15);
        let expected: BTreeSet<String> =
            ["", "ab", "abab"].into_iter().map(String::from).collect();
        assert_eq!(strings, expected);
    }
}
