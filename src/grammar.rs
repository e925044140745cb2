use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::derivation::{self, Membership};
use crate::generator::Generator;
use crate::utils::{GrammarError, Result, render_rhs};

/// Recursion depth used by generation when the caller has no preference.
pub const DEFAULT_MAX_DEPTH: usize = 15;

/// Derivation step budget used by membership queries when the caller has no preference.
pub const DEFAULT_MAX_STEPS: usize = 30;

/// Represents an element in the grammar, either a terminal or a non-terminal
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Element {
    /// A terminal symbol (literal text)
    Terminal(String),
    /// A non-terminal symbol (reference to another rule)
    NonTerminal(String),
}

impl Element {
    /// The symbol identifier
    pub fn name(&self) -> &str {
        match self {
            Element::Terminal(name) | Element::NonTerminal(name) => name,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Element::Terminal(_))
    }

    pub fn is_non_terminal(&self) -> bool {
        matches!(self, Element::NonTerminal(_))
    }
}

/// One right-hand side of a rule. An empty sequence is the ε-production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    /// The sequence of elements in this production
    pub elements: Vec<Element>,
}

impl Production {
    pub fn is_epsilon(&self) -> bool {
        self.elements.is_empty()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render_rhs(&self.elements))
    }
}

/// Configuration options for grammar behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrammarConfig {
    /// Generation attempts granted per requested string
    pub attempts_per_string: usize,
    /// Generation attempts granted regardless of the requested count
    pub base_attempts: usize,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        GrammarConfig {
            attempts_per_string: 20,
            base_attempts: 100,
        }
    }
}

impl GrammarConfig {
    /// Total number of generation attempts allowed when `count` strings are requested.
    pub fn attempt_budget(&self, count: usize) -> usize {
        count
            .saturating_mul(self.attempts_per_string)
            .saturating_add(self.base_attempts)
    }
}

/// Plain-data form of a grammar, as read from and written to JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarDefinition {
    pub non_terminals: BTreeSet<String>,
    pub terminals: BTreeSet<String>,
    pub productions: BTreeMap<String, Vec<Vec<String>>>,
    pub start_symbol: String,
}

/// A validated, immutable context-free grammar.
///
/// Every symbol in every right-hand side is resolved to an [`Element`] at
/// construction time, so generation and derivation never look up an
/// undeclared symbol.
#[derive(Debug, Clone)]
pub struct Grammar {
    non_terminals: BTreeSet<String>,
    terminals: BTreeSet<String>,
    /// The rules mapping non-terminals to productions, in declared order
    rules: BTreeMap<String, Vec<Production>>,
    start: Element,
    config: GrammarConfig,
}

impl Grammar {
    /// Build a grammar from its four defining parts.
    ///
    /// Fails with [`GrammarError::InvalidGrammar`] when a symbol is declared as
    /// both terminal and non-terminal, the start symbol is not a declared
    /// non-terminal, a production names an undeclared symbol, or a declared
    /// non-terminal has no right-hand side. Repeated keys in `productions`
    /// append their alternatives in order.
    pub fn new<N, T, P, K, R, S>(
        non_terminals: N,
        terminals: T,
        productions: P,
        start_symbol: &str,
    ) -> Result<Self>
    where
        N: IntoIterator,
        N::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
        P: IntoIterator<Item = (K, Vec<R>)>,
        K: Into<String>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let non_terminals: BTreeSet<String> = non_terminals.into_iter().map(Into::into).collect();
        let terminals: BTreeSet<String> = terminals.into_iter().map(Into::into).collect();

        if non_terminals.iter().chain(terminals.iter()).any(String::is_empty) {
            return Err(GrammarError::InvalidGrammar(
                "symbol identifiers must not be empty".to_string(),
            ));
        }

        if let Some(shared) = non_terminals.intersection(&terminals).next() {
            return Err(GrammarError::InvalidGrammar(format!(
                "`{}` is declared as both a terminal and a non-terminal",
                shared
            )));
        }

        if !non_terminals.contains(start_symbol) {
            return Err(GrammarError::InvalidGrammar(format!(
                "start symbol `{}` is not a declared non-terminal",
                start_symbol
            )));
        }

        let mut rules: BTreeMap<String, Vec<Production>> = BTreeMap::new();
        for (lhs, alternatives) in productions {
            let lhs = lhs.into();
            if !non_terminals.contains(&lhs) {
                return Err(GrammarError::InvalidGrammar(format!(
                    "production given for undeclared non-terminal `{}`",
                    lhs
                )));
            }

            let mut resolved = Vec::with_capacity(alternatives.len());
            for rhs in alternatives {
                let mut elements = Vec::new();
                for symbol in rhs {
                    let symbol = symbol.into();
                    let element = if non_terminals.contains(&symbol) {
                        Element::NonTerminal(symbol)
                    } else if terminals.contains(&symbol) {
                        Element::Terminal(symbol)
                    } else {
                        return Err(GrammarError::InvalidGrammar(format!(
                            "production for `{}` references undeclared symbol `{}`",
                            lhs, symbol
                        )));
                    };
                    elements.push(element);
                }
                resolved.push(Production { elements });
            }
            rules.entry(lhs).or_default().extend(resolved);
        }

        if let Some(bare) = non_terminals
            .iter()
            .find(|nt| rules.get(*nt).is_none_or(Vec::is_empty))
        {
            return Err(GrammarError::InvalidGrammar(format!(
                "non-terminal `{}` has no productions",
                bare
            )));
        }

        Ok(Grammar {
            non_terminals,
            terminals,
            rules,
            start: Element::NonTerminal(start_symbol.to_string()),
            config: GrammarConfig::default(),
        })
    }

    /// Validate a plain-data definition into a grammar.
    pub fn from_definition(definition: GrammarDefinition) -> Result<Self> {
        Grammar::new(
            definition.non_terminals,
            definition.terminals,
            definition.productions,
            &definition.start_symbol,
        )
    }

    /// Export the grammar as plain data.
    pub fn definition(&self) -> GrammarDefinition {
        let productions = self
            .rules
            .iter()
            .map(|(lhs, alternatives)| {
                let rhs = alternatives
                    .iter()
                    .map(|p| p.elements.iter().map(|e| e.name().to_string()).collect())
                    .collect();
                (lhs.clone(), rhs)
            })
            .collect();

        GrammarDefinition {
            non_terminals: self.non_terminals.clone(),
            terminals: self.terminals.clone(),
            productions,
            start_symbol: self.start_symbol().to_string(),
        }
    }

    /// Replace the configuration, keeping the grammar definition as is.
    pub fn with_config(mut self, config: GrammarConfig) -> Self {
        self.config = config;
        self
    }

    /// Generate up to `count` distinct strings using the thread-local RNG.
    pub fn generate(&self, count: usize, max_length: usize, max_depth: usize) -> BTreeSet<String> {
        Generator::new(self, rand::thread_rng()).generate(count, max_length, max_depth)
    }

    /// Generate up to `count` distinct strings, reproducibly for a given seed.
    pub fn generate_seeded(
        &self,
        seed: u64,
        count: usize,
        max_length: usize,
        max_depth: usize,
    ) -> BTreeSet<String> {
        Generator::new(self, StdRng::seed_from_u64(seed)).generate(count, max_length, max_depth)
    }

    /// Decide membership of `target` by depth-first leftmost derivation search.
    pub fn derive_membership(&self, target: &str, max_steps: usize) -> Membership {
        derivation::derive(self, target, max_steps)
    }

    /// Like [`Grammar::derive_membership`], but rejects targets containing
    /// characters that no terminal can produce.
    pub fn derive_membership_strict(&self, target: &str, max_steps: usize) -> Result<Membership> {
        derivation::check_alphabet(self, target)?;
        Ok(derivation::derive(self, target, max_steps))
    }

    /// Find a derivation with the fewest steps, searching breadth-first.
    pub fn derive_shortest(&self, target: &str, max_steps: usize) -> Membership {
        derivation::derive_shortest(self, target, max_steps)
    }

    /// Check if the grammar contains a specific non-terminal
    pub fn has_non_terminal(&self, name: &str) -> bool {
        self.non_terminals.contains(name)
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        self.terminals.contains(name)
    }

    pub fn non_terminals(&self) -> &BTreeSet<String> {
        &self.non_terminals
    }

    pub fn terminals(&self) -> &BTreeSet<String> {
        &self.terminals
    }

    /// Get a reference to the grammar's rules
    pub fn rules(&self) -> &BTreeMap<String, Vec<Production>> {
        &self.rules
    }

    /// Right-hand sides of `non_terminal` in declared order.
    pub fn alternatives(&self, non_terminal: &str) -> &[Production] {
        self.rules
            .get(non_terminal)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Get the start symbol
    pub fn start_symbol(&self) -> &str {
        self.start.name()
    }

    pub(crate) fn start(&self) -> &Element {
        &self.start
    }

    /// Get a reference to the grammar's configuration
    pub fn config(&self) -> &GrammarConfig {
        &self.config
    }
}

fn braced(symbols: &BTreeSet<String>) -> String {
    let joined: Vec<&str> = symbols.iter().map(String::as_str).collect();
    format!("{{{}}}", joined.join(", "))
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Non-terminals: {}", braced(&self.non_terminals))?;
        writeln!(f, "Terminals: {}", braced(&self.terminals))?;
        writeln!(f, "Start Symbol: {}", self.start_symbol())?;
        write!(f, "Productions:")?;

        // Start symbol first, the rest in name order.
        let start = self.start_symbol();
        let ordered = std::iter::once(start).chain(
            self.rules
                .keys()
                .map(String::as_str)
                .filter(|nt| *nt != start),
        );
        for lhs in ordered {
            for production in self.alternatives(lhs) {
                write!(f, "\n  {} -> {}", lhs, production)?;
            }
        }
        Ok(())
    }
}

/// Builder for constructing Grammar instances
///
/// Right-hand side symbols written as `<name>` are non-terminals, anything
/// else is a terminal. Every rule's left-hand side is declared as a
/// non-terminal.
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    start_symbol: String,
    non_terminals: BTreeSet<String>,
    terminals: BTreeSet<String>,
    productions: Vec<(String, Vec<String>)>,
    config: GrammarConfig,
}

impl GrammarBuilder {
    /// Create a new grammar builder with default config
    pub fn new(start_symbol: &str) -> Self {
        GrammarBuilder {
            start_symbol: start_symbol.to_string(),
            non_terminals: BTreeSet::new(),
            terminals: BTreeSet::new(),
            productions: Vec::new(),
            config: GrammarConfig::default(),
        }
    }

    /// Set the configuration
    pub fn config(mut self, config: GrammarConfig) -> Self {
        self.config = config;
        self
    }

    /// Declare a terminal that need not appear in any rule
    pub fn terminal(mut self, name: &str) -> Self {
        self.terminals.insert(name.to_string());
        self
    }

    /// Add a rule to the grammar
    pub fn rule(mut self, non_terminal: &str, elements: &[&str]) -> Self {
        self.non_terminals.insert(non_terminal.to_string());
        let mut rhs = Vec::with_capacity(elements.len());
        for element in elements {
            match element.strip_prefix('<').and_then(|e| e.strip_suffix('>')) {
                Some(name) => {
                    self.non_terminals.insert(name.to_string());
                    rhs.push(name.to_string());
                }
                None => {
                    self.terminals.insert(element.to_string());
                    rhs.push(element.to_string());
                }
            }
        }
        self.productions.push((non_terminal.to_string(), rhs));
        self
    }

    /// Add an ε-production for `non_terminal`
    pub fn epsilon(self, non_terminal: &str) -> Self {
        self.rule(non_terminal, &[])
    }

    /// Validate and build the grammar
    pub fn build(self) -> Result<Grammar> {
        let productions = self
            .productions
            .into_iter()
            .map(|(lhs, rhs)| (lhs, vec![rhs]));
        let grammar = Grammar::new(
            self.non_terminals,
            self.terminals,
            productions,
            &self.start_symbol,
        )?;
        Ok(grammar.with_config(self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn invalid_message(result: Result<Grammar>) -> String {
        match result {
            Err(GrammarError::InvalidGrammar(message)) => message,
            other => panic!("Expected InvalidGrammar, got {:?}", other),
        }
    }

    #[test]
    fn test_new_resolves_elements() {
        let grammar = Grammar::new(
            ["S"],
            ["a", "b"],
            [("S", vec![vec!["a", "S", "b"], vec![]])],
            "S",
        )
        .unwrap();

        let alternatives = grammar.alternatives("S");
        assert_eq!(alternatives.len(), 2);
        assert_eq!(
            alternatives[0].elements,
            vec![
                Element::Terminal("a".to_string()),
                Element::NonTerminal("S".to_string()),
                Element::Terminal("b".to_string()),
            ]
        );
        assert!(alternatives[1].is_epsilon());
        assert_eq!(grammar.start_symbol(), "S");
    }

    #[test]
    fn test_start_symbol_must_be_declared() {
        let result = Grammar::new(["S"], ["a"], [("S", vec![vec!["a"]])], "X");
        assert!(invalid_message(result).contains("start symbol `X`"));
    }

    #[test]
    fn test_undeclared_symbol_in_rhs() {
        let result = Grammar::new(["S"], ["a"], [("S", vec![vec!["a", "c"]])], "S");
        assert!(invalid_message(result).contains("undeclared symbol `c`"));
    }

    #[test]
    fn test_production_for_undeclared_non_terminal() {
        let result = Grammar::new(
            ["S"],
            ["a"],
            [("S", vec![vec!["a"]]), ("T", vec![vec!["a"]])],
            "S",
        );
        assert!(invalid_message(result).contains("undeclared non-terminal `T`"));
    }

    #[test]
    fn test_non_terminal_without_productions() {
        let result = Grammar::new(["S", "T"], ["a"], [("S", vec![vec!["a"]])], "S");
        assert!(invalid_message(result).contains("`T` has no productions"));
    }

    #[test]
    fn test_terminals_and_non_terminals_disjoint() {
        let result = Grammar::new(["S"], ["S", "a"], [("S", vec![vec!["a"]])], "S");
        assert!(invalid_message(result).contains("both a terminal and a non-terminal"));
    }

    #[test]
    fn test_empty_identifier_rejected() {
        let result = Grammar::new(["S"], ["", "a"], [("S", vec![vec!["a"]])], "S");
        assert!(invalid_message(result).contains("must not be empty"));
    }

    #[test]
    fn test_repeated_keys_append_alternatives() {
        let grammar = Grammar::new(
            ["S"],
            ["a", "b"],
            [("S", vec![vec!["a"]]), ("S", vec![vec!["b"]])],
            "S",
        )
        .unwrap();

        let rendered: Vec<String> = grammar
            .alternatives("S")
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(rendered, vec!["a", "b"]);
    }

    #[test]
    fn test_grammar_builder() {
        let grammar = GrammarBuilder::new("S")
            .rule("S", &["a", "<S>", "b"])
            .epsilon("S")
            .build()
            .unwrap();

        assert!(grammar.has_non_terminal("S"));
        assert!(grammar.is_terminal("a"));
        assert!(grammar.is_terminal("b"));
        assert_eq!(grammar.alternatives("S").len(), 2);
    }

    #[test]
    fn test_builder_reports_missing_rule() {
        let result = GrammarBuilder::new("S").rule("S", &["<T>"]).build();
        assert!(invalid_message(result).contains("`T` has no productions"));
    }

    #[test]
    fn test_builder_keeps_config() {
        let config = GrammarConfig {
            attempts_per_string: 3,
            base_attempts: 7,
        };
        let grammar = GrammarBuilder::new("S")
            .rule("S", &["x"])
            .config(config)
            .build()
            .unwrap();

        assert_eq!(grammar.config().attempt_budget(2), 13);
    }

    #[test]
    fn test_definition_round_trip_through_json() {
        let grammar = GrammarBuilder::new("S")
            .rule("S", &["a", "<S>", "b"])
            .epsilon("S")
            .build()
            .unwrap();

        let json = serde_json::to_string(&grammar.definition()).unwrap();
        let reloaded =
            Grammar::from_definition(serde_json::from_str(&json).unwrap()).unwrap();

        assert_eq!(reloaded.definition(), grammar.definition());
    }

    #[test]
    fn test_display() {
        let grammar = GrammarBuilder::new("S")
            .rule("S", &["a", "<S>", "b"])
            .epsilon("S")
            .build()
            .unwrap();

        assert_eq!(
            grammar.to_string(),
            "Non-terminals: {S}\nTerminals: {a, b}\nStart Symbol: S\nProductions:\n  S -> aSb\n  S -> ε"
        );
    }

    #[test]
    fn test_independent_instances() {
        let build = || {
            GrammarBuilder::new("S")
                .rule("S", &["a", "<S>", "b"])
                .epsilon("S")
                .build()
                .unwrap()
        };
        let first = build();
        let second = build();

        assert_eq!(first.definition(), second.definition());
        assert_eq!(
            first.derive_membership("aabb", DEFAULT_MAX_STEPS),
            second.derive_membership("aabb", DEFAULT_MAX_STEPS)
        );
    }

    #[test]
    fn test_builder_declares_unused_terminal() {
        let builder = GrammarBuilder::new("S")
            .rule("S", &["a", "<S>", "b"])
            .epsilon("S");

        let without_c = builder.clone().build().unwrap();
        assert!(!without_c.is_terminal("c"));
        assert!(matches!(
            without_c.derive_membership_strict("aabbc", DEFAULT_MAX_STEPS),
            Err(GrammarError::UnknownSymbol(_))
        ));

        let with_c = builder.terminal("c").build().unwrap();
        assert!(with_c.is_terminal("c"));
        assert_eq!(with_c.to_string().lines().nth(1), Some("Terminals: {a, b, c}"));
        let membership = with_c
            .derive_membership_strict("aabbc", DEFAULT_MAX_STEPS)
            .unwrap();
        assert!(!membership.is_member);
        assert!(membership.trace.is_empty());
        assert!(with_c.derive_membership_strict("aabb", DEFAULT_MAX_STEPS).unwrap().is_member);
    }
}
