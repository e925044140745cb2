//! Reading grammars from disk.
//!
//! Two formats are understood. JSON files hold a [`GrammarDefinition`]
//! verbatim. Everything else is read as rule statements:
//!
//! ```text
//! # a^n b^n
//! <S> ::= ["a", <S>, "b"]
//! <S> ::= []
//! <T> ::= ["x"] | ["y", <T>]
//! ```
//!
//! `<name>` is a non-terminal, quoted or bare tokens are terminals and `[]` is
//! the ε-production. A statement may continue over several lines until its
//! closing bracket. The first rule's left-hand side is the start symbol unless
//! one is given.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::grammar::{Grammar, GrammarDefinition};
use crate::utils::{GrammarError, OptionExt, Result};

static RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<([^>]+)>\s*::=\s*(.*)$").expect("rule pattern is valid")
});

#[derive(Debug, Clone, PartialEq)]
enum Token {
    NonTerminal(String),
    Terminal(String),
}

/// Load a grammar, picking the format from the file extension.
pub fn from_file<P: AsRef<Path>>(path: P, start_symbol: Option<&str>) -> Result<Grammar> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let grammar = if is_json {
        from_json_str(&text, start_symbol)?
    } else {
        parse_str(&text, start_symbol)?
    };

    debug!(
        path = %path.display(),
        rules = grammar.rules().len(),
        start = grammar.start_symbol(),
        "grammar loaded"
    );
    Ok(grammar)
}

/// Read a JSON [`GrammarDefinition`]; `start_symbol` overrides the one in the file.
pub fn from_json_str(text: &str, start_symbol: Option<&str>) -> Result<Grammar> {
    let mut definition: GrammarDefinition = serde_json::from_str(text)?;
    if let Some(start) = start_symbol {
        definition.start_symbol = start.to_string();
    }
    Grammar::from_definition(definition)
}

/// Parse rule statements into a grammar.
pub fn parse_str(text: &str, start_symbol: Option<&str>) -> Result<Grammar> {
    let mut non_terminals: Vec<String> = Vec::new();
    let mut terminals: BTreeSet<String> = BTreeSet::new();
    let mut productions: Vec<(String, Vec<Vec<String>>)> = Vec::new();

    // (rule name, body so far, line the statement started on)
    let mut pending: Option<(String, String, usize)> = None;

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();

        // Skip empty lines and comments
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (name, body, started) = match pending.take() {
            Some((name, mut body, started)) => {
                body.push(' ');
                body.push_str(trimmed);
                (name, body, started)
            }
            None => {
                let captures = RULE.captures(trimmed).ok_or_parse_err(line_number, || {
                    format!("expected `<name> ::= [...]`, found `{}`", trimmed)
                })?;
                let name = captures
                    .get(1)
                    .ok_or_parse_err(line_number, || "missing rule name".to_string())?
                    .as_str()
                    .trim()
                    .to_string();
                let body = captures
                    .get(2)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                (name, body, line_number)
            }
        };

        // Statements end at a closing bracket.
        if !body.trim_end().ends_with(']') {
            pending = Some((name, body, started));
            continue;
        }

        let alternatives = parse_alternatives(&body, started)?;
        if !non_terminals.contains(&name) {
            non_terminals.push(name.clone());
        }

        let mut rhs_list = Vec::with_capacity(alternatives.len());
        for alternative in alternatives {
            let mut rhs = Vec::with_capacity(alternative.len());
            for token in alternative {
                match token {
                    Token::NonTerminal(symbol) => rhs.push(symbol),
                    Token::Terminal(symbol) => {
                        terminals.insert(symbol.clone());
                        rhs.push(symbol);
                    }
                }
            }
            rhs_list.push(rhs);
        }
        productions.push((name, rhs_list));
    }

    if let Some((name, _, started)) = pending {
        return Err(GrammarError::Parse {
            line: started,
            message: format!("rule `{}` is missing its closing `]`", name),
        });
    }

    let start = match start_symbol {
        Some(start) => start.to_string(),
        None => non_terminals
            .first()
            .cloned()
            .ok_or_else(|| GrammarError::InvalidGrammar("grammar has no rules".to_string()))?,
    };

    Grammar::new(non_terminals, terminals, productions, &start)
}

/// Parse `[...] | [...]` into token lists.
fn parse_alternatives(body: &str, line: usize) -> Result<Vec<Vec<Token>>> {
    let chars: Vec<char> = body.chars().collect();
    let mut alternatives = Vec::new();
    let mut current: Option<Vec<Token>> = None;
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];

        if c.is_whitespace() || c == ',' {
            pos += 1;
            continue;
        }

        match c {
            '[' if current.is_none() => {
                current = Some(Vec::new());
                pos += 1;
            }
            ']' if current.is_some() => {
                alternatives.extend(current.take());
                pos += 1;
            }
            '|' if current.is_none() && !alternatives.is_empty() => {
                pos += 1;
            }
            '[' | ']' | '|' => return Err(unexpected(c, body, line)),
            _ => {
                let Some(tokens) = current.as_mut() else {
                    return Err(unexpected(c, body, line));
                };
                match c {
                    '<' => {
                        let start = pos + 1;
                        let end = find(&chars, start, '>').ok_or_parse_err(line, || {
                            "non-terminal is missing its closing `>`".to_string()
                        })?;
                        let name: String = chars[start..end].iter().collect();
                        tokens.push(Token::NonTerminal(name.trim().to_string()));
                        pos = end + 1;
                    }
                    '"' | '\'' => {
                        let start = pos + 1;
                        let end = find(&chars, start, c).ok_or_parse_err(line, || {
                            format!("terminal is missing its closing {}", c)
                        })?;
                        tokens.push(Token::Terminal(chars[start..end].iter().collect()));
                        pos = end + 1;
                    }
                    _ => {
                        // Unquoted terminal
                        let start = pos;
                        while pos < chars.len()
                            && !chars[pos].is_whitespace()
                            && !matches!(chars[pos], ',' | '<' | '[' | ']' | '|')
                        {
                            pos += 1;
                        }
                        tokens.push(Token::Terminal(chars[start..pos].iter().collect()));
                    }
                }
            }
        }
    }

    if current.is_some() || alternatives.is_empty() {
        return Err(GrammarError::Parse {
            line,
            message: format!("expected `[...]` alternatives, found `{}`", body.trim()),
        });
    }
    Ok(alternatives)
}

fn unexpected(c: char, body: &str, line: usize) -> GrammarError {
    GrammarError::Parse {
        line,
        message: format!("unexpected `{}` in `{}`", c, body.trim()),
    }
}

fn find(chars: &[char], from: usize, target: char) -> Option<usize> {
    chars[from..]
        .iter()
        .position(|&c| c == target)
        .map(|offset| from + offset)
}
