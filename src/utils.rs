use std::io;
use thiserror::Error;

use crate::grammar::Element;

/// Rendering used for an empty sentential form.
pub const EPSILON: &str = "ε";

/// Custom error types for the grammar engine
#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid grammar: {0}")]
    InvalidGrammar(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
}

/// Result type for grammar operations
pub type Result<T> = std::result::Result<T, GrammarError>;

/// Concatenate the symbols of a sentential form, using [`EPSILON`] for the empty form.
pub fn render_form(form: &[&Element]) -> String {
    if form.is_empty() {
        return EPSILON.to_string();
    }
    form.iter().map(|element| element.name()).collect()
}

/// Concatenate only the terminal symbols of a sentential form.
pub fn terminal_yield(form: &[&Element]) -> String {
    form.iter()
        .filter(|element| element.is_terminal())
        .map(|element| element.name())
        .collect()
}

/// Render a right-hand side the way a production listing shows it.
pub fn render_rhs(elements: &[Element]) -> String {
    if elements.is_empty() {
        return EPSILON.to_string();
    }
    elements.iter().map(Element::name).collect()
}

/// Replace the symbol at `position` with `replacement`, producing the next sentential form.
pub fn substitute<'g>(
    form: &[&'g Element],
    position: usize,
    replacement: &'g [Element],
) -> Vec<&'g Element> {
    let mut next = Vec::with_capacity(form.len() + replacement.len());
    next.extend_from_slice(&form[..position]);
    next.extend(replacement.iter());
    next.extend_from_slice(&form[position + 1..]);
    next
}

/// Trait extension for Option<T> to convert to a parse error
pub trait OptionExt<T> {
    fn ok_or_parse_err<F>(self, line: usize, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_parse_err<F>(self, line: usize, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.ok_or_else(|| GrammarError::Parse {
            line,
            message: f(),
        })
    }
}
