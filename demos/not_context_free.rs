use cfg_engine::{DEFAULT_MAX_STEPS, fixtures, recognizer};
use std::error::Error;

/// Contrast a^n b^n, which a grammar handles, with a^n b^n c^n, which needs a counter
fn main() -> Result<(), Box<dyn Error>> {
    let grammar = fixtures::a_n_b_n()?;

    for n in 1..=4 {
        let two = format!("{}{}", "a".repeat(n), "b".repeat(n));
        let three = format!("{}{}", two, "c".repeat(n));

        println!(
            "{:<14} grammar: {:<5}   {:<14} recognizer: {}",
            two,
            grammar.derive_membership(&two, DEFAULT_MAX_STEPS).is_member,
            three,
            recognizer::recognize(&three)
        );
    }

    Ok(())
}
