//! Text report walking through the `S → aSb | ε` grammar and the
//! `aⁿ bⁿ cⁿ` recognizer.

use std::fmt::Write;

use crate::fixtures;
use crate::generator::Generator;
use crate::grammar::Grammar;
use crate::recognizer;
use crate::utils::Result;

const RULE: &str = "----------------------------------------";

const MEMBERSHIP_INPUTS: [&str; 9] = [
    "",
    "ab",
    "aabb",
    "aaabbb",
    "aab",
    "aabbc",
    "abab",
    "aaaaabbbbb",
    "aaaaaabbbbbb",
];

const RECOGNIZER_INPUTS: [&str; 10] = [
    "abc",
    "aabbcc",
    "aaabbbccc",
    "",
    "ab",
    "aabbc",
    "aaabbbcccddd",
    "aabbbccc",
    "aaabcc",
    "aabbccbbaa",
];

/// Render the full demo. With a seed the generated strings are reproducible.
pub fn demo_report(seed: Option<u64>) -> Result<String> {
    let grammar = fixtures::a_n_b_n()?;
    let mut out = String::new();
    render(&mut out, &grammar, seed)?;
    Ok(out)
}

fn render(out: &mut String, grammar: &Grammar, seed: Option<u64>) -> std::fmt::Result {
    write_definition(out, grammar)?;
    write_generation(out, grammar, seed)?;
    write_membership(out, grammar)?;
    write_recognizer(out)
}

fn write_definition(out: &mut String, grammar: &Grammar) -> std::fmt::Result {
    writeln!(out, "--- Grammar (S -> aSb | ε) ---")?;
    writeln!(out, "{}", grammar)?;
    writeln!(out, "{}", RULE)
}

fn write_generation(out: &mut String, grammar: &Grammar, seed: Option<u64>) -> std::fmt::Result {
    writeln!(out, "\n--- Generation (S -> aSb | ε) ---")?;

    let generated = match seed {
        Some(seed) => Generator::seeded(grammar, seed).generate(10, 10, 7),
        None => grammar.generate(10, 10, 7),
    };
    let mut generated: Vec<String> = generated.into_iter().collect();
    generated.sort_by_key(|s| s.chars().count());
    let quoted: Vec<String> = generated.iter().map(|s| format!("{:?}", s)).collect();

    writeln!(
        out,
        "Generated up to 10 strings (max length 10): [{}]",
        quoted.join(", ")
    )?;
    writeln!(out, "{}", RULE)
}

fn write_membership(out: &mut String, grammar: &Grammar) -> std::fmt::Result {
    writeln!(out, "\n--- Membership and derivation (S -> aSb | ε) ---")?;

    for input in MEMBERSHIP_INPUTS {
        let length = input.chars().count();
        let result = grammar.derive_membership(input, length + 5);

        writeln!(out, "\nTesting string: {:?} (length {})", input, length)?;
        writeln!(out, "  Belongs to L(G) (S -> aSb | ε): {}", result.is_member)?;
        if result.is_member {
            writeln!(out, "  Derivation: {}", result)?;
        }
    }
    writeln!(out, "{}", RULE)
}

fn write_recognizer(out: &mut String) -> std::fmt::Result {
    writeln!(out, "\n--- a^n b^n c^n recognizer (n >= 1) ---")?;
    writeln!(out, "This language is NOT context-free; the pumping lemma for context-free languages rules it out.")?;
    writeln!(out, "A CFG has a single stack, but this language needs two linked counts")?;
    writeln!(out, "(the b's must match the a's AND the c's must match the a's and b's).")?;
    writeln!(out, "The following is a direct recognizer, not based on a (non-existent) CFG.")?;

    for input in RECOGNIZER_INPUTS {
        writeln!(
            out,
            "String {:?}: Belongs to L = {{a^n b^n c^n | n >= 1}}: {}",
            input,
            recognizer::recognize(input)
        )?;
    }
    writeln!(out, "{}", RULE)
}
