use cfg_engine::{DEFAULT_MAX_STEPS, GrammarBuilder, GrammarConfig, loader};
use std::error::Error;

/// Build grammars programmatically and from rule text, then generate and derive
fn main() -> Result<(), Box<dyn Error>> {
    // Example 1: a grammar built rule by rule
    let grammar = GrammarBuilder::new("S")
        .rule("S", &["a", "<S>", "b"])
        .epsilon("S")
        .build()?;

    println!("{}\n", grammar);
    println!("Generated strings:");
    for (i, text) in grammar.generate_seeded(1, 6, 12, 15).iter().enumerate() {
        println!("{}. {:?}", i + 1, text);
    }

    println!("\nDerivations:");
    for target in ["aabb", "aaab"] {
        let result = grammar.derive_membership(target, DEFAULT_MAX_STEPS);
        println!("{:?}: {}", target, result);
    }

    // Example 2: rule text with alternatives, and a tighter attempt budget
    let sentences = loader::parse_str(
        r#"
        <sentence> ::= [<subject>, " ", <verb>]
        <subject>  ::= ["the fox"] | ["a dog"]
        <verb>     ::= ["runs"] | ["jumps"] | ["sleeps", <adverb>]
        <adverb>   ::= [" soundly"] | []
        "#,
        None,
    )?
    .with_config(GrammarConfig {
        attempts_per_string: 5,
        base_attempts: 10,
    });

    println!("\nGenerated sentences:");
    for text in sentences.generate(8, 40, 10) {
        println!("  {}", text);
    }

    let shortest = sentences.derive_shortest("a dog sleeps", DEFAULT_MAX_STEPS);
    println!("\nShortest derivation: {}", shortest);

    Ok(())
}
