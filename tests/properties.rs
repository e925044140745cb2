use cfg_engine::{DEFAULT_MAX_DEPTH, fixtures};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn generated_strings_respect_bounds_and_derive(seed in any::<u64>(), max_length in 1usize..12) {
        let grammar = fixtures::a_n_b_n().unwrap();
        let generated = grammar.generate_seeded(seed, 8, max_length, DEFAULT_MAX_DEPTH);

        prop_assert!(generated.len() <= 8);
        for text in &generated {
            prop_assert!(text.chars().count() <= max_length);
            let max_steps = 2 * text.chars().count() + 10;
            prop_assert!(grammar.derive_membership(text, max_steps).is_member);
        }
    }

    #[test]
    fn parens_generation_is_sound(seed in any::<u64>()) {
        let grammar = fixtures::balanced_parens().unwrap();
        for text in grammar.generate_seeded(seed, 6, 10, DEFAULT_MAX_DEPTH) {
            let max_steps = 2 * text.chars().count() + 10;
            prop_assert!(grammar.derive_membership(&text, max_steps).is_member, "{}", text);
        }
    }

    #[test]
    fn generation_never_exceeds_count(seed in any::<u64>(), count in 1usize..6) {
        // Balanced parentheses up to length 12 has far more than `count` strings.
        let grammar = fixtures::balanced_parens().unwrap();
        let generated = grammar.generate_seeded(seed, count, 12, DEFAULT_MAX_DEPTH);

        prop_assert!(generated.len() <= count, "{} > {}", generated.len(), count);
        prop_assert!(!generated.is_empty());
    }

    #[test]
    fn depth_first_and_breadth_first_agree(n in 0usize..6, extra_a in 0usize..2) {
        let grammar = fixtures::a_n_b_n().unwrap();
        let target = format!("{}{}", "a".repeat(n + extra_a), "b".repeat(n));

        let dfs = grammar.derive_membership(&target, 30);
        let bfs = grammar.derive_shortest(&target, 30);
        prop_assert_eq!(dfs.is_member, extra_a == 0);
        prop_assert_eq!(dfs, bfs);
    }
}
