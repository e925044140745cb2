//! Direct recognizer for `{ aⁿ bⁿ cⁿ | n ≥ 1 }`.
//!
//! No context-free grammar generates this language (pumping lemma), so it is
//! checked by counting runs instead of through [`Grammar`](crate::Grammar).

/// Length of the run of `symbol` at the front of `chars`.
fn run(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, symbol: char) -> usize {
    let mut count = 0;
    while chars.next_if_eq(&symbol).is_some() {
        count += 1;
    }
    count
}

/// True iff `input` is `a` repeated n times, then `b` n times, then `c` n times, for some n ≥ 1.
pub fn recognize(input: &str) -> bool {
    let mut chars = input.chars().peekable();

    let a = run(&mut chars, 'a');
    if a == 0 {
        return false;
    }
    let b = run(&mut chars, 'b');
    let c = run(&mut chars, 'c');

    a == b && b == c && chars.next().is_none()
}
