//! Membership search over leftmost derivations.
//!
//! [`derive`] walks derivations depth-first, trying each non-terminal's
//! alternatives in declared order and returning the first derivation that
//! reaches the target. [`derive_shortest`] explores the same space
//! breadth-first and returns a derivation with the fewest steps.
//!
//! Both prune a sentential form as soon as its terminal prefix (the symbols
//! before the first non-terminal) stops being a prefix of the target, and both
//! reject forms whose trace would exceed `max_steps`. The step bound is what
//! guarantees termination; running out of steps reports non-membership.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use crate::grammar::{Element, Grammar};
use crate::utils::{GrammarError, Result, render_form, substitute};

/// Outcome of a membership query.
///
/// `trace` holds one rendered sentential form per derivation step, starting
/// with the start symbol. It is empty when `is_member` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Membership {
    pub is_member: bool,
    pub trace: Vec<String>,
}

impl Membership {
    fn member(trace: Vec<String>) -> Self {
        Membership {
            is_member: true,
            trace,
        }
    }

    fn rejected() -> Self {
        Membership {
            is_member: false,
            trace: Vec::new(),
        }
    }

    pub fn into_parts(self) -> (bool, Vec<String>) {
        (self.is_member, self.trace)
    }
}

impl From<Membership> for (bool, Vec<String>) {
    fn from(membership: Membership) -> Self {
        membership.into_parts()
    }
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_member {
            write!(f, "{}", self.trace.join(" -> "))
        } else {
            write!(f, "not a member")
        }
    }
}

enum Visit {
    Reject,
    Accept,
    Expand(usize),
}

fn examine(form: &[&Element], target: &str, steps: usize, max_steps: usize) -> Visit {
    if steps > max_steps {
        return Visit::Reject;
    }

    let position = form.iter().position(|e| e.is_non_terminal());
    let prefix: String = form[..position.unwrap_or(form.len())]
        .iter()
        .map(|e| e.name())
        .collect();
    if !target.starts_with(&prefix) {
        return Visit::Reject;
    }

    match position {
        Some(position) => Visit::Expand(position),
        None if prefix == target => Visit::Accept,
        None => Visit::Reject,
    }
}

struct Frame<'g> {
    form: Vec<&'g Element>,
    position: usize,
    next: usize,
}

/// Depth-first search for a leftmost derivation of `target`.
pub fn derive(grammar: &Grammar, target: &str, max_steps: usize) -> Membership {
    let root = vec![grammar.start()];
    let mut trace = vec![render_form(&root)];
    let mut stack = Vec::new();
    let mut explored = 1usize;

    match examine(&root, target, trace.len(), max_steps) {
        Visit::Accept => return Membership::member(trace),
        Visit::Reject => return Membership::rejected(),
        Visit::Expand(position) => stack.push(Frame {
            form: root,
            position,
            next: 0,
        }),
    }

    // Invariant at the top of the loop: trace[i] renders stack[i].form.
    while let Some(frame) = stack.last_mut() {
        let alternatives = grammar.alternatives(frame.form[frame.position].name());
        let Some(production) = alternatives.get(frame.next) else {
            stack.pop();
            trace.pop();
            continue;
        };
        frame.next += 1;

        let form = substitute(&frame.form, frame.position, &production.elements);
        trace.push(render_form(&form));
        explored += 1;

        match examine(&form, target, trace.len(), max_steps) {
            Visit::Accept => {
                debug!(input = target, steps = trace.len(), explored, "derivation found");
                return Membership::member(trace);
            }
            Visit::Reject => {
                trace.pop();
            }
            Visit::Expand(position) => {
                trace!(form = ?trace.last(), "expanding");
                stack.push(Frame {
                    form,
                    position,
                    next: 0,
                });
            }
        }
    }

    debug!(input = target, explored, "no derivation within step bound");
    Membership::rejected()
}

struct Node<'g> {
    form: Vec<&'g Element>,
    parent: Option<usize>,
    steps: usize,
}

/// Breadth-first search for a leftmost derivation of `target` with the fewest steps.
pub fn derive_shortest(grammar: &Grammar, target: &str, max_steps: usize) -> Membership {
    let mut nodes = vec![Node {
        form: vec![grammar.start()],
        parent: None,
        steps: 1,
    }];
    let mut seen: HashSet<Vec<&Element>> = HashSet::new();
    seen.insert(nodes[0].form.clone());
    let mut queue = VecDeque::from([0usize]);

    while let Some(index) = queue.pop_front() {
        let node = &nodes[index];
        let position = match examine(&node.form, target, node.steps, max_steps) {
            Visit::Reject => continue,
            Visit::Accept => {
                debug!(input = target, steps = node.steps, explored = nodes.len(), "shortest derivation found");
                return Membership::member(unwind(&nodes, index));
            }
            Visit::Expand(position) => position,
        };

        let steps = node.steps + 1;
        let children: Vec<Vec<&Element>> = grammar
            .alternatives(node.form[position].name())
            .iter()
            .map(|production| substitute(&node.form, position, &production.elements))
            .collect();

        for form in children {
            if seen.insert(form.clone()) {
                queue.push_back(nodes.len());
                nodes.push(Node {
                    form,
                    parent: Some(index),
                    steps,
                });
            }
        }
    }

    debug!(input = target, explored = nodes.len(), "no derivation within step bound");
    Membership::rejected()
}

fn unwind(nodes: &[Node<'_>], mut index: usize) -> Vec<String> {
    let mut trace = vec![render_form(&nodes[index].form)];
    while let Some(parent) = nodes[index].parent {
        trace.push(render_form(&nodes[parent].form));
        index = parent;
    }
    trace.reverse();
    trace
}

/// Fail with [`GrammarError::UnknownSymbol`] if some character of `target`
/// occurs in no terminal of `grammar`.
pub fn check_alphabet(grammar: &Grammar, target: &str) -> Result<()> {
    match target
        .chars()
        .find(|c| !grammar.terminals().iter().any(|t| t.contains(*c)))
    {
        Some(c) => Err(GrammarError::UnknownSymbol(format!(
            "`{}` in {:?} is not produced by any terminal",
            c, target
        ))),
        None => Ok(()),
    }
}
