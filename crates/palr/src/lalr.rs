//! LALR(1) lookahead computation.
//!
//! Lookaheads for the kernel items of the LR(0) automaton are discovered by
//! the spontaneous-generation / propagation algorithm: every kernel item is
//! closed under a sentinel lookahead `#`; lookaheads other than `#` arriving
//! at a successor item are spontaneous, while `#` itself marks an edge along
//! which the kernel's own lookaheads must flow. A fixed-point sweep over the
//! recorded edges then completes the sets.

use crate::first_sets::FirstSets;
use crate::grammar::{Grammar, Symbol};
use crate::lr0::{Automaton, LR0Item, State, StateID};
use crate::types::{Map, Set};

/// An LALR(1) item set: lookaheads keyed by LR(0) core, merged by union.
pub type ItemSet = Map<LR0Item, Set<Symbol>>;

/// CLOSURE₁ of an LALR(1) item set.
///
/// For every `[A -> α . B β, L]` with B a nonterminal, each production
/// `B -> γ` contributes `[B -> . γ, FIRST(β, L)]`; lookaheads of an already
/// present core merge by union. Iterates to fixed point, so lookaheads keep
/// flowing through chains of nullable leading nonterminals.
pub fn closure(grammar: &Grammar, first: &FirstSets, seed: ItemSet) -> ItemSet {
    let mut items = seed;

    let mut changed = true;
    while changed {
        changed = false;

        let mut index = 0;
        while index < items.len() {
            let (&item, lookaheads) = items
                .get_index(index)
                .expect("index within bounds");
            index += 1;

            let Some(next) = item.next_symbol(grammar) else {
                continue;
            };
            if !next.is_nonterminal() {
                continue;
            }
            let next = next.clone();

            let production = grammar.production(item.production);
            let beta = &production.right()[usize::from(item.dot) + 1..];
            let lookaheads = lookaheads.clone();
            let derived = first.first_of_sequence(beta, &lookaheads);

            for &id in grammar.productions_for(&next) {
                let added = LR0Item {
                    production: id,
                    dot: 0,
                };
                let entry = items.entry(added).or_default();
                for symbol in &derived {
                    changed |= entry.insert(symbol.clone());
                }
            }
        }
    }

    items
}

/// GOTO₁ over an LALR(1) item set: shift the dot over `symbol`, carrying
/// lookaheads along, then close the result.
pub fn goto(grammar: &Grammar, first: &FirstSets, items: &ItemSet, symbol: &Symbol) -> ItemSet {
    let mut seed = ItemSet::default();
    for (item, lookaheads) in items {
        if item.next_symbol(grammar) == Some(symbol) {
            seed.entry(item.shifted())
                .or_default()
                .extend(lookaheads.iter().cloned());
        }
    }
    closure(grammar, first, seed)
}

/// The computed lookahead sets for every kernel item of every state.
///
/// Kept in a side table keyed by `(state, core)` so that items never mutate
/// while sitting inside a hashed set.
#[derive(Debug)]
pub struct Lookaheads {
    kernels: Map<(StateID, LR0Item), Set<Symbol>>,
}

impl Lookaheads {
    /// Run the spontaneous/propagation algorithm over the whole automaton.
    pub fn compute(grammar: &Grammar, first: &FirstSets, automaton: &Automaton) -> Self {
        let sentinel = Symbol::sentinel();

        let mut kernels: Map<(StateID, LR0Item), Set<Symbol>> = Map::default();
        for state in automaton.states() {
            for &kernel in &state.kernels {
                kernels.insert((state.id, kernel), Set::default());
            }
        }

        // The end marker is the one lookahead known up front.
        kernels[&(StateID::START, LR0Item::AUGMENTED_START)].insert(Symbol::end_marker());

        // Discover spontaneous lookaheads and propagation edges.
        let mut propagations: Map<(StateID, LR0Item), Vec<(StateID, LR0Item)>> = Map::default();
        for state in automaton.states() {
            for &kernel in &state.kernels {
                let mut seed = ItemSet::default();
                seed.insert(kernel, std::iter::once(sentinel.clone()).collect());
                let closed = closure(grammar, first, seed);

                for (item, lookaheads) in &closed {
                    let Some(next) = item.next_symbol(grammar) else {
                        continue;
                    };
                    let Some(target) = state.transitions.get(next).copied() else {
                        continue;
                    };
                    let successor = (target, item.shifted());

                    for symbol in lookaheads {
                        if *symbol == sentinel {
                            propagations
                                .entry((state.id, kernel))
                                .or_default()
                                .push(successor);
                        } else {
                            let spontaneous = kernels[&successor].insert(symbol.clone());
                            if spontaneous {
                                tracing::trace!(
                                    "spontaneous lookahead {} for {} in state {}",
                                    symbol,
                                    successor.1.display(grammar),
                                    successor.0,
                                );
                            }
                        }
                    }
                }
            }
        }

        // Flow lookaheads along the recorded edges until nothing changes.
        let mut changed = true;
        while changed {
            changed = false;
            for (source, targets) in &propagations {
                let lookaheads = kernels[source].clone();
                for target in targets {
                    let entry = &mut kernels[target];
                    for symbol in &lookaheads {
                        changed |= entry.insert(symbol.clone());
                    }
                }
            }
        }

        tracing::debug!(
            num_kernel_items = kernels.len(),
            num_propagation_sources = propagations.len(),
            "lookahead sets computed",
        );
        Self { kernels }
    }

    /// The lookahead set of a kernel item.
    pub fn get(&self, state: StateID, item: LR0Item) -> Option<&Set<Symbol>> {
        self.kernels.get(&(state, item))
    }

    /// A state's kernel items paired with their final lookahead sets,
    /// ready to be closed into the state's full LALR(1) item set.
    pub fn kernel_items(&self, state: &State) -> ItemSet {
        let mut items = ItemSet::default();
        for &kernel in &state.kernels {
            let lookaheads = self.kernels[&(state.id, kernel)].clone();
            items.insert(kernel, lookaheads);
        }
        items
    }
}
