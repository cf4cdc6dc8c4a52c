//! Construction of the canonical LR(0) item-set collection.

use crate::grammar::{DottedDisplay, Grammar, ProductionID, Symbol};
use crate::types::{Map, Set};
use std::{collections::VecDeque, fmt};

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct StateID(u16);

impl StateID {
    /// The initial state, built from the augmented item `S' -> . S`.
    pub const START: Self = Self(0);

    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S#{:03}", self.0)
    }
}

impl fmt::Display for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The LR(0) item, a.k.a. LR item core.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LR0Item {
    pub production: ProductionID,
    pub dot: u16,
}

impl LR0Item {
    pub const AUGMENTED_START: Self = Self {
        production: ProductionID::AUGMENTED,
        dot: 0,
    };

    /// A kernel item has its dot past the leftmost position, or is the
    /// augmented start item.
    pub fn is_kernel(&self) -> bool {
        self.dot > 0 || self.production == ProductionID::AUGMENTED
    }

    /// The same item with the dot moved one symbol to the right.
    pub fn shifted(&self) -> Self {
        Self {
            production: self.production,
            dot: self.dot + 1,
        }
    }

    /// The symbol immediately after the dot, if the item is not complete.
    pub fn next_symbol<'g>(&self, grammar: &'g Grammar) -> Option<&'g Symbol> {
        grammar.production(self.production).symbol_after(self.dot)
    }

    /// Whether the dot has reached the end of the production (an empty
    /// production counts as complete at dot 0).
    pub fn is_complete(&self, grammar: &Grammar) -> bool {
        let production = grammar.production(self.production);
        production.is_epsilon() || usize::from(self.dot) == production.right().len()
    }

    pub fn display<'g>(&self, grammar: &'g Grammar) -> impl fmt::Display + 'g {
        DottedDisplay::new(grammar.production(self.production), self.dot)
    }
}

/// CLOSURE₀ of a seed item set: for every `A -> α . B β` with B a
/// nonterminal, every `B -> . γ` joins the set, to fixed point.
pub fn closure(grammar: &Grammar, seed: impl IntoIterator<Item = LR0Item>) -> Set<LR0Item> {
    let mut items: Set<LR0Item> = seed.into_iter().collect();
    let mut pending: VecDeque<LR0Item> = items.iter().copied().collect();

    while let Some(item) = pending.pop_front() {
        let Some(next) = item.next_symbol(grammar) else {
            continue;
        };
        if !next.is_nonterminal() {
            continue;
        }
        for &production in grammar.productions_for(next) {
            let added = LR0Item {
                production,
                dot: 0,
            };
            if items.insert(added) {
                pending.push_back(added);
            }
        }
    }

    items
}

/// A state of the automaton: its kernel items plus the outgoing
/// transitions on both terminals and nonterminals.
#[derive(Debug)]
pub struct State {
    pub id: StateID,
    /// Kernel items, sorted by (production, dot); this vector is the
    /// state's identity within the automaton.
    pub kernels: Vec<LR0Item>,
    /// Recorded GOTO transitions, in (kind, name) symbol order.
    pub transitions: Map<Symbol, StateID>,
}

impl State {
    pub fn display<'g>(&'g self, grammar: &'g Grammar) -> impl fmt::Display + 'g {
        StateDisplay {
            state: self,
            grammar,
        }
    }
}

struct StateDisplay<'g> {
    state: &'g State,
    grammar: &'g Grammar,
}

impl fmt::Display for StateDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { state, grammar } = self;
        writeln!(f, "#### State {:?}", state.id)?;
        writeln!(f, "## kernels")?;
        for kernel in &state.kernels {
            writeln!(f, "- {}", kernel.display(grammar))?;
        }
        if !state.transitions.is_empty() {
            writeln!(f, "## transitions")?;
            for (symbol, target) in &state.transitions {
                writeln!(f, "- {} => {:?}", symbol, target)?;
            }
        }
        Ok(())
    }
}

/// The canonical collection of LR(0) item sets.
#[derive(Debug)]
pub struct Automaton {
    states: Vec<State>,
}

impl Automaton {
    /// Build the automaton for an augmented grammar.
    ///
    /// State ids are assigned in discovery order; within each state the
    /// transition symbols are explored in (kind, name) order, so the
    /// numbering is deterministic. State identity is kernel-core equality.
    pub fn build(grammar: &Grammar) -> Self {
        let mut states = Vec::new();
        let mut isocores: Map<Vec<LR0Item>, StateID> = Map::default();
        let mut pending: VecDeque<(StateID, Vec<LR0Item>)> = VecDeque::new();

        let start_kernel = vec![LR0Item::AUGMENTED_START];
        isocores.insert(start_kernel.clone(), StateID::START);
        pending.push_back((StateID::START, start_kernel));

        while let Some((id, kernels)) = pending.pop_front() {
            let items = closure(grammar, kernels.iter().copied());

            let mut shifted: Map<Symbol, Vec<LR0Item>> = Map::default();
            for item in &items {
                if let Some(next) = item.next_symbol(grammar) {
                    shifted
                        .entry(next.clone())
                        .or_default()
                        .push(item.shifted());
                }
            }
            shifted.sort_keys();

            let mut transitions = Map::default();
            for (symbol, mut kernel) in shifted {
                kernel.sort_unstable();
                kernel.dedup();
                let target = match isocores.get(&kernel) {
                    Some(&existing) => existing,
                    None => {
                        let target = StateID::from_raw(isocores.len() as u16);
                        isocores.insert(kernel.clone(), target);
                        pending.push_back((target, kernel));
                        target
                    }
                };
                transitions.insert(symbol, target);
            }

            debug_assert_eq!(states.len(), usize::from(id.raw()));
            states.push(State {
                id,
                kernels,
                transitions,
            });
        }

        tracing::debug!(num_states = states.len(), "LR(0) automaton built");
        Self { states }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self, id: StateID) -> &State {
        &self.states[usize::from(id.raw())]
    }

    pub fn states(&self) -> impl Iterator<Item = &State> + '_ {
        self.states.iter()
    }

    /// The recorded transition `lr0_goto[(id, symbol)]`, if present.
    pub fn goto(&self, id: StateID, symbol: &Symbol) -> Option<StateID> {
        self.state(id).transitions.get(symbol).copied()
    }

    pub fn display<'g>(&'g self, grammar: &'g Grammar) -> impl fmt::Display + 'g {
        AutomatonDisplay {
            automaton: self,
            grammar,
        }
    }
}

struct AutomatonDisplay<'g> {
    automaton: &'g Automaton,
    grammar: &'g Grammar,
}

impl fmt::Display for AutomatonDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for state in &self.automaton.states {
            write!(f, "{}", state.display(self.grammar))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax;

    fn expression_automaton() -> (Grammar, Automaton) {
        let mut grammar = syntax::parse_str(
            "\
E -> E + T | T
T -> T * F | F
F -> ( E ) | id
",
        );
        grammar.augment();
        let automaton = Automaton::build(&grammar);
        (grammar, automaton)
    }

    #[test]
    fn start_state_contains_the_augmented_item() {
        let (grammar, automaton) = expression_automaton();
        let start = automaton.state(StateID::START);
        assert_eq!(start.kernels, vec![LR0Item::AUGMENTED_START]);

        // Every item in the start state still has work to do.
        for item in closure(&grammar, start.kernels.iter().copied()) {
            assert!(!item.is_complete(&grammar));
        }
    }

    #[test]
    fn expression_grammar_has_the_canonical_state_count() {
        let (_grammar, automaton) = expression_automaton();
        assert_eq!(automaton.len(), 12);
    }

    #[test]
    fn goto_targets_hold_exactly_the_shifted_cores() {
        let (grammar, automaton) = expression_automaton();
        for state in automaton.states() {
            let items = closure(&grammar, state.kernels.iter().copied());
            for (symbol, &target) in &state.transitions {
                let mut expected: Vec<LR0Item> = items
                    .iter()
                    .filter(|item| item.next_symbol(&grammar) == Some(symbol))
                    .map(|item| item.shifted())
                    .collect();
                expected.sort_unstable();
                expected.dedup();
                assert_eq!(automaton.state(target).kernels, expected);
            }
        }
    }

    #[test]
    fn distinct_states_have_distinct_kernel_cores() {
        let (_grammar, automaton) = expression_automaton();
        let mut seen: Set<Vec<LR0Item>> = Set::default();
        for state in automaton.states() {
            assert!(seen.insert(state.kernels.clone()));
        }
    }

    #[test]
    fn epsilon_never_appears_as_a_transition_symbol() {
        let mut grammar = syntax::parse_str(
            "\
S -> A B
A -> a | epsilon
B -> b
",
        );
        grammar.augment();
        let automaton = Automaton::build(&grammar);
        for state in automaton.states() {
            assert!(state.transitions.keys().all(|sym| !sym.is_epsilon()));
        }
    }

    #[test]
    fn closure_expands_nonterminals_after_the_dot() {
        let (grammar, _automaton) = expression_automaton();
        let items = closure(&grammar, [LR0Item::AUGMENTED_START]);
        // S' -> . E, E -> . E + T, E -> . T, T -> . T * F, T -> . F,
        // F -> . ( E ), F -> . id
        assert_eq!(items.len(), 7);
        assert!(items.iter().all(|item| item.dot == 0));
    }
}
