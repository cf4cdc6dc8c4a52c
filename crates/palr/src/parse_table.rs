//! Construction of the ACTION and GOTO tables, with conflict detection.

use crate::first_sets::FirstSets;
use crate::grammar::{Grammar, ProductionID, Symbol};
use crate::lalr::{self, Lookaheads};
use crate::lr0::{Automaton, StateID};
use crate::types::Map;
use std::fmt;

/// A single ACTION entry. A missing entry is the error action.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    Shift(StateID),
    Reduce(ProductionID),
    Accept,
}

impl Action {
    fn kind(&self) -> &'static str {
        match self {
            Self::Shift(..) => "Shift",
            Self::Reduce(..) => "Reduce",
            Self::Accept => "Accept",
        }
    }

    pub fn display<'g>(&self, grammar: &'g Grammar) -> impl fmt::Display + 'g {
        ActionDisplay {
            action: *self,
            grammar,
        }
    }
}

struct ActionDisplay<'g> {
    action: Action,
    grammar: &'g Grammar,
}

impl fmt::Display for ActionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            Action::Shift(target) => write!(f, "shift to state {}", target),
            Action::Reduce(id) => write!(f, "reduce by {}", self.grammar.production(id)),
            Action::Accept => f.write_str("accept"),
        }
    }
}

/// A fatal error raised while materializing the tables.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("{kind_a}-{kind_b} conflict at state {state} on symbol {symbol}: {action_a} vs {action_b}")]
    Conflict {
        kind_a: &'static str,
        kind_b: &'static str,
        state: StateID,
        symbol: String,
        action_a: String,
        action_b: String,
    },

    #[error("missing GOTO target at state {state} on symbol {symbol}")]
    MissingGoto { state: StateID, symbol: String },

    #[error("the grammar has no productions to build from")]
    EmptyGrammar,
}

/// One table row: ACTION over terminals, GOTO over nonterminals.
#[derive(Debug, Default, PartialEq)]
pub struct Row {
    pub actions: Map<Symbol, Action>,
    pub gotos: Map<Symbol, StateID>,
}

/// The conflict-checked ACTION/GOTO tables driving the parser runtime.
///
/// Read-only after construction; the runtime only ever borrows it.
#[derive(Debug, PartialEq)]
pub struct ParseTable {
    rows: Vec<Row>,
}

impl ParseTable {
    /// Walk every state's full LALR(1) closure and materialize its row.
    pub fn build(
        grammar: &Grammar,
        first: &FirstSets,
        automaton: &Automaton,
        lookaheads: &Lookaheads,
    ) -> Result<Self, BuildError> {
        let end_marker = Symbol::end_marker();
        let mut rows = Vec::with_capacity(automaton.len());

        for state in automaton.states() {
            let closed = lalr::closure(grammar, first, lookaheads.kernel_items(state));
            let mut row = Row::default();

            for (item, item_lookaheads) in &closed {
                if item.is_complete(grammar) {
                    for lookahead in item_lookaheads {
                        let action = if item.production == ProductionID::AUGMENTED
                            && *lookahead == end_marker
                        {
                            Action::Accept
                        } else {
                            Action::Reduce(item.production)
                        };
                        insert_action(grammar, &mut row, state.id, lookahead, action)?;
                    }
                } else if let Some(next) = item.next_symbol(grammar) {
                    if next.is_terminal() {
                        let target = state.transitions.get(next).copied().ok_or_else(|| {
                            BuildError::MissingGoto {
                                state: state.id,
                                symbol: next.name().to_owned(),
                            }
                        })?;
                        insert_action(grammar, &mut row, state.id, next, Action::Shift(target))?;
                    }
                }
            }

            for (symbol, &target) in &state.transitions {
                if symbol.is_nonterminal() {
                    row.gotos.insert(symbol.clone(), target);
                }
            }

            rows.push(row);
        }

        tracing::debug!(num_states = rows.len(), "parse table built");
        Ok(Self { rows })
    }

    pub fn num_states(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, state: StateID) -> &Row {
        &self.rows[usize::from(state.raw())]
    }

    pub fn rows(&self) -> impl Iterator<Item = (StateID, &Row)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| (StateID::from_raw(i as u16), row))
    }

    /// ACTION[state, terminal], if present.
    pub fn action(&self, state: StateID, terminal: &Symbol) -> Option<Action> {
        self.row(state).actions.get(terminal).copied()
    }

    /// GOTO[state, nonterminal], if present.
    pub fn goto(&self, state: StateID, nonterminal: &Symbol) -> Option<StateID> {
        self.row(state).gotos.get(nonterminal).copied()
    }

    pub fn display<'g>(&'g self, grammar: &'g Grammar) -> impl fmt::Display + 'g {
        TableDisplay {
            table: self,
            grammar,
        }
    }
}

struct TableDisplay<'g> {
    table: &'g ParseTable,
    grammar: &'g Grammar,
}

impl fmt::Display for TableDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { table, grammar } = self;
        for (id, row) in table.rows() {
            writeln!(f, "#### State {:?}", id)?;
            if !row.actions.is_empty() {
                writeln!(f, "## actions")?;
                for (symbol, action) in &row.actions {
                    writeln!(f, "- {} => {}", symbol, action.display(grammar))?;
                }
            }
            if !row.gotos.is_empty() {
                writeln!(f, "## gotos")?;
                for (symbol, target) in &row.gotos {
                    writeln!(f, "- {} => {:?}", symbol, target)?;
                }
            }
        }
        Ok(())
    }
}

fn insert_action(
    grammar: &Grammar,
    row: &mut Row,
    state: StateID,
    symbol: &Symbol,
    incoming: Action,
) -> Result<(), BuildError> {
    match row.actions.get(symbol) {
        None => {
            row.actions.insert(symbol.clone(), incoming);
            Ok(())
        }
        Some(&existing) if existing == incoming => Ok(()),
        Some(&existing) => Err(conflict(grammar, state, symbol, existing, incoming)),
    }
}

/// Render a conflict diagnostic, shift first where one is involved.
///
/// A shift/shift disagreement cannot arise from a deterministic transition
/// map; reporting it at all marks an invariant violation, and the same
/// fatal path is reused for it.
fn conflict(
    grammar: &Grammar,
    state: StateID,
    symbol: &Symbol,
    existing: Action,
    incoming: Action,
) -> BuildError {
    let (a, b) = match (existing, incoming) {
        (a @ Action::Shift(..), b) => (a, b),
        (a, b @ Action::Shift(..)) => (b, a),
        (a, b) => (a, b),
    };
    BuildError::Conflict {
        kind_a: a.kind(),
        kind_b: b.kind(),
        state,
        symbol: symbol.name().to_owned(),
        action_a: a.display(grammar).to_string(),
        action_b: b.display(grammar).to_string(),
    }
}
