//! The table-driven shift/reduce parser.

use crate::grammar::{Grammar, Symbol};
use crate::lexer::Token;
use crate::lr0::StateID;
use crate::parse_table::{Action, ParseTable};
use std::fmt::Write as _;

/// The outcome of a single parse: success flag, failure headline, and the
/// step-by-step trace that reproduces the run.
#[derive(Debug)]
pub struct Parse {
    pub success: bool,
    pub error_message: String,
    pub trace: Vec<String>,
}

impl Parse {
    fn accepted(trace: Vec<String>) -> Self {
        Self {
            success: true,
            error_message: String::new(),
            trace,
        }
    }

    fn failed(error_message: String, trace: Vec<String>) -> Self {
        Self {
            success: false,
            error_message,
            trace,
        }
    }
}

/// The parser runtime.
///
/// Holds read-only references to the grammar and its tables; the only
/// allocations per parse are the two stacks and the trace.
#[derive(Debug)]
pub struct Parser<'g> {
    grammar: &'g Grammar,
    table: &'g ParseTable,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar, table: &'g ParseTable) -> Self {
        Self { grammar, table }
    }

    /// Run the shift/reduce loop over the token sequence.
    ///
    /// The end marker is appended here; callers hand over user tokens only.
    pub fn parse(&self, tokens: &[Token]) -> Parse {
        let end_marker = Symbol::end_marker();
        let mut state_stack: Vec<StateID> = vec![StateID::START];
        let mut symbol_stack: Vec<Symbol> = vec![end_marker.clone()];
        let mut trace: Vec<String> = Vec::new();

        let mut input: Vec<&Symbol> = tokens.iter().map(|token| &token.terminal).collect();
        input.push(&end_marker);
        let mut index = 0;

        loop {
            let Some(&state) = state_stack.last() else {
                return Parse::failed("fatal: state stack underflow".into(), trace);
            };
            let current = input[index];
            trace.push(format!("state {}, lookahead '{}'", state, current));
            tracing::trace!(
                state = %state,
                lookahead = %current,
                depth = state_stack.len(),
                "parse step",
            );

            match self.table.action(state, current) {
                Some(Action::Shift(next)) => {
                    symbol_stack.push(current.clone());
                    state_stack.push(next);
                    index += 1;
                    trace.push(format!("shift to state {}", next));
                }

                Some(Action::Reduce(id)) => {
                    let production = self.grammar.production(id);
                    trace.push(format!("reduce by {}", production));

                    // An epsilon production pops nothing but still takes
                    // the GOTO for its lhs.
                    for _ in 0..production.arity() {
                        if state_stack.pop().is_none() || symbol_stack.pop().is_none() {
                            return Parse::failed(
                                format!("fatal: stack underflow while reducing by {}", production),
                                trace,
                            );
                        }
                    }

                    let Some(&uncovered) = state_stack.last() else {
                        return Parse::failed(
                            format!("fatal: stack underflow while reducing by {}", production),
                            trace,
                        );
                    };
                    match self.table.goto(uncovered, production.left()) {
                        Some(next) => {
                            symbol_stack.push(production.left().clone());
                            state_stack.push(next);
                            trace.push(format!("goto state {}", next));
                        }
                        None => {
                            return Parse::failed(
                                format!(
                                    "GOTO({}, {}) has no entry",
                                    uncovered,
                                    production.left(),
                                ),
                                trace,
                            );
                        }
                    }
                }

                Some(Action::Accept) => {
                    trace.push("accept".into());
                    return Parse::accepted(trace);
                }

                None => {
                    trace.push(format!("state stack: {}", render_states(&state_stack)));
                    trace.push(format!("symbol stack: {}", render_symbols(&symbol_stack)));
                    return Parse::failed(
                        format!("ACTION({}, {}) has no entry", state, current),
                        trace,
                    );
                }
            }
        }
    }
}

fn render_states(stack: &[StateID]) -> String {
    let mut out = String::new();
    for (i, state) in stack.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{}", state);
    }
    out
}

fn render_symbols(stack: &[Symbol]) -> String {
    let mut out = String::new();
    for (i, symbol) in stack.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{}", symbol);
    }
    out
}
