//! An LALR(1) parser generator.
//!
//! The pipeline runs leaves first: the grammar model, the FIRST sets, the
//! canonical LR(0) automaton, the spontaneous/propagation lookahead
//! computation, and finally the conflict-checked ACTION/GOTO tables that
//! drive the shift/reduce runtime.

pub mod first_sets;
pub mod grammar;
pub mod lalr;
pub mod lexer;
pub mod lr0;
pub mod parse_table;
pub mod parser;
pub mod syntax;
pub mod types;

pub use crate::{
    grammar::{Grammar, Symbol},
    lexer::{LexError, Lexer, Token},
    parse_table::{Action, BuildError, ParseTable},
    parser::{Parse, Parser},
};

/// Generate the parse tables for a grammar.
///
/// Augments the grammar with `S' -> S` (id 0), computes FIRST sets, builds
/// the LR(0) automaton, promotes it to LALR(1) by lookahead propagation,
/// and materializes the tables. Deterministic: two runs over the same
/// grammar yield identical state numbering and identical tables.
pub fn build(grammar: &mut Grammar) -> Result<ParseTable, BuildError> {
    build_with_automaton(grammar).map(|(_, table)| table)
}

/// Like [`build`], but also hands back the LR(0) automaton the tables were
/// derived from, for callers that want to inspect or print it.
pub fn build_with_automaton(
    grammar: &mut Grammar,
) -> Result<(lr0::Automaton, ParseTable), BuildError> {
    if grammar.is_empty() {
        return Err(BuildError::EmptyGrammar);
    }
    grammar.augment();

    let first = first_sets::FirstSets::new(grammar);
    let automaton = lr0::Automaton::build(grammar);
    let lookaheads = lalr::Lookaheads::compute(grammar, &first, &automaton);
    let table = parse_table::ParseTable::build(grammar, &first, &automaton, &lookaheads)?;
    Ok((automaton, table))
}
