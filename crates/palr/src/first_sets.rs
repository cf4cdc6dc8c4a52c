//! Calculation of the FIRST set function.

use crate::grammar::{Grammar, Symbol, SymbolKind};
use crate::types::{Map, Set};

/// FIRST(X) for every grammar symbol, plus FIRST of symbol sequences with
/// an inherited lookahead set.
///
/// Pure over the grammar it was computed from; recomputing on the same
/// grammar yields identical sets.
#[derive(Debug, PartialEq)]
pub struct FirstSets {
    sets: Map<Symbol, Set<Symbol>>,
}

impl FirstSets {
    pub fn new(grammar: &Grammar) -> Self {
        let mut sets: Map<Symbol, Set<Symbol>> = Map::default();

        // FIRST(t) = {t} for terminals, FIRST(ε) = {ε}.
        for terminal in grammar.terminals() {
            sets.insert(terminal.clone(), std::iter::once(terminal.clone()).collect());
        }
        sets.insert(
            Symbol::epsilon(),
            std::iter::once(Symbol::epsilon()).collect(),
        );
        for nonterminal in grammar.nonterminals() {
            sets.entry(nonterminal.clone()).or_default();
        }

        // Grow the nonterminal sets to fixed point.
        let mut changed = true;
        while changed {
            changed = false;
            for production in grammar.productions() {
                let mut additions: Vec<Symbol> = Vec::new();
                let mut all_nullable = true;

                for sym in production.right() {
                    match sym.kind() {
                        SymbolKind::Epsilon => {}
                        SymbolKind::Terminal => {
                            additions.push(sym.clone());
                            all_nullable = false;
                            break;
                        }
                        SymbolKind::Nonterminal => {
                            let first = &sets[sym];
                            additions.extend(
                                first.iter().filter(|s| !s.is_epsilon()).cloned(),
                            );
                            if !first.contains(&Symbol::epsilon()) {
                                all_nullable = false;
                                break;
                            }
                        }
                    }
                }

                if all_nullable {
                    additions.push(Symbol::epsilon());
                }

                let target = sets
                    .entry(production.left().clone())
                    .or_default();
                for sym in additions {
                    changed |= target.insert(sym);
                }
            }
        }

        Self { sets }
    }

    /// FIRST(X) of a single symbol.
    pub fn first(&self, symbol: &Symbol) -> &Set<Symbol> {
        &self.sets[symbol]
    }

    /// Whether the symbol can derive the empty string.
    pub fn is_nullable(&self, symbol: &Symbol) -> bool {
        if symbol.is_epsilon() {
            return true;
        }
        self.sets
            .get(symbol)
            .map_or(false, |first| first.contains(&Symbol::epsilon()))
    }

    /// FIRST of a symbol sequence with an inherited lookahead set.
    ///
    /// Collects FIRST(Yi) \ {ε} left to right until some Yi is not
    /// ε-capable; when the whole sequence can vanish, the inherited
    /// lookaheads are included as well.
    pub fn first_of_sequence(&self, sequence: &[Symbol], inherited: &Set<Symbol>) -> Set<Symbol> {
        let mut result = Set::default();
        let mut all_nullable = true;

        for sym in sequence {
            match sym.kind() {
                SymbolKind::Epsilon => {}
                SymbolKind::Terminal => {
                    result.insert(sym.clone());
                    all_nullable = false;
                    break;
                }
                SymbolKind::Nonterminal => {
                    let first = &self.sets[sym];
                    result.extend(first.iter().filter(|s| !s.is_epsilon()).cloned());
                    if !first.contains(&Symbol::epsilon()) {
                        all_nullable = false;
                        break;
                    }
                }
            }
        }

        if all_nullable {
            result.extend(inherited.iter().cloned());
        }
        result
    }
}
