//! Grammar types.

use crate::types::{Map, Set};
use std::fmt;

/// The classification of a grammar symbol.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolKind {
    Terminal,
    Nonterminal,
    Epsilon,
}

/// A grammar symbol, identified structurally by its kind and name.
///
/// The derived ordering (kind first, then name) is the canonical order used
/// whenever a deterministic traversal over symbols is required.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    kind: SymbolKind,
    name: String,
}

impl Symbol {
    pub fn terminal(name: impl Into<String>) -> Self {
        Self {
            kind: SymbolKind::Terminal,
            name: name.into(),
        }
    }

    pub fn nonterminal(name: impl Into<String>) -> Self {
        Self {
            kind: SymbolKind::Nonterminal,
            name: name.into(),
        }
    }

    /// The empty-production marker `ε`.
    pub fn epsilon() -> Self {
        Self {
            kind: SymbolKind::Epsilon,
            name: "ε".into(),
        }
    }

    /// The reserved end-of-input terminal `$`.
    pub fn end_marker() -> Self {
        Self::terminal("$")
    }

    /// The reserved lookahead-propagation sentinel `#`.
    ///
    /// Never occurs in user grammars; used only while computing lookaheads.
    pub fn sentinel() -> Self {
        Self::terminal("#")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, SymbolKind::Terminal)
    }

    pub fn is_nonterminal(&self) -> bool {
        matches!(self.kind, SymbolKind::Nonterminal)
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self.kind, SymbolKind::Epsilon)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ProductionID(u32);

impl ProductionID {
    /// Reserved id of the augmented start rule `S' -> S`, inserted by
    /// [`Grammar::augment`] before any automaton work begins.
    pub const AUGMENTED: Self = Self(0);

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ProductionID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P#{:03}", self.0)
    }
}

impl fmt::Display for ProductionID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A production rule `A -> X1 X2 ... Xn`.
///
/// An empty production is represented by a right-hand side holding the
/// single epsilon symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    id: ProductionID,
    left: Symbol,
    right: Vec<Symbol>,
}

impl Production {
    pub fn id(&self) -> ProductionID {
        self.id
    }

    pub fn left(&self) -> &Symbol {
        &self.left
    }

    pub fn right(&self) -> &[Symbol] {
        &self.right[..]
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(&self.right[..], [sym] if sym.is_epsilon())
    }

    /// The symbol immediately after the given dot position, if any.
    ///
    /// The epsilon marker is never reported; an empty production has no
    /// symbol to move the dot over.
    pub fn symbol_after(&self, dot: u16) -> Option<&Symbol> {
        if self.is_epsilon() {
            return None;
        }
        self.right.get(usize::from(dot))
    }

    /// Number of stack entries a reduction by this production pops.
    pub fn arity(&self) -> usize {
        if self.is_epsilon() {
            0
        } else {
            self.right.len()
        }
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.left)?;
        for sym in &self.right {
            write!(f, " {}", sym)?;
        }
        Ok(())
    }
}

/// The grammar definition used to derive the parser tables.
///
/// Owns the production arena for its whole lifetime; production ids are
/// dense, assigned by this object (never a global counter), with id 0
/// reserved for the augmented start rule.
#[derive(Debug)]
pub struct Grammar {
    start: Option<Symbol>,
    terminals: Set<Symbol>,
    nonterminals: Set<Symbol>,
    productions: Map<ProductionID, Production>,
    by_left: Map<Symbol, Vec<ProductionID>>,
    next_id: u32,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    pub fn new() -> Self {
        Self {
            start: None,
            terminals: Set::default(),
            nonterminals: Set::default(),
            productions: Map::default(),
            by_left: Map::default(),
            // user rules start at 1; id 0 belongs to the augmented rule
            next_id: 1,
        }
    }

    /// Register a production rule and return its id.
    ///
    /// The lhs is recorded as a nonterminal (the first lhs seen becomes the
    /// start symbol); rhs terminals join the terminal set unless they are
    /// the epsilon marker, rhs nonterminals join the nonterminal set.
    pub fn add_production(&mut self, left: Symbol, right: Vec<Symbol>) -> ProductionID {
        if self.start.is_none() {
            self.start = Some(left.clone());
        }
        self.nonterminals.insert(left.clone());

        for sym in &right {
            match sym.kind() {
                SymbolKind::Terminal => {
                    self.terminals.insert(sym.clone());
                }
                SymbolKind::Nonterminal => {
                    self.nonterminals.insert(sym.clone());
                }
                SymbolKind::Epsilon => {}
            }
        }

        let id = ProductionID(self.next_id);
        self.next_id += 1;
        self.by_left.entry(left.clone()).or_default().push(id);
        self.productions.insert(id, Production { id, left, right });
        id
    }

    /// Insert the augmented start rule `S' -> S` under the reserved id 0.
    ///
    /// Idempotent; called by the build pipeline before any automaton work.
    pub fn augment(&mut self) {
        if self.productions.contains_key(&ProductionID::AUGMENTED) {
            return;
        }
        let start = self
            .start
            .clone()
            .expect("cannot augment a grammar without a start symbol");
        let left = Symbol::nonterminal(format!("{}'", start.name()));
        self.nonterminals.insert(left.clone());
        self.by_left
            .entry(left.clone())
            .or_default()
            .push(ProductionID::AUGMENTED);
        self.productions.insert(
            ProductionID::AUGMENTED,
            Production {
                id: ProductionID::AUGMENTED,
                left,
                right: vec![start],
            },
        );
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() || self.productions.is_empty()
    }

    pub fn start_symbol(&self) -> Option<&Symbol> {
        self.start.as_ref()
    }

    pub fn terminals(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.terminals.iter()
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.nonterminals.iter()
    }

    pub fn production(&self, id: ProductionID) -> &Production {
        &self.productions[&id]
    }

    pub fn productions_for(&self, left: &Symbol) -> &[ProductionID] {
        self.by_left.get(left).map(|ids| &ids[..]).unwrap_or(&[])
    }

    /// All productions in ascending id order.
    pub fn productions(&self) -> impl Iterator<Item = &Production> + '_ {
        let mut sorted: Vec<_> = self.productions.values().collect();
        sorted.sort_by_key(|p| p.id);
        sorted.into_iter()
    }

    pub fn num_productions(&self) -> usize {
        self.productions.len()
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "terminals:")?;
        for sym in &self.terminals {
            write!(f, " {}", sym)?;
        }
        write!(f, "\nnonterminals:")?;
        for sym in &self.nonterminals {
            write!(f, " {}", sym)?;
        }
        if let Some(start) = &self.start {
            write!(f, "\nstart symbol: {}", start)?;
        }
        writeln!(f, "\nrules:")?;
        for production in self.productions() {
            writeln!(f, "  [{:02}] {}", production.id(), production)?;
        }
        Ok(())
    }
}

/// A dotted view of a production, e.g. `E -> E . + T`.
pub(crate) struct DottedDisplay<'g> {
    production: &'g Production,
    dot: u16,
}

impl<'g> DottedDisplay<'g> {
    pub(crate) fn new(production: &'g Production, dot: u16) -> Self {
        Self { production, dot }
    }
}

impl fmt::Display for DottedDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { production, dot } = self;
        write!(f, "{} ->", production.left())?;
        for (i, sym) in production.right().iter().enumerate() {
            if i == usize::from(*dot) {
                f.write_str(" .")?;
            }
            write!(f, " {}", sym)?;
        }
        if usize::from(*dot) == production.right().len() {
            f.write_str(" .")?;
        }
        Ok(())
    }
}
