//! Reading grammars from their line-oriented text format.
//!
//! ```text
//! # a comment
//! E -> E + T | T
//! <T> → T * F | F
//! F -> ( E ) | id
//! A -> epsilon
//! ```
//!
//! `#` starts a comment; the arrow may be spelled `->` or `→`; a symbol is
//! a nonterminal when bracketed `<Name>` or starting with an uppercase
//! ASCII letter, a terminal otherwise; `epsilon` and `ε` denote the empty
//! production. The first left-hand side becomes the start symbol.
//!
//! Malformed lines are reported and skipped; reading continues so that a
//! build can still be attempted over whatever parsed.

use crate::grammar::{Grammar, Symbol};
use anyhow::Context as _;
use std::{fs, path::Path};

/// Read a grammar from a file.
pub fn parse_file(path: impl AsRef<Path>) -> anyhow::Result<Grammar> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read grammar file {}", path.display()))?;
    Ok(parse_str(&source))
}

/// Read a grammar from its textual form.
pub fn parse_str(source: &str) -> Grammar {
    let mut grammar = Grammar::new();

    for (number, raw) in source.lines().enumerate() {
        let number = number + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        let Some((left, right)) = split_at_arrow(line) else {
            tracing::warn!(line = number, "no arrow in production, skipped: {raw:?}");
            continue;
        };

        let left = left.trim();
        let Some(name) = symbol_name(left) else {
            tracing::warn!(line = number, "empty left-hand side, skipped: {raw:?}");
            continue;
        };
        let lhs = Symbol::nonterminal(name);

        for alternative in right.split('|') {
            let rhs = parse_alternative(alternative.trim(), number);
            grammar.add_production(lhs.clone(), rhs);
        }
    }

    grammar
}

fn parse_alternative(alternative: &str, number: usize) -> Vec<Symbol> {
    if alternative.is_empty() || is_epsilon_word(alternative) {
        return vec![Symbol::epsilon()];
    }

    let mut rhs = Vec::new();
    for word in alternative.split_whitespace() {
        if is_epsilon_word(word) {
            rhs.push(Symbol::epsilon());
            continue;
        }
        let Some(name) = symbol_name(word) else {
            tracing::warn!(line = number, "empty symbol in production, skipped: {word:?}");
            continue;
        };
        if is_nonterminal_word(word) {
            rhs.push(Symbol::nonterminal(name));
        } else {
            rhs.push(Symbol::terminal(name));
        }
    }

    if rhs.is_empty() {
        rhs.push(Symbol::epsilon());
    }
    rhs
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(position) => &line[..position],
        None => line,
    }
}

/// Split a rule at its arrow, whichever spelling is used.
fn split_at_arrow(line: &str) -> Option<(&str, &str)> {
    if let Some(position) = line.find("->") {
        return Some((&line[..position], &line[position + 2..]));
    }
    if let Some(position) = line.find('→') {
        return Some((&line[..position], &line[position + '→'.len_utf8()..]));
    }
    None
}

fn is_epsilon_word(word: &str) -> bool {
    word == "epsilon" || word == "ε"
}

/// A symbol is a nonterminal when written `<Name>` or starting with an
/// uppercase ASCII letter.
fn is_nonterminal_word(word: &str) -> bool {
    if word.len() >= 2 && word.starts_with('<') && word.ends_with('>') {
        return true;
    }
    word.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// The symbol's name with any `<...>` brackets removed; `None` when
/// nothing remains.
fn symbol_name(word: &str) -> Option<&str> {
    let name = if word.len() >= 2 && word.starts_with('<') && word.ends_with('>') {
        &word[1..word.len() - 1]
    } else {
        word
    };
    (!name.is_empty()).then_some(name)
}
