//! An example lexical analyzer.
//!
//! The parser consumes `(terminal, lexeme)` pairs from any source; this
//! lexer is the one shipped with the repo. Its rules are runtime
//! configuration: a list of regular expressions paired with the terminal
//! they produce. Longest match wins, earlier rules win ties.

use crate::grammar::Symbol;
use regex::Regex;

/// A single recognized token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub terminal: Symbol,
    pub lexeme: String,
}

impl Token {
    pub fn new(terminal: Symbol, lexeme: impl Into<String>) -> Self {
        Self {
            terminal,
            lexeme: lexeme.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized character {found:?} at line {line}, column {column}")]
pub struct LexError {
    pub line: usize,
    pub column: usize,
    pub found: char,
}

/// A pattern-to-terminal tokenizer.
#[derive(Debug, Default)]
pub struct Lexer {
    rules: Vec<(Regex, Symbol)>,
}

impl Lexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule; the pattern is anchored at the scan position.
    pub fn rule(
        &mut self,
        pattern: &str,
        terminal: impl Into<String>,
    ) -> Result<&mut Self, regex::Error> {
        let anchored = Regex::new(&format!(r"\A(?:{pattern})"))?;
        self.rules.push((anchored, Symbol::terminal(terminal)));
        Ok(self)
    }

    /// The demo rule set for a small C-like token vocabulary.
    pub fn c_like() -> Self {
        let mut lexer = Self::new();
        let rules = [
            (r"\bint\b", "int"),
            (r"\bfloat\b", "float"),
            (r"\bchar\b", "char"),
            (r"\bbool\b", "bool"),
            (r"\bif\b", "if"),
            (r"\belse\b", "else"),
            (r"\bwhile\b", "while"),
            (r"\breturn\b", "return"),
            (r"\btrue\b|\bfalse\b", "bool_lit"),
            (r"[0-9]+\.[0-9]*", "float_lit"),
            (r"[0-9]+", "int_lit"),
            (r"'.'", "char_lit"),
            (r"[a-zA-Z_][a-zA-Z0-9_]*", "id"),
            (r"==", "=="),
            (r"!=", "!="),
            (r"<=", "<="),
            (r">=", ">="),
            (r"&&", "&&"),
            (r"\|\|", "||"),
            (r"\+", "+"),
            (r"-", "-"),
            (r"\*", "*"),
            (r"/", "/"),
            (r"=", "="),
            (r"<", "<"),
            (r">", ">"),
            (r"!", "!"),
            (r"\(", "("),
            (r"\)", ")"),
            (r"\{", "{"),
            (r"\}", "}"),
            (r";", ";"),
            (r",", ","),
        ];
        for (pattern, terminal) in rules {
            lexer
                .rule(pattern, terminal)
                .expect("demo patterns are valid");
        }
        lexer
    }

    /// Tokenize the whole input.
    ///
    /// Whitespace and `//` line comments separate tokens. The first
    /// unrecognized character aborts the scan. The end marker is not
    /// appended; that is the parser runtime's job.
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        let mut cursor = Cursor::new(input);

        loop {
            cursor.skip_trivia();
            let rest = cursor.rest();
            if rest.is_empty() {
                break;
            }

            let mut matched: Option<(usize, &Symbol)> = None;
            for (pattern, terminal) in &self.rules {
                if let Some(found) = pattern.find(rest) {
                    let longer = matched.map_or(true, |(length, _)| found.end() > length);
                    if found.end() > 0 && longer {
                        matched = Some((found.end(), terminal));
                    }
                }
            }

            match matched {
                Some((length, terminal)) => {
                    let lexeme = &rest[..length];
                    tracing::trace!(terminal = %terminal, lexeme, "token");
                    tokens.push(Token::new(terminal.clone(), lexeme));
                    cursor.advance(length);
                }
                None => {
                    return Err(LexError {
                        line: cursor.line,
                        column: cursor.column,
                        found: rest.chars().next().unwrap_or('\0'),
                    });
                }
            }
        }

        Ok(tokens)
    }
}

/// Scan position with line/column bookkeeping.
struct Cursor<'input> {
    input: &'input str,
    offset: usize,
    line: usize,
    column: usize,
}

impl<'input> Cursor<'input> {
    fn new(input: &'input str) -> Self {
        Self {
            input,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    fn rest(&self) -> &'input str {
        &self.input[self.offset..]
    }

    fn advance(&mut self, bytes: usize) {
        for c in self.input[self.offset..self.offset + bytes].chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset += bytes;
    }

    fn skip_trivia(&mut self) {
        loop {
            let rest = self.rest();
            let mut skipped = 0;
            for c in rest.chars() {
                if c.is_whitespace() {
                    skipped += c.len_utf8();
                } else {
                    break;
                }
            }
            if skipped > 0 {
                self.advance(skipped);
                continue;
            }
            if rest.starts_with("//") {
                let length = rest.find('\n').unwrap_or(rest.len());
                self.advance(length);
                continue;
            }
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminal_names(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.terminal.name()).collect()
    }

    #[test]
    fn longest_match_wins() {
        let lexer = Lexer::c_like();
        let tokens = lexer.tokenize("a <= b == 1.5").unwrap();
        assert_eq!(terminal_names(&tokens), vec!["id", "<=", "id", "==", "float_lit"]);
        assert_eq!(tokens[4].lexeme, "1.5");
    }

    #[test]
    fn keywords_beat_identifiers() {
        let lexer = Lexer::c_like();
        let tokens = lexer.tokenize("if ifx else").unwrap();
        assert_eq!(terminal_names(&tokens), vec!["if", "id", "else"]);
    }

    #[test]
    fn comments_and_whitespace_are_trivia() {
        let lexer = Lexer::c_like();
        let tokens = lexer
            .tokenize("x = 1; // assignment\ny = 2;")
            .unwrap();
        assert_eq!(
            terminal_names(&tokens),
            vec!["id", "=", "int_lit", ";", "id", "=", "int_lit", ";"],
        );
    }

    #[test]
    fn unrecognized_character_reports_its_position() {
        let lexer = Lexer::c_like();
        let error = lexer.tokenize("x = 1;\ny = @;").unwrap_err();
        assert_eq!(error.line, 2);
        assert_eq!(error.column, 5);
        assert_eq!(error.found, '@');
    }

    #[test]
    fn rules_are_runtime_configuration() {
        let mut lexer = Lexer::new();
        lexer.rule(r"[0-9]+", "num").unwrap();
        lexer.rule(r"\+", "+").unwrap();
        let tokens = lexer.tokenize("1+2").unwrap();
        assert_eq!(terminal_names(&tokens), vec!["num", "+", "num"]);
    }
}
