use palr::{
    first_sets::FirstSets,
    grammar::Symbol,
    lexer::Token,
    lr0::{Automaton, LR0Item, StateID},
    Action, Grammar, ParseTable, Parse, Parser,
};

const EXPRESSION: &str = "\
E -> E + T | T
T -> T * F | F
F -> ( E ) | id
";

const EPSILON_BEARING: &str = "\
S -> A B
A -> a | epsilon
B -> b
";

const NOT_LALR: &str = "\
S -> a A d | b B d | a B e | b A e
A -> c
B -> c
";

const DANGLING_ELSE: &str = "\
S -> if E then S | if E then S else S | x
E -> b
";

const SELF_EMBEDDING: &str = "\
S -> L = R | R
L -> * R | id
R -> L
";

fn generate(source: &str) -> (Grammar, ParseTable) {
    let mut grammar = palr::syntax::parse_str(source);
    let table = palr::build(&mut grammar).expect("grammar should build without conflicts");
    (grammar, table)
}

fn generate_with_automaton(source: &str) -> (Grammar, Automaton, ParseTable) {
    let mut grammar = palr::syntax::parse_str(source);
    let (automaton, table) =
        palr::build_with_automaton(&mut grammar).expect("grammar should build without conflicts");
    (grammar, automaton, table)
}

fn tokens(terminals: &[&str]) -> Vec<Token> {
    terminals
        .iter()
        .map(|name| Token::new(Symbol::terminal(*name), (*name).to_owned()))
        .collect()
}

fn parse(grammar: &Grammar, table: &ParseTable, terminals: &[&str]) -> Parse {
    Parser::new(grammar, table).parse(&tokens(terminals))
}

#[test]
fn s1_expression_grammar_round_trip() {
    let (grammar, table) = generate(EXPRESSION);

    let result = parse(&grammar, &table, &["id", "*", "id", "+", "id"]);
    assert!(result.success, "{}", result.error_message);

    for reduction in [
        "reduce by F -> id",
        "reduce by T -> F",
        "reduce by T -> T * F",
        "reduce by E -> T",
        "reduce by E -> E + T",
    ] {
        assert!(
            result.trace.iter().any(|line| line == reduction),
            "missing {reduction:?} in trace",
        );
    }
    assert_eq!(result.trace.last().map(String::as_str), Some("accept"));
}

#[test]
fn s2_epsilon_bearing_grammar() {
    let (grammar, table) = generate(EPSILON_BEARING);

    let first = FirstSets::new(&grammar);
    let a_first = first.first(&Symbol::nonterminal("A"));
    assert!(a_first.contains(&Symbol::terminal("a")));
    assert!(a_first.contains(&Symbol::epsilon()));
    let s_first = first.first(&Symbol::nonterminal("S"));
    assert!(s_first.contains(&Symbol::terminal("a")));
    assert!(s_first.contains(&Symbol::terminal("b")));

    let result = parse(&grammar, &table, &["b"]);
    assert!(result.success, "{}", result.error_message);
    assert!(result.trace.iter().any(|line| line == "reduce by A -> ε"));

    let result = parse(&grammar, &table, &["a", "b"]);
    assert!(result.success, "{}", result.error_message);

    let result = parse(&grammar, &table, &["a"]);
    assert!(!result.success);
    assert!(result.error_message.contains("$"), "{}", result.error_message);
}

#[test]
fn s3_merged_lookaheads_raise_a_reduce_reduce_conflict() {
    let mut grammar = palr::syntax::parse_str(NOT_LALR);
    let error = palr::build(&mut grammar).unwrap_err();
    let message = error.to_string();
    assert!(
        message.starts_with("Reduce-Reduce conflict at state "),
        "{message}",
    );
    assert!(message.contains("reduce by A -> c"), "{message}");
    assert!(message.contains("reduce by B -> c"), "{message}");
}

#[test]
fn s4_dangling_else_raises_a_shift_reduce_conflict() {
    let mut grammar = palr::syntax::parse_str(DANGLING_ELSE);
    let error = palr::build(&mut grammar).unwrap_err();
    let message = error.to_string();
    assert!(
        message.starts_with("Shift-Reduce conflict at state "),
        "{message}",
    );
    assert!(message.contains("on symbol else"), "{message}");
    assert!(message.contains("shift to state "), "{message}");
    assert!(message.contains("reduce by S -> if E then S"), "{message}");
}

#[test]
fn s5_self_embedding_grammar_is_lalr() {
    let (grammar, automaton, table) = generate_with_automaton(SELF_EMBEDDING);

    // The state holding both `S -> L . = R` and `R -> L .` shifts on `=`
    // and reduces by `R -> L` on `$`.
    let state = automaton
        .states()
        .find(|state| {
            state.kernels.iter().any(|item| {
                let production = grammar.production(item.production);
                production.left().name() == "S" && production.right().len() == 3 && item.dot == 1
            })
        })
        .expect("no state holds S -> L . = R");

    assert!(matches!(
        table.action(state.id, &Symbol::terminal("=")),
        Some(Action::Shift(..)),
    ));
    match table.action(state.id, &Symbol::end_marker()) {
        Some(Action::Reduce(id)) => {
            assert_eq!(grammar.production(id).to_string(), "R -> L");
        }
        other => panic!("expected a reduce on $, got {other:?}"),
    }

    let result = parse(&grammar, &table, &["*", "id", "=", "id"]);
    assert!(result.success, "{}", result.error_message);
    let result = parse(&grammar, &table, &["id", "=", "*", "id"]);
    assert!(result.success, "{}", result.error_message);
}

#[test]
fn s6_augmented_start_invariant() {
    for source in [EXPRESSION, EPSILON_BEARING, SELF_EMBEDDING] {
        let (grammar, automaton, table) = generate_with_automaton(source);

        let start = automaton.state(StateID::START);
        assert!(start.kernels.contains(&LR0Item::AUGMENTED_START));

        // Every symbol that can begin the start nonterminal is covered in
        // state 0 — by a shift, or by an ε-reduction of an inner
        // production that the GOTO then carries forward.
        let first = FirstSets::new(&grammar);
        let start = grammar.start_symbol().unwrap().clone();
        let row = table.row(StateID::START);
        for symbol in first.first(&start) {
            if !symbol.is_epsilon() {
                assert!(row.actions.contains_key(symbol), "{source:?}: {symbol}");
            }
        }
        if source != EPSILON_BEARING {
            assert!(
                row.actions
                    .values()
                    .all(|action| matches!(action, Action::Shift(..))),
                "state 0 must not reduce ({source:?})",
            );
        }

        // The accept action sits exactly where `S' -> S .` lives, on `$`.
        let accepts: Vec<_> = table
            .rows()
            .flat_map(|(id, row)| {
                row.actions
                    .iter()
                    .filter(|(_, action)| matches!(action, Action::Accept))
                    .map(move |(symbol, _)| (id, symbol.clone()))
            })
            .collect();
        assert_eq!(accepts.len(), 1, "{source:?}");
        let (accept_state, accept_symbol) = &accepts[0];
        assert_eq!(*accept_symbol, Symbol::end_marker());
        assert!(automaton
            .state(*accept_state)
            .kernels
            .contains(&LR0Item::AUGMENTED_START.shifted()));
    }
}

#[test]
fn identical_grammars_build_identical_tables() {
    let build = |source: &str| {
        let mut grammar = palr::syntax::parse_str(source);
        let (automaton, table) = palr::build_with_automaton(&mut grammar).unwrap();
        let states = automaton.len();
        let rendered_automaton = automaton.display(&grammar).to_string();
        let rendered_table = table.display(&grammar).to_string();
        (states, rendered_automaton, rendered_table, table)
    };

    for source in [EXPRESSION, EPSILON_BEARING, SELF_EMBEDDING] {
        let (states_a, automaton_a, rendered_a, table_a) = build(source);
        let (states_b, automaton_b, rendered_b, table_b) = build(source);
        assert_eq!(states_a, states_b);
        assert_eq!(automaton_a, automaton_b);
        assert_eq!(rendered_a, rendered_b);
        assert_eq!(table_a, table_b);
    }
}

#[test]
fn single_token_mutations_are_rejected() {
    let (grammar, table) = generate(EXPRESSION);

    let accepted: &[&[&str]] = &[
        &["id"],
        &["id", "+", "id"],
        &["(", "id", ")", "*", "id"],
    ];
    for terminals in accepted {
        let result = parse(&grammar, &table, terminals);
        assert!(result.success, "{terminals:?}: {}", result.error_message);
    }

    let rejected: &[&[&str]] = &[
        &["+", "id"],
        &["id", "+"],
        &["id", "id"],
        &["(", "id", "*", "id"],
    ];
    for terminals in rejected {
        let result = parse(&grammar, &table, terminals);
        assert!(!result.success, "{terminals:?} should be rejected");
        assert!(!result.error_message.is_empty());
    }
}

#[test]
fn lexer_feeds_the_parser_end_to_end() {
    let (grammar, table) = generate(EXPRESSION);

    let lexer = palr::Lexer::c_like();
    let tokens = lexer.tokenize("a * (b + c)").unwrap();
    // Identifier lexemes all map to the `id` terminal of the grammar.
    assert!(tokens
        .iter()
        .filter(|t| t.terminal == Symbol::terminal("id"))
        .count()
        == 3);

    let result = Parser::new(&grammar, &table).parse(&tokens);
    assert!(result.success, "{}", result.error_message);
}
