use anyhow::Context as _;
use clap::Parser as _;
use palr::{Lexer, Parser};
use std::{fs, path::PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The path of the grammar definition file.
    grammar: PathBuf,

    /// Input to tokenize and parse with the generated tables.
    #[arg(long)]
    input: Option<String>,

    /// Read the input from a file instead.
    #[arg(long, conflicts_with = "input")]
    input_file: Option<PathBuf>,

    /// Print the LR(0) automaton.
    #[arg(long)]
    dump_automaton: bool,

    /// Print the ACTION/GOTO tables.
    #[arg(long)]
    dump_table: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    tracing::debug!("parsed CLI args = {:?}", args);

    let mut grammar = palr::syntax::parse_file(&args.grammar)?;
    tracing::info!("loaded grammar from {}", args.grammar.display());
    println!("{}", grammar);

    let (automaton, table) = palr::build_with_automaton(&mut grammar)
        .with_context(|| anyhow::anyhow!("errored during table generation"))?;
    println!("generated {} states without conflicts", table.num_states());

    if args.dump_automaton {
        println!("{}", automaton.display(&grammar));
    }
    if args.dump_table {
        println!("{}", table.display(&grammar));
    }

    let input = match (&args.input, &args.input_file) {
        (Some(text), _) => Some(text.clone()),
        (None, Some(path)) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read input file {}", path.display()))?,
        ),
        (None, None) => None,
    };

    if let Some(input) = input {
        let lexer = Lexer::c_like();
        let tokens = lexer
            .tokenize(&input)
            .context("errored during tokenization")?;
        tracing::debug!(num_tokens = tokens.len(), "input tokenized");

        let parse = Parser::new(&grammar, &table).parse(&tokens);
        for line in &parse.trace {
            println!("  {}", line);
        }
        if parse.success {
            println!("parse succeeded");
        } else {
            anyhow::bail!("parse failed: {}", parse.error_message);
        }
    }

    Ok(())
}
