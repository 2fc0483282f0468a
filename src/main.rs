#[macro_use]
mod console;
#[macro_use]
mod errors;

mod challenges;
mod command;
mod config;
mod repl;
mod session;
mod trees;

use clap::Parser;

use crate::challenges::ChallengeBoard;
use crate::command::Command;
use crate::config::GrowthConfig;
use crate::session::Session;

#[derive(Parser)]
#[command(
    name = "mygrove",
    version,
    about = "A tree-growth progression shell: B-tree, BST and AVL."
)]
struct Cli {
    /// Minimum degree of the starting B-tree.
    #[arg(long, env = "MYGROVE_DEGREE", default_value_t = 3)]
    degree: usize,

    /// Key count above which the B-tree is promoted to a BST.
    #[arg(long, env = "MYGROVE_BTREE_LIMIT", default_value_t = 20)]
    btree_limit: usize,

    /// Node count above which the BST is promoted to an AVL tree.
    #[arg(long, env = "MYGROVE_BST_LIMIT", default_value_t = 20)]
    bst_limit: usize,

    /// Execute semicolon-separated commands and exit instead of starting
    /// the shell.
    #[arg(short, long)]
    command: Option<String>,
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let config = GrowthConfig {
        degree: cli.degree,
        btree_key_limit: cli.btree_limit,
        bst_node_limit: cli.bst_limit,
    };

    let result = match cli.command {
        Some(line) => run_once(config, &line),
        None => repl::start(config),
    };
    if let Err(e) = result {
        error!("{}\n", e);
        std::process::exit(1);
    }
}

/// One-shot mode: run the given commands against a fresh session.
fn run_once(config: GrowthConfig, line: &str) -> Result<(), errors::Error> {
    let mut session = Session::open(config)?;
    let mut board = ChallengeBoard::new(session.kind());
    for part in line.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let cmd = command::parse(part)?;
        if matches!(cmd, Command::Quit) {
            break;
        }
        let output = command::execute(&mut session, &mut board, cmd)?;
        if !output.is_empty() {
            echo_lines!("{}", output);
        }
    }
    Ok(())
}
