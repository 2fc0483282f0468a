use lazy_static::lazy_static;
use regex::Regex;
use tracing::info;

use crate::challenges::{ChallengeBoard, ChallengeEvent};
use crate::console;
use crate::errors;
use crate::session::{InsertOutcome, Session};
use crate::trees::TreeKind;

pub const HELP: &str = r#"List of all mygrove commands:

insert <k>[, <k>...]   Insert one or more integer keys.
values                 Print the keys in ascending order.
stats                  Print counters for the active tree.
show                   Render the active tree.
challenge              Show the active and completed challenges.
reset                  Discard the tree and start over on a B-tree.
help          (?)      Show this help.
quit          (exit)   Leave the shell.
"#;

/// A parsed shell command.
#[derive(Debug, PartialEq)]
pub enum Command {
    Insert(Vec<i64>),
    Values,
    Stats,
    Show,
    Challenge,
    Reset,
    Help,
    Quit,
}

lazy_static! {
    static ref INSERT_REGEX: Regex = Regex::new(r"(?i)^insert\s+(.+)$").unwrap();
}

/// Parses a single input line.
///
/// # Errors
/// Returns `Error::Syntax` for an empty line, an unknown command, or a
/// non-integer insert argument.
pub fn parse(input: &str) -> Result<Command, errors::Error> {
    let line = input.trim();
    if line.is_empty() {
        return Err(err!(Syntax, "Empty command"));
    }

    if let Some(caps) = INSERT_REGEX.captures(line) {
        let mut keys = Vec::new();
        for part in caps[1].split(|c: char| c == ',' || c.is_whitespace()) {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            keys.push(part.parse::<i64>()?);
        }
        if keys.is_empty() {
            return Err(err!(Syntax, "insert expects at least one integer key"));
        }
        return Ok(Command::Insert(keys));
    }

    match line.to_lowercase().as_str() {
        "values" => Ok(Command::Values),
        "stats" => Ok(Command::Stats),
        "show" | "tree" => Ok(Command::Show),
        "challenge" | "challenges" => Ok(Command::Challenge),
        "reset" => Ok(Command::Reset),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(err!(Syntax, "Unknown command '{}'", other)),
    }
}

/// Executes a command against the session and its challenge board, returning
/// the text to display.
pub fn execute(
    session: &mut Session,
    board: &mut ChallengeBoard,
    command: Command,
) -> Result<String, errors::Error> {
    match command {
        Command::Insert(keys) => {
            let mut out = String::new();
            for key in keys {
                match session.insert_key(key)? {
                    InsertOutcome::Inserted => {}
                    InsertOutcome::Promoted { from, to } => {
                        out.push_str(&format!("Tree promoted: {} -> {}\n", from, to));
                        *board = ChallengeBoard::new(to);
                    }
                }
                let stats = session.stats();
                match board.check(&stats) {
                    Some(ChallengeEvent::Completed(description)) => {
                        out.push_str(&format!("Challenge complete: {}\n", description));
                    }
                    Some(ChallengeEvent::Cleared(description)) => {
                        out.push_str(&format!("Challenge complete: {}\n", description));
                        if board.kind() == TreeKind::Avl {
                            // The full cycle is done; policy sends the
                            // session back to a fresh B-tree.
                            session.restart()?;
                            *board = ChallengeBoard::new(TreeKind::BTree);
                            out.push_str("All challenges cleared! Starting over on a B-tree.\n");
                        } else {
                            out.push_str("Stage challenges cleared.\n");
                        }
                    }
                    None => {}
                }
            }
            let stats = session.stats();
            out.push_str(&format!(
                "{} tree: {} keys, depth {}\n",
                stats.kind, stats.key_count, stats.depth
            ));
            Ok(out)
        }
        Command::Values => {
            let values = session.in_order_values()?;
            let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            Ok(format!("{} ({} keys)\n", rendered.join(" "), values.len()))
        }
        Command::Stats => {
            let stats = session.stats();
            let headers = vec!["Stat".to_string(), "Value".to_string()];
            let rows = vec![
                vec!["kind".to_string(), stats.kind.to_string()],
                vec!["node_count".to_string(), stats.node_count.to_string()],
                vec!["key_count".to_string(), stats.key_count.to_string()],
                vec!["depth".to_string(), stats.depth.to_string()],
                vec!["branch_count".to_string(), stats.branch_count.to_string()],
                vec!["total_inserted".to_string(), stats.total_inserted.to_string()],
                vec!["rotations".to_string(), stats.rotations.to_string()],
                vec!["migrations".to_string(), stats.migrations.to_string()],
            ];
            Ok(console::build_table(&headers, &rows))
        }
        Command::Show => Ok(session.render()),
        Command::Challenge => {
            let mut out = String::new();
            match board.active() {
                Some(challenge) => out.push_str(&format!("Active: {}\n", challenge.description)),
                None => out.push_str("No active challenge.\n"),
            }
            for description in board.completed() {
                out.push_str(&format!("Done:   {}\n", description));
            }
            Ok(out)
        }
        Command::Reset => {
            info!(session = %session.id, "Reset requested");
            session.restart()?;
            *board = ChallengeBoard::new(TreeKind::BTree);
            Ok("Session reset to an empty B-tree.\n".to_string())
        }
        Command::Help => Ok(HELP.to_string()),
        // Quit is handled by the caller; nothing to do here.
        Command::Quit => Ok(String::new()),
    }
}
