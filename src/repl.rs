//! Interactive shell: a line-based loop over stdin with a persistent
//! command history.

use std::fs::OpenOptions;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::challenges::ChallengeBoard;
use crate::command::{self, Command};
use crate::config::GrowthConfig;
use crate::console;
use crate::errors;
use crate::session::Session;

const HISTORY_FILE: &str = ".mygrove_history";

const BANNER: &str = "Insert keys to grow a tree. It starts life as a B-tree and is promoted\n\
                      as it outgrows its limits. Type 'help' for commands, 'quit' to leave.\n";

/// Runs the shell until `quit` or end of input.
pub fn start(config: GrowthConfig) -> Result<(), errors::Error> {
    let mut session = Session::open(config)?;
    let mut board = ChallengeBoard::new(session.kind());
    info!(session = %session.id, "Starting shell session");

    let history_path = history_file();
    if let Some(path) = &history_path {
        match load_history(path) {
            Ok(entries) => info!(entries = entries.len(), "Loaded command history"),
            Err(e) => warn!("Failed to load command history: {}", e),
        }
    }

    echo_lines!("{}", BANNER);

    let stdin = io::stdin();
    loop {
        console::print_prompt()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF, e.g. piped input ran out.
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(path) = &history_path {
            if let Err(e) = append_history(line, path) {
                warn!("Failed to record command history: {}", e);
            }
        }
        match command::parse(line) {
            Ok(Command::Quit) => break,
            Ok(cmd) => match command::execute(&mut session, &mut board, cmd) {
                Ok(output) => {
                    if !output.is_empty() {
                        echo_lines!("{}", output);
                    }
                }
                Err(e) => error!("{}\n", e),
            },
            Err(e) => error!("{}\n", e),
        }
    }

    info!(session = %session.id, "Closed shell session");
    echo!("Bye!\n");
    Ok(())
}

fn history_file() -> Option<PathBuf> {
    match dirs::home_dir() {
        Some(home) => Some(home.join(HISTORY_FILE)),
        None => {
            warn!("No home directory; command history is disabled");
            None
        }
    }
}

fn load_history(path: &Path) -> io::Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = OpenOptions::new().read(true).open(path)?;
    let mut entries = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if !line.trim().is_empty() {
            entries.push(line);
        }
    }
    Ok(entries)
}

fn append_history(line: &str, path: &Path) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HISTORY_FILE);

        assert!(load_history(&path).unwrap().is_empty());

        append_history("insert 1", &path).unwrap();
        append_history("stats", &path).unwrap();
        assert_eq!(load_history(&path).unwrap(), vec!["insert 1", "stats"]);
    }

    #[test]
    fn test_history_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HISTORY_FILE);

        append_history("values", &path).unwrap();
        append_history("   ", &path).unwrap();
        append_history("quit", &path).unwrap();
        assert_eq!(load_history(&path).unwrap(), vec!["values", "quit"]);
    }
}
