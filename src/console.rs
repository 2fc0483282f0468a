/// Raw console helpers shared by the shell.
use crossterm::{cursor, execute, style, ExecutableCommand};

use std::io::{self, Write};

const NAME: &str = env!("CARGO_PKG_NAME");

/// Prints the bold `mygrove>` prompt at the start of the line.
pub fn print_prompt() -> io::Result<()> {
    execute!(io::stdout(), cursor::MoveToColumn(0))?;
    io::stdout()
        .execute(style::SetAttribute(style::Attribute::Bold))?
        .execute(style::SetForegroundColor(style::Color::Green))?
        .execute(style::Print(format!("{}> ", NAME)))?
        .execute(style::SetAttribute(style::Attribute::Reset))?
        .execute(style::ResetColor)?;
    io::stdout().flush()?;
    Ok(())
}

pub fn echo(s: String) {
    let _ = io::stdout().execute(style::Print(s));
    let _ = execute!(io::stdout(), cursor::MoveToColumn(0));
    let _ = io::stdout().flush();
}

pub fn error(s: String) {
    let _ = io::stdout().execute(style::SetForegroundColor(style::Color::Red));
    let _ = io::stdout().execute(style::Print(s));
    let _ = io::stdout().execute(style::ResetColor);
    let _ = execute!(io::stdout(), cursor::MoveToColumn(0));
    let _ = io::stdout().flush();
}

pub fn echo_lines(s: String) {
    for line in s.lines() {
        echo(format!("{}\n", line));
    }
}

/// Builds a bordered ASCII table, used by the `stats` command.
pub fn build_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let num_columns = headers.len();

    let mut column_widths = vec![0; num_columns];
    for (i, header) in headers.iter().enumerate() {
        column_widths[i] = header.len();
    }
    for row in rows {
        for (i, col) in row.iter().enumerate() {
            column_widths[i] = column_widths[i].max(col.len());
        }
    }

    let border = {
        let mut b = String::from("+");
        for width in &column_widths {
            b.push_str(&"-".repeat(*width));
            b.push('+');
        }
        b.push('\n');
        b
    };

    let mut result = String::new();
    result.push_str(&border);

    if !headers.is_empty() {
        result.push('|');
        for (i, header) in headers.iter().enumerate() {
            result.push_str(&format!("{:<width$}|", header, width = column_widths[i]));
        }
        result.push('\n');
        result.push_str(&border);
    }

    for row in rows {
        result.push('|');
        for (i, col) in row.iter().enumerate() {
            result.push_str(&format!("{:<width$}|", col, width = column_widths[i]));
        }
        result.push('\n');
    }

    result.push_str(&border);
    result
}

#[macro_export]
macro_rules! echo {
    ($($arg:tt)*) => {
        crate::console::echo(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        crate::console::error(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! echo_lines {
    ($($arg:tt)*) => {
        crate::console::echo_lines(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_table_pads_columns() {
        let headers = vec!["Stat".to_string(), "Value".to_string()];
        let rows = vec![
            vec!["kind".to_string(), "btree".to_string()],
            vec!["node_count".to_string(), "3".to_string()],
        ];
        let table = build_table(&headers, &rows);
        assert!(table.contains("|Stat      |Value|"));
        assert!(table.contains("|node_count|3    |"));
        assert!(table.starts_with("+----------+-----+"));
    }
}
