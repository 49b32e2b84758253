//! Styled terminal output and prompts

use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::Stylize;
use crossterm::terminal;
use inkdown_devkit::validate::{Severity, ValidationReport};
use inkdown_devkit::PublishUi;

/// Informational line, cyan
pub fn info(message: &str) {
    println!("{}", message.cyan());
}

/// Completed step, green
pub fn success(message: &str) {
    println!("{}", message.green());
}

/// Failure, red on stderr
pub fn error(message: &str) {
    eprintln!("{}", message.red());
}

/// Supplementary detail, blue
pub fn note(message: &str) {
    println!("{}", message.blue());
}

/// Non-fatal problem, yellow with a `[WARN]` prefix
pub fn warn(message: &str) {
    println!("{}", format!("[WARN] {}", message).yellow());
}

/// Print `prompt` in yellow without a newline and read one trimmed line
pub fn prompt(prompt: &str) -> io::Result<String> {
    print!("{}", prompt.yellow());
    io::stdout().flush()?;
    read_line()
}

/// Like [`prompt`], but the typed characters are not echoed
pub fn prompt_password(prompt: &str) -> io::Result<String> {
    print!("{}", prompt.yellow());
    io::stdout().flush()?;

    if !io::stdin().is_terminal() {
        return read_line();
    }

    terminal::enable_raw_mode()?;
    let result = read_hidden();
    // Restore the terminal even when reading failed
    let restored = terminal::disable_raw_mode();
    println!();
    restored?;
    result.map(|password| password.trim().to_string())
}

fn read_line() -> io::Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn read_hidden() -> io::Result<String> {
    let mut password = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(password),
            KeyCode::Backspace => {
                password.pop();
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted"));
            }
            KeyCode::Char(c) => password.push(c),
            _ => {}
        }
    }
}

/// Print every diagnostic in a validation report
pub fn print_report(report: &ValidationReport) {
    for diagnostic in &report.diagnostics {
        match diagnostic.severity {
            Severity::Error => error(&diagnostic.message),
            Severity::Warning => warn(&diagnostic.message),
        }
        if let Some(text) = &diagnostic.note {
            note(text);
        }
    }
}

/// [`PublishUi`] backed by the terminal
#[derive(Debug, Default)]
pub struct Console;

impl PublishUi for Console {
    fn info(&mut self, message: &str) {
        info(message);
    }

    fn warn(&mut self, message: &str) {
        warn(message);
    }

    fn success(&mut self, message: &str) {
        success(message);
    }

    fn note(&mut self, message: &str) {
        note(message);
    }

    fn input(&mut self, message: &str) -> io::Result<String> {
        prompt(message)
    }

    fn open_url(&mut self, url: &str) {
        if let Err(err) = webbrowser::open(url) {
            tracing::debug!("Could not open browser for {}: {}", url, err);
        }
    }
}
