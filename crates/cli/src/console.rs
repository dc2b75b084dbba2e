//! Interactive console
//!
//! The sole source of operator events. Lines from stdin are matched
//! against a fixed grammar; anything the grammar rejects is answered with
//! a short message and a fresh prompt, never an error that stops the
//! session.
//!
//! Grammar: `start`, `save`, `quit`, `photodiode <number>`, `help`,
//! blank line (reprints the prompt).

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use contracts::CalibrationEvent;
use observability::record_console_command;

/// Console prompt
pub const PROMPT: &str = "speccal> ";

const HELP_TEXT: &str = "\
Commands:
  start                 begin a calibration run
  photodiode <number>   record the photodiode current (nA)
  save                  export the completed run
  quit                  exit
  help                  show this text";

/// One parsed console line
#[derive(Debug, Clone)]
pub enum ConsoleCommand {
    /// Forward this event to the calibration session
    Event(CalibrationEvent),
    /// Print the help text
    Help,
    /// Blank line: reprint the prompt
    Blank,
}

/// Parse one console line against the fixed grammar
///
/// Err carries a user-visible message.
pub fn parse(line: &str) -> Result<ConsoleCommand, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(ConsoleCommand::Blank);
    }

    let mut tokens = trimmed.split_whitespace();
    let command = tokens.next().unwrap_or_default().to_lowercase();
    let argument = tokens.next();

    if tokens.next().is_some() {
        return Err("too many arguments, try 'help'".to_string());
    }

    match (command.as_str(), argument) {
        ("start", None) => Ok(ConsoleCommand::Event(CalibrationEvent::Start)),
        ("save", None) => Ok(ConsoleCommand::Event(CalibrationEvent::Save)),
        ("quit", None) => Ok(ConsoleCommand::Event(CalibrationEvent::Quit)),
        ("help", None) => Ok(ConsoleCommand::Help),
        ("photodiode", Some(value)) => value
            .parse::<f64>()
            .map(|current| ConsoleCommand::Event(CalibrationEvent::Photodiode(current)))
            .map_err(|_| format!("'{value}' is not a valid current in nA")),
        ("photodiode", None) => Err("photodiode needs a current in nA".to_string()),
        _ => Err(format!("unknown command '{command}', try 'help'")),
    }
}

/// Print the prompt without a trailing newline
pub fn display_prompt() {
    print!("{PROMPT}");
    let _ = std::io::stdout().flush();
}

/// Spawn the stdin reader task
///
/// Help, blank lines and grammar errors are answered locally; only
/// calibration events go through the channel. The task ends after `quit`
/// or on stdin EOF.
pub fn spawn_console(tx: mpsc::Sender<CalibrationEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        display_prompt();

        while let Ok(Some(line)) = lines.next_line().await {
            match parse(&line) {
                Ok(ConsoleCommand::Event(event)) => {
                    let quitting = matches!(event, CalibrationEvent::Quit);
                    record_command_metric(&event);
                    if tx.send(event).await.is_err() || quitting {
                        break;
                    }
                }
                Ok(ConsoleCommand::Help) => {
                    println!("{HELP_TEXT}");
                    display_prompt();
                }
                Ok(ConsoleCommand::Blank) => display_prompt(),
                Err(message) => {
                    println!("{message}");
                    display_prompt();
                }
            }
        }
        debug!("console reader stopped");
    })
}

fn record_command_metric(event: &CalibrationEvent) {
    let name = match event {
        CalibrationEvent::Start => "start",
        CalibrationEvent::Save => "save",
        CalibrationEvent::Quit => "quit",
        CalibrationEvent::Photodiode(_) => "photodiode",
        CalibrationEvent::Reading(_) => return,
    };
    record_console_command(name);
}
