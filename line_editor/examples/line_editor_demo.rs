// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Interactive demo. Run it with `cargo run --example line_editor_demo`, then type
//! `info` for the list of commands. Logs go to `line_editor_debug.log`; follow them with
//! `tail -f line_editor_debug.log` in another terminal.

use r3bl_line_editor::{EditorHooks, LineBuffer, ReadlineConfig, ReadlineError,
                       ReadlineSession, TracingConfig, init, lock_ignore_poison,
                       setup_default_miette_global_report_handler};
use std::{str::FromStr,
          sync::{Arc, Mutex},
          time::Duration};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use tokio::{select, time::interval};

const ISSUES_URL: &str = "https://github.com/r3bl-org/r3bl-open-core/issues/new";

#[derive(Debug, PartialEq, EnumString, EnumIter, Display)]
enum Command {
    #[strum(ascii_case_insensitive)]
    Info,

    #[strum(ascii_case_insensitive)]
    StartTicker,

    #[strum(ascii_case_insensitive)]
    StopTicker,

    #[strum(ascii_case_insensitive)]
    History,

    #[strum(ascii_case_insensitive)]
    Clear,

    #[strum(ascii_case_insensitive)]
    Exit,
}

fn get_info_message() -> String {
    let commands = Command::iter()
        .map(|it| it.to_string())
        .collect::<Vec<String>>();
    format!(
        "Available commands: {commands:?}\r\n\
         Try Ctrl+A, Ctrl+E, Ctrl+K, Ctrl+Y, Alt+B, Alt+F, Up, Down, Insert, \
         Ctrl+C or Ctrl+D on an empty line to quit.\r\n"
    )
}

/// In memory history, driven by the up / down arrows (and `Ctrl+P` / `Ctrl+N`).
#[derive(Debug, Default)]
struct History {
    state: Mutex<HistoryState>,
}

#[derive(Debug, Default)]
struct HistoryState {
    entries: Vec<String>,
    /// Entry currently shown, `None` while editing a new line.
    index: Option<usize>,
}

impl History {
    fn entries(&self) -> Vec<String> { lock_ignore_poison(&self.state).entries.clone() }
}

impl EditorHooks for History {
    fn history_prev(&self, line_buffer: &LineBuffer) {
        let mut state = lock_ignore_poison(&self.state);
        if state.entries.is_empty() {
            return;
        }
        let index = state
            .index
            .map_or(state.entries.len() - 1, |it| it.saturating_sub(1));
        state.index = Some(index);
        line_buffer.set_text(state.entries[index].chars().collect());
    }

    fn history_next(&self, line_buffer: &LineBuffer) {
        let mut state = lock_ignore_poison(&self.state);
        let Some(index) = state.index else {
            return;
        };
        if index + 1 < state.entries.len() {
            state.index = Some(index + 1);
            line_buffer.set_text(state.entries[index + 1].chars().collect());
        } else {
            state.index = None;
            line_buffer.set_text(vec![]);
        }
    }

    fn complete(&self, line_buffer: &LineBuffer) -> bool {
        let typed = line_buffer.text().to_lowercase();
        let mut matches = Command::iter()
            .map(|it| it.to_string())
            .filter(|it| it.to_lowercase().starts_with(&typed));
        match (matches.next(), matches.next()) {
            (Some(only), None) => {
                line_buffer.set_text(only.chars().collect());
                true
            }
            _ => false,
        }
    }

    fn on_line(&self, line: &[u8]) {
        let mut state = lock_ignore_poison(&self.state);
        state.index = None;
        let line = String::from_utf8_lossy(line).trim().to_string();
        if !line.is_empty() {
            state.entries.push(line);
        }
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    setup_default_miette_global_report_handler(ISSUES_URL);
    init(TracingConfig::new_file(None))?;

    let history = Arc::new(History::default());
    let config = ReadlineConfig::new("❯ ").with_hooks(history.clone());
    let session = ReadlineSession::try_new_stdio(config)?;
    session.print_above(get_info_message().as_bytes())?;

    let mut ticker = interval(Duration::from_secs(1));
    let mut is_ticking = false;
    let mut tick_count = 0_u64;

    loop {
        select! {
            _ = ticker.tick(), if is_ticking => {
                tick_count += 1;
                session.print_above(format!("tick {tick_count}\r\n").as_bytes())?;
            }
            result = session.read_line() => match result {
                Ok(line) => {
                    let Ok(command) = Command::from_str(line.trim()) else {
                        session.print_above(format!("Unknown command: {line:?}\r\n").as_bytes())?;
                        continue;
                    };
                    match command {
                        Command::Info => session.print_above(get_info_message().as_bytes())?,
                        Command::StartTicker => is_ticking = true,
                        Command::StopTicker => is_ticking = false,
                        Command::History => {
                            for (index, entry) in history.entries().iter().enumerate() {
                                session.print_above(format!("{index:>3} {entry}\r\n").as_bytes())?;
                            }
                        }
                        Command::Clear => session.line_buffer().clear_screen(),
                        Command::Exit => break,
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::EndOfInput) => break,
                Err(err) => {
                    session.close().await?;
                    return Err(err.into());
                }
            }
        }
    }

    session.close().await?;
    session.write("Goodbye\r\n".as_bytes())?;
    Ok(())
}
