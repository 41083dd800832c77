//! A line-mode front end for terminals that can't host the full-screen one.
//!
//! Every line read from stdin goes through the same key policy as the
//! full-screen input: the line is submitted when it ends, unless it ends
//! with a backslash, which stands in for Shift+Enter and continues the
//! draft on the next line.

use std::io::Write as _;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use jdbias_core::Snapshot;
use jdbias_core::input::KeyInput;
use jdbias_core::transcript::Role;
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::select;
use tokio::time::sleep;

use super::{BAR_CHAR, SPINNER_CHARS, gone};
use crate::{SUBTITLE, SessionBuilder, TITLE};

/// Runs the line-mode front end until stdin is closed.
pub async fn run(builder: SessionBuilder) -> std::io::Result<()> {
    let session = builder.build();
    let mut lines = BufReader::new(io::stdin()).lines();

    println!("{}", TITLE.bold());
    println!("{}", SUBTITLE.dimmed());
    println!(
        "{}",
        "End a line with \\ to continue on the next one.".dimmed()
    );
    println!();

    let mut snapshot = session.snapshot();
    let mut seen = print_messages(&snapshot, 0);

    let tick_chars: String = SPINNER_CHARS.iter().collect();
    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .map_err(std::io::Error::other)?
        .tick_chars(&tick_chars);

    loop {
        let prompt = if snapshot.draft.is_empty() { ">" } else { "…" };
        print!("{} ", prompt.bright_black());
        std::io::stdout().flush()?;

        let Some(line) = read_line(&mut lines).await else {
            break;
        };
        for key in line_to_keys(&line) {
            session.press_key(key).map_err(gone)?;
        }

        snapshot = session.current().await.map_err(gone)?;
        if !snapshot.is_sending {
            // Either a continuation line or a blank submission.
            continue;
        }
        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(progress_style.clone());
        progress_bar.set_message("Analyzing...");

        let mut rx = session.subscribe();
        while rx.borrow_and_update().is_sending {
            select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        progress_bar.finish_and_clear();
                        return Ok(());
                    }
                }
                _ = sleep(Duration::from_millis(100)) => {
                    progress_bar.inc(1);
                }
            }
        }
        progress_bar.finish_and_clear();

        snapshot = session.snapshot();
        seen = print_messages(&snapshot, seen);
        if let Some(error) = &snapshot.last_error {
            println!("{}{}", BAR_CHAR.bright_red(), error.bright_red());
        }
        if snapshot.awaiting_clarification {
            println!(
                "{}",
                "The analyzer needs a few more details to finish.".yellow()
            );
        }
        println!();
    }

    session.close();
    Ok(())
}

/// Turns one input line into the keys it stands for.
pub fn line_to_keys(line: &str) -> Vec<KeyInput> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let (text, shift) = match line.strip_suffix('\\') {
        Some(text) => (text, true),
        None => (line, false),
    };

    let mut keys = Vec::with_capacity(2);
    if !text.is_empty() {
        keys.push(KeyInput::Paste(text.to_owned()));
    }
    keys.push(KeyInput::Enter { shift });
    keys
}

/// Prints assistant messages the user hasn't seen, user messages are
/// already on screen as typed.
fn print_messages(snapshot: &Snapshot, seen: usize) -> usize {
    for message in snapshot.messages_since(seen) {
        if message.role() != Role::Assistant {
            continue;
        }
        for line in message.content().lines() {
            println!("{}{}", BAR_CHAR.bright_cyan(), line.bright_white());
        }
    }
    snapshot.transcript.len()
}

async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> Option<String> {
    match lines.next_line().await {
        Ok(line) => line,
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
