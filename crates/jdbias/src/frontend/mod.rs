//! Terminal front ends.

pub mod plain;
pub mod tui;

use std::io;

use jdbias_core::ControllerGoneError;

const SPINNER_CHARS: [char; 10] =
    ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const BAR_CHAR: &str = "▎";

fn gone(err: ControllerGoneError) -> io::Error {
    io::Error::other(err)
}
