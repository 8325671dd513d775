//! Interactive quit detection.
//!
//! The supervisor asks a [`QuitDetector`] once per poll interval whether the
//! operator wants to stop. On a terminal any key press counts.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal;
use crossterm::tty::IsTty;

/// Something that can report a pending quit request without blocking.
pub trait QuitDetector: Send {
    fn quit_requested(&mut self) -> io::Result<bool>;
}

/// Polls the controlling terminal in raw mode for a key press.
///
/// Raw mode is only held for the duration of one poll so console output
/// between polls is rendered normally.
#[derive(Debug, Default)]
pub struct TerminalQuitKey;

impl TerminalQuitKey {
    fn drain_key_presses() -> io::Result<bool> {
        let mut pressed = false;
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    pressed = true;
                }
            }
        }
        Ok(pressed)
    }
}

impl QuitDetector for TerminalQuitKey {
    fn quit_requested(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        let pressed = Self::drain_key_presses();
        let restored = terminal::disable_raw_mode();
        let pressed = pressed?;
        restored?;
        Ok(pressed)
    }
}

/// Never requests a quit. Used when stdin is not a terminal.
#[derive(Debug, Default)]
pub struct NoQuitKey;

impl QuitDetector for NoQuitKey {
    fn quit_requested(&mut self) -> io::Result<bool> {
        Ok(false)
    }
}

/// Pick the detector for this process: the terminal one only when enabled
/// and stdin is attached to a tty.
pub fn detector(enabled: bool) -> Box<dyn QuitDetector> {
    if enabled && io::stdin().is_tty() {
        Box::new(TerminalQuitKey)
    } else {
        tracing::debug!(enabled, "Quit key polling disabled");
        Box::new(NoQuitKey)
    }
}
