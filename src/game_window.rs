use std::io::{self, Stdout};

use anyhow::{Context, Result};
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::warn;
use model::game::Game;

use crate::control::Command;
use crate::game_field_panel::GameFieldPanel;

/// Owns the terminal while the game runs: raw mode and the alternate screen
/// are switched on in `new` and restored on drop.
pub struct GameWindow {
    out: Stdout,
    panel: GameFieldPanel,
}

impl GameWindow {
    pub fn new() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let mut out = io::stdout();
        if let Err(error) = execute!(out, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(error).context("failed to enter the alternate screen");
        }
        Ok(Self {
            out,
            panel: GameFieldPanel::default(),
        })
    }

    pub fn draw(&mut self, game: &Game) -> Result<()> {
        self.panel.draw(&mut self.out, game)?;
        Ok(())
    }

    /// Blocks until the player presses a mapped key. Resizes ask for a redraw.
    pub fn next_command(&mut self) -> Result<Command> {
        loop {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(command) = Command::from_key(key) {
                        return Ok(command);
                    }
                }
                Event::Resize(_, _) => return Ok(Command::Redraw),
                _ => {}
            }
        }
    }
}

impl Drop for GameWindow {
    fn drop(&mut self) {
        if let Err(error) = execute!(self.out, Show, LeaveAlternateScreen) {
            warn!("failed to leave the alternate screen: {}", error);
        }
        if let Err(error) = disable_raw_mode() {
            warn!("failed to disable raw mode: {}", error);
        }
    }
}
