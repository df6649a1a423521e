use std::{cmp::max, thread::sleep, time::Duration};

use anyhow::{bail, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use torus_snake::{Direction, FruitMode, GameState, Input, Position, Settings, Snapshot, Status};

use crate::term::{Coords, TermInt, TermManager};

const TICK_INTERVAL_MS: u64 = 5;
const MIN_TERM_WIDTH: TermInt = 40;
const MIN_TERM_HEIGHT: TermInt = 10;

const SNAKE_BODY_CHAR: char = '█';
const FRUIT_CHAR: char = 'O';
const DEAD_SNAKE_CHAR: char = 'X';

/// Whether the player wants another round after a game ends.
pub enum Flow {
    Again,
    Quit,
}

pub struct SnakeGame {
    settings: Settings,
    player_name: String,
    delay_ms: u64,
    paused: bool,
    term: TermManager,
    seeds: StdRng,
}

impl SnakeGame {
    pub fn new(settings: Settings, player_name: String, delay_ms: u64, seed: Option<u64>) -> Result<Self> {
        let seeds = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(SnakeGame {
            settings,
            player_name,
            delay_ms,
            paused: false,
            term: TermManager::new()?,
            seeds,
        })
    }

    pub fn initialize(&mut self) -> Result<()> {
        let (w, h) = self.term.get_terminal_size();
        // Board plus border, and one HUD line underneath
        let need_w = max(self.settings.width.saturating_add(2), MIN_TERM_WIDTH);
        let need_h = max(self.settings.height.saturating_add(3), MIN_TERM_HEIGHT);
        if w < need_w || h < need_h {
            bail!("terminal is {}x{}, need at least {}x{} for this board", w, h, need_w, need_h);
        }

        self.term.setup()?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        self.term.restore()?;
        Ok(())
    }

    /// Returns `false` if the player pressed CTRL+C instead of starting.
    pub fn show_intro(&mut self) -> Result<bool> {
        let mode_line = if self.settings.fruit_mode == FruitMode::Random {
            "Random fruit mode: R to reshuffle"
        } else {
            ""
        };
        let lines = &[
            "Arrow keys or WASD to move",
            "Esc to pause, X or Q to give up",
            mode_line,
            "CTRL+C to quit",
            "",
            "Press any key to begin",
        ];

        self.term.show_message(lines)?;
        if is_ctrl_c(&self.term.read_key_blocking()?) {
            return Ok(false);
        }
        self.term.hide_message()?;
        Ok(true)
    }

    pub fn play(&mut self) -> Result<Flow> {
        self.term.clear()?;
        self.term.draw_borders(self.settings.width + 2, self.settings.height + 2)?;
        self.term.hide_message()?;

        let mut state = GameState::new(&self.settings, StdRng::from_rng(&mut self.seeds)?)
            .map_err(anyhow::Error::msg)?;
        let ticks_per_step = max(self.delay_ms / TICK_INTERVAL_MS, 1);
        let mut ticks_until_step = ticks_per_step;
        let mut pending = Input::None;

        self.draw(&state.snapshot())?;

        loop {
            sleep(Duration::from_millis(TICK_INTERVAL_MS));

            for key_ev in self.term.read_key_events_queue()? {
                if is_ctrl_c(&key_ev) {
                    return Ok(Flow::Quit);
                }
                if key_ev.code == KeyCode::Esc {
                    self.toggle_pause()?;
                    continue;
                }
                if let Some(input) = key_to_input(key_ev.code) {
                    // Latest key wins, but a give-up request is never overwritten
                    if pending != Input::Quit {
                        pending = input;
                    }
                }
            }

            if self.paused { continue; }

            ticks_until_step -= 1;
            if ticks_until_step > 0 { continue; }
            ticks_until_step = ticks_per_step;

            let status = state.tick(pending);
            pending = Input::None;
            self.draw(&state.snapshot())?;

            if status == Status::GameOver {
                self.game_over(&state.snapshot())?;
                break;
            }
        }

        if is_ctrl_c(&self.term.read_key_blocking()?) {
            return Ok(Flow::Quit);
        }
        Ok(Flow::Again)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn game_over(&mut self, snap: &Snapshot) -> Result<()> {
        info!(player = %self.player_name, score = snap.score, "session finished");

        for pos in snap.body.iter().chain(std::iter::once(&snap.head)) {
            self.term.print_at(cell(*pos), DEAD_SNAKE_CHAR)?;
        }

        let score_line = format!("{}'s final score: {}", self.player_name, snap.score);
        self.term.show_message(&[
            "Game over!",
            &score_line,
            "",
            "Press any key to play again,",
            "or CTRL+C to quit.",
        ])?;
        Ok(())
    }

    /// Redraws the board from a snapshot, printing only cells that changed.
    fn draw(&mut self, snap: &Snapshot) -> Result<()> {
        let (w, h) = (snap.board.width(), snap.board.height());
        let mut frame = vec![' '; snap.board.cell_count()];

        for pos in snap.fruits {
            frame[snap.board.index(*pos)] = FRUIT_CHAR;
        }
        for pos in snap.body {
            frame[snap.board.index(*pos)] = SNAKE_BODY_CHAR;
        }
        frame[snap.board.index(snap.head)] = head_char(snap.direction);

        for y in 0..h {
            for x in 0..w {
                let ch = frame[y as usize * w as usize + x as usize];
                self.term.print_changed(cell(Position::new(x, y)), ch)?;
            }
        }

        let mut hud = format!(
            "{}'s Score: {} | Fruits: {}",
            self.player_name,
            snap.score,
            snap.fruits.len()
        );
        if snap.random_mode {
            hud.push_str(" [RANDOM MODE]");
        }
        self.term.print_line((0, h + 2), &hud)?;

        self.term.flush()?;
        Ok(())
    }

    fn toggle_pause(&mut self) -> Result<()> {
        if !self.paused {
            self.term.show_message(&["Paused", "Press Esc to resume", "or Ctrl+C to quit"])?;
        } else {
            self.term.hide_message()?;
        }

        self.paused = !self.paused;
        Ok(())
    }
}

/// Board cell to terminal coordinates, inside the border.
fn cell(pos: Position) -> Coords {
    (pos.x + 1, pos.y + 1)
}

fn head_char(direction: Option<Direction>) -> char {
    match direction {
        Some(Direction::Up) => '^',
        Some(Direction::Down) => 'v',
        Some(Direction::Left) => '<',
        Some(Direction::Right) => '>',
        None => '@',
    }
}

fn key_to_input(code: KeyCode) -> Option<Input> {
    match code {
        KeyCode::Char('w') | KeyCode::Up => Some(Input::Up),
        KeyCode::Char('a') | KeyCode::Left => Some(Input::Left),
        KeyCode::Char('s') | KeyCode::Down => Some(Input::Down),
        KeyCode::Char('d') | KeyCode::Right => Some(Input::Right),
        KeyCode::Char('x') | KeyCode::Char('q') => Some(Input::Quit),
        KeyCode::Char('r') => Some(Input::Reshuffle),
        _ => None,
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
