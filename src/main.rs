mod game;
mod term;

use std::{fs, path::{Path, PathBuf}, sync::Mutex};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::Level;

use game::{Flow, SnakeGame};
use torus_snake::{FruitMode, Settings};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Difficulty {
    Easy,
    Medium,
    Hard,
    /// Medium pace with random fruit mode
    Random,
}

impl Difficulty {
    fn delay_ms(self) -> u64 {
        match self {
            Difficulty::Easy => 120,
            Difficulty::Medium => 80,
            Difficulty::Hard => 50,
            Difficulty::Random => 70,
        }
    }
}

#[derive(Parser)]
#[command(name = "torus-snake", about = "Snake on a wrap-around board, in your terminal")]
struct Args {
    /// Name shown next to the score
    #[arg(long, default_value = "Player")]
    name: String,
    #[arg(long, value_enum, default_value_t = Difficulty::Medium)]
    difficulty: Difficulty,
    /// YAML file with board and fruit settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[arg(long)]
    width: Option<u16>,
    #[arg(long)]
    height: Option<u16>,
    /// Seed for reproducible sessions
    #[arg(long)]
    seed: Option<u64>,
    /// Write logs here; nothing is logged without it
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path, args.log_level)?;
    }

    let settings = load_settings(&args)?;
    let name = args.name.trim().to_string();
    let mut game = SnakeGame::new(settings, name, args.difficulty.delay_ms(), args.seed)?;

    game.initialize()?;
    let result = run(&mut game);
    // Leave the terminal usable before reporting anything
    game.restore()?;
    result
}

fn run(game: &mut SnakeGame) -> Result<()> {
    if !game.show_intro()? {
        return Ok(());
    }

    loop {
        match game.play()? {
            Flow::Again => continue,
            Flow::Quit => return Ok(()),
        }
    }
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_yaml_ng::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => Settings::default(),
    };

    if let Some(width) = args.width {
        settings.width = width;
    }
    if let Some(height) = args.height {
        settings.height = height;
    }
    if let Difficulty::Random = args.difficulty {
        settings.fruit_mode = FruitMode::Random;
    }

    settings.validate().map_err(anyhow::Error::msg)?;
    Ok(settings)
}

fn init_logging(path: &Path, level: Level) -> Result<()> {
    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
