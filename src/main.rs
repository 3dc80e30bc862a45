mod control;
mod game_field_panel;
mod game_window;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::info;
use model::game::Game;
use model::rules::{Rules, DEFAULT_SIZE, START_TILES, WIN_TILE};
use rand::rngs::StdRng;
use rand::SeedableRng;

use game_window::GameWindow;

/// Play 2048 in the terminal
#[derive(Parser, Debug)]
#[command(name = "game2048", version, about, long_about = None)]
struct Args {
    /// Board side length
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    size: usize,

    /// Random seed (default: random)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Tiles placed on a fresh board
    #[arg(long, default_value_t = START_TILES)]
    start_tiles: usize,

    /// Tile value that wins the game
    #[arg(long, default_value_t = WIN_TILE)]
    win_tile: u32,
}

impl Args {
    fn rules(&self) -> Rules {
        Rules {
            size: self.size,
            start_tiles: self.start_tiles,
            win_tile: self.win_tile,
        }
    }
}

fn run(args: Args) -> Result<()> {
    let rules = args.rules();
    rules.validate()?;
    let seed = args.seed.unwrap_or_else(rand::random);
    info!("starting {}x{} game with seed {}", rules.size, rules.size, seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut game = Game::new(rules, &mut rng);
    let mut window = GameWindow::new()?;
    loop {
        window.draw(&game)?;
        let command = window.next_command()?;
        match command.apply(&game, &mut rng) {
            Some(next) => game = next,
            None => break,
        }
    }
    drop(window);

    info!(
        "finished with score {} (best {}), largest tile {}",
        game.score(),
        game.best_score(),
        game.field().max_tile()
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    run(Args::parse())
}
