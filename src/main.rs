//! Console m,n,k game
//!
//! Humans type moves in notation (`b2`, or `bc3` for a bomb on c3). Computer
//! players move on their own.

use std::io::{stdin, stdout, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use mnk::engine::{AIEngine, AiLevel};
use mnk::game::{Game, GameConfig};
use mnk::rules::{Move, Outcome};

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// JSON game configuration; defaults to 3x3 tic-tac-toe between two humans
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Seed for board generation and the computer players
    #[arg(short, long)]
    seed: Option<u64>,
    /// Search depth of the computer players and of hints
    #[arg(short, long, default_value_t = 4)]
    depth: u32,
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn setup_logger(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

enum Command {
    Play(Move),
    Undo,
    Back,
    Next,
    Hint,
    Moves,
    Quit,
}

fn parse_command(input: &str) -> Result<Command> {
    let command = match input.to_ascii_lowercase().as_str() {
        "undo" => Command::Undo,
        "back" => Command::Back,
        "next" => Command::Next,
        "hint" => Command::Hint,
        "moves" => Command::Moves,
        "quit" | "exit" => Command::Quit,
        _ => Command::Play(input.parse()?),
    };
    Ok(command)
}

fn print_outcome(game: &Game, outcome: Outcome) {
    match outcome {
        Outcome::Victory(p) => println!("{} wins!", game.players()[p]),
        Outcome::Draw => println!("Draw."),
        Outcome::Unfinished => {}
    }
}

fn run(mut game: Game, depth: u32, rng: &mut ChaCha8Rng) -> Result<()> {
    let mut engines: Vec<Option<AIEngine>> = game
        .players()
        .iter()
        .map(|p| p.kind.ai_level().map(|level| AIEngine::new(level, depth)))
        .collect();
    let mut advisor = AIEngine::new(AiLevel::Impossible, depth);

    let mut lines = stdin().lock().lines();
    print!("{}", game.state().board());

    loop {
        let at_end = game.state().history().redo_len() == 0;
        let outcome = game.outcome();
        if outcome.is_terminal() && at_end {
            print_outcome(&game, outcome);
            break;
        }

        let player = game.state().current_player();
        if at_end && !outcome.is_terminal() {
            if let Some(engine) = engines[player].as_mut() {
                let result = engine.get_move(game.state(), rng)?;
                let mv = result
                    .best_move
                    .context("computer player found no move")?;
                println!("{} plays {} ({} ms)", game.current_player(), mv, result.time_ms);
                game.play(mv)?;
                print!("{}", game.state().board());
                continue;
            }
        }

        print!("{} > ", game.current_player());
        stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read from stdin")?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let command = match parse_command(input) {
            Ok(command) => command,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };

        let step = match command {
            Command::Quit => break,
            Command::Play(mv) => game.play(mv).map(|_| ()),
            Command::Undo => game.undo().and_then(|_| {
                // Take back the computer's reply as well
                let current = game.state().current_player();
                if engines[current].is_some() && !game.state().history().is_empty() {
                    game.undo()?;
                }
                Ok(())
            }),
            Command::Back => game.go_back().map(|_| ()),
            Command::Next => game.go_next().map(|_| ()),
            Command::Hint => {
                match advisor.advice(game.state()) {
                    Ok(result) => match result.best_move {
                        Some(mv) => println!("hint: {} (score {:.2})", mv, result.score),
                        None => println!("no move available"),
                    },
                    Err(err) => println!("{}", err),
                }
                continue;
            }
            Command::Moves => {
                let moves: Vec<String> = game.legal_moves().iter().map(Move::to_string).collect();
                println!("{}", moves.join(" "));
                continue;
            }
        };

        match step {
            Ok(()) => print!("{}", game.state().board()),
            Err(err) => println!("{}", err),
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logger(args.verbose)?;

    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GameConfig::default(),
    };

    let mut rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let game = Game::new(&config, &mut rng).context("invalid game configuration")?;
    run(game, args.depth, &mut rng)
}
