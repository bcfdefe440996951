//! `roll`: roll some dice from the command line.
//!
//! ```text
//! roll attack:2d20+4        # 2d20, add 4, label the row "attack"
//! roll d6                   # one six-sided die
//! roll 2d12/3^              # 2d12, divide the sum by 3 and round up
//! roll 4d6p3h               # 4d6, keep the 3 highest
//! roll d3 d4 d6 d8 d12 d20  # several batches at once
//! ```

mod clipboard;

use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use rand::rngs::StdRng;
use rand::SeedableRng;

use rolltable::{EnumerationConfig, NotationParser, ResultTable, RollError, RollReport};

#[derive(Parser)]
#[command(name = "roll", version, about = "Roll some dice!")]
#[command(after_help = "\
Notation: [name:][count]d<sides>[p[n](h|l)][modifier][^|_]

  attack:2d20+4   roll 2 twenty-sided dice, add 4, label the row 'attack'
  2d12/3^         roll 2d12, divide the sum by 3 and round up
  4d6p3h          roll 4d6 and keep the 3 highest
  d3 d4 d6 d20    several batches at once")]
struct Cli {
    /// Dice to roll, like `attack:2d20+4`
    #[arg(required = true)]
    notations: Vec<String>,

    /// Copy the table to the clipboard and wait until it was pasted
    #[arg(short, long)]
    clipboard: bool,

    /// Add the expected value and the two-tailed p-value of each roll
    #[arg(short, long)]
    statistics: bool,

    /// Seed for reproducible rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Largest number of dice combinations enumerated exactly before sampling
    #[arg(long, default_value_t = EnumerationConfig::default().exhaustive_threshold)]
    threshold: u64,
}

fn run(cli: &Cli) -> Result<()> {
    let mut parser = NotationParser::new();
    let specs = parser.parse_all(&cli.notations)?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let report = if cli.statistics {
        let config = EnumerationConfig::default().with_threshold(cli.threshold);
        RollReport::roll_with_statistics(&specs, &config, &mut rng)?
    } else {
        RollReport::roll(&specs, &mut rng)
    };
    let table = ResultTable::from_report(&report).render();

    if cli.clipboard {
        clipboard::copy_and_wait(&table)?;
    } else {
        println!("{table}");
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            if let Some(RollError::MalformedNotation { .. }) = e.downcast_ref::<RollError>() {
                eprintln!("\n{}", Cli::command().render_usage());
            }
            ExitCode::FAILURE
        }
    }
}
