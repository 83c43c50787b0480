use std::thread;
use std::time::Duration;

use clap::Parser;
use minesweeper_ai::{Agent, Board, Cell, Move, Reveal};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

/// Plays one game of Minesweeper with the deducing agent.
#[derive(Parser, Debug)]
#[command(name = "bot", version)]
struct Args {
    /// Board height.
    #[arg(long, default_value_t = 8)]
    height: usize,

    /// Board width.
    #[arg(long, default_value_t = 8)]
    width: usize,

    /// Number of mines.
    #[arg(long, default_value_t = 8)]
    mines: usize,

    /// Seed for mine placement and guesses. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Pause between moves, in milliseconds.
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("minesweeper_ai=info".parse()?),
        )
        .init();

    let args = Args::parse();

    // --- 1. Initialization ---
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut board = Board::new(args.height, args.width, args.mines, &mut rng)?;
    let mut agent = Agent::new(args.height, args.width);

    info!(
        height = args.height,
        width = args.width,
        mines = args.mines,
        seed = ?args.seed,
        "starting game"
    );
    println!("--- Minesweeper Deduction Bot ---");
    println!("Strategy: play proven-safe cells, guess uniformly otherwise.");
    print_board(&board, &agent);

    // --- 2. Game Loop ---
    let mut move_count = 0;
    while !board.won() {
        let Some(next) = agent.next_move(&mut rng) else {
            println!("No moves left for the bot to make.");
            break;
        };
        move_count += 1;

        // --- 3. Execute the Chosen Move ---
        match next {
            Move::Safe(cell) => println!("\n--- Move #{move_count}: safe {cell} ---"),
            Move::Guess(cell) => println!("\n--- Move #{move_count}: guessing {cell} ---"),
        }

        let cell = next.cell();
        match board.reveal(cell)? {
            Reveal::Detonated => {
                print_board(&board, &agent);
                break;
            }
            Reveal::Count(count) => {
                agent.observe(cell, usize::from(count))?;
            }
        }

        for &mine in agent.known_mines() {
            board.flag(mine)?;
        }
        print_board(&board, &agent);

        if args.delay_ms > 0 {
            thread::sleep(Duration::from_millis(args.delay_ms));
        }
    }

    // --- 4. Final Result ---
    println!("\n--- Game Over ---");
    if board.won() {
        println!("Result: the bot won in {move_count} moves.");
    } else if board.detonated() {
        println!("Result: the bot hit a mine after {move_count} moves.");
    } else {
        println!("Result: the game ended unexpectedly.");
    }
    info!(
        moves = move_count,
        won = board.won(),
        known_mines = agent.known_mines().len(),
        "game over"
    );

    Ok(())
}

/// Prints the board as the bot sees it.
///
/// Revealed cells show their count, flagged cells `F`, a detonated mine `*`,
/// proven-safe cells `.` and everything else `■`.
fn print_board(board: &Board, agent: &Agent) {
    print!("   ");
    for col in 0..agent.width() {
        print!("{:^3}", col);
    }
    println!("\n  +{}", "---".repeat(agent.width()));

    for row in 0..agent.height() {
        print!("{:^2}|", row);
        for col in 0..agent.width() {
            let cell = Cell::new(row, col);
            let display = if board.is_revealed(cell) && board.is_mine(cell) {
                " * ".to_string()
            } else if board.is_revealed(cell) {
                format!(" {} ", board.nearby_mines(cell))
            } else if board.is_flagged(cell) {
                " F ".to_string()
            } else if agent.known_safes().contains(&cell) {
                " . ".to_string()
            } else {
                " ■ ".to_string()
            };
            print!("{}", display);
        }
        println!();
    }
    println!();
}
