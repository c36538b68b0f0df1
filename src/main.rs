use std::io::{self, Write};

use clap::Parser;
use infinite_minesweeper::config::{GameConfig, DEFAULT_MINE_PERCENTAGE};
use infinite_minesweeper::engine::World;
use infinite_minesweeper::tui;
use infinite_minesweeper::view::{self, Viewport};

#[derive(Parser, Debug)]
#[command(name = "infinite-minesweeper", about = "Infinite Minesweeper for the terminal", version)]
struct Args {
    /// Launch TUI mode
    #[arg(long)]
    tui: bool,
    /// World seed (default: derived from the clock)
    #[arg(long)]
    seed: Option<u32>,
    /// Percentage of fields that are mines
    #[arg(long, default_value_t = DEFAULT_MINE_PERCENTAGE)]
    mines: u8,
    /// Width of the printed view
    #[arg(long, default_value_t = 32)]
    width: usize,
    /// Height of the printed view
    #[arg(long, default_value_t = 16)]
    height: usize,
}

fn print_help() {
    println!("Commands:");
    println!("  r x y   - reveal field at world column x, row y");
    println!("  f x y   - toggle flag at x, y");
    println!("  v x y   - centre the view on x, y");
    println!("  q       - quit");
    println!("  h/help  - show this help");
}

fn parse_xy(parts: &[&str]) -> Option<(i64, i64)> {
    let x = parts.get(1)?.parse::<i64>().ok()?;
    let y = parts.get(2)?.parse::<i64>().ok()?;
    Some((x, y))
}

fn main() {
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(seed_from_time);
    let config = match GameConfig::new(seed, args.mines) {
        Ok(c) => c,
        Err(e) => { eprintln!("{}", e); return; }
    };

    if args.tui {
        if let Err(e) = tui::run_tui(config) {
            eprintln!("TUI error: {}", e);
        }
        return;
    }

    let mut viewport = match Viewport::new(0, 0, args.width, args.height) {
        Ok(v) => v,
        Err(e) => { eprintln!("{}", e); return; }
    };
    viewport.centre_on(0, 0);
    let mut world = World::new(config);

    println!("Infinite Minesweeper, seed {} with {}% mines", seed, args.mines);
    println!("Coordinates are world positions and may be negative. Type 'h' for help.");
    print_help();

    let mut input = String::new();
    loop {
        world.set_visibility(viewport.chunk_window());
        println!("\n{}", viewport.render(&mut world, false));
        if world.is_dead() {
            println!("Boom! You hit a mine. Game over.\n");
            println!("Final view (mines shown):\n{}", viewport.render(&mut world, true));
            break;
        }

        print!("> ");
        let _ = io::stdout().flush();
        input.clear();
        if io::stdin().read_line(&mut input).is_err() { break; }
        let line = input.trim();
        if line.is_empty() { continue; }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0].to_lowercase().as_str() {
            "q" | "quit" | "exit" => break,
            "h" | "help" => print_help(),
            cmd @ ("r" | "reveal" | "f" | "flag" | "v" | "view") => {
                let Some((x, y)) = parse_xy(&parts) else { println!("Usage: {} x y", cmd); continue; };
                match cmd {
                    "r" | "reveal" => {
                        // Reveal what the player is looking at.
                        viewport.scroll_to_include(x, y);
                        world.set_visibility(viewport.chunk_window());
                        let _ = view::reveal_at(&mut world, x, y);
                    }
                    "f" | "flag" => {
                        if !view::flag_at(&mut world, x, y) { println!("Cannot flag an uncovered field"); }
                    }
                    _ => viewport.centre_on(x, y),
                }
            }
            other => {
                println!("Unknown command '{}'. Type 'h' for help.", other);
            }
        }
    }
}

fn seed_from_time() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    now.as_secs() as u32 ^ now.subsec_nanos()
}
