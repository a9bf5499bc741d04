// Simple command-line application to play chess against random moves

use tilechess::{Color, Coord, Game, RandomStrategy, Strategy};
use std::io::{self, BufRead, Write};
use std::str::FromStr;

fn print_help() {
    println!("Commands:");
    println!("  <move>       make a move in coordinate notation, e.g. e2e4 or e7e8q");
    println!("  moves <sq>   list legal moves from the square");
    println!("  undo         take back the last full move");
    println!("  reset        start a new game");
    println!("  fen <fen>    load a position");
    println!("  quit         exit");
}

fn main() -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdin = stdin.lock();
    let mut stdout = io::stdout();

    let mut game = Game::new();
    let mut opponent = RandomStrategy::new(rand::thread_rng());
    let human = Color::White;

    print_help();
    loop {
        if game.side() != human {
            if let Some(mv) = opponent.play(&mut game) {
                println!("Computer plays {}", mv);
            }
        }

        println!();
        println!("{}", game.board().pretty());
        if let Some(outcome) = game.outcome() {
            println!("Game finished: {}", outcome);
            println!("Moves: {}", game.uci_list());
            println!("Type \"reset\" to play again or \"quit\" to exit");
        } else if game.is_check() {
            println!("Check!");
        }

        print!("{} ", game.board().raw().move_number);
        stdout.flush()?;
        let mut s = String::new();
        if stdin.read_line(&mut s)? == 0 {
            break;
        }
        let s = s.trim();
        let (cmd, arg) = match s.split_once(' ') {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (s, ""),
        };

        match cmd {
            "" => {}
            "quit" => break,
            "help" => print_help(),
            "reset" => game.reset(),
            "undo" => {
                // Take back both the computer reply and our own move.
                game.unmake_last();
                if game.side() != human {
                    game.unmake_last();
                }
            }
            "fen" => {
                let fen = if arg.is_empty() { None } else { Some(arg) };
                if let Err(e) = game.load_position(fen) {
                    println!("Bad position: {}", e);
                }
            }
            "moves" => match Coord::from_str(arg) {
                Ok(c) => {
                    let moves: Vec<String> =
                        game.generate_moves(c).iter().map(|m| m.to_string()).collect();
                    println!("{}", moves.join(" "));
                }
                Err(e) => println!("Bad square: {}", e),
            },
            _ => {
                if game.is_game_over() {
                    println!("Game is over");
                    continue;
                }
                if let Err(e) = game.apply_uci(cmd) {
                    println!("Bad move: {}", e);
                }
            }
        }
    }

    Ok(())
}
