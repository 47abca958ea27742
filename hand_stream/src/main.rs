//! Interactive explorer for the finger-state → gesture → stabilizer pipeline.
//! Type finger patterns and watch the raw and stable labels evolve.

use hand_stream::{classify, FingerStates, GestureStabilizer};
use std::io::{self, Write};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║          Hand Stream — Gesture Pipeline Explorer     ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
    println!("  Enter a 5-digit finger pattern (thumb index middle ring pinky),");
    println!("  e.g. 01100 = index+middle extended. Each entry is one observed");
    println!("  frame fed into the 6-frame stabilizer. q quits.");
    println!();

    let mut stabilizer = GestureStabilizer::new();
    let mut frame = 0usize;

    loop {
        let line = read_line("pattern> ");
        let line = line.trim();

        if line.eq_ignore_ascii_case("q") {
            println!("\nGoodbye!\n");
            break;
        }

        let flags = match parse_pattern(line) {
            Some(f) => f,
            None => {
                println!("  ⚠  Need exactly five 0/1 digits, e.g. 01100.\n");
                continue;
            }
        };

        let states = FingerStates::from_flags(flags);
        let raw = classify(&states);
        let stable = stabilizer.observe(raw);
        frame += 1;

        println!(
            "  [{:>4}]  extended={}  raw={:<10}  stable={}",
            frame,
            states.extended_count(),
            raw.name(),
            stable.name()
        );
        let window: Vec<&str> = stabilizer.window().map(|l| l.name()).collect();
        println!("          window: {:?}\n", window);
    }
}

fn parse_pattern(s: &str) -> Option<[bool; 5]> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() != 5 {
        return None;
    }
    let mut flags = [false; 5];
    for (i, c) in chars.iter().enumerate() {
        flags[i] = match c {
            '0' => false,
            '1' => true,
            _ => return None,
        };
    }
    Some(flags)
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
