//! Command-loop demo for the note state machine: feed stable gestures by
//! hand and watch the off/on transitions and the active-note set.

use gesture_midi::{HarmonyMap, MidiEvent, NoteMachine, DEFAULT_VELOCITY};
use hand_stream::GestureLabel;
use std::io::{self, Write};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║        Gesture MIDI — Note Machine Workbench         ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let base: u8 = {
        let b = read_line("  Base note 0–127 (default 60): ")
            .trim()
            .parse()
            .unwrap_or(60);
        b.min(127)
    };

    let mut machine = NoteMachine::new(HarmonyMap::new(base), DEFAULT_VELOCITY);

    println!();
    print_menu();

    loop {
        let choice = read_line("gesture> ");
        let choice = choice.trim().to_ascii_lowercase();

        let gesture = match choice.as_str() {
            "0" | "f" => GestureLabel::Fist,
            "1" => GestureLabel::OneFinger,
            "2" => GestureLabel::TwoFingers,
            "3" => GestureLabel::ThreeFingers,
            "4" | "x" => GestureLabel::Other,
            "5" | "o" => GestureLabel::OpenHand,
            "s" => {
                for e in machine.silence() {
                    print_event(e);
                }
                println!("  active: {:?}\n", machine.active_notes());
                continue;
            }
            "q" => {
                println!("\nGoodbye!\n");
                break;
            }
            _ => {
                print_menu();
                continue;
            }
        };

        let events = machine.observe(gesture);
        if events.is_empty() {
            println!("  {} — no change", gesture.name());
        } else {
            println!("  {} →", gesture.name());
            for e in events {
                print_event(e);
            }
        }
        println!("  active: {:?}\n", machine.active_notes());
    }
}

fn print_event(e: MidiEvent) {
    match e {
        MidiEvent::NoteOn { note, velocity } => {
            println!("    ON  {:>3}  vel {}   bytes {:02x?}", note, velocity, e.to_bytes())
        }
        MidiEvent::NoteOff { note } => {
            println!("    OFF {:>3}          bytes {:02x?}", note, e.to_bytes())
        }
    }
}

fn print_menu() {
    println!("  0/f fist   1–3 fingers   4/x other   5/o open hand");
    println!("  s all-notes-off   q quit");
    println!();
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
