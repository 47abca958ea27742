//! hand_harmony — interactive entry point.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::bail;
use hand_harmony::app::{run, AppConfig};
use hand_harmony::source::{Pose, ScriptedSource, SimSource};
use std::io::{self, Write};

/// Simulated detector latency — roughly what a hand-landmark model takes
/// per frame on commodity hardware.
const SIM_LATENCY: Duration = Duration::from_millis(40);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Hand Harmony — Gesture MIDI Chord Controller          ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let mut demo = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--demo" => demo = true,
            other => bail!("unknown argument: {other} (try --demo)"),
        }
    }

    let cfg = AppConfig::default();

    if demo {
        println!("  Mode: scripted demo — fist, counting up, open hand, fist.\n");
        return run(
            cfg,
            ScriptedSource {
                frames: demo_script(),
                latency: SIM_LATENCY,
            },
        );
    }

    println!("  Mode: simulation — type a pose and press Enter.");
    println!();
    println!("    f  fist (silence)       1–4  that many fingers");
    println!("    o  open hand (chord)    n    no hand in view");
    println!("    q  quit");
    println!();

    let (pose_tx, pose_rx) = mpsc::channel::<Pose>();

    // The prompt lives on its own thread; dropping the sender when the user
    // quits winds the whole session down.
    thread::spawn(move || {
        loop {
            print!("pose> ");
            io::stdout().flush().ok();
            let mut line = String::new();
            if io::stdin().read_line(&mut line).is_err() || line.is_empty() {
                return; // EOF
            }
            let line = line.trim();
            if line.eq_ignore_ascii_case("q") {
                return;
            }
            match Pose::parse(line) {
                Some(pose) => {
                    println!("  showing: {}", pose.name());
                    if pose_tx.send(pose).is_err() {
                        return;
                    }
                }
                None if line.is_empty() => {}
                None => println!("  ⚠  unknown pose — f 1 2 3 4 o n q"),
            }
        }
    });

    run(
        cfg,
        SimSource {
            pose_rx,
            latency: SIM_LATENCY,
        },
    )
}

/// Pose sequence for `--demo`: long enough holds for the stabilizer to
/// commit each gesture, with a hand-loss gap in the middle to show the
/// sticky-note behavior.
fn demo_script() -> Vec<Pose> {
    let mut frames = Vec::new();
    let hold = |frames: &mut Vec<Pose>, pose: Pose, n: usize| {
        frames.extend(std::iter::repeat(pose).take(n));
    };
    hold(&mut frames, Pose::NoHand, 5);
    hold(&mut frames, Pose::Fist, 12);
    hold(&mut frames, Pose::OneFinger, 20);
    hold(&mut frames, Pose::NoHand, 15); // note keeps sounding here
    hold(&mut frames, Pose::TwoFingers, 20);
    hold(&mut frames, Pose::ThreeFingers, 20);
    hold(&mut frames, Pose::FourFingers, 15); // "other" — silence
    hold(&mut frames, Pose::OpenHand, 25);
    hold(&mut frames, Pose::Fist, 12);
    frames
}
