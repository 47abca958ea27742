//! The frame loop.
//!
//! One cooperative thread of control: each iteration polls the detection
//! channel, re-arms the single-slot request gate, runs the session pipeline
//! against the latched result, then sleeps out the frame period. Detection
//! runs on its own thread and may straddle any number of frames; the loop
//! simply keeps reusing the most recent result until a new one lands.

use std::sync::mpsc::TryRecvError;
use std::thread;
use std::time::{Duration, Instant};

use gesture_midi::{HarmonyMap, DEFAULT_BASE_NOTE, DEFAULT_VELOCITY};
use tracing::debug;

use crate::output::open_midi_output;
use crate::session::{DetectionGate, Session};
use crate::source::{spawn_landmark_source, DetectionRequest, LandmarkSource};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for one controller session.
pub struct AppConfig {
    /// MIDI note the gesture intervals are voiced on.
    pub base_note: u8,
    /// Velocity for every note-on.
    pub velocity: u8,
    /// Frame-loop rate.
    pub fps: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            base_note: DEFAULT_BASE_NOTE,
            velocity: DEFAULT_VELOCITY,
            fps: 30,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main session loop
// ════════════════════════════════════════════════════════════════════════════

/// Run a session against the given landmark source until the source hangs
/// up. All sounding notes are released before returning.
pub fn run<S: LandmarkSource>(cfg: AppConfig, source: S) -> anyhow::Result<()> {
    let (req_tx, res_rx) = spawn_landmark_source(source);
    let midi = open_midi_output();

    let mut session = Session::new(HarmonyMap::new(cfg.base_note), cfg.velocity, midi);
    let mut gate = DetectionGate::Idle;
    let mut frame: u64 = 0;
    let period = Duration::from_secs(1) / cfg.fps.max(1);

    loop {
        let frame_start = Instant::now();

        // 1. Post a detection request, unless one is already in flight.
        if gate.is_idle() {
            if req_tx.send(DetectionRequest { frame }).is_err() {
                break;
            }
            gate.request_sent();
        }

        // 2. Latch a result if one has arrived (non-blocking).
        match res_rx.try_recv() {
            Ok(result) => {
                session.latch(result);
                gate.result_received();
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => break,
        }

        // 3. Decide and emit for this frame.
        if let Some(gesture) = session.step() {
            debug!(frame, gesture = gesture.name(), "transition");
        }

        frame += 1;
        thread::sleep(period.saturating_sub(frame_start.elapsed()));
    }

    session.silence();
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Pose, ScriptedSource};

    #[test]
    fn loop_winds_down_when_the_script_ends() {
        let cfg = AppConfig {
            fps: 500,
            ..AppConfig::default()
        };
        let source = ScriptedSource {
            frames: vec![Pose::Fist; 10],
            latency: Duration::ZERO,
        };
        run(cfg, source).unwrap();
    }
}
