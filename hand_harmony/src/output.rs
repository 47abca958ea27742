//! MIDI output seam.
//!
//! The session only ever writes 3-byte messages, so the seam is a single
//! `send`. A real port is opened once at startup; when no device is found
//! the session degrades to a silent [`NullOut`] instead of failing.

use tracing::{info, warn};

// ════════════════════════════════════════════════════════════════════════════
// MidiOut — abstraction over midir / null
// ════════════════════════════════════════════════════════════════════════════

/// Anything that accepts raw 3-byte MIDI messages. Write-only; the session
/// never reads from the transport.
pub trait MidiOut: Send {
    fn send(&mut self, msg: &[u8; 3]);
}

// ── midir backend ─────────────────────────────────────────────────────────

struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidiOut for MidirOut {
    fn send(&mut self, msg: &[u8; 3]) {
        // Fire-and-forget: a dropped message is re-derivable on the next
        // gesture transition, so send errors are not worth surfacing.
        let _ = self.conn.send(msg);
    }
}

// ── null backend (used when no MIDI port is available) ────────────────────

/// Swallows every message. Stands in for a real port when none exists.
pub struct NullOut;

impl MidiOut for NullOut {
    fn send(&mut self, _msg: &[u8; 3]) {}
}

// ════════════════════════════════════════════════════════════════════════════
// open_midi_output — enumerate ports and pick first available
// ════════════════════════════════════════════════════════════════════════════

/// Try to open the first available MIDI output port.
/// Falls back to [`NullOut`] with a single warning if none is found —
/// a missing device mutes the session, it never aborts it.
pub fn open_midi_output() -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new("hand_harmony") {
        Ok(m) => m,
        Err(e) => {
            warn!("MIDI init error: {} — using null output", e);
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    if ports.is_empty() {
        warn!("no MIDI output ports found — session will run silent");
        warn!("install a MIDI synthesiser, e.g. `timidity -iA` or `fluidsynth` on Linux");
        return Box::new(NullOut);
    }

    // Prefer a softsynth if visible
    let port_idx = ports
        .iter()
        .enumerate()
        .find(|(_, p)| {
            midi_out
                .port_name(p)
                .map(|n| {
                    let n = n.to_lowercase();
                    n.contains("fluid")
                        || n.contains("timidity")
                        || n.contains("microsoft")
                        || n.contains("gm")
                        || n.contains("synth")
                })
                .unwrap_or(false)
        })
        .map(|(i, _)| i)
        .unwrap_or(0);

    let port = &ports[port_idx];
    let name = midi_out
        .port_name(port)
        .unwrap_or_else(|_| "Unknown".to_string());

    match midi_out.connect(port, "hand-harmony") {
        Ok(conn) => {
            info!("opened MIDI port: {}", name);
            Box::new(MidirOut { conn })
        }
        Err(e) => {
            warn!("failed to connect to {}: {} — using null output", name, e);
            Box::new(NullOut)
        }
    }
}
