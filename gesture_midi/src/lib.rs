//! # gesture_midi
//!
//! Turns stable gesture labels into MIDI note events.
//!
//! * [`HarmonyMap`] — the fixed gesture → interval table, voiced on a
//!   configurable base note.
//! * [`MidiEvent`] — the 3-byte note-on / note-off wire form.
//! * [`NoteMachine`] — the edge-triggered state machine that owns the set of
//!   currently sounding notes and emits the off/on transitions.
//!
//! ## Gesture → notes (base note B, default 60 = middle C)
//!
//! | gesture | notes |
//! |---|---|
//! | Fist | — (silence) |
//! | 1 Finger | B+3 |
//! | 2 Fingers | B+3, B+5 |
//! | 3 Fingers | B−2, B+3, B+5 |
//! | Open Hand | B−2, B, B+3, B+5, B+7 |
//! | Other | — (silence) |
//!
//! `Other` (which includes the 4-finger pose) is silent on purpose; the
//! table has no 4-finger voicing and none is invented here.

use hand_stream::GestureLabel;

/// Base note the interval table is voiced on by default (middle C).
pub const DEFAULT_BASE_NOTE: u8 = 60;

/// Velocity carried by every note-on.
pub const DEFAULT_VELOCITY: u8 = 100;

// ════════════════════════════════════════════════════════════════════════════
// MidiEvent — the 3-byte wire form
// ════════════════════════════════════════════════════════════════════════════

/// A single note event, channel fixed at 0.
///
/// Note-off is expressed as status `0x80` with velocity 0 — the transport
/// never sees a running-status or zero-velocity-note-on encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
}

impl MidiEvent {
    /// Encode as the 3 bytes handed to the MIDI transport.
    pub fn to_bytes(self) -> [u8; 3] {
        match self {
            MidiEvent::NoteOn { note, velocity } => [0x90, note, velocity],
            MidiEvent::NoteOff { note } => [0x80, note, 0],
        }
    }

    pub fn note(self) -> u8 {
        match self {
            MidiEvent::NoteOn { note, .. } => note,
            MidiEvent::NoteOff { note } => note,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HarmonyMap — gesture → note set
// ════════════════════════════════════════════════════════════════════════════

/// The fixed gesture → interval table, voiced on `base`.
///
/// Intervals are semitone offsets; a note that would leave the 0–127 MIDI
/// range after offsetting is dropped from the set rather than wrapped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HarmonyMap {
    /// MIDI note number the intervals are measured from.
    pub base: u8,
}

impl HarmonyMap {
    pub fn new(base: u8) -> Self {
        HarmonyMap { base }
    }

    /// Semitone offsets for a gesture. Fist and Other are silence.
    pub fn intervals(gesture: GestureLabel) -> &'static [i16] {
        match gesture {
            GestureLabel::Fist => &[],
            GestureLabel::OneFinger => &[3],
            GestureLabel::TwoFingers => &[3, 5],
            GestureLabel::ThreeFingers => &[-2, 3, 5],
            GestureLabel::OpenHand => &[-2, 0, 3, 5, 7],
            GestureLabel::Other => &[],
        }
    }

    /// Concrete note numbers for a gesture, in table order.
    pub fn notes_for(&self, gesture: GestureLabel) -> Vec<u8> {
        Self::intervals(gesture)
            .iter()
            .filter_map(|&iv| {
                let n = self.base as i16 + iv;
                (0..=127).contains(&n).then_some(n as u8)
            })
            .collect()
    }
}

impl Default for HarmonyMap {
    fn default() -> Self {
        HarmonyMap::new(DEFAULT_BASE_NOTE)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// NoteMachine — edge-triggered note transitions
// ════════════════════════════════════════════════════════════════════════════

/// Owns the set of currently sounding notes and the last committed gesture.
///
/// [`NoteMachine::observe`] is edge-triggered: feeding the same stable
/// gesture frame after frame produces nothing, so a held gesture is attacked
/// exactly once. On a change it emits note-off for every sounding note (even
/// notes the new gesture shares), then note-on for the new gesture's full
/// set. The active set therefore always equals the note set of the last
/// committed gesture.
#[derive(Clone, Debug)]
pub struct NoteMachine {
    harmony: HarmonyMap,
    velocity: u8,
    last: Option<GestureLabel>,
    active: Vec<u8>,
}

impl NoteMachine {
    pub fn new(harmony: HarmonyMap, velocity: u8) -> Self {
        NoteMachine {
            harmony,
            velocity,
            last: None,
            active: Vec::new(),
        }
    }

    /// Feed one stable gesture; returns the events this frame requires.
    ///
    /// Off events always precede on events, and shared notes are re-struck
    /// rather than held through the transition.
    pub fn observe(&mut self, stable: GestureLabel) -> Vec<MidiEvent> {
        if self.last == Some(stable) {
            return Vec::new();
        }
        self.last = Some(stable);

        let mut events: Vec<MidiEvent> = self
            .active
            .drain(..)
            .map(|note| MidiEvent::NoteOff { note })
            .collect();

        for note in self.harmony.notes_for(stable) {
            events.push(MidiEvent::NoteOn {
                note,
                velocity: self.velocity,
            });
            self.active.push(note);
        }
        events
    }

    /// Release everything and forget the committed gesture, e.g. on session
    /// shutdown. The next `observe` behaves like the very first.
    pub fn silence(&mut self) -> Vec<MidiEvent> {
        self.last = None;
        self.active
            .drain(..)
            .map(|note| MidiEvent::NoteOff { note })
            .collect()
    }

    /// Notes currently sounding, in the order they were attacked.
    pub fn active_notes(&self) -> &[u8] {
        &self.active
    }

    /// The last committed gesture, if any transition has fired yet.
    pub fn last_gesture(&self) -> Option<GestureLabel> {
        self.last
    }
}

impl Default for NoteMachine {
    fn default() -> Self {
        NoteMachine::new(HarmonyMap::default(), DEFAULT_VELOCITY)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
