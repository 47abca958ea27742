//! Per-session state and the per-frame decision pipeline.
//!
//! [`Session`] packages everything one controller session mutates — the
//! gesture stabilizer, the note machine, the MIDI handle and the latched
//! most-recent detection — into one explicit object, so independent
//! sessions can coexist and the whole pipeline is testable without a
//! window, a camera or a MIDI device.

use gesture_midi::{HarmonyMap, NoteMachine};
use hand_stream::{classify, finger_states, GestureLabel, GestureStabilizer, HandFrame};
use tracing::info;

use crate::output::MidiOut;
use crate::source::DetectionResult;

// ════════════════════════════════════════════════════════════════════════════
// DetectionGate — at most one request in flight
// ════════════════════════════════════════════════════════════════════════════

/// Two-state machine guarding the detection request channel: a new request
/// may only be posted while `Idle`, and every result flips the gate back.
///
/// There is no timeout: if a source never answers, the gate stays
/// `AwaitingResult` and the loop keeps reusing the latched result. A stuck
/// detector therefore stalls recognition silently — known limitation,
/// inherited rather than patched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionGate {
    Idle,
    AwaitingResult,
}

impl DetectionGate {
    pub fn is_idle(self) -> bool {
        self == DetectionGate::Idle
    }

    /// Flip to `AwaitingResult`; the caller just posted a request.
    pub fn request_sent(&mut self) {
        debug_assert!(self.is_idle(), "detection request posted while one is in flight");
        *self = DetectionGate::AwaitingResult;
    }

    /// Flip back to `Idle`; the caller just consumed a result.
    pub fn result_received(&mut self) {
        *self = DetectionGate::Idle;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Session
// ════════════════════════════════════════════════════════════════════════════

/// One gesture-controller session: stabilizer + note machine + MIDI handle
/// + the most recent detection result.
///
/// The latched result is overwritten whenever a new result arrives (a
/// negative result clears it) and is *reused* on every frame in between, so
/// a slow detector just lowers the effective decision rate.
pub struct Session {
    stabilizer: GestureStabilizer,
    machine: NoteMachine,
    midi: Box<dyn MidiOut>,
    latest: DetectionResult,
}

impl Session {
    pub fn new(harmony: HarmonyMap, velocity: u8, midi: Box<dyn MidiOut>) -> Self {
        Session {
            stabilizer: GestureStabilizer::new(),
            machine: NoteMachine::new(harmony, velocity),
            midi,
            latest: None,
        }
    }

    /// Store a freshly arrived detection result, replacing the previous one.
    pub fn latch(&mut self, result: DetectionResult) {
        self.latest = result;
    }

    /// Run one frame of the pipeline against the latched detection.
    ///
    /// With no hand latched this is a no-op: no stabilizer observation, no
    /// note transition — previously active notes keep sounding until a hand
    /// is redetected and a *different* stable gesture commits. Notes are
    /// deliberately not auto-released on hand loss.
    ///
    /// Returns the newly committed gesture when a transition fired.
    pub fn step(&mut self) -> Option<GestureLabel> {
        let frame: &HandFrame = self.latest.as_ref()?;

        let states = finger_states(frame);
        let raw = classify(&states);
        let stable = self.stabilizer.observe(raw);

        let committed = self.machine.last_gesture() != Some(stable);
        for event in self.machine.observe(stable) {
            self.midi.send(&event.to_bytes());
        }
        if !committed {
            return None;
        }
        info!(
            gesture = stable.name(),
            notes = ?self.machine.active_notes(),
            "gesture committed"
        );
        Some(stable)
    }

    /// Release all sounding notes, e.g. on shutdown.
    pub fn silence(&mut self) {
        for event in self.machine.silence() {
            self.midi.send(&event.to_bytes());
        }
    }

    pub fn active_notes(&self) -> &[u8] {
        self.machine.active_notes()
    }

    pub fn last_gesture(&self) -> Option<GestureLabel> {
        self.machine.last_gesture()
    }

    pub fn hand_in_view(&self) -> bool {
        self.latest.is_some()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{pose_frame, Pose};
    use std::sync::{Arc, Mutex};

    /// MIDI sink that records every byte triple for inspection.
    struct CaptureOut {
        sent: Arc<Mutex<Vec<[u8; 3]>>>,
    }

    impl MidiOut for CaptureOut {
        fn send(&mut self, msg: &[u8; 3]) {
            self.sent.lock().unwrap().push(*msg);
        }
    }

    fn capture_session() -> (Session, Arc<Mutex<Vec<[u8; 3]>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let midi = Box::new(CaptureOut { sent: Arc::clone(&sent) });
        (Session::new(HarmonyMap::default(), 100, midi), sent)
    }

    #[test]
    fn gate_round_trip() {
        let mut gate = DetectionGate::Idle;
        assert!(gate.is_idle());
        gate.request_sent();
        assert!(!gate.is_idle());
        gate.result_received();
        assert!(gate.is_idle());
    }

    #[test]
    fn frame_to_wire_bytes() {
        let (mut session, sent) = capture_session();
        session.latch(Pose::OneFinger.detect());
        assert_eq!(session.step(), Some(GestureLabel::OneFinger));
        assert_eq!(*sent.lock().unwrap(), vec![[0x90, 63, 100]]);
        assert_eq!(session.active_notes(), &[63]);
    }

    #[test]
    fn reused_latch_does_not_retrigger() {
        let (mut session, sent) = capture_session();
        session.latch(Pose::TwoFingers.detect());
        session.step();
        // The detector is slow: the same latched frame is processed again
        // and again without producing new events.
        for _ in 0..10 {
            assert_eq!(session.step(), None);
        }
        assert_eq!(sent.lock().unwrap().len(), 2);
    }

    #[test]
    fn no_hand_step_is_a_no_op() {
        let (mut session, sent) = capture_session();
        assert_eq!(session.step(), None);
        assert!(sent.lock().unwrap().is_empty());
        assert!(!session.hand_in_view());
    }

    #[test]
    fn notes_stick_through_fifty_frames_of_hand_loss() {
        let (mut session, sent) = capture_session();
        session.latch(Pose::OneFinger.detect());
        session.step();
        assert_eq!(session.active_notes(), &[63]);

        session.latch(None);
        let before = sent.lock().unwrap().len();
        for _ in 0..50 {
            assert_eq!(session.step(), None);
        }
        // No auto-release: the note keeps sounding the whole time.
        assert_eq!(session.active_notes(), &[63]);
        assert_eq!(sent.lock().unwrap().len(), before);
    }

    #[test]
    fn redetection_with_same_gesture_stays_silent() {
        let (mut session, sent) = capture_session();
        session.latch(Pose::OneFinger.detect());
        session.step();
        session.latch(None);
        session.step();
        // Hand comes back making the same gesture: still no transition.
        session.latch(Pose::OneFinger.detect());
        assert_eq!(session.step(), None);
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn stabilizer_filters_single_frame_flicker_before_the_machine() {
        let (mut session, sent) = capture_session();
        for _ in 0..6 {
            session.latch(Pose::Fist.detect());
            session.step();
        }
        // One glitch frame of OpenHand must not trigger a chord.
        session.latch(Pose::OpenHand.detect());
        assert_eq!(session.step(), None);
        assert!(sent.lock().unwrap().is_empty()); // Fist itself is silent
        assert_eq!(session.last_gesture(), Some(GestureLabel::Fist));
    }

    #[test]
    fn open_hand_to_two_fingers_over_the_wire() {
        let (mut session, sent) = capture_session();
        // Hold each pose long enough for the stabilizer window to flip.
        for _ in 0..6 {
            session.latch(Pose::OpenHand.detect());
            session.step();
        }
        assert_eq!(session.active_notes(), &[58, 60, 63, 65, 67]);
        sent.lock().unwrap().clear();

        for _ in 0..6 {
            session.latch(Pose::TwoFingers.detect());
            session.step();
        }
        let bytes = sent.lock().unwrap().clone();
        assert_eq!(
            bytes,
            vec![
                [0x80, 58, 0],
                [0x80, 60, 0],
                [0x80, 63, 0],
                [0x80, 65, 0],
                [0x80, 67, 0],
                [0x90, 63, 100],
                [0x90, 65, 100],
            ]
        );
        assert_eq!(session.active_notes(), &[63, 65]);
    }

    #[test]
    fn silence_sends_offs_for_active_notes() {
        let (mut session, sent) = capture_session();
        session.latch(Pose::TwoFingers.detect());
        session.step();
        sent.lock().unwrap().clear();

        session.silence();
        assert_eq!(*sent.lock().unwrap(), vec![[0x80, 63, 0], [0x80, 65, 0]]);
        assert!(session.active_notes().is_empty());
    }

    #[test]
    fn malformed_landmarks_never_reach_the_session() {
        // Fewer than 21 points cannot construct a HandFrame at all, so the
        // caller latches None and the frame behaves like hand loss.
        use hand_stream::{HandFrame, Landmark};
        let short = [Landmark::default(); 12];
        let (mut session, _) = capture_session();
        session.latch(HandFrame::from_points(&short));
        assert_eq!(session.step(), None);
    }

    #[test]
    fn pose_frame_and_detect_agree() {
        let frame = pose_frame([false, true, true, false, false]);
        assert_eq!(Pose::TwoFingers.detect().unwrap(), frame);
    }
}
