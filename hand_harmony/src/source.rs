//! Landmark acquisition seam — simulated and scripted detectors.
//!
//! The public interface is the [`LandmarkSource`] trait plus a pair of
//! `mpsc` channels: the driver posts a [`DetectionRequest`], the source
//! answers each request with exactly one [`DetectionResult`]. The driver
//! never has more than one request outstanding (see
//! [`DetectionGate`](crate::session::DetectionGate)), so a source is free to
//! take as long as a real detector would.
//!
//! Consumers don't need to know whether frames came from a real detector or
//! one of the stand-ins here.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use hand_stream::{
    Finger, HandFrame, Landmark, INDEX_MCP, LANDMARK_COUNT, THUMB_TIP, WRIST,
};

// ════════════════════════════════════════════════════════════════════════════
// Request / result
// ════════════════════════════════════════════════════════════════════════════

/// One detection request, tagged with the driver's frame counter.
#[derive(Clone, Copy, Debug)]
pub struct DetectionRequest {
    pub frame: u64,
}

/// What a detector answers with: a full hand frame, or `None` for no hand.
pub type DetectionResult = Option<HandFrame>;

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait — unified interface for detector stand-ins
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can answer [`DetectionRequest`]s on its own thread.
pub trait LandmarkSource: Send + 'static {
    fn run(self: Box<Self>, req_rx: Receiver<DetectionRequest>, res_tx: Sender<DetectionResult>);
}

/// Spawn a landmark source on its own thread and return the driver's ends
/// of the request/response channels.
pub fn spawn_landmark_source<S: LandmarkSource>(
    source: S,
) -> (Sender<DetectionRequest>, Receiver<DetectionResult>) {
    let (req_tx, req_rx) = mpsc::channel();
    let (res_tx, res_rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(req_rx, res_tx));
    (req_tx, res_rx)
}

// ════════════════════════════════════════════════════════════════════════════
// Pose — canned hand shapes for the stand-in detectors
// ════════════════════════════════════════════════════════════════════════════

/// A hand shape a stand-in detector can synthesize.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pose {
    NoHand,
    Fist,
    OneFinger,
    TwoFingers,
    ThreeFingers,
    FourFingers,
    OpenHand,
}

impl Pose {
    /// Per-finger extension flags (thumb, index, middle, ring, pinky), or
    /// `None` when no hand is in view.
    pub fn flags(self) -> Option<[bool; 5]> {
        match self {
            Pose::NoHand => None,
            Pose::Fist => Some([false; 5]),
            Pose::OneFinger => Some([false, true, false, false, false]),
            Pose::TwoFingers => Some([false, true, true, false, false]),
            Pose::ThreeFingers => Some([false, true, true, true, false]),
            Pose::FourFingers => Some([false, true, true, true, true]),
            Pose::OpenHand => Some([true; 5]),
        }
    }

    /// Parse the one-key pose commands used by the sim prompt.
    pub fn parse(s: &str) -> Option<Pose> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" => Some(Pose::NoHand),
            "f" | "0" => Some(Pose::Fist),
            "1" => Some(Pose::OneFinger),
            "2" => Some(Pose::TwoFingers),
            "3" => Some(Pose::ThreeFingers),
            "4" => Some(Pose::FourFingers),
            "o" | "5" => Some(Pose::OpenHand),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Pose::NoHand => "no hand",
            Pose::Fist => "fist",
            Pose::OneFinger => "1 finger",
            Pose::TwoFingers => "2 fingers",
            Pose::ThreeFingers => "3 fingers",
            Pose::FourFingers => "4 fingers",
            Pose::OpenHand => "open hand",
        }
    }

    /// The detection result a perfect detector would return for this pose.
    pub fn detect(self) -> DetectionResult {
        self.flags().map(pose_frame)
    }
}

/// Synthesize a 21-landmark frame whose finger-state extraction yields
/// exactly `flags`. Geometry is schematic — a palm around mid-frame, tips
/// raised above or dropped below their pip joints, thumb spread sideways
/// when extended.
pub fn pose_frame(flags: [bool; 5]) -> HandFrame {
    let mut pts = [Landmark::new(0.5, 0.55); LANDMARK_COUNT];
    pts[WRIST] = Landmark::new(0.5, 0.85);
    pts[INDEX_MCP] = Landmark::new(0.45, 0.6);

    // Thumb: only the horizontal tip-to-index-mcp spread matters.
    pts[THUMB_TIP] = if flags[0] {
        Landmark::new(0.45 - 0.12, 0.6)
    } else {
        Landmark::new(0.45 - 0.02, 0.6)
    };

    // Remaining fingers: place each pip at mid-palm height and the tip
    // strictly above (extended) or below (curled) it.
    for (i, finger) in Finger::ALL.iter().enumerate().skip(1) {
        let x = 0.45 + 0.05 * i as f32;
        pts[finger.pip()] = Landmark::new(x, 0.5);
        pts[finger.tip()] = if flags[i] {
            Landmark::new(x, 0.3)
        } else {
            Landmark::new(x, 0.65)
        };
    }

    HandFrame::from_points(&pts).expect("pose frames always carry 21 points")
}

// ════════════════════════════════════════════════════════════════════════════
// SimSource — interactive stand-in detector
// ════════════════════════════════════════════════════════════════════════════

/// Detector stand-in driven by [`Pose`] commands (from the stdin prompt).
///
/// Holds the most recently commanded pose and answers every detection
/// request with a fresh synthetic frame for it, after a fixed simulated
/// detector latency. Exits when either channel closes.
pub struct SimSource {
    pub pose_rx: Receiver<Pose>,
    pub latency: Duration,
}

impl LandmarkSource for SimSource {
    fn run(self: Box<Self>, req_rx: Receiver<DetectionRequest>, res_tx: Sender<DetectionResult>) {
        let mut current = Pose::NoHand;
        for _req in req_rx {
            loop {
                match self.pose_rx.try_recv() {
                    Ok(pose) => current = pose,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }
            thread::sleep(self.latency);
            if res_tx.send(current.detect()).is_err() {
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ScriptedSource — fixed replay, one pose per request
// ════════════════════════════════════════════════════════════════════════════

/// Detector stand-in that replays a fixed pose sequence, one pose per
/// request, then hangs up. Used by the `--demo` mode and the loop tests.
pub struct ScriptedSource {
    pub frames: Vec<Pose>,
    pub latency: Duration,
}

impl LandmarkSource for ScriptedSource {
    fn run(self: Box<Self>, req_rx: Receiver<DetectionRequest>, res_tx: Sender<DetectionResult>) {
        let mut frames = self.frames.into_iter();
        for _req in req_rx {
            let pose = match frames.next() {
                Some(p) => p,
                None => return,
            };
            if !self.latency.is_zero() {
                thread::sleep(self.latency);
            }
            if res_tx.send(pose.detect()).is_err() {
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
