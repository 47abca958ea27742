//! # hand_stream
//!
//! The per-frame decision pipeline for a single tracked hand:
//!
//! ```text
//! 21 landmarks → FingerStates → GestureLabel → GestureStabilizer → stable label
//! ```
//!
//! Every stage is a pure function of its input except the stabilizer, which
//! keeps a short sliding window of raw labels to absorb single-frame
//! classification flicker.
//!
//! ## Gesture table
//!
//! | extended fingers | label |
//! |---|---|
//! | 0 | `Fist` |
//! | 1 | `OneFinger` |
//! | 2 | `TwoFingers` |
//! | 3 | `ThreeFingers` |
//! | 4 | `Other` |
//! | 5 | `OpenHand` |
//!
//! Four extended fingers deliberately fall into the `Other` catch-all — the
//! mapping table has no dedicated 4-finger gesture and that gap is kept
//! as-is rather than extended.
//!
//! ## Coordinate convention
//!
//! Landmarks are normalized to `[0,1]×[0,1]` with the origin at the top-left
//! of the frame, so *smaller* `y` means *higher* in the image. The extension
//! test is a screen-space heuristic (tip above pip), which makes it sensitive
//! to hand rotation; that is an accepted limitation of the approach.

use std::collections::VecDeque;

// ════════════════════════════════════════════════════════════════════════════
// Landmark — one normalized 2D point
// ════════════════════════════════════════════════════════════════════════════

/// A normalized 2D point locating one anatomical joint of a tracked hand.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Landmark { x, y }
    }
}

/// Number of landmarks per detected hand (MediaPipe-style hand topology).
pub const LANDMARK_COUNT: usize = 21;

// Anatomical indices into the 21-point set. Wrist is 0; each finger runs
// base-to-tip along four consecutive indices.
pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

// ════════════════════════════════════════════════════════════════════════════
// HandFrame — one frame's worth of landmarks
// ════════════════════════════════════════════════════════════════════════════

/// Exactly [`LANDMARK_COUNT`] landmarks from one detection result.
///
/// Construction is the only place the landmark count is checked: a detector
/// that hands over fewer than 21 points yields `None`, which callers treat
/// the same as "no hand this frame".
#[derive(Clone, Debug, PartialEq)]
pub struct HandFrame {
    points: [Landmark; LANDMARK_COUNT],
}

impl HandFrame {
    /// Build a frame from a landmark slice. Returns `None` unless at least
    /// 21 points are present; extra points are ignored.
    pub fn from_points(points: &[Landmark]) -> Option<Self> {
        if points.len() < LANDMARK_COUNT {
            return None;
        }
        let mut arr = [Landmark::default(); LANDMARK_COUNT];
        arr.copy_from_slice(&points[..LANDMARK_COUNT]);
        Some(HandFrame { points: arr })
    }

    pub fn point(&self, idx: usize) -> Landmark {
        self.points[idx]
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Finger / FingerStates
// ════════════════════════════════════════════════════════════════════════════

/// The five fingers, in anatomical order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// Landmark index of this finger's tip.
    pub fn tip(self) -> usize {
        match self {
            Finger::Thumb => THUMB_TIP,
            Finger::Index => INDEX_TIP,
            Finger::Middle => MIDDLE_TIP,
            Finger::Ring => RING_TIP,
            Finger::Pinky => PINKY_TIP,
        }
    }

    /// Landmark index of this finger's pip joint (thumb: ip joint).
    pub fn pip(self) -> usize {
        match self {
            Finger::Thumb => 3,
            Finger::Index => INDEX_PIP,
            Finger::Middle => MIDDLE_PIP,
            Finger::Ring => RING_PIP,
            Finger::Pinky => PINKY_PIP,
        }
    }
}

/// One frame's extended/curled flag per finger. Recomputed from raw
/// landmarks every frame; carries no history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerStates {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerStates {
    pub fn from_flags(flags: [bool; 5]) -> Self {
        FingerStates {
            thumb: flags[0],
            index: flags[1],
            middle: flags[2],
            ring: flags[3],
            pinky: flags[4],
        }
    }

    pub fn get(&self, finger: Finger) -> bool {
        match finger {
            Finger::Thumb => self.thumb,
            Finger::Index => self.index,
            Finger::Middle => self.middle,
            Finger::Ring => self.ring,
            Finger::Pinky => self.pinky,
        }
    }

    /// Number of fingers currently held extended.
    pub fn extended_count(&self) -> usize {
        Finger::ALL.iter().filter(|&&f| self.get(f)).count()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Finger-state extraction
// ════════════════════════════════════════════════════════════════════════════

/// Minimum horizontal tip-to-index-mcp spread (normalized units) for the
/// thumb to count as extended.
pub const THUMB_SPREAD_MIN: f32 = 0.05;

/// Derive the per-finger extension flags from one frame's raw landmarks.
///
/// Non-thumb fingers: extended iff the tip is strictly above the pip joint
/// in image space (`tip.y < pip.y`). The thumb folds across the palm rather
/// than curling downward, so it gets a horizontal test instead: extended iff
/// its tip is more than [`THUMB_SPREAD_MIN`] away from the index-finger mcp
/// on the x axis.
///
/// No smoothing or outlier rejection happens here — each frame stands alone,
/// and flicker is the stabilizer's problem.
pub fn finger_states(frame: &HandFrame) -> FingerStates {
    let index_mcp = frame.point(INDEX_MCP);
    let mut flags = [false; 5];
    for (i, finger) in Finger::ALL.iter().enumerate() {
        let tip = frame.point(finger.tip());
        flags[i] = match finger {
            Finger::Thumb => (tip.x - index_mcp.x).abs() > THUMB_SPREAD_MIN,
            _ => tip.y < frame.point(finger.pip()).y,
        };
    }
    FingerStates::from_flags(flags)
}

// ════════════════════════════════════════════════════════════════════════════
// GestureLabel — coarse discrete gesture
// ════════════════════════════════════════════════════════════════════════════

/// Coarse gesture label, determined purely by the extended-finger count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureLabel {
    Fist,
    OneFinger,
    TwoFingers,
    ThreeFingers,
    OpenHand,
    Other,
}

impl GestureLabel {
    pub const ALL: [GestureLabel; 6] = [
        GestureLabel::Fist,
        GestureLabel::OneFinger,
        GestureLabel::TwoFingers,
        GestureLabel::ThreeFingers,
        GestureLabel::OpenHand,
        GestureLabel::Other,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GestureLabel::Fist => "Fist",
            GestureLabel::OneFinger => "1 Finger",
            GestureLabel::TwoFingers => "2 Fingers",
            GestureLabel::ThreeFingers => "3 Fingers",
            GestureLabel::OpenHand => "Open Hand",
            GestureLabel::Other => "Other",
        }
    }

    // Dense index used for counting in the stabilizer window.
    fn ordinal(self) -> usize {
        match self {
            GestureLabel::Fist => 0,
            GestureLabel::OneFinger => 1,
            GestureLabel::TwoFingers => 2,
            GestureLabel::ThreeFingers => 3,
            GestureLabel::OpenHand => 4,
            GestureLabel::Other => 5,
        }
    }
}

impl std::fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Map a finger-state set to its gesture label.
///
/// Four extended fingers land in `Other` — the table's intentional gap.
pub fn classify(states: &FingerStates) -> GestureLabel {
    match states.extended_count() {
        0 => GestureLabel::Fist,
        1 => GestureLabel::OneFinger,
        2 => GestureLabel::TwoFingers,
        3 => GestureLabel::ThreeFingers,
        5 => GestureLabel::OpenHand,
        _ => GestureLabel::Other,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureStabilizer — majority vote over a short sliding window
// ════════════════════════════════════════════════════════════════════════════

/// Default stabilizer window length, in frames.
pub const STABILIZER_WINDOW: usize = 6;

/// Smooths the raw per-frame label sequence into a stable label.
///
/// Keeps the most recent N raw labels in a ring buffer and returns the
/// majority label of the window on every observation. Ties break toward
/// whichever label *first* reached the winning count, scanning the window
/// oldest to newest: a label only takes the lead when its running count
/// strictly exceeds the current maximum, so the incumbent survives equal
/// counts. Feeding `[Fist×3, OneFinger×3]` therefore stays `Fist`.
#[derive(Clone, Debug)]
pub struct GestureStabilizer {
    window: VecDeque<GestureLabel>,
    capacity: usize,
}

impl GestureStabilizer {
    pub fn new() -> Self {
        Self::with_capacity(STABILIZER_WINDOW)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "stabilizer window must be non-empty");
        GestureStabilizer {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push one raw label and return the stable label for this frame.
    pub fn observe(&mut self, label: GestureLabel) -> GestureLabel {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(label);

        let mut counts = [0usize; GestureLabel::ALL.len()];
        let mut max = 0;
        let mut leader = label;
        for &l in &self.window {
            counts[l.ordinal()] += 1;
            if counts[l.ordinal()] > max {
                max = counts[l.ordinal()];
                leader = l;
            }
        }
        leader
    }

    /// Raw labels currently in the window, oldest first.
    pub fn window(&self) -> impl Iterator<Item = GestureLabel> + '_ {
        self.window.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

impl Default for GestureStabilizer {
    fn default() -> Self {
        Self::new()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use GestureLabel::*;

    /// Build a synthetic frame whose extraction yields exactly `flags`
    /// (thumb, index, middle, ring, pinky).
    fn frame_with(flags: [bool; 5]) -> HandFrame {
        let mut pts = [Landmark::new(0.5, 0.5); LANDMARK_COUNT];
        pts[WRIST] = Landmark::new(0.5, 0.9);
        pts[INDEX_MCP] = Landmark::new(0.5, 0.6);
        // Thumb: horizontal spread from the index mcp.
        pts[THUMB_TIP].x = if flags[0] { 0.62 } else { 0.52 };
        // Other fingers: tip strictly above / below the pip.
        for (i, finger) in Finger::ALL.iter().enumerate().skip(1) {
            pts[finger.pip()].y = 0.5;
            pts[finger.tip()].y = if flags[i] { 0.3 } else { 0.7 };
        }
        HandFrame::from_points(&pts).unwrap()
    }

    #[test]
    fn short_landmark_slice_is_rejected() {
        let pts = [Landmark::default(); 20];
        assert!(HandFrame::from_points(&pts).is_none());
    }

    #[test]
    fn extra_landmarks_are_ignored() {
        let pts = [Landmark::default(); 25];
        assert!(HandFrame::from_points(&pts).is_some());
    }

    #[test]
    fn all_curled_yields_no_extended() {
        let states = finger_states(&frame_with([false; 5]));
        assert_eq!(states.extended_count(), 0);
    }

    #[test]
    fn all_extended_yields_five() {
        let states = finger_states(&frame_with([true; 5]));
        assert_eq!(states.extended_count(), 5);
    }

    #[test]
    fn index_only() {
        let states = finger_states(&frame_with([false, true, false, false, false]));
        assert!(states.index);
        assert_eq!(states.extended_count(), 1);
    }

    #[test]
    fn tip_level_with_pip_is_not_extended() {
        // The comparison is strict: equal heights count as curled.
        let mut pts = *frame_with([false; 5]).points();
        pts[INDEX_TIP].y = pts[INDEX_PIP].y;
        let frame = HandFrame::from_points(&pts).unwrap();
        assert!(!finger_states(&frame).index);
    }

    #[test]
    fn thumb_spread_at_threshold_is_not_extended() {
        let mut pts = *frame_with([false; 5]).points();
        // Anchor the mcp at zero so the spread computes to the threshold
        // exactly; the comparison is strict, so this stays curled.
        pts[INDEX_MCP].x = 0.0;
        pts[THUMB_TIP].x = THUMB_SPREAD_MIN;
        let frame = HandFrame::from_points(&pts).unwrap();
        assert!(!finger_states(&frame).thumb);
    }

    #[test]
    fn thumb_spread_works_in_both_directions() {
        let mut pts = *frame_with([false; 5]).points();
        pts[THUMB_TIP].x = pts[INDEX_MCP].x - 0.1;
        let frame = HandFrame::from_points(&pts).unwrap();
        assert!(finger_states(&frame).thumb);
    }

    #[test]
    fn classification_table() {
        let by_count = |n: usize| {
            let mut flags = [false; 5];
            for f in flags.iter_mut().take(n) {
                *f = true;
            }
            classify(&FingerStates::from_flags(flags))
        };
        assert_eq!(by_count(0), Fist);
        assert_eq!(by_count(1), OneFinger);
        assert_eq!(by_count(2), TwoFingers);
        assert_eq!(by_count(3), ThreeFingers);
        assert_eq!(by_count(4), Other);
        assert_eq!(by_count(5), OpenHand);
    }

    #[test]
    fn four_extended_is_other_for_any_combination() {
        // The count alone decides, not which finger is curled.
        for curled in 0..5 {
            let mut flags = [true; 5];
            flags[curled] = false;
            assert_eq!(classify(&FingerStates::from_flags(flags)), Other);
        }
    }

    #[test]
    fn stabilizer_single_observation_is_stable() {
        let mut st = GestureStabilizer::new();
        assert_eq!(st.observe(OpenHand), OpenHand);
    }

    #[test]
    fn stabilizer_absorbs_one_frame_glitch() {
        let mut st = GestureStabilizer::new();
        for _ in 0..5 {
            st.observe(Fist);
        }
        // A single stray OpenHand must not flip the stable label.
        assert_eq!(st.observe(OpenHand), Fist);
    }

    #[test]
    fn stabilizer_tie_breaks_toward_earliest_leader() {
        // Fist reaches count 3 at window index 2, OneFinger only at index 5,
        // so the 3-vs-3 tie resolves to Fist.
        let mut st = GestureStabilizer::new();
        let mut last = Fist;
        for label in [Fist, Fist, Fist, OneFinger, OneFinger, OneFinger] {
            last = st.observe(label);
        }
        assert_eq!(last, Fist);
    }

    #[test]
    fn stabilizer_newcomer_wins_once_it_exceeds() {
        let mut st = GestureStabilizer::new();
        for label in [Fist, Fist, OneFinger, OneFinger, OneFinger] {
            st.observe(label);
        }
        assert_eq!(st.observe(OneFinger), OneFinger);
    }

    #[test]
    fn stabilizer_evicts_oldest_beyond_capacity() {
        let mut st = GestureStabilizer::new();
        for _ in 0..6 {
            st.observe(Fist);
        }
        // Six OpenHand frames fully flush the six Fist entries.
        let mut last = Fist;
        for _ in 0..6 {
            last = st.observe(OpenHand);
        }
        assert_eq!(last, OpenHand);
        assert_eq!(st.len(), 6);
        assert!(st.window().all(|l| l == OpenHand));
    }

    #[test]
    fn stabilizer_is_deterministic() {
        let seq = [OneFinger, TwoFingers, OneFinger, Fist, TwoFingers];
        let run = || {
            let mut st = GestureStabilizer::new();
            seq.iter().map(|&l| st.observe(l)).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn full_pipeline_frame_to_label() {
        let frame = frame_with([false, true, true, false, false]);
        assert_eq!(classify(&finger_states(&frame)), TwoFingers);
    }
}
