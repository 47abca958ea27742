//! # hand_harmony
//!
//! Gesture-controlled harmony: a frame-driven session that turns a stream of
//! hand-landmark detections into MIDI note-on/note-off events on a live
//! output port.
//!
//! ## Pipeline
//!
//! ```text
//! landmark source ──▶ finger states ──▶ gesture label ──▶ stabilizer
//!                                                             │
//!                      MIDI port ◀── note machine ◀── stable gesture
//! ```
//!
//! The decision stages live in the `hand_stream` and `gesture_midi` crates;
//! this crate supplies the seams around them — landmark acquisition, MIDI
//! output, the session context and the frame loop.
//!
//! ## Pose → harmony (base note 60)
//!
//! | pose | notes |
//! |---|---|
//! | fist | silence |
//! | 1 finger | 63 |
//! | 2 fingers | 63 65 |
//! | 3 fingers | 58 63 65 |
//! | open hand | 58 60 63 65 67 |
//! | 4 fingers / other | silence |
//!
//! ## Modes
//!
//! * (default) — **Simulation**: type poses at a prompt; a stand-in detector
//!   synthesizes matching landmark frames.
//! * `--demo` — replay a canned pose script and exit.
//!
//! A real detector plugs in by implementing [`source::LandmarkSource`]; the
//! session never learns where its frames come from.

pub mod app;
pub mod output;
pub mod session;
pub mod source;
