//! # sketch-live
//!
//! Literal hot-patching for live-coded sketches.
//!
//! A sketch is edited continuously while it runs. Most edits only tweak constants (a color, a
//! speed, a label), and those should reach the running program without a restart. This crate
//! decides, edit by edit, whether that is possible:
//!
//! - every literal of the program is moved into a table under a key derived from its
//!   surroundings, and the program is rewritten to read from the table;
//! - each new version of the source is compared with the last rendered one, ignoring literal
//!   values and formatting. If nothing else changed, only the new table needs to be sent.
//!
//! The entry point for hosts is [`live::LiveSession`]. Parsing and printing of the sketch
//! language live in [`live::parsing`] and [`live::formats`].
//!
//! File Layout
//!
//! src/live
//!   ├── lexing        Tokens (logos)
//!   ├── parsing       Grammar (chumsky) and normalization
//!   ├── ast           Tree nodes, locations, the literal walker
//!   ├── formats       Canonical printer
//!   ├── extraction    Keys, literal table, rewriting
//!   ├── diffing       Structural comparison
//!   ├── session       Snapshot and edit handling
//!   └── config        Layered configuration

pub mod live;
