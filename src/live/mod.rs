//! Main module for sketch-live functionality

pub mod ast;
pub mod config;
pub mod diffing;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod lexing;
pub mod parsing;
pub mod session;

pub use config::{Binding, LiveConfig, Loader};
pub use error::{LiveError, ParseError};
pub use extraction::{collect_vars, extract, patch_vars, Extraction, LiteralTable};
pub use session::{ExtractOutcome, LiveSession, PatchMessage, Update};
