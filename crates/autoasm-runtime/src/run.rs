#![forbid(unsafe_code)]

//! Invocation boundary.

use std::fmt;

use autoasm_core::{ItemIdError, LookupError, Platform};
use autoasm_text::RenderMode;

use crate::session::Session;

/// What an invocation produced once flushed.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    /// Full buffer text, including the closing `Done` line if printed.
    pub text: String,
    /// Text written to each panel, in panel order.
    pub pages: Vec<String>,
    pub mode: RenderMode,
}

/// Failure that escapes an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fatal {
    /// No panel was found, so the buffer had nowhere to go.
    NoDisplay { transcript: String },
}

impl fmt::Display for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDisplay { transcript } => write!(f, "\n\n{transcript}"),
        }
    }
}

impl std::error::Error for Fatal {}

/// Error raised inside a program body.
///
/// Printed into the buffer; never escapes the invocation.
#[derive(Debug)]
pub enum ProgramError {
    Lookup(LookupError),
    Item(ItemIdError),
    Other(String),
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lookup(e) => write!(f, "{e}"),
            Self::Item(e) => write!(f, "{e}"),
            Self::Other(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ProgramError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Lookup(e) => Some(e),
            Self::Item(e) => Some(e),
            Self::Other(_) => None,
        }
    }
}

impl From<LookupError> for ProgramError {
    fn from(e: LookupError) -> Self {
        Self::Lookup(e)
    }
}

impl From<ItemIdError> for ProgramError {
    fn from(e: ItemIdError) -> Self {
        Self::Item(e)
    }
}

impl From<String> for ProgramError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}

/// Run one program against `platform`.
///
/// `launch` is the already-incremented launch counter. A program error is
/// printed into the buffer and the buffer is still flushed; only a missing
/// display escapes.
pub fn run_invocation<P, F>(
    platform: &mut P,
    launch: u64,
    argument: &str,
    program: F,
) -> Result<Transcript, Fatal>
where
    P: Platform + ?Sized,
    F: FnOnce(&mut Session<'_, P>) -> Result<(), ProgramError>,
{
    let _span = tracing::info_span!("invocation", launch).entered();
    let mut session = Session::open(platform, launch).with_argument(argument);
    if let Err(err) = program(&mut session) {
        tracing::warn!(error = %err, "program failed");
        session.print_error(&err);
    }
    let result = session.finish();
    match &result {
        Ok(transcript) => tracing::info!(pages = transcript.pages.len(), "invocation complete"),
        Err(fatal) => tracing::error!(error = ?fatal, "invocation has no display"),
    }
    result
}
