//! Session state for the form.
//!
//! The session is the only mutable state in the program. It moves between
//! phases through the transition methods below and nowhere else.

use std::path::Path;

/// Where the form is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing generated yet
    Idle,

    /// A request is in flight - the form takes no input
    Generating,

    /// Content is on screen and can be downloaded
    Ready,

    /// Configuration failed - nothing else will happen this session
    Halted,
}

/// A message for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Success(s) | Notice::Info(s) | Notice::Error(s) => s,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    content: Option<String>,
    notice: Option<Notice>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            content: None,
            notice: None,
        }
    }

    /// A session that failed configuration; `message` stays on screen.
    pub fn halted(message: impl Into<String>) -> Self {
        Self {
            phase: Phase::Halted,
            content: None,
            notice: Some(Notice::Error(message.into())),
        }
    }

    /// Try to start a generation for `brief`.
    ///
    /// Returns `false` (and changes nothing) for an empty brief, a halted
    /// session, or one that is already generating.
    pub fn submit(&mut self, brief: &str) -> bool {
        if brief.is_empty() || matches!(self.phase, Phase::Halted | Phase::Generating) {
            return false;
        }
        self.phase = Phase::Generating;
        self.notice = None;
        true
    }

    /// The in-flight request returned `text`. Any earlier content is replaced.
    pub fn receive_success(&mut self, text: String) {
        self.content = Some(text);
        self.phase = Phase::Ready;
        self.notice = Some(Notice::Success("Content generated successfully!".to_string()));
    }

    /// The in-flight request failed. Earlier content, if any, stays.
    pub fn receive_error(&mut self, message: impl std::fmt::Display) {
        self.phase = self.resting_phase();
        self.notice = Some(Notice::Error(format!("An error occurred: {message}")));
    }

    pub fn export_succeeded(&mut self, path: &Path) {
        self.notice = Some(Notice::Info(format!("Saved {}", path.display())));
    }

    pub fn export_failed(&mut self, message: impl std::fmt::Display) {
        self.notice = Some(Notice::Error(format!(
            "An error occurred during file creation: {message}"
        )));
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The last generated text, if any.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn can_download(&self) -> bool {
        self.phase == Phase::Ready && self.content.is_some()
    }

    fn resting_phase(&self) -> Phase {
        if self.content.is_some() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
