//! The interactive shell: session state plus the components it sequences.

mod input;
mod markdown;
mod session;
pub mod tui;

pub use session::{Notice, Phase, Session};

use crate::client::TextGenerator;
use crate::export::{self, Download};
use crate::prompt::PromptTemplate;

/// Wires the template, the generator and the exporter around one [`Session`].
pub struct Shell<G> {
    session: Session,
    template: PromptTemplate,
    generator: Option<G>,
}

impl<G: TextGenerator> Shell<G> {
    pub fn new(template: PromptTemplate, generator: G) -> Self {
        Self {
            session: Session::new(),
            template,
            generator: Some(generator),
        }
    }

    /// A shell that could not be configured. It shows `message` and does
    /// nothing else.
    pub fn halted(message: impl Into<String>) -> Self {
        Self {
            session: Session::halted(message),
            template: PromptTemplate::default(),
            generator: None,
        }
    }

    /// Read-only view of the session. Transitions happen only through
    /// [`Shell::generate`] and [`Shell::download`]; outside this crate there
    /// is no mutable access:
    ///
    /// ```compile_fail
    /// # use longform::{GeminiClient, Shell};
    /// let mut shell: Shell<GeminiClient> = Shell::halted("no key");
    /// shell.session_mut().receive_success(String::new());
    /// ```
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Generate content for `brief`.
    ///
    /// Does nothing unless the session accepts the submission. The session
    /// is in [`Phase::Generating`] for the duration of the call.
    pub async fn generate(&mut self, brief: &str) {
        self.generate_with(brief, |_| {}).await;
    }

    /// Like [`Shell::generate`], calling `on_start` once the session has
    /// entered [`Phase::Generating`] and before the request goes out.
    pub async fn generate_with(&mut self, brief: &str, on_start: impl FnOnce(&Session)) {
        let Some(generator) = &self.generator else {
            return;
        };
        if !self.session.submit(brief) {
            return;
        }
        on_start(&self.session);

        let prompt = self.template.render(brief);
        match generator.generate(&prompt).await {
            Ok(text) => self.session.receive_success(text),
            Err(e) => {
                tracing::warn!(error = %e, "generation failed");
                self.session.receive_error(e);
            }
        }
    }

    /// Export the current content, if there is any.
    ///
    /// A failure is recorded on the session and gives `None`.
    pub fn download(&mut self) -> Option<Download> {
        if !self.session.can_download() {
            return None;
        }
        let text = self.session.content()?;
        match export::document(text) {
            Ok(download) => Some(download),
            Err(e) => {
                tracing::warn!(error = %e, "export failed");
                self.session.export_failed(e);
                None
            }
        }
    }
}
