//! Terminal rendering of the form.
//!
//! One screen: brief input, generated content, a status line, and key help.
//! Each action runs to completion before the next key is read.

use std::io;
use std::path::{Path, PathBuf};

use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use ratatui::layout::{Constraint, Layout, Position};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::{DefaultTerminal, Frame};

use super::input::BriefInput;
use super::markdown;
use super::{Notice, Phase, Session, Shell};
use crate::client::TextGenerator;
use crate::export::Download;

const TITLE: &str = "Long-Form Content Generator";

const DESCRIPTION: &str = "Gemini writes long-form content from your brief. \
     Include audience, tone of voice, keywords, structure, key points and what to avoid. \
     Export the result to a Word document when you are happy with it.";

const PLACEHOLDER: &str =
    "E.g., Write a 1500-word blog post about the benefits of remote work for small businesses...";

const SCROLL_STEP: u16 = 10;

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    None,
    Generate,
    Download,
    Quit,
}

/// Run the form until the user quits. Downloads are saved in `output_dir`.
pub async fn run<G: TextGenerator>(shell: Shell<G>, output_dir: PathBuf) -> io::Result<()> {
    let mut terminal = ratatui::try_init()?;
    execute!(io::stdout(), EnableBracketedPaste)?;

    let result = App::new(shell, output_dir).run_loop(&mut terminal).await;

    // Restore the terminal even when the loop failed
    let _ = execute!(io::stdout(), DisableBracketedPaste);
    ratatui::restore();
    result
}

struct App<G> {
    shell: Shell<G>,
    input: BriefInput,
    scroll: u16,
    output_dir: PathBuf,
}

impl<G: TextGenerator> App<G> {
    fn new(shell: Shell<G>, output_dir: PathBuf) -> Self {
        Self {
            shell,
            input: BriefInput::new(),
            scroll: 0,
            output_dir,
        }
    }

    async fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        loop {
            terminal.draw(|frame| draw(frame, self.shell.session(), &self.input, self.scroll))?;

            match self.handle(event::read()?) {
                Action::Quit => return Ok(()),
                Action::Generate => self.generate(terminal).await?,
                Action::Download => self.download(),
                Action::None => {}
            }
        }
    }

    /// Apply an input event to the form and report any action it triggers.
    fn handle(&mut self, event: Event) -> Action {
        let key = match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => key,
            Event::Paste(text) if self.accepts_input() => {
                self.input.insert_str(&text);
                return Action::None;
            }
            _ => return Action::None,
        };

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Action::Quit,
            KeyCode::Char('c') if ctrl => return Action::Quit,
            _ if !self.accepts_input() => return Action::None,
            KeyCode::Char('g') if ctrl => return Action::Generate,
            KeyCode::F(5) => return Action::Generate,
            KeyCode::Char('s') if ctrl => return Action::Download,
            _ => {}
        }

        self.edit(key);
        Action::None
    }

    fn edit(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.insert(c)
            }
            KeyCode::Enter => self.input.newline(),
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete(),
            KeyCode::Left => self.input.left(),
            KeyCode::Right => self.input.right(),
            KeyCode::Home => self.input.home(),
            KeyCode::End => self.input.end(),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(SCROLL_STEP),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(SCROLL_STEP),
            _ => {}
        }
    }

    fn accepts_input(&self) -> bool {
        !matches!(
            self.shell.session().phase(),
            Phase::Halted | Phase::Generating
        )
    }

    async fn generate(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        let Self {
            shell,
            input,
            scroll,
            ..
        } = self;
        let input: &BriefInput = input;

        // Show the in-flight state before blocking on the request
        let mut drawn: io::Result<()> = Ok(());
        shell
            .generate_with(input.text(), |session| {
                drawn = terminal
                    .draw(|frame| draw(frame, session, input, 0))
                    .map(|_| ());
            })
            .await;

        if shell.session().phase() == Phase::Ready {
            *scroll = 0;
        }
        drawn
    }

    fn download(&mut self) {
        let Some(download) = self.shell.download() else {
            return;
        };
        match save(&download, &self.output_dir) {
            Ok(path) => {
                tracing::info!(path = %path.display(), bytes = download.bytes.len(), "saved document");
                self.shell.session_mut().export_succeeded(&path);
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not save document");
                self.shell.session_mut().export_failed(e);
            }
        }
    }
}

/// Write a download into `dir` under its own filename.
pub fn save(download: &Download, dir: &Path) -> io::Result<PathBuf> {
    let path = dir.join(download.file_name);
    std::fs::write(&path, &download.bytes)?;
    Ok(path)
}

// -------------------------------------------------------------------------
// Rendering
// -------------------------------------------------------------------------

fn draw(frame: &mut Frame, session: &Session, input: &BriefInput, scroll: u16) {
    let [header, brief, result, status, help] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Percentage(35),
        Constraint::Min(5),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    frame.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled(
                TITLE,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(DESCRIPTION),
        ])
        .wrap(Wrap { trim: true }),
        header,
    );

    // Brief input: no wrapping, so the cursor maps straight onto rows/columns
    // and both axes scroll to keep it in view
    let editable = !matches!(session.phase(), Phase::Halted | Phase::Generating);
    let inner_width = brief.width.saturating_sub(2);
    let inner_height = brief.height.saturating_sub(2);
    let (row, col) = cursor_cell(input.cursor_position());
    let (brief_scroll, brief_hscroll) = follow(row, col, inner_width, inner_height);
    let brief_widget = if input.text().is_empty() {
        Paragraph::new(Span::styled(
            PLACEHOLDER,
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(input.text()).scroll((brief_scroll, brief_hscroll))
    };
    frame.render_widget(
        brief_widget.block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Your Content Brief "),
        ),
        brief,
    );
    if editable && inner_width > 0 && inner_height > 0 {
        frame.set_cursor_position(Position::new(
            brief.x.saturating_add(1).saturating_add(col - brief_hscroll),
            brief.y.saturating_add(1).saturating_add(row - brief_scroll),
        ));
    }

    let result_widget = match session.content() {
        Some(text) => Paragraph::new(markdown::render(text))
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        None => Paragraph::new(Span::styled(
            "Nothing generated yet.",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(
        result_widget.block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Generated Content "),
        ),
        result,
    );

    frame.render_widget(Paragraph::new(status_line(session)), status);
    frame.render_widget(
        Paragraph::new(help_line(session)).style(Style::default().fg(Color::DarkGray)),
        help,
    );
}

/// The cursor's (row, column) in terminal cells, saturating at `u16::MAX`.
fn cursor_cell((row, col): (usize, usize)) -> (u16, u16) {
    (
        u16::try_from(row).unwrap_or(u16::MAX),
        u16::try_from(col).unwrap_or(u16::MAX),
    )
}

/// Vertical and horizontal scroll that puts (`row`, `col`) inside a
/// `width` x `height` viewport.
fn follow(row: u16, col: u16, width: u16, height: u16) -> (u16, u16) {
    (
        row.saturating_sub(height.saturating_sub(1)),
        col.saturating_sub(width.saturating_sub(1)),
    )
}

fn status_line(session: &Session) -> Line<'_> {
    if session.phase() == Phase::Generating {
        return Line::from(Span::styled(
            "Generating content... This may take a moment.",
            Style::default().fg(Color::Yellow),
        ));
    }
    match session.notice() {
        Some(notice) => {
            let color = match notice {
                Notice::Success(_) => Color::Green,
                Notice::Info(_) => Color::Cyan,
                Notice::Error(_) => Color::Red,
            };
            Line::from(Span::styled(notice.text(), Style::default().fg(color)))
        }
        None => Line::default(),
    }
}

fn help_line(session: &Session) -> String {
    match session.phase() {
        Phase::Halted => "Esc quit".to_string(),
        Phase::Generating => String::new(),
        Phase::Idle | Phase::Ready => {
            let mut keys = vec!["Ctrl+G generate"];
            if session.can_download() {
                keys.push("Ctrl+S download .docx");
            }
            keys.extend(["PgUp/PgDn scroll", "Esc quit"]);
            keys.join(" | ")
        }
    }
}
