//! The full-screen front end.

use std::io::{self, Stdout};
use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::thread;
use std::time::Duration;

use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode,
    KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    self as term, EnterAlternateScreen, LeaveAlternateScreen,
    disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement,
};
use jdbias_core::Snapshot;
use jdbias_core::input::{ContentMeasure, KeyInput};
use jdbias_core::scroll::{ScrollAnchor, ScrollBehavior};
use jdbias_core::transcript::Role;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::{Frame, Terminal};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{BAR_CHAR, SPINNER_CHARS, gone};
use crate::{PLACEHOLDER, SUBTITLE, Session, SessionBuilder, TITLE};

const TICK: Duration = Duration::from_millis(80);
const CLARIFICATION_HINT: &str =
    "The analyzer needs a few more details to finish.";

/// Runs the full-screen front end until the user quits.
pub async fn run(builder: SessionBuilder) -> io::Result<()> {
    let (cols, _) = term::size()?;
    let anchor = Arc::new(FollowAnchor::default());
    let measure = WrappingMeasure::new(cols.saturating_sub(2));
    let session = builder
        .with_scroll_anchor(Arc::clone(&anchor))
        .with_content_measure(measure.clone())
        .build();

    let mut guard = TerminalGuard::enter()?;
    let result =
        event_loop(&mut guard.terminal, &session, App::new(anchor, measure))
            .await;
    drop(guard);

    session.close();
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    session: &Session,
    mut app: App,
) -> io::Result<()> {
    let mut events = spawn_event_reader();
    let mut snapshot_rx = session.subscribe();
    let mut ticker = interval(TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let snapshot = snapshot_rx.borrow_and_update().clone();
        app.poll_anchor();
        let mut width_changed = false;
        terminal.draw(|frame| width_changed = app.render(frame, &snapshot))?;
        if width_changed {
            session.remeasure().map_err(gone)?;
        }

        select! {
            event = events.recv() => {
                let Some(event) = event else {
                    break;
                };
                match map_event(event?) {
                    Some(Action::Quit) => break,
                    Some(Action::Input(key)) => {
                        session.press_key(key).map_err(gone)?;
                    }
                    Some(Action::PageUp) => app.scroll.page_up(),
                    Some(Action::PageDown) => app.scroll.page_down(),
                    None => {}
                }
            }
            changed = snapshot_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = ticker.tick() => app.tick(),
        }
    }
    Ok(())
}

/// Reads terminal events on a plain thread, since crossterm only offers a
/// blocking API without extra features.
fn spawn_event_reader() -> mpsc::UnboundedReceiver<io::Result<Event>> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(Duration::from_millis(100)) {
                Ok(false) => continue,
                Ok(true) => {
                    if tx.send(event::read()).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tx.send(Err(err)).ok();
                    break;
                }
            }
        }
        trace!("event reader stopped");
    });
    rx
}

struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    keyboard_enhanced: bool,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

        // Without this, most terminals report Shift+Enter as a plain Enter.
        let keyboard_enhanced =
            supports_keyboard_enhancement().unwrap_or(false);
        if keyboard_enhanced {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                )
            )?;
        } else {
            warn!("keyboard enhancement unsupported, Shift+Enter may submit");
        }

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self {
            terminal,
            keyboard_enhanced,
        })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let backend = self.terminal.backend_mut();
        if self.keyboard_enhanced {
            execute!(backend, PopKeyboardEnhancementFlags).ok();
        }
        execute!(backend, DisableBracketedPaste, LeaveAlternateScreen).ok();
        disable_raw_mode().ok();
        self.terminal.show_cursor().ok();
    }
}

/// Measures the draft as the input box will wrap it.
///
/// Clones share the width, which the renderer updates on every frame.
#[derive(Clone, Debug)]
pub struct WrappingMeasure {
    width: Arc<AtomicU16>,
}

impl WrappingMeasure {
    /// Creates a measure for an input that is `width` columns wide.
    pub fn new(width: u16) -> Self {
        Self {
            width: Arc::new(AtomicU16::new(width)),
        }
    }

    /// Updates the width, returns `true` if it changed.
    pub fn set_width(&self, width: u16) -> bool {
        self.width.swap(width, Ordering::Relaxed) != width
    }
}

impl ContentMeasure for WrappingMeasure {
    fn measure_content_height(&self, content: &str) -> usize {
        wrap(content, usize::from(self.width.load(Ordering::Relaxed))).len()
    }
}

/// Records scroll requests until the next frame picks them up.
#[derive(Debug, Default)]
pub struct FollowAnchor {
    requested: AtomicBool,
    instant: AtomicBool,
}

impl FollowAnchor {
    fn take(&self) -> Option<ScrollBehavior> {
        if !self.requested.swap(false, Ordering::AcqRel) {
            return None;
        }
        if self.instant.swap(false, Ordering::AcqRel) {
            Some(ScrollBehavior::Instant)
        } else {
            Some(ScrollBehavior::Smooth)
        }
    }
}

impl ScrollAnchor for FollowAnchor {
    fn scroll_into_view(&self, _index: usize, behavior: ScrollBehavior) {
        // The newest entry is always the last one, so following the bottom
        // is enough.
        if behavior == ScrollBehavior::Instant {
            self.instant.store(true, Ordering::Release);
        }
        self.requested.store(true, Ordering::Release);
    }
}

/// Scroll position of the transcript pane, in rows from the top.
#[derive(Debug, Default)]
struct TranscriptScroll {
    offset: usize,
    max_offset: usize,
    viewport: usize,
    animating: bool,
}

impl TranscriptScroll {
    fn request(&mut self, behavior: ScrollBehavior) {
        match behavior {
            ScrollBehavior::Smooth => self.animating = true,
            ScrollBehavior::Instant => {
                self.offset = self.max_offset;
                self.animating = false;
            }
        }
    }

    fn layout(&mut self, total: usize, viewport: usize) {
        self.viewport = viewport;
        self.max_offset = total.saturating_sub(viewport);
        self.offset = self.offset.min(self.max_offset);
    }

    /// Moves a third of the remaining distance towards the bottom.
    fn step(&mut self) {
        if !self.animating {
            return;
        }
        let remaining = self.max_offset - self.offset;
        if remaining == 0 {
            self.animating = false;
            return;
        }
        self.offset += remaining.div_ceil(3);
    }

    fn page_up(&mut self) {
        self.animating = false;
        self.offset = self.offset.saturating_sub((self.viewport / 2).max(1));
    }

    fn page_down(&mut self) {
        self.animating = false;
        self.offset =
            (self.offset + (self.viewport / 2).max(1)).min(self.max_offset);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Action {
    Input(KeyInput),
    PageUp,
    PageDown,
    Quit,
}

fn map_event(event: Event) -> Option<Action> {
    match event {
        Event::Key(key) => map_key(key),
        Event::Paste(text) => Some(Action::Input(KeyInput::Paste(text))),
        _ => None,
    }
}

fn map_key(key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('c' | 'd') if ctrl => Some(Action::Quit),
        KeyCode::Enter => Some(Action::Input(KeyInput::Enter {
            shift: key.modifiers.contains(KeyModifiers::SHIFT),
        })),
        KeyCode::Char(c) if !ctrl && !alt => {
            Some(Action::Input(KeyInput::Char(c)))
        }
        KeyCode::Backspace => Some(Action::Input(KeyInput::Backspace)),
        KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::PageDown => Some(Action::PageDown),
        _ => None,
    }
}

/// Splits `content` into rows at most `width` columns wide.
///
/// A character wider than the whole row still gets a row of its own.
fn wrap(content: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for line in content.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let mut row = String::new();
        let mut row_width = 0;
        for c in line.chars() {
            let char_width = c.width().unwrap_or(0);
            if row_width + char_width > width && !row.is_empty() {
                rows.push(mem::take(&mut row));
                row_width = 0;
            }
            row.push(c);
            row_width += char_width;
        }
        rows.push(row);
    }
    rows
}

struct App {
    anchor: Arc<FollowAnchor>,
    measure: WrappingMeasure,
    scroll: TranscriptScroll,
    spinner_frame: usize,
}

impl App {
    fn new(anchor: Arc<FollowAnchor>, measure: WrappingMeasure) -> Self {
        Self {
            anchor,
            measure,
            scroll: TranscriptScroll::default(),
            spinner_frame: 0,
        }
    }

    fn tick(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
        self.scroll.step();
    }

    fn poll_anchor(&mut self) {
        if let Some(behavior) = self.anchor.take() {
            self.scroll.request(behavior);
        }
    }

    /// Draws one frame. Returns `true` if the input width changed, in which
    /// case the draft needs to be measured again.
    fn render(&mut self, frame: &mut Frame<'_>, snapshot: &Snapshot) -> bool {
        let banner = banner_line(snapshot);
        let input_rows = u16::try_from(snapshot.input_height)
            .unwrap_or(u16::MAX)
            .saturating_add(2);
        let [header_area, transcript_area, banner_area, input_area] =
            Layout::vertical([
                Constraint::Length(2),
                Constraint::Min(3),
                Constraint::Length(u16::from(banner.is_some())),
                Constraint::Length(input_rows),
            ])
            .areas(frame.area());

        let header = Paragraph::new(vec![
            Line::from(TITLE.bold()),
            Line::from(SUBTITLE.dark_gray()),
        ]);
        frame.render_widget(header, header_area);

        let lines = self.transcript_lines(
            snapshot,
            usize::from(transcript_area.width.saturating_sub(2)),
        );
        self.scroll
            .layout(lines.len(), usize::from(transcript_area.height));
        let offset = u16::try_from(self.scroll.offset).unwrap_or(u16::MAX);
        frame.render_widget(
            Paragraph::new(lines).scroll((offset, 0)),
            transcript_area,
        );

        if let Some(banner) = banner {
            frame.render_widget(Paragraph::new(banner), banner_area);
        }

        let width_changed =
            self.measure.set_width(input_area.width.saturating_sub(2));
        render_input(frame, input_area, snapshot);
        width_changed
    }

    fn transcript_lines(
        &self,
        snapshot: &Snapshot,
        width: usize,
    ) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for message in &snapshot.transcript {
            let (label, color) = match message.role() {
                Role::User => ("You", Color::Green),
                Role::Assistant => ("Analyzer", Color::Cyan),
            };
            lines.push(Line::from(Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            for row in wrap(message.content(), width) {
                lines.push(Line::from(vec![
                    Span::styled(BAR_CHAR, Style::default().fg(color)),
                    Span::raw(" "),
                    Span::raw(row),
                ]));
            }
            lines.push(Line::default());
        }

        if snapshot.is_sending {
            let spinner =
                SPINNER_CHARS[self.spinner_frame % SPINNER_CHARS.len()];
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{spinner} "),
                    Style::default().fg(Color::Cyan),
                ),
                "Analyzing...".dark_gray(),
            ]));
        }
        lines
    }
}

fn banner_line(snapshot: &Snapshot) -> Option<Line<'static>> {
    if let Some(error) = &snapshot.last_error {
        return Some(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::White).bg(Color::Red),
        )));
    }
    if snapshot.awaiting_clarification && !snapshot.is_sending {
        return Some(Line::from(CLARIFICATION_HINT.yellow()));
    }
    None
}

fn render_input(
    frame: &mut Frame<'_>,
    area: ratatui::layout::Rect,
    snapshot: &Snapshot,
) {
    let (title, border_style) = if snapshot.input_enabled {
        (
            " Send: Enter │ Newline: Shift+Enter ",
            Style::default().fg(Color::Cyan),
        )
    } else {
        (" Analyzing... ", Style::default().fg(Color::DarkGray))
    };
    let block = Block::bordered().title(title).border_style(border_style);
    let inner = block.inner(area);

    let rows = wrap(&snapshot.draft, usize::from(inner.width));
    let hidden = rows.len().saturating_sub(usize::from(inner.height));
    let paragraph = if snapshot.draft.is_empty() {
        Paragraph::new(PLACEHOLDER.dark_gray())
    } else {
        Paragraph::new(
            rows.iter()
                .map(|row| Line::from(row.clone()))
                .collect::<Vec<_>>(),
        )
    };
    frame.render_widget(
        paragraph
            .scroll((u16::try_from(hidden).unwrap_or(u16::MAX), 0))
            .block(block),
        area,
    );

    if snapshot.input_enabled && inner.width > 0 && inner.height > 0 {
        let column = rows.last().map_or(0, |row| row.width());
        let row = rows.len().saturating_sub(1 + hidden);
        let x = u16::try_from(column)
            .unwrap_or(u16::MAX)
            .min(inner.width - 1);
        let y = u16::try_from(row).unwrap_or(u16::MAX).min(inner.height - 1);
        frame.set_cursor_position((inner.x + x, inner.y + y));
    }
}
