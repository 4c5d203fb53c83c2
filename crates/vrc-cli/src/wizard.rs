//! Terminal setup wizard
//!
//! Renders a [`SetupForm`] one field at a time in raw mode. Enter submits,
//! Backspace on an empty field goes back, Esc or Ctrl-C aborts.

use std::io::{self, Write};

use async_trait::async_trait;
use crossterm::cursor::MoveToPreviousLine;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};
use tracing::debug;
use vrc_core::SavedConfig;
use vrc_orchestrator::setup::ONLY_VPN_CHOICES;
use vrc_orchestrator::{
    Answer, FormStep, GroupCatalog, SetupAssistant, SetupError, SetupField, SetupForm,
};

use crate::output::{print_info, print_success};

/// Keys the wizard reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Submit,
    Erase,
    Abort,
    Up,
    Down,
    Char(char),
    Ignore,
}

fn classify_key(key: &KeyEvent) -> Key {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if control => Key::Abort,
        KeyCode::Esc => Key::Abort,
        KeyCode::Enter => Key::Submit,
        KeyCode::Backspace => Key::Erase,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Char(c) if !control => Key::Char(c),
        _ => Key::Ignore,
    }
}

/// What the user did with one field
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Answer(Answer),
    Back,
    Abort,
}

/// Editable text of one text field
#[derive(Debug)]
struct LineEditor {
    value: String,
    required: bool,
}

impl LineEditor {
    fn new(initial: &str, required: bool) -> Self {
        Self {
            value: initial.to_string(),
            required,
        }
    }

    fn apply(&mut self, key: Key) -> Option<Input> {
        match key {
            Key::Submit if self.required && self.value.trim().is_empty() => None,
            Key::Submit => Some(Input::Answer(Answer::Text(self.value.clone()))),
            Key::Erase if self.value.is_empty() => Some(Input::Back),
            Key::Erase => {
                self.value.pop();
                None
            }
            Key::Abort => Some(Input::Abort),
            Key::Char(c) => {
                self.value.push(c);
                None
            }
            Key::Up | Key::Down | Key::Ignore => None,
        }
    }
}

/// Highlighted option of one choice field
#[derive(Debug)]
struct ChoiceCursor {
    selected: usize,
    len: usize,
}

impl ChoiceCursor {
    fn new(initial: usize, len: usize) -> Self {
        Self {
            selected: initial.min(len.saturating_sub(1)),
            len,
        }
    }

    fn apply(&mut self, key: Key) -> Option<Input> {
        match key {
            Key::Submit if self.len == 0 => None,
            Key::Submit => Some(Input::Answer(Answer::Choice(self.selected))),
            Key::Erase => Some(Input::Back),
            Key::Abort => Some(Input::Abort),
            Key::Up if self.len > 0 => {
                self.selected = (self.selected + self.len - 1) % self.len;
                None
            }
            Key::Down if self.len > 0 => {
                self.selected = (self.selected + 1) % self.len;
                None
            }
            _ => None,
        }
    }
}

/// Restores cooked mode when dropped
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn read_key() -> io::Result<Key> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(classify_key(&key));
            }
        }
    }
}

fn render_text(out: &mut impl Write, field: SetupField, editor: &LineEditor) -> io::Result<()> {
    let shown = if field.is_masked() {
        "*".repeat(editor.value.chars().count())
    } else {
        editor.value.clone()
    };
    queue!(
        out,
        Print("\r"),
        Clear(ClearType::CurrentLine),
        Print(format!("{}: {}", field.label(), shown))
    )?;
    out.flush()
}

fn render_choices(
    out: &mut impl Write,
    options: &[String],
    selected: usize,
    redraw: bool,
) -> io::Result<()> {
    if redraw && !options.is_empty() {
        queue!(out, MoveToPreviousLine(options.len() as u16))?;
    }
    for (index, option) in options.iter().enumerate() {
        let marker = if index == selected { "❯" } else { " " };
        queue!(
            out,
            Clear(ClearType::CurrentLine),
            Print(format!("{} {}\r\n", marker, option))
        )?;
    }
    out.flush()
}

fn choice_options(form: &SetupForm, field: SetupField) -> Vec<String> {
    match field {
        SetupField::Group => form.groups().iter().map(|g| g.name.clone()).collect(),
        _ => ONLY_VPN_CHOICES.iter().map(|c| c.to_string()).collect(),
    }
}

/// Ask for the current field of `form`; blocks on terminal input
fn prompt(form: &SetupForm) -> io::Result<Input> {
    let field = form.current();
    let _raw = RawMode::enable()?;
    let mut out = io::stdout();

    if field.is_text() {
        let required = field != SetupField::RdpServer;
        let mut editor = LineEditor::new(form.default_text(field), required);
        loop {
            render_text(&mut out, field, &editor)?;
            if let Some(input) = editor.apply(read_key()?) {
                execute!(out, Print("\r\n"))?;
                return Ok(input);
            }
        }
    }

    let options = choice_options(form, field);
    let mut cursor = ChoiceCursor::new(form.initial_choice(field), options.len());
    execute!(out, Print(format!("{}:\r\n", field.label())))?;
    render_choices(&mut out, &options, cursor.selected, false)?;
    loop {
        if let Some(input) = cursor.apply(read_key()?) {
            return Ok(input);
        }
        render_choices(&mut out, &options, cursor.selected, true)?;
    }
}

/// [`SetupAssistant`] on the controlling terminal
#[derive(Debug, Default)]
pub struct TerminalAssistant;

impl TerminalAssistant {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SetupAssistant for TerminalAssistant {
    async fn run_setup(
        &mut self,
        mut form: SetupForm,
        catalog: &GroupCatalog,
    ) -> Result<SavedConfig, SetupError> {
        loop {
            if let Some(server) = form.groups_needed().map(str::to_string) {
                print_info("Retrieving VPN groups for given server");
                let groups = catalog.list(&server).await?;
                debug!(%server, count = groups.len(), "Listed VPN groups");
                form.set_groups(&server, groups);
            }

            // Terminal reads block, so they run off the async workers.
            let (returned, input) = tokio::task::spawn_blocking(move || {
                let input = prompt(&form);
                (form, input)
            })
            .await
            .map_err(|e| SetupError::Io(io::Error::other(e)))?;
            form = returned;

            match input? {
                Input::Answer(answer) => {
                    if let FormStep::Completed(config) = form.submit(answer)? {
                        print_success("Setup completed");
                        return Ok(config);
                    }
                }
                Input::Back => {
                    form.back();
                }
                Input::Abort => return Err(SetupError::Aborted),
            }
        }
    }
}
