use crate::token::SourcePos;
use owo_colors::OwoColorize;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// How many characters of the offending line are shown on either side of the
/// error column.
const EXCERPT_PADDING: usize = 20;

/// Which stage of the pipeline is currently reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Command,
    Lexing,
    Parsing,
    Runtime,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Command => write!(f, "Command"),
            Stage::Lexing => write!(f, "Lexing"),
            Stage::Parsing => write!(f, "Parsing"),
            Stage::Runtime => write!(f, "Runtime"),
        }
    }
}

/// Diagnostics context threaded through the whole pipeline.
///
/// Keeps the raw lines of every lexed file so errors can show a source
/// excerpt, accumulates rendered messages, and tracks whether any error has
/// occurred so later stages can gate on it.
pub struct Diagnostics {
    stage: Stage,
    error_occurred: bool,
    raw_lines: HashMap<Rc<str>, Vec<String>>,
    use_color: bool,
    messages: Vec<String>,
}

impl Diagnostics {
    pub fn new(use_color: bool) -> Self {
        Self {
            stage: Stage::Command,
            error_occurred: false,
            raw_lines: HashMap::new(),
            use_color,
            messages: Vec::new(),
        }
    }

    pub fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    pub fn had_error(&self) -> bool {
        self.error_occurred
    }

    /// Register a file's source so its lines can be excerpted later.
    pub fn add_source(&mut self, file: Rc<str>, source: &str) {
        let lines = source.split('\n').map(|l| l.to_string()).collect();
        self.raw_lines.insert(file, lines);
    }

    /// Report an error anchored to a source position.
    pub fn report(&mut self, message: &str, pos: &SourcePos) {
        self.error_occurred = true;

        let header = format!(
            "{} error in {} at line {}:{}: {}",
            self.stage, pos.file, pos.line, pos.column, message
        );
        let header = if self.use_color {
            format!("{}", header.red().bold())
        } else {
            header
        };

        let mut rendered = header;
        rendered.push('\n');
        rendered.push_str(&self.excerpt(pos));
        self.messages.push(rendered);
    }

    /// Report an error with no source position.
    pub fn report_flat(&mut self, message: &str) {
        self.error_occurred = true;

        let line = format!("{} error: {}", self.stage, message);
        if self.use_color {
            self.messages.push(format!("{}", line.red().bold()));
        } else {
            self.messages.push(line);
        }
    }

    /// The offending line, windowed around the error column, with a caret.
    fn excerpt(&self, pos: &SourcePos) -> String {
        let raw_line: Vec<char> = self
            .raw_lines
            .get(&pos.file)
            .and_then(|lines| lines.get(pos.line.saturating_sub(1)))
            .map(|line| line.chars().collect())
            .unwrap_or_default();

        let left_padding = EXCERPT_PADDING.min(pos.column);
        let start = pos.column.saturating_sub(EXCERPT_PADDING);
        let end = (pos.column + EXCERPT_PADDING * 2 - left_padding).min(raw_line.len());

        let lead = if pos.column <= EXCERPT_PADDING { "   " } else { "..." };
        let trail = if end < raw_line.len() { "..." } else { "" };
        let window: String = raw_line[start.min(raw_line.len())..end].iter().collect();

        format!(
            "       {}{}{}\n{}^",
            lead,
            window,
            trail,
            " ".repeat(10 + left_padding)
        )
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Print and drain every accumulated message to stderr.
    pub fn flush_to_stderr(&mut self) {
        for message in self.messages.drain(..) {
            eprintln!("{}", message);
        }
    }
}
