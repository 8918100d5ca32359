//! Console sink: the VM's output and key input on a terminal.

use std::collections::VecDeque;
use std::io::Write;

use lantern_foundation::Result;
use lantern_vm::Sink;

use crate::editor::{LineEditor, ReadResult};

/// A [`Sink`] that writes output to `W` and reads keys from lines of `E`.
///
/// Each input line is split on whitespace; every `read_key` consumes one
/// token and yields its first character. Blank lines are skipped. End of
/// input or an interrupt yields `None`.
pub struct ConsoleSink<E: LineEditor, W: Write> {
    editor: E,
    out: W,
    pending: VecDeque<String>,
}

impl<E: LineEditor, W: Write> ConsoleSink<E, W> {
    /// Creates a console over `editor` and `out`.
    pub fn new(editor: E, out: W) -> Self {
        Self {
            editor,
            out,
            pending: VecDeque::new(),
        }
    }

    /// Returns the output writer.
    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Consumes the console, returning the editor and writer.
    pub fn into_parts(self) -> (E, W) {
        (self.editor, self.out)
    }
}

impl<E: LineEditor, W: Write> Sink for ConsoleSink<E, W> {
    fn emit(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    fn read_key(&mut self) -> Result<Option<char>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(token.chars().next());
            }
            match self.editor.read_line("")? {
                ReadResult::Line(line) => {
                    self.pending
                        .extend(line.split_whitespace().map(str::to_owned));
                }
                ReadResult::Interrupted | ReadResult::Eof => return Ok(None),
            }
        }
    }
}
