//! Host boundary for observable I/O.
//!
//! Only two instructions reach outside the VM: `Say`/`SayUnsigned` emit
//! text and `WaitKey` reads one key. Hosts implement [`Sink`] to decide
//! where that goes.

use std::collections::VecDeque;

use lantern_foundation::Result;

/// Output/input collaborator used by the VM.
pub trait Sink {
    /// Emits formatted text.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot accept output.
    fn emit(&mut self, text: &str) -> Result<()>;

    /// Blocks until one key is available.
    ///
    /// Returns `None` once input is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails.
    fn read_key(&mut self) -> Result<Option<char>>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn emit(&mut self, text: &str) -> Result<()> {
        (**self).emit(text)
    }

    fn read_key(&mut self) -> Result<Option<char>> {
        (**self).read_key()
    }
}

/// In-memory sink: collects output and serves keys from a script.
#[derive(Clone, Debug, Default)]
pub struct BufferSink {
    output: String,
    keys: VecDeque<char>,
}

impl BufferSink {
    /// Creates a sink with no scripted keys.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that answers `read_key` from `keys` in order.
    #[must_use]
    pub fn with_keys(keys: impl IntoIterator<Item = char>) -> Self {
        Self {
            output: String::new(),
            keys: keys.into_iter().collect(),
        }
    }

    /// Returns everything emitted so far.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Takes and clears the collected output.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

impl Sink for BufferSink {
    fn emit(&mut self, text: &str) -> Result<()> {
        self.output.push_str(text);
        Ok(())
    }

    fn read_key(&mut self) -> Result<Option<char>> {
        Ok(self.keys.pop_front())
    }
}
