//! Output sink for `print_value` and `print_line`.

use crate::error::{Result, RuntimeError};
use std::io::Write;

/// Where printed text goes
pub trait Output {
    /// Emit text with no terminator
    fn write_text(&mut self, text: &str) -> Result<()>;

    /// Emit text followed by a line terminator
    fn write_line(&mut self, text: &str) -> Result<()>;
}

impl<W: Write> Output for W {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.write_all(text.as_bytes()).map_err(RuntimeError::output)
    }

    fn write_line(&mut self, text: &str) -> Result<()> {
        writeln!(self, "{}", text).map_err(RuntimeError::output)
    }
}
