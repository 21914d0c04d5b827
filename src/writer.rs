use std::io::{self, Write};

use tracing::debug;

use crate::Ini;
use crate::section::Section;

/// Line terminator used for every line the [`Writer`] emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// The conventional line terminator of the platform this crate was built for.
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(windows) { Self::CrLf } else { Self::Lf }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Serializes an [`Ini`] into any byte sink, one context block at a time.
///
/// The default context `""` is written without a header only when it comes first and holds
/// entries, since unscoped keys are only read back ahead of the first header. In every other
/// position it is written as `[]`, which the parser maps back to `""`.
#[derive(Debug)]
pub struct Writer<W> {
    inner: W,
    line_ending: LineEnding,
}

impl<W: Write> Writer<W> {
    #[must_use]
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            line_ending: LineEnding::default(),
        }
    }

    #[must_use]
    pub fn line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Write every context of `ini` in registration order, then flush the sink.
    ///
    /// # Errors
    ///
    /// Fails with [`io::ErrorKind::InvalidInput`] before writing anything if a context name, key
    /// or value contains a line break. Any failure of the underlying sink is returned unchanged.
    pub fn write(&mut self, ini: &Ini) -> io::Result<()> {
        check_single_line(ini)?;

        for block in blocks(ini, self.line_ending) {
            self.inner.write_all(block.as_bytes())?;
        }

        self.inner.flush()?;
        debug!(contexts = ini.len(), "wrote ini");
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

fn check_single_line(ini: &Ini) -> io::Result<()> {
    let has_break = |text: &str| text.contains(['\n', '\r']);

    for (name, section) in &ini.sections {
        if has_break(name.as_str()) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("line break in context name {name:?}"),
            ));
        }

        for (key, value) in section.iter() {
            if has_break(key) || has_break(value) {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("line break in configuration {key:?} of context {name:?}"),
                ));
            }
        }
    }

    Ok(())
}

/// Render each context as a text block: header, entries, and two blank lines.
pub(crate) fn blocks(ini: &Ini, line_ending: LineEnding) -> impl Iterator<Item = String> + '_ {
    let eol = line_ending.as_str();

    ini.sections
        .iter()
        .enumerate()
        .map(move |(index, (name, section))| render_block(index, name, section, eol))
}

fn render_block(index: usize, name: &str, section: &Section, eol: &str) -> String {
    let mut block = String::with_capacity(64 * (section.len() + 1));

    // Unscoped keys are only recognised ahead of the first header. Anywhere else, or when it has
    // nothing to hold, the default context needs an explicit `[]` to be read back.
    if !name.is_empty() || index != 0 || section.is_empty() {
        block.push('[');
        block.push_str(name);
        block.push(']');
        block.push_str(eol);
    }

    for (key, value) in section.iter() {
        block.push_str(key);
        block.push_str(" = ");
        block.push_str(value);
        block.push_str(eol);
    }

    block.push_str(eol);
    block.push_str(eol);
    block
}
