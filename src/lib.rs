//! Read, edit and write INI configuration files.
//!
//! A document is an ordered list of contexts (`[Name]` blocks), each holding key/value pairs.
//! Keys written before the first header belong to the default context, named `""`.
//!
//! ```
//! use inifile::Ini;
//!
//! let ini: Ini = "level = 3\n\n[Server]\nhost = example.org\n".parse().unwrap();
//!
//! assert_eq!(ini.contexts().collect::<Vec<_>>(), ["", "Server"]);
//! assert_eq!(ini.configuration_value("Server", "host"), Some("example.org"));
//! ```
#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]

mod error;
mod parser;
mod section;
mod writer;

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read};
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;

pub use crate::error::{ContextNotFound, ParseError};
pub use crate::parser::Parser;
pub use crate::section::Section;
pub use crate::writer::{LineEnding, Writer};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ini {
    sections: IndexMap<String, Section>,
}

impl Ini {
    /// Create a document without any context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document from any byte source.
    ///
    /// # Errors
    ///
    /// See [`Parser::into_ini`].
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ParseError> {
        Parser::new(BufReader::new(reader)).into_ini()
    }

    /// Parse a document from a file on disk.
    ///
    /// # Errors
    ///
    /// Fails with [`ParseError::Read`] if the file cannot be opened, otherwise as
    /// [`Parser::into_ini`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Register `name` as a context. Registering an existing context does nothing.
    pub fn add_context(&mut self, name: impl Into<String>) {
        self.register(name.into());
    }

    /// Set `key` to `value` in `context`, replacing any previous value.
    ///
    /// Both are stored as given, but the parser trims surrounding whitespace from keys and values,
    /// so `" k "` is read back from a saved file as `"k"`.
    ///
    /// # Errors
    ///
    /// Fails if `context` has not been registered; the document is left untouched.
    pub fn add_configuration(
        &mut self,
        context: &str,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ContextNotFound> {
        let section = self
            .sections
            .get_mut(context)
            .ok_or_else(|| ContextNotFound {
                context: context.to_owned(),
            })?;

        section.insert(key.into(), value.into());
        Ok(())
    }

    /// Context names in the order they were registered.
    pub fn contexts(&self) -> impl ExactSizeIterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    #[must_use]
    pub fn context_configurations(&self, context: &str) -> Option<&Section> {
        self.sections.get(context)
    }

    #[must_use]
    pub fn configuration_value(&self, context: &str, key: &str) -> Option<&str> {
        self.sections.get(context)?.get(key)
    }

    #[must_use]
    pub fn contains_context(&self, context: &str) -> bool {
        self.sections.contains_key(context)
    }

    /// Number of registered contexts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Write the document to `writer` with `\n` line endings.
    ///
    /// # Errors
    ///
    /// Any failure of `writer` is returned unchanged.
    pub fn write_to<W: io::Write>(&self, writer: W) -> io::Result<()> {
        Writer::new(writer).write(self)
    }

    /// Write the document to `path`, replacing the file if it already exists.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be created or written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }

    /// Position of `name`, registering it first if needed.
    pub(crate) fn register(&mut self, name: String) -> usize {
        match self.sections.get_index_of(&name) {
            Some(index) => index,
            None => self.sections.insert_full(name, Section::default()).0,
        }
    }
}

impl FromStr for Ini {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s.as_bytes()).into_ini()
    }
}

impl fmt::Display for Ini {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in writer::blocks(self, LineEnding::Lf) {
            f.write_str(&block)?;
        }

        Ok(())
    }
}
