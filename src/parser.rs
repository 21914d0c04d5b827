use std::io::BufRead;

use tracing::{debug, trace};

use crate::Ini;
use crate::error::ParseError;

/// UTF-8 encoded byte order mark, tolerated at the very start of the input.
const BOM: char = '\u{FEFF}';

/// Represents an on-going parse.
#[derive(Debug)]
pub struct Parser<R> {
    reader: R,
    line: usize,
    // Position of the context that key/value lines are written into. Unset until the first
    // section header or the first unscoped key.
    current: Option<usize>,
    ini: Ini,
}

impl<R: BufRead> Parser<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            current: None,
            ini: Ini::new(),
        }
    }

    /// Read every line of the input and return the resulting document.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed line, or if the reader fails or yields invalid UTF-8. No
    /// partially built document is returned.
    pub fn into_ini(mut self) -> Result<Ini, ParseError> {
        let mut buffer = String::with_capacity(256);

        loop {
            buffer.clear();
            if self.reader.read_line(&mut buffer)? == 0 {
                break;
            }
            self.line += 1;

            let text = if self.line == 1 {
                buffer.strip_prefix(BOM).unwrap_or(buffer.as_str())
            } else {
                buffer.as_str()
            };

            self.parse_line(text)?;
        }

        debug!(contexts = self.ini.len(), lines = self.line, "parsed ini");
        Ok(self.ini)
    }

    fn parse_line(&mut self, raw: &str) -> Result<(), ParseError> {
        let line = raw.trim();

        if line.is_empty() {
            return Ok(());
        }

        if line.starts_with('[') {
            let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) else {
                return Err(ParseError::MalformedSectionHeader {
                    line: self.line,
                    text: strip_newline(raw).to_owned(),
                });
            };

            self.enter_context(name.to_owned());
            return Ok(());
        }

        let index = match self.current {
            Some(index) => index,
            // Keys before any header belong to the default context.
            None => self.enter_context(String::new()),
        };

        let Some((key, rest)) = line.split_once('=') else {
            return Err(ParseError::MalformedConfigurationLine {
                line: self.line,
                text: strip_newline(raw).to_owned(),
            });
        };

        // No escaping: a second '=' ends the value.
        let value = rest.split_once('=').map_or(rest, |(value, _)| value);

        self.ini.sections[index].insert(key.trim().to_owned(), value.trim().to_owned());
        Ok(())
    }

    fn enter_context(&mut self, name: String) -> usize {
        trace!(line = self.line, context = %name, "entering context");
        let index = self.ini.register(name);
        self.current = Some(index);
        index
    }
}

fn strip_newline(raw: &str) -> &str {
    raw.trim_end_matches(['\n', '\r'])
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(text: &str) -> Result<Ini, ParseError> {
        Parser::new(text.as_bytes()).into_ini()
    }

    #[test]
    fn unscoped_keys_then_section() {
        let ini = parse("a = 1\n[S]\nb = 2\n").expect("failed to parse hardcoded INI file");

        assert_eq!(ini.contexts().collect::<Vec<_>>(), ["", "S"]);
        assert_eq!(ini.configuration_value("", "a"), Some("1"));
        assert_eq!(ini.configuration_value("S", "b"), Some("2"));
        assert_eq!(ini.configuration_value("S", "a"), None);
    }

    #[test]
    fn header_without_closing_bracket() {
        let error = parse("[Sec").expect_err("expected header to be rejected");

        assert!(matches!(
            error,
            ParseError::MalformedSectionHeader { line: 1, ref text } if text == "[Sec"
        ));
    }

    #[test]
    fn line_numbers_count_blank_lines() {
        let error = parse("\n\n[Ok]\nkey = value\n\n  [Broken  \n").expect_err("expected failure");

        assert!(matches!(
            error,
            ParseError::MalformedSectionHeader { line: 6, ref text } if text == "  [Broken  "
        ));
    }

    #[test]
    fn line_without_separator() {
        let error = parse("[S]\njust a value\n").expect_err("expected failure");

        assert!(matches!(
            error,
            ParseError::MalformedConfigurationLine { line: 2, ref text } if text == "just a value"
        ));
    }

    #[test]
    fn value_is_cut_at_second_equal_sign() {
        let ini = parse("expr = 1+1=2\n").expect("failed to parse hardcoded INI file");

        assert_eq!(ini.configuration_value("", "expr"), Some("1+1"));
    }

    #[test]
    fn empty_value() {
        let ini = parse("key =\n").expect("failed to parse hardcoded INI file");

        assert_eq!(ini.configuration_value("", "key"), Some(""));
    }

    #[test]
    fn reopened_section_is_merged() {
        let ini = parse("[A]\nx = 1\n[B]\ny = 2\n[A]\nx = 3\nz = 4\n")
            .expect("failed to parse hardcoded INI file");

        assert_eq!(ini.contexts().collect::<Vec<_>>(), ["A", "B"]);
        assert_eq!(ini.configuration_value("A", "x"), Some("3"));
        assert_eq!(ini.configuration_value("A", "z"), Some("4"));
    }

    #[test]
    fn empty_brackets_name_default_context() {
        let ini = parse("[S]\nb = 2\n[]\na = 1\n").expect("failed to parse hardcoded INI file");

        assert_eq!(ini.contexts().collect::<Vec<_>>(), ["S", ""]);
        assert_eq!(ini.configuration_value("", "a"), Some("1"));
    }

    #[test]
    fn crlf_and_bom() {
        let ini = parse("\u{FEFF}a = 1\r\n[S]\r\nb = 2\r\n")
            .expect("failed to parse hardcoded INI file");

        assert_eq!(ini.contexts().collect::<Vec<_>>(), ["", "S"]);
        assert_eq!(ini.configuration_value("", "a"), Some("1"));
        assert_eq!(ini.configuration_value("S", "b"), Some("2"));
    }

    #[test]
    fn invalid_utf8_is_a_read_failure() {
        let error = Parser::new(&b"key = \xFF\xFE\n"[..])
            .into_ini()
            .expect_err("expected failure");

        assert!(matches!(error, ParseError::Read { .. }));
    }
}
