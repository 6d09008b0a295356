//! Reader for configuration scripts.
//!
//! A script is plain device input, one command per line. Lines starting with
//! `!` are special:
//!
//! | Line | Meaning |
//! |------|---------|
//! | `! text` | Comment. Sent to the device like any other line |
//! | `!name argument` | Directive, handled locally and never sent |
//! | anything else | Command sent verbatim |
//!
//! Only the trailing `\n` is removed; everything else on the line is kept.

use crate::error::{Error, Result};
use std::fmt;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// One classified line of a configuration script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLine {
    /// Bytes sent to the device as-is. `comment` marks lines starting with `! `.
    Literal { bytes: Vec<u8>, comment: bool },
    /// A control instruction executed by the engine.
    Directive(Directive),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub argument: String,
}

impl Directive {
    pub fn new(name: impl Into<String>, argument: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            argument: argument.into(),
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.argument.is_empty() {
            write!(f, "!{}", self.name)
        } else {
            write!(f, "!{} {}", self.name, self.argument)
        }
    }
}

impl fmt::Display for ConfigLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigLine::Literal { bytes, .. } => f.write_str(&String::from_utf8_lossy(bytes)),
            ConfigLine::Directive(directive) => fmt::Display::fmt(directive, f),
        }
    }
}

/// Classify a single line. `line` must not include its trailing newline.
pub fn parse_line(line: &[u8]) -> ConfigLine {
    match line {
        [b'!', b' ', ..] => ConfigLine::Literal {
            bytes: line.to_vec(),
            comment: true,
        },
        [b'!', rest @ ..] => {
            let (name, argument) = match rest.iter().position(|&b| b == b' ') {
                Some(sep) => (&rest[..sep], &rest[sep + 1..]),
                None => (rest, &[][..]),
            };
            ConfigLine::Directive(Directive::new(
                String::from_utf8_lossy(name),
                String::from_utf8_lossy(argument),
            ))
        }
        _ => ConfigLine::Literal {
            bytes: line.to_vec(),
            comment: false,
        },
    }
}

/// Reads a script one line at a time.
///
/// The reader never looks past the current line; to start over, build a new
/// reader on a fresh stream.
pub struct ScriptReader<R> {
    reader: BufReader<R>,
}

impl<R: AsyncRead + Unpin> ScriptReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }

    /// Read and classify the next line.
    ///
    /// # Errors
    ///
    /// [`Error::EndOfInput`] once the stream is exhausted, [`Error::Io`] if
    /// reading fails.
    pub async fn read(&mut self) -> Result<ConfigLine> {
        let mut line = Vec::new();
        if self.reader.read_until(b'\n', &mut line).await? == 0 {
            return Err(Error::EndOfInput);
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        Ok(parse_line(&line))
    }
}
