//! File writers for decode results.

use std::fs::File;
use std::io::{BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};

use super::{DecodeError, HypothesisSink, Hypothesis, InputUnit};

/// Suffix appended to the oracle prefix.
pub const ORACLE_SUFFIX: &str = ".oracle";

/// Writes the top hypothesis of each unit, one line per unit.
pub struct TopWriter<W> {
    writer: W,
    path: Utf8PathBuf,
}

impl TopWriter<BufWriter<File>> {
    /// Creates or truncates the one-best file.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::CreateOutput`] when the file cannot be created.
    pub fn create(path: &Utf8Path) -> Result<Self, DecodeError> {
        create(path).map(|writer| Self::new(writer, path))
    }
}

impl<W: Write> TopWriter<W> {
    pub fn new(writer: W, path: &Utf8Path) -> Self {
        Self {
            writer,
            path: path.to_owned(),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> HypothesisSink for TopWriter<W> {
    fn write(&mut self, _unit: &InputUnit, nbest: &[Hypothesis]) -> Result<(), DecodeError> {
        let text = nbest.first().map_or("", |best| best.text.as_str());
        writeln!(self.writer, "{text}").map_err(|source| write_error(&self.path, source))
    }

    fn finish(&mut self) -> Result<(), DecodeError> {
        self.writer
            .flush()
            .map_err(|source| write_error(&self.path, source))
    }
}

/// Writes every n-best entry annotated with its unit, rank, system and score.
pub struct OracleWriter<W> {
    writer: W,
    path: Utf8PathBuf,
}

impl OracleWriter<BufWriter<File>> {
    /// Creates `<prefix>.oracle`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::CreateOutput`] when the file cannot be created.
    pub fn create(prefix: &str) -> Result<Self, DecodeError> {
        let path = oracle_path(prefix);
        create(&path).map(|writer| Self::new(writer, &path))
    }
}

impl<W: Write> OracleWriter<W> {
    pub fn new(writer: W, path: &Utf8Path) -> Self {
        Self {
            writer,
            path: path.to_owned(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> HypothesisSink for OracleWriter<W> {
    fn write(&mut self, unit: &InputUnit, nbest: &[Hypothesis]) -> Result<(), DecodeError> {
        for (rank, hypothesis) in nbest.iter().enumerate() {
            writeln!(
                self.writer,
                "{}\t{}\t{}\t{:.6}\t{}",
                unit.index, rank, hypothesis.system, hypothesis.score, hypothesis.text
            )
            .map_err(|source| write_error(&self.path, source))?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), DecodeError> {
        self.writer
            .flush()
            .map_err(|source| write_error(&self.path, source))
    }
}

/// Oracle file written for `prefix`.
#[must_use]
pub fn oracle_path(prefix: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{prefix}{ORACLE_SUFFIX}"))
}

fn create(path: &Utf8Path) -> Result<BufWriter<File>, DecodeError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| DecodeError::CreateOutput {
            path: path.to_owned(),
            source,
        })
}

fn write_error(path: &Utf8Path, source: std::io::Error) -> DecodeError {
    DecodeError::Write {
        path: path.to_owned(),
        source,
    }
}
