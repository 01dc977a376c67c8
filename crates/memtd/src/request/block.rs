//! Lexer for the `key = value` configuration block.

use super::RequestError;

/// One assignment from the request block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entry<'a> {
    /// Key with any `[section]` prefix applied.
    pub(crate) key: String,
    /// Trimmed value.
    pub(crate) value: &'a str,
    /// One-based line number.
    pub(crate) line: usize,
}

/// Splits a request block into assignments.
///
/// `#` starts a comment running to end of line, blank lines are skipped, and
/// a `[section]` header prefixes the keys that follow it with `section.`.
pub(crate) fn lex(text: &str) -> Result<Vec<Entry<'_>>, RequestError> {
    let mut prefix = String::new();
    let mut entries = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let content = strip_comment(raw).trim();
        if content.is_empty() {
            continue;
        }

        if let Some(section) = content
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            let section = section.trim();
            prefix = if section.is_empty() {
                String::new()
            } else {
                format!("{section}.")
            };
            continue;
        }

        let Some((key, value)) = content.split_once('=') else {
            return Err(malformed(line, content));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(malformed(line, content));
        }
        entries.push(Entry {
            key: format!("{prefix}{key}"),
            value: value.trim(),
            line,
        });
    }

    Ok(entries)
}

fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(head, _)| head)
}

fn malformed(line: usize, content: &str) -> RequestError {
    RequestError::MalformedLine {
        line,
        content: content.to_owned(),
    }
}
