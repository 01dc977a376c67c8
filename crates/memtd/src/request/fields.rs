//! Declarative table of request keys.
//!
//! Each [`Field`] names its key, whether it is mandatory or which default it
//! falls back to, and how a raw value is stored into [`RequestConfig`].
//! Defaults are written as raw text and go through the same converter as
//! client-supplied values, so validation and default application share one
//! code path.

use camino::Utf8PathBuf;

use super::RequestConfig;

type Apply = fn(&mut RequestConfig, &str) -> Result<(), ValueError>;

/// Whether a key must be supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Presence {
    /// Exactly one occurrence is required.
    Required,
    /// At most one occurrence; the raw default applies when absent.
    Optional(&'static str),
}

/// Conversion failure, described by what the key accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ValueError {
    pub(crate) expected: &'static str,
}

/// One row of the request grammar.
pub(crate) struct Field {
    pub(crate) key: &'static str,
    pub(crate) presence: Presence,
    pub(crate) apply: Apply,
}

impl Field {
    const fn required(key: &'static str, apply: Apply) -> Self {
        Self {
            key,
            presence: Presence::Required,
            apply,
        }
    }

    const fn optional(key: &'static str, default: &'static str, apply: Apply) -> Self {
        Self {
            key,
            presence: Presence::Optional(default),
            apply,
        }
    }

    /// Checks the occurrence count against the key's presence rule.
    pub(crate) fn accepts_count(&self, actual: usize) -> bool {
        match self.presence {
            Presence::Required => actual == 1,
            Presence::Optional(_) => actual <= 1,
        }
    }

    /// Raw default for optional keys.
    pub(crate) fn default_value(&self) -> Option<&'static str> {
        match self.presence {
            Presence::Required => None,
            Presence::Optional(default) => Some(default),
        }
    }
}

/// The request grammar, in validation order.
pub(crate) const FIELDS: &[Field] = &[
    Field::required("score.lm", |config, raw| {
        config.decoder.scorer.lm = parse_float(raw)?;
        Ok(())
    }),
    Field::required("score.alignment", |config, raw| {
        config.decoder.scorer.alignment = parse_float(raw)?;
        Ok(())
    }),
    Field::required("score.ngram", |config, raw| {
        config.decoder.scorer.ngram = parse_float(raw)?;
        Ok(())
    }),
    // 1/3 rendered with enough digits to round-trip exactly.
    Field::optional("score.ngram_base", "0.3333333333333333", |config, raw| {
        config.decoder.scorer.ngram_base = parse_float(raw)?;
        Ok(())
    }),
    Field::required("score.overlap", |config, raw| {
        config.decoder.scorer.overlap = parse_float(raw)?;
        Ok(())
    }),
    Field::optional("score.fuzz.ratio", "0", |config, raw| {
        config.decoder.scorer.fuzz_ratio = parse_float(raw)?;
        Ok(())
    }),
    Field::optional("beam_size", "500", |config, raw| {
        config.decoder.internal_beam_size = parse_positive(raw)?;
        Ok(())
    }),
    Field::optional("length_normalize", "true", |config, raw| {
        config.decoder.length_normalize = parse_bool(raw)?;
        Ok(())
    }),
    Field::optional("output.nbest", "1", |config, raw| {
        config.decoder.end_beam_size = parse_positive(raw)?;
        Ok(())
    }),
    Field::optional("horizon.radius", "5", |config, raw| {
        config.decoder.coverage.radius = parse_count(raw)?;
        Ok(())
    }),
    Field::optional("horizon.new", "false", |config, raw| {
        config.decoder.coverage.use_new = parse_bool(raw)?;
        Ok(())
    }),
    Field::optional("horizon.threshold", "0.8", |config, raw| {
        config.decoder.coverage.stay_threshold = parse_float(raw)?;
        Ok(())
    }),
    Field::optional("output.oracle_prefix", "", |config, raw| {
        raw.clone_into(&mut config.output_oracle_prefix);
        Ok(())
    }),
    Field::required("output.one_best", |config, raw| {
        config.output_one_best = parse_path(raw)?;
        Ok(())
    }),
    Field::required("input.matched_file", |config, raw| {
        config.input_matched = parse_path(raw)?;
        Ok(())
    }),
    Field::required("input.confidence", |config, raw| {
        raw.clone_into(&mut config.confidence_string);
        Ok(())
    }),
    Field::optional("align.pick_best", "false", |config, raw| {
        config.input.pick_best = parse_bool(raw)?;
        Ok(())
    }),
    Field::optional("align.transitive", "false", |config, raw| {
        config.input.transitive = parse_bool(raw)?;
        Ok(())
    }),
];

/// Finds the table row for `key`.
pub(crate) fn lookup(key: &str) -> Option<&'static Field> {
    FIELDS.iter().find(|field| field.key == key)
}

fn parse_float(raw: &str) -> Result<f64, ValueError> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or(ValueError {
            expected: "a finite number",
        })
}

fn parse_count(raw: &str) -> Result<u32, ValueError> {
    raw.parse::<u32>().map_err(|_| ValueError {
        expected: "a non-negative integer",
    })
}

fn parse_positive(raw: &str) -> Result<u32, ValueError> {
    raw.parse::<u32>()
        .ok()
        .filter(|value| *value >= 1)
        .ok_or(ValueError {
            expected: "a positive integer",
        })
}

fn parse_bool(raw: &str) -> Result<bool, ValueError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ValueError {
            expected: "a boolean (true/false, yes/no, on/off, 1/0)",
        }),
    }
}

fn parse_path(raw: &str) -> Result<Utf8PathBuf, ValueError> {
    if raw.is_empty() {
        return Err(ValueError {
            expected: "a non-empty path",
        });
    }
    Ok(Utf8PathBuf::from(raw))
}
