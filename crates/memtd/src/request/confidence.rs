//! Confidence vector micro-parser.

use std::str::FromStr;

use serde::Serialize;

use super::RequestError;

/// Per-system confidence values supplied by the upstream matcher, in system
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfidenceVector(Vec<f64>);

impl ConfidenceVector {
    /// Parses whitespace-separated numbers.
    ///
    /// The whole string must be consumed: a token that is not a finite number
    /// rejects the string, including trailing residue such as `"0.1 0.2 x"`.
    /// An empty or all-blank string yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::BadConfidence`] carrying the raw string.
    pub fn parse(raw: &str) -> Result<Self, RequestError> {
        raw.split_whitespace()
            .map(|token| token.parse::<f64>().ok().filter(|value| value.is_finite()))
            .collect::<Option<Vec<_>>>()
            .map(Self)
            .ok_or_else(|| RequestError::BadConfidence {
                provided: raw.to_owned(),
            })
    }

    /// Confidence values in system order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Confidence of system `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Number of systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no confidences were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Largest confidence, if any.
    #[must_use]
    pub fn max(&self) -> Option<f64> {
        self.0.iter().copied().reduce(f64::max)
    }
}

impl FromStr for ConfidenceVector {
    type Err = RequestError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl From<Vec<f64>> for ConfidenceVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("0.9 0.8 0.95", &[0.9, 0.8, 0.95])]
    #[case("  1\t2\n3  ", &[1.0, 2.0, 3.0])]
    #[case("-0.5 1e-3 +2", &[-0.5, 0.001, 2.0])]
    #[case("", &[])]
    #[case("   ", &[])]
    fn parses_numeric_sequences(#[case] raw: &str, #[case] expected: &[f64]) {
        let vector = ConfidenceVector::parse(raw).expect("confidences should parse");
        assert_eq!(vector.as_slice(), expected);
    }

    #[rstest]
    #[case("0.1 0.2 x")]
    #[case("0.9 abc")]
    #[case("0.9abc")]
    #[case("0.5,0.5")]
    #[case("inf 0.2")]
    #[case("NaN")]
    fn rejects_residue(#[case] raw: &str) {
        let error = ConfidenceVector::parse(raw).expect_err("residue must be rejected");
        assert_eq!(
            error,
            RequestError::BadConfidence {
                provided: raw.to_owned(),
            }
        );
    }

    #[test]
    fn reports_maximum() {
        let vector = ConfidenceVector::from(vec![0.2, 0.7, 0.4]);
        assert_eq!(vector.max(), Some(0.7));
        assert_eq!(ConfidenceVector::default().max(), None);
    }
}
