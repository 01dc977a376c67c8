//! Unit tests for request validation.

use std::io::Cursor;

use rstest::{fixture, rstest};

use super::*;

const MANDATORY: &[(&str, &str)] = &[
    ("score.lm", "1.0"),
    ("score.alignment", "1.0"),
    ("score.ngram", "1.0"),
    ("score.overlap", "1.0"),
    ("output.one_best", "/tmp/out.txt"),
    ("input.matched_file", "/tmp/in.txt"),
    ("input.confidence", "0.9 0.8 0.95"),
];

fn render(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key} = {value}\n"))
        .collect()
}

#[fixture]
fn scenario() -> String {
    render(MANDATORY)
}

#[rstest]
fn scenario_request_applies_defaults(scenario: String) {
    let config = RequestConfig::parse(scenario.as_bytes()).expect("scenario should parse");

    assert_eq!(config.decoder.scorer.lm, 1.0);
    assert_eq!(config.decoder.scorer.ngram_base, 1.0 / 3.0);
    assert_eq!(config.decoder.scorer.fuzz_ratio, 0.0);
    assert_eq!(config.decoder.internal_beam_size, 500);
    assert!(config.decoder.length_normalize);
    assert_eq!(config.decoder.end_beam_size, 1);
    assert_eq!(config.decoder.coverage.radius, 5);
    assert!(!config.decoder.coverage.use_new);
    assert_eq!(config.decoder.coverage.stay_threshold, 0.8);
    assert!(!config.oracle_enabled());
    assert!(!config.input.pick_best);
    assert!(!config.input.transitive);
    assert_eq!(config.output_one_best.as_str(), "/tmp/out.txt");
    assert_eq!(config.input_matched.as_str(), "/tmp/in.txt");
    assert_eq!(config.input.confidences.as_slice(), &[0.9, 0.8, 0.95]);
}

#[rstest]
fn absent_beam_size_matches_explicit_default(scenario: String) {
    let implicit = RequestConfig::parse(scenario.as_bytes()).expect("implicit default");
    let explicit = RequestConfig::parse(format!("{scenario}beam_size = 500\n").as_bytes())
        .expect("explicit default");
    assert_eq!(implicit, explicit);
}

#[rstest]
fn omitting_a_mandatory_key_names_it() {
    for (omitted, _) in MANDATORY {
        let pairs: Vec<_> = MANDATORY
            .iter()
            .copied()
            .filter(|(key, _)| key != omitted)
            .collect();
        let error = RequestConfig::parse(render(&pairs).as_bytes()).expect_err("key is mandatory");
        assert_eq!(
            error,
            RequestError::KeyCount {
                key: *omitted,
                expected: 1,
                actual: 0,
            }
        );
        assert_eq!(error.key(), Some(*omitted));
    }
}

#[rstest]
fn duplicating_a_mandatory_key_names_it(scenario: String) {
    for (key, value) in MANDATORY {
        let block = format!("{scenario}{key} = {value}\n");
        let error = RequestConfig::parse(block.as_bytes()).expect_err("key is duplicated");
        assert_eq!(
            error.to_string(),
            format!("expected {key} 1 time(s), got it 2")
        );
    }
}

#[rstest]
fn duplicated_optional_key_is_rejected(scenario: String) {
    let block = format!("{scenario}beam_size = 10\nbeam_size = 20\n");
    let error = RequestConfig::parse(block.as_bytes()).expect_err("optional key repeated");
    assert!(matches!(
        error,
        RequestError::KeyCount {
            key: "beam_size",
            actual: 2,
            ..
        }
    ));
}

#[rstest]
fn sections_prefix_keys() {
    let block = "\
[score]
lm = 0.5
alignment = 1
ngram = 2
overlap = 3
fuzz.ratio = 0.1

[output]
one_best = out.txt
oracle_prefix = run1

[input]
matched_file = in.txt
confidence = 1 1
";
    let config = RequestConfig::parse_block(block).expect("sectioned block should parse");
    assert_eq!(config.decoder.scorer.lm, 0.5);
    assert_eq!(config.decoder.scorer.fuzz_ratio, 0.1);
    assert_eq!(config.output_oracle_prefix, "run1");
    assert!(config.oracle_enabled());
}

#[rstest]
fn unknown_keys_are_rejected(scenario: String) {
    let block = format!("{scenario}score.bogus = 1\n");
    let error = RequestConfig::parse(block.as_bytes()).expect_err("key is unknown");
    assert_eq!(
        error,
        RequestError::UnknownKey {
            key: "score.bogus".to_owned(),
            line: MANDATORY.len() + 1,
        }
    );
}

#[rstest]
#[case("beam_size", "0")]
#[case("output.nbest", "many")]
#[case("horizon.radius", "-1")]
#[case("length_normalize", "maybe")]
#[case("score.ngram_base", "inf")]
#[case("horizon.threshold", "")]
fn unconvertible_values_are_rejected(
    scenario: String,
    #[case] key: &'static str,
    #[case] value: &str,
) {
    let block = format!("{scenario}{key} = {value}\n");
    let error = RequestConfig::parse(block.as_bytes()).expect_err("value is invalid");
    let RequestError::InvalidValue { key: found, value: raw, .. } = error else {
        panic!("unexpected error: {error:?}");
    };
    assert_eq!(found, key);
    assert_eq!(raw, value);
}

#[rstest]
fn empty_output_path_is_rejected() {
    let mut pairs = MANDATORY.to_vec();
    pairs.retain(|(key, _)| *key != "output.one_best");
    pairs.push(("output.one_best", ""));
    let error = RequestConfig::parse(render(&pairs).as_bytes()).expect_err("path is empty");
    assert_eq!(error.key(), Some("output.one_best"));
}

#[rstest]
#[case("0.9 abc")]
#[case("0.1 0.2 x")]
#[case("0.5,0.5")]
#[case("NaN")]
fn malformed_confidence_is_rejected(#[case] confidence: &str) {
    let mut pairs = MANDATORY.to_vec();
    pairs.retain(|(key, _)| *key != "input.confidence");
    pairs.push(("input.confidence", confidence));
    let error = RequestConfig::parse(render(&pairs).as_bytes()).expect_err("confidence is bad");
    assert_eq!(
        error,
        RequestError::BadConfidence {
            provided: confidence.to_owned(),
        }
    );
}

#[rstest]
fn cardinality_is_checked_before_conversion() {
    let block = "score.lm = nope\n";
    let error = RequestConfig::parse_block(block).expect_err("block is incomplete");
    assert!(matches!(
        error,
        RequestError::KeyCount {
            key: "score.alignment",
            ..
        }
    ));
}

#[rstest]
#[case(None, 5)]
#[case(Some("0"), 0)]
#[case(Some("12"), 12)]
fn horizon_radius_is_copied_into_input(
    scenario: String,
    #[case] radius: Option<&str>,
    #[case] expected: u32,
) {
    let block = match radius {
        Some(value) => format!("{scenario}horizon.radius = {value}\n"),
        None => scenario,
    };
    let config = RequestConfig::parse(block.as_bytes()).expect("request should parse");
    assert_eq!(config.decoder.coverage.radius, expected);
    assert_eq!(config.input.horizon_radius, expected);
}

#[rstest]
fn oversize_body_is_rejected_without_lexing() {
    let body = vec![b'#'; MAX_REQUEST_BYTES + 1];
    let error = RequestConfig::parse(&body).expect_err("body is too large");
    assert_eq!(
        error,
        RequestError::RequestTooLarge {
            max_size: MAX_REQUEST_BYTES,
        }
    );
}

#[rstest]
fn read_block_stops_one_byte_past_limit() {
    let body = vec![b' '; MAX_REQUEST_BYTES + 100];
    let read = read_block(Cursor::new(body)).expect("in-memory read");
    assert_eq!(read.len(), MAX_REQUEST_BYTES + 1);
}

#[rstest]
fn non_utf8_body_is_rejected() {
    let error = RequestConfig::parse(&[0x73, 0xff, 0x3d]).expect_err("not UTF-8");
    assert_eq!(error, RequestError::InvalidEncoding);
}

#[rstest]
fn serialises_for_the_request_echo(scenario: String) {
    let config = RequestConfig::parse(scenario.as_bytes()).expect("scenario should parse");
    let json = serde_json::to_value(&config).expect("config serialises");
    assert_eq!(json["decoder"]["internal_beam_size"], 500);
    assert_eq!(json["input"]["confidences"][1], 0.8);
}
