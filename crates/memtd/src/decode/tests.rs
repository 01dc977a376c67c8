//! Tests for the decode loop and the reference engine.

use std::collections::VecDeque;
use std::fs;
use std::io::Cursor;

use camino::{Utf8Path, Utf8PathBuf};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;
use crate::model::CorpusModel;

struct QueuedInput(VecDeque<InputUnit>);

impl InputFactory for QueuedInput {
    fn next_unit(&mut self) -> Result<Option<InputUnit>, DecodeError> {
        Ok(self.0.pop_front())
    }
}

struct EchoDecoder;

impl Decoder for EchoDecoder {
    fn decode(&self, unit: &InputUnit) -> Vec<Hypothesis> {
        unit.systems
            .iter()
            .enumerate()
            .map(|(system, line)| Hypothesis {
                system,
                text: line.text(),
                score: line.confidence,
                features: Features::default(),
            })
            .collect()
    }
}

#[derive(Default)]
struct RecordingSink {
    units: Vec<usize>,
    finished: bool,
}

impl HypothesisSink for RecordingSink {
    fn write(&mut self, unit: &InputUnit, _nbest: &[Hypothesis]) -> Result<(), DecodeError> {
        self.units.push(unit.index);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), DecodeError> {
        self.finished = true;
        Ok(())
    }
}

fn line(text: &str) -> SystemLine {
    let tokens: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
    SystemLine {
        ids: vec![None; tokens.len()],
        tokens,
        confidence: 1.0,
    }
}

fn queued(units: &[&[&str]]) -> QueuedInput {
    QueuedInput(
        units
            .iter()
            .enumerate()
            .map(|(index, lines)| {
                InputUnit::new(index, lines.iter().map(|text| line(text)).collect())
            })
            .collect(),
    )
}

#[test]
fn drive_visits_every_unit_until_exhaustion() {
    let mut input = queued(&[&["a b"], &[], &["c"]]);
    let mut top = RecordingSink::default();

    let summary = drive(&mut input, &EchoDecoder, &mut top, None).expect("drive succeeds");

    assert_eq!(
        summary,
        DecodeSummary {
            units: 3,
            decoded: 2
        }
    );
    assert_eq!(top.units, vec![0, 1, 2]);
    assert!(top.finished);
}

#[test]
fn drive_feeds_oracle_only_when_present() {
    let mut input = queued(&[&["a"], &["b"]]);
    let mut top = RecordingSink::default();
    let mut oracle = RecordingSink::default();

    drive(
        &mut input,
        &EchoDecoder,
        &mut top,
        Some(&mut oracle as &mut dyn HypothesisSink),
    )
    .expect("drive succeeds");

    assert_eq!(oracle.units, vec![0, 1]);
    assert!(oracle.finished);
}

#[test]
fn top_writer_emits_empty_line_without_hypotheses() {
    let mut input = queued(&[&["first line", "other"], &[], &["third"]]);
    let mut top = TopWriter::new(Vec::new(), Utf8Path::new("memory"));

    drive(&mut input, &EchoDecoder, &mut top, None).expect("drive succeeds");

    let written = String::from_utf8(top.into_inner()).expect("utf8 output");
    assert_eq!(written, "first line\n\nthird\n");
}

#[test]
fn oracle_writer_annotates_every_entry() {
    let unit = InputUnit::new(4, vec![line("x y"), line("z")]);
    let nbest = EchoDecoder.decode(&unit);
    let mut oracle = OracleWriter::new(Vec::new(), Utf8Path::new("memory.oracle"));

    oracle.write(&unit, &nbest).expect("write succeeds");

    let written = String::from_utf8(oracle.into_inner()).expect("utf8 output");
    assert_eq!(written, "4\t0\t0\t1.000000\tx y\n4\t1\t1\t1.000000\tz\n");
}

#[test]
fn oracle_path_appends_suffix() {
    assert_eq!(oracle_path("/tmp/run1"), Utf8PathBuf::from("/tmp/run1.oracle"));
}

struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
    model: LoadedModel,
}

impl Workspace {
    fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    fn request(&self, matched: &Utf8Path, extra: &str) -> RequestConfig {
        let block = format!(
            "score.lm = 1\nscore.alignment = 1\nscore.ngram = 1\nscore.overlap = 1\n\
             output.one_best = {}\ninput.matched_file = {matched}\n\
             input.confidence = 0.9 0.8 0.95\n{extra}",
            self.path("out.txt")
        );
        RequestConfig::parse_block(&block).expect("request should parse")
    }
}

#[fixture]
fn workspace() -> Workspace {
    let dir = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
    let model = CorpusModel::from_reader(
        Cursor::new("the cat sat on the mat\n"),
        Utf8Path::new("corpus"),
        3,
    )
    .map(LoadedModel::Salm)
    .expect("corpus loads");
    Workspace {
        _dir: dir,
        root,
        model,
    }
}

#[rstest]
fn reference_engine_writes_one_best(workspace: Workspace) {
    let matched = workspace.path("in.txt");
    fs::write(
        &matched,
        "the cat sat\nthe cat sat down\na cat\n\nthe mat\nthe mat\nthe cat\n",
    )
    .expect("write matched input");
    let request = workspace.request(&matched, "");

    let summary = ReferenceEngine
        .run(&workspace.model, &request)
        .expect("decode succeeds");

    assert_eq!(summary.units, 2);
    let output = fs::read_to_string(workspace.path("out.txt")).expect("read output");
    assert_eq!(output, "the cat sat\nthe mat\n");
    assert!(!oracle_path(workspace.path("run").as_str()).exists());
}

#[rstest]
fn reference_engine_writes_oracle_when_prefix_set(workspace: Workspace) {
    let matched = workspace.path("in.txt");
    fs::write(&matched, "a b\na b\nc\n").expect("write matched input");
    let prefix = workspace.path("run");
    let extra = format!("output.oracle_prefix = {prefix}\noutput.nbest = 3\n");
    let request = workspace.request(&matched, &extra);

    ReferenceEngine
        .run(&workspace.model, &request)
        .expect("decode succeeds");

    let oracle = fs::read_to_string(oracle_path(prefix.as_str())).expect("read oracle");
    assert_eq!(oracle.lines().count(), 3);
    assert!(oracle.lines().all(|entry| entry.starts_with("0\t")));
}

#[rstest]
fn missing_input_leaves_output_untouched(workspace: Workspace) {
    let request = workspace.request(&workspace.path("absent.txt"), "");

    let error = ReferenceEngine
        .run(&workspace.model, &request)
        .expect_err("input is missing");

    assert!(matches!(error, DecodeError::OpenInput { .. }));
    assert!(!workspace.path("out.txt").exists());
}

#[rstest]
fn unit_shape_mismatch_is_reported(workspace: Workspace) {
    let matched = workspace.path("in.txt");
    fs::write(&matched, "only one line\n").expect("write matched input");
    let request = workspace.request(&matched, "");

    let error = ReferenceEngine
        .run(&workspace.model, &request)
        .expect_err("unit is short");

    assert!(matches!(
        error,
        DecodeError::InputShape {
            unit: 0,
            expected: 3,
            actual: 1
        }
    ));
}
