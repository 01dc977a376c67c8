//! Test suites for the memtd daemon lifecycle.

mod support;
