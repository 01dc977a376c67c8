//! Test helpers for the transport module.

use std::io::Write;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use super::{ConnectionFailure, ConnectionHandler, ConnectionStream};

/// Counts connections and answers each with `ok\n`.
pub(crate) struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            count: Arc::clone(&count),
        });
        (count, handler)
    }
}

impl ConnectionHandler for CountingHandler {
    fn handle(&self, mut stream: ConnectionStream) -> Result<(), ConnectionFailure> {
        self.count.fetch_add(1, Ordering::SeqCst);
        stream.write_all(b"ok\n")?;
        Ok(())
    }
}

/// Panics on the first connection and counts the ones after it.
pub(crate) struct PanickingHandler {
    seen: AtomicUsize,
    served: Arc<AtomicUsize>,
}

impl PanickingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let served = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            seen: AtomicUsize::new(0),
            served: Arc::clone(&served),
        });
        (served, handler)
    }
}

impl ConnectionHandler for PanickingHandler {
    fn handle(&self, _stream: ConnectionStream) -> Result<(), ConnectionFailure> {
        if self.seen.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("first connection blows up");
        }
        self.served.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
