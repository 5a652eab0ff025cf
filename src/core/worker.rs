//! Worker units: dedicated OS threads that each run one job at a time.
//!
//! Isolation is the thread boundary. A panic inside the parser unwinds the
//! worker thread; the reply sender for the in-flight job is dropped during
//! unwinding, which is what the supervisor observes as a dead worker. A unit
//! abandoned after a timeout keeps running its current job, but its reply
//! lands on a closed channel and it exits as soon as its request channel is
//! dropped by the replacing supervisor.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use tracing::debug;

use crate::parser::{DocumentParser, ParseError, ParsedDocument};

/// Reply channel payload: what the parser produced for one job.
pub(crate) type WorkerReply = Result<ParsedDocument, ParseError>;

/// One job handed to a worker unit, with its single-use reply channel.
struct WorkerRequest {
    input: String,
    reply: Sender<WorkerReply>,
}

/// The unit's thread is gone; it cannot accept work.
#[derive(Debug)]
pub(crate) struct WorkerGone;

/// Isolated execution slot. At most one job is bound to a unit at a time;
/// the unit is reused across jobs and replaced only after a timeout
/// abandonment or an abnormal death.
pub(crate) struct WorkerUnit {
    slot: usize,
    generation: u64,
    request_tx: Sender<WorkerRequest>,
    // Dropped (detached) when the unit is replaced; the thread exits on its
    // own once its request channel disconnects.
    _handle: JoinHandle<()>,
}

impl WorkerUnit {
    /// Spawn a fresh unit for `slot`. The generation distinguishes
    /// replacements within the same slot.
    pub(crate) fn spawn<P: DocumentParser>(
        slot: usize,
        generation: u64,
        stack_size: usize,
        parser: P,
    ) -> Self {
        let (request_tx, request_rx) = unbounded::<WorkerRequest>();

        let handle = thread::Builder::new()
            .name(format!("parse-worker-{slot}.{generation}"))
            .stack_size(stack_size)
            .spawn(move || worker_loop(slot, generation, &request_rx, &parser))
            .expect("failed to spawn worker thread");

        Self {
            slot,
            generation,
            request_tx,
            _handle: handle,
        }
    }

    /// Hand the unit one job. Returns the reply channel the supervisor waits
    /// on with the job deadline.
    pub(crate) fn dispatch(&self, input: String) -> Result<Receiver<WorkerReply>, WorkerGone> {
        let (reply_tx, reply_rx) = bounded(1);
        self.request_tx
            .send(WorkerRequest {
                input,
                reply: reply_tx,
            })
            .map_err(|_| WorkerGone)?;
        Ok(reply_rx)
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Fresh unit for the same slot at the next generation. The caller drops
    /// `self`, detaching the old thread.
    pub(crate) fn replace<P: DocumentParser>(&self, stack_size: usize, parser: P) -> Self {
        Self::spawn(self.slot, self.generation + 1, stack_size, parser)
    }
}

fn worker_loop<P: DocumentParser>(
    slot: usize,
    generation: u64,
    request_rx: &Receiver<WorkerRequest>,
    parser: &P,
) {
    debug!(slot, generation, "worker unit started");

    while let Ok(request) = request_rx.recv() {
        let result = run_job(parser, &request.input);
        // The receiver may already be gone if the supervisor timed this job
        // out and abandoned the unit.
        let _ = request.reply.send(result);
    }

    debug!(slot, generation, "worker unit exiting");
}

/// Empty or absent input maps to a document with exactly one empty section,
/// so callers never special-case it. Everything else goes to the parser.
fn run_job<P: DocumentParser>(parser: &P, input: &str) -> WorkerReply {
    if input.is_empty() {
        return Ok(ParsedDocument::empty());
    }
    parser.parse(input)
}
