// Structured per-request diagnostics.
//
// Soft-failing `get`/`post` calls return `None` on any failure, which is
// the right contract for callers but hides *why* a call failed. Every
// request attempt therefore emits exactly one `Diagnostic` on a broadcast
// channel, so supervising code (and tests) can assert on failure
// classification instead of scraping log text.

use tokio::sync::broadcast;

/// Classification of a failed request attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connection refused, DNS failure, timeout, TLS error.
    Transport,
    /// The server answered, but not with HTTP 200.
    Protocol { status: u16 },
    /// HTTP 200 but the body was not valid JSON.
    Decode,
}

/// Outcome of a single request attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Success { status: u16 },
    Failure(FailureKind),
}

/// One event per request attempt. There are no retries at this layer,
/// so attempts map one-to-one onto calls.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// HTTP method of the attempt.
    pub method: &'static str,
    /// Unsigned request path (no query), e.g. `/config/list/`.
    pub path: String,
    pub outcome: RequestOutcome,
}

impl Diagnostic {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, RequestOutcome::Failure(_))
    }
}

/// Fan-out sender for diagnostics. Lagging or absent receivers never
/// block the request path.
#[derive(Debug, Clone)]
pub(crate) struct DiagnosticSink {
    tx: broadcast::Sender<Diagnostic>,
}

impl DiagnosticSink {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<Diagnostic> {
        self.tx.subscribe()
    }

    pub(crate) fn emit(&self, diagnostic: Diagnostic) {
        // A send error just means nobody is listening right now.
        let _ = self.tx.send(diagnostic);
    }
}
