//! The replay seam: one engine folds over one event stream.

use crate::report::ReportSink;
use nrtrace_core::{TraceError, TraceResult};
use nrtrace_log::TraceEvent;

/// A stateful consumer of one trace event stream.
///
/// Engines see every event in file order exactly once, then get a final
/// `finish` call when the stream ends. The first error aborts the fold;
/// state past that point is not trustworthy and is never reported.
pub trait ReplayEngine {
    /// Observe the next event in file order
    ///
    /// # Errors
    ///
    /// Returns an error on a protocol breach or an accounting mismatch.
    fn on_event(&mut self, event: &TraceEvent, sink: &mut dyn ReportSink) -> TraceResult<()>;

    /// The stream ended; emit the end-of-replay report
    ///
    /// # Errors
    ///
    /// Returns an error if the stream ended while the protocol still
    /// required another event.
    fn finish(&mut self, sink: &mut dyn ReportSink) -> TraceResult<()>;
}

/// Fold one engine over one event stream, fail-fast.
///
/// # Errors
///
/// Propagates the first parse or replay error.
pub fn replay<I>(
    events: I,
    engine: &mut dyn ReplayEngine,
    sink: &mut dyn ReportSink,
) -> TraceResult<()>
where
    I: IntoIterator<Item = TraceResult<TraceEvent>>,
{
    for event in events {
        engine.on_event(&event?, sink)?;
    }
    engine.finish(sink)
}

/// Pull a numeric token out of an event, by token position.
pub(crate) fn num_arg<T: std::str::FromStr>(
    event: &TraceEvent,
    index: usize,
    what: &'static str,
) -> TraceResult<T> {
    let token = event.tokens.get(index).map_or("", String::as_str);
    token.parse().map_err(|_| TraceError::BadNumber { what, text: token.to_string() })
}
