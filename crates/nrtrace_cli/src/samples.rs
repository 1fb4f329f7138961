//! Allocator sample-dump extraction for plotting.
//!
//! The traced system periodically dumps blank-line-separated blocks of
//! `key:value` pairs. The `active` series, scaled to MiB, is what gets
//! plotted; the key listing up front shows what else the dump carries.

use nrtrace_replay::ReportSink;
use std::collections::BTreeMap;

/// Group every `key:value` line by key, in dump order per key.
///
/// Lines that are not exactly one `key:value` pair with a numeric value
/// are skipped; block separators and prose fall out naturally.
#[must_use]
pub fn parse_series(text: &str) -> BTreeMap<String, Vec<u64>> {
    let mut series: BTreeMap<String, Vec<u64>> = BTreeMap::new();
    for line in text.lines() {
        let mut parts = line.split(':');
        if let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) {
            if let Ok(value) = value.trim().parse() {
                series.entry(key.to_owned()).or_default().push(value);
            }
        }
    }
    series
}

/// Report the key set, then emit the `active` series in MiB as samples.
pub fn emit_active_series(text: &str, sink: &mut dyn ReportSink) {
    let series = parse_series(text);
    let keys: Vec<&str> = series.keys().map(String::as_str).collect();
    sink.line(&format!("series: {}", keys.join(", ")));
    if let Some(active) = series.get("active") {
        for &value in active {
            sink.sample(value >> 20);
        }
    }
}
