//! Multi-document JSON recovery
//!
//! fio appends a fresh JSON document to its output file on every run when
//! the same `--output` path is reused, so a single result file can hold
//! several objects separated only by whitespace. We decode them one at a
//! time and stop at the first thing that does not parse, keeping what we
//! already have.

use serde_json::{Deserializer, Map, Value};

/// Documents recovered from one file's text
#[derive(Debug, Default)]
pub struct Recovered {
    /// Top-level JSON objects, in file order
    pub objects: Vec<Map<String, Value>>,
    /// Number of top-level values that decoded but were not objects
    pub discarded: usize,
    /// Decode error that ended recovery, if it did not reach end of input
    pub error: Option<serde_json::Error>,
}

impl Recovered {
    /// The most recent run's document
    pub fn latest(&self) -> Option<&Map<String, Value>> {
        self.objects.last()
    }

    pub fn into_latest(mut self) -> Option<Map<String, Value>> {
        self.objects.pop()
    }
}

/// Decode consecutive JSON values from `content`
///
/// Whitespace between documents is skipped. Scalars and arrays at the top
/// level are counted in [`Recovered::discarded`] and otherwise ignored.
pub fn recover_documents(content: &str) -> Recovered {
    let mut recovered = Recovered::default();

    for value in Deserializer::from_str(content).into_iter::<Value>() {
        match value {
            Ok(Value::Object(map)) => recovered.objects.push(map),
            Ok(_) => recovered.discarded += 1,
            Err(e) => {
                recovered.error = Some(e);
                break;
            }
        }
    }

    recovered
}
