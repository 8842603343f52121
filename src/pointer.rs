//! Structured path lookup inside a reference source.

use serde_json::Value;

/// Split a reference path (the part after `#`) into segments.
/// The leading empty segment produced by the initial `/` is dropped, so
/// `""` and `"/"`-less paths address the source itself.
pub fn split_path(path: &str) -> Vec<String> {
    if path.is_empty() {
        return Vec::new();
    }
    path.split('/')
        .skip(usize::from(path.starts_with('/')))
        .map(unescape)
        .collect()
}

// `~1` before `~0`, so `~01` reads as `~1` and not `/`.
fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Walk `source` segment by segment: objects by key, arrays by index.
pub fn deep_get<'a, S: AsRef<str>>(source: &'a Value, segments: &[S]) -> Option<&'a Value> {
    segments.iter().try_fold(source, |node, seg| {
        let seg = seg.as_ref();
        match node {
            Value::Object(map) => map.get(seg),
            Value::Array(xs) => seg.parse::<usize>().ok().and_then(|i| xs.get(i)),
            _ => None,
        }
    })
}
