use crate::record::{CallerLocation, FieldValue, SourceLocation};
use std::path::Path;

/// Source location to report for an event.
///
/// `caller` is whatever the pipeline captured. When the event came through a
/// convenience reporter, `convenience` carries the reporter's own call site
/// and takes its place; a marker that cannot be parsed yields no location.
/// Nothing is reported when the pipeline did not capture a caller.
pub(crate) fn resolve(
    caller: Option<&CallerLocation>,
    convenience: Option<&FieldValue>,
) -> Option<SourceLocation> {
    let caller = caller?;
    match convenience {
        Some(marker) => parse_marker(marker),
        None => Some(SourceLocation {
            file: base_name(&caller.file).to_string(),
            line: caller.line,
            function: caller.function.clone(),
        }),
    }
}

/// Encode a call site as the convenience marker value:
/// `"<file>:<line>"`, or `"<function>@<file>:<line>"` when the function is
/// known.
pub(crate) fn marker(file: &str, line: u32, function: Option<&str>) -> String {
    match function {
        Some(function) => format!("{}@{}:{}", function, file, line),
        None => format!("{}:{}", file, line),
    }
}

fn parse_marker(marker: &FieldValue) -> Option<SourceLocation> {
    let text = match marker {
        FieldValue::Json(serde_json::Value::String(s)) => s.as_str(),
        _ => return None,
    };
    let (function, site) = match text.split_once('@') {
        Some((function, site)) if !function.is_empty() => (Some(function.to_string()), site),
        Some(_) => return None,
        None => (None, text),
    };
    let (file, line) = site.rsplit_once(':')?;
    let line = line.parse::<u32>().ok()?;
    if file.is_empty() {
        return None;
    }
    Some(SourceLocation {
        file: base_name(file).to_string(),
        line: Some(line),
        function,
    })
}

fn base_name(file: &str) -> &str {
    Path::new(file)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file)
}
