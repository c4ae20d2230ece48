use crate::record::{Fields, HttpRequest};

/// HTTP method of the request being logged. A non-empty value turns on the
/// `httpRequest` block.
pub const REQUEST_METHOD: &str = "requestMethod";
pub const REQUEST_URL: &str = "requestUrl";
/// Request latency. Any value is accepted and rendered as text, so a
/// `Duration` recorded with `?` shows up as e.g. `"1.5s"`.
pub const LATENCY: &str = "latency";
pub const RESPONSE_STATUS: &str = "responseStatus";

/// Move the HTTP request fields out of `fields` into an [`HttpRequest`].
///
/// Nothing is claimed unless [`REQUEST_METHOD`] is present and non-empty.
pub(crate) fn extract(fields: &mut Fields) -> Option<HttpRequest> {
    if !fields.get(REQUEST_METHOD)?.is_truthy() {
        return None;
    }

    let mut take = |key: &str| fields.remove(key).map(|v| v.to_text()).unwrap_or_default();
    Some(HttpRequest {
        request_method: take(REQUEST_METHOD),
        request_url: take(REQUEST_URL),
        latency: take(LATENCY),
        status: take(RESPONSE_STATUS),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;

    fn fields(pairs: &[(&str, FieldValue)]) -> Fields {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn claims_request_fields() {
        let mut f = fields(&[
            (REQUEST_METHOD, "GET".into()),
            (REQUEST_URL, "/v1/things".into()),
            (LATENCY, 0.25f64.into()),
            ("user", "bob".into()),
        ]);

        let req = extract(&mut f).unwrap();
        assert_eq!(req.request_method, "GET");
        assert_eq!(req.request_url, "/v1/things");
        assert_eq!(req.latency, "0.25");
        assert_eq!(req.status, "");
        assert_eq!(f.keys().collect::<Vec<_>>(), vec!["user"]);
    }

    #[test]
    fn empty_method_leaves_fields_alone() {
        let mut f = fields(&[(REQUEST_METHOD, "".into()), (REQUEST_URL, "/x".into())]);
        assert!(extract(&mut f).is_none());
        assert_eq!(f.len(), 2);
    }

    #[test]
    fn missing_method_is_a_noop() {
        let mut f = fields(&[(REQUEST_URL, "/x".into()), (LATENCY, "3ms".into())]);
        assert!(extract(&mut f).is_none());
        assert_eq!(f.len(), 2);
    }
}
