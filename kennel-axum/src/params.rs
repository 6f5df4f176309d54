use std::collections::HashMap;

use axum::http::{HeaderMap, Method, Uri};

/// Transport details of one REST call, handed to services as params.
#[derive(Debug, Clone, Default)]
pub struct RestParams {
    pub provider: String,
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    /// Value of `x-request-id`, set by the request-id middleware.
    pub request_id: Option<String>,
}

impl RestParams {
    pub fn from_parts(
        headers: &HeaderMap,
        query: HashMap<String, String>,
        method: &Method,
        uri: &Uri,
    ) -> Self {
        let headers: HashMap<String, String> = headers
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();

        Self {
            provider: "rest".to_string(),
            method: method.as_str().to_string(),
            path: uri.path().to_string(),
            request_id: headers.get("x-request-id").cloned(),
            query,
            headers,
        }
    }
}

/// Build a service's params type from the REST call.
pub trait FromRestParams: Sized {
    fn from_rest_params(params: RestParams) -> Self;
}

impl FromRestParams for RestParams {
    fn from_rest_params(params: RestParams) -> Self {
        params
    }
}

impl FromRestParams for () {
    fn from_rest_params(_params: RestParams) -> Self {}
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn collects_request_details() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("req-1"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        let uri: Uri = "/dogs/3?verbose=1".parse().unwrap();
        let query = HashMap::from([("verbose".to_string(), "1".to_string())]);

        let params = RestParams::from_parts(&headers, query, &Method::PATCH, &uri);

        assert_eq!(params.provider, "rest");
        assert_eq!(params.method, "PATCH");
        assert_eq!(params.path, "/dogs/3");
        assert_eq!(params.request_id.as_deref(), Some("req-1"));
        assert_eq!(
            params.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(params.query.get("verbose").map(String::as_str), Some("1"));
    }
}
