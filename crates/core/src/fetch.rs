//! Schema acquisition from a remote endpoint or the local filesystem.

use std::path::Path;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use crate::error::ZeusError;
use crate::introspection::{INTROSPECTION_QUERY, IntrospectionSchema};
use crate::options::HttpMethod;

const FETCH_TIMEOUT_SECS: u64 = 30;

/// Request settings for a remote schema fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Raw `Name: Value` header strings.
    pub headers: Vec<String>,
    pub method: HttpMethod,
}

fn build_client() -> Result<reqwest::Client, String> {
    reqwest::Client::builder().build().map_err(|err| {
        warn!(error = %err, "Failed to build schema HTTP client.");
        format!("Failed to build HTTP client: {err}")
    })
}

/// Parse `Name: Value` strings. The value is everything after the first `:`.
pub fn parse_headers(raw: &[String]) -> Result<HeaderMap, String> {
    let mut headers = HeaderMap::new();
    for header in raw {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| format!("Invalid header '{header}', expected 'Name: Value'"))?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|err| format!("Invalid header name in '{header}': {err}"))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|err| format!("Invalid header value in '{header}': {err}"))?;
        headers.append(name, value);
    }
    Ok(headers)
}

/// Fetch schema text from `url` with the introspection query.
///
/// Any failure (transport, non-success status, empty body, GraphQL errors)
/// is a [`ZeusError::SchemaFetchFailed`]. No retries.
pub async fn fetch_schema(url: &str, options: &FetchOptions) -> Result<String, ZeusError> {
    let fail = |reason: String| ZeusError::SchemaFetchFailed {
        url: url.to_string(),
        reason,
    };

    let headers = parse_headers(&options.headers).map_err(fail)?;
    let client = build_client().map_err(fail)?;

    let request = match options.method {
        HttpMethod::Get => {
            let mut target =
                Url::parse(url).map_err(|err| fail(format!("Invalid URL: {err}")))?;
            target
                .query_pairs_mut()
                .append_pair("query", INTROSPECTION_QUERY);
            client.get(target)
        }
        HttpMethod::Post => client
            .post(url)
            .json(&json!({ "query": INTROSPECTION_QUERY })),
    };

    debug!(%url, method = options.method.as_str(), "Sending schema introspection request.");
    let response = request
        .headers(headers)
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .send()
        .await
        .map_err(|err| fail(format!("Request failed: {err}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(fail(format!("Server responded with status {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|err| fail(format!("Failed to read response body: {err}")))?;
    debug!(%status, body_len = body.len(), "Received schema response.");

    if body.trim().is_empty() {
        return Err(fail("Empty response body".to_string()));
    }

    schema_text_from_body(&body).map_err(fail)
}

/// Turn a response body into schema text. JSON bodies must carry an
/// introspection result; anything else is taken as schema text verbatim.
fn schema_text_from_body(body: &str) -> Result<String, String> {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return Ok(body.to_string());
    };

    if let Some(schema) = json.pointer("/data/__schema") {
        let schema: IntrospectionSchema = serde_json::from_value(schema.clone())
            .map_err(|err| format!("Malformed introspection result: {err}"))?;
        return schema.to_sdl();
    }

    if let Some(errors) = json.get("errors").and_then(Value::as_array) {
        let messages = errors
            .iter()
            .map(|e| {
                e.get("message")
                    .and_then(Value::as_str)
                    .map_or_else(|| e.to_string(), String::from)
            })
            .collect::<Vec<_>>();
        return Err(format!("GraphQL errors: {}", messages.join("; ")));
    }

    Err("Response JSON carries no introspection result".to_string())
}

/// Read schema text from a local file.
pub async fn read_schema_file(path: &Path) -> Result<String, ZeusError> {
    debug!(path = %path.display(), "Reading schema file.");
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ZeusError::SchemaSourceUnreadable {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SDL: &str = "type Query {\n  ping: String\n}\n";

    fn introspection_body() -> Value {
        json!({
            "data": { "__schema": {
                "queryType": { "name": "Query" },
                "mutationType": null,
                "subscriptionType": null,
                "types": [{
                    "kind": "OBJECT", "name": "Query", "description": null,
                    "fields": [{
                        "name": "ping", "description": null, "args": [],
                        "type": { "kind": "SCALAR", "name": "String", "ofType": null },
                        "isDeprecated": false, "deprecationReason": null
                    }],
                    "inputFields": null, "interfaces": [], "enumValues": null, "possibleTypes": null
                }]
            }}
        })
    }

    #[test]
    fn test_parse_headers() {
        let headers = parse_headers(&[
            "Authorization: Bearer abc:def".to_string(),
            "X-Team:core".to_string(),
        ])
        .unwrap();
        assert_eq!(headers["authorization"], "Bearer abc:def");
        assert_eq!(headers["x-team"], "core");

        assert!(parse_headers(&["no-colon".to_string()]).is_err());
    }

    #[tokio::test]
    async fn test_post_introspection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("authorization", "Bearer token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(introspection_body()))
            .expect(1)
            .mount(&server)
            .await;

        let options = FetchOptions {
            headers: vec!["Authorization: Bearer token".to_string()],
            method: HttpMethod::Post,
        };
        let sdl = fetch_schema(&format!("{}/graphql", server.uri()), &options)
            .await
            .unwrap();
        assert!(sdl.contains("type Query {"));
        assert!(sdl.contains("ping: String"));
    }

    #[tokio::test]
    async fn test_get_sends_query_parameter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/graphql"))
            .and(query_param("query", INTROSPECTION_QUERY))
            .respond_with(ResponseTemplate::new(200).set_body_string(SDL))
            .expect(1)
            .mount(&server)
            .await;

        let options = FetchOptions {
            headers: vec![],
            method: HttpMethod::Get,
        };
        let sdl = fetch_schema(&format!("{}/graphql", server.uri()), &options)
            .await
            .unwrap();
        assert_eq!(sdl, SDL);
    }

    #[tokio::test]
    async fn test_unrecognized_method_is_sent_as_post() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SDL))
            .expect(1)
            .mount(&server)
            .await;

        let options = FetchOptions {
            headers: vec![],
            method: HttpMethod::normalize(Some("DELETE")),
        };
        fetch_schema(&server.uri(), &options).await.unwrap();
    }

    #[tokio::test]
    async fn test_error_status_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = fetch_schema(&server.uri(), &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ZeusError::SchemaFetchFailed { .. }));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_empty_body_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("  "))
            .mount(&server)
            .await;

        let err = fetch_schema(&server.uri(), &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Empty response body"));
    }

    #[tokio::test]
    async fn test_graphql_errors_fail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "errors": [{ "message": "introspection disabled" }] })),
            )
            .mount(&server)
            .await;

        let err = fetch_schema(&server.uri(), &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("introspection disabled"));
    }

    #[tokio::test]
    async fn test_unreachable_host_fails() {
        let err = fetch_schema("http://127.0.0.1:1/graphql", &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ZeusError::SchemaFetchFailed { .. }));
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("schema.graphql");
        let err = read_schema_file(&missing).await.unwrap_err();
        assert!(matches!(err, ZeusError::SchemaSourceUnreadable { .. }));
    }
}
