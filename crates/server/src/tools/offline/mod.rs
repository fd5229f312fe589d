//! Tools backed by the offline cache.

pub mod fetch;
pub mod install;
pub mod status;

use noor_core::CapturedResponse;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A response as returned to the MCP client.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResponseView {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    /// Body size in bytes.
    pub body_bytes: usize,
    /// Body as text, present only for textual content types.
    pub body: Option<String>,
}

impl From<&CapturedResponse> for ResponseView {
    fn from(response: &CapturedResponse) -> Self {
        let content_type = response.content_type().map(str::to_string);
        let body = content_type
            .as_deref()
            .filter(|ct| is_textual(ct))
            .map(|_| String::from_utf8_lossy(&response.body).into_owned());

        Self {
            url: response.url.clone(),
            status: response.status,
            content_type,
            headers: response.headers.clone(),
            body_bytes: response.body.len(),
            body,
        }
    }
}

fn is_textual(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    mime.starts_with("text/")
        || mime == "application/json"
        || mime == "application/javascript"
        || mime.ends_with("+json")
        || mime.ends_with("+xml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(content_type: &str, body: &[u8]) -> CapturedResponse {
        CapturedResponse {
            url: "http://127.0.0.1:5000/x".into(),
            status: 200,
            headers: vec![("content-type".into(), content_type.into())],
            body: body.to_vec(),
        }
    }

    #[test]
    fn test_textual_body_included() {
        let view = ResponseView::from(&response("text/html; charset=utf-8", b"<h1>Quran</h1>"));
        assert_eq!(view.body.as_deref(), Some("<h1>Quran</h1>"));
        assert_eq!(view.body_bytes, 14);
    }

    #[test]
    fn test_binary_body_omitted() {
        let view = ResponseView::from(&response("audio/mpeg", &[0xff, 0xfb, 0x90]));
        assert!(view.body.is_none());
        assert_eq!(view.body_bytes, 3);
    }

    #[test]
    fn test_is_textual() {
        assert!(is_textual("application/json"));
        assert!(is_textual("application/problem+json"));
        assert!(is_textual("TEXT/CSS"));
        assert!(!is_textual("image/png"));
    }
}
