//! Cross-origin headers. Every reply allows all origins.
use hyper::StatusCode;

use crate::api::Reply;

pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
pub const ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
pub const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
pub const MAX_AGE: &str = "Access-Control-Max-Age";

const REQUEST_HEADERS: &str = "Content-Type, X-Admin-Token";
const PREFLIGHT_MAX_AGE: &str = "86400";

pub fn allow_origin(mut reply: Reply) -> Reply {
    reply.headers.insert(ALLOW_ORIGIN.to_string(), "*".to_string());
    reply
}

pub fn preflight(methods: &'static str) -> Reply {
    let mut reply = Reply::empty(StatusCode::OK);
    let headers = &mut reply.headers;
    headers.insert(ALLOW_METHODS.to_string(), methods.to_string());
    headers.insert(ALLOW_HEADERS.to_string(), REQUEST_HEADERS.to_string());
    headers.insert(MAX_AGE.to_string(), PREFLIGHT_MAX_AGE.to_string());
    allow_origin(reply)
}

#[test]
fn preflight_headers() {
    let reply = preflight("POST, OPTIONS");
    assert_eq!(reply.status_code, 200);
    assert!(reply.body.is_empty());
    assert!(!reply.is_base64_encoded);
    assert_eq!(reply.headers[ALLOW_ORIGIN], "*");
    assert_eq!(reply.headers[ALLOW_METHODS], "POST, OPTIONS");
    assert_eq!(reply.headers[ALLOW_HEADERS], "Content-Type, X-Admin-Token");
    assert_eq!(reply.headers[MAX_AGE], "86400");
    assert!(!reply.headers.contains_key("Content-Type"));
}
