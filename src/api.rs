//! Types and functions for to help building APIs.
//!
//! Handlers never see hyper directly: they take a normalized [`Event`] and
//! answer with a normalized [`Reply`]. The server converts on both sides.
use std::collections::{BTreeMap, HashMap};

use hyper::{Body, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::cors;
use crate::error::AppError;

pub type Request = hyper::Request<hyper::Body>;
pub type JsonObject = Map<String, Value>;

fn default_method() -> String {
    String::from("GET")
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default = "default_method")]
    pub http_method: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
}

impl Event {
    /// A query parameter, treating an empty value as absent.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()?
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Parses the body as a JSON object. A missing or blank body is `{}`.
    pub fn json_body(&self) -> Result<JsonObject, AppError> {
        match self.body.as_deref().map(str::trim) {
            None | Some("") => Ok(JsonObject::new()),
            Some(body) => serde_json::from_str(body).map_err(Into::into),
        }
    }

    pub async fn from_request(req: Request) -> Result<Event, AppError> {
        let http_method = req.method().as_str().to_string();
        let query_string_parameters = match req.uri().query() {
            Some(query) => Some(serde_urlencoded::from_str(query).map_err(|e| {
                let message = format!("Failed to parse the query in the URI ({})", req.uri());
                log::debug!("{}: {}", message, e);
                AppError::BadRequest(message)
            })?),
            None => None,
        };
        let bytes = hyper::body::to_bytes(req.into_body()).await?;
        let body = if bytes.is_empty() {
            None
        } else {
            Some(String::from_utf8(bytes.to_vec()).map_err(|_| {
                AppError::BadRequest(String::from("Failed to read the request body"))
            })?)
        };
        Ok(Event {
            http_method,
            body,
            query_string_parameters,
        })
    }
}

#[cfg(test)]
impl Event {
    pub fn new(method: &str) -> Event {
        Event {
            http_method: method.to_string(),
            ..Event::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Event {
        self.body = Some(body.into());
        self
    }

    pub fn with_query(mut self, name: &str, value: &str) -> Event {
        self.query_string_parameters
            .get_or_insert_with(HashMap::new)
            .insert(name.to_string(), value.to_string());
        self
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub is_base64_encoded: bool,
    pub body: String,
}

impl Reply {
    pub fn empty(status: StatusCode) -> Reply {
        Reply {
            status_code: status.as_u16(),
            headers: BTreeMap::new(),
            is_base64_encoded: false,
            body: String::new(),
        }
    }

    fn with_json_body(status: StatusCode, body: String) -> Reply {
        let mut reply = Reply::empty(status);
        reply
            .headers
            .insert(String::from("Content-Type"), mime::APPLICATION_JSON.to_string());
        reply.body = body;
        cors::allow_origin(reply)
    }

    pub fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Result<Reply, AppError> {
        let body = serde_json::to_string(value)?;
        Ok(Reply::with_json_body(status, body))
    }

    pub fn from_error(e: &AppError) -> Reply {
        let status = e.status_code();
        if status.is_server_error() {
            log::error!("{}", e);
        } else {
            log::debug!("{}", e);
        }
        let body = json!({ "error": e.to_string() });
        Reply::with_json_body(status, body.to_string())
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn into_response(self) -> Result<Response<Body>, AppError> {
        let mut builder = Response::builder().status(self.status());
        for (name, value) in self.headers.iter() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder.body(Body::from(self.body)).map_err(unexpected!())
    }
}
