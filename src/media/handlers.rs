use std::path::Path;

use hyper::header::{self, HeaderValue};
use hyper::{Body, Response, StatusCode};
use serde_json::Value;
use uuid::Uuid;

use super::api::{Upload, Uploaded};
use crate::api::{Event, Reply};
use crate::cors;
use crate::error::AppError;

pub const UPLOAD_DIR: &str = "/tmp/uploads";

const METHODS: &str = "POST, OPTIONS";
const DEFAULT_EXTENSION: &str = "jpg";

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')
}

/// Decodes the segment between the first and the second comma of a data URL,
/// or the whole payload if it has no comma. Characters outside the base64
/// alphabet are skipped, the rest must be padded to a multiple of four.
fn decode(image: &str) -> Result<Vec<u8>, AppError> {
    let data = match image.split_once(',') {
        Some((_, rest)) => rest.split_once(',').map_or(rest, |(data, _)| data),
        None => image,
    };
    let data: String = data.chars().filter(|c| is_base64_char(*c)).collect();
    if data.len() % 4 != 0 {
        return Err(AppError::InvalidBase64(String::from("Incorrect padding")));
    }
    Ok(base64::decode(data)?)
}

fn extension(filename: &str) -> &str {
    filename
        .rsplit_once('.')
        .map_or(DEFAULT_EXTENSION, |(_, extension)| extension)
}

fn content_type(filename: &str) -> mime::Mime {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "svg" => mime::IMAGE_SVG,
        "webp" => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

async fn upload(dir: &Path, event: &Event) -> Result<Reply, AppError> {
    let form: Upload = serde_json::from_value(Value::Object(event.json_body()?))?;
    let (image, original_filename) = match form {
        Upload {
            image: Some(image),
            filename: Some(filename),
        } => (image, filename),
        _ => return Err(AppError::BadRequest(String::from("Missing image or filename"))),
    };
    let bytes = decode(&image)?;

    let filename = format!("{}.{}", Uuid::new_v4(), extension(&original_filename));
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(dir.join(&filename), &bytes).await?;
    log::info!("{} ({} bytes) was uploaded as {}", original_filename, bytes.len(), filename);

    let uploaded = Uploaded {
        url: format!("/uploads/{}", filename),
        filename,
        size: bytes.len(),
    };
    Reply::json(StatusCode::OK, &uploaded)
}

/// Entry point for `/api/upload-image`. Files land in `dir`.
pub async fn handle(dir: &Path, event: Event) -> Reply {
    let result = match event.http_method.as_str() {
        "OPTIONS" => return cors::preflight(METHODS),
        "POST" => upload(dir, &event).await,
        _ => Err(AppError::MethodNotAllowed),
    };
    result.unwrap_or_else(|e| Reply::from_error(&e))
}

/// Sends back a file stored by [`handle`].
pub async fn serve(dir: &Path, filename: &str) -> Result<Response<Body>, AppError> {
    let not_found = || AppError::NotFound("Image");
    if filename.is_empty() || filename.starts_with('.') || filename.contains(&['/', '\\'][..]) {
        return Err(not_found());
    }
    let bytes = match tokio::fs::read(dir.join(filename)).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(e.into()),
    };
    let content_type = HeaderValue::from_str(content_type(filename).as_ref()).map_err(unexpected!())?;
    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, HeaderValue::from(bytes.len()))
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"))
        .body(Body::from(bytes))
        .map_err(unexpected!())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // The first eight bytes of every PNG file.
    const PNG_SIGNATURE: &str = "iVBORw0KGgo=";

    fn body_of(reply: &Reply) -> Value {
        serde_json::from_str(&reply.body).unwrap()
    }

    async fn post(dir: &Path, body: Value) -> Reply {
        handle(dir, Event::new("POST").with_body(body.to_string())).await
    }

    #[tokio::test]
    async fn stores_file_under_generated_name() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("uploads");

        let reply = post(&dir, json!({"image": PNG_SIGNATURE, "filename": "photo.png"})).await;
        assert_eq!(reply.status_code, 200, "{}", reply.body);
        let body = body_of(&reply);
        let filename = body["filename"].as_str().unwrap();
        assert!(filename.ends_with(".png"));
        assert_ne!(filename, "photo.png");
        assert_eq!(body["url"], format!("/uploads/{}", filename));
        assert_eq!(body["size"], 8);

        let stored = std::fs::read(dir.join(filename)).unwrap();
        assert_eq!(stored, base64::decode(PNG_SIGNATURE).unwrap());
    }

    #[tokio::test]
    async fn extension_defaults_to_jpg() {
        let temp = tempfile::tempdir().unwrap();
        let reply = post(temp.path(), json!({"image": PNG_SIGNATURE, "filename": "photo"})).await;
        assert_eq!(reply.status_code, 200);
        assert!(body_of(&reply)["filename"].as_str().unwrap().ends_with(".jpg"));

        let reply = post(temp.path(), json!({"image": PNG_SIGNATURE, "filename": "a.b.gif"})).await;
        assert!(body_of(&reply)["filename"].as_str().unwrap().ends_with(".gif"));
    }

    #[tokio::test]
    async fn data_url_header_is_stripped() {
        let temp = tempfile::tempdir().unwrap();
        let image = format!("data:image/png;base64,{}", PNG_SIGNATURE);
        let reply = post(temp.path(), json!({"image": image, "filename": "x.png"})).await;
        assert_eq!(reply.status_code, 200, "{}", reply.body);
        assert_eq!(body_of(&reply)["size"], 8);
    }

    #[tokio::test]
    async fn invalid_base64_writes_nothing() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("uploads");
        for image in ["not-base64-!!", "aGk", "data:image/png;base64,aGk"] {
            let reply = post(&dir, json!({"image": image, "filename": "photo.png"})).await;
            assert_eq!(reply.status_code, 400, "{}", image);
            let error = body_of(&reply)["error"].as_str().unwrap().to_string();
            assert!(error.starts_with("Invalid base64 data: "), "{}", error);
        }
        let reply = post(&dir, json!({"image": "aGk", "filename": "photo.png"})).await;
        assert_eq!(body_of(&reply)["error"], "Invalid base64 data: Incorrect padding");
        assert!(!dir.exists());
    }

    #[test]
    fn decode_skips_foreign_characters() {
        assert_eq!(decode("aGk=").unwrap(), b"hi");
        assert_eq!(decode("data:x,aGk=,Zm9v").unwrap(), b"hi");
        assert_eq!(decode("aGk-=").unwrap(), b"hi");
        assert_eq!(decode("aG\nk=\r\n").unwrap(), b"hi");
        assert!(decode("aGk").is_err());
        assert!(decode("data:x,aGk").is_err());
    }

    #[tokio::test]
    async fn missing_fields() {
        let temp = tempfile::tempdir().unwrap();
        for body in [json!({}), json!({"image": PNG_SIGNATURE}), json!({"filename": "a.png"})] {
            let reply = post(temp.path(), body).await;
            assert_eq!(reply.status_code, 400);
            assert_eq!(body_of(&reply)["error"], "Missing image or filename");
        }
        let reply = handle(temp.path(), Event::new("POST").with_body("   ")).await;
        assert_eq!(body_of(&reply)["error"], "Missing image or filename");
    }

    #[tokio::test]
    async fn methods() {
        let temp = tempfile::tempdir().unwrap();
        let reply = handle(temp.path(), Event::new("OPTIONS").with_body("garbage")).await;
        assert_eq!(reply.status_code, 200);
        assert!(reply.body.is_empty());
        assert_eq!(reply.headers[cors::ALLOW_METHODS], "POST, OPTIONS");

        let reply = handle(temp.path(), Event::new("GET")).await;
        assert_eq!(reply.status_code, 405);
        assert_eq!(body_of(&reply)["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn serves_uploaded_files() {
        let temp = tempfile::tempdir().unwrap();
        let reply = post(temp.path(), json!({"image": PNG_SIGNATURE, "filename": "photo.PNG"})).await;
        let filename = body_of(&reply)["filename"].as_str().unwrap().to_string();

        let response = serve(temp.path(), &filename).await.unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        assert_eq!(bytes.len(), 8);

        for name in ["missing.png", "../secret", ".hidden", ""] {
            let error = serve(temp.path(), name).await.unwrap_err();
            assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        }
    }
}
