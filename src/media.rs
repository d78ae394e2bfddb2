mod api;
mod handlers;

pub use handlers::{handle, serve, UPLOAD_DIR};
