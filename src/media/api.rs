use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug)]
pub struct Upload {
    /// Base64, optionally behind a data URL header (`data:image/png;base64,`).
    pub image: Option<String>,
    /// Name on the client side, only the extension is kept.
    pub filename: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct Uploaded {
    pub url: String,
    pub filename: String,
    pub size: usize,
}
