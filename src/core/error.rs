use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreceptError {
    #[error("Corpus configuration error: {0}")]
    Config(String),
    #[error(
        "Not found: principle '{0}' does not exist. Run `precept topics` to browse the catalog."
    )]
    NotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
