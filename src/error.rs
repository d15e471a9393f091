use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum InitError {
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("database error: {0}")]
    Database(#[from] MongoError),
}

/// Classification of the server rejections the bootstrap tolerates when a
/// concurrent run wins a check-then-create race.
pub trait MongoErrorExt {
    /// Duplicate-key rejection (code 11000) from a unique index.
    fn is_duplicate_key(&self) -> bool;

    /// `NamespaceExists` (code 48): the collection was created concurrently.
    fn is_namespace_exists(&self) -> bool;
}

impl MongoErrorExt for MongoError {
    fn is_duplicate_key(&self) -> bool {
        match *self.kind {
            ErrorKind::Write(WriteFailure::WriteError(ref write_err)) => write_err.code == 11000,
            ErrorKind::Command(ref command_err) => command_err.code == 11000,
            _ => false,
        }
    }

    fn is_namespace_exists(&self) -> bool {
        matches!(*self.kind, ErrorKind::Command(ref command_err) if command_err.code == 48)
    }
}
