use std::error::Error as StdError;

use thiserror::Error;

use crate::infra::{content::ContentHashError, error::InfraError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Content(#[from] ContentHashError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Process exit status reported by the binary.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Content(_) => 3,
            AppError::Infra(_) | AppError::Unexpected(_) => 1,
        }
    }

    /// Messages of this error followed by each of its sources.
    pub fn messages(&self) -> Vec<String> {
        let mut messages = vec![self.to_string()];
        let mut current = self.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn messages_walk_the_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error = AppError::from(ContentHashError::Io {
            path: PathBuf::from("missing.png"),
            source: io,
        });

        let messages = error.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("missing.png"));
        assert_eq!(messages[1], "gone");
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn non_content_errors_exit_with_one() {
        assert_eq!(AppError::unexpected("boom").exit_code(), 1);
        assert_eq!(AppError::from(InfraError::telemetry("taken")).exit_code(), 1);
    }
}
