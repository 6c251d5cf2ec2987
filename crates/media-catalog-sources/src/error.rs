use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceErrorKind {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Failure reported by a single provider.
#[derive(Debug, Error)]
#[error("provider '{provider}' failed: {kind}")]
pub struct SourceError {
    provider: String,
    #[source]
    kind: SourceErrorKind,
}

impl SourceError {
    pub fn new(provider: impl Into<String>, kind: SourceErrorKind) -> Self {
        Self {
            provider: provider.into(),
            kind,
        }
    }

    pub fn other(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(provider, SourceErrorKind::Other(message.into()))
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn kind(&self) -> &SourceErrorKind {
        &self.kind
    }
}
