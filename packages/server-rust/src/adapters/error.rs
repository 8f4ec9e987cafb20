use std::fmt;

use dts_core::FileType;

/// External backend an adapter error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Chat completion API used for translation and summarization.
    LanguageModel,
    /// OAuth authorization server / profile endpoint.
    IdentityProvider,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LanguageModel => "language model",
            Self::IdentityProvider => "identity provider",
        })
    }
}

/// Failure reported by an adapter. Variants are the classification tags.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("{backend} rate limit exceeded")]
    RateLimited { backend: Backend },

    #[error("{backend} rejected the credentials: {detail}")]
    Unauthorized { backend: Backend, detail: String },

    #[error("{backend} request failed: {detail}")]
    Upstream {
        backend: Backend,
        /// HTTP status, when the backend answered at all.
        status: Option<u16>,
        detail: String,
    },

    #[error("{backend} returned a malformed response: {detail}")]
    MalformedResponse { backend: Backend, detail: String },

    #[error("could not extract text from {file_type}: {detail}")]
    Extraction { file_type: FileType, detail: String },

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl AdapterError {
    pub(crate) fn extraction(file_type: FileType, detail: impl fmt::Display) -> Self {
        Self::Extraction {
            file_type,
            detail: detail.to_string(),
        }
    }

    /// Maps a `reqwest` transport failure for `backend`.
    pub(crate) fn transport(backend: Backend, err: &reqwest::Error) -> Self {
        Self::Upstream {
            backend,
            status: err.status().map(|s| s.as_u16()),
            detail: err.to_string(),
        }
    }

    /// Backend this error came from, if any.
    #[must_use]
    pub fn backend(&self) -> Option<Backend> {
        match self {
            Self::RateLimited { backend }
            | Self::Unauthorized { backend, .. }
            | Self::Upstream { backend, .. }
            | Self::MalformedResponse { backend, .. } => Some(*backend),
            Self::Extraction { .. } | Self::NotConfigured(_) => None,
        }
    }
}
