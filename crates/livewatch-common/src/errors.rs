use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failures talking to the live-status provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Credentials were refused while requesting a token.
    #[error("provider authentication failed: {0}")]
    Auth(String),

    /// A query came back 401; the token needs to be refreshed.
    #[error("provider token expired")]
    AuthExpired,

    /// Network failure, timeout, or 5xx.
    #[error("provider unavailable: {0}")]
    Transient(String),

    #[error("provider rejected request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("provider response parse error: {0}")]
    Parse(String),
}

impl ProviderError {
    /// Errors that are expected to clear up on their own by the next tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::AuthExpired)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("store codec error: {0}")]
    Codec(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cache codec error: {0}")]
    Codec(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("sink network error: {0}")]
    Network(String),

    #[error("sink rejected message (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("payload error: {0}")]
    Payload(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LivewatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("poller.batch_size = 0".into());
        assert_eq!(
            err.to_string(),
            "config validation error: poller.batch_size = 0"
        );
    }

    #[test]
    fn provider_error_display() {
        let err = ProviderError::AuthExpired;
        assert_eq!(err.to_string(), "provider token expired");

        let err = ProviderError::Rejected {
            status: 400,
            body: "bad user_login".into(),
        };
        assert_eq!(
            err.to_string(),
            "provider rejected request (HTTP 400): bad user_login"
        );
    }

    #[test]
    fn provider_error_transience() {
        assert!(ProviderError::Transient("503".into()).is_transient());
        assert!(ProviderError::AuthExpired.is_transient());
        assert!(!ProviderError::Auth("invalid client".into()).is_transient());
        assert!(!ProviderError::Parse("eof".into()).is_transient());
    }

    #[test]
    fn livewatch_error_from_store() {
        let store_err = StoreError::Backend("database is locked".into());
        let err: LivewatchError = store_err.into();
        assert!(matches!(err, LivewatchError::Store(_)));
        assert!(err.to_string().contains("database is locked"));
    }

    #[test]
    fn livewatch_error_from_provider() {
        let err: LivewatchError = ProviderError::Transient("timeout".into()).into();
        assert!(matches!(err, LivewatchError::Provider(_)));
        assert_eq!(err.to_string(), "provider unavailable: timeout");
    }

    #[test]
    fn livewatch_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: LivewatchError = io_err.into();
        assert!(matches!(err, LivewatchError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn dispatch_and_cache_display() {
        let err = DispatchError::Rejected {
            status: 403,
            body: "Missing Access".into(),
        };
        assert_eq!(
            err.to_string(),
            "sink rejected message (HTTP 403): Missing Access"
        );

        let err = CacheError::Backend("connection refused".into());
        assert_eq!(err.to_string(), "cache backend error: connection refused");

        let err = LivewatchError::Other("something went wrong".into());
        assert_eq!(err.to_string(), "something went wrong");
    }
}
