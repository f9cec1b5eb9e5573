use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpyglassError {
    #[error("invalid repository reference '{0}': {1}")]
    InvalidRepoRef(String, String),

    #[error("invalid sort field '{0}'")]
    InvalidSortField(String),

    #[error("invalid sort direction '{0}'")]
    InvalidSortDirection(String),

    #[error("invalid item status '{0}'")]
    InvalidStatus(String),

    #[error("invalid item kind '{0}'")]
    InvalidKind(String),

    #[error("invalid group dimension '{0}'")]
    InvalidGroupBy(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("API error: {0}")]
    Api(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SpyglassError>;
