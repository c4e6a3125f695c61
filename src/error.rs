use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid source: {0}")]
    InvalidSource(String),

    #[error("Claude API error: {0}")]
    ClaudeApi(String),

    #[error("completion returned no text")]
    EmptyCompletion,

    #[error("channel lookup failed: {0}")]
    ChannelLookup(String),

    #[error("YouTube API error: {0}")]
    YoutubeApi(String),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error(transparent)]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    AsyncDatabase(#[from] tokio_rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error("feed parse error: {0}")]
    FeedParse(#[from] feed_rs::parser::ParseFeedError),

    #[error(transparent)]
    Regex(#[from] regex::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
