use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid move symbol {0}, expected 0..=17")]
    InvalidMoveSymbol(u16),

    #[error("malformed scramble token \"{0}\"")]
    MalformedScrambleToken(String),

    #[error("scramble source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("brute force search exhausted at depth {max_depth}")]
    SearchExhausted { max_depth: usize },

    #[error("result log unavailable: {0}")]
    LogSinkUnavailable(String),

    #[error("search budget exhausted after {generations} generations")]
    BudgetExhausted { generations: u64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid facelet string")]
    InvalidFaceletString,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Encode(#[from] bincode::error::EncodeError),

    #[error(transparent)]
    Decode(#[from] bincode::error::DecodeError),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}
