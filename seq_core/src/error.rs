use thiserror::Error;

#[derive(Error,Debug)]
pub enum SeqError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid sequence file: {0}")]
    Parse(String),
    #[error("timing check failed:\n{}",.0.join("\n"))]
    Timing(Vec<String>),
}
