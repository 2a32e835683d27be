use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// A ciphertext was refused: too short, failed tag verification, or
    /// structurally malformed. The variant carries no detail on purpose;
    /// callers get a uniform rejection whatever the cause.
    #[error("ciphertext rejected")]
    Rejected,
}
