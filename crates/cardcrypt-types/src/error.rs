/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    // General errors
    #[error("invalid argument")]
    InvalidArg,

    // Buffer errors
    #[error("buffer length not enough: need {need}, got {got}")]
    BufferTooSmall { need: usize, got: usize },

    // Symmetric cipher errors
    #[error("invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },
    #[error("invalid block size: {len} is not a positive multiple of the cipher block size")]
    InvalidBlockSize { len: usize },
    #[error("corrupted ciphertext: recovered length exceeds buffer capacity")]
    CorruptedCiphertext,
}
