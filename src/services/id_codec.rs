/*
 * Responsibility
 * - 公開 ID ↔ 内部 ID の変換 (encode/decode)
 * - エンコード方式はここに閉じ込める (extractor / DTO は方式に依存しない)
 */
use sqids::{Error as SqidsError, Sqids};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IdCodecError>;

#[derive(Debug, Error)]
pub enum IdCodecError {
    #[error("SQIDS_MIN_LENGTH must be between 0 and 255, got {value}")]
    InvalidMinLength { value: usize },

    #[error("sqids error: {0}")]
    Sqids(#[from] SqidsError),

    #[error("id must be non-negative, got {value}")]
    NegativeId { value: i64 },

    #[error("invalid public id format")]
    DecodeInvalidFormat,

    #[error("decoded id is out of range")]
    DecodeOutOfRange,
}

#[derive(Clone, Debug)]
pub struct IdCodec {
    sqids: Sqids,
}

impl IdCodec {
    pub fn new(min_length: usize, alphabet: &str) -> Result<Self> {
        let min_length: u8 = min_length
            .try_into()
            .map_err(|_| IdCodecError::InvalidMinLength { value: min_length })?;

        let sqids = Sqids::builder()
            .min_length(min_length)
            .alphabet(alphabet.chars().collect())
            .build()?;

        Ok(Self { sqids })
    }

    pub fn encode(&self, id: i64) -> Result<String> {
        let n = u64::try_from(id).map_err(|_| IdCodecError::NegativeId { value: id })?;
        Ok(self.sqids.encode(&[n])?)
    }

    /// Decode a public id. Only the canonical encoding is accepted, so every
    /// post has exactly one valid URL.
    pub fn decode(&self, public_id: &str) -> Result<i64> {
        let nums = self.sqids.decode(public_id);
        let [n] = nums.as_slice() else {
            return Err(IdCodecError::DecodeInvalidFormat);
        };
        let id = i64::try_from(*n).map_err(|_| IdCodecError::DecodeOutOfRange)?;

        if self.encode(id)? != public_id {
            return Err(IdCodecError::DecodeInvalidFormat);
        }
        Ok(id)
    }
}
