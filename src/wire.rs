//! Binary encoding of match views for broadcasters.

use thiserror::Error;

use crate::state::MatchView;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("failed to encode view: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("failed to decode view: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

pub fn encode_view(view: &MatchView) -> Result<Vec<u8>, WireError> {
    Ok(bincode::serde::encode_to_vec(view, bincode::config::standard())?)
}

pub fn decode_view(bytes: &[u8]) -> Result<MatchView, WireError> {
    let (view, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())?;
    Ok(view)
}
