use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use super::ValidationError;

/// A request body that has been read but not yet decoded.
///
/// Decoding is deferred so that callers can authorize the request before
/// the body is inspected.
#[derive(Debug, Clone)]
pub struct Payload<T> {
    body: Vec<u8>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Payload<T> {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            _marker: PhantomData,
        }
    }

    pub fn decode(&self) -> Result<T, ValidationError> {
        serde_json::from_slice(&self.body).map_err(|e| ValidationError::InvalidJson(e.to_string()))
    }
}
