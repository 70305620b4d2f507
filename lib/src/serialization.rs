//! Serialization of fitted parameters.
//!
//! Fitted scalers and trained networks expose their numbers through plain
//! parameter structs (vectors of `f64`, no `ndarray` handles). Anything that is
//! `Serialize + Deserialize` gets a `bincode` byte representation for free.

use serde::{de::DeserializeOwned, Serialize};
use std::error::Error;

/// A parameter representation that can be converted to and from bytes.
///
/// Implementors should contain only plain numerical data.
pub trait SerializableParams: Sized {
    /// The error type returned during (de)serialization.
    type Error: Error + Send + Sync + 'static;

    /// Serialize the parameters into a byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error>;

    /// Deserialize the parameters from a byte buffer.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error>;
}

impl<T> SerializableParams for T
where
    T: Serialize + DeserializeOwned,
{
    type Error = bincode::Error;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error> {
        bincode::serialize(self)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error> {
        bincode::deserialize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Dummy {
        mean: Vec<f64>,
        n: usize,
    }

    #[test]
    fn test_blanket_impl_round_trip() {
        let d = Dummy {
            mean: vec![1.5, -2.25],
            n: 2,
        };
        let bytes = d.to_bytes().unwrap();
        assert_eq!(Dummy::from_bytes(&bytes).unwrap(), d);
    }

    #[test]
    fn test_from_bytes_garbage() {
        assert!(Dummy::from_bytes(&[0xff, 0xff]).is_err());
    }
}
