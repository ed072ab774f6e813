//! Core domain types
//!
//! This module contains the structures the gateway reports about a job and
//! the small value types the client needs to talk about them. They are
//! read-only views of server state; the gateway stays authoritative.

pub mod credential;
pub mod event;
pub mod folder;
pub mod job;
pub mod log;
pub mod transfer;

use serde::{Deserialize, Deserializer};

/// Deserializes `null` the same way as a missing field.
///
/// The gateway sends `null` for collections it has not populated yet.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
