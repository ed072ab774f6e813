//! Data Transfer Objects for talking to the compute gateway
//!
//! Request bodies and the few response shapes that are not a plain
//! [`JobSnapshot`](crate::domain::job::JobSnapshot). Field names follow the
//! gateway's camelCase JSON.

pub mod job;
pub mod transfer;
