//! HPC Job Core
//!
//! Core types shared by every consumer of the compute gateway.
//!
//! This crate contains:
//! - Domain types: the job snapshot, its events and logs, folder references,
//!   transfer state and access tokens
//! - DTOs: request and response bodies exchanged with the gateway

pub mod domain;
pub mod dto;
