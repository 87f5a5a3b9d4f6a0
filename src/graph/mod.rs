//! Graph construction and representation
//!
//! Pair extraction ([`cooccurrence`]), the mutable weighted graph
//! ([`builder`]) and its CSR snapshot ([`csr`]), community detection
//! ([`community`]) and the staged network builder tying them together
//! ([`network`]).

pub mod builder;
pub mod community;
pub mod cooccurrence;
pub mod csr;
pub mod network;
