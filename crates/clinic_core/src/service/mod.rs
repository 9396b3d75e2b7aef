//! Query/mutation resolvers composing the record stores.
//!
//! # Responsibility
//! - Translate named operations into repository calls.
//! - Enforce the patient→doctor existence check at write time.
//! - Keep API layers decoupled from storage details.

pub mod resolver_set;
