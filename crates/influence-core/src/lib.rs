//! # Influence Core
//!
//! Scoring engine for the influence graph between public figures ("people")
//! and financial instruments ("assets").
//!
//! Every phase is a pure function over the mention corpus: time decay, entity
//! aggregation, normalization, co-mention collection, asset similarity,
//! indirect propagation and relationship materialization. Persistence lives in
//! the server crate.

pub mod aggregate;
pub mod comention;
pub mod decay;
pub mod error;
pub mod materialize;
pub mod models;
pub mod normalize;
pub mod params;
pub mod propagation;
pub mod similarity;

pub use aggregate::*;
pub use comention::*;
pub use decay::*;
pub use error::*;
pub use materialize::*;
pub use models::*;
pub use normalize::*;
pub use params::*;
pub use propagation::*;
pub use similarity::*;
