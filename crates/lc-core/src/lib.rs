//! # lc-core
//!
//! Core types and result shaping for Lightcurve Explorer.
//!
//! This crate holds everything that does not touch the network or the disk:
//! - Entity structs for observed objects, measurements, and annotations
//! - The ADQL region query builder
//! - Response normalization from the several TAP JSON shapes into flat rows
//! - Grouping of rows into per-object light curves, plus annotation merging
//! - CSV export of the annotated collection
//! - The explicit application state machine driven by the explorer

pub mod adql;
pub mod entities;
pub mod errors;
pub mod export;
pub mod group;
pub mod normalize;
pub mod state;

pub use entities::{AnnotationUpdate, Annotations, Measurement, ObservedObject, QueryParameters};
pub use errors::CoreError;
pub use normalize::{ResponseShape, Row};
pub use state::{Applied, AppState, QueryPhase, QueryTicket, Transition, TransitionKind};
