//! # lc-tap
//!
//! Network side of Lightcurve Explorer.
//!
//! - [`TapClient`] posts form-encoded ADQL to a TAP service's `/sync` endpoint.
//! - [`proxy`] serves `POST /api/adql` in front of that client so browsers and
//!   other tools never see the bearer token.
//! - [`QueryGateway`] abstracts over "call TAP directly" and "go through a
//!   proxy" for the explorer.

pub mod client;
pub mod error;
pub mod gateway;
pub mod proxy;

pub use client::{ReplyBody, TapClient, TapReply};
pub use error::{ProxyError, TapError};
pub use gateway::{Gateway, ProxyClient, QueryGateway};
