#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core air-quality logic (transport-agnostic).
//!
//! This crate turns raw PurpleAir-style payloads into immutable [`Reading`]
//! values and derives an EPA AQI plus a 5-level display category from them.
//! Payloads arrive through `airq_traits::Source`; nothing here performs I/O
//! of its own, and every conversion is a pure function of its inputs apart
//! from the wall-clock stamp taken at `Reading` construction.
//!
//! ## Architecture
//!
//! - **Payload adaptation**: one pure mapping function per upstream shape,
//!   dispatched on [`SourceKind`] (`payload` module)
//! - **Reading**: immutable value with a capture timestamp (`reading` module)
//! - **AQI engine**: correction models + EPA breakpoint interpolation (`aqi`)
//! - **Config bridging**: `From` impls over `airq_config` types (`conversions`)

pub mod aqi;
pub mod conversions;
pub mod error;
pub mod mocks;
pub mod payload;
pub mod reading;
pub mod util;

pub use aqi::{CorrectionModel, HumidityPolicy, compute_aqi, compute_aqi_with, pm_to_aqi, to_category};
pub use error::{AqiError, PayloadError};
pub use payload::{AveragingWindow, NormalizedFields, SourceKind, adapt};
pub use reading::Reading;
