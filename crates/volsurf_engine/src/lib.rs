//! # volsurf_engine (Layer 3: Engine)
//!
//! Implied volatility surfaces from sparse option quotes.
//!
//! This crate provides:
//! - Validated quotes and their persisted form ([`Quote`], [`QuoteRecord`])
//! - Grid assembly with per-cell implied volatility inversion
//!   ([`GridBuilder`], [`Grid`])
//! - A deterministic fill policy for missing cells ([`fill`])
//! - A continuous surface over (time to expiry, strike) ([`Surface`])
//! - Dense resampling for rendering ([`SurfaceSampler`], [`DenseSample`])
//! - OCC option-code parsing, near-the-money selection and CSV persistence
//!
//! ## Feature Flags
//!
//! - `parallel`: solve grid cells on the rayon thread pool
//!
//! ## Example
//!
//! ```
//! use volsurf_core::types::Date;
//! use volsurf_engine::{GridBuilder, Quote, Surface, SurfaceSampler};
//! use volsurf_models::{MarketContext, OptionType};
//!
//! let valuation = Date::from_ymd(2025, 6, 1).unwrap();
//! let expiry = Date::from_ymd(2025, 7, 18).unwrap();
//! let market = MarketContext::new(valuation, 0.03, 0.01);
//!
//! let quotes = vec![
//!     Quote::new(expiry, 100.0, OptionType::Call, 9.8, 10.2, 105.0).unwrap(),
//!     Quote::new(expiry, 110.0, OptionType::Call, 4.5, 4.9, 105.0).unwrap(),
//! ];
//!
//! let grid = GridBuilder::new(market).build(&quotes).unwrap();
//! let surface = Surface::from_grid(&grid, &market).unwrap();
//! let sample = SurfaceSampler::sample_grid(&surface, &grid, 5).unwrap();
//!
//! assert_eq!(sample.vols.len(), 5);
//! assert!(sample.vols.iter().flatten().all(|v| v.is_finite()));
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod error;
pub mod fill;
pub mod grid;
pub mod option_code;
pub mod persistence;
pub mod quote;
pub mod sampler;
pub mod selection;
pub mod surface;

pub use error::{Result, SurfaceError};
pub use grid::{Grid, GridBuilder, VolSource};
pub use option_code::OptionCode;
pub use quote::{Quote, QuoteRecord};
pub use sampler::{DenseSample, SurfaceSampler};
pub use selection::{select_near_atm, DEFAULT_ATM_COUNT};
pub use surface::{InterpolationSpace, Surface};
