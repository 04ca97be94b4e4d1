//! Core of the fora theme-analysis dashboard.
//!
//! Everything here is independent of the terminal: the wire types, the pure
//! derivations (phase, colors, charts, highlights), the client-side caches and
//! the [`controller::Dashboard`] that ties them to an [`api::AnalysisService`].

pub mod api;
pub mod chart;
pub mod chat;
pub mod color;
pub mod controller;
pub mod editor;
pub mod error;
pub mod highlight;
pub mod ids;
pub mod phase;
pub mod store;
pub mod tracker;
pub mod types;
