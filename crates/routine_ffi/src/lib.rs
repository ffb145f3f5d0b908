//! Flutter bridge surface for the routine core.

pub mod api;
