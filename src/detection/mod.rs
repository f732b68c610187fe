//! Garment detection module
//!
//! This module handles separating the garment from its backdrop before
//! color extraction.

pub mod background;

pub use background::{
    build_isolator, run_isolator, BackgroundIsolator, BorderColorIsolator, CommandIsolator,
    PassthroughIsolator,
};
