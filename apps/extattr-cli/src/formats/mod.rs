//! Report formats

pub mod csv;
