//! Port definitions for the display dispatcher.
//!
//! Contains the traits that connect the dispatcher to the code that decides
//! what to draw and to the backend that owns pixels.

pub mod backend;
pub mod delegate;
