//! UI layer for the desktop GUI: draws the session's presentation tree.

pub mod app;

pub use app::PathfinderApp;
