//! Presentation layer.
//!
//! - [`gui`] - native window using eframe/egui

pub mod gui;
