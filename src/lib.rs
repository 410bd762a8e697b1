pub extern crate gst;
pub extern crate gst_pbutils;
pub extern crate gst_play;
pub extern crate gst_tag;

pub mod actions;
pub mod comparison;
pub mod glib_helpers;
pub mod gst_helpers;
pub mod inspection;
mod localization;
pub mod misc;
pub mod surface;
pub mod ui;
pub mod uri_helpers;

pub use misc::init;
