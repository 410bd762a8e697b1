pub mod messages;
pub mod model;
mod widget;
