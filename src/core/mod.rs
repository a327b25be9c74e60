pub mod actions;
pub mod data;
pub mod render_state;
