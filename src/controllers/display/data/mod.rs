pub mod display_phase;
pub mod display_stats;
pub mod draw_task;
