pub mod fill_pixel_buffer_parallel;
pub mod ports;
