pub mod cancellation;
pub mod fill_pixel_buffer;
