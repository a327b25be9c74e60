pub mod pixel_shader;
