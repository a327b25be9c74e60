use crate::core::data::pixel_buffer::PixelBuffer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes committed contents as a binary PPM image.
pub fn write_ppm(buffer: &PixelBuffer, filepath: impl AsRef<Path>) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(filepath)?);
    let size = buffer.size();

    // P6: binary RGB, then width height max_colour
    writeln!(file, "P6")?;
    writeln!(file, "{} {}", size.width, size.height)?;
    writeln!(file, "255")?;
    file.write_all(buffer.buffer())?;
    file.flush()?;

    Ok(())
}
