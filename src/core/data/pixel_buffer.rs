use crate::core::data::colour::Colour;
use crate::core::data::point::Point;
use crate::core::data::size::Size;

pub const BYTES_PER_PIXEL: usize = 3;

fn size_to_buffer_size(size: Size) -> Option<usize> {
    (size.width as usize)
        .checked_mul(size.height as usize)?
        .checked_mul(BYTES_PER_PIXEL)
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PixelBufferError {
    #[error("pixel at x:{}, y:{} outside of bounds {}x{}", .pixel.x, .pixel.y, .size.width, .size.height)]
    PixelOutsideBounds { pixel: Point, size: Size },
    #[error("bounds size {size_bytes} does not match buffer size {buffer_size}")]
    BoundsMismatch {
        size_bytes: usize,
        buffer_size: usize,
    },
    #[error("a {}x{} buffer does not fit in memory", .size.width, .size.height)]
    TooLarge { size: Size },
    #[error("could not allocate {bytes} bytes for a {}x{} buffer", .size.width, .size.height)]
    AllocationFailed { size: Size, bytes: usize },
}

pub type PixelBufferData = Vec<u8>;

/// An RGB bitmap, row-major, three bytes per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    size: Size,
    buffer: PixelBufferData,
}

impl PixelBuffer {
    /// Allocates a zeroed buffer, failing instead of aborting when `size` is
    /// too large to allocate.
    pub fn new(size: Size) -> Result<Self, PixelBufferError> {
        let bytes = size_to_buffer_size(size).ok_or(PixelBufferError::TooLarge { size })?;

        let mut buffer = PixelBufferData::new();
        buffer
            .try_reserve_exact(bytes)
            .map_err(|_| PixelBufferError::AllocationFailed { size, bytes })?;
        buffer.resize(bytes, 0);

        Ok(Self { size, buffer })
    }

    pub fn from_data(size: Size, buffer: PixelBufferData) -> Result<Self, PixelBufferError> {
        let size_bytes = size_to_buffer_size(size).ok_or(PixelBufferError::TooLarge { size })?;

        if size_bytes != buffer.len() {
            return Err(PixelBufferError::BoundsMismatch {
                size_bytes,
                buffer_size: buffer.len(),
            });
        }

        Ok(Self { size, buffer })
    }

    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    #[must_use]
    pub fn buffer(&self) -> &PixelBufferData {
        &self.buffer
    }

    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn row_bytes(&self) -> usize {
        self.size.width as usize * BYTES_PER_PIXEL
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut PixelBufferData {
        &mut self.buffer
    }

    pub fn pixel(&self, pixel: Point) -> Result<Colour, PixelBufferError> {
        let index = self.index_of(pixel)?;

        Ok(Colour {
            r: self.buffer[index],
            g: self.buffer[index + 1],
            b: self.buffer[index + 2],
        })
    }

    pub fn set_pixel(&mut self, pixel: Point, colour: Colour) -> Result<(), PixelBufferError> {
        let index = self.index_of(pixel)?;

        self.buffer[index] = colour.r;
        self.buffer[index + 1] = colour.g;
        self.buffer[index + 2] = colour.b;

        Ok(())
    }

    pub fn fill(&mut self, colour: Colour) {
        for chunk in self.buffer.chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk[0] = colour.r;
            chunk[1] = colour.g;
            chunk[2] = colour.b;
        }
    }

    fn index_of(&self, pixel: Point) -> Result<usize, PixelBufferError> {
        if !self.size.contains_point(pixel) {
            return Err(PixelBufferError::PixelOutsideBounds {
                pixel,
                size: self.size,
            });
        }

        Ok((pixel.y as usize * self.size.width as usize + pixel.x as usize) * BYTES_PER_PIXEL)
    }
}
