use rayon::prelude::*;

use crate::core::actions::cancellation::{
    CANCEL_CHECK_INTERVAL_PIXELS, CancelToken, Cancelled, NeverCancel,
};
use crate::core::actions::fill_pixel_buffer::ports::pixel_shader::PixelShader;
use crate::core::data::pixel_buffer::{BYTES_PER_PIXEL, PixelBuffer};
use crate::core::data::point::Point;

/// Shades every pixel of `buffer` in parallel using rayon's work-stealing scheduler.
///
/// For cancel-aware filling, use [`fill_pixel_buffer_parallel_cancelable`].
pub fn fill_pixel_buffer_parallel<S>(buffer: &mut PixelBuffer, shader: &S)
where
    S: PixelShader + Sync,
{
    if fill_pixel_buffer_parallel_cancelable(buffer, shader, &NeverCancel).is_err() {
        unreachable!("NeverCancel token should never signal cancellation")
    }
}

/// Shades every pixel of `buffer` in parallel, polling `cancel` as it goes.
///
/// Rows are processed in parallel. Each row checks the token at its start and
/// every [`CANCEL_CHECK_INTERVAL_PIXELS`] pixels within it. On cancellation the
/// buffer is left partially written and [`Cancelled`] is returned.
///
/// Degenerate buffers are a no-op and never report cancellation.
pub fn fill_pixel_buffer_parallel_cancelable<S, C>(
    buffer: &mut PixelBuffer,
    shader: &S,
    cancel: &C,
) -> Result<(), Cancelled>
where
    S: PixelShader + Sync,
    C: CancelToken + ?Sized,
{
    let size = buffer.size();

    if size.is_degenerate() {
        return Ok(());
    }

    let row_bytes = buffer.row_bytes();

    buffer
        .buffer_mut()
        .par_chunks_mut(row_bytes)
        .enumerate()
        .try_for_each(|(y, row)| {
            for (x, pixel) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
                if x % CANCEL_CHECK_INTERVAL_PIXELS == 0 && cancel.is_cancelled() {
                    return Err(Cancelled);
                }

                let colour = shader.shade(
                    Point {
                        x: x as u32,
                        y: y as u32,
                    },
                    size,
                );
                pixel[0] = colour.r;
                pixel[1] = colour.g;
                pixel[2] = colour.b;
            }

            Ok(())
        })
}
