use crate::core::data::colour::Colour;
use crate::core::data::point::Point;
use crate::core::data::size::Size;

/// Computes the colour of a single pixel of a bitmap of a given size.
pub trait PixelShader {
    fn shade(&self, pixel: Point, size: Size) -> Colour;
}

impl<F> PixelShader for F
where
    F: Fn(Point, Size) -> Colour,
{
    fn shade(&self, pixel: Point, size: Size) -> Colour {
        self(pixel, size)
    }
}
