use crate::frames::{FrameBuffer, Rgba16Image};
use crate::model::CropRect;
use image::{DynamicImage, ImageBuffer, Pixel, Primitive, Rgba};

/// Copy `rect` out of `src` into a new `rect.width x rect.height` buffer.
///
/// The rectangle may extend past any edge of `src` (including a negative
/// origin); destination pixels with no source counterpart stay fully
/// transparent (all channels zero).
pub fn crop_padded<P>(
    src: &ImageBuffer<P, Vec<P::Subpixel>>,
    rect: &CropRect,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel,
{
    let (sw, sh) = src.dimensions();
    let mut out = ImageBuffer::new(rect.width, rect.height);

    // overlap of the crop window with the source, in source coordinates
    let (left, top, right, bottom) = rect.corners();
    let x0 = left.max(0);
    let y0 = top.max(0);
    let x1 = right.min(sw as i64);
    let y1 = bottom.min(sh as i64);
    if x0 >= x1 || y0 >= y1 {
        return out;
    }

    for sy in y0..y1 {
        for sx in x0..x1 {
            let px = *src.get_pixel(sx as u32, sy as u32);
            out.put_pixel((sx - left) as u32, (sy - top) as u32, px);
        }
    }
    out
}

/// Copy all of `src` into `canvas` with its top-left at (dx, dy), clipping at the canvas edge.
pub fn blit<P>(
    src: &ImageBuffer<P, Vec<P::Subpixel>>,
    canvas: &mut ImageBuffer<P, Vec<P::Subpixel>>,
    dx: u32,
    dy: u32,
) where
    P: Pixel,
{
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    for yy in 0..sh {
        if dy + yy >= ch {
            break;
        }
        for xx in 0..sw {
            if dx + xx >= cw {
                break;
            }
            canvas.put_pixel(dx + xx, dy + yy, *src.get_pixel(xx, yy));
        }
    }
}

/// Alpha-composite `src` over an opaque `background` color.
///
/// Each color channel becomes `src * a + bg * (1 - a)` (rounded), and the
/// result alpha is forced to the channel maximum, so the output carries no
/// transparency.
pub fn flatten_over<S>(
    src: &ImageBuffer<Rgba<S>, Vec<S>>,
    background: [S; 3],
) -> ImageBuffer<Rgba<S>, Vec<S>>
where
    S: Primitive + Into<u64> + TryFrom<u64>,
    Rgba<S>: Pixel<Subpixel = S>,
{
    let max: u64 = S::DEFAULT_MAX_VALUE.into();
    let (w, h) = src.dimensions();
    let mut out = ImageBuffer::new(w, h);
    for (x, y, px) in src.enumerate_pixels() {
        let a: u64 = px.0[3].into();
        let mut rgba = [S::DEFAULT_MAX_VALUE; 4];
        for c in 0..3 {
            let fg: u64 = px.0[c].into();
            let bg: u64 = background[c].into();
            let v = (fg * a + bg * (max - a) + max / 2) / max;
            rgba[c] = S::try_from(v.min(max)).unwrap_or(S::DEFAULT_MAX_VALUE);
        }
        out.put_pixel(x, y, Rgba(rgba));
    }
    out
}

/// Pure blue key color used behind UV sheets.
pub const UV_BACKGROUND_8: [u8; 3] = [0, 0, u8::MAX];
pub const UV_BACKGROUND_16: [u16; 3] = [0, 0, u16::MAX];

/// Flatten a sheet over the UV key color at its own bit depth.
pub fn flatten_uv(sheet: &FrameBuffer) -> FrameBuffer {
    match sheet {
        FrameBuffer::Rgba8(b) => FrameBuffer::Rgba8(flatten_over(b, UV_BACKGROUND_8)),
        FrameBuffer::Rgba16(b) => {
            let out: Rgba16Image = flatten_over(b, UV_BACKGROUND_16);
            FrameBuffer::Rgba16(out)
        }
    }
}

/// Paste `src` into `canvas` at (dx, dy), converting `src` to the canvas bit depth if needed.
pub fn paste(canvas: &mut FrameBuffer, src: &FrameBuffer, dx: u32, dy: u32) {
    match (canvas, src) {
        (FrameBuffer::Rgba8(c), FrameBuffer::Rgba8(s)) => blit(s, c, dx, dy),
        (FrameBuffer::Rgba16(c), FrameBuffer::Rgba16(s)) => blit(s, c, dx, dy),
        (FrameBuffer::Rgba16(c), FrameBuffer::Rgba8(s)) => {
            let wide = DynamicImage::ImageRgba8(s.clone()).to_rgba16();
            blit(&wide, c, dx, dy)
        }
        (FrameBuffer::Rgba8(c), FrameBuffer::Rgba16(s)) => {
            let narrow = DynamicImage::ImageRgba16(s.clone()).to_rgba8();
            blit(&narrow, c, dx, dy)
        }
    }
}
