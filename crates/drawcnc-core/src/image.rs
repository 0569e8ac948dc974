/// Borrowed interleaved 8-bit image, row-major, `len = width * height * channels`.
#[derive(Clone, Copy, Debug)]
pub struct ImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: &'a [u8],
}

/// Owned counterpart of [`ImageView`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: Vec<u8>,
}

impl Image {
    pub fn new(width: usize, height: usize, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![0u8; width * height * channels],
        }
    }

    pub fn view(&self) -> ImageView<'_> {
        ImageView {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data: &self.data,
        }
    }
}

impl<'a> ImageView<'a> {
    /// `true` when the buffer length matches the declared geometry.
    pub fn is_consistent(&self) -> bool {
        self.width
            .checked_mul(self.height)
            .and_then(|n| n.checked_mul(self.channels))
            == Some(self.data.len())
    }
}

#[inline]
fn get_channel(src: &ImageView<'_>, x: i32, y: i32, c: usize) -> u8 {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return 0;
    }
    src.data[(y as usize * src.width + x as usize) * src.channels + c]
}

/// Bilinear sample of channel `c`; pixels outside the image read as 0.
#[inline]
pub fn sample_bilinear(src: &ImageView<'_>, x: f32, y: f32, c: usize) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_channel(src, x0, y0, c) as f32;
    let p10 = get_channel(src, x0 + 1, y0, c) as f32;
    let p01 = get_channel(src, x0, y0 + 1, c) as f32;
    let p11 = get_channel(src, x0 + 1, y0 + 1, c) as f32;

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

#[inline]
pub fn sample_bilinear_u8(src: &ImageView<'_>, x: f32, y: f32, c: usize) -> u8 {
    sample_bilinear(src, x, y, c).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_interpolate_per_channel() {
        // 2x1 RGB: black, then (200, 100, 50)
        let data = [0u8, 0, 0, 200, 100, 50];
        let view = ImageView {
            width: 2,
            height: 1,
            channels: 3,
            data: &data,
        };
        assert!(view.is_consistent());
        assert_eq!(sample_bilinear_u8(&view, 1.0, 0.0, 0), 200);
        assert_eq!(sample_bilinear_u8(&view, 0.5, 0.0, 1), 50);
        assert_eq!(sample_bilinear_u8(&view, -3.0, 0.0, 2), 0);
    }

    #[test]
    fn inconsistent_geometry_is_detected() {
        let data = [0u8; 5];
        let view = ImageView {
            width: 2,
            height: 1,
            channels: 3,
            data: &data,
        };
        assert!(!view.is_consistent());
        assert!(Image::new(4, 3, 3).view().is_consistent());
    }
}
