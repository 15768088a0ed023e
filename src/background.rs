use crate::bitmap::Bitmap;
use crate::color::Color;

/// Estimate the background reference color of a bitmap.
///
/// With `sample_average` the four corner pixels are averaged per channel,
/// rounding halves up; otherwise the top-left pixel is used as-is.
/// Alpha is ignored. A [`Bitmap`] is never empty, so this cannot fail.
pub fn sample_background(bitmap: &Bitmap, sample_average: bool) -> Color {
    if !sample_average {
        return Color::from(bitmap.pixel(0, 0));
    }

    let (w, h) = bitmap.dimensions();
    let corners = [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)];
    let mut sums = [0u32; 3];
    for (x, y) in corners {
        let px = bitmap.pixel(x, y);
        for (sum, channel) in sums.iter_mut().zip(px.0) {
            *sum += channel as u32;
        }
    }

    let n = corners.len() as u32;
    let [r, g, b] = sums.map(|sum| ((sum + n / 2) / n) as u8);
    Color::new(r, g, b)
}
