use std::path::Path;

use image::{ImageBuffer, Luma};
use ndarray::Array2;

use crate::error::Result;

/// Load a grayscale image file as one plane with values in [0.0, 1.0].
///
/// Colour images are converted to luminance; 8-bit data is widened to
/// 16 bits before scaling.
pub fn load_plane(path: &Path) -> Result<Array2<f32>> {
    let img = image::open(path)?;
    let gray = img.to_luma16();
    let (w, h) = gray.dimensions();
    let mut data = Array2::<f32>::zeros((h as usize, w as usize));

    for (col, row, pixel) in gray.enumerate_pixels() {
        data[[row as usize, col as usize]] = pixel.0[0] as f32 / 65535.0;
    }

    Ok(data)
}

/// Save a plane as 16-bit grayscale; the format follows the file extension.
pub fn save_plane(data: &Array2<f32>, path: &Path) -> Result<()> {
    let (h, w) = data.dim();
    let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_fn(w as u32, h as u32, |col, row| {
        let v = data[[row as usize, col as usize]].clamp(0.0, 1.0);
        Luma([(v * 65535.0).round() as u16])
    });
    img.save(path)?;
    Ok(())
}
