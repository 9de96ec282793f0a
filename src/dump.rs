//! Coverage buffer inspection helpers
//!
//! Writes a [CoverageBuffer](crate::CoverageBuffer) out as a grayscale
//! image for eyeballing rendering results and comparing runs.

use crate::coverage::CoverageBuffer;

use std::path::Path;

/// Save coverage as an 8-bit grayscale image, format chosen by extension
pub fn write_file<P: AsRef<Path>>(cov: &CoverageBuffer, filename: P) -> Result<(), std::io::Error> {
    image::save_buffer(
        filename,
        cov.bytes(),
        cov.width() as u32,
        cov.height() as u32,
        image::Gray(8),
    )
}

/// Load a grayscale image back as raw bytes and dimensions
pub fn read_file<P: AsRef<Path>>(filename: P) -> Result<(Vec<u8>, usize, usize), image::ImageError> {
    let img = image::open(filename)?.to_luma();
    let (w, h) = img.dimensions();
    Ok((img.into_raw(), w as usize, h as usize))
}

/// Compare two saved coverage images pixel by pixel
pub fn img_diff<P: AsRef<Path>>(f1: P, f2: P) -> Result<bool, image::ImageError> {
    let (d1, w1, h1) = read_file(f1)?;
    let (d2, w2, h2) = read_file(f2)?;
    if w1 != w2 || h1 != h2 {
        return Ok(false);
    }
    let mut flag = true;
    for (i, (v1, v2)) in d1.iter().zip(d2.iter()).enumerate() {
        if v1 != v2 {
            println!("({},{}): {} {}", i % w1, i / w1, v1, v2);
            flag = false;
        }
    }
    Ok(flag)
}
