//! Grayscale and HSV views of a decoded image.
//!
//! Both conversions use the 8-bit fixed-point conventions common to machine
//! vision libraries, so metrics computed here line up with tooling that was
//! tuned on those conventions: BT.601 luma, and HSV with hue halved into
//! `[0, 180)`.

use image::{GrayImage, ImageBuffer, Luma, Rgb};

use crate::image_pipeline::loader::RawImage;

/// Per-pixel `[H, S, V]`, H in `[0, 180)`, S and V in `[0, 255]`.
pub type HsvImage = ImageBuffer<Rgb<u8>, Vec<u8>>;

const FIXED_SHIFT: u32 = 14;
const R_TO_Y: u32 = 4899;
const G_TO_Y: u32 = 9617;
const B_TO_Y: u32 = 1868;

const HSV_SHIFT: i32 = 12;
const HUE_RANGE: i32 = 180;

/// Read-only views derived from one [`RawImage`]; they live for one analysis call.
#[derive(Debug, Clone)]
pub struct DerivedViews {
    gray: GrayImage,
    hsv: HsvImage,
}

impl DerivedViews {
    pub fn compute(image: &RawImage) -> Self {
        let pixels = image.pixels();
        let (width, height) = pixels.dimensions();
        let mut gray = GrayImage::new(width, height);
        let mut hsv = HsvImage::new(width, height);

        for ((src, luma), hsv_px) in pixels.pixels().zip(gray.pixels_mut()).zip(hsv.pixels_mut()) {
            *luma = Luma([luma_of(src.0)]);
            *hsv_px = Rgb(hsv_of(src.0));
        }

        Self { gray, hsv }
    }

    pub fn gray(&self) -> &GrayImage {
        &self.gray
    }

    pub fn hsv(&self) -> &HsvImage {
        &self.hsv
    }
}

pub fn luma_of([r, g, b]: [u8; 3]) -> u8 {
    let y = r as u32 * R_TO_Y + g as u32 * G_TO_Y + b as u32 * B_TO_Y;
    ((y + (1 << (FIXED_SHIFT - 1))) >> FIXED_SHIFT) as u8
}

pub fn hsv_of([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let v = r.max(g).max(b);
    let diff = v - r.min(g).min(b);
    let round = 1 << (HSV_SHIFT - 1);

    let s = if v == 0 {
        0
    } else {
        let div = ((255 << HSV_SHIFT) as f64 / v as f64).round() as i32;
        (diff * div + round) >> HSV_SHIFT
    };

    let h = if diff == 0 {
        0
    } else {
        let sector = if v == r {
            g - b
        } else if v == g {
            b - r + 2 * diff
        } else {
            r - g + 4 * diff
        };
        let div = ((HUE_RANGE << HSV_SHIFT) as f64 / (6 * diff) as f64).round() as i32;
        let h = (sector * div + round) >> HSV_SHIFT;
        if h < 0 { h + HUE_RANGE } else { h }
    };

    [h as u8, s as u8, v as u8]
}
