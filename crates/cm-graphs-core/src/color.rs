//! CSS color parsing and HCL interpolation.

use crate::{Error, Result};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub opacity: f64,
}

impl Rgb {
    pub fn parse(value: &str) -> Result<Self> {
        let c = svgtypes::Color::from_str(value.trim()).map_err(|_| Error::InvalidColor {
            value: value.to_string(),
        })?;
        Ok(Self {
            r: f64::from(c.red),
            g: f64::from(c.green),
            b: f64::from(c.blue),
            opacity: f64::from(c.alpha) / 255.0,
        })
    }

    /// CSS `rgb(r, g, b)` (or `rgba(...)` when translucent), channels rounded and clamped.
    pub fn to_css(&self) -> String {
        let ch = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        if self.opacity >= 1.0 {
            format!("rgb({}, {}, {})", ch(self.r), ch(self.g), ch(self.b))
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                ch(self.r),
                ch(self.g),
                ch(self.b),
                self.opacity.clamp(0.0, 1.0)
            )
        }
    }
}

const XN: f64 = 0.96422;
const YN: f64 = 1.0;
const ZN: f64 = 0.82521;
const T0: f64 = 4.0 / 29.0;
const T1: f64 = 6.0 / 29.0;
const T2: f64 = 3.0 * T1 * T1;
const T3: f64 = T1 * T1 * T1;

/// Cylindrical CIELAB. `h` is NaN for achromatic colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hcl {
    pub h: f64,
    pub c: f64,
    pub l: f64,
    pub opacity: f64,
}

fn rgb_to_linear(v: f64) -> f64 {
    let v = v / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_rgb(v: f64) -> f64 {
    let v = if v <= 0.003_130_8 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    };
    255.0 * v
}

fn xyz_to_lab(t: f64) -> f64 {
    if t > T3 { t.cbrt() } else { t / T2 + T0 }
}

fn lab_to_xyz(t: f64) -> f64 {
    if t > T1 { t * t * t } else { T2 * (t - T0) }
}

impl From<Rgb> for Hcl {
    fn from(c: Rgb) -> Self {
        let r = rgb_to_linear(c.r);
        let g = rgb_to_linear(c.g);
        let b = rgb_to_linear(c.b);
        let y = xyz_to_lab((0.222_504_5 * r + 0.716_878_6 * g + 0.060_616_9 * b) / YN);
        let (x, z) = if r == g && g == b {
            (y, y)
        } else {
            (
                xyz_to_lab((0.436_074_7 * r + 0.385_064_9 * g + 0.143_080_4 * b) / XN),
                xyz_to_lab((0.013_932_2 * r + 0.097_104_5 * g + 0.714_173_3 * b) / ZN),
            )
        };
        let l = 116.0 * y - 16.0;
        let a = 500.0 * (x - y);
        let lab_b = 200.0 * (y - z);

        if a == 0.0 && lab_b == 0.0 {
            return Hcl {
                h: f64::NAN,
                c: if l > 0.0 && l < 100.0 { 0.0 } else { f64::NAN },
                l,
                opacity: c.opacity,
            };
        }
        let mut h = lab_b.atan2(a).to_degrees();
        if h < 0.0 {
            h += 360.0;
        }
        Hcl {
            h,
            c: a.hypot(lab_b),
            l,
            opacity: c.opacity,
        }
    }
}

impl From<Hcl> for Rgb {
    fn from(c: Hcl) -> Self {
        let (a, lab_b) = if c.h.is_nan() {
            (0.0, 0.0)
        } else {
            let h = c.h.to_radians();
            (h.cos() * c.c, h.sin() * c.c)
        };
        let y0 = (c.l + 16.0) / 116.0;
        let x0 = y0 + a / 500.0;
        let z0 = y0 - lab_b / 200.0;
        let x = XN * lab_to_xyz(x0);
        let y = YN * lab_to_xyz(y0);
        let z = ZN * lab_to_xyz(z0);
        Rgb {
            r: linear_to_rgb(3.133_856_1 * x - 1.616_866_7 * y - 0.490_614_6 * z),
            g: linear_to_rgb(-0.978_768_4 * x + 1.916_141_5 * y + 0.033_454_0 * z),
            b: linear_to_rgb(0.071_945_3 * x - 0.228_991_4 * y + 1.405_242_7 * z),
            opacity: c.opacity,
        }
    }
}

/// Linear interpolation that treats a NaN endpoint as "take the other side".
fn lerp_channel(a: f64, b: f64, t: f64) -> f64 {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => f64::NAN,
        (true, false) => b,
        (false, true) => a,
        (false, false) => a + (b - a) * t,
    }
}

/// Hue interpolation along the shorter arc.
fn lerp_hue(a: f64, b: f64, t: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        return lerp_channel(a, b, t);
    }
    let mut d = b - a;
    if !(-180.0..=180.0).contains(&d) {
        d -= 360.0 * (d / 360.0).round();
    }
    a + d * t
}

/// Interpolates between two colors in HCL space.
pub fn interpolate_hcl(start: Rgb, end: Rgb, t: f64) -> Rgb {
    let a = Hcl::from(start);
    let b = Hcl::from(end);
    Rgb::from(Hcl {
        h: lerp_hue(a.h, b.h, t),
        c: lerp_channel(a.c, b.c, t),
        l: lerp_channel(a.l, b.l, t),
        opacity: lerp_channel(a.opacity, b.opacity, t),
    })
}

/// Maps a depth in `[0, max_depth]` onto a start..end HCL ramp.
#[derive(Debug, Clone, Copy)]
pub struct DepthColorScale {
    start: Rgb,
    end: Rgb,
    max_depth: usize,
}

impl DepthColorScale {
    pub fn new(start: &str, end: &str, max_depth: usize) -> Result<Self> {
        Ok(Self {
            start: Rgb::parse(start)?,
            end: Rgb::parse(end)?,
            max_depth,
        })
    }

    pub fn color(&self, depth: usize) -> String {
        let t = if self.max_depth == 0 {
            0.5
        } else {
            depth as f64 / self.max_depth as f64
        };
        interpolate_hcl(self.start, self.end, t).to_css()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hcl_round_trip_preserves_rgb() {
        let c = Rgb::parse("steelblue").unwrap();
        let back = Rgb::from(Hcl::from(c));
        assert!((back.r - c.r).abs() < 0.5);
        assert!((back.g - c.g).abs() < 0.5);
        assert!((back.b - c.b).abs() < 0.5);
    }

    #[test]
    fn ramp_endpoints_match_inputs() {
        let scale = DepthColorScale::new("lightsteelblue", "steelblue", 2).unwrap();
        assert_eq!(scale.color(0), "rgb(176, 196, 222)");
        assert_eq!(scale.color(2), "rgb(70, 130, 180)");
    }

    #[test]
    fn grey_takes_hue_of_the_other_end() {
        let grey = Rgb::parse("#808080").unwrap();
        let red = Rgb::parse("red").unwrap();
        assert!(Hcl::from(grey).h.is_nan());
        let mid = Hcl::from(interpolate_hcl(grey, red, 0.5));
        assert!((mid.h - Hcl::from(red).h).abs() < 1.0);
    }

    #[test]
    fn unknown_color_is_an_error() {
        assert!(Rgb::parse("not-a-color").is_err());
    }
}
