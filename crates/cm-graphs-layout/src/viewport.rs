//! Fit, zoom and transition math for charts drawn inside a pannable viewport.

use cm_graphs_core::config::{Margin, ZoomConfig};
use cm_graphs_core::geom::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Default duration of animated re-fits, in milliseconds.
pub const TRANSITION_DURATION: f64 = 750.0;

/// Scale and translation that center content inside a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitTransform {
    pub scale: f64,
    pub translate: Point,
}

/// Fits `content` into `container`.
///
/// The scale is the largest that keeps the content inside the container minus its margins,
/// clamped to the zoom limits when there are any. Returns `None` for content without area.
pub fn compute_fit(
    content: &Rect,
    container: Size,
    margin: &Margin,
    zoom: Option<&ZoomConfig>,
) -> Option<FitTransform> {
    if content.width == 0.0 || content.height == 0.0 {
        return None;
    }
    let scale = ((container.width - margin.horizontal()) / content.width)
        .min((container.height - margin.vertical()) / content.height);
    let scale = zoom.map_or(scale, |z| z.clamp(scale));
    if !scale.is_finite() {
        return None;
    }
    let mid = content.center();
    let fit = FitTransform {
        scale,
        translate: Point::new(
            container.width / 2.0 - scale * mid.x,
            container.height / 2.0 - scale * mid.y,
        ),
    };
    tracing::debug!(scale = fit.scale, x = fit.translate.x, y = fit.translate.y, "fit");
    Some(fit)
}

/// Container size after overflow: an axis that allows overflow grows to the content instead of
/// shrinking the content to fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overflow {
    pub container: Size,
    pub scroll_x: bool,
    pub scroll_y: bool,
}

pub fn apply_overflow(content: &Rect, container: Size, overflow_x: bool, overflow_y: bool) -> Overflow {
    let scroll_x = overflow_x && content.width > container.width;
    let scroll_y = overflow_y && content.height > container.height;
    Overflow {
        container: Size::new(
            if scroll_x { content.width } else { container.width },
            if scroll_y {
                content.height
            } else {
                container.height
            },
        ),
        scroll_x,
        scroll_y,
    }
}

/// A pan/zoom transform: `screen = k * point + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: ZoomTransform = ZoomTransform {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.k + self.x, p.y * self.k + self.y)
    }

    pub fn invert(&self, p: Point) -> Point {
        Point::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
    }
}

impl From<FitTransform> for ZoomTransform {
    fn from(fit: FitTransform) -> Self {
        Self {
            k: fit.scale,
            x: fit.translate.x,
            y: fit.translate.y,
        }
    }
}

/// The transform a pan/zoom gesture handler works from.
///
/// A programmatic fit overwrites it, so a gesture that follows a re-fit continues from the
/// fitted view instead of jumping back to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ZoomState {
    pub transform: ZoomTransform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_extent: Option<(f64, f64)>,
}

impl ZoomState {
    pub fn new(zoom: Option<&ZoomConfig>) -> Self {
        Self {
            transform: ZoomTransform::IDENTITY,
            scale_extent: zoom.map(|z| (z.min_zoom, z.max_zoom)),
        }
    }

    pub fn sync_to_fit(&mut self, fit: &FitTransform) {
        self.transform = ZoomTransform::from(*fit);
    }

    /// Zooms by `factor` around `center` (screen coordinates), respecting the scale extent.
    pub fn zoom_by(&mut self, factor: f64, center: Point) {
        let anchor = self.transform.invert(center);
        let mut k = self.transform.k * factor;
        if let Some((min, max)) = self.scale_extent {
            k = k.max(min).min(max);
        }
        self.transform = ZoomTransform {
            k,
            x: center.x - anchor.x * k,
            y: center.y - anchor.y * k,
        };
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.transform.x += dx;
        self.transform.y += dy;
    }
}

/// A view expressed as center and visible width, as used by smooth zooming.
pub type View = [f64; 3];

/// Smooth zoom between two views (van Wijk and Nuij), with `rho = sqrt(2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomInterpolator {
    from: View,
    dx: f64,
    dy: f64,
    d1: f64,
    r0: f64,
    s: f64,
    straight: bool,
    /// Suggested duration in milliseconds, proportional to the path length.
    pub duration: f64,
}

const RHO: f64 = std::f64::consts::SQRT_2;
const EPSILON2: f64 = 1e-12;

pub fn interpolate_zoom(from: View, to: View) -> ZoomInterpolator {
    let [ux0, uy0, w0] = from;
    let [ux1, uy1, w1] = to;
    let (dx, dy) = (ux1 - ux0, uy1 - uy0);
    let d2 = dx * dx + dy * dy;
    let (rho2, rho4) = (RHO * RHO, RHO.powi(4));

    if d2 < EPSILON2 {
        let s = (w1 / w0).ln() / RHO;
        return ZoomInterpolator {
            from,
            dx,
            dy,
            d1: 0.0,
            r0: 0.0,
            s,
            straight: true,
            duration: (s * 1000.0 * RHO / std::f64::consts::SQRT_2).abs(),
        };
    }
    let d1 = d2.sqrt();
    let b0 = (w1 * w1 - w0 * w0 + rho4 * d2) / (2.0 * w0 * rho2 * d1);
    let b1 = (w1 * w1 - w0 * w0 - rho4 * d2) / (2.0 * w1 * rho2 * d1);
    let r0 = ((b0 * b0 + 1.0).sqrt() - b0).ln();
    let r1 = ((b1 * b1 + 1.0).sqrt() - b1).ln();
    let s = (r1 - r0) / RHO;
    ZoomInterpolator {
        from,
        dx,
        dy,
        d1,
        r0,
        s,
        straight: false,
        duration: s * 1000.0 * RHO / std::f64::consts::SQRT_2,
    }
}

impl ZoomInterpolator {
    pub fn at(&self, t: f64) -> View {
        let [ux0, uy0, w0] = self.from;
        if self.straight {
            return [
                ux0 + t * self.dx,
                uy0 + t * self.dy,
                w0 * (RHO * t * self.s).exp(),
            ];
        }
        let s = t * self.s;
        let cosh_r0 = self.r0.cosh();
        let u = w0 / (RHO * RHO * self.d1) * (cosh_r0 * (RHO * s + self.r0).tanh() - self.r0.sinh());
        [
            ux0 + u * self.dx,
            uy0 + u * self.dy,
            w0 * cosh_r0 / (RHO * s + self.r0).cosh(),
        ]
    }
}

/// Transform that shows `view` (center and diameter, in graph coordinates) in the middle of
/// the container. Content is drawn relative to the center of the graph area.
pub fn transform_for_view(view: View, graph: Size, container: Size) -> ZoomTransform {
    let k = graph.width.min(graph.height) / view[2];
    ZoomTransform {
        k,
        x: container.width / 2.0 - k * (view[0] - graph.width / 2.0),
        y: container.height / 2.0 - k * (view[1] - graph.height / 2.0),
    }
}

/// Hands out generation numbers to layout passes.
///
/// Each pass takes the next generation; a transition is only worth finishing while it belongs
/// to the latest one. Nothing is queued: a new pass simply supersedes whatever is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutClock {
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionStatus {
    Active,
    Superseded,
}

impl LayoutClock {
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        tracing::trace!(generation = self.generation, "layout pass");
        self.generation
    }

    pub fn current(&self) -> u64 {
        self.generation
    }

    pub fn status(&self, generation: u64) -> TransitionStatus {
        if generation == self.generation {
            TransitionStatus::Active
        } else {
            TransitionStatus::Superseded
        }
    }
}

/// An animated move from one transform to another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub generation: u64,
    pub duration: f64,
    pub from: ZoomTransform,
    pub to: ZoomTransform,
}

impl Transition {
    /// Linear interpolation of the transform at `t` in `[0, 1]`.
    pub fn at(&self, t: f64) -> ZoomTransform {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        ZoomTransform {
            k: lerp(self.from.k, self.to.k),
            x: lerp(self.from.x, self.to.x),
            y: lerp(self.from.y, self.to.y),
        }
    }
}
