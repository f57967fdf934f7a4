// 🔍 View transform - pan/zoom state of the diagram canvas
//
// Screen point = diagram point * k + (x, y). The initial framing centres the
// root box horizontally and sits a fixed margin below the top, zoomed out.

use crate::config::RenderConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        ViewTransform::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform { x: 0.0, y: 0.0, k: 1.0 };

    /// Framing used on every scenario switch and reset. Depends on the canvas
    /// width so it stays centred after a resize.
    pub fn initial(canvas_width: f64, config: &RenderConfig) -> Self {
        let k = config.clamp_scale(config.initial_scale);
        ViewTransform {
            x: canvas_width / 2.0 - (config.node_width / 2.0) * k,
            y: config.margin_top,
            k,
        }
    }

    pub fn pan(&self, dx: f64, dy: f64) -> Self {
        ViewTransform {
            x: self.x + dx,
            y: self.y + dy,
            k: self.k,
        }
    }

    /// Zoom by `factor` keeping the screen point `focus` fixed; the resulting
    /// scale is clamped to the configured bounds.
    pub fn zoom_at(&self, factor: f64, focus: (f64, f64), config: &RenderConfig) -> Self {
        let k = config.clamp_scale(self.k * factor);
        let (fx, fy) = focus;
        // Diagram point currently under the focus
        let px = (fx - self.x) / self.k;
        let py = (fy - self.y) / self.k;
        ViewTransform {
            x: fx - px * k,
            y: fy - py * k,
            k,
        }
    }

    pub fn apply(&self, point: (f64, f64)) -> (f64, f64) {
        (point.0 * self.k + self.x, point.1 * self.k + self.y)
    }

    pub fn invert(&self, point: (f64, f64)) -> (f64, f64) {
        ((point.0 - self.x) / self.k, (point.1 - self.y) / self.k)
    }

    /// SVG `transform` attribute value
    pub fn to_svg(&self) -> String {
        format!("translate({},{}) scale({})", fmt_num(self.x), fmt_num(self.y), fmt_num(self.k))
    }

    fn lerp(&self, to: &ViewTransform, t: f64) -> Self {
        ViewTransform {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
            k: self.k + (to.k - self.k) * t,
        }
    }
}

/// Compact number formatting for SVG attributes
pub(crate) fn fmt_num(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

// ============================================================================
// RESET ANIMATION
// ============================================================================

/// Animated move from one transform to another
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransition {
    pub from: ViewTransform,
    pub to: ViewTransform,
    pub duration: Duration,
}

impl ViewTransition {
    pub fn new(from: ViewTransform, to: ViewTransform, duration: Duration) -> Self {
        ViewTransition { from, to, duration }
    }

    /// Transform after `elapsed`; exactly `to` once the duration has passed
    pub fn at(&self, elapsed: Duration) -> ViewTransform {
        if elapsed >= self.duration || self.duration.is_zero() {
            return self.to;
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from.lerp(&self.to, ease_cubic_in_out(t))
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}
