//! Zoom math: pixels-per-second scale, bounded to a usable range.
//!
//! Pure with respect to the timeline; nothing here touches history.

/// Smallest usable scale, in pixels per second.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest usable scale, in pixels per second.
pub const MAX_ZOOM: f64 = 1000.0;
/// Scale at 100%: one second of timeline per hundred pixels.
pub const DEFAULT_ZOOM: f64 = 100.0;

/// Clamp a zoom value into `[MIN_ZOOM, MAX_ZOOM]`.
/// Non-finite input falls back to the default scale.
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        DEFAULT_ZOOM
    }
}

/// Zoom at which `span_secs` seconds exactly fill `viewport_width` pixels.
/// Returns `None` when the span or viewport is degenerate; callers supply
/// their own fallback (the default zoom for fit-to-timeline, the current
/// zoom for fit-to-selection).
pub fn fit_zoom(viewport_width: f64, span_secs: f64) -> Option<f64> {
    if viewport_width <= 0.0 || span_secs <= 0.0 {
        return None;
    }
    Some(clamp_zoom(viewport_width / span_secs))
}

/// Zoom for a percentage preset relative to the default scale.
pub fn preset_zoom(pct: f64) -> f64 {
    clamp_zoom(DEFAULT_ZOOM * pct / 100.0)
}
