use common::req::Device;

use crate::signal::{color_for_signal, signal_class, Rgb};

/// Fixed coverage annotation shown in every popup.
pub const COVERAGE_RADIUS_M: u32 = 30;

/// Everything needed to draw one device on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub lat: f64,
    pub lng: f64,
    pub color: Rgb,
    pub popup: String,
}

impl MarkerSpec {
    pub fn for_device(dev: &Device) -> Self {
        Self {
            // stored x is the longitude, y the latitude
            lat: dev.coordinate_y,
            lng: dev.coordinate_x,
            color: color_for_signal(dev.signal_quality as f64),
            popup: popup_html(dev),
        }
    }

    /// Round glyph filled with the marker color.
    pub fn icon_html(&self) -> String {
        format!(
            "<div class=\"marker-dot\" style=\"background: {};\"></div>",
            self.color
        )
    }
}

pub fn popup_html(dev: &Device) -> String {
    format!(
        "<b>{label}</b>\
         <div class=\"{class}\">Signal: {signal}/10</div>\
         <div>Coordinates:<br>{x:.6},<br>{y:.6}</div>\
         <div>Coverage: {COVERAGE_RADIUS_M}m radius</div>",
        label = escape_html(&dev.device_id),
        class = signal_class(dev.signal_quality),
        signal = dev.signal_quality,
        x = dev.coordinate_x,
        y = dev.coordinate_y,
    )
}

/// Escapes text for inclusion in html. Labels are stored raw and only escaped
/// here, where they meet the DOM.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}
