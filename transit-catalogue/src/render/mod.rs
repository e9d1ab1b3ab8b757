//! Map render settings.
//!
//! Rendering itself lives outside this crate; these types exist because the
//! build document carries a `render_settings` block and the snapshot format
//! must round-trip it untouched for whatever consumes it downstream.

use serde::Deserialize;

/// A color as it appears in the build document: a named color, an RGB
/// triple, or an RGBA quadruple with a 0..1 opacity.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Named(String),
    Rgb(u8, u8, u8),
    Rgba(u8, u8, u8, f64),
}

/// Visual parameters for map rendering, parsed from the build document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RenderSettings {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub line_width: f64,
    pub stop_radius: f64,
    pub bus_label_font_size: u32,
    pub bus_label_offset: (f64, f64),
    pub stop_label_font_size: u32,
    pub stop_label_offset: (f64, f64),
    pub underlayer_color: Color,
    pub underlayer_width: f64,
    pub color_palette: Vec<Color>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
            padding: 50.0,
            line_width: 14.0,
            stop_radius: 5.0,
            bus_label_font_size: 20,
            bus_label_offset: (7.0, 15.0),
            stop_label_font_size: 20,
            stop_label_offset: (7.0, -3.0),
            underlayer_color: Color::Rgba(255, 255, 255, 0.85),
            underlayer_width: 3.0,
            color_palette: vec![
                Color::Named("green".into()),
                Color::Rgb(255, 160, 0),
                Color::Named("red".into()),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_color_form() {
        let json = r#"{
            "width": 1200,
            "height": 500,
            "padding": 50,
            "line_width": 14,
            "stop_radius": 5,
            "bus_label_font_size": 20,
            "bus_label_offset": [7, 15],
            "stop_label_font_size": 18,
            "stop_label_offset": [7, -3],
            "underlayer_color": [255, 255, 255, 0.85],
            "underlayer_width": 3,
            "color_palette": ["green", [255, 160, 0], "red", [0, 0, 0, 0.5]]
        }"#;

        let settings: RenderSettings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.width, 1200.0);
        assert_eq!(settings.bus_label_offset, (7.0, 15.0));
        assert_eq!(settings.underlayer_color, Color::Rgba(255, 255, 255, 0.85));
        assert_eq!(
            settings.color_palette,
            vec![
                Color::Named("green".into()),
                Color::Rgb(255, 160, 0),
                Color::Named("red".into()),
                Color::Rgba(0, 0, 0, 0.5),
            ]
        );
    }

    #[test]
    fn rejects_malformed_color() {
        let result: Result<Color, _> = serde_json::from_str("[1, 2]");
        assert!(result.is_err());
    }
}
