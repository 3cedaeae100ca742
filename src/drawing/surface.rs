//! 2D-tekenoppervlak: alleen lijn-, vul- en tekstopdrachten.

use serde::{Deserialize, Serialize};

/// Canvas size in device pixels plus the ratio to CSS pixels.
///
/// Drawing happens in CSS pixels; the host scales its context by
/// `device_pixel_ratio` once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportSize {
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub device_pixel_ratio: f64,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self::new(300.0, 200.0, 1.0)
    }
}

impl ViewportSize {
    #[must_use]
    pub const fn new(pixel_width: f64, pixel_height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            pixel_width,
            pixel_height,
            device_pixel_ratio,
        }
    }

    fn ratio(&self) -> f64 {
        if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        }
    }

    #[must_use]
    pub fn css_width(&self) -> f64 {
        self.pixel_width / self.ratio()
    }

    #[must_use]
    pub fn css_height(&self) -> f64 {
        self.pixel_height / self.ratio()
    }
}

/// Primitive canvas operations, in CSS pixels.
pub trait DrawingSurface {
    fn clear(&mut self, width: f64, height: f64);
    fn set_stroke(&mut self, color: &str, line_width: f64);
    fn set_fill(&mut self, color: &str);
    /// Empty pattern means solid lines.
    fn set_line_dash(&mut self, pattern: &[f64]);
    fn set_font(&mut self, font: &str);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn line(&mut self, from: [f64; 2], to: [f64; 2]);
    fn fill_text(&mut self, text: &str, x: f64, y: f64);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawCommand {
    Clear { width: f64, height: f64 },
    SetStroke { color: String, line_width: f64 },
    SetFill { color: String },
    SetLineDash { pattern: Vec<f64> },
    SetFont { font: String },
    FillRect { x: f64, y: f64, width: f64, height: f64 },
    StrokeRect { x: f64, y: f64, width: f64, height: f64 },
    Line { from: [f64; 2], to: [f64; 2] },
    FillText { text: String, x: f64, y: f64 },
}

/// Surface that records commands for replay on a real canvas.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CommandList {
    commands: Vec<DrawCommand>,
}

impl CommandList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Texts drawn, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::FillText { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn replay(&self, surface: &mut impl DrawingSurface) {
        for command in &self.commands {
            match command {
                DrawCommand::Clear { width, height } => surface.clear(*width, *height),
                DrawCommand::SetStroke { color, line_width } => surface.set_stroke(color, *line_width),
                DrawCommand::SetFill { color } => surface.set_fill(color),
                DrawCommand::SetLineDash { pattern } => surface.set_line_dash(pattern),
                DrawCommand::SetFont { font } => surface.set_font(font),
                DrawCommand::FillRect {
                    x,
                    y,
                    width,
                    height,
                } => surface.fill_rect(*x, *y, *width, *height),
                DrawCommand::StrokeRect {
                    x,
                    y,
                    width,
                    height,
                } => surface.stroke_rect(*x, *y, *width, *height),
                DrawCommand::Line { from, to } => surface.line(*from, *to),
                DrawCommand::FillText { text, x, y } => surface.fill_text(text, *x, *y),
            }
        }
    }
}

impl DrawingSurface for CommandList {
    fn clear(&mut self, width: f64, height: f64) {
        self.commands.push(DrawCommand::Clear { width, height });
    }

    fn set_stroke(&mut self, color: &str, line_width: f64) {
        self.commands.push(DrawCommand::SetStroke {
            color: color.to_owned(),
            line_width,
        });
    }

    fn set_fill(&mut self, color: &str) {
        self.commands.push(DrawCommand::SetFill {
            color: color.to_owned(),
        });
    }

    fn set_line_dash(&mut self, pattern: &[f64]) {
        self.commands.push(DrawCommand::SetLineDash {
            pattern: pattern.to_vec(),
        });
    }

    fn set_font(&mut self, font: &str) {
        self.commands.push(DrawCommand::SetFont {
            font: font.to_owned(),
        });
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
        });
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::StrokeRect {
            x,
            y,
            width,
            height,
        });
    }

    fn line(&mut self, from: [f64; 2], to: [f64; 2]) {
        self.commands.push(DrawCommand::Line { from, to });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_owned(),
            x,
            y,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_size_divides_by_ratio() {
        let v = ViewportSize::new(600.0, 400.0, 2.0);
        assert_eq!(v.css_width(), 300.0);
        assert_eq!(v.css_height(), 200.0);
        assert_eq!(ViewportSize::new(600.0, 400.0, 0.0).css_width(), 600.0);
    }

    #[test]
    fn replay_reproduces_the_recording() {
        let mut original = CommandList::new();
        original.clear(10.0, 10.0);
        original.set_line_dash(&[5.0, 5.0]);
        original.line([0.0, 0.0], [10.0, 10.0]);
        original.fill_text("20\"", 1.0, 2.0);

        let mut copy = CommandList::new();
        original.replay(&mut copy);
        assert_eq!(copy, original);
        assert_eq!(copy.texts().collect::<Vec<_>>(), vec!["20\""]);
    }
}
