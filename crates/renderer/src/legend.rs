//! Legend derived from a color ramp.

use std::fmt;

use forecast_common::Color;
use serde::Serialize;

use crate::ramp::ColorRamp;

/// One swatch: the bucket color and its `from–to` (or `from+`) label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub color: Color,
    pub from: f64,
    pub to: Option<f64>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: String,
    pub version: u32,
    pub entries: Vec<LegendEntry>,
}

impl Legend {
    pub fn from_ramp(ramp: &ColorRamp) -> Self {
        let entries = ramp
            .buckets()
            .map(|(from, to, color)| LegendEntry {
                color,
                from,
                to,
                label: label(from, to, "\u{2013}"),
            })
            .collect();

        Self {
            title: ramp.title().to_string(),
            version: ramp.version(),
            entries,
        }
    }

    /// The `info legend` control block.
    pub fn to_html(&self) -> String {
        let mut lines = Vec::with_capacity(self.entries.len() + 1);
        lines.push(format!("<strong>{}</strong>", escape(&self.title)));
        for entry in &self.entries {
            lines.push(format!(
                "<div><i style=\"background:{}\"></i> {}</div>",
                swatch(entry.color),
                label(entry.from, entry.to, "&ndash;")
            ));
        }
        format!("<div class=\"info legend\">{}</div>", lines.join("<br>"))
    }
}

impl Default for Legend {
    fn default() -> Self {
        Self::from_ramp(&ColorRamp::precipitation())
    }
}

impl fmt::Display for Legend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        for entry in &self.entries {
            writeln!(f, "  {}  {}", swatch(entry.color), entry.label)?;
        }
        Ok(())
    }
}

fn label(from: f64, to: Option<f64>, dash: &str) -> String {
    match to {
        Some(to) => format!("{}{}{}", bound(from), dash, bound(to)),
        None => format!("{}+", bound(from)),
    }
}

fn bound(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        format!("{}", v)
    }
}

/// CSS color without alpha; legend swatches are always drawn opaque.
fn swatch(color: Color) -> String {
    Color::rgb(color.r, color.g, color.b).to_hex()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ramp::ColorStop;

    #[test]
    fn test_bound_formatting() {
        assert_eq!(bound(26.0), "26");
        assert_eq!(bound(2.5), "2.5");
        assert_eq!(bound(-1.0), "-1");
    }

    #[test]
    fn test_custom_ramp_labels() {
        let ramp = ColorRamp::new(
            vec![
                ColorStop::new(0.0, Color::rgb(1, 2, 3)),
                ColorStop::new(0.5, Color::rgb(4, 5, 6)),
            ],
            Color::TRANSPARENT,
        )
        .unwrap()
        .with_title("ACC", "");

        let legend = Legend::from_ramp(&ramp);
        let labels: Vec<_> = legend.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["0\u{2013}0.5", "0.5+"]);
        assert_eq!(legend.version, 0);
    }

    #[test]
    fn test_title_is_escaped() {
        let ramp = ColorRamp::precipitation().with_title("<b>A & B</b>", "");
        assert!(Legend::from_ramp(&ramp)
            .to_html()
            .contains("<strong>&lt;b&gt;A &amp; B&lt;/b&gt;</strong>"));
    }
}
