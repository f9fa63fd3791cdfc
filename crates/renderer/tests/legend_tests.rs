//! Tests for legend rendering.

use renderer::{ColorRamp, Legend};

#[test]
fn test_precipitation_legend_entries() {
    let legend = Legend::from_ramp(&ColorRamp::precipitation());

    assert_eq!(legend.title, "Precipitation (mm/month)");
    let labels: Vec<&str> = legend.entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["0–26", "26–52", "52–78", "78–104", "104+"]);

    let colors: Vec<String> = legend.entries.iter().map(|e| e.color.to_hex()).collect();
    assert_eq!(colors, vec!["#0000ff", "#00ffff", "#ffff00", "#ffa500", "#ff0000"]);
}

#[test]
fn test_legend_matches_classifier() {
    let ramp = ColorRamp::precipitation();
    let legend = Legend::from_ramp(&ramp);
    for entry in &legend.entries {
        assert_eq!(ramp.classify(entry.from), entry.color);
    }
}

#[test]
fn test_legend_html() {
    let html = Legend::default().to_html();

    assert!(html.starts_with("<div class=\"info legend\">"));
    assert!(html.contains("<strong>Precipitation (mm/month)</strong>"));
    assert!(html.contains("<div><i style=\"background:#0000ff\"></i> 0&ndash;26</div>"));
    assert!(html.contains("<div><i style=\"background:#ff0000\"></i> 104+</div>"));
    assert_eq!(html.matches("<i style=").count(), 5);
}

#[test]
fn test_legend_text() {
    let text = Legend::default().to_string();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "Precipitation (mm/month)");
    assert_eq!(lines[1], "  #0000ff  0–26");
    assert_eq!(lines[5], "  #ff0000  104+");
    assert_eq!(lines.len(), 6);
}

#[test]
fn test_legend_is_pure() {
    let ramp = ColorRamp::precipitation();
    assert_eq!(Legend::from_ramp(&ramp), Legend::from_ramp(&ramp));
    assert_eq!(Legend::from_ramp(&ramp).to_html(), Legend::default().to_html());
}
