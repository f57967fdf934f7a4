// 🎨 Renderer - display tree → positioned shapes
//
// A render pass always starts from an empty scene: normalize the customer,
// lay the tree out, then emit links, boxes and text in paint order. The
// resulting `Diagram` is surface-agnostic; `svg` and the terminal UI both
// draw from it.

use crate::category::{Category, Rgb};
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::labels::{detail_lines, header_text};
use crate::layout::{bounds, layout_tree, Bounds};
use crate::normalize::normalize;
use crate::scenario::ScenarioRecord;
use crate::view::{fmt_num, ViewTransform};

// ============================================================================
// SCENE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Vertical cubic link from a parent's bottom-centre to a child's top-centre
    Link { from: (f64, f64), to: (f64, f64) },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        fill: Rgb,
        stroke: Option<Rgb>,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        fill: Rgb,
        anchor: Anchor,
        size: f64,
        bold: bool,
    },
}

/// Everything needed to paint one scenario
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    pub scenario_name: String,
    pub shapes: Vec<Shape>,
    pub node_count: usize,
    pub bounds: Bounds,
    pub initial_view: ViewTransform,
}

impl Diagram {
    /// Header labels in paint order, handy for surfaces that only show text
    pub fn node_names(&self) -> Vec<&str> {
        self.shapes
            .iter()
            .filter_map(|s| match s {
                Shape::Text { text, bold: true, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn links(&self) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Link { from, to } => Some((*from, *to)),
            _ => None,
        })
    }
}

pub const HEADER_FONT_SIZE: f64 = 13.0;
pub const DETAIL_FONT_SIZE: f64 = 11.0;
const DETAIL_INDENT: f64 = 10.0;

// ============================================================================
// RENDER
// ============================================================================

/// Build the diagram for `scenario` on a canvas `canvas_width` wide.
pub fn render(
    scenario: &ScenarioRecord,
    config: &RenderConfig,
    canvas_width: f64,
) -> Result<Diagram, RenderError> {
    if !canvas_width.is_finite() || canvas_width <= 0.0 {
        return Err(RenderError::InvalidCanvas { width: canvas_width });
    }

    let root = normalize(&scenario.customer, Category::Global);
    let nodes = layout_tree(&root, config.node_size());
    let w = config.node_width;
    let h = config.node_height;

    let mut shapes = Vec::with_capacity(nodes.len() * 6);

    for node in &nodes {
        if let Some(parent) = node.parent.and_then(|p| nodes.get(p)) {
            shapes.push(Shape::Link {
                from: (parent.x + w / 2.0, parent.y + h),
                to: (node.x + w / 2.0, node.y),
            });
        }
    }

    for node in &nodes {
        let palette = node.node.category.bucket().palette();

        shapes.push(Shape::Rect {
            x: node.x,
            y: node.y,
            width: w,
            height: h,
            radius: config.corner_radius,
            fill: Rgb::NEUTRAL,
            stroke: Some(Rgb::ACCENT),
        });
        shapes.push(Shape::Rect {
            x: node.x,
            y: node.y,
            width: w,
            height: config.header_height,
            radius: config.corner_radius,
            fill: palette.header_fill,
            stroke: None,
        });
        shapes.push(Shape::Text {
            x: node.x + w / 2.0,
            y: node.y + config.header_height / 2.0 + HEADER_FONT_SIZE * 0.35,
            text: header_text(node.node, config),
            fill: palette.header_text,
            anchor: Anchor::Middle,
            size: HEADER_FONT_SIZE,
            bold: true,
        });

        let top = node.y + config.header_height + config.detail_top_padding;
        for (i, line) in detail_lines(node.node, config).into_iter().enumerate() {
            shapes.push(Shape::Text {
                x: node.x + DETAIL_INDENT,
                y: top + i as f64 * config.detail_line_height,
                text: line.text(),
                fill: Rgb::DETAIL_TEXT,
                anchor: Anchor::Start,
                size: DETAIL_FONT_SIZE,
                bold: false,
            });
        }
    }

    let bounds = bounds(&nodes, w, h).unwrap_or(Bounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: w,
        max_y: h,
    });

    tracing::debug!(
        scenario = %scenario.scenario_name,
        nodes = nodes.len(),
        shapes = shapes.len(),
        "rendered diagram"
    );

    Ok(Diagram {
        scenario_name: scenario.scenario_name.clone(),
        shapes,
        node_count: nodes.len(),
        bounds,
        initial_view: ViewTransform::initial(canvas_width, config),
    })
}

/// SVG path of a vertical link, as d3's `linkVertical`
pub fn link_path(from: (f64, f64), to: (f64, f64)) -> String {
    let mid = (from.1 + to.1) / 2.0;
    format!(
        "M{},{}C{},{} {},{} {},{}",
        fmt_num(from.0),
        fmt_num(from.1),
        fmt_num(from.0),
        fmt_num(mid),
        fmt_num(to.0),
        fmt_num(mid),
        fmt_num(to.0),
        fmt_num(to.1)
    )
}

/// Points along the same curve, for surfaces that can only draw lines
pub fn link_points(from: (f64, f64), to: (f64, f64), segments: usize) -> Vec<(f64, f64)> {
    let segments = segments.max(1);
    let mid = (from.1 + to.1) / 2.0;
    let control = [from, (from.0, mid), (to.0, mid), to];
    (0..=segments)
        .map(|i| {
            let t = i as f64 / segments as f64;
            let u = 1.0 - t;
            let b = [u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t];
            let x = (0..4).map(|j| b[j] * control[j].0).sum::<f64>();
            let y = (0..4).map(|j| b[j] * control[j].1).sum::<f64>();
            (x, y)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scenario(customer: serde_json::Value) -> ScenarioRecord {
        ScenarioRecord::new("Test", customer)
    }

    fn texts(diagram: &Diagram) -> Vec<(String, Rgb)> {
        diagram
            .shapes
            .iter()
            .filter_map(|s| match s {
                Shape::Text { text, fill, .. } => Some((text.clone(), *fill)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_one_box_pair_per_node_and_one_link_per_edge() {
        let record = scenario(json!({
            "tradingName": "Acme",
            "accounts": [{ "tradingName": "DE" }],
            "addresses": [{ "city": "Berlin", "country": "DE" }]
        }));
        let diagram = render(&record, &RenderConfig::default(), 1000.0).unwrap();

        let rects = diagram.shapes.iter().filter(|s| matches!(s, Shape::Rect { .. })).count();
        assert_eq!(diagram.node_count, 3);
        assert_eq!(rects, 6);
        assert_eq!(diagram.links().count(), 2);
        assert_eq!(diagram.node_names(), vec!["Acme", "DE", "Berlin, DE"]);
    }

    #[test]
    fn test_links_connect_bottom_centre_to_top_centre() {
        let config = RenderConfig::default();
        let record = scenario(json!({ "tradingName": "Acme", "addresses": [{ "city": "Berlin" }] }));
        let diagram = render(&record, &config, 1000.0).unwrap();

        let (from, to) = diagram.links().next().unwrap();
        assert_eq!(from, (config.node_width / 2.0, config.node_height));
        assert_eq!(to, (config.node_width / 2.0, config.node_size()[1]));
    }

    #[test]
    fn test_links_are_painted_before_boxes() {
        let record = scenario(json!({ "tradingName": "Acme", "addresses": [{ "city": "Berlin" }] }));
        let diagram = render(&record, &RenderConfig::default(), 1000.0).unwrap();
        assert!(matches!(diagram.shapes[0], Shape::Link { .. }));
    }

    #[test]
    fn test_global_header_is_black_text() {
        let record = scenario(json!({ "tradingName": "Acme", "accounts": [{ "tradingName": "Sub" }] }));
        let diagram = render(&record, &RenderConfig::default(), 1000.0).unwrap();
        let texts = texts(&diagram);
        assert_eq!(texts[0], ("Acme".to_string(), Rgb::BLACK));
        assert!(texts.contains(&("Sub".to_string(), Rgb::WHITE)));
    }

    #[test]
    fn test_header_fill_follows_category() {
        let record = scenario(json!({ "tradingName": "Acme", "bankAccounts": [{ "iban": "DE00" }] }));
        let diagram = render(&record, &RenderConfig::default(), 1000.0).unwrap();
        let headers: Vec<Rgb> = diagram
            .shapes
            .iter()
            .filter_map(|s| match s {
                Shape::Rect { fill, stroke: None, .. } => Some(*fill),
                _ => None,
            })
            .collect();
        assert_eq!(
            headers,
            vec![
                Category::Global.bucket().palette().header_fill,
                Category::Bank.bucket().palette().header_fill,
            ]
        );
    }

    #[test]
    fn test_long_name_is_truncated() {
        let config = RenderConfig::default();
        let record = scenario(json!({ "tradingName": "X".repeat(200) }));
        let diagram = render(&record, &config, 1000.0).unwrap();
        assert_eq!(diagram.node_names()[0].chars().count(), config.name_max_chars);
    }

    #[test]
    fn test_detail_lines_are_stacked_without_gaps() {
        let config = RenderConfig::default();
        let record = scenario(json!({ "scope": "EU" }));
        let diagram = render(&record, &config, 1000.0).unwrap();

        let details: Vec<(f64, String)> = diagram
            .shapes
            .iter()
            .filter_map(|s| match s {
                Shape::Text { y, text, bold: false, .. } => Some((*y, text.clone())),
                _ => None,
            })
            .collect();
        // ID is absent, so Scope takes the first line
        assert_eq!(
            details,
            vec![(config.header_height + config.detail_top_padding, "Scope: EU".to_string())]
        );
    }

    #[test]
    fn test_invalid_canvas_is_an_error() {
        let record = scenario(json!({}));
        for width in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                render(&record, &RenderConfig::default(), width),
                Err(RenderError::InvalidCanvas { .. })
            ));
        }
    }

    #[test]
    fn test_initial_view_matches_canvas() {
        let config = RenderConfig::default();
        let record = scenario(json!({}));
        let diagram = render(&record, &config, 640.0).unwrap();
        assert_eq!(diagram.initial_view, ViewTransform::initial(640.0, &config));
    }

    #[test]
    fn test_link_path() {
        assert_eq!(link_path((100.0, 90.0), (50.0, 150.0)), "M100,90C100,120 50,120 50,150");
    }

    #[test]
    fn test_link_points_end_on_anchors() {
        let points = link_points((0.0, 0.0), (10.0, 20.0), 8);
        assert_eq!(points.len(), 9);
        assert_eq!(points[0], (0.0, 0.0));
        let last = points[8];
        assert!((last.0 - 10.0).abs() < 1e-9 && (last.1 - 20.0).abs() < 1e-9);
    }
}
