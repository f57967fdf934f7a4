// SVG surface: writes a `Diagram` as a standalone SVG document.
//
// All shapes sit inside one `<g class="viewport">` carrying the pan/zoom
// transform, so a browser can pan and zoom by rewriting a single attribute.

use crate::category::Rgb;
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::render::{link_path, Anchor, Diagram, Shape};
use crate::view::{fmt_num, ViewTransform};
use std::fmt::Write;

pub fn to_svg(
    diagram: &Diagram,
    view: &ViewTransform,
    width: f64,
    height: f64,
    config: &RenderConfig,
) -> Result<String, RenderError> {
    let mut out = String::with_capacity(256 + diagram.shapes.len() * 160);

    write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{font}">"#,
        w = fmt_num(width),
        h = fmt_num(height),
        font = escape_xml(&config.font_family),
    )?;
    write!(out, "<title>{}</title>", escape_xml(&diagram.scenario_name))?;
    write!(out, r#"<g class="viewport" transform="{}">"#, view.to_svg())?;

    for shape in &diagram.shapes {
        write_shape(&mut out, shape)?;
    }

    out.push_str("</g></svg>");
    Ok(out)
}

fn write_shape(out: &mut String, shape: &Shape) -> std::fmt::Result {
    match shape {
        Shape::Link { from, to } => write!(
            out,
            r#"<path class="link" d="{}" fill="none" stroke="{}" stroke-width="1.5"/>"#,
            link_path(*from, *to),
            Rgb::LINK.hex()
        ),
        Shape::Rect {
            x,
            y,
            width,
            height,
            radius,
            fill,
            stroke,
        } => {
            write!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}" fill="{}""#,
                fmt_num(*x),
                fmt_num(*y),
                fmt_num(*width),
                fmt_num(*height),
                fmt_num(*radius),
                fill.hex()
            )?;
            if let Some(stroke) = stroke {
                write!(out, r#" stroke="{}" stroke-width="2""#, stroke.hex())?;
            }
            out.push_str("/>");
            Ok(())
        }
        Shape::Text {
            x,
            y,
            text,
            fill,
            anchor,
            size,
            bold,
        } => {
            let anchor = match anchor {
                Anchor::Start => "start",
                Anchor::Middle => "middle",
            };
            write!(
                out,
                r#"<text x="{}" y="{}" fill="{}" font-size="{}" text-anchor="{}""#,
                fmt_num(*x),
                fmt_num(*y),
                fill.hex(),
                fmt_num(*size),
                anchor
            )?;
            if *bold {
                out.push_str(r#" font-weight="bold""#);
            }
            write!(out, ">{}</text>", escape_xml(text))
        }
    }
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render;
    use crate::scenario::ScenarioRecord;
    use serde_json::json;

    fn acme_svg() -> String {
        let config = RenderConfig::default();
        let record = ScenarioRecord::new(
            "Acme & Co",
            json!({ "tradingName": "Acme <Intl>", "addresses": [{ "city": "Berlin", "country": "DE" }] }),
        );
        let diagram = render(&record, &config, 1000.0).unwrap();
        to_svg(&diagram, &diagram.initial_view, 1000.0, 600.0, &config).unwrap()
    }

    #[test]
    fn test_document_structure() {
        let svg = acme_svg();
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.ends_with("</g></svg>"));
        assert!(svg.contains(r#"<g class="viewport" transform="translate(420,40) scale(0.8)">"#));
        assert_eq!(svg.matches("<rect ").count(), 4);
        assert_eq!(svg.matches("class=\"link\"").count(), 1);
    }

    #[test]
    fn test_text_is_escaped() {
        let svg = acme_svg();
        assert!(svg.contains("<title>Acme &amp; Co</title>"));
        assert!(svg.contains(">Acme &lt;Intl&gt;</text>"));
        assert!(svg.contains(">Berlin, DE</text>"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"a<b>&"c'"#), "a&lt;b&gt;&amp;&quot;c&#39;");
        assert_eq!(escape_xml("plain"), "plain");
    }
}
