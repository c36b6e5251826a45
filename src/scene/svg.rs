//! SVG output for a [`Scene`]

use std::fmt::{self, Write};

use super::{Element, Scene, TRACK_Y, TrainSide, VIEW_HEIGHT, VIEW_WIDTH, palette, pulse_color};
use crate::sim::PulseId;

/// Render a scene as a standalone SVG document
pub fn to_svg(scene: &Scene) -> String {
    let mut out = String::with_capacity(4096);
    if let Err(e) = write_scene(&mut out, scene) {
        log::error!("SVG serialization failed: {}", e);
    }
    out
}

/// Stream a scene into any `fmt::Write` sink
pub fn write_scene(out: &mut impl Write, scene: &Scene) -> fmt::Result {
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" preserveAspectRatio="xMidYMid meet">"#,
        VIEW_WIDTH, VIEW_HEIGHT
    )?;
    for element in &scene.elements {
        write_element(out, element)?;
    }
    writeln!(out, "</svg>")
}

fn emission_label(pulse: PulseId, position_m: f64) -> String {
    match pulse {
        PulseId::First => format!("Emission 1 ({:.0}m)", position_m),
        PulseId::Second => format!("Emission 2 ({:.1}m)", position_m),
    }
}

fn write_train(out: &mut impl Write, side: TrainSide, x: f32, speed: f64) -> fmt::Result {
    let color = side.color();
    // Nose points toward the other train
    let nose = match side {
        TrainSide::A => "M40 -30 L60 -10 L60 0 L40 0 Z",
        TrainSide::B => "M-40 -30 L-60 -10 L-60 0 L-40 0 Z",
    };
    writeln!(out, r#"<g transform="translate({x}, {TRACK_Y})">"#)?;
    writeln!(
        out,
        r#"<rect x="-40" y="-30" width="80" height="30" fill="{color}" rx="4"/>"#
    )?;
    writeln!(out, r#"<path d="{nose}" fill="{color}"/>"#)?;
    writeln!(
        out,
        r#"<text y="-45" text-anchor="middle" font-size="14" font-weight="bold" fill="{color}">{}</text>"#,
        side.label()
    )?;
    writeln!(
        out,
        r#"<text y="-35" text-anchor="middle" font-size="10" font-family="monospace" fill="{color}">v={speed}m/s</text>"#
    )?;
    writeln!(out, "</g>")
}

fn write_element(out: &mut impl Write, element: &Element) -> fmt::Result {
    match element {
        Element::Track => {
            writeln!(
                out,
                r#"<line x1="0" y1="{TRACK_Y}" x2="{VIEW_WIDTH}" y2="{TRACK_Y}" stroke="{}" stroke-width="4"/>"#,
                palette::TRACK
            )?;
            writeln!(
                out,
                r#"<line x1="0" y1="{}" x2="{VIEW_WIDTH}" y2="{}" stroke="{}" stroke-width="2" stroke-dasharray="10,10"/>"#,
                TRACK_Y + 5.0,
                TRACK_Y + 5.0,
                palette::TRACK_DASH
            )
        }
        Element::EmissionMarker {
            pulse,
            at,
            position_m,
        } => {
            let color = pulse_color(*pulse);
            writeln!(out, r#"<g transform="translate({}, {})">"#, at.x, at.y)?;
            writeln!(out, r#"<circle r="4" fill="{color}"/>"#)?;
            writeln!(
                out,
                r#"<line y1="-15" y2="15" stroke="{color}" stroke-width="2"/>"#
            )?;
            writeln!(
                out,
                r#"<text y="30" text-anchor="middle" font-size="10" font-weight="bold" fill="{color}">{}</text>"#,
                emission_label(*pulse, *position_m)
            )?;
            writeln!(out, "</g>")
        }
        Element::Train { side, at, speed } => write_train(out, *side, at.x, *speed),
        Element::WhistleRing { pulse, at } => writeln!(
            out,
            r#"<circle cx="{}" cy="{}" r="15" fill="none" stroke="{}" stroke-width="2" class="impact-ring"/>"#,
            at.x,
            at.y,
            pulse_color(*pulse)
        ),
        Element::ImpactRing { pulse, at, radius } => writeln!(
            out,
            r#"<circle cx="{}" cy="{}" r="{radius}" fill="none" stroke="{}" stroke-width="4" class="impact-ring"/>"#,
            at.x,
            at.y,
            pulse_color(*pulse)
        ),
        Element::CollisionMarker { at, time } => {
            let color = palette::COLLISION;
            writeln!(out, r#"<g transform="translate({}, {})">"#, at.x, at.y)?;
            writeln!(
                out,
                r#"<path d="M-20,-20 L20,20 M-20,20 L20,-20 M-28,0 L28,0 M0,-28 L0,28" stroke="{color}" stroke-width="4" stroke-linecap="round"/>"#
            )?;
            writeln!(
                out,
                r#"<text y="-40" text-anchor="middle" font-size="14" font-weight="bold" fill="{color}">Collision!</text>"#
            )?;
            writeln!(
                out,
                r#"<text y="40" text-anchor="middle" font-size="10" font-family="monospace" fill="{color}">@{time:.3}s</text>"#
            )?;
            writeln!(out, "</g>")
        }
        Element::PulseFront { pulse, at } => {
            let color = pulse_color(*pulse);
            writeln!(out, r#"<g transform="translate({}, {})">"#, at.x, at.y)?;
            writeln!(out, r#"<circle r="5" fill="{color}"/>"#)?;
            writeln!(
                out,
                r#"<circle r="12" fill="none" stroke="{color}" stroke-width="1" opacity="0.5"/>"#
            )?;
            writeln!(
                out,
                r#"<text y="-10" text-anchor="middle" font-size="10" font-weight="bold" fill="{color}">{}</text>"#,
                pulse.tag()
            )?;
            writeln!(out, "</g>")
        }
        Element::ImpactMarker {
            pulse,
            at,
            y_offset,
            time,
        } => {
            let color = pulse_color(*pulse);
            writeln!(out, r#"<g transform="translate({}, {})">"#, at.x, at.y)?;
            writeln!(
                out,
                r#"<line y1="{}" y2="0" stroke="{color}" stroke-width="1" stroke-dasharray="4,2"/>"#,
                y_offset + 10.0
            )?;
            writeln!(
                out,
                r#"<rect x="-35" y="{}" width="70" height="20" rx="4" fill="{}" stroke="{color}" stroke-width="1"/>"#,
                y_offset - 10.0,
                palette::PANEL
            )?;
            writeln!(
                out,
                r#"<text y="{}" text-anchor="middle" font-size="10" font-family="monospace" fill="{color}">{time:.4}s</text>"#,
                y_offset + 4.0
            )?;
            writeln!(
                out,
                r#"<text y="{}" text-anchor="middle" font-size="9" font-weight="bold" fill="{color}">{} received</text>"#,
                y_offset - 15.0,
                pulse.label()
            )?;
            writeln!(out, "</g>")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::build;
    use crate::sim::{Configuration, solve};

    fn svg_at(t: f64) -> String {
        let config = Configuration::default();
        to_svg(&build(&config, &solve(&config), t))
    }

    #[test]
    fn test_document_wrapper() {
        let svg = svg_at(0.0);
        assert!(svg.starts_with("<svg "));
        assert!(svg.contains(r#"viewBox="0 0 1000 400""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_trains_and_pulse_labels() {
        let svg = svg_at(1.5);
        assert!(svg.contains("Train A"));
        assert!(svg.contains("v=40m/s"));
        assert!(svg.contains("v=60m/s"));
        assert!(svg.contains(">S1<"));
        assert!(svg.contains(">S2<"));
        assert!(svg.contains("Emission 1 (0m)"));
        assert!(svg.contains("Emission 2 (40.0m)"));
        assert!(!svg.contains("Collision!"));
    }

    #[test]
    fn test_receptions_and_collision() {
        let svg = svg_at(8.5);
        assert!(svg.contains("2.0000s"));
        assert!(svg.contains("2.7500s"));
        assert!(svg.contains("Pulse 1 received"));
        assert!(svg.contains("Collision!"));
        assert!(svg.contains("@8.000s"));
        assert!(!svg.contains("Train A"));
    }
}
