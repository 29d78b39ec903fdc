// src/converter.rs

//! Turns the typed EasyEDA records into KiCad models.

use crate::{
    arc::{arc_midpoint, compute_arc},
    diagnostics::Diagnostics,
    easyeda_models::*,
    kicad_models::*,
    mesh::Mesh,
    pose::{compose_pose, footprint_contribution, MeshBounds, PlacementInfo, Pose},
    record::parse_number,
    svg_path::{parse_svg_path, SvgArc, SvgPathElement},
    units::{angle_to_ki, convert_to_mm, fp_to_ki, round_to, to_ki, BoundingBoxOrigin, KicadVersion},
};

/// Converts an EasyEDA symbol to a KiCad symbol for the chosen dialect.
///
/// Shapes that cannot be expressed are skipped with a warning.
pub fn convert_symbol(
    ee_symbol: &EeSymbol,
    version: KicadVersion,
    library_name: &str,
    diagnostics: &mut Diagnostics,
) -> KiSymbol {
    let converter = SymbolConverter {
        bbox: ee_symbol.bbox,
        version,
    };

    let info = &ee_symbol.info;
    let mut ki_symbol = KiSymbol {
        info: KiSymbolInfo {
            name: info.name.clone(),
            prefix: info.prefix.replace('?', ""),
            package: info
                .package
                .as_ref()
                .map(|package| format!("{}:{}", library_name, package)),
            manufacturer: info.manufacturer.clone(),
            datasheet: info.datasheet.clone(),
            lcsc_id: info.lcsc_id.clone(),
            jlc_id: info.jlc_id.clone(),
        },
        ..Default::default()
    };

    ki_symbol.pins = ee_symbol.pins.iter().map(|pin| converter.pin(pin)).collect();
    ki_symbol.rectangles = ee_symbol
        .rectangles
        .iter()
        .map(|rect| converter.rectangle(rect))
        .collect();
    ki_symbol.circles = ee_symbol
        .circles
        .iter()
        .map(|circle| converter.circle(circle.center_x, circle.center_y, circle.radius, &circle.style))
        .collect();

    for ellipse in &ee_symbol.ellipses {
        if ellipse.radius_x == ellipse.radius_y {
            ki_symbol.circles.push(converter.circle(
                ellipse.center_x,
                ellipse.center_y,
                ellipse.radius_x,
                &ellipse.style,
            ));
        } else {
            diagnostics.warn("E", "Ellipses with different radii are not supported");
        }
    }

    for arc in &ee_symbol.arcs {
        match converter.arc(&arc.path) {
            Some(ki_arc) => ki_symbol.arcs.push(ki_arc),
            None => diagnostics.warn("A", "Can't convert this arc"),
        }
    }

    for path in &ee_symbol.paths {
        if let Some(polygon) = converter.path(path, diagnostics) {
            ki_symbol.polygons.push(polygon);
        }
    }
    for (kind, shapes, always_closed) in [
        ("PL", &ee_symbol.polylines, false),
        ("PG", &ee_symbol.polygons, true),
    ] {
        for shape in shapes {
            let closed = always_closed || shape.style.is_filled();
            match converter.polyline(&shape.points, closed) {
                Some(polygon) => ki_symbol.polygons.push(polygon),
                None => diagnostics.warn(kind, "Shape has no points and was skipped"),
            }
        }
    }

    ki_symbol
}

struct SymbolConverter {
    bbox: BoundingBoxOrigin,
    version: KicadVersion,
}

impl SymbolConverter {
    fn to_ki(&self, value: f64) -> f64 {
        to_ki(value, self.version)
    }

    /// Position relative to the origin, Y flipped upward. Both sides are
    /// truncated to whole pixels first.
    fn point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.to_ki(x.trunc() - self.bbox.x.trunc()),
            -self.to_ki(y.trunc() - self.bbox.y.trunc()),
        )
    }

    fn pin(&self, pin: &EeSymbolPin) -> KiSymbolPin {
        let (pos_x, pos_y) = self.point(pin.pos_x, pin.pos_y);
        let length = pin
            .path
            .rsplit('h')
            .next()
            .and_then(parse_number)
            .map(|length| length.trunc().abs())
            .unwrap_or(0.0);

        let dot = pin.dot.is_displayed == Some(true);
        let clock = pin.clock.is_displayed == Some(true);
        let style = match (dot, clock) {
            (true, true) => KiPinStyle::InvertedClock,
            (true, false) => KiPinStyle::Inverted,
            (false, true) => KiPinStyle::Clock,
            (false, false) => KiPinStyle::Line,
        };

        KiSymbolPin {
            name: pin.name.text.replace(' ', ""),
            number: pin.spice_pin_number.replace(' ', ""),
            style,
            pin_type: match pin.pin_type {
                EasyedaPinType::Unspecified => KiPinType::Unspecified,
                EasyedaPinType::Input => KiPinType::Input,
                EasyedaPinType::Output => KiPinType::Output,
                EasyedaPinType::Bidirectional => KiPinType::Bidirectional,
                EasyedaPinType::Power => KiPinType::PowerIn,
            },
            length: self.to_ki(length),
            orientation: pin.rotation,
            pos_x,
            pos_y,
        }
    }

    fn rectangle(&self, rect: &EeSymbolRectangle) -> KiSymbolRectangle {
        let (pos_x0, pos_y0) = self.point(rect.pos_x, rect.pos_y);
        KiSymbolRectangle {
            pos_x0,
            pos_y0,
            pos_x1: self.to_ki(rect.width.trunc()) + pos_x0,
            pos_y1: -self.to_ki(rect.height.trunc()) + pos_y0,
        }
    }

    fn circle(&self, center_x: f64, center_y: f64, radius: f64, style: &EeStyle) -> KiSymbolCircle {
        let (pos_x, pos_y) = self.point(center_x, center_y);
        KiSymbolCircle {
            pos_x,
            pos_y,
            radius: self.to_ki(radius),
            background_filling: style.is_filled(),
        }
    }

    /// Only a single move followed by a single elliptical arc is supported.
    fn arc(&self, path: &[SvgPathElement]) -> Option<KiSymbolArc> {
        let (move_x, move_y, svg_arc) = match path {
            [SvgPathElement::MoveTo { x, y }, SvgPathElement::EllipticalArc(arc)] => (*x, *y, arc),
            _ => return None,
        };

        let start = (
            self.to_ki(move_x - self.bbox.x),
            self.to_ki(move_y - self.bbox.y),
        );
        let end = (
            self.to_ki(svg_arc.end_x - self.bbox.x),
            self.to_ki(svg_arc.end_y - self.bbox.y),
        );
        let geometry = compute_arc(
            start.0,
            start.1,
            &SvgArc {
                radius_x: self.to_ki(svg_arc.radius_x),
                radius_y: self.to_ki(svg_arc.radius_y),
                end_x: end.0,
                end_y: end.1,
                ..*svg_arc
            },
        );

        let center = (geometry.center_x, -geometry.center_y);
        let start = (start.0, -start.1);
        let end = (end.0, -end.1);
        let middle = arc_midpoint(center, start, geometry.angle_extent);
        let angle_start = (start.1 - center.1).atan2(start.0 - center.0).to_degrees();

        Some(KiSymbolArc {
            center_x: center.0,
            center_y: center.1,
            radius: self.to_ki(svg_arc.radius_x.max(svg_arc.radius_y)),
            angle_start,
            angle_end: angle_start + geometry.angle_extent,
            start_x: start.0,
            start_y: start.1,
            middle_x: middle.0,
            middle_y: middle.1,
            end_x: end.0,
            end_y: end.1,
        })
    }

    fn polyline(&self, points: &[(f64, f64)], close: bool) -> Option<KiSymbolPolygon> {
        let mut ki_points: Vec<(f64, f64)> = points.iter().map(|&(x, y)| self.point(x, y)).collect();
        let first = *ki_points.first()?;
        if close {
            ki_points.push(first);
        }
        Some(polygon_from_points(ki_points))
    }

    fn path(&self, path: &EeSymbolPath, diagnostics: &mut Diagnostics) -> Option<KiSymbolPolygon> {
        let mut points = Vec::new();
        for element in parse_svg_path(&path.paths, diagnostics) {
            match element {
                SvgPathElement::MoveTo { x, y } | SvgPathElement::LineTo { x, y } => {
                    points.push(self.point(x, y));
                }
                SvgPathElement::ClosePath => {
                    if let Some(&first) = points.first() {
                        points.push(first);
                    }
                }
                SvgPathElement::EllipticalArc(_) => {
                    diagnostics.warn("PT", "Arc segments inside paths are not supported");
                }
            }
        }
        if points.is_empty() {
            diagnostics.warn("PT", "Path has no points and was skipped");
            return None;
        }
        Some(polygon_from_points(points))
    }
}

fn polygon_from_points(points: Vec<(f64, f64)>) -> KiSymbolPolygon {
    let is_closed = points.len() > 1 && points.first() == points.last();
    KiSymbolPolygon { points, is_closed }
}

/// Converts an EasyEDA footprint to a KiCad footprint. Values are in mm
/// relative to the footprint origin.
pub fn convert_footprint(ee_footprint: &EeFootprint, diagnostics: &mut Diagnostics) -> KiFootprint {
    let bbox = BoundingBoxOrigin::new(
        convert_to_mm(ee_footprint.bbox.x),
        convert_to_mm(ee_footprint.bbox.y),
    );

    let mut ki_footprint = KiFootprint {
        info: KiFootprintInfo {
            name: ee_footprint.info.name.clone(),
            fp_type: match ee_footprint.info.fp_type {
                FootprintType::Smd => KiFootprintType::Smd,
                FootprintType::ThroughHole => KiFootprintType::ThroughHole,
            },
        },
        ..Default::default()
    };

    for ee_pad in &ee_footprint.pads {
        ki_footprint.pads.push(convert_pad(ee_pad, &bbox, diagnostics));
    }

    for track in &ee_footprint.tracks {
        let layer = graphic_layer_or_fab(track.layer_id);
        let stroke_width = convert_to_mm(track.stroke_width).max(0.01);
        let points: Vec<f64> = track.points.iter().map(|&p| fp_to_ki(p)).collect();
        for segment in points.windows(4).step_by(2) {
            ki_footprint.lines.push(KiFootprintLine {
                start: (round_to(segment[0] - bbox.x, 2), round_to(segment[1] - bbox.y, 2)),
                end: (round_to(segment[2] - bbox.x, 2), round_to(segment[3] - bbox.y, 2)),
                layer: layer.clone(),
                stroke_width,
            });
        }
    }

    for rect in &ee_footprint.rectangles {
        let layer = graphic_layer_or_fab(rect.layer_id);
        let stroke_width = convert_to_mm(rect.stroke_width.unwrap_or(0.0)).max(0.01);
        let x0 = convert_to_mm(rect.x) - bbox.x;
        let y0 = convert_to_mm(rect.y) - bbox.y;
        let x1 = x0 + convert_to_mm(rect.width);
        let y1 = y0 + convert_to_mm(rect.height);
        for (start, end) in [
            ((x0, y0), (x1, y0)),
            ((x1, y0), (x1, y1)),
            ((x1, y1), (x0, y1)),
            ((x0, y1), (x0, y0)),
        ] {
            ki_footprint.lines.push(KiFootprintLine {
                start,
                end,
                layer: layer.clone(),
                stroke_width,
            });
        }
    }

    for hole in &ee_footprint.holes {
        ki_footprint.holes.push(KiFootprintHole {
            pos_x: convert_to_mm(hole.center_x) - bbox.x,
            pos_y: convert_to_mm(hole.center_y) - bbox.y,
            size: convert_to_mm(hole.radius) * 2.0,
        });
    }

    for via in &ee_footprint.vias {
        ki_footprint.vias.push(KiFootprintVia {
            pos_x: convert_to_mm(via.center_x) - bbox.x,
            pos_y: convert_to_mm(via.center_y) - bbox.y,
            size: convert_to_mm(via.radius) * 2.0,
            diameter: convert_to_mm(via.diameter),
        });
    }

    for circle in &ee_footprint.circles {
        let cx = convert_to_mm(circle.cx) - bbox.x;
        let cy = convert_to_mm(circle.cy) - bbox.y;
        ki_footprint.circles.push(KiFootprintCircle {
            cx,
            cy,
            end_x: cx + convert_to_mm(circle.radius),
            end_y: cy,
            layer: graphic_layer_or_fab(circle.layer_id),
            stroke_width: convert_to_mm(circle.stroke_width.unwrap_or(0.0)).max(0.01),
        });
    }

    for arc in &ee_footprint.arcs {
        match convert_footprint_arc(arc, &bbox) {
            Some(ki_arc) => ki_footprint.arcs.push(ki_arc),
            None => diagnostics.warn("ARC", "Can't convert this arc"),
        }
    }

    for text in &ee_footprint.texts {
        let mut layer = graphic_layer_or_fab(text.layer_id);
        if text.text_type == "N" {
            layer = layer.replace(".SilkS", ".Fab");
        }
        ki_footprint.texts.push(KiFootprintText {
            pos_x: convert_to_mm(text.center_x) - bbox.x,
            pos_y: convert_to_mm(text.center_y) - bbox.y,
            orientation: angle_to_ki(text.rotation.unwrap_or(0.0)),
            text: text.text.clone(),
            font_size: convert_to_mm(text.font_size.unwrap_or(0.0)).max(1.0),
            thickness: convert_to_mm(text.stroke_width.unwrap_or(0.0)).max(0.01),
            hidden: text.is_displayed == Some(false),
            mirror: layer.starts_with('B'),
            layer,
        });
    }

    ki_footprint
}

fn graphic_layer_or_fab(layer_id: Option<i32>) -> String {
    layer_id
        .and_then(graphic_layer)
        .unwrap_or("F.Fab")
        .to_string()
}

/// `"(x)"` style pad numbers keep only the part in parentheses.
fn pad_number(number: &str) -> String {
    match (number.find('('), number.rfind(')')) {
        (Some(open), Some(close)) if open < close => number[open + 1..close].to_string(),
        _ => number.to_string(),
    }
}

fn convert_pad(ee_pad: &EeFootprintPad, bbox: &BoundingBoxOrigin, diagnostics: &mut Diagnostics) -> KiFootprintPad {
    let is_tht = ee_pad.hole_radius > 0.0;
    let layers = ee_pad
        .layer_id
        .and_then(|id| if is_tht { pad_layers_tht(id) } else { pad_layers_smd(id) })
        .unwrap_or("");

    let pos_x = convert_to_mm(ee_pad.center_x) - bbox.x;
    let pos_y = convert_to_mm(ee_pad.center_y) - bbox.y;
    let width = convert_to_mm(ee_pad.width).max(0.01);
    let height = convert_to_mm(ee_pad.height).max(0.01);

    let mut ki_pad = KiFootprintPad {
        pad_type: if is_tht { KiPadType::ThruHole } else { KiPadType::Smd },
        shape: pad_shape(&ee_pad.shape),
        pos_x,
        pos_y,
        width,
        height,
        layers: layers.to_string(),
        number: pad_number(&ee_pad.number),
        drill: KiDrill::from_hole(
            convert_to_mm(ee_pad.hole_radius),
            ee_pad.hole_length.map(convert_to_mm),
            height,
            width,
        ),
        orientation: angle_to_ki(ee_pad.rotation),
        polygon: None,
    };

    if ki_pad.shape == "custom" {
        if ee_pad.points.is_empty() {
            diagnostics.warn("PAD", format!("Custom pad {} has no outline points", ki_pad.number));
        } else {
            ki_pad.width = CUSTOM_PAD_ANCHOR_SIZE;
            ki_pad.height = CUSTOM_PAD_ANCHOR_SIZE;
            ki_pad.orientation = 0.0;
            ki_pad.polygon = Some(
                ee_pad
                    .points
                    .chunks_exact(2)
                    .map(|xy| {
                        (
                            round_to(fp_to_ki(xy[0]) - bbox.x - pos_x, 2),
                            round_to(fp_to_ki(xy[1]) - bbox.y - pos_y, 2),
                        )
                    })
                    .collect(),
            );
        }
    }

    ki_pad
}

fn convert_footprint_arc(arc: &EeFootprintArc, bbox: &BoundingBoxOrigin) -> Option<KiFootprintArc> {
    let (move_x, move_y, svg_arc) = match arc.path.as_slice() {
        [SvgPathElement::MoveTo { x, y }, SvgPathElement::EllipticalArc(svg_arc)] => (*x, *y, svg_arc),
        _ => return None,
    };

    let start_x = fp_to_ki(move_x) - bbox.x;
    let start_y = fp_to_ki(move_y) - bbox.y;
    let end_x = fp_to_ki(svg_arc.end_x) - bbox.x;
    let end_y = fp_to_ki(svg_arc.end_y) - bbox.y;
    let radius_y = fp_to_ki(svg_arc.radius_y);

    let (center_x, center_y, angle) = if radius_y != 0.0 {
        let geometry = compute_arc(
            start_x,
            start_y,
            &SvgArc {
                radius_x: fp_to_ki(svg_arc.radius_x),
                radius_y,
                end_x,
                end_y,
                ..*svg_arc
            },
        );
        (geometry.center_x, geometry.center_y, geometry.angle_extent)
    } else {
        (0.0, 0.0, 0.0)
    };

    Some(KiFootprintArc {
        start_x: center_x,
        start_y: center_y,
        end_x,
        end_y,
        angle,
        layer: graphic_layer_or_fab(arc.layer_id),
        stroke_width: fp_to_ki(arc.stroke_width.unwrap_or(0.0)).max(0.01),
    })
}

/// Accumulates the model pose onto `base`: the footprint outline first, then
/// the 3D placement metadata. Without placement metadata there is no pose.
pub fn compute_model_pose(
    base: &Pose,
    ki_footprint: &KiFootprint,
    ee_model: Option<&Ee3dModel>,
    mesh_bounds: Option<MeshBounds>,
) -> Option<Pose> {
    let placement = ee_model.map(PlacementInfo::from);
    let model_contribution = compose_pose(&mesh_bounds.unwrap_or_default(), placement.as_ref())?;
    let (center_x, center_y) = ki_footprint
        .extents()
        .map(|extents| extents.center())
        .unwrap_or((0.0, 0.0));
    Some(
        base.accumulate(&footprint_contribution(center_x, center_y))
            .accumulate(&model_contribution),
    )
}

/// Builds the KiCad model from the footprint's 3D node, the parsed mesh and
/// the STEP blob. The mesh is written out as VRML here.
pub fn convert_3d_model(
    ee_model: &Ee3dModel,
    mesh: Option<&Mesh>,
    step_data: Option<bytes::Bytes>,
    pose: &Pose,
    diagnostics: &mut Diagnostics,
) -> Ki3dModel {
    let wrl_data = mesh.map(|mesh| mesh.to_vrml(diagnostics));
    Ki3dModel {
        name: ee_model.name.clone(),
        wrl_data,
        step_data,
        offset: pose.translation,
        scale: pose.scale,
        rotate: Ki3dModel::kicad_rotation(pose.rotation),
    }
}
