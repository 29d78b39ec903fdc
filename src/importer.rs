// src/importer.rs

//! Decodes EasyEDA CAD JSON into the typed records of [`crate::easyeda_models`].
//!
//! Each designator has its own decoder. A record that cannot be decoded is
//! reported to the [`Diagnostics`] collector and skipped; only a missing
//! `dataStr` section fails the whole import.

use crate::diagnostics::Diagnostics;
use crate::easyeda_models::*;
use crate::error::{Error, Result};
use crate::record::{parse_number, RecordFields, SEGMENT_DELIMITER};
use crate::svg_path::parse_svg_path;
use crate::units::BoundingBoxOrigin;
use serde::Deserialize;
use serde_json::Value;

/// Decodes one shape line of either domain.
///
/// Returns `Ok(None)` for a designator this crate does not know about, so the
/// caller can decide how loudly to complain.
pub fn decode_record(line: &str, diagnostics: &mut Diagnostics) -> Result<Option<ShapeRecord>> {
    let fields = RecordFields::parse(line);
    let record = match fields.designator() {
        "P" => ShapeRecord::Pin(decode_pin(line)?),
        "R" => ShapeRecord::Rectangle(decode_rectangle(&fields)?),
        "C" => ShapeRecord::Circle(decode_circle(&fields)?),
        "E" => ShapeRecord::Ellipse(decode_ellipse(&fields)?),
        "A" => ShapeRecord::Arc(decode_arc(&fields, diagnostics)?),
        "PL" => ShapeRecord::Polyline(decode_polyline(&fields)),
        "PG" => ShapeRecord::Polygon(decode_polyline(&fields)),
        "PT" => ShapeRecord::Path(decode_path(&fields)?),
        "PAD" => ShapeRecord::Pad(decode_pad(&fields)?),
        "TRACK" => ShapeRecord::Track(decode_track(&fields)?),
        "HOLE" => ShapeRecord::Hole(decode_hole(&fields)?),
        "VIA" => ShapeRecord::Via(decode_via(&fields)?),
        "CIRCLE" => ShapeRecord::FootprintCircle(decode_footprint_circle(&fields)?),
        "RECT" => ShapeRecord::FootprintRectangle(decode_footprint_rectangle(&fields)?),
        "ARC" => ShapeRecord::FootprintArc(decode_footprint_arc(&fields, diagnostics)?),
        "TEXT" => ShapeRecord::Text(decode_text(&fields)?),
        _ => return Ok(None),
    };
    Ok(Some(record))
}

// --- Symbol decoders ---

fn decode_style(fields: &RecordFields, start: usize) -> EeStyle {
    EeStyle {
        stroke_color: fields.string(start),
        stroke_width: fields.string(start + 1),
        stroke_style: fields.string(start + 2),
        fill_color: fields.string(start + 3),
        id: fields.string(start + 4),
        is_locked: fields.flag(start + 5),
    }
}

/// Font sizes come as `7pt` or plain numbers.
fn parse_font_size(text: &str) -> Option<f64> {
    parse_number(text.trim().trim_end_matches("pt"))
}

fn decode_pin(line: &str) -> Result<EeSymbolPin> {
    let segments: Vec<&str> = line.split(SEGMENT_DELIMITER).collect();
    let segment = |i: usize| RecordFields::segment(segments.get(i).copied().unwrap_or(""));

    let settings = RecordFields::parse(segments[0]);
    let dot = segment(1);
    let path = segment(2);
    let name = segment(3);
    let bubble = segment(5);
    let clock = segment(6);

    Ok(EeSymbolPin {
        is_displayed: settings.flag(0),
        pin_type: settings
            .f64(1)
            .map(|code| EasyedaPinType::from_code(code as i64))
            .unwrap_or_default(),
        spice_pin_number: settings.string(2).unwrap_or_default(),
        pos_x: settings.require_f64(3, "pos_x")?,
        pos_y: settings.require_f64(4, "pos_y")?,
        rotation: settings.f64(5).unwrap_or(0.0),
        id: settings.string(6),
        is_locked: settings.flag(7),
        dot_x: dot.f64(0),
        dot_y: dot.f64(1),
        path: path.str(0).unwrap_or_default().replace('v', "h"),
        path_color: path.string(1),
        name: EeSymbolPinName {
            is_displayed: name.flag(0),
            pos_x: name.f64(1),
            pos_y: name.f64(2),
            rotation: name.f64(3),
            text: name.string(4).unwrap_or_default(),
            text_anchor: name.string(5),
            font: name.string(6),
            font_size: name.str(7).and_then(parse_font_size),
        },
        dot: EeSymbolPinDot {
            is_displayed: bubble.flag(0),
            circle_x: bubble.f64(1),
            circle_y: bubble.f64(2),
        },
        clock: EeSymbolPinClock {
            is_displayed: clock.flag(0),
            path: clock.string(1),
        },
    })
}

fn decode_rectangle(fields: &RecordFields) -> Result<EeSymbolRectangle> {
    Ok(EeSymbolRectangle {
        pos_x: fields.require_f64(0, "pos_x")?,
        pos_y: fields.require_f64(1, "pos_y")?,
        rx: fields.f64(2),
        ry: fields.f64(3),
        width: fields.require_f64(4, "width")?,
        height: fields.require_f64(5, "height")?,
        style: decode_style(fields, 6),
    })
}

fn decode_circle(fields: &RecordFields) -> Result<EeSymbolCircle> {
    Ok(EeSymbolCircle {
        center_x: fields.require_f64(0, "center_x")?,
        center_y: fields.require_f64(1, "center_y")?,
        radius: fields.require_f64(2, "radius")?,
        style: decode_style(fields, 3),
    })
}

fn decode_ellipse(fields: &RecordFields) -> Result<EeSymbolEllipse> {
    Ok(EeSymbolEllipse {
        center_x: fields.require_f64(0, "center_x")?,
        center_y: fields.require_f64(1, "center_y")?,
        radius_x: fields.require_f64(2, "radius_x")?,
        radius_y: fields.require_f64(3, "radius_y")?,
        style: decode_style(fields, 4),
    })
}

fn decode_arc(fields: &RecordFields, diagnostics: &mut Diagnostics) -> Result<EeSymbolArc> {
    let path = fields.require_str(0, "path")?;
    Ok(EeSymbolArc {
        path: parse_svg_path(path, diagnostics),
        helper_dots: fields.string(1),
        style: decode_style(fields, 2),
    })
}

/// `x y x y ...`, commas allowed. A dangling coordinate is ignored.
fn parse_point_pairs(text: &str) -> Vec<(f64, f64)> {
    parse_flat_points(text)
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect()
}

fn parse_flat_points(text: &str) -> Vec<f64> {
    text.replace(',', " ")
        .split_whitespace()
        .filter_map(parse_number)
        .collect()
}

fn decode_polyline(fields: &RecordFields) -> EeSymbolPolyline {
    EeSymbolPolyline {
        points: fields.str(0).map(parse_point_pairs).unwrap_or_default(),
        style: decode_style(fields, 1),
    }
}

fn decode_path(fields: &RecordFields) -> Result<EeSymbolPath> {
    Ok(EeSymbolPath {
        paths: fields.require_str(0, "paths")?.to_string(),
        style: decode_style(fields, 1),
    })
}

// --- Footprint decoders ---

fn decode_pad(fields: &RecordFields) -> Result<EeFootprintPad> {
    Ok(EeFootprintPad {
        shape: fields.require_str(0, "shape")?.to_string(),
        center_x: fields.require_f64(1, "center_x")?,
        center_y: fields.require_f64(2, "center_y")?,
        width: fields.require_f64(3, "width")?,
        height: fields.require_f64(4, "height")?,
        layer_id: fields.i32(5),
        net: fields.string(6),
        number: fields.string(7).unwrap_or_default(),
        hole_radius: fields.f64(8).unwrap_or(0.0),
        points: fields.str(9).map(parse_flat_points).unwrap_or_default(),
        rotation: fields.f64(10).unwrap_or(0.0),
        id: fields.string(11),
        hole_length: fields.f64(12),
        hole_point: fields.string(13),
        is_plated: fields.flag(14),
        is_locked: fields.flag(15),
    })
}

fn decode_track(fields: &RecordFields) -> Result<EeFootprintTrack> {
    Ok(EeFootprintTrack {
        stroke_width: fields.require_f64(0, "stroke_width")?,
        layer_id: fields.i32(1),
        net: fields.string(2),
        points: fields.str(3).map(parse_flat_points).unwrap_or_default(),
        id: fields.string(4),
        is_locked: fields.flag(5),
    })
}

fn decode_hole(fields: &RecordFields) -> Result<EeFootprintHole> {
    Ok(EeFootprintHole {
        center_x: fields.require_f64(0, "center_x")?,
        center_y: fields.require_f64(1, "center_y")?,
        radius: fields.require_f64(2, "radius")?,
        id: fields.string(3),
        is_locked: fields.flag(4),
    })
}

fn decode_via(fields: &RecordFields) -> Result<EeFootprintVia> {
    Ok(EeFootprintVia {
        center_x: fields.require_f64(0, "center_x")?,
        center_y: fields.require_f64(1, "center_y")?,
        diameter: fields.require_f64(2, "diameter")?,
        net: fields.string(3),
        radius: fields.f64(4).unwrap_or(0.0),
        id: fields.string(5),
        is_locked: fields.flag(6),
    })
}

fn decode_footprint_circle(fields: &RecordFields) -> Result<EeFootprintCircle> {
    Ok(EeFootprintCircle {
        cx: fields.require_f64(0, "cx")?,
        cy: fields.require_f64(1, "cy")?,
        radius: fields.require_f64(2, "radius")?,
        stroke_width: fields.f64(3),
        layer_id: fields.i32(4),
        id: fields.string(5),
        is_locked: fields.flag(6),
    })
}

fn decode_footprint_rectangle(fields: &RecordFields) -> Result<EeFootprintRectangle> {
    Ok(EeFootprintRectangle {
        x: fields.require_f64(0, "x")?,
        y: fields.require_f64(1, "y")?,
        width: fields.require_f64(2, "width")?,
        height: fields.require_f64(3, "height")?,
        stroke_width: fields.f64(4),
        id: fields.string(5),
        layer_id: fields.i32(6),
        is_locked: fields.flag(7),
    })
}

fn decode_footprint_arc(
    fields: &RecordFields,
    diagnostics: &mut Diagnostics,
) -> Result<EeFootprintArc> {
    let path = fields.require_str(3, "path")?;
    Ok(EeFootprintArc {
        stroke_width: fields.f64(0),
        layer_id: fields.i32(1),
        net: fields.string(2),
        path: parse_svg_path(path, diagnostics),
        helper_dots: fields.string(4),
        id: fields.string(5),
        is_locked: fields.flag(6),
    })
}

fn decode_text(fields: &RecordFields) -> Result<EeFootprintText> {
    Ok(EeFootprintText {
        text_type: fields.string(0).unwrap_or_default(),
        center_x: fields.require_f64(1, "center_x")?,
        center_y: fields.require_f64(2, "center_y")?,
        stroke_width: fields.f64(3),
        rotation: fields.f64(4),
        mirror: fields.string(5),
        layer_id: fields.i32(6),
        net: fields.string(7),
        font_size: fields.f64(8),
        text: fields.string(9).unwrap_or_default(),
        text_path: fields.string(10),
        is_displayed: fields.flag(11),
        id: fields.string(12),
        is_locked: fields.flag(13),
    })
}

// --- Component-level import ---

/// JSON numbers and numeric strings both show up in `head`.
fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn component_label(data: &Value) -> String {
    data["lcsc"]["number"]
        .as_str()
        .unwrap_or("unknown component")
        .to_string()
}

fn shape_lines<'a>(data_str: &'a Value, data: &Value, section: &str) -> Result<Vec<&'a str>> {
    let shapes = data_str["shape"]
        .as_array()
        .ok_or_else(|| Error::MissingData {
            component: component_label(data),
            what: format!("{} shape list", section),
        })?;
    Ok(shapes.iter().filter_map(Value::as_str).collect())
}

fn designator_of(line: &str) -> &str {
    line.split('~').next().unwrap_or_default()
}

/// Parses the symbol part (`dataStr`) of a CAD data snapshot.
pub fn import_symbol(data: &Value, diagnostics: &mut Diagnostics) -> Result<EeSymbol> {
    let data_str = &data["dataStr"];
    let head = &data_str["head"];
    let c_para = &head["c_para"];

    let mut symbol = EeSymbol {
        info: EeSymbolInfo {
            name: value_as_string(&c_para["name"]).unwrap_or_else(|| "Unknown".to_string()),
            prefix: value_as_string(&c_para["pre"]).unwrap_or_else(|| "U".to_string()),
            package: value_as_string(&c_para["package"]),
            manufacturer: value_as_string(&c_para["BOM_Manufacturer"]),
            datasheet: value_as_string(&data["lcsc"]["url"]),
            lcsc_id: value_as_string(&data["lcsc"]["number"]),
            jlc_id: value_as_string(&c_para["BOM_JLCPCB Part Class"]),
        },
        bbox: BoundingBoxOrigin::new(
            value_as_f64(&head["x"]).unwrap_or(0.0),
            value_as_f64(&head["y"]).unwrap_or(0.0),
        ),
        ..Default::default()
    };

    for line in shape_lines(data_str, data, "symbol")? {
        let designator = designator_of(line);
        match decode_record(line, diagnostics) {
            Ok(Some(record)) => {
                if !symbol.add(record) {
                    diagnostics.warn(designator, "Footprint shape found in symbol data, skipped");
                }
            }
            Ok(None) => {
                diagnostics.warn(designator, format!("Unknown symbol designator: {}", designator))
            }
            Err(e) => diagnostics.warn(designator, e.to_string()),
        }
    }

    log::debug!(
        "Imported symbol '{}' with {} shapes",
        symbol.info.name,
        symbol.shape_count()
    );
    Ok(symbol)
}

// Helper structs for deserializing the nested JSON inside the SVGNODE string.
#[derive(Deserialize, Debug)]
struct SvgNode {
    attrs: SvgNodeAttrs,
}

#[derive(Deserialize, Debug)]
struct SvgNodeAttrs {
    uuid: String,
    title: String,
    z: Option<Value>,
    c_rotation: Option<String>,
    c_width: Option<Value>,
    c_height: Option<Value>,
}

fn split_numbers(text: Option<&str>) -> Vec<f64> {
    text.unwrap_or_default()
        .split(',')
        .map(|part| parse_number(part).unwrap_or(0.0))
        .collect()
}

/// Decodes an `SVGNODE~{json}` line into 3D placement metadata.
fn decode_svg_node(line: &str) -> Result<Ee3dModel> {
    let (_, json_part) = line
        .split_once('~')
        .ok_or_else(|| Error::ParseError("SVGNODE record without payload".to_string()))?;
    let node: SvgNode = serde_json::from_str(json_part)?;
    let attrs = node.attrs;

    let rotation = split_numbers(attrs.c_rotation.as_deref());
    let axis = |values: &[f64], i: usize| values.get(i).copied().unwrap_or(0.0);

    Ok(Ee3dModel {
        name: attrs.title,
        uuid: attrs.uuid,
        z: attrs.z.as_ref().and_then(value_as_f64).unwrap_or(0.0),
        rotation: (axis(&rotation, 0), axis(&rotation, 1), axis(&rotation, 2)),
        width: attrs.c_width.as_ref().and_then(value_as_f64),
        height: attrs.c_height.as_ref().and_then(value_as_f64),
    })
}

/// Extracts 3D model info from the footprint's `SVGNODE` record, if any.
pub fn import_3d_model_info(data: &Value) -> Result<Option<Ee3dModel>> {
    let data_str = &data["packageDetail"]["dataStr"];
    for line in shape_lines(data_str, data, "footprint")? {
        if designator_of(line) == "SVGNODE" {
            return decode_svg_node(line).map(Some);
        }
    }
    Ok(None)
}

/// Parses the footprint part (`packageDetail`) of a CAD data snapshot.
pub fn import_footprint(data: &Value, diagnostics: &mut Diagnostics) -> Result<EeFootprint> {
    let package = &data["packageDetail"];
    let data_str = &package["dataStr"];
    let head = &data_str["head"];
    let c_para = &head["c_para"];

    let is_smd = data["SMT"].as_bool().unwrap_or(false)
        && !package["title"].as_str().unwrap_or_default().contains("-TH_");

    let mut footprint = EeFootprint {
        info: EeFootprintInfo {
            name: value_as_string(&c_para["package"])
                .unwrap_or_else(|| "UnknownFootprint".to_string()),
            fp_type: if is_smd {
                FootprintType::Smd
            } else {
                FootprintType::ThroughHole
            },
            model_3d_name: value_as_string(&c_para["3DModel"]),
        },
        bbox: BoundingBoxOrigin::new(
            value_as_f64(&head["x"]).unwrap_or(0.0),
            value_as_f64(&head["y"]).unwrap_or(0.0),
        ),
        ..Default::default()
    };

    for line in shape_lines(data_str, data, "footprint")? {
        let designator = designator_of(line);
        match designator {
            "SVGNODE" => match decode_svg_node(line) {
                Ok(model) => footprint.model_3d = Some(model),
                Err(e) => diagnostics.warn(designator, format!("Bad 3D model node: {}", e)),
            },
            "SOLIDREGION" => diagnostics.warn(designator, "Solid regions are not supported, skipped"),
            _ => match decode_record(line, diagnostics) {
                Ok(Some(record)) => {
                    if !footprint.add(record) {
                        diagnostics.warn(designator, "Symbol shape found in footprint data, skipped");
                    }
                }
                Ok(None) => diagnostics.warn(
                    designator,
                    format!("Unknown footprint designator: {}", designator),
                ),
                Err(e) => diagnostics.warn(designator, e.to_string()),
            },
        }
    }

    log::debug!(
        "Imported footprint '{}' with {} shapes",
        footprint.info.name,
        footprint.shape_count()
    );
    Ok(footprint)
}
