// src/easyeda_models.rs

//! Typed records for every EasyEDA shape kind, in source (pixel) units.

use crate::record::{
    format_flag, format_show_flag, format_yes_flag, join_fields, opt_num, opt_str, SEGMENT_DELIMITER,
};
use crate::svg_path::{format_svg_path, SvgPathElement};
use crate::units::BoundingBoxOrigin;

// --- Shared style attributes ---

/// Trailing style fields shared by all symbol graphics, in record order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EeStyle {
    pub stroke_color: Option<String>,
    pub stroke_width: Option<String>,
    pub stroke_style: Option<String>,
    pub fill_color: Option<String>,
    pub id: Option<String>,
    pub is_locked: Option<bool>,
}

impl EeStyle {
    /// A fill colour other than `none` means the shape is filled.
    pub fn is_filled(&self) -> bool {
        self.fill_color
            .as_deref()
            .is_some_and(|fill| !fill.eq_ignore_ascii_case("none"))
    }

    fn fields(&self) -> Vec<String> {
        vec![
            opt_str(&self.stroke_color),
            opt_str(&self.stroke_width),
            opt_str(&self.stroke_style),
            opt_str(&self.fill_color),
            opt_str(&self.id),
            format_flag(self.is_locked).to_string(),
        ]
    }
}

// --- Symbol records ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EasyedaPinType {
    #[default]
    Unspecified,
    Input,
    Output,
    Bidirectional,
    Power,
}

impl EasyedaPinType {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => EasyedaPinType::Input,
            2 => EasyedaPinType::Output,
            3 => EasyedaPinType::Bidirectional,
            4 => EasyedaPinType::Power,
            _ => EasyedaPinType::Unspecified,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            EasyedaPinType::Unspecified => 0,
            EasyedaPinType::Input => 1,
            EasyedaPinType::Output => 2,
            EasyedaPinType::Bidirectional => 3,
            EasyedaPinType::Power => 4,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EeSymbolPinName {
    pub is_displayed: Option<bool>,
    pub pos_x: Option<f64>,
    pub pos_y: Option<f64>,
    pub rotation: Option<f64>,
    pub text: String,
    pub text_anchor: Option<String>,
    pub font: Option<String>,
    pub font_size: Option<f64>,
}

/// The inversion bubble drawn at the pin tip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EeSymbolPinDot {
    pub is_displayed: Option<bool>,
    pub circle_x: Option<f64>,
    pub circle_y: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EeSymbolPinClock {
    pub is_displayed: Option<bool>,
    pub path: Option<String>,
}

/// A symbol pin, assembled from the `^^`-separated segments of a `P` record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EeSymbolPin {
    pub is_displayed: Option<bool>,
    pub pin_type: EasyedaPinType,
    pub spice_pin_number: String,
    pub pos_x: f64,
    pub pos_y: f64,
    pub rotation: f64,
    pub id: Option<String>,
    pub is_locked: Option<bool>,
    pub dot_x: Option<f64>,
    pub dot_y: Option<f64>,
    /// Pin body path; vertical strokes are rewritten to `h` on import so the
    /// length can always be read from the last `h` argument.
    pub path: String,
    pub path_color: Option<String>,
    pub name: EeSymbolPinName,
    pub dot: EeSymbolPinDot,
    pub clock: EeSymbolPinClock,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EeSymbolRectangle {
    pub pos_x: f64,
    pub pos_y: f64,
    pub rx: Option<f64>,
    pub ry: Option<f64>,
    pub width: f64,
    pub height: f64,
    pub style: EeStyle,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EeSymbolCircle {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub style: EeStyle,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EeSymbolEllipse {
    pub center_x: f64,
    pub center_y: f64,
    pub radius_x: f64,
    pub radius_y: f64,
    pub style: EeStyle,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EeSymbolArc {
    pub path: Vec<SvgPathElement>,
    pub helper_dots: Option<String>,
    pub style: EeStyle,
}

/// Used for both `PL` (polyline) and `PG` (polygon) records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EeSymbolPolyline {
    pub points: Vec<(f64, f64)>,
    pub style: EeStyle,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EeSymbolPath {
    pub paths: String,
    pub style: EeStyle,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EeSymbolInfo {
    pub name: String,
    pub prefix: String,
    pub package: Option<String>,
    pub manufacturer: Option<String>,
    pub datasheet: Option<String>,
    pub lcsc_id: Option<String>,
    pub jlc_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EeSymbol {
    pub info: EeSymbolInfo,
    pub bbox: BoundingBoxOrigin,
    pub pins: Vec<EeSymbolPin>,
    pub rectangles: Vec<EeSymbolRectangle>,
    pub circles: Vec<EeSymbolCircle>,
    pub ellipses: Vec<EeSymbolEllipse>,
    pub arcs: Vec<EeSymbolArc>,
    pub polylines: Vec<EeSymbolPolyline>,
    pub polygons: Vec<EeSymbolPolyline>,
    pub paths: Vec<EeSymbolPath>,
}

impl EeSymbol {
    /// Files a decoded record under its kind. Footprint records are refused.
    pub fn add(&mut self, record: ShapeRecord) -> bool {
        match record {
            ShapeRecord::Pin(pin) => self.pins.push(pin),
            ShapeRecord::Rectangle(rect) => self.rectangles.push(rect),
            ShapeRecord::Circle(circle) => self.circles.push(circle),
            ShapeRecord::Ellipse(ellipse) => self.ellipses.push(ellipse),
            ShapeRecord::Arc(arc) => self.arcs.push(arc),
            ShapeRecord::Polyline(polyline) => self.polylines.push(polyline),
            ShapeRecord::Polygon(polygon) => self.polygons.push(polygon),
            ShapeRecord::Path(path) => self.paths.push(path),
            _ => return false,
        }
        true
    }

    pub fn shape_count(&self) -> usize {
        self.pins.len()
            + self.rectangles.len()
            + self.circles.len()
            + self.ellipses.len()
            + self.arcs.len()
            + self.polylines.len()
            + self.polygons.len()
            + self.paths.len()
    }
}

// --- Footprint records ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EeFootprintPad {
    pub shape: String,
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
    pub layer_id: Option<i32>,
    pub net: Option<String>,
    pub number: String,
    pub hole_radius: f64,
    /// Flat `x y x y ...` outline, only meaningful for polygon pads.
    pub points: Vec<f64>,
    pub rotation: f64,
    pub id: Option<String>,
    pub hole_length: Option<f64>,
    pub hole_point: Option<String>,
    pub is_plated: Option<bool>,
    pub is_locked: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EeFootprintTrack {
    pub stroke_width: f64,
    pub layer_id: Option<i32>,
    pub net: Option<String>,
    pub points: Vec<f64>,
    pub id: Option<String>,
    pub is_locked: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EeFootprintHole {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub id: Option<String>,
    pub is_locked: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EeFootprintVia {
    pub center_x: f64,
    pub center_y: f64,
    pub diameter: f64,
    pub net: Option<String>,
    pub radius: f64,
    pub id: Option<String>,
    pub is_locked: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EeFootprintCircle {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub stroke_width: Option<f64>,
    pub layer_id: Option<i32>,
    pub id: Option<String>,
    pub is_locked: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EeFootprintRectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub stroke_width: Option<f64>,
    pub id: Option<String>,
    pub layer_id: Option<i32>,
    pub is_locked: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EeFootprintArc {
    pub stroke_width: Option<f64>,
    pub layer_id: Option<i32>,
    pub net: Option<String>,
    pub path: Vec<SvgPathElement>,
    pub helper_dots: Option<String>,
    pub id: Option<String>,
    pub is_locked: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EeFootprintText {
    /// `P` (package name), `N` (reference) or free text.
    pub text_type: String,
    pub center_x: f64,
    pub center_y: f64,
    pub stroke_width: Option<f64>,
    pub rotation: Option<f64>,
    pub mirror: Option<String>,
    pub layer_id: Option<i32>,
    pub net: Option<String>,
    pub font_size: Option<f64>,
    pub text: String,
    pub text_path: Option<String>,
    pub is_displayed: Option<bool>,
    pub id: Option<String>,
    pub is_locked: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FootprintType {
    Smd,
    #[default]
    ThroughHole,
}

#[derive(Debug, Clone, Default)]
pub struct EeFootprintInfo {
    pub name: String,
    pub fp_type: FootprintType,
    pub model_3d_name: Option<String>,
}

/// 3D placement metadata from the footprint's `SVGNODE` record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ee3dModel {
    pub name: String,
    pub uuid: String,
    pub z: f64,
    pub rotation: (f64, f64, f64),
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct EeFootprint {
    pub info: EeFootprintInfo,
    pub bbox: BoundingBoxOrigin,
    pub pads: Vec<EeFootprintPad>,
    pub tracks: Vec<EeFootprintTrack>,
    pub holes: Vec<EeFootprintHole>,
    pub vias: Vec<EeFootprintVia>,
    pub circles: Vec<EeFootprintCircle>,
    pub rectangles: Vec<EeFootprintRectangle>,
    pub arcs: Vec<EeFootprintArc>,
    pub texts: Vec<EeFootprintText>,
    pub model_3d: Option<Ee3dModel>,
}

impl EeFootprint {
    /// Files a decoded record under its kind. Symbol records are refused.
    pub fn add(&mut self, record: ShapeRecord) -> bool {
        match record {
            ShapeRecord::Pad(pad) => self.pads.push(pad),
            ShapeRecord::Track(track) => self.tracks.push(track),
            ShapeRecord::Hole(hole) => self.holes.push(hole),
            ShapeRecord::Via(via) => self.vias.push(via),
            ShapeRecord::FootprintCircle(circle) => self.circles.push(circle),
            ShapeRecord::FootprintRectangle(rect) => self.rectangles.push(rect),
            ShapeRecord::FootprintArc(arc) => self.arcs.push(arc),
            ShapeRecord::Text(text) => self.texts.push(text),
            _ => return false,
        }
        true
    }

    pub fn shape_count(&self) -> usize {
        self.pads.len()
            + self.tracks.len()
            + self.holes.len()
            + self.vias.len()
            + self.circles.len()
            + self.rectangles.len()
            + self.arcs.len()
            + self.texts.len()
    }
}

// --- Tagged union over all record kinds ---

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeRecord {
    Pin(EeSymbolPin),
    Rectangle(EeSymbolRectangle),
    Circle(EeSymbolCircle),
    Ellipse(EeSymbolEllipse),
    Arc(EeSymbolArc),
    Polyline(EeSymbolPolyline),
    Polygon(EeSymbolPolyline),
    Path(EeSymbolPath),
    Pad(EeFootprintPad),
    Track(EeFootprintTrack),
    Hole(EeFootprintHole),
    Via(EeFootprintVia),
    FootprintCircle(EeFootprintCircle),
    FootprintRectangle(EeFootprintRectangle),
    FootprintArc(EeFootprintArc),
    Text(EeFootprintText),
}

impl ShapeRecord {
    pub fn designator(&self) -> &'static str {
        match self {
            ShapeRecord::Pin(_) => "P",
            ShapeRecord::Rectangle(_) => "R",
            ShapeRecord::Circle(_) => "C",
            ShapeRecord::Ellipse(_) => "E",
            ShapeRecord::Arc(_) => "A",
            ShapeRecord::Polyline(_) => "PL",
            ShapeRecord::Polygon(_) => "PG",
            ShapeRecord::Path(_) => "PT",
            ShapeRecord::Pad(_) => "PAD",
            ShapeRecord::Track(_) => "TRACK",
            ShapeRecord::Hole(_) => "HOLE",
            ShapeRecord::Via(_) => "VIA",
            ShapeRecord::FootprintCircle(_) => "CIRCLE",
            ShapeRecord::FootprintRectangle(_) => "RECT",
            ShapeRecord::FootprintArc(_) => "ARC",
            ShapeRecord::Text(_) => "TEXT",
        }
    }

    /// Serialises the record back into EasyEDA's line format.
    pub fn to_line(&self) -> String {
        let designator = self.designator();
        match self {
            ShapeRecord::Pin(pin) => pin_to_line(pin),
            ShapeRecord::Rectangle(r) => {
                let mut fields = vec![
                    r.pos_x.to_string(),
                    r.pos_y.to_string(),
                    opt_num(r.rx),
                    opt_num(r.ry),
                    r.width.to_string(),
                    r.height.to_string(),
                ];
                fields.extend(r.style.fields());
                join_fields(designator, &fields)
            }
            ShapeRecord::Circle(c) => {
                let mut fields = vec![
                    c.center_x.to_string(),
                    c.center_y.to_string(),
                    c.radius.to_string(),
                ];
                fields.extend(c.style.fields());
                join_fields(designator, &fields)
            }
            ShapeRecord::Ellipse(e) => {
                let mut fields = vec![
                    e.center_x.to_string(),
                    e.center_y.to_string(),
                    e.radius_x.to_string(),
                    e.radius_y.to_string(),
                ];
                fields.extend(e.style.fields());
                join_fields(designator, &fields)
            }
            ShapeRecord::Arc(a) => {
                let mut fields = vec![format_svg_path(&a.path), opt_str(&a.helper_dots)];
                fields.extend(a.style.fields());
                join_fields(designator, &fields)
            }
            ShapeRecord::Polyline(p) | ShapeRecord::Polygon(p) => {
                let mut fields = vec![format_point_pairs(&p.points)];
                fields.extend(p.style.fields());
                join_fields(designator, &fields)
            }
            ShapeRecord::Path(p) => {
                let mut fields = vec![p.paths.clone()];
                fields.extend(p.style.fields());
                join_fields(designator, &fields)
            }
            ShapeRecord::Pad(p) => join_fields(
                designator,
                &[
                    p.shape.clone(),
                    p.center_x.to_string(),
                    p.center_y.to_string(),
                    p.width.to_string(),
                    p.height.to_string(),
                    opt_int(p.layer_id),
                    opt_str(&p.net),
                    p.number.clone(),
                    p.hole_radius.to_string(),
                    format_flat_points(&p.points),
                    p.rotation.to_string(),
                    opt_str(&p.id),
                    opt_num(p.hole_length),
                    opt_str(&p.hole_point),
                    format_yes_flag(p.is_plated).to_string(),
                    format_flag(p.is_locked).to_string(),
                ],
            ),
            ShapeRecord::Track(t) => join_fields(
                designator,
                &[
                    t.stroke_width.to_string(),
                    opt_int(t.layer_id),
                    opt_str(&t.net),
                    format_flat_points(&t.points),
                    opt_str(&t.id),
                    format_flag(t.is_locked).to_string(),
                ],
            ),
            ShapeRecord::Hole(h) => join_fields(
                designator,
                &[
                    h.center_x.to_string(),
                    h.center_y.to_string(),
                    h.radius.to_string(),
                    opt_str(&h.id),
                    format_flag(h.is_locked).to_string(),
                ],
            ),
            ShapeRecord::Via(v) => join_fields(
                designator,
                &[
                    v.center_x.to_string(),
                    v.center_y.to_string(),
                    v.diameter.to_string(),
                    opt_str(&v.net),
                    v.radius.to_string(),
                    opt_str(&v.id),
                    format_flag(v.is_locked).to_string(),
                ],
            ),
            ShapeRecord::FootprintCircle(c) => join_fields(
                designator,
                &[
                    c.cx.to_string(),
                    c.cy.to_string(),
                    c.radius.to_string(),
                    opt_num(c.stroke_width),
                    opt_int(c.layer_id),
                    opt_str(&c.id),
                    format_flag(c.is_locked).to_string(),
                ],
            ),
            ShapeRecord::FootprintRectangle(r) => join_fields(
                designator,
                &[
                    r.x.to_string(),
                    r.y.to_string(),
                    r.width.to_string(),
                    r.height.to_string(),
                    opt_num(r.stroke_width),
                    opt_str(&r.id),
                    opt_int(r.layer_id),
                    format_flag(r.is_locked).to_string(),
                ],
            ),
            ShapeRecord::FootprintArc(a) => join_fields(
                designator,
                &[
                    opt_num(a.stroke_width),
                    opt_int(a.layer_id),
                    opt_str(&a.net),
                    format_svg_path(&a.path),
                    opt_str(&a.helper_dots),
                    opt_str(&a.id),
                    format_flag(a.is_locked).to_string(),
                ],
            ),
            ShapeRecord::Text(t) => join_fields(
                designator,
                &[
                    t.text_type.clone(),
                    t.center_x.to_string(),
                    t.center_y.to_string(),
                    opt_num(t.stroke_width),
                    opt_num(t.rotation),
                    opt_str(&t.mirror),
                    opt_int(t.layer_id),
                    opt_str(&t.net),
                    opt_num(t.font_size),
                    t.text.clone(),
                    opt_str(&t.text_path),
                    format_flag(t.is_displayed).to_string(),
                    opt_str(&t.id),
                    format_flag(t.is_locked).to_string(),
                ],
            ),
        }
    }
}

fn pin_to_line(pin: &EeSymbolPin) -> String {
    let settings = join_fields(
        "P",
        &[
            format_show_flag(pin.is_displayed).to_string(),
            pin.pin_type.code().to_string(),
            pin.spice_pin_number.clone(),
            pin.pos_x.to_string(),
            pin.pos_y.to_string(),
            pin.rotation.to_string(),
            opt_str(&pin.id),
            format_flag(pin.is_locked).to_string(),
        ],
    );
    let dot = format!("{}~{}", opt_num(pin.dot_x), opt_num(pin.dot_y));
    let path = format!("{}~{}", pin.path, opt_str(&pin.path_color));
    let name = [
        format_show_flag(pin.name.is_displayed).to_string(),
        opt_num(pin.name.pos_x),
        opt_num(pin.name.pos_y),
        opt_num(pin.name.rotation),
        pin.name.text.clone(),
        opt_str(&pin.name.text_anchor),
        opt_str(&pin.name.font),
        opt_num(pin.name.font_size),
    ]
    .join("~");
    let bubble = format!(
        "{}~{}~{}",
        format_show_flag(pin.dot.is_displayed),
        opt_num(pin.dot.circle_x),
        opt_num(pin.dot.circle_y)
    );
    let clock = format!(
        "{}~{}",
        format_show_flag(pin.clock.is_displayed),
        opt_str(&pin.clock.path)
    );

    // Segment 4 carries the pin number label, which the converter never reads.
    [settings, dot, path, name, String::new(), bubble, clock].join(SEGMENT_DELIMITER)
}

fn opt_int(value: Option<i32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn format_point_pairs(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{} {}", x, y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_flat_points(points: &[f64]) -> String {
    points
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
