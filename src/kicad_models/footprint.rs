// src/kicad_models/footprint.rs

//! KiCad footprint model and the `.kicad_mod` module dialect. All values are
//! millimetres with the bounding-box origin already subtracted; Y is not
//! flipped.

use super::Ki3dModel;
use crate::units::{fmt_fixed, fmt_float};
use std::fmt::Write;

pub const FOOTPRINT_EDIT_STAMP: &str = "5DC5F6A4";

/// Smallest pad KiCad accepts; custom pads shrink their anchor to this.
pub const CUSTOM_PAD_ANCHOR_SIZE: f64 = 0.005;

const COURTYARD_MARGIN: f64 = 0.5;
const COURTYARD_WIDTH: f64 = 0.05;
const FIELD_TEXT_EFFECTS: &str = "\t\t(effects (font (size 1 1) (thickness 0.15)))\n\t)\n";

/// Pad shape for an EasyEDA pad shape name; anything unknown is drawn as a
/// custom polygon.
pub fn pad_shape(easyeda_shape: &str) -> &'static str {
    match easyeda_shape {
        "ELLIPSE" => "circle",
        "RECT" => "rect",
        "OVAL" => "oval",
        _ => "custom",
    }
}

/// Layer set of an SMD pad.
pub fn pad_layers_smd(layer_id: i32) -> Option<&'static str> {
    match layer_id {
        1 => Some("F.Cu F.Paste F.Mask"),
        2 => Some("B.Cu B.Paste B.Mask"),
        3 => Some("F.SilkS"),
        11 => Some("*.Cu *.Paste *.Mask"),
        13 => Some("F.Fab"),
        15 => Some("Dwgs.User"),
        _ => None,
    }
}

/// Layer set of a plated through-hole pad (no paste).
pub fn pad_layers_tht(layer_id: i32) -> Option<&'static str> {
    match layer_id {
        1 => Some("F.Cu F.Mask"),
        2 => Some("B.Cu B.Mask"),
        3 => Some("F.SilkS"),
        11 => Some("*.Cu *.Mask"),
        13 => Some("F.Fab"),
        15 => Some("Dwgs.User"),
        _ => None,
    }
}

/// Single graphic layer for lines, circles, arcs and text.
pub fn graphic_layer(layer_id: i32) -> Option<&'static str> {
    match layer_id {
        1 => Some("F.Cu"),
        2 => Some("B.Cu"),
        3 => Some("F.SilkS"),
        4 => Some("B.SilkS"),
        5 => Some("F.Paste"),
        6 => Some("B.Paste"),
        7 => Some("F.Mask"),
        8 => Some("B.Mask"),
        10 | 11 => Some("Edge.Cuts"),
        12 => Some("Cmts.User"),
        13 => Some("F.Fab"),
        14 => Some("B.Fab"),
        15 => Some("Dwgs.User"),
        101 => Some("F.Fab"),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KiFootprintType {
    Smd,
    #[default]
    ThroughHole,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KiFootprintInfo {
    pub name: String,
    pub fp_type: KiFootprintType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KiPadType {
    Smd,
    ThruHole,
}

impl KiPadType {
    fn name(self) -> &'static str {
        match self {
            KiPadType::Smd => "smd",
            KiPadType::ThruHole => "thru_hole",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum KiDrill {
    #[default]
    None,
    Round(f64),
    Oval(f64, f64),
}

impl KiDrill {
    /// Derives the drill from a pad's hole. An oval hole is laid along the
    /// pad axis with the most copper left around it.
    pub fn from_hole(hole_radius: f64, hole_length: Option<f64>, pad_height: f64, pad_width: f64) -> Self {
        if hole_radius <= 0.0 {
            return KiDrill::None;
        }
        let diameter = hole_radius * 2.0;
        match hole_length {
            Some(length) if length != 0.0 => {
                let max_distance_hole = diameter.max(length);
                let pos_0 = pad_height - max_distance_hole;
                let pos_90 = pad_width - max_distance_hole;
                if pos_0.max(pos_90) == pos_0 {
                    KiDrill::Oval(diameter, length)
                } else {
                    KiDrill::Oval(length, diameter)
                }
            }
            _ => KiDrill::Round(diameter),
        }
    }

    fn render(&self) -> String {
        match self {
            KiDrill::None => String::new(),
            KiDrill::Round(d) => format!(" (drill {})", d),
            KiDrill::Oval(w, h) => format!(" (drill oval {} {})", w, h),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KiFootprintPad {
    pub pad_type: KiPadType,
    pub shape: &'static str,
    pub pos_x: f64,
    pub pos_y: f64,
    pub width: f64,
    pub height: f64,
    pub layers: String,
    pub number: String,
    pub drill: KiDrill,
    pub orientation: f64,
    /// Outline relative to the pad centre, for custom pads.
    pub polygon: Option<Vec<(f64, f64)>>,
}

impl KiFootprintPad {
    fn export(&self) -> String {
        let polygon = match &self.polygon {
            Some(points) => {
                let path: String = points
                    .iter()
                    .map(|(x, y)| format!("(xy {} {})", x, y))
                    .collect();
                format!(
                    "\n\t\t(primitives\n\t\t\t(gr_poly\n\t\t\t\t(pts {}\n\t\t\t\t)\n\t\t\t\t(width 0.1)\n\t\t\t)\n\t\t)\n\t",
                    path
                )
            }
            None => String::new(),
        };
        format!(
            "\t(pad {} {} {} (at {} {} {}) (size {} {}) (layers {}){}{})\n",
            self.number,
            self.pad_type.name(),
            self.shape,
            fmt_fixed(self.pos_x, 2),
            fmt_fixed(self.pos_y, 2),
            fmt_fixed(self.orientation, 2),
            fmt_fixed(self.width, 2),
            fmt_fixed(self.height, 2),
            self.layers,
            self.drill.render(),
            polygon
        )
    }
}

/// One straight segment; tracks and rectangles both end up as these.
#[derive(Debug, Clone, PartialEq)]
pub struct KiFootprintLine {
    pub start: (f64, f64),
    pub end: (f64, f64),
    pub layer: String,
    pub stroke_width: f64,
}

impl KiFootprintLine {
    fn export(&self) -> String {
        format!(
            "\t(fp_line (start {} {}) (end {} {}) (layer {}) (width {}))\n",
            fmt_fixed(self.start.0, 2),
            fmt_fixed(self.start.1, 2),
            fmt_fixed(self.end.0, 2),
            fmt_fixed(self.end.1, 2),
            self.layer,
            fmt_fixed(self.stroke_width, 2)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KiFootprintHole {
    pub pos_x: f64,
    pub pos_y: f64,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KiFootprintVia {
    pub pos_x: f64,
    pub pos_y: f64,
    /// Drill size.
    pub size: f64,
    pub diameter: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KiFootprintCircle {
    pub cx: f64,
    pub cy: f64,
    pub end_x: f64,
    pub end_y: f64,
    pub layer: String,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KiFootprintArc {
    /// Legacy `fp_arc` takes the arc centre as its start.
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    pub angle: f64,
    pub layer: String,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KiFootprintText {
    pub pos_x: f64,
    pub pos_y: f64,
    pub orientation: f64,
    pub text: String,
    pub layer: String,
    pub font_size: f64,
    pub thickness: f64,
    pub hidden: bool,
    pub mirror: bool,
}

/// Quotes text that would otherwise break the s-expression.
fn quote_if_needed(text: &str) -> String {
    let needs_quotes = text.is_empty()
        || text
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '(' | ')'));
    if needs_quotes {
        format!("\"{}\"", text.replace('"', "\\\""))
    } else {
        text.to_string()
    }
}

impl KiFootprintText {
    fn export(&self) -> String {
        format!(
            "\t(fp_text user {} (at {} {} {}) (layer {}){}\n\t\t(effects (font (size {} {}) (thickness {})) (justify left{}))\n\t)\n",
            quote_if_needed(&self.text),
            fmt_fixed(self.pos_x, 2),
            fmt_fixed(self.pos_y, 2),
            fmt_fixed(self.orientation, 2),
            self.layer,
            if self.hidden { " hide" } else { "" },
            fmt_fixed(self.font_size, 2),
            fmt_fixed(self.font_size, 2),
            fmt_fixed(self.thickness, 2),
            if self.mirror { " mirror" } else { "" }
        )
    }
}

/// Axis-aligned extents of every placed primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootprintExtents {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl FootprintExtents {
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    fn include(extents: &mut Option<Self>, x: f64, y: f64) {
        let e = extents.get_or_insert(Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        });
        e.min_x = e.min_x.min(x);
        e.min_y = e.min_y.min(y);
        e.max_x = e.max_x.max(x);
        e.max_y = e.max_y.max(y);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KiFootprint {
    pub info: KiFootprintInfo,
    pub pads: Vec<KiFootprintPad>,
    pub lines: Vec<KiFootprintLine>,
    pub holes: Vec<KiFootprintHole>,
    pub vias: Vec<KiFootprintVia>,
    pub circles: Vec<KiFootprintCircle>,
    pub arcs: Vec<KiFootprintArc>,
    pub texts: Vec<KiFootprintText>,
    pub model_3d: Option<Ki3dModel>,
}

impl KiFootprint {
    /// Extents over lines, pads, holes, vias and circles. Arcs and texts
    /// are not counted. `None` when nothing is placed.
    pub fn extents(&self) -> Option<FootprintExtents> {
        let mut extents = None;
        for line in &self.lines {
            FootprintExtents::include(&mut extents, line.start.0, line.start.1);
            FootprintExtents::include(&mut extents, line.end.0, line.end.1);
        }
        let mut include_box = |x: f64, y: f64, half_w: f64, half_h: f64| {
            FootprintExtents::include(&mut extents, x - half_w, y - half_h);
            FootprintExtents::include(&mut extents, x + half_w, y + half_h);
        };
        for pad in &self.pads {
            include_box(pad.pos_x, pad.pos_y, pad.width / 2.0, pad.height / 2.0);
        }
        for hole in &self.holes {
            include_box(hole.pos_x, hole.pos_y, hole.size / 2.0, hole.size / 2.0);
        }
        for via in &self.vias {
            include_box(via.pos_x, via.pos_y, via.diameter / 2.0, via.diameter / 2.0);
        }
        for circle in &self.circles {
            let radius = (circle.end_x - circle.cx).abs();
            include_box(circle.cx, circle.cy, radius, radius);
        }
        extents
    }

    fn pad_y_extents(&self) -> (f64, f64) {
        if self.pads.is_empty() {
            return (0.0, 0.0);
        }
        self.pads.iter().fold((f64::MAX, f64::MIN), |(low, high), pad| {
            (low.min(pad.pos_y), high.max(pad.pos_y))
        })
    }

    /// Renders the complete `.kicad_mod` text. `model_dir` is the directory
    /// the `.wrl` reference points into.
    pub fn export(&self, library_name: &str, model_dir: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "(module {}:{} (layer F.Cu) (tedit {})",
            library_name, self.info.name, FOOTPRINT_EDIT_STAMP
        );
        let _ = writeln!(
            out,
            "\t(attr {})",
            match self.info.fp_type {
                KiFootprintType::Smd => "smd",
                KiFootprintType::ThroughHole => "through_hole",
            }
        );

        let (y_low, y_high) = self.pad_y_extents();
        let _ = writeln!(
            out,
            "\t(fp_text reference REF** (at 0 {}) (layer F.SilkS)",
            fmt_float(y_low - 4.0)
        );
        out.push_str(FIELD_TEXT_EFFECTS);
        let _ = writeln!(
            out,
            "\t(fp_text value {} (at 0 {}) (layer F.Fab)",
            self.info.name,
            fmt_float(y_high + 4.0)
        );
        out.push_str(FIELD_TEXT_EFFECTS);
        out.push_str("\t(fp_text user %R (at 0 0) (layer F.Fab)\n");
        out.push_str(FIELD_TEXT_EFFECTS);

        for line in &self.lines {
            out.push_str(&line.export());
        }
        for pad in &self.pads {
            out.push_str(&pad.export());
        }
        for hole in &self.holes {
            let _ = writeln!(
                out,
                "\t(pad \"\" thru_hole circle (at {} {}) (size {} {}) (drill {}) (layers *.Cu *.Mask))",
                fmt_fixed(hole.pos_x, 2),
                fmt_fixed(hole.pos_y, 2),
                fmt_fixed(hole.size, 2),
                fmt_fixed(hole.size, 2),
                fmt_fixed(hole.size, 2)
            );
        }
        for via in &self.vias {
            let _ = writeln!(
                out,
                "\t(pad \"\" thru_hole circle (at {} {}) (size {} {}) (drill {}) (layers *.Cu *.Paste *.Mask))",
                fmt_fixed(via.pos_x, 2),
                fmt_fixed(via.pos_y, 2),
                fmt_fixed(via.diameter, 2),
                fmt_fixed(via.diameter, 2),
                fmt_fixed(via.size, 2)
            );
        }
        for circle in &self.circles {
            let _ = writeln!(
                out,
                "\t(fp_circle (center {} {}) (end {} {}) (layer {}) (width {}))",
                fmt_fixed(circle.cx, 2),
                fmt_fixed(circle.cy, 2),
                fmt_fixed(circle.end_x, 2),
                fmt_fixed(circle.end_y, 2),
                circle.layer,
                fmt_fixed(circle.stroke_width, 2)
            );
        }
        for arc in &self.arcs {
            let _ = writeln!(
                out,
                "\t(fp_arc (start {} {}) (end {} {}) (angle {}) (layer {}) (width {}))",
                fmt_fixed(arc.start_x, 2),
                fmt_fixed(arc.start_y, 2),
                fmt_fixed(arc.end_x, 2),
                fmt_fixed(arc.end_y, 2),
                fmt_fixed(arc.angle, 2),
                arc.layer,
                fmt_fixed(arc.stroke_width, 2)
            );
        }
        for text in &self.texts {
            out.push_str(&text.export());
        }

        if let Some(model) = &self.model_3d {
            out.push_str(&model.export_reference(model_dir));
        }

        if let Some(extents) = self.extents() {
            let (x0, y0) = (extents.min_x - COURTYARD_MARGIN, extents.min_y - COURTYARD_MARGIN);
            let (x1, y1) = (extents.max_x + COURTYARD_MARGIN, extents.max_y + COURTYARD_MARGIN);
            for (start, end) in [
                ((x0, y0), (x1, y0)),
                ((x1, y0), (x1, y1)),
                ((x1, y1), (x0, y1)),
                ((x0, y1), (x0, y0)),
            ] {
                let courtyard = KiFootprintLine {
                    start,
                    end,
                    layer: "F.CrtYd".to_string(),
                    stroke_width: COURTYARD_WIDTH,
                };
                out.push_str(&courtyard.export());
            }
        }

        out.push(')');
        out
    }
}
