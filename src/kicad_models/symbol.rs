// src/kicad_models/symbol.rs

//! KiCad symbol model and its two text dialects.
//!
//! Coordinates are already converted: whole mils for [`KicadVersion::V5`],
//! millimetres for [`KicadVersion::V6`].

use crate::units::{fmt_fixed, fmt_int, KicadVersion};
use std::fmt::Write;

pub const V5_LIBRARY_HEADER: &str = "EESchema-LIBRARY Version 2.4\n#encoding utf-8\n";
pub const V6_LIBRARY_HEADER: &str =
    "(kicad_symbol_lib\n  (version 20211014)\n  (generator easyeda_kipm)\n)\n";

/// Text a fresh symbol library file starts with.
pub fn library_header(version: KicadVersion) -> &'static str {
    match version {
        KicadVersion::V5 => V5_LIBRARY_HEADER,
        KicadVersion::V6 => V6_LIBRARY_HEADER,
    }
}

// Legacy dialect constants, in mil.
const V5_PIN_NUM_SIZE: i32 = 50;
const V5_PIN_NAME_SIZE: i32 = 50;
const V5_PIN_NAME_OFFSET: i32 = 40;
const V5_FIELD_FONT_SIZE: i32 = 60;
const V5_FIELD_OFFSET_START: f64 = 200.0;
const V5_FIELD_OFFSET_INCREMENT: f64 = 100.0;

// Modern dialect constants, in mm.
const V6_PIN_TEXT_SIZE: f64 = 1.27;
const V6_PROPERTY_FONT_SIZE: f64 = 1.27;
const V6_FIELD_OFFSET_START: f64 = 5.08;
const V6_FIELD_OFFSET_INCREMENT: f64 = 2.54;

const V6_STROKE: &str = "(stroke (width 0) (type default) (color 0 0 0 0))";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KiPinType {
    Input,
    Output,
    Bidirectional,
    TriState,
    Passive,
    Free,
    Unspecified,
    PowerIn,
    PowerOut,
    OpenCollector,
    OpenEmitter,
    NoConnect,
}

impl KiPinType {
    pub fn v5_code(self) -> &'static str {
        match self {
            KiPinType::Input => "I",
            KiPinType::Output => "O",
            KiPinType::Bidirectional => "B",
            KiPinType::TriState => "T",
            KiPinType::Passive => "P",
            KiPinType::Free | KiPinType::Unspecified => "U",
            KiPinType::PowerIn | KiPinType::PowerOut => "W",
            KiPinType::OpenCollector => "C",
            KiPinType::OpenEmitter => "E",
            KiPinType::NoConnect => "N",
        }
    }

    pub fn v6_name(self) -> &'static str {
        match self {
            KiPinType::Input => "input",
            KiPinType::Output => "output",
            KiPinType::Bidirectional => "bidirectional",
            KiPinType::TriState => "tri_state",
            KiPinType::Passive => "passive",
            KiPinType::Free => "free",
            KiPinType::Unspecified => "unspecified",
            KiPinType::PowerIn => "power_in",
            KiPinType::PowerOut => "power_out",
            KiPinType::OpenCollector => "open_collector",
            KiPinType::OpenEmitter => "open_emitter",
            KiPinType::NoConnect => "no_connect",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KiPinStyle {
    #[default]
    Line,
    Inverted,
    Clock,
    InvertedClock,
    InputLow,
    ClockLow,
    OutputLow,
    EdgeClockHigh,
    NonLogic,
}

impl KiPinStyle {
    pub fn v5_code(self) -> &'static str {
        match self {
            KiPinStyle::Line => "",
            KiPinStyle::Inverted => "I",
            KiPinStyle::Clock => "C",
            KiPinStyle::InvertedClock => "F",
            KiPinStyle::InputLow => "L",
            KiPinStyle::ClockLow => "CL",
            KiPinStyle::OutputLow => "V",
            KiPinStyle::EdgeClockHigh => "C",
            KiPinStyle::NonLogic => "X",
        }
    }

    pub fn v6_name(self) -> &'static str {
        match self {
            KiPinStyle::Line => "line",
            KiPinStyle::Inverted => "inverted",
            KiPinStyle::Clock => "clock",
            KiPinStyle::InvertedClock => "inverted_clock",
            KiPinStyle::InputLow => "input_low",
            KiPinStyle::ClockLow => "clock_low",
            KiPinStyle::OutputLow => "output_low",
            KiPinStyle::EdgeClockHigh => "edge_clock_high",
            KiPinStyle::NonLogic => "non_logic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KiBoxFill {
    None,
    Outline,
    Background,
}

impl KiBoxFill {
    pub fn v5_code(self) -> &'static str {
        match self {
            KiBoxFill::None => "N",
            KiBoxFill::Outline => "F",
            KiBoxFill::Background => "f",
        }
    }

    pub fn v6_name(self) -> &'static str {
        match self {
            KiBoxFill::None => "none",
            KiBoxFill::Outline => "outline",
            KiBoxFill::Background => "background",
        }
    }

    fn from_closed(closed: bool) -> Self {
        if closed {
            KiBoxFill::Background
        } else {
            KiBoxFill::None
        }
    }
}

/// Removes spaces and turns `/` into `_`, as KiCad library names require.
pub fn sanitize_name(name: &str) -> String {
    name.replace(' ', "").replace('/', "_")
}

/// A trailing `#` marks an active-low signal and becomes an overbar.
fn apply_text_style(text: &str, version: KicadVersion) -> String {
    match text.strip_suffix('#') {
        Some(base) => match version {
            KicadVersion::V6 => format!("~{{{}}}", base),
            KicadVersion::V5 => format!("~{}~", base),
        },
        None => text.to_string(),
    }
}

/// Applies overbar styling to each `/`-separated part of a pin name.
pub fn apply_pin_name_style(name: &str, version: KicadVersion) -> String {
    name.split('/')
        .map(|part| apply_text_style(part, version))
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KiSymbolInfo {
    pub name: String,
    pub prefix: String,
    /// Already qualified with the footprint library (`lib:package`).
    pub package: Option<String>,
    pub manufacturer: Option<String>,
    pub datasheet: Option<String>,
    pub lcsc_id: Option<String>,
    pub jlc_id: Option<String>,
}

impl KiSymbolInfo {
    fn export_v5(&self, y_low: f64, y_high: f64) -> String {
        let mut offset = V5_FIELD_OFFSET_START;
        let mut lines = vec![
            format!(
                "DEF {} {} 0 {} Y Y 1 L N",
                sanitize_name(&self.name),
                self.prefix,
                V5_PIN_NAME_OFFSET
            ),
            format!(
                "F0 \"{}\" 0 {} {} H V C CNN",
                self.prefix,
                fmt_int(y_high + offset),
                V5_FIELD_FONT_SIZE
            ),
            format!(
                "F1 \"{}\" 0 {} {} H V C CNN",
                self.name,
                fmt_int(y_low - offset),
                V5_FIELD_FONT_SIZE
            ),
        ];
        if let Some(package) = &self.package {
            offset += V5_FIELD_OFFSET_INCREMENT;
            lines.push(format!(
                "F2 \"{}\" 0 {} {} H I C CNN",
                package,
                fmt_int(y_low - offset),
                V5_FIELD_FONT_SIZE
            ));
        }
        if let Some(datasheet) = &self.datasheet {
            offset += V5_FIELD_OFFSET_INCREMENT;
            lines.push(format!(
                "F3 \"{}\" 0 {} {} H I C CNN",
                datasheet,
                fmt_int(y_low - offset),
                V5_FIELD_FONT_SIZE
            ));
        }
        if let Some(manufacturer) = &self.manufacturer {
            lines.push(format!("F4 \"{}\" 0 0 0 H I C CNN \"Manufacturer\"", manufacturer));
        }
        if let Some(lcsc) = &self.lcsc_id {
            lines.push(format!("F6 \"{}\" 0 0 0 H I C CNN \"LCSC Part\"", lcsc));
        }
        if let Some(jlc) = &self.jlc_id {
            lines.push(format!("F7 \"{}\" 0 0 0 H I C CNN \"JLC Part\"", jlc));
        }
        lines.push("DRAW".to_string());

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    fn export_v6(&self, y_low: f64, y_high: f64) -> Vec<String> {
        let mut offset = V6_FIELD_OFFSET_START;
        let mut properties = vec![
            v6_property("Reference", &self.prefix, 0, y_high + offset, false),
            v6_property("Value", &self.name, 1, y_low - offset, false),
        ];

        let optional = [
            ("Footprint", &self.package, 2),
            ("Datasheet", &self.datasheet, 3),
            ("Manufacturer", &self.manufacturer, 4),
            ("LCSC Part", &self.lcsc_id, 5),
            ("JLC Part", &self.jlc_id, 6),
        ];
        for (key, value, id) in optional {
            if let Some(value) = value {
                offset += V6_FIELD_OFFSET_INCREMENT;
                properties.push(v6_property(key, value, id, y_low - offset, true));
            }
        }
        properties
    }
}

fn v6_property(key: &str, value: &str, id: u32, pos_y: f64, hide: bool) -> String {
    format!(
        "(property\n  \"{}\"\n  \"{}\"\n  (id {})\n  (at 0 {} 0)\n  (effects (font (size {} {}) ) {})\n)",
        key,
        value,
        id,
        fmt_fixed(pos_y, 2),
        V6_PROPERTY_FONT_SIZE,
        V6_PROPERTY_FONT_SIZE,
        if hide { "hide" } else { "" }
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct KiSymbolPin {
    pub name: String,
    pub number: String,
    pub style: KiPinStyle,
    pub pin_type: KiPinType,
    pub length: f64,
    /// Source rotation in degrees (0, 90, 180, 270).
    pub orientation: f64,
    pub pos_x: f64,
    pub pos_y: f64,
}

impl KiSymbolPin {
    fn v5_orientation(&self) -> &'static str {
        match self.orientation as i64 {
            90 => "D",
            180 => "R",
            270 => "U",
            _ => "L",
        }
    }

    /// The style token is always preceded by a blank, even when empty.
    pub fn export_v5(&self) -> String {
        format!(
            "X {} {} {} {} {} {} {} {} 1 1 {} {}\n",
            apply_pin_name_style(&self.name, KicadVersion::V5),
            self.number,
            fmt_int(self.pos_x),
            fmt_int(self.pos_y),
            fmt_int(self.length),
            self.v5_orientation(),
            V5_PIN_NUM_SIZE,
            V5_PIN_NAME_SIZE,
            self.pin_type.v5_code(),
            self.style.v5_code()
        )
    }

    pub fn export_v6(&self) -> String {
        format!(
            "(pin {} {}\n  (at {} {} {})\n  (length {})\n  (name \"{}\" (effects (font (size {} {}))))\n  (number \"{}\" (effects (font (size {} {}))))\n)",
            self.pin_type.v6_name(),
            self.style.v6_name(),
            fmt_fixed(self.pos_x, 2),
            fmt_fixed(self.pos_y, 2),
            fmt_int((180.0 + self.orientation) % 360.0),
            fmt_fixed(self.length, 2),
            apply_pin_name_style(&self.name, KicadVersion::V6),
            V6_PIN_TEXT_SIZE,
            V6_PIN_TEXT_SIZE,
            self.number,
            V6_PIN_TEXT_SIZE,
            V6_PIN_TEXT_SIZE
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KiSymbolRectangle {
    pub pos_x0: f64,
    pub pos_y0: f64,
    pub pos_x1: f64,
    pub pos_y1: f64,
}

impl KiSymbolRectangle {
    pub fn export_v5(&self) -> String {
        format!(
            "S {} {} {} {} 1 1 0 {}\n",
            fmt_int(self.pos_x0),
            fmt_int(self.pos_y0),
            fmt_int(self.pos_x1),
            fmt_int(self.pos_y1),
            KiBoxFill::Background.v5_code()
        )
    }

    pub fn export_v6(&self) -> String {
        format!(
            "(rectangle\n  (start {} {})\n  (end {} {})\n  {}\n  (fill (type {}))\n)",
            fmt_fixed(self.pos_x0, 2),
            fmt_fixed(self.pos_y0, 2),
            fmt_fixed(self.pos_x1, 2),
            fmt_fixed(self.pos_y1, 2),
            V6_STROKE,
            KiBoxFill::Background.v6_name()
        )
    }
}

/// Open polyline or closed polygon, depending on `is_closed`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KiSymbolPolygon {
    pub points: Vec<(f64, f64)>,
    pub is_closed: bool,
}

impl KiSymbolPolygon {
    pub fn export_v5(&self) -> String {
        let points = self
            .points
            .iter()
            .map(|(x, y)| format!("{} {}", fmt_int(*x), fmt_int(*y)))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "P {} 1 1 0 {} {}\n",
            self.points.len(),
            points,
            KiBoxFill::from_closed(self.is_closed).v5_code()
        )
    }

    pub fn export_v6(&self) -> String {
        let points = self
            .points
            .iter()
            .map(|(x, y)| format!("(xy {} {})", fmt_fixed(*x, 2), fmt_fixed(*y, 2)))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "(polyline\n  (pts\n    {}\n  )\n  {}\n  (fill (type {}))\n)",
            points,
            V6_STROKE,
            KiBoxFill::from_closed(self.is_closed).v6_name()
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KiSymbolCircle {
    pub pos_x: f64,
    pub pos_y: f64,
    pub radius: f64,
    pub background_filling: bool,
}

impl KiSymbolCircle {
    pub fn export_v5(&self) -> String {
        format!(
            "C {} {} {} 1 1 0 {}\n",
            fmt_int(self.pos_x),
            fmt_int(self.pos_y),
            fmt_int(self.radius),
            KiBoxFill::from_closed(self.background_filling).v5_code()
        )
    }

    pub fn export_v6(&self) -> String {
        format!(
            "(circle\n  (center {} {})\n  (radius {})\n  {}\n  (fill (type {}))\n)",
            fmt_fixed(self.pos_x, 2),
            fmt_fixed(self.pos_y, 2),
            fmt_fixed(self.radius, 2),
            V6_STROKE,
            KiBoxFill::from_closed(self.background_filling).v6_name()
        )
    }
}

/// Arc with everything both dialects need: v5 wants center and angles, v6
/// wants start/mid/end points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KiSymbolArc {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    /// Degrees.
    pub angle_start: f64,
    pub angle_end: f64,
    pub start_x: f64,
    pub start_y: f64,
    pub middle_x: f64,
    pub middle_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

impl KiSymbolArc {
    fn fill(&self) -> KiBoxFill {
        KiBoxFill::from_closed(self.angle_start == self.angle_end)
    }

    pub fn export_v5(&self) -> String {
        format!(
            "A {} {} {} {} {} 1 1 0 {} {} {} {} {}\n",
            fmt_int(self.center_x),
            fmt_int(self.center_y),
            fmt_int(self.radius),
            fmt_int(self.angle_start * 10.0),
            fmt_int(self.angle_end * 10.0),
            self.fill().v5_code(),
            fmt_int(self.start_x),
            fmt_int(self.start_y),
            fmt_int(self.end_x),
            fmt_int(self.end_y)
        )
    }

    pub fn export_v6(&self) -> String {
        format!(
            "(arc\n  (start {} {})\n  (mid {} {})\n  (end {} {})\n  {}\n  (fill (type {}))\n)",
            fmt_fixed(self.start_x, 2),
            fmt_fixed(self.start_y, 2),
            fmt_fixed(self.middle_x, 2),
            fmt_fixed(self.middle_y, 2),
            fmt_fixed(self.end_x, 2),
            fmt_fixed(self.end_y, 2),
            V6_STROKE,
            self.fill().v6_name()
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KiSymbol {
    pub info: KiSymbolInfo,
    pub pins: Vec<KiSymbolPin>,
    pub rectangles: Vec<KiSymbolRectangle>,
    pub circles: Vec<KiSymbolCircle>,
    pub arcs: Vec<KiSymbolArc>,
    pub polygons: Vec<KiSymbolPolygon>,
}

/// Prefixes every non-empty line with `spaces` blanks.
fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl KiSymbol {
    /// Lowest and highest pin Y, used to place the fields.
    fn pin_y_extents(&self) -> (f64, f64) {
        if self.pins.is_empty() {
            return (0.0, 0.0);
        }
        self.pins.iter().fold((f64::MAX, f64::MIN), |(low, high), pin| {
            (low.min(pin.pos_y), high.max(pin.pos_y))
        })
    }

    pub fn export(&self, version: KicadVersion) -> String {
        match version {
            KicadVersion::V5 => self.export_v5(),
            KicadVersion::V6 => self.export_v6(),
        }
    }

    /// Legacy `DEF ... ENDDEF` block.
    pub fn export_v5(&self) -> String {
        let (y_low, y_high) = self.pin_y_extents();
        let mut out = String::new();
        let _ = write!(out, "#\n# {}\n#\n", sanitize_name(&self.info.name));
        out.push_str(&self.info.export_v5(y_low, y_high));

        for pin in &self.pins {
            out.push_str(&pin.export_v5());
        }
        for rect in &self.rectangles {
            out.push_str(&rect.export_v5());
        }
        for circle in &self.circles {
            out.push_str(&circle.export_v5());
        }
        for arc in &self.arcs {
            out.push_str(&arc.export_v5());
        }
        for polygon in &self.polygons {
            out.push_str(&polygon.export_v5());
        }

        out.push_str("ENDDRAW\nENDDEF\n");
        out
    }

    /// `(symbol ...)` block indented for a `kicad_symbol_lib` file.
    pub fn export_v6(&self) -> String {
        let (y_low, y_high) = self.pin_y_extents();
        let name = sanitize_name(&self.info.name);

        let mut items: Vec<String> = Vec::new();
        items.extend(self.rectangles.iter().map(KiSymbolRectangle::export_v6));
        items.extend(self.circles.iter().map(KiSymbolCircle::export_v6));
        items.extend(self.arcs.iter().map(KiSymbolArc::export_v6));
        items.extend(self.polygons.iter().map(KiSymbolPolygon::export_v6));
        items.extend(self.pins.iter().map(KiSymbolPin::export_v6));

        let mut out = String::new();
        let _ = writeln!(out, "  (symbol \"{}\"", name);
        out.push_str("    (in_bom yes)\n    (on_board yes)\n");
        for property in self.info.export_v6(y_low, y_high) {
            out.push_str(&indent(&property, 4));
            out.push('\n');
        }
        let _ = writeln!(out, "    (symbol \"{}_0_1\"", name);
        for item in items {
            out.push_str(&indent(&item, 6));
            out.push('\n');
        }
        out.push_str("    )\n  )\n");
        out
    }
}
