use easyeda_kipm::{
    diagnostics::Diagnostics,
    easyeda_models::*,
    error::Error,
    importer::{decode_record, import_3d_model_info, import_footprint, import_symbol},
    record::{parse_flag, RecordFields},
    svg_path::{format_svg_path, parse_svg_path, SvgArc, SvgPathElement},
};
use serde_json::{json, Value};

const PIN_LINE: &str = "P~show~0~1~410~300~180~gge2~0^^410~300^^M 410 300 v -10~#880000^^1~403~304~0~VCC~end~~~#0000FF^^1~405~299~0~1~start~~~#0000FF^^1~407~300^^0~M 400 303 L 397 300 L 400 297";

fn symbol_data(shapes: Vec<&str>) -> Value {
    json!({
        "lcsc": { "number": "C2040", "url": "https://example.com/ds.pdf" },
        "dataStr": {
            "head": {
                "x": 400,
                "y": "300",
                "c_para": { "name": "RP2040", "pre": "U?", "package": "LQFN-56" }
            },
            "shape": shapes
        }
    })
}

#[test]
fn svg_path_arc_and_separators() {
    let mut diagnostics = Diagnostics::new();
    let path = parse_svg_path("M10,10 A5,5 0 0 1 20,10", &mut diagnostics);
    assert_eq!(
        path,
        vec![
            SvgPathElement::MoveTo { x: 10.0, y: 10.0 },
            SvgPathElement::EllipticalArc(SvgArc {
                radius_x: 5.0,
                radius_y: 5.0,
                x_axis_rotation: 0.0,
                large_arc: false,
                sweep: true,
                end_x: 20.0,
                end_y: 10.0,
            }),
        ]
    );
    assert!(diagnostics.is_empty());
    assert_eq!(format_svg_path(&path), "M10 10 A5 5 0 0 1 20 10");
}

#[test]
fn svg_path_repeats_argument_groups() {
    let mut diagnostics = Diagnostics::new();
    let path = parse_svg_path("M 0 0 L 1 1 2 2 Z", &mut diagnostics);
    assert_eq!(path.len(), 4);
    assert_eq!(path[2], SvgPathElement::LineTo { x: 2.0, y: 2.0 });
    assert_eq!(path[3], SvgPathElement::ClosePath);
}

#[test]
fn svg_path_unsupported_command_is_reported() {
    let mut diagnostics = Diagnostics::new();
    let path = parse_svg_path("M0 0 C 1 1 2 2 3 3", &mut diagnostics);
    assert_eq!(path, vec![SvgPathElement::MoveTo { x: 0.0, y: 0.0 }]);
    assert_eq!(diagnostics.for_kind("SVG").count(), 1);
}

#[test]
fn record_fields_treat_empty_as_absent() {
    let fields = RecordFields::parse("R~10~~abc");
    assert_eq!(fields.designator(), "R");
    assert_eq!(fields.f64(0), Some(10.0));
    assert_eq!(fields.str(1), None);
    assert_eq!(fields.f64(2), None);
    assert_eq!(fields.f64(7), None);
    assert!(matches!(
        fields.require_f64(2, "width"),
        Err(Error::ParseError(_))
    ));

    assert_eq!(parse_flag("show"), Some(true));
    assert_eq!(parse_flag("1"), Some(true));
    assert_eq!(parse_flag("0"), Some(false));
    assert_eq!(parse_flag("maybe"), None);
}

#[test]
fn pin_record_segments() {
    let mut diagnostics = Diagnostics::new();
    let record = decode_record(PIN_LINE, &mut diagnostics)
        .expect("decode")
        .expect("known designator");
    let ShapeRecord::Pin(pin) = record else {
        panic!("expected a pin, got {:?}", record);
    };
    assert_eq!(pin.spice_pin_number, "1");
    assert_eq!((pin.pos_x, pin.pos_y, pin.rotation), (410.0, 300.0, 180.0));
    assert_eq!(pin.path, "M 410 300 h -10");
    assert_eq!(pin.name.text, "VCC");
    assert_eq!(pin.dot.is_displayed, Some(true));
    assert_eq!(pin.clock.is_displayed, Some(false));
    assert_eq!(pin.pin_type, EasyedaPinType::Unspecified);
}

#[test]
fn unknown_designator_decodes_to_none() {
    let mut diagnostics = Diagnostics::new();
    assert!(decode_record("ZZZ~1~2~3", &mut diagnostics)
        .expect("decode")
        .is_none());
}

#[test]
fn encoded_records_decode_to_the_same_value() {
    let lines = [
        PIN_LINE,
        "R~405~295~~~10~20~#880000~1~0~none~gge1~0",
        "C~410~310~5~#880000~1~0~#FF0000~gge3~0",
        "A~M 10 10 A 5 5 0 0 1 20 10~~#880000~1~0~none~gge4~0",
        "PG~400 300 410 300 410 310~#880000~1~0~#880000~gge5~0",
        "E~400~300~10~5~#880000~1~0~none~gge9~0",
        "PL~400 300 410 300 410 310~#880000~1~0~none~gge10~0",
        "PT~M 400 300 L 410 300 Z~#880000~1~0~none~gge11~0",
        "PAD~RECT~4000~3000~6~3~1~GND~1~0~~90~gge6~0~~Y~0",
        "PAD~OVAL~4000.5~3000.25~6.1~3~11~~2~0.5~~45~gge12~4~~N~1",
        "TRACK~1~3~~3990 2990 4010 2990 4010 3010~gge7~0",
        "HOLE~4000~3000~2~gge13~0",
        "VIA~4000~3000~2.4~~0.6~gge14~0",
        "CIRCLE~4000~3000~5~0.5~3~gge15~0",
        "RECT~3990~2990~20~20~0.5~gge16~3~0",
        "ARC~1~3~~M 3990 3000 A 10 10 0 0 1 4010 3000~~gge17~0",
        "TEXT~N~4000~2980~0.8~0~0~3~~4.5~R1~M 1 1~1~gge8~0",
    ];
    let mut diagnostics = Diagnostics::new();
    for line in lines {
        let first = decode_record(line, &mut diagnostics)
            .expect("decode")
            .expect("known designator");
        let encoded = first.to_line();
        assert!(encoded.starts_with(&format!("{}~", first.designator())));
        let second = decode_record(&encoded, &mut diagnostics)
            .expect("decode again")
            .expect("known designator");
        assert_eq!(first, second, "round trip of {}", line);
    }
    assert!(diagnostics.is_empty());
}

#[test]
fn pad_plating_flag_survives_encoding() {
    let mut diagnostics = Diagnostics::new();
    for (line, plated, field) in [
        ("PAD~RECT~4000~3000~6~3~1~GND~1~0~~90~gge6~0~~Y~0", true, "~Y~"),
        ("PAD~OVAL~4000.5~3000.25~6.1~3~11~~2~0.5~~45~gge12~4~~n~1", false, "~N~"),
    ] {
        let record = decode_record(line, &mut diagnostics)
            .expect("decode")
            .expect("known designator");
        let ShapeRecord::Pad(pad) = &record else {
            panic!("expected a pad, got {:?}", record);
        };
        assert_eq!(pad.is_plated, Some(plated), "plating of {}", line);
        assert!(record.to_line().contains(field), "encoded {}", record.to_line());
    }
    assert_eq!(parse_flag("Y"), Some(true));
    assert_eq!(parse_flag("y"), Some(true));
    assert_eq!(parse_flag("N"), Some(false));
    assert_eq!(parse_flag("SHOW"), Some(true));
}

#[test]
fn import_symbol_skips_bad_shapes_with_warnings() {
    let data = symbol_data(vec![
        "R~405~295~~~10~20~#880000~1~0~none~gge1~0",
        "ZZZ~1~2~3",
        "R~abc~1",
        "HOLE~4000~3000~2~gge9~0",
        PIN_LINE,
    ]);
    let mut diagnostics = Diagnostics::new();
    let symbol = import_symbol(&data, &mut diagnostics).expect("import");

    assert_eq!(symbol.shape_count(), 2);
    assert_eq!(symbol.rectangles.len(), 1);
    assert_eq!(symbol.pins.len(), 1);
    assert_eq!(diagnostics.len(), 3);
    assert_eq!(diagnostics.for_kind("ZZZ").count(), 1);
    assert_eq!(diagnostics.for_kind("HOLE").count(), 1);

    assert_eq!(symbol.info.name, "RP2040");
    assert_eq!(symbol.info.prefix, "U?");
    assert_eq!(symbol.info.lcsc_id.as_deref(), Some("C2040"));
    assert_eq!(symbol.bbox.x, 400.0);
    assert_eq!(symbol.bbox.y, 300.0);
}

#[test]
fn missing_shape_list_is_an_error() {
    let mut diagnostics = Diagnostics::new();
    let result = import_symbol(&json!({ "lcsc": { "number": "C1" } }), &mut diagnostics);
    match result {
        Err(Error::MissingData { component, .. }) => assert_eq!(component, "C1"),
        other => panic!("expected missing data, got {:?}", other.map(|s| s.shape_count())),
    }
}

#[test]
fn footprint_import_reads_model_node() {
    let data = json!({
        "SMT": true,
        "packageDetail": {
            "title": "R0805",
            "dataStr": {
                "head": { "x": 4000, "y": 3000, "c_para": { "package": "R0805" } },
                "shape": [
                    "PAD~RECT~3990~3000~4~5~1~~1~0~~0~gge1~0~~Y~0",
                    "SOLIDREGION~3~~M 0 0 L 1 1 Z~solid~gge2~~~~0",
                    "SVGNODE~{\"gId\":\"g1\",\"nodeName\":\"g\",\"nodeType\":1,\"layerid\":\"19\",\"attrs\":{\"c_width\":\"8\",\"c_height\":\"5\",\"c_rotation\":\"0,0,90\",\"z\":\"0\",\"c_origin\":\"4000,3000\",\"uuid\":\"abc123\",\"c_etype\":\"outline3D\",\"id\":\"g1\",\"title\":\"R0805_L2.0\",\"layerid\":\"19\",\"transform\":\"scale(1) translate(0, 0)\"},\"childNodes\":[]}"
                ]
            }
        }
    });

    let mut diagnostics = Diagnostics::new();
    let footprint = import_footprint(&data, &mut diagnostics).expect("import");
    assert_eq!(footprint.info.name, "R0805");
    assert_eq!(footprint.info.fp_type, FootprintType::Smd);
    assert_eq!(footprint.pads.len(), 1);
    assert_eq!(diagnostics.for_kind("SOLIDREGION").count(), 1);

    let model = footprint.model_3d.expect("model node");
    assert_eq!(model.uuid, "abc123");
    assert_eq!(model.name, "R0805_L2.0");
    assert_eq!(model.rotation, (0.0, 0.0, 90.0));
    assert_eq!(model.width, Some(8.0));

    let info = import_3d_model_info(&data).expect("model info");
    assert_eq!(info.map(|m| m.uuid), Some("abc123".to_string()));
}
