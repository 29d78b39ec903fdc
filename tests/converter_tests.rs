use easyeda_kipm::{
    converter::{convert_footprint, convert_symbol},
    diagnostics::Diagnostics,
    easyeda_models::*,
    svg_path::{SvgArc, SvgPathElement},
    units::{BoundingBoxOrigin, KicadVersion},
};

fn pin(number: &str, pos_x: f64, rotation: f64, path: &str) -> EeSymbolPin {
    EeSymbolPin {
        spice_pin_number: number.to_string(),
        pos_x,
        pos_y: 300.0,
        rotation,
        path: path.to_string(),
        name: EeSymbolPinName {
            text: number.to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn resistor_symbol() -> EeSymbol {
    EeSymbol {
        info: EeSymbolInfo {
            name: "TEST R".to_string(),
            prefix: "R?".to_string(),
            package: Some("0805".to_string()),
            lcsc_id: Some("C1234".to_string()),
            ..Default::default()
        },
        bbox: BoundingBoxOrigin::new(400.0, 300.0),
        pins: vec![
            pin("1", 410.0, 180.0, "M 410 300 h -10"),
            pin("2", 390.0, 0.0, "M 390 300 h 10"),
        ],
        rectangles: vec![EeSymbolRectangle {
            pos_x: 395.0,
            pos_y: 295.0,
            width: 10.0,
            height: 10.0,
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn half_circle_arc() -> EeSymbolArc {
    EeSymbolArc {
        path: vec![
            SvgPathElement::MoveTo { x: 410.0, y: 300.0 },
            SvgPathElement::EllipticalArc(SvgArc {
                radius_x: 10.0,
                radius_y: 10.0,
                x_axis_rotation: 0.0,
                large_arc: false,
                sweep: true,
                end_x: 390.0,
                end_y: 300.0,
            }),
        ],
        ..Default::default()
    }
}

#[test]
fn test_symbol_conversion_v5() {
    let mut diagnostics = Diagnostics::new();
    let ki_symbol = convert_symbol(&resistor_symbol(), KicadVersion::V5, "lib", &mut diagnostics);
    assert_eq!(ki_symbol.pins.len(), 2, "Expected two pins in converted symbol");
    assert_eq!(ki_symbol.info.prefix, "R");

    let text = ki_symbol.export(KicadVersion::V5);
    assert!(text.starts_with("#\n# TESTR\n#\nDEF TESTR R 0 40 Y Y 1 L N\n"));
    assert!(text.contains("F0 \"R\" 0 200 60 H V C CNN\n"));
    assert!(text.contains("F1 \"TEST R\" 0 -200 60 H V C CNN\n"));
    assert!(text.contains("F2 \"lib:0805\" 0 -300 60 H I C CNN\n"));
    assert!(text.contains("F6 \"C1234\" 0 0 0 H I C CNN \"LCSC Part\"\n"));
    assert!(text.contains("X 1 1 100 0 100 R 50 50 1 1 U \n"));
    assert!(text.contains("X 2 2 -100 0 100 L 50 50 1 1 U \n"));
    assert!(text.contains("S -50 50 50 -50 1 1 0 f\n"));
    assert!(text.ends_with("ENDDRAW\nENDDEF\n"));
    assert!(diagnostics.is_empty());
}

#[test]
fn v5_pin_lines_carry_the_style_token() {
    let mut symbol = resistor_symbol();
    symbol.pins[0].dot.is_displayed = Some(true);
    symbol.pins[1].clock.is_displayed = Some(true);

    let mut diagnostics = Diagnostics::new();
    let text = convert_symbol(&symbol, KicadVersion::V5, "lib", &mut diagnostics)
        .export(KicadVersion::V5);
    assert!(text.contains("X 1 1 100 0 100 R 50 50 1 1 U I\n"));
    assert!(text.contains("X 2 2 -100 0 100 L 50 50 1 1 U C\n"));
}

#[test]
fn test_symbol_conversion_v6() {
    let mut diagnostics = Diagnostics::new();
    let ki_symbol = convert_symbol(&resistor_symbol(), KicadVersion::V6, "lib", &mut diagnostics);
    let text = ki_symbol.export(KicadVersion::V6);

    assert!(text.starts_with("  (symbol \"TESTR\"\n    (in_bom yes)\n    (on_board yes)\n"));
    assert!(text.contains("(at 0 5.08 0)"));
    assert!(text.contains("\"lib:0805\""));
    assert!(text.contains("(symbol \"TESTR_0_1\""));
    assert!(text.contains("(pin unspecified line\n        (at 2.54 -0.00 0)\n        (length 2.54)"));
    assert!(text.contains("(at -2.54 -0.00 180)"));
    assert!(text.contains("(start -1.27 1.27)\n        (end 1.27 -1.27)"));
    assert!(text.ends_with("    )\n  )\n"));

    // Rectangles come before pins in the modern dialect.
    let rect_at = text.find("(rectangle").expect("rectangle");
    let pin_at = text.find("(pin ").expect("pin");
    assert!(rect_at < pin_at);
}

#[test]
fn symbol_arc_is_flipped_upward() {
    let mut symbol = resistor_symbol();
    symbol.arcs.push(half_circle_arc());
    let mut diagnostics = Diagnostics::new();

    let v6 = convert_symbol(&symbol, KicadVersion::V6, "lib", &mut diagnostics);
    assert_eq!(v6.arcs.len(), 1);
    let arc = &v6.arcs[0];
    assert!((arc.middle_y + 2.54).abs() < 1e-9, "mid y {}", arc.middle_y);
    assert!(arc.middle_x.abs() < 1e-9);
    assert!(v6.export(KicadVersion::V6).contains("(mid 0.00 -2.54)"));

    let v5 = convert_symbol(&symbol, KicadVersion::V5, "lib", &mut diagnostics);
    assert!(v5
        .export(KicadVersion::V5)
        .contains("A 0 0 100 0 -1800 1 1 0 N 100 0 -100 0\n"));
    assert!(diagnostics.is_empty());
}

#[test]
fn unsupported_symbol_shapes_are_reported() {
    let mut symbol = resistor_symbol();
    symbol.ellipses.push(EeSymbolEllipse {
        center_x: 400.0,
        center_y: 300.0,
        radius_x: 5.0,
        radius_y: 3.0,
        ..Default::default()
    });
    symbol.ellipses.push(EeSymbolEllipse {
        center_x: 400.0,
        center_y: 300.0,
        radius_x: 5.0,
        radius_y: 5.0,
        ..Default::default()
    });
    symbol.polylines.push(EeSymbolPolyline::default());
    symbol.arcs.push(EeSymbolArc {
        path: vec![SvgPathElement::MoveTo { x: 0.0, y: 0.0 }],
        ..Default::default()
    });

    let mut diagnostics = Diagnostics::new();
    let ki_symbol = convert_symbol(&symbol, KicadVersion::V5, "lib", &mut diagnostics);
    assert_eq!(ki_symbol.circles.len(), 1);
    assert!(ki_symbol.arcs.is_empty());
    assert!(ki_symbol.polygons.is_empty());
    assert_eq!(diagnostics.for_kind("E").count(), 1);
    assert_eq!(diagnostics.for_kind("PL").count(), 1);
    assert_eq!(diagnostics.for_kind("A").count(), 1);
}

#[test]
fn symbol_paths_and_polygons_close() {
    let mut symbol = resistor_symbol();
    symbol.paths.push(EeSymbolPath {
        paths: "M 400 300 L 410 300 L 410 310 Z".to_string(),
        ..Default::default()
    });
    symbol.polygons.push(EeSymbolPolyline {
        points: vec![(400.0, 300.0), (410.0, 300.0), (410.0, 310.0)],
        ..Default::default()
    });
    symbol.polylines.push(EeSymbolPolyline {
        points: vec![(400.0, 300.0), (410.0, 300.0)],
        ..Default::default()
    });

    let mut diagnostics = Diagnostics::new();
    let ki_symbol = convert_symbol(&symbol, KicadVersion::V5, "lib", &mut diagnostics);
    assert_eq!(ki_symbol.polygons.len(), 3);
    assert!(ki_symbol.polygons[0].is_closed);
    assert!(ki_symbol.polygons[2].is_closed);
    assert!(!ki_symbol.polygons[1].is_closed);

    let text = ki_symbol.export(KicadVersion::V5);
    assert!(text.contains("P 4 1 1 0 0 0 100 0 100 -100 0 0 f\n"));
    assert!(text.contains("P 2 1 1 0 0 0 100 0 N\n"));
}

fn test_footprint() -> EeFootprint {
    EeFootprint {
        info: EeFootprintInfo {
            name: "R0805".to_string(),
            fp_type: FootprintType::Smd,
            ..Default::default()
        },
        bbox: BoundingBoxOrigin::new(4000.0, 3000.0),
        pads: vec![
            EeFootprintPad {
                shape: "RECT".to_string(),
                center_x: 3990.0,
                center_y: 3000.0,
                width: 4.0,
                height: 5.0,
                layer_id: Some(1),
                number: "1".to_string(),
                rotation: 270.0,
                ..Default::default()
            },
            EeFootprintPad {
                shape: "OVAL".to_string(),
                center_x: 4010.0,
                center_y: 3000.0,
                width: 6.0,
                height: 8.0,
                layer_id: Some(11),
                number: "P(2)".to_string(),
                hole_radius: 1.0,
                hole_length: Some(4.0),
                ..Default::default()
            },
        ],
        tracks: vec![EeFootprintTrack {
            stroke_width: 1.0,
            layer_id: Some(3),
            points: vec![3990.0, 2990.0, 4010.0, 2990.0, 4010.0, 3010.0],
            ..Default::default()
        }],
        holes: vec![EeFootprintHole {
            center_x: 4000.0,
            center_y: 3000.0,
            radius: 2.0,
            ..Default::default()
        }],
        texts: vec![EeFootprintText {
            text_type: "N".to_string(),
            center_x: 4000.0,
            center_y: 3000.0,
            layer_id: Some(3),
            text: "R1".to_string(),
            is_displayed: Some(false),
            ..Default::default()
        }],
        ..Default::default()
    }
}

#[test]
fn test_footprint_conversion() {
    let mut diagnostics = Diagnostics::new();
    let kicad_fp = convert_footprint(&test_footprint(), &mut diagnostics);
    assert_eq!(kicad_fp.pads.len(), 2, "Expected two pads in converted footprint");
    assert_eq!(kicad_fp.pads[1].number, "2", "Pad number comes from the parentheses");
    assert_eq!(kicad_fp.lines.len(), 2);

    let text = kicad_fp.export("lib", "${KIPRJMOD}/lib.3dshapes");
    assert!(text.starts_with("(module lib:R0805 (layer F.Cu) (tedit 5DC5F6A4)\n\t(attr smd)\n"));
    assert!(text.contains("\t(fp_text reference REF** (at 0 -4.0) (layer F.SilkS)\n"));
    assert!(text.contains("\t(fp_text value R0805 (at 0 4.0) (layer F.Fab)\n"));
    assert!(text.contains(
        "\t(pad 1 smd rect (at -2.54 0.00 -90.00) (size 1.02 1.27) (layers F.Cu F.Paste F.Mask))\n"
    ));
    assert!(text.contains(
        "\t(pad 2 thru_hole oval (at 2.54 0.00 0.00) (size 1.52 2.03) (layers *.Cu *.Mask) (drill oval 0.508 1.016))\n"
    ));
    assert!(text.contains("\t(fp_line (start -2.54 -2.54) (end 2.54 -2.54) (layer F.SilkS) (width 0.25))\n"));
    assert!(text.contains("\t(fp_line (start 2.54 -2.54) (end 2.54 2.54) (layer F.SilkS) (width 0.25))\n"));
    assert!(text.contains("\t(pad \"\" thru_hole circle (at 0.00 0.00) (size 1.02 1.02) (drill 1.02) (layers *.Cu *.Mask))\n"));
    assert!(text.contains("\t(fp_text user R1 (at 0.00 0.00 0.00) (layer F.Fab) hide\n"));
    assert_eq!(text.matches("(layer F.CrtYd)").count(), 4);
    assert!(!text.contains("(model"));
    assert!(text.ends_with(')'));
    assert!(diagnostics.is_empty());
}

#[test]
fn footprint_extents_cover_every_placed_shape() {
    let mut diagnostics = Diagnostics::new();
    let kicad_fp = convert_footprint(&test_footprint(), &mut diagnostics);
    let extents = kicad_fp.extents().expect("extents");
    assert!((extents.min_x + 3.048).abs() < 1e-6);
    assert!((extents.max_x - 3.302).abs() < 1e-6);
    assert!((extents.min_y + 2.54).abs() < 1e-6);
    assert!((extents.max_y - 2.54).abs() < 1e-6);
}

#[test]
fn footprint_y_is_not_flipped() {
    let mut footprint = test_footprint();
    footprint.pads.truncate(1);
    footprint.pads[0].center_y = 3010.0;
    footprint.tracks.clear();
    footprint.holes.clear();
    footprint.texts.clear();

    let mut diagnostics = Diagnostics::new();
    let kicad_fp = convert_footprint(&footprint, &mut diagnostics);
    assert!(kicad_fp.pads[0].pos_y > 0.0);

    let text = kicad_fp.export("lib", "models");
    assert!(text.contains("(at -2.54 2.54 -90.00)"));
}

#[test]
fn custom_pad_outline_is_relative_to_pad() {
    let footprint = EeFootprint {
        info: EeFootprintInfo {
            name: "CUSTOM".to_string(),
            ..Default::default()
        },
        bbox: BoundingBoxOrigin::new(4000.0, 3000.0),
        pads: vec![
            EeFootprintPad {
                shape: "POLYGON".to_string(),
                center_x: 4000.0,
                center_y: 3000.0,
                width: 4.0,
                height: 4.0,
                layer_id: Some(1),
                number: "1".to_string(),
                points: vec![3990.0, 2990.0, 4010.0, 2990.0, 4010.0, 3010.0],
                rotation: 90.0,
                ..Default::default()
            },
            EeFootprintPad {
                shape: "POLYGON".to_string(),
                center_x: 4000.0,
                center_y: 3000.0,
                width: 4.0,
                height: 4.0,
                layer_id: Some(1),
                number: "2".to_string(),
                ..Default::default()
            },
        ],
        ..Default::default()
    };

    let mut diagnostics = Diagnostics::new();
    let kicad_fp = convert_footprint(&footprint, &mut diagnostics);
    let text = kicad_fp.export("lib", "models");
    assert!(text.contains("\t(pad 1 smd custom (at 0.00 0.00 0.00) (size 0.01 0.01) (layers F.Cu F.Paste F.Mask)"));
    assert!(text.contains("(pts (xy -2.54 -2.54)(xy 2.54 -2.54)(xy 2.54 2.54)"));
    assert!(text.contains("(width 0.1)"));
    assert!(kicad_fp.pads[1].polygon.is_none());
    assert_eq!(diagnostics.for_kind("PAD").count(), 1);
}
