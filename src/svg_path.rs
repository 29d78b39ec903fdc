// src/svg_path.rs

//! Parser for the small SVG path subset EasyEDA uses in arc and path records.

use crate::diagnostics::Diagnostics;
use std::fmt::Write;

/// Endpoint parameterisation of an elliptical arc (`A` command).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgArc {
    pub radius_x: f64,
    pub radius_y: f64,
    pub x_axis_rotation: f64,
    pub large_arc: bool,
    pub sweep: bool,
    pub end_x: f64,
    pub end_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SvgPathElement {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    EllipticalArc(SvgArc),
    ClosePath,
}

impl SvgPathElement {
    fn command(&self) -> char {
        match self {
            SvgPathElement::MoveTo { .. } => 'M',
            SvgPathElement::LineTo { .. } => 'L',
            SvgPathElement::EllipticalArc(_) => 'A',
            SvgPathElement::ClosePath => 'Z',
        }
    }
}

/// Number of arguments each supported command consumes.
fn command_arity(command: char) -> Option<usize> {
    match command {
        'M' | 'L' => Some(2),
        'A' => Some(7),
        'Z' => Some(0),
        _ => None,
    }
}

/// Parses an SVG path string into its command list.
///
/// Arguments may be separated by commas or whitespace. A command letter
/// followed by several argument groups (`L 1 2 3 4`) expands to one element
/// per group. Unsupported commands and incomplete groups are reported to
/// `diagnostics` and skipped.
pub fn parse_svg_path(path: &str, diagnostics: &mut Diagnostics) -> Vec<SvgPathElement> {
    let normalized = path.replace(',', " ");
    let mut elements = Vec::new();

    for (command, args) in split_commands(&normalized) {
        let Some(arity) = command_arity(command) else {
            diagnostics.warn("SVG", format!("SVG command \"{}\" not supported", command));
            continue;
        };
        if arity == 0 {
            elements.push(SvgPathElement::ClosePath);
            continue;
        }

        let tokens: Vec<&str> = args.split_whitespace().collect();
        for group in tokens.chunks(arity) {
            if group.len() < arity {
                diagnostics.warn(
                    "SVG",
                    format!("Incomplete arguments for SVG command \"{}\": {:?}", command, group),
                );
                continue;
            }
            match build_element(command, group) {
                Some(element) => elements.push(element),
                None => diagnostics.warn(
                    "SVG",
                    format!("Unparseable arguments for SVG command \"{}\": {:?}", command, group),
                ),
            }
        }
    }

    elements
}

/// Splits a path into `(command letter, raw argument text)` pairs.
fn split_commands(path: &str) -> Vec<(char, &str)> {
    let mut commands = Vec::new();
    let mut current: Option<(char, usize)> = None;

    for (idx, ch) in path.char_indices() {
        // `e` belongs to exponent notation, not a command.
        if ch.is_ascii_alphabetic() && !matches!(ch, 'e' | 'E') {
            if let Some((command, start)) = current.take() {
                commands.push((command, &path[start..idx]));
            }
            current = Some((ch, idx + ch.len_utf8()));
        }
    }
    if let Some((command, start)) = current {
        commands.push((command, &path[start..]));
    }
    commands
}

fn build_element(command: char, args: &[&str]) -> Option<SvgPathElement> {
    let num = |i: usize| args[i].parse::<f64>().ok();
    let flag = |i: usize| args[i] == "1";

    match command {
        'M' => Some(SvgPathElement::MoveTo { x: num(0)?, y: num(1)? }),
        'L' => Some(SvgPathElement::LineTo { x: num(0)?, y: num(1)? }),
        'A' => Some(SvgPathElement::EllipticalArc(SvgArc {
            radius_x: num(0)?,
            radius_y: num(1)?,
            x_axis_rotation: num(2)?,
            large_arc: flag(3),
            sweep: flag(4),
            end_x: num(5)?,
            end_y: num(6)?,
        })),
        _ => None,
    }
}

/// Serialises elements back into EasyEDA's path notation.
pub fn format_svg_path(elements: &[SvgPathElement]) -> String {
    let mut out = String::new();
    for element in elements {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push(element.command());
        match element {
            SvgPathElement::MoveTo { x, y } | SvgPathElement::LineTo { x, y } => {
                let _ = write!(out, "{} {}", x, y);
            }
            SvgPathElement::EllipticalArc(arc) => {
                let _ = write!(
                    out,
                    "{} {} {} {} {} {} {}",
                    arc.radius_x,
                    arc.radius_y,
                    arc.x_axis_rotation,
                    arc.large_arc as u8,
                    arc.sweep as u8,
                    arc.end_x,
                    arc.end_y
                );
            }
            SvgPathElement::ClosePath => {}
        }
    }
    out
}
