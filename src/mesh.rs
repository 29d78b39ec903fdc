// src/mesh.rs

//! OBJ mesh text to VRML 2.0 translation.

use crate::diagnostics::Diagnostics;
use crate::pose::MeshBounds;
use glam::DVec3;
use std::collections::HashMap;
use std::fmt::Write;

/// OBJ coordinates are mm; VRML units in KiCad are 2.54 mm.
pub const VRML_UNIT_MM: f64 = 2.54;

pub const VRML_HEADER: &str = "#VRML V2.0 utf8\n# 3D model generated by easyeda_kipm\n";

const DEFAULT_COLOR: &str = "0.8";

/// RGB components exactly as written in the OBJ text.
pub type ColorTokens = [String; 3];

fn default_color() -> ColorTokens {
    [DEFAULT_COLOR.to_string(), DEFAULT_COLOR.to_string(), DEFAULT_COLOR.to_string()]
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub ambient: ColorTokens,
    pub diffuse: ColorTokens,
    pub specular: ColorTokens,
    pub transparency: f64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: default_color(),
            diffuse: default_color(),
            specular: default_color(),
            transparency: 0.0,
        }
    }
}

/// One `usemtl` group with its own compact vertex numbering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshShape {
    pub material: String,
    /// Global vertex indices (0-based), in the order first referenced.
    pub points: Vec<usize>,
    /// Local indices per face, each list terminated by `-1`.
    pub coord_index: Vec<Vec<i64>>,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub materials: HashMap<String, Material>,
    /// Vertices already divided by [`VRML_UNIT_MM`], in OBJ order. Malformed
    /// vertex lines hold `None` so later indices still line up.
    pub vertices: Vec<Option<DVec3>>,
    pub shapes: Vec<MeshShape>,
}

impl Mesh {
    pub fn parse(obj: &str, diagnostics: &mut Diagnostics) -> Self {
        let materials = parse_materials(obj, diagnostics);
        let vertices = parse_vertices(obj, diagnostics);
        let shapes = parse_shapes(obj, &vertices);
        log::debug!(
            "Parsed mesh: {} materials, {} vertices, {} shapes",
            materials.len(),
            vertices.len(),
            shapes.len()
        );
        Self {
            materials,
            vertices,
            shapes,
        }
    }

    /// Bounds in mm, or `None` for a mesh without vertices.
    pub fn bounds_mm(&self) -> Option<MeshBounds> {
        MeshBounds::from_points(self.vertices.iter().flatten().map(|v| *v * VRML_UNIT_MM))
    }

    pub fn to_vrml(&self, diagnostics: &mut Diagnostics) -> String {
        let mut out = String::from(VRML_HEADER);

        for shape in &self.shapes {
            let material = match self.materials.get(&shape.material) {
                Some(material) => material.clone(),
                None => {
                    diagnostics.warn(
                        "MESH",
                        format!("Unknown material '{}', using default grey", shape.material),
                    );
                    Material::default()
                }
            };

            let mut points: Vec<String> = shape
                .points
                .iter()
                .filter_map(|&i| self.vertices.get(i).copied().flatten())
                .map(format_vertex)
                .collect();
            // The last point is written twice, right before itself.
            if let Some(last) = points.last().cloned() {
                points.insert(points.len() - 1, last);
            }

            let coord_index: String = shape
                .coord_index
                .iter()
                .map(|face| {
                    let mut joined = face
                        .iter()
                        .map(|i| i.to_string())
                        .collect::<Vec<_>>()
                        .join(",");
                    joined.push(',');
                    joined
                })
                .collect();

            let _ = write!(
                out,
                "\nShape{{\n    appearance Appearance {{\n        material  Material \t{{\n            diffuseColor {}\n            specularColor {}\n            ambientIntensity 0.2\n            transparency 0\n            shininess 0.5\n        }}\n    }}\n    geometry IndexedFaceSet {{\n        ccw TRUE\n        solid FALSE\n        coord DEF co Coordinate {{\n            point [\n                {}\n            ]\n        }}\n        coordIndex [\n            {}\n        ]\n    }}\n}}",
                format_color(&material.diffuse),
                format_color(&material.specular),
                points.join(", "),
                coord_index
            );
        }

        out
    }
}

/// Keeps the three tokens verbatim once they are known to be numbers.
fn parse_color(parts: &[&str]) -> Option<ColorTokens> {
    let [r, g, b] = parts.get(..3)? else {
        return None;
    };
    for token in [r, g, b] {
        token.parse::<f64>().ok()?;
    }
    Some([r.to_string(), g.to_string(), b.to_string()])
}

fn format_color(color: &ColorTokens) -> String {
    color.join(" ")
}

/// Reads `newmtl ... endmtl` blocks.
fn parse_materials(obj: &str, diagnostics: &mut Diagnostics) -> HashMap<String, Material> {
    let mut materials = HashMap::new();
    let mut current: Option<(String, Material)> = None;

    for line in obj.lines().map(str::trim) {
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };
        let args: Vec<&str> = parts.collect();

        match keyword {
            "newmtl" => {
                let name = args.first().copied().unwrap_or_default().to_string();
                current = Some((name, Material::default()));
            }
            "endmtl" => {
                if let Some((name, material)) = current.take() {
                    if !name.is_empty() {
                        materials.insert(name, material);
                    }
                }
            }
            "Ka" | "Kd" | "Ks" => {
                let Some((name, material)) = current.as_mut() else {
                    continue;
                };
                let Some(color) = parse_color(&args) else {
                    diagnostics.warn("MESH", format!("Bad {} color in material '{}'", keyword, name));
                    continue;
                };
                match keyword {
                    "Ka" => material.ambient = color,
                    "Kd" => material.diffuse = color,
                    _ => material.specular = color,
                }
            }
            "d" => {
                if let Some((_, material)) = current.as_mut() {
                    if let Some(value) = args.first().and_then(|v| v.parse().ok()) {
                        material.transparency = value;
                    }
                }
            }
            _ => {}
        }
    }

    materials
}

fn parse_vertices(obj: &str, diagnostics: &mut Diagnostics) -> Vec<Option<DVec3>> {
    let mut vertices = Vec::new();
    for line in obj.lines() {
        let Some(coords) = line.strip_prefix("v ") else {
            continue;
        };
        let values: Vec<f64> = coords
            .split_whitespace()
            .filter_map(|c| c.parse().ok())
            .collect();
        if values.len() < 3 {
            diagnostics.warn("MESH", format!("Malformed vertex line '{}'", line.trim()));
            vertices.push(None);
            continue;
        }
        vertices.push(Some(DVec3::new(values[0], values[1], values[2]) / VRML_UNIT_MM));
    }
    vertices
}

/// Groups faces by `usemtl` lines and rebuilds a per-shape vertex
/// numbering. The first reference to an OBJ index claims the next local
/// index; references to missing or malformed vertices are dropped. Faces
/// before the first `usemtl` belong to no shape.
fn parse_shapes(obj: &str, vertices: &[Option<DVec3>]) -> Vec<MeshShape> {
    let mut shapes: Vec<MeshShape> = Vec::new();
    let mut link: HashMap<usize, i64> = HashMap::new();

    for line in obj.lines().map(str::trim) {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("usemtl") => {
                let material = line["usemtl".len()..].trim().to_string();
                shapes.push(MeshShape {
                    material,
                    ..Default::default()
                });
                link.clear();
            }
            Some("f") => {
                let Some(shape) = shapes.last_mut() else {
                    continue;
                };
                let mut face = Vec::new();
                for token in parts {
                    let Some(index) = token
                        .split('/')
                        .next()
                        .and_then(|i| i.parse::<usize>().ok())
                    else {
                        continue;
                    };
                    if let Some(&local) = link.get(&index) {
                        face.push(local);
                    } else if index >= 1 && vertices.get(index - 1).is_some_and(Option::is_some) {
                        let local = shape.points.len() as i64;
                        link.insert(index, local);
                        shape.points.push(index - 1);
                        face.push(local);
                    }
                }
                face.push(-1);
                shape.coord_index.push(face);
            }
            _ => {}
        }
    }
    shapes
}

/// Four decimals, trailing zeros dropped, at least one decimal digit.
/// Negative values that round to zero stay `-0.0`.
pub fn format_vrml_coord(value: f64) -> String {
    let fixed = format!("{:.4}", value);
    let trimmed = fixed.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}

fn format_vertex(v: DVec3) -> String {
    format!(
        "{} {} {}",
        format_vrml_coord(v.x),
        format_vrml_coord(v.y),
        format_vrml_coord(v.z)
    )
}

/// Convenience entry point: OBJ text in, VRML text out.
pub fn translate_mesh(obj: &str, diagnostics: &mut Diagnostics) -> String {
    Mesh::parse(obj, diagnostics).to_vrml(diagnostics)
}
