// src/lib.rs

pub mod api;
pub mod arc;
pub mod converter;
pub mod diagnostics;
pub mod easyeda_models;
pub mod error;
pub mod file_writer;
pub mod importer;
pub mod kicad_models;
pub mod mesh;
pub mod pose;
pub mod record;
pub mod svg_path;
pub mod units;

use crate::api::{CadSource, EasyedaApi};
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::kicad_models::{sanitize_name, Ki3dModel};
use crate::mesh::Mesh;
use crate::pose::Pose;
use crate::units::KicadVersion;
use bytes::Bytes;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// Output settings shared by every component of a run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub kicad_version: KicadVersion,
    pub library_name: String,
    /// Directory the footprint's model reference points into.
    pub model_3d_path: Option<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            kicad_version: KicadVersion::V6,
            library_name: "easyeda2kicad".to_string(),
            model_3d_path: None,
        }
    }
}

impl ConvertOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn model_dir(&self) -> String {
        self.model_3d_path
            .clone()
            .unwrap_or_else(|| format!("${{KIPRJMOD}}/{}.3dshapes", self.library_name))
    }
}

/// Everything fetched for one component.
#[derive(Debug, Clone, Default)]
pub struct CadSnapshot {
    pub cad_data: Value,
    pub raw_mesh: Option<String>,
    pub step: Option<Bytes>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedSymbol {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedFootprint {
    pub name: String,
    pub text: String,
}

/// Result of converting one component. Nothing here has touched the disk.
#[derive(Debug, Clone)]
pub struct ConvertedComponent {
    pub component_id: String,
    pub symbol: ConvertedSymbol,
    pub footprint: Option<ConvertedFootprint>,
    pub model: Option<Ki3dModel>,
    /// Model placement; `None` without 3D placement metadata.
    pub pose: Option<Pose>,
    pub diagnostics: Diagnostics,
}

/// Converts an already fetched snapshot. `pose` is the starting placement the
/// footprint and 3D contributions are accumulated onto.
pub fn convert_snapshot(
    component_id: &str,
    snapshot: &CadSnapshot,
    options: &ConvertOptions,
    pose: Pose,
) -> Result<ConvertedComponent> {
    let mut diagnostics = Diagnostics::new();
    let cad_data = &snapshot.cad_data;

    // --- SYMBOL ---
    let ee_symbol = importer::import_symbol(cad_data, &mut diagnostics)?;
    let ki_symbol = converter::convert_symbol(
        &ee_symbol,
        options.kicad_version,
        &options.library_name,
        &mut diagnostics,
    );
    let symbol = ConvertedSymbol {
        name: sanitize_name(&ki_symbol.info.name),
        text: ki_symbol.export(options.kicad_version),
    };

    // --- FOOTPRINT + 3D MODEL ---
    let mut model = None;
    let mut model_pose = None;
    let footprint = if cad_data.get("packageDetail").is_some() {
        let ee_footprint = importer::import_footprint(cad_data, &mut diagnostics)?;
        let mut ki_footprint = converter::convert_footprint(&ee_footprint, &mut diagnostics);

        if let Some(ee_model) = &ee_footprint.model_3d {
            let mesh = snapshot
                .raw_mesh
                .as_deref()
                .map(|obj| Mesh::parse(obj, &mut diagnostics));
            if mesh.is_none() {
                diagnostics.warn("SVGNODE", format!("No mesh data for 3D model '{}'", ee_model.name));
            }
            model_pose = converter::compute_model_pose(
                &pose,
                &ki_footprint,
                Some(ee_model),
                mesh.as_ref().and_then(Mesh::bounds_mm),
            );
            if let Some(model_pose) = &model_pose {
                let ki_model = converter::convert_3d_model(
                    ee_model,
                    mesh.as_ref(),
                    snapshot.step.clone(),
                    model_pose,
                    &mut diagnostics,
                );
                ki_footprint.model_3d = Some(ki_model.clone());
                model = Some(ki_model);
            }
        }

        Some(ConvertedFootprint {
            name: ki_footprint.info.name.clone(),
            text: ki_footprint.export(&options.library_name, &options.model_dir()),
        })
    } else {
        diagnostics.warn("FOOTPRINT", "No footprint data for this component");
        None
    };

    log::info!(
        "Converted {} with {} diagnostics",
        component_id,
        diagnostics.len()
    );

    Ok(ConvertedComponent {
        component_id: component_id.to_string(),
        symbol,
        footprint,
        model,
        pose: model_pose,
        diagnostics,
    })
}

/// Fetches and converts one component. `Ok(None)` when the source has no
/// CAD data for the id.
pub async fn convert_component<S: CadSource>(
    source: &S,
    lcsc_id: &str,
    options: &ConvertOptions,
) -> Result<Option<ConvertedComponent>> {
    let id_pattern = Regex::new(r"^C\d+$")?;
    if !id_pattern.is_match(lcsc_id) {
        return Err(Error::InvalidComponentId(lcsc_id.to_string()));
    }

    let Some(cad_data) = source.fetch_cad_data(lcsc_id).await? else {
        log::warn!("No CAD data found for {}", lcsc_id);
        return Ok(None);
    };

    let model_info = match importer::import_3d_model_info(&cad_data) {
        Ok(info) => info,
        Err(e) => {
            log::warn!("Skipping 3D model of {}: {}", lcsc_id, e);
            None
        }
    };

    let mut snapshot = CadSnapshot {
        cad_data,
        ..Default::default()
    };
    if let Some(info) = model_info {
        log::debug!("Found 3D model: {}", info.name);
        let (raw_mesh, step) = tokio::join!(
            source.fetch_raw_mesh(&info.uuid),
            source.fetch_mesh_solid(&info.uuid)
        );
        snapshot.raw_mesh = raw_mesh.unwrap_or_else(|e| {
            log::warn!("Mesh download for {} failed: {}", info.uuid, e);
            None
        });
        snapshot.step = step.unwrap_or_else(|e| {
            log::warn!("STEP download for {} failed: {}", info.uuid, e);
            None
        });
    }

    convert_snapshot(lcsc_id, &snapshot, options, Pose::identity()).map(Some)
}

/// Downloads a component from EasyEDA and writes it into the library at
/// `output_dir`.
pub async fn import_component(
    lcsc_id: &str,
    output_dir: &Path,
    options: &ConvertOptions,
) -> Result<Option<ConvertedComponent>> {
    log::info!("Fetching data for LCSC ID: {}", lcsc_id);
    let api = EasyedaApi::new()?;
    let Some(component) = convert_component(&api, lcsc_id, options).await? else {
        return Ok(None);
    };

    let kicad_lib = file_writer::KicadLibrary {
        path: output_dir.to_path_buf(),
        name: options.library_name.clone(),
        version: options.kicad_version,
        overwrite: false,
    };
    kicad_lib.add_component(&component)?;
    log::info!("Import complete. Files are located in: {:?}", output_dir);
    Ok(Some(component))
}
