// src/file_writer.rs

use crate::error::Result;
use crate::kicad_models::*;
use crate::units::KicadVersion;
use crate::ConvertedComponent;
use regex::{NoExpand, Regex};
use std::fs;
use std::path::PathBuf;

/// Manages the output library structure.
///
/// Layout under `path`: `<name>.kicad_sym` (or `<name>.lib` for v5),
/// `<name>.pretty/` and `<name>.3dshapes/`.
pub struct KicadLibrary {
    pub path: PathBuf,
    pub name: String,
    pub version: KicadVersion,
    /// Replace existing symbols and footprints instead of skipping them.
    pub overwrite: bool,
}

impl KicadLibrary {
    pub fn symbol_lib_path(&self) -> PathBuf {
        let extension = match self.version {
            KicadVersion::V5 => "lib",
            KicadVersion::V6 => "kicad_sym",
        };
        self.path.join(format!("{}.{}", self.name, extension))
    }

    pub fn footprint_dir(&self) -> PathBuf {
        self.path.join(format!("{}.pretty", self.name))
    }

    pub fn model_dir(&self) -> PathBuf {
        self.path.join(format!("{}.3dshapes", self.name))
    }

    /// Creates the footprint and 3D model directories and an empty symbol
    /// library if there is none yet.
    pub fn setup_directories(&self) -> Result<()> {
        fs::create_dir_all(self.footprint_dir())?;
        fs::create_dir_all(self.model_dir())?;
        let lib_path = self.symbol_lib_path();
        if !lib_path.exists() {
            fs::write(&lib_path, library_header(self.version))?;
        }
        Ok(())
    }

    /// Regex matching an existing symbol block, per dialect.
    fn symbol_pattern(&self, name: &str) -> Result<Regex> {
        let name = regex::escape(name);
        let pattern = match self.version {
            KicadVersion::V5 => format!(r"(?s)#\n# {}\n#\n.*?ENDDEF\n", name),
            KicadVersion::V6 => format!(r#"(?s)\n  \(symbol "{}".*?\n  \)"#, name),
        };
        Ok(Regex::new(&pattern)?)
    }

    /// Adds a symbol block to the library file. Returns `false` when the
    /// symbol already exists and `overwrite` is off.
    pub fn add_symbol(&self, name: &str, symbol_text: &str) -> Result<bool> {
        let lib_path = self.symbol_lib_path();
        let content = match fs::read_to_string(&lib_path) {
            Ok(content) if !content.trim().is_empty() => content,
            Ok(_) => library_header(self.version).to_string(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                library_header(self.version).to_string()
            }
            Err(e) => return Err(e.into()),
        };

        let re = self.symbol_pattern(name)?;
        let updated = if re.is_match(&content) {
            if !self.overwrite {
                log::info!("Symbol '{}' already exists in the library. Skipping.", name);
                return Ok(false);
            }
            let replacement = match self.version {
                KicadVersion::V5 => symbol_text.to_string(),
                KicadVersion::V6 => format!("\n{}", symbol_text.trim_end_matches('\n')),
            };
            log::info!("Replacing symbol '{}'", name);
            re.replace(&content, NoExpand(&replacement)).into_owned()
        } else {
            match self.version {
                KicadVersion::V5 => {
                    let mut content = content;
                    if !content.ends_with('\n') {
                        content.push('\n');
                    }
                    content + symbol_text
                }
                KicadVersion::V6 => match content.rfind(')') {
                    // Insert before the closing paren of the library list.
                    Some(close) => format!("{}{}{}", &content[..close], symbol_text, &content[close..]),
                    None => format!("{}{})\n", content, symbol_text),
                },
            }
        };

        fs::write(&lib_path, updated)?;
        log::info!("Added symbol '{}' to {:?}", name, lib_path);
        Ok(true)
    }

    /// Writes a footprint to its own .kicad_mod file.
    pub fn add_footprint(&self, name: &str, footprint_text: &str) -> Result<bool> {
        let fp_path = self.footprint_dir().join(format!("{}.kicad_mod", name));
        if fp_path.exists() && !self.overwrite {
            log::info!("Footprint '{}' already exists. Skipping.", name);
            return Ok(false);
        }
        fs::write(&fp_path, footprint_text)?;
        Ok(true)
    }

    /// Writes the 3D model files (.wrl, .step).
    pub fn add_3d_model(&self, model: &Ki3dModel) -> Result<()> {
        let dir = self.model_dir();
        if let Some(wrl_data) = &model.wrl_data {
            fs::write(dir.join(format!("{}.wrl", model.name)), wrl_data)?;
        }
        if let Some(step_data) = &model.step_data {
            fs::write(dir.join(format!("{}.step", model.name)), step_data)?;
        }
        Ok(())
    }

    /// Writes every part of a converted component.
    pub fn add_component(&self, component: &ConvertedComponent) -> Result<()> {
        self.setup_directories()?;
        self.add_symbol(&component.symbol.name, &component.symbol.text)?;
        if let Some(footprint) = &component.footprint {
            self.add_footprint(&footprint.name, &footprint.text)?;
        }
        if let Some(model) = &component.model {
            self.add_3d_model(model)?;
        }
        Ok(())
    }
}
