use easyeda_kipm::{import_component, units::KicadVersion, ConvertOptions};
use std::{path::Path, time::Instant};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let lcsc_ids = vec!["C2040", "C8952", "C5659", "C324124"]; // Example LCSC IDs
    let options = ConvertOptions {
        kicad_version: KicadVersion::V6,
        library_name: "example_lib".to_string(),
        model_3d_path: None,
    };

    let start_time = Instant::now();
    for lcsc_id in &lcsc_ids {
        let entry_start_time = Instant::now();
        match import_component(lcsc_id, Path::new("example_lib"), &options).await {
            Ok(Some(component)) => {
                log::info!(
                    "Imported {} ({} diagnostics)",
                    component.component_id,
                    component.diagnostics.len()
                );
                for diagnostic in component.diagnostics.entries() {
                    log::info!("  {}", diagnostic);
                }
            }
            Ok(None) => log::warn!("No CAD data for {}", lcsc_id),
            Err(e) => log::error!("Error importing component {}: {}", lcsc_id, e),
        }
        log::info!("Got entry in : {:?}", entry_start_time.elapsed());
    }
    log::info!(
        "Got {:?} Entries in : {:?}",
        lcsc_ids.len(),
        start_time.elapsed()
    );
}
