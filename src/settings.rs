use std::{fs, path::Path};

use anyhow::{Context, Result};

use crate::export::ExportOptions;

/// Save export settings to a JSON file.
pub fn save_export_settings(path: &Path, options: &ExportOptions) -> Result<()> {
    let content = serde_json::to_string_pretty(options)
        .context("failed to serialize export settings as JSON")?;
    fs::write(path, content)
        .with_context(|| format!("failed to save export settings: {}", path.display()))?;
    Ok(())
}

/// Load export settings from a JSON file. Missing fields take their defaults.
pub fn load_export_settings(path: &Path) -> Result<ExportOptions> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to load export settings: {}", path.display()))?;
    let options: ExportOptions =
        serde_json::from_str(&content).context("failed to parse export settings JSON")?;
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{animlink::TaxonomyId, tensor::TensorPrecision};

    #[test]
    fn given_default_settings_when_serialize_then_json_contains_tensor_precision() {
        let options = ExportOptions::default();
        let json = serde_json::to_string(&options).expect("serialize settings");
        assert!(json.contains("\"tensor_precision\":\"float32\""));
    }

    #[test]
    fn given_saved_settings_when_loading_then_values_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        let options = ExportOptions {
            tensor_precision: TensorPrecision::Float16,
            face_taxonomies: vec![TaxonomyId::Arkit],
            ..ExportOptions::default()
        };

        save_export_settings(&path, &options).expect("save");
        let loaded = load_export_settings(&path).expect("load");

        assert_eq!(loaded.tensor_precision, TensorPrecision::Float16);
        assert_eq!(loaded.face_taxonomies, vec![TaxonomyId::Arkit]);
    }

    #[test]
    fn given_partial_json_when_loading_then_missing_fields_use_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "scale": 0.01 }"#).expect("write");

        let loaded = load_export_settings(&path).expect("load");

        assert_eq!(loaded.scale, 0.01);
        assert!(loaded.use_tensor_weights);
        assert_eq!(loaded.lod_ratios, vec![0.5, 0.2]);
    }

    #[test]
    fn given_missing_file_when_loading_then_error_names_the_path() {
        let error = load_export_settings(Path::new("/nonexistent/settings.json")).expect_err("missing");
        assert!(format!("{error:#}").contains("/nonexistent/settings.json"));
    }
}
