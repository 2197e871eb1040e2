//! Packaging generated documents for download or disk

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::converter::GeneratedDocument;
use super::validation::sanitize_filename;

const FALLBACK_BUNDLE_STEM: &str = "process_plan";

/// `{material}_jsons.zip`, with the material reduced to a safe file name
pub fn bundle_file_name(material: &str) -> String {
    let stem = sanitize_filename(material);
    if stem.is_empty() {
        format!("{FALLBACK_BUNDLE_STEM}_jsons.zip")
    } else {
        format!("{stem}_jsons.zip")
    }
}

/// Zip archive holding one pretty-printed JSON file per document
pub fn build_zip(documents: &[GeneratedDocument]) -> Result<Vec<u8>> {
    let mut zip_writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::FileOptions::<()>::default()
        .compression_method(zip::CompressionMethod::Stored)
        .unix_permissions(0o644);

    for document in documents {
        let entry_name = archive_entry_name(&document.file_name);
        zip_writer
            .start_file(entry_name.as_str(), options)
            .with_context(|| format!("Failed to add {entry_name} to archive"))?;
        zip_writer.write_all(&document.to_pretty_json()?)?;
    }

    let cursor = zip_writer.finish().context("Failed to finish archive")?;
    Ok(cursor.into_inner())
}

/// Write every document into `dir`, returning the written paths in order.
///
/// Fails rather than overwrite a file written earlier in the same call.
pub fn write_documents(dir: &Path, documents: &[GeneratedDocument]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written: Vec<PathBuf> = Vec::with_capacity(documents.len());
    for document in documents {
        let path = dir.join(archive_entry_name(&document.file_name));
        if written.contains(&path) {
            bail!(
                "{} would be written twice, sheet '{}' clashes with an earlier document",
                path.display(),
                document.sheet_name
            );
        }
        std::fs::write(&path, document.to_pretty_json()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}

/// Line names may contain path separators; keep entries flat
pub fn archive_entry_name(file_name: &str) -> String {
    file_name.replace(['/', '\\'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Read;

    fn document(file_name: &str) -> GeneratedDocument {
        GeneratedDocument {
            file_name: file_name.to_string(),
            sheet_name: "Hand".to_string(),
            line_name: "Citrine1".to_string(),
            document: json!({"scopeMaterialNumber": "200006524A", "operationsDefinitions": []}),
        }
    }

    #[test]
    fn test_bundle_file_name() {
        assert_eq!(bundle_file_name("HAND"), "HAND_jsons.zip");
        assert_eq!(bundle_file_name("../"), "process_plan_jsons.zip");
    }

    #[test]
    fn test_zip_contains_pretty_documents() {
        let bytes = build_zip(&[document("Hand_Citrine1.json"), document("Arm_Jade1.json")]).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut content = String::new();
        archive
            .by_name("Hand_Citrine1.json")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert!(content.starts_with("{\n    \"scopeMaterialNumber\""));
        assert!(archive.by_name("Arm_Jade1.json").is_ok());
    }

    #[test]
    fn test_write_documents_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let paths =
            write_documents(&dir.path().join("out"), &[document("Plan/A_Citrine1.json")]).unwrap();

        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("Plan_A_Citrine1.json"));
        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&paths[0]).unwrap()).unwrap();
        assert_eq!(written["scopeMaterialNumber"], "200006524A");
    }

    #[test]
    fn test_write_documents_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_documents(
            dir.path(),
            &[document("Line/2.json"), document("Line_2.json")],
        )
        .unwrap_err();

        assert!(err.to_string().contains("Line_2.json would be written twice"));
    }
}
