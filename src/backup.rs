use anyhow::{anyhow, Context};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::store::{COURSES_FILE, GRADES_FILE, STUDENTS_FILE};

const MANIFEST_ENTRY: &str = "manifest.json";
pub const BUNDLE_FORMAT_V1: &str = "gradebook-data-v1";

const COLLECTION_FILES: [&str; 3] = [STUDENTS_FILE, COURSES_FILE, GRADES_FILE];

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub entry_count: usize,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub bundle_format_detected: String,
    pub restored_files: usize,
}

/// Bundles the collection files into a zip with a checksummed manifest.
/// Collections that have never been persisted are simply absent.
pub fn export_data_bundle(data_dir: &Path, out_path: &Path) -> anyhow::Result<ExportSummary> {
    let mut entries: Vec<(&str, Vec<u8>, String)> = Vec::new();
    for name in COLLECTION_FILES {
        let path = data_dir.join(name);
        if !path.is_file() {
            continue;
        }
        let bytes = std::fs::read(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let checksum = format!("{:x}", Sha256::digest(&bytes));
        entries.push((name, bytes, checksum));
    }
    if entries.is_empty() {
        return Err(anyhow!(
            "no collection files found in {}",
            data_dir.display()
        ));
    }

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let out_file = File::create(out_path)
        .with_context(|| format!("failed to create output file {}", out_path.display()))?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let exported_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let mut files = serde_json::Map::new();
    for (name, _, checksum) in &entries {
        files.insert(name.to_string(), json!({ "sha256": checksum }));
    }
    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": exported_at,
        "files": files,
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    let entry_count = entries.len() + 1;
    for (name, bytes, _) in entries {
        zip.start_file(format!("data/{}", name), opts)
            .with_context(|| format!("failed to start entry for {}", name))?;
        zip.write_all(&bytes)
            .with_context(|| format!("failed to write entry for {}", name))?;
    }

    zip.finish().context("failed to finalize zip bundle")?;

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        entry_count,
    })
}

/// Restores collection files from a bundle. Each file is checksum-verified
/// and moved into place via a temp file, so a bad bundle cannot leave a
/// half-written collection behind. The caller re-opens the store afterwards.
pub fn import_data_bundle(in_path: &Path, data_dir: &Path) -> anyhow::Result<ImportSummary> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data dir {}", data_dir.display()))?;

    if !is_zip_file(in_path)? {
        return Err(anyhow!(
            "{} is not a gradebook data bundle",
            in_path.display()
        ));
    }

    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.display()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", format));
    }
    let files = manifest
        .get("files")
        .and_then(|v| v.as_object())
        .ok_or_else(|| anyhow!("manifest has no files table"))?;

    let mut restored = 0_usize;
    // Only the three known collection names are restored; anything else in
    // the manifest is rejected rather than written to disk.
    for (name, meta) in files {
        if !COLLECTION_FILES.contains(&name.as_str()) {
            return Err(anyhow!("manifest lists unknown file: {}", name));
        }
        let expected = meta
            .get("sha256")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("manifest entry for {} has no checksum", name))?;

        let mut bytes = Vec::new();
        archive
            .by_name(&format!("data/{}", name))
            .with_context(|| format!("bundle missing data/{}", name))?
            .read_to_end(&mut bytes)
            .with_context(|| format!("failed to read data/{}", name))?;
        let actual = format!("{:x}", Sha256::digest(&bytes));
        if actual != expected {
            return Err(anyhow!("checksum mismatch for {}", name));
        }

        let dst = data_dir.join(name);
        let tmp = data_dir.join(format!("{}.importing", name));
        if tmp.exists() {
            let _ = std::fs::remove_file(&tmp);
        }
        std::fs::write(&tmp, &bytes)
            .with_context(|| format!("failed to write temp file {}", tmp.display()))?;
        if dst.exists() {
            std::fs::remove_file(&dst)
                .with_context(|| format!("failed to remove existing {}", dst.display()))?;
        }
        std::fs::rename(&tmp, &dst)
            .with_context(|| format!("failed to move {} into place", dst.display()))?;
        restored += 1;
    }

    Ok(ImportSummary {
        bundle_format_detected: BUNDLE_FORMAT_V1.to_string(),
        restored_files: restored,
    })
}

fn is_zip_file(path: &Path) -> anyhow::Result<bool> {
    let mut f = File::open(path)
        .with_context(|| format!("failed to open input file {}", path.display()))?;
    let mut sig = [0u8; 4];
    let read = f.read(&mut sig).context("failed to read file signature")?;
    if read < 4 {
        return Ok(false);
    }
    Ok(sig == [0x50, 0x4B, 0x03, 0x04])
}
