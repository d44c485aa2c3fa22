// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Bulk export shaping: tabular (TSV) and document (DOCX) artifacts.
//!
//! Every export writes into a per-request scratch directory that is removed
//! on all exit paths, including decode and write failures; `TempDir` owns
//! the cleanup.

use crate::models::contract::{ContractHit, ProvincePair};
use crate::services::docx;
use crate::services::vocab::{self, Vocabulary};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Internal admin prefix embedded in older metadata text; rewritten to the
/// public storage prefix on export. Only the first two occurrences are
/// rewritten, an intentional bound.
const ADMIN_ASSET_PREFIX: &str = "https://admin.iltodgeree.mn/app";
const ASSET_LINK_REWRITES: usize = 2;

/// Fixed header of the tabular export.
pub const TSV_HEADER: [&str; 14] = [
    "#",
    "Гэрээний нэр",
    "Эрдсийн төрөл",
    "Гэрээний төрөл",
    "Гэрээ байгуулсан огноо",
    "Баримт бичгийн төрөл",
    "Аймаг / Сум",
    "Гэрээ байгуулсан төрийн байгууллага",
    "Компанийн нэр",
    "Төслийн нэр",
    "Гэрээний файл",
    "OCID",
    "Аннотацийн текст",
    "Метадата текст",
];

/// A finished export artifact ready to be served.
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Template file loaded into memory for the DOCX container.
struct FileBuffer {
    name: String,
    data: Vec<u8>,
}

pub struct Exporter {
    public_url: String,
    template_path: PathBuf,
}

impl Exporter {
    pub fn new(public_url: String, template_path: PathBuf) -> Self {
        Self {
            public_url,
            template_path,
        }
    }

    /// Export search hits as a tab-separated table.
    pub fn tsv(&self, hits: &[ContractHit], units: &HashMap<i32, String>) -> Result<ExportFile> {
        let id = Uuid::new_v4().to_string();
        let scratch = tempfile::tempdir().context("failed to create export scratch dir")?;
        let path = scratch.path().join(format!("{}.tsv", id));

        let mut lines = Vec::with_capacity(hits.len() + 1);
        lines.push(TSV_HEADER.map(str::to_string).join("\t"));
        for (index, hit) in hits.iter().enumerate() {
            lines.push(tsv_row(index, hit, units, &self.public_url).join("\t"));
        }

        fs::write(&path, lines.join("\n") + "\n").context("failed to write export file")?;
        let bytes = fs::read(&path)?;

        Ok(ExportFile {
            filename: format!("{}.tsv", id),
            content_type: "text/tab-separated-values",
            bytes,
        })
    }

    /// Export one contract as a DOCX document.
    pub fn docx_single(&self, hit: &ContractHit) -> Result<ExportFile> {
        self.docx_document(std::slice::from_ref(hit), false)
    }

    /// Export search hits as one combined DOCX document with numbered
    /// contract titles.
    pub fn docx(&self, hits: &[ContractHit]) -> Result<ExportFile> {
        self.docx_document(hits, true)
    }

    fn docx_document(&self, hits: &[ContractHit], numbered: bool) -> Result<ExportFile> {
        let id = Uuid::new_v4().to_string();
        let scratch = tempfile::tempdir().context("failed to create export scratch dir")?;
        let path = scratch.path().join(format!("{}.docx", id));

        let templates = load_templates(&self.template_path)?;
        let document = render_document_xml(hits, numbered);
        pack_container(&path, &templates, document.as_bytes())?;
        let bytes = fs::read(&path)?;

        Ok(ExportFile {
            filename: format!("{}.docx", id),
            content_type:
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            bytes,
        })
    }
}

/// Build one TSV row; every cell is sanitized against embedded tabs and
/// newlines.
fn tsv_row(
    index: usize,
    hit: &ContractHit,
    units: &HashMap<i32, String>,
    public_url: &str,
) -> Vec<String> {
    let metadata = &hit.source.metadata;
    [
        format!("{}.", index + 1),
        metadata.contract_name.clone(),
        joined_resources(&metadata.resource),
        vocab::to_display(
            Vocabulary::ContractTypes,
            metadata.contract_type.as_deref().unwrap_or_default(),
        )
        .to_string(),
        metadata.signature_date.clone().unwrap_or_default(),
        vocab::to_display(
            Vocabulary::DocumentTypes,
            metadata.document_type.as_deref().unwrap_or_default(),
        )
        .to_string(),
        province_names(&metadata.provinces, units),
        joined_governments(metadata),
        metadata.company_name.clone().unwrap_or_default(),
        metadata.project_title.clone().unwrap_or_default(),
        format!("{}/api/contracts/download/{}/pdf", public_url, hit.id),
        metadata.open_contracting_id.clone(),
        hit.source.annotations_string.clone().unwrap_or_default(),
        rewrite_asset_links(
            hit.source.metadata_string.as_deref().unwrap_or_default(),
            public_url,
        ),
    ]
    .into_iter()
    .map(|cell| sanitize_cell(&cell))
    .collect()
}

/// Resolve province/district pairs to display names. Both ids must be valid
/// positive integers or the pair is skipped.
fn province_names(pairs: &[ProvincePair], units: &HashMap<i32, String>) -> String {
    let mut joined = String::new();
    for pair in pairs {
        let province_id: i32 = pair.province.parse().unwrap_or(0);
        let district_id: i32 = pair.district.parse().unwrap_or(0);
        if province_id > 0 && district_id > 0 {
            let province = units.get(&province_id).cloned().unwrap_or_default();
            let district = units.get(&district_id).cloned().unwrap_or_default();
            joined.push_str(&format!("{} {};", province, district));
        }
    }
    joined
}

fn joined_resources(resources: &[String]) -> String {
    resources
        .iter()
        .map(|raw| format!("{};", vocab::to_display(Vocabulary::Resources, raw)))
        .collect()
}

fn joined_governments(metadata: &crate::models::contract::ContractMetadata) -> String {
    metadata
        .government_entity
        .iter()
        .map(|gov| format!("{};", gov.entity))
        .collect()
}

/// Rewrite the internal admin prefix to the public storage prefix, first
/// two occurrences only.
fn rewrite_asset_links(text: &str, public_url: &str) -> String {
    let replacement = format!("{}/storage", public_url);
    text.replacen(ADMIN_ASSET_PREFIX, &replacement, ASSET_LINK_REWRITES)
}

fn sanitize_cell(cell: &str) -> String {
    cell.replace(['\t', '\n', '\r'], " ")
}

fn render_document_xml(hits: &[ContractHit], numbered: bool) -> String {
    let mut document = String::from(docx::document_header());
    for (index, hit) in hits.iter().enumerate() {
        let name = &hit.source.metadata.contract_name;
        let heading = if numbered {
            format!("{}. {}", index + 1, name)
        } else {
            name.clone()
        };
        document.push_str(&docx::title(&heading));

        let text = hit.source.pdf_text_string.as_deref().unwrap_or_default();
        for line in docx::text_paragraphs(text) {
            document.push_str(&docx::paragraph(&line));
        }
    }
    document.push_str(docx::document_footer());
    document
}

/// Load the DOCX container skeleton from the template directory.
fn load_templates(root: &Path) -> Result<Vec<FileBuffer>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        let data = fs::read(entry.path())
            .with_context(|| format!("failed to read template {}", entry.path().display()))?;
        files.push(FileBuffer { name, data });
    }
    Ok(files)
}

fn pack_container(path: &Path, templates: &[FileBuffer], document: &[u8]) -> Result<()> {
    let file = File::create(path).context("failed to create export container")?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    for template in templates {
        // The generated document part replaces any template placeholder.
        if template.name == docx::MAIN_DOCUMENT_FILE {
            continue;
        }
        zip.start_file(template.name.as_str(), options)?;
        zip.write_all(&template.data)?;
    }
    zip.start_file(docx::MAIN_DOCUMENT_FILE, options)?;
    zip.write_all(document)?;
    zip.finish()?;
    Ok(())
}
