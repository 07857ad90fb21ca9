use std::io::Read;
use std::path::Path;
use std::pin::Pin;

use super::super::{DEFAULT_MAX_FILE_SIZE, Document, DocumentError, DocumentLoader};
use super::{check_size, metadata_for};

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub struct DocxLoader {
    pub max_file_size: u64,
}

impl Default for DocxLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

fn read_document_xml(path: &Path) -> Result<String, DocumentError> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| DocumentError::Docx(format!("invalid DOCX archive: {e}")))?;
    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|_| DocumentError::Docx("no word/document.xml in archive".into()))?;

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| DocumentError::Docx(format!("failed to read document.xml: {e}")))?;
    Ok(xml)
}

/// Elements whose content is not body run text: text boxes (and their VML
/// fallback) hold paragraphs of their own, paragraph properties hold tab stops.
const SKIPPED_ELEMENTS: [&str; 3] = ["w:txbxContent", "mc:Fallback", "w:pPr"];

/// Collect `<w:t>` run text per `<w:p>` paragraph, joined by newlines.
pub(crate) fn paragraphs_from_xml(xml: &str) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_paragraph = false;
    let mut in_text = false;
    let mut skip_depth = 0usize;
    let mut chars = xml.chars();

    while let Some(c) = chars.next() {
        if c != '<' {
            if in_text && skip_depth == 0 {
                current.push(c);
            }
            continue;
        }

        let mut tag = String::new();
        for tc in chars.by_ref() {
            if tc == '>' {
                break;
            }
            tag.push(tc);
        }
        let self_closing = tag.ends_with('/');
        let name = tag
            .trim_end_matches('/')
            .split(|ch: char| ch.is_whitespace())
            .next()
            .unwrap_or("");

        if name
            .strip_prefix('/')
            .is_some_and(|closed| SKIPPED_ELEMENTS.contains(&closed))
        {
            skip_depth = skip_depth.saturating_sub(1);
            continue;
        }
        if SKIPPED_ELEMENTS.contains(&name) {
            if !self_closing {
                skip_depth += 1;
            }
            continue;
        }
        if skip_depth > 0 {
            continue;
        }

        match name {
            "w:p" if self_closing => paragraphs.push(String::new()),
            "w:p" => {
                in_paragraph = true;
                current.clear();
            }
            "/w:p" => {
                if in_paragraph {
                    paragraphs.push(decode_entities(&current));
                }
                in_paragraph = false;
                in_text = false;
                current.clear();
            }
            "w:t" => in_text = !self_closing,
            "/w:t" => in_text = false,
            "w:tab" if in_paragraph => current.push('\t'),
            "w:br" | "w:cr" if in_paragraph => current.push('\n'),
            _ => {}
        }
    }

    paragraphs.join("\n")
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_owned();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp..];
        let Some(semi) = after.find(';') else {
            out.push_str(after);
            return out;
        };
        let entity = &after[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                .and_then(char::from_u32),
        };
        if let Some(ch) = decoded {
            out.push(ch);
            rest = &after[semi + 1..];
        } else {
            out.push('&');
            rest = &after[1..];
        }
    }
    out.push_str(rest);
    out
}

impl DocumentLoader for DocxLoader {
    fn load(
        &self,
        path: &Path,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Document, DocumentError>> + Send + '_>>
    {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let path = std::fs::canonicalize(&path)?;
            check_size(&path, max_size).await?;

            let path_buf = path.clone();
            let content = tokio::task::spawn_blocking(move || {
                read_document_xml(&path_buf).map(|xml| paragraphs_from_xml(&xml))
            })
            .await
            .map_err(|e| DocumentError::Docx(format!("DOCX extraction task failed: {e}")))??;

            Ok(Document {
                content,
                metadata: metadata_for(&path, DOCX_CONTENT_TYPE),
            })
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["docx"]
    }
}
