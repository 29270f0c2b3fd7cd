//! Text extraction for the supported document formats

use pulldown_cmark::{Event, Parser, TagEnd};
use regex::Regex;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use aida_core::{Error, Result};

/// Document formats the loader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Pptx,
    Markdown,
    Text,
}

impl DocumentKind {
    /// Every extension accepted by [`DocumentKind::from_extension`]
    pub const EXTENSIONS: &'static [&'static str] = &["pdf", "docx", "pptx", "md", "markdown", "txt"];

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            "pptx" => Some(DocumentKind::Pptx),
            "md" | "markdown" => Some(DocumentKind::Markdown),
            "txt" => Some(DocumentKind::Text),
            _ => None,
        }
    }

    /// Determine the kind from a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::from_extension(&extension).ok_or_else(|| {
            Error::UnsupportedFormat(format!(
                "'{}' (supported: {})",
                path.display(),
                Self::EXTENSIONS.join(", ")
            ))
        })
    }
}

/// Read a document from disk and return its plain text
pub fn load_document(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(Error::DocumentNotFound(path.display().to_string()));
    }

    let kind = DocumentKind::from_path(path)?;
    tracing::debug!(path = %path.display(), ?kind, "loading document");

    match kind {
        DocumentKind::Pdf => pdf_extract::extract_text(path)
            .map_err(|e| Error::DocumentParse(format!("{}: {}", path.display(), e))),
        DocumentKind::Docx => load_docx(path),
        DocumentKind::Pptx => load_pptx(path),
        DocumentKind::Markdown => Ok(markdown_to_text(&fs::read_to_string(path)?)),
        DocumentKind::Text => Ok(String::from_utf8_lossy(&fs::read(path)?).into_owned()),
    }
}

fn open_archive(path: &Path) -> Result<zip::ZipArchive<File>> {
    let file = File::open(path)?;
    zip::ZipArchive::new(file)
        .map_err(|e| Error::DocumentParse(format!("{}: {}", path.display(), e)))
}

fn read_entry(archive: &mut zip::ZipArchive<File>, name: &str) -> Result<String> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| Error::DocumentParse(format!("missing '{}': {}", name, e)))?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| Error::DocumentParse(format!("unreadable '{}': {}", name, e)))?;
    Ok(xml)
}

fn load_docx(path: &Path) -> Result<String> {
    let mut archive = open_archive(path)?;
    let xml = read_entry(&mut archive, "word/document.xml")?;
    xml_paragraphs(&xml, "w:p", "w:t")
}

fn load_pptx(path: &Path) -> Result<String> {
    let mut archive = open_archive(path)?;
    let slide_name = Regex::new(r"^ppt/slides/slide(\d+)\.xml$")
        .map_err(|e| Error::Other(e.to_string()))?;

    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = slide_name.captures(name)?.get(1)?.as_str().parse().ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    slides.sort_by_key(|(number, _)| *number);

    let mut text = String::new();
    for (_, name) in slides {
        let xml = read_entry(&mut archive, &name)?;
        text.push_str(&xml_paragraphs(&xml, "a:p", "a:t")?);
        text.push('\n');
    }
    Ok(text)
}

/// Collect the text runs of each paragraph element, one line per paragraph
fn xml_paragraphs(xml: &str, paragraph_tag: &str, text_tag: &str) -> Result<String> {
    let paragraph = Regex::new(&format!(
        r"(?s)<{p}(?:\s[^>]*)?>(.*?)</{p}>",
        p = regex::escape(paragraph_tag)
    ))
    .map_err(|e| Error::Other(e.to_string()))?;
    let run = Regex::new(&format!(
        r"(?s)<{t}(?:\s[^>]*)?>(.*?)</{t}>",
        t = regex::escape(text_tag)
    ))
    .map_err(|e| Error::Other(e.to_string()))?;

    let lines: Vec<String> = paragraph
        .captures_iter(xml)
        .map(|p| {
            run.captures_iter(&p[1])
                .map(|r| unescape_xml(&r[1]))
                .collect::<String>()
        })
        .collect();
    Ok(lines.join("\n"))
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Reduce Markdown to its readable text
pub(crate) fn markdown_to_text(markdown: &str) -> String {
    let mut text = String::new();
    for event in Parser::new(markdown) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak => text.push(' '),
            Event::HardBreak => text.push('\n'),
            Event::End(
                TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::CodeBlock,
            ) => text.push('\n'),
            _ => {}
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, content) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(DocumentKind::from_path(Path::new("a/b.PDF")).unwrap(), DocumentKind::Pdf);
        assert_eq!(
            DocumentKind::from_path(Path::new("notes.markdown")).unwrap(),
            DocumentKind::Markdown
        );
        assert!(matches!(
            DocumentKind::from_path(Path::new("sheet.xlsx")),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(DocumentKind::from_path(Path::new("README")).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = load_document(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, Error::DocumentNotFound(_)));
    }

    #[test]
    fn test_unsupported_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, "a,b").unwrap();
        assert!(matches!(load_document(&path), Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_load_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "plain text").unwrap();
        assert_eq!(load_document(&path).unwrap(), "plain text");
    }

    #[test]
    fn test_load_markdown() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("guide.md");
        fs::write(&path, "# Title\n\nSome **bold** text with `code`.\n\n- one\n- two\n").unwrap();
        let text = load_document(&path).unwrap();
        assert_eq!(text, "Title\nSome bold text with code.\none\ntwo\n");
    }

    #[test]
    fn test_load_docx() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.docx");
        let xml = r#"<?xml version="1.0"?><w:document><w:body><w:p><w:pPr/><w:r><w:t>Quarterly</w:t></w:r><w:r><w:t xml:space="preserve"> results &amp; outlook</w:t></w:r></w:p><w:p><w:r><w:t>Second line</w:t></w:r></w:p></w:body></w:document>"#;
        write_zip(&path, &[("word/document.xml", xml)]);
        assert_eq!(load_document(&path).unwrap(), "Quarterly results & outlook\nSecond line");
    }

    #[test]
    fn test_load_pptx_in_slide_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deck.pptx");
        let slide = |text: &str| format!("<p:sld><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:sld>", text);
        let (s1, s2, s10) = (slide("first"), slide("second"), slide("tenth"));
        write_zip(
            &path,
            &[
                ("ppt/slides/slide10.xml", s10.as_str()),
                ("ppt/slides/slide2.xml", s2.as_str()),
                ("ppt/slides/slide1.xml", s1.as_str()),
                ("ppt/slides/_rels/slide1.xml.rels", "<Relationships/>"),
            ],
        );
        assert_eq!(load_document(&path).unwrap(), "first\nsecond\ntenth\n");
    }

    #[test]
    fn test_corrupt_docx() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.docx");
        fs::write(&path, "not a zip").unwrap();
        assert!(matches!(load_document(&path), Err(Error::DocumentParse(_))));
    }
}
