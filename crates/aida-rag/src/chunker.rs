//! Chunking and collection naming

use std::path::Path;

use aida_core::{Chunk, IndexingConfig};

const MAX_COLLECTION_NAME: usize = 63;

/// Trim a user-supplied filepath and use forward slashes
pub fn normalize_filepath(filepath: &str) -> String {
    filepath.trim().replace('\\', "/")
}

/// Derive a vector-store collection name from a document path
///
/// The result starts with an ASCII letter, holds only ASCII letters, digits,
/// `_` and `-`, and is 3 to 63 characters long.
pub fn sanitize_collection_name(filepath: &str) -> String {
    let normalized = normalize_filepath(filepath);
    let stem = Path::new(&normalized)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    if stem.is_empty() {
        return "col__collection".to_string();
    }

    let mut name: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        name.insert_str(0, "col_");
    }
    name.truncate(MAX_COLLECTION_NAME);
    if name.len() < 3 {
        name.push_str("_collection");
    }
    name
}

/// Split text into overlapping character windows
///
/// A window is cut at the last whitespace in its final fifth when there is
/// one. Whitespace-only input yields no chunks.
pub fn chunk_text(document_id: &str, text: &str, config: &IndexingConfig) -> Vec<Chunk> {
    let chars: Vec<char> = text.chars().collect();
    let size = config.chunk_size.max(1);
    let overlap = config.chunk_overlap.min(size - 1);
    let total = chars.len();

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < total {
        let mut end = start.saturating_add(size).min(total);
        if end < total {
            let search_from = start + (size - size / 5);
            if let Some(cut) = (search_from..end).rev().find(|&i| chars[i].is_whitespace()) {
                if cut > start {
                    end = cut;
                }
            }
        }

        let piece: String = chars[start..end].iter().collect();
        let piece = piece.trim();
        if !piece.is_empty() {
            chunks.push(Chunk {
                document_id: document_id.to_string(),
                index: chunks.len(),
                text: piece.to_string(),
            });
        }

        if end >= total {
            break;
        }
        let next = end.saturating_sub(overlap);
        start = if next > start { next } else { end };
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chunk_size: usize, chunk_overlap: usize) -> IndexingConfig {
        IndexingConfig {
            chunk_size,
            chunk_overlap,
            ..Default::default()
        }
    }

    fn is_valid_name(name: &str) -> bool {
        let len_ok = (3..=63).contains(&name.len());
        let first_ok = name.starts_with(|c: char| c.is_ascii_alphabetic());
        let chars_ok = name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        len_ok && first_ok && chars_ok
    }

    #[test]
    fn test_sanitize_report_name() {
        let name = sanitize_collection_name("My Report (v2).pdf");
        assert_eq!(name, "My_Report__v2_");
        assert!(is_valid_name(&name));
    }

    #[test]
    fn test_sanitize_uses_file_stem_only() {
        assert_eq!(sanitize_collection_name("  C:\\docs\\q3-summary.docx "), "q3-summary");
        assert_eq!(sanitize_collection_name("/tmp/archive.tar.gz"), "archive_tar");
    }

    #[test]
    fn test_sanitize_edge_cases() {
        assert_eq!(sanitize_collection_name("2024 plan.pdf"), "col_2024_plan");
        assert_eq!(sanitize_collection_name("a.txt"), "a_collection");
        assert_eq!(sanitize_collection_name("résumé.pdf"), "r_sum_");
        assert_eq!(sanitize_collection_name(""), "col__collection");

        let long = format!("{}.pdf", "x".repeat(100));
        let name = sanitize_collection_name(&long);
        assert_eq!(name.len(), 63);
        for input in ["_hidden.md", "-.txt", "a.b", "файл.pdf", &long] {
            assert!(is_valid_name(&sanitize_collection_name(input)), "{}", input);
        }
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(chunk_text("doc", "", &config(100, 10)).is_empty());
        assert!(chunk_text("doc", " \n\t ", &config(100, 10)).is_empty());
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunks = chunk_text("doc", "hello world", &config(1000, 200));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hello world");
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].document_id, "doc");
    }

    #[test]
    fn test_chunks_overlap_and_cut_on_whitespace() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let chunks = chunk_text("doc", text, &config(20, 5));
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 20);
            assert!(!chunk.text.starts_with(' '));
        }
        assert_eq!(chunks[0].text, "alpha beta gamma");
        // Every word survives chunking
        for word in text.split_whitespace() {
            assert!(chunks.iter().any(|c| c.text.contains(word)), "{}", word);
        }
        let indices: Vec<usize> = chunks.iter().map(|c| c.index).collect();
        assert_eq!(indices, (0..chunks.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_overlap_larger_than_size_still_progresses() {
        let text = "x".repeat(50);
        let chunks = chunk_text("doc", &text, &config(10, 40));
        assert!(!chunks.is_empty());
        assert!(chunks.len() <= 50);
        assert_eq!(chunks.last().unwrap().text.len(), 10);
    }

    #[test]
    fn test_huge_chunk_size_is_one_chunk() {
        let chunks = chunk_text("doc", "a short note", &config(usize::MAX, 0));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "a short note");

        let chunks = chunk_text("doc", "a short note", &config(usize::MAX, usize::MAX));
        assert_eq!(chunks.len(), 1);
    }
}
