//! Detection of document questions in free-form user input

use regex::Regex;

const EXTENSIONS: &str = "pdf|docx|pptx|md|markdown|txt";
const DEFAULT_DOCUMENT_QUERY: &str = "Give an overview of this document";

/// A filepath mentioned in user input, and the question asked about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentQuery {
    pub filepath: String,
    pub query: String,
}

impl DocumentQuery {
    /// Rewrite the input so the LLM calls DocumentRetrieval with the exact path
    pub fn to_prompt(&self) -> String {
        format!(
            "Use the below filepath (use as such don't change anyting in the filepath) and query to call the DocumentRetriever Tool: filepath: {} , query: {}",
            self.filepath, self.query
        )
    }
}

/// Links are left for the WebsiteScraper tool
fn is_url(candidate: &str) -> bool {
    candidate.contains("://")
}

/// Find a document path in the input
///
/// Quoted paths may contain spaces. The query is the remaining input with
/// whitespace collapsed.
pub fn detect_document_query(input: &str) -> Option<DocumentQuery> {
    let quoted = Regex::new(&format!(r#"(?i)(["'])([^"']+?\.(?:{}))["']"#, EXTENSIONS)).ok()?;
    let bare = Regex::new(&format!(r#"(?i)(?:^|\s)([^\s"']+?\.(?:{}))\b"#, EXTENSIONS)).ok()?;

    let quoted_path = quoted.captures_iter(input).find_map(|caps| {
        let path = caps.get(2)?;
        if is_url(path.as_str()) {
            return None;
        }
        Some((path.as_str().to_string(), caps.get(0)?.range()))
    });
    let (filepath, span) = match quoted_path {
        Some(found) => found,
        None => bare.captures_iter(input).find_map(|caps| {
            let path = caps.get(1)?;
            if is_url(path.as_str()) {
                return None;
            }
            Some((path.as_str().to_string(), path.range()))
        })?,
    };

    let mut rest = String::with_capacity(input.len());
    rest.push_str(&input[..span.start]);
    rest.push(' ');
    rest.push_str(&input[span.end..]);
    let query = rest.split_whitespace().collect::<Vec<_>>().join(" ");
    let query = query
        .trim_matches(|c: char| c == ',' || c == ':' || c.is_whitespace())
        .to_string();

    Some(DocumentQuery {
        filepath,
        query: if query.is_empty() {
            DEFAULT_DOCUMENT_QUERY.to_string()
        } else {
            query
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_bare_path() {
        let found = detect_document_query("summarize ./docs/report.pdf please").unwrap();
        assert_eq!(found.filepath, "./docs/report.pdf");
        assert_eq!(found.query, "summarize please");
    }

    #[test]
    fn test_path_at_start_with_trailing_punctuation() {
        let found = detect_document_query("notes.md: what are the action items?").unwrap();
        assert_eq!(found.filepath, "notes.md");
        assert_eq!(found.query, "what are the action items?");
    }

    #[test]
    fn test_quoted_path_with_spaces() {
        let found =
            detect_document_query("What does \"C:\\Users\\me\\My Report (v2).DOCX\" say about revenue?")
                .unwrap();
        assert_eq!(found.filepath, "C:\\Users\\me\\My Report (v2).DOCX");
        assert_eq!(found.query, "What does say about revenue?");
    }

    #[test]
    fn test_path_only_gets_default_query() {
        let found = detect_document_query("  slides.pptx ").unwrap();
        assert_eq!(found.query, DEFAULT_DOCUMENT_QUERY);
    }

    #[test]
    fn test_no_document() {
        assert_eq!(detect_document_query("what is the weather in Paris?"), None);
        assert_eq!(detect_document_query("open example.com/page.html"), None);
        assert_eq!(detect_document_query("the pdf format"), None);
    }

    #[test]
    fn test_links_are_not_documents() {
        assert_eq!(
            detect_document_query("summarize https://arxiv.org/pdf/1706.03762v7.pdf"),
            None
        );
        assert_eq!(
            detect_document_query("read \"https://example.com/files/guide.md\" for me"),
            None
        );
    }

    #[test]
    fn test_local_path_after_link() {
        let found =
            detect_document_query("compare https://example.com/a.pdf with ./b.pdf").unwrap();
        assert_eq!(found.filepath, "./b.pdf");
        assert_eq!(found.query, "compare https://example.com/a.pdf with");
    }

    #[test]
    fn test_prompt_rewrite() {
        let found = detect_document_query("/tmp/a.txt key dates").unwrap();
        assert_snapshot!(found.to_prompt(), @"Use the below filepath (use as such don't change anyting in the filepath) and query to call the DocumentRetriever Tool: filepath: /tmp/a.txt , query: key dates");
    }
}
