use crate::{Document, Paragraph};

/// Splits every document into one paragraph per non-blank line, preserving
/// document order and line order.
pub fn index(documents: &[Document]) -> Vec<Paragraph> {
    documents
        .iter()
        .flat_map(|document| {
            document
                .text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| Paragraph::new(document.title.as_str(), line))
        })
        .collect()
}
