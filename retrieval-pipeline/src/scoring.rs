use crate::Paragraph;

/// A paragraph together with the number of query tokens it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredParagraph<'a> {
    pub paragraph: &'a Paragraph,
    pub score: usize,
}

/// Lower-cased, whitespace separated query tokens. Duplicates are kept.
pub fn tokenize(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

/// Counts how many tokens occur as substrings of the lower-cased content.
/// A token repeated in the query is counted once per repetition.
pub fn score_paragraph(tokens: &[String], paragraph: &Paragraph) -> usize {
    let content = paragraph.content.to_lowercase();
    tokens
        .iter()
        .filter(|token| content.contains(token.as_str()))
        .count()
}

/// Scores every paragraph, drops non-matches and orders by descending score.
/// The sort is stable, so equal scores keep their original order.
pub fn rank<'a>(paragraphs: &'a [Paragraph], query: &str) -> Vec<ScoredParagraph<'a>> {
    let tokens = tokenize(query);
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<ScoredParagraph<'a>> = paragraphs
        .iter()
        .map(|paragraph| ScoredParagraph {
            paragraph,
            score: score_paragraph(&tokens, paragraph),
        })
        .filter(|scored| scored.score > 0)
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// Returns at most `top_n` of the best matching paragraphs.
pub fn search(paragraphs: &[Paragraph], query: &str, top_n: usize) -> Vec<Paragraph> {
    rank(paragraphs, query)
        .into_iter()
        .take(top_n)
        .map(|scored| scored.paragraph.clone())
        .collect()
}
