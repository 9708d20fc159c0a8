use scraper::{Html, Selector};

const BLOCK_SELECTOR: &str = "p, h1, h2, h3, h4, h5, h6, li, blockquote, pre";

/// Renders an HTML fragment as plain text, one paragraph per block element.
///
/// Fragments without block elements (or plain text bodies) fall back to their
/// text content split on blank lines.
pub fn plain_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let blocks = match Selector::parse(BLOCK_SELECTOR) {
        Ok(selector) => fragment
            .select(&selector)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|block| !block.is_empty())
            .collect::<Vec<_>>(),
        Err(_) => Vec::new(),
    };

    if !blocks.is_empty() {
        return blocks.join("\n\n");
    }

    let text = fragment.root_element().text().collect::<String>();
    split_into_sections(&text)
        .iter()
        .map(|section| collapse_whitespace(section))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn split_into_sections(content: &str) -> Vec<String> {
    content
        .split("\n\n")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
