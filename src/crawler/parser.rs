//! HTML parser for extracting page text, title and anchors
//!
//! This module turns a fetched HTML document into the three things the
//! crawl engine consumes:
//! - The page title (from the `<title>` tag)
//! - The visible body text
//! - Every anchor target, exactly as written in the page

use crate::crawler::FetchedPage;
use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose text content is never rendered
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements rendered on their own line
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "dialog", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table", "td",
    "th", "tr", "ul",
];

/// Parses HTML content into a fetched page
///
/// # Extraction Rules
///
/// - **Title:** text of the first `<title>`, trimmed; empty if absent
/// - **Text:** the rendered text under `<body>`, skipping hidden elements;
///   one line per block, blank lines dropped
/// - **Anchors:** the raw `href` of every `<a href>` in document order;
///   filtering and resolution happen later, per site
///
/// # Example
///
/// ```
/// use site_harvester::crawler::parse_html;
///
/// let html = r#"<html><head><title>Test</title></head>
///     <body><p>Hello</p><a href="/page">Link</a></body></html>"#;
/// let page = parse_html(html);
/// assert_eq!(page.title, "Test");
/// assert_eq!(page.text, "Hello\nLink");
/// assert_eq!(page.anchors, vec!["/page".to_string()]);
/// ```
pub fn parse_html(html: &str) -> FetchedPage {
    let document = Html::parse_document(html);

    FetchedPage {
        title: extract_title(&document),
        text: extract_text(&document),
        anchors: extract_anchors(&document),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> String {
    let Ok(title_selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Extracts the visible text of the document body
///
/// Text nodes are concatenated as rendered: inline markup such as `<b>` or
/// `<a>` adds nothing between words, while block elements and `<br>` start
/// a new line. Whitespace runs inside a line collapse to a single space.
fn extract_text(document: &Html) -> String {
    let Ok(body_selector) = Selector::parse("body") else {
        return String::new();
    };

    let Some(body) = document.select(&body_selector).next() else {
        return String::new();
    };

    let mut raw = String::new();
    collect_text(body, &mut raw);

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Appends the rendered text of `element` to `out`
///
/// Source line breaks inside text nodes are plain whitespace; only element
/// boundaries put a `\n` into `out`.
fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
            }
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = child.value().name();
                if HIDDEN_ELEMENTS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }

                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    out.push('\n');
                }
                collect_text(child, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Extracts every anchor target in document order
fn extract_anchors(document: &Html) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}
