//! Query helpers over a parsed page snapshot.
//!
//! Every query is scoped to an element and fails soft: a selector that does
//! not parse is reported as an [`ExtractionError`], a selector that matches
//! nothing is `Ok(None)` / an empty list.

use scraper::node::Node;
use scraper::{ElementRef, Selector};

use crate::extract::{ExtractResult, ExtractionError};

/// Elements that start a new line when rendered.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "dt", "dd", "figure",
    "figcaption", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "tr", "ul",
];

pub fn selector(css: &str) -> ExtractResult<Selector> {
    Selector::parse(css).map_err(|e| ExtractionError::Selector(format!("{css}: {e:?}")))
}

/// First element under `scope` matching `css`, in document order.
pub fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> ExtractResult<Option<ElementRef<'a>>> {
    let sel = selector(css)?;
    let found = scope.select(&sel).next();
    Ok(found)
}

/// All elements under `scope` matching `css`, in document order.
pub fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> ExtractResult<Vec<ElementRef<'a>>> {
    let sel = selector(css)?;
    Ok(scope.select(&sel).collect())
}

/// Attribute value, trimmed; `None` when missing or blank.
pub fn attr(el: ElementRef<'_>, name: &str) -> Option<String> {
    el.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Whether any class of the element contains `needle`.
pub fn class_contains(el: ElementRef<'_>, needle: &str) -> bool {
    el.value().classes().any(|c| c.contains(needle))
}

/// Approximate rendered text: whitespace collapsed, line breaks at `<br>`
/// and block elements, blank lines dropped.
pub fn rendered_text(el: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(el, &mut raw);
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => {
                if text.starts_with(char::is_whitespace) && !out.ends_with(char::is_whitespace) {
                    out.push(' ');
                }
                let words: Vec<&str> = text.split_whitespace().collect();
                out.push_str(&words.join(" "));
                if !words.is_empty() && text.ends_with(char::is_whitespace) {
                    out.push(' ');
                }
            }
            Node::Element(element) => {
                let name = element.name();
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                if matches!(name, "script" | "style" | "template") {
                    continue;
                }
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                collect_text(child_el, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// A node that can be walked upward and asked for a nearby actor title.
///
/// Implemented for snapshot elements; tests implement it over synthetic trees.
pub trait ContainerNode: Sized {
    fn parent_container(&self) -> Option<Self>;
    fn actor_title(&self) -> Option<String>;
}

impl<'a> ContainerNode for ElementRef<'a> {
    fn parent_container(&self) -> Option<Self> {
        self.parent().and_then(ElementRef::wrap)
    }

    fn actor_title(&self) -> Option<String> {
        crate::extract::author::linked_actor_title(*self)
    }
}
