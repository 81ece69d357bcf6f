use crate::parsers::ParseResult;
use crate::parsers::text::normalize_whitespace;
use crate::results::LinkRef;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

const BLOCK_TAGS: [&str; 10] = [
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "p",
    "li",
    "pre",
    "blockquote",
];

const INLINE_TAGS: [&str; 24] = [
    "a", "abbr", "b", "bdi", "button", "cite", "code", "em", "i", "img", "input", "kbd", "label",
    "mark", "picture", "q", "s", "small", "span", "strong", "sub", "sup", "time", "wbr",
];

const SKIPPED_TAGS: [&str; 7] = ["head", "noscript", "script", "style", "svg", "template", "iframe"];

static BODY: LazyLock<Selector> = LazyLock::new(|| parse_selector("body"));
static NAVIGATION: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector(
        "a, button, [role=button], input[type=button], input[type=submit]",
    )
});
static IMAGES: LazyLock<Selector> = LazyLock::new(|| parse_selector("img"));
static VIDEOS: LazyLock<Selector> = LazyLock::new(|| parse_selector("video"));
static AUDIOS: LazyLock<Selector> = LazyLock::new(|| parse_selector("audio"));
static SOURCES: LazyLock<Selector> = LazyLock::new(|| parse_selector("source"));

fn parse_selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector should be valid")
}

/// Parses an HTML page into content, classified links and media
///
/// # Arguments
///
/// * `html` - Page source
/// * `page_url` - URL the page was loaded from; used to resolve links and to
///   decide which of them are internal
pub fn parse(html: &str, page_url: &Url) -> ParseResult {
    let doc = Html::parse_document(html);

    let mut result = ParseResult::content_only(extract_content(&doc, page_url));

    for element in doc.select(&NAVIGATION) {
        let Some((link, internal)) = classify_element(&element, page_url) else {
            continue;
        };
        if internal {
            result.internal_links.push(link);
        } else {
            result.external_links.push(link);
        }
    }

    result.images = media_sources(&doc, &IMAGES);
    result.videos = media_sources(&doc, &VIDEOS);
    result.audios = media_sources(&doc, &AUDIOS);

    ::log::debug!(
        "HTML parser found {} internal and {} external links on {}",
        result.internal_links.len(),
        result.external_links.len(),
        page_url
    );

    result
}

/// Renders the body as markdown-like lines
///
/// Headings, paragraphs, list items, quotes and `<pre>` become their own
/// lines. Text sitting directly in containers (`div`, `nav`, `section`, ...)
/// is kept as a line per container run. Navigating anchors render as
/// `[text](href)` so link targets survive in the saved page.
fn extract_content(doc: &Html, page_url: &Url) -> String {
    let root = doc
        .select(&BODY)
        .next()
        .unwrap_or_else(|| doc.root_element());

    let mut lines = Vec::new();
    let mut run = String::new();
    collect_lines(&root, page_url, &mut lines, &mut run);
    flush_run(&mut lines, &mut run);

    lines.join("\n\n")
}

fn collect_lines(element: &ElementRef, page_url: &Url, lines: &mut Vec<String>, run: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            run.push_str(text);
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };

        let name = child.value().name();
        if SKIPPED_TAGS.contains(&name) {
            continue;
        }

        if BLOCK_TAGS.contains(&name) {
            flush_run(lines, run);
            if let Some(line) = render_block(&child, page_url) {
                lines.push(line);
            }
        } else if INLINE_TAGS.contains(&name) {
            render_inline(&child, page_url, run);
        } else {
            flush_run(lines, run);
            collect_lines(&child, page_url, lines, run);
            flush_run(lines, run);
        }
    }
}

fn flush_run(lines: &mut Vec<String>, run: &mut String) {
    let text = normalize_whitespace(run);
    if !text.is_empty() {
        lines.push(text);
    }
    run.clear();
}

fn render_block(block: &ElementRef, page_url: &Url) -> Option<String> {
    let name = block.value().name();
    if name == "pre" {
        let code = block.text().collect::<String>();
        return Some(format!("```\n{}\n```", code.trim_end()));
    }

    let mut inline = String::new();
    render_children(block, page_url, &mut inline);
    let text = normalize_whitespace(&inline);
    if text.is_empty() {
        return None;
    }

    Some(match name {
        "h1" => format!("# {text}"),
        "h2" => format!("## {text}"),
        "h3" => format!("### {text}"),
        "h4" => format!("#### {text}"),
        "h5" => format!("##### {text}"),
        "h6" => format!("###### {text}"),
        "li" => format!("- {text}"),
        "blockquote" => format!("> {text}"),
        _ => text,
    })
}

fn render_children(element: &ElementRef, page_url: &Url, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            render_inline(&child, page_url, out);
        }
    }
}

fn render_inline(element: &ElementRef, page_url: &Url, out: &mut String) {
    let name = element.value().name();
    if SKIPPED_TAGS.contains(&name) {
        return;
    }

    if let Some(href) = link_target(element, page_url) {
        out.push_str(&format!(" [{}]({}) ", display_text(element), href));
        return;
    }

    // Nested blocks inside a block or inline run still need a word break
    let spaced = !INLINE_TAGS.contains(&name);
    if spaced {
        out.push(' ');
    }
    render_children(element, page_url, out);
    if spaced {
        out.push(' ');
    }
}

/// The href of an anchor that navigates to a web page
fn link_target<'a>(element: &ElementRef<'a>, page_url: &Url) -> Option<&'a str> {
    if element.value().name() != "a" || is_interactive_control(element) {
        return None;
    }

    let href = element.value().attr("href")?.trim();
    let resolved = page_url.join(href).ok()?;
    matches!(resolved.scheme(), "http" | "https").then_some(href)
}

/// Turns an anchor or control into a [`LinkRef`], returning whether it is internal
///
/// Controls always count as internal and point at the page itself. Anchors
/// with non-web schemes (mailto:, tel:) are dropped.
fn classify_element(element: &ElementRef, page_url: &Url) -> Option<(LinkRef, bool)> {
    let text = display_text(element);

    if is_interactive_control(element) {
        return Some((LinkRef::control(page_url.as_str(), text), true));
    }

    let href = element.value().attr("href")?.trim();
    let resolved = page_url.join(href).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }

    let internal = resolved.host_str() == page_url.host_str();
    Some((LinkRef::link(href, text), internal))
}

/// Buttons, `role=button` elements and anchors that do not navigate anywhere
fn is_interactive_control(element: &ElementRef) -> bool {
    let value = element.value();
    if matches!(value.name(), "button" | "input") || value.attr("role") == Some("button") {
        return true;
    }

    match value.attr("href").map(str::trim) {
        None => true,
        Some(href) => {
            href.is_empty() || href == "#" || href.to_ascii_lowercase().starts_with("javascript:")
        }
    }
}

fn display_text(element: &ElementRef) -> String {
    let value = element.value();
    if value.name() == "input" {
        return value.attr("value").unwrap_or_default().trim().to_string();
    }

    let text = normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "));
    if !text.is_empty() {
        return text;
    }

    value
        .attr("aria-label")
        .or_else(|| value.attr("title"))
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Collects `src` (or `data-src`, or a nested `<source>`) of each matched element
///
/// Elements without any source still count, with an empty entry.
fn media_sources(doc: &Html, selector: &Selector) -> Vec<String> {
    doc.select(selector)
        .map(|element| {
            let value = element.value();
            value
                .attr("src")
                .or_else(|| value.attr("data-src"))
                .map(str::to_string)
                .or_else(|| {
                    element
                        .select(&SOURCES)
                        .find_map(|source| source.value().attr("src").map(str::to_string))
                })
                .unwrap_or_default()
        })
        .collect()
}
