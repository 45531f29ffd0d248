//! Drug-label HTML -> downloadable PDF
//!
//! Labels arrive as full HTML pages. Only the body is kept, table spans are
//! dropped, and the text is laid out as wrapped lines on A4 pages.

use std::io::BufWriter;
use std::sync::LazyLock;

use printpdf::{BuiltinFont, Mm, PdfDocument};
use regex::Regex;
use thiserror::Error;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 20.0;
const TOP_Y: f32 = 277.0;
const BOTTOM_Y: f32 = 20.0;
const FONT_SIZE: f32 = 10.0;
const LINE_HEIGHT: f32 = 5.0;
const MAX_LINE_CHARS: usize = 90;

static BODY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<body\b[^>]*>.*?</body\s*>").unwrap());
static SPAN_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\s*(?:colspan|rowspan)="\d+""#).unwrap());
static SCRIPT_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(?:script|style)\b[^>]*>.*?</(?:script|style)\s*>").unwrap());
static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?(?:p|div|br|h[1-6]|li|ul|ol|tr|table|section|article|header|footer)\b[^>]*>")
        .unwrap()
});
static CELL_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</t[dh]\s*>").unwrap());
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// PDF generation errors
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Document has no text to render")]
    EmptyDocument,

    #[error("PDF render error: {0}")]
    Render(String),
}

/// Keep only the `<body>` element and remove `colspan`/`rowspan` attributes.
///
/// Input without a body element is used whole.
pub fn prepare_html(html: &str) -> String {
    let body = BODY.find(html).map(|m| m.as_str()).unwrap_or(html);
    SPAN_ATTR.replace_all(body, "").into_owned()
}

/// Visible text of `html`, one entry per non-empty block line
pub fn html_to_lines(html: &str) -> Vec<String> {
    let text = SCRIPT_STYLE.replace_all(html, "");
    let text = BLOCK_TAG.replace_all(&text, "\n");
    let text = CELL_END.replace_all(&text, " ");
    let text = ANY_TAG.replace_all(&text, "");
    let text = decode_entities(&text);

    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Render label HTML to PDF bytes
pub fn render_pdf(html: &str) -> Result<Vec<u8>, PdfError> {
    let lines = html_to_lines(&prepare_html(html));
    if lines.is_empty() {
        return Err(PdfError::EmptyDocument);
    }

    let (doc, page, layer) =
        PdfDocument::new("Drug label", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| PdfError::Render(format!("font error: {e}")))?;

    let mut layer = doc.get_page(page).get_layer(layer);
    let mut y = TOP_Y;

    for line in lines.iter().flat_map(|line| wrap_text(line, MAX_LINE_CHARS)) {
        if y < BOTTOM_Y {
            let (page, next) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            layer = doc.get_page(page).get_layer(next);
            y = TOP_Y;
        }
        layer.use_text(line, FONT_SIZE, Mm(MARGIN_LEFT), Mm(y), &font);
        y -= LINE_HEIGHT;
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| PdfError::Render(format!("save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| PdfError::Render(format!("buffer error: {e}")))
}

/// Greedy word wrap; a single word longer than `max_chars` gets its own line
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = current.chars().count() + word.chars().count() + 1;
        if !current.is_empty() && needed > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
