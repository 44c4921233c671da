use std::collections::BTreeMap;
use std::path::Path;

use encoding_rs::UTF_16BE;
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::debug;

use crate::error::ReportError;
use crate::model::{PageFragments, Rect, TextFragment};
use crate::options::PageSelection;

/// Glyph advance used when a font carries no `Widths` array, in 1/1000 em.
const FALLBACK_GLYPH_WIDTH: f32 = 500.0;
const ASCENT_RATIO: f32 = 0.8;
const DESCENT_RATIO: f32 = 0.2;
/// A horizontal jump wider than this many em on one baseline starts a new cell.
const CELL_GAP_EM: f32 = 1.5;
/// A gap wider than this many em between two shows is rendered as a space.
const WORD_GAP_EM: f32 = 0.2;

/// Row-vector affine matrix `[a b c d e f]` as used throughout PDF.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f32; 6]);

impl Matrix {
    const IDENTITY: Self = Self([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translation(tx: f32, ty: f32) -> Self {
        Self([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self × other`: apply `self` first, then `other`.
    fn then(self, other: Self) -> Self {
        let [a, b, c, d, e, f] = self.0;
        let [oa, ob, oc, od, oe, of] = other.0;
        Self([
            a * oa + b * oc,
            a * ob + b * od,
            c * oa + d * oc,
            c * ob + d * od,
            e * oa + f * oc + oe,
            e * ob + f * od + of,
        ])
    }

    fn apply(self, x: f32, y: f32) -> (f32, f32) {
        let [a, b, c, d, e, f] = self.0;
        (x * a + y * c + e, x * b + y * d + f)
    }

    fn vertical_scale(self) -> f32 {
        let [_, b, _, d, _, _] = self.0;
        (b * b + d * d).sqrt()
    }
}

#[derive(Debug, Clone, Default)]
struct FontInfo {
    encoding: Option<String>,
    first_char: i64,
    widths: Vec<f32>,
    two_byte: bool,
}

impl FontInfo {
    fn from_dictionary(document: &Document, font: &Dictionary) -> Self {
        let two_byte = font
            .get(b"Subtype")
            .and_then(|subtype| subtype.as_name())
            .is_ok_and(|name| name == b"Type0");
        let first_char = font
            .get(b"FirstChar")
            .and_then(|value| value.as_i64())
            .unwrap_or(0);
        let widths = font
            .get(b"Widths")
            .ok()
            .map(|value| resolve(document, value))
            .and_then(|value| value.as_array().ok())
            .map(|items| items.iter().filter_map(number).collect())
            .unwrap_or_default();

        Self {
            encoding: Some(font.get_font_encoding().to_string()),
            first_char,
            widths,
            two_byte,
        }
    }

    /// Advance of `bytes` in text space units before horizontal scaling.
    fn advance(&self, bytes: &[u8], size: f32, char_spacing: f32, word_spacing: f32) -> f32 {
        if self.two_byte {
            let codes = bytes.len().div_ceil(2) as f32;
            return codes * (FALLBACK_GLYPH_WIDTH / 1000.0 * size + char_spacing);
        }

        bytes
            .iter()
            .map(|&code| {
                let glyph = usize::try_from(i64::from(code) - self.first_char)
                    .ok()
                    .and_then(|index| self.widths.get(index).copied())
                    .filter(|width| *width > 0.0)
                    .unwrap_or(FALLBACK_GLYPH_WIDTH);
                let spacing = if code == b' ' { word_spacing } else { 0.0 };
                glyph / 1000.0 * size + char_spacing + spacing
            })
            .sum()
    }
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> &'a Object {
    object
        .as_reference()
        .ok()
        .and_then(|id| document.get_object(id).ok())
        .unwrap_or(object)
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value as f32),
        _ => None,
    }
}

fn numbers<const N: usize>(operands: &[Object]) -> Option<[f32; N]> {
    let mut out = [0.0; N];
    for (slot, operand) in out.iter_mut().zip(operands) {
        *slot = number(operand)?;
    }
    (operands.len() >= N).then_some(out)
}

fn looks_decoding_broken(text: &str) -> bool {
    let total = text.chars().count();
    if total == 0 {
        return false;
    }

    let replacement = text.matches('\u{FFFD}').count();
    let control = text
        .chars()
        .filter(|ch| ch.is_control() && !matches!(ch, '\n' | '\r' | '\t'))
        .count();

    replacement * 8 > total || control * 5 > total
}

fn decode_pdf_bytes(encoding: Option<&str>, bytes: &[u8]) -> String {
    let decoded = Document::decode_text(encoding, bytes);
    if !looks_decoding_broken(&decoded) {
        return decoded;
    }

    let is_utf16 = bytes.starts_with(&[0xFE, 0xFF])
        || encoding.is_some_and(|name| {
            let lower = name.to_ascii_lowercase();
            lower.contains("utf16") || lower.contains("ucs2") || lower.contains("identity-h")
        });
    if is_utf16 {
        let payload = bytes.strip_prefix(&[0xFE, 0xFF]).unwrap_or(bytes);
        let (utf16, had_errors) = UTF_16BE.decode_without_bom_handling(payload);
        if !had_errors && !utf16.is_empty() {
            return utf16.into_owned();
        }
    }

    String::from_utf8_lossy(bytes).to_string()
}

/// One run of glyphs painted by a single show operator, in page space.
#[derive(Debug, Clone)]
struct Show {
    text: String,
    start_x: f32,
    end_x: f32,
    baseline: f32,
    size: f32,
}

impl Show {
    fn bounds(&self) -> Rect {
        Rect::new(
            self.start_x.min(self.end_x),
            self.baseline - self.size * DESCENT_RATIO,
            self.start_x.max(self.end_x),
            self.baseline + self.size * ASCENT_RATIO,
        )
    }
}

/// Accumulates consecutive shows into one fragment while they read as one
/// cell: same baseline and close together, or a following line that starts
/// at the same left edge.
#[derive(Debug, Default)]
struct FragmentBuilder {
    text: String,
    bounds: Option<Rect>,
    line_start_x: f32,
    last_end_x: f32,
    last_baseline: f32,
}

impl FragmentBuilder {
    fn push(&mut self, show: Show, finished: &mut Vec<TextFragment>) {
        if let Some(bounds) = self.bounds {
            let tolerance = show.size * 0.1;
            let same_line = (show.baseline - self.last_baseline).abs() <= tolerance;
            let gap = show.start_x - self.last_end_x;
            let drop = self.last_baseline - show.baseline;

            if same_line && gap <= CELL_GAP_EM * show.size {
                if gap > WORD_GAP_EM * show.size
                    && !self.text.ends_with(' ')
                    && !show.text.starts_with(' ')
                {
                    self.text.push(' ');
                }
            } else if !same_line
                && drop > 0.0
                && drop <= CELL_GAP_EM * show.size
                && (show.start_x - self.line_start_x).abs() <= show.size
            {
                self.text.push('\n');
                self.line_start_x = show.start_x;
            } else {
                self.finish(finished);
                return self.push(show, finished);
            }

            let next = show.bounds();
            self.bounds = Some(Rect::new(
                bounds.x0.min(next.x0),
                bounds.y0.min(next.y0),
                bounds.x1.max(next.x1),
                bounds.y1.max(next.y1),
            ));
        } else {
            self.bounds = Some(show.bounds());
            self.line_start_x = show.start_x;
        }

        self.text.push_str(&show.text);
        self.last_end_x = show.end_x;
        self.last_baseline = show.baseline;
    }

    fn finish(&mut self, finished: &mut Vec<TextFragment>) {
        let text = std::mem::take(&mut self.text);
        if let Some(bounds) = self.bounds.take() {
            let fragment = TextFragment::new(bounds, text);
            if !fragment.is_blank() {
                finished.push(fragment);
            }
        }
    }
}

#[derive(Debug, Clone)]
struct TextState {
    ctm: Matrix,
    text_matrix: Matrix,
    line_matrix: Matrix,
    font: Vec<u8>,
    size: f32,
    leading: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    rise: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font: Vec::new(),
            size: 0.0,
            leading: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            rise: 0.0,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).then(self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    fn advance(&mut self, tx: f32) {
        self.text_matrix = Matrix::translation(tx, 0.0).then(self.text_matrix);
    }

    fn show(&mut self, bytes: &[u8], fonts: &BTreeMap<Vec<u8>, FontInfo>) -> Show {
        let font = fonts.get(&self.font).cloned().unwrap_or_default();
        let render = self.text_matrix.then(self.ctm);
        let (start_x, baseline) = render.apply(0.0, self.rise);

        let advance = font.advance(bytes, self.size, self.char_spacing, self.word_spacing)
            * self.horizontal_scale;
        self.advance(advance);
        let (end_x, _) = self.text_matrix.then(self.ctm).apply(0.0, self.rise);

        Show {
            text: decode_pdf_bytes(font.encoding.as_deref(), bytes),
            start_x,
            end_x,
            baseline,
            size: self.size * render.vertical_scale(),
        }
    }

    /// `TJ` numbers move the pen left by thousandths of an em.
    fn kern(&mut self, adjustment: f32) {
        self.advance(-adjustment / 1000.0 * self.size * self.horizontal_scale);
    }
}

fn page_fonts(document: &Document, page_id: ObjectId) -> BTreeMap<Vec<u8>, FontInfo> {
    document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, FontInfo::from_dictionary(document, font)))
        .collect()
}

/// Walks a page's content stream and returns its text fragments in stream order.
pub(crate) fn extract_page_fragments(
    document: &Document,
    page_id: ObjectId,
) -> Result<Vec<TextFragment>, ReportError> {
    let raw_content = document.get_page_content(page_id)?;
    let content = Content::decode(&raw_content)?;
    let fonts = page_fonts(document, page_id);

    let mut state = TextState::default();
    let mut saved = Vec::new();
    let mut builder = FragmentBuilder::default();
    let mut fragments = Vec::new();

    for operation in content.operations {
        let operands = operation.operands.as_slice();
        match operation.operator.as_str() {
            "q" => saved.push(state.ctm),
            "Q" => state.ctm = saved.pop().unwrap_or(Matrix::IDENTITY),
            "cm" => {
                if let Some(values) = numbers::<6>(operands) {
                    state.ctm = Matrix(values).then(state.ctm);
                }
            }
            "BT" => {
                state.text_matrix = Matrix::IDENTITY;
                state.line_matrix = Matrix::IDENTITY;
            }
            "ET" => builder.finish(&mut fragments),
            "Tf" => {
                if let (Some(name), Some(size)) = (
                    operands.first().and_then(|operand| operand.as_name().ok()),
                    operands.get(1).and_then(number),
                ) {
                    state.font = name.to_vec();
                    state.size = size;
                }
            }
            "TL" => {
                if let Some([leading]) = numbers::<1>(operands) {
                    state.leading = leading;
                }
            }
            "Tc" => {
                if let Some([spacing]) = numbers::<1>(operands) {
                    state.char_spacing = spacing;
                }
            }
            "Tw" => {
                if let Some([spacing]) = numbers::<1>(operands) {
                    state.word_spacing = spacing;
                }
            }
            "Tz" => {
                if let Some([scale]) = numbers::<1>(operands) {
                    state.horizontal_scale = scale / 100.0;
                }
            }
            "Ts" => {
                if let Some([rise]) = numbers::<1>(operands) {
                    state.rise = rise;
                }
            }
            "Td" => {
                if let Some([tx, ty]) = numbers::<2>(operands) {
                    state.move_line(tx, ty);
                }
            }
            "TD" => {
                if let Some([tx, ty]) = numbers::<2>(operands) {
                    state.leading = -ty;
                    state.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(values) = numbers::<6>(operands) {
                    state.line_matrix = Matrix(values);
                    state.text_matrix = state.line_matrix;
                }
            }
            "T*" => state.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let show = state.show(bytes, &fonts);
                    builder.push(show, &mut fragments);
                }
            }
            "'" => {
                state.next_line();
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let show = state.show(bytes, &fonts);
                    builder.push(show, &mut fragments);
                }
            }
            "\"" => {
                if let Some([word, char_spacing]) = numbers::<2>(operands) {
                    state.word_spacing = word;
                    state.char_spacing = char_spacing;
                }
                state.next_line();
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    let show = state.show(bytes, &fonts);
                    builder.push(show, &mut fragments);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => {
                                let show = state.show(bytes, &fonts);
                                builder.push(show, &mut fragments);
                            }
                            other => {
                                if let Some(adjustment) = number(other) {
                                    state.kern(adjustment);
                                }
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    builder.finish(&mut fragments);
    Ok(fragments)
}

fn read_document_pages(
    document: &Document,
    page_selection: Option<&PageSelection>,
) -> Result<Vec<PageFragments>, ReportError> {
    let mut pages = Vec::new();
    for (page_number, page_id) in document.get_pages() {
        if page_selection.is_some_and(|selection| !selection.contains(page_number)) {
            continue;
        }

        let fragments = extract_page_fragments(document, page_id)?;
        debug!(
            page = page_number,
            fragments = fragments.len(),
            "extracted page fragments"
        );
        pages.push(PageFragments {
            page_number,
            fragments,
        });
    }

    if pages.is_empty() {
        return Err(ReportError::NoPagesSelected);
    }

    Ok(pages)
}

pub(crate) fn read_pdf_pages(
    input_pdf: &Path,
    page_selection: Option<&PageSelection>,
) -> Result<Vec<PageFragments>, ReportError> {
    let document = Document::load(input_pdf)?;
    read_document_pages(&document, page_selection)
}

pub(crate) fn read_pdf_pages_from_bytes(
    input_pdf: &[u8],
    page_selection: Option<&PageSelection>,
) -> Result<Vec<PageFragments>, ReportError> {
    let document = Document::load_mem(input_pdf)?;
    read_document_pages(&document, page_selection)
}

#[cfg(test)]
mod tests {
    use super::{FragmentBuilder, Matrix, Show, looks_decoding_broken};

    fn show(text: &str, start_x: f32, end_x: f32, baseline: f32) -> Show {
        Show {
            text: text.to_string(),
            start_x,
            end_x,
            baseline,
            size: 10.0,
        }
    }

    #[test]
    fn composes_matrices_in_pdf_order() {
        let scaled = Matrix([2.0, 0.0, 0.0, 2.0, 0.0, 0.0]);
        let moved = Matrix::translation(10.0, 20.0).then(scaled);
        assert_eq!(moved.apply(1.0, 1.0), (22.0, 42.0));
        assert_eq!(moved.vertical_scale(), 2.0);
    }

    #[test]
    fn flags_text_dominated_by_replacement_or_control_chars() {
        assert!(!looks_decoding_broken("Doe, John"));
        assert!(!looks_decoding_broken(""));
        assert!(looks_decoding_broken("\u{0}D\u{0}o\u{0}e"));
        assert!(looks_decoding_broken("\u{FFFD}\u{FFFD}ab"));
    }

    #[test]
    fn joins_nearby_shows_and_splits_distant_ones() {
        let mut builder = FragmentBuilder::default();
        let mut finished = Vec::new();
        builder.push(show("MEM@HOU", 200.0, 235.0, 500.0), &mut finished);
        builder.push(show("Memphis", 238.0, 273.0, 500.0), &mut finished);
        builder.push(show("Doe, John", 380.0, 425.0, 500.0), &mut finished);
        builder.finish(&mut finished);

        assert_eq!(finished.len(), 2);
        assert_eq!(finished[0].text, "MEM@HOU Memphis");
        assert_eq!(finished[0].bounds.x0, 200.0);
        assert_eq!(finished[0].bounds.x1, 273.0);
        assert_eq!(finished[1].text, "Doe, John");
    }

    #[test]
    fn wrapped_line_at_same_left_edge_continues_fragment() {
        let mut builder = FragmentBuilder::default();
        let mut finished = Vec::new();
        builder.push(show("Injury/Illness -", 580.0, 660.0, 500.0), &mut finished);
        builder.push(show("Left Ankle", 580.0, 630.0, 488.0), &mut finished);
        builder.push(show("Doe, John", 380.0, 425.0, 470.0), &mut finished);
        builder.finish(&mut finished);

        assert_eq!(finished.len(), 2);
        assert_eq!(finished[0].text, "Injury/Illness -\nLeft Ankle");
        assert_eq!(finished[0].bounds.y0, 488.0 - 2.0);
        assert_eq!(finished[0].bounds.y1, 500.0 + 8.0);
    }
}
