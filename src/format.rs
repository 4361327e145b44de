use std::borrow::Cow;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::index::{OffsetUnit, TextIndex};
use crate::span::{Span, StyleKind};

/// Delimiters emitted around one span
struct Markers<'a> {
    open: Cow<'a, str>,
    close: Cow<'a, str>,
}

/// A start or end position derived from a span
struct Boundary {
    index: usize,
    is_start: bool,
    // Position in the markers list
    span: usize,
}

/// Insert markdown delimiters around `spans` in `text`.
///
/// Spans reaching past the text are clamped to it and zero-length spans
/// are dropped. Spans that cross without nesting are emitted in boundary
/// order as-is; markdown has no way to express them.
pub fn spans_to_markdown(text: &str, spans: &[Span], unit: OffsetUnit) -> Result<String> {
    if spans.is_empty() {
        return Ok(text.to_string());
    }

    let index = TextIndex::new(text, unit);
    let len = index.len();

    let mut ranges = Vec::with_capacity(spans.len());
    let mut markers = Vec::with_capacity(spans.len());
    for span in spans {
        let start = span.offset.min(len);
        let end = span.end().min(len);
        if end != span.end() {
            debug!(
                kind = %span.kind,
                offset = span.offset,
                length = span.length,
                text_len = len,
                "clamping span to text bounds"
            );
        }
        if end <= start {
            continue;
        }
        if let Some(m) = style_markers(span)? {
            ranges.push((start, end));
            markers.push(m);
        }
    }

    // All starts, then all ends; the stable sort keeps that order among ties.
    let mut boundaries: Vec<Boundary> = ranges
        .iter()
        .enumerate()
        .map(|(span, &(start, _))| Boundary {
            index: start,
            is_start: true,
            span,
        })
        .chain(ranges.iter().enumerate().map(|(span, &(_, end))| Boundary {
            index: end,
            is_start: false,
            span,
        }))
        .collect();
    boundaries.sort_by_key(|b| b.index);
    trace!(spans = markers.len(), boundaries = boundaries.len(), "emitting markdown");

    let mut out = String::with_capacity(text.len() + boundaries.len() * 2);
    let mut included = 0;
    for boundary in &boundaries {
        if boundary.index > included {
            out.push_str(index.slice(included, boundary.index));
            included = boundary.index;
        }
        let m = &markers[boundary.span];
        out.push_str(if boundary.is_start { &*m.open } else { &*m.close });
    }
    out.push_str(index.slice(included, len));

    Ok(out)
}

/// Delimiter table. `None` for kinds markdown has no syntax for.
fn style_markers(span: &Span) -> Result<Option<Markers<'_>>> {
    let (open, close) = match span.kind {
        StyleKind::TextLink => {
            let url = span.url.as_deref().ok_or_else(|| Error::MissingAttribute {
                kind: span.kind,
                attribute: "url",
                offset: span.offset,
            })?;
            (Cow::Borrowed("["), Cow::Owned(format!("]({url})")))
        }
        StyleKind::Bold => (Cow::Borrowed("**"), Cow::Borrowed("**")),
        StyleKind::Italic => (Cow::Borrowed("*"), Cow::Borrowed("*")),
        StyleKind::Strikethrough => (Cow::Borrowed("~~"), Cow::Borrowed("~~")),
        StyleKind::Code => (Cow::Borrowed("`"), Cow::Borrowed("`")),
        StyleKind::Pre => {
            let language = span.language.as_deref().unwrap_or("");
            (Cow::Owned(format!("```{language}\n")), Cow::Borrowed("\n```"))
        }
        StyleKind::Underline | StyleKind::Other => return Ok(None),
    };
    Ok(Some(Markers { open, close }))
}
