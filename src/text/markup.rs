/// Vertical placement of a run of text relative to the baseline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shift {
    Baseline,
    Sub,
    Super,
}

/// A run of literal text with a single baseline shift.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub shift: Shift,
}

const TAGS: &[(Shift, &str, &str)] = &[
    (Shift::Sub, "<sub>", "</sub>"),
    (Shift::Super, "<sup>", "</sup>"),
];

/// Split caption markup into spans.
///
/// Only `<sub>…</sub>` and `<sup>…</sup>` are understood; they do not nest. Anything else,
/// including an opening tag without its closing tag, is literal text.
pub fn parse_markup(markup: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut rest = markup;

    'outer: while !rest.is_empty() {
        for &(shift, open, close) in TAGS {
            let Some(body) = rest.strip_prefix(open) else {
                continue;
            };
            let Some(end) = body.find(close) else {
                continue;
            };
            flush(&mut spans, &mut plain);
            if end > 0 {
                spans.push(Span {
                    text: body[..end].to_owned(),
                    shift,
                });
            }
            rest = &body[end + close.len()..];
            continue 'outer;
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            plain.push(c);
        }
        rest = chars.as_str();
    }

    flush(&mut spans, &mut plain);
    spans
}

fn flush(spans: &mut Vec<Span>, plain: &mut String) {
    if !plain.is_empty() {
        spans.push(Span {
            text: std::mem::take(plain),
            shift: Shift::Baseline,
        });
    }
}

/// Number of visible characters in the markup, ignoring recognized tags.
pub fn visible_len(spans: &[Span]) -> usize {
    spans.iter().map(|s| s.text.chars().count()).sum()
}

#[cfg(test)]
#[path = "../../tests/unit/text/markup.rs"]
mod tests;
