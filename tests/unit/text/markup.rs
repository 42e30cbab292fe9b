use super::*;

fn span(text: &str, shift: Shift) -> Span {
    Span {
        text: text.to_owned(),
        shift,
    }
}

#[test]
fn plain_text_is_one_span() {
    assert_eq!(parse_markup("1500"), vec![span("1500", Shift::Baseline)]);
}

#[test]
fn subscripts_split_the_text() {
    assert_eq!(
        parse_markup("C<sub>1</sub>H<sub>12</sub>"),
        vec![
            span("C", Shift::Baseline),
            span("1", Shift::Sub),
            span("H", Shift::Baseline),
            span("12", Shift::Sub),
        ]
    );
}

#[test]
fn superscripts_are_recognized() {
    assert_eq!(
        parse_markup("x<sup>2</sup>+1"),
        vec![
            span("x", Shift::Baseline),
            span("2", Shift::Super),
            span("+1", Shift::Baseline),
        ]
    );
}

#[test]
fn unclosed_tags_stay_literal() {
    assert_eq!(
        parse_markup("a<sub>b"),
        vec![span("a<sub>b", Shift::Baseline)]
    );
    assert_eq!(parse_markup("a<b"), vec![span("a<b", Shift::Baseline)]);
}

#[test]
fn empty_tags_produce_no_spans() {
    assert!(parse_markup("<sub></sub>").is_empty());
    assert!(parse_markup("").is_empty());
}

#[test]
fn visible_len_ignores_tags() {
    assert_eq!(visible_len(&parse_markup("H<sub>12</sub>O")), 4);
}
