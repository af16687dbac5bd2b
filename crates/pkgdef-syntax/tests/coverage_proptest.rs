use pkgdef_syntax::{parse, split_lines, tokenize};
use proptest::prelude::*;

fn line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("[$RootKey$\\Key]".to_string()),
        Just("[broken".to_string()),
        Just("@=\"x\"".to_string()),
        Just("\"n\" = dword:0000000g".to_string()),
        Just("; comment".to_string()),
        Just("/* open".to_string()),
        Just("close */".to_string()),
        Just("#include \"x\"".to_string()),
        Just("   ".to_string()),
        Just("\"Näme\" = \"$Aé$ ü\"".to_string()),
        "[ -~]{0,40}",
    ]
}

fn source() -> impl Strategy<Value = String> {
    prop::collection::vec((line(), prop_oneof![Just("\n"), Just("\r\n")]), 0..20).prop_map(
        |lines| {
            lines
                .into_iter()
                .map(|(l, eol)| format!("{}{}", l, eol))
                .collect()
        },
    )
}

fn slice(text: &str, start: usize, end: usize) -> String {
    text.chars().skip(start).take(end - start).collect()
}

proptest! {
    #[test]
    fn items_cover_input_without_gaps(text in source()) {
        let items = tokenize(&split_lines(&text));

        let mut expected_start = 0;
        for item in &items {
            prop_assert_eq!(item.span.start, expected_start);
            prop_assert_eq!(slice(&text, item.span.start, item.span.end), item.text.clone());
            expected_start = item.span.end;
        }
        prop_assert_eq!(expected_start, text.chars().count());
    }

    #[test]
    fn references_stay_inside_their_host(text in source()) {
        for item in tokenize(&split_lines(&text)) {
            for reference in &item.references {
                let span = reference.span();
                prop_assert!(span.start >= item.span.start && span.end <= item.span.end);
                prop_assert_eq!(slice(&text, span.start, span.end), reference.text());
            }
        }
    }

    #[test]
    fn validity_matches_error_sets(text in source()) {
        let doc = parse(&split_lines(&text));
        let clean = doc
            .items()
            .iter()
            .all(|i| i.errors.is_empty() && i.references.iter().all(|r| r.errors.is_empty()));
        prop_assert_eq!(doc.is_valid(), clean);
        prop_assert_eq!(doc.is_valid(), doc.error_count() == 0);
    }
}
