//! Extractor tests: call-site recognition, literal handling, diagnostics.

use i18n_extractor::catalog::MessageKey;
use i18n_extractor::diagnostics::Severity;
use i18n_extractor::extract::{extract_unit, MarkerConfig, MarkerSpec};
use i18n_extractor::source::{SourceReference, Span};
use i18n_extractor::syntax::{Call, Concat, Expr, Ident, StringLit, TranslationUnit};

fn lit(value: &str, line: u32, col: u32) -> Expr {
    Expr::StringLit(StringLit::new(value, Span::new(line, col)))
}

fn ident(name: &str, line: u32, col: u32) -> Expr {
    Expr::Ident(Ident::new(name, Span::new(line, col)))
}

fn call(callee: &str, args: Vec<Expr>, line: u32, col: u32) -> Expr {
    Expr::Call(Call::new(callee, args, Span::new(line, col)))
}

fn unit(file: &str, roots: Vec<Expr>) -> TranslationUnit {
    TranslationUnit::new(file, roots)
}

mod recognition {
    use super::*;

    #[test]
    fn extracts_a_simple_call() {
        let unit = unit(
            "a.src",
            vec![call(
                "translate",
                vec![lit("greeting", 3, 11), lit("Hello", 3, 23)],
                3,
                1,
            )],
        );
        let result = extract_unit(&unit, &MarkerConfig::default());

        assert!(result.diagnostics.is_empty());
        assert_eq!(result.messages.len(), 1);
        let message = &result.messages[0];
        assert_eq!(message.key, MessageKey::singular("greeting"));
        assert_eq!(message.text.to_vec(), vec!["Hello".to_string()]);
        assert_eq!(message.reference, SourceReference::new("a.src", 3, 1));
    }

    #[test]
    fn ignores_unrecognized_callees() {
        let unit = unit(
            "a.src",
            vec![call("printf", vec![lit("not a message", 1, 8)], 1, 1)],
        );
        let result = extract_unit(&unit, &MarkerConfig::default());
        assert!(result.messages.is_empty());
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn finds_markers_nested_in_other_calls() {
        let inner = call(
            "translate",
            vec![lit("inner", 5, 20), lit("Inner", 5, 29)],
            5,
            10,
        );
        let unit = unit("a.src", vec![call("wrap", vec![inner], 5, 1)]);
        let result = extract_unit(&unit, &MarkerConfig::default());
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].key, MessageKey::singular("inner"));
    }

    #[test]
    fn honors_a_custom_marker_set() {
        let config = MarkerConfig::new(vec![MarkerSpec::new("tr", 0, 1)]);
        let unit = unit(
            "a.src",
            vec![
                call("tr", vec![lit("k", 1, 4), lit("T", 1, 9)], 1, 1),
                call("translate", vec![lit("x", 2, 11), lit("X", 2, 16)], 2, 1),
            ],
        );
        let result = extract_unit(&unit, &config);
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].key, MessageKey::singular("k"));
    }
}

mod shapes {
    use super::*;

    #[test]
    fn context_argument_becomes_part_of_the_key() {
        let unit = unit(
            "a.src",
            vec![call(
                "translate_ctx",
                vec![lit("menu", 1, 15), lit("open", 1, 23), lit("Open", 1, 31)],
                1,
                1,
            )],
        );
        let result = extract_unit(&unit, &MarkerConfig::default());
        assert_eq!(result.messages.len(), 1);
        assert_eq!(
            result.messages[0].key,
            MessageKey::with_context("menu", "open")
        );
    }

    #[test]
    fn empty_context_folds_to_absent_by_default() {
        let roots = vec![call(
            "translate_ctx",
            vec![lit("", 1, 15), lit("open", 1, 19), lit("Open", 1, 27)],
            1,
            1,
        )];
        let result = extract_unit(&unit("a.src", roots), &MarkerConfig::default());
        assert_eq!(result.messages[0].key, MessageKey::singular("open"));
    }

    #[test]
    fn empty_context_stays_distinct_when_configured() {
        let mut config = MarkerConfig::default();
        config.distinct_empty_context = true;
        let roots = vec![call(
            "translate_ctx",
            vec![lit("", 1, 15), lit("open", 1, 19), lit("Open", 1, 27)],
            1,
            1,
        )];
        let result = extract_unit(&unit("a.src", roots), &config);
        assert_eq!(result.messages[0].key, MessageKey::with_context("", "open"));
    }

    #[test]
    fn plural_call_contributes_two_forms() {
        let unit = unit(
            "a.src",
            vec![call(
                "translate_plural",
                vec![
                    lit("apples", 2, 18),
                    lit("an apple", 2, 28),
                    lit("{n} apples", 2, 40),
                ],
                2,
                1,
            )],
        );
        let result = extract_unit(&unit, &MarkerConfig::default());
        assert_eq!(result.messages.len(), 1);
        let message = &result.messages[0];
        assert_eq!(message.key.plural_forms, 2);
        assert_eq!(
            message.text.to_vec(),
            vec!["an apple".to_string(), "{n} apples".to_string()]
        );
    }

    #[test]
    fn adjacent_literals_are_merged_before_key_derivation() {
        let text = Expr::Concat(Concat::new(
            vec![lit("Hello, ", 1, 25), lit("world", 2, 25)],
            Span::new(1, 25),
        ));
        let unit = unit(
            "a.src",
            vec![call("translate", vec![lit("greeting", 1, 11), text], 1, 1)],
        );
        let result = extract_unit(&unit, &MarkerConfig::default());
        assert_eq!(
            result.messages[0].text.to_vec(),
            vec!["Hello, world".to_string()]
        );
    }
}

mod failure_modes {
    use super::*;

    #[test]
    fn computed_text_is_skipped_with_a_warning() {
        let unit = unit(
            "a.src",
            vec![call(
                "translate",
                vec![lit("greeting", 4, 11), ident("dynamic", 4, 23)],
                4,
                1,
            )],
        );
        let result = extract_unit(&unit, &MarkerConfig::default());

        assert!(result.messages.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
        let diagnostic = &result.diagnostics[0];
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert!(diagnostic.message.contains("computed source text"));
        assert_eq!(
            diagnostic.reference,
            Some(SourceReference::new("a.src", 4, 23))
        );
    }

    #[test]
    fn concat_with_a_computed_part_is_not_literal() {
        let text = Expr::Concat(Concat::new(
            vec![lit("Hello, ", 1, 25), ident("name", 1, 36)],
            Span::new(1, 25),
        ));
        let unit = unit(
            "a.src",
            vec![call("translate", vec![lit("greeting", 1, 11), text], 1, 1)],
        );
        let result = extract_unit(&unit, &MarkerConfig::default());
        assert!(result.messages.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].severity, Severity::Warning);
    }

    #[test]
    fn malformed_call_reports_and_traversal_continues() {
        let unit = unit(
            "a.src",
            vec![
                call("translate", vec![lit("lonely", 1, 11)], 1, 1),
                call(
                    "translate",
                    vec![lit("greeting", 2, 11), lit("Hello", 2, 23)],
                    2,
                    1,
                ),
            ],
        );
        let result = extract_unit(&unit, &MarkerConfig::default());

        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].key, MessageKey::singular("greeting"));
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].severity, Severity::Error);
        assert!(result.diagnostics[0]
            .message
            .contains("expects at least 2 arguments"));
    }

    #[test]
    fn empty_message_id_is_an_error() {
        let unit = unit(
            "a.src",
            vec![call(
                "translate",
                vec![lit("", 1, 11), lit("Hello", 1, 15)],
                1,
                1,
            )],
        );
        let result = extract_unit(&unit, &MarkerConfig::default());
        assert!(result.messages.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.diagnostics[0].message.contains("empty message id"));
    }
}
