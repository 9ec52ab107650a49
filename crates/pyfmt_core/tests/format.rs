//! End-to-end tests for the formatter core: concrete reformatting
//! scenarios, the formatter invariants (idempotence, token preservation,
//! line length, determinism), disabled regions, and range formatting.

use pyfmt_core::reformat_source;
use pyfmt_parser::tokenize;
use pyfmt_style::Style;
use pyfmt_syntax::TokenKind;

fn format(source: &str) -> String {
    reformat_source(source, &Style::default(), None).expect("formatting failed")
}

fn format_with(source: &str, overrides: &[(&str, &str)]) -> String {
    let style = Style::with_overrides("default", overrides.iter().copied())
        .expect("style overrides failed");
    reformat_source(source, &style, None).expect("formatting failed")
}

/// The `(kind, text)` stream of value tokens, for token-preservation checks.
fn value_tokens(source: &str) -> Vec<(TokenKind, String)> {
    tokenize(source)
        .expect("tokenization failed")
        .into_iter()
        .filter(|token| !token.kind.is_layout())
        .map(|token| (token.kind, token.text))
        .collect()
}

mod scenarios {
    use super::*;

    #[test]
    fn ugly_spacing_normalization() {
        assert_eq!(
            format("x = {  'a':37,'b':42,\n\n'c':927}"),
            "x = {'a': 37, 'b': 42, 'c': 927}\n"
        );
    }

    #[test]
    fn compound_statement_joining() {
        assert_eq!(format("if a == 42:\n    continue\n"), "if a == 42: continue\n");
    }

    #[test]
    fn trailing_comma_split() {
        assert_eq!(format("f(a, b, c,)\n"), "f(\n    a,\n    b,\n    c,\n)\n");
    }

    #[test]
    fn comment_in_list_default() {
        assert_eq!(
            format("[a, b, #\n c]\n"),
            "[\n    a,\n    b,  #\n    c\n]\n"
        );
    }

    #[test]
    fn comment_in_list_with_split_disabled() {
        assert_eq!(
            format_with(
                "[a, b, #\n c]\n",
                &[("DISABLE_SPLIT_LIST_WITH_COMMENT", "true")]
            ),
            "[\n    a, b,  #\n    c\n]\n"
        );
    }

    #[test]
    fn arithmetic_precedence_indication() {
        assert_eq!(
            format_with(
                "a = 1 * 2 + 3 / 4\n",
                &[("ARITHMETIC_PRECEDENCE_INDICATION", "true")]
            ),
            "a = 1*2 + 3/4\n"
        );
    }
}

mod layout {
    use super::*;

    #[test]
    fn overlong_call_breaks_at_the_first_viable_comma() {
        let source =
            "result = some_function(argument_one, argument_two, argument_three, argument_four)\n";
        // Continuations align visually after the opening parenthesis.
        let continuation = " ".repeat("result = some_function(".len());
        let expected = format!(
            "result = some_function(argument_one,\n{continuation}argument_two, \
             argument_three, argument_four)\n"
        );
        assert_eq!(format(source), expected);
    }

    #[test]
    fn overlong_comprehension_splits_clauses() {
        let source = "values = [transform(element) for element in collection_of_elements \
                      if predicate(element)]\n";
        let continuation = " ".repeat("values = [".len());
        let expected = format!(
            "values = [transform(element)\n{continuation}for element in \
             collection_of_elements\n{continuation}if predicate(element)]\n"
        );
        assert_eq!(format(source), expected);
    }

    #[test]
    fn statement_indentation_is_rebuilt() {
        // The over-indented body comes back to one indent width, and the
        // short suite then joins onto the header.
        assert_eq!(format("if a:\n        b = 1\n"), "if a: b = 1\n");
        assert_eq!(
            format("if a:\n        b = 1\n        c = 2\n"),
            "if a:\n    b = 1\n    c = 2\n"
        );
    }

    #[test]
    fn tabs_for_block_indent() {
        assert_eq!(
            format_with("if a:\n    b = 1\n", &[("USE_TABS", "true")]),
            "if a:\n\tb = 1\n"
        );
    }

    #[test]
    fn fixed_continuation_alignment() {
        let out = format_with(
            "result = some_function(argument_one, argument_two, argument_three, argument_four)\n",
            &[("CONTINUATION_ALIGN_STYLE", "fixed")],
        );
        for line in out.lines().skip(1) {
            let leading = line.len() - line.trim_start().len();
            assert_eq!(leading, 4, "fixed alignment puts continuations at one indent");
        }
    }

    #[test]
    fn crlf_line_endings_are_preserved() {
        assert_eq!(format("x  =  1\r\ny = 2\r\n"), "x = 1\r\ny = 2\r\n");
    }

    #[test]
    fn blank_lines_around_definitions() {
        let out = format("import os\nx = 1\ndef f():\n    return x\ny = f()\n");
        assert_eq!(
            out,
            "import os\n\nx = 1\n\n\ndef f():\n    return x\n\n\ny = f()\n"
        );
    }
}

mod invariants {
    use super::*;

    const CORPUS: &[&str] = &[
        "x = {  'a':37,'b':42,\n\n'c':927}\n",
        "if a == 42:\n    continue\n",
        "f(a, b, c,)\n",
        "[a, b, #\n c]\n",
        "def process(first_argument, second_argument, third_argument, fourth_argument=None):\n    return first_argument\n",
        "class Widget:\n    '''A widget.'''\n    def resize(self, width, height):\n        self.size = (width, height)\n",
        "@decorator\ndef handler(event):\n    return dispatch_table[event.kind](event, context=GLOBAL_CONTEXT, retries=3)\n",
        "values = [transform(element) for element in collection_of_elements if predicate(element)]\n",
        "result = some_function(argument_one, argument_two, argument_three, argument_four)\n",
        "x = '''multi\nline'''\ny = 1\n",
        "total = first_long_name + second_long_name * (third_long_name - fourth_long_name)\n",
        "config = {'retries': 3, 'timeout': 30, 'endpoints': ['a', 'b'], 'verbose': False}\n",
        "with open(path) as handle:\n    data = handle.read()\n",
        "# leading comment\nx = 1  # trailing comment\n",
    ];

    #[test]
    fn formatting_is_idempotent() {
        for source in CORPUS {
            let once = format(source);
            let twice = format(&once);
            assert_eq!(once, twice, "formatting {source:?} twice changed the output");
        }
    }

    #[test]
    fn value_tokens_are_preserved() {
        for source in CORPUS {
            let formatted = format(source);
            assert_eq!(
                value_tokens(source),
                value_tokens(&formatted),
                "token stream changed for {source:?}"
            );
        }
    }

    #[test]
    fn output_lines_respect_the_column_limit() {
        for source in CORPUS {
            let formatted = format(source);
            for line in formatted.lines() {
                assert!(
                    line.chars().count() <= 79 || line.contains("'''"),
                    "overlong line {line:?} from {source:?}"
                );
            }
        }
    }

    #[test]
    fn formatting_is_deterministic() {
        for source in CORPUS {
            assert_eq!(format(source), format(source));
        }
    }

    #[test]
    fn output_always_ends_with_a_newline() {
        for source in CORPUS {
            assert!(format(source).ends_with('\n'));
        }
    }

    #[test]
    fn empty_and_blank_inputs() {
        assert_eq!(format(""), "");
        assert_eq!(format("\n\n\n"), "");
    }
}

mod disabled_regions {
    use super::*;

    #[test]
    fn region_is_byte_for_byte_verbatim() {
        let source = "a  =  1\n# disable-formatter\nkeep   =   {  'x':1}\nweird =    2\n# enable-formatter\nb  =  2\n";
        let out = format(source);
        assert!(out.contains("keep   =   {  'x':1}\nweird =    2\n"));
        assert!(out.starts_with("a = 1\n"));
        assert!(out.ends_with("b = 2\n"));
    }

    #[test]
    fn trailing_directive_disables_single_line() {
        let source = "a  =  1  # disable-formatter\nb  =  2\n";
        let out = format(source);
        assert_eq!(out, "a  =  1  # disable-formatter\nb = 2\n");
    }

    #[test]
    fn disabled_region_keeps_blank_lines() {
        let source = "# disable-formatter\na = 1\n\n\n\n\nb = 2\n# enable-formatter\nc = 3\n";
        let out = format(source);
        assert!(out.contains("a = 1\n\n\n\n\nb = 2\n"));
    }

    #[test]
    fn i18n_function_calls_are_untouched() {
        let out = format_with(
            "x = N_( 'message' )\ny = f( 'other' )\n",
            &[("I18N_FUNCTION_CALL", "N_")],
        );
        assert_eq!(out, "x = N_( 'message' )\ny = f('other')\n");
    }
}

mod range_formatting {
    use super::*;

    #[test]
    fn only_requested_lines_change() {
        let style = Style::default();
        let source = "x  =  1\ny  =  2\nz  =  3\n";
        let out = reformat_source(source, &style, Some(&[(2, 2)])).unwrap();
        assert_eq!(out, "x  =  1\ny = 2\nz  =  3\n");
    }

    #[test]
    fn range_covering_everything_formats_everything() {
        let style = Style::default();
        let source = "x  =  1\ny  =  2\n";
        let out = reformat_source(source, &style, Some(&[(1, 2)])).unwrap();
        assert_eq!(out, "x = 1\ny = 2\n");
    }

    #[test]
    fn multiline_statement_is_formatted_when_touched() {
        let style = Style::default();
        let source = "x = (1 +\n     2)\ny  =  3\n";
        let out = reformat_source(source, &style, Some(&[(1, 1)])).unwrap();
        assert_eq!(out, "x = (1 + 2)\ny  =  3\n");
    }
}
