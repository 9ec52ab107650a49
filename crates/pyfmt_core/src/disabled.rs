//! Directive-comment handling: `disable-formatter` / `enable-formatter`
//! regions, single-line trailing disables, and the internationalization
//! escape hatches. Marked lines bypass the reflow engine entirely and are
//! emitted verbatim.

use pyfmt_style::Style;
use pyfmt_syntax::{LogicalLine, Token, TokenKind};
use regex::Regex;

const DISABLE_DIRECTIVE: &str = "disable-formatter";
const ENABLE_DIRECTIVE: &str = "enable-formatter";

pub fn mark_disabled(lines: &mut [LogicalLine], style: &Style) {
    let i18n_comment = if style.i18n_comment.is_empty() {
        None
    } else {
        // The pattern was validated when the style was built.
        Regex::new(&style.i18n_comment).ok()
    };

    let mut enabled = true;
    for line in lines.iter_mut() {
        if line.is_comment_only() {
            let comment = &line.first().text;
            if has_directive(comment, DISABLE_DIRECTIVE) {
                enabled = false;
                line.disable = true;
                continue;
            }
            if has_directive(comment, ENABLE_DIRECTIVE) {
                enabled = true;
                continue;
            }
        }
        if !enabled {
            line.disable = true;
            continue;
        }

        let trailing_disable = line
            .tokens
            .iter()
            .any(|token| token.is_comment() && has_directive(&token.text, DISABLE_DIRECTIVE));
        if trailing_disable {
            line.disable = true;
            continue;
        }

        if let Some(pattern) = &i18n_comment {
            if line
                .tokens
                .iter()
                .any(|token| token.is_comment() && pattern.is_match(&token.text))
            {
                line.disable = true;
                continue;
            }
        }

        if !style.i18n_function_call.is_empty()
            && contains_call_to(&line.tokens, &style.i18n_function_call)
        {
            line.disable = true;
        }
    }
}

/// The directive must appear as a bare whitespace-separated word inside the
/// comment; `disable-formatter-for-real` is not a directive.
fn has_directive(comment: &str, directive: &str) -> bool {
    comment
        .trim_start_matches('#')
        .split_whitespace()
        .any(|word| word == directive)
}

fn contains_call_to(tokens: &[Token], names: &[String]) -> bool {
    tokens.windows(2).any(|pair| {
        pair[0].is_name()
            && pair[1].kind == TokenKind::OpenBracket
            && pair[1].text == "("
            && names.iter().any(|name| *name == pair[0].text)
    })
}
