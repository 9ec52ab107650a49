//! Second annotation pass: inter-token spacing and break legality. The
//! dispatch is keyed on `(prev, curr)` kind and subtype pairs plus the style
//! knobs, written as explicit branches where earlier rules win.

use pyfmt_style::{SpacesBeforeComment, Style};
use pyfmt_syntax::{LogicalLine, Subtype, Token, TokenKind};

pub fn assign(line: &mut LogicalLine, style: &Style) {
    if line.tokens.is_empty() {
        return;
    }
    let tight = arithmetic_tight_map(line, style);
    let mut stack = SpacingStack::default();

    line.tokens[0].spaces_required_before = 0;
    line.tokens[0].can_break_before = false;
    stack.advance(&line.tokens[0]);

    for index in 1..line.tokens.len() {
        let depth = stack.depth_at(&line.tokens[index]);
        let in_locked_key = stack.in_locked_dict_key(style);

        let spaces = spaces_before(&line.tokens, index, &tight, style);
        let breakable = can_break_before(&line.tokens, index, depth, in_locked_key, style);
        line.tokens[index].spaces_required_before = spaces;
        line.tokens[index].can_break_before = breakable;

        stack.advance(&line.tokens[index]);
    }
}

/// Bracket bookkeeping for the spacing walk: depth plus the dict-key regions
/// that `ALLOW_MULTILINE_DICTIONARY_KEYS=false` locks against breaking.
#[derive(Default)]
struct SpacingStack {
    frames: Vec<BraceFrame>,
}

struct BraceFrame {
    is_dict: bool,
    in_key: bool,
    key_token_seen: bool,
}

impl SpacingStack {
    /// The bracket depth the token sits at. A closing bracket still counts
    /// as inside the bracket it closes (the frame pops in `advance`).
    fn depth_at(&self, _token: &Token) -> usize {
        self.frames.len()
    }

    fn in_locked_dict_key(&self, style: &Style) -> bool {
        if style.allow_multiline_dictionary_keys {
            return false;
        }
        self.frames
            .last()
            .is_some_and(|frame| frame.is_dict && frame.in_key && frame.key_token_seen)
    }

    fn advance(&mut self, token: &Token) {
        match token.kind {
            TokenKind::OpenBracket => {
                self.frames.push(BraceFrame {
                    is_dict: token.has_subtype(Subtype::DICT_LITERAL),
                    in_key: true,
                    key_token_seen: false,
                });
            }
            TokenKind::CloseBracket => {
                self.frames.pop();
            }
            TokenKind::Comma => {
                if let Some(top) = self.frames.last_mut() {
                    top.in_key = true;
                    top.key_token_seen = false;
                }
            }
            TokenKind::Colon if token.has_subtype(Subtype::DICT_KEY_COLON) => {
                if let Some(top) = self.frames.last_mut() {
                    top.in_key = false;
                }
            }
            TokenKind::Comment => {}
            _ => {
                if let Some(top) = self.frames.last_mut() {
                    if top.in_key {
                        top.key_token_seen = true;
                    }
                }
            }
        }
    }
}

fn bracket_interior_space(bracket: &Token, style: &Style) -> u32 {
    if style.space_inside_brackets {
        return 1;
    }
    let spaced = (bracket.has_subtype(Subtype::DICT_LITERAL | Subtype::SET_LITERAL)
        && style.spaces_around_dict_delimiters)
        || (bracket.has_subtype(Subtype::LIST_LITERAL) && style.spaces_around_list_delimiters)
        || (bracket.has_subtype(Subtype::TUPLE_PAREN) && style.spaces_around_tuple_delimiters);
    spaced as u32
}

fn spaces_before(tokens: &[Token], index: usize, tight: &[bool], style: &Style) -> u32 {
    let prev = &tokens[index - 1];
    let curr = &tokens[index];

    // Trailing comments get their configured gap; list alignment is resolved
    // against the live column during rendering.
    if curr.is_comment() {
        return match &style.spaces_before_comment {
            SpacesBeforeComment::Fixed(spaces) => *spaces,
            SpacesBeforeComment::Aligned(_) => SpacesBeforeComment::DEFAULT_SPACES,
        };
    }
    // Nothing follows a comment on the same line; the break is forced later.
    if prev.is_comment() {
        return 0;
    }

    if prev.is_open_bracket() && curr.is_close_bracket() {
        return 0;
    }
    if curr.is_close_bracket() {
        if prev.kind == TokenKind::Comma {
            return style.space_between_ending_comma_and_closing_bracket as u32;
        }
        return bracket_interior_space(curr, style);
    }
    if prev.is_open_bracket() {
        return bracket_interior_space(prev, style);
    }

    if matches!(curr.kind, TokenKind::Comma | TokenKind::Semicolon) {
        return 0;
    }
    if matches!(prev.kind, TokenKind::Comma | TokenKind::Semicolon) {
        return 1;
    }

    if curr.kind == TokenKind::Colon {
        if curr.has_subtype(Subtype::SUBSCRIPT_COLON) {
            return style.spaces_around_subscript_colon as u32;
        }
        return 0;
    }
    if prev.kind == TokenKind::Colon {
        if prev.has_subtype(Subtype::SUBSCRIPT_COLON) {
            return style.spaces_around_subscript_colon as u32;
        }
        return 1;
    }

    let named_assign = Subtype::NAMED_ASSIGN | Subtype::DEFAULT_ASSIGN;
    if (curr.is_operator("=") && curr.has_subtype(named_assign))
        || (prev.is_operator("=") && prev.has_subtype(named_assign))
    {
        let assign = if curr.is_operator("=") { curr } else { prev };
        let spaced = assign.has_subtype(Subtype::TYPED_NAME)
            || style.spaces_around_default_or_named_assign;
        return spaced as u32;
    }

    if (curr.is_operator("**") && curr.has_subtype(Subtype::BINARY_OPERATOR))
        || (prev.is_operator("**") && prev.has_subtype(Subtype::BINARY_OPERATOR))
    {
        return style.spaces_around_power_operator as u32;
    }

    if curr.is_operator(".") || prev.is_operator(".") {
        return 0;
    }

    if prev.kind == TokenKind::Operator && prev.has_subtype(Subtype::UNARY_OPERATOR) {
        return 0;
    }
    if prev.has_subtype(Subtype::STAR_EXPR) {
        return 0;
    }
    if prev.kind == TokenKind::At && prev.has_subtype(Subtype::DECORATOR) {
        return 0;
    }

    if curr.is_open_bracket()
        && curr.has_subtype(Subtype::CALL | Subtype::SUBSCRIPT | Subtype::DEF_PARAMS)
    {
        return 0;
    }

    let binary = Subtype::BINARY_OPERATOR;
    if curr.has_subtype(binary) || prev.has_subtype(binary) {
        let op_index = if curr.has_subtype(binary) {
            index
        } else {
            index - 1
        };
        let op = &tokens[op_index];
        if style.no_spaces_around(&op.text) {
            return 0;
        }
        if tight[op_index] {
            return 0;
        }
        return 1;
    }

    // Implicit string concatenation, arrows, keywords, and everything else.
    1
}

fn can_break_before(
    tokens: &[Token],
    index: usize,
    depth: usize,
    in_locked_key: bool,
    style: &Style,
) -> bool {
    let prev = &tokens[index - 1];
    let curr = &tokens[index];

    // A comment ends its physical line, so its successor must start a new
    // one; this overrides every other rule.
    if prev.is_comment() {
        return true;
    }
    // The target language only allows breaks inside brackets.
    if depth == 0 {
        return false;
    }
    if matches!(curr.kind, TokenKind::Comma | TokenKind::Semicolon) {
        return false;
    }
    if curr.is_open_bracket() {
        if curr.has_subtype(Subtype::CALL | Subtype::SUBSCRIPT | Subtype::DEF_PARAMS) {
            return false;
        }
        if style.coalesce_brackets && prev.is_open_bracket() {
            return false;
        }
        if prev.kind == TokenKind::Keyword {
            return false;
        }
    }
    if curr.kind == TokenKind::Colon {
        return false;
    }
    if prev.kind == TokenKind::Colon {
        if prev.has_subtype(Subtype::DICT_KEY_COLON) {
            return style.allow_split_before_dict_value;
        }
        return false;
    }
    if curr.has_subtype(Subtype::LAMBDA_BODY) && !style.allow_multiline_lambdas {
        return false;
    }
    if prev.kind == TokenKind::Operator && prev.has_subtype(Subtype::UNARY_OPERATOR) {
        return false;
    }
    if prev.has_subtype(Subtype::STAR_EXPR) {
        return false;
    }
    if prev.is_operator(".") {
        return false;
    }
    let named_assign = Subtype::NAMED_ASSIGN | Subtype::DEFAULT_ASSIGN;
    if prev.is_operator("=") && prev.has_subtype(named_assign) {
        return false;
    }
    if curr.is_operator("=") && curr.has_subtype(named_assign) {
        return style.allow_split_before_default_or_named_assigns;
    }
    if prev.has_subtype(Subtype::TYPED_NAME_COLON) {
        return false;
    }
    if curr.is_operator("**") || prev.is_operator("**") {
        return false;
    }
    if prev.kind == TokenKind::At && prev.has_subtype(Subtype::DECORATOR) {
        return false;
    }
    if in_locked_key {
        return false;
    }
    true
}

/// Which operator tokens lose their surrounding spaces when
/// ARITHMETIC_PRECEDENCE_INDICATION is on: multiplicative operators at any
/// bracket depth that also carries an additive operator.
fn arithmetic_tight_map(line: &LogicalLine, style: &Style) -> Vec<bool> {
    let count = line.tokens.len();
    let mut tight = vec![false; count];
    if !style.arithmetic_precedence_indication {
        return tight;
    }

    let mut depth = 0usize;
    let mut depths = Vec::with_capacity(count);
    for token in &line.tokens {
        match token.kind {
            TokenKind::OpenBracket => {
                depths.push(depth);
                depth += 1;
            }
            TokenKind::CloseBracket => {
                depth = depth.saturating_sub(1);
                depths.push(depth);
            }
            _ => depths.push(depth),
        }
    }

    let is_additive = |token: &Token| {
        token.has_subtype(Subtype::BINARY_OPERATOR) && matches!(token.text.as_str(), "+" | "-")
    };
    let is_multiplicative = |token: &Token| {
        token.has_subtype(Subtype::BINARY_OPERATOR)
            && (matches!(token.text.as_str(), "*" | "/" | "//" | "%")
                || token.kind == TokenKind::At)
    };

    let max_depth = depths.iter().copied().max().unwrap_or(0);
    for level in 0..=max_depth {
        let has_additive = line
            .tokens
            .iter()
            .zip(&depths)
            .any(|(token, d)| *d == level && is_additive(token));
        if !has_additive {
            continue;
        }
        for (index, (token, d)) in line.tokens.iter().zip(&depths).enumerate() {
            if *d == level && is_multiplicative(token) {
                tight[index] = true;
            }
        }
    }
    tight
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{logical_lines, subtypes};
    use pyfmt_parser::tokenize;
    use test_case::test_case;

    fn spaced(source: &str, style: &Style) -> String {
        let mut lines = logical_lines::build(tokenize(source).unwrap());
        let mut line = lines.remove(0);
        subtypes::assign(&mut line);
        assign(&mut line, style);
        let mut out = String::new();
        for (index, token) in line.tokens.iter().enumerate() {
            if index > 0 {
                for _ in 0..token.spaces_required_before {
                    out.push(' ');
                }
            }
            out.push_str(&token.text);
        }
        out
    }

    #[test_case("x={  'a':37,'b':42}", "x = {'a': 37, 'b': 42}"; "dict normalization")]
    #[test_case("f( a,b )", "f(a, b)"; "call args")]
    #[test_case("x = y [ 1 ]", "x = y[1]"; "subscript glue")]
    #[test_case("f(x =1)", "f(x=1)"; "named assign tight")]
    #[test_case("x = a+b", "x = a + b"; "binary operator")]
    #[test_case("x = -y", "x = -y"; "unary minus")]
    #[test_case("x = a**b", "x = a**b"; "power tight")]
    #[test_case("x = a . b . c", "x = a.b.c"; "dotted name")]
    #[test_case("print ( * args , ** kw )", "print(*args, **kw)"; "star args")]
    #[test_case("x = ( 1 , )", "x = (1,)"; "single element tuple")]
    #[test_case("x = 'a' 'b'", "x = 'a' 'b'"; "implicit concat")]
    #[test_case("def f(x:int=5):", "def f(x: int = 5):"; "typed default")]
    #[test_case("x = s[1:2]", "x = s[1:2]"; "slice colon")]
    #[test_case("not x", "not x"; "keyword operator")]
    #[test_case("x = a if b else c", "x = a if b else c"; "ternary")]
    fn default_spacing(source: &str, expected: &str) {
        assert_eq!(spaced(source, &Style::default()), expected);
    }

    #[test]
    fn arithmetic_precedence_indication() {
        let mut style = Style::default();
        style
            .set_knob("ARITHMETIC_PRECEDENCE_INDICATION", "true")
            .unwrap();
        assert_eq!(spaced("a = 1 * 2 + 3 / 4", &style), "a = 1*2 + 3/4");
        // Without an additive neighbor the multiplication keeps its spaces.
        assert_eq!(spaced("a = 1 * 2", &style), "a = 1 * 2");
    }

    #[test]
    fn selected_operators_lose_spaces() {
        let mut style = Style::default();
        style
            .set_knob("NO_SPACES_AROUND_SELECTED_BINARY_OPERATORS", "*")
            .unwrap();
        assert_eq!(spaced("a = b * c + d", &style), "a = b*c + d");
    }

    #[test]
    fn space_inside_brackets_knob() {
        let mut style = Style::default();
        style.set_knob("SPACE_INSIDE_BRACKETS", "true").unwrap();
        assert_eq!(spaced("f(a, b)", &style), "f( a, b )");
    }

    #[test]
    fn dict_delimiter_spaces_knob() {
        let mut style = Style::default();
        style
            .set_knob("SPACES_AROUND_DICT_DELIMITERS", "true")
            .unwrap();
        assert_eq!(spaced("x = {1: 2}", &style), "x = { 1: 2 }");
    }

    #[test]
    fn subscript_colon_knob() {
        let mut style = Style::default();
        style
            .set_knob("SPACES_AROUND_SUBSCRIPT_COLON", "true")
            .unwrap();
        assert_eq!(spaced("x = s[1:2]", &style), "x = s[1 : 2]");
    }

    #[test]
    fn spaces_around_named_assign_knob() {
        let mut style = Style::default();
        style
            .set_knob("SPACES_AROUND_DEFAULT_OR_NAMED_ASSIGN", "true")
            .unwrap();
        assert_eq!(spaced("f(x=1)", &style), "f(x = 1)");
    }

    #[test]
    fn breaks_forbidden_outside_brackets() {
        let mut lines = logical_lines::build(tokenize("x = a + b\n").unwrap());
        let mut line = lines.remove(0);
        subtypes::assign(&mut line);
        assign(&mut line, &Style::default());
        assert!(line.tokens.iter().all(|token| !token.can_break_before));
    }

    #[test]
    fn breaks_allowed_inside_call() {
        let mut lines = logical_lines::build(tokenize("f(aaa, bbb)\n").unwrap());
        let mut line = lines.remove(0);
        subtypes::assign(&mut line);
        assign(&mut line, &Style::default());
        let bbb = line.tokens.iter().find(|t| t.text == "bbb").unwrap();
        assert!(bbb.can_break_before);
        let comma = line.tokens.iter().find(|t| t.text == ",").unwrap();
        assert!(!comma.can_break_before);
    }

    #[test]
    fn lambda_body_is_unbreakable_by_default() {
        let mut lines = logical_lines::build(tokenize("f(lambda x: x + 1)\n").unwrap());
        let mut line = lines.remove(0);
        subtypes::assign(&mut line);
        assign(&mut line, &Style::default());
        let plus = line.tokens.iter().find(|t| t.text == "+").unwrap();
        assert!(!plus.can_break_before);
    }
}
