use pyfmt_syntax::{Token, TokenKind};
use unicode_xid::UnicodeXID;

use crate::error::{ParseError, ParseResult};

/// Tab stops used when measuring indentation columns, matching the target
/// language's tokenizer.
const TAB_WIDTH: u32 = 8;

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class", "continue",
    "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if", "import",
    "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while",
    "with", "yield",
];

/// Multi-character operators, longest first so that greedy matching is a
/// simple linear scan.
const OPERATORS: &[&str] = &[
    "**=", "//=", ">>=", "<<=", "...", "**", "//", ">>", "<<", "<=", ">=", "==", "!=", "->", ":=",
    "+=", "-=", "*=", "/=", "%=", "@=", "&=", "|=", "^=", "+", "-", "*", "/", "%", "@", "&", "|",
    "^", "~", "<", ">", "=", ".", ",", ":", ";", "(", ")", "[", "]", "{", "}",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Tokenize a full source file into the flat stream the logical-line builder
/// consumes: value tokens interleaved with Newline/Indent/Dedent layout
/// tokens and a trailing EndOfFile.
pub fn tokenize(source: &str) -> ParseResult<Vec<Token>> {
    let mut lexer = Lexer::new(source);
    lexer.run()?;
    Ok(lexer.tokens)
}

#[derive(Clone, Copy)]
struct OpenBracket {
    found: char,
    line: u32,
    column: u32,
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    /// 1-based physical line of the next unread character.
    line: u32,
    /// 0-based column of the next unread character, tab-expanded.
    column: u32,
    brackets: Vec<OpenBracket>,
    indents: Vec<u32>,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 0,
            brackets: Vec::new(),
            indents: vec![0],
            tokens: Vec::new(),
        }
    }

    fn run(&mut self) -> ParseResult<()> {
        while !self.at_eof() {
            let indent = self.measure_indent();
            match self.peek() {
                None => break,
                Some('\n') | Some('\r') => {
                    // Blank line; captured later through line-number gaps.
                    self.consume_eol();
                    continue;
                }
                Some('#') => {
                    // Comment-only lines never open or close blocks, so the
                    // indent stack stays untouched.
                    let token = self.lex_comment();
                    self.tokens.push(token);
                    self.consume_eol();
                    self.push_layout(TokenKind::Newline);
                    continue;
                }
                _ => {}
            }
            self.apply_indentation(indent)?;
            self.lex_logical_line()?;
        }

        if let Some(open) = self.brackets.first().copied() {
            return Err(ParseError::UnclosedBracket {
                found: open.found,
                line: open.line,
                column: open.column,
            });
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.push_layout(TokenKind::Dedent);
        }
        self.push_layout(TokenKind::EndOfFile);
        Ok(())
    }

    fn lex_logical_line(&mut self) -> ParseResult<()> {
        loop {
            self.skip_inline_whitespace();
            let Some(c) = self.peek() else {
                // The file ended without a trailing newline.
                self.push_layout(TokenKind::Newline);
                return Ok(());
            };
            match c {
                '\n' | '\r' => {
                    self.consume_eol();
                    if self.brackets.is_empty() {
                        self.push_layout(TokenKind::Newline);
                        return Ok(());
                    }
                    // Inside brackets the newline is plain whitespace.
                }
                '\\' => {
                    let (line, column) = (self.line, self.column);
                    self.advance();
                    if !self.consume_eol() {
                        return Err(ParseError::UnexpectedCharacter {
                            found: '\\',
                            line,
                            column,
                        });
                    }
                }
                '#' => {
                    let token = self.lex_comment();
                    self.tokens.push(token);
                }
                '\'' | '"' => {
                    let token = self.lex_string(String::new(), self.line, self.column)?;
                    self.tokens.push(token);
                }
                '.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                    let token = self.lex_number();
                    self.tokens.push(token);
                }
                c if c.is_ascii_digit() => {
                    let token = self.lex_number();
                    self.tokens.push(token);
                }
                c if is_identifier_start(c) => {
                    let token = self.lex_name()?;
                    self.tokens.push(token);
                }
                _ => {
                    let token = self.lex_operator()?;
                    self.tokens.push(token);
                }
            }
        }
    }

    // -- Token lexers ------------------------------------------------------

    fn lex_comment(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' || c == '\r' {
                break;
            }
            text.push(c);
            self.advance();
        }
        // Trailing whitespace inside a comment is never significant.
        let trimmed = text.trim_end().to_string();
        Token::new(TokenKind::Comment, trimmed, line, column)
    }

    fn lex_name(&mut self) -> ParseResult<Token> {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if !is_identifier_continue(c) {
                break;
            }
            text.push(c);
            self.advance();
        }
        // A short identifier directly followed by a quote is a string prefix
        // (r"", b"", f"", and their combinations).
        if text.len() <= 2
            && text.chars().all(|c| "rRbBuUfF".contains(c))
            && matches!(self.peek(), Some('\'') | Some('"'))
        {
            return self.lex_string(text, line, column);
        }
        let kind = if is_keyword(&text) {
            TokenKind::Keyword
        } else {
            TokenKind::Name
        };
        Ok(Token::new(kind, text, line, column))
    }

    fn lex_string(&mut self, prefix: String, line: u32, column: u32) -> ParseResult<Token> {
        let quote = self.peek().unwrap();
        let mut text = prefix;
        text.push(quote);
        self.advance();

        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            text.push(quote);
            text.push(quote);
            self.advance();
            self.advance();
        } else if self.peek() == Some(quote) {
            // Empty string.
            text.push(quote);
            self.advance();
            return Ok(Token::new(TokenKind::String, text, line, column));
        }

        loop {
            let Some(c) = self.peek() else {
                return Err(ParseError::UnterminatedString { line, column });
            };
            if c == '\\' {
                text.push(c);
                self.advance();
                if let Some(escaped) = self.peek() {
                    text.push(escaped);
                    self.advance();
                }
                continue;
            }
            if c == quote {
                if !triple {
                    text.push(c);
                    self.advance();
                    return Ok(Token::new(TokenKind::String, text, line, column));
                }
                if self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote) {
                    text.push(quote);
                    text.push(quote);
                    text.push(quote);
                    self.advance();
                    self.advance();
                    self.advance();
                    return Ok(Token::new(TokenKind::String, text, line, column));
                }
            }
            if (c == '\n' || c == '\r') && !triple {
                return Err(ParseError::UnterminatedString { line, column });
            }
            text.push(c);
            self.advance();
        }
    }

    fn lex_number(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();

        if self.peek() == Some('0')
            && matches!(
                self.peek_at(1),
                Some('x') | Some('X') | Some('o') | Some('O') | Some('b') | Some('B')
            )
        {
            text.push(self.advance().unwrap());
            text.push(self.advance().unwrap());
            while let Some(c) = self.peek() {
                if c.is_ascii_hexdigit() || c == '_' {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
            return Token::new(TokenKind::Number, text, line, column);
        }

        self.consume_digits(&mut text);
        if self.peek() == Some('.') {
            text.push('.');
            self.advance();
            self.consume_digits(&mut text);
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let sign_offset = match self.peek_at(1) {
                Some('+') | Some('-') => 1,
                _ => 0,
            };
            if self
                .peek_at(1 + sign_offset)
                .is_some_and(|c| c.is_ascii_digit())
            {
                text.push(self.advance().unwrap());
                if sign_offset == 1 {
                    text.push(self.advance().unwrap());
                }
                self.consume_digits(&mut text);
            }
        }
        if matches!(self.peek(), Some('j') | Some('J')) {
            text.push(self.advance().unwrap());
        }
        Token::new(TokenKind::Number, text, line, column)
    }

    fn consume_digits(&mut self, text: &mut String) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '_' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn lex_operator(&mut self) -> ParseResult<Token> {
        let (line, column) = (self.line, self.column);
        for op in OPERATORS {
            if self.matches_str(op) {
                let kind = operator_kind(op);
                if kind == TokenKind::OpenBracket {
                    self.brackets.push(OpenBracket {
                        found: op.chars().next().unwrap(),
                        line,
                        column,
                    });
                } else if kind == TokenKind::CloseBracket {
                    let found = op.chars().next().unwrap();
                    let matches_open = self
                        .brackets
                        .last()
                        .is_some_and(|open| closes(open.found, found));
                    if !matches_open {
                        return Err(ParseError::UnexpectedClosingBracket {
                            found,
                            line,
                            column,
                        });
                    }
                    self.brackets.pop();
                }
                for _ in 0..op.chars().count() {
                    self.advance();
                }
                return Ok(Token::new(kind, *op, line, column));
            }
        }
        Err(ParseError::UnexpectedCharacter {
            found: self.peek().unwrap(),
            line,
            column,
        })
    }

    // -- Layout ------------------------------------------------------------

    fn measure_indent(&mut self) -> u32 {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\x0c' => {
                    self.advance();
                }
                _ => break,
            }
        }
        self.column
    }

    fn apply_indentation(&mut self, indent: u32) -> ParseResult<()> {
        let current = *self.indents.last().unwrap();
        if indent > current {
            self.indents.push(indent);
            self.push_layout(TokenKind::Indent);
        } else if indent < current {
            while *self.indents.last().unwrap() > indent {
                self.indents.pop();
                self.push_layout(TokenKind::Dedent);
            }
            if *self.indents.last().unwrap() != indent {
                return Err(ParseError::BadIndentation { line: self.line });
            }
        }
        Ok(())
    }

    fn push_layout(&mut self, kind: TokenKind) {
        let token = Token::new(kind, "", self.line, self.column);
        self.tokens.push(token);
    }

    // -- Cursor ------------------------------------------------------------

    fn at_eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn matches_str(&self, expected: &str) -> bool {
        expected
            .chars()
            .enumerate()
            .all(|(offset, c)| self.peek_at(offset) == Some(c))
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        match c {
            '\n' => {
                self.line += 1;
                self.column = 0;
            }
            '\t' => {
                self.column = (self.column / TAB_WIDTH + 1) * TAB_WIDTH;
            }
            _ => self.column += 1,
        }
        Some(c)
    }

    fn consume_eol(&mut self) -> bool {
        match self.peek() {
            Some('\r') => {
                self.advance();
                if self.peek() == Some('\n') {
                    self.advance();
                }
                true
            }
            Some('\n') => {
                self.advance();
                true
            }
            _ => false,
        }
    }

    fn skip_inline_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' || c == '\x0c' {
                self.advance();
            } else {
                break;
            }
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || UnicodeXID::is_xid_start(c)
}

fn is_identifier_continue(c: char) -> bool {
    c == '_' || UnicodeXID::is_xid_continue(c)
}

fn operator_kind(op: &str) -> TokenKind {
    match op {
        "(" | "[" | "{" => TokenKind::OpenBracket,
        ")" | "]" | "}" => TokenKind::CloseBracket,
        "," => TokenKind::Comma,
        ":" => TokenKind::Colon,
        ";" => TokenKind::Semicolon,
        "->" => TokenKind::Arrow,
        "@" => TokenKind::At,
        _ => TokenKind::Operator,
    }
}

fn closes(open: char, close: char) -> bool {
    matches!((open, close), ('(', ')') | ('[', ']') | ('{', '}'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().iter().map(|t| t.kind).collect()
    }

    fn texts(source: &str) -> Vec<String> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .filter(|t| !t.kind.is_layout())
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn simple_assignment() {
        assert_eq!(
            kinds("x = 1\n"),
            vec![
                TokenKind::Name,
                TokenKind::Operator,
                TokenKind::Number,
                TokenKind::Newline,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn indent_and_dedent() {
        let stream = kinds("if a:\n    b\nc\n");
        assert_eq!(
            stream,
            vec![
                TokenKind::Keyword,
                TokenKind::Name,
                TokenKind::Colon,
                TokenKind::Newline,
                TokenKind::Indent,
                TokenKind::Name,
                TokenKind::Newline,
                TokenKind::Dedent,
                TokenKind::Name,
                TokenKind::Newline,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn implicit_continuation_swallows_newlines() {
        let stream = kinds("x = (1,\n     2)\n");
        assert!(!stream[..stream.len() - 2].contains(&TokenKind::Newline));
    }

    #[test]
    fn explicit_continuation_joins_lines() {
        assert_eq!(texts("x = 1 + \\\n    2\n"), vec!["x", "=", "1", "+", "2"]);
    }

    #[test]
    fn blank_lines_produce_no_tokens() {
        assert_eq!(
            kinds("a\n\n\nb\n"),
            vec![
                TokenKind::Name,
                TokenKind::Newline,
                TokenKind::Name,
                TokenKind::Newline,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test_case("a**=b", &["a", "**=", "b"]; "power assign")]
    #[test_case("a//b", &["a", "//", "b"]; "floor div")]
    #[test_case("(a := 1)", &["(", "a", ":=", "1", ")"]; "walrus")]
    #[test_case("x[1:2]", &["x", "[", "1", ":", "2", "]"]; "slice")]
    #[test_case("f(*args, **kw)", &["f", "(", "*", "args", ",", "**", "kw", ")"]; "star args")]
    fn operators(source: &str, expected: &[&str]) {
        assert_eq!(texts(source), expected);
    }

    #[test_case("0x_ff"; "hex")]
    #[test_case("0b1010"; "binary")]
    #[test_case("1_000_000"; "grouped int")]
    #[test_case("3.14e-10"; "exponent")]
    #[test_case(".5"; "leading dot")]
    #[test_case("2j"; "imaginary")]
    fn numbers(source: &str) {
        let tokens = tokenize(source).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].text, source);
    }

    #[test_case(r#""hello""#; "plain")]
    #[test_case(r#"r"raw\d""#; "raw prefix")]
    #[test_case(r#"f"v={x}""#; "format prefix")]
    #[test_case(r#"rb'bytes'"#; "double prefix")]
    #[test_case("'''multi\nline'''"; "triple quoted")]
    #[test_case("''"; "empty")]
    fn strings(source: &str) {
        let tokens = tokenize(source).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, source);
    }

    #[test]
    fn triple_string_tracks_end_line() {
        let tokens = tokenize("x = '''a\nb'''\ny\n").unwrap();
        let string = tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
        assert_eq!(string.original_line, 1);
        assert_eq!(string.last_original_line(), 2);
    }

    #[test]
    fn keywords_are_classified() {
        let tokens = tokenize("for x in y:\n    pass\n").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[2].kind, TokenKind::Keyword);
    }

    #[test]
    fn unterminated_string_errors() {
        assert!(matches!(
            tokenize("x = 'oops\n"),
            Err(ParseError::UnterminatedString { line: 1, .. })
        ));
    }

    #[test]
    fn unclosed_bracket_errors() {
        assert!(matches!(
            tokenize("x = (1, 2\n"),
            Err(ParseError::UnclosedBracket { found: '(', .. })
        ));
    }

    #[test]
    fn mismatched_bracket_errors() {
        assert!(matches!(
            tokenize("x = (1]\n"),
            Err(ParseError::UnexpectedClosingBracket { found: ']', .. })
        ));
    }

    #[test]
    fn bad_dedent_errors() {
        assert!(matches!(
            tokenize("if a:\n        b\n    c\n"),
            Err(ParseError::BadIndentation { line: 3 })
        ));
    }

    #[test]
    fn comment_only_line_keeps_indent_stack() {
        let stream = kinds("if a:\n    b\n# note\nc\n");
        // The dedent belongs to `c`, after the comment line.
        let comment_index = stream.iter().position(|k| *k == TokenKind::Comment).unwrap();
        assert!(stream[comment_index + 2..].contains(&TokenKind::Dedent));
    }
}
