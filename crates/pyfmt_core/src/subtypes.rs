//! First annotation pass: walks each logical line with a bracket-context
//! stack and tags tokens whose spacing or splitting depends on syntactic
//! role (`=` in keyword arguments vs defaults, the several meanings of `:`,
//! unary vs binary operators, decorators, comprehensions, lambdas).

use pyfmt_syntax::{LogicalLine, Subtype, TokenKind};

struct BracketCtx {
    open: usize,
    ch: char,
    is_call: bool,
    is_subscript: bool,
    is_def_params: bool,
    saw_colon: bool,
    saw_comma: bool,
    has_comprehension: bool,
    /// Inside a brace: the next significant token starts a key expression.
    expecting_key: bool,
    /// Inside def params: the parameter just seen carried an annotation.
    last_param_typed: bool,
}

struct LambdaCtx {
    /// Bracket depth at which the lambda keyword appeared; the lambda ends
    /// when a comma or closing bracket returns to this depth.
    stack_len: usize,
    in_params: bool,
}

pub fn assign(line: &mut LogicalLine) {
    let token_count = line.tokens.len();
    if token_count == 0 {
        return;
    }

    let is_def_line = line.starts_with_keyword("def")
        || (line.starts_with_keyword("async")
            && token_count > 1
            && line.tokens[1].is_keyword("def"));
    let is_class_line = line.starts_with_keyword("class");

    if line.tokens[0].kind == TokenKind::At {
        line.tokens[0].add_subtype(Subtype::DECORATOR);
    }
    if is_def_line || is_class_line {
        if let Some(name) = line
            .tokens
            .iter()
            .position(|token| token.is_name())
        {
            line.tokens[name].add_subtype(Subtype::FUNC_DEF);
        }
    }

    let mut stack: Vec<BracketCtx> = Vec::new();
    let mut lambdas: Vec<LambdaCtx> = Vec::new();
    let mut prev_significant: Option<usize> = None;
    // Set when a dict-key colon was just tagged; the next significant token
    // at that depth starts the value expression.
    let mut pending_value: Option<usize> = None;

    for index in 0..token_count {
        let kind = line.tokens[index].kind;
        if kind == TokenKind::Comment {
            continue;
        }
        let text = line.tokens[index].text.clone();

        if !lambdas.is_empty() {
            line.tokens[index].add_subtype(Subtype::LAMBDA_BODY);
        }

        // Dict key/value starts, decided before the token itself can push or
        // pop bracket context.
        if kind != TokenKind::CloseBracket {
            if let Some(depth) = pending_value {
                if depth == stack.len() {
                    line.tokens[index].add_subtype(Subtype::DICT_VALUE);
                    pending_value = None;
                }
            }
            if let Some(top) = stack.last_mut() {
                if top.ch == '{' && top.expecting_key {
                    line.tokens[index].add_subtype(Subtype::DICT_KEY);
                    top.expecting_key = false;
                }
            }
        }

        match kind {
            TokenKind::OpenBracket => {
                let ch = text.chars().next().unwrap_or('(');
                let prev_is_operand = prev_significant
                    .is_some_and(|prev| line.tokens[prev].is_operand_end());
                let prev_is_def_name = prev_significant
                    .is_some_and(|prev| line.tokens[prev].has_subtype(Subtype::FUNC_DEF));
                let is_def_params =
                    ch == '(' && is_def_line && stack.is_empty() && prev_is_def_name;
                stack.push(BracketCtx {
                    open: index,
                    ch,
                    is_call: ch == '(' && prev_is_operand && !is_def_params,
                    is_subscript: ch == '[' && prev_is_operand,
                    is_def_params,
                    saw_colon: false,
                    saw_comma: false,
                    has_comprehension: false,
                    expecting_key: ch == '{',
                    last_param_typed: false,
                });
            }
            TokenKind::CloseBracket => {
                if let Some(ctx) = stack.pop() {
                    let mut flags = Subtype::empty();
                    match ctx.ch {
                        '(' => {
                            if ctx.is_def_params {
                                flags |= Subtype::DEF_PARAMS;
                            } else if ctx.is_call {
                                flags |= Subtype::CALL;
                            } else if ctx.saw_comma {
                                flags |= Subtype::TUPLE_PAREN;
                            }
                        }
                        '[' => {
                            flags |= if ctx.is_subscript {
                                Subtype::SUBSCRIPT
                            } else {
                                Subtype::LIST_LITERAL
                            };
                        }
                        '{' => {
                            if ctx.has_comprehension {
                                // A dict or set comprehension has only one
                                // entry; the comprehension flag is enough.
                            } else if ctx.saw_colon || index == ctx.open + 1 {
                                flags |= Subtype::DICT_LITERAL;
                            } else {
                                flags |= Subtype::SET_LITERAL;
                            }
                        }
                        _ => {}
                    }
                    if ctx.has_comprehension {
                        flags |= Subtype::COMPREHENSION;
                    }
                    line.tokens[ctx.open].add_subtype(flags);
                    line.tokens[index].add_subtype(flags);
                }
                while lambdas
                    .last()
                    .is_some_and(|lambda| lambda.stack_len > stack.len())
                {
                    lambdas.pop();
                }
            }
            TokenKind::Comma => {
                if let Some(top) = stack.last_mut() {
                    top.saw_comma = true;
                    top.expecting_key = true;
                    top.last_param_typed = false;
                }
                pending_value = None;
                while lambdas
                    .last()
                    .is_some_and(|lambda| !lambda.in_params && lambda.stack_len == stack.len())
                {
                    lambdas.pop();
                }
            }
            TokenKind::Colon => {
                let lambda_colon = lambdas
                    .last()
                    .is_some_and(|lambda| lambda.in_params && lambda.stack_len == stack.len());
                if lambda_colon {
                    if let Some(lambda) = lambdas.last_mut() {
                        lambda.in_params = false;
                    }
                } else if let Some(top) = stack.last_mut() {
                    if top.ch == '{' {
                        top.saw_colon = true;
                        line.tokens[index].add_subtype(Subtype::DICT_KEY_COLON);
                        pending_value = Some(stack.len());
                    } else if top.ch == '[' && top.is_subscript {
                        line.tokens[index].add_subtype(Subtype::SUBSCRIPT_COLON);
                    } else if top.ch == '(' && top.is_def_params {
                        line.tokens[index].add_subtype(Subtype::TYPED_NAME_COLON);
                        top.last_param_typed = true;
                        if let Some(prev) = prev_significant {
                            if line.tokens[prev].is_name() {
                                line.tokens[prev].add_subtype(Subtype::TYPED_NAME);
                            }
                        }
                    }
                } else if line.tokens[0].kind == TokenKind::Name {
                    // Variable annotation at statement level.
                    line.tokens[index].add_subtype(Subtype::TYPED_NAME_COLON);
                    if let Some(prev) = prev_significant {
                        if line.tokens[prev].is_name() {
                            line.tokens[prev].add_subtype(Subtype::TYPED_NAME);
                        }
                    }
                }
            }
            TokenKind::Operator => match text.as_str() {
                "=" => {
                    let lambda_default = lambdas
                        .last()
                        .is_some_and(|lambda| lambda.in_params && lambda.stack_len == stack.len());
                    if lambda_default {
                        line.tokens[index].add_subtype(Subtype::DEFAULT_ASSIGN);
                    } else if let Some(top) = stack.last() {
                        if top.is_def_params {
                            line.tokens[index].add_subtype(Subtype::DEFAULT_ASSIGN);
                            if top.last_param_typed {
                                line.tokens[index].add_subtype(Subtype::TYPED_NAME);
                            }
                        } else if top.is_call {
                            line.tokens[index].add_subtype(Subtype::NAMED_ASSIGN);
                            if let Some(prev) = prev_significant {
                                if line.tokens[prev].is_name() {
                                    line.tokens[prev].add_subtype(Subtype::KEYWORD_ARG_NAME);
                                }
                            }
                        }
                    }
                }
                "+" | "-" | "~" => {
                    let binary = prev_significant
                        .is_some_and(|prev| line.tokens[prev].is_operand_end());
                    line.tokens[index].add_subtype(if binary {
                        Subtype::BINARY_OPERATOR
                    } else {
                        Subtype::UNARY_OPERATOR
                    });
                }
                "*" | "**" => {
                    let binary = prev_significant
                        .is_some_and(|prev| line.tokens[prev].is_operand_end());
                    line.tokens[index].add_subtype(if binary {
                        Subtype::BINARY_OPERATOR
                    } else {
                        Subtype::STAR_EXPR
                    });
                }
                "/" | "//" | "%" | "<<" | ">>" | "&" | "|" | "^" | "<" | ">" | "<=" | ">="
                | "==" | "!=" | ":=" => {
                    line.tokens[index].add_subtype(Subtype::BINARY_OPERATOR);
                }
                _ => {}
            },
            TokenKind::At => {
                if index > 0 {
                    line.tokens[index].add_subtype(Subtype::BINARY_OPERATOR);
                }
            }
            TokenKind::Keyword => match text.as_str() {
                "lambda" => lambdas.push(LambdaCtx {
                    stack_len: stack.len(),
                    in_params: true,
                }),
                "for" if !stack.is_empty() => {
                    line.tokens[index].add_subtype(Subtype::COMP_FOR);
                    if let Some(top) = stack.last_mut() {
                        top.has_comprehension = true;
                    }
                }
                "if" => {
                    if stack.last().is_some_and(|top| top.has_comprehension) {
                        line.tokens[index].add_subtype(Subtype::COMP_IF);
                    }
                }
                "and" | "or" | "in" | "is" => {
                    line.tokens[index].add_subtype(Subtype::BINARY_OPERATOR);
                }
                _ => {}
            },
            _ => {}
        }

        prev_significant = Some(index);
    }
}
