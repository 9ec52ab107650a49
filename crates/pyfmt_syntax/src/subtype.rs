use bitflags::bitflags;

bitflags! {
    /// Syntactic roles attached to tokens by the annotator. A token may carry
    /// several at once (e.g. an `=` in an annotated parameter list is both a
    /// default assign and part of a typed name).
    ///
    /// Bracket tokens additionally carry a role flag (CALL, SUBSCRIPT,
    /// DICT_LITERAL, ...) mirrored onto both halves of the pair so that
    /// spacing and penalty decisions never have to re-derive the bracket's
    /// meaning from context.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Subtype: u32 {
        /// `=` binding a keyword argument at a call site.
        const NAMED_ASSIGN = 1 << 0;
        /// `=` binding a parameter default in a `def` or `lambda` signature.
        const DEFAULT_ASSIGN = 1 << 1;
        /// The name preceding a NAMED_ASSIGN `=`.
        const KEYWORD_ARG_NAME = 1 << 2;
        /// First token of a dictionary key expression.
        const DICT_KEY = 1 << 3;
        /// `:` separating a dictionary key from its value.
        const DICT_KEY_COLON = 1 << 4;
        /// First token of a dictionary value expression.
        const DICT_VALUE = 1 << 5;
        /// `:` inside a subscript slice.
        const SUBSCRIPT_COLON = 1 << 6;
        /// Parameter name carrying a type annotation.
        const TYPED_NAME = 1 << 7;
        /// `:` introducing a parameter type annotation.
        const TYPED_NAME_COLON = 1 << 8;
        const UNARY_OPERATOR = 1 << 9;
        const BINARY_OPERATOR = 1 << 10;
        /// `@` introducing a decorator (as opposed to matrix multiply).
        const DECORATOR = 1 << 11;
        /// The name being bound by a `def` or `class` statement.
        const FUNC_DEF = 1 << 12;
        /// `for` keyword of a comprehension clause.
        const COMP_FOR = 1 << 13;
        /// `if` keyword of a comprehension filter clause.
        const COMP_IF = 1 << 14;
        /// Any token inside a lambda expression body.
        const LAMBDA_BODY = 1 << 15;
        /// `*` or `**` in argument-unpacking or var-arg position.
        const STAR_EXPR = 1 << 16;

        // Bracket role flags, set on both the opening and closing token.
        const CALL = 1 << 17;
        const SUBSCRIPT = 1 << 18;
        const DICT_LITERAL = 1 << 19;
        const SET_LITERAL = 1 << 20;
        const LIST_LITERAL = 1 << 21;
        const TUPLE_PAREN = 1 << 22;
        /// Parameter list of a `def` statement.
        const DEF_PARAMS = 1 << 23;
        /// Bracket whose contents form a comprehension.
        const COMPREHENSION = 1 << 24;
    }
}
