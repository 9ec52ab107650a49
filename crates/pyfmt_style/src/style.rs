use serde::Serialize;

use crate::error::{StyleError, StyleResult};

/// How continuation lines find their left margin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ContinuationAlignStyle {
    /// Align to the column after the opening bracket (visual alignment).
    Space,
    /// Always use the statement indent plus the continuation indent width.
    Fixed,
    /// Visual alignment rounded up to the next indent-width multiple.
    ValignRight,
}

/// Alignment of trailing comments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum SpacesBeforeComment {
    /// A fixed number of spaces before every trailing comment.
    Fixed(u32),
    /// A sorted list of alignment columns; the comment snaps to the first
    /// column past the end of the code, falling back to two spaces.
    Aligned(Vec<u32>),
}

impl SpacesBeforeComment {
    pub const DEFAULT_SPACES: u32 = 2;
}

/// The complete knob table. A concrete style is a predefined baseline with
/// user overrides applied through [`Style::set_knob`]; after that the value
/// is read-only for the duration of a formatting job and may be shared
/// freely across workers.
#[derive(Clone, Debug, Serialize)]
pub struct Style {
    pub column_limit: u32,
    pub indent_width: u32,
    pub continuation_indent_width: u32,
    pub use_tabs: bool,
    pub continuation_align_style: ContinuationAlignStyle,
    pub spaces_before_comment: SpacesBeforeComment,

    pub dedent_closing_brackets: bool,
    pub indent_closing_brackets: bool,
    pub coalesce_brackets: bool,
    pub join_multiple_lines: bool,

    pub each_dict_entry_on_separate_line: bool,
    pub force_multiline_dict: bool,
    pub split_arguments_when_comma_terminated: bool,
    pub disable_ending_comma_heuristic: bool,
    pub disable_split_list_with_comment: bool,
    pub split_all_comma_separated_values: bool,
    pub split_all_top_level_comma_separated_values: bool,
    pub split_before_closing_bracket: bool,
    pub split_complex_comprehension: bool,
    pub split_before_first_argument: bool,
    pub split_before_named_assigns: bool,

    pub allow_multiline_lambdas: bool,
    pub allow_multiline_dictionary_keys: bool,
    pub allow_split_before_dict_value: bool,
    pub allow_split_before_default_or_named_assigns: bool,

    pub arithmetic_precedence_indication: bool,
    pub no_spaces_around_selected_binary_operators: Vec<String>,
    pub spaces_around_default_or_named_assign: bool,
    pub spaces_around_power_operator: bool,
    pub spaces_around_subscript_colon: bool,
    pub spaces_around_dict_delimiters: bool,
    pub spaces_around_list_delimiters: bool,
    pub spaces_around_tuple_delimiters: bool,
    pub space_inside_brackets: bool,
    pub space_between_ending_comma_and_closing_bracket: bool,

    pub blank_lines_around_top_level_definition: u32,
    pub blank_lines_between_top_level_imports_and_variables: u32,
    pub blank_line_before_module_docstring: bool,
    pub blank_line_before_class_docstring: bool,
    pub blank_line_before_nested_class_or_def: bool,
    pub indent_dictionary_value: bool,
    pub indent_blank_lines: bool,

    pub split_penalty_after_opening_bracket: u32,
    pub split_penalty_for_added_line_split: u32,
    pub split_penalty_excess_character: u32,
    pub split_penalty_before_if_expression: u32,
    pub split_penalty_comprehension: u32,
    pub split_penalty_arithmetic_operator: u32,
    pub split_penalty_logical_operator: u32,
    pub split_penalty_bitwise_operator: u32,
    pub split_penalty_import_names: u32,

    /// Regex marking internationalization comments; lines containing a match
    /// are left untouched. Empty disables the check.
    pub i18n_comment: String,
    /// Function names whose call sites are left untouched.
    pub i18n_function_call: Vec<String>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            column_limit: 79,
            indent_width: 4,
            continuation_indent_width: 4,
            use_tabs: false,
            continuation_align_style: ContinuationAlignStyle::Space,
            spaces_before_comment: SpacesBeforeComment::Fixed(SpacesBeforeComment::DEFAULT_SPACES),

            dedent_closing_brackets: false,
            indent_closing_brackets: false,
            coalesce_brackets: false,
            join_multiple_lines: true,

            each_dict_entry_on_separate_line: true,
            force_multiline_dict: false,
            split_arguments_when_comma_terminated: true,
            disable_ending_comma_heuristic: false,
            disable_split_list_with_comment: false,
            split_all_comma_separated_values: false,
            split_all_top_level_comma_separated_values: false,
            split_before_closing_bracket: true,
            split_complex_comprehension: true,
            split_before_first_argument: false,
            split_before_named_assigns: true,

            allow_multiline_lambdas: false,
            allow_multiline_dictionary_keys: false,
            allow_split_before_dict_value: true,
            allow_split_before_default_or_named_assigns: true,

            arithmetic_precedence_indication: false,
            no_spaces_around_selected_binary_operators: Vec::new(),
            spaces_around_default_or_named_assign: false,
            spaces_around_power_operator: false,
            spaces_around_subscript_colon: false,
            spaces_around_dict_delimiters: false,
            spaces_around_list_delimiters: false,
            spaces_around_tuple_delimiters: false,
            space_inside_brackets: false,
            space_between_ending_comma_and_closing_bracket: false,

            blank_lines_around_top_level_definition: 2,
            blank_lines_between_top_level_imports_and_variables: 1,
            blank_line_before_module_docstring: false,
            blank_line_before_class_docstring: false,
            blank_line_before_nested_class_or_def: true,
            indent_dictionary_value: false,
            indent_blank_lines: false,

            split_penalty_after_opening_bracket: 300,
            split_penalty_for_added_line_split: 30,
            split_penalty_excess_character: 7000,
            split_penalty_before_if_expression: 0,
            split_penalty_comprehension: 80,
            split_penalty_arithmetic_operator: 300,
            split_penalty_logical_operator: 300,
            split_penalty_bitwise_operator: 300,
            split_penalty_import_names: 0,

            i18n_comment: String::new(),
            i18n_function_call: Vec::new(),
        }
    }
}

impl Style {
    /// A style that breaks eagerly and vertically: hanging indents with
    /// dedented closing brackets, one argument per line once a call splits.
    pub fn tall() -> Self {
        Self {
            dedent_closing_brackets: true,
            split_before_first_argument: true,
            blank_line_before_nested_class_or_def: true,
            join_multiple_lines: false,
            ..Self::default()
        }
    }

    /// A style that packs as much as it can into wider lines.
    pub fn dense() -> Self {
        Self {
            column_limit: 99,
            coalesce_brackets: true,
            ..Self::default()
        }
    }

    /// Look up a predefined baseline by case-insensitive name.
    pub fn by_name(name: &str) -> StyleResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::default()),
            "tall" => Ok(Self::tall()),
            "dense" => Ok(Self::dense()),
            _ => Err(StyleError::UnknownStyle(name.to_string())),
        }
    }

    /// Build a style from a baseline name plus `(knob, value)` overrides.
    pub fn with_overrides<I, K, V>(name: &str, overrides: I) -> StyleResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut style = Self::by_name(name)?;
        for (knob, value) in overrides {
            style.set_knob(knob.as_ref(), value.as_ref())?;
        }
        Ok(style)
    }

    /// Apply one knob by its case-insensitive name.
    pub fn set_knob(&mut self, knob: &str, value: &str) -> StyleResult<()> {
        let name = knob.trim().to_ascii_uppercase();
        let value = value.trim();
        match name.as_str() {
            "BASED_ON_STYLE" => *self = Self::by_name(value)?,
            "COLUMN_LIMIT" => self.column_limit = parse_u32(&name, value)?,
            "INDENT_WIDTH" => self.indent_width = parse_u32(&name, value)?,
            "CONTINUATION_INDENT_WIDTH" => {
                self.continuation_indent_width = parse_u32(&name, value)?
            }
            "USE_TABS" => self.use_tabs = parse_bool(&name, value)?,
            "CONTINUATION_ALIGN_STYLE" => {
                self.continuation_align_style = match value.to_ascii_lowercase().as_str() {
                    "space" => ContinuationAlignStyle::Space,
                    "fixed" => ContinuationAlignStyle::Fixed,
                    "valign-right" | "valign_right" => ContinuationAlignStyle::ValignRight,
                    _ => {
                        return Err(invalid(&name, value, "space, fixed, or valign-right"));
                    }
                }
            }
            "SPACES_BEFORE_COMMENT" => {
                self.spaces_before_comment = if value.contains(',') || value.starts_with('[') {
                    let mut columns = parse_u32_list(&name, value)?;
                    columns.sort_unstable();
                    SpacesBeforeComment::Aligned(columns)
                } else {
                    SpacesBeforeComment::Fixed(parse_u32(&name, value)?)
                }
            }
            "DEDENT_CLOSING_BRACKETS" => self.dedent_closing_brackets = parse_bool(&name, value)?,
            "INDENT_CLOSING_BRACKETS" => self.indent_closing_brackets = parse_bool(&name, value)?,
            "COALESCE_BRACKETS" => self.coalesce_brackets = parse_bool(&name, value)?,
            "JOIN_MULTIPLE_LINES" => self.join_multiple_lines = parse_bool(&name, value)?,
            "EACH_DICT_ENTRY_ON_SEPARATE_LINE" => {
                self.each_dict_entry_on_separate_line = parse_bool(&name, value)?
            }
            "FORCE_MULTILINE_DICT" => self.force_multiline_dict = parse_bool(&name, value)?,
            "SPLIT_ARGUMENTS_WHEN_COMMA_TERMINATED" => {
                self.split_arguments_when_comma_terminated = parse_bool(&name, value)?
            }
            "DISABLE_ENDING_COMMA_HEURISTIC" => {
                self.disable_ending_comma_heuristic = parse_bool(&name, value)?
            }
            "DISABLE_SPLIT_LIST_WITH_COMMENT" => {
                self.disable_split_list_with_comment = parse_bool(&name, value)?
            }
            "SPLIT_ALL_COMMA_SEPARATED_VALUES" => {
                self.split_all_comma_separated_values = parse_bool(&name, value)?
            }
            "SPLIT_ALL_TOP_LEVEL_COMMA_SEPARATED_VALUES" => {
                self.split_all_top_level_comma_separated_values = parse_bool(&name, value)?
            }
            "SPLIT_BEFORE_CLOSING_BRACKET" => {
                self.split_before_closing_bracket = parse_bool(&name, value)?
            }
            "SPLIT_COMPLEX_COMPREHENSION" => {
                self.split_complex_comprehension = parse_bool(&name, value)?
            }
            "SPLIT_BEFORE_FIRST_ARGUMENT" => {
                self.split_before_first_argument = parse_bool(&name, value)?
            }
            "SPLIT_BEFORE_NAMED_ASSIGNS" => {
                self.split_before_named_assigns = parse_bool(&name, value)?
            }
            "ALLOW_MULTILINE_LAMBDAS" => self.allow_multiline_lambdas = parse_bool(&name, value)?,
            "ALLOW_MULTILINE_DICTIONARY_KEYS" => {
                self.allow_multiline_dictionary_keys = parse_bool(&name, value)?
            }
            "ALLOW_SPLIT_BEFORE_DICT_VALUE" => {
                self.allow_split_before_dict_value = parse_bool(&name, value)?
            }
            "ALLOW_SPLIT_BEFORE_DEFAULT_OR_NAMED_ASSIGNS" => {
                self.allow_split_before_default_or_named_assigns = parse_bool(&name, value)?
            }
            "ARITHMETIC_PRECEDENCE_INDICATION" => {
                self.arithmetic_precedence_indication = parse_bool(&name, value)?
            }
            "NO_SPACES_AROUND_SELECTED_BINARY_OPERATORS" => {
                self.no_spaces_around_selected_binary_operators = parse_string_list(value);
            }
            "SPACES_AROUND_DEFAULT_OR_NAMED_ASSIGN" => {
                self.spaces_around_default_or_named_assign = parse_bool(&name, value)?
            }
            "SPACES_AROUND_POWER_OPERATOR" => {
                self.spaces_around_power_operator = parse_bool(&name, value)?
            }
            "SPACES_AROUND_SUBSCRIPT_COLON" => {
                self.spaces_around_subscript_colon = parse_bool(&name, value)?
            }
            "SPACES_AROUND_DICT_DELIMITERS" => {
                self.spaces_around_dict_delimiters = parse_bool(&name, value)?
            }
            "SPACES_AROUND_LIST_DELIMITERS" => {
                self.spaces_around_list_delimiters = parse_bool(&name, value)?
            }
            "SPACES_AROUND_TUPLE_DELIMITERS" => {
                self.spaces_around_tuple_delimiters = parse_bool(&name, value)?
            }
            "SPACE_INSIDE_BRACKETS" => self.space_inside_brackets = parse_bool(&name, value)?,
            "SPACE_BETWEEN_ENDING_COMMA_AND_CLOSING_BRACKET" => {
                self.space_between_ending_comma_and_closing_bracket = parse_bool(&name, value)?
            }
            "BLANK_LINES_AROUND_TOP_LEVEL_DEFINITION" => {
                self.blank_lines_around_top_level_definition = parse_u32(&name, value)?
            }
            "BLANK_LINES_BETWEEN_TOP_LEVEL_IMPORTS_AND_VARIABLES" => {
                self.blank_lines_between_top_level_imports_and_variables =
                    parse_u32(&name, value)?
            }
            "BLANK_LINE_BEFORE_MODULE_DOCSTRING" => {
                self.blank_line_before_module_docstring = parse_bool(&name, value)?
            }
            "BLANK_LINE_BEFORE_CLASS_DOCSTRING" => {
                self.blank_line_before_class_docstring = parse_bool(&name, value)?
            }
            "BLANK_LINE_BEFORE_NESTED_CLASS_OR_DEF" => {
                self.blank_line_before_nested_class_or_def = parse_bool(&name, value)?
            }
            "INDENT_DICTIONARY_VALUE" => self.indent_dictionary_value = parse_bool(&name, value)?,
            "INDENT_BLANK_LINES" => self.indent_blank_lines = parse_bool(&name, value)?,
            "SPLIT_PENALTY_AFTER_OPENING_BRACKET" => {
                self.split_penalty_after_opening_bracket = parse_u32(&name, value)?
            }
            "SPLIT_PENALTY_FOR_ADDED_LINE_SPLIT" => {
                self.split_penalty_for_added_line_split = parse_u32(&name, value)?
            }
            "SPLIT_PENALTY_EXCESS_CHARACTER" => {
                self.split_penalty_excess_character = parse_u32(&name, value)?
            }
            "SPLIT_PENALTY_BEFORE_IF_EXPRESSION" => {
                self.split_penalty_before_if_expression = parse_u32(&name, value)?
            }
            "SPLIT_PENALTY_COMPREHENSION" => {
                self.split_penalty_comprehension = parse_u32(&name, value)?
            }
            "SPLIT_PENALTY_ARITHMETIC_OPERATOR" => {
                self.split_penalty_arithmetic_operator = parse_u32(&name, value)?
            }
            "SPLIT_PENALTY_LOGICAL_OPERATOR" => {
                self.split_penalty_logical_operator = parse_u32(&name, value)?
            }
            "SPLIT_PENALTY_BITWISE_OPERATOR" => {
                self.split_penalty_bitwise_operator = parse_u32(&name, value)?
            }
            "SPLIT_PENALTY_IMPORT_NAMES" => {
                self.split_penalty_import_names = parse_u32(&name, value)?
            }
            "I18N_COMMENT" => {
                if !value.is_empty() {
                    regex::Regex::new(value)
                        .map_err(|_| invalid(&name, value, "a valid regular expression"))?;
                }
                self.i18n_comment = value.to_string();
            }
            "I18N_FUNCTION_CALL" => self.i18n_function_call = parse_string_list(value),
            _ => return Err(StyleError::UnknownKnob(knob.to_string())),
        }
        Ok(())
    }

    /// Spaces before a trailing comment that begins at `code_end` columns.
    pub fn comment_spaces(&self, code_end: u32) -> u32 {
        match &self.spaces_before_comment {
            SpacesBeforeComment::Fixed(spaces) => *spaces,
            SpacesBeforeComment::Aligned(columns) => columns
                .iter()
                .find(|column| **column > code_end)
                .map(|column| column - code_end)
                .unwrap_or(SpacesBeforeComment::DEFAULT_SPACES),
        }
    }

    pub fn no_spaces_around(&self, operator: &str) -> bool {
        self.no_spaces_around_selected_binary_operators
            .iter()
            .any(|op| op == operator)
    }
}

fn invalid(knob: &str, value: &str, expected: &'static str) -> StyleError {
    StyleError::InvalidValue {
        knob: knob.to_string(),
        value: value.to_string(),
        expected,
    }
}

fn parse_bool(knob: &str, value: &str) -> StyleResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(invalid(knob, value, "a boolean")),
    }
}

fn parse_u32(knob: &str, value: &str) -> StyleResult<u32> {
    value
        .parse::<u32>()
        .map_err(|_| invalid(knob, value, "a non-negative integer"))
}

fn parse_u32_list(knob: &str, value: &str) -> StyleResult<Vec<u32>> {
    value
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|item| parse_u32(knob, item.trim()))
        .collect()
}

fn parse_string_list(value: &str) -> Vec<String> {
    value
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn default_baseline() {
        let style = Style::default();
        assert_eq!(style.column_limit, 79);
        assert!(style.join_multiple_lines);
        assert!(!style.force_multiline_dict);
    }

    #[test_case("COLUMN_LIMIT", "100"; "uppercase")]
    #[test_case("column_limit", "100"; "lowercase")]
    #[test_case("Column_Limit", "100"; "mixed case")]
    fn knob_names_are_case_insensitive(knob: &str, value: &str) {
        let mut style = Style::default();
        style.set_knob(knob, value).unwrap();
        assert_eq!(style.column_limit, 100);
    }

    #[test]
    fn unknown_knob_is_rejected() {
        let mut style = Style::default();
        assert_eq!(
            style.set_knob("NOT_A_KNOB", "1"),
            Err(StyleError::UnknownKnob("NOT_A_KNOB".to_string()))
        );
    }

    #[test]
    fn malformed_value_is_rejected() {
        let mut style = Style::default();
        assert!(matches!(
            style.set_knob("COLUMN_LIMIT", "wide"),
            Err(StyleError::InvalidValue { .. })
        ));
    }

    #[test]
    fn invalid_i18n_regex_is_rejected() {
        let mut style = Style::default();
        assert!(style.set_knob("I18N_COMMENT", "#\\.i18n").is_ok());
        assert!(style.set_knob("I18N_COMMENT", "(unclosed").is_err());
    }

    #[test]
    fn comment_alignment_columns() {
        let mut style = Style::default();
        style.set_knob("SPACES_BEFORE_COMMENT", "[25, 35]").unwrap();
        assert_eq!(style.comment_spaces(10), 15);
        assert_eq!(style.comment_spaces(30), 5);
        // Past all columns, fall back to the default gap.
        assert_eq!(style.comment_spaces(50), 2);
    }

    #[test]
    fn operator_list_parses() {
        let mut style = Style::default();
        style
            .set_knob("NO_SPACES_AROUND_SELECTED_BINARY_OPERATORS", "*,/")
            .unwrap();
        assert!(style.no_spaces_around("*"));
        assert!(style.no_spaces_around("/"));
        assert!(!style.no_spaces_around("+"));
    }

    #[test]
    fn overrides_apply_on_top_of_baseline() {
        let style =
            Style::with_overrides("dense", [("COLUMN_LIMIT", "120"), ("USE_TABS", "true")])
                .unwrap();
        assert_eq!(style.column_limit, 120);
        assert!(style.use_tabs);
        assert!(style.coalesce_brackets);
    }

    #[test]
    fn unknown_baseline_is_rejected() {
        assert_eq!(
            Style::by_name("artisanal").unwrap_err(),
            StyleError::UnknownStyle("artisanal".to_string())
        );
    }
}
