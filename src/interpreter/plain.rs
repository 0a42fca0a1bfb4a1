use super::RenderError;
use crate::volume::Variables;
use gtmpl::Value;
use std::collections::HashMap;

lazy_static::lazy_static! {
    static ref ACTION_REGEX: regex::Regex =
        regex::Regex::new(r"(?s)\{\{(.*?)\}\}").expect("a valid regex pattern");

    static ref LITERAL_REGEX: regex::Regex = regex::Regex::new(
        r#"(?x)
        "(?:[^"\\]|\\.)*"     # interpreted string
        |
        `[^`]*`               # raw string
        |
        '(?:[^'\\]|\\.)*'     # character constant
        "#
    ).expect("a valid regex pattern");

    // `.NAME` or `$.NAME` at the start of an operand, i.e. a lookup on the root context
    static ref ROOT_FIELD_REGEX: regex::Regex =
        regex::Regex::new(r"(?:^|[\s(|,=])\$?\.([A-Za-z_][A-Za-z0-9_]*)")
            .expect("a valid regex pattern");

    // `index . "NAME"` or `index $ "NAME"`, a lookup on the root context by literal key
    static ref ROOT_INDEX_REGEX: regex::Regex = regex::Regex::new(
        r#"(?:^|[\s(|])index\s+[.$]\s+(?:"((?:[^"\\]|\\.)*)"|`([^`]*)`)"#
    ).expect("a valid regex pattern");
}

/// Returns the first root field referenced by an action that is absent from `variables`.
fn find_undefined(source: &str, variables: &Variables) -> Option<String> {
    for action in ACTION_REGEX.captures_iter(source) {
        let body = action[1].trim_matches(|c: char| c == '-' || c.is_whitespace());

        if body.starts_with("/*") {
            continue;
        }

        for index in ROOT_INDEX_REGEX.captures_iter(body) {
            let name = index.get(1).or_else(|| index.get(2)).map_or("", |m| m.as_str());
            if !variables.contains(name) {
                return Some(name.to_string());
            }
        }

        let body = LITERAL_REGEX.replace_all(body, "\"\"");

        for field in ROOT_FIELD_REGEX.captures_iter(&body) {
            let name = &field[1];
            if !variables.contains(name) {
                return Some(name.to_string());
            }
        }
    }

    None
}

pub(super) fn render(source: &str, variables: &Variables) -> Result<String, RenderError> {
    if let Some(name) = find_undefined(source, variables) {
        return Err(RenderError::UndefinedVariable { name });
    }

    let context: HashMap<String, Value> = variables
        .iter()
        .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
        .collect();

    gtmpl::template(source, Value::Map(context)).map_err(|error| RenderError::Plain {
        message: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variables(pairs: &[(&str, &str)]) -> Variables {
        pairs.iter().copied().collect()
    }

    #[test]
    fn substitutes_root_fields() {
        let rendered = render("Hello {{.NAME}}", &variables(&[("NAME", "World")])).unwrap();

        assert_eq!(rendered, "Hello World");
    }

    #[test]
    fn receives_whole_mapping() {
        let vars = variables(&[("HOST", "db.local"), ("PORT", "5432"), ("UNUSED", "x")]);

        let rendered = render("{{ .HOST }}:{{ $.PORT }}", &vars).unwrap();

        assert_eq!(rendered, "db.local:5432");
    }

    #[test]
    fn keeps_trailing_newlines_of_values() {
        let rendered = render("[{{.TOKEN}}]", &variables(&[("TOKEN", "abc\n")])).unwrap();

        assert_eq!(rendered, "[abc\n]");
    }

    #[test]
    fn undefined_variable_fails() {
        let error = render("Hello {{ .NAME }}", &variables(&[("OTHER", "x")])).unwrap_err();

        match error {
            RenderError::UndefinedVariable { name } => assert_eq!(name, "NAME"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn syntax_error_fails() {
        let error = render("Hello {{ if }}", &variables(&[("NAME", "World")])).unwrap_err();

        assert!(matches!(error, RenderError::Plain { .. }));
    }

    #[test]
    fn finds_undefined_fields_in_nested_operands() {
        let vars = variables(&[("A", "1")]);

        assert_eq!(find_undefined("{{ if eq .A (.B) }}x{{ end }}", &vars), Some("B".into()));
        assert_eq!(find_undefined("{{- .A -}}", &vars), None);
    }

    #[test]
    fn ignores_literals_comments_and_chained_fields() {
        let vars = variables(&[("A", "1")]);

        assert_eq!(find_undefined(r#"{{ " .MISSING" }}"#, &vars), None);
        assert_eq!(find_undefined("{{/* .MISSING */}}", &vars), None);
        assert_eq!(find_undefined("{{ .A.MISSING }}", &vars), None);
        assert_eq!(find_undefined("text .MISSING outside actions", &vars), None);
    }

    #[test]
    fn finds_undefined_index_lookups_on_root() {
        let vars = variables(&[("A", "1"), ("with-dash", "2")]);

        assert_eq!(find_undefined(r#"{{ index . "MISSING" }}"#, &vars), Some("MISSING".into()));
        assert_eq!(find_undefined("{{ index $ `GONE` }}", &vars), Some("GONE".into()));
        assert_eq!(find_undefined(r#"{{ index . "with-dash" }}"#, &vars), None);
        assert_eq!(find_undefined(r#"{{ (index $ "A") }}"#, &vars), None);
    }

    #[test]
    fn index_lookup_of_undefined_variable_fails() {
        let error = render(r#"a {{ index . "NOPE" }}"#, &variables(&[("A", "1")])).unwrap_err();

        match error {
            RenderError::UndefinedVariable { name } => assert_eq!(name, "NOPE"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
