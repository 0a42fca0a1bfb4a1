use crate::volume::Variables;
use indexmap::IndexMap;
use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

mod jsonnet;
mod plain;

#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    #[error("unable to render plain template: {message}")]
    #[diagnostic(
        code(cfgenerator::interpreter::plain),
        help("Plain templates use Go text/template syntax, variables are read as `.NAME`")
    )]
    Plain { message: String },

    #[error("template references undefined variable '{name}'")]
    #[diagnostic(
        code(cfgenerator::interpreter::undefined_variable),
        help("Variables are the file names found in the volume paths")
    )]
    UndefinedVariable { name: String },

    #[error("unable to evaluate jsonnet program: {message}")]
    #[diagnostic(code(cfgenerator::interpreter::jsonnet))]
    Jsonnet { message: String },
}

/// The template languages a run can be rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpreter {
    /// Go text/template syntax, variables are fields of the root context.
    Plain,
    /// JSONNET program, variables are external variables (`std.extVar`).
    Jsonnet,
}
impl Interpreter {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Jsonnet => "jsonnet",
        }
    }

    /// Renders `source` with every collected variable bound, whether the template
    /// uses it or not.
    pub fn render(&self, source: &str, variables: &Variables) -> Result<String, RenderError> {
        match self {
            Self::Plain => plain::render(source, variables),
            Self::Jsonnet => jsonnet::render(source, variables),
        }
    }
}
impl fmt::Display for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Lookup table from interpreter name to [`Interpreter`].
///
/// Built once at startup and passed down by reference; it is never mutated.
#[derive(Debug, Clone)]
pub struct Registry(IndexMap<&'static str, Interpreter>);
impl Registry {
    pub fn builtin() -> Self {
        let interpreters = [Interpreter::Plain, Interpreter::Jsonnet]
            .into_iter()
            .map(|interpreter| (interpreter.name(), interpreter))
            .collect();

        Self(interpreters)
    }

    /// Names are matched case-sensitively.
    pub fn get(&self, name: &str) -> Option<Interpreter> {
        self.0.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_knows_both_interpreters() {
        let registry = Registry::builtin();

        assert_eq!(registry.get("plain"), Some(Interpreter::Plain));
        assert_eq!(registry.get("jsonnet"), Some(Interpreter::Jsonnet));
        assert_eq!(registry.names().collect::<Vec<_>>(), ["plain", "jsonnet"]);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let registry = Registry::builtin();

        assert_eq!(registry.get("JSONNET"), None);
        assert_eq!(registry.get("Plain"), None);
        assert_eq!(registry.get("yaml"), None);
    }

    #[test]
    fn rendering_twice_is_identical() {
        let variables: Variables = [("PORT", "8080")].into_iter().collect();
        let source = r#"{ port: std.extVar("PORT"), nested: { list: [1, 2] } }"#;

        let first = Interpreter::Jsonnet.render(source, &variables).unwrap();
        let second = Interpreter::Jsonnet.render(source, &variables).unwrap();

        assert_eq!(first, second);
    }
}
