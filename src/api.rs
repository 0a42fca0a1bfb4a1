use crate::{
    cli::Settings,
    errors::IoError,
    generator::{self, GenerateError},
    interpreter::Registry,
    sink::{SinkError, Sinks},
};

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum CfgError {
    #[error("unsupported interpreter '{name}'")]
    #[diagnostic(
        code(cfgenerator::unsupported_interpreter),
        help("Available interpreters: {available}")
    )]
    UnsupportedInterpreter { name: String, available: String },

    #[error("can't open input file")]
    #[diagnostic(code(cfgenerator::input))]
    Input(
        #[source]
        #[diagnostic_source]
        IoError,
    ),

    #[error("can't generate content")]
    #[diagnostic(code(cfgenerator::generate))]
    Generate(
        #[source]
        #[diagnostic_source]
        GenerateError,
    ),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Sink(#[from] SinkError),
}

/// Renders the configured input with the variables found in the configured volumes and
/// writes the result to every configured output.
///
/// The interpreter is resolved before any file is touched, and outputs are only opened
/// once rendering has succeeded, so a failed run leaves every output untouched.
///
/// # Errors
///
/// Returns a [`CfgError`] if:
///
/// - The interpreter name is not in the `registry`.
/// - The input cannot be opened or read.
/// - A volume path cannot be inspected or read.
/// - The template fails to render.
/// - An output cannot be opened or written to.
pub fn run(registry: &Registry, settings: &Settings) -> Result<(), CfgError> {
    let interpreter = registry.get(&settings.interpreter).ok_or_else(|| {
        CfgError::UnsupportedInterpreter {
            name: settings.interpreter.clone(),
            available: registry.names().collect::<Vec<_>>().join(", "),
        }
    })?;

    log::debug!("Using interpreter: {}", interpreter);

    let content = {
        let input = settings.input.open().map_err(CfgError::Input)?;

        log::debug!("Reading template from: {}", settings.input);

        generator::generate(interpreter, input, &settings.volumes).map_err(CfgError::Generate)?
    };

    Sinks::open(&settings.outputs)?.fanout(&content)?;

    Ok(())
}
