use crate::{
    interpreter::{Interpreter, RenderError},
    volume::{self, VolumeError},
};
use miette::Diagnostic;
use std::{io::Read, path::Path};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum GenerateError {
    #[error("can't read template input")]
    #[diagnostic(code(cfgenerator::generator::read_input))]
    ReadInput {
        #[source]
        source: std::io::Error,
    },

    #[error("can't collect variables from volumes")]
    #[diagnostic(code(cfgenerator::generator::collect))]
    Collect(
        #[source]
        #[diagnostic_source]
        VolumeError,
    ),

    #[error("can't render template with the {interpreter} interpreter")]
    #[diagnostic(code(cfgenerator::generator::render))]
    Render {
        interpreter: Interpreter,
        #[source]
        #[diagnostic_source]
        source: RenderError,
    },
}
/// Reads the whole template from `input`, collects variables from `volumes` and renders
/// the template with `interpreter`.
///
/// Nothing is returned unless every stage succeeds.
///
/// # Errors
///
/// Returns a [`GenerateError`] wrapping the first failure.
pub fn generate<R: Read, P: AsRef<Path>>(
    interpreter: Interpreter,
    mut input: R,
    volumes: &[P],
) -> Result<String, GenerateError> {
    let mut source = String::new();
    input
        .read_to_string(&mut source)
        .map_err(|error| GenerateError::ReadInput { source: error })?;

    log::debug!("Read template ({} bytes)", source.len());

    let variables = volume::collect(volumes).map_err(GenerateError::Collect)?;

    log::debug!(
        "Collected {} variables, rendering with {}",
        variables.len(),
        interpreter
    );

    interpreter
        .render(&source, &variables)
        .map_err(|error| GenerateError::Render {
            interpreter,
            source: error,
        })
}
