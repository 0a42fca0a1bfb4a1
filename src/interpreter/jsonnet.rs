use super::RenderError;
use crate::volume::Variables;
use jrsonnet_evaluator::EvaluationState;
use std::path::PathBuf;

const SNIPPET_NAME: &str = "<template>";

pub(super) fn render(source: &str, variables: &Variables) -> Result<String, RenderError> {
    let state = EvaluationState::default();
    state.with_stdlib();

    for (name, value) in variables.iter() {
        state.add_ext_str(name.into(), value.into());
    }

    let value = state
        .evaluate_snippet_raw(PathBuf::from(SNIPPET_NAME).into(), source.into())
        .map_err(|error| RenderError::Jsonnet {
            message: state.stringify_err(&error),
        })?;

    let manifest = state.manifest(value).map_err(|error| RenderError::Jsonnet {
        message: state.stringify_err(&error),
    })?;

    Ok(format!("{}\n", &*manifest))
}
