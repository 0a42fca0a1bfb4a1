use cfgenerator::{api, cli, interpreter::Registry};

// The CLI layer should only parse inputs and forward them to library code.
fn main() -> miette::Result<()> {
    let matches = cli::command().get_matches_from(cli::normalize_args(std::env::args_os()));

    let settings = cli::Settings::from_matches(&matches);

    let default_level = if settings.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let registry = Registry::builtin();

    api::run(&registry, &settings)?;

    Ok(())
}
