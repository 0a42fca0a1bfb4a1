use crate::stream::{Destination, Input, STDIO};
use clap::{crate_description, crate_name, crate_version, Arg, ArgAction, ArgMatches, Command};
use std::{ffi::OsString, path::PathBuf};

pub const DEFAULT_INTERPRETER: &str = "jsonnet";

/// Flags that may be spelled with a single dash, as in `-in=config.jsonnet`.
const SINGLE_DASH_FLAGS: [&str; 5] = ["in", "out", "interpreter", "verbose", "help"];

const AFTER_LONG_HELP: &str = "\
Variables:
    Every volume path is either a file or a flat directory. A file becomes one
    variable named after the file, holding its content. A directory contributes
    one variable per file directly inside it; sub-directories are not read.
    When two files share a name, the one from the later path wins.

    With -interpreter=jsonnet the variables are JSONNET external variables,
    read with std.extVar('NAME'). With -interpreter=plain the input is a Go
    text/template and variables are read as {{ .NAME }}.

Examples:
    Render a JSONNET program from stdin into JSON on stdout:

        $ cfgenerator /data/configmap /data/secrets <<EOF
        {
          api: { address: '0.0.0.0:' + std.extVar('API_PORT') },
          database: {
            username: std.extVar('DATABASE_USERNAME'),
            password: std.extVar('DATABASE_PASSWORD'),
          },
        }
        EOF

    Render a file into a file, echoing the result to stdout:

        $ cfgenerator -in /app/config.jsonnet -out /app/config.json -out - \\
            /data/configmap /data/secrets
";

/// Immutable configuration of a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub interpreter: String,
    pub input: Input,
    pub outputs: Vec<Destination>,
    pub volumes: Vec<PathBuf>,
    pub verbose: bool,
}
impl Settings {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let interpreter = matches
            .get_one::<String>("interpreter")
            .cloned()
            .unwrap_or_else(|| DEFAULT_INTERPRETER.to_string());

        let input = matches
            .get_one::<String>("in")
            .map(|value| Input::from(value.as_str()))
            .unwrap_or(Input::Stdin);

        let mut outputs: Vec<Destination> = matches
            .get_many::<String>("out")
            .map(|values| values.map(|value| Destination::from(value.as_str())).collect())
            .unwrap_or_default();
        if outputs.is_empty() {
            outputs.push(Destination::Stdout);
        }

        let volumes = matches
            .get_many::<PathBuf>("volumes")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        Self {
            interpreter,
            input,
            outputs,
            volumes,
            verbose: matches.get_flag("verbose"),
        }
    }
}

pub fn command() -> Command {
    Command::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .after_long_help(AFTER_LONG_HELP)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("interpreter")
                .long("interpreter")
                .value_name("plain|jsonnet")
                .help("How the input is interpreted")
                .default_value(DEFAULT_INTERPRETER),
        )
        .arg(
            Arg::new("in")
                .long("in")
                .value_name("PATH|-")
                .help("Template to render, '-' reads standard input")
                .default_value(STDIO),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .value_name("PATH|-")
                .help("Where to write the result, '-' is standard output [repeatable, default: -]")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("volumes")
                .value_name("VOLUME")
                .help("Files or flat directories whose files become variables")
                .value_parser(clap::value_parser!(PathBuf))
                .num_args(0..),
        )
}

/// Rewrites single-dash long flags (`-in=x`, `-out x`) into clap's `--in=x` form.
///
/// Rewriting stops at a bare `--`; everything after it is passed through untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;

    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(index, arg)| {
            if index == 0 || passthrough {
                return arg;
            }

            let Some(text) = arg.to_str() else {
                return arg;
            };

            if text == "--" {
                passthrough = true;
                return arg;
            }

            let is_single_dash_flag = text
                .strip_prefix('-')
                .filter(|rest| !rest.starts_with('-'))
                .map(|rest| rest.split('=').next().unwrap_or(rest))
                .is_some_and(|name| SINGLE_DASH_FLAGS.contains(&name));

            if is_single_dash_flag {
                OsString::from(format!("-{}", text))
            } else {
                arg
            }
        })
        .collect()
}
