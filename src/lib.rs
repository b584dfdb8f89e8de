extern crate clap;

pub mod component;
pub mod config;
pub mod error;
pub mod template;
pub mod uri;

use clap::{Arg, ArgAction, Command};

pub use component::ComponentType;
pub use error::{Result, TemplateError};
pub use template::{
    create_uri_from_components, resolve_template_values, GroupedPattern, PathPattern,
    RightHandPath, TemplateMatch, UriComponents, UriTemplate,
};

const DEFAULT_ROUTES_FILE: &str = "routes.yml";

/// Command line interface of the `uri-pattern` binary.
pub fn cli() -> Command {
    Command::new("uri-pattern")
        .about("Match, expand and resolve URI templates")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("match")
                .about("Find the most specific route for a path")
                .arg(Arg::new("path").required(true).help("Path to match"))
                .arg(
                    Arg::new("routes")
                        .short('r')
                        .long("routes")
                        .value_name("ROUTES")
                        .help("Path to a YAML file containing routes")
                        .default_value(DEFAULT_ROUTES_FILE),
                )
                .arg(
                    Arg::new("decode")
                        .short('d')
                        .long("decode")
                        .action(ArgAction::SetTrue)
                        .help("Percent-decode bound values"),
                ),
        )
        .subcommand(
            Command::new("expand")
                .about("Generate a URI from a template")
                .arg(Arg::new("template").required(true).help("URI template"))
                .arg(
                    Arg::new("values")
                        .num_args(0..)
                        .value_name("NAME=VALUE")
                        .help("Template variable values"),
                ),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve a reference against a base URI")
                .arg(Arg::new("base").required(true))
                .arg(Arg::new("reference").required(true)),
        )
        .subcommand(
            Command::new("relativize")
                .about("Express a URI relative to a base URI")
                .arg(Arg::new("base").required(true))
                .arg(Arg::new("reference").required(true)),
        )
}
