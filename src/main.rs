use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use std::collections::HashMap;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uri_pattern::{config::RouteTable, uri, UriTemplate};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "uri_pattern=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let matches = uri_pattern::cli().get_matches();
    match matches.subcommand() {
        Some(("match", sub)) => match_path(sub),
        Some(("expand", sub)) => expand(sub),
        Some(("resolve", sub)) => {
            let (base, reference) = base_and_reference(sub);
            println!("{}", uri::resolve(base, reference));
            Ok(())
        }
        Some(("relativize", sub)) => {
            let (base, reference) = base_and_reference(sub);
            println!("{}", uri::relativize(base, reference));
            Ok(())
        }
        _ => unreachable!("a subcommand is required"),
    }
}

fn match_path(sub: &ArgMatches) -> Result<()> {
    let path = required(sub, "path");
    let routes = sub.get_one::<String>("routes").map(String::as_str);

    let table = RouteTable::load(routes)?;
    tracing::info!(routes = table.routes().len(), "loaded route table");

    let Some(found) = table.find(path) else {
        bail!("No route matches '{}'", path);
    };
    let found = if sub.get_flag("decode") {
        found.decoded()?
    } else {
        found
    };

    println!("{}", serde_json::to_string_pretty(&found)?);
    Ok(())
}

fn expand(sub: &ArgMatches) -> Result<()> {
    let template = UriTemplate::new(required(sub, "template"))?;

    let mut values = HashMap::new();
    for pair in sub.get_many::<String>("values").into_iter().flatten() {
        let (name, value) = pair
            .split_once('=')
            .with_context(|| format!("Expected NAME=VALUE but got '{}'", pair))?;
        values.insert(name.to_string(), value.to_string());
    }

    for name in template.template_variables() {
        if !values.contains_key(name) {
            tracing::debug!(name = %name, "template variable has no value");
        }
    }

    println!("{}", template.create_uri(&values));
    Ok(())
}

fn base_and_reference(sub: &ArgMatches) -> (&str, &str) {
    (required(sub, "base"), required(sub, "reference"))
}

fn required<'a>(sub: &'a ArgMatches, id: &str) -> &'a str {
    sub.get_one::<String>(id)
        .map(String::as_str)
        .unwrap_or_default()
}
