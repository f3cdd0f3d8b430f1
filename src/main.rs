// Copyright 2026 Sift Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod cli;
mod output;

use std::path::Path;

use anyhow::Context as _;
use anyhow::Result;
use clap::Parser;
use sift::Config;
use sift::config::global_config_path;
use sift::config::load_config;
use sift::request::RequestBuilder;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::cli::Commands;
use crate::cli::ConfigCommand;
use crate::cli::RequestArgs;
use crate::output::JsonResponse;
use crate::output::print_json;
use crate::output::render_request;

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Request(args) => {
            let json = args.json;
            handle_result(cmd_request(&args, config_path), json)
        }
        Commands::Types { json } => handle_result(cmd_types(config_path, json), json),
        Commands::Config {
            command: ConfigCommand::Path,
        } => cmd_config_path(),
    }
}

fn handle_result(result: Result<()>, json: bool) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(err) => {
            if json {
                let code = err
                    .downcast_ref::<sift::Error>()
                    .map(sift::Error::code)
                    .unwrap_or("error");
                let resp = JsonResponse::error(code, &format!("{err:#}"));
                print_json(&resp)?;
                Ok(())
            } else {
                Err(err)
            }
        }
    }
}

fn load(path: Option<&Path>) -> Result<Config> {
    load_config(path).context("load config")
}

fn cmd_request(args: &RequestArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load(config_path)?;
    let registry = config.registry();
    let opts = args.to_options();
    let request = RequestBuilder::new(&config, &registry).build(&opts)?;

    let mut warnings = Vec::new();
    if opts.geo.is_some() && request.anchor.is_none() {
        warnings.push("geo anchor skipped: no latitude/longitude attributes known".to_string());
    }

    if args.json {
        let resp = JsonResponse::ok()
            .with_request(request)
            .with_warnings(warnings);
        print_json(&resp)?;
        return Ok(());
    }

    println!("{}", render_request(&request));
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

fn cmd_types(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = load(config_path)?;
    let registry = config.registry();

    if json {
        let resp = JsonResponse::ok().with_types(registry.types().to_vec());
        print_json(&resp)?;
        return Ok(());
    }

    if registry.is_empty() {
        println!("no types configured");
        return Ok(());
    }
    for meta in registry.types() {
        println!(
            "{}\t{}\t{}\t{}",
            meta.name, meta.fingerprint, meta.core_index, meta.delta_index
        );
    }
    Ok(())
}

fn cmd_config_path() -> Result<()> {
    let path = global_config_path().context("no config directory for this platform")?;
    println!("{}", path.display());
    Ok(())
}
