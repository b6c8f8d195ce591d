use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tsconfig_resolve::{
    GlobExpander, GlobWalkExpander, Resolver, StubGlobExpander, TargetRequest, Verbatim,
};

#[derive(Clone, Debug, ValueEnum)]
enum GlobMethod {
    /// Walk the filesystem beneath the build root
    Walk,
    /// Leave globs unexpanded
    Stub,
}

#[derive(Debug, Parser)]
struct Cli {
    /// How to expand globs found in tsconfig.json
    #[arg(long, value_enum, default_value = "walk")]
    pub glob_method: GlobMethod,

    /// Directory the build runs from, defaults to the current directory
    #[arg(long)]
    pub build_root: Option<PathBuf>,

    /// JSON files each holding `{"options": .., "task": .., "target": ..}`
    #[arg(required = true)]
    pub requests: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let build_root = match cli.build_root {
        Some(build_root) => build_root,
        None => std::env::current_dir()?,
    };
    let walk = GlobWalkExpander::new(&build_root);
    let glob_expander: &dyn GlobExpander = match cli.glob_method {
        GlobMethod::Walk => &walk,
        GlobMethod::Stub => &StubGlobExpander,
    };
    let resolver = Resolver::new(&build_root, &Verbatim, glob_expander);

    let requests = cli
        .requests
        .iter()
        .map(|path| -> Result<TargetRequest> {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("unable to read {:?}", path))?;
            serde_json::from_str(&content).with_context(|| format!("unable to parse {:?}", path))
        })
        .collect::<Result<Vec<_>>>()?;

    for (path, result) in cli.requests.iter().zip(resolver.resolve_all(requests)) {
        let resolved = result.with_context(|| format!("unable to resolve {:?}", path))?;
        writeln!(io::stdout(), "{}", serde_json::to_string_pretty(&resolved)?)?;
    }

    Ok(())
}
