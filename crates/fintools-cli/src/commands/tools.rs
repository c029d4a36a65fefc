use std::io::Write;
use std::process::ExitCode;

use serde::Serialize;

use fintools_agent::{Domain, ParamSpec, ToolRegistry};

use crate::cli::ToolsArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct ToolEntry {
    name: &'static str,
    domain: Domain,
    description: &'static str,
    params: &'static [ParamSpec],
}

pub fn run(args: &ToolsArgs) -> Result<ExitCode, CliError> {
    let entries: Vec<ToolEntry> = ToolRegistry::list(args.domain.map(Domain::from))
        .into_iter()
        .map(|tool| ToolEntry {
            name: tool.name(),
            domain: tool.domain(),
            description: tool.description(),
            params: tool.params(),
        })
        .collect();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &entries)?;
        writeln!(out)?;
    } else {
        for entry in &entries {
            writeln!(out, "{:<28} [{}] {}", entry.name, entry.domain, entry.description)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
