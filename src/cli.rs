//! Command-line surface: flag parsing and output assembly.
//!
//! Flags are matched case-insensitively after stripping any leading `-` or
//! `/`, so `-session`, `--SESSION`, and `/session` are the same flag. Valued
//! flags accept `name=value` or take the next token. Every other token is a
//! table query matched against function and type names. A bad flag value is
//! logged and the flag keeps its default; parsing itself never fails.

use crate::explorer::Explorer;
use crate::graphics::GpuLogLevel;
use crate::provider::XrProvider;
use crate::render;
use crate::report::Report;
use crate::settings::{GraphicsPreference, XrSettings};
use crate::table::Table;
use anyhow::Result;
use std::io::{self, Write};
use tracing::warn;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub help: bool,
    pub allow_session: bool,
    pub json: bool,
    pub graphics: GraphicsPreference,
    pub gpu_log_level: GpuLogLevel,
    pub loader_debug: Option<String>,
    pub loader_log_file: Option<String>,
    /// Table names, in argument order.
    pub queries: Vec<String>,
}

impl CliArgs {
    /// Reload settings for these arguments.
    pub fn settings(&self) -> XrSettings {
        XrSettings {
            graphics: self.graphics,
            allow_session: self.allow_session,
            ..XrSettings::default()
        }
    }
}

fn strip_flag_prefix(token: &str) -> &str {
    token.trim_start_matches(['-', '/'])
}

/// Parse arguments, excluding the program name.
pub fn parse_args<I, S>(args: I) -> CliArgs
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = args.into_iter().map(|arg| -> String { arg.into() });
    let mut cli = CliArgs::default();

    while let Some(token) = args.next() {
        let stripped = strip_flag_prefix(&token);
        let (name, inline) = match stripped.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (stripped, None),
        };
        match name.to_ascii_lowercase().as_str() {
            "help" | "h" => cli.help = true,
            "session" | "enablesession" => cli.allow_session = true,
            "verbose" | "v" => cli.gpu_log_level = GpuLogLevel::Info,
            "json" => cli.json = true,
            "xrgraphics" => {
                if let Some(value) = flag_value("xrGraphics", inline, &mut args) {
                    match GraphicsPreference::parse(&value) {
                        Ok(graphics) => cli.graphics = graphics,
                        Err(err) => warn!("{err:#}; keeping -xrGraphics {}", cli.graphics),
                    }
                }
            }
            "gpuloglevel" => {
                if let Some(value) = flag_value("gpuLogLevel", inline, &mut args) {
                    match GpuLogLevel::parse(&value) {
                        Ok(level) => cli.gpu_log_level = level,
                        Err(err) => {
                            warn!("{err:#}; keeping -gpuLogLevel {:?}", cli.gpu_log_level)
                        }
                    }
                }
            }
            "loaderdebug" => {
                if let Some(value) = flag_value("loaderDebug", inline, &mut args) {
                    cli.loader_debug = Some(value);
                }
            }
            "loaderlogfile" => {
                if let Some(value) = flag_value("loaderLogFile", inline, &mut args) {
                    cli.loader_log_file = Some(value);
                }
            }
            _ => {
                if !stripped.is_empty() {
                    cli.queries.push(stripped.to_string());
                }
            }
        }
    }

    cli
}

/// The inline value, else the next token. Missing or empty values are
/// logged and dropped.
fn flag_value(
    flag: &str,
    inline: Option<String>,
    args: &mut impl Iterator<Item = String>,
) -> Option<String> {
    let value = inline.or_else(|| args.next());
    match value {
        Some(value) if !value.is_empty() => Some(value),
        _ => {
            warn!("-{flag} needs a value; ignoring it");
            None
        }
    }
}

/// Tables matching `queries`, in query order. A match on the type name
/// labels the copy with its type. Unmatched queries are skipped.
pub fn select_tables<P: XrProvider>(explorer: &Explorer<P>, queries: &[String]) -> Vec<Table> {
    queries
        .iter()
        .filter_map(|query| {
            let table = explorer.find_table(query)?;
            let mut selected = table.clone();
            selected.show_type = !table.name_func.eq_ignore_ascii_case(query);
            Some(selected)
        })
        .collect()
}

/// Print the tier errors, then the selected tables, then help when nothing
/// matched or help was asked for.
pub fn write_output<P: XrProvider>(
    explorer: &Explorer<P>,
    cli: &CliArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let selected = select_tables(explorer, &cli.queries);

    if cli.json {
        let report = Report::new(explorer, selected.iter().collect());
        writeln!(out, "{}", report.to_json_pretty()?)?;
        return Ok(());
    }

    write_tier_errors(explorer, out)?;
    for table in &selected {
        render::render_table(table, out)?;
    }
    if cli.help || selected.is_empty() {
        render::render_help(explorer.tables(), out)?;
    }
    Ok(())
}

fn write_tier_errors<P: XrProvider>(explorer: &Explorer<P>, out: &mut dyn Write) -> io::Result<()> {
    if let Some(err) = explorer.instance_error() {
        writeln!(out, "XrInstance error: [{err}]")?;
    }
    if let Some(err) = explorer.system_error() {
        writeln!(out, "XrSystemId error: [{err}]")?;
    }
    if let Some(err) = explorer.session_error() {
        writeln!(out, "XrSession error: [{err}]")?;
    }
    Ok(())
}
