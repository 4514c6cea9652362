//! Fixed-width text rendering and the help surface.

use crate::table::Table;
use std::io::{self, Write};

/// Print `table` as a label line followed by `| a | b |` rows padded to the
/// widest cell of each column. A table with an error prints one `| error |`
/// row instead.
pub fn render_table(table: &Table, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}", table.label())?;
    if let Some(error) = &table.error {
        return writeln!(out, "| {error} |");
    }

    let widths = column_widths(table);
    for row in table.data_rows() {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell.as_str(), width = *width))
            .collect();
        writeln!(out, "| {} |", cells.join(" | "))?;
    }
    Ok(())
}

/// Widest cell text per column over the data rows, counted in characters.
pub fn column_widths(table: &Table) -> Vec<usize> {
    let mut widths = vec![0; table.column_count()];
    for row in table.data_rows() {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.as_str().chars().count());
        }
    }
    widths
}

/// Function names, then type names, in table order.
pub fn list_names(tables: &[Table]) -> Vec<&'static str> {
    tables
        .iter()
        .map(|table| table.name_func)
        .chain(tables.iter().map(|table| table.name_type))
        .collect()
}

const USAGE: &str = "\
Usage: openxr-explorer [options] [function or type names...]

Lists what the installed OpenXR runtime supports. Each name prints the
matching table; with no names, this help is shown.

Options:
  -help, -h                  Show this help.
  -session, -enableSession   Create an XrSession so session-gated queries run.
  -xrGraphics <api>          Session graphics API: auto, headless, d3d11,
                             opengl, or d3d12. Defaults to auto.
  -gpuLogLevel <level>       Graphics log filter: info, warn, or error.
                             Defaults to warn.
  -verbose, -v               Same as -gpuLogLevel info.
  -loaderDebug <value>       Sets XR_LOADER_DEBUG. Defaults to error.
  -loaderLogFile <path>      Sets XR_LOADER_LOG_FILE.
  -json                      Print the selected tables (or all) as JSON.
";

/// Usage, options, and every table name grouped by kind.
pub fn render_help(tables: &[Table], out: &mut dyn Write) -> io::Result<()> {
    out.write_all(USAGE.as_bytes())?;
    writeln!(out)?;
    writeln!(out, "FUNCTIONS:")?;
    for table in tables {
        writeln!(out, "  {}", table.name_func)?;
    }
    writeln!(out)?;
    writeln!(out, "TYPES:")?;
    for table in tables {
        writeln!(out, "  {}", table.name_type)?;
    }
    Ok(())
}
