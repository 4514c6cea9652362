//! JSON form of one reload cycle, printed by `-json`.

use crate::explorer::Explorer;
use crate::provider::XrProvider;
use crate::table::Table;
use anyhow::{Context, Result};
use serde::Serialize;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub schema_version: u32,
    pub runtime: &'a str,
    pub instance_error: Option<String>,
    pub system_error: Option<String>,
    pub session_error: Option<String>,
    pub tables: Vec<&'a Table>,
}

impl<'a> Report<'a> {
    /// Report over `tables`, or over every table when `tables` is empty.
    pub fn new<P: XrProvider>(explorer: &'a Explorer<P>, tables: Vec<&'a Table>) -> Self {
        let tables = if tables.is_empty() {
            explorer.tables().iter().collect()
        } else {
            tables
        };
        Self {
            schema_version: SCHEMA_VERSION,
            runtime: explorer.runtime_name(),
            instance_error: explorer.instance_error().map(ToString::to_string),
            system_error: explorer.system_error().map(ToString::to_string),
            session_error: explorer.session_error().map(ToString::to_string),
            tables,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serializing report")
    }
}
