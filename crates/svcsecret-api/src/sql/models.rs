// Wire types for the SQL API v2 statements endpoint.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ── Request ──────────────────────────────────────────────────────────

/// Session context sent with each statement.
///
/// `None` fields fall back to the user's defaults on the warehouse side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementContext {
    pub role: Option<String>,
    pub warehouse: Option<String>,
    pub database: Option<String>,
    pub schema: Option<String>,
}

/// A single positional bind value.
///
/// Every value this workspace sends is `TEXT`. `Debug` never prints the
/// value since bindings routinely carry secrets.
#[derive(Clone, Serialize)]
pub struct Binding {
    #[serde(rename = "type")]
    kind: &'static str,
    value: String,
}

impl Binding {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: "TEXT",
            value: value.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("kind", &self.kind)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /api/v2/statements`.
#[derive(Debug, Serialize)]
pub(crate) struct StatementRequest<'a> {
    pub statement: &'a str,
    pub timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<&'a str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub bindings: BTreeMap<String, &'a Binding>,
}

impl<'a> StatementRequest<'a> {
    /// Number bindings 1..=n as the SQL API expects for `?` placeholders.
    pub fn new(
        statement: &'a str,
        timeout: u64,
        context: &'a StatementContext,
        bindings: &'a [Binding],
    ) -> Self {
        Self {
            statement,
            timeout,
            role: context.role.as_deref(),
            warehouse: context.warehouse.as_deref(),
            database: context.database.as_deref(),
            schema: context.schema.as_deref(),
            bindings: bindings
                .iter()
                .enumerate()
                .map(|(i, b)| ((i + 1).to_string(), b))
                .collect(),
        }
    }
}

// ── Responses ────────────────────────────────────────────────────────

/// A completed statement (HTTP 200).
///
/// The SQL API returns every cell as a JSON string or `null`, regardless
/// of the column's SQL type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    pub result_set_meta_data: Option<ResultSetMetaData>,
    #[serde(default)]
    pub data: Vec<Vec<Option<String>>>,
    pub statement_handle: Option<String>,
    pub message: Option<String>,
    pub code: Option<String>,
    pub sql_state: Option<String>,
}

impl ResultSet {
    /// Cell at (`row`, `column`), `None` if absent or SQL NULL.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.data.get(row)?.get(column)?.as_deref()
    }

    /// Number of rows actually present in this partition.
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Column names, in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.result_set_meta_data
            .as_ref()
            .map(|m| m.row_type.iter().map(|c| c.name.as_str()).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSetMetaData {
    #[serde(default)]
    pub num_rows: u64,
    #[serde(default)]
    pub row_type: Vec<ColumnType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnType {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub nullable: bool,
}

/// A statement still executing (HTTP 202).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryStatus {
    pub statement_handle: Option<String>,
    pub statement_status_url: Option<String>,
    pub message: Option<String>,
}

/// Error body for 4xx/5xx responses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryFailure {
    pub code: Option<String>,
    pub sql_state: Option<String>,
    pub message: Option<String>,
}
