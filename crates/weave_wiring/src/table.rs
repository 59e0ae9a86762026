//! Human-readable route table.

use std::fmt;

use serde::Serialize;

use crate::engine::{RouteWiring, UpstreamProtocol};
use crate::route::HttpMethod;

/// One row: the methods of one route declaration on one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteTableRow {
    pub methods: Vec<HttpMethod>,
    pub path: String,
    pub upstream: UpstreamProtocol,
    pub path_parameters: Vec<String>,
    pub injected_headers: Vec<String>,
}

impl RouteTableRow {
    /// Row for wirings expanded from the same declaration. `None` for an empty group.
    pub fn from_group(wirings: &[RouteWiring]) -> Option<Self> {
        let first = wirings.first()?;
        Some(Self {
            methods: wirings.iter().map(|w| w.method).collect(),
            path: first.path.clone(),
            upstream: first.upstream,
            path_parameters: first.path_parameters.clone(),
            injected_headers: first.injected_headers.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteTable {
    rows: Vec<RouteTableRow>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&mut self, wirings: &[RouteWiring]) {
        if let Some(row) = RouteTableRow::from_group(wirings) {
            self.rows.push(row);
        }
    }

    pub fn rows(&self) -> &[RouteTableRow] {
        &self.rows
    }
}

fn join_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "none".to_string()
    } else {
        values.join(", ")
    }
}

impl fmt::Display for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "| Method | Path template | Upstream protocol | Path params | Injected headers |")?;
        writeln!(f, "|---|---|---|---|---|")?;
        for row in &self.rows {
            let methods: Vec<&str> = row.methods.iter().map(|m| m.as_str()).collect();
            writeln!(
                f,
                "| {} | {} | {} | {} | {} |",
                methods.join("/"),
                row.path,
                row.upstream,
                join_or_none(&row.path_parameters),
                join_or_none(&row.injected_headers)
            )?;
        }
        Ok(())
    }
}
