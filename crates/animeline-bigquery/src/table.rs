//! Destination table addressing

/// Fully-qualified destination table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

impl TableRef {
    pub fn new(
        project_id: impl Into<String>,
        dataset_id: impl Into<String>,
        table_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
            table_id: table_id.into(),
        }
    }

    /// `tabledata.insertAll` endpoint for this table.
    pub(crate) fn insert_all_url(&self, base_url: &str) -> String {
        format!(
            "{}/projects/{}/datasets/{}/tables/{}/insertAll",
            base_url.trim_end_matches('/'),
            self.project_id,
            self.dataset_id,
            self.table_id
        )
    }

    /// Synchronous query endpoint for the owning project.
    pub(crate) fn query_url(&self, base_url: &str) -> String {
        format!(
            "{}/projects/{}/queries",
            base_url.trim_end_matches('/'),
            self.project_id
        )
    }

    /// Backtick-quoted SQL identifier.
    pub(crate) fn sql_ident(&self) -> String {
        format!("`{}.{}.{}`", self.project_id, self.dataset_id, self.table_id)
    }
}

impl std::fmt::Display for TableRef {
    // dataset-qualified name, the way run logs refer to the destination
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.dataset_id, self.table_id)
    }
}

/// How rows land in the destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Add rows, leave existing content alone. The only mode scheduled runs use.
    #[default]
    Append,
    /// Truncate, then write.
    Replace,
}
