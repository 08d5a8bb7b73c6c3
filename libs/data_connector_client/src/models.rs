use serde::Deserialize;
use serde_json::{Map, Value};

/// One entity returned by an OData table, column name to value.
pub type ODataRow = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ODataQuery {
    pub table: String,
    pub select: Vec<String>,
    pub filter: Option<String>,
}

impl ODataQuery {
    pub fn new<I, S>(table: impl Into<String>, select: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.into(),
            select: select.into_iter().map(Into::into).collect(),
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ODataPage {
    #[serde(default)]
    pub value: Vec<ODataRow>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}
