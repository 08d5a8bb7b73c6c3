use std::time::Duration;

use reqwest::RequestBuilder;
use reqwest::header::{ACCEPT, AUTHORIZATION};

use crate::{
    error::{DataConnectorClientResult, DataConnectorError},
    hosts::{candidate_base_urls, host_of},
    models::*,
};

const MAX_ERROR_BODY_CHARS: usize = 300;

pub struct DataConnectorClient {
    http: reqwest::Client,
    page_size: usize,
    max_rows: usize,
}

impl DataConnectorClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);
    pub const PAGE_SIZE: usize = 1000;
    /// Upper bound on rows accumulated across pages for one query.
    pub const MAX_ROWS: usize = 100_000;

    pub fn new(timeout: Duration) -> DataConnectorClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DataConnectorError::Build)?;

        Ok(Self {
            http,
            page_size: Self::PAGE_SIZE,
            max_rows: Self::MAX_ROWS,
        })
    }

    pub fn with_limits(mut self, page_size: usize, max_rows: usize) -> Self {
        self.page_size = page_size;
        self.max_rows = max_rows;
        self
    }

    /// Runs `query` against one base URL, following `@odata.nextLink`.
    ///
    /// Only the first request carries `$select`, `$top` and `$filter`; the
    /// server embeds them in every next link.
    pub async fn query(
        &self,
        base_url: &str,
        auth_header: &str,
        query: &ODataQuery,
    ) -> DataConnectorClientResult<Vec<ODataRow>> {
        let base = base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(DataConnectorError::EmptyBaseUrl);
        }

        let host = host_of(base);
        let url = format!("{base}/{}", query.table);

        let mut params = vec![
            ("$select", query.select.join(",")),
            ("$top", self.page_size.to_string()),
        ];
        if let Some(filter) = &query.filter {
            params.push(("$filter", filter.clone()));
        }

        tracing::debug!(%url, table = %query.table, "Data Connector query");

        let first = self.http.get(&url).query(&params);
        let mut page = self.fetch_page(first, auth_header, query, &host).await?;
        let mut rows = Vec::new();
        let mut pages = 1usize;

        loop {
            rows.extend(page.value);

            if rows.len() >= self.max_rows {
                tracing::warn!(
                    table = %query.table,
                    %host,
                    max_rows = self.max_rows,
                    "Data Connector pagination cap reached, truncating",
                );
                rows.truncate(self.max_rows);
                break;
            }

            match page.next_link.filter(|link| !link.is_empty()) {
                Some(link) => {
                    pages += 1;
                    tracing::debug!(table = %query.table, pages, "Following next link");
                    page = self
                        .fetch_page(self.http.get(&link), auth_header, query, &host)
                        .await?;
                }
                None => break,
            }
        }

        tracing::debug!(
            table = %query.table,
            %host,
            rows = rows.len(),
            pages,
            "Data Connector query complete",
        );

        Ok(rows)
    }

    /// Runs `query` against the configured base URL and, when that host
    /// refuses access with a 403, against its sibling public host.
    pub async fn query_with_fallback(
        &self,
        base_url: &str,
        auth_header: &str,
        query: &ODataQuery,
    ) -> DataConnectorClientResult<Vec<ODataRow>> {
        let candidates = candidate_base_urls(base_url)?;
        self.query_candidates(&candidates, auth_header, query).await
    }

    /// Tries each base URL in order. Only a 403 with a later candidate left
    /// moves on; every other outcome is final.
    pub async fn query_candidates(
        &self,
        candidates: &[String],
        auth_header: &str,
        query: &ODataQuery,
    ) -> DataConnectorClientResult<Vec<ODataRow>> {
        let Some(last) = candidates.len().checked_sub(1) else {
            return Err(DataConnectorError::EmptyBaseUrl);
        };

        for (index, base) in candidates.iter().enumerate() {
            match self.query(base, auth_header, query).await {
                Err(e) if e.is_forbidden() && index < last => {
                    tracing::warn!(
                        table = %query.table,
                        host = %host_of(base),
                        next = %host_of(&candidates[index + 1]),
                        "Data Connector refused access, trying next host",
                    );
                }
                result => return result,
            }
        }

        Err(DataConnectorError::EmptyBaseUrl)
    }

    async fn fetch_page(
        &self,
        request: RequestBuilder,
        auth_header: &str,
        query: &ODataQuery,
        host: &str,
    ) -> DataConnectorClientResult<ODataPage> {
        let request_error = |source| DataConnectorError::Request {
            table: query.table.clone(),
            host: host.to_string(),
            source,
        };

        let response = request
            .header(AUTHORIZATION, auth_header)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        let text = response.text().await.map_err(request_error)?;

        if !status.is_success() {
            return Err(DataConnectorError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
                table: query.table.clone(),
                host: host.to_string(),
            });
        }

        serde_json::from_str::<ODataPage>(&text).map_err(|source| {
            DataConnectorError::Payload {
                table: query.table.clone(),
                host: host.to_string(),
                source,
            }
        })
    }
}
