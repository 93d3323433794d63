use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;

use super::{Fields, Record, RecordStore, SelectOptions, StoreError};

const API_ROOT: &str = "https://api.airtable.com/v0";

/// Record API client for one Airtable base. All requests carry the bearer
/// API key; there are no retries and no explicit timeout beyond reqwest's
/// transport defaults.
pub struct AirtableBase {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ListPage {
    records: Vec<Record>,
    offset: Option<String>,
}

impl AirtableBase {
    pub fn new(api_key: &str, base_id: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: format!("{}/{}", API_ROOT, base_id),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(table))
    }

    fn record_url(&self, table: &str, id: &str) -> String {
        format!("{}/{}", self.table_url(table), id)
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RecordStore for AirtableBase {
    async fn list(&self, table: &str, options: SelectOptions) -> Result<Vec<Record>, StoreError> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        // The list endpoint pages; keep following the offset cursor until
        // the datastore stops returning one.
        loop {
            let mut query: Vec<(String, String)> = Vec::new();
            if let Some(ref formula) = options.filter_by_formula {
                query.push(("filterByFormula".into(), formula.clone()));
            }
            if let Some((ref field, direction)) = options.sort {
                query.push(("sort[0][field]".into(), field.clone()));
                query.push(("sort[0][direction]".into(), direction.as_str().into()));
            }
            if let Some(max) = options.max_records {
                query.push(("maxRecords".into(), max.to_string()));
            }
            if let Some(ref cursor) = offset {
                query.push(("offset".into(), cursor.clone()));
            }

            let response = self
                .client
                .get(self.table_url(table))
                .bearer_auth(&self.api_key)
                .query(&query)
                .send()
                .await?;

            let page: ListPage = Self::check(response).await?.json().await?;
            records.extend(page.records);

            match page.offset {
                Some(cursor) => offset = Some(cursor),
                None => break,
            }
        }

        Ok(records)
    }

    async fn find(&self, table: &str, id: &str) -> Result<Record, StoreError> {
        let response = self
            .client
            .get(self.record_url(table, id))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn create(&self, table: &str, fields: Fields) -> Result<Record, StoreError> {
        let response = self
            .client
            .post(self.table_url(table))
            .bearer_auth(&self.api_key)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn update(&self, table: &str, id: &str, fields: Fields) -> Result<Record, StoreError> {
        let response = self
            .client
            .patch(self.record_url(table, id))
            .bearer_auth(&self.api_key)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }
}
