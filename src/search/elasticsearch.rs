//! Elasticsearch REST client for the point index.

use super::{SearchError, SearchIndex};
use crate::domain::Point;
use crate::pagination::{Page, PageRequest, SortOrder, SortProperty};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Clone, Debug)]
pub struct ElasticsearchIndex {
    client: Client,
    base_url: String,
    index: String,
    refresh: bool,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Deserialize)]
struct Hits {
    total: Total,
    hits: Vec<Hit>,
}

#[derive(Deserialize)]
struct Total {
    value: u64,
}

#[derive(Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: Point,
}

/// Index mapping: text fields keep a `keyword` sub-field so they can be sorted.
fn index_mapping() -> Value {
    let text_with_keyword = json!({
        "type": "text",
        "fields": { "keyword": { "type": "keyword", "ignore_above": 256 } }
    });
    json!({
        "mappings": {
            "properties": {
                "id": { "type": "long" },
                "title": text_with_keyword,
                "description": text_with_keyword
            }
        }
    })
}

fn sort_field(property: SortProperty) -> &'static str {
    match property {
        SortProperty::Id => "id",
        SortProperty::Title => "title.keyword",
        SortProperty::Description => "description.keyword",
    }
}

fn search_body(query: &str, request: &PageRequest) -> Value {
    let sort: Vec<Value> = request
        .sort_or_default()
        .iter()
        .map(|SortOrder { property, direction }| {
            json!({ sort_field(*property): { "order": direction.as_str() } })
        })
        .collect();
    json!({
        "query": { "query_string": { "query": query } },
        "from": request.offset(),
        "size": request.size,
        "sort": sort,
        "track_total_hits": true
    })
}

async fn check(response: Response) -> Result<Response, SearchError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(SearchError::Status { status, body })
}

impl ElasticsearchIndex {
    pub fn new(base_url: impl Into<String>, index: impl Into<String>, refresh: bool) -> Self {
        Self::with_client(Client::new(), base_url, index, refresh)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, index: impl Into<String>, refresh: bool) -> Self {
        ElasticsearchIndex {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            index: index.into(),
            refresh,
        }
    }

    fn index_url(&self) -> String {
        format!("{}/{}", self.base_url, self.index)
    }

    fn doc_url(&self, id: i64) -> String {
        let mut url = format!("{}/_doc/{}", self.index_url(), id);
        if self.refresh {
            url.push_str("?refresh=wait_for");
        }
        url
    }

    /// Create the index with its mapping unless it already exists.
    pub async fn ensure_index(&self) -> Result<(), SearchError> {
        let head = self.client.head(self.index_url()).send().await?;
        if head.status().is_success() {
            return Ok(());
        }
        if head.status() != StatusCode::NOT_FOUND {
            return Err(SearchError::Status {
                status: head.status().as_u16(),
                body: String::new(),
            });
        }
        tracing::info!(index = %self.index, "creating search index");
        let response = self.client.put(self.index_url()).json(&index_mapping()).send().await?;
        check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn upsert(&self, point: &Point) -> Result<(), SearchError> {
        let id = point.id.ok_or(SearchError::MissingId)?;
        tracing::debug!(index = %self.index, id, "index document");
        let response = self.client.put(self.doc_url(id)).json(point).send().await?;
        check(response).await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), SearchError> {
        tracing::debug!(index = %self.index, id, "delete document");
        let response = self.client.delete(self.doc_url(id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check(response).await?;
        Ok(())
    }

    async fn search(&self, query: &str, request: &PageRequest) -> Result<Page<Point>, SearchError> {
        let body = search_body(query, request);
        tracing::debug!(index = %self.index, query, "search");
        let response = self
            .client
            .post(format!("{}/_search", self.index_url()))
            .json(&body)
            .send()
            .await?;
        let parsed: SearchResponse = check(response).await?.json().await?;
        let content = parsed.hits.hits.into_iter().map(|h| h.source).collect();
        Ok(Page::new(content, request, parsed.hits.total.value))
    }

    async fn ping(&self) -> Result<(), SearchError> {
        let response = self.client.get(&self.base_url).send().await?;
        check(response).await?;
        Ok(())
    }
}
