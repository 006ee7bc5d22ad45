//! In-process search index with a small subset of the query-string grammar:
//! whitespace-separated terms (any may match), `AND` between terms (both must match, binding
//! tighter than the implicit or), `field:term` restrictions, trailing `*` prefixes, and `*` for
//! everything. Matching is case-insensitive on whole words.

use super::{SearchError, SearchIndex};
use crate::domain::Point;
use crate::pagination::{Page, PageRequest};
use crate::store::page_of;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemorySearchIndex {
    docs: RwLock<BTreeMap<i64, Point>>,
    unavailable: AtomicBool,
}

#[derive(Debug, PartialEq, Eq)]
struct Term {
    field: Option<String>,
    text: String,
    prefix: bool,
}

fn parse_term(raw: &str) -> Option<Term> {
    let (field, text) = match raw.split_once(':') {
        Some((f, t)) => (Some(f.to_lowercase()), t),
        None => (None, raw),
    };
    let prefix = text.ends_with('*');
    let text = text.trim_end_matches('*').trim_matches('"').to_lowercase();
    if text.is_empty() && !prefix {
        return None;
    }
    Some(Term { field, text, prefix })
}

/// Alternatives of conjunctions: a point matches when every term of any one group matches.
fn parse_query(query: &str) -> Vec<Vec<Term>> {
    let mut groups: Vec<Vec<Term>> = Vec::new();
    let mut join_next = false;
    for raw in query.split_whitespace() {
        match raw {
            "AND" => join_next = !groups.is_empty(),
            "OR" => join_next = false,
            _ => {
                let Some(term) = parse_term(raw) else { continue };
                match groups.last_mut() {
                    Some(group) if join_next => group.push(term),
                    _ => groups.push(vec![term]),
                }
                join_next = false;
            }
        }
    }
    groups
}

fn words(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

fn field_matches(value: &str, term: &Term) -> bool {
    words(value).any(|w| if term.prefix { w.starts_with(&term.text) } else { w == term.text })
}

fn term_matches(point: &Point, term: &Term) -> bool {
    match term.field.as_deref() {
        Some("title") => field_matches(&point.title, term),
        Some("description") => field_matches(&point.description, term),
        Some("id") => point.id.map(|id| id.to_string() == term.text).unwrap_or(false),
        Some(_) => false,
        None => field_matches(&point.title, term) || field_matches(&point.description, term),
    }
}

fn matches_query(point: &Point, groups: &[Vec<Term>]) -> bool {
    groups.is_empty() || groups.iter().any(|g| g.iter().all(|t| term_matches(point, t)))
}

impl MemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with [`SearchError::Unavailable`] until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn get(&self, id: i64) -> Option<Point> {
        self.docs.read().await.get(&id).cloned()
    }

    fn check_available(&self) -> Result<(), SearchError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SearchError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl SearchIndex for MemorySearchIndex {
    async fn upsert(&self, point: &Point) -> Result<(), SearchError> {
        self.check_available()?;
        let id = point.id.ok_or(SearchError::MissingId)?;
        self.docs.write().await.insert(id, point.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), SearchError> {
        self.check_available()?;
        self.docs.write().await.remove(&id);
        Ok(())
    }

    async fn search(&self, query: &str, request: &PageRequest) -> Result<Page<Point>, SearchError> {
        self.check_available()?;
        let groups = parse_query(query);
        let hits: Vec<Point> = self
            .docs
            .read()
            .await
            .values()
            .filter(|p| matches_query(p, &groups))
            .cloned()
            .collect();
        Ok(page_of(hits, request))
    }

    async fn ping(&self) -> Result<(), SearchError> {
        self.check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> MemorySearchIndex {
        let index = MemorySearchIndex::new();
        index.upsert(&Point::new("North Gate", "main entrance").with_id(1)).await.unwrap();
        index.upsert(&Point::new("Harbour", "north pier").with_id(2)).await.unwrap();
        index.upsert(&Point::new("Market", "old square").with_id(3)).await.unwrap();
        index
    }

    fn ids(page: &Page<Point>) -> Vec<i64> {
        page.content.iter().filter_map(|p| p.id).collect()
    }

    #[tokio::test]
    async fn term_matches_any_field() {
        let index = seeded().await;
        let page = index.search("north", &PageRequest::default()).await.unwrap();
        assert_eq!(ids(&page), vec![1, 2]);
    }

    #[tokio::test]
    async fn field_restriction_and_prefix() {
        let index = seeded().await;
        let page = index.search("title:mar*", &PageRequest::default()).await.unwrap();
        assert_eq!(ids(&page), vec![3]);
        let page = index.search("description:north", &PageRequest::default()).await.unwrap();
        assert_eq!(ids(&page), vec![2]);
    }

    #[tokio::test]
    async fn star_matches_everything() {
        let index = seeded().await;
        let page = index.search("*", &PageRequest::new(0, 2)).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.content.len(), 2);
    }

    #[tokio::test]
    async fn unavailable_index_fails_writes() {
        let index = MemorySearchIndex::new();
        index.set_unavailable(true);
        let err = index.upsert(&Point::new("a", "b").with_id(1)).await.unwrap_err();
        assert!(matches!(err, SearchError::Unavailable));
    }

    #[tokio::test]
    async fn and_requires_both_terms() {
        let index = seeded().await;
        let page = index.search("north AND pier", &PageRequest::default()).await.unwrap();
        assert_eq!(ids(&page), vec![2]);
        let page = index.search("title:north AND pier", &PageRequest::default()).await.unwrap();
        assert!(page.content.is_empty());
        let page = index.search("market OR north AND gate", &PageRequest::default()).await.unwrap();
        assert_eq!(ids(&page), vec![1, 3]);
    }

    #[test]
    fn parses_query_terms() {
        assert_eq!(
            parse_query("title:Foo* AND bar baz"),
            vec![
                vec![
                    Term { field: Some("title".into()), text: "foo".into(), prefix: true },
                    Term { field: None, text: "bar".into(), prefix: false },
                ],
                vec![Term { field: None, text: "baz".into(), prefix: false }],
            ]
        );
    }
}
