//! Listing query parsing and filter translation

use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use std::collections::{BTreeMap, HashMap};

use crate::error::{ProductError, ProductResult};
use crate::models::PageQuery;

const RANGE_OPERATORS: [&str; 5] = ["gt", "gte", "lt", "lte", "ne"];
const TEXT_FIELDS: [&str; 5] = ["title", "description", "code", "category", "thumbnails"];

/// Query keys that are not limit, page or sort.
///
/// Passed through to the repository verbatim; the MongoDB implementation
/// turns them into equality or range clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilters(BTreeMap<String, String>);

impl ListFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// Build a MongoDB filter document.
    ///
    /// `field=value` matches by equality, `field[op]=value` with `op` one of
    /// `gt`, `gte`, `lt`, `lte`, `ne` adds a comparison clause on `field`.
    /// Values take the type of the product field they filter.
    pub fn to_document(&self) -> Document {
        let mut filter = doc! {};

        for (key, raw) in &self.0 {
            match split_operator(key) {
                Some((field, op)) => {
                    let value = typed_value(field, raw);
                    let mut clause = Document::new();
                    clause.insert(format!("${}", op), value);
                    match filter.get_document_mut(field) {
                        Ok(existing) => existing.extend(clause),
                        Err(_) => {
                            filter.insert(field, clause);
                        }
                    }
                }
                None => {
                    filter.insert(key.as_str(), typed_value(key, raw));
                }
            }
        }

        filter
    }
}

impl FromIterator<(String, String)> for ListFilters {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl PageQuery {
    /// Split raw query parameters into limit, page, sort and filters
    pub fn from_params(mut params: HashMap<String, String>) -> ProductResult<Self> {
        let limit = parse_number(&mut params, "limit")?;
        let page = parse_number(&mut params, "page")?;
        let sort = params.remove("sort").filter(|s| !s.is_empty());

        Ok(Self {
            limit,
            page,
            sort,
            filters: params.into_iter().collect(),
        })
    }
}

fn parse_number(params: &mut HashMap<String, String>, key: &str) -> ProductResult<Option<u64>> {
    match params.remove(key) {
        None => Ok(None),
        Some(raw) if raw.is_empty() => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            ProductError::InvalidQuery(format!(
                "Query parameter '{}' must be a positive integer, got '{}'",
                key, raw
            ))
        }),
    }
}

fn split_operator(key: &str) -> Option<(&str, &str)> {
    let (field, rest) = key.split_once('[')?;
    let op = rest.strip_suffix(']')?;
    (!field.is_empty() && RANGE_OPERATORS.contains(&op)).then_some((field, op))
}

/// Typed value for a filter on `field`.
///
/// Known product fields use their stored type. A value that does not parse
/// stays a string and so matches nothing. Other keys are guessed from the
/// value itself.
fn typed_value(field: &str, raw: &str) -> Bson {
    let text = || Bson::String(raw.to_string());
    match field {
        "price" => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map_or_else(text, Bson::Double),
        "stock" => raw.trim().parse::<i64>().map_or_else(|_| text(), Bson::Int64),
        "status" => match raw.trim() {
            "true" => Bson::Boolean(true),
            "false" => Bson::Boolean(false),
            _ => text(),
        },
        "_id" => ObjectId::parse_str(raw.trim()).map_or_else(|_| text(), Bson::ObjectId),
        f if TEXT_FIELDS.contains(&f) => text(),
        _ => coerce(raw),
    }
}

fn coerce(raw: &str) -> Bson {
    if let Ok(int) = raw.parse::<i64>() {
        return Bson::Int64(int);
    }
    if let Ok(float) = raw.parse::<f64>() {
        if float.is_finite() {
            return Bson::Double(float);
        }
    }
    match raw {
        "true" => Bson::Boolean(true),
        "false" => Bson::Boolean(false),
        _ => Bson::String(raw.to_string()),
    }
}

/// Sort document for a `sort` query value.
///
/// `asc`/`desc` order by price, `field`/`-field` order by that field.
pub fn sort_document(sort: Option<&str>) -> Option<Document> {
    let sort = sort?.trim();
    match sort {
        "" => None,
        "asc" => Some(doc! { "price": 1 }),
        "desc" => Some(doc! { "price": -1 }),
        _ => match sort.strip_prefix('-') {
            Some(field) if !field.is_empty() => Some(single_key(field, -1)),
            Some(_) => None,
            None => Some(single_key(sort, 1)),
        },
    }
}

fn single_key(field: &str, direction: i32) -> Document {
    let mut spec = Document::new();
    spec.insert(field, direction);
    spec
}
