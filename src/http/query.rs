//! Query string parsing
//!
//! Decodes `application/x-www-form-urlencoded` query strings into a mapping of name to
//! every value given for it. Names keep the order of their first appearance and pairs
//! with an empty value are dropped.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::ops::Index;

/// Query parameters in arrival order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, Vec<String>)>,
}

impl QueryParams {
    pub fn get(&self, name: &str) -> Option<&Vec<String>> {
        self.entries
            .iter()
            .find(|(known, _)| known == name)
            .map(|(_, values)| values)
    }

    fn push(&mut self, name: String, value: String) {
        match self.entries.iter_mut().find(|(known, _)| *known == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }
}

impl Index<&str> for QueryParams {
    type Output = Vec<String>;

    fn index(&self, name: &str) -> &Self::Output {
        self.get(name)
            .unwrap_or_else(|| panic!("no query parameter named {name:?}"))
    }
}

impl Serialize for QueryParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, values) in &self.entries {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

pub fn parse_query(query: &str) -> QueryParams {
    let mut params = QueryParams::default();
    for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        params.push(name.into_owned(), value.into_owned());
    }
    params
}

/// Pretty-printed JSON view of the query, as echoed and forwarded by the debug routes
pub fn query_to_json(params: &QueryParams) -> String {
    serde_json::to_string_pretty(params).unwrap_or_else(|_| "{}".to_string())
}
