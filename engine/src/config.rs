//! Table configuration.
//!
//! A [`TableConfig`] is supplied once per engine instance and names the
//! fields the engine is allowed to touch: which fields are searchable, which
//! carry exact-match filters, and which one (if any) is treated as a date.

use crate::{error::Result, Error, FieldName, SortConfig};
use serde::{Deserialize, Serialize};

/// Configuration for one table instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    /// Fields eligible for exact-match filtering, in display order.
    pub filter_keys: Vec<FieldName>,
    /// Fields eligible for substring search, in display order.
    pub search_keys: Vec<FieldName>,
    /// Optional field treated as a date for single/range filtering.
    pub date_filter_key: Option<FieldName>,
    /// Initial sort applied before the user picks a column.
    pub default_sort: Option<SortConfig>,
    /// Initial page size.
    pub default_rows_per_page: usize,
}

impl TableConfig {
    /// Create a config with the given initial page size.
    ///
    /// Zero rows per page is rejected here so the pagination math never has
    /// to guard against it.
    pub fn new(default_rows_per_page: usize) -> Result<Self> {
        if default_rows_per_page == 0 {
            return Err(Error::InvalidRowsPerPage);
        }
        Ok(Self {
            filter_keys: Vec::new(),
            search_keys: Vec::new(),
            date_filter_key: None,
            default_sort: None,
            default_rows_per_page,
        })
    }

    /// Builder-style method to set the filterable fields.
    pub fn with_filter_keys<I, S>(mut self, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<FieldName>,
    {
        self.filter_keys = validated_keys(keys, "filter keys")?;
        Ok(self)
    }

    /// Builder-style method to set the searchable fields.
    pub fn with_search_keys<I, S>(mut self, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<FieldName>,
    {
        self.search_keys = validated_keys(keys, "search keys")?;
        Ok(self)
    }

    /// Builder-style method to set the date field.
    pub fn with_date_filter_key(mut self, key: impl Into<FieldName>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::EmptyFieldName("date filter key"));
        }
        self.date_filter_key = Some(key);
        Ok(self)
    }

    /// Builder-style method to set the initial sort.
    pub fn with_default_sort(mut self, sort: SortConfig) -> Self {
        self.default_sort = Some(sort);
        self
    }

    /// Check whether a field is a configured filter key.
    pub fn has_filter_key(&self, key: &str) -> bool {
        self.filter_keys.iter().any(|k| k == key)
    }
}

fn validated_keys<I, S>(keys: I, section: &'static str) -> Result<Vec<FieldName>>
where
    I: IntoIterator<Item = S>,
    S: Into<FieldName>,
{
    let mut out: Vec<FieldName> = Vec::new();
    for key in keys {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::EmptyFieldName(section));
        }
        if out.contains(&key) {
            return Err(Error::DuplicateFieldName { section, name: key });
        }
        out.push(key);
    }
    Ok(out)
}
