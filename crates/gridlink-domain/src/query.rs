use serde::Serialize;

/// Pagination input for list operations. `page` is 0-based.
///
/// When `limit` is absent there is nothing to multiply the page offset by,
/// so the whole result set is returned from offset 0 regardless of `page`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageRequest {
    /// Number of records to skip before the requested page starts.
    pub fn skip(&self) -> u64 {
        match self.limit {
            Some(limit) => self.page.unwrap_or(0) * limit,
            None => 0,
        }
    }
}

/// Sort order parsed from a string such as `-createdAt`. A leading `-`
/// selects descending order, a leading `+` or no prefix ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub descending: bool,
}

impl Sort {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (field, descending) = match raw.strip_prefix('-') {
            Some(field) => (field, true),
            None => (raw.strip_prefix('+').unwrap_or(raw), false),
        };

        if field.is_empty() {
            return Self::default();
        }

        Self {
            field: field.to_string(),
            descending,
        }
    }
}

impl Default for Sort {
    /// Newest first.
    fn default() -> Self {
        Self {
            field: "createdAt".to_string(),
            descending: true,
        }
    }
}

/// One page of list results plus the filter-matching total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListPage<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    /// Count of records matching the filters, ignoring pagination.
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_multiplies_page_by_limit() {
        let page = PageRequest {
            page: Some(3),
            limit: Some(20),
        };
        assert_eq!(page.skip(), 60);
    }

    #[test]
    fn test_skip_without_limit_is_zero() {
        let page = PageRequest {
            page: Some(7),
            limit: None,
        };
        assert_eq!(page.skip(), 0);
    }

    #[test]
    fn test_skip_without_page_defaults_to_first_page() {
        let page = PageRequest {
            page: None,
            limit: Some(25),
        };
        assert_eq!(page.skip(), 0);
    }

    #[test]
    fn test_parse_descending() {
        let sort = Sort::parse("-createdAt");
        assert_eq!(sort.field, "createdAt");
        assert!(sort.descending);
    }

    #[test]
    fn test_parse_ascending() {
        let sort = Sort::parse("name");
        assert_eq!(sort.field, "name");
        assert!(!sort.descending);

        let sort = Sort::parse("+name");
        assert_eq!(sort.field, "name");
        assert!(!sort.descending);
    }

    #[test]
    fn test_parse_empty_falls_back_to_default() {
        assert_eq!(Sort::parse(""), Sort::default());
        assert_eq!(Sort::parse("   "), Sort::default());
        assert_eq!(Sort::parse("-"), Sort::default());
    }
}
