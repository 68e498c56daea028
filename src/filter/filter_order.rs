use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse a `field:asc|desc` sort parameter. The direction defaults to
    /// ascending and anything other than `desc` is read as ascending.
    pub fn parse(s: &str) -> Option<FilterOrderInfo> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }
        let (column, dir) = match trimmed.split_once(':') {
            Some((column, dir)) => (column.trim(), dir.trim()),
            None => (trimmed, "asc"),
        };
        if column.is_empty() {
            return None;
        }
        let sort = if dir.eq_ignore_ascii_case("desc") { SortDirection::Desc } else { SortDirection::Asc };
        Some(FilterOrderInfo { column: column.to_string(), sort })
    }

    pub fn generate(info: Option<&FilterOrderInfo>) -> String {
        match info {
            Some(i) => format!("ORDER BY \"{}\" {}", i.column, i.sort.to_sql()),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_direction() {
        let info = FilterOrder::parse("created_at:desc").unwrap();
        assert_eq!(info.column, "created_at");
        assert_eq!(info.sort, SortDirection::Desc);

        let info = FilterOrder::parse("name:DESC").unwrap();
        assert_eq!(info.sort, SortDirection::Desc);
    }

    #[test]
    fn direction_defaults_to_asc() {
        assert_eq!(FilterOrder::parse("name").unwrap().sort, SortDirection::Asc);
        assert_eq!(FilterOrder::parse("name:").unwrap().sort, SortDirection::Asc);
        assert_eq!(FilterOrder::parse("name:sideways").unwrap().sort, SortDirection::Asc);
    }

    #[test]
    fn rejects_blank_column() {
        assert!(FilterOrder::parse("").is_none());
        assert!(FilterOrder::parse(":desc").is_none());
    }

    #[test]
    fn generates_order_by() {
        let info = FilterOrderInfo { column: "sku".into(), sort: SortDirection::Desc };
        assert_eq!(FilterOrder::generate(Some(&info)), "ORDER BY \"sku\" DESC");
        assert_eq!(FilterOrder::generate(None), "");
    }
}
