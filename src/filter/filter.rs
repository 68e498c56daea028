use std::collections::HashMap;

use crate::config::FilterConfig;

use super::filter_order::FilterOrder;
use super::types::{FilterClause, FilterOp, FilterSpec, FilterValue, Pagination};

/// Reserved query parameters; never treated as field filters
pub const SORT_PARAM: &str = "sort";
pub const LIMIT_PARAM: &str = "limit";
pub const OFFSET_PARAM: &str = "offset";

const RESERVED_PARAMS: &[&str] = &[SORT_PARAM, LIMIT_PARAM, OFFSET_PARAM];

/// Turns raw query-string parameters into a [`FilterSpec`] against an allow-list.
///
/// Parameters naming fields outside the allow-list are dropped without error so
/// callers cannot discover hidden columns. Clauses come out in allow-list order,
/// independent of the order the client sent them in.
pub struct Filter<'a> {
    allow_list: &'a [&'a str],
    default_limit: u32,
    max_limit: u32,
    debug_logging: bool,
}

impl<'a> Filter<'a> {
    pub fn new(allow_list: &'a [&'a str]) -> Self {
        let defaults = FilterConfig::default();
        Self {
            allow_list,
            default_limit: defaults.default_limit,
            max_limit: defaults.max_limit,
            debug_logging: defaults.debug_logging,
        }
    }

    pub fn with_config(mut self, config: &FilterConfig) -> Self {
        self.default_limit = config.default_limit;
        self.max_limit = config.max_limit;
        self.debug_logging = config.debug_logging;
        self
    }

    pub fn process(&self, params: &HashMap<String, String>) -> FilterSpec {
        let mut spec = FilterSpec::new(self.pagination(params));

        for field in self.allow_list.iter().copied() {
            if RESERVED_PARAMS.contains(&field) {
                continue;
            }

            if let Some(value) = non_blank(params.get(field)) {
                spec.clauses.push(FilterClause {
                    field: field.to_string(),
                    operator: FilterOp::Eq,
                    value: FilterValue::One(value.to_string()),
                });
            }

            for op in [FilterOp::In, FilterOp::Gte, FilterOp::Lte] {
                let Some(suffix) = op.suffix() else { continue };
                let Some(value) = non_blank(params.get(&format!("{}{}", field, suffix))) else { continue };

                let value = if op == FilterOp::In {
                    let items: Vec<String> = value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect();
                    if items.is_empty() {
                        continue;
                    }
                    FilterValue::Many(items)
                } else {
                    FilterValue::One(value.to_string())
                };

                spec.clauses.push(FilterClause { field: field.to_string(), operator: op, value });
            }
        }

        if let Some(order) = params.get(SORT_PARAM).and_then(|s| FilterOrder::parse(s)) {
            if self.allow_list.contains(&order.column.as_str()) {
                spec.clauses.push(FilterClause {
                    field: order.column,
                    operator: FilterOp::Order,
                    value: FilterValue::One(order.sort.as_str().to_string()),
                });
            } else if self.debug_logging {
                tracing::debug!("Dropping sort on non-filterable field '{}'", order.column);
            }
        }

        spec
    }

    fn pagination(&self, params: &HashMap<String, String>) -> Pagination {
        let requested = params
            .get(LIMIT_PARAM)
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(self.default_limit);

        let limit = if requested > self.max_limit {
            if self.debug_logging {
                tracing::warn!("Limit {} exceeds max {}, capping to max", requested, self.max_limit);
            }
            self.max_limit
        } else {
            requested
        };

        let offset = params
            .get(OFFSET_PARAM)
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(0);

        Pagination { limit, offset }
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Convenience wrapper over [`Filter`] for handlers
pub fn process_query_params(
    params: &HashMap<String, String>,
    allow_list: &[&str],
    config: &FilterConfig,
) -> FilterSpec {
    Filter::new(allow_list).with_config(config).process(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let spec = Filter::new(&["status", "priority"])
            .process(&params(&[("status", "pending"), ("priority", "high"), ("bogus", "x")]));

        assert_eq!(spec.clauses.len(), 2);
        assert!(spec.clauses.iter().all(|c| c.operator == FilterOp::Eq));
        assert_eq!(spec.clauses[0].field, "status");
        assert_eq!(spec.clauses[0].value, FilterValue::One("pending".into()));
        assert_eq!(spec.clauses[1].field, "priority");
        assert!(spec.fields().all(|f| f != "bogus"));
    }

    #[test]
    fn output_follows_allow_list_order() {
        let allow = ["priority", "status"];
        let spec = Filter::new(&allow).process(&params(&[("status", "a"), ("priority", "b")]));
        let fields: Vec<&str> = spec.fields().collect();
        assert_eq!(fields, vec!["priority", "status"]);
    }

    #[test]
    fn suffixes_map_to_range_and_set_operators() {
        let spec = Filter::new(&["created_at", "status"]).process(&params(&[
            ("created_at_gte", "2024-01-01T00:00:00Z"),
            ("created_at_lte", "2024-12-31T00:00:00Z"),
            ("status_in", "draft, active,,"),
        ]));

        let ops: Vec<(&str, FilterOp)> = spec.clauses.iter().map(|c| (c.field.as_str(), c.operator)).collect();
        assert_eq!(
            ops,
            vec![("created_at", FilterOp::Gte), ("created_at", FilterOp::Lte), ("status", FilterOp::In)]
        );
        assert_eq!(spec.clauses[2].value, FilterValue::Many(vec!["draft".into(), "active".into()]));
    }

    #[test]
    fn suffix_on_unknown_field_is_ignored() {
        let spec = Filter::new(&["status"]).process(&params(&[("secret_gte", "1"), ("statusx", "1")]));
        assert!(spec.clauses.is_empty());
    }

    #[test]
    fn blank_values_produce_no_clause() {
        let spec = Filter::new(&["status"]).process(&params(&[("status", "  "), ("status_in", ",")]));
        assert!(spec.clauses.is_empty());
    }

    #[test]
    fn sort_emits_trailing_order_clause() {
        let spec = Filter::new(&["name", "status"])
            .process(&params(&[("sort", "name:desc"), ("status", "active")]));
        let last = spec.clauses.last().unwrap();
        assert_eq!(last.operator, FilterOp::Order);
        assert_eq!(last.field, "name");
        assert_eq!(last.value, FilterValue::One("desc".into()));

        let order = spec.order().unwrap();
        assert_eq!(order.column, "name");
    }

    #[test]
    fn sort_defaults_to_asc_and_respects_allow_list() {
        let spec = Filter::new(&["name"]).process(&params(&[("sort", "name")]));
        assert_eq!(spec.clauses[0].value, FilterValue::One("asc".into()));

        let spec = Filter::new(&["name"]).process(&params(&[("sort", "password_hash:desc")]));
        assert!(spec.clauses.is_empty());
    }

    #[test]
    fn limit_defaults_and_is_clamped() {
        let config = FilterConfig { default_limit: 20, max_limit: 100, debug_logging: false };

        let spec = process_query_params(&params(&[]), &["name"], &config);
        assert_eq!(spec.pagination, Pagination { limit: 20, offset: 0 });

        let spec = process_query_params(&params(&[("limit", "5000"), ("offset", "40")]), &["name"], &config);
        assert_eq!(spec.pagination, Pagination { limit: 100, offset: 40 });

        let spec = process_query_params(&params(&[("limit", "-3"), ("offset", "abc")]), &["name"], &config);
        assert_eq!(spec.pagination, Pagination { limit: 20, offset: 0 });
    }

    #[test]
    fn reserved_names_in_allow_list_are_not_filters() {
        let spec = Filter::new(&["limit", "name"]).process(&params(&[("limit", "5"), ("name", "Widget")]));
        assert_eq!(spec.clauses.len(), 1);
        assert_eq!(spec.pagination.limit, 5);
    }

    #[test]
    fn every_output_field_is_allow_listed() {
        let allow = ["a", "b", "c"];
        let inputs = params(&[
            ("a", "1"),
            ("b_gte", "2"),
            ("c_in", "x,y"),
            ("d", "4"),
            ("d_lte", "5"),
            ("sort", "d:desc"),
            ("limit", "10"),
        ]);
        let spec = Filter::new(&allow).process(&inputs);
        assert!(spec.fields().all(|f| allow.contains(&f)));
        assert_eq!(spec.clauses.len(), 3);
    }
}
