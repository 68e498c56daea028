use serde_json::{Map, Value};
use std::collections::HashMap;

/// `carbonFootprintKg` -> `carbon_footprint_kg`. Already snake_case input is unchanged.
pub fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `carbon_footprint_kg` -> `carbonFootprintKg`
pub fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Rename top-level keys of a stored row for the wire. Nested JSON
/// columns (e.g. assessment answers) are user data and stay untouched.
pub fn keys_to_camel(row: Map<String, Value>) -> Map<String, Value> {
    row.into_iter().map(|(k, v)| (to_camel_case(&k), v)).collect()
}

pub fn keys_to_snake(body: Map<String, Value>) -> Map<String, Value> {
    body.into_iter().map(|(k, v)| (to_snake_case(&k), v)).collect()
}

/// Query parameters arrive camelCase; operator suffixes (`_gte`, `_in`) survive
/// because they are already snake_case. The field half of `sort=field:dir` is
/// converted as well. When both spellings of one parameter are sent
/// (`createdAt_gte` and `created_at_gte`), the snake_case one wins.
pub fn query_to_snake(params: HashMap<String, String>) -> HashMap<String, String> {
    let (literal, converted): (Vec<_>, Vec<_>) = params
        .into_iter()
        .map(|(k, v)| {
            let v = if k == "sort" {
                match v.split_once(':') {
                    Some((field, dir)) => format!("{}:{}", to_snake_case(field), dir),
                    None => to_snake_case(&v),
                }
            } else {
                v
            };
            let snake = to_snake_case(&k);
            (snake == k, snake, v)
        })
        .partition(|(unchanged, _, _)| *unchanged);

    let mut out: HashMap<String, String> = literal.into_iter().map(|(_, k, v)| (k, v)).collect();

    // Two camelCase keys can still fold together (`aB` and `AB`); take the smallest value
    let mut converted: Vec<_> = converted.into_iter().map(|(_, k, v)| (k, v)).collect();
    converted.sort();
    for (k, v) in converted {
        out.entry(k).or_insert(v);
    }
    out
}
