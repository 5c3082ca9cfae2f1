use serde_json::Value;
use std::collections::HashMap;

/// Default number of entries in "common_*" report sections.
pub const TOP_K: usize = 5;

/// The `k` most frequent items as `(item, count)`, highest count first.
///
/// Equal counts keep the order in which items were first seen.
pub fn most_common<I, S>(items: I, k: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let item = item.into();
        if let Some(&position) = index.get(&item) {
            counts[position].1 += 1;
        } else {
            index.insert(item.clone(), counts.len());
            counts.push((item, 1));
        }
    }

    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(k);
    counts
}

/// `[[item, count], ...]` as stored in reports.
pub fn pairs_value(pairs: Vec<(String, usize)>) -> Value {
    Value::Array(
        pairs
            .into_iter()
            .map(|(item, count)| Value::Array(vec![Value::from(item), Value::from(count)]))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_counts_descending() {
        let top = most_common(["b", "a", "b", "c", "b", "a"], 2);
        assert_eq!(top, vec![("b".to_string(), 3), ("a".to_string(), 2)]);
    }

    #[test]
    fn test_ties_keep_first_occurrence() {
        let top = most_common(["x", "y", "z", "y", "x", "z"], 5);
        let names: Vec<&str> = top.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_limit_applies_after_sorting() {
        let items = ["a", "b", "c", "d", "e", "f", "f"];
        let top = most_common(items, TOP_K);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0], ("f".to_string(), 2));
        assert_eq!(top[4].0, "d");
    }

    #[test]
    fn test_pairs_value() {
        assert_eq!(
            pairs_value(vec![("knee".into(), 2)]),
            json!([["knee", 2]])
        );
    }
}
