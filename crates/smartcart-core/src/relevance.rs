//! Heuristic relevance filter over model output.
//!
//! Decides which catalog products a free-text completion "talks about":
//! a product is kept when the lowercased completion contains its lowercased
//! category or its lowercased name. Shared by the tier-3 search fallback
//! and personalized recommendations.

use crate::models::Product;

/// Result cap used by search and recommendations when none is configured.
pub const DEFAULT_LIMIT: usize = 5;

/// Keep the candidates mentioned by `response_text`, in input order,
/// truncated to `limit` after filtering.
///
/// Empty `response_text` yields an empty result. An empty name or category
/// never counts as a mention.
pub fn filter(response_text: &str, candidates: &[Product], limit: usize) -> Vec<Product> {
    if response_text.is_empty() || limit == 0 {
        return Vec::new();
    }
    let response = response_text.to_lowercase();
    candidates
        .iter()
        .filter(|p| mentions(&response, &p.category) || mentions(&response, &p.name))
        .take(limit)
        .cloned()
        .collect()
}

fn mentions(response_lower: &str, field: &str) -> bool {
    !field.is_empty() && response_lower.contains(&field.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Product> {
        vec![
            Product::new(1, "MacBook Pro", "Electronics"),
            Product::new(2, "Spring Boot in Action", "Books"),
            Product::new(3, "Phone Case", "Accessories"),
            Product::new(4, "Running Shoes", "Sports"),
            Product::new(5, "iPhone 15", "Electronics"),
        ]
    }

    fn ids(products: &[Product]) -> Vec<i64> {
        products.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_empty_response_yields_nothing() {
        assert!(filter("", &catalog(), DEFAULT_LIMIT).is_empty());
        let many: Vec<Product> = (0..50)
            .map(|i| Product::new(i, format!("item {i}"), "Misc"))
            .collect();
        assert!(filter("", &many, 100).is_empty());
    }

    #[test]
    fn test_matches_category_or_name_in_catalog_order() {
        let out = filter("electronics, accessories", &catalog(), DEFAULT_LIMIT);
        assert_eq!(ids(&out), vec![1, 3, 5]);
    }

    #[test]
    fn test_name_match_is_case_insensitive() {
        let out = filter("You might like RUNNING SHOES.", &catalog(), DEFAULT_LIMIT);
        assert_eq!(ids(&out), vec![4]);
    }

    #[test]
    fn test_not_ranked_by_position_in_response() {
        let out = filter("Sports first, then Books", &catalog(), DEFAULT_LIMIT);
        assert_eq!(ids(&out), vec![2, 4]);
    }

    #[test]
    fn test_truncates_after_filtering() {
        let mut products = catalog();
        products.extend((10..20).map(|i| Product::new(i, format!("Gadget {i}"), "Electronics")));
        let out = filter("electronics", &products, DEFAULT_LIMIT);
        assert_eq!(ids(&out), vec![1, 5, 10, 11, 12]);
    }

    #[test]
    fn test_zero_limit() {
        assert!(filter("electronics", &catalog(), 0).is_empty());
    }

    #[test]
    fn test_empty_fields_never_match() {
        let products = vec![Product::new(1, "", ""), Product::new(2, "Lamp", "")];
        assert!(filter("anything at all", &products, DEFAULT_LIMIT).is_empty());
        assert_eq!(ids(&filter("a lamp", &products, DEFAULT_LIMIT)), vec![2]);
    }
}
