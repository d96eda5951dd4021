//! `smartcart` binary end to end, with completions disabled.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const CATALOG: &str = r#"{
  "products": [
    {"id": 1, "name": "MacBook Pro", "category": "Electronics", "brand": "Apple",
     "price": 2499.99, "stock_quantity": 10,
     "description": "High-performance laptop for professionals",
     "created_at": "2024-01-01T10:00:00Z"},
    {"id": 2, "name": "iPhone 15", "category": "Electronics", "brand": "Apple",
     "price": 999.99, "stock_quantity": 25,
     "description": "Latest smartphone with advanced camera",
     "created_at": "2024-01-02T10:00:00Z"},
    {"id": 3, "name": "Spring Boot in Action", "category": "Books", "brand": "Manning",
     "price": 49.99, "stock_quantity": 50,
     "description": "Comprehensive guide to Spring Boot development",
     "created_at": "2024-01-03T10:00:00Z"}
  ],
  "customers": [
    {"id": 1, "email": "john.doe@example.com", "first_name": "John", "last_name": "Doe",
     "preferences": ["Electronics"], "purchase_history": [1, 2]}
  ]
}"#;

fn setup_test_env(provider: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    fs::write(root.join("catalog.json"), CATALOG).unwrap();

    let config_content = format!(
        r#"[catalog]
path = "catalog.json"

[completion]
provider = "{}"
"#,
        provider
    );
    let config_path = root.join("smartcart.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_smartcart(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_smartcart"))
        .arg("--config")
        .arg(config_path)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run smartcart binary");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_search_deterministic_match() {
    let (_tmp, config) = setup_test_env("disabled");
    let (stdout, stderr, ok) = run_smartcart(&config, &["search", "iphone", "--explain"]);
    assert!(ok, "search failed: {}", stderr);
    assert!(stdout.contains("tier=deterministic"), "{}", stdout);
    assert!(stdout.contains("iPhone 15"));
    assert!(!stdout.contains("MacBook Pro"));
}

#[test]
fn test_search_without_completion_degrades_to_no_results() {
    let (_tmp, config) = setup_test_env("disabled");
    let (stdout, stderr, ok) = run_smartcart(&config, &["search", "gardening", "--explain"]);
    assert!(ok, "search failed: {}", stderr);
    assert!(stdout.contains("tier=semantic"), "{}", stdout);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_search_empty_query_lists_everything() {
    let (_tmp, config) = setup_test_env("disabled");
    let (stdout, _, ok) = run_smartcart(&config, &["search", ""]);
    assert!(ok);
    assert!(stdout.contains("MacBook Pro"));
    assert!(stdout.contains("iPhone 15"));
    assert!(stdout.contains("Spring Boot in Action"));
}

#[test]
fn test_recommend_unknown_customer_fails() {
    let (_tmp, config) = setup_test_env("disabled");
    let (_, stderr, ok) = run_smartcart(&config, &["recommend", "99"]);
    assert!(!ok);
    assert!(stderr.contains("customer not found: 99"), "{}", stderr);
}

#[test]
fn test_recommend_without_completion_is_empty() {
    let (_tmp, config) = setup_test_env("disabled");
    let (stdout, stderr, ok) = run_smartcart(&config, &["recommend", "1"]);
    assert!(ok, "recommend failed: {}", stderr);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_describe_without_completion_fails() {
    let (_tmp, config) = setup_test_env("disabled");
    let (_, stderr, ok) = run_smartcart(&config, &["describe", "2"]);
    assert!(!ok);
    assert!(stderr.contains("unavailable"), "{}", stderr);
}

#[test]
fn test_products_filters() {
    let (_tmp, config) = setup_test_env("disabled");

    let (stdout, _, ok) = run_smartcart(&config, &["products", "--category", "Books"]);
    assert!(ok);
    assert!(stdout.contains("Spring Boot in Action"));
    assert!(!stdout.contains("iPhone 15"));

    let (stdout, _, ok) = run_smartcart(&config, &["products", "--recent", "1"]);
    assert!(ok);
    assert!(stdout.contains("Spring Boot in Action"));
    assert!(!stdout.contains("MacBook Pro"));
}

#[test]
fn test_customers_listing() {
    let (_tmp, config) = setup_test_env("disabled");
    let (stdout, _, ok) = run_smartcart(&config, &["customers"]);
    assert!(ok);
    assert!(stdout.contains("John Doe"));
    assert!(stdout.contains("john.doe@example.com"));
}

#[test]
fn test_unknown_provider_is_rejected() {
    let (_tmp, config) = setup_test_env("mystery");
    let (_, stderr, ok) = run_smartcart(&config, &["products"]);
    assert!(!ok);
    assert!(stderr.contains("Unknown completion provider"), "{}", stderr);
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, ok) = run_smartcart(&tmp.path().join("nope.toml"), &["products"]);
    assert!(!ok);
    assert!(stderr.contains("Failed to read config file"), "{}", stderr);
}
