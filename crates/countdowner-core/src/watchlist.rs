//! Watchlist files: who to notify and which stock codes to track.
//!
//! A watchlist is a YAML mapping whose `products` value is an embedded CSV
//! block:
//!
//! ```yaml
//! name: Hello
//! email_address: a@b.com
//! products: |
//!   description,stock_code
//!   chips sis,267945
//!   bagels bro,285453
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::ConfigError;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+").expect("valid email regex"));

const REQUIRED_PRODUCT_COLUMNS: [&str; 2] = ["description", "stock_code"];

/// Raw YAML shape. Every key is optional here so that missing keys surface as
/// validation errors with a readable message rather than serde errors.
#[derive(Debug, Deserialize)]
struct WatchlistFile {
    name: Option<String>,
    email_address: Option<String>,
    products: Option<String>,
}

/// One product row of the watchlist's embedded CSV.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WatchedProduct {
    pub description: String,
    /// Kept as a string so leading zeros survive.
    pub stock_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watchlist {
    pub name: String,
    pub email_address: String,
    pub products: Vec<WatchedProduct>,
}

impl Watchlist {
    /// Stock codes in file order.
    #[must_use]
    pub fn stock_codes(&self) -> Vec<String> {
        self.products.iter().map(|p| p.stock_code.clone()).collect()
    }
}

/// Returns `true` if `address` looks like `local@domain.tld`.
#[must_use]
pub fn is_valid_email(address: &str) -> bool {
    EMAIL_PATTERN.is_match(address)
}

/// Read, parse, and validate the watchlist YAML file at `path`.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_watchlist(path: &Path) -> Result<Watchlist, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::WatchlistIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_watchlist(&content)
}

/// Parse and validate a watchlist from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML or embedded CSV is malformed, or the
/// watchlist fails validation.
pub fn parse_watchlist(yaml: &str) -> Result<Watchlist, ConfigError> {
    let raw: WatchlistFile = serde_yaml::from_str(yaml)?;

    let name = raw
        .name
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ConfigError::Validation("name must be a nonempty string".to_string()))?;

    let email_address = raw
        .email_address
        .map(|e| e.trim().to_owned())
        .filter(|e| is_valid_email(e))
        .ok_or_else(|| ConfigError::Validation("invalid email address".to_string()))?;

    let products_csv = raw
        .products
        .ok_or_else(|| ConfigError::Validation("products must be given".to_string()))?;
    let products = parse_products(&products_csv)?;

    Ok(Watchlist {
        name,
        email_address,
        products,
    })
}

fn parse_products(csv_text: &str) -> Result<Vec<WatchedProduct>, ConfigError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(csv_text.as_bytes());

    let headers: HashSet<String> = reader.headers()?.iter().map(str::to_owned).collect();
    if REQUIRED_PRODUCT_COLUMNS
        .iter()
        .any(|col| !headers.contains(*col))
    {
        return Err(ConfigError::Validation(
            r#"products must have "description" and "stock_code" fields"#.to_string(),
        ));
    }

    let mut products = Vec::new();
    for (idx, row) in reader.deserialize::<WatchedProduct>().enumerate() {
        let product = row?;
        if product.stock_code.is_empty() {
            return Err(ConfigError::Validation(format!(
                "product row {} has an empty stock_code",
                idx + 1
            )));
        }
        products.push(product);
    }

    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r"
name: Hello
email_address: a@b.com
products: |
  description,stock_code
  chips sis,267945
  bagels bro,085453
";

    #[test]
    fn parses_valid_watchlist() {
        let w = parse_watchlist(VALID).unwrap();
        assert_eq!(w.name, "Hello");
        assert_eq!(w.email_address, "a@b.com");
        assert_eq!(w.products.len(), 2);
        assert_eq!(w.products[0].description, "chips sis");
        assert_eq!(w.stock_codes(), vec!["267945", "085453"]);
    }

    #[test]
    fn extra_product_columns_are_ignored() {
        let yaml = r"
name: Hello
email_address: a@b.com
products: |
  description,stock_code,notes
  milk,123,blue top
";
        let w = parse_watchlist(yaml).unwrap();
        assert_eq!(w.stock_codes(), vec!["123"]);
    }

    #[test]
    fn missing_name_is_rejected() {
        let yaml = "email_address: a@b.com\nproducts: |\n  description,stock_code\n  a,1\n";
        let err = parse_watchlist(yaml).unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(ref m) if m.contains("name")),
            "got: {err:?}"
        );
    }

    #[test]
    fn invalid_email_is_rejected() {
        let yaml = "name: x\nemail_address: nobody\nproducts: |\n  description,stock_code\n  a,1\n";
        let err = parse_watchlist(yaml).unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(ref m) if m.contains("email")),
            "got: {err:?}"
        );
    }

    #[test]
    fn missing_products_is_rejected() {
        let err = parse_watchlist("name: x\nemail_address: a@b.com\n").unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(ref m) if m.contains("products")),
            "got: {err:?}"
        );
    }

    #[test]
    fn products_without_stock_code_column_are_rejected() {
        let yaml = "name: x\nemail_address: a@b.com\nproducts: |\n  description,code\n  a,1\n";
        let err = parse_watchlist(yaml).unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(ref m) if m.contains("stock_code")),
            "got: {err:?}"
        );
    }

    #[test]
    fn empty_stock_code_is_rejected() {
        let yaml = "name: x\nemail_address: a@b.com\nproducts: |\n  description,stock_code\n  a,\n";
        let err = parse_watchlist(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)), "got: {err:?}");
    }

    #[test]
    fn header_only_products_is_an_empty_list() {
        let yaml = "name: x\nemail_address: a@b.com\nproducts: |\n  description,stock_code\n";
        let w = parse_watchlist(yaml).unwrap();
        assert!(w.products.is_empty());
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = parse_watchlist("name: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::WatchlistParse(_)), "got: {err:?}");
    }

    #[test]
    fn load_watchlist_reports_missing_file() {
        let err = load_watchlist(Path::new("/nonexistent/watchlist.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::WatchlistIo { .. }), "got: {err:?}");
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@mail.example.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email(""));
    }
}
