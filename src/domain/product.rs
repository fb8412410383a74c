use serde::{Deserialize, Serialize};

/// A single product attribute as shown on a search card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristic {
    pub name: String,
    pub value: String,
}

impl Characteristic {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Product basic information from search-result listing pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub price: Option<String>,
    #[serde(default)]
    pub characteristics: Vec<Characteristic>,
}

impl Product {
    /// Create a product with only a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            price: None,
            characteristics: Vec::new(),
        }
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    pub fn with_characteristics(mut self, characteristics: Vec<Characteristic>) -> Self {
        self.characteristics = characteristics;
        self
    }

    /// Look up a characteristic value by its name
    pub fn characteristic(&self, name: &str) -> Option<&str> {
        self.characteristics
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }
}

/// Response of one search query
///
/// Products keep discovery order: page order first, then document order
/// within each page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub products: Vec<Product>,
}

/// Raw inbound search parameters, validated by the search service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "SearchRequest::default_limit")]
    pub limit: i64,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, limit: i64) -> Self {
        Self {
            query: query.into(),
            limit,
        }
    }

    const fn default_limit() -> i64 {
        crate::infrastructure::config::defaults::DEFAULT_LIMIT as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_serializes_missing_price_as_null() {
        let product = Product::new("Чайник").with_characteristics(vec![
            Characteristic::new("Объём", "1.7 л"),
        ]);

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["title"], "Чайник");
        assert!(json["price"].is_null());
        assert_eq!(json["characteristics"][0]["name"], "Объём");
        assert_eq!(json["characteristics"][0]["value"], "1.7 л");
    }

    #[test]
    fn test_characteristic_lookup() {
        let product = Product::new("Phone")
            .with_price("1999 RUR")
            .with_characteristics(vec![Characteristic::new("Цвет", "Красный")]);

        assert_eq!(product.characteristic("Цвет"), Some("Красный"));
        assert_eq!(product.characteristic("Вес"), None);
    }

    #[test]
    fn test_search_request_default_limit() {
        let request: SearchRequest = serde_json::from_str(r#"{"query": "iphone"}"#).unwrap();
        assert_eq!(request.limit, 5);
    }
}
