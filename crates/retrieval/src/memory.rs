//! In-memory catalog store
//!
//! Reference implementation of [`CatalogStore`] over a static snapshot.
//! Used by tests and local development; production deployments back the
//! same trait with the real catalog service.

use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;

use shop_assist_core::{
    CatalogItem, CatalogStore, CategoryRef, Error, NumericBounds, Result,
};

/// One node in the category taxonomy.
#[derive(Debug, Clone)]
pub struct CategoryNode {
    pub id: String,
    pub name: String,
    /// Parent category id, `None` for roots
    pub parent: Option<String>,
}

impl CategoryNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, parent: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent: parent.map(|p| p.to_string()),
        }
    }
}

/// Static in-memory catalog.
pub struct InMemoryCatalog {
    items: Vec<CatalogItem>,
    categories: Vec<CategoryNode>,
    by_id: HashMap<String, usize>,
}

impl InMemoryCatalog {
    pub fn new(items: Vec<CatalogItem>, categories: Vec<CategoryNode>) -> Self {
        let by_id = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id.clone(), i))
            .collect();
        Self {
            items,
            categories,
            by_id,
        }
    }

    /// Build a flat taxonomy from the distinct category names on the items.
    pub fn from_items(items: Vec<CatalogItem>) -> Self {
        let mut seen = HashSet::new();
        let mut categories = Vec::new();
        for item in &items {
            let key = item.category.to_lowercase();
            if seen.insert(key) {
                categories.push(CategoryNode::new(
                    slug(&item.category),
                    item.category.clone(),
                    None,
                ));
            }
        }
        Self::new(items, categories)
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    fn node(&self, id: &str) -> Option<&CategoryNode> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Names (lowercased) of a category and everything below it.
    fn descendant_names(&self, id: &str) -> HashSet<String> {
        let mut names = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(id.to_string());
        while let Some(current) = queue.pop_front() {
            if let Some(node) = self.node(&current) {
                names.insert(node.name.to_lowercase());
            }
            for child in self
                .categories
                .iter()
                .filter(|c| c.parent.as_deref() == Some(current.as_str()))
            {
                queue.push_back(child.id.clone());
            }
        }
        names
    }
}

fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// rating-desc (unrated last), then price-asc
fn rating_then_price(a: &CatalogItem, b: &CatalogItem) -> std::cmp::Ordering {
    let ra = a.rating.unwrap_or(-1.0);
    let rb = b.rating.unwrap_or(-1.0);
    rb.partial_cmp(&ra)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then_with(|| a.price.cmp(&b.price))
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn resolve_category(&self, name: &str) -> Result<Option<CategoryRef>> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(None);
        }
        // exact match first, then substring
        if let Some(node) = self
            .categories
            .iter()
            .find(|c| c.name.to_lowercase() == needle)
        {
            return Ok(Some(CategoryRef::new(&node.id, &node.name)));
        }
        Ok(self
            .categories
            .iter()
            .find(|c| c.name.to_lowercase().contains(&needle))
            .map(|node| CategoryRef::new(&node.id, &node.name)))
    }

    async fn category_descendants(&self, id: &str) -> Result<Vec<CategoryRef>> {
        let names = self.descendant_names(id);
        Ok(self
            .categories
            .iter()
            .filter(|c| names.contains(&c.name.to_lowercase()))
            .map(|c| CategoryRef::new(&c.id, &c.name))
            .collect())
    }

    async fn list_categories(&self) -> Result<Vec<CategoryRef>> {
        Ok(self
            .categories
            .iter()
            .map(|c| CategoryRef::new(&c.id, &c.name))
            .collect())
    }

    async fn browse_category(
        &self,
        category_id: &str,
        bounds: &NumericBounds,
        limit: usize,
    ) -> Result<Vec<CatalogItem>> {
        if self.node(category_id).is_none() {
            return Err(Error::Catalog(format!(
                "unknown category id: {category_id}"
            )));
        }
        let names = self.descendant_names(category_id);
        let mut items: Vec<CatalogItem> = self
            .items
            .iter()
            .filter(|i| names.contains(&i.category.to_lowercase()))
            .filter(|i| bounds.matches(i))
            .cloned()
            .collect();
        items.sort_by(rating_then_price);
        items.truncate(limit);
        Ok(items)
    }

    async fn browse_brand(
        &self,
        brand: &str,
        bounds: &NumericBounds,
        limit: usize,
    ) -> Result<Vec<CatalogItem>> {
        let mut items: Vec<CatalogItem> = self
            .items
            .iter()
            .filter(|i| i.brand_matches(brand))
            .filter(|i| bounds.matches(i))
            .cloned()
            .collect();
        // price ascending so budget items come first
        items.sort_by(|a, b| a.price.cmp(&b.price));
        items.truncate(limit);
        Ok(items)
    }

    async fn featured(&self, limit: usize) -> Result<Vec<CatalogItem>> {
        let mut items: Vec<CatalogItem> = self
            .items
            .iter()
            .filter(|i| i.in_stock)
            .cloned()
            .collect();
        items.sort_by(rating_then_price);
        items.truncate(limit);
        Ok(items)
    }

    async fn get_items(&self, ids: &[String]) -> Result<Vec<CatalogItem>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.by_id.get(id).map(|&i| self.items[i].clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn item(id: &str, name: &str, brand: &str, category: &str, price: i64, rating: f32) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: name.to_string(),
            brand: Some(brand.to_string()),
            category: category.to_string(),
            price: Decimal::from(price),
            rating: Some(rating),
            description: String::new(),
            thumbnail: None,
            in_stock: true,
        }
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(
            vec![
                item("1", "Velocity Runner", "Puma", "Running Shoes", 4_000, 4.2),
                item("2", "Court Classic", "Puma", "Sneakers", 3_000, 4.5),
                item("3", "Street Low", "Nike", "Sneakers", 5_000, 4.0),
            ],
            vec![
                CategoryNode::new("footwear", "Footwear", None),
                CategoryNode::new("running-shoes", "Running Shoes", Some("footwear")),
                CategoryNode::new("sneakers", "Sneakers", Some("footwear")),
            ],
        )
    }

    #[tokio::test]
    async fn test_resolve_exact_then_substring() {
        let catalog = catalog();
        let exact = catalog.resolve_category("running shoes").await.unwrap();
        assert_eq!(exact.unwrap().id, "running-shoes");

        let partial = catalog.resolve_category("sneak").await.unwrap();
        assert_eq!(partial.unwrap().id, "sneakers");

        assert!(catalog.resolve_category("yachts").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_descendants_include_self_and_children() {
        let catalog = catalog();
        let refs = catalog.category_descendants("footwear").await.unwrap();
        let names: Vec<&str> = refs.iter().map(|r| r.name.as_str()).collect();
        assert!(names.contains(&"Footwear"));
        assert!(names.contains(&"Running Shoes"));
        assert!(names.contains(&"Sneakers"));
    }

    #[tokio::test]
    async fn test_brand_browse_price_ascending() {
        let catalog = catalog();
        let items = catalog
            .browse_brand("puma", &NumericBounds::default(), 10)
            .await
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "2"); // cheaper first
        assert_eq!(items[1].id, "1");
    }

    #[tokio::test]
    async fn test_brand_browse_pushes_bounds_into_query() {
        let catalog = catalog();
        let bounds = NumericBounds {
            max_price: Some(Decimal::from(3_500)),
            ..Default::default()
        };
        let items = catalog.browse_brand("Puma", &bounds, 10).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "2");
    }

    #[tokio::test]
    async fn test_category_browse_rating_ordering() {
        let catalog = catalog();
        let items = catalog
            .browse_category("sneakers", &NumericBounds::default(), 10)
            .await
            .unwrap();
        assert_eq!(items[0].id, "2"); // 4.5 ahead of 4.0
    }

    #[tokio::test]
    async fn test_get_items_preserves_order_and_skips_unknown() {
        let catalog = catalog();
        let items = catalog
            .get_items(&["3".to_string(), "nope".to_string(), "1".to_string()])
            .await
            .unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1"]);
    }
}
