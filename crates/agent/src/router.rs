//! Tool router
//!
//! Dispatches a parsed [`ToolInvocation`] to the retrieval pipeline or to
//! a simple catalog lookup, and renders the structured result the model
//! receives. Exhaustive over the tool union: adding a tool without
//! routing it is a compile error.

use std::sync::Arc;

use serde_json::{json, Value};

use shop_assist_core::{CatalogItem, CatalogStore};
use shop_assist_retrieval::RetrievalPipeline;
use shop_assist_tools::{ToolError, ToolInvocation};

/// Result of one tool dispatch: the payload for the model plus the items
/// to fold into the session's accumulated list.
#[derive(Debug)]
pub struct ToolOutcome {
    pub payload: Value,
    pub items: Vec<CatalogItem>,
}

impl ToolOutcome {
    fn with_items(payload: Value, items: Vec<CatalogItem>) -> Self {
        Self { payload, items }
    }

    fn payload_only(payload: Value) -> Self {
        Self {
            payload,
            items: Vec::new(),
        }
    }
}

/// Routes tool invocations to their executors.
pub struct ToolRouter {
    pipeline: Arc<RetrievalPipeline>,
    catalog: Arc<dyn CatalogStore>,
}

impl ToolRouter {
    pub fn new(pipeline: Arc<RetrievalPipeline>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self { pipeline, catalog }
    }

    pub async fn dispatch(&self, invocation: &ToolInvocation) -> Result<ToolOutcome, ToolError> {
        match invocation {
            ToolInvocation::Search(args) => {
                let constraints = args.to_constraints();
                let items = self.pipeline.search(&constraints).await;
                let payload = json!({
                    "items": items.iter().map(item_summary).collect::<Vec<_>>(),
                    "count": items.len(),
                });
                Ok(ToolOutcome::with_items(payload, items))
            }

            ToolInvocation::GetItemDetail(args) => {
                let items = self
                    .catalog
                    .get_items(std::slice::from_ref(&args.item_id))
                    .await
                    .map_err(|e| ToolError::Execution(e.to_string()))?;
                match items.into_iter().next() {
                    Some(item) => {
                        let payload = json!({ "found": true, "item": item_detail(&item) });
                        Ok(ToolOutcome::with_items(payload, vec![item]))
                    }
                    None => Ok(ToolOutcome::payload_only(json!({
                        "found": false,
                        "item_id": args.item_id,
                    }))),
                }
            }

            ToolInvocation::ListCategories => {
                let categories = self
                    .catalog
                    .list_categories()
                    .await
                    .map_err(|e| ToolError::Execution(e.to_string()))?;
                let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
                Ok(ToolOutcome::payload_only(json!({ "categories": names })))
            }

            ToolInvocation::GetFeatured(args) => {
                let items = self
                    .catalog
                    .featured(args.effective_limit())
                    .await
                    .map_err(|e| ToolError::Execution(e.to_string()))?;
                let payload = json!({
                    "items": items.iter().map(item_summary).collect::<Vec<_>>(),
                    "count": items.len(),
                });
                Ok(ToolOutcome::with_items(payload, items))
            }

            ToolInvocation::CompareItems(args) => {
                let items = self
                    .catalog
                    .get_items(&args.item_ids)
                    .await
                    .map_err(|e| ToolError::Execution(e.to_string()))?;
                let found: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
                let missing: Vec<&str> = args
                    .item_ids
                    .iter()
                    .map(|id| id.as_str())
                    .filter(|id| !found.contains(id))
                    .collect();
                let payload = json!({
                    "comparison": items.iter().map(item_detail).collect::<Vec<_>>(),
                    "missing": missing,
                });
                Ok(ToolOutcome::with_items(payload, items))
            }

            ToolInvocation::GetItemsByBrand(args) => {
                let constraints = args.to_constraints();
                let mut items = self.pipeline.search(&constraints).await;
                items.truncate(args.effective_limit());
                let payload = json!({
                    "brand": args.brand,
                    "items": items.iter().map(item_summary).collect::<Vec<_>>(),
                    "count": items.len(),
                });
                Ok(ToolOutcome::with_items(payload, items))
            }
        }
    }
}

/// Compact rendering for result lists.
fn item_summary(item: &CatalogItem) -> Value {
    json!({
        "id": item.id,
        "name": item.name,
        "brand": item.brand,
        "category": item.category,
        "price": item.price,
        "rating": item.rating,
        "in_stock": item.in_stock,
    })
}

/// Full rendering for detail and comparison views.
fn item_detail(item: &CatalogItem) -> Value {
    json!({
        "id": item.id,
        "name": item.name,
        "brand": item.brand,
        "category": item.category,
        "price": item.price,
        "rating": item.rating,
        "description": item.description,
        "thumbnail": item.thumbnail,
        "in_stock": item.in_stock,
    })
}
