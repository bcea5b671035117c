//! Declared tool schemas
//!
//! The fixed, versioned tool set submitted with every model turn. Keep
//! these in sync with the argument structs in `invocation`: the structs
//! are what actually parses.

use serde_json::json;

use shop_assist_core::ToolDefinition;

/// All declared tools, in a stable order.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "search".to_string(),
            description: "Search the catalog for items matching free text and optional \
                          structured constraints (category, brand, price bounds, minimum \
                          rating). Returns a ranked list of items."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Free-text intent, e.g. 'lightweight running shoes'" },
                    "category": { "type": "string", "description": "Category name, e.g. 'Running Shoes'" },
                    "brand": { "type": "string", "description": "Brand name, e.g. 'Puma'" },
                    "min_price": { "type": "number", "minimum": 0 },
                    "max_price": { "type": "number", "minimum": 0 },
                    "min_rating": { "type": "number", "minimum": 0, "maximum": 5 }
                }
            }),
        },
        ToolDefinition {
            name: "get_item_detail".to_string(),
            description: "Fetch one catalog item by its identifier, including description, \
                          rating, and stock."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "item_id": { "type": "string" }
                },
                "required": ["item_id"]
            }),
        },
        ToolDefinition {
            name: "list_categories".to_string(),
            description: "List the catalog's category names.".to_string(),
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        ToolDefinition {
            name: "get_featured".to_string(),
            description: "Highest-rated in-stock items, for open-ended requests with no \
                          concrete constraints."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "limit": { "type": "integer", "minimum": 1, "maximum": 20 }
                }
            }),
        },
        ToolDefinition {
            name: "compare_items".to_string(),
            description: "Side-by-side comparison of 2 to 5 items by identifier (price, \
                          rating, category, stock)."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "item_ids": {
                        "type": "array",
                        "items": { "type": "string" },
                        "minItems": 2,
                        "maxItems": 5
                    }
                },
                "required": ["item_ids"]
            }),
        },
        ToolDefinition {
            name: "get_items_by_brand".to_string(),
            description: "Browse items of one brand, cheapest first, with optional price \
                          and rating bounds."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "brand": { "type": "string" },
                    "min_price": { "type": "number", "minimum": 0 },
                    "max_price": { "type": "number", "minimum": 0 },
                    "min_rating": { "type": "number", "minimum": 0, "maximum": 5 },
                    "limit": { "type": "integer", "minimum": 1, "maximum": 50 }
                },
                "required": ["brand"]
            }),
        },
    ]
}
