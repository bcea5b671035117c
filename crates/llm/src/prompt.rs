//! System prompt builder
//!
//! Assembles the assistant persona, tool usage examples, and advisory
//! caller context into the system prompt submitted with every session.

use serde::{Deserialize, Serialize};

/// Advisory caller context folded into the system prompt. Never enforced
/// as a hard constraint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallerContext {
    /// e.g. "prefers budget options"
    #[serde(default)]
    pub price_preference: Option<String>,
    /// Recently viewed category names
    #[serde(default)]
    pub recently_viewed: Vec<String>,
}

impl CallerContext {
    pub fn is_empty(&self) -> bool {
        self.price_preference.is_none() && self.recently_viewed.is_empty()
    }
}

/// Builds the system prompt for the tool-calling session.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    assistant_name: String,
    store_name: String,
    context: Option<CallerContext>,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new("Aisle", "our store")
    }
}

impl PromptBuilder {
    pub fn new(assistant_name: impl Into<String>, store_name: impl Into<String>) -> Self {
        Self {
            assistant_name: assistant_name.into(),
            store_name: store_name.into(),
            context: None,
        }
    }

    pub fn with_caller_context(mut self, context: CallerContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn build(&self) -> String {
        let mut prompt = format!(
            "You are {name}, a shopping assistant for {store}. You help customers find \
             catalog items that match what they ask for.\n\n\
             Use the provided tools to look up real products before answering. Never invent \
             products, prices, or ratings. When the customer names a brand, category, price \
             limit, or minimum rating, pass it to the search tool as a structured argument \
             instead of leaving it in the free-text query alone.\n\n\
             Examples:\n\
             - \"Samsung phones under 30000\" -> search(query=\"Samsung mobile phones\", \
             brand=\"Samsung\", max_price=30000)\n\
             - \"good running shoes from Puma\" -> search(query=\"running shoes\", \
             brand=\"Puma\", category=\"Running Shoes\")\n\
             - \"what categories do you have?\" -> list_categories()\n\
             - \"compare those two\" -> compare_items(item_ids=[...])\n\n\
             Keep answers short, mention at most a handful of items by name, and do not \
             repeat a tool call you have already made in this conversation.",
            name = self.assistant_name,
            store = self.store_name,
        );

        if let Some(ref context) = self.context {
            if !context.is_empty() {
                prompt.push_str("\n\nCustomer context (advisory only):");
                if let Some(ref pref) = context.price_preference {
                    prompt.push_str(&format!("\n- Price preference: {pref}"));
                }
                if !context.recently_viewed.is_empty() {
                    prompt.push_str(&format!(
                        "\n- Recently viewed categories: {}",
                        context.recently_viewed.join(", ")
                    ));
                }
            }
        }

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_persona_and_examples() {
        let prompt = PromptBuilder::new("Aisle", "Acme Mart").build();
        assert!(prompt.contains("Aisle"));
        assert!(prompt.contains("Acme Mart"));
        assert!(prompt.contains("search(query="));
    }

    #[test]
    fn test_caller_context_is_folded_in() {
        let prompt = PromptBuilder::default()
            .with_caller_context(CallerContext {
                price_preference: Some("prefers budget options".to_string()),
                recently_viewed: vec!["Sneakers".to_string(), "Smartwatches".to_string()],
            })
            .build();
        assert!(prompt.contains("prefers budget options"));
        assert!(prompt.contains("Sneakers, Smartwatches"));
    }

    #[test]
    fn test_empty_context_adds_nothing() {
        let base = PromptBuilder::default().build();
        let with_empty = PromptBuilder::default()
            .with_caller_context(CallerContext::default())
            .build();
        assert_eq!(base, with_empty);
    }
}
