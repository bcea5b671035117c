//! Keyword search using Tantivy (BM25)
//!
//! Full-text index over item name, description, brand, and category.
//! Search returns catalog items in the index's relevance order, with
//! numeric bounds applied before truncation so a constrained query never
//! surfaces out-of-bounds items.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tantivy::{
    collector::TopDocs,
    query::QueryParser,
    schema::{Field, OwnedValue, Schema, STORED, STRING, TEXT},
    Index, IndexReader, IndexWriter, TantivyDocument,
};

use shop_assist_core::{CatalogItem, CatalogStore, Error, KeywordIndex, NumericBounds, Result};

use crate::RetrievalError;

/// Extra hits fetched before bounds filtering cuts the list down.
const OVERFETCH_FACTOR: usize = 4;

/// Tantivy-backed keyword index.
pub struct TantivyKeywordIndex {
    index: Index,
    reader: IndexReader,
    writer: RwLock<Option<IndexWriter>>,
    id_field: Field,
    name_field: Field,
    description_field: Field,
    brand_field: Field,
    category_field: Field,
    catalog: Arc<dyn CatalogStore>,
}

impl TantivyKeywordIndex {
    /// Create an in-RAM index over the given catalog.
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Result<Self> {
        let mut schema_builder = Schema::builder();
        let id_field = schema_builder.add_text_field("id", STRING | STORED);
        let name_field = schema_builder.add_text_field("name", TEXT);
        let description_field = schema_builder.add_text_field("description", TEXT);
        let brand_field = schema_builder.add_text_field("brand", TEXT);
        let category_field = schema_builder.add_text_field("category", TEXT);
        let schema = schema_builder.build();

        let index = Index::create_in_ram(schema);
        let reader = index
            .reader()
            .map_err(|e| Error::from(RetrievalError::KeywordIndex(e.to_string())))?;
        let writer = index
            .writer(50_000_000)
            .map_err(|e| Error::from(RetrievalError::KeywordIndex(e.to_string())))?;

        Ok(Self {
            index,
            reader,
            writer: RwLock::new(Some(writer)),
            id_field,
            name_field,
            description_field,
            brand_field,
            category_field,
            catalog,
        })
    }

    /// Index a batch of items.
    pub fn index_items(&self, items: &[CatalogItem]) -> Result<()> {
        {
            let mut writer = self.writer.write();
            let writer = writer
                .as_mut()
                .ok_or_else(|| Error::from(RetrievalError::KeywordIndex("writer not available".to_string())))?;

            for item in items {
                let mut doc = TantivyDocument::default();
                doc.add_text(self.id_field, &item.id);
                doc.add_text(self.name_field, &item.name);
                doc.add_text(self.description_field, &item.description);
                if let Some(ref brand) = item.brand {
                    doc.add_text(self.brand_field, brand);
                }
                doc.add_text(self.category_field, &item.category);
                writer
                    .add_document(doc)
                    .map_err(|e| Error::from(RetrievalError::KeywordIndex(e.to_string())))?;
            }

            writer
                .commit()
                .map_err(|e| Error::from(RetrievalError::KeywordIndex(e.to_string())))?;
        }

        self.reader
            .reload()
            .map_err(|e| Error::from(RetrievalError::KeywordIndex(e.to_string())))?;

        Ok(())
    }

    pub fn doc_count(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Strip query-parser syntax so free text never fails to parse.
    /// Lowercased so bare AND/OR/NOT tokens lose their operator meaning.
    fn sanitize(query: &str) -> String {
        query
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn search_ids(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let searcher = self.reader.searcher();
        let query_parser = QueryParser::for_index(
            &self.index,
            vec![
                self.name_field,
                self.description_field,
                self.brand_field,
                self.category_field,
            ],
        );

        let parsed = query_parser
            .parse_query(query)
            .map_err(|e| Error::from(RetrievalError::KeywordIndex(e.to_string())))?;

        let top_docs = searcher
            .search(&parsed, &TopDocs::with_limit(limit))
            .map_err(|e| Error::from(RetrievalError::KeywordIndex(e.to_string())))?;

        let mut ids = Vec::with_capacity(top_docs.len());
        for (_score, address) in top_docs {
            let doc: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| Error::from(RetrievalError::KeywordIndex(e.to_string())))?;
            if let Some(OwnedValue::Str(id)) = doc.get_first(self.id_field) {
                ids.push(id.clone());
            }
        }
        Ok(ids)
    }
}

#[async_trait]
impl KeywordIndex for TantivyKeywordIndex {
    async fn search(
        &self,
        query: &str,
        bounds: &NumericBounds,
        limit: usize,
    ) -> Result<Vec<CatalogItem>> {
        let sanitized = Self::sanitize(query);
        if sanitized.is_empty() {
            return Ok(Vec::new());
        }

        let ids = self.search_ids(&sanitized, limit * OVERFETCH_FACTOR)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let items = self.catalog.get_items(&ids).await?;
        Ok(items
            .into_iter()
            .filter(|item| bounds.matches(item))
            .take(limit)
            .collect())
    }
}
