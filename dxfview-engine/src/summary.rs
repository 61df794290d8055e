use std::collections::HashMap;

use dxfview_core::document::{Document, Entity};
use serde::Serialize;

/// 类型名为空的实体统一归入此标签。
pub const UNKNOWN_KIND: &str = "UNKNOWN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySummary {
    pub kind: String,
    pub count: usize,
}

/// 图纸元信息。每次成功加载时整体重建。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMeta {
    pub name: String,
    pub version: Option<String>,
    pub created_at: Option<String>,
    pub total_entities: usize,
    pub summaries: Vec<EntitySummary>,
}

impl DocumentMeta {
    pub fn from_document(name: impl Into<String>, document: &Document) -> Self {
        let header = document.header();
        Self {
            name: name.into(),
            version: header.version.clone(),
            created_at: header.created_at.clone(),
            total_entities: document.entity_count(),
            summaries: summarize(document.entities()),
        }
    }
}

/// 按类型统计实体数量：数量降序，数量相同时保持首次出现的顺序。
pub fn summarize<'a, I>(entities: I) -> Vec<EntitySummary>
where
    I: IntoIterator<Item = &'a Entity>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut summaries: Vec<EntitySummary> = Vec::new();
    for entity in entities {
        let kind = match entity.kind_name() {
            "" => UNKNOWN_KIND,
            name => name,
        };
        match index.get(kind) {
            Some(&slot) => summaries[slot].count += 1,
            None => {
                index.insert(kind.to_string(), summaries.len());
                summaries.push(EntitySummary {
                    kind: kind.to_string(),
                    count: 1,
                });
            }
        }
    }
    // sort_by 是稳定排序
    summaries.sort_by(|a, b| b.count.cmp(&a.count));
    summaries
}
