use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 单个段位已使用过的知识点和标题
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeltHistory {
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub titles: Vec<String>,
}

/// 生成历史，按段位名索引
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationHistory {
    pub belts: BTreeMap<String, BeltHistory>,
}

impl GenerationHistory {
    pub fn belt(&self, belt: &str) -> BeltHistory {
        self.belts.get(belt).cloned().unwrap_or_default()
    }

    pub fn record(&mut self, belt: &str, topic: &str, title: &str) {
        let entry = self.belts.entry(belt.to_string()).or_default();
        entry.topics.push(topic.to_string());
        entry.titles.push(title.to_string());
    }

    /// 清空某段位的已用知识点（标题保留）
    pub fn reset_topics(&mut self, belt: &str) {
        self.belts.entry(belt.to_string()).or_default().topics.clear();
    }
}
