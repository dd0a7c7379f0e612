//! 段位课程大纲
//!
//! 大纲以 TOML 形式描述，内置一份默认大纲，也可以通过 `SYLLABUS_FILE` 替换。

use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError};

const BUILTIN_SYLLABUS: &str = include_str!("../../assets/syllabus.toml");

/// 课程大纲
#[derive(Debug, Clone, Deserialize)]
pub struct Syllabus {
    #[serde(rename = "belt", default)]
    pub belts: Vec<Belt>,
}

/// 段位
#[derive(Debug, Clone, Deserialize)]
pub struct Belt {
    pub name: String,
    #[serde(rename = "category", default)]
    pub categories: Vec<Category>,
}

/// 段位下的知识分类
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub concepts: Vec<String>,
}

impl Syllabus {
    /// 内置大纲
    pub fn builtin() -> AppResult<Self> {
        Self::parse(BUILTIN_SYLLABUS, "builtin")
    }

    /// 从 TOML 文件加载大纲
    pub async fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        Self::parse(&content, &path.display().to_string())
    }

    /// 按配置加载：指定了文件就读文件，否则用内置大纲
    pub async fn from_config(syllabus_file: Option<&str>) -> AppResult<Self> {
        match syllabus_file {
            Some(path) => Self::load(path).await,
            None => Self::builtin(),
        }
    }

    pub fn parse(content: &str, origin: &str) -> AppResult<Self> {
        let syllabus: Syllabus =
            toml::from_str(content).map_err(|source| ConfigError::SyllabusParseFailed {
                origin: origin.to_string(),
                source,
            })?;
        if syllabus.belts.is_empty() {
            return Err(ConfigError::EmptySyllabus(origin.to_string()).into());
        }
        Ok(syllabus)
    }

    pub fn belt(&self, name: &str) -> Option<&Belt> {
        self.belts.iter().find(|b| b.name == name)
    }

    /// 段位名称（保持大纲顺序）
    pub fn belt_names(&self) -> Vec<String> {
        self.belts.iter().map(|b| b.name.clone()).collect()
    }
}

impl Belt {
    /// 该段位的全部知识点，按大纲顺序去重
    pub fn concepts(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for concept in self.categories.iter().flat_map(|c| c.concepts.iter()) {
            if !seen.contains(concept) {
                seen.push(concept.clone());
            }
        }
        seen
    }
}

/// 段位在仓库中的目录名
pub fn belt_dir_name(belt: &str) -> String {
    belt.replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_syllabus_has_seven_belts() {
        let syllabus = Syllabus::builtin().unwrap();
        assert_eq!(syllabus.belts.len(), 7);
        assert_eq!(syllabus.belt_names()[0], "White Belt");
        assert_eq!(syllabus.belt_names()[6], "Purple Belt");

        let white = syllabus.belt("White Belt").unwrap();
        let concepts = white.concepts();
        assert_eq!(concepts[0], "Input/Output");
        assert!(concepts.contains(&"GCD/LCM".to_string()));
    }

    #[test]
    fn concepts_are_deduplicated_in_order() {
        let syllabus = Syllabus::parse(
            r#"
            [[belt]]
            name = "Test Belt"
            [[belt.category]]
            name = "A"
            concepts = ["x", "y"]
            [[belt.category]]
            name = "B"
            concepts = ["y", "z"]
            "#,
            "inline",
        )
        .unwrap();
        assert_eq!(syllabus.belt("Test Belt").unwrap().concepts(), vec!["x", "y", "z"]);
        assert!(syllabus.belt("Other").is_none());
    }

    #[test]
    fn empty_or_broken_syllabus_is_rejected() {
        assert!(Syllabus::parse("", "empty").is_err());
        assert!(Syllabus::parse("[[belt]]\nname = 3", "broken").is_err());
    }

    #[test]
    fn custom_syllabus_file_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("syllabus.toml");
        std::fs::write(
            &path,
            "[[belt]]\nname = \"Night Belt\"\n[[belt.category]]\nname = \"Graphs\"\nconcepts = [\"Dijkstra\"]\n",
        )
        .unwrap();

        let syllabus =
            tokio_test::block_on(Syllabus::from_config(path.to_str())).unwrap();
        assert_eq!(syllabus.belt_names(), vec!["Night Belt"]);

        let missing = dir.path().join("missing.toml");
        assert!(tokio_test::block_on(Syllabus::load(&missing)).is_err());
        assert_eq!(
            tokio_test::block_on(Syllabus::from_config(None)).unwrap().belts.len(),
            7
        );
    }

    #[test]
    fn dir_names_replace_spaces() {
        assert_eq!(belt_dir_name("White Belt"), "White-Belt");
    }
}
