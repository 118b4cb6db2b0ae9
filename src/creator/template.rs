use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::{NewIssue, RepoRef};

pub const PLACEHOLDER: &str = "{item}";

#[derive(Debug, Clone, Deserialize)]
pub struct CreatorConfig {
    pub repository: RepoRef,
    pub issue_template: IssueTemplate,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub milestone: Option<u64>,
    #[serde(default)]
    pub input_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueTemplate {
    pub title_format: String,
    pub body_template: String,
}

impl CreatorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Validation(format!("cannot read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_json(&contents)
            .map_err(|e| Error::Validation(format!("config file {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Errors are plain strings so `load` can prefix the file name.
    pub fn from_json(contents: &str) -> std::result::Result<Self, String> {
        let config: Self = serde_json::from_str(contents).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.repository.owner.trim().is_empty() || self.repository.name.trim().is_empty() {
            return Err("repository.owner and repository.name must not be empty".to_string());
        }
        // Without the placeholder every item would render the same title.
        if !self.issue_template.title_format.contains(PLACEHOLDER) {
            return Err(format!(
                "issue_template.title_format must contain the {} placeholder",
                PLACEHOLDER
            ));
        }
        if !self.issue_template.body_template.contains(PLACEHOLDER) {
            tracing::warn!(
                "issue_template.body_template has no {} placeholder; every issue gets the same body",
                PLACEHOLDER
            );
        }
        Ok(())
    }

    /// `--file` wins over the config's `input_file`.
    pub fn resolve_input_file(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        override_path
            .map(Path::to_path_buf)
            .or_else(|| self.input_file.clone())
            .ok_or_else(|| {
                Error::Validation(
                    "no input file given; pass --file or set input_file in the config".to_string(),
                )
            })
    }

    pub fn render(&self, item: &str) -> NewIssue {
        NewIssue {
            title: self.issue_template.title_format.replace(PLACEHOLDER, item),
            body: self.issue_template.body_template.replace(PLACEHOLDER, item),
            labels: self.labels.clone(),
            assignees: self.assignees.clone(),
            milestone: self.milestone,
        }
    }
}

/// One item per line, trimmed; blank lines are skipped.
pub fn parse_items(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn read_items(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        Error::Validation(format!("cannot read input file {}: {}", path.display(), e))
    })?;
    Ok(parse_items(&contents))
}
