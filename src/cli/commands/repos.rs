//! Implementation of the `issue-finder repos` command.

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{list_table, output, CommandOutput};
use crate::domain::models::{Config, TargetRepository};
use crate::infrastructure::config::ConfigLoader;

#[derive(Debug, Serialize)]
pub struct RepoListOutput {
    pub repositories: Vec<TargetRepository>,
}

impl CommandOutput for RepoListOutput {
    fn to_human(&self) -> String {
        if self.repositories.is_empty() {
            return "No repositories configured.".to_string();
        }
        let mut table = list_table(&["owner", "name"]);
        for repo in &self.repositories {
            table.add_row(vec![repo.owner(), repo.name()]);
        }
        format!("{} repositories:\n{}", self.repositories.len(), table)
    }
}

pub fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let registry = ConfigLoader::registry(config)?;
    let result = RepoListOutput {
        repositories: registry.iter().cloned().collect(),
    };
    output(&result, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_list_json_uses_full_names() {
        let output = RepoListOutput {
            repositories: vec!["rust-lang/rust".parse().unwrap()],
        };
        assert_eq!(
            output.to_json(),
            serde_json::json!({"repositories": ["rust-lang/rust"]})
        );
        assert!(output.to_human().contains("rust-lang"));
    }

    #[test]
    fn test_execute_lists_default_registry_without_a_runtime() {
        assert!(execute(&Config::default(), true).is_ok());

        let mut broken = Config::default();
        broken.repositories = vec!["not-a-repo".to_string()];
        assert!(execute(&broken, false).is_err());
    }
}
