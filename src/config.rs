use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

pub const DEFAULT_LABEL_COLOR: &str = "#0075ca";

/// Plugin configuration: one item per group of repositories.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginConfig {
    #[serde(default)]
    pub config_items: Vec<BotConfig>,
}

impl PluginConfig {
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> AppResult<Self> {
        let config: PluginConfig = serde_yaml::from_str(contents)
            .map_err(|err| AppError::Configuration(format!("invalid config file: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        self.config_items.iter().try_for_each(BotConfig::validate)
    }

    /// The item covering `org/repo`. An exact repository entry wins over an
    /// organization entry; excluded repositories never match.
    pub fn config_for(&self, org: &str, repo: &str) -> Option<&BotConfig> {
        let full_name = format!("{org}/{repo}");
        let eligible: Vec<&BotConfig> = self
            .config_items
            .iter()
            .filter(|item| !item.excluded_repos.contains(&full_name))
            .collect();

        eligible
            .iter()
            .find(|item| item.repos.contains(&full_name))
            .or_else(|| eligible.iter().find(|item| item.repos.iter().any(|r| r == org)))
            .copied()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Entries are either `org` or `org/repo`.
    #[serde(default)]
    pub repos: Vec<String>,
    #[serde(default)]
    pub excluded_repos: Vec<String>,

    pub community_name: String,
    /// Link to the document describing the bot's commands.
    pub command_link: String,
    /// Location of the sig membership document, as `org/repo/branch:path`.
    pub sig_file_path: String,

    #[serde(default)]
    pub check_obs_meta_origin_file: bool,
    #[serde(default)]
    pub obs_meta_origin_file: String,
    #[serde(default)]
    pub guide_url: String,
    #[serde(default)]
    pub obs_meta_config: ObsMetaConfig,

    #[serde(default = "default_label_color")]
    pub label_color: String,
}

fn default_label_color() -> String {
    DEFAULT_LABEL_COLOR.to_string()
}

impl BotConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.repos.is_empty() {
            return Err(AppError::Configuration(
                "the repos configuration can not be empty".to_string(),
            ));
        }
        if self.community_name.trim().is_empty() {
            return Err(AppError::Configuration(
                "the community_name configuration can not be empty".to_string(),
            ));
        }
        if self.command_link.trim().is_empty() {
            return Err(AppError::Configuration(
                "the command_link configuration can not be empty".to_string(),
            ));
        }

        if self.check_obs_meta_origin_file {
            if self.obs_meta_origin_file.trim().is_empty() {
                return Err(AppError::Configuration(
                    "the obs_meta_origin_file configuration can not be empty when check_obs_meta_origin_file is true"
                        .to_string(),
                ));
            }
            if self.guide_url.trim().is_empty() {
                return Err(AppError::Configuration(
                    "the guide_url configuration can not be empty when check_obs_meta_origin_file is true"
                        .to_string(),
                ));
            }
            self.obs_meta_config.validate()?;
        }

        self.sig_file()?;
        Ok(())
    }

    pub fn sig_file(&self) -> AppResult<RepoFile> {
        self.sig_file_path.parse()
    }
}

/// A file pinned to a repository branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFile {
    pub org: String,
    pub repo: String,
    pub branch: String,
    pub path: String,
}

impl RepoFile {
    /// Browsable URL of a path in the same repository and branch.
    pub fn tree_url(&self, path: &str) -> String {
        format!(
            "https://gitee.com/{}/{}/tree/{}/{}",
            self.org, self.repo, self.branch, path
        )
    }
}

impl FromStr for RepoFile {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::Configuration(format!("invalid sig_file_path: {value}"));

        let (location, path) = value.split_once(':').ok_or_else(invalid)?;
        if path.is_empty() || path.contains(':') {
            return Err(invalid());
        }

        let parts: Vec<&str> = location.split('/').collect();
        let [org, repo, branch] = parts.as_slice() else {
            return Err(invalid());
        };
        if org.is_empty() || repo.is_empty() || branch.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            org: org.to_string(),
            repo: repo.to_string(),
            branch: branch.to_string(),
            path: path.to_string(),
        })
    }
}

/// Repository holding one directory per OBS project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObsMetaConfig {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub branch: String,
}

impl ObsMetaConfig {
    fn validate(&self) -> AppResult<()> {
        for (field, value) in [
            ("owner", &self.owner),
            ("repo", &self.repo),
            ("branch", &self.branch),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Configuration(format!(
                    "the obs_meta_config.{field} configuration can not be empty"
                )));
            }
        }
        Ok(())
    }
}
