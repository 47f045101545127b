use std::path::Path;

use clap::{Args, Subcommand};

use crate::config::{BotConfig, PluginConfig};
use crate::error::{AppError, AppResult};

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Validate the plugin configuration file.
    Check,
    /// Show the configuration item that applies to a repository.
    Show {
        /// Repository as `org/repo`.
        repo: String,
    },
}

pub fn run(path: &Path, command: ConfigCommand) -> AppResult<()> {
    let config = PluginConfig::load(path)?;
    match command {
        ConfigCommand::Check => run_check(path, &config),
        ConfigCommand::Show { repo } => run_show(&config, &repo),
    }
}

fn run_check(path: &Path, config: &PluginConfig) -> AppResult<()> {
    println!("Configuration file: {}", path.display());
    println!("{} config item(s) are valid.", config.config_items.len());
    for item in &config.config_items {
        println!("  {} -> {}", item.repos.join(", "), item.community_name);
    }
    Ok(())
}

fn run_show(config: &PluginConfig, repo_path: &str) -> AppResult<()> {
    let (org, repo) = repo_path
        .split_once('/')
        .ok_or_else(|| AppError::Configuration(format!("expected org/repo, got {repo_path}")))?;
    let Some(item) = config.config_for(org, repo) else {
        println!("No config item covers {repo_path}.");
        return Ok(());
    };

    print_item(item);
    Ok(())
}

fn print_item(item: &BotConfig) {
    println!("Repos: {}", item.repos.join(", "));
    println!("Excluded repos: {}", display_list(&item.excluded_repos));
    println!("Community: {}", item.community_name);
    println!("Command link: {}", item.command_link);
    println!("Sig file: {}", item.sig_file_path);
    println!("Label color: {}", item.label_color);
    if item.check_obs_meta_origin_file {
        let meta = &item.obs_meta_config;
        println!("OBS meta file: {}", item.obs_meta_origin_file);
        println!("OBS meta repo: {}/{}:{}", meta.owner, meta.repo, meta.branch);
        println!("OBS guide: {}", item.guide_url);
    } else {
        println!("OBS meta check: disabled");
    }
}

fn display_list(values: &[String]) -> String {
    if values.is_empty() {
        "<none>".to_string()
    } else {
        values.join(", ")
    }
}
