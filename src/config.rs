use crate::error::{Error, Result};
use crate::repository::Repository;

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

/// Key/value configuration consulted at commit time. The user-global file
/// is overlaid by the repo-local `<admin>/config`, field by field.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub user: UserConfig,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct UserConfig {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[must_use]
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gud").join("config"))
}

fn read_file(path: &Path) -> Result<Config> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => return Err(e.into()),
    };
    Ok(toml::from_str(&content)?)
}

pub fn load(repo: &Repository) -> Result<Config> {
    let mut config = match global_config_path() {
        Some(path) => read_file(&path)?,
        None => Config::default(),
    };

    let repo_config = read_file(&repo.admin.join("config"))?;
    if repo_config.user.name.is_some() {
        config.user.name = repo_config.user.name;
    }
    if repo_config.user.email.is_some() {
        config.user.email = repo_config.user.email;
    }

    Ok(config)
}

#[derive(Debug, Clone)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

/// Resolve and validate `user.name` / `user.email` for a commit.
pub fn committer_identity(repo: &Repository) -> Result<Identity> {
    let config = load(repo)?;

    let name = config
        .user
        .name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::InvalidName("user.name is not set in config".to_string()))?;
    let email = config
        .user
        .email
        .filter(|email| !email.is_empty())
        .ok_or_else(|| Error::InvalidName("user.email is not set in config".to_string()))?;

    let name_re = Regex::new(r"^\w{1,16}$").expect("static pattern");
    if !name_re.is_match(&name) {
        return Err(Error::InvalidName(format!("user.name '{name}'")));
    }

    let email_re = Regex::new(r"^\w+@[A-Za-z]+\.[A-Za-z]+$").expect("static pattern");
    if !email_re.is_match(&email) {
        return Err(Error::InvalidName(format!("user.email '{email}'")));
    }

    Ok(Identity { name, email })
}
