use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::ed::EdConfig;
use crate::palette::SourceMode;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub terse: bool,
    pub no_prompt: bool,
    pub json: bool,
    pub source: Option<SourceMode>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            terse: self.terse || other.terse,
            no_prompt: self.no_prompt || other.no_prompt,
            json: self.json || other.json,
            source: other.source.or(self.source),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }

    /// Interpreter settings implied by these flags. Palette sessions start
    /// with verbose errors unless `--terse` is set.
    pub const fn ed_config(&self) -> EdConfig {
        EdConfig {
            show_prompt: !self.no_prompt,
            verbose_errors: !self.terse,
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("rhed").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("rhed")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("rhed").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("rhed").join("config");
        }
    }

    PathBuf::from(".rhedrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".rhedrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# rhed defaults (saved with --save)".to_string());
    if flags.terse {
        lines.push("--terse".to_string());
    }
    if flags.no_prompt {
        lines.push("--no-prompt".to_string());
    }
    if flags.json {
        lines.push("--json".to_string());
    }
    if let Some(source) = flags.source {
        lines.push(format!("--source {}", source.as_flag()));
    }
    if let Some(path) = &flags.log_file {
        lines.push(format!("--log-file {}", path.display()));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--terse" {
            flags.terse = true;
        } else if token == "--no-prompt" {
            flags.no_prompt = true;
        } else if token == "--json" {
            flags.json = true;
        } else if token == "--source" {
            if let Some(next) = tokens.get(i + 1) {
                flags.source = parse_source(next);
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--source=") {
            flags.source = parse_source(value);
        } else if token == "--log-file" {
            if let Some(next) = tokens.get(i + 1) {
                flags.log_file = Some(PathBuf::from(next));
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--log-file=") {
            flags.log_file = Some(PathBuf::from(value));
        }
        i += 1;
    }
    flags
}

fn parse_source(s: &str) -> Option<SourceMode> {
    match s {
        "text-field" => Some(SourceMode::TextField),
        "editable" => Some(SourceMode::Editable),
        "clipboard" => Some(SourceMode::Clipboard),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = vec![
            "rhed".to_string(),
            "--terse".to_string(),
            "--json".to_string(),
            "--source".to_string(),
            "editable".to_string(),
            "--log-file=rhed.log".to_string(),
            "notes.html".to_string(),
        ];
        let flags = parse_flag_tokens(&args);
        assert!(flags.terse);
        assert!(flags.json);
        assert!(!flags.no_prompt);
        assert_eq!(flags.source, Some(SourceMode::Editable));
        assert_eq!(flags.log_file, Some(PathBuf::from("rhed.log")));
    }

    #[test]
    fn test_unknown_source_is_ignored() {
        let args = vec!["--source=fax".to_string()];
        assert_eq!(parse_flag_tokens(&args).source, None);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            terse: true,
            source: Some(SourceMode::Clipboard),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            json: true,
            source: Some(SourceMode::Editable),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.terse);
        assert!(merged.json);
        assert_eq!(merged.source, Some(SourceMode::Editable));
    }

    #[test]
    fn test_ed_config_defaults_to_verbose_with_prompt() {
        let config = ConfigFlags::default().ed_config();
        assert!(config.verbose_errors);
        assert!(config.show_prompt);

        let quiet = ConfigFlags {
            terse: true,
            no_prompt: true,
            ..ConfigFlags::default()
        }
        .ed_config();
        assert!(!quiet.verbose_errors);
        assert!(!quiet.show_prompt);
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".rhedrc");
        let flags = ConfigFlags {
            terse: true,
            no_prompt: true,
            json: true,
            source: Some(SourceMode::Clipboard),
            log_file: Some(PathBuf::from("rhed.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
    }
}
