use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::render::{SecurityLevel, Theme};

/// Flags that can be saved as defaults.
///
/// The same flags are read from the global config, the local
/// `.mermaidpadrc` override and the command line, then merged with
/// [`ConfigFlags::union`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub no_images: bool,
    pub force_half_cell: bool,
    pub theme: Option<Theme>,
    pub security_level: Option<SecurityLevel>,
    pub export_dir: Option<PathBuf>,
    pub render_debug_log: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge two flag sets; `other` wins for valued options.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            no_images: self.no_images || other.no_images,
            force_half_cell: self.force_half_cell || other.force_half_cell,
            theme: other.theme.or(self.theme),
            security_level: other.security_level.or(self.security_level),
            export_dir: other.export_dir.clone().or_else(|| self.export_dir.clone()),
            render_debug_log: other
                .render_debug_log
                .clone()
                .or_else(|| self.render_debug_log.clone()),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("mermaid-pad").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("mermaid-pad")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("mermaid-pad").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("mermaid-pad")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".mermaidpadrc")
}

/// Read flags from a config file; a missing file yields no flags.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
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

/// Write flags as a config file, one flag per line.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# mermaid-pad defaults (saved with --save)".to_string()];
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if flags.no_images {
        lines.push("--no-images".to_string());
    }
    if flags.force_half_cell {
        lines.push("--force-half-cell".to_string());
    }
    if let Some(theme) = flags.theme {
        lines.push(format!("--theme {}", theme.as_str()));
    }
    if let Some(level) = flags.security_level {
        lines.push(format!("--security-level {}", level.as_str()));
    }
    for (flag, value) in [
        ("--export-dir", &flags.export_dir),
        ("--render-debug-log", &flags.render_debug_log),
        ("--log-file", &flags.log_file),
    ] {
        if let Some(path) = value {
            lines.push(format!("{flag} {}", path.display()));
        }
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// Remove a config file if present.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be removed.
pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick known flags out of raw argument tokens; anything else is ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline_value) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        let mut take_value = || {
            inline_value.map(ToOwned::to_owned).or_else(|| {
                let next = tokens.get(i + 1).cloned();
                if next.is_some() {
                    i += 1;
                }
                next
            })
        };
        match name {
            "--watch" => flags.watch = true,
            "--no-images" => flags.no_images = true,
            "--force-half-cell" => flags.force_half_cell = true,
            "--theme" => flags.theme = take_value().as_deref().and_then(parse_theme),
            "--security-level" => {
                flags.security_level = take_value().as_deref().and_then(parse_security_level);
            }
            "--export-dir" => flags.export_dir = take_value().map(PathBuf::from),
            "--render-debug-log" => flags.render_debug_log = take_value().map(PathBuf::from),
            "--log-file" => flags.log_file = take_value().map(PathBuf::from),
            _ => {}
        }
        i += 1;
    }
    flags
}

fn parse_theme(s: &str) -> Option<Theme> {
    match s {
        "light" => Some(Theme::Light),
        "dark" => Some(Theme::Dark),
        _ => None,
    }
}

fn parse_security_level(s: &str) -> Option<SecurityLevel> {
    match s {
        "strict" => Some(SecurityLevel::Strict),
        "loose" => Some(SecurityLevel::Loose),
        "antiscript" => Some(SecurityLevel::Antiscript),
        "sandbox" => Some(SecurityLevel::Sandbox),
        _ => None,
    }
}
