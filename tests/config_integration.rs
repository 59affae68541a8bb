use std::path::PathBuf;

use mermaid_pad::config::{
    ConfigFlags, clear_config_flags, load_config_flags, parse_flag_tokens, save_config_flags,
};
use mermaid_pad::render::{SecurityLevel, Theme};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".mermaidpadrc");
    let content = r#"
# comment
--watch

--theme dark

--render-debug-log=render.log
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.watch);
    assert_eq!(flags.theme, Some(Theme::Dark));
    assert_eq!(flags.render_debug_log, Some(PathBuf::from("render.log")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".mermaidpadrc");
    let content = "--watch\n--theme light\n--export-dir out\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "mermaid-pad".to_string(),
        "--theme".to_string(),
        "dark".to_string(),
        "--force-half-cell".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.watch, "file flags should remain enabled");
    assert!(effective.force_half_cell, "cli flags should be applied");
    assert_eq!(effective.theme, Some(Theme::Dark), "cli should override theme");
    assert_eq!(
        effective.export_dir,
        Some(PathBuf::from("out")),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_parse_flag_tokens_handles_equals_syntax() {
    let args = vec![
        "mermaid-pad".to_string(),
        "--theme=dark".to_string(),
        "--security-level=strict".to_string(),
        "--log-file=warn.log".to_string(),
    ];
    let flags = parse_flag_tokens(&args);
    assert_eq!(flags.theme, Some(Theme::Dark));
    assert_eq!(flags.security_level, Some(SecurityLevel::Strict));
    assert_eq!(flags.log_file, Some(PathBuf::from("warn.log")));
}

#[test]
fn test_positional_file_is_not_a_flag() {
    let args = vec![
        "mermaid-pad".to_string(),
        "diagram.mmd".to_string(),
        "--watch".to_string(),
    ];
    let flags = parse_flag_tokens(&args);
    assert_eq!(
        flags,
        ConfigFlags {
            watch: true,
            ..ConfigFlags::default()
        }
    );
}

#[test]
fn test_saved_flags_load_back_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config");
    let flags = ConfigFlags {
        watch: true,
        no_images: true,
        theme: Some(Theme::Dark),
        security_level: Some(SecurityLevel::Sandbox),
        export_dir: Some(PathBuf::from("exports")),
        ..ConfigFlags::default()
    };

    save_config_flags(&path, &flags).unwrap();
    assert_eq!(load_config_flags(&path).unwrap(), flags);

    clear_config_flags(&path).unwrap();
    assert!(!path.exists());
    assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
}

#[test]
fn test_config_union_merges_booleans() {
    let file = ConfigFlags {
        watch: true,
        ..ConfigFlags::default()
    };
    let cli = ConfigFlags {
        no_images: true,
        force_half_cell: true,
        ..ConfigFlags::default()
    };
    let merged = file.union(&cli);
    assert!(merged.watch);
    assert!(merged.no_images);
    assert!(merged.force_half_cell);
}
