//! mermaid-pad - A terminal Mermaid diagram editor with live preview.
//!
//! # Usage
//!
//! ```bash
//! mermaid-pad
//! mermaid-pad diagram.mmd
//! mermaid-pad --watch --theme dark diagram.mmd
//! ```

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use mermaid_pad::app::App;
use mermaid_pad::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use mermaid_pad::debug_log;
use mermaid_pad::render::{SecurityLevel, Theme};

/// A terminal Mermaid diagram editor with live preview
#[derive(Parser, Debug)]
#[command(name = "mermaid-pad", version, about, long_about = None)]
struct Cli {
    /// Diagram source to edit; starts with an example when omitted
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Reload the source when the file changes on disk
    #[arg(short, long)]
    watch: bool,

    /// Color theme for the UI and the diagram (detected when omitted)
    #[arg(long, value_enum)]
    theme: Option<Theme>,

    /// How much markup the renderer allows in labels
    #[arg(long, value_enum)]
    security_level: Option<SecurityLevel>,

    /// Directory diagram.svg is exported to
    #[arg(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,

    /// Show a text summary instead of drawing the diagram
    #[arg(long)]
    no_images: bool,

    /// Force image rendering to use half-cell fallback mode
    #[arg(long)]
    force_half_cell: bool,

    /// Write detailed render/frame debug events to a file
    #[arg(long, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Write warnings and errors to a file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

// Query the terminal background using OSC 11.
// We talk to /dev/tty so the terminal responds even when stdout is piped.
// On non-Unix platforms we skip the query entirely because the fallback
// (stdin/stdout) leaves an orphaned reader thread that blocks the console
// input buffer, preventing crossterm from receiving any keyboard events.
#[cfg(not(unix))]
fn query_terminal_background() -> std::io::Result<Option<(u8, u8, u8)>> {
    Ok(None)
}

#[cfg(unix)]
fn query_terminal_background() -> std::io::Result<Option<(u8, u8, u8)>> {
    use std::io::{Read, Write};
    use std::sync::mpsc;

    let (tx, rx) = mpsc::channel();

    let mut io = OpenOptions::new().read(true).write(true).open("/dev/tty")?;
    let reader = io.try_clone()?;

    // OSC 11 query: ESC ] 11 ; ? BEL
    io.write_all(b"\x1b]11;?\x07")?;
    io.flush()?;

    std::thread::spawn(move || {
        let mut reader = reader;
        let mut buf = [0u8; 256];
        let mut collected: Vec<u8> = Vec::new();
        loop {
            match reader.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    collected.extend_from_slice(&buf[..n]);
                    if collected.contains(&b'\x07')
                        || collected.windows(2).any(|w| w == b"\x1b\\")
                    {
                        let _ = tx.send(collected);
                        break;
                    }
                }
            }
        }
    });

    let collected = rx
        .recv_timeout(Duration::from_millis(75))
        .unwrap_or_default();
    let text = String::from_utf8_lossy(&collected);
    Ok(parse_osc11_reply(&text))
}

fn theme_from_rgb(r: u8, g: u8, b: u8) -> Theme {
    let luma = 0.0722f32.mul_add(
        f32::from(b),
        0.2126f32.mul_add(f32::from(r), 0.7152 * f32::from(g)),
    );
    if luma >= 140.0 {
        Theme::Light
    } else {
        Theme::Dark
    }
}

/// `COLORFGBG` is `fg;bg` (sometimes `fg;default;bg`); backgrounds 7 and
/// up are light in the 16-color palette, except 8 (dark gray).
fn theme_from_colorfgbg(value: &str) -> Option<Theme> {
    let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(if bg >= 7 && bg != 8 {
        Theme::Light
    } else {
        Theme::Dark
    })
}

fn detect_theme() -> Option<Theme> {
    let _raw = enable_raw_mode();
    let result = query_terminal_background();
    let _ = disable_raw_mode();
    result
        .ok()
        .flatten()
        .map(|(r, g, b)| theme_from_rgb(r, g, b))
        .or_else(|| {
            std::env::var("COLORFGBG")
                .ok()
                .and_then(|v| theme_from_colorfgbg(&v))
        })
}

fn parse_osc11_reply(reply: &str) -> Option<(u8, u8, u8)> {
    // Expect: ESC ] 11 ; rgb:RRRR/GGGG/BBBB BEL or ST
    let start = reply.find("rgb:")?;
    let data = &reply[start + 4..];
    let mut parts = data.split(['/', '\x07', '\x1b']);
    let r = parts.next()?;
    let g = parts.next()?;
    let b = parts.next()?;
    Some((
        parse_osc_component(r)?,
        parse_osc_component(g)?,
        parse_osc_component(b)?,
    ))
}

fn parse_osc_component(s: &str) -> Option<u8> {
    let hex = s.trim();
    if hex.len() >= 4 {
        let v = u16::from_str_radix(&hex[..4], 16).ok()?;
        u8::try_from(v >> 8).ok()
    } else if hex.len() == 2 {
        u8::from_str_radix(hex, 16).ok()
    } else {
        None
    }
}

/// Warnings go to `log_file` when set; the terminal belongs to the UI.
fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_tracing(effective.log_file.as_ref())?;

    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os("MERMAID_PAD_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = debug_log::set_path(render_debug_log_path.as_deref()) {
        eprintln!(
            "[warn] Failed to initialize render debug log {}: {}",
            render_debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            err
        );
    }

    let theme = match effective.theme {
        Some(theme) => theme,
        None => detect_theme().unwrap_or_default(),
    };

    if let Some(file) = &cli.file
        && !file.exists()
    {
        anyhow::bail!("File not found: {}", file.display());
    }

    let mut app = App::new(cli.file)
        .with_watch(effective.watch)
        .with_theme(theme)
        .with_security_level(effective.security_level.unwrap_or_default())
        .with_export_dir(effective.export_dir.unwrap_or_else(|| PathBuf::from(".")))
        .with_force_half_cell(effective.force_half_cell)
        .with_images_enabled(!effective.no_images)
        .with_config_paths(
            Some(global_path.clone()),
            if local_path.exists() {
                Some(local_path.clone())
            } else {
                None
            },
        );

    app.run().context("Application error")
}
