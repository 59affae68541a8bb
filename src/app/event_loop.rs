use std::io::{Write, stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::actions::{Clipboard, SystemClipboard};
use crate::app::{App, Message, Model, ToastLevel, update};
use crate::render::RenderPipeline;
use crate::source::{DEFAULT_SOURCE, Preset, SourceBuffer};
use crate::watcher::{RELOAD_DEBOUNCE, SourceWatcher};

use super::effects::handle_message_side_effects;
use super::input::handle_event;

/// Holds the newest terminal size until resizing has been quiet for a while.
pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Poll interval while something on screen is about to change.
const BUSY_POLL: Duration = Duration::from_millis(16);
const IDLE_POLL: Duration = Duration::from_millis(250);

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the source file cannot be read, the render worker
    /// cannot start, or terminal I/O fails.
    pub fn run(&mut self) -> Result<()> {
        let _run_scope = crate::debug_log::scope("app.run.total");

        let (text, preset) = match &self.file_path {
            Some(path) => (
                std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None,
            ),
            None => (DEFAULT_SOURCE.to_string(), Some(Preset::Flowchart)),
        };
        let pipeline =
            RenderPipeline::spawn(Arc::clone(&self.renderer)).context("Failed to start renderer")?;

        // Create image picker BEFORE initializing terminal (queries stdio)
        let picker = if self.images_enabled {
            let _picker_scope = crate::debug_log::scope("app.create_picker");
            crate::image::create_picker(self.force_half_cell)
        } else {
            None
        };

        let mut terminal = ratatui::try_init().context(
            "Failed to initialize terminal; mermaid-pad requires an interactive terminal",
        )?;
        let size = terminal.size()?;

        let mut model = Model::new(SourceBuffer::from_text(&text), (size.width, size.height))
            .with_picker(picker);
        model.theme = self.theme;
        model.security_level = self.security_level;
        model.active_preset = preset;
        model.file_path.clone_from(&self.file_path);
        model.watch_enabled = self.watch_enabled && self.file_path.is_some();
        model.export_dir.clone_from(&self.export_dir);
        model.images_enabled = self.images_enabled;
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);

        let result = Self::event_loop(&mut terminal, &mut model, &pipeline);

        // Restore terminal
        let _ = set_mouse_motion_tracking(false);
        let _ = execute!(stdout(), DisableMouseCapture, DisableBracketedPaste);
        ratatui::restore();

        result
    }

    fn make_watcher(model: &mut Model) -> Option<SourceWatcher> {
        if !model.watch_enabled {
            return None;
        }
        let path = model.file_path.clone()?;
        match SourceWatcher::new(&path, RELOAD_DEBOUNCE) {
            Ok(watcher) => Some(watcher),
            Err(err) => {
                model.watch_enabled = false;
                model.show_toast(ToastLevel::Warning, format!("Watch unavailable: {err}"));
                tracing::warn!(path = %path.display(), error = %err, "cannot watch source file");
                None
            }
        }
    }

    fn dispatch(model: &mut Model, clipboard: &mut dyn Clipboard, msg: Message) {
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        handle_message_side_effects(model, clipboard, &side_msg);
    }

    fn event_loop(
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        pipeline: &RenderPipeline,
    ) -> Result<()> {
        let start = Instant::now();
        let mut clipboard = SystemClipboard;
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut watcher = Self::make_watcher(model);
        let mut frame_idx: u64 = 0;
        let mut needs_render = true;

        execute!(stdout(), EnableMouseCapture, EnableBracketedPaste)?;
        set_mouse_motion_tracking(true)?;

        loop {
            let now = Instant::now();
            if model.expire_toast(now) {
                needs_render = true;
            }
            if model.copy_ack.expire(now) {
                needs_render = true;
            }

            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                crate::debug_log::log_event(
                    "event.resize.apply",
                    format!("frame={frame_idx} width={width} height={height}"),
                );
                Self::dispatch(model, &mut clipboard, Message::Resize(width, height));
                needs_render = true;
            }

            if let Some(text) = watcher.as_mut().and_then(|w| w.take_reload(now)) {
                Self::dispatch(model, &mut clipboard, Message::SourceReloaded(text));
                needs_render = true;
            }

            if let Some(request) = model.take_render_request()
                && let Err(err) = pipeline.submit(request)
            {
                tracing::error!(%err, "render worker stopped");
                model.show_toast(ToastLevel::Error, format!("{err}; restart to render again"));
                needs_render = true;
            }

            for outcome in pipeline.drain() {
                Self::dispatch(model, &mut clipboard, Message::RenderCompleted(outcome));
                needs_render = true;
            }

            // Handle events
            let poll = if needs_render {
                Duration::ZERO
            } else if model.render.is_pending()
                || resize_debouncer.is_pending()
                || model.copy_ack.is_active(now)
                || model.active_toast().is_some()
            {
                BUSY_POLL
            } else {
                IDLE_POLL
            };
            if event::poll(poll)? {
                let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                let msg = handle_event(&event::read()?, model, event_ms, &mut resize_debouncer);
                if let Some(msg) = msg {
                    crate::debug_log::log_event(
                        "event.message",
                        format!("frame={frame_idx} msg={msg:?}"),
                    );
                    Self::dispatch(model, &mut clipboard, msg);
                    needs_render = true;
                }

                // Coalesce key repeat and drag bursts into a single frame.
                let mut drained = 0_u32;
                while event::poll(Duration::ZERO)? {
                    let drain_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    let msg = handle_event(&event::read()?, model, drain_ms, &mut resize_debouncer);
                    if let Some(msg) = msg {
                        drained += 1;
                        Self::dispatch(model, &mut clipboard, msg);
                        needs_render = true;
                    }
                }
                if drained > 0 {
                    crate::debug_log::log_event(
                        "event.drain",
                        format!("frame={frame_idx} drained={drained}"),
                    );
                }
            }

            if needs_render {
                frame_idx += 1;
                let prep_start = Instant::now();
                let canvas = model.layout().canvas;
                model.prepare_preview(canvas);
                crate::debug_log::log_event(
                    "frame.prep",
                    format!(
                        "frame={} prep_ms={:.3} zoom={} pan={:?}",
                        frame_idx,
                        prep_start.elapsed().as_secs_f64() * 1000.0,
                        model.viewport.zoom_percent(),
                        model.viewport.pan(),
                    ),
                );

                let draw_start = Instant::now();
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                crate::debug_log::log_event(
                    "frame.draw",
                    format!(
                        "frame={} draw_ms={:.3}",
                        frame_idx,
                        draw_start.elapsed().as_secs_f64() * 1000.0
                    ),
                );
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }
}

fn set_mouse_motion_tracking(enable: bool) -> std::io::Result<()> {
    // Any-event motion (1003) with SGR encoding (1006), so leaving the
    // preview mid-drag is reported even with no button held.
    let mut out = stdout();
    if enable {
        out.write_all(b"\x1b[?1003h\x1b[?1006h")?;
    } else {
        out.write_all(b"\x1b[?1003l\x1b[?1006l")?;
    }
    out.flush()
}
