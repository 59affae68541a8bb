use std::time::Instant;

use crate::actions::{self, Clipboard};
use crate::app::{Message, Model, ToastLevel};

/// Run the side effects a message asks for after `update` has applied it.
pub(super) fn handle_message_side_effects(
    model: &mut Model,
    clipboard: &mut dyn Clipboard,
    msg: &Message,
) {
    match msg {
        Message::CopySource => copy_source(model, clipboard),
        Message::ExportSvg => export_svg(model),
        _ => {}
    }
}

fn copy_source(model: &mut Model, clipboard: &mut dyn Clipboard) {
    let text = model.source.text();
    match actions::copy_source(clipboard, &text, &mut model.copy_ack, Instant::now()) {
        Ok(()) => {
            crate::debug_log::log_event("copy.ok", format!("bytes={}", text.len()));
        }
        Err(err) => {
            tracing::warn!(error = %err, "clipboard write failed");
            model.show_toast(ToastLevel::Error, format!("Copy failed: {err}"));
        }
    }
}

fn export_svg(model: &mut Model) {
    let Some(svg) = model.render.svg() else {
        model.show_toast(ToastLevel::Warning, "Nothing to export yet");
        return;
    };
    match actions::export_svg(svg, &model.export_dir) {
        Ok(path) => {
            model.show_toast(ToastLevel::Info, format!("Exported {}", path.display()));
        }
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "export failed");
            model.show_toast(ToastLevel::Error, format!("Export failed: {err:#}"));
        }
    }
}
