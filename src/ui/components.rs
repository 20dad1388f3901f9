//! Reusable UI components

use crate::theme;
use eframe::egui;

/// Centered spinner with a line of text under it.
pub fn loading_indicator(ui: &mut egui::Ui, text: &str) {
    ui.vertical_centered(|ui| {
        ui.add(egui::Spinner::new().size(28.0).color(theme::ACCENT));
        ui.add_space(theme::SPACING_MD);
        ui.add(
            egui::Label::new(egui::RichText::new(text).size(14.0).color(theme::TEXT_MUTED))
                .selectable(false),
        );
    });
}

/// Hand-painted icon button; returns true when clicked.
pub fn icon_button(
    ui: &mut egui::Ui,
    icon: &str,
    size: f32,
    color: egui::Color32,
    tooltip: &str,
) -> bool {
    let (rect, response) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::click());
    if response.hovered() {
        ui.painter().rect_filled(rect, theme::RADIUS_DEFAULT, theme::BG_SURFACE);
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(size * 0.66),
        color,
    );
    let clicked = response.clicked();
    response.on_hover_text(tooltip);
    clicked
}

/// Full-width painted button. Returns true when clicked (and enabled).
pub fn wide_button(
    ui: &mut egui::Ui,
    text: &str,
    height: f32,
    fill: egui::Color32,
    enabled: bool,
) -> bool {
    let rect = ui.available_rect_before_wrap();
    let rect = egui::Rect::from_min_size(rect.min, egui::vec2(rect.width(), height));
    let response = ui.allocate_rect(rect, egui::Sense::click());

    let fill = if enabled { fill } else { theme::BTN_DISABLED };
    let (fill, draw_rect) = if enabled {
        theme::button_visual(&response, fill, rect)
    } else {
        (fill, rect)
    };
    ui.painter().rect_filled(draw_rect, theme::RADIUS_DEFAULT, fill);
    let text_color = if enabled {
        egui::Color32::WHITE
    } else {
        theme::TEXT_DIM
    };
    ui.painter().text(
        draw_rect.center(),
        egui::Align2::CENTER_CENTER,
        text,
        egui::FontId::proportional(14.0),
        text_color,
    );
    if response.hovered() {
        ui.ctx().set_cursor_icon(if enabled {
            egui::CursorIcon::PointingHand
        } else {
            egui::CursorIcon::NotAllowed
        });
    }
    enabled && response.clicked()
}
