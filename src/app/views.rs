//! Screens: upload, searching, and the results grid

use super::textures::PhotoTexture;
use super::App;
use crate::session::ScrollMetrics;
use crate::theme;
use crate::types::Step;
use crate::ui::components;
use eframe::egui;
use std::time::Instant;

// ============================================================================
// UPLOAD SCREEN
// ============================================================================

impl App {
    pub(crate) fn render_upload(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let panel_width = 420.0_f32.min(ui.available_width() - theme::SPACING_XL * 2.0);

        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.18);
            ui.label(
                egui::RichText::new("Find Your Photos")
                    .size(26.0)
                    .strong()
                    .color(theme::TEXT_PRIMARY),
            );
            ui.add_space(theme::SPACING_SM);
            ui.label(
                egui::RichText::new("Upload a photo of yourself and we'll find every picture you appear in")
                    .size(13.0)
                    .color(theme::TEXT_MUTED),
            );
            ui.add_space(theme::SPACING_XL);

            ui.allocate_ui(egui::vec2(panel_width, 0.0), |ui| {
                theme::section_frame().show(ui, |ui| {
                    ui.set_width(panel_width - theme::SPACING_XL * 2.0);

                    match &self.uploaded_image {
                        Some(path) => {
                            let name = path
                                .file_name()
                                .map(|n| n.to_string_lossy().into_owned())
                                .unwrap_or_default();
                            ui.horizontal(|ui| {
                                ui.label(
                                    egui::RichText::new(egui_phosphor::regular::IMAGE)
                                        .size(18.0)
                                        .color(theme::ACCENT),
                                );
                                ui.label(
                                    egui::RichText::new(name)
                                        .size(13.0)
                                        .color(theme::TEXT_SECONDARY),
                                );
                            });
                            ui.add_space(theme::SPACING_MD);
                            if components::wide_button(
                                ui,
                                &format!("{}  Choose a different photo", egui_phosphor::regular::ARROWS_CLOCKWISE),
                                34.0,
                                theme::BTN_DEFAULT,
                                true,
                            ) {
                                self.pick_upload_image();
                            }
                            ui.add_space(theme::SPACING_MD);
                            if components::wide_button(
                                ui,
                                &format!("{}  Find my photos", egui_phosphor::regular::MAGNIFYING_GLASS),
                                40.0,
                                theme::BTN_ACCENT,
                                true,
                            ) {
                                self.start_search(ctx);
                            }
                        }
                        None => {
                            if components::wide_button(
                                ui,
                                &format!("{}  Upload a photo", egui_phosphor::regular::UPLOAD_SIMPLE),
                                40.0,
                                theme::BTN_ACCENT,
                                true,
                            ) {
                                self.pick_upload_image();
                            }
                            ui.add_space(theme::SPACING_MD);
                            ui.label(
                                egui::RichText::new("JPG or PNG with a clearly visible face")
                                    .size(11.0)
                                    .color(theme::TEXT_DIM),
                            );
                        }
                    }

                    if let Some(message) = &self.error_message {
                        ui.add_space(theme::SPACING_LG);
                        ui.label(
                            egui::RichText::new(format!(
                                "{}  {}",
                                egui_phosphor::regular::WARNING_CIRCLE,
                                message
                            ))
                            .size(12.0)
                            .color(theme::STATUS_ERROR),
                        );
                    }
                });
            });
        });
    }

    fn pick_upload_image(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["jpg", "jpeg", "png", "webp"])
            .pick_file()
        {
            self.uploaded_image = Some(path);
            self.error_message = None;
        }
    }

    pub(crate) fn render_searching(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.35);
            components::loading_indicator(ui, "Searching for your face in the gallery...");
        });
    }
}

// ============================================================================
// RESULTS SCREEN
// ============================================================================

/// Grid interactions collected during painting and applied afterwards, to
/// keep the card loop free of `&mut self` calls.
#[derive(Default)]
struct GridActions {
    open_modal: Option<usize>,
    toggle_selected: Option<String>,
    toggle_favorite: Option<String>,
}

impl App {
    pub(crate) fn render_results(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        if self.session.is_none() {
            self.step = Step::Upload;
            return;
        }

        self.render_results_header(ctx, ui);
        ui.add_space(theme::SPACING_MD);
        self.render_grid(ctx, ui);
    }

    fn render_results_header(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let (total, selection_mode, selected_count) = {
            let session = self.session.as_ref().unwrap();
            (
                session.results.len(),
                session.selection_mode,
                session.selected.len(),
            )
        };

        let mut reset = false;
        let mut toggle_selection = false;
        let mut download_all = false;
        let mut download_selected = false;

        ui.horizontal(|ui| {
            let noun = if total == 1 { "photo" } else { "photos" };
            ui.label(
                egui::RichText::new(format!("{} {} found", total, noun))
                    .size(18.0)
                    .strong()
                    .color(theme::TEXT_PRIMARY),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add(theme::button(format!(
                        "{} New Search",
                        egui_phosphor::regular::ARROW_COUNTER_CLOCKWISE
                    )))
                    .clicked()
                {
                    reset = true;
                }

                if selection_mode {
                    let label = format!(
                        "{} Download Selected ({})",
                        egui_phosphor::regular::DOWNLOAD_SIMPLE,
                        selected_count
                    );
                    if ui
                        .add_enabled(selected_count > 0, theme::button_accent(label))
                        .clicked()
                    {
                        download_selected = true;
                    }
                    if ui
                        .add(theme::button(format!("{} Cancel", egui_phosphor::regular::X)))
                        .clicked()
                    {
                        toggle_selection = true;
                    }
                } else {
                    if ui
                        .add(theme::button_accent(format!(
                            "{} Download All",
                            egui_phosphor::regular::DOWNLOAD_SIMPLE
                        )))
                        .clicked()
                    {
                        download_all = true;
                    }
                    if ui
                        .add(theme::button(format!(
                            "{} Select",
                            egui_phosphor::regular::CHECK_SQUARE
                        )))
                        .clicked()
                    {
                        toggle_selection = true;
                    }
                }
            });
        });

        if reset {
            self.reset_search();
        }
        if toggle_selection {
            if let Some(session) = &mut self.session {
                session.toggle_selection_mode();
            }
        }
        if download_all {
            self.download_all(ctx);
        }
        if download_selected {
            self.download_selected(ctx);
        }
    }

    fn render_grid(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let card_w = theme::CARD_SIZE.0;
        let card_h = theme::CARD_SIZE.1;

        // Jump back to the modal's row when it was just closed.
        if let Some(index) = self.grid_scroll_sync.take() {
            let cards_per_row =
                ((ui.available_width() / (card_w + theme::SPACING_MD)).floor() as usize).max(1);
            let row = index / cards_per_row;
            self.grid_offset = row as f32 * (card_h + theme::SPACING_MD);
        }

        let mut actions = GridActions::default();
        let mut load_more_clicked = false;

        let scroll_response = egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .id_salt("photo_grid")
            .vertical_scroll_offset(self.grid_offset)
            .show(ui, |ui| {
                self.paint_cards(ctx, ui, &mut actions);

                let (visible, total, loading_more) = {
                    let session = self.session.as_ref().unwrap();
                    (
                        session.window.visible_count(),
                        session.window.total(),
                        session.window.is_loading_more(),
                    )
                };
                if visible < total {
                    ui.add_space(theme::SPACING_LG);
                    ui.vertical_centered(|ui| {
                        if loading_more {
                            ui.add(egui::Spinner::new().size(20.0).color(theme::ACCENT));
                        } else {
                            ui.allocate_ui(egui::vec2(260.0, 0.0), |ui| {
                                let label = format!("Show more ({} remaining)", total - visible);
                                if components::wide_button(ui, &label, 34.0, theme::BTN_DEFAULT, true)
                                {
                                    load_more_clicked = true;
                                }
                            });
                        }
                        ui.add_space(theme::SPACING_SM);
                        ui.label(
                            egui::RichText::new(format!("Showing {} of {}", visible, total))
                                .size(11.0)
                                .color(theme::TEXT_DIM),
                        );
                    });
                }
                ui.add_space(theme::SPACING_LG);
            });

        self.grid_offset = scroll_response.state.offset.y;

        self.apply_grid_actions(ctx, actions);

        let now = Instant::now();
        let metrics = ScrollMetrics {
            offset: scroll_response.state.offset.y,
            viewport_height: scroll_response.inner_rect.height(),
            content_height: scroll_response.content_size.y,
        };

        let session = self.session.as_mut().unwrap();
        if load_more_clicked {
            session.window.request_advance(now);
        }
        let decision = session.window.on_scroll(metrics, now);
        if let Some(start) = decision.prefetch_from {
            let scheduler = session.scheduler.clone();
            let keys = session.prefetch_keys(start);
            let ctx2 = ctx.clone();
            self.runtime.spawn(async move {
                scheduler.prefetch_range(keys).await;
                ctx2.request_repaint();
            });
        }

        let session = self.session.as_mut().unwrap();
        if session.window.tick(now).is_some() {
            ctx.request_repaint();
        }
        if session.window.is_loading_more() {
            // Wake up again for the settle to complete.
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }
    }

    fn paint_cards(&mut self, ctx: &egui::Context, ui: &mut egui::Ui, actions: &mut GridActions) {
        let card_w = theme::CARD_SIZE.0;
        let card_h = theme::CARD_SIZE.1;
        let image_h = card_h - 44.0;

        let visible = {
            let session = self.session.as_ref().unwrap();
            session.window.visible_count()
        };

        // Resolve textures before the paint loop; photo_texture needs &mut.
        struct Card {
            index: usize,
            key: String,
            number: Option<u32>,
            similarity: f32,
            texture: PhotoTexture,
            favorite: bool,
            selected: bool,
        }
        let cards: Vec<Card> = (0..visible)
            .filter_map(|index| {
                let (key, number, similarity) = {
                    let session = self.session.as_ref().unwrap();
                    let photo = session.results.get(index)?;
                    (photo.key.clone(), photo.display_number(), photo.similarity)
                };
                let texture = self.photo_texture(ctx, &key);
                let session = self.session.as_ref().unwrap();
                Some(Card {
                    index,
                    favorite: session.is_favorite(&key),
                    selected: session.selected.contains(&key),
                    key,
                    number,
                    similarity,
                    texture,
                })
            })
            .collect();

        let session = self.session.as_ref().unwrap();
        let selection_mode = session.selection_mode;
        let total = session.results.len();
        let preloaded: Vec<bool> = {
            let cache = session.cache.lock().unwrap();
            cards.iter().map(|c| cache.is_preloaded(&c.key)).collect()
        };

        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing = egui::vec2(theme::SPACING_MD, theme::SPACING_MD);

            for (card, warmed) in cards.iter().zip(preloaded) {
                let (rect, response) =
                    ui.allocate_exact_size(egui::vec2(card_w, card_h), egui::Sense::click());
                if !ui.is_rect_visible(rect) {
                    continue;
                }
                let painter = ui.painter();
                painter.rect_filled(rect, theme::RADIUS_DEFAULT, theme::BG_ELEVATED);

                let image_rect = egui::Rect::from_min_size(rect.min, egui::vec2(card_w, image_h));
                match &card.texture {
                    PhotoTexture::Ready(tex) => {
                        let uv =
                            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                        let brush = egui::epaint::Brush {
                            fill_texture_id: tex.id(),
                            uv,
                        };
                        let tint = if warmed {
                            egui::Color32::WHITE
                        } else {
                            // Not yet warmed into the preload set; dim slightly.
                            egui::Color32::from_gray(200)
                        };
                        let mut shape = egui::epaint::RectShape::filled(
                            image_rect,
                            egui::CornerRadius::same(theme::RADIUS_DEFAULT as u8),
                            tint,
                        );
                        shape.brush = Some(std::sync::Arc::new(brush));
                        painter.add(shape);
                    }
                    PhotoTexture::Loading => {
                        painter.rect_filled(image_rect, theme::RADIUS_DEFAULT, theme::BG_SURFACE);
                        painter.text(
                            image_rect.center(),
                            egui::Align2::CENTER_CENTER,
                            egui_phosphor::regular::HOURGLASS,
                            egui::FontId::proportional(22.0),
                            theme::TEXT_DIM,
                        );
                    }
                    PhotoTexture::Failed => {
                        painter.rect_filled(image_rect, theme::RADIUS_DEFAULT, theme::BG_SURFACE);
                        painter.text(
                            image_rect.center() - egui::vec2(0.0, 10.0),
                            egui::Align2::CENTER_CENTER,
                            egui_phosphor::regular::IMAGE_BROKEN,
                            egui::FontId::proportional(24.0),
                            theme::TEXT_DIM,
                        );
                        painter.text(
                            image_rect.center() + egui::vec2(0.0, 14.0),
                            egui::Align2::CENTER_CENTER,
                            "Image not found",
                            egui::FontId::proportional(11.0),
                            theme::TEXT_DIM,
                        );
                    }
                }

                if card.selected {
                    painter.rect_filled(
                        rect,
                        theme::RADIUS_DEFAULT,
                        egui::Color32::from_rgba_unmultiplied(0xfb, 0x71, 0x85, 40),
                    );
                } else if response.hovered() {
                    painter.rect_filled(
                        rect,
                        theme::RADIUS_DEFAULT,
                        egui::Color32::from_rgba_unmultiplied(0xff, 0xff, 0xff, 12),
                    );
                }

                let border = if card.selected {
                    theme::ACCENT
                } else {
                    theme::BORDER_SUBTLE
                };
                painter.rect_stroke(
                    rect,
                    theme::RADIUS_DEFAULT,
                    egui::Stroke::new(theme::STROKE_DEFAULT, border),
                    egui::StrokeKind::Outside,
                );

                // Footer: number, similarity, position hint.
                let text_rect = rect.shrink(8.0);
                let title = match card.number {
                    Some(n) => format!("Photo {}", n),
                    None => format!("Photo {}", card.index + 1),
                };
                painter.text(
                    text_rect.left_bottom() - egui::vec2(0.0, 16.0),
                    egui::Align2::LEFT_BOTTOM,
                    title,
                    egui::FontId::proportional(12.0),
                    theme::TEXT_SECONDARY,
                );
                painter.text(
                    text_rect.left_bottom(),
                    egui::Align2::LEFT_BOTTOM,
                    crate::utils::format_similarity(card.similarity),
                    egui::FontId::proportional(10.0),
                    theme::ACCENT,
                );
                painter.text(
                    text_rect.right_bottom(),
                    egui::Align2::RIGHT_BOTTOM,
                    format!("{} of {}", card.index + 1, total),
                    egui::FontId::proportional(9.0),
                    theme::TEXT_DIM,
                );

                // Favorite heart, top-right of the image.
                let heart_pos = image_rect.right_top() + egui::vec2(-16.0, 16.0);
                let heart_rect = egui::Rect::from_center_size(heart_pos, egui::vec2(24.0, 24.0));
                let heart_response = ui.interact(
                    heart_rect,
                    ui.id().with(("fav", card.index)),
                    egui::Sense::click(),
                );
                let (heart_icon, heart_color) = if card.favorite {
                    (egui_phosphor::regular::HEART_STRAIGHT, theme::FAVORITE_ACTIVE)
                } else if heart_response.hovered() {
                    (egui_phosphor::regular::HEART_STRAIGHT, theme::TEXT_SECONDARY)
                } else {
                    (egui_phosphor::regular::HEART_STRAIGHT, theme::TEXT_DIM)
                };
                ui.painter().text(
                    heart_pos,
                    egui::Align2::CENTER_CENTER,
                    heart_icon,
                    egui::FontId::proportional(16.0),
                    heart_color,
                );
                if heart_response.clicked() {
                    actions.toggle_favorite = Some(card.key.clone());
                }

                // Selection checkbox, top-left, only in selection mode.
                if selection_mode {
                    let check_pos = image_rect.left_top() + egui::vec2(16.0, 16.0);
                    let icon = if card.selected {
                        egui_phosphor::regular::CHECK_SQUARE
                    } else {
                        egui_phosphor::regular::SQUARE
                    };
                    ui.painter().text(
                        check_pos,
                        egui::Align2::CENTER_CENTER,
                        icon,
                        egui::FontId::proportional(18.0),
                        if card.selected { theme::ACCENT } else { theme::TEXT_SECONDARY },
                    );
                }

                if response.hovered() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                    if !selection_mode {
                        // View hint over the image while hovered.
                        ui.painter().text(
                            image_rect.center_bottom() - egui::vec2(0.0, 12.0),
                            egui::Align2::CENTER_CENTER,
                            format!("{} Click to enlarge", egui_phosphor::regular::MAGNIFYING_GLASS_PLUS),
                            egui::FontId::proportional(11.0),
                            theme::TEXT_SECONDARY,
                        );
                    }
                }
                if response.clicked() && !heart_response.clicked() {
                    if selection_mode {
                        actions.toggle_selected = Some(card.key.clone());
                    } else {
                        actions.open_modal = Some(card.index);
                    }
                }
            }
        });
    }

    fn apply_grid_actions(&mut self, ctx: &egui::Context, actions: GridActions) {
        if let Some(key) = actions.toggle_favorite {
            if let Some(session) = &mut self.session {
                session.toggle_favorite(&key);
            }
        }
        if let Some(key) = actions.toggle_selected {
            if let Some(session) = &mut self.session {
                session.toggle_selected(&key);
            }
        }
        if let Some(index) = actions.open_modal {
            self.open_modal(ctx, index);
        }
    }
}
