//! Overlay modals: the enlarged photo viewer and download progress

use super::textures::PhotoTexture;
use super::App;
use crate::theme;
use crate::types::DownloadStatus;
use crate::ui::components;
use crate::utils::format_bytes;
use eframe::egui;

// ============================================================================
// PHOTO VIEWER MODAL
// ============================================================================

impl App {
    pub(crate) fn render_photo_modal(&mut self, ctx: &egui::Context) {
        let Some(session) = &self.session else {
            return;
        };
        let Some(cursor) = session.modal.cursor() else {
            return;
        };
        let loading = session.modal.is_loading();
        let total = session.results.len();
        let (key, title, file_name) = match session.results.get(cursor) {
            Some(photo) => {
                let title = match photo.display_number() {
                    Some(n) => format!("Photo {}", n),
                    None => format!("Photo {}", cursor + 1),
                };
                (photo.key.clone(), title, photo.file_name().to_string())
            }
            None => return,
        };
        let favorite = session.is_favorite(&key);

        // Keyboard navigation while the modal is up.
        let (left, right) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::ArrowLeft),
                i.key_pressed(egui::Key::ArrowRight),
            )
        });

        let mut close = false;
        let mut step: Option<isize> = None;
        let mut toggle_favorite = false;
        let mut download_one = false;

        let screen = ctx.screen_rect();
        let modal_w = (screen.width() - 120.0).clamp(360.0, 900.0);
        let modal_h = (screen.height() - 100.0).clamp(320.0, 720.0);
        let image_h = modal_h - 96.0;

        let modal = egui::Modal::new(egui::Id::new("photo_modal"))
            .backdrop_color(egui::Color32::from_black_alpha(200))
            .frame(theme::modal_frame());
        let modal_response = modal.show(ctx, |ui| {
            ui.set_width(modal_w);

            // Header
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(&title)
                        .size(15.0)
                        .strong()
                        .color(theme::TEXT_PRIMARY),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if components::icon_button(
                        ui,
                        egui_phosphor::regular::X,
                        24.0,
                        theme::TEXT_MUTED,
                        "Close",
                    ) {
                        close = true;
                    }
                });
            });
            ui.add_space(theme::SPACING_SM);

            // Image area with side navigation.
            ui.horizontal(|ui| {
                ui.set_height(image_h);

                let can_prev = !loading && cursor > 0;
                if components::icon_button(
                    ui,
                    egui_phosphor::regular::CARET_LEFT,
                    32.0,
                    if can_prev { theme::TEXT_PRIMARY } else { theme::TEXT_DIM },
                    "Previous",
                ) && can_prev
                {
                    step = Some(-1);
                }

                let image_w = ui.available_width() - 40.0;
                ui.allocate_ui(egui::vec2(image_w, image_h), |ui| {
                    ui.centered_and_justified(|ui| {
                        if loading {
                            components::loading_indicator(ui, "Loading photo...");
                        } else {
                            match self.photo_texture(ctx, &key) {
                                PhotoTexture::Ready(tex) => {
                                    let size = tex.size_vec2();
                                    let scale =
                                        (image_w / size.x).min(image_h / size.y).min(1.0);
                                    ui.add(
                                        egui::Image::new(&tex)
                                            .fit_to_exact_size(size * scale)
                                            .corner_radius(theme::RADIUS_DEFAULT),
                                    );
                                }
                                PhotoTexture::Loading => {
                                    components::loading_indicator(ui, "Loading photo...");
                                }
                                PhotoTexture::Failed => {
                                    ui.label(
                                        egui::RichText::new(format!(
                                            "{}  Image not found",
                                            egui_phosphor::regular::IMAGE_BROKEN
                                        ))
                                        .size(14.0)
                                        .color(theme::TEXT_DIM),
                                    );
                                }
                            }
                        }
                    });
                });

                let can_next = !loading && cursor + 1 < total;
                if components::icon_button(
                    ui,
                    egui_phosphor::regular::CARET_RIGHT,
                    32.0,
                    if can_next { theme::TEXT_PRIMARY } else { theme::TEXT_DIM },
                    "Next",
                ) && can_next
                {
                    step = Some(1);
                }
            });
            ui.add_space(theme::SPACING_SM);

            // Footer
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(format!("{} of {}", cursor + 1, total))
                        .size(12.0)
                        .color(theme::TEXT_MUTED),
                );
                ui.label(
                    egui::RichText::new(&file_name)
                        .size(11.0)
                        .color(theme::TEXT_DIM),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if components::icon_button(
                        ui,
                        egui_phosphor::regular::DOWNLOAD_SIMPLE,
                        24.0,
                        theme::TEXT_SECONDARY,
                        "Download this photo",
                    ) {
                        download_one = true;
                    }
                    if components::icon_button(
                        ui,
                        egui_phosphor::regular::HEART_STRAIGHT,
                        24.0,
                        if favorite { theme::FAVORITE_ACTIVE } else { theme::TEXT_MUTED },
                        if favorite { "Remove favorite" } else { "Add favorite" },
                    ) {
                        toggle_favorite = true;
                    }
                });
            });
        });

        if left {
            step = Some(-1);
        }
        if right {
            step = Some(1);
        }
        if modal_response.should_close() {
            close = true;
        }

        if toggle_favorite {
            if let Some(session) = &mut self.session {
                session.toggle_favorite(&key);
            }
        }
        if download_one {
            self.download_single(ctx, &key);
        }
        if let Some(direction) = step {
            self.modal_move(ctx, direction);
        } else if close {
            self.close_modal();
        }
    }
}

// ============================================================================
// DOWNLOAD PROGRESS MODAL
// ============================================================================

impl App {
    pub(crate) fn render_download_modal(&mut self, ctx: &egui::Context) {
        if !self.show_download_modal {
            return;
        }

        let (status, photo_count, dest) = {
            let state = self.download_state.lock().unwrap();
            (state.status.clone(), state.photo_count, state.dest.clone())
        };

        let mut close = false;
        let mut cancel = false;
        let mut open_folder = false;
        let in_progress = matches!(status, Some(DownloadStatus::Downloading(_, _)));

        let modal = egui::Modal::new(egui::Id::new("zip_download_modal"))
            .backdrop_color(egui::Color32::from_black_alpha(180))
            .frame(theme::modal_frame());
        let modal_response = modal.show(ctx, |ui| {
            ui.set_min_width(360.0);
            ui.set_max_width(360.0);

            ui.horizontal(|ui| {
                ui.colored_label(theme::ACCENT, egui_phosphor::regular::DOWNLOAD_SIMPLE);
                let noun = if photo_count == 1 { "photo" } else { "photos" };
                ui.strong(format!("Downloading {} {}", photo_count, noun));
            });
            ui.add_space(theme::SPACING_MD);

            match &status {
                Some(DownloadStatus::Downloading(done, total)) => {
                    let progress = if *total > 0 {
                        *done as f32 / *total as f32
                    } else {
                        0.0
                    };
                    ui.add(
                        egui::ProgressBar::new(progress)
                            .corner_radius(3.0)
                            .fill(theme::ACCENT)
                            .animate(*total == 0),
                    );
                    ui.add_space(theme::SPACING_SM);
                    let label = if *total > 0 {
                        format!("{} / {}", format_bytes(*done), format_bytes(*total))
                    } else {
                        format_bytes(*done)
                    };
                    ui.label(
                        egui::RichText::new(label).size(12.0).color(theme::TEXT_MUTED),
                    );
                    ctx.request_repaint_after(std::time::Duration::from_millis(100));
                }
                Some(DownloadStatus::Complete) => {
                    ui.colored_label(
                        theme::STATUS_SUCCESS,
                        format!("{}  Download complete", egui_phosphor::regular::CHECK_CIRCLE),
                    );
                    if let Some(dest) = &dest {
                        ui.add_space(theme::SPACING_SM);
                        ui.label(
                            egui::RichText::new(dest.display().to_string())
                                .size(11.0)
                                .color(theme::TEXT_DIM),
                        );
                    }
                }
                Some(DownloadStatus::Cancelled) => {
                    ui.colored_label(
                        theme::TEXT_MUTED,
                        format!("{}  Download cancelled", egui_phosphor::regular::X_CIRCLE),
                    );
                }
                Some(DownloadStatus::Failed(reason)) => {
                    ui.colored_label(
                        theme::STATUS_ERROR,
                        format!("{}  {}", egui_phosphor::regular::WARNING_CIRCLE, reason),
                    );
                }
                None => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Preparing download...");
                    });
                    ctx.request_repaint_after(std::time::Duration::from_millis(100));
                }
            }

            ui.add_space(theme::SPACING_LG);
            ui.separator();
            ui.add_space(theme::SPACING_SM);

            ui.horizontal(|ui| {
                if in_progress || status.is_none() {
                    let cancel_btn = egui::Button::new(format!("{} Cancel", egui_phosphor::regular::X))
                        .fill(theme::BTN_DANGER)
                        .corner_radius(theme::RADIUS_DEFAULT);
                    if ui.add(cancel_btn).clicked() {
                        cancel = true;
                    }
                } else {
                    if matches!(status, Some(DownloadStatus::Complete)) && dest.is_some() {
                        if ui
                            .add(theme::button(format!(
                                "{} Open Folder",
                                egui_phosphor::regular::FOLDER_OPEN
                            )))
                            .clicked()
                        {
                            open_folder = true;
                        }
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.add(theme::button("Close")).clicked() {
                            close = true;
                        }
                    });
                }
            });
        });

        if cancel {
            if let Some(token) = &self.cancel_token {
                token.cancel();
            }
        }
        // Clicking the backdrop only dismisses once the download has settled.
        if close || (modal_response.should_close() && !in_progress && status.is_some()) {
            self.show_download_modal = false;
        }
        if open_folder {
            if let Some(dest) = dest.and_then(|d| d.parent().map(|p| p.to_path_buf())) {
                if let Err(e) = open::that(dest) {
                    tracing::warn!(error = %e, "Failed to open download folder");
                }
            }
        }
    }

    /// Transient toast along the bottom edge; auto-dismisses after a few seconds.
    pub(crate) fn render_toast(&mut self, ctx: &egui::Context) {
        let Some(message) = self.toast_message.clone() else {
            return;
        };
        let elapsed = self
            .toast_start
            .map(|t| t.elapsed().as_secs_f32())
            .unwrap_or(f32::MAX);
        if elapsed > 3.0 {
            self.toast_message = None;
            self.toast_start = None;
            return;
        }

        egui::Area::new(egui::Id::new("toast"))
            .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -24.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                theme::section_frame().show(ui, |ui| {
                    ui.label(
                        egui::RichText::new(message).size(12.0).color(theme::TEXT_SECONDARY),
                    );
                });
            });
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}
