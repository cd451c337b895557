use std::time::Instant;

use eframe::egui::{self, Align2, Context, RichText, vec2};

use crate::kinship::MIN_QUERY_CHARS;

use super::super::{SearchTarget, ViewModel};

const QUICK_CITIES: usize = 5;

enum PaletteAction {
    Jump(String),
    Focus(String),
    FindPath,
    SaveView,
    ClearHighlights,
    ApplyView(usize),
    City(String),
}

impl ViewModel {
    pub(in crate::app) fn draw_palette(&mut self, ctx: &Context, now: Instant) {
        if !self.palette.open {
            return;
        }

        let mut open = true;
        let mut action = None;
        let mut query_changed = false;

        egui::Window::new("Command palette")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .title_bar(false)
            .anchor(Align2::CENTER_TOP, vec2(0.0, 80.0))
            .default_width(420.0)
            .show(ctx, |ui| {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.palette.query)
                        .hint_text("Search people or type a command...")
                        .desired_width(f32::INFINITY),
                );
                if !response.has_focus() && self.palette.query.is_empty() {
                    response.request_focus();
                }
                query_changed = response.changed();

                let query = self.palette.query.trim();
                if query.chars().count() >= MIN_QUERY_CHARS {
                    ui.add_space(4.0);
                    ui.label(RichText::new("People").strong());
                    if self.palette.results.is_empty() {
                        ui.label(RichText::new("No matches yet.").weak());
                    }
                    for person in &self.palette.results {
                        ui.horizontal(|ui| {
                            ui.label(person.name.as_str());
                            ui.label(RichText::new(person.family_name.as_str()).weak());
                            if ui.small_button("Jump to").clicked() {
                                action = Some(PaletteAction::Jump(person.id.clone()));
                            }
                            if ui.small_button("Focus").clicked() {
                                action = Some(PaletteAction::Focus(person.id.clone()));
                            }
                        });
                    }
                }

                ui.separator();
                ui.label(RichText::new("Actions").strong());
                if ui.selectable_label(false, "Find relationship path").clicked() {
                    action = Some(PaletteAction::FindPath);
                }
                if ui.selectable_label(false, "Save current view").clicked() {
                    action = Some(PaletteAction::SaveView);
                }
                let highlighted = self.focus.is_active() || self.highlights.has_path();
                let clear = ui
                    .add_enabled_ui(highlighted, |ui| {
                        ui.selectable_label(false, "Clear focus & path").clicked()
                    })
                    .inner;
                if clear {
                    action = Some(PaletteAction::ClearHighlights);
                }

                if !self.saved_views.is_empty() {
                    ui.separator();
                    ui.label(RichText::new("Saved views").strong());
                    for (position, view) in self.saved_views.iter().enumerate() {
                        if ui.selectable_label(false, view.name.as_str()).clicked() {
                            action = Some(PaletteAction::ApplyView(position));
                        }
                    }
                }

                if !self.cities.is_empty() {
                    ui.separator();
                    ui.label(RichText::new("Filter by city").strong());
                    ui.horizontal_wrapped(|ui| {
                        for city in self.cities.iter().take(QUICK_CITIES) {
                            if ui.small_button(city.as_str()).clicked() {
                                action = Some(PaletteAction::City(city.clone()));
                            }
                        }
                    });
                }
            });

        if query_changed {
            self.palette.results.clear();
            self.schedule_search(SearchTarget::Palette, now);
        }

        let close = action.is_some() || !open;
        match action {
            Some(PaletteAction::Jump(id)) => self.jump_to(&id),
            Some(PaletteAction::Focus(id)) => self.enter_focus(id),
            Some(PaletteAction::FindPath) => self.path.open = true,
            Some(PaletteAction::SaveView) => self.save_view.open = true,
            Some(PaletteAction::ClearHighlights) => self.clear_focus_and_path(),
            Some(PaletteAction::ApplyView(position)) => {
                if let Some(view) = self.saved_views.get(position).cloned() {
                    self.apply_saved_view(&view);
                }
            }
            Some(PaletteAction::City(city)) => {
                let family = self.filter_family.clone();
                self.set_filters(family, Some(city));
            }
            None => {}
        }
        if close {
            self.palette.open = false;
            self.palette.query.clear();
            self.palette.results.clear();
            self.palette.debounce.clear();
        }
    }
}
