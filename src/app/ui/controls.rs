use eframe::egui::{self, RichText, Ui};

use crate::kinship::MAX_FOCUS_DEPTH;

use super::super::ViewModel;

const QUICK_CITIES: usize = 5;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            self.draw_filters(ui);
            ui.separator();
            self.draw_focus_controls(ui);
            ui.separator();
            self.draw_saved_views(ui);
        });
    }

    fn draw_filters(&mut self, ui: &mut Ui) {
        ui.heading("Filters");
        ui.add_space(4.0);

        let mut family = self.filter_family.clone();
        let mut city = self.filter_city.clone();
        let focus_active = self.focus.is_active();

        ui.add_enabled_ui(!focus_active, |ui| {
            let family_text = family
                .as_deref()
                .and_then(|id| self.families.iter().find(|family| family.id == id))
                .map_or("All families", |family| family.name.as_str());
            egui::ComboBox::from_label("Family")
                .selected_text(family_text)
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut family, None, "All families");
                    for entry in &self.families {
                        ui.selectable_value(
                            &mut family,
                            Some(entry.id.clone()),
                            entry.name.as_str(),
                        );
                    }
                });

            egui::ComboBox::from_label("City")
                .selected_text(city.as_deref().unwrap_or("All cities"))
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut city, None, "All cities");
                    for entry in &self.cities {
                        ui.selectable_value(&mut city, Some(entry.clone()), entry.as_str());
                    }
                });

            if !self.cities.is_empty() {
                ui.add_space(4.0);
                ui.label("Quick cities");
                ui.horizontal_wrapped(|ui| {
                    for entry in self.cities.iter().take(QUICK_CITIES) {
                        let active = city.as_deref() == Some(entry.as_str());
                        if ui.selectable_label(active, entry.as_str()).clicked() {
                            city = if active { None } else { Some(entry.clone()) };
                        }
                    }
                });
            }
        })
        .response
        .on_disabled_hover_text("Filters are off while focusing on one person.");

        self.set_filters(family, city);
    }

    fn draw_focus_controls(&mut self, ui: &mut Ui) {
        ui.heading("Focus");
        ui.add_space(4.0);

        let mut changed = false;
        changed |= ui
            .add(egui::Slider::new(&mut self.focus.depth, 1..=MAX_FOCUS_DEPTH).text("Depth"))
            .on_hover_text("How many relationship steps to show around the focused person.")
            .changed();
        changed |= ui
            .checkbox(&mut self.focus.include_ancestors, "Ancestors")
            .changed();
        changed |= ui
            .checkbox(&mut self.focus.include_descendants, "Descendants")
            .changed();

        if self.focus.is_active() {
            if changed {
                self.refocus();
            }
            if ui.button("Exit focus").clicked() {
                self.exit_focus();
            }
        } else if self.focus.loading.is_some() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading neighborhood...");
            });
        } else {
            ui.label(RichText::new("Double-click a person to focus on them.").weak());
        }
    }

    fn draw_saved_views(&mut self, ui: &mut Ui) {
        ui.heading("Saved views");
        ui.add_space(4.0);

        if self.saved_views.is_empty() {
            ui.label(RichText::new("No saved views yet.").weak());
            return;
        }

        let user = self.service.principal().user_id.clone();
        let mut apply = None;
        let mut delete = None;
        for view in &self.saved_views {
            ui.horizontal(|ui| {
                let mut label = view.name.clone();
                if view.is_shared {
                    label.push_str(" (shared)");
                }
                let response = ui.selectable_label(false, label);
                let response = match &view.description {
                    Some(description) => response.on_hover_text(description.as_str()),
                    None => response,
                };
                if response.clicked() {
                    apply = Some(view.clone());
                }
                if view.owner == user && ui.small_button("Delete").clicked() {
                    delete = Some(view.id.clone());
                }
            });
        }

        if let Some(view) = apply {
            self.apply_saved_view(&view);
        }
        if let Some(id) = delete {
            self.delete_saved_view(&id);
        }
    }
}
