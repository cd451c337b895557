use std::time::Instant;

use eframe::egui::{self, Color32, Context, RichText, Ui};

use crate::kinship::{PathReport, PersonView};
use crate::util::pluralize;

use super::super::{PathEnd, SearchTarget, ViewModel};

fn endpoint_label(person: Option<&PersonView>) -> &str {
    person.map_or("not chosen", |person| person.name.as_str())
}

impl ViewModel {
    pub(in crate::app) fn draw_path_finder(&mut self, ctx: &Context, now: Instant) {
        if !self.path.open {
            return;
        }

        let mut open = true;
        let mut jump = None;
        let mut run = false;
        let mut query_changed = false;

        egui::Window::new("Find relationship")
            .open(&mut open)
            .collapsible(false)
            .default_width(340.0)
            .show(ctx, |ui| {
                for end in [PathEnd::From, PathEnd::To] {
                    self.draw_endpoint(ui, end);
                }

                if self.path.picking.is_some() {
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.path.query)
                            .hint_text("Search by name..."),
                    );
                    query_changed = response.changed();

                    let mut chosen = None;
                    for (position, person) in self.path.candidates.iter().enumerate() {
                        let text = format!("{} ({})", person.name, person.family_name);
                        if ui.selectable_label(false, text).clicked() {
                            chosen = Some(position);
                        }
                    }
                    if let (Some(position), Some(end)) = (chosen, self.path.picking) {
                        let person = self.path.candidates.swap_remove(position);
                        match end {
                            PathEnd::From => self.path.from = Some(person),
                            PathEnd::To => self.path.to = Some(person),
                        }
                        self.path.picking = None;
                        self.path.query.clear();
                        self.path.candidates.clear();
                    }
                }

                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    let ready = self.path.from.is_some() && self.path.to.is_some();
                    run = ui
                        .add_enabled(ready, egui::Button::new("Find path"))
                        .clicked();
                    if self.requests.path.is_pending() {
                        ui.spinner();
                    }
                });

                if let Some(report) = &self.path.report {
                    ui.separator();
                    jump = draw_report(ui, report);
                }
            });

        if query_changed {
            self.schedule_search(SearchTarget::PathFinder, now);
        }
        if run {
            self.find_path();
        }
        if let Some(id) = jump {
            self.jump_to(&id);
        }
        if !open {
            self.path.open = false;
            self.path.picking = None;
            self.path.debounce.clear();
            self.clear_path();
        }
    }

    fn draw_endpoint(&mut self, ui: &mut Ui, end: PathEnd) {
        let (title, person) = match end {
            PathEnd::From => ("From", self.path.from.as_ref()),
            PathEnd::To => ("To", self.path.to.as_ref()),
        };

        let name = endpoint_label(person).to_owned();
        ui.horizontal(|ui| {
            ui.label(RichText::new(title).strong());
            ui.label(name);
            let picking = self.path.picking == Some(end);
            if ui.selectable_label(picking, "Pick").clicked() {
                self.path.picking = if picking { None } else { Some(end) };
                self.path.query.clear();
                self.path.candidates.clear();
            }
        });
    }
}

fn draw_report(ui: &mut Ui, report: &PathReport) -> Option<String> {
    let Some(degrees) = report.degrees.filter(|_| report.found) else {
        ui.label(
            report
                .message
                .as_deref()
                .unwrap_or("No path found between these people"),
        );
        return None;
    };

    ui.label(
        RichText::new(format!(
            "Related by {}",
            pluralize(degrees, "degree", "degrees")
        ))
        .color(Color32::from_rgb(34, 197, 94))
        .strong(),
    );

    let mut clicked = None;
    for step in &report.path {
        ui.horizontal(|ui| {
            if let Some(relationship) = step.relationship {
                ui.label(RichText::new(relationship.label()).weak());
            }
            let name = step
                .person
                .as_ref()
                .map_or(step.person_id.as_str(), |person| person.name.as_str());
            if ui.link(name).clicked() {
                clicked = Some(step.person_id.clone());
            }
        });
    }
    clicked
}
