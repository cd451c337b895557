use eframe::egui::{self, Align2, Color32, Rect, RichText, Sense, Shape, Stroke, Ui, pos2, vec2};

use super::super::ViewModel;
use super::super::render_utils::{PARENT_EDGE, SPOUSE_EDGE};

const LEGEND_FAMILIES: usize = 6;

fn line_sample(ui: &mut Ui, color: Color32, dashed: bool, text: &str) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(vec2(28.0, 12.0), Sense::hover());
        let from = pos2(rect.left(), rect.center().y);
        let to = pos2(rect.right(), rect.center().y);
        let stroke = Stroke::new(2.0, color);
        if dashed {
            ui.painter()
                .extend(Shape::dashed_line(&[from, to], stroke, 5.0, 3.0));
        } else {
            ui.painter().line_segment([from, to], stroke);
        }
        ui.label(text);
    });
}

impl ViewModel {
    pub(in crate::app) fn draw_legend(&mut self, ui: &Ui, canvas: Rect) {
        let mut toggled = None;
        let focus_active = self.focus.is_active();

        egui::Area::new(egui::Id::new("graph_legend"))
            .fixed_pos(canvas.left_bottom() + vec2(12.0, -12.0))
            .pivot(Align2::LEFT_BOTTOM)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(RichText::new("Families").strong());
                    for family in self.families.iter().take(LEGEND_FAMILIES) {
                        let color = self
                            .family_colors
                            .get(&family.id)
                            .copied()
                            .unwrap_or(Color32::GRAY);
                        let active = self.filter_family.as_deref() == Some(family.id.as_str());
                        ui.horizontal(|ui| {
                            let (dot, _) = ui.allocate_exact_size(vec2(12.0, 12.0), Sense::hover());
                            ui.painter().circle_filled(dot.center(), 5.0, color);
                            let clicked = ui
                                .add_enabled_ui(!focus_active, |ui| {
                                    ui.selectable_label(active, family.name.as_str()).clicked()
                                })
                                .inner;
                            if clicked {
                                toggled = Some(if active { None } else { Some(family.id.clone()) });
                            }
                        });
                    }
                    let hidden = self.families.len().saturating_sub(LEGEND_FAMILIES);
                    if hidden > 0 {
                        ui.label(RichText::new(format!("+{hidden} more")).weak());
                    }

                    ui.add_space(4.0);
                    line_sample(ui, PARENT_EDGE, false, "Parent - child");
                    line_sample(ui, SPOUSE_EDGE, true, "Spouse");
                    ui.label(RichText::new("Double-click to focus").weak().small());
                });
            });

        if let Some(family) = toggled {
            let city = self.filter_city.clone();
            self.set_filters(family, city);
        }
    }
}
