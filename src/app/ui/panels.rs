use std::time::{Duration, Instant};

use eframe::egui::{self, Align, Color32, Context, Layout, RichText};

use crate::kinship::DEFAULT_FOCUS_DEPTH;
use crate::util::pluralize;

use super::super::graph::{InteractionController, family_colors};
use super::super::{
    FocusState, Loaded, PaletteState, PathFinderState, Requests, SaveViewState, SimContext,
    ViewModel, ViewState,
};

impl ViewModel {
    pub(in crate::app) fn new(loaded: Loaded) -> Self {
        let Loaded {
            service,
            views,
            graph,
            families,
            cities,
            saved_views,
        } = loaded;

        Self {
            service,
            views,
            family_colors: family_colors(families.iter().map(|family| &family.id)),
            families,
            cities,
            saved_views,
            graph,
            filter_family: None,
            filter_city: None,
            focus: FocusState {
                graph: None,
                depth: DEFAULT_FOCUS_DEPTH,
                include_ancestors: true,
                include_descendants: true,
                loading: None,
            },
            path: PathFinderState::default(),
            palette: PaletteState::default(),
            save_view: SaveViewState::default(),
            highlights: Default::default(),
            sim: SimContext::default(),
            view: ViewState::default(),
            controller: InteractionController::default(),
            frames: Default::default(),
            physics: Default::default(),
            requests: Requests::default(),
            selected: None,
            banner: None,
            graph_dirty: true,
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        let now = Instant::now();
        self.poll_requests(now);
        self.handle_shortcuts(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| self.draw_top_bar(ui));

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::default())
            .show(ctx, |ui| self.draw_graph(ui));

        self.draw_palette(ctx, now);
        self.draw_path_finder(ctx, now);
        self.draw_save_view(ctx);

        if self.has_pending_work(now) {
            ctx.request_repaint_after(Duration::from_millis(30));
        }
    }

    fn draw_top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("kinlens");
            ui.separator();
            ui.label(format!(
                "{} / {}",
                pluralize(self.sim.nodes.len(), "person", "people"),
                pluralize(self.sim.edges.len(), "connection", "connections"),
            ));

            if let Some(focus) = &self.focus.graph {
                let name = self
                    .sim
                    .index_by_id
                    .get(&focus.focus_person)
                    .map(|&index| self.sim.nodes[index].label.as_str())
                    .unwrap_or(focus.focus_person.as_str());
                ui.label(
                    RichText::new(format!("Focus: {name} (depth {})", focus.depth))
                        .color(Color32::from_rgb(250, 204, 21)),
                );
            } else if self.focus.loading.is_some() {
                ui.spinner();
                ui.label("Loading focus...");
            }
            if let Some(degrees) = self.path.report.as_ref().and_then(|report| report.degrees) {
                ui.label(
                    RichText::new(format!("Path: {}", pluralize(degrees, "degree", "degrees")))
                        .color(Color32::from_rgb(34, 197, 94)),
                );
            }

            ui.separator();
            if ui
                .button("Find path")
                .on_hover_text("Find how two people are related.")
                .clicked()
            {
                self.path.open = true;
            }
            if ui.button("Save view").clicked() {
                self.save_view.open = true;
            }
            if ui.button("+").on_hover_text("Zoom in").clicked() {
                self.view.zoom_by(ViewState::BUTTON_ZOOM);
            }
            if ui.button("-").on_hover_text("Zoom out").clicked() {
                self.view.zoom_by(1.0 / ViewState::BUTTON_ZOOM);
            }
            if ui.button("Reset view").clicked() {
                self.view.reset();
            }
            if ui.button("Recenter").clicked() {
                self.recenter();
            }
            if ui
                .button("Reheat")
                .on_hover_text("Restart the layout simulation.")
                .clicked()
            {
                self.sim.reheat();
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.small_button("Ctrl+K").on_hover_text("Command palette").clicked() {
                    self.palette.open = !self.palette.open;
                }
                if let Some(banner) = &self.banner {
                    let dismissed = ui.small_button("x").clicked();
                    ui.label(RichText::new(banner).color(Color32::from_rgb(248, 113, 113)));
                    if dismissed {
                        self.banner = None;
                    }
                }
            });
        });
    }

    fn draw_save_view(&mut self, ctx: &Context) {
        let mut open = self.save_view.open;
        let mut save = false;

        egui::Window::new("Save view")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Name");
                ui.text_edit_singleline(&mut self.save_view.name);
                ui.label("Description");
                ui.text_edit_multiline(&mut self.save_view.description);
                ui.checkbox(&mut self.save_view.shared, "Share with my family");
                ui.add_space(6.0);
                save = ui
                    .add_enabled(
                        !self.save_view.name.trim().is_empty(),
                        egui::Button::new("Save"),
                    )
                    .clicked();
            });

        self.save_view.open = open;
        if save {
            self.save_current_view();
        }
    }
}
