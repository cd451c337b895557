use eframe::egui::{self, Align2, Color32, FontId, Key, Rect, Response, Sense, Ui};

use super::super::frame::EguiFrames;
use super::super::physics::step_physics;
use super::super::render::{SceneInput, build_scene, paint_scene};
use super::super::ViewModel;
use super::interaction::{GraphCommand, PointerMode, wheel_zoom};

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.graph_dirty {
            self.rebuild_simulation();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        for command in self.handle_graph_input(ui, rect, &response) {
            self.apply_command(command);
        }

        let ctx = ui.ctx().clone();
        let mut frames = EguiFrames(&ctx);
        if self.sim.is_hot(&self.physics) || self.controller.is_busy() {
            self.frames.start(&mut frames);
        }
        let sim = &mut self.sim;
        let physics = &self.physics;
        let dragging = self.controller.is_busy();
        self.frames
            .run_frame(&mut frames, || step_physics(sim, physics) || dragging);

        let hovered = self.controller.hovered();
        let scene = build_scene(&SceneInput {
            sim: &self.sim,
            view: self.view,
            viewport: rect,
            highlights: &self.highlights,
            hovered,
            selected: self.selected,
        });
        let painter = ui.painter_at(rect);
        paint_scene(&painter, rect, &scene);

        if self.sim.nodes.is_empty() {
            let notice = if self.graph.nodes.is_empty() {
                "No people in this snapshot"
            } else {
                "No people match the current filters"
            };
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                notice,
                FontId::proportional(16.0),
                Color32::from_rgb(148, 163, 184),
            );
        }

        let cursor = match self.controller.mode() {
            PointerMode::DraggingNode { .. } | PointerMode::Panning { .. } => {
                Some(egui::CursorIcon::Grabbing)
            }
            PointerMode::Idle => hovered.map(|_| egui::CursorIcon::PointingHand),
        };
        if let Some(cursor) = cursor {
            ui.output_mut(|output| output.cursor_icon = cursor);
        }

        self.draw_legend(ui, rect);
    }

    fn handle_graph_input(&mut self, ui: &Ui, rect: Rect, response: &Response) -> Vec<GraphCommand> {
        let mut commands = Vec::new();
        let (pointer, pressed, released, scroll) = ui.input(|input| {
            (
                input.pointer.interact_pos(),
                input.pointer.primary_pressed(),
                input.pointer.primary_released(),
                input.raw_scroll_delta.y,
            )
        });

        let Some(pointer) = pointer else {
            self.controller.pointer_left(&mut self.sim);
            return commands;
        };

        if pressed && response.hovered() {
            self.controller
                .pointer_down(pointer, rect, &self.view, &mut self.sim);
        }
        if self.controller.is_busy() || response.hovered() {
            self.controller.pointer_move(
                pointer,
                rect,
                &mut self.view,
                &mut self.sim,
                &self.physics,
            );
        } else {
            self.controller.pointer_left(&mut self.sim);
        }
        if released && self.controller.is_busy() {
            commands.extend(self.controller.pointer_up(
                pointer,
                rect,
                &self.view,
                &mut self.sim,
                &self.physics,
            ));
        }
        if response.double_clicked() {
            commands.extend(
                self.controller
                    .double_click(pointer, rect, &self.view, &self.sim),
            );
        }
        if response.hovered() && scroll != 0.0 {
            wheel_zoom(&mut self.view, rect, pointer, -scroll);
        }

        commands
    }

    pub(in crate::app) fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let commands = ctx.input(|input| {
            [Key::K, Key::Escape]
                .into_iter()
                .filter(|key| input.key_pressed(*key))
                .filter_map(|key| self.controller.key(key, input.modifiers))
                .collect::<Vec<_>>()
        });
        for command in commands {
            self.apply_command(command);
        }
    }
}
