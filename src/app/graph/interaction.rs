use eframe::egui::{Key, Modifiers, Pos2, Rect, Vec2};

use super::super::physics::SimulationConfig;
use super::super::render_utils::screen_to_world;
use super::super::{SimContext, ViewState};

pub(in crate::app) const HIT_SLOP: f32 = 8.0;
const CLICK_SLOP: f32 = 3.0;

/// Closest node whose pick radius covers `world`. Equal distances go to the
/// node drawn last.
pub(in crate::app) fn hit_test(sim: &SimContext, world: Vec2) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, node) in sim.nodes.iter().enumerate() {
        let reach = node.radius + HIT_SLOP;
        let distance_sq = (node.pos - world).length_sq();
        if distance_sq >= reach * reach {
            continue;
        }
        match best {
            Some((_, closest)) if distance_sq > closest => {}
            _ => best = Some((index, distance_sq)),
        }
    }
    best.map(|(index, _)| index)
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(in crate::app) enum PointerMode {
    #[default]
    Idle,
    DraggingNode {
        index: usize,
        offset: Vec2,
    },
    Panning {
        origin: Pos2,
        start_pan: Vec2,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum GraphCommand {
    Select(Option<usize>),
    Focus(usize),
    TogglePalette,
    ClearHighlights,
}

#[derive(Debug, Default)]
pub(in crate::app) struct InteractionController {
    mode: PointerMode,
    hovered: Option<usize>,
    press_origin: Option<Pos2>,
    moved: bool,
}

impl InteractionController {
    pub(in crate::app) fn mode(&self) -> PointerMode {
        self.mode
    }

    pub(in crate::app) fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub(in crate::app) fn is_busy(&self) -> bool {
        self.mode != PointerMode::Idle
    }

    pub(in crate::app) fn reset(&mut self, sim: &mut SimContext) {
        *self = Self::default();
        sim.pinned = None;
    }

    pub(in crate::app) fn pointer_down(
        &mut self,
        pointer: Pos2,
        viewport: Rect,
        view: &ViewState,
        sim: &mut SimContext,
    ) {
        let world = screen_to_world(viewport, view.pan, view.scale, pointer);
        self.press_origin = Some(pointer);
        self.moved = false;

        self.mode = match hit_test(sim, world) {
            Some(index) => {
                sim.pinned = Some(index);
                PointerMode::DraggingNode {
                    index,
                    offset: sim.nodes[index].pos - world,
                }
            }
            None => PointerMode::Panning {
                origin: pointer,
                start_pan: view.pan,
            },
        };
    }

    pub(in crate::app) fn pointer_move(
        &mut self,
        pointer: Pos2,
        viewport: Rect,
        view: &mut ViewState,
        sim: &mut SimContext,
        config: &SimulationConfig,
    ) {
        if let Some(origin) = self.press_origin
            && origin.distance(pointer) > CLICK_SLOP
        {
            self.moved = true;
        }

        let world = screen_to_world(viewport, view.pan, view.scale, pointer);
        match self.mode {
            PointerMode::DraggingNode { index, offset } => {
                if let Some(node) = sim.nodes.get_mut(index) {
                    node.pos = world + offset;
                    node.velocity = Vec2::ZERO;
                    sim.bump(config.drag_alpha);
                }
            }
            PointerMode::Panning { origin, start_pan } => {
                view.pan = start_pan + (pointer - origin);
            }
            PointerMode::Idle => {
                self.hovered = hit_test(sim, world);
            }
        }
    }

    pub(in crate::app) fn pointer_up(
        &mut self,
        pointer: Pos2,
        viewport: Rect,
        view: &ViewState,
        sim: &mut SimContext,
        config: &SimulationConfig,
    ) -> Option<GraphCommand> {
        let mode = std::mem::take(&mut self.mode);
        let clicked = !self.moved;
        self.press_origin = None;
        self.moved = false;

        match mode {
            PointerMode::DraggingNode { index, .. } => {
                sim.pinned = None;
                if let Some(node) = sim.nodes.get_mut(index) {
                    node.velocity = Vec2::ZERO;
                }
                sim.bump(config.drag_alpha);
                clicked.then_some(GraphCommand::Select(Some(index)))
            }
            PointerMode::Panning { .. } if clicked => {
                let world = screen_to_world(viewport, view.pan, view.scale, pointer);
                Some(GraphCommand::Select(hit_test(sim, world)))
            }
            PointerMode::Panning { .. } | PointerMode::Idle => None,
        }
    }

    pub(in crate::app) fn pointer_left(&mut self, sim: &mut SimContext) {
        if let PointerMode::DraggingNode { index, .. } = self.mode
            && let Some(node) = sim.nodes.get_mut(index)
        {
            node.velocity = Vec2::ZERO;
        }
        self.mode = PointerMode::Idle;
        self.press_origin = None;
        self.moved = false;
        self.hovered = None;
        sim.pinned = None;
    }

    pub(in crate::app) fn double_click(
        &self,
        pointer: Pos2,
        viewport: Rect,
        view: &ViewState,
        sim: &SimContext,
    ) -> Option<GraphCommand> {
        let world = screen_to_world(viewport, view.pan, view.scale, pointer);
        hit_test(sim, world).map(GraphCommand::Focus)
    }

    pub(in crate::app) fn key(&self, key: Key, modifiers: Modifiers) -> Option<GraphCommand> {
        match key {
            Key::K if modifiers.command || modifiers.ctrl => Some(GraphCommand::TogglePalette),
            Key::Escape => Some(GraphCommand::ClearHighlights),
            _ => None,
        }
    }
}

/// Zooms one wheel notch around `pointer`, keeping the world point under it
/// fixed. Positive `delta_y` zooms out.
pub(in crate::app) fn wheel_zoom(view: &mut ViewState, viewport: Rect, pointer: Pos2, delta_y: f32) {
    if delta_y == 0.0 {
        return;
    }

    let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
    let scale = (view.scale * factor).clamp(ViewState::MIN_SCALE, ViewState::MAX_SCALE);
    let ratio = scale / view.scale;
    let anchor = pointer - viewport.center();
    view.pan = anchor - (anchor - view.pan) * ratio;
    view.scale = scale;
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;
    use crate::app::render_utils::world_to_screen;
    use crate::app::test_support::{sim_node, sim_with};

    fn viewport() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0))
    }

    fn two_nodes() -> SimContext {
        sim_with(
            vec![
                sim_node("a", "f", vec2(0.0, 0.0)),
                sim_node("b", "f", vec2(100.0, 0.0)),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn center_hits_its_node_and_far_points_miss() {
        let sim = two_nodes();
        assert_eq!(hit_test(&sim, vec2(0.0, 0.0)), Some(0));
        assert_eq!(hit_test(&sim, vec2(100.0, 0.0)), Some(1));

        let reach = sim.nodes[0].radius + HIT_SLOP;
        assert_eq!(hit_test(&sim, vec2(0.0, reach + 0.5)), None);
        assert_eq!(hit_test(&sim, vec2(50.0, 0.0)), None);
    }

    #[test]
    fn overlapping_nodes_prefer_closest_then_topmost() {
        let sim = sim_with(
            vec![
                sim_node("under", "f", vec2(0.0, 0.0)),
                sim_node("over", "f", vec2(4.0, 0.0)),
            ],
            Vec::new(),
        );
        assert_eq!(hit_test(&sim, vec2(0.0, 0.0)), Some(0));
        assert_eq!(hit_test(&sim, vec2(2.0, 0.0)), Some(1));
    }

    #[test]
    fn wheel_zoom_keeps_point_under_cursor() {
        let mut view = ViewState {
            pan: vec2(30.0, -20.0),
            scale: 1.0,
        };
        let pointer = pos2(520.0, 180.0);
        let before = screen_to_world(viewport(), view.pan, view.scale, pointer);

        wheel_zoom(&mut view, viewport(), pointer, -1.0);
        assert!((view.scale - 1.1).abs() < 1e-5);
        let after = screen_to_world(viewport(), view.pan, view.scale, pointer);
        assert!((before - after).length() < 1e-3);
    }

    #[test]
    fn wheel_zoom_is_clamped() {
        let mut view = ViewState::default();
        for _ in 0..100 {
            wheel_zoom(&mut view, viewport(), pos2(400.0, 300.0), 1.0);
        }
        assert!((view.scale - ViewState::MIN_SCALE).abs() < 1e-6);
        for _ in 0..100 {
            wheel_zoom(&mut view, viewport(), pos2(400.0, 300.0), -1.0);
        }
        assert!((view.scale - ViewState::MAX_SCALE).abs() < 1e-6);
    }

    #[test]
    fn dragging_pins_node_and_release_stops_it() {
        let config = SimulationConfig::default();
        let mut sim = two_nodes();
        sim.alpha = 0.01;
        let mut view = ViewState::default();
        let mut controller = InteractionController::default();

        let start = world_to_screen(viewport(), view.pan, view.scale, vec2(0.0, 0.0));
        controller.pointer_down(start, viewport(), &view, &mut sim);
        assert!(matches!(
            controller.mode(),
            PointerMode::DraggingNode { index: 0, .. }
        ));
        assert_eq!(sim.pinned, Some(0));

        let end = start + vec2(40.0, 25.0);
        controller.pointer_move(end, viewport(), &mut view, &mut sim, &config);
        assert!((sim.nodes[0].pos - vec2(40.0, 25.0)).length() < 1e-4);
        assert!(sim.alpha >= config.drag_alpha);

        sim.nodes[0].velocity = vec2(5.0, 5.0);
        let command = controller.pointer_up(end, viewport(), &view, &mut sim, &config);
        assert_eq!(command, None);
        assert_eq!(sim.nodes[0].velocity, Vec2::ZERO);
        assert_eq!(sim.pinned, None);
        assert_eq!(controller.mode(), PointerMode::Idle);
    }

    #[test]
    fn panning_moves_view_and_suppresses_click() {
        let config = SimulationConfig::default();
        let mut sim = two_nodes();
        let mut view = ViewState::default();
        let mut controller = InteractionController::default();

        let empty = pos2(700.0, 500.0);
        controller.pointer_down(empty, viewport(), &view, &mut sim);
        controller.pointer_move(empty + vec2(-60.0, 10.0), viewport(), &mut view, &mut sim, &config);
        assert_eq!(view.pan, vec2(-60.0, 10.0));

        let command = controller.pointer_up(empty + vec2(-60.0, 10.0), viewport(), &view, &mut sim, &config);
        assert_eq!(command, None);
    }

    #[test]
    fn plain_clicks_select_or_clear() {
        let config = SimulationConfig::default();
        let mut sim = two_nodes();
        let view = ViewState::default();
        let mut controller = InteractionController::default();

        let on_b = world_to_screen(viewport(), view.pan, view.scale, vec2(100.0, 0.0));
        controller.pointer_down(on_b, viewport(), &view, &mut sim);
        assert_eq!(
            controller.pointer_up(on_b, viewport(), &view, &mut sim, &config),
            Some(GraphCommand::Select(Some(1)))
        );

        let empty = pos2(10.0, 10.0);
        controller.pointer_down(empty, viewport(), &view, &mut sim);
        assert_eq!(
            controller.pointer_up(empty, viewport(), &view, &mut sim, &config),
            Some(GraphCommand::Select(None))
        );
    }

    #[test]
    fn hover_tracks_only_while_idle() {
        let config = SimulationConfig::default();
        let mut sim = two_nodes();
        let mut view = ViewState::default();
        let mut controller = InteractionController::default();

        let on_a = world_to_screen(viewport(), view.pan, view.scale, vec2(0.0, 0.0));
        controller.pointer_move(on_a, viewport(), &mut view, &mut sim, &config);
        assert_eq!(controller.hovered(), Some(0));

        controller.pointer_left(&mut sim);
        assert_eq!(controller.hovered(), None);
    }

    #[test]
    fn double_click_focuses_node() {
        let sim = two_nodes();
        let view = ViewState::default();
        let controller = InteractionController::default();
        let on_a = world_to_screen(viewport(), view.pan, view.scale, vec2(0.0, 0.0));

        assert_eq!(
            controller.double_click(on_a, viewport(), &view, &sim),
            Some(GraphCommand::Focus(0))
        );
        assert_eq!(
            controller.double_click(pos2(5.0, 5.0), viewport(), &view, &sim),
            None
        );
    }

    #[test]
    fn keyboard_shortcuts() {
        let controller = InteractionController::default();
        assert_eq!(
            controller.key(Key::K, Modifiers::COMMAND),
            Some(GraphCommand::TogglePalette)
        );
        assert_eq!(controller.key(Key::K, Modifiers::NONE), None);
        assert_eq!(
            controller.key(Key::Escape, Modifiers::NONE),
            Some(GraphCommand::ClearHighlights)
        );
    }
}
