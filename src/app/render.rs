use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, vec2};

use crate::kinship::EdgeKind;
use crate::util::first_word;

use super::highlight::{Highlights, connected_to};
use super::render_utils::{
    BACKGROUND, FOCUS_RING, GRID_LINE, PARENT_EDGE, PATH_EDGE, SPOUSE_EDGE, blend_color,
    circle_visible, grid_lines, with_alpha, world_to_screen,
};
use super::{SimContext, ViewState};

const LABEL_MIN_SCALE: f32 = 0.4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct EdgeSprite {
    pub from: Pos2,
    pub to: Pos2,
    pub color: Color32,
    pub width: f32,
    pub dashed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct NodeSprite {
    pub index: usize,
    pub center: Pos2,
    pub radius: f32,
    pub fill: Color32,
    pub outline: Option<Stroke>,
}

#[derive(Clone, Debug, PartialEq)]
pub(super) struct LabelSprite {
    pub pos: Pos2,
    pub text: String,
    pub strong: bool,
}

#[derive(Clone, Debug, Default)]
pub(super) struct Scene {
    pub grid: Vec<[Pos2; 2]>,
    pub edges: Vec<EdgeSprite>,
    pub nodes: Vec<NodeSprite>,
    pub labels: Vec<LabelSprite>,
}

pub(super) struct SceneInput<'a> {
    pub sim: &'a SimContext,
    pub view: ViewState,
    pub viewport: Rect,
    pub highlights: &'a Highlights,
    pub hovered: Option<usize>,
    pub selected: Option<usize>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Emphasis {
    focus: bool,
    path: bool,
    hovered: bool,
    selected: bool,
    connected: bool,
}

impl Emphasis {
    fn any(self) -> bool {
        self.focus || self.path || self.hovered || self.selected || self.connected
    }

    fn radius_factor(self) -> f32 {
        if self.focus {
            2.0
        } else if self.path {
            1.8
        } else if self.hovered || self.selected {
            1.6
        } else if self.connected {
            1.2
        } else {
            1.0
        }
    }
}

pub(super) fn build_scene(input: &SceneInput<'_>) -> Scene {
    let SceneInput {
        sim,
        view,
        viewport,
        highlights,
        hovered,
        selected,
    } = *input;
    let to_screen = |world| world_to_screen(viewport, view.pan, view.scale, world);

    let connected = hovered
        .map(|index| connected_to(sim, index))
        .unwrap_or_default();
    let hovered_id = hovered.and_then(|index| sim.nodes.get(index)).map(|node| node.id.as_str());

    let mut scene = Scene {
        grid: grid_lines(viewport, view.pan, view.scale),
        ..Scene::default()
    };

    for edge in &sim.edges {
        let (Some(&source), Some(&target)) = (
            sim.index_by_id.get(&edge.source),
            sim.index_by_id.get(&edge.target),
        ) else {
            continue;
        };

        let on_path = edge.is_path || highlights.edge_on_path(&edge.source, &edge.target);
        let touches_hover =
            hovered_id.is_some_and(|id| edge.source == id || edge.target == id);
        let dimmed = hovered.is_some() && !touches_hover && !on_path;

        let (mut color, mut width, dashed) = match edge.kind {
            EdgeKind::SpouseOf => (SPOUSE_EDGE, 1.5, true),
            EdgeKind::ParentOf => (PARENT_EDGE, 1.2, false),
        };
        if on_path {
            color = PATH_EDGE;
            width = 4.0;
        } else if touches_hover {
            width *= 1.8;
        }
        if dimmed {
            color = with_alpha(color, 0.15);
        }

        scene.edges.push(EdgeSprite {
            from: to_screen(sim.nodes[source].pos),
            to: to_screen(sim.nodes[target].pos),
            color,
            width: width * view.scale.sqrt().clamp(0.5, 1.5),
            dashed: dashed && !on_path,
        });
    }

    for (index, node) in sim.nodes.iter().enumerate() {
        let emphasis = Emphasis {
            focus: node.is_focus || highlights.is_focus(&node.id),
            path: node.is_path || highlights.on_path(&node.id),
            hovered: hovered == Some(index),
            selected: selected == Some(index),
            connected: connected.contains(&index),
        };
        let center = to_screen(node.pos);
        let radius = node.radius * emphasis.radius_factor() * view.scale;
        if !circle_visible(viewport, center, radius + 40.0) {
            continue;
        }

        let outline = if emphasis.focus {
            Some(Stroke::new(3.0, FOCUS_RING))
        } else if emphasis.path {
            Some(Stroke::new(2.5, PATH_EDGE))
        } else if emphasis.hovered || emphasis.selected {
            Some(Stroke::new(2.0, Color32::WHITE))
        } else {
            None
        };
        let fill = if hovered.is_some() && !emphasis.any() {
            with_alpha(node.color, 0.35)
        } else {
            node.color
        };

        scene.nodes.push(NodeSprite {
            index,
            center,
            radius,
            fill,
            outline,
        });

        if view.scale > LABEL_MIN_SCALE || emphasis.any() {
            scene.labels.push(LabelSprite {
                pos: center + vec2(0.0, radius + 4.0),
                text: first_word(&node.label).to_owned(),
                strong: emphasis.any(),
            });
        }
    }

    scene
}

pub(super) fn paint_scene(painter: &Painter, viewport: Rect, scene: &Scene) {
    painter.rect_filled(viewport, 0.0, BACKGROUND);
    for &segment in &scene.grid {
        painter.line_segment(segment, Stroke::new(1.0, GRID_LINE));
    }

    for edge in &scene.edges {
        let stroke = Stroke::new(edge.width, edge.color);
        if edge.dashed {
            painter.extend(Shape::dashed_line(&[edge.from, edge.to], stroke, 5.0, 4.0));
        } else {
            painter.line_segment([edge.from, edge.to], stroke);
        }
    }

    for node in &scene.nodes {
        painter.circle_filled(node.center, node.radius, node.fill);
        if let Some(outline) = node.outline {
            painter.circle_stroke(node.center, node.radius, outline);
        }
        let shine = node.center + vec2(-node.radius * 0.3, -node.radius * 0.3);
        painter.circle_filled(
            shine,
            node.radius * 0.35,
            with_alpha(blend_color(node.fill, Color32::WHITE, 0.7), 0.45),
        );
    }

    for label in &scene.labels {
        let (size, color) = if label.strong {
            (13.0, Color32::WHITE)
        } else {
            (11.0, Color32::from_rgb(203, 213, 225))
        };
        painter.text(
            label.pos,
            Align2::CENTER_TOP,
            &label.text,
            FontId::proportional(size),
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use eframe::egui::{Vec2, pos2};

    use super::*;
    use crate::app::test_support::{sim_edge, sim_node, sim_with};

    fn labelled(scene: &Scene) -> HashSet<String> {
        scene.labels.iter().map(|label| label.text.clone()).collect()
    }

    fn viewport() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0))
    }

    fn family_line() -> SimContext {
        sim_with(
            vec![
                sim_node("ann", "f", vec2(-60.0, 0.0)),
                sim_node("bob", "f", vec2(0.0, 0.0)),
                sim_node("cat", "g", vec2(60.0, 0.0)),
            ],
            vec![
                sim_edge("ann", "bob", EdgeKind::ParentOf),
                sim_edge("bob", "cat", EdgeKind::SpouseOf),
                sim_edge("cat", "hidden", EdgeKind::ParentOf),
            ],
        )
    }

    fn scene_for(
        sim: &SimContext,
        view: ViewState,
        highlights: &Highlights,
        hovered: Option<usize>,
    ) -> Scene {
        build_scene(&SceneInput {
            sim,
            view,
            viewport: viewport(),
            highlights,
            hovered,
            selected: None,
        })
    }

    #[test]
    fn edge_styles_follow_kind_and_skip_dangling() {
        let sim = family_line();
        let scene = scene_for(&sim, ViewState::default(), &Highlights::default(), None);

        assert_eq!(scene.edges.len(), 2);
        assert!(!scene.edges[0].dashed);
        assert_eq!(scene.edges[0].color, PARENT_EDGE);
        assert!(scene.edges[1].dashed);
        assert_eq!(scene.edges[1].color, SPOUSE_EDGE);
        assert_eq!(scene.nodes.len(), 3);
        assert!(!scene.grid.is_empty());
    }

    #[test]
    fn path_edges_are_green_and_thick() {
        let sim = family_line();
        let mut highlights = Highlights::default();
        highlights.set_path(vec!["ann".into(), "bob".into()]);
        let scene = scene_for(&sim, ViewState::default(), &highlights, None);

        assert_eq!(scene.edges[0].color, PATH_EDGE);
        assert!(scene.edges[0].width > scene.edges[1].width);
        assert!(scene.nodes[0].radius > scene.nodes[2].radius);
    }

    #[test]
    fn focus_center_is_largest() {
        let mut sim = family_line();
        sim.nodes[1].is_focus = true;
        let scene = scene_for(&sim, ViewState::default(), &Highlights::default(), None);
        let focus = scene.nodes[1].radius;
        assert!((focus - 2.0 * sim.nodes[1].radius).abs() < 1e-4);
        assert_eq!(scene.nodes[1].outline.map(|stroke| stroke.color), Some(FOCUS_RING));
    }

    #[test]
    fn hover_dims_unrelated_edges() {
        let sim = family_line();
        let scene = scene_for(&sim, ViewState::default(), &Highlights::default(), Some(0));

        assert_eq!(scene.edges[0].color, PARENT_EDGE);
        assert!(scene.edges[1].color.a() < SPOUSE_EDGE.a());
        assert!(scene.nodes[1].radius > scene.nodes[2].radius);
    }

    #[test]
    fn labels_hide_when_zoomed_out_except_emphasized() {
        let sim = family_line();
        let zoomed_out = ViewState {
            pan: Vec2::ZERO,
            scale: 0.3,
        };

        let scene = scene_for(&sim, zoomed_out, &Highlights::default(), None);
        assert!(scene.labels.is_empty());

        let scene = scene_for(&sim, zoomed_out, &Highlights::default(), Some(0));
        assert_eq!(labelled(&scene), HashSet::from(["ann".to_owned(), "bob".to_owned()]));

        let scene = scene_for(&sim, ViewState::default(), &Highlights::default(), None);
        assert_eq!(scene.labels.len(), 3);
    }

    #[test]
    fn empty_simulation_draws_only_the_grid() {
        let sim = sim_with(Vec::new(), Vec::new());
        let scene = scene_for(&sim, ViewState::default(), &Highlights::default(), None);
        assert!(scene.nodes.is_empty());
        assert!(scene.edges.is_empty());
        assert!(!scene.grid.is_empty());
    }
}
