use eframe::egui::{self, RichText, Ui};

use crate::kinship::EdgeKind;

use super::super::{PathEnd, SimContext, ViewModel};

const MAX_CONNECTIONS: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum Connection {
    Spouse,
    Child,
    Parent,
}

impl Connection {
    fn label(self) -> &'static str {
        match self {
            Self::Spouse => "Spouse",
            Self::Child => "Child",
            Self::Parent => "Parent",
        }
    }
}

pub(in crate::app) fn connections(
    sim: &SimContext,
    index: usize,
    limit: usize,
) -> Vec<(usize, Connection)> {
    let Some(node) = sim.nodes.get(index) else {
        return Vec::new();
    };

    sim.edges
        .iter()
        .filter_map(|edge| {
            let (other, connection) = match edge.kind {
                EdgeKind::SpouseOf if edge.source == node.id => (&edge.target, Connection::Spouse),
                EdgeKind::SpouseOf if edge.target == node.id => (&edge.source, Connection::Spouse),
                EdgeKind::ParentOf if edge.source == node.id => (&edge.target, Connection::Child),
                EdgeKind::ParentOf if edge.target == node.id => (&edge.source, Connection::Parent),
                _ => return None,
            };
            sim.index_by_id
                .get(other)
                .map(|&other| (other, connection))
        })
        .take(limit)
        .collect()
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Details");
        ui.separator();

        let Some(index) = self.selected.filter(|&index| index < self.sim.nodes.len()) else {
            ui.label(RichText::new("Click a person to see their details.").weak());
            return;
        };

        let node = &self.sim.nodes[index];
        ui.label(RichText::new(&node.label).strong().size(18.0));
        ui.label(format!("Family: {}", node.family_name));
        match &node.city {
            Some(city) => ui.label(format!("City: {city}")),
            None => ui.label(RichText::new("City unknown").weak()),
        };
        if let Some(level) = node.level {
            ui.label(format!("Steps from focus: {level}"));
        }
        if node.can_edit {
            ui.label(RichText::new("Your family").italics());
        }
        let node_id = node.id.clone();

        ui.add_space(6.0);
        ui.horizontal_wrapped(|ui| {
            if ui.button("Focus").clicked() {
                self.enter_focus(node_id.clone());
            }
            if ui.button("Path from here").clicked() {
                self.set_path_end(PathEnd::From, index);
            }
            if ui.button("Path to here").clicked() {
                self.set_path_end(PathEnd::To, index);
            }
        });

        ui.add_space(8.0);
        ui.label(RichText::new("Connections").strong());
        let related = connections(&self.sim, index, MAX_CONNECTIONS);
        if related.is_empty() {
            ui.label(RichText::new("No visible connections.").weak());
            return;
        }

        let mut jump = None;
        egui::Grid::new("connections")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                for (other, connection) in related {
                    let other = &self.sim.nodes[other];
                    ui.label(connection.label());
                    if ui.link(other.label.as_str()).clicked() {
                        jump = Some(other.id.clone());
                    }
                    ui.end_row();
                }
            });

        if let Some(id) = jump {
            self.jump_to(&id);
        }
    }
}
