use std::time::Instant;

use eframe::egui::Vec2;
use tracing::{debug, info, warn};

use crate::kinship::{FocusParams, GraphFilter, MAX_FOCUS_DEPTH, PersonId, PersonView};
use crate::store::{SavedView, ViewFilters};

use super::graph::GraphCommand;
use super::{PathEnd, SearchTarget, ViewModel};

const SEARCH_RESULTS: usize = 10;

impl ViewModel {
    pub(in crate::app) fn poll_requests(&mut self, now: Instant) {
        if let Some(result) = self.requests.focus.poll() {
            self.focus.loading = None;
            match result {
                Ok(graph) => {
                    info!(
                        person = %graph.focus_person,
                        depth = graph.depth,
                        nodes = graph.nodes.len(),
                        "entered focus mode"
                    );
                    self.highlights.set_focus(Some(graph.focus_person.clone()));
                    self.focus.graph = Some(graph);
                    self.selected = None;
                    self.graph_dirty = true;
                }
                Err(error) => self.report_error("Focus failed", error),
            }
        }

        if let Some(result) = self.requests.graph.poll() {
            match result {
                Ok(graph) => {
                    self.graph = graph;
                    self.graph_dirty = true;
                }
                Err(error) => self.report_error("Reload failed", error),
            }
        }

        if let Some(result) = self.requests.path.poll() {
            match result {
                Ok(report) => {
                    if report.found {
                        self.highlights.set_path(report.person_ids());
                    } else {
                        self.highlights.clear_path();
                    }
                    self.path.report = Some(report);
                    self.refresh_path_flags();
                }
                Err(error) => self.report_error("Path search failed", error),
            }
        }

        if let Some(result) = self.requests.palette_search.poll() {
            match result {
                Ok(people) => self.palette.results = people,
                Err(error) => self.report_error("Search failed", error),
            }
        }
        if let Some(result) = self.requests.path_search.poll() {
            match result {
                Ok(people) => self.path.candidates = people,
                Err(error) => self.report_error("Search failed", error),
            }
        }

        if let Some(query) = self.palette.debounce.poll(now) {
            self.spawn_search(SearchTarget::Palette, query);
        }
        if let Some(query) = self.path.debounce.poll(now) {
            self.spawn_search(SearchTarget::PathFinder, query);
        }
    }

    pub(in crate::app) fn has_pending_work(&self, now: Instant) -> bool {
        self.requests.focus.is_pending()
            || self.requests.graph.is_pending()
            || self.requests.path.is_pending()
            || self.requests.palette_search.is_pending()
            || self.requests.path_search.is_pending()
            || self.palette.debounce.time_left(now).is_some()
            || self.path.debounce.time_left(now).is_some()
    }

    fn report_error(&mut self, what: &str, error: String) {
        warn!(%error, "{what}");
        self.banner = Some(format!("{what}: {error}"));
    }

    fn spawn_search(&mut self, target: SearchTarget, query: String) {
        let service = self.service.clone();
        let job = move || {
            service
                .search_people(&query, Some(SEARCH_RESULTS))
                .map_err(|error| error.to_string())
        };
        match target {
            SearchTarget::Palette => self.requests.palette_search.spawn("palette search", job),
            SearchTarget::PathFinder => self.requests.path_search.spawn("path search", job),
        }
    }

    pub(in crate::app) fn schedule_search(&mut self, target: SearchTarget, now: Instant) {
        match target {
            SearchTarget::Palette => {
                let query = self.palette.query.trim().to_owned();
                self.palette.debounce.schedule(query, now);
            }
            SearchTarget::PathFinder => {
                let query = self.path.query.trim().to_owned();
                self.path.debounce.schedule(query, now);
            }
        }
    }

    pub(in crate::app) fn apply_command(&mut self, command: GraphCommand) {
        match command {
            GraphCommand::Select(index) => self.selected = index,
            GraphCommand::Focus(index) => {
                if let Some(node) = self.sim.nodes.get(index) {
                    let id = node.id.clone();
                    self.enter_focus(id);
                }
            }
            GraphCommand::TogglePalette => {
                self.palette.open = !self.palette.open;
            }
            GraphCommand::ClearHighlights => {
                if self.palette.open {
                    self.palette.open = false;
                } else {
                    self.clear_focus_and_path();
                }
            }
        }
    }

    pub(in crate::app) fn enter_focus(&mut self, person_id: PersonId) {
        let service = self.service.clone();
        let depth = self.focus.depth;
        let include_ancestors = self.focus.include_ancestors;
        let include_descendants = self.focus.include_descendants;
        debug!(person = %person_id, depth, "requesting focus neighborhood");

        self.focus.loading = Some(person_id.clone());
        self.requests.focus.spawn("focus", move || {
            service
                .focus_graph(FocusParams {
                    person_id: Some(&person_id),
                    depth: Some(depth),
                    include_ancestors: Some(include_ancestors),
                    include_descendants: Some(include_descendants),
                })
                .map_err(|error| error.to_string())
        });
    }

    pub(in crate::app) fn refocus(&mut self) {
        if let Some(person) = self.focus.graph.as_ref().map(|graph| graph.focus_person.clone()) {
            self.enter_focus(person);
        }
    }

    pub(in crate::app) fn exit_focus(&mut self) {
        self.requests.focus.cancel();
        self.focus.loading = None;
        if self.focus.graph.take().is_none() {
            return;
        }

        info!("left focus mode");
        self.highlights.set_focus(None);
        self.selected = None;
        self.graph_dirty = true;

        let service = self.service.clone();
        self.requests.graph.spawn("graph", move || {
            service
                .tree_graph(&GraphFilter::default())
                .map_err(|error| error.to_string())
        });
    }

    pub(in crate::app) fn clear_path(&mut self) {
        self.requests.path.cancel();
        self.highlights.clear_path();
        self.path.report = None;
        self.refresh_path_flags();
    }

    pub(in crate::app) fn clear_focus_and_path(&mut self) {
        self.clear_path();
        self.exit_focus();
    }

    pub(in crate::app) fn find_path(&mut self) {
        let (Some(from), Some(to)) = (&self.path.from, &self.path.to) else {
            return;
        };
        let from = from.id.clone();
        let to = to.id.clone();
        let service = self.service.clone();

        self.path.report = None;
        self.requests.path.spawn("path", move || {
            service
                .find_path(Some(&from), Some(&to))
                .map_err(|error| error.to_string())
        });
    }

    pub(in crate::app) fn set_path_end(&mut self, end: PathEnd, index: usize) {
        let Some(node) = self.sim.nodes.get(index) else {
            return;
        };
        let person = PersonView {
            id: node.id.clone(),
            name: node.label.clone(),
            family_id: node.family_id.clone(),
            family_name: node.family_name.clone(),
            city: node.city.clone(),
            can_edit: node.can_edit,
        };
        match end {
            PathEnd::From => self.path.from = Some(person),
            PathEnd::To => self.path.to = Some(person),
        }
        self.path.open = true;
    }

    pub(in crate::app) fn jump_to(&mut self, person_id: &str) {
        match self.sim.index_by_id.get(person_id).copied() {
            Some(index) => {
                self.selected = Some(index);
                self.view.center_on(self.sim.nodes[index].pos);
            }
            None => {
                self.banner = Some("That person is hidden by the current filters".to_owned());
            }
        }
    }

    pub(in crate::app) fn set_filters(&mut self, family: Option<String>, city: Option<String>) {
        if self.filter_family == family && self.filter_city == city {
            return;
        }
        debug!(?family, ?city, "filters changed");
        self.filter_family = family;
        self.filter_city = city;
        self.graph_dirty = true;
    }

    pub(in crate::app) fn recenter(&mut self) {
        if self.sim.nodes.is_empty() {
            self.view.pan = Vec2::ZERO;
            return;
        }
        let sum = self
            .sim
            .nodes
            .iter()
            .fold(Vec2::ZERO, |sum, node| sum + node.pos);
        self.view.center_on(sum / self.sim.nodes.len() as f32);
    }

    pub(in crate::app) fn current_filters(&self) -> ViewFilters {
        let focus = self.focus.graph.as_ref();
        ViewFilters {
            city: self.filter_city.clone(),
            family_id: self.filter_family.clone(),
            focus_person_id: focus.map(|graph| graph.focus_person.clone()),
            focus_depth: focus.map(|_| self.focus.depth),
            show_ancestors: focus.map(|_| self.focus.include_ancestors),
            show_descendants: focus.map(|_| self.focus.include_descendants),
        }
    }

    pub(in crate::app) fn apply_saved_view(&mut self, view: &SavedView) {
        info!(id = %view.id, name = %view.name, "applying saved view");
        let filters = &view.filters;
        self.set_filters(filters.family_id.clone(), filters.city.clone());

        match &filters.focus_person_id {
            Some(person) => {
                if let Some(depth) = filters.focus_depth {
                    self.focus.depth = depth.clamp(1, MAX_FOCUS_DEPTH);
                }
                self.focus.include_ancestors = filters.show_ancestors.unwrap_or(true);
                self.focus.include_descendants = filters.show_descendants.unwrap_or(true);
                self.enter_focus(person.clone());
            }
            None => self.exit_focus(),
        }
    }

    pub(in crate::app) fn save_current_view(&mut self) {
        let name = self.save_view.name.trim().to_owned();
        if name.is_empty() {
            self.banner = Some("A saved view needs a name".to_owned());
            return;
        }
        let description = Some(self.save_view.description.trim().to_owned())
            .filter(|description| !description.is_empty());

        let principal = self.service.principal();
        let saved = self
            .views
            .save(
                principal,
                &name,
                description,
                self.current_filters(),
                self.save_view.shared,
            )
            .and_then(|_| self.views.list(principal));
        match saved {
            Ok(views) => {
                self.saved_views = views;
                self.save_view = Default::default();
            }
            Err(error) => self.report_error("Saving the view failed", error.to_string()),
        }
    }

    pub(in crate::app) fn delete_saved_view(&mut self, id: &str) {
        let principal = self.service.principal();
        let result = self
            .views
            .delete(principal, id)
            .and_then(|()| self.views.list(principal));
        match result {
            Ok(views) => self.saved_views = views,
            Err(error) => self.report_error("Deleting the view failed", error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::app::test_support::view_model;

    const PEOPLE: &str = r#"{
        "families": [{"id": "f1", "name": "Lopez"}, {"id": "f2", "name": "Rossi"}],
        "people": [
            {"id": "p1", "first_name": "Maria", "last_name": "Lopez", "family_id": "f1"},
            {"id": "p2", "first_name": "Lola", "last_name": "Rossi", "family_id": "f2"}
        ],
        "edges": []
    }"#;

    fn settle(model: &mut ViewModel) {
        for _ in 0..200 {
            model.poll_requests(Instant::now());
            if !model.requests.palette_search.is_pending()
                && !model.requests.path_search.is_pending()
            {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn palette_and_path_finder_searches_run_side_by_side() {
        let dir = tempfile::tempdir().unwrap();
        let mut model = view_model(PEOPLE, &dir.path().join("views.json"));

        model.spawn_search(SearchTarget::Palette, "maria".to_owned());
        model.spawn_search(SearchTarget::PathFinder, "lola".to_owned());
        settle(&mut model);

        let palette = model.palette.results.iter().map(|p| p.id.as_str()).collect::<Vec<_>>();
        let path = model.path.candidates.iter().map(|p| p.id.as_str()).collect::<Vec<_>>();
        assert_eq!(palette, ["p1"]);
        assert_eq!(path, ["p2"]);
        assert!(model.banner.is_none());
    }

    #[test]
    fn newer_search_in_the_same_stream_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut model = view_model(PEOPLE, &dir.path().join("views.json"));

        model.spawn_search(SearchTarget::Palette, "maria".to_owned());
        model.spawn_search(SearchTarget::Palette, "lola".to_owned());
        settle(&mut model);

        let palette = model.palette.results.iter().map(|p| p.id.as_str()).collect::<Vec<_>>();
        assert_eq!(palette, ["p2"]);
    }
}
