use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use anyhow::{Context as _, Result};
use eframe::egui::{self, Color32, Context, Vec2};
use tracing::{debug, info, warn};

use crate::kinship::{
    DetailPolicy, EdgeKind, Family, FamilyId, FocusGraph, GraphFilter, GraphSnapshot,
    KinshipService, PathReport, PersonId, PersonView, Principal,
};
use crate::store::{SavedView, Snapshot, ViewStore};

mod actions;
mod frame;
mod graph;
mod highlight;
mod layout;
mod physics;
mod render;
mod render_utils;
mod requests;
mod ui;

use frame::FrameLoop;
use graph::InteractionController;
use highlight::Highlights;
use physics::{PhysicsScratch, SimulationConfig};
use requests::{Debounce, RequestSlot};

type Service = KinshipService<Snapshot>;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub snapshot_path: PathBuf,
    pub views_path: PathBuf,
    pub principal: Principal,
    pub policy: DetailPolicy,
}

pub struct KinlensApp {
    config: AppConfig,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Loaded, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct Loaded {
    service: Service,
    views: ViewStore,
    graph: GraphSnapshot,
    families: Vec<Family>,
    cities: Vec<String>,
    saved_views: Vec<SavedView>,
}

impl Loaded {
    fn fetch(config: &AppConfig) -> Result<Self> {
        let snapshot = Snapshot::load(&config.snapshot_path)?;
        info!(
            path = %config.snapshot_path.display(),
            people = snapshot.person_count(),
            edges = snapshot.edge_count(),
            "snapshot read"
        );
        let service = KinshipService::new(
            Arc::new(snapshot),
            config.principal.clone(),
            config.policy,
        );

        let graph = service
            .tree_graph(&GraphFilter::default())
            .context("failed to build the initial graph")?;
        let families = service.families().context("failed to list families")?;
        let cities = service.cities().context("failed to list cities")?;

        let views = ViewStore::new(config.views_path.clone());
        let saved_views = views.list(&config.principal).unwrap_or_else(|error| {
            warn!(path = %views.path().display(), %error, "saved views unavailable");
            Vec::new()
        });

        info!(
            visible = graph.nodes.len(),
            families = families.len(),
            saved_views = saved_views.len(),
            "graph loaded"
        );

        Ok(Self {
            service,
            views,
            graph,
            families,
            cities,
            saved_views,
        })
    }
}

struct ViewModel {
    service: Service,
    views: ViewStore,
    families: Vec<Family>,
    family_colors: HashMap<FamilyId, Color32>,
    cities: Vec<String>,
    saved_views: Vec<SavedView>,
    graph: GraphSnapshot,
    filter_family: Option<FamilyId>,
    filter_city: Option<String>,
    focus: FocusState,
    path: PathFinderState,
    palette: PaletteState,
    save_view: SaveViewState,
    highlights: Highlights,
    sim: SimContext,
    view: ViewState,
    controller: InteractionController,
    frames: FrameLoop,
    physics: SimulationConfig,
    requests: Requests,
    selected: Option<usize>,
    banner: Option<String>,
    graph_dirty: bool,
}

struct FocusState {
    graph: Option<FocusGraph>,
    depth: usize,
    include_ancestors: bool,
    include_descendants: bool,
    loading: Option<PersonId>,
}

impl FocusState {
    fn is_active(&self) -> bool {
        self.graph.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PathEnd {
    From,
    To,
}

#[derive(Default)]
struct PathFinderState {
    open: bool,
    from: Option<PersonView>,
    to: Option<PersonView>,
    picking: Option<PathEnd>,
    query: String,
    debounce: Debounce,
    candidates: Vec<PersonView>,
    report: Option<PathReport>,
}

#[derive(Default)]
struct PaletteState {
    open: bool,
    query: String,
    debounce: Debounce,
    results: Vec<PersonView>,
}

#[derive(Default)]
struct SaveViewState {
    open: bool,
    name: String,
    description: String,
    shared: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SearchTarget {
    Palette,
    PathFinder,
}

#[derive(Default)]
struct Requests {
    focus: RequestSlot<FocusGraph>,
    graph: RequestSlot<GraphSnapshot>,
    path: RequestSlot<PathReport>,
    palette_search: RequestSlot<Vec<PersonView>>,
    path_search: RequestSlot<Vec<PersonView>>,
}

impl Requests {
    fn cancel_all(&mut self) {
        self.focus.cancel();
        self.graph.cancel();
        self.path.cancel();
        self.palette_search.cancel();
        self.path_search.cancel();
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ViewState {
    pan: Vec2,
    scale: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl ViewState {
    const MIN_SCALE: f32 = 0.1;
    const MAX_SCALE: f32 = 4.0;
    const BUTTON_ZOOM: f32 = 1.3;

    fn zoom_by(&mut self, factor: f32) {
        self.scale = (self.scale * factor).clamp(Self::MIN_SCALE, Self::MAX_SCALE);
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn center_on(&mut self, world: Vec2) {
        self.pan = -world * self.scale;
    }
}

#[derive(Clone, Debug)]
struct SimNode {
    id: PersonId,
    label: String,
    family_id: FamilyId,
    family_name: String,
    city: Option<String>,
    can_edit: bool,
    color: Color32,
    pos: Vec2,
    velocity: Vec2,
    radius: f32,
    level: Option<usize>,
    is_focus: bool,
    is_path: bool,
}

impl SimNode {
    const RADIUS: f32 = 7.0;
}

#[derive(Clone, Debug)]
struct SimEdge {
    source: PersonId,
    target: PersonId,
    kind: EdgeKind,
    is_path: bool,
}

#[derive(Default)]
struct SimContext {
    nodes: Vec<SimNode>,
    edges: Vec<SimEdge>,
    index_by_id: HashMap<PersonId, usize>,
    alpha: f32,
    pinned: Option<usize>,
    scratch: PhysicsScratch,
}

impl SimContext {
    fn new(nodes: Vec<SimNode>, edges: Vec<SimEdge>) -> Self {
        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect();

        Self {
            nodes,
            edges,
            index_by_id,
            alpha: 1.0,
            pinned: None,
            scratch: PhysicsScratch::default(),
        }
    }

    fn reheat(&mut self) {
        self.alpha = 1.0;
    }

    fn bump(&mut self, alpha: f32) {
        self.alpha = self.alpha.max(alpha);
    }

    fn is_hot(&self, config: &SimulationConfig) -> bool {
        !self.nodes.is_empty() && self.alpha >= config.alpha_min
    }
}

impl KinlensApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let state = Self::start_load(config.clone());
        Self { config, state }
    }

    fn start_load(config: AppConfig) -> AppState {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = Loaded::fetch(&config).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        AppState::Loading { rx }
    }
}

impl eframe::App for KinlensApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(loaded) => AppState::Ready(Box::new(ViewModel::new(loaded))),
                        Err(error) => {
                            warn!(%error, "initial load failed");
                            AppState::Error(error)
                        }
                    });
                } else {
                    ctx.request_repaint_after(std::time::Duration::from_millis(50));
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading family graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the family graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.config.clone()));
                    }
                });
            }
            AppState::Ready(model) => model.show(ctx),
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}

impl Drop for ViewModel {
    fn drop(&mut self) {
        debug!(
            frames = self.frames.frames_run(),
            simulating = self.frames.is_running(),
            "closing graph view"
        );
        self.frames.cancel();
        self.requests.cancel_all();
    }
}

#[cfg(test)]
mod test_support {
    use std::path::Path;
    use std::sync::Arc;

    use eframe::egui::{Color32, Vec2};

    use super::{Loaded, SimContext, SimEdge, SimNode, ViewModel};
    use crate::kinship::{DetailPolicy, EdgeKind, GraphFilter, KinshipService, Principal};
    use crate::store::{Snapshot, ViewStore};

    pub(super) fn sim_node(id: &str, family: &str, pos: Vec2) -> SimNode {
        SimNode {
            id: id.to_owned(),
            label: format!("{id} Person"),
            family_id: family.to_owned(),
            family_name: format!("Family {family}"),
            city: None,
            can_edit: false,
            color: Color32::GRAY,
            pos,
            velocity: Vec2::ZERO,
            radius: SimNode::RADIUS,
            level: None,
            is_focus: false,
            is_path: false,
        }
    }

    pub(super) fn sim_edge(source: &str, target: &str, kind: EdgeKind) -> SimEdge {
        SimEdge {
            source: source.to_owned(),
            target: target.to_owned(),
            kind,
            is_path: false,
        }
    }

    pub(super) fn sim_with(nodes: Vec<SimNode>, edges: Vec<SimEdge>) -> SimContext {
        SimContext::new(nodes, edges)
    }

    pub(super) fn view_model(snapshot_json: &str, views_path: &Path) -> ViewModel {
        let principal = Principal {
            user_id: "tester".to_owned(),
            family_id: "f1".to_owned(),
        };
        let service = KinshipService::new(
            Arc::new(Snapshot::from_json(snapshot_json).unwrap()),
            principal,
            DetailPolicy::Full,
        );
        let graph = service.tree_graph(&GraphFilter::default()).unwrap();
        let families = service.families().unwrap();
        let cities = service.cities().unwrap();

        ViewModel::new(Loaded {
            service,
            views: ViewStore::new(views_path),
            graph,
            families,
            cities,
            saved_views: Vec::new(),
        })
    }
}
