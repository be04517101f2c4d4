use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Pos2, Vec2};

use crate::model::{
    CompanyId, Dataset, Directionality, MapId, RelationKind, RelationshipId, Sentiment,
    StakeholderId,
};
use crate::store::{MapStore, StoreError};

mod cluster;
mod export;
mod graph;
mod layout_store;
mod materialize;
mod render_utils;
mod style;
mod ui;

use self::layout_store::LayoutStore;
use self::materialize::{MaterializeOptions, RenderGraph};

pub struct RelMapApp {
    store: Arc<dyn MapStore>,
    map_id: MapId,
    export_dir: PathBuf,
    state: AppState,
    reload_rx: Option<Receiver<Result<Dataset, String>>>,
    jobs_tx: Sender<JobOutcome>,
    jobs_rx: Receiver<JobOutcome>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Dataset, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

/// What the app should do once a persistence job reports back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum JobEffect {
    None,
    Reload,
}

struct JobOutcome {
    label: String,
    result: Result<JobEffect, String>,
}

/// Handle the view model uses to push store mutations onto worker threads.
/// Jobs are independent and may complete out of order; every write is keyed
/// per entity, so there is no cross-entry race to guard against.
#[derive(Clone)]
struct JobRunner {
    store: Arc<dyn MapStore>,
    tx: Sender<JobOutcome>,
}

impl JobRunner {
    fn submit(
        &self,
        label: impl Into<String>,
        effect: JobEffect,
        job: impl FnOnce(&dyn MapStore) -> Result<(), StoreError> + Send + 'static,
    ) {
        let label = label.into();
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = job(store.as_ref())
                .map(|_| effect)
                .map_err(|error| error.to_string());
            let _ = tx.send(JobOutcome { label, result });
        });
    }
}

struct ViewModel {
    dataset: Dataset,
    layout: LayoutStore,
    jobs: JobRunner,
    options: MaterializeOptions,
    search: String,
    company_filter: Option<CompanyId>,
    sentiment_filter: Option<Sentiment>,
    show_hulls: bool,
    selected: Option<StakeholderId>,
    focus_active: bool,
    context_menu: Option<ContextMenu>,
    drag: Option<DragState>,
    form: RelationshipForm,
    notice: Option<Notice>,
    pan: Vec2,
    zoom: f32,
    graph_dirty: bool,
    graph_cache: Option<RenderGraph>,
    visible_node_count: usize,
    visible_edge_count: usize,
}

struct ContextMenu {
    target: MenuTarget,
    position: Pos2,
}

#[derive(Clone, Debug, PartialEq)]
enum MenuTarget {
    Node(StakeholderId),
    Edge(RelationshipId),
}

struct DragState {
    id: StakeholderId,
    index: usize,
    moved: bool,
}

struct Notice {
    text: String,
    is_error: bool,
}

struct RelationshipForm {
    editing: Option<RelationshipId>,
    from: Option<StakeholderId>,
    to: Option<StakeholderId>,
    kind: RelationKind,
    strength: u8,
    directionality: Directionality,
    notes: String,
    error: Option<String>,
}

impl Default for RelationshipForm {
    fn default() -> Self {
        Self {
            editing: None,
            from: None,
            to: None,
            kind: RelationKind::CollaboratesWith,
            strength: crate::model::DEFAULT_STRENGTH,
            directionality: Directionality::Directional,
            notes: String::new(),
            error: None,
        }
    }
}

impl RelMapApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        store: Arc<dyn MapStore>,
        map_id: MapId,
        export_dir: PathBuf,
    ) -> Self {
        let (jobs_tx, jobs_rx) = mpsc::channel();
        let state = AppState::Loading {
            rx: Self::spawn_load(Arc::clone(&store), map_id.clone()),
        };
        Self {
            store,
            map_id,
            export_dir,
            state,
            reload_rx: None,
            jobs_tx,
            jobs_rx,
        }
    }

    fn spawn_load(
        store: Arc<dyn MapStore>,
        map_id: MapId,
    ) -> Receiver<Result<Dataset, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = store
                .load_dataset(&map_id)
                .map_err(|error| error.to_string());
            let _ = tx.send(result);
        });

        rx
    }

    fn drain_job_outcomes(&mut self) -> bool {
        let mut reload_needed = false;
        for outcome in self.jobs_rx.try_iter().collect::<Vec<_>>() {
            match outcome.result {
                Ok(effect) => {
                    tracing::debug!(job = %outcome.label, "persistence job finished");
                    if effect == JobEffect::Reload {
                        reload_needed = true;
                    }
                }
                Err(error) => {
                    // Optimistic local state is deliberately left in place;
                    // the next full reload reconciles any divergence.
                    tracing::warn!(job = %outcome.label, %error, "persistence job failed");
                    if let AppState::Ready(model) = &mut self.state {
                        model.set_notice(format!("{} failed: {error}", outcome.label), true);
                    }
                }
            }
        }
        reload_needed
    }
}

impl eframe::App for RelMapApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut reload_requested = self.drain_job_outcomes();

        if let Some(result) = export::poll_snapshot(ctx, &self.export_dir) {
            match result {
                Ok(path) => {
                    if let AppState::Ready(model) = &mut self.state {
                        model.set_notice(format!("Snapshot saved to {}", path.display()), false);
                    }
                }
                Err(error) => {
                    tracing::warn!(%error, "snapshot export failed");
                    if let AppState::Ready(model) = &mut self.state {
                        model.set_notice(format!("Snapshot failed: {error:#}"), true);
                    }
                }
            }
        }

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(dataset) => {
                            let jobs = JobRunner {
                                store: Arc::clone(&self.store),
                                tx: self.jobs_tx.clone(),
                            };
                            AppState::Ready(Box::new(ViewModel::new(dataset, jobs)))
                        }
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading relationship map...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the relationship map");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(AppState::Loading {
                            rx: Self::spawn_load(Arc::clone(&self.store), self.map_id.clone()),
                        });
                    }
                });
            }
            AppState::Ready(model) => {
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.export_dir, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(
                        Arc::clone(&self.store),
                        self.map_id.clone(),
                    ));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(dataset)) => {
                            model.replace_dataset(dataset);
                        }
                        Ok(Err(error)) => {
                            transition = Some(AppState::Error(error));
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(
                                "Background load worker disconnected".to_owned(),
                            ));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
