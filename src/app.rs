use eframe::egui::{self, ScrollArea, Ui};

use crate::config::DashboardConfig;
use crate::data::source::{DiskCache, LoadManager};
use crate::state::AppState;
use crate::ui::{charts, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CovidExplorerApp {
    pub state: AppState,
    loader: LoadManager,
}

impl CovidExplorerApp {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            state: AppState::new(config),
            loader: LoadManager::default(),
        }
    }

    /// Start a queued load and collect a finished one.
    fn drive_loader(&mut self, ctx: &egui::Context) {
        if let Some(request) = self.state.pending_load.take() {
            let cache = self
                .state
                .config
                .cache_dir
                .as_ref()
                .map(|dir| DiskCache::new(dir, self.state.config.cache_max_age));
            let repaint = ctx.clone();
            self.loader
                .start(request.source, cache, request.force_refresh, move || {
                    repaint.request_repaint()
                });
            self.state.loading = self.loader.is_loading();
        }

        match self.loader.poll() {
            Some(Ok(loaded)) => self.state.set_dataset(loaded),
            Some(Err(e)) => {
                log::error!("Failed to load data: {e:#}");
                self.state.status_message = Some(format!("Error: {e:#}"));
                self.state.loading = false;
            }
            None => {}
        }
    }
}

impl eframe::App for CovidExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drive_loader(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: dashboard ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| dashboard(ui, &mut self.state));
        });
    }
}

/// All dashboard sections, top to bottom.
fn dashboard(ui: &mut Ui, state: &mut AppState) {
    ui.heading(egui::RichText::new("🌍 COVID-19 EDA Dashboard").size(26.0));

    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            if state.loading {
                ui.spinner();
            } else {
                ui.heading("Load data to start  (File → Open CSV… or Reload)");
            }
        });
        return;
    }

    ui.heading(format!("Data for {}", state.country));
    table::preview(ui, &state.view.rows);
    ui.heading(format!(
        "Showing data from {} to {}",
        state.range.start, state.range.end
    ));

    let sections: [fn(&mut Ui, &AppState); 3] = [
        charts::confirmed_over_time,
        charts::daily_histogram,
        charts::correlation_heatmap,
    ];
    for section in sections {
        ui.separator();
        section(ui, state);
    }

    ui.separator();
    charts::time_series_with_range_selector(ui, state);

    let sections: [fn(&mut Ui, &AppState); 6] = [
        charts::global_map,
        charts::comparison,
        charts::top_countries,
        charts::moving_average,
        charts::growth_rate,
        charts::daily_vs_growth_scatter,
    ];
    for section in sections {
        ui.separator();
        section(ui, state);
    }
}
