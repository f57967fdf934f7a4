// 🗂️ Session - the one owner of "what is loaded and what is selected"
//
// Created at startup from a loaded store, replaced wholesale on reload.
// Selecting a scenario renders it from scratch and resets the view. A bad
// index changes nothing. A failed render leaves the canvas blank. Resizing
// keeps the user's pan and zoom.

use crate::config::RenderConfig;
use crate::error::SelectionError;
use crate::render::{render, Diagram};
use crate::scenario::{ScenarioOption, ScenarioRecord, ScenarioStore};
use crate::view::{ViewTransform, ViewTransition};
use chrono::{DateTime, Utc};
use std::time::Duration;

pub struct Session {
    store: ScenarioStore,
    config: RenderConfig,
    canvas_width: f64,
    loaded_at: DateTime<Utc>,
    selected: Option<usize>,
    diagram: Option<Diagram>,
    view: ViewTransform,
}

impl Session {
    pub fn new(store: ScenarioStore, config: RenderConfig, canvas_width: f64) -> Self {
        let view = ViewTransform::initial(canvas_width, &config);
        Session {
            store,
            config,
            canvas_width,
            loaded_at: Utc::now(),
            selected: None,
            diagram: None,
            view,
        }
    }

    /// Swap in a freshly loaded store; the old selection no longer applies
    pub fn reload(&mut self, store: ScenarioStore) {
        self.store = store;
        self.loaded_at = Utc::now();
        self.selected = None;
        self.diagram = None;
        self.view = ViewTransform::initial(self.canvas_width, &self.config);
    }

    // ========================================================================
    // SELECTION
    // ========================================================================

    /// Render scenario `index` and reset the view to the initial framing.
    ///
    /// Out-of-range indices are rejected without touching the current
    /// selection, diagram or raw view.
    pub fn select(&mut self, index: usize) -> Result<Option<&Diagram>, SelectionError> {
        let Some(scenario) = self.store.get(index) else {
            tracing::debug!(index, len = self.store.len(), "ignoring out-of-range selection");
            return Err(SelectionError::OutOfRange {
                index,
                len: self.store.len(),
            });
        };

        // Clear first: a failed render must not leave the previous tree behind
        self.diagram = None;
        self.selected = Some(index);
        self.view = ViewTransform::initial(self.canvas_width, &self.config);

        match render(scenario, &self.config, self.canvas_width) {
            Ok(diagram) => {
                tracing::info!(
                    index,
                    scenario = %scenario.scenario_name,
                    nodes = diagram.node_count,
                    "selected scenario"
                );
                self.diagram = Some(diagram);
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "render failed, canvas left blank");
            }
        }

        Ok(self.diagram.as_ref())
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&ScenarioRecord> {
        self.selected.and_then(|i| self.store.get(i))
    }

    /// Pretty-printed record of the selected scenario
    pub fn raw_json(&self) -> Option<String> {
        self.selected().map(ScenarioRecord::to_pretty_json)
    }

    pub fn diagram(&self) -> Option<&Diagram> {
        self.diagram.as_ref()
    }

    pub fn options(&self) -> Vec<ScenarioOption> {
        self.store.options()
    }

    pub fn store(&self) -> &ScenarioStore {
        &self.store
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    // ========================================================================
    // VIEW
    // ========================================================================

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn set_view(&mut self, view: ViewTransform) {
        self.view = ViewTransform {
            k: self.config.clamp_scale(view.k),
            ..view
        };
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.view = self.view.pan(dx, dy);
    }

    pub fn zoom(&mut self, factor: f64, focus: (f64, f64)) {
        self.view = self.view.zoom_at(factor, focus, &self.config);
    }

    pub fn initial_view(&self) -> ViewTransform {
        ViewTransform::initial(self.canvas_width, &self.config)
    }

    /// Animation back to the initial framing. The caller drives it; the
    /// session's view is already the target.
    pub fn reset_view(&mut self) -> ViewTransition {
        let from = self.view;
        self.view = self.initial_view();
        ViewTransition::new(
            from,
            self.view,
            Duration::from_millis(self.config.reset_duration_ms),
        )
    }

    pub fn canvas_width(&self) -> f64 {
        self.canvas_width
    }

    /// Track a new canvas width. Returns whether it changed.
    ///
    /// The drawn layout is kept; only the initial framing moves. The current
    /// pan and zoom survive, shifted by half the change so the diagram stays
    /// where it was relative to the canvas centre. A selection whose render
    /// failed is retried at the new width.
    pub fn resize(&mut self, canvas_width: f64) -> bool {
        if (canvas_width - self.canvas_width).abs() < f64::EPSILON {
            return false;
        }
        let dx = (canvas_width - self.canvas_width) / 2.0;
        self.canvas_width = canvas_width;
        let initial = self.initial_view();
        if let Some(diagram) = self.diagram.as_mut() {
            diagram.initial_view = initial;
            self.view = if dx.is_finite() {
                self.view.pan(dx, 0.0)
            } else {
                initial
            };
        } else if let Some(index) = self.selected {
            // Index came from the current store, so it is in range
            let _ = self.select(index);
        } else {
            self.view = initial;
        }
        true
    }
}
