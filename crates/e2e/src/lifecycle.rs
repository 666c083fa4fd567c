//! Scenario lifecycle and suite runner
//!
//! Each scenario gets its own browser session and walks a fixed rail:
//! provision, pre-clean, body, post-clean, teardown. The rail always
//! reaches its terminal state, so a failed body still has its profile
//! lists reconciled and its WebDriver session released.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use skillfolio_harness::cleanup::reconcile;
use skillfolio_harness::config::TestSettings;
use skillfolio_harness::error::HarnessResult;
use skillfolio_harness::pages::ListTab;
use skillfolio_harness::record::Ledger;
use skillfolio_harness::report::{FeatureId, ReportSink, StepKind};
use skillfolio_harness::screenshot;
use skillfolio_harness::session::Session;

use crate::context::ScenarioContext;
use crate::scenario::{Feature, Scenario};

/// Rail a scenario walks from provisioning to teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioState {
    NotStarted,
    SessionReady,
    BodyRunning,
    Passed,
    Failed,
    CleaningUp,
    SessionClosed,
}

impl std::fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScenarioState::NotStarted => "NotStarted",
            ScenarioState::SessionReady => "SessionReady",
            ScenarioState::BodyRunning => "BodyRunning",
            ScenarioState::Passed => "Passed",
            ScenarioState::Failed => "Failed",
            ScenarioState::CleaningUp => "CleaningUp",
            ScenarioState::SessionClosed => "SessionClosed",
        };
        f.write_str(s)
    }
}

fn advance(state: &mut ScenarioState, next: ScenarioState, title: &str) {
    debug!("{}: {} -> {}", title, state, next);
    *state = next;
}

/// Which profile lists a scenario touches, derived from its tags.
/// Both cleanup phases run once per scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupScope {
    Languages,
    Skills,
}

impl CleanupScope {
    /// Scopes for a tag set. Scenarios that touch no list get none.
    pub fn for_tags(tags: &[String]) -> Vec<CleanupScope> {
        let mut scopes = Vec::new();
        if tags.iter().any(|t| t == "languages") {
            scopes.push(CleanupScope::Languages);
        }
        if tags.iter().any(|t| t == "skills") {
            scopes.push(CleanupScope::Skills);
        }
        scopes
    }
}

impl std::fmt::Display for CleanupScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CleanupScope::Languages => f.write_str("languages"),
            CleanupScope::Skills => f.write_str("skills"),
        }
    }
}

fn list_for<'a>(cx: &'a ScenarioContext, scope: CleanupScope) -> &'a ListTab {
    match scope {
        CleanupScope::Languages => cx.languages.page(),
        CleanupScope::Skills => cx.skills.page(),
    }
}

fn ledger_for<'a>(cx: &'a ScenarioContext, scope: CleanupScope) -> &'a Mutex<Ledger> {
    match scope {
        CleanupScope::Languages => cx.languages.ledger(),
        CleanupScope::Skills => cx.skills.ledger(),
    }
}

/// Scenario selection from the command line. An empty filter selects
/// everything; both fields must match when set.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub tag: Option<String>,
    pub name: Option<String>,
}

impl Filter {
    pub fn matches(&self, scenario: &Scenario) -> bool {
        if let Some(tag) = &self.tag {
            if !scenario.has_tag(tag) {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if !scenario
                .title
                .to_lowercase()
                .contains(&name.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// Result of one scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps_run: usize,
    pub final_state: ScenarioState,
    pub error: Option<String>,
}

/// Result of running the whole suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

/// Drives scenarios through their lifecycle and into the report.
pub struct Runner {
    settings: Arc<TestSettings>,
    report: ReportSink,
}

impl Runner {
    pub fn new(settings: Arc<TestSettings>, report: ReportSink) -> Self {
        Runner { settings, report }
    }

    /// Run every scenario the filter selects, feature by feature.
    pub async fn run(&self, features: &[Feature], filter: &Filter) -> SuiteSummary {
        let started = Instant::now();
        let mut results = Vec::new();
        let mut total = 0;
        let mut passed = 0;
        let mut failed = 0;
        let mut skipped = 0;

        for feature in features {
            total += feature.scenarios.len();
            let selected: Vec<&Scenario> = feature
                .scenarios
                .iter()
                .filter(|s| filter.matches(s))
                .collect();
            skipped += feature.scenarios.len() - selected.len();
            if selected.is_empty() {
                debug!("Feature filtered out entirely: {}", feature.title);
                continue;
            }

            info!("Feature: {}", feature.title);
            let node = self.report.create_feature_node(&feature.title);
            for scenario in selected {
                let result = self.run_scenario(node, scenario).await;
                if result.success {
                    passed += 1;
                    info!("✓ {} ({} ms)", result.name, result.duration_ms);
                } else {
                    failed += 1;
                    error!(
                        "✗ {} - {}",
                        result.name,
                        result.error.as_deref().unwrap_or("unknown error")
                    );
                }
                results.push(result);
            }
        }

        let duration_ms = started.elapsed().as_millis() as u64;

        info!("");
        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            passed, failed, skipped, duration_ms
        );

        SuiteSummary {
            total,
            passed,
            failed,
            skipped,
            duration_ms,
            results,
        }
    }

    async fn run_scenario(&self, feature: FeatureId, scenario: &Scenario) -> ScenarioResult {
        let started = Instant::now();
        let mut state = ScenarioState::NotStarted;
        debug!("Running scenario: {}", scenario.title);
        let node = self
            .report
            .create_scenario_node(feature, &scenario.title, &scenario.tags);

        let session = match Session::start(&self.settings).await {
            Ok(session) => session,
            Err(e) => {
                // No session means nothing to clean and nothing to close,
                // but the rail still reports and reaches its terminal state.
                let step = self.report.create_step_node(
                    node,
                    StepKind::Given,
                    "a browser session is available",
                );
                self.report.fail(step, &e.to_string(), None);
                advance(&mut state, ScenarioState::Failed, &scenario.title);
                advance(&mut state, ScenarioState::CleaningUp, &scenario.title);
                advance(&mut state, ScenarioState::SessionClosed, &scenario.title);
                return ScenarioResult {
                    name: scenario.title.clone(),
                    success: false,
                    duration_ms: started.elapsed().as_millis() as u64,
                    steps_run: 0,
                    final_state: state,
                    error: Some(e.to_string()),
                };
            }
        };
        advance(&mut state, ScenarioState::SessionReady, &scenario.title);

        let cx = ScenarioContext::new(&self.settings, session);
        let scopes = CleanupScope::for_tags(&scenario.tags);
        for scope in &scopes {
            self.pre_clean(&cx, *scope).await;
        }

        advance(&mut state, ScenarioState::BodyRunning, &scenario.title);
        let mut steps_run = 0;
        let mut failure: Option<String> = None;
        for step in &scenario.steps {
            let outcome = (step.run)(&cx).await;
            steps_run += 1;
            let sid = self.report.create_step_node(node, step.kind, &step.text);
            for source in cx.log_sources() {
                for line in source.take_logs() {
                    self.report.info(sid, &line);
                }
            }
            match outcome {
                Ok(()) => self.report.pass(sid),
                Err(e) => {
                    let shot = self.capture_failure(&cx, &step.text).await;
                    self.report.fail(sid, &e.to_string(), shot.as_deref());
                    failure = Some(format!("{} {}: {}", step.kind, step.text, e));
                    break;
                }
            }
        }
        let body_state = if failure.is_none() {
            ScenarioState::Passed
        } else {
            ScenarioState::Failed
        };
        advance(&mut state, body_state, &scenario.title);

        advance(&mut state, ScenarioState::CleaningUp, &scenario.title);
        for scope in &scopes {
            self.post_clean(&cx, *scope).await;
        }
        cx.into_session().end().await;
        advance(&mut state, ScenarioState::SessionClosed, &scenario.title);

        ScenarioResult {
            name: scenario.title.clone(),
            success: failure.is_none(),
            duration_ms: started.elapsed().as_millis() as u64,
            steps_run,
            final_state: state,
            error: failure,
        }
    }

    /// Best-effort wipe before the body, so counting assertions start
    /// from an empty list. Failures here are logged and the scenario
    /// proceeds.
    async fn pre_clean(&self, cx: &ScenarioContext, scope: CleanupScope) {
        info!("[PRE-CLEAN] Wiping the {} list", scope);
        if let Err(e) = cx.auth.login_as_default_user().await {
            warn!(
                "[PRE-CLEAN] Sign-in failed, leaving the {} list as-is: {}",
                scope, e
            );
            return;
        }
        let list = list_for(cx, scope);
        if let Err(e) = list.open().await {
            warn!("[PRE-CLEAN] Could not open the {} tab: {}", scope, e);
            return;
        }
        match list.delete_all().await {
            Ok(0) => debug!("[PRE-CLEAN] The {} list was already empty", scope),
            Ok(n) => info!("[PRE-CLEAN] Removed {} leftover {} row(s)", n, scope),
            Err(e) => warn!("[PRE-CLEAN] Wipe of the {} list failed: {}", scope, e),
        }
    }

    /// Reconcile a list after the body: tracked entries first, then the
    /// fallback wipe when the tracked pass was imperfect.
    async fn post_clean(&self, cx: &ScenarioContext, scope: CleanupScope) {
        // Snapshot so no lock is held across the awaits below.
        let tracked = ledger_for(cx, scope).lock().clone();
        info!(
            "[POST-CLEAN] Reconciling the {} list ({} tracked row(s))",
            scope,
            tracked.len()
        );
        if let Err(e) = cx.auth.login_as_default_user().await {
            warn!(
                "[POST-CLEAN] Sign-in failed before reconciling the {} list: {}",
                scope, e
            );
        }
        let list = list_for(cx, scope);
        if let Err(e) = list.open().await {
            warn!("[POST-CLEAN] Could not open the {} tab: {}", scope, e);
        }
        reconcile(list, Some(&tracked)).await;
    }

    /// Screenshot of the failed step, saved under the report directory.
    async fn capture_failure(&self, cx: &ScenarioContext, step_text: &str) -> Option<PathBuf> {
        match cx.session().screenshot().await {
            Ok(png) => match screenshot::save(self.report.screenshot_dir(), step_text, &png) {
                Ok(path) => {
                    info!("Failure screenshot: {}", path.display());
                    Some(path)
                }
                Err(e) => {
                    warn!("Could not write the failure screenshot: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("Screenshot capture failed: {}", e);
                None
            }
        }
    }

    /// Write the suite summary to JSON beside the HTML report.
    pub fn write_summary(&self, summary: &SuiteSummary) -> HarnessResult<PathBuf> {
        std::fs::create_dir_all(self.report.report_dir())?;
        let path = self.report.report_dir().join("test-results.json");
        std::fs::write(&path, serde_json::to_string_pretty(summary)?)?;
        info!("Results written to: {}", path.display());
        Ok(path)
    }
}
