//! HTML report sink
//!
//! One report document accumulates nodes from potentially many scenario
//! threads, so every node operation takes the same lock. Text is escaped
//! here, at the sink boundary, never upstream; screenshot attachments are
//! stored relative to the report directory so the output folder can be
//! moved or archived wholesale.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::Serialize;

use crate::config::ReportSettings;
use crate::error::HarnessResult;
use crate::screenshot;
use crate::text;

/// BDD step keyword, also used to label report nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepKind {
    Given,
    When,
    Then,
    And,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepKind::Given => "Given",
            StepKind::When => "When",
            StepKind::Then => "Then",
            StepKind::And => "And",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Passed,
    Failed,
}

#[derive(Debug, Clone, Copy)]
pub struct FeatureId(usize);

#[derive(Debug, Clone, Copy)]
pub struct ScenarioId {
    feature: usize,
    scenario: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct StepId {
    feature: usize,
    scenario: usize,
    step: usize,
}

#[derive(Debug, Serialize)]
struct StepNode {
    kind: StepKind,
    text: String,
    status: StepStatus,
    logs: Vec<String>,
    error: Option<String>,
    screenshot: Option<String>,
}

#[derive(Debug, Serialize)]
struct ScenarioNode {
    title: String,
    tags: Vec<String>,
    steps: Vec<StepNode>,
}

#[derive(Debug, Serialize)]
struct FeatureNode {
    title: String,
    scenarios: Vec<ScenarioNode>,
}

#[derive(Debug, Serialize)]
struct Document {
    title: String,
    started: DateTime<Local>,
    system_info: Vec<(String, String)>,
    features: Vec<FeatureNode>,
}

/// Shared handle to the report document. Clones refer to the same report.
#[derive(Clone)]
pub struct ReportSink {
    doc: Arc<Mutex<Document>>,
    html_path: PathBuf,
    report_dir: PathBuf,
    screenshot_dir: PathBuf,
}

impl ReportSink {
    pub fn new(title: &str, report: &ReportSettings) -> Self {
        ReportSink {
            doc: Arc::new(Mutex::new(Document {
                title: title.to_string(),
                started: Local::now(),
                system_info: Vec::new(),
                features: Vec::new(),
            })),
            html_path: report.path.clone(),
            report_dir: report.report_dir(),
            screenshot_dir: report.screenshot_dir(),
        }
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    pub fn screenshot_dir(&self) -> &Path {
        &self.screenshot_dir
    }

    /// Key/value row rendered in the report header (environment, browser).
    pub fn add_system_info(&self, key: &str, value: &str) {
        let mut doc = self.doc.lock();
        doc.system_info.push((key.to_string(), value.to_string()));
    }

    pub fn create_feature_node(&self, title: &str) -> FeatureId {
        let mut doc = self.doc.lock();
        doc.features.push(FeatureNode {
            title: title.to_string(),
            scenarios: Vec::new(),
        });
        FeatureId(doc.features.len() - 1)
    }

    pub fn create_scenario_node(&self, parent: FeatureId, title: &str, tags: &[String]) -> ScenarioId {
        let mut doc = self.doc.lock();
        let feature = &mut doc.features[parent.0];
        feature.scenarios.push(ScenarioNode {
            title: title.to_string(),
            tags: tags.to_vec(),
            steps: Vec::new(),
        });
        ScenarioId {
            feature: parent.0,
            scenario: feature.scenarios.len() - 1,
        }
    }

    pub fn create_step_node(&self, parent: ScenarioId, kind: StepKind, text: &str) -> StepId {
        let mut doc = self.doc.lock();
        let scenario = &mut doc.features[parent.feature].scenarios[parent.scenario];
        scenario.steps.push(StepNode {
            kind,
            text: text.to_string(),
            status: StepStatus::Pending,
            logs: Vec::new(),
            error: None,
            screenshot: None,
        });
        StepId {
            feature: parent.feature,
            scenario: parent.scenario,
            step: scenario.steps.len() - 1,
        }
    }

    pub fn info(&self, step: StepId, message: &str) {
        let mut doc = self.doc.lock();
        self.step_mut(&mut doc, step).logs.push(message.to_string());
    }

    pub fn pass(&self, step: StepId) {
        let mut doc = self.doc.lock();
        self.step_mut(&mut doc, step).status = StepStatus::Passed;
    }

    /// Mark a step failed, with the error text and an optional screenshot.
    /// The attachment path is re-expressed relative to the report directory.
    pub fn fail(&self, step: StepId, error: &str, attachment: Option<&Path>) {
        let rel = attachment
            .map(|p| screenshot::relative_to(p, &self.report_dir))
            .map(|p| p.to_string_lossy().into_owned());
        let mut doc = self.doc.lock();
        let node = self.step_mut(&mut doc, step);
        node.status = StepStatus::Failed;
        node.error = Some(error.to_string());
        node.screenshot = rel;
    }

    fn step_mut<'a>(&self, doc: &'a mut Document, id: StepId) -> &'a mut StepNode {
        // Ids are only minted by this sink, so the indexes are live.
        &mut doc.features[id.feature].scenarios[id.scenario].steps[id.step]
    }

    /// Render the HTML document and a JSON twin beside it.
    pub fn flush(&self) -> HarnessResult<PathBuf> {
        std::fs::create_dir_all(&self.report_dir)?;
        let doc = self.doc.lock();
        std::fs::write(&self.html_path, render_html(&doc))?;
        let json_path = self.html_path.with_extension("json");
        std::fs::write(&json_path, serde_json::to_string_pretty(&*doc)?)?;
        Ok(self.html_path.clone())
    }
}

fn render_html(doc: &Document) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", text::escape(&doc.title)));
    html.push_str(concat!(
        "<style>\n",
        "body { font-family: sans-serif; margin: 2em; color: #222; }\n",
        "h1 { border-bottom: 2px solid #444; padding-bottom: 4px; }\n",
        "table.sysinfo td { padding: 2px 12px 2px 0; color: #555; }\n",
        "article { border: 1px solid #ddd; border-radius: 4px; margin: 1em 0; padding: 0.5em 1em; }\n",
        ".tag { background: #eef; border-radius: 3px; padding: 1px 6px; margin-left: 6px; font-size: 0.8em; }\n",
        "li.step { list-style: none; margin: 4px 0; }\n",
        "li.passed::before { content: \"\\2713 \"; color: #2a7; }\n",
        "li.failed::before { content: \"\\2717 \"; color: #c33; }\n",
        "li.pending::before { content: \"\\2022 \"; color: #999; }\n",
        "ul.logs li { color: #667; font-size: 0.9em; list-style: circle; }\n",
        "pre.error { background: #fee; padding: 8px; white-space: pre-wrap; }\n",
        "img.shot { max-width: 480px; display: block; margin: 6px 0; border: 1px solid #ccc; }\n",
        "</style>\n</head>\n<body>\n"
    ));

    html.push_str(&format!("<h1>{}</h1>\n", text::escape(&doc.title)));
    html.push_str("<table class=\"sysinfo\">\n");
    html.push_str(&format!(
        "<tr><td>Started</td><td>{}</td></tr>\n",
        doc.started.format("%Y-%m-%d %H:%M:%S")
    ));
    for (key, value) in &doc.system_info {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            text::escape(key),
            text::escape(value)
        ));
    }
    html.push_str("</table>\n");

    for feature in &doc.features {
        html.push_str(&format!("<section>\n<h2>{}</h2>\n", text::escape(&feature.title)));
        for scenario in &feature.scenarios {
            html.push_str(&format!("<article>\n<h3>{}", text::escape(&scenario.title)));
            for tag in &scenario.tags {
                html.push_str(&format!("<span class=\"tag\">{}</span>", text::escape(tag)));
            }
            html.push_str("</h3>\n<ul>\n");
            for step in &scenario.steps {
                let class = match step.status {
                    StepStatus::Passed => "passed",
                    StepStatus::Failed => "failed",
                    StepStatus::Pending => "pending",
                };
                html.push_str(&format!(
                    "<li class=\"step {}\"><b>{}</b> {}\n",
                    class,
                    step.kind,
                    text::escape(&step.text)
                ));
                if !step.logs.is_empty() {
                    html.push_str("<ul class=\"logs\">\n");
                    for log in &step.logs {
                        html.push_str(&format!("<li>{}</li>\n", text::escape(log)));
                    }
                    html.push_str("</ul>\n");
                }
                if let Some(error) = &step.error {
                    html.push_str(&format!("<pre class=\"error\">{}</pre>\n", text::escape(error)));
                }
                if let Some(shot) = &step.screenshot {
                    let href = text::escape(shot);
                    html.push_str(&format!(
                        "<a href=\"{href}\"><img class=\"shot\" src=\"{href}\" alt=\"failure screenshot\"></a>\n"
                    ));
                }
                html.push_str("</li>\n");
            }
            html.push_str("</ul>\n</article>\n");
        }
        html.push_str("</section>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}
