//! Scenario definitions
//!
//! A scenario is an ordered list of named steps, each a boxed async
//! closure over the per-scenario context. The builder keeps definitions
//! close to the Gherkin register the flows were written in, while the
//! closures stay plain Rust calls into the step bindings.

use std::fmt;

use futures::future::BoxFuture;

use skillfolio_harness::error::HarnessResult;
use skillfolio_harness::report::StepKind;

use crate::context::ScenarioContext;

pub type StepFn =
    Box<dyn for<'a> Fn(&'a ScenarioContext) -> BoxFuture<'a, HarnessResult<()>> + Send + Sync>;

pub struct Step {
    pub kind: StepKind,
    pub text: String,
    pub(crate) run: StepFn,
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("kind", &self.kind)
            .field("text", &self.text)
            .field("run", &"<closure>")
            .finish()
    }
}

#[derive(Debug)]
pub struct Scenario {
    pub title: String,
    pub tags: Vec<String>,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn new(title: impl Into<String>) -> Self {
        Scenario {
            title: title.into(),
            tags: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn given<F>(self, text: &str, f: F) -> Self
    where
        F: for<'a> Fn(&'a ScenarioContext) -> BoxFuture<'a, HarnessResult<()>>
            + Send
            + Sync
            + 'static,
    {
        self.step(StepKind::Given, text, f)
    }

    pub fn when<F>(self, text: &str, f: F) -> Self
    where
        F: for<'a> Fn(&'a ScenarioContext) -> BoxFuture<'a, HarnessResult<()>>
            + Send
            + Sync
            + 'static,
    {
        self.step(StepKind::When, text, f)
    }

    pub fn then<F>(self, text: &str, f: F) -> Self
    where
        F: for<'a> Fn(&'a ScenarioContext) -> BoxFuture<'a, HarnessResult<()>>
            + Send
            + Sync
            + 'static,
    {
        self.step(StepKind::Then, text, f)
    }

    pub fn and<F>(self, text: &str, f: F) -> Self
    where
        F: for<'a> Fn(&'a ScenarioContext) -> BoxFuture<'a, HarnessResult<()>>
            + Send
            + Sync
            + 'static,
    {
        self.step(StepKind::And, text, f)
    }

    fn step<F>(mut self, kind: StepKind, text: &str, f: F) -> Self
    where
        F: for<'a> Fn(&'a ScenarioContext) -> BoxFuture<'a, HarnessResult<()>>
            + Send
            + Sync
            + 'static,
    {
        self.steps.push(Step {
            kind,
            text: text.to_string(),
            run: Box::new(f),
        });
        self
    }
}

/// A titled group of scenarios, rendered as one report section.
#[derive(Debug, Default)]
pub struct Feature {
    pub title: String,
    pub scenarios: Vec<Scenario>,
}

impl Feature {
    pub fn new(title: impl Into<String>) -> Self {
        Feature {
            title: title.into(),
            scenarios: Vec::new(),
        }
    }

    pub fn scenario(mut self, scenario: Scenario) -> Self {
        self.scenarios.push(scenario);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillfolio_harness::error::HarnessError;

    fn noop(_cx: &ScenarioContext) -> BoxFuture<'_, HarnessResult<()>> {
        Box::pin(async { Ok::<(), HarnessError>(()) })
    }

    #[test]
    fn builder_preserves_declared_step_order() {
        let scenario = Scenario::new("Add a language")
            .tag("languages")
            .given("I am logged in as the default user", noop)
            .when("I add a language \"French\" with level \"Intermediate\"", noop)
            .then("I should see a success toast", noop)
            .and("the language \"French\" with level \"Intermediate\" should exist", noop);

        assert_eq!(scenario.title, "Add a language");
        assert!(scenario.has_tag("languages"));
        assert!(!scenario.has_tag("skills"));

        let shape: Vec<_> = scenario
            .steps
            .iter()
            .map(|s| (s.kind, s.text.as_str()))
            .collect();
        assert_eq!(
            shape,
            [
                (StepKind::Given, "I am logged in as the default user"),
                (
                    StepKind::When,
                    "I add a language \"French\" with level \"Intermediate\""
                ),
                (StepKind::Then, "I should see a success toast"),
                (
                    StepKind::And,
                    "the language \"French\" with level \"Intermediate\" should exist"
                ),
            ]
        );
    }

    #[test]
    fn feature_collects_scenarios_in_order() {
        let feature = Feature::new("Profile languages")
            .scenario(Scenario::new("Add a language").tag("languages"))
            .scenario(Scenario::new("Delete a language").tag("languages"));
        assert_eq!(feature.title, "Profile languages");
        let titles: Vec<_> = feature.scenarios.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Add a language", "Delete a language"]);
    }

    #[test]
    fn step_debug_does_not_expose_the_closure() {
        let scenario = Scenario::new("x").given("a step", noop);
        let debugged = format!("{:?}", scenario.steps[0]);
        assert!(debugged.contains("a step"));
        assert!(debugged.contains("<closure>"));
    }
}
