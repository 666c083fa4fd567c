//! Per-scenario dependency wiring
//!
//! One `ScenarioContext` is constructed right after the session is
//! provisioned and dropped at teardown. It owns the session, the page
//! objects, and every step-binding component, so nothing is resolved at
//! runtime: scenario closures receive the context by reference and pick
//! the bindings they need.

use skillfolio_harness::config::TestSettings;
use skillfolio_harness::pages::{languages, skills, LoginPage, OverviewPage};
use skillfolio_harness::session::Session;

use crate::steps::{AuthSteps, LanguageSteps, LogSource, OverviewSteps, SkillSteps};

pub struct ScenarioContext {
    session: Session,
    pub auth: AuthSteps,
    pub overview: OverviewSteps,
    pub languages: LanguageSteps,
    pub skills: SkillSteps,
}

impl ScenarioContext {
    pub fn new(settings: &TestSettings, session: Session) -> Self {
        let driver = session.driver();
        ScenarioContext {
            auth: AuthSteps::new(
                LoginPage::new(driver.clone()),
                settings.environment.clone(),
                settings.wait_deadline(),
            ),
            overview: OverviewSteps::new(OverviewPage::new(driver.clone())),
            languages: LanguageSteps::new(languages::page(driver.clone()), driver.clone()),
            skills: SkillSteps::new(skills::page(driver)),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Surrender the session for teardown. Consuming the context here is
    /// what makes "torn down exactly once" a property of the types.
    pub fn into_session(self) -> Session {
        self.session
    }

    /// Every registered log source, drained into the report after each
    /// step. A fixed, typed collection; new bindings are added here.
    pub fn log_sources(&self) -> [&dyn LogSource; 4] {
        [&self.auth, &self.overview, &self.languages, &self.skills]
    }
}
