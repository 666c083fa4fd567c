//! Live end-to-end checks against a running environment
//!
//! Ignored by default: they need a WebDriver endpoint and the Skillfolio
//! application reachable with the configured settings. Run with:
//! cargo test --package skillfolio-e2e --test live -- --ignored
//!
//! Each test tears its list and session down before reporting the body
//! outcome, so a failed assertion cannot leak rows into the next run.

use std::path::Path;

use anyhow::Result;

use skillfolio_e2e::ScenarioContext;
use skillfolio_harness::cleanup::reconcile;
use skillfolio_harness::config::TestSettings;
use skillfolio_harness::session::Session;
use skillfolio_harness::HarnessError;

fn load_settings() -> TestSettings {
    let path = Path::new("settings.json");
    if path.exists() {
        TestSettings::load(path).expect("settings.json must parse")
    } else {
        TestSettings::default()
    }
}

async fn start_context() -> Result<ScenarioContext> {
    let settings = load_settings();
    let session = Session::start(&settings).await?;
    Ok(ScenarioContext::new(&settings, session))
}

async fn finish_languages(cx: ScenarioContext) {
    let tracked = cx.languages.ledger().lock().clone();
    reconcile(cx.languages.page(), Some(&tracked)).await;
    cx.into_session().end().await;
}

async fn finish_skills(cx: ScenarioContext) {
    let tracked = cx.skills.ledger().lock().clone();
    reconcile(cx.skills.page(), Some(&tracked)).await;
    cx.into_session().end().await;
}

#[tokio::test]
#[ignore = "requires a running WebDriver endpoint and the Skillfolio application"]
async fn language_round_trip() -> Result<()> {
    let cx = start_context().await?;

    let body = async {
        cx.auth.login_as_default_user().await?;
        cx.languages.open_tab().await?;
        cx.languages.add("French", "Intermediate").await?;
        cx.languages.expect_present("French", "Intermediate").await?;
        cx.languages.delete("French", "Intermediate").await?;
        cx.languages.expect_absent("French").await?;
        Ok::<(), HarnessError>(())
    }
    .await;

    finish_languages(cx).await;
    body?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running WebDriver endpoint and the Skillfolio application"]
async fn duplicate_language_rows_are_counted() -> Result<()> {
    let cx = start_context().await?;

    let body = async {
        cx.auth.login_as_default_user().await?;
        cx.languages.open_tab().await?;
        cx.languages.page().delete_all().await?;
        cx.languages.add("Hindi", "Fluent").await?;
        cx.languages.add("Hindi", "Fluent").await?;
        cx.languages.expect_count(2, "Hindi", "Fluent").await?;
        Ok::<(), HarnessError>(())
    }
    .await;

    finish_languages(cx).await;
    body?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running WebDriver endpoint and the Skillfolio application"]
async fn language_level_update_replaces_the_old_row() -> Result<()> {
    let cx = start_context().await?;

    let body = async {
        cx.auth.login_as_default_user().await?;
        cx.languages.open_tab().await?;
        cx.languages.page().delete_all().await?;
        cx.languages.add("Spanish", "Beginner").await?;
        cx.languages.update("Spanish", "Beginner", "Fluent").await?;
        cx.languages.expect_present("Spanish", "Fluent").await?;
        cx.languages.expect_count(0, "Spanish", "Beginner").await?;
        Ok::<(), HarnessError>(())
    }
    .await;

    finish_languages(cx).await;
    body?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running WebDriver endpoint and the Skillfolio application"]
async fn unsafe_language_input_is_rejected() -> Result<()> {
    let cx = start_context().await?;

    let body = async {
        cx.auth.login_as_default_user().await?;
        cx.languages.open_tab().await?;
        cx.languages
            .submit_unsafe("<script>alert({DQ}pwned{DQ})</script>", "Basic")
            .await?;
        cx.languages.check_unsafe_outcome().await?;
        cx.languages.expect_unsafe_rejected().await?;
        Ok::<(), HarnessError>(())
    }
    .await;

    finish_languages(cx).await;
    body?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running WebDriver endpoint and the Skillfolio application"]
async fn skill_table_add_reaches_the_expected_total() -> Result<()> {
    let cx = start_context().await?;

    let body = async {
        cx.auth.login_as_default_user().await?;
        cx.skills.open_tab().await?;
        cx.skills.page().delete_all().await?;
        cx.skills
            .add_table(&[("Python", "Expert"), ("Go", "Basic"), ("SQL", "Intermediate")])
            .await?;
        cx.skills.expect_row_total(3).await?;
        Ok::<(), HarnessError>(())
    }
    .await;

    finish_skills(cx).await;
    body?;
    Ok(())
}
