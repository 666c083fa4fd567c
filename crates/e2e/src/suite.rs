//! The Skillfolio feature suite
//!
//! Scenario bodies call the step bindings through the shared context;
//! the step text stays close to the wording the flows were specified
//! in. List-touching scenarios carry a `languages` or `skills` tag,
//! which is what scopes the pre-clean wipe and the post-clean
//! reconciliation to the lists they actually use.

use crate::scenario::{Feature, Scenario};

/// Raw payload for the unsafe-input scenario. Placeholders are decoded
/// by the submitting step, so the quotes survive the trip through the
/// form intact.
const SCRIPT_PAYLOAD: &str = "<script>alert({DQ}pwned{DQ})</script>";

/// Every feature in the suite, in report order.
pub fn skillfolio_features() -> Vec<Feature> {
    vec![
        sign_in(),
        profile_languages(),
        profile_skills(),
        profile_overview(),
    ]
}

fn sign_in() -> Feature {
    Feature::new("Sign in")
        .scenario(
            Scenario::new("Sign in with valid credentials")
                .given("I am on the login page", |cx| {
                    Box::pin(async move { cx.auth.open_login_page().await })
                })
                .when("I enter valid credentials", |cx| {
                    Box::pin(async move { cx.auth.login_as_default_user().await })
                })
                .then("I should see the signed-in account area", |cx| {
                    Box::pin(async move { cx.auth.expect_signed_in().await })
                }),
        )
        .scenario(
            Scenario::new("Reject a wrong password")
                .given("I am on the login page", |cx| {
                    Box::pin(async move { cx.auth.open_login_page().await })
                })
                .when("I enter a valid username and an invalid password", |cx| {
                    Box::pin(async move { cx.auth.login_with_wrong_password().await })
                })
                .then("I should see an error message", |cx| {
                    Box::pin(async move { cx.auth.expect_sign_in_rejected().await })
                }),
        )
        .scenario(
            Scenario::new("Reject empty credentials")
                .given("I am on the login page", |cx| {
                    Box::pin(async move { cx.auth.open_login_page().await })
                })
                .when("I enter empty credentials", |cx| {
                    Box::pin(async move { cx.auth.login_with_empty_credentials().await })
                })
                .then("I should see an error message", |cx| {
                    Box::pin(async move { cx.auth.expect_sign_in_rejected().await })
                }),
        )
}

fn profile_languages() -> Feature {
    Feature::new("Profile languages")
        .scenario(
            Scenario::new("Add a language")
                .tag("languages")
                .given("I am logged in as the default user", |cx| {
                    Box::pin(async move { cx.auth.login_as_default_user().await })
                })
                .and("I open the Languages tab", |cx| {
                    Box::pin(async move { cx.languages.open_tab().await })
                })
                .when("I add a language \"French\" with level \"Intermediate\"", |cx| {
                    Box::pin(async move { cx.languages.add("French", "Intermediate").await })
                })
                .then("I should see a success toast", |cx| {
                    Box::pin(async move { cx.languages.expect_success_toast().await })
                })
                .and(
                    "the language \"French\" with level \"Intermediate\" should exist",
                    |cx| {
                        Box::pin(async move {
                            cx.languages.expect_present("French", "Intermediate").await
                        })
                    },
                )
                .and("print the language", |cx| {
                    Box::pin(async move { cx.languages.print_last().await })
                }),
        )
        .scenario(
            Scenario::new("Update a language level")
                .tag("languages")
                .given("I am logged in as the default user", |cx| {
                    Box::pin(async move { cx.auth.login_as_default_user().await })
                })
                .and("I open the Languages tab", |cx| {
                    Box::pin(async move { cx.languages.open_tab().await })
                })
                .when("I add a language \"Spanish\" with level \"Beginner\"", |cx| {
                    Box::pin(async move { cx.languages.add("Spanish", "Beginner").await })
                })
                .and("I change the language level to \"Fluent\"", |cx| {
                    Box::pin(async move {
                        cx.languages.update("Spanish", "Beginner", "Fluent").await
                    })
                })
                .then("I should see a success toast", |cx| {
                    Box::pin(async move { cx.languages.expect_success_toast().await })
                })
                .and(
                    "the language \"Spanish\" with level \"Fluent\" should exist",
                    |cx| {
                        Box::pin(async move {
                            cx.languages.expect_present("Spanish", "Fluent").await
                        })
                    },
                )
                .and(
                    "no language \"Spanish\" with level \"Beginner\" should remain",
                    |cx| {
                        Box::pin(async move {
                            cx.languages.expect_count(0, "Spanish", "Beginner").await
                        })
                    },
                ),
        )
        .scenario(
            Scenario::new("Delete a language")
                .tag("languages")
                .given("I am logged in as the default user", |cx| {
                    Box::pin(async move { cx.auth.login_as_default_user().await })
                })
                .and("I open the Languages tab", |cx| {
                    Box::pin(async move { cx.languages.open_tab().await })
                })
                .when("I add a language \"German\" with level \"Basic\"", |cx| {
                    Box::pin(async move { cx.languages.add("German", "Basic").await })
                })
                .and("I delete the language", |cx| {
                    Box::pin(async move { cx.languages.delete("German", "Basic").await })
                })
                .then(
                    "the language \"German\" should not appear in my profile",
                    |cx| Box::pin(async move { cx.languages.expect_absent("German").await }),
                ),
        )
        .scenario(
            Scenario::new("Count duplicate languages")
                .tag("languages")
                .given("I am logged in as the default user", |cx| {
                    Box::pin(async move { cx.auth.login_as_default_user().await })
                })
                .and("I open the Languages tab", |cx| {
                    Box::pin(async move { cx.languages.open_tab().await })
                })
                .when("I add a language \"Hindi\" with level \"Fluent\"", |cx| {
                    Box::pin(async move { cx.languages.add("Hindi", "Fluent").await })
                })
                .and("I add the same language again", |cx| {
                    Box::pin(async move { cx.languages.add("Hindi", "Fluent").await })
                })
                .then(
                    "I should see 2 occurrences of \"Hindi\" with level \"Fluent\"",
                    |cx| {
                        Box::pin(async move {
                            cx.languages.expect_count(2, "Hindi", "Fluent").await
                        })
                    },
                ),
        )
        .scenario(
            Scenario::new("Reject unsafe language input")
                .tag("languages")
                .tag("security")
                .given("I am logged in as the default user", |cx| {
                    Box::pin(async move { cx.auth.login_as_default_user().await })
                })
                .and("I open the Languages tab", |cx| {
                    Box::pin(async move { cx.languages.open_tab().await })
                })
                .when("I add a potentially unsafe language entry", |cx| {
                    Box::pin(async move {
                        cx.languages.submit_unsafe(SCRIPT_PAYLOAD, "Basic").await
                    })
                })
                .and("check alert or row visibility for unsafe input", |cx| {
                    Box::pin(async move { cx.languages.check_unsafe_outcome().await })
                })
                .then("the system should reject unsafe or malicious input", |cx| {
                    Box::pin(async move { cx.languages.expect_unsafe_rejected().await })
                }),
        )
}

fn profile_skills() -> Feature {
    Feature::new("Profile skills")
        .scenario(
            Scenario::new("Add a skill")
                .tag("skills")
                .given("I am logged in as the default user", |cx| {
                    Box::pin(async move { cx.auth.login_as_default_user().await })
                })
                .and("I open the Skills tab", |cx| {
                    Box::pin(async move { cx.skills.open_tab().await })
                })
                .when("I add skill \"Rust\" with level \"Expert\"", |cx| {
                    Box::pin(async move { cx.skills.add("Rust", "Expert").await })
                })
                .then("I should see a success message toast", |cx| {
                    Box::pin(async move { cx.skills.expect_success_toast().await })
                })
                .and("I should see skill \"Rust\" with level \"Expert\"", |cx| {
                    Box::pin(async move { cx.skills.expect_present("Rust", "Expert").await })
                }),
        )
        .scenario(
            Scenario::new("Update a skill level")
                .tag("skills")
                .given("I am logged in as the default user", |cx| {
                    Box::pin(async move { cx.auth.login_as_default_user().await })
                })
                .and("I open the Skills tab", |cx| {
                    Box::pin(async move { cx.skills.open_tab().await })
                })
                .when("I add skill \"Docker\" with level \"Beginner\"", |cx| {
                    Box::pin(async move { cx.skills.add("Docker", "Beginner").await })
                })
                .and("I update skill \"Docker\" to level \"Intermediate\"", |cx| {
                    Box::pin(async move {
                        cx.skills.update("Docker", "Beginner", "Intermediate").await
                    })
                })
                .then("I should see a success message toast", |cx| {
                    Box::pin(async move { cx.skills.expect_success_toast().await })
                })
                .and(
                    "I should see skill \"Docker\" with level \"Intermediate\"",
                    |cx| {
                        Box::pin(async move {
                            cx.skills.expect_present("Docker", "Intermediate").await
                        })
                    },
                )
                .and(
                    "I should not see skill \"Docker\" with level \"Beginner\"",
                    |cx| {
                        Box::pin(async move {
                            cx.skills.expect_absent("Docker", "Beginner").await
                        })
                    },
                ),
        )
        .scenario(
            Scenario::new("Delete a skill")
                .tag("skills")
                .given("I am logged in as the default user", |cx| {
                    Box::pin(async move { cx.auth.login_as_default_user().await })
                })
                .and("I open the Skills tab", |cx| {
                    Box::pin(async move { cx.skills.open_tab().await })
                })
                .when("I add skill \"Terraform\" with level \"Basic\"", |cx| {
                    Box::pin(async move { cx.skills.add("Terraform", "Basic").await })
                })
                .and("I delete skill \"Terraform\" with level \"Basic\"", |cx| {
                    Box::pin(async move { cx.skills.delete("Terraform", "Basic").await })
                })
                .then(
                    "I should not see skill \"Terraform\" with level \"Basic\"",
                    |cx| {
                        Box::pin(async move {
                            cx.skills.expect_absent("Terraform", "Basic").await
                        })
                    },
                ),
        )
        .scenario(
            Scenario::new("Add a table of skills")
                .tag("skills")
                .given("I am logged in as the default user", |cx| {
                    Box::pin(async move { cx.auth.login_as_default_user().await })
                })
                .and("I open the Skills tab", |cx| {
                    Box::pin(async move { cx.skills.open_tab().await })
                })
                .when("I add the following skills", |cx| {
                    Box::pin(async move {
                        cx.skills
                            .add_table(&[
                                ("Python", "Expert"),
                                ("Go", "Basic"),
                                ("SQL", "Intermediate"),
                            ])
                            .await
                    })
                })
                .then("I should see skill \"Python\" with level \"Expert\"", |cx| {
                    Box::pin(async move { cx.skills.expect_count(1, "Python", "Expert").await })
                })
                .and("I should see skill \"Go\" with level \"Basic\"", |cx| {
                    Box::pin(async move { cx.skills.expect_count(1, "Go", "Basic").await })
                })
                .and(
                    "I should see skill \"SQL\" with level \"Intermediate\"",
                    |cx| {
                        Box::pin(async move {
                            cx.skills.expect_count(1, "SQL", "Intermediate").await
                        })
                    },
                )
                .and("I should see 3 skills in the list", |cx| {
                    Box::pin(async move { cx.skills.expect_row_total(3).await })
                }),
        )
        .scenario(
            Scenario::new("Reject an invalid experience level")
                .tag("skills")
                .given("I am logged in as the default user", |cx| {
                    Box::pin(async move { cx.auth.login_as_default_user().await })
                })
                .and("I open the Skills tab", |cx| {
                    Box::pin(async move { cx.skills.open_tab().await })
                })
                .when(
                    "I attempt to add skill \"Juggling\" with invalid level \"Galactic\"",
                    |cx| {
                        Box::pin(async move {
                            cx.skills.attempt_invalid_level("Juggling", "Galactic").await
                        })
                    },
                )
                .then("I should see an error toast for invalid skill or level", |cx| {
                    Box::pin(async move { cx.skills.expect_invalid_entry_error().await })
                }),
        )
}

fn profile_overview() -> Feature {
    Feature::new("Profile overview").scenario(
        Scenario::new("Edit the display name")
            .given("I am logged in as the default user", |cx| {
                Box::pin(async move { cx.auth.login_as_default_user().await })
            })
            .when("I open my profile overview", |cx| {
                Box::pin(async move { cx.overview.open_profile().await })
            })
            .and("I change my display name to \"Ada\" \"Lovelace\"", |cx| {
                Box::pin(async move { cx.overview.edit_display_name("Ada", "Lovelace").await })
            })
            .then("I should see a success toast", |cx| {
                Box::pin(async move { cx.overview.expect_success_toast().await })
            })
            .and("my display name should read \"Ada Lovelace\"", |cx| {
                Box::pin(async move { cx.overview.expect_display_name("Ada", "Lovelace").await })
            }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::CleanupScope;

    #[test]
    fn suite_has_the_expected_features() {
        let features = skillfolio_features();
        let titles: Vec<_> = features.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(
            titles,
            [
                "Sign in",
                "Profile languages",
                "Profile skills",
                "Profile overview"
            ]
        );
    }

    #[test]
    fn scenario_titles_are_unique() {
        let features = skillfolio_features();
        let mut titles: Vec<_> = features
            .iter()
            .flat_map(|f| f.scenarios.iter().map(|s| s.title.clone()))
            .collect();
        let total = titles.len();
        titles.sort();
        titles.dedup();
        assert_eq!(titles.len(), total);
    }

    #[test]
    fn every_scenario_has_a_body() {
        for feature in skillfolio_features() {
            for scenario in &feature.scenarios {
                assert!(
                    scenario.steps.len() >= 3,
                    "{} has only {} step(s)",
                    scenario.title,
                    scenario.steps.len()
                );
            }
        }
    }

    #[test]
    fn list_scenarios_are_tagged_for_cleanup() {
        let features = skillfolio_features();

        let languages = &features[1];
        for scenario in &languages.scenarios {
            assert_eq!(
                CleanupScope::for_tags(&scenario.tags),
                vec![CleanupScope::Languages],
                "{} must clean the languages list",
                scenario.title
            );
        }

        let skills = &features[2];
        for scenario in &skills.scenarios {
            assert_eq!(
                CleanupScope::for_tags(&scenario.tags),
                vec![CleanupScope::Skills],
                "{} must clean the skills list",
                scenario.title
            );
        }
    }

    #[test]
    fn the_security_scenario_carries_both_tags() {
        let features = skillfolio_features();
        let security = features[1]
            .scenarios
            .iter()
            .find(|s| s.has_tag("security"))
            .expect("a security-tagged scenario");
        assert!(security.has_tag("languages"));
        assert!(security.title.contains("unsafe"));
    }
}
