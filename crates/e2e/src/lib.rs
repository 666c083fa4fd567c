//! Skillfolio UI E2E suite
//!
//! Scenario layer over `skillfolio-harness`: step bindings, the
//! per-scenario context, and the lifecycle runner that turns scenario
//! definitions into report nodes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              Suite runner (tests/e2e.rs)                │
//! ├─────────────────────────────────────────────────────────┤
//! │  Runner (lifecycle.rs), per scenario:                   │
//! │    ├── Session::start()            provision            │
//! │    ├── pre_clean()                 tag-scoped wipe      │
//! │    ├── step closures               body, first-failure  │
//! │    ├── reconcile()                 ledger then wipe     │
//! │    └── Session::end()              always, exactly once │
//! ├─────────────────────────────────────────────────────────┤
//! │  ScenarioContext (context.rs)                           │
//! │    ├── AuthSteps / OverviewSteps                        │
//! │    ├── LanguageSteps / SkillSteps   (ledger + logs)     │
//! │    └── log_sources() → drained into each step node      │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod context;
pub mod lifecycle;
pub mod scenario;
pub mod steps;
pub mod suite;

pub use context::ScenarioContext;
pub use lifecycle::{Filter, Runner, ScenarioState, SuiteSummary};
pub use scenario::{Feature, Scenario};

pub use skillfolio_harness::{HarnessError, HarnessResult};
