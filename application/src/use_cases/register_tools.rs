//! Register Tools use case
//!
//! Orchestrates manifest → policy → factory → host callback. Registration is
//! best-effort: a broken manifest or an ineligible tool never reaches the
//! host as an error, it shows up in the [`RegistrationReport`] instead.

use crate::ports::manifest_source::ManifestSource;
use crate::ports::tool_factory::ToolFactory;
use fnbridge_domain::tool::{
    entities::ManifestEntry,
    policy::{PolicyDecision, ToolPolicy},
    traits::FunctionTool,
};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Why a manifest entry was not registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Entry is not a tool definition object
    Malformed,
    /// Entry has no `name`
    MissingName,
    /// Name is in the denylist
    Denied,
    /// An allowlist is configured and the name is not in it
    NotAllowlisted,
    /// An earlier entry with the same name was already registered
    Duplicate,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::Malformed => "malformed entry",
            SkipReason::MissingName => "missing name",
            SkipReason::Denied => "denied by policy",
            SkipReason::NotAllowlisted => "not in allowlist",
            SkipReason::Duplicate => "duplicate name",
        };
        f.write_str(text)
    }
}

/// Outcome for a single manifest entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered { name: String },
    Skipped { name: String, reason: SkipReason },
}

/// Aggregated result of one registration pass
#[derive(Debug, Clone, Default)]
pub struct RegistrationReport {
    /// Per-entry outcomes, in manifest order
    pub outcomes: Vec<RegistrationOutcome>,
    /// Set when the manifest could not be loaded (nothing was registered)
    pub manifest_error: Option<String>,
    /// False when the functions directory or manifest is not installed
    pub source_available: bool,
}

impl RegistrationReport {
    pub fn registered(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                RegistrationOutcome::Registered { name } => Some(name.as_str()),
                RegistrationOutcome::Skipped { .. } => None,
            })
            .collect()
    }

    pub fn skipped(&self) -> Vec<(&str, SkipReason)> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                RegistrationOutcome::Skipped { name, reason } => Some((name.as_str(), *reason)),
                RegistrationOutcome::Registered { .. } => None,
            })
            .collect()
    }
}

/// Use case for registering manifest tools with a host
pub struct RegisterToolsUseCase<S: ManifestSource + 'static, F: ToolFactory + 'static> {
    source: Arc<S>,
    factory: Arc<F>,
    policy: ToolPolicy,
}

impl<S: ManifestSource + 'static, F: ToolFactory + 'static> RegisterToolsUseCase<S, F> {
    pub fn new(source: Arc<S>, factory: Arc<F>, policy: ToolPolicy) -> Self {
        Self {
            source,
            factory,
            policy,
        }
    }

    /// Run one registration pass, handing each eligible tool to `register`.
    pub fn execute<R>(&self, mut register: R) -> RegistrationReport
    where
        R: FnMut(Arc<dyn FunctionTool>),
    {
        let mut report = RegistrationReport {
            source_available: self.source.is_available(),
            ..Default::default()
        };

        if !report.source_available {
            debug!(
                location = %self.source.location(),
                "Functions manifest not installed, no tools registered"
            );
            return report;
        }

        let entries = match self.source.load() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Failed to load functions manifest, no tools registered");
                report.manifest_error = Some(e.to_string());
                return report;
            }
        };

        let mut seen = HashSet::new();
        for entry in entries {
            let definition = match entry {
                ManifestEntry::Definition(definition) => definition,
                ManifestEntry::Malformed { index, reason } => {
                    warn!(index, %reason, "Skipped malformed manifest entry");
                    report.outcomes.push(RegistrationOutcome::Skipped {
                        name: format!("entry {}", index),
                        reason: SkipReason::Malformed,
                    });
                    continue;
                }
            };
            let name = definition.name.clone();

            let skip = if name.is_empty() {
                Some(SkipReason::MissingName)
            } else {
                match self.policy.decide(&name) {
                    PolicyDecision::Denied => Some(SkipReason::Denied),
                    PolicyDecision::NotAllowlisted => Some(SkipReason::NotAllowlisted),
                    PolicyDecision::Allowed if seen.contains(&name) => Some(SkipReason::Duplicate),
                    PolicyDecision::Allowed => None,
                }
            };

            if let Some(reason) = skip {
                trace!(tool = %name, %reason, "Skipped tool");
                report
                    .outcomes
                    .push(RegistrationOutcome::Skipped { name, reason });
                continue;
            }

            register(self.factory.bind(Arc::new(definition)));
            debug!(tool = %name, "Registered tool");
            seen.insert(name.clone());
            report
                .outcomes
                .push(RegistrationOutcome::Registered { name });
        }

        report
    }
}
