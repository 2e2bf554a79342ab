//! Build plan over many declarations.

use crate::assembler::assemble;
use crate::declaration::RawDeclaration;
use crate::eligibility::{Eligibility, EligibilityFacts};
use crate::graph::{ArtifactNode, BuildGraph};
use gki_core::util;
use gki_types::{GkiError, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// Outcome of planning one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedModule {
    /// Declaration name
    pub name: String,
    /// Canonical package name
    pub package_name: String,
    /// Why the declaration was skipped, if it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
    /// Number of nodes contributed
    pub nodes: usize,
}

/// Validate, evaluate and assemble one declaration.
///
/// Returns the summary and the nodes, which are empty when the declaration
/// is not eligible.
pub fn plan_module(
    raw: RawDeclaration,
    facts: &EligibilityFacts,
) -> Result<(PlannedModule, Vec<ArtifactNode>)> {
    let decl = raw.validate()?;
    let eligibility = facts.evaluate(&decl);
    let nodes = assemble(&decl, eligibility.is_eligible());

    let skipped = match &eligibility {
        Eligibility::Eligible => {
            info!(
                "{}: {} build node(s) for {}",
                decl.name(),
                nodes.len(),
                decl.package_name()
            );
            None
        }
        other => {
            debug!("Skipping {}: {}", decl.name(), other);
            Some(other.to_string())
        }
    };

    let summary = PlannedModule {
        name: decl.name().to_string(),
        package_name: decl.package_name(),
        skipped,
        nodes: nodes.len(),
    };
    Ok((summary, nodes))
}

/// Build graph assembled from many declarations against one board.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    facts: EligibilityFacts,
    graph: BuildGraph,
    modules: Vec<PlannedModule>,
}

impl BuildPlan {
    /// Create an empty plan for a board.
    pub fn new(facts: EligibilityFacts) -> Self {
        Self {
            facts,
            graph: BuildGraph::new(),
            modules: Vec::new(),
        }
    }

    /// Add one declaration.
    ///
    /// The declaration's nodes are inserted atomically, so on error the plan
    /// keeps only the modules added before it.
    pub fn add(&mut self, raw: RawDeclaration) -> Result<&PlannedModule> {
        let (summary, nodes) = plan_module(raw, &self.facts)?;
        self.graph.extend(nodes)?;
        self.modules.push(summary);
        self.modules
            .last()
            .ok_or_else(|| GkiError::Bug("planned module vanished".to_string()))
    }

    /// Add declarations in order, stopping at the first error.
    pub fn add_all(&mut self, raws: impl IntoIterator<Item = RawDeclaration>) -> Result<()> {
        for raw in raws {
            self.add(raw)?;
        }
        Ok(())
    }

    /// Add every declaration found in `paths`.
    ///
    /// Files are read as given. Directories are searched for YAML files in
    /// sorted order.
    pub fn add_paths(&mut self, paths: &[PathBuf]) -> Result<()> {
        for file in util::collect_yaml_files(paths)? {
            let content = util::slurp(&file)?;
            let raws = RawDeclaration::from_yaml(&content)
                .map_err(|e| GkiError::Other(format!("{}: {}", file.display(), e)))?;
            debug!("Loaded {} declaration(s) from {}", raws.len(), file.display());
            self.add_all(raws)?;
        }

        info!(
            "Planned {} module(s), {} eligible, {} build node(s)",
            self.modules.len(),
            self.eligible().count(),
            self.graph.len()
        );
        Ok(())
    }

    /// Board facts the plan evaluates against.
    pub fn facts(&self) -> &EligibilityFacts {
        &self.facts
    }

    /// The assembled graph.
    pub fn graph(&self) -> &BuildGraph {
        &self.graph
    }

    /// Consume the plan, keeping the graph.
    pub fn into_graph(self) -> BuildGraph {
        self.graph
    }

    /// Summaries of every declaration added so far.
    pub fn modules(&self) -> &[PlannedModule] {
        &self.modules
    }

    /// Summaries of the declarations that contributed nodes.
    pub fn eligible(&self) -> impl Iterator<Item = &PlannedModule> {
        self.modules.iter().filter(|module| module.skipped.is_none())
    }
}
