//! Build graph model.
//!
//! Nodes are identified by [`NodeId`] (owning declaration plus role) rather
//! than by concatenated strings. A [`BuildGraph`] only accepts a node once
//! every node it references is already present, so the graph is acyclic by
//! construction and insertion order is a valid dependency order.

use crate::check::KmiCheck;
use gki_types::{GkiError, NodeRole, Result};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Identity of a build node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    /// Name of the declaration that owns the node
    pub owner: String,
    /// Role of the node in the pipeline
    pub role: NodeRole,
}

impl NodeId {
    /// Create a node identifier.
    pub fn new(owner: impl Into<String>, role: NodeRole) -> Self {
        Self {
            owner: owner.into(),
            role,
        }
    }

    /// Name under which the node is registered with the build system.
    pub fn name(&self) -> String {
        format!("{}{}", self.owner, self.role.suffix())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.owner, self.role.suffix())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

/// Selects one output of a multi-output node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputTag {
    /// OTA payload binary
    Payload,
    /// OTA payload properties text
    Properties,
}

impl fmt::Display for OutputTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTag::Payload => write!(f, "payload"),
            OutputTag::Properties => write!(f, "properties"),
        }
    }
}

/// Reference to a predecessor's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputRef {
    /// Producing node
    pub node: NodeId,
    /// Output selected from the producer; `None` for its untagged output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<OutputTag>,
}

impl InputRef {
    /// Reference the untagged output of `node`.
    pub fn of(node: &NodeId) -> Self {
        Self {
            node: node.clone(),
            tag: None,
        }
    }

    /// Reference one tagged output of `node`.
    pub fn tagged(node: &NodeId, tag: OutputTag) -> Self {
        Self {
            node: node.clone(),
            tag: Some(tag),
        }
    }
}

impl fmt::Display for InputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            Some(tag) => write!(f, ":{}{{.{}}}", self.node, tag),
            None => write!(f, ":{}", self.node),
        }
    }
}

/// A file produced by a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Output {
    /// Tag consumers use to select this output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<OutputTag>,
    /// File name of the output
    pub file: String,
}

impl Output {
    /// The single untagged output of a node.
    pub fn file(file: impl Into<String>) -> Self {
        Self {
            tag: None,
            file: file.into(),
        }
    }

    /// A tagged output of a multi-output node.
    pub fn tagged(tag: OutputTag, file: impl Into<String>) -> Self {
        Self {
            tag: Some(tag),
            file: file.into(),
        }
    }
}

/// External transform a derive node runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Tool {
    /// Extracts the kernel release text from a boot image
    ExtractKernelRelease,
    /// Generates the OTA payload and its properties from images
    OtaPayloadGenerator,
    /// Builds the package manifest
    ManifestBuilder,
    /// Installs a file into the package
    Copy {
        /// Directory inside the package
        relative_install_path: String,
    },
    /// Verifies the kernel release against the declared KMI version
    CheckKmiVersion(KmiCheck),
}

impl Tool {
    /// Name of the executable (or built-in step) behind the tool.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::ExtractKernelRelease => "extract_kernel",
            Tool::OtaPayloadGenerator => "ota_from_raw_image",
            Tool::ManifestBuilder => "build_gki_apex_manifest",
            Tool::Copy { .. } => "prebuilt_copy",
            Tool::CheckKmiVersion(_) => "check_kmi_version",
        }
    }
}

/// What a node does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// Makes a file from the product output directory a build input
    Import {
        /// Path relative to the product output directory
        product_out_path: String,
    },
    /// Derives outputs from inputs with an external tool
    Derive {
        /// Transform to run
        tool: Tool,
        /// Extra flags for the tool; inputs and outputs are passed separately
        args: Vec<String>,
    },
    /// Bundles inputs into the final package
    Package {
        /// Canonical package name
        package_name: String,
        /// Whether the package can be installed directly
        installable: bool,
        /// Legacy modules superseded by this package
        overrides: Vec<String>,
    },
    /// Aggregates other nodes without producing anything
    Phony {
        /// Legacy modules superseded by the aggregate's package
        overrides: Vec<String>,
    },
}

/// A named step in the build graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactNode {
    /// Node identity
    pub id: NodeId,
    /// What the node does
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Predecessor outputs consumed, in order
    pub inputs: Vec<InputRef>,
    /// Predecessors that must complete but whose outputs are not consumed
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<NodeId>,
    /// Files produced
    pub outputs: Vec<Output>,
}

impl ArtifactNode {
    /// Create a node with no inputs or outputs.
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            inputs: Vec::new(),
            required: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Add a consumed input.
    pub fn with_input(mut self, input: InputRef) -> Self {
        self.inputs.push(input);
        self
    }

    /// Add an order-only predecessor.
    pub fn requires(mut self, node: &NodeId) -> Self {
        self.required.push(node.clone());
        self
    }

    /// Add an output.
    pub fn with_output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    /// Registered name of the node.
    pub fn name(&self) -> String {
        self.id.name()
    }

    /// Pipeline stage of the node.
    pub fn stage(&self) -> u8 {
        self.id.role.stage()
    }

    /// All predecessors: consumed inputs first, then order-only ones.
    pub fn predecessors(&self) -> impl Iterator<Item = &NodeId> {
        self.inputs
            .iter()
            .map(|input| &input.node)
            .chain(self.required.iter())
    }

    /// Output matching `tag`, if any.
    pub fn output(&self, tag: Option<OutputTag>) -> Option<&Output> {
        self.outputs.iter().find(|output| output.tag == tag)
    }
}

/// Insertion-ordered set of build nodes.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct BuildGraph {
    nodes: IndexMap<String, ArtifactNode>,
}

impl BuildGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single node.
    ///
    /// # Errors
    ///
    /// [`GkiError::DuplicateNode`] if the name is taken,
    /// [`GkiError::UnknownNode`] if a predecessor is missing, and
    /// [`GkiError::Validation`] if an input selects an output its producer
    /// does not have.
    pub fn insert(&mut self, node: ArtifactNode) -> Result<()> {
        self.extend(vec![node])
    }

    /// Add a batch of nodes atomically.
    ///
    /// Nodes may reference earlier nodes of the same batch. On error the
    /// graph is left unchanged.
    pub fn extend(&mut self, nodes: Vec<ArtifactNode>) -> Result<()> {
        self.check_batch(&nodes)?;

        for node in nodes {
            debug!("Declared build node {}", node.id);
            self.nodes.insert(node.name(), node);
        }

        Ok(())
    }

    fn check_batch(&self, nodes: &[ArtifactNode]) -> Result<()> {
        let mut staged: IndexMap<String, &ArtifactNode> = IndexMap::new();

        for node in nodes {
            let name = node.name();
            if self.nodes.contains_key(&name) || staged.contains_key(&name) {
                return Err(GkiError::DuplicateNode(name));
            }

            for input in &node.inputs {
                let input_name = input.node.name();
                let producer = match self.nodes.get(&input_name) {
                    Some(producer) => producer,
                    None => staged.get(&input_name).copied().ok_or_else(|| GkiError::UnknownNode {
                        node: name.clone(),
                        input: input_name.clone(),
                    })?,
                };
                if producer.output(input.tag).is_none() {
                    return Err(GkiError::Validation(format!(
                        "Build node '{}' selects missing output {} of '{}'",
                        name,
                        input.tag.map_or_else(|| "<default>".to_string(), |t| t.to_string()),
                        input_name
                    )));
                }
            }

            for required in &node.required {
                let required_name = required.name();
                if !self.nodes.contains_key(&required_name) && !staged.contains_key(&required_name) {
                    return Err(GkiError::UnknownNode {
                        node: name.clone(),
                        input: required_name,
                    });
                }
            }

            staged.insert(name, node);
        }

        Ok(())
    }

    /// Look up a node by identity.
    pub fn get(&self, id: &NodeId) -> Option<&ArtifactNode> {
        self.nodes.get(&id.name())
    }

    /// Look up a node by registered name.
    pub fn get_by_name(&self, name: &str) -> Option<&ArtifactNode> {
        self.nodes.get(name)
    }

    /// Nodes in dependency order.
    pub fn nodes(&self) -> impl Iterator<Item = &ArtifactNode> {
        self.nodes.values()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Transitive predecessors of `id`, each listed after its own
    /// predecessors. Returns an empty list for unknown nodes.
    pub fn ancestors(&self, id: &NodeId) -> Vec<NodeId> {
        fn visit(
            graph: &BuildGraph,
            id: &NodeId,
            visited: &mut HashSet<NodeId>,
            sorted: &mut Vec<NodeId>,
        ) {
            let Some(node) = graph.get(id) else {
                return;
            };
            for predecessor in node.predecessors() {
                if visited.insert(predecessor.clone()) {
                    visit(graph, predecessor, visited, sorted);
                    sorted.push(predecessor.clone());
                }
            }
        }

        let mut visited = HashSet::new();
        let mut sorted = Vec::new();
        visit(self, id, &mut visited, &mut sorted);
        sorted
    }

    /// Number of distinct pipeline stages among the nodes owned by `owner`.
    pub fn stage_count(&self, owner: &str) -> usize {
        let stages: HashSet<u8> = self
            .nodes()
            .filter(|node| node.id.owner == owner)
            .map(ArtifactNode::stage)
            .collect();
        stages.len()
    }
}
