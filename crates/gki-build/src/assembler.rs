//! Graph assembly for a single declaration.
//!
//! One assembler covers both pipelines. [`PipelineOptions`] selects the
//! variant and whether an overrides aggregate is emitted, and
//! [`assemble_with`] returns the nodes in dependency order.

use crate::check::KmiCheck;
use crate::declaration::{ValidatedDeclaration, Variant};
use crate::graph::{ArtifactNode, InputRef, NodeId, NodeKind, Output, OutputTag, Tool};
use crate::manifest::ManifestRequest;
use crate::ota::{payload_args, ImageArg};
use gki_types::NodeRole;
use std::path::Path;

/// Install directory of the OTA artifacts inside the package.
pub const OTA_INSTALL_PATH: &str = "ota";

/// Kernel release text produced by the extractor.
pub const KERNEL_RELEASE_FILE: &str = "kernel_release.txt";

/// OTA payload binary.
pub const PAYLOAD_FILE: &str = "payload.bin";

/// OTA payload properties text.
pub const PAYLOAD_PROPERTIES_FILE: &str = "payload_properties.txt";

/// Package manifest.
pub const MANIFEST_FILE: &str = "apex_manifest.json";

/// Pipeline variant selected for a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineVariant {
    /// Boot image import, OTA payload and KMI check
    Ota {
        /// Boot image path relative to the product output directory
        product_out_path: String,
        /// Payload signing certificate
        certificate: Option<String>,
    },
    /// Manifest only, directly installable
    Factory,
}

/// Options for [`assemble_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Pipeline variant
    pub variant: PipelineVariant,
    /// Emit a phony aggregate carrying the overrides
    pub with_overrides_aggregate: bool,
}

impl PipelineOptions {
    /// Options implied by a declaration.
    pub fn for_declaration(decl: &ValidatedDeclaration) -> Self {
        let variant = match decl.variant() {
            Variant::Factory => PipelineVariant::Factory,
            Variant::Ota { product_out_path } => PipelineVariant::Ota {
                product_out_path: product_out_path.clone(),
                certificate: decl.certificate().map(str::to_string),
            },
        };
        Self {
            variant,
            with_overrides_aggregate: !decl.overrides().is_empty(),
        }
    }
}

/// Nodes for `decl`, or none when it is not eligible.
pub fn assemble(decl: &ValidatedDeclaration, eligible: bool) -> Vec<ArtifactNode> {
    if !eligible {
        return Vec::new();
    }
    assemble_with(decl, &PipelineOptions::for_declaration(decl))
}

/// Nodes for `decl` under explicit options, in dependency order.
pub fn assemble_with(decl: &ValidatedDeclaration, options: &PipelineOptions) -> Vec<ArtifactNode> {
    let name = decl.name();
    let id = |role| NodeId::new(name, role);
    let package_name = decl.package_name();
    let mut nodes = Vec::new();

    let check = match &options.variant {
        PipelineVariant::Factory => {
            let manifest = manifest_node(id(NodeRole::Manifest), ManifestRequest::Factory {
                kmi: decl.kmi_version().clone(),
            });
            let package = package_node(decl, id(NodeRole::Package), true)
                .with_input(InputRef::of(&manifest.id));
            nodes.push(manifest);
            nodes.push(package);
            None
        }
        PipelineVariant::Ota {
            product_out_path,
            certificate,
        } => {
            let boot_file = basename(product_out_path);

            let boot = ArtifactNode::new(
                id(NodeRole::BootImage),
                NodeKind::Import {
                    product_out_path: product_out_path.clone(),
                },
            )
            .with_output(Output::file(&boot_file));

            let release = ArtifactNode::new(
                id(NodeRole::KernelRelease),
                NodeKind::Derive {
                    tool: Tool::ExtractKernelRelease,
                    args: vec!["--output-release".to_string()],
                },
            )
            .with_input(InputRef::of(&boot.id))
            .with_output(Output::file(KERNEL_RELEASE_FILE));

            let ota_gen = ArtifactNode::new(
                id(NodeRole::OtaPayloadGen),
                NodeKind::Derive {
                    tool: Tool::OtaPayloadGenerator,
                    args: payload_args(
                        &[ImageArg::new("boot", &boot_file)],
                        certificate.as_deref(),
                    ),
                },
            )
            .with_input(InputRef::of(&boot.id))
            .with_input(InputRef::of(&release.id))
            .with_output(Output::tagged(OutputTag::Payload, PAYLOAD_FILE))
            .with_output(Output::tagged(OutputTag::Properties, PAYLOAD_PROPERTIES_FILE));

            let payload = copy_node(id(NodeRole::OtaPayload), &ota_gen.id, OutputTag::Payload, PAYLOAD_FILE);
            let properties = copy_node(
                id(NodeRole::OtaPayloadProperties),
                &ota_gen.id,
                OutputTag::Properties,
                PAYLOAD_PROPERTIES_FILE,
            );

            let manifest = manifest_node(id(NodeRole::Manifest), ManifestRequest::FromKernelRelease {
                package_name: package_name.clone(),
            })
            .with_input(InputRef::of(&release.id));

            let check_id = id(NodeRole::KmiCheck);
            let check = ArtifactNode::new(
                check_id.clone(),
                NodeKind::Derive {
                    tool: Tool::CheckKmiVersion(KmiCheck::new(
                        decl.kmi_version().clone(),
                        product_out_path.clone(),
                    )),
                    args: Vec::new(),
                },
            )
            .with_input(InputRef::of(&release.id))
            .with_output(Output::file(format!("{}-timestamp", release.id)));

            let package = package_node(decl, id(NodeRole::Package), false)
                .with_input(InputRef::of(&manifest.id))
                .with_input(InputRef::of(&payload.id))
                .with_input(InputRef::of(&properties.id))
                .requires(&check_id);

            nodes.extend([boot, release, ota_gen, payload, properties, manifest, check, package]);
            Some(check_id)
        }
    };

    if options.with_overrides_aggregate {
        let mut aggregate = ArtifactNode::new(
            id(NodeRole::Aggregate),
            NodeKind::Phony {
                overrides: decl.overrides().to_vec(),
            },
        )
        .requires(&id(NodeRole::Package));
        if let Some(check_id) = &check {
            aggregate = aggregate.requires(check_id);
        }
        nodes.push(aggregate);
    }

    nodes
}

fn manifest_node(id: NodeId, request: ManifestRequest) -> ArtifactNode {
    ArtifactNode::new(
        id,
        NodeKind::Derive {
            tool: Tool::ManifestBuilder,
            args: request.args(),
        },
    )
    .with_output(Output::file(MANIFEST_FILE))
}

fn copy_node(id: NodeId, producer: &NodeId, tag: OutputTag, file: &str) -> ArtifactNode {
    ArtifactNode::new(
        id,
        NodeKind::Derive {
            tool: Tool::Copy {
                relative_install_path: OTA_INSTALL_PATH.to_string(),
            },
            args: Vec::new(),
        },
    )
    .with_input(InputRef::tagged(producer, tag))
    .with_output(Output::file(file))
}

fn package_node(decl: &ValidatedDeclaration, id: NodeId, installable: bool) -> ArtifactNode {
    let package_name = decl.package_name();
    let file = format!("{}.apex", package_name);
    ArtifactNode::new(
        id,
        NodeKind::Package {
            package_name,
            installable,
            overrides: decl.overrides().to_vec(),
        },
    )
    .with_output(Output::file(file))
}

fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::RawDeclaration;
    use crate::graph::BuildGraph;
    use std::collections::HashSet;

    fn ota_decl() -> ValidatedDeclaration {
        RawDeclaration {
            name: "pkg_kmi_5_4_android12_0".to_string(),
            product_out_path: Some("boot.img".to_string()),
            kmi_version: Some("5.4-android12-0".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    fn factory_decl() -> ValidatedDeclaration {
        RawDeclaration {
            name: "com.android.gki.kmi_5_4_android12_0".to_string(),
            factory: Some(true),
            kmi_version: Some("5.4-android12-0".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    fn roles(nodes: &[ArtifactNode]) -> Vec<NodeRole> {
        nodes.iter().map(|node| node.id.role).collect()
    }

    #[test]
    fn test_ineligible_emits_nothing() {
        assert!(assemble(&ota_decl(), false).is_empty());
        assert!(assemble(&factory_decl(), false).is_empty());
    }

    #[test]
    fn test_real_pipeline_order() {
        let nodes = assemble(&ota_decl(), true);
        assert_eq!(
            roles(&nodes),
            vec![
                NodeRole::BootImage,
                NodeRole::KernelRelease,
                NodeRole::OtaPayloadGen,
                NodeRole::OtaPayload,
                NodeRole::OtaPayloadProperties,
                NodeRole::Manifest,
                NodeRole::KmiCheck,
                NodeRole::Package,
            ]
        );

        let stages: Vec<u8> = nodes.iter().map(ArtifactNode::stage).collect();
        let mut sorted = stages.clone();
        sorted.sort();
        assert_eq!(stages, sorted);

        let package = nodes.last().unwrap();
        assert_eq!(package.name(), "pkg_kmi_5_4_android12_0");
        assert_eq!(
            package.kind,
            NodeKind::Package {
                package_name: "com.android.gki.kmi_5_4_android12_0".to_string(),
                installable: false,
                overrides: vec![],
            }
        );
        assert_eq!(package.required, vec![NodeId::new("pkg_kmi_5_4_android12_0", NodeRole::KmiCheck)]);
        assert_eq!(package.outputs[0].file, "com.android.gki.kmi_5_4_android12_0.apex");
    }

    #[test]
    fn test_real_pipeline_is_a_valid_graph() {
        let mut graph = BuildGraph::new();
        graph.extend(assemble(&ota_decl(), true)).unwrap();
        assert_eq!(graph.len(), 8);
        assert_eq!(graph.stage_count("pkg_kmi_5_4_android12_0"), 7);

        let check = graph
            .get(&NodeId::new("pkg_kmi_5_4_android12_0", NodeRole::KmiCheck))
            .unwrap();
        match &check.kind {
            NodeKind::Derive {
                tool: Tool::CheckKmiVersion(kmi_check),
                ..
            } => assert_eq!(kmi_check.source, "boot.img"),
            other => panic!("unexpected check node {:?}", other),
        }
        assert_eq!(check.outputs[0].file, "pkg_kmi_5_4_android12_0_kernel_release-timestamp");
    }

    #[test]
    fn test_factory_pipeline() {
        let nodes = assemble(&factory_decl(), true);
        assert_eq!(roles(&nodes), vec![NodeRole::Manifest, NodeRole::Package]);
        assert!(nodes[0].inputs.is_empty());
        match &nodes[1].kind {
            NodeKind::Package { installable, .. } => assert!(*installable),
            other => panic!("unexpected package node {:?}", other),
        }
        assert!(nodes[1].required.is_empty());
    }

    #[test]
    fn test_factory_and_real_node_sets_are_disjoint() {
        let real: HashSet<String> = assemble(&ota_decl(), true).iter().map(ArtifactNode::name).collect();
        let factory: HashSet<String> = assemble(&factory_decl(), true).iter().map(ArtifactNode::name).collect();
        assert!(real.is_disjoint(&factory));
        assert!(assemble(&ota_decl(), true).iter().any(|n| n.id.role == NodeRole::KmiCheck));
        assert!(!assemble(&factory_decl(), true).iter().any(|n| n.id.role == NodeRole::KmiCheck));
    }

    #[test]
    fn test_overrides_aggregate_and_certificate() {
        let decl = RawDeclaration {
            name: "gki_5_10".to_string(),
            product_out_path: Some("out/boot-5.10.img".to_string()),
            kmi_version: Some("5.10-android13-1".to_string()),
            ota_payload_certificate: Some("certs/gki".to_string()),
            overrides: vec!["legacy_gki".to_string()],
            ..Default::default()
        }
        .validate()
        .unwrap();

        let nodes = assemble(&decl, true);
        assert_eq!(nodes.len(), 9);

        assert_eq!(nodes[0].outputs[0].file, "boot-5.10.img");
        match &nodes[2].kind {
            NodeKind::Derive { args, .. } => {
                assert_eq!(args, &vec!["--key", "certs/gki", "boot:boot-5.10.img"])
            }
            other => panic!("unexpected generator node {:?}", other),
        }

        let aggregate = nodes.last().unwrap();
        assert_eq!(aggregate.name(), "gki_5_10_overrides");
        assert_eq!(
            aggregate.kind,
            NodeKind::Phony {
                overrides: vec!["legacy_gki".to_string()]
            }
        );
        assert_eq!(aggregate.required.len(), 2);

        let mut graph = BuildGraph::new();
        graph.extend(nodes).unwrap();
    }

    #[test]
    fn test_explicit_options_override_declaration() {
        let options = PipelineOptions {
            variant: PipelineVariant::Factory,
            with_overrides_aggregate: true,
        };
        let nodes = assemble_with(&factory_decl(), &options);
        assert_eq!(
            roles(&nodes),
            vec![NodeRole::Manifest, NodeRole::Package, NodeRole::Aggregate]
        );
        assert_eq!(nodes[2].required.len(), 1);
    }
}
