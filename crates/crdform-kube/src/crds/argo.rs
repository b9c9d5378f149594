//! argoproj.io

use crdform_core::Attribute;

use crate::crd::CrdDescriptor;

pub const APPLICATION_V1ALPHA1: CrdDescriptor = CrdDescriptor {
    group: "argoproj.io",
    version: "v1alpha1",
    kind: "Application",
    plural: "applications",
    namespaced: true,
    description: "Application is a definition of Application resource.",
    spec_required: true,
    spec: application_spec,
};

fn helm() -> Attribute {
    Attribute::object(
        "helm",
        vec![
            Attribute::string("release_name"),
            Attribute::string_list("value_files"),
            Attribute::string("values"),
            Attribute::dynamic("values_object")
                .describe("Helm values as a structured object, passed through unchanged."),
            Attribute::object_list(
                "parameters",
                vec![
                    Attribute::string("name"),
                    Attribute::string("value"),
                    Attribute::bool("force_string"),
                ],
            ),
            Attribute::bool("skip_crds").json("skipCrds"),
            Attribute::bool("pass_credentials"),
        ],
    )
}

fn source() -> Attribute {
    Attribute::object(
        "source",
        vec![
            Attribute::string("repo_url")
                .json("repoURL")
                .required()
                .describe("URL to the repository (Git or Helm) that contains the application manifests."),
            Attribute::string("path"),
            Attribute::string("target_revision"),
            Attribute::string("chart"),
            helm(),
            Attribute::dynamic("kustomize"),
            Attribute::dynamic("directory"),
        ],
    )
}

fn sync_policy() -> Attribute {
    Attribute::object(
        "sync_policy",
        vec![
            Attribute::object(
                "automated",
                vec![
                    Attribute::bool("prune"),
                    Attribute::bool("self_heal"),
                    Attribute::bool("allow_empty"),
                ],
            ),
            Attribute::string_list("sync_options"),
            Attribute::object(
                "retry",
                vec![
                    Attribute::int64("limit"),
                    Attribute::object(
                        "backoff",
                        vec![
                            Attribute::string("duration"),
                            Attribute::int64("factor"),
                            Attribute::string("max_duration"),
                        ],
                    ),
                ],
            ),
        ],
    )
}

fn application_spec() -> Vec<Attribute> {
    vec![
        Attribute::string("project")
            .required()
            .describe("Reference to the project this application belongs to."),
        Attribute::object(
            "destination",
            vec![
                Attribute::string("server"),
                Attribute::string("namespace"),
                Attribute::string("name"),
            ],
        )
        .required(),
        source(),
        sync_policy(),
        Attribute::dynamic("ignore_differences"),
        Attribute::object_list(
            "info",
            vec![
                Attribute::string("name").required(),
                Attribute::string("value").required(),
            ],
        ),
        Attribute::int64("revision_history_limit"),
    ]
}
