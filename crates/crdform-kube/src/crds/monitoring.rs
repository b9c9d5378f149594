//! monitoring.coreos.com

use crdform_core::{AttrKind, Attribute};

use crate::crd::CrdDescriptor;

pub const SERVICE_MONITOR_V1: CrdDescriptor = CrdDescriptor {
    group: "monitoring.coreos.com",
    version: "v1",
    kind: "ServiceMonitor",
    plural: "servicemonitors",
    namespaced: true,
    description: "ServiceMonitor defines monitoring for a set of services.",
    spec_required: true,
    spec: service_monitor_spec,
};

fn label_selector(name: &str) -> Attribute {
    Attribute::object(
        name,
        vec![
            Attribute::string_map("match_labels"),
            Attribute::object_list(
                "match_expressions",
                vec![
                    Attribute::string("key").required(),
                    Attribute::string("operator").required(),
                    Attribute::string_list("values"),
                ],
            ),
        ],
    )
}

fn endpoint() -> Vec<Attribute> {
    vec![
        Attribute::string("port").describe("Name of the service port this endpoint refers to."),
        Attribute::int_or_string("target_port"),
        Attribute::string("path"),
        Attribute::string("scheme"),
        Attribute::new("params", AttrKind::map_of(AttrKind::list_of(AttrKind::String))),
        Attribute::string("interval"),
        Attribute::string("scrape_timeout"),
        Attribute::bool("honor_labels"),
        Attribute::bool("honor_timestamps"),
        Attribute::string("bearer_token_file"),
        Attribute::dynamic("tls_config"),
        Attribute::dynamic("relabelings"),
        Attribute::dynamic("metric_relabelings"),
    ]
}

fn service_monitor_spec() -> Vec<Attribute> {
    vec![
        label_selector("selector")
            .required()
            .describe("Label selector to select the Kubernetes Endpoints objects."),
        Attribute::object_list("endpoints", endpoint()),
        Attribute::object(
            "namespace_selector",
            vec![
                Attribute::bool("any"),
                Attribute::string_list("match_names"),
            ],
        ),
        Attribute::string("job_label"),
        Attribute::string_list("target_labels"),
        Attribute::string_list("pod_target_labels"),
        Attribute::int64("sample_limit"),
        Attribute::int64("target_limit"),
        Attribute::int64("label_limit"),
    ]
}
