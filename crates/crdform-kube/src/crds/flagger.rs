//! flagger.app

use crdform_core::Attribute;

use crate::crd::CrdDescriptor;

pub const CANARY_V1BETA1: CrdDescriptor = CrdDescriptor {
    group: "flagger.app",
    version: "v1beta1",
    kind: "Canary",
    plural: "canaries",
    namespaced: true,
    description: "Canary is the Schema for the Canary API.",
    spec_required: true,
    spec: canary_spec,
};

fn object_reference(name: &str) -> Attribute {
    Attribute::object(
        name,
        vec![
            Attribute::string("api_version").json("apiVersion"),
            Attribute::string("kind").required(),
            Attribute::string("name").required(),
        ],
    )
}

fn metric() -> Vec<Attribute> {
    vec![
        Attribute::string("name").required(),
        Attribute::string("interval"),
        Attribute::number("threshold"),
        Attribute::object(
            "threshold_range",
            vec![
                Attribute::number("min").describe("Minimum value, integer or fractional."),
                Attribute::number("max").describe("Maximum value, integer or fractional."),
            ],
        ),
        Attribute::string("query"),
        Attribute::object(
            "template_ref",
            vec![
                Attribute::string("name").required(),
                Attribute::string("namespace"),
            ],
        ),
    ]
}

fn webhook() -> Vec<Attribute> {
    vec![
        Attribute::string("name").required(),
        Attribute::string("type"),
        Attribute::string("url").required(),
        Attribute::string("timeout"),
        Attribute::string_map("metadata"),
    ]
}

fn canary_spec() -> Vec<Attribute> {
    vec![
        object_reference("target_ref")
            .required()
            .describe("Deployment or DaemonSet this canary controls."),
        object_reference("autoscaler_ref"),
        object_reference("ingress_ref"),
        Attribute::string("provider"),
        Attribute::int64("progress_deadline_seconds"),
        Attribute::bool("skip_analysis"),
        Attribute::object(
            "service",
            vec![
                Attribute::int64("port").required(),
                Attribute::int_or_string("target_port")
                    .describe("Container port number or name."),
                Attribute::string("port_name"),
                Attribute::bool("port_discovery"),
                Attribute::string_list("gateways"),
                Attribute::string_list("hosts"),
                Attribute::string("timeout"),
            ],
        )
        .required(),
        Attribute::object(
            "analysis",
            vec![
                Attribute::string("interval"),
                Attribute::int64("threshold"),
                Attribute::int64("max_weight"),
                Attribute::int64("step_weight"),
                Attribute::int64("iterations"),
                Attribute::int64("primary_ready_threshold"),
                Attribute::object_list("metrics", metric()),
                Attribute::object_list("webhooks", webhook()),
                Attribute::dynamic("match"),
            ],
        ),
    ]
}
