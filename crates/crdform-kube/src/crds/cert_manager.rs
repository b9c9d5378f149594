//! cert-manager.io

use crdform_core::Attribute;

use crate::crd::CrdDescriptor;

pub const CERTIFICATE_V1: CrdDescriptor = CrdDescriptor {
    group: "cert-manager.io",
    version: "v1",
    kind: "Certificate",
    plural: "certificates",
    namespaced: true,
    description: "A Certificate resource should be created to ensure an up to date and signed \
                  X.509 certificate is stored in the Kubernetes Secret resource named in \
                  spec.secretName.",
    spec_required: true,
    spec: certificate_spec,
};

pub const CLUSTER_ISSUER_V1: CrdDescriptor = CrdDescriptor {
    group: "cert-manager.io",
    version: "v1",
    kind: "ClusterIssuer",
    plural: "clusterissuers",
    namespaced: false,
    description: "A ClusterIssuer represents a certificate issuing authority which can be \
                  referenced as part of issuerRef fields. It is similar to an Issuer, however \
                  it is cluster-scoped.",
    spec_required: true,
    spec: cluster_issuer_spec,
};

fn issuer_ref() -> Attribute {
    Attribute::object(
        "issuer_ref",
        vec![
            Attribute::string("name").required(),
            Attribute::string("kind").describe("Kind of the issuer, Issuer or ClusterIssuer."),
            Attribute::string("group"),
        ],
    )
    .required()
    .describe("Reference to the issuer responsible for issuing the certificate.")
}

fn certificate_spec() -> Vec<Attribute> {
    vec![
        Attribute::string("secret_name")
            .required()
            .describe("Name of the Secret resource that will be automatically created and managed."),
        issuer_ref(),
        Attribute::string("common_name"),
        Attribute::string_list("dns_names").json("dnsNames"),
        Attribute::string_list("ip_addresses").json("ipAddresses"),
        Attribute::string_list("uris"),
        Attribute::string_list("email_addresses"),
        Attribute::string("duration").describe("Requested 'duration' (i.e. lifetime) of the Certificate."),
        Attribute::string("renew_before"),
        Attribute::bool("is_ca").json("isCA"),
        Attribute::string_list("usages"),
        Attribute::int64("revision_history_limit"),
        Attribute::object(
            "private_key",
            vec![
                Attribute::string("algorithm").describe("RSA, ECDSA or Ed25519."),
                Attribute::string("encoding"),
                Attribute::int64("size"),
                Attribute::string("rotation_policy"),
            ],
        ),
        Attribute::object(
            "secret_template",
            vec![
                Attribute::string_map("labels"),
                Attribute::string_map("annotations"),
            ],
        ),
        Attribute::object(
            "subject",
            vec![
                Attribute::string_list("organizations"),
                Attribute::string_list("organizational_units"),
                Attribute::string_list("countries"),
                Attribute::string_list("localities"),
                Attribute::string_list("provinces"),
                Attribute::string("serial_number"),
            ],
        ),
    ]
}

fn secret_key_selector(name: &str) -> Attribute {
    Attribute::object(
        name,
        vec![Attribute::string("name").required(), Attribute::string("key")],
    )
}

fn cluster_issuer_spec() -> Vec<Attribute> {
    vec![
        Attribute::object(
            "acme",
            vec![
                Attribute::string("server")
                    .required()
                    .describe("URL used to access the ACME server's 'directory' endpoint."),
                Attribute::string("email"),
                secret_key_selector("private_key_secret_ref").required(),
                Attribute::bool("skip_tls_verify").json("skipTLSVerify"),
                Attribute::string("preferred_chain"),
                Attribute::dynamic("solvers")
                    .describe("Challenge solvers, passed through as written."),
            ],
        ),
        Attribute::object(
            "ca",
            vec![
                Attribute::string("secret_name").required(),
                Attribute::string_list("crl_distribution_points"),
            ],
        ),
        Attribute::object(
            "self_signed",
            vec![Attribute::string_list("crl_distribution_points")],
        ),
        Attribute::dynamic("vault"),
    ]
}
