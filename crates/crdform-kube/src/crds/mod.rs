//! Built-in CRD descriptors

pub mod argo;
pub mod cert_manager;
pub mod flagger;
pub mod monitoring;

use crate::crd::CrdDescriptor;

/// Every kind the provider serves
pub static ALL: &[&CrdDescriptor] = &[
    &argo::APPLICATION_V1ALPHA1,
    &cert_manager::CERTIFICATE_V1,
    &cert_manager::CLUSTER_ISSUER_V1,
    &flagger::CANARY_V1BETA1,
    &monitoring::SERVICE_MONITOR_V1,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crdform_core::{AttrKind, Attribute};
    use std::collections::HashSet;

    fn assert_unique(attrs: &[Attribute], path: &str) {
        let mut names = HashSet::new();
        let mut json_names = HashSet::new();
        for attr in attrs {
            assert!(names.insert(&attr.name), "duplicate {path}.{}", attr.name);
            assert!(
                json_names.insert(&attr.json_name),
                "duplicate JSON name {path}.{}",
                attr.json_name
            );
            let mut kind = &attr.kind;
            while let AttrKind::List(inner) | AttrKind::Map(inner) = kind {
                kind = inner.as_ref();
            }
            if let AttrKind::Object(children) = kind {
                assert_unique(children, &format!("{path}.{}", attr.name));
            }
        }
    }

    #[test]
    fn test_type_names() {
        let names: Vec<String> = ALL.iter().map(|c| c.type_name()).collect();
        assert_eq!(
            names,
            vec![
                "k8s_argoproj_io_application_v1alpha1",
                "k8s_cert_manager_io_certificate_v1",
                "k8s_cert_manager_io_cluster_issuer_v1",
                "k8s_flagger_app_canary_v1beta1",
                "k8s_monitoring_coreos_com_service_monitor_v1",
            ]
        );
    }

    #[test]
    fn test_schemas_are_well_formed() {
        for crd in ALL {
            assert_unique(&crd.spec_attributes(), crd.kind);
            assert_unique(&crd.metadata_attributes(), "metadata");
        }
    }

    #[test]
    fn test_json_name_overrides() {
        let spec = argo::APPLICATION_V1ALPHA1.spec_attributes();
        let source = spec.iter().find(|a| a.name == "source").unwrap();
        let AttrKind::Object(fields) = &source.kind else {
            panic!("source is an object");
        };
        assert_eq!(fields[0].json_name, "repoURL");

        let spec = cert_manager::CERTIFICATE_V1.spec_attributes();
        assert!(spec.iter().any(|a| a.json_name == "isCA"));
    }
}
