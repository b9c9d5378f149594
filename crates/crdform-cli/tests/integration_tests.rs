//! Integration tests for CLI commands that need no cluster

use std::process::Command;

/// Helper to run crdform command
fn crdform(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_crdform"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute crdform")
}

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

const CERTIFICATE: &str = "k8s_cert_manager_io_certificate_v1";

mod types_command {
    use super::*;

    #[test]
    fn test_types_lists_handlers() {
        let output = crdform(&["types"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Data sources"));
        assert!(stdout.contains("Resources"));
        assert!(stdout.contains("k8s_cert_manager_io_certificate_v1_manifest"));
        assert!(stdout.contains("k8s_flagger_app_canary_v1beta1"));
    }

    #[test]
    fn test_types_json() {
        let output = crdform(&["types", "--json"]);

        assert!(output.status.success());
        let json: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
        let resources = json["resources"].as_array().unwrap();
        let data_sources = json["data_sources"].as_array().unwrap();
        assert_eq!(data_sources.len(), 2 * resources.len());
        assert!(resources.contains(&serde_json::json!(CERTIFICATE)));
    }

    #[test]
    fn test_unknown_flag_is_usage_error() {
        let output = crdform(&["types", "--bogus"]);
        assert_eq!(output.status.code(), Some(64));
    }
}

mod schema_command {
    use super::*;

    #[test]
    fn test_resource_schema() {
        let output = crdform(&["schema", CERTIFICATE]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("field_manager"));
        assert!(stdout.contains("wait_for_upsert"));
        assert!(stdout.contains("secret_name"));
    }

    #[test]
    fn test_data_source_schema_json() {
        let output = crdform(&["schema", CERTIFICATE, "--data-source", "--json"]);

        assert!(output.status.success());
        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let attributes = &json["attributes"];
        assert!(attributes.get("field_manager").is_none());
        assert_eq!(attributes["metadata"]["required"], true);
        assert_eq!(attributes["spec"]["computed"], true);
        assert_eq!(
            attributes["spec"]["attributes"]["secret_name"]["json_name"],
            "secretName"
        );
    }

    #[test]
    fn test_manifest_schema_json() {
        let output = crdform(&[
            "schema",
            "k8s_cert_manager_io_certificate_v1_manifest",
            "--json",
        ]);

        assert!(output.status.success());
        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["attributes"]["yaml"]["computed"], true);
    }

    #[test]
    fn test_unknown_type() {
        let output = crdform(&["schema", "k8s_example_com_widget_v1"]);

        assert_eq!(output.status.code(), Some(64));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("unknown type 'k8s_example_com_widget_v1'"));
    }
}

mod render_command {
    use super::*;

    const CERTIFICATE_MANIFEST: &str = "k8s_cert_manager_io_certificate_v1_manifest";

    #[test]
    fn test_render_certificate() {
        let output = crdform(&[
            "render",
            CERTIFICATE_MANIFEST,
            "-f",
            &fixture("certificate_manifest.yaml"),
        ]);

        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("apiVersion: cert-manager.io/v1"));
        assert!(stdout.contains("kind: Certificate"));
        assert!(stdout.contains("secretName: web-tls"));
        assert!(stdout.contains("issuerRef:"));
    }

    #[test]
    fn test_render_state() {
        let output = crdform(&[
            "render",
            CERTIFICATE_MANIFEST,
            "-f",
            &fixture("certificate_manifest.yaml"),
            "--state",
        ]);

        assert!(output.status.success());
        let state: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(state["id"], "default/web");
        assert!(state["yaml"].as_str().unwrap().contains("dnsNames"));
    }

    #[test]
    fn test_render_canary_numbers() {
        let output = crdform(&[
            "render",
            "k8s_flagger_app_canary_v1beta1_manifest",
            "-f",
            &fixture("canary_manifest.yaml"),
        ]);

        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        let yaml: serde_json::Value = serde_yaml::from_slice(&output.stdout).unwrap();
        assert_eq!(yaml["spec"]["service"]["targetPort"], "http");
        assert_eq!(yaml["spec"]["analysis"]["maxWeight"], 50);
        assert_eq!(
            yaml["spec"]["analysis"]["metrics"][0]["thresholdRange"]["min"],
            99
        );
    }

    #[test]
    fn test_render_rejects_namespace_on_cluster_scoped_kind() {
        let output = crdform(&[
            "render",
            "k8s_cert_manager_io_cluster_issuer_v1_manifest",
            "-f",
            &fixture("cluster_issuer_namespaced.yaml"),
        ]);

        assert_eq!(output.status.code(), Some(2));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("metadata.namespace"));
    }

    #[test]
    fn test_render_resource_config_has_extra_attributes() {
        // Resource configs carry settings a manifest does not accept
        let output = crdform(&[
            "render",
            CERTIFICATE_MANIFEST,
            "-f",
            &fixture("certificate.yaml"),
        ]);

        assert_eq!(output.status.code(), Some(2));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("field_manager"));
    }

    #[test]
    fn test_render_requires_manifest_type() {
        let output = crdform(&[
            "render",
            CERTIFICATE,
            "-f",
            &fixture("certificate_manifest.yaml"),
        ]);
        assert_eq!(output.status.code(), Some(64));
    }

    #[test]
    fn test_render_missing_file() {
        let output = crdform(&[
            "render",
            CERTIFICATE_MANIFEST,
            "-f",
            &fixture("does-not-exist.yaml"),
        ]);
        assert_eq!(output.status.code(), Some(5));
    }

    #[test]
    fn test_render_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "metadata: [unclosed\n").unwrap();

        let output = crdform(&["render", CERTIFICATE_MANIFEST, "-f", path.to_str().unwrap()]);
        assert_eq!(output.status.code(), Some(2));
    }
}

mod cluster_commands {
    use super::*;

    #[test]
    fn test_apply_reads_config_before_connecting() {
        let output = crdform(&[
            "apply",
            CERTIFICATE,
            "-f",
            &fixture("does-not-exist.yaml"),
        ]);
        assert_eq!(output.status.code(), Some(5));
    }

    #[test]
    fn test_refresh_rejects_malformed_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let output = crdform(&["refresh", CERTIFICATE, "--state", path.to_str().unwrap()]);
        assert_eq!(output.status.code(), Some(2));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Invalid state file"));
    }

    #[test]
    fn test_destroy_needs_file_or_state() {
        let output = crdform(&["destroy", CERTIFICATE]);
        assert_eq!(output.status.code(), Some(64));
    }
}
