use aus_cli::cli::build_cli;
use aus_cli::commands::{self, Context};
use aus_cli::config::CliConfig;
use aus_core::InputError;
use aus_labels::{BackendError, LabelsPolicyBackend, PolicyBackend, VersionGate};
use aus_test_utils::{
    org_scope, subscription_scope, version_gate, FailingOcm, GateAgreement, MemoryOcm,
};
use pretty_assertions::assert_eq;

const DEPS: &str = "sre-capabilities.aus.sector-deps.";
const CAP: &str = "sre-capabilities.aus.sector-max-parallel-upgrades.";
const BLOCKED: &str = "sre-capabilities.aus.blocked-versions";
const INHERIT: &str = "sre-capabilities.aus.version-data.inherit";
const SCHEDULE: &str = "sre-capabilities.aus.schedule";
const WORKLOADS: &str = "sre-capabilities.aus.workloads";

fn run_with(backend: &dyn PolicyBackend, argv: &[&str], stdin: &str) -> anyhow::Result<String> {
    let matches =
        build_cli().try_get_matches_from(std::iter::once("aus").chain(argv.iter().copied()))?;
    let config = CliConfig::default();
    let context = Context::new(backend, &config);
    let mut output = Vec::new();
    commands::run(&context, &matches, &mut stdin.as_bytes(), &mut output)?;
    Ok(String::from_utf8(output)?)
}

fn run(ocm: &MemoryOcm, argv: &[&str]) -> anyhow::Result<String> {
    run_with(&LabelsPolicyBackend::new(ocm, ocm), argv, "")
}

fn deps(sector: &str) -> String {
    format!("{DEPS}{sector}")
}

#[test]
fn apply_sectors_merges_with_current() {
    let ocm = MemoryOcm::new().with_label(org_scope(), &deps("prod"), "stage");

    run(&ocm, &["apply", "sectors", "-a", "prod=canary", "-a", "stage=dev"]).unwrap();

    assert_eq!(
        ocm.value(&org_scope(), &deps("prod")).as_deref(),
        Some("stage,canary")
    );
    assert_eq!(ocm.value(&org_scope(), &deps("stage")).as_deref(), Some("dev"));
}

#[test]
fn apply_sectors_replace_drops_current() {
    let ocm = MemoryOcm::new().with_label(org_scope(), &deps("prod"), "stage");

    run(&ocm, &["apply", "sectors", "--replace", "-a", "stage=dev"]).unwrap();

    assert_eq!(ocm.value(&org_scope(), &deps("prod")), None);
    assert_eq!(ocm.value(&org_scope(), &deps("stage")).as_deref(), Some("dev"));
}

#[test]
fn apply_sectors_sets_and_clears_caps() {
    let ocm = MemoryOcm::new()
        .with_label(org_scope(), &deps("prod"), "stage")
        .with_label(org_scope(), &format!("{CAP}stage"), "1");

    run(
        &ocm,
        &[
            "apply",
            "sectors",
            "--sector-max-parallel-upgrades",
            "prod=3",
            "-m",
            "stage",
        ],
    )
    .unwrap();

    assert_eq!(ocm.value(&org_scope(), &format!("{CAP}prod")).as_deref(), Some("3"));
    assert_eq!(ocm.value(&org_scope(), &format!("{CAP}stage")), None);
}

#[test]
fn apply_sectors_dump_prints_without_writing() {
    let ocm = MemoryOcm::new();

    let out = run(&ocm, &["apply", "sectors", "-a", "prod=stage", "--dump"]).unwrap();

    let dumped: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        dumped,
        serde_json::json!([{"name": "prod", "dependencies": ["stage"]}])
    );
    assert!(ocm.operations().is_empty());
}

#[test]
fn apply_sectors_from_stdin_ignores_flags() {
    let ocm = MemoryOcm::new();
    let backend = LabelsPolicyBackend::new(&ocm, &ocm);

    run_with(
        &backend,
        &["apply", "sectors", "-a", "ignored=x", "-"],
        r#"[{"name": "prod", "dependencies": ["stage"], "maxParallelUpgrades": "2"}]"#,
    )
    .unwrap();

    assert_eq!(ocm.value(&org_scope(), &deps("prod")).as_deref(), Some("stage"));
    assert_eq!(ocm.value(&org_scope(), &format!("{CAP}prod")).as_deref(), Some("2"));
    assert_eq!(ocm.value(&org_scope(), &deps("ignored")), None);
}

#[test]
fn apply_sectors_rejects_empty_name() {
    let ocm = MemoryOcm::new();
    let err = run(&ocm, &["apply", "sectors", "-a", "=stage"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<InputError>(),
        Some(InputError::EmptySectorName { .. })
    ));
    assert!(ocm.operations().is_empty());
}

#[test]
fn apply_version_blocks_requires_changes() {
    let ocm = MemoryOcm::new();
    let err = run(&ocm, &["apply", "version-blocks"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<InputError>(),
        Some(InputError::NoVersionBlockChanges)
    ));
}

#[test]
fn apply_version_blocks_block_and_unblock() {
    let ocm = MemoryOcm::new().with_label(org_scope(), BLOCKED, "4.11.*,4.12.1");

    run(&ocm, &["apply", "version-blocks", "-b", "4.13.*", "-u", "4.12.1"]).unwrap();

    assert_eq!(
        ocm.value(&org_scope(), BLOCKED).as_deref(),
        Some("4.11.*,4.13.*")
    );
}

#[test]
fn apply_version_blocks_from_stdin() {
    let ocm = MemoryOcm::new();
    let backend = LabelsPolicyBackend::new(&ocm, &ocm);

    run_with(
        &backend,
        &["apply", "version-blocks", "--replace", "-"],
        r#"["4.14.0", " 4.13.* "]"#,
    )
    .unwrap();

    assert_eq!(
        ocm.value(&org_scope(), BLOCKED).as_deref(),
        Some("4.13.*,4.14.0")
    );
}

#[test]
fn apply_inheritance_is_additive() {
    let ocm = MemoryOcm::new().with_label(org_scope(), INHERIT, "org-2");

    run(&ocm, &["apply", "inheritance", "-i", "org-3,org-4"]).unwrap();

    assert_eq!(
        ocm.value(&org_scope(), INHERIT).as_deref(),
        Some("org-2,org-3,org-4")
    );
}

#[test]
fn apply_policy_from_flags_translates_preset() {
    let ocm = MemoryOcm::new().with_cluster("prod-1", "4.12.1", &[]);

    run(
        &ocm,
        &[
            "apply", "policies", "-c", "prod-1", "-s", "weekdays", "-w", "api", "-w", "db",
        ],
    )
    .unwrap();

    let scope = subscription_scope("sub-prod-1");
    assert_eq!(ocm.value(&scope, SCHEDULE).as_deref(), Some("* * * * 1-4"));
    assert_eq!(ocm.value(&scope, WORKLOADS).as_deref(), Some("api,db"));
}

#[test]
fn apply_policy_rejects_invalid_input() {
    let ocm = MemoryOcm::new().with_cluster("prod-1", "4.12.1", &[]);

    assert!(run(&ocm, &["apply", "policies", "-c", "prod-1", "-s", "weekdays"]).is_err());
    assert!(run(
        &ocm,
        &["apply", "policies", "-c", "prod-1", "-s", "weekdays", "-w", "api", "-d", "-2"],
    )
    .is_err());
    assert!(run(
        &ocm,
        &["apply", "policies", "-c", "prod-1", "-s", "every tuesday", "-w", "api"],
    )
    .is_err());
    assert!(run(&ocm, &["apply", "policies", "-s", "weekdays", "-w", "api"]).is_err());
    assert!(ocm.operations().is_empty());
}

#[test]
fn apply_policies_from_stdin() {
    let ocm = MemoryOcm::new()
        .with_cluster("a", "4.12.1", &[])
        .with_cluster("b", "4.12.1", &[]);
    let backend = LabelsPolicyBackend::new(&ocm, &ocm);

    run_with(
        &backend,
        &["apply", "policies", "-"],
        r#"[
            {"name": "a", "schedule": "anytime", "workloads": ["api"], "conditions": {"soak_days": 0}},
            {"name": "b", "schedule": "30 2 * * *", "workloads": ["api"], "conditions": {"soak_days": 3, "sector": "prod"}}
        ]"#,
    )
    .unwrap();

    assert_eq!(
        ocm.value(&subscription_scope("sub-a"), SCHEDULE).as_deref(),
        Some("* * * * *")
    );
    assert_eq!(
        ocm.value(&subscription_scope("sub-b"), "sre-capabilities.aus.soak-days")
            .as_deref(),
        Some("3")
    );
}

#[test]
fn apply_policies_from_stdin_drops_blank_sector() {
    let ocm = MemoryOcm::new().with_cluster("a", "4.12.1", &[]);
    let backend = LabelsPolicyBackend::new(&ocm, &ocm);

    run_with(
        &backend,
        &["apply", "policies", "-"],
        r#"[{"name": "a", "schedule": "anytime", "workloads": ["api"],
             "conditions": {"soak_days": 0, "sector": "", "blocked_versions": [" 4.12.1,"]}}]"#,
    )
    .unwrap();

    let scope = subscription_scope("sub-a");
    assert_eq!(ocm.value(&scope, "sre-capabilities.aus.sector"), None);
    assert_eq!(ocm.value(&scope, BLOCKED).as_deref(), Some("4.12.1"));
}

#[test]
fn apply_policies_rejects_malformed_stdin() {
    let ocm = MemoryOcm::new();
    let backend = LabelsPolicyBackend::new(&ocm, &ocm);

    let err = run_with(&backend, &["apply", "policies", "-"], "{not json").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<InputError>(),
        Some(InputError::Decode(_))
    ));
}

#[test]
fn get_sectors_prints_json() {
    let ocm = MemoryOcm::new()
        .with_label(org_scope(), &deps("prod"), "stage")
        .with_label(org_scope(), &format!("{CAP}prod"), "2");

    let out = run(&ocm, &["get", "sectors"]).unwrap();
    let sectors: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        sectors,
        serde_json::json!([{"name": "prod", "dependencies": ["stage"], "maxParallelUpgrades": "2"}])
    );
}

#[test]
fn get_version_blocks_with_explicit_org() {
    let ocm = MemoryOcm::new().with_label(org_scope(), BLOCKED, "4.12.*");

    let out = run(&ocm, &["get", "version-blocks", "-o", "org-1"]).unwrap();
    assert_eq!(
        serde_json::from_str::<Vec<String>>(&out).unwrap(),
        vec!["4.12.*"]
    );
}

#[test]
fn delete_policy_removes_labels() {
    let scope = subscription_scope("sub-prod-1");
    let ocm = MemoryOcm::new()
        .with_cluster("prod-1", "4.12.1", &[])
        .with_label(scope.clone(), SCHEDULE, "* * * * *")
        .with_label(scope.clone(), WORKLOADS, "api");

    run(&ocm, &["delete", "policy", "-c", "prod-1", "--dry-run"]).unwrap();
    assert_eq!(ocm.labels_of(&scope).len(), 2);

    run(&ocm, &["delete", "policy", "-c", "prod-1"]).unwrap();
    assert!(ocm.labels_of(&scope).is_empty());
}

#[test]
fn check_version_reports_blocks() {
    let ocm = MemoryOcm::new()
        .with_cluster("prod-1", "4.12.1", &[])
        .with_cluster("prod-2", "4.12.1", &[])
        .with_label(org_scope(), BLOCKED, "^4\\.14\\.")
        .with_label(subscription_scope("sub-prod-1"), SCHEDULE, "* * * * *")
        .with_label(subscription_scope("sub-prod-1"), WORKLOADS, "api")
        .with_label(subscription_scope("sub-prod-1"), BLOCKED, "4.13.2")
        .with_label(subscription_scope("sub-prod-2"), SCHEDULE, "* * * * *")
        .with_label(subscription_scope("sub-prod-2"), WORKLOADS, "api");

    let out = run(&ocm, &["check-version", "4.13.2"]).unwrap();
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&out).unwrap(),
        serde_json::json!({
            "version": "4.13.2",
            "blocked_for_organization": false,
            "blocked_for_clusters": ["prod-1"]
        })
    );

    let out = run(&ocm, &["check-version", "4.14.0"]).unwrap();
    let check: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(check["blocked_for_organization"], true);
}

#[test]
fn status_describes_organization() {
    let ocm = MemoryOcm::new()
        .with_cluster("prod-1", "4.12.1", &["4.12.2"])
        .with_label(org_scope(), &deps("prod"), "stage")
        .with_label(subscription_scope("sub-prod-1"), SCHEDULE, "* * * * *")
        .with_label(subscription_scope("sub-prod-1"), WORKLOADS, "api");

    let out = run(&ocm, &["status"]).unwrap();
    assert!(out.starts_with("Organization ID:"));
    assert!(out.contains("Organization name:"));
    assert!(out.contains("Test Org"));
    assert!(out.contains("Sector configuration: (2 in total)"));
    assert!(out.contains("Clusters: (1 in total)"));
    assert!(out.contains("prod-1"));
}

fn sts_only(gate: VersionGate) -> VersionGate {
    VersionGate {
        sts_only: true,
        ..gate
    }
}

fn gate_rows(out: &str) -> Vec<Vec<&str>> {
    out.lines()
        .skip_while(|line| !line.starts_with("Unacknowledged version gates:"))
        .skip(2)
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .collect()
}

#[test]
fn get_gates_lists_unacknowledged_sts_gates() {
    let ocm = MemoryOcm::new()
        .with_sts_cluster("rosa-2", "4.13.4", &["4.14.1"])
        .with_sts_cluster("rosa-1", "4.13.4", &["4.13.5", "4.14.1", "4.15.0"])
        .with_cluster("osd-1", "4.13.4", &["4.14.1"])
        .with_version_gate(version_gate("gate-414", "4.14"))
        .with_version_gate(sts_only(version_gate("gate-414-sts", "4.14")))
        .with_version_gate(version_gate("gate-415", "4.15"))
        .with_gate_agreement("rosa-2", "gate-414")
        .with_label(org_scope(), BLOCKED, "^4\\.15\\.");

    let out = run(&ocm, &["get", "gates"]).unwrap();
    assert!(out.starts_with("Organization ID:"));
    let rows = gate_rows(&out);
    let listed: Vec<(&str, &str)> = rows.iter().map(|row| (row[0], row[row.len() - 2])).collect();
    assert_eq!(
        listed,
        vec![
            ("rosa-1", "gate-414"),
            ("rosa-1", "gate-414-sts"),
            ("rosa-2", "gate-414-sts"),
        ]
    );
    assert_eq!(&rows[0][..3], &["rosa-1", "4.13.4", "4.14"]);
}

#[test]
fn get_gates_honours_cluster_blocked_versions() {
    let scope = subscription_scope("sub-rosa-1");
    let ocm = MemoryOcm::new()
        .with_sts_cluster("rosa-1", "4.13.4", &["4.14.1"])
        .with_version_gate(version_gate("gate-414", "4.14"))
        .with_label(scope.clone(), SCHEDULE, "* * * * *")
        .with_label(scope.clone(), WORKLOADS, "api")
        .with_label(scope, BLOCKED, "^4\\.14\\.");

    let out = run(&ocm, &["get", "gates"]).unwrap();
    assert!(gate_rows(&out).is_empty());
}

#[test]
fn apply_gate_agreement_acknowledges_y_stream() {
    let ocm = MemoryOcm::new()
        .with_cluster("osd-1", "4.13.4", &["4.14.1", "4.15.0"])
        .with_version_gate(version_gate("gate-414", "4.14"))
        .with_version_gate(sts_only(version_gate("gate-414-sts", "4.14")))
        .with_version_gate(version_gate("gate-415", "4.15"));
    let agreement = |dry_run| GateAgreement {
        cluster_id: "cluster-osd-1".to_string(),
        gate_id: "gate-414".to_string(),
        dry_run,
    };

    let argv = ["apply", "gate-agreement", "-c", "osd-1", "--version", "4.14"];
    let dry_run: Vec<&str> = argv.iter().copied().chain(["--dry-run"]).collect();
    run(&ocm, &dry_run).unwrap();
    assert_eq!(ocm.gate_agreements_of("osd-1"), vec![agreement(true)]);

    run(&ocm, &argv).unwrap();
    assert_eq!(
        ocm.gate_agreements_of("osd-1"),
        vec![agreement(true), agreement(false)]
    );

    run(&ocm, &argv).unwrap();
    assert_eq!(ocm.gate_agreements_of("osd-1").len(), 2);
}

#[test]
fn apply_gate_agreement_rejects_bad_input() {
    let ocm = MemoryOcm::new().with_cluster("osd-1", "4.13.4", &["4.14.1"]);

    let err = run(
        &ocm,
        &["apply", "gate-agreement", "-c", "osd-1", "--version", "4.14.1"],
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BackendError>(),
        Some(BackendError::Input(InputError::InvalidYStream(_)))
    ));

    let err = run(
        &ocm,
        &["apply", "gate-agreement", "-c", "missing", "--version", "4.14"],
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BackendError>(),
        Some(BackendError::NotFound { .. })
    ));
}

#[test]
fn backend_failures_surface() {
    let backend = LabelsPolicyBackend::new(FailingOcm, FailingOcm);
    assert!(run_with(&backend, &["get", "sectors"], "").is_err());
    assert!(run_with(&backend, &["status"], "").is_err());
    assert!(run_with(&backend, &["get", "gates"], "").is_err());
    let dumped = run_with(
        &backend,
        &["apply", "sectors", "--replace", "--dump", "-a", "a=b"],
        "",
    )
    .unwrap();
    assert!(dumped.contains("\"a\""));
}
