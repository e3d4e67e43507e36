//! Cross-cutting properties of every synthesized Deployment
//!
//! These run over a grid of ecosystems (with and without Clair, persistent
//! storage, pull secrets, and databases) and check the structural guarantees
//! the apply layer relies on.

use std::collections::BTreeSet;

use quay_common::crd::{
    ClairSpec, Database, QuayEcosystem, QuayEcosystemSpec, QuaySpec, RedisSpec, RegistryBackend,
    RegistryStorage,
};
use quay_workload::k8s::Deployment;
use quay_workload::{DeploymentCompiler, GeneratedDeployments};

const FULL_MANIFEST: &str = r#"
apiVersion: redhatcop.redhat.io/v1alpha1
kind: QuayEcosystem
metadata:
  name: registry
  namespace: quay-enterprise
spec:
  quay:
    imagePullSecretName: redhat-pull-secret
    registryStorage:
      persistentVolumeSize: 50Gi
      persistentVolumeAccessModes: [ReadWriteOnce]
    registryBackends:
      - name: local1
        registryBackendSource:
          local:
            storagePath: /datastorage
      - name: s3
        registryBackendSource:
          s3:
            bucketName: layers
    database:
      volumeSize: 10Gi
      cpu: 500m
      memory: 1Gi
      replicas: 1
  redis:
    imagePullSecretName: redhat-pull-secret
  clair:
    enabled: true
    imagePullSecretName: redhat-pull-secret
    database:
      volumeSize: 5Gi
"#;

fn ecosystems() -> Vec<QuayEcosystemSpec> {
    let mut specs = Vec::new();
    for clair in [false, true] {
        for persistent in [false, true] {
            for pull_secret in [None, Some(String::new()), Some("pull".to_string())] {
                specs.push(QuayEcosystemSpec {
                    quay: QuaySpec {
                        image_pull_secret_name: pull_secret.clone(),
                        registry_backends: vec![
                            RegistryBackend::local("hot", "/hot"),
                            RegistryBackend::local("cold", "/cold"),
                        ],
                        registry_storage: persistent.then(RegistryStorage::default),
                        database: Some(Database {
                            volume_size: Some("1Gi".to_string()),
                            image_pull_secret_name: pull_secret.clone(),
                            ..Default::default()
                        }),
                        ..Default::default()
                    },
                    redis: Some(RedisSpec {
                        image_pull_secret_name: pull_secret.clone(),
                        ..Default::default()
                    }),
                    clair: Some(ClairSpec {
                        enabled: clair,
                        image_pull_secret_name: pull_secret,
                        database: Some(Database::default()),
                        ..Default::default()
                    }),
                });
            }
        }
    }
    specs
}

fn compile(spec: &QuayEcosystemSpec) -> GeneratedDeployments {
    DeploymentCompiler::new("registry", "quay-enterprise", spec)
        .compile_all()
        .expect("ecosystem should compile")
}

fn pod_pull_secret(deployment: &Deployment) -> Option<Vec<String>> {
    deployment
        .spec
        .template
        .spec
        .image_pull_secrets
        .as_ref()
        .map(|refs| refs.iter().map(|r| r.name.clone()).collect())
}

// =============================================================================
// Story: Selectors always match their own pods
// =============================================================================

#[test]
fn selector_equals_template_labels() {
    for spec in ecosystems() {
        for deployment in compile(&spec).iter() {
            assert_eq!(
                deployment.spec.selector.match_labels, deployment.spec.template.metadata.labels,
                "{} selector drifted from its template",
                deployment.metadata.name
            );
            assert!(!deployment.spec.selector.match_labels.is_empty());
        }
    }
}

// =============================================================================
// Story: No dangling mounts and no unused volumes
// =============================================================================

#[test]
fn mounts_and_volumes_pair_up() {
    for spec in ecosystems() {
        for deployment in compile(&spec).iter() {
            let pod = &deployment.spec.template.spec;
            let volumes: Vec<_> = pod.volumes.iter().map(|v| v.name.as_str()).collect();
            let unique: BTreeSet<_> = volumes.iter().copied().collect();
            assert_eq!(unique.len(), volumes.len(), "duplicate volume in {}", deployment.metadata.name);

            let mounted: BTreeSet<_> = pod
                .containers
                .iter()
                .flat_map(|c| c.volume_mounts.iter().map(|m| m.name.as_str()))
                .collect();
            assert_eq!(
                mounted, unique,
                "{} mounts and volumes differ",
                deployment.metadata.name
            );
        }
    }
}

// =============================================================================
// Story: Pull secrets are present or absent, never empty
// =============================================================================

#[test]
fn pull_secrets_follow_spec() {
    for spec in ecosystems() {
        let expected = spec
            .quay
            .image_pull_secret_name
            .clone()
            .filter(|name| !name.is_empty())
            .map(|name| vec![name]);
        for deployment in compile(&spec).iter() {
            let actual = pod_pull_secret(deployment);
            if deployment.metadata.name == "registry-clair-postgresql" {
                assert!(actual.is_none());
                continue;
            }
            assert_eq!(actual, expected, "{}", deployment.metadata.name);
        }
    }
}

// =============================================================================
// Story: Clair only changes Quay's config volume
// =============================================================================

#[test]
fn clair_flag_touches_only_quay_config_volume() {
    let specs = ecosystems();
    let (without, with): (Vec<_>, Vec<_>) = specs.iter().partition(|s| !s.clair_enabled());

    for (off, on) in without.iter().zip(with.iter()) {
        let off = compile(off);
        let on = compile(on);

        assert_eq!(off.redis, on.redis);
        assert_eq!(off.quay_config, on.quay_config);
        assert_eq!(off.quay_database, on.quay_database);
        assert!(off.clair.is_none() && on.clair.is_some());
        assert!(off.clair_database.is_none() && on.clair_database.is_some());

        let db_volumes = |d: &GeneratedDeployments| {
            d.quay_database
                .as_ref()
                .map(|db| db.spec.template.spec.volumes.clone())
        };
        assert!(db_volumes(&on).is_some());
        assert_eq!(db_volumes(&off), db_volumes(&on));

        let mut quay_on = on.quay.clone();
        let projections = quay_on
            .spec
            .template
            .spec
            .volumes
            .iter_mut()
            .find(|v| v.name == "configvolume")
            .and_then(|v| v.projected.as_mut())
            .map(|p| &mut p.sources)
            .expect("quay config volume");
        assert_eq!(projections.len(), 2);
        projections.pop();
        assert_eq!(quay_on, off.quay);
    }
}

// =============================================================================
// Story: A full manifest renders end to end
// =============================================================================

#[test]
fn full_manifest_renders_every_component() {
    let eco = QuayEcosystem::from_yaml(FULL_MANIFEST).expect("manifest should parse");
    let name = eco.ecosystem_name().expect("named");
    let deployments = DeploymentCompiler::new(name, "quay-enterprise", &eco.spec)
        .compile_all()
        .expect("manifest should compile");

    let names: Vec<_> = deployments
        .iter()
        .map(|d| d.metadata.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "registry-quay-postgresql",
            "registry-clair-postgresql",
            "registry-redis",
            "registry-quay-config",
            "registry-quay",
            "registry-clair",
        ]
    );

    let quay_volumes: Vec<_> = deployments
        .quay
        .spec
        .template
        .spec
        .volumes
        .iter()
        .map(|v| v.name.as_str())
        .collect();
    assert_eq!(quay_volumes, vec!["configvolume", "local1"]);

    let yaml = serde_yaml::to_string(&deployments.quay).expect("deployment serializes");
    assert!(yaml.contains("claimName: registry-registry-local1"));
    assert!(yaml.contains("name: redhat-pull-secret"));
}

// =============================================================================
// Story: Backends with no pod storage leave Quay's volumes alone
// =============================================================================

const MIXED_BACKENDS_MANIFEST: &str = r#"
apiVersion: redhatcop.redhat.io/v1alpha1
kind: QuayEcosystem
metadata:
  name: registry
spec:
  quay:
    registryBackends:
      - name: local1
        registryBackendSource:
          local:
            storagePath: /datastorage
      - name: swift
        registryBackendSource:
          swift:
            container: layers
      - name: blank
        registryBackendSource: {}
      - name: gcs
        registryBackendSource:
          googleCloud:
            bucketName: layers
"#;

#[test]
fn unknown_and_empty_backend_sources_are_skipped() {
    let eco = QuayEcosystem::from_yaml(MIXED_BACKENDS_MANIFEST).expect("manifest should parse");
    let backends = &eco.spec.quay.registry_backends;
    assert_eq!(backends.len(), 4);
    assert_eq!(backends[1].registry_backend_source.kind(), "unknown");
    assert_eq!(backends[3].registry_backend_source.kind(), "googleCloud");

    let deployments = DeploymentCompiler::new("registry", "quay-enterprise", &eco.spec)
        .compile_all()
        .expect("manifest should compile");
    let pod = &deployments.quay.spec.template.spec;

    let volumes: Vec<_> = pod.volumes.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(volumes, vec!["configvolume", "local1"]);

    let mounts: Vec<_> = pod
        .containers
        .iter()
        .flat_map(|c| c.volume_mounts.iter().map(|m| m.name.as_str()))
        .collect();
    assert_eq!(mounts, vec!["configvolume", "local1"]);
}
