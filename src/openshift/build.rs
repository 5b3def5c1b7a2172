use std::collections::BTreeMap;

use serde_json::json;

use super::{INJECT_CA_BUNDLE_ANNOTATION, OAUTH_REDIRECT_ANNOTATION_PREFIX, Options};
use crate::manifests::Artifact;
use crate::manifests::objects::{
    ClusterRole, ClusterRoleBinding, ConfigMap, ObjectMeta, PolicyRule, RoleRef, Route,
    RoutePort, RouteSpec, RouteTarget, RouteTls, ServiceAccount, Subject,
};

/// Objects shared by every component of the stack.
pub fn build_lokistack_objects(opts: &Options) -> Vec<Artifact> {
    vec![Artifact::ConfigMap(build_service_ca_bundle(opts))]
}

/// Objects the gateway needs to act as an OAuth client behind a route.
pub fn build_gateway_objects(opts: &Options) -> Vec<Artifact> {
    vec![
        Artifact::ServiceAccount(build_service_account(opts)),
        Artifact::ClusterRole(build_cluster_role(opts)),
        Artifact::ClusterRoleBinding(build_cluster_role_binding(opts)),
        Artifact::Route(build_route(opts)),
    ]
}

fn namespaced_meta(opts: &Options, name: &str) -> ObjectMeta {
    ObjectMeta::named(name, Some(opts.build_opts.lokistack_namespace.as_str()))
        .with_labels(opts.build_opts.labels.clone())
}

fn build_service_ca_bundle(opts: &Options) -> ConfigMap {
    let mut metadata = namespaced_meta(opts, &opts.build_opts.ca_bundle_name);
    metadata
        .annotations
        .insert(INJECT_CA_BUNDLE_ANNOTATION.to_string(), "true".to_string());
    ConfigMap {
        metadata,
        data: BTreeMap::new(),
    }
}

fn build_service_account(opts: &Options) -> ServiceAccount {
    let mut metadata = namespaced_meta(opts, &opts.build_opts.gateway_name);
    for spec in &opts.authentication {
        let reference = json!({
            "kind": "OAuthRedirectReference",
            "apiVersion": "v1",
            "reference": {
                "kind": "Route",
                "name": opts.build_opts.gateway_name,
            },
        });
        metadata.annotations.insert(
            format!("{OAUTH_REDIRECT_ANNOTATION_PREFIX}.{}", spec.tenant_name),
            reference.to_string(),
        );
    }
    ServiceAccount { metadata }
}

fn build_cluster_role(opts: &Options) -> ClusterRole {
    ClusterRole {
        metadata: ObjectMeta::named(&opts.build_opts.gateway_name, None)
            .with_labels(opts.build_opts.labels.clone()),
        rules: vec![
            PolicyRule {
                api_groups: vec!["authentication.k8s.io".to_string()],
                resources: vec!["tokenreviews".to_string()],
                verbs: vec!["create".to_string()],
            },
            PolicyRule {
                api_groups: vec!["authorization.k8s.io".to_string()],
                resources: vec!["subjectaccessreviews".to_string()],
                verbs: vec!["create".to_string()],
            },
        ],
    }
}

fn build_cluster_role_binding(opts: &Options) -> ClusterRoleBinding {
    ClusterRoleBinding {
        metadata: ObjectMeta::named(&opts.build_opts.gateway_name, None)
            .with_labels(opts.build_opts.labels.clone()),
        role_ref: RoleRef {
            api_group: "rbac.authorization.k8s.io".to_string(),
            kind: "ClusterRole".to_string(),
            name: opts.build_opts.gateway_name.clone(),
        },
        subjects: vec![Subject {
            kind: "ServiceAccount".to_string(),
            name: opts.build_opts.gateway_name.clone(),
            namespace: Some(opts.build_opts.lokistack_namespace.clone()),
        }],
    }
}

fn build_route(opts: &Options) -> Route {
    Route {
        metadata: namespaced_meta(opts, &opts.build_opts.gateway_name),
        spec: RouteSpec {
            host: opts.build_opts.route_host.clone(),
            to: RouteTarget {
                kind: "Service".to_string(),
                name: opts.build_opts.gateway_svc_name.clone(),
                weight: 100,
            },
            port: RoutePort {
                target_port: opts.build_opts.gateway_svc_target_port.clone(),
            },
            tls: Some(RouteTls {
                termination: "reencrypt".to_string(),
                insecure_edge_termination_policy: "Redirect".to_string(),
            }),
        },
    }
}
