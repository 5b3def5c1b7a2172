pub mod gateway;
pub mod objects;

use std::fmt;

use serde::{Serialize, Serializer};

pub use gateway::{
    build_all, build_gateway, new_gateway_deployment, new_gateway_http_service,
    new_gateway_ingress, new_gateway_service_monitor,
};
use objects::{
    ClusterRole, ClusterRoleBinding, ConfigMap, Deployment, Ingress, ObjectMeta, Route, Service,
    ServiceAccount, ServiceMonitor,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum ArtifactKind {
    Deployment,
    Service,
    Ingress,
    Route,
    ServiceMonitor,
    ServiceAccount,
    ClusterRole,
    ClusterRoleBinding,
    ConfigMap,
}

impl ArtifactKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Deployment => "Deployment",
            ArtifactKind::Service => "Service",
            ArtifactKind::Ingress => "Ingress",
            ArtifactKind::Route => "Route",
            ArtifactKind::ServiceMonitor => "ServiceMonitor",
            ArtifactKind::ServiceAccount => "ServiceAccount",
            ArtifactKind::ClusterRole => "ClusterRole",
            ArtifactKind::ClusterRoleBinding => "ClusterRoleBinding",
            ArtifactKind::ConfigMap => "ConfigMap",
        }
    }

    pub fn api_version(self) -> &'static str {
        match self {
            ArtifactKind::Deployment => "apps/v1",
            ArtifactKind::Service | ArtifactKind::ServiceAccount | ArtifactKind::ConfigMap => "v1",
            ArtifactKind::Ingress => "networking.k8s.io/v1",
            ArtifactKind::Route => "route.openshift.io/v1",
            ArtifactKind::ServiceMonitor => "monitoring.coreos.com/v1",
            ArtifactKind::ClusterRole | ArtifactKind::ClusterRoleBinding => {
                "rbac.authorization.k8s.io/v1"
            }
        }
    }

    /// Kinds that expose an endpoint outside the cluster.
    pub fn is_network_exposure(self) -> bool {
        matches!(self, ArtifactKind::Ingress | ArtifactKind::Route)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deployable object, tagged by its kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Artifact {
    Deployment(Deployment),
    Service(Service),
    Ingress(Ingress),
    Route(Route),
    ServiceMonitor(ServiceMonitor),
    ServiceAccount(ServiceAccount),
    ClusterRole(ClusterRole),
    ClusterRoleBinding(ClusterRoleBinding),
    ConfigMap(ConfigMap),
}

impl Artifact {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::Deployment(_) => ArtifactKind::Deployment,
            Artifact::Service(_) => ArtifactKind::Service,
            Artifact::Ingress(_) => ArtifactKind::Ingress,
            Artifact::Route(_) => ArtifactKind::Route,
            Artifact::ServiceMonitor(_) => ArtifactKind::ServiceMonitor,
            Artifact::ServiceAccount(_) => ArtifactKind::ServiceAccount,
            Artifact::ClusterRole(_) => ArtifactKind::ClusterRole,
            Artifact::ClusterRoleBinding(_) => ArtifactKind::ClusterRoleBinding,
            Artifact::ConfigMap(_) => ArtifactKind::ConfigMap,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Artifact::Deployment(object) => &object.metadata,
            Artifact::Service(object) => &object.metadata,
            Artifact::Ingress(object) => &object.metadata,
            Artifact::Route(object) => &object.metadata,
            Artifact::ServiceMonitor(object) => &object.metadata,
            Artifact::ServiceAccount(object) => &object.metadata,
            Artifact::ClusterRole(object) => &object.metadata,
            Artifact::ClusterRoleBinding(object) => &object.metadata,
            Artifact::ConfigMap(object) => &object.metadata,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata().name
    }

    /// The (kind, name) pair that identifies an artifact within a list.
    pub fn identity(&self) -> (ArtifactKind, &str) {
        (self.kind(), self.name())
    }
}

impl Serialize for Artifact {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.kind();
        match self {
            Artifact::Deployment(object) => typed(kind, object, serializer),
            Artifact::Service(object) => typed(kind, object, serializer),
            Artifact::Ingress(object) => typed(kind, object, serializer),
            Artifact::Route(object) => typed(kind, object, serializer),
            Artifact::ServiceMonitor(object) => typed(kind, object, serializer),
            Artifact::ServiceAccount(object) => typed(kind, object, serializer),
            Artifact::ClusterRole(object) => typed(kind, object, serializer),
            Artifact::ClusterRoleBinding(object) => typed(kind, object, serializer),
            Artifact::ConfigMap(object) => typed(kind, object, serializer),
        }
    }
}

fn typed<T: Serialize, S: Serializer>(
    kind: ArtifactKind,
    object: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Typed<'a, T> {
        api_version: &'static str,
        kind: &'static str,
        #[serde(flatten)]
        object: &'a T,
    }

    Typed {
        api_version: kind.api_version(),
        kind: kind.as_str(),
        object,
    }
    .serialize(serializer)
}
