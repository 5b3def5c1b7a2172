//! Kind-based artifact list composition.

use std::collections::BTreeSet;

use crate::manifests::{Artifact, ArtifactKind};

/// Drop every base artifact whose kind is in `excluded`, then append `provider` as is.
///
/// Surviving base artifacts keep their relative order and provider artifacts follow in
/// the order the provider returned them. Filtering never looks at names.
pub fn compose(
    base: Vec<Artifact>,
    provider: Vec<Artifact>,
    excluded: &[ArtifactKind],
) -> Vec<Artifact> {
    let mut composed: Vec<Artifact> = base
        .into_iter()
        .filter(|artifact| !excluded.contains(&artifact.kind()))
        .collect();
    composed.extend(provider);
    composed
}

/// (kind, name) pairs that appear more than once, in first-seen order.
pub fn duplicate_identities(artifacts: &[Artifact]) -> Vec<(ArtifactKind, String)> {
    let mut seen = BTreeSet::new();
    let mut reported = BTreeSet::new();
    let mut duplicates = Vec::new();
    for artifact in artifacts {
        let (kind, name) = artifact.identity();
        if !seen.insert((kind, name)) && reported.insert((kind, name)) {
            duplicates.push((kind, name.to_string()));
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifests::objects::{ConfigMap, Ingress, ObjectMeta, Route, Service};

    fn ingress(name: &str) -> Artifact {
        Artifact::Ingress(Ingress {
            metadata: ObjectMeta::named(name, None),
            ..Default::default()
        })
    }

    fn service(name: &str) -> Artifact {
        Artifact::Service(Service {
            metadata: ObjectMeta::named(name, None),
            ..Default::default()
        })
    }

    fn route(name: &str) -> Artifact {
        Artifact::Route(Route {
            metadata: ObjectMeta::named(name, None),
            ..Default::default()
        })
    }

    fn config_map(name: &str) -> Artifact {
        Artifact::ConfigMap(ConfigMap {
            metadata: ObjectMeta::named(name, None),
            ..Default::default()
        })
    }

    #[test]
    fn route_replaces_ingress() {
        let composed = compose(
            vec![ingress("gw"), service("gw")],
            vec![route("gw")],
            &[ArtifactKind::Ingress],
        );
        assert_eq!(composed, vec![service("gw"), route("gw")]);
    }

    #[test]
    fn preserves_order_of_survivors_and_provider_artifacts() {
        let composed = compose(
            vec![service("a"), ingress("x"), config_map("b"), ingress("y"), service("c")],
            vec![route("z"), config_map("p")],
            &[ArtifactKind::Ingress],
        );
        let names: Vec<&str> = composed.iter().map(Artifact::name).collect();
        assert_eq!(names, vec!["a", "b", "c", "z", "p"]);
    }

    #[test]
    fn exclusion_is_by_kind_not_name() {
        let composed = compose(
            vec![service("gw"), ingress("other")],
            Vec::new(),
            &[ArtifactKind::Ingress],
        );
        assert_eq!(composed, vec![service("gw")]);
    }

    #[test]
    fn empty_exclusion_appends_only() {
        let composed = compose(vec![ingress("gw")], vec![route("gw")], &[]);
        assert_eq!(composed, vec![ingress("gw"), route("gw")]);
    }

    #[test]
    fn reports_duplicate_identities_once() {
        let artifacts = vec![service("gw"), route("gw"), service("gw"), service("gw")];
        assert_eq!(
            duplicate_identities(&artifacts),
            vec![(ArtifactKind::Service, "gw".to_string())]
        );
    }
}
