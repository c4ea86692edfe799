use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{
    PersistentVolumeClaim, PersistentVolumeClaimSpec, VolumeResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::constants::{database, values};
use crate::crds::DatabaseConfig;
use crate::error::Result;
use crate::quantity;

/// Build the ReadWriteOnce claim backing the database data directory.
///
/// `db` must already be defaulted. An unset storage class leaves the
/// cluster default in effect.
pub fn build_database_pvc(
    instance: &str,
    namespace: &str,
    db: &DatabaseConfig,
) -> Result<PersistentVolumeClaim> {
    let size = quantity::parse("spec.database.storageSize", &db.storage_size)?;

    Ok(PersistentVolumeClaim {
        metadata: ObjectMeta {
            name: Some(database::CLAIM_NAME.into()),
            namespace: Some(namespace.into()),
            labels: Some(super::labels(
                database::NAME,
                instance,
                values::COMPONENT_DATABASE,
            )),
            ..Default::default()
        },
        spec: Some(PersistentVolumeClaimSpec {
            access_modes: Some(vec!["ReadWriteOnce".into()]),
            storage_class_name: db.storage_class.clone(),
            resources: Some(VolumeResourceRequirements {
                requests: Some(BTreeMap::from([("storage".into(), size)])),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    })
}
