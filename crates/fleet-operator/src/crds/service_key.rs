use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The closed set of services a ServiceFleet can run.
///
/// Declaration order is the reconcile order: `Ord` is derived, so a
/// `BTreeMap<ServiceKey, _>` iterates in exactly this sequence.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum ServiceKey {
    CoffeeShop,
    PetStore,
    Restaurant,
    CollegeAdmission,
    ElectronicsStore,
    ElectronicsStoreTracing,
}

impl ServiceKey {
    pub const ALL: [ServiceKey; 6] = [
        ServiceKey::CoffeeShop,
        ServiceKey::PetStore,
        ServiceKey::Restaurant,
        ServiceKey::CollegeAdmission,
        ServiceKey::ElectronicsStore,
        ServiceKey::ElectronicsStoreTracing,
    ];

    /// Canonical name, used for the Deployment, the Service, the container and
    /// the default image.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKey::CoffeeShop => "coffee-shop",
            ServiceKey::PetStore => "pet-store",
            ServiceKey::Restaurant => "restaurant",
            ServiceKey::CollegeAdmission => "college-admission",
            ServiceKey::ElectronicsStore => "electronics-store",
            ServiceKey::ElectronicsStoreTracing => "electronics-store-tracing",
        }
    }

    /// Whether the service reads from the shared database.
    pub fn uses_database(&self) -> bool {
        matches!(
            self,
            ServiceKey::ElectronicsStore | ServiceKey::ElectronicsStoreTracing
        )
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
