//! Device registry indexed by id, URL alias and symbolic domain.
//!
//! Aliases are derived from ids by swapping `-` for `_`. The registry
//! refuses any fleet where that swap would not be reversible, so
//! [`alias_from_id`] and [`id_from_alias`] are mutual inverses over every
//! registered device.

use std::collections::HashMap;
use std::fmt;

use crate::device::Device;
use crate::error::CoreError;

const DOMAIN_SUFFIX: &str = ".eth";

/// URL-path-safe alias for a device id, e.g. `smart-lock-01` → `smart_lock_01`.
#[must_use]
pub fn alias_from_id(id: &str) -> String {
    id.replace('-', "_")
}

/// Inverse of [`alias_from_id`].
#[must_use]
pub fn id_from_alias(alias: &str) -> String {
    alias.replace('_', "-")
}

/// Canonical form of a symbolic domain: lower case with exactly one `.eth` suffix.
#[must_use]
pub fn normalize_domain(domain: &str) -> String {
    let lowered = domain.trim().to_ascii_lowercase();
    let bare = lowered.strip_suffix(DOMAIN_SUFFIX).unwrap_or(&lowered);
    format!("{bare}{DOMAIN_SUFFIX}")
}

/// How a caller names a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceKey {
    Id(String),
    Alias(String),
    Domain(String),
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKey::Id(id) => write!(f, "id {id}"),
            DeviceKey::Alias(alias) => write!(f, "alias {alias}"),
            DeviceKey::Domain(domain) => write!(f, "domain {domain}"),
        }
    }
}

/// Fixed set of devices, kept in registration order for ticking.
#[derive(Debug)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
    by_id: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
    by_domain: HashMap<String, usize>,
}

impl DeviceRegistry {
    /// Build the indexes for a fleet.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidFleet`] if an id contains `_` (which would
    /// break the alias round-trip) or if an id, alias or domain is duplicated.
    pub fn new(devices: Vec<Device>) -> Result<Self, CoreError> {
        let mut by_id = HashMap::with_capacity(devices.len());
        let mut by_alias = HashMap::with_capacity(devices.len());
        let mut by_domain = HashMap::with_capacity(devices.len());

        for (idx, device) in devices.iter().enumerate() {
            let id = device.id();
            let invalid = |reason: &str| CoreError::InvalidFleet {
                id: id.to_owned(),
                reason: reason.to_owned(),
            };
            if id.is_empty() || id.contains('_') {
                return Err(invalid("id must be non-empty and must not contain '_'"));
            }
            if by_id.insert(id.to_owned(), idx).is_some() {
                return Err(invalid("duplicate id"));
            }
            if by_alias.insert(alias_from_id(id), idx).is_some() {
                return Err(invalid("duplicate alias"));
            }
            if by_domain.insert(normalize_domain(&device.info().ens_domain), idx).is_some() {
                return Err(invalid("duplicate symbolic domain"));
            }
        }

        Ok(Self { devices, by_id, by_alias, by_domain })
    }

    /// All devices in registration order.
    #[must_use]
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> impl Iterator<Item = &mut Device> {
        self.devices.iter_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// # Errors
    /// Returns [`CoreError::DeviceNotFound`] if no device has this id.
    pub fn find_by_id(&self, id: &str) -> Result<&Device, CoreError> {
        self.find(&DeviceKey::Id(id.to_owned()))
    }

    /// # Errors
    /// Returns [`CoreError::AliasNotFound`] if no device has this alias.
    pub fn find_by_alias(&self, alias: &str) -> Result<&Device, CoreError> {
        self.find(&DeviceKey::Alias(alias.to_owned()))
    }

    /// Look up by symbolic domain; `"EVCharger"`, `"evcharger"` and
    /// `"evcharger.eth"` all resolve to the same device.
    ///
    /// # Errors
    /// Returns [`CoreError::DomainNotFound`] if no device has this domain.
    pub fn find_by_domain(&self, domain: &str) -> Result<&Device, CoreError> {
        self.find(&DeviceKey::Domain(domain.to_owned()))
    }

    /// # Errors
    /// Returns the matching not-found variant if the key resolves to nothing.
    pub fn find(&self, key: &DeviceKey) -> Result<&Device, CoreError> {
        let idx = self.locate(key)?;
        Ok(&self.devices[idx])
    }

    /// # Errors
    /// Returns the matching not-found variant if the key resolves to nothing.
    pub fn find_mut(&mut self, key: &DeviceKey) -> Result<&mut Device, CoreError> {
        let idx = self.locate(key)?;
        Ok(&mut self.devices[idx])
    }

    fn locate(&self, key: &DeviceKey) -> Result<usize, CoreError> {
        match key {
            DeviceKey::Id(id) => self
                .by_id
                .get(id)
                .copied()
                .ok_or_else(|| CoreError::DeviceNotFound(id.clone())),
            DeviceKey::Alias(alias) => self
                .by_alias
                .get(alias)
                .copied()
                .ok_or_else(|| CoreError::AliasNotFound(alias.clone())),
            DeviceKey::Domain(domain) => self
                .by_domain
                .get(&normalize_domain(domain))
                .copied()
                .ok_or_else(|| CoreError::DomainNotFound(domain.clone())),
        }
    }
}
