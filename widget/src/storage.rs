//! Durable visitor identity.
//!
//! Three keys (`lead_name`, `lead_email`, `lead_phone`) survive page loads.
//! All three present means the visitor already left their details and the
//! widget starts ready to chat. They are written once, at lead capture.

use std::cell::RefCell;

use crate::error::WidgetError;

pub const LEAD_NAME: &str = "lead_name";
pub const LEAD_EMAIL: &str = "lead_email";
pub const LEAD_PHONE: &str = "lead_phone";

/// Contact details remembered after a successful lead capture.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LeadIdentity {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl LeadIdentity {
    /// `Some` only when every value is present and non-blank.
    #[must_use]
    pub fn from_values(name: Option<String>, email: Option<String>, phone: Option<String>) -> Option<Self> {
        let keep = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Some(Self { name: keep(name)?, email: keep(email)?, phone: keep(phone)? })
    }

    /// Key/value pairs in storage order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, &str); 3] {
        [(LEAD_NAME, &self.name), (LEAD_EMAIL, &self.email), (LEAD_PHONE, &self.phone)]
    }
}

/// Where the identity lives between page loads.
pub trait IdentityStore {
    fn load(&self) -> Option<LeadIdentity>;

    /// # Errors
    ///
    /// Returns [`WidgetError::Storage`] if the backing store refuses the write.
    fn save(&self, identity: &LeadIdentity) -> Result<(), WidgetError>;
}

/// Process-local store; nothing survives a restart.
#[derive(Default)]
pub struct MemoryIdentityStore {
    identity: RefCell<Option<LeadIdentity>>,
}

impl MemoryIdentityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_identity(identity: LeadIdentity) -> Self {
        Self { identity: RefCell::new(Some(identity)) }
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn load(&self) -> Option<LeadIdentity> {
        self.identity.borrow().clone()
    }

    fn save(&self, identity: &LeadIdentity) -> Result<(), WidgetError> {
        *self.identity.borrow_mut() = Some(identity.clone());
        Ok(())
    }
}

// =============================================================================
// BROWSER
// =============================================================================

/// `window.localStorage` backed store.
#[cfg(feature = "hydrate")]
pub struct LocalStorageIdentity;

#[cfg(feature = "hydrate")]
impl LocalStorageIdentity {
    fn storage() -> Result<web_sys::Storage, WidgetError> {
        let window = web_sys::window().ok_or_else(|| WidgetError::Storage("no window".into()))?;
        match window.local_storage() {
            Ok(Some(storage)) => Ok(storage),
            Ok(None) => Err(WidgetError::Storage("localStorage unavailable".into())),
            Err(e) => Err(WidgetError::Storage(format!("{e:?}"))),
        }
    }
}

#[cfg(feature = "hydrate")]
impl IdentityStore for LocalStorageIdentity {
    fn load(&self) -> Option<LeadIdentity> {
        let storage = match Self::storage() {
            Ok(storage) => storage,
            Err(e) => {
                log::warn!("{e}");
                return None;
            }
        };
        let get = |key: &str| storage.get_item(key).unwrap_or_default();
        LeadIdentity::from_values(get(LEAD_NAME), get(LEAD_EMAIL), get(LEAD_PHONE))
    }

    fn save(&self, identity: &LeadIdentity) -> Result<(), WidgetError> {
        let storage = Self::storage()?;
        for (key, value) in identity.entries() {
            storage.set_item(key, value).map_err(|e| WidgetError::Storage(format!("{e:?}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
