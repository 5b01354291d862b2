//! Resource addressing.
//!
//! Paths address an object (`/20000`), an object instance (`/20000/0`),
//! or a single resource (`/20000/0/7`). [`PathSet`] derives every path
//! provisioning needs from the fixed schema identifiers; it is a plain
//! value constructed once by the caller and carried through explicitly.

use core::fmt;

use crate::schema::{
    ACCESS_OBJECT_ID, DEVICE_OBJECT_ID, IDENTITY_OBJECT_ID, ObjectId, ResourceId, SINGLE_INSTANCE,
    access, identity,
};

/// An address within the object store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[must_use]
pub struct ResourcePath {
    pub object: ObjectId,
    pub instance: Option<u16>,
    pub resource: Option<ResourceId>,
}

impl ResourcePath {
    /// Path addressing a whole object.
    pub const fn object(object: ObjectId) -> Self {
        Self {
            object,
            instance: None,
            resource: None,
        }
    }

    /// Path addressing one object instance.
    pub const fn instance(object: ObjectId, instance: u16) -> Self {
        Self {
            object,
            instance: Some(instance),
            resource: None,
        }
    }

    /// Path addressing one resource of one instance.
    pub const fn resource(object: ObjectId, instance: u16, resource: ResourceId) -> Self {
        Self {
            object,
            instance: Some(instance),
            resource: Some(resource),
        }
    }

    /// Whether `other` addresses this path or something beneath it.
    ///
    /// An object path covers its instances and their resources; an
    /// instance path covers its resources; a resource path covers only
    /// itself.
    pub fn covers(&self, other: &ResourcePath) -> bool {
        if self.object != other.object {
            return false;
        }
        match (self.instance, other.instance) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(a), Some(b)) if a != b => false,
            _ => match (self.resource, other.resource) {
                (None, _) => true,
                (Some(_), None) => false,
                (Some(a), Some(b)) => a == b,
            },
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.object)?;
        if let Some(instance) = self.instance {
            write!(f, "/{instance}")?;
            if let Some(resource) = self.resource {
                write!(f, "/{resource}")?;
            }
        }
        Ok(())
    }
}

/// Every path used during provisioning, derived once from the schemas.
#[derive(Debug, Clone)]
pub struct PathSet {
    /// The identity object's single instance.
    pub identity_instance: ResourcePath,
    /// The access object as a whole (observation target).
    pub access_object: ResourcePath,
    /// The access object's single instance.
    pub access_instance: ResourcePath,
    /// The device object's single instance.
    pub device_instance: ResourcePath,

    // Identity resources.
    pub device_name: ResourcePath,
    pub device_type: ResourcePath,
    pub licensee_id: ResourcePath,
    pub fcap: ResourcePath,
    pub parent_id: ResourcePath,
    pub licensee_challenge: ResourcePath,
    pub hash_iterations: ResourcePath,
    pub licensee_hash: ResourcePath,

    // Access resources.
    pub url: ResourcePath,
    pub customer_key: ResourcePath,
    pub customer_secret: ResourcePath,
    pub remember_me_token: ResourcePath,
    pub token_expiry: ResourcePath,
}

impl PathSet {
    pub fn new() -> Self {
        let identity_res = |r| ResourcePath::resource(IDENTITY_OBJECT_ID, SINGLE_INSTANCE, r);
        let access_res = |r| ResourcePath::resource(ACCESS_OBJECT_ID, SINGLE_INSTANCE, r);

        Self {
            identity_instance: ResourcePath::instance(IDENTITY_OBJECT_ID, SINGLE_INSTANCE),
            access_object: ResourcePath::object(ACCESS_OBJECT_ID),
            access_instance: ResourcePath::instance(ACCESS_OBJECT_ID, SINGLE_INSTANCE),
            device_instance: ResourcePath::instance(DEVICE_OBJECT_ID, SINGLE_INSTANCE),

            device_name: identity_res(identity::NAME),
            device_type: identity_res(identity::DEVICE_TYPE),
            licensee_id: identity_res(identity::LICENSEE_ID),
            fcap: identity_res(identity::FCAP),
            parent_id: identity_res(identity::PARENT_ID),
            licensee_challenge: identity_res(identity::LICENSEE_CHALLENGE),
            hash_iterations: identity_res(identity::HASH_ITERATIONS),
            licensee_hash: identity_res(identity::LICENSEE_HASH),

            url: access_res(access::URL),
            customer_key: access_res(access::CUSTOMER_KEY),
            customer_secret: access_res(access::CUSTOMER_SECRET),
            remember_me_token: access_res(access::REMEMBER_ME_TOKEN),
            token_expiry: access_res(access::TOKEN_EXPIRY),
        }
    }

    /// The five access resources that make up a complete credential grant.
    pub fn access_resources(&self) -> [ResourcePath; 5] {
        [
            self.url,
            self.customer_key,
            self.customer_secret,
            self.remember_me_token,
            self.token_expiry,
        ]
    }
}

impl Default for PathSet {
    fn default() -> Self {
        Self::new()
    }
}
