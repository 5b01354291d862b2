//! Schema descriptors for the fabric's structured objects.
//!
//! Three objects are consumed by provisioning: the identity object a
//! device fills in about itself, the access object the cloud grants in
//! return, and the standard device object carrying serial number and
//! software version. Each object holds a single instance (instance 0).

use core::fmt;

/// Numeric identifier of a structured object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[must_use]
pub struct ObjectId(pub u16);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric identifier of a resource within an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[must_use]
pub struct ResourceId(pub u16);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identity object: what a device declares about itself.
pub const IDENTITY_OBJECT_ID: ObjectId = ObjectId(20000);

/// The access object: the credential set the cloud grants back.
pub const ACCESS_OBJECT_ID: ObjectId = ObjectId(20001);

/// The standard device object.
pub const DEVICE_OBJECT_ID: ObjectId = ObjectId(3);

/// Instance id used for every single-instance object.
pub const SINGLE_INSTANCE: u16 = 0;

/// The value type a resource carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Text,
    Integer,
    Bytes,
}

/// Static description of one resource in an object schema.
#[derive(Debug, Clone, Copy)]
pub struct ResourceDef {
    pub id: ResourceId,
    pub name: &'static str,
    pub kind: ResourceKind,
    /// Whether the cloud requires this resource to be populated.
    pub mandatory: bool,
    /// Whether the resource belongs in the persisted access record.
    pub persist: bool,
}

/// Static description of an object schema.
#[derive(Debug, Clone, Copy)]
pub struct ObjectDef {
    pub name: &'static str,
    pub id: ObjectId,
    pub resources: &'static [ResourceDef],
}

impl ObjectDef {
    /// Look up a resource definition by id.
    pub fn resource(&self, id: ResourceId) -> Option<&ResourceDef> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Iterate the resources marked for the persisted access record.
    pub fn persisted_resources(&self) -> impl Iterator<Item = &ResourceDef> {
        self.resources.iter().filter(|r| r.persist)
    }
}

/// Resource ids within the identity object.
pub mod identity {
    use super::ResourceId;

    pub const DEVICE_ID: ResourceId = ResourceId(0);
    pub const PARENT_ID: ResourceId = ResourceId(1);
    pub const DEVICE_TYPE: ResourceId = ResourceId(2);
    pub const NAME: ResourceId = ResourceId(3);
    pub const DESCRIPTION: ResourceId = ResourceId(4);
    pub const FCAP: ResourceId = ResourceId(5);
    pub const LICENSEE_ID: ResourceId = ResourceId(6);
    pub const LICENSEE_CHALLENGE: ResourceId = ResourceId(7);
    pub const HASH_ITERATIONS: ResourceId = ResourceId(8);
    pub const LICENSEE_HASH: ResourceId = ResourceId(9);
    pub const STATUS: ResourceId = ResourceId(10);
}

/// Resource ids within the access object.
pub mod access {
    use super::ResourceId;

    pub const URL: ResourceId = ResourceId(0);
    pub const CUSTOMER_KEY: ResourceId = ResourceId(1);
    pub const CUSTOMER_SECRET: ResourceId = ResourceId(2);
    pub const REMEMBER_ME_TOKEN: ResourceId = ResourceId(3);
    pub const TOKEN_EXPIRY: ResourceId = ResourceId(4);
}

/// Resource ids within the device object.
pub mod device {
    use super::ResourceId;

    pub const SERIAL_NUMBER: ResourceId = ResourceId(2);
    pub const SOFTWARE_VERSION: ResourceId = ResourceId(19);
}

/// Identity object schema.
pub const IDENTITY_OBJECT: ObjectDef = ObjectDef {
    name: "IdentityObject",
    id: IDENTITY_OBJECT_ID,
    resources: &[
        ResourceDef {
            id: identity::DEVICE_ID,
            name: "DeviceID",
            kind: ResourceKind::Bytes,
            mandatory: true,
            persist: true,
        },
        ResourceDef {
            id: identity::PARENT_ID,
            name: "ParentID",
            kind: ResourceKind::Bytes,
            mandatory: false,
            persist: false,
        },
        ResourceDef {
            id: identity::DEVICE_TYPE,
            name: "DeviceType",
            kind: ResourceKind::Text,
            mandatory: true,
            persist: true,
        },
        ResourceDef {
            id: identity::NAME,
            name: "Name",
            kind: ResourceKind::Text,
            mandatory: false,
            persist: true,
        },
        ResourceDef {
            id: identity::DESCRIPTION,
            name: "Description",
            kind: ResourceKind::Text,
            mandatory: false,
            persist: false,
        },
        ResourceDef {
            id: identity::FCAP,
            name: "FCAP",
            kind: ResourceKind::Text,
            mandatory: true,
            persist: false,
        },
        ResourceDef {
            id: identity::LICENSEE_ID,
            name: "LicenseeID",
            kind: ResourceKind::Integer,
            mandatory: true,
            persist: false,
        },
        ResourceDef {
            id: identity::LICENSEE_CHALLENGE,
            name: "LicenseeChallenge",
            kind: ResourceKind::Bytes,
            mandatory: false,
            persist: false,
        },
        ResourceDef {
            id: identity::HASH_ITERATIONS,
            name: "HashIterations",
            kind: ResourceKind::Integer,
            mandatory: false,
            persist: false,
        },
        ResourceDef {
            id: identity::LICENSEE_HASH,
            name: "LicenseeHash",
            kind: ResourceKind::Bytes,
            mandatory: false,
            persist: false,
        },
        ResourceDef {
            id: identity::STATUS,
            name: "Status",
            kind: ResourceKind::Integer,
            mandatory: false,
            persist: false,
        },
    ],
};

/// Access object schema.
pub const ACCESS_OBJECT: ObjectDef = ObjectDef {
    name: "AccessObject",
    id: ACCESS_OBJECT_ID,
    resources: &[
        ResourceDef {
            id: access::URL,
            name: "URL",
            kind: ResourceKind::Text,
            mandatory: true,
            persist: true,
        },
        ResourceDef {
            id: access::CUSTOMER_KEY,
            name: "CustomerKey",
            kind: ResourceKind::Text,
            mandatory: true,
            persist: true,
        },
        ResourceDef {
            id: access::CUSTOMER_SECRET,
            name: "CustomerSecret",
            kind: ResourceKind::Text,
            mandatory: true,
            persist: true,
        },
        ResourceDef {
            id: access::REMEMBER_ME_TOKEN,
            name: "RememberMeToken",
            kind: ResourceKind::Text,
            mandatory: true,
            persist: true,
        },
        ResourceDef {
            id: access::TOKEN_EXPIRY,
            name: "RememberMeTokenExpiry",
            kind: ResourceKind::Integer,
            mandatory: true,
            persist: true,
        },
    ],
};

/// Device object schema (the subset provisioning consumes).
pub const DEVICE_OBJECT: ObjectDef = ObjectDef {
    name: "DeviceObject",
    id: DEVICE_OBJECT_ID,
    resources: &[
        ResourceDef {
            id: device::SERIAL_NUMBER,
            name: "SerialNumber",
            kind: ResourceKind::Text,
            mandatory: true,
            persist: true,
        },
        ResourceDef {
            id: device::SOFTWARE_VERSION,
            name: "SoftwareVersion",
            kind: ResourceKind::Text,
            mandatory: true,
            persist: true,
        },
    ],
};
