//! The 16-byte device identifier and its textual wire encoding.
//!
//! On the wire a device id is rendered as 16 two-hex-digit groups, each
//! followed by a single space: `"0A 1B ... FF "`, exactly 48 characters
//! including the trailing space. Parsing is strict about length and
//! group shape; hex digits are accepted in either case.

use core::fmt;

use crate::error::DeviceIdError;

/// Number of bytes in a device identifier.
pub const DEVICE_ID_LEN: usize = 16;

/// Length of the textual wire form: 16 groups of "XX ".
pub const WIRE_LEN: usize = DEVICE_ID_LEN * 3;

/// A 16-byte binary device identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub struct DeviceId([u8; DEVICE_ID_LEN]);

impl DeviceId {
    pub const fn new(bytes: [u8; DEVICE_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn to_bytes(self) -> [u8; DEVICE_ID_LEN] {
        self.0
    }

    /// Parse the fixed 48-character wire form.
    pub fn parse_wire(text: &str) -> Result<Self, DeviceIdError> {
        if text.len() != WIRE_LEN {
            return Err(DeviceIdError::InvalidLength {
                expected: WIRE_LEN,
                actual: text.len(),
            });
        }

        let raw = text.as_bytes();
        let mut bytes = [0u8; DEVICE_ID_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let group = &raw[i * 3..i * 3 + 3];
            let hi = hex_digit(group[0]).ok_or(DeviceIdError::InvalidGroup { index: i })?;
            let lo = hex_digit(group[1]).ok_or(DeviceIdError::InvalidGroup { index: i })?;
            if group[2] != b' ' {
                return Err(DeviceIdError::InvalidGroup { index: i });
            }
            *byte = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }

    /// Render the fixed 48-character wire form (uppercase, trailing space).
    pub fn to_wire(self) -> String {
        let mut out = String::with_capacity(WIRE_LEN);
        for byte in self.0 {
            out.push_str(&format!("{byte:02X} "));
        }
        out
    }
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl AsRef<[u8]> for DeviceId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for DeviceId {
    type Error = DeviceIdError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; DEVICE_ID_LEN] = bytes
            .try_into()
            .map_err(|_| DeviceIdError::InvalidByteLength {
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_wire().trim_end())
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId(")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "..)")
    }
}
