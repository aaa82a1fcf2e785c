//! 128-bit identifiers as DirectInput lays them out.
//!
//! Every identifier that crosses the native boundary (instance GUIDs, product
//! GUIDs, object type GUIDs) goes through [`Guid`]. The struct keeps the native
//! field split so conversion to and from `GUID` is a plain field copy.
//!
//! ## Byte layouts
//! - [`Guid::to_u128`] / [`Guid::from_u128`]: the canonical text form read as one
//!   big-endian number (`a36d02e0-c9f3-11cf-bfc7-444553540000` ->
//!   `0xa36d02e0_c9f3_11cf_bfc7_444553540000`).
//! - [`Guid::to_bytes_le`] / [`Guid::from_bytes_le`]: the "mixed-endian" 16-byte
//!   array used by COM and managed runtimes; `data1..data3` little-endian,
//!   `data4` verbatim.
//!
//! ## Text form
//! `Display` writes the lowercase hyphenated form. Parsing accepts the same form,
//! optionally wrapped in braces, in any case.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// A 128-bit identifier in native (`GUID`) field layout.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

/// Trailing bytes DirectInput writes into product GUIDs of USB/HID devices.
const PIDVID_SIGNATURE: [u8; 6] = *b"PIDVID";

impl Guid {
    /// The all-zero identifier.
    pub const NIL: Guid = Guid::from_u128(0);

    pub const fn from_fields(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self {
            data1,
            data2,
            data3,
            data4,
        }
    }

    pub const fn from_u128(v: u128) -> Self {
        Self {
            data1: (v >> 96) as u32,
            data2: (v >> 80) as u16,
            data3: (v >> 64) as u16,
            data4: (v as u64).to_be_bytes(),
        }
    }

    pub const fn to_u128(&self) -> u128 {
        ((self.data1 as u128) << 96)
            | ((self.data2 as u128) << 80)
            | ((self.data3 as u128) << 64)
            | (u64::from_be_bytes(self.data4) as u128)
    }

    /// Mixed-endian byte array (COM / managed `Guid.ToByteArray()` layout).
    pub fn to_bytes_le(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[0..4].copy_from_slice(&self.data1.to_le_bytes());
        out[4..6].copy_from_slice(&self.data2.to_le_bytes());
        out[6..8].copy_from_slice(&self.data3.to_le_bytes());
        out[8..16].copy_from_slice(&self.data4);
        out
    }

    /// Inverse of [`Guid::to_bytes_le`].
    pub fn from_bytes_le(b: [u8; 16]) -> Self {
        let mut data4 = [0u8; 8];
        data4.copy_from_slice(&b[8..16]);
        Self {
            data1: u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            data2: u16::from_le_bytes([b[4], b[5]]),
            data3: u16::from_le_bytes([b[6], b[7]]),
            data4,
        }
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        *self == Self::NIL
    }

    /// USB vendor/product id encoded in a DirectInput *product* GUID.
    ///
    /// DirectInput builds product GUIDs for HID devices as
    /// `{PIDVID-0000-0000-0000-504944564944}` (the tail spells `"PIDVID"`), with
    /// `data1 = PID << 16 | VID`. Returns `None` for GUIDs without that tail.
    pub fn vid_pid(&self) -> Option<(u16, u16)> {
        if self.data2 != 0 || self.data3 != 0 || self.data4[2..] != PIDVID_SIGNATURE {
            return None;
        }
        let vid = (self.data1 & 0xFFFF) as u16;
        let pid = (self.data1 >> 16) as u16;
        Some((vid, pid))
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.data4;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({self})")
    }
}

impl FromStr for Guid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidGuid(s.to_string());

        let body = s.trim();
        let body = match (body.strip_prefix('{'), body.strip_suffix('}')) {
            (Some(_), Some(_)) => &body[1..body.len() - 1],
            (None, None) => body,
            _ => return Err(invalid()),
        };

        let groups: Vec<&str> = body.split('-').collect();
        let lens = [8, 4, 4, 4, 12];
        if groups.len() != lens.len()
            || groups.iter().zip(lens).any(|(g, n)| {
                g.len() != n || !g.bytes().all(|b| b.is_ascii_hexdigit())
            })
        {
            return Err(invalid());
        }

        let hex: String = groups.concat();
        let v = u128::from_str_radix(&hex, 16).map_err(|_| invalid())?;
        Ok(Guid::from_u128(v))
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// Well-known DirectInput object type GUIDs (dinput.h).
pub const GUID_X_AXIS: Guid = Guid::from_u128(0xa36d02e0_c9f3_11cf_bfc7_444553540000);
pub const GUID_Y_AXIS: Guid = Guid::from_u128(0xa36d02e1_c9f3_11cf_bfc7_444553540000);
pub const GUID_Z_AXIS: Guid = Guid::from_u128(0xa36d02e2_c9f3_11cf_bfc7_444553540000);
pub const GUID_RX_AXIS: Guid = Guid::from_u128(0xa36d02f4_c9f3_11cf_bfc7_444553540000);
pub const GUID_RY_AXIS: Guid = Guid::from_u128(0xa36d02f5_c9f3_11cf_bfc7_444553540000);
pub const GUID_RZ_AXIS: Guid = Guid::from_u128(0xa36d02e3_c9f3_11cf_bfc7_444553540000);
pub const GUID_SLIDER: Guid = Guid::from_u128(0xa36d02e4_c9f3_11cf_bfc7_444553540000);
pub const GUID_BUTTON: Guid = Guid::from_u128(0xa36d02f0_c9f3_11cf_bfc7_444553540000);
pub const GUID_POV: Guid = Guid::from_u128(0xa36d02f2_c9f3_11cf_bfc7_444553540000);

/// `IID_IDirectInput8W`.
pub const IID_IDIRECTINPUT8W: Guid = Guid::from_u128(0xbf798031_483a_4da2_aa99_5d64ed369700);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_canonical_form() {
        assert_eq!(
            GUID_X_AXIS.to_string(),
            "a36d02e0-c9f3-11cf-bfc7-444553540000"
        );
        assert_eq!(GUID_X_AXIS.data1, 0xa36d02e0);
        assert_eq!(GUID_X_AXIS.data2, 0xc9f3);
        assert_eq!(GUID_X_AXIS.data3, 0x11cf);
        assert_eq!(GUID_X_AXIS.data4, [0xbf, 0xc7, 0x44, 0x45, 0x53, 0x54, 0x00, 0x00]);
    }

    #[test]
    fn parse_accepts_braces_and_uppercase() {
        let g: Guid = "{BF798031-483A-4DA2-AA99-5D64ED369700}".parse().unwrap();
        assert_eq!(g, IID_IDIRECTINPUT8W);
        let g: Guid = "a36d02f2-c9f3-11cf-bfc7-444553540000".parse().unwrap();
        assert_eq!(g, GUID_POV);
    }

    #[test]
    fn parse_rejects_malformed_input() {
        for bad in [
            "",
            "a36d02f2c9f311cfbfc7444553540000",
            "{a36d02f2-c9f3-11cf-bfc7-444553540000",
            "a36d02f2-c9f3-11cf-bfc7-44455354000g",
            "a36d02f2-c9f3-11cf-bfc74-44553540000",
        ] {
            assert!(matches!(bad.parse::<Guid>(), Err(Error::InvalidGuid(_))), "{bad}");
        }
    }

    #[test]
    fn mixed_endian_layout_swaps_leading_fields_only() {
        let bytes = IID_IDIRECTINPUT8W.to_bytes_le();
        assert_eq!(
            bytes,
            [
                0x31, 0x80, 0x79, 0xbf, 0x3a, 0x48, 0xa2, 0x4d, 0xaa, 0x99, 0x5d, 0x64, 0xed,
                0x36, 0x97, 0x00
            ]
        );
        assert_eq!(Guid::from_bytes_le(bytes), IID_IDIRECTINPUT8W);
    }

    #[test]
    fn u128_form_follows_text_order() {
        assert_eq!(
            GUID_SLIDER.to_u128(),
            0xa36d02e4_c9f3_11cf_bfc7_444553540000
        );
    }

    #[test]
    fn vid_pid_from_product_guid() {
        // Xbox 360 pad: VID 0x045E, PID 0x028E.
        let product: Guid = "028e045e-0000-0000-0000-504944564944".parse().unwrap();
        assert_eq!(product.vid_pid(), Some((0x045e, 0x028e)));
        assert_eq!(GUID_POV.vid_pid(), None);
    }

    #[test]
    fn serde_uses_text_form() {
        let json = serde_json::to_string(&GUID_BUTTON).unwrap();
        assert_eq!(json, "\"a36d02f0-c9f3-11cf-bfc7-444553540000\"");
        let back: Guid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, GUID_BUTTON);
    }
}
