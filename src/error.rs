//! Error type shared by every layer of the crate.
//!
//! Native failures all collapse into [`Error::Native`], carrying the name of the
//! COM call and its [`HResult`]. There is no per-code recovery beyond the single
//! re-acquire in [`Joystick::state`](crate::joystick::Joystick::state).

use std::fmt;

use thiserror::Error;

/// A COM status code.
///
/// Negative values are failures (`FAILED(hr)`); zero and positive values are
/// success codes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HResult(pub i32);

impl HResult {
    pub const S_OK: HResult = HResult(0);
    pub const S_FALSE: HResult = HResult(1);
    /// `DI_NOEFFECT`, returned by `Poll` on devices that do not need polling.
    pub const DI_NOEFFECT: HResult = HResult(1);
    pub const E_FAIL: HResult = HResult(0x8000_4005_u32 as i32);
    pub const E_POINTER: HResult = HResult(0x8000_4003_u32 as i32);
    pub const DIERR_INVALIDPARAM: HResult = HResult(0x8007_0057_u32 as i32);
    pub const DIERR_NOTACQUIRED: HResult = HResult(0x8007_000C_u32 as i32);
    pub const DIERR_INPUTLOST: HResult = HResult(0x8007_001E_u32 as i32);
    pub const DIERR_OTHERAPPHASPRIO: HResult = HResult(0x8007_0005_u32 as i32);
    pub const DIERR_DEVICENOTREG: HResult = HResult(0x8004_0154_u32 as i32);
    pub const DIERR_UNPLUGGED: HResult = HResult(0x8004_0209_u32 as i32);
    pub const DIERR_NOTINITIALIZED: HResult = HResult(0x8007_0015_u32 as i32);
    pub const DIERR_OLDDIRECTINPUTVERSION: HResult = HResult(0x8007_047E_u32 as i32);
    pub const DIERR_OBJECTNOTFOUND: HResult = HResult(0x8007_0002_u32 as i32);

    #[inline]
    pub fn is_failure(self) -> bool {
        self.0 < 0
    }

    /// Symbolic name for codes DirectInput commonly returns.
    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::S_OK => "S_OK",
            Self::S_FALSE => "S_FALSE",
            Self::E_FAIL => "E_FAIL",
            Self::E_POINTER => "E_POINTER",
            Self::DIERR_INVALIDPARAM => "DIERR_INVALIDPARAM",
            Self::DIERR_NOTACQUIRED => "DIERR_NOTACQUIRED",
            Self::DIERR_INPUTLOST => "DIERR_INPUTLOST",
            Self::DIERR_OTHERAPPHASPRIO => "DIERR_OTHERAPPHASPRIO",
            Self::DIERR_DEVICENOTREG => "DIERR_DEVICENOTREG",
            Self::DIERR_UNPLUGGED => "DIERR_UNPLUGGED",
            Self::DIERR_NOTINITIALIZED => "DIERR_NOTINITIALIZED",
            Self::DIERR_OLDDIRECTINPUTVERSION => "DIERR_OLDDIRECTINPUTVERSION",
            Self::DIERR_OBJECTNOTFOUND => "DIERR_OBJECTNOTFOUND",
            _ => return None,
        })
    }

    /// Map a raw status to `Ok(())` or [`Error::Native`].
    #[inline]
    pub fn check(self, call: &'static str) -> Result<()> {
        if self.is_failure() {
            Err(Error::Native { call, code: self })
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0 as u32)?;
        if let Some(name) = self.name() {
            write!(f, " ({name})")?;
        }
        Ok(())
    }
}

impl fmt::Debug for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HResult({self})")
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// A native DirectInput call returned a failure status.
    #[error("{call} failed: {code}")]
    Native { call: &'static str, code: HResult },

    #[error("invalid GUID: {0:?}")]
    InvalidGuid(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No attached controller matched the requested identity.
    #[error("no attached controller matches {0}")]
    ControllerNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The status code for native failures.
    pub fn code(&self) -> Option<HResult> {
        match self {
            Error::Native { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_codes_are_negative() {
        assert!(HResult::DIERR_INPUTLOST.is_failure());
        assert!(!HResult::S_OK.is_failure());
        assert!(!HResult::DI_NOEFFECT.is_failure());
    }

    #[test]
    fn check_carries_call_and_code() {
        let err = HResult::DIERR_NOTACQUIRED.check("Poll").unwrap_err();
        assert_eq!(err.code(), Some(HResult::DIERR_NOTACQUIRED));
        assert_eq!(err.to_string(), "Poll failed: 0x8007000C (DIERR_NOTACQUIRED)");
        assert!(HResult::S_FALSE.check("Poll").is_ok());
    }

    #[test]
    fn unknown_codes_render_hex_only() {
        assert_eq!(HResult(0x8123_4567_u32 as i32).to_string(), "0x81234567");
    }
}
