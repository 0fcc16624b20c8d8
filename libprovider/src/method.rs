//! Remote operations the wallet extension can perform.
//!
//! Callers and the wire do not always use the same name for an operation, e.g. the caller-facing
//! `submitTransaction` is sent to the extension as `pushTx`. The mapping lives in [`METHOD_TABLE`].

use crate::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemoteMethod {
    RequestAccounts,
    SwitchNetwork,
    SignMessage,
    SignPsbt,
    PushPsbt,
    SubmitTransaction,
}

/// `(method, caller-facing name, wire name)`
pub static METHOD_TABLE: [(RemoteMethod, &str, &str); 6] = [
    (RemoteMethod::RequestAccounts, "requestAccounts", "requestAccounts"),
    (RemoteMethod::SwitchNetwork, "switchNetwork", "switchNetwork"),
    (RemoteMethod::SignMessage, "signMessage", "signMessage"),
    (RemoteMethod::SignPsbt, "signPsbt", "signPsbt"),
    (RemoteMethod::PushPsbt, "pushPsbt", "pushPsbt"),
    (RemoteMethod::SubmitTransaction, "submitTransaction", "pushTx"),
];

impl RemoteMethod {
    fn entry(&self) -> &'static (RemoteMethod, &'static str, &'static str) {
        // Every variant has exactly one row
        match METHOD_TABLE.iter().find(|(m, _, _)| m == self) {
            Some(row) => row,
            None => unreachable!("{self:?} is missing from METHOD_TABLE"),
        }
    }

    pub fn caller_name(&self) -> &'static str {
        self.entry().1
    }

    pub fn wire_name(&self) -> &'static str {
        self.entry().2
    }

    /// Look a method up by the name the extension uses on the wire.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        METHOD_TABLE.iter().find(|(_, _, wire)| *wire == name).map(|(m, _, _)| *m)
    }
}

/// Parses the caller-facing name. Anything outside the table is an `UnsupportedMethod` error.
impl FromStr for RemoteMethod {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        METHOD_TABLE
            .iter()
            .find(|(_, caller, _)| *caller == s)
            .map(|(m, _, _)| *m)
            .ok_or_else(|| ProviderError::UnsupportedMethod { method: s.to_string() })
    }
}

impl Display for RemoteMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.caller_name())
    }
}
