//! Generator kinds.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Which code generator to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorKind {
    /// In-process signal manager (`signal_mgr.c` / `signal_mgr.h`)
    SignalMgr,
    /// Shared-memory/VRING IPC manager, produced by an external script
    IpcManager,
    /// IPC-over-Ethernet manager, produced by an external script
    IpcEthMgr,
}

impl GeneratorKind {
    pub const ALL: [GeneratorKind; 3] = [Self::SignalMgr, Self::IpcManager, Self::IpcEthMgr];

    /// Key used in `script_paths`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SignalMgr => "signal_mgr",
            Self::IpcManager => "ipc_manager",
            Self::IpcEthMgr => "ipc_eth_mgr",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SignalMgr => "Signal Manager",
            Self::IpcManager => "IPC Manager",
            Self::IpcEthMgr => "IPC over Ethernet Manager",
        }
    }

    /// Script location used when the project has none configured.
    pub fn default_script_path(&self) -> PathBuf {
        PathBuf::from(format!("/usr/local/bin/{}_generator.py", self.as_str()))
    }

    /// Value of the script's `-i` interface argument. `None` for the
    /// native signal manager, which runs no script.
    pub fn interface_flag(&self) -> Option<&'static str> {
        match self {
            Self::SignalMgr => None,
            Self::IpcManager => Some("IPC"),
            Self::IpcEthMgr => Some("IpcOvEth"),
        }
    }

    /// Whether generation runs an external script.
    pub fn is_script_backed(&self) -> bool {
        self.interface_flag().is_some()
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised generator kind name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown generator kind '{0}' (expected signal_mgr, ipc_manager or ipc_eth_mgr)")]
pub struct UnknownKind(pub String);

impl FromStr for GeneratorKind {
    type Err = UnknownKind;

    /// Accepts `signal_mgr` and `signal-mgr` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}
