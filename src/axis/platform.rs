// src/axis/platform.rs

//! Target architectures, operating systems and the groupings legacy
//! modules use to address several of them at once.

use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Target CPU architecture
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
pub enum Arch {
    #[strum(serialize = "arm")]
    Arm,
    #[strum(serialize = "arm64")]
    Arm64,
    #[strum(serialize = "riscv64")]
    Riscv64,
    #[strum(serialize = "x86")]
    X86,
    #[strum(serialize = "x86_64")]
    X86_64,
}

/// Target operating system
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
pub enum Os {
    #[strum(serialize = "android")]
    Android,
    #[strum(serialize = "darwin")]
    Darwin,
    #[strum(serialize = "linux_bionic")]
    LinuxBionic,
    #[strum(serialize = "linux_glibc")]
    LinuxGlibc,
    #[strum(serialize = "linux_musl")]
    LinuxMusl,
    #[strum(serialize = "windows")]
    Windows,
}

impl Os {
    /// Architectures this OS can be built for
    pub fn arches(&self) -> &'static [Arch] {
        match self {
            Self::Android => &[Arch::Arm, Arch::Arm64, Arch::Riscv64, Arch::X86, Arch::X86_64],
            Self::Darwin => &[Arch::Arm64, Arch::X86_64],
            Self::LinuxBionic => &[Arch::Arm64, Arch::X86_64],
            Self::LinuxGlibc | Self::LinuxMusl | Self::Windows => &[Arch::X86, Arch::X86_64],
        }
    }

    pub fn is_bionic(&self) -> bool {
        matches!(self, Self::Android | Self::LinuxBionic)
    }
}

/// Combined `<os>_<arch>` key, e.g. `linux_glibc_x86_64`
pub fn os_arch_key(os: Os, arch: Arch) -> String {
    format!("{}_{}", os, arch)
}

/// Split an `<os>_<arch>` key back into its parts
///
/// OS names contain underscores themselves, so every OS prefix is tried.
pub fn parse_os_arch(key: &str) -> Option<(Os, Arch)> {
    Os::iter().find_map(|os| {
        let rest = key.strip_prefix(<&'static str>::from(os))?.strip_prefix('_')?;
        let arch = Arch::from_str(rest).ok()?;
        os.arches().contains(&arch).then_some((os, arch))
    })
}

/// All legal `<os>_<arch>` keys in sorted order
pub fn os_arch_keys() -> Vec<String> {
    let mut keys: Vec<String> = Os::iter()
        .flat_map(|os| os.arches().iter().map(move |arch| os_arch_key(os, *arch)))
        .collect();
    keys.sort();
    keys
}

/// OS families accepted in `target` blocks, in the order their properties
/// are applied ahead of OS-specific blocks.
pub const OS_FAMILIES: &[&str] = &["host", "host_linux", "linux", "not_windows", "bionic", "glibc", "musl"];

/// Expand an OS family name into the OSes it covers
pub fn os_family(name: &str) -> Option<Vec<Os>> {
    let oses = match name {
        "host" => vec![Os::Darwin, Os::LinuxBionic, Os::LinuxGlibc, Os::LinuxMusl, Os::Windows],
        "host_linux" => vec![Os::LinuxBionic, Os::LinuxGlibc, Os::LinuxMusl],
        "linux" => vec![Os::Android, Os::LinuxBionic, Os::LinuxGlibc, Os::LinuxMusl],
        "not_windows" => Os::iter().filter(|os| *os != Os::Windows).collect(),
        "bionic" => Os::iter().filter(Os::is_bionic).collect(),
        "glibc" => vec![Os::LinuxGlibc],
        "musl" => vec![Os::LinuxMusl],
        _ => return None,
    };
    Some(oses)
}

/// Expand a multilib name into the architectures of that bit width
pub fn multilib_arches(name: &str) -> Option<&'static [Arch]> {
    match name {
        "lib32" => Some(&[Arch::Arm, Arch::X86]),
        "lib64" => Some(&[Arch::Arm64, Arch::Riscv64, Arch::X86_64]),
        _ => None,
    }
}
