// bodge: A minimal build-description tool for C and C++ projects.
// Copyright (C) 2024 International Digital Economy Academy
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//
// For inquiries, you can contact us via e-mail at jichuruanjian@idea.edu.cn.

//! Operating system / architecture pairs with wildcard matching.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Os {
    Windows,
    Linux,
    /// Generic Unix that is not Linux.
    Unix,
    Apple,
    /// Wildcard, matches any OS.
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Arch {
    X86,
    X64,
    Arm,
    Arm64,
    /// Wildcard, matches any architecture.
    #[default]
    Unknown,
}

// Substring tables for permissive parsing. Scanned top to bottom, so longer
// or more specific tokens must come first ("darwin" contains "win",
// "x86_64" contains "x86", "arm64" contains "arm").
const OS_TOKENS: &[(&str, Os)] = &[
    ("windows", Os::Windows),
    ("linux", Os::Linux),
    ("unix", Os::Unix),
    ("apple", Os::Apple),
    ("macos", Os::Apple),
    ("darwin", Os::Apple),
    ("win", Os::Windows),
];

const ARCH_TOKENS: &[(&str, Arch)] = &[
    ("x64", Arch::X64),
    ("x86_64", Arch::X64),
    ("amd64", Arch::X64),
    ("x86", Arch::X86),
    ("i386", Arch::X86),
    ("i686", Arch::X86),
    ("arm64", Arch::Arm64),
    ("aarch64", Arch::Arm64),
    ("arm", Arch::Arm),
];

impl Os {
    pub const ALL: [Os; 4] = [Os::Windows, Os::Linux, Os::Unix, Os::Apple];

    pub fn as_str(self) -> &'static str {
        match self {
            Os::Windows => "windows",
            Os::Linux => "linux",
            Os::Unix => "unix",
            Os::Apple => "apple",
            Os::Unknown => "unknown",
        }
    }

    /// Exact, case-insensitive lookup of a single OS name.
    pub fn from_name(name: &str) -> Os {
        let name = name.trim();
        OS_TOKENS
            .iter()
            .find(|(token, _)| token.eq_ignore_ascii_case(name))
            .map(|(_, os)| *os)
            .unwrap_or(Os::Unknown)
    }

    fn scan(lower: &str) -> Os {
        OS_TOKENS
            .iter()
            .find(|(token, _)| lower.contains(token))
            .map(|(_, os)| *os)
            .unwrap_or(Os::Unknown)
    }

    pub fn current() -> Os {
        if cfg!(windows) {
            Os::Windows
        } else if cfg!(target_os = "linux") {
            Os::Linux
        } else if cfg!(any(target_os = "macos", target_os = "ios")) {
            Os::Apple
        } else if cfg!(unix) {
            Os::Unix
        } else {
            Os::Unknown
        }
    }
}

impl Arch {
    pub const ALL: [Arch; 4] = [Arch::X86, Arch::X64, Arch::Arm, Arch::Arm64];

    pub fn as_str(self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X64 => "x64",
            Arch::Arm => "arm",
            Arch::Arm64 => "arm64",
            Arch::Unknown => "unknown",
        }
    }

    /// Exact, case-insensitive lookup of a single architecture name.
    pub fn from_name(name: &str) -> Arch {
        let name = name.trim();
        ARCH_TOKENS
            .iter()
            .find(|(token, _)| token.eq_ignore_ascii_case(name))
            .map(|(_, arch)| *arch)
            .unwrap_or(Arch::Unknown)
    }

    fn scan(lower: &str) -> Arch {
        ARCH_TOKENS
            .iter()
            .find(|(token, _)| lower.contains(token))
            .map(|(_, arch)| *arch)
            .unwrap_or(Arch::Unknown)
    }

    pub fn current() -> Arch {
        Arch::from_name(std::env::consts::ARCH)
    }
}

/// A target platform. `Unknown` fields act as wildcards in [`Platform::matches`],
/// while `Eq`/`Hash` compare fields exactly so platforms can key a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    /// The fully wildcard platform, matches everything.
    pub const ANY: Platform = Platform {
        os: Os::Unknown,
        arch: Arch::Unknown,
    };

    pub const fn new(os: Os, arch: Arch) -> Self {
        Platform { os, arch }
    }

    /// Parses a platform string such as `linux_x64`, `Windows-AMD64` or
    /// `darwin_aarch64`. Never fails: fields that cannot be recognized become
    /// `Unknown`, so garbage input yields [`Platform::ANY`].
    pub fn parse(s: &str) -> Self {
        let lower = s.to_ascii_lowercase();
        Platform {
            os: Os::scan(&lower),
            arch: Arch::scan(&lower),
        }
    }

    pub fn matches(&self, other: &Platform) -> bool {
        let os = self.os == Os::Unknown || other.os == Os::Unknown || self.os == other.os;
        let arch =
            self.arch == Arch::Unknown || other.arch == Arch::Unknown || self.arch == other.arch;
        os && arch
    }

    pub fn is_wildcard(&self) -> bool {
        self.os == Os::Unknown && self.arch == Arch::Unknown
    }

    pub fn current() -> Self {
        Platform {
            os: Os::current(),
            arch: Arch::current(),
        }
    }

    /// Every concrete OS and architecture combination.
    pub fn all() -> Vec<Platform> {
        Os::ALL
            .iter()
            .flat_map(|os| Arch::ALL.iter().map(move |arch| Platform::new(*os, *arch)))
            .collect()
    }

    /// Compiler flags implied by the platform alone. Not overridable.
    pub fn default_cxx_flags(&self) -> Vec<&'static str> {
        let mut flags = vec![];
        match self.arch {
            Arch::X86 => flags.push("-m32"),
            Arch::X64 => flags.push("-m64"),
            Arch::Arm | Arch::Arm64 | Arch::Unknown => {}
        }
        match self.os {
            Os::Windows => {
                flags.push("-static-libgcc");
                flags.push("-static-libstdc++");
            }
            Os::Linux | Os::Unix => flags.push("-pthread"),
            Os::Apple | Os::Unknown => {}
        }
        flags
    }

    pub fn executable_extension(&self) -> &'static str {
        match self.os {
            Os::Windows => ".exe",
            _ => "",
        }
    }

    pub fn shared_library_extension(&self) -> &'static str {
        match self.os {
            Os::Windows => ".dll",
            Os::Apple => ".dylib",
            _ => ".so",
        }
    }

    pub fn static_library_extension(&self) -> &'static str {
        match self.os {
            Os::Windows => ".lib",
            _ => ".a",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os.as_str(), self.arch.as_str())
    }
}

impl FromStr for Platform {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Platform::parse(s))
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Platform::parse(&s))
    }
}
