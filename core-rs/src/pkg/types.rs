//! Enumerations used by package and major-version records
//!
//! Every enum carries two sentinels next to its known values:
//! - `None`: the value was not given
//! - `NotFound`: the value was given but is not recognised
//!
//! Query filters treat both sentinels as "unconstrained".

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

macro_rules! api_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => $api:literal $(| $alias:literal)*),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant,)*
            None,
            NotFound,
        }

        impl $name {
            /// Known values, sentinels excluded
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            /// Parameter value used by the discovery API
            pub fn api_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $api,)*
                    $name::None => "none",
                    $name::NotFound => "not_found",
                }
            }

            /// Parse an API value, accepting known aliases
            ///
            /// Empty text yields `None`, unknown text yields `NotFound`.
            pub fn from_text(text: &str) -> Self {
                let normalized = text.trim().to_lowercase();
                match normalized.as_str() {
                    "" | "none" => $name::None,
                    $($api $(| $alias)* => $name::$variant,)*
                    _ => $name::NotFound,
                }
            }

            /// True for `None` and `NotFound`
            pub fn is_sentinel(&self) -> bool {
                matches!(self, $name::None | $name::NotFound)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::None
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.api_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.api_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let text = Option::<String>::deserialize(deserializer)?;
                Ok(text.map(|t| $name::from_text(&t)).unwrap_or($name::None))
            }
        }
    };
}

api_enum! {
    /// JDK vendor / distribution
    Distribution {
        Aoj => "aoj",
        AojOpenJ9 => "aoj_openj9",
        Bisheng => "bisheng",
        Corretto => "corretto",
        Dragonwell => "dragonwell",
        GluonGraalVm => "gluon_graalvm",
        GraalVmCe8 => "graalvm_ce8",
        GraalVmCe11 => "graalvm_ce11",
        GraalVmCe16 => "graalvm_ce16",
        GraalVmCe17 => "graalvm_ce17",
        GraalVmCe19 => "graalvm_ce19",
        GraalVmCommunity => "graalvm_community",
        GraalVm => "graalvm",
        JetBrains => "jetbrains",
        Kona => "kona",
        Liberica => "liberica",
        LibericaNative => "liberica_native",
        Mandrel => "mandrel",
        Microsoft => "microsoft",
        OjdkBuild => "ojdk_build",
        OpenLogic => "openlogic",
        Oracle => "oracle",
        OracleOpenJdk => "oracle_open_jdk" | "oracle_openjdk",
        RedHat => "redhat" | "red_hat",
        SapMachine => "sap_machine" | "sapmachine",
        Semeru => "semeru",
        SemeruCertified => "semeru_certified",
        Temurin => "temurin" | "adoptium",
        Trava => "trava",
        Zulu => "zulu",
        ZuluPrime => "zulu_prime",
    }
}

api_enum! {
    /// CPU architecture
    Architecture {
        Aarch64 => "aarch64" | "arm64",
        Amd64 => "amd64" | "x64" | "x86_64" | "x86-64",
        Arm => "arm" | "arm32" | "aarch32" | "armv6" | "armv7",
        Mips => "mips",
        Ppc => "ppc",
        Ppc64 => "ppc64",
        Ppc64Le => "ppc64le",
        Riscv64 => "riscv64",
        S390x => "s390x",
        Sparc => "sparc",
        SparcV9 => "sparcv9",
        X86 => "x86" | "i386" | "i586" | "i686" | "x32",
        Ia64 => "ia64",
    }
}

api_enum! {
    /// Address width derived from the architecture
    Bitness {
        Bit32 => "32",
        Bit64 => "64",
    }
}

api_enum! {
    /// Package archive / installer format
    ArchiveType {
        Apk => "apk",
        Cab => "cab",
        Deb => "deb",
        Dmg => "dmg",
        Exe => "exe",
        Msi => "msi",
        Pkg => "pkg",
        Rpm => "rpm",
        SrcTar => "src_tar" | "src.tar.gz",
        Tar => "tar",
        TarGz => "tar.gz" | "tgz",
        TarZ => "tar.z",
        Zip => "zip",
    }
}

api_enum! {
    /// Target operating system
    OperatingSystem {
        Aix => "aix",
        AlpineLinux => "alpine_linux" | "alpine",
        Linux => "linux",
        LinuxMusl => "linux_musl",
        MacOs => "macos" | "mac" | "osx",
        Qnx => "qnx",
        Solaris => "solaris",
        Windows => "windows" | "win",
    }
}

api_enum! {
    /// C library the package is linked against
    LibCType {
        Glibc => "glibc",
        Libc => "libc",
        Musl => "musl",
        CStdLib => "c_std_lib",
    }
}

api_enum! {
    /// JDK or JRE
    PackageType {
        Jdk => "jdk",
        Jre => "jre",
    }
}

api_enum! {
    /// Support term of a release line
    TermOfSupport {
        Lts => "lts",
        Mts => "mts",
        Sts => "sts",
    }
}

api_enum! {
    /// Early access or general availability
    ReleaseStatus {
        Ea => "ea",
        Ga => "ga",
    }
}

api_enum! {
    /// Discovery scope a distribution is published under
    Scope {
        Public => "public",
        BuildOfOpenJdk => "build_of_openjdk",
        BuildOfGraalVm => "build_of_graalvm",
        FreeToUseInProduction => "free_to_use_in_production",
        LicenseNeededForProduction => "license_needed_for_production",
        DirectlyDownloadable => "directly_downloadable",
        NotDirectlyDownloadable => "not_directly_downloadable",
        OpenSource => "open_source",
        SignupRequired => "signup_required",
    }
}

api_enum! {
    /// Latest-selection policy applied in `Comparison::Equal` mode
    Latest {
        Overall => "overall",
        PerDistribution => "per_distro" | "per_distribution",
        PerVersion => "per_version",
    }
}

api_enum! {
    /// Version comparison mode of a query
    Comparison {
        Equal => "equal" | "=",
        LessThan => "less_than" | "<",
        LessThanOrEqual => "less_than_or_equal" | "<=",
        GreaterThan => "greater_than" | ">",
        GreaterThanOrEqual => "greater_than_or_equal" | ">=",
    }
}

impl Architecture {
    /// Address width of this architecture
    pub fn bitness(&self) -> Bitness {
        match self {
            Architecture::Arm | Architecture::Mips | Architecture::Ppc | Architecture::Sparc | Architecture::X86 => {
                Bitness::Bit32
            }
            Architecture::Aarch64
            | Architecture::Amd64
            | Architecture::Ppc64
            | Architecture::Ppc64Le
            | Architecture::Riscv64
            | Architecture::S390x
            | Architecture::SparcV9
            | Architecture::Ia64 => Bitness::Bit64,
            Architecture::None => Bitness::None,
            Architecture::NotFound => Bitness::NotFound,
        }
    }
}

impl ReleaseStatus {
    /// Release status implied by a Java version string (`-ea` marks early access)
    pub fn from_java_version(text: &str) -> Self {
        if text.trim().is_empty() {
            ReleaseStatus::None
        } else if text.to_lowercase().contains("-ea") {
            ReleaseStatus::Ea
        } else {
            ReleaseStatus::Ga
        }
    }
}

impl Distribution {
    /// Distributions whose binaries are GraalVM or native-image builds
    pub fn is_graalvm_based(&self) -> bool {
        matches!(
            self,
            Distribution::GluonGraalVm
                | Distribution::GraalVmCe8
                | Distribution::GraalVmCe11
                | Distribution::GraalVmCe16
                | Distribution::GraalVmCe17
                | Distribution::GraalVmCe19
                | Distribution::GraalVmCommunity
                | Distribution::GraalVm
                | Distribution::LibericaNative
                | Distribution::Mandrel
        )
    }

    /// Distributions left out of the overall maximum when no distribution or
    /// feature was requested
    pub fn is_excluded_from_overall_latest(&self) -> bool {
        matches!(
            self,
            Distribution::GraalVmCe8
                | Distribution::GraalVmCe11
                | Distribution::LibericaNative
                | Distribution::Mandrel
        )
    }

    /// Known distributions built from OpenJDK sources
    pub fn based_on_openjdk() -> Vec<Distribution> {
        Distribution::ALL
            .iter()
            .copied()
            .filter(|d| !d.is_graalvm_based())
            .collect()
    }

    /// Known distributions built on GraalVM
    pub fn based_on_graalvm() -> Vec<Distribution> {
        Distribution::ALL
            .iter()
            .copied()
            .filter(Distribution::is_graalvm_based)
            .collect()
    }
}
