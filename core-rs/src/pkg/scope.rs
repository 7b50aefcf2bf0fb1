//! Static distribution → scope table
//!
//! Every query consults this table: a package is only a candidate when its
//! distribution is published under at least one of the requested scopes.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::types::{Distribution, Scope};

static SCOPE_LOOKUP: Lazy<HashMap<Distribution, Vec<Scope>>> = Lazy::new(|| {
    use Distribution as D;
    use Scope as S;

    let free_openjdk = [
        S::Public,
        S::BuildOfOpenJdk,
        S::FreeToUseInProduction,
        S::DirectlyDownloadable,
        S::OpenSource,
    ];
    let free_graalvm = [
        S::Public,
        S::BuildOfGraalVm,
        S::FreeToUseInProduction,
        S::DirectlyDownloadable,
        S::OpenSource,
    ];

    let mut table = HashMap::new();
    for distribution in Distribution::ALL {
        let scopes: Vec<Scope> = match distribution {
            D::Oracle => vec![
                S::Public,
                S::BuildOfOpenJdk,
                S::LicenseNeededForProduction,
                S::DirectlyDownloadable,
            ],
            D::ZuluPrime => vec![
                S::Public,
                S::BuildOfOpenJdk,
                S::LicenseNeededForProduction,
                S::NotDirectlyDownloadable,
                S::SignupRequired,
            ],
            D::GraalVm => vec![
                S::Public,
                S::BuildOfGraalVm,
                S::LicenseNeededForProduction,
                S::DirectlyDownloadable,
            ],
            D::SemeruCertified => vec![
                S::Public,
                S::BuildOfOpenJdk,
                S::FreeToUseInProduction,
                S::DirectlyDownloadable,
            ],
            d if d.is_graalvm_based() => free_graalvm.to_vec(),
            _ => free_openjdk.to_vec(),
        };
        table.insert(*distribution, scopes);
    }
    table
});

/// Scopes a distribution is published under (empty for sentinels)
pub fn scopes_of(distribution: Distribution) -> &'static [Scope] {
    SCOPE_LOOKUP
        .get(&distribution)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// True when the distribution is published under any of `scopes`
pub fn in_any_scope(distribution: Distribution, scopes: &[Scope]) -> bool {
    scopes_of(distribution).iter().any(|s| scopes.contains(s))
}

/// Known distributions published under any of `scopes`
pub fn distributions_in_scopes(scopes: &[Scope]) -> Vec<Distribution> {
    Distribution::ALL
        .iter()
        .copied()
        .filter(|d| in_any_scope(*d, scopes))
        .collect()
}
