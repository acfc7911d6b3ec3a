use rust_decimal_macros::dec;
use serde::Serialize;

use crate::types::Pct;

/// Default fiscal terms for a jurisdiction and deal type. Representative
/// headline rates only; deal documents override these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FiscalProfile {
    pub jurisdiction: &'static str,
    pub deal_type: &'static str,
    pub royalty_pct: Pct,
    pub severance_pct: Pct,
    pub income_tax_pct: Pct,
    pub description: &'static str,
}

const PROFILES: &[FiscalProfile] = &[
    FiscalProfile {
        jurisdiction: "us_gom",
        deal_type: "deepwater",
        royalty_pct: dec!(18.75),
        severance_pct: dec!(0),
        income_tax_pct: dec!(21),
        description: "US federal deepwater lease at the post-2007 royalty rate",
    },
    FiscalProfile {
        jurisdiction: "us_gom",
        deal_type: "shelf",
        royalty_pct: dec!(16.67),
        severance_pct: dec!(0),
        income_tax_pct: dec!(21),
        description: "US federal shelf lease",
    },
    FiscalProfile {
        jurisdiction: "us_onshore",
        deal_type: "conventional",
        royalty_pct: dec!(12.5),
        severance_pct: dec!(4.6),
        income_tax_pct: dec!(21),
        description: "US onshore with a Texas-style oil severance tax",
    },
    FiscalProfile {
        jurisdiction: "us_onshore",
        deal_type: "unconventional",
        royalty_pct: dec!(20),
        severance_pct: dec!(4.6),
        income_tax_pct: dec!(21),
        description: "US onshore shale; fee-land royalties trend above the federal minimum",
    },
    FiscalProfile {
        jurisdiction: "ukcs",
        deal_type: "offshore",
        royalty_pct: dec!(0),
        severance_pct: dec!(0),
        income_tax_pct: dec!(75),
        description: "UK ring fence corporation tax, supplementary charge and energy profits levy",
    },
    FiscalProfile {
        jurisdiction: "norway_offshore",
        deal_type: "offshore",
        royalty_pct: dec!(0),
        severance_pct: dec!(0),
        income_tax_pct: dec!(78),
        description: "Norwegian 22% corporate tax plus 56% special petroleum tax",
    },
    FiscalProfile {
        jurisdiction: "australia_offshore",
        deal_type: "offshore",
        royalty_pct: dec!(0),
        severance_pct: dec!(0),
        income_tax_pct: dec!(30),
        description: "Australian company tax; PRRT assessed separately on project profit",
    },
];

const GENERIC_PROFILE: FiscalProfile = FiscalProfile {
    jurisdiction: "generic",
    deal_type: "any",
    royalty_pct: dec!(12.5),
    severance_pct: dec!(0),
    income_tax_pct: dec!(25),
    description: "generic concessionary terms used when no jurisdiction profile matches",
};

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Looks up default fiscal terms: exact (jurisdiction, deal_type) key
/// first, then any profile sharing a jurisdiction prefix, then the
/// generic fallback.
pub fn get_fiscal_profile(jurisdiction: &str, deal_type: &str) -> FiscalProfile {
    let jurisdiction = normalize(jurisdiction);
    let deal_type = normalize(deal_type);

    if let Some(profile) = PROFILES
        .iter()
        .find(|p| p.jurisdiction == jurisdiction && p.deal_type == deal_type)
    {
        return *profile;
    }
    if !jurisdiction.is_empty() {
        if let Some(profile) = PROFILES.iter().find(|p| {
            p.jurisdiction.starts_with(jurisdiction.as_str())
                || jurisdiction.starts_with(p.jurisdiction)
        }) {
            return *profile;
        }
    }
    GENERIC_PROFILE
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn exact_key_wins() {
        let profile = get_fiscal_profile("us_gom", "deepwater");
        assert_eq!(profile.royalty_pct, dec!(18.75));
        assert_eq!(profile.income_tax_pct, dec!(21));
    }

    #[test]
    fn unknown_deal_type_falls_to_jurisdiction_prefix() {
        let profile = get_fiscal_profile("us_gom", "subsea_tieback");
        assert_eq!(profile.jurisdiction, "us_gom");
    }

    #[test]
    fn short_jurisdiction_prefix_matches() {
        let profile = get_fiscal_profile("norway", "offshore");
        assert_eq!(profile.income_tax_pct, dec!(78));
    }

    #[test]
    fn unknown_jurisdiction_gets_generic_terms() {
        let profile = get_fiscal_profile("kazakhstan", "onshore");
        assert_eq!(profile.jurisdiction, "generic");
        assert_eq!(profile.royalty_pct, dec!(12.5));
        assert_eq!(profile.income_tax_pct, dec!(25));
    }

    #[test]
    fn empty_jurisdiction_gets_generic_terms() {
        assert_eq!(get_fiscal_profile("", "").jurisdiction, "generic");
    }

    #[test]
    fn keys_are_normalized() {
        let profile = get_fiscal_profile("  US_GoM ", "Shelf");
        assert_eq!(profile.royalty_pct, dec!(16.67));
    }
}
