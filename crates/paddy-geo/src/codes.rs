// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Three-letter province codes used in folder and file names.

/// Code used when the province is unknown or not in the table.
pub const UNKNOWN_CODE: &str = "UNK";

const PROVINCE_CODES: &[(&str, &str)] = &[
    ("Banteay Meanchey", "BMC"),
    ("Battambang", "BTB"),
    ("Kampong Cham", "KCM"),
    ("Kampong Chhnang", "KCG"),
    ("Kampong Speu", "KSP"),
    ("Kampong Thom", "KTM"),
    ("Kampot", "KPT"),
    ("Kandal", "KDL"),
    ("Koh Kong", "KKG"),
    ("Kratie", "KTE"),
    ("Mondulkiri", "MKR"),
    ("Oddar Meanchey", "OMC"),
    ("Preah Vihear", "PVH"),
    ("Pursat", "PST"),
    ("Prey Veng", "PVG"),
    ("Ratanakiri", "RKP"),
    ("Siem Reap", "SRP"),
    ("Stung Treng", "STG"),
    ("Svay Rieng", "SRG"),
    ("Takeo", "TKO"),
    ("Kep", "KEP"),
    ("Pailin", "PLN"),
    ("Phnom Penh", "PNH"),
    ("Sihanoukville", "SHV"),
    ("Tbong Khmum", "TBM"),
];

/// Returns the code for a province name, or [`UNKNOWN_CODE`].
pub fn region_code(name: &str) -> &'static str {
    PROVINCE_CODES
        .iter()
        .find(|(province, _)| *province == name)
        .map(|(_, code)| *code)
        .unwrap_or(UNKNOWN_CODE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_provinces() {
        assert_eq!(region_code("Phnom Penh"), "PNH");
        assert_eq!(region_code("Kampong Chhnang"), "KCG");
        assert_eq!(region_code("Tbong Khmum"), "TBM");
    }

    #[test]
    fn unknown_province() {
        assert_eq!(region_code("Unknown"), UNKNOWN_CODE);
        assert_eq!(region_code("phnom penh"), UNKNOWN_CODE);
    }

    #[test]
    fn codes_are_unique() {
        let mut codes: Vec<_> = PROVINCE_CODES.iter().map(|(_, c)| *c).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), PROVINCE_CODES.len());
    }
}
