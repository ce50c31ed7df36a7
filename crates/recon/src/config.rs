use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Engine settings. Every field has a default, so an empty TOML document is valid.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Record-type value that marks a sale. Only these rows feed the metrics.
    #[serde(default = "default_sale_type")]
    pub sale_type: String,
    /// Brand label given to sales rows whose code is not in the catalog.
    #[serde(default = "default_unknown_brand")]
    pub unknown_brand: String,
    /// Unmatched share of sale rows above which a high-severity alert is raised.
    #[serde(default = "default_alert_ratio")]
    pub unmatched_alert_ratio: f64,
    #[serde(default)]
    pub brands: BrandConfig,
    #[serde(default)]
    pub repair: RepairConfig,
}

fn default_sale_type() -> String {
    "Venda".into()
}

fn default_unknown_brand() -> String {
    "DESCONHECIDA".into()
}

fn default_alert_ratio() -> f64 {
    0.05
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sale_type: default_sale_type(),
            unknown_brand: default_unknown_brand(),
            unmatched_alert_ratio: default_alert_ratio(),
            brands: BrandConfig::default(),
            repair: RepairConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Brands
// ---------------------------------------------------------------------------

/// Brands of the network plus the spellings found in catalog exports.
///
/// Alias keys are matched against the upper-cased, trimmed brand value.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BrandConfig {
    #[serde(default = "default_known_brands")]
    pub known: Vec<String>,
    #[serde(default = "default_brand_aliases")]
    pub aliases: BTreeMap<String, String>,
}

fn default_known_brands() -> Vec<String> {
    ["oBoticário", "Eudora", "AuAmigos", "Quem Disse Berenice", "QDB", "O.U.I"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_brand_aliases() -> BTreeMap<String, String> {
    [
        ("QDB", "Quem Disse Berenice"),
        ("QUEM DISSE BERENICE", "Quem Disse Berenice"),
        ("OBOTICARIO", "oBoticário"),
        ("O BOTICARIO", "oBoticário"),
        ("BOTICARIO", "oBoticário"),
        ("EUDORA", "Eudora"),
        ("AUAMIGOS", "AuAmigos"),
        ("AU AMIGOS", "AuAmigos"),
        ("OUI", "O.U.I"),
        ("O.U.I", "O.U.I"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            known: default_known_brands(),
            aliases: default_brand_aliases(),
        }
    }
}

impl BrandConfig {
    /// True when `brand` is a known brand or alias (case-insensitive).
    pub fn recognizes(&self, brand: &str) -> bool {
        let upper = brand.trim().to_uppercase();
        self.aliases.contains_key(&upper) || self.known.iter().any(|k| k.to_uppercase() == upper)
    }

    /// Rewrite alias keys into the trimmed upper-case form lookups use.
    /// Two spellings of one key must agree on the canonical name.
    pub fn canonicalize_aliases(&mut self) -> Result<(), ReconError> {
        let mut canonical = BTreeMap::new();
        for (key, name) in std::mem::take(&mut self.aliases) {
            let upper = key.trim().to_uppercase();
            if let Some(previous) = canonical.get(&upper) {
                if previous != &name {
                    return Err(ReconError::ConfigValidation(format!(
                        "brand alias '{upper}' maps to both '{previous}' and '{name}'"
                    )));
                }
            }
            canonical.insert(upper, name);
        }
        self.aliases = canonical;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Repair
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RepairConfig {
    /// Header names (case-insensitive, in priority order) of the free-text
    /// column that absorbs surplus fields.
    #[serde(default = "default_text_columns")]
    pub text_columns: Vec<String>,
}

fn default_text_columns() -> Vec<String> {
    ["nomeproduto", "nome material", "nomerevendedora", "nome", "descricao", "descrição"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self { text_columns: default_text_columns() }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl EngineConfig {
    /// Parse, upper-case the alias keys, then validate.
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let mut config: EngineConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.brands.canonicalize_aliases()?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ReconError> {
        toml::to_string_pretty(self).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.sale_type.trim().is_empty() {
            return Err(ReconError::ConfigValidation("sale_type must not be empty".into()));
        }

        if self.unknown_brand.trim().is_empty() {
            return Err(ReconError::ConfigValidation("unknown_brand must not be empty".into()));
        }

        if !(0.0..=1.0).contains(&self.unmatched_alert_ratio) {
            return Err(ReconError::ConfigValidation(format!(
                "unmatched_alert_ratio must be within [0, 1], got {}",
                self.unmatched_alert_ratio
            )));
        }

        // The sentinel must never be mistaken for a real brand
        if self.brands.recognizes(&self.unknown_brand) {
            return Err(ReconError::ConfigValidation(format!(
                "unknown_brand '{}' collides with a known brand or alias",
                self.unknown_brand
            )));
        }

        if let Some(key) = self.brands.aliases.keys().find(|k| k.trim().to_uppercase() != **k) {
            return Err(ReconError::ConfigValidation(format!(
                "brand alias key '{key}' is not in trimmed upper case"
            )));
        }

        if let Some(blank) = self.brands.aliases.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ReconError::ConfigValidation(format!(
                "brand alias '{}' maps to an empty name",
                blank.0
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.sale_type, "Venda");
        assert_eq!(config.unmatched_alert_ratio, 0.05);
        assert!(config.brands.recognizes("qdb"));
    }

    #[test]
    fn parse_overrides() {
        let input = r#"
sale_type = "Sale"
unknown_brand = "UNKNOWN"
unmatched_alert_ratio = 0.1

[brands]
known = ["X", "Y"]

[brands.aliases]
"EX" = "X"

[repair]
text_columns = ["description"]
"#;
        let config = EngineConfig::from_toml(input).unwrap();
        assert_eq!(config.sale_type, "Sale");
        assert_eq!(config.unknown_brand, "UNKNOWN");
        assert_eq!(config.unmatched_alert_ratio, 0.1);
        assert_eq!(config.brands.known, vec!["X", "Y"]);
        assert_eq!(config.brands.aliases.get("EX").map(String::as_str), Some("X"));
        assert_eq!(config.repair.text_columns, vec!["description"]);
    }

    #[test]
    fn reject_ratio_out_of_range() {
        let err = EngineConfig::from_toml("unmatched_alert_ratio = 1.5").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
        assert!(err.to_string().contains("unmatched_alert_ratio"));
    }

    #[test]
    fn reject_blank_sentinels() {
        assert!(matches!(
            EngineConfig::from_toml("sale_type = \"  \""),
            Err(ReconError::ConfigValidation(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml("unknown_brand = \"\""),
            Err(ReconError::ConfigValidation(_))
        ));
    }

    #[test]
    fn reject_unknown_brand_that_is_a_real_brand() {
        let err = EngineConfig::from_toml("unknown_brand = \"Eudora\"").unwrap_err();
        assert!(err.to_string().contains("collides"));
    }

    #[test]
    fn reject_unknown_keys() {
        let err = EngineConfig::from_toml("sale_typ = \"Venda\"").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn lower_case_alias_keys_still_match() {
        let input = r#"
[brands.aliases]
" qdb " = "Quem Disse Berenice"
"#;
        let config = EngineConfig::from_toml(input).unwrap();
        assert!(config.brands.aliases.contains_key("QDB"));
        assert_eq!(
            crate::normalize::normalize_brand("Qdb", &config.brands),
            "Quem Disse Berenice"
        );
    }

    #[test]
    fn conflicting_alias_spellings_are_rejected() {
        let input = r#"
[brands.aliases]
"qdb" = "Quem Disse Berenice"
"QDB" = "Eudora"
"#;
        let err = EngineConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("maps to both"));
    }

    #[test]
    fn built_config_with_lower_case_alias_fails_validation() {
        let mut config = EngineConfig::default();
        config.brands.aliases.insert("boti".into(), "oBoticário".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'boti'"));
    }

    #[test]
    fn toml_round_trip_keeps_values() {
        let config = EngineConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(EngineConfig::from_toml(&text).unwrap(), config);
    }
}
