//! Symbol resolution: menu selections and free text to provider symbols.
//!
//! Precedence lives in two ordered rule tables, [`FREE_TEXT_RULES`] and
//! [`SELECTION_RULES`]. The first rule returning `Some` wins. Resolution
//! never fails; when nothing usable is given the configured default
//! instrument is returned.

use crate::domain::catalog::{AliasTable, Catalog, Category, InstrumentKey};

pub const DEFAULT_DOMESTIC_SUFFIX: &str = ".IS";
pub const DEFAULT_CRYPTO_SUFFIX: &str = "-USD";
pub const DEFAULT_CRYPTO_MAX_LEN: usize = 5;
pub const DEFAULT_SYMBOL: &str = "THYAO.IS";
pub const DEFAULT_NAME: &str = "THYAO";

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSymbol {
    pub key: InstrumentKey,
    pub display_name: String,
}

impl ResolvedSymbol {
    fn new(key: InstrumentKey, display_name: impl Into<String>) -> Self {
        Self {
            key,
            display_name: display_name.into(),
        }
    }

    fn is_usable(&self) -> bool {
        !self.key.as_str().trim().is_empty() && !self.display_name.trim().is_empty()
    }
}

/// Immutable resolver settings plus the catalog and alias tables.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    pub domestic_suffix: String,
    pub crypto_suffix: String,
    /// Free-text crypto tickers longer than this are passed through
    /// unsuffixed.
    pub crypto_max_len: usize,
    pub default_symbol: String,
    pub default_name: String,
    pub catalog: Catalog,
    pub aliases: AliasTable,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        let aliases = AliasTable::default();
        Self {
            domestic_suffix: DEFAULT_DOMESTIC_SUFFIX.to_string(),
            crypto_suffix: DEFAULT_CRYPTO_SUFFIX.to_string(),
            crypto_max_len: DEFAULT_CRYPTO_MAX_LEN,
            default_symbol: DEFAULT_SYMBOL.to_string(),
            default_name: DEFAULT_NAME.to_string(),
            catalog: Catalog::default_catalog(&aliases),
            aliases,
        }
    }
}

impl ResolverConfig {
    fn fallback(&self) -> ResolvedSymbol {
        let symbol = self.default_symbol.trim();
        if symbol.is_empty() {
            return ResolvedSymbol::new(InstrumentKey::provider(DEFAULT_SYMBOL), DEFAULT_NAME);
        }
        let name = match self.default_name.trim() {
            "" => symbol,
            name => name,
        };
        ResolvedSymbol::new(InstrumentKey::parse(symbol), name)
    }
}

/// A resolution rule: `(config, trimmed input, category)`.
pub type Rule = fn(&ResolverConfig, &str, Category) -> Option<ResolvedSymbol>;

/// Rules for typed text, in precedence order.
pub const FREE_TEXT_RULES: &[(&str, Rule)] = &[
    ("alias keyword", alias_keyword),
    ("raw ticker", raw_ticker),
];

/// Rules for a menu selection, in precedence order.
pub const SELECTION_RULES: &[(&str, Rule)] = &[
    ("alias label", alias_label),
    ("catalog key", catalog_key),
    ("domestic suffix", domestic_selection),
    ("crypto pair", crypto_selection),
    ("passthrough", passthrough),
];

/// Resolves user input to a provider symbol or synthetic key.
///
/// Free text takes precedence over the selection; blank strings count as
/// absent.
pub fn resolve(
    config: &ResolverConfig,
    selection: Option<&str>,
    free_text: Option<&str>,
    category: Category,
) -> ResolvedSymbol {
    if let Some(text) = non_blank(free_text) {
        return apply(FREE_TEXT_RULES, config, text, category);
    }
    if let Some(name) = non_blank(selection) {
        return apply(SELECTION_RULES, config, name, category);
    }
    config.fallback()
}

fn non_blank(input: Option<&str>) -> Option<&str> {
    input.map(str::trim).filter(|s| !s.is_empty())
}

fn apply(
    rules: &[(&str, Rule)],
    config: &ResolverConfig,
    input: &str,
    category: Category,
) -> ResolvedSymbol {
    rules
        .iter()
        .find_map(|(_, rule)| rule(config, input, category).filter(ResolvedSymbol::is_usable))
        .unwrap_or_else(|| config.fallback())
}

/// Appends `suffix` (uppercased, as is `code`) unless already present.
fn with_suffix(code: &str, suffix: &str) -> String {
    let suffix = suffix.to_uppercase();
    if code.contains(&suffix) {
        code.to_string()
    } else {
        format!("{code}{suffix}")
    }
}

fn alias_keyword(config: &ResolverConfig, text: &str, _: Category) -> Option<ResolvedSymbol> {
    config
        .aliases
        .match_keyword(text)
        .map(|alias| ResolvedSymbol::new(alias.target.clone(), alias.label.as_str()))
}

fn raw_ticker(config: &ResolverConfig, text: &str, category: Category) -> Option<ResolvedSymbol> {
    let code = text.to_uppercase();
    let symbol = match category {
        Category::DomesticEquity => with_suffix(&code, &config.domestic_suffix),
        Category::CryptoGlobal if code.chars().count() <= config.crypto_max_len => {
            with_suffix(&code, &config.crypto_suffix)
        }
        _ => code.clone(),
    };
    Some(ResolvedSymbol::new(InstrumentKey::Provider(symbol), code))
}

fn alias_label(config: &ResolverConfig, name: &str, _: Category) -> Option<ResolvedSymbol> {
    config
        .aliases
        .match_label(name)
        .map(|alias| ResolvedSymbol::new(alias.target.clone(), alias.label.as_str()))
}

fn catalog_key(config: &ResolverConfig, name: &str, _: Category) -> Option<ResolvedSymbol> {
    let entry = config.catalog.find(name)?;
    let key = entry.key.clone()?;
    Some(ResolvedSymbol::new(key, entry.name.as_str()))
}

fn domestic_selection(
    config: &ResolverConfig,
    name: &str,
    category: Category,
) -> Option<ResolvedSymbol> {
    if category != Category::DomesticEquity {
        return None;
    }
    let symbol = with_suffix(&name.to_uppercase(), &config.domestic_suffix);
    Some(ResolvedSymbol::new(InstrumentKey::Provider(symbol), name))
}

fn crypto_selection(
    config: &ResolverConfig,
    name: &str,
    category: Category,
) -> Option<ResolvedSymbol> {
    if category != Category::CryptoGlobal {
        return None;
    }
    let code = strip_annotation(name);
    if code.is_empty() {
        return None;
    }
    let symbol = with_suffix(&code.to_uppercase(), &config.crypto_suffix);
    Some(ResolvedSymbol::new(InstrumentKey::Provider(symbol), code))
}

fn passthrough(_: &ResolverConfig, name: &str, _: Category) -> Option<ResolvedSymbol> {
    Some(ResolvedSymbol::new(InstrumentKey::provider(name), name))
}

/// `"BTC (Bitcoin)"` -> `"BTC"`.
fn strip_annotation(name: &str) -> &str {
    name.split('(').next().unwrap_or(name).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::SyntheticKey;

    fn config() -> ResolverConfig {
        ResolverConfig::default()
    }

    fn key(s: &str) -> InstrumentKey {
        InstrumentKey::provider(s)
    }

    #[test]
    fn free_text_domestic_suffix() {
        let r = resolve(&config(), None, Some("thyao"), Category::DomesticEquity);
        assert_eq!(r.key, key("THYAO.IS"));
        assert_eq!(r.display_name, "THYAO");
    }

    #[test]
    fn free_text_domestic_already_suffixed() {
        let r = resolve(&config(), None, Some(" asels.is "), Category::DomesticEquity);
        assert_eq!(r.key, key("ASELS.IS"));
        assert_eq!(r.display_name, "ASELS.IS");
    }

    #[test]
    fn lowercase_configured_suffix_is_uppercased() {
        let cfg = ResolverConfig {
            domestic_suffix: ".is".to_string(),
            crypto_suffix: "-usd".to_string(),
            ..config()
        };
        let r = resolve(&cfg, None, Some("thyao"), Category::DomesticEquity);
        assert_eq!(r.key, key("THYAO.IS"));
        let r = resolve(&cfg, Some("GARAN"), None, Category::DomesticEquity);
        assert_eq!(r.key, key("GARAN.IS"));
        let r = resolve(&cfg, None, Some("eth"), Category::CryptoGlobal);
        assert_eq!(r.key, key("ETH-USD"));
        let r = resolve(&cfg, None, Some("asels.is"), Category::DomesticEquity);
        assert_eq!(r.key, key("ASELS.IS"));
    }

    #[test]
    fn free_text_crypto_short_ticker() {
        let r = resolve(&config(), None, Some("btc"), Category::CryptoGlobal);
        assert_eq!(r.key, key("BTC-USD"));
        assert_eq!(r.display_name, "BTC");
    }

    #[test]
    fn free_text_crypto_long_ticker_passes_through() {
        let r = resolve(&config(), None, Some("shibusd"), Category::CryptoGlobal);
        assert_eq!(r.key, key("SHIBUSD"));
    }

    #[test]
    fn free_text_crypto_threshold_is_configurable() {
        let mut cfg = config();
        cfg.crypto_max_len = 4;
        let r = resolve(&cfg, None, Some("matic"), Category::CryptoGlobal);
        assert_eq!(r.key, key("MATIC"));
        cfg.crypto_max_len = 5;
        let r = resolve(&cfg, None, Some("matic"), Category::CryptoGlobal);
        assert_eq!(r.key, key("MATIC-USD"));
    }

    #[test]
    fn free_text_crypto_existing_suffix() {
        let r = resolve(&config(), None, Some("eth-usd"), Category::CryptoGlobal);
        assert_eq!(r.key, key("ETH-USD"));
    }

    #[test]
    fn free_text_metals_passes_through() {
        let r = resolve(&config(), None, Some("xauusd=x"), Category::MetalsFx);
        assert_eq!(r.key, key("XAUUSD=X"));
    }

    #[test]
    fn free_text_alias_beats_selection() {
        let r = resolve(&config(), Some("THYAO"), Some("Gold"), Category::DomesticEquity);
        assert_eq!(r.key, InstrumentKey::Synthetic(SyntheticKey::GramGold));
        assert_eq!(r.display_name, "Gram Altın");
    }

    #[test]
    fn free_text_alias_is_case_insensitive() {
        for text in ["GOLD", "gold", "Gold"] {
            let r = resolve(&config(), None, Some(text), Category::CryptoGlobal);
            assert_eq!(r.key, InstrumentKey::Synthetic(SyntheticKey::GramGold));
        }
    }

    #[test]
    fn free_text_currency_aliases() {
        let cfg = config();
        let r = resolve(&cfg, None, Some("US Dollar"), Category::MetalsFx);
        assert_eq!(r.key, key("TRY=X"));
        let r = resolve(&cfg, None, Some("euro"), Category::MetalsFx);
        assert_eq!(r.key, key("EURTRY=X"));
        let r = resolve(&cfg, None, Some("silver"), Category::MetalsFx);
        assert_eq!(r.key, InstrumentKey::Synthetic(SyntheticKey::GramSilver));
    }

    #[test]
    fn blank_free_text_uses_selection() {
        let r = resolve(&config(), Some("GARAN"), Some("   "), Category::DomesticEquity);
        assert_eq!(r.key, key("GARAN.IS"));
        assert_eq!(r.display_name, "GARAN");
    }

    #[test]
    fn selection_synthetic_label() {
        let r = resolve(&config(), Some("Çeyrek Altın"), None, Category::MetalsFx);
        assert_eq!(r.key, InstrumentKey::Synthetic(SyntheticKey::QuarterGold));
        assert_eq!(r.display_name, "Çeyrek Altın");
    }

    #[test]
    fn selection_fx_label() {
        let r = resolve(&config(), Some("Sterlin/TL"), None, Category::MetalsFx);
        assert_eq!(r.key, key("GBPTRY=X"));
    }

    #[test]
    fn selection_crypto_strips_annotation() {
        let r = resolve(&config(), Some("BTC (Bitcoin)"), None, Category::CryptoGlobal);
        assert_eq!(r.key, key("BTC-USD"));
        assert_eq!(r.display_name, "BTC");
    }

    #[test]
    fn selection_catalog_key_for_us_equity() {
        let r = resolve(&config(), Some("AAPL (Apple)"), None, Category::CryptoGlobal);
        assert_eq!(r.key, key("AAPL"));
        assert_eq!(r.display_name, "AAPL (Apple)");
    }

    #[test]
    fn selection_passthrough_outside_known_categories() {
        let r = resolve(&config(), Some("XAGUSD=X"), None, Category::MetalsFx);
        assert_eq!(r.key, key("XAGUSD=X"));
        assert_eq!(r.display_name, "XAGUSD=X");
    }

    #[test]
    fn no_input_returns_default() {
        let r = resolve(&config(), None, None, Category::DomesticEquity);
        assert_eq!(r.key, key("THYAO.IS"));
        assert_eq!(r.display_name, "THYAO");
        let r = resolve(&config(), Some(""), Some(""), Category::CryptoGlobal);
        assert_eq!(r.key, key("THYAO.IS"));
    }

    #[test]
    fn blank_configured_default_still_resolves() {
        let mut cfg = config();
        cfg.default_symbol = String::new();
        cfg.default_name = String::new();
        let r = resolve(&cfg, None, None, Category::MetalsFx);
        assert_eq!(r.key, key(DEFAULT_SYMBOL));
        assert_eq!(r.display_name, DEFAULT_NAME);
    }

    #[test]
    fn annotation_only_selection_passes_through() {
        let r = resolve(&config(), Some("(Bitcoin)"), None, Category::CryptoGlobal);
        assert_eq!(r.key, key("(Bitcoin)"));
    }

    #[test]
    fn rule_tables_declare_precedence() {
        let names: Vec<_> = SELECTION_RULES.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec!["alias label", "catalog key", "domestic suffix", "crypto pair", "passthrough"]
        );
        assert_eq!(FREE_TEXT_RULES[0].0, "alias keyword");
    }
}
