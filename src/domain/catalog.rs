//! Instrument catalog and alias tables.
//!
//! Both tables are built once at startup (embedded defaults, optionally
//! overridden from configuration) and only read afterwards.

use crate::domain::error::CatalogListError;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Menu grouping a catalog entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    DomesticEquity,
    MetalsFx,
    CryptoGlobal,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::DomesticEquity,
        Category::MetalsFx,
        Category::CryptoGlobal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::DomesticEquity => "BIST (Popular)",
            Category::MetalsFx => "Gold & FX",
            Category::CryptoGlobal => "Crypto & US",
        }
    }

    /// Key used for this category in the `[catalog]` config section.
    pub fn config_key(&self) -> &'static str {
        match self {
            Category::DomesticEquity => "domestic",
            Category::MetalsFx => "metals_fx",
            Category::CryptoGlobal => "crypto",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bist" | "domestic" | "equity" => Ok(Category::DomesticEquity),
            "metals" | "fx" | "metals_fx" | "gold" => Ok(Category::MetalsFx),
            "crypto" | "global" | "us" => Ok(Category::CryptoGlobal),
            other => Err(format!(
                "unknown category '{other}' (expected bist, metals or crypto)"
            )),
        }
    }
}

/// Instruments priced by formula rather than quoted directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntheticKey {
    GramGold,
    QuarterGold,
    HalfGold,
    GramSilver,
}

impl SyntheticKey {
    pub const ALL: [SyntheticKey; 4] = [
        SyntheticKey::GramGold,
        SyntheticKey::QuarterGold,
        SyntheticKey::HalfGold,
        SyntheticKey::GramSilver,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SyntheticKey::GramGold => "GRAM_GOLD",
            SyntheticKey::QuarterGold => "QUARTER_GOLD",
            SyntheticKey::HalfGold => "HALF_GOLD",
            SyntheticKey::GramSilver => "GRAM_SILVER",
        }
    }

    pub fn is_silver(&self) -> bool {
        matches!(self, SyntheticKey::GramSilver)
    }
}

impl FromStr for SyntheticKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SyntheticKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown synthetic key '{}'", s.trim()))
    }
}

/// Provider ticker or synthetic key an instrument resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InstrumentKey {
    Provider(String),
    Synthetic(SyntheticKey),
}

impl InstrumentKey {
    /// Reads a key from configuration: synthetic names map to
    /// [`InstrumentKey::Synthetic`], anything else is an uppercased ticker.
    pub fn parse(s: &str) -> Self {
        match s.parse::<SyntheticKey>() {
            Ok(key) => InstrumentKey::Synthetic(key),
            Err(_) => InstrumentKey::Provider(s.trim().to_uppercase()),
        }
    }

    pub fn provider(symbol: &str) -> Self {
        InstrumentKey::Provider(symbol.to_string())
    }

    pub fn as_str(&self) -> &str {
        match self {
            InstrumentKey::Provider(symbol) => symbol,
            InstrumentKey::Synthetic(key) => key.as_str(),
        }
    }
}

impl fmt::Display for InstrumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub name: String,
    pub category: Category,
    /// Explicit provider symbol or synthetic key. `None` leaves the symbol
    /// to the category suffix rules.
    pub key: Option<InstrumentKey>,
}

impl CatalogEntry {
    fn bare(name: &str, category: Category) -> Self {
        Self {
            name: name.to_string(),
            category,
            key: None,
        }
    }

    fn keyed(name: &str, category: Category, key: InstrumentKey) -> Self {
        Self {
            name: name.to_string(),
            category,
            key: Some(key),
        }
    }
}

const DOMESTIC_TICKERS: [&str; 32] = [
    "THYAO", "ASELS", "GARAN", "EREGL", "SISE", "BIMAS", "AKBNK", "KCHOL", "SAHOL", "TUPRS",
    "FROTO", "SASA", "HEKTS", "PETKM", "TCELL", "YKBNK", "ISCTR", "ARCLK", "VESTL", "TOASO",
    "PGSUS", "KONYA", "EGEEN", "MIATK", "ASTOR", "EUPWR", "KONTR", "SMRTG", "GUBRF", "KOZAL",
    "ODAS", "ZOREN",
];

const CRYPTO_TICKERS: [&str; 5] = [
    "BTC (Bitcoin)",
    "ETH (Ethereum)",
    "SOL (Solana)",
    "AVAX",
    "DOGE",
];

const GLOBAL_EQUITIES: [(&str, &str); 4] = [
    ("AAPL (Apple)", "AAPL"),
    ("TSLA (Tesla)", "TSLA"),
    ("NVDA (NVIDIA)", "NVDA"),
    ("AMZN", "AMZN"),
];

/// Read-only table of menu entries grouped by category.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::default_catalog(&AliasTable::default())
    }
}

impl Catalog {
    /// The built-in menu. Metals/FX entries take their keys from `aliases`.
    pub fn default_catalog(aliases: &AliasTable) -> Self {
        let mut entries: Vec<CatalogEntry> = DOMESTIC_TICKERS
            .iter()
            .map(|name| CatalogEntry::bare(name, Category::DomesticEquity))
            .collect();

        entries.extend(aliases.aliases().iter().map(|alias| {
            CatalogEntry::keyed(&alias.label, Category::MetalsFx, alias.target.clone())
        }));

        entries.extend(
            CRYPTO_TICKERS
                .iter()
                .map(|name| CatalogEntry::bare(name, Category::CryptoGlobal)),
        );
        entries.extend(GLOBAL_EQUITIES.iter().map(|(name, symbol)| {
            CatalogEntry::keyed(name, Category::CryptoGlobal, InstrumentKey::provider(symbol))
        }));

        Self { entries }
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    /// Case-insensitive exact lookup by display name.
    pub fn find(&self, name: &str) -> Option<&CatalogEntry> {
        let wanted = name.trim().to_lowercase();
        self.entries
            .iter()
            .find(|e| e.name.to_lowercase() == wanted)
    }

    /// Replaces every entry of `category` with `items`.
    pub fn with_category(mut self, category: Category, items: Vec<CatalogItem>) -> Self {
        self.entries.retain(|e| e.category != category);
        self.entries
            .extend(items.into_iter().map(|item| CatalogEntry {
                name: item.name,
                category,
                key: item.key,
            }));
        self
    }
}

/// One token of a configured catalog list: `Name` or `Name=SYMBOL`.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    pub name: String,
    pub key: Option<InstrumentKey>,
}

/// Parses a comma-separated catalog list such as
/// `BTC (Bitcoin), AAPL (Apple)=AAPL, Ons Altın=GC=F`.
///
/// Names keep their case; duplicates are detected case-insensitively.
pub fn parse_catalog_list(input: &str) -> Result<Vec<CatalogItem>, CatalogListError> {
    let mut items = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(CatalogListError::EmptyToken);
        }

        let (name, key) = match trimmed.split_once('=') {
            Some((name, symbol)) if !name.trim().is_empty() && !symbol.trim().is_empty() => {
                (name.trim(), Some(InstrumentKey::parse(symbol)))
            }
            Some(_) => return Err(CatalogListError::EmptyToken),
            None => (trimmed, None),
        };

        if !seen.insert(name.to_lowercase()) {
            return Err(CatalogListError::DuplicateEntry(name.to_string()));
        }
        items.push(CatalogItem {
            name: name.to_string(),
            key,
        });
    }

    Ok(items)
}

/// How an alias keyword is compared with a lowercased query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordMatch {
    /// Keyword appears anywhere in the query.
    Contains,
    /// Keyword is the whole query. Used for short codes like `usd` that
    /// would otherwise hit qualified tickers such as `BTC-USD`.
    Exact,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AliasKeyword {
    pub text: String,
    pub mode: KeywordMatch,
}

impl AliasKeyword {
    fn contains(text: &str) -> Self {
        Self {
            text: text.to_string(),
            mode: KeywordMatch::Contains,
        }
    }

    fn exact(text: &str) -> Self {
        Self {
            text: text.to_string(),
            mode: KeywordMatch::Exact,
        }
    }

    fn matches(&self, lowered_query: &str) -> bool {
        match self.mode {
            KeywordMatch::Contains => lowered_query.contains(self.text.as_str()),
            KeywordMatch::Exact => lowered_query == self.text,
        }
    }
}

/// A named instrument reachable by menu label or free-text keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub label: String,
    pub target: InstrumentKey,
    pub keywords: Vec<AliasKeyword>,
}

/// Ordered alias table. Iteration order is declaration order and decides
/// which alias wins when several keywords match.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasTable {
    aliases: Vec<Alias>,
}

impl Default for AliasTable {
    fn default() -> Self {
        use AliasKeyword as K;
        use InstrumentKey::{Provider, Synthetic};

        let alias = |label: &str, target: InstrumentKey, keywords: Vec<AliasKeyword>| Alias {
            label: label.to_string(),
            target,
            keywords,
        };

        Self::new(vec![
            alias(
                "Çeyrek Altın",
                Synthetic(SyntheticKey::QuarterGold),
                vec![K::contains("çeyrek"), K::contains("ceyrek"), K::contains("quarter")],
            ),
            alias(
                "Yarım Altın",
                Synthetic(SyntheticKey::HalfGold),
                vec![K::contains("yarım"), K::contains("yarim"), K::contains("half")],
            ),
            alias(
                "Ons Altın",
                Provider("GC=F".into()),
                vec![K::exact("ons"), K::contains("ons alt"), K::contains("ounce")],
            ),
            alias(
                "Gram Altın",
                Synthetic(SyntheticKey::GramGold),
                vec![K::contains("gold"), K::contains("altın"), K::contains("altin")],
            ),
            alias(
                "Gümüş (Gram)",
                Synthetic(SyntheticKey::GramSilver),
                vec![K::contains("silver"), K::contains("gümüş"), K::contains("gumus")],
            ),
            alias(
                "Dolar/TL",
                Provider("TRY=X".into()),
                vec![K::contains("dollar"), K::contains("dolar"), K::exact("usd")],
            ),
            alias(
                "Euro/TL",
                Provider("EURTRY=X".into()),
                vec![K::contains("euro"), K::exact("eur")],
            ),
            alias(
                "Sterlin/TL",
                Provider("GBPTRY=X".into()),
                vec![K::contains("sterlin"), K::contains("pound"), K::exact("gbp")],
            ),
        ])
    }
}

impl AliasTable {
    pub fn new(aliases: Vec<Alias>) -> Self {
        Self { aliases }
    }

    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    /// First alias (in declared order) with a keyword matching `query`,
    /// compared case-insensitively.
    pub fn match_keyword(&self, query: &str) -> Option<&Alias> {
        let lowered = query.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }
        self.aliases
            .iter()
            .find(|alias| alias.keywords.iter().any(|k| k.matches(&lowered)))
    }

    /// Alias whose label equals `selection`, else the first alias whose
    /// label is contained in it. Case-insensitive.
    pub fn match_label(&self, selection: &str) -> Option<&Alias> {
        let lowered = selection.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }
        self.aliases
            .iter()
            .find(|alias| alias.label.to_lowercase() == lowered)
            .or_else(|| {
                self.aliases
                    .iter()
                    .find(|alias| lowered.contains(&alias.label.to_lowercase()))
            })
    }
}
