#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum Currency {
    Usd,
    Eur,
    Gbp,
    Irr,
    Aed,
    Try,
}

impl Currency {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Irr => "IRR",
            Self::Aed => "AED",
            Self::Try => "TRY",
        }
    }

    /// Accepts the ISO code in any case, plus the common symbols.
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "USD" | "$" => Some(Self::Usd),
            "EUR" | "€" => Some(Self::Eur),
            "GBP" | "£" => Some(Self::Gbp),
            "IRR" | "RIAL" => Some(Self::Irr),
            "AED" | "DIRHAM" => Some(Self::Aed),
            "TRY" | "₺" | "LIRA" => Some(Self::Try),
            _ => None,
        }
    }

    /// Prefix symbol, for the currencies that have a widely recognised one.
    pub(crate) fn symbol(&self) -> Option<&'static str> {
        match self {
            Self::Usd => Some("$"),
            Self::Eur => Some("€"),
            Self::Gbp => Some("£"),
            Self::Irr | Self::Aed | Self::Try => None,
        }
    }

    pub(crate) fn all() -> &'static [Currency] {
        &[
            Self::Usd,
            Self::Eur,
            Self::Gbp,
            Self::Irr,
            Self::Aed,
            Self::Try,
        ]
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::Usd
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
