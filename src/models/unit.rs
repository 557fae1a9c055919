/// Unit of measure for a line item. The preset list is what the entry form
/// offers; anything else typed by the user is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Unit {
    Carton,
    Box,
    Kilogram,
    Liter,
    Piece,
    Other(String),
}

impl Unit {
    pub(crate) fn as_str(&self) -> &str {
        match self {
            Self::Carton => "Carton",
            Self::Box => "Box",
            Self::Kilogram => "Kilogram",
            Self::Liter => "Liter",
            Self::Piece => "Piece",
            Self::Other(label) => label,
        }
    }

    pub(crate) fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "carton" | "ctn" => Self::Carton,
            "box" => Self::Box,
            "kilogram" | "kg" => Self::Kilogram,
            "liter" | "litre" | "l" => Self::Liter,
            "piece" | "pc" | "pcs" => Self::Piece,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    /// Exact inverse of [`as_str`](Self::as_str): only the preset labels map
    /// back to presets, everything else stays verbatim.
    pub(crate) fn from_label(s: &str) -> Self {
        Self::presets()
            .into_iter()
            .find(|u| u.as_str() == s)
            .unwrap_or_else(|| Self::Other(s.to_string()))
    }

    pub(crate) fn presets() -> [Unit; 5] {
        [
            Self::Carton,
            Self::Box,
            Self::Kilogram,
            Self::Liter,
            Self::Piece,
        ]
    }
}

impl Default for Unit {
    fn default() -> Self {
        Self::Piece
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
