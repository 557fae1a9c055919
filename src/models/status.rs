#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum PaymentStatus {
    Paid,
    Unpaid,
}

impl PaymentStatus {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::Unpaid => "Unpaid",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "paid" | "yes" | "y" => Some(Self::Paid),
            "unpaid" | "no" | "n" | "open" => Some(Self::Unpaid),
            _ => None,
        }
    }

    pub(crate) fn all() -> &'static [PaymentStatus] {
        &[Self::Unpaid, Self::Paid]
    }

    pub(crate) fn toggled(self) -> Self {
        match self {
            Self::Paid => Self::Unpaid,
            Self::Unpaid => Self::Paid,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
