use super::Record;

/// A column as it appears in the store file, exports and the records table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Column {
    Date,
    Company,
    Subject,
    ItemId,
    ItemName,
    Quantity,
    Unit,
    PricePerUnit,
    Currency,
    TotalPrice,
    Status,
}

impl Column {
    pub(crate) fn header(&self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Company => "Company",
            Self::Subject => "Subject",
            Self::ItemId => "Item ID",
            Self::ItemName => "Item Name",
            Self::Quantity => "Quantity",
            Self::Unit => "Unit",
            Self::PricePerUnit => "Price per Unit",
            Self::Currency => "Currency",
            Self::TotalPrice => "Total Price",
            Self::Status => "Status",
        }
    }

    /// Derived columns are written out but never read back.
    pub(crate) fn is_derived(&self) -> bool {
        matches!(self, Self::TotalPrice)
    }

    /// Cell text for this column, in the same format the store file uses.
    pub(crate) fn cell(&self, record: &Record) -> String {
        match self {
            Self::Date => record.date.format("%Y-%m-%d").to_string(),
            Self::Company | Self::Subject => record.company.clone(),
            Self::ItemId => record.item_id.clone(),
            Self::ItemName => record.item_name.clone(),
            Self::Quantity => record.quantity.to_string(),
            Self::Unit => record.unit.as_str().to_string(),
            Self::PricePerUnit => record.price_per_unit.to_string(),
            Self::Currency => record.currency.as_str().to_string(),
            Self::TotalPrice => record.total_price().to_string(),
            Self::Status => record
                .status
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.header())
    }
}

/// Which book a store holds. Each kind has its own file and column set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum LedgerKind {
    Invoices,
    Expenses,
}

impl LedgerKind {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Invoices => "invoices",
            Self::Expenses => "expenses",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "invoices" | "invoice" | "inv" | "i" => Some(Self::Invoices),
            "expenses" | "expense" | "exp" | "e" => Some(Self::Expenses),
            _ => None,
        }
    }

    pub(crate) fn schema(&self) -> Schema {
        match self {
            Self::Invoices => Schema::invoices(),
            Self::Expenses => Schema::expenses(),
        }
    }

    pub(crate) fn title(&self) -> &'static str {
        match self {
            Self::Invoices => "Invoices",
            Self::Expenses => "Expenses",
        }
    }
}

impl std::fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered column set, fixed when a store is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub(crate) fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub(crate) fn invoices() -> Self {
        Self::new(vec![
            Column::Date,
            Column::Company,
            Column::ItemId,
            Column::ItemName,
            Column::Quantity,
            Column::Unit,
            Column::PricePerUnit,
            Column::Currency,
            Column::TotalPrice,
        ])
    }

    pub(crate) fn expenses() -> Self {
        Self::new(vec![
            Column::Date,
            Column::Subject,
            Column::ItemName,
            Column::Quantity,
            Column::Unit,
            Column::PricePerUnit,
            Column::Currency,
            Column::TotalPrice,
            Column::Status,
        ])
    }

    pub(crate) fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.header()).collect()
    }

    pub(crate) fn has(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub(crate) fn has_status(&self) -> bool {
        self.has(Column::Status)
    }

    /// Label for the free-text party column ("Company" or "Subject").
    pub(crate) fn party_label(&self) -> &'static str {
        if self.has(Column::Subject) {
            Column::Subject.header()
        } else {
            Column::Company.header()
        }
    }

    /// Columns a decoded file must provide.
    pub(crate) fn required(&self) -> impl Iterator<Item = Column> + '_ {
        self.columns.iter().copied().filter(|c| !c.is_derived())
    }

    pub(crate) fn row(&self, record: &Record) -> Vec<String> {
        self.columns.iter().map(|c| c.cell(record)).collect()
    }
}
