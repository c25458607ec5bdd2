//! Table definitions for the five BDPM extracts.
//!
//! The extracts carry no header row, so the column order here is the
//! physical column order of each file.

/// Storage type of a column in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    /// Price parsed from a decimal-comma field.
    Price,
    /// Reimbursement rate parsed from a percentage field.
    Rate,
}

impl ColumnType {
    /// DuckDB column type.
    pub fn sql_type(self) -> &'static str {
        match self {
            Self::Text => "VARCHAR",
            Self::Price => "DOUBLE",
            Self::Rate => "BIGINT",
        }
    }
}

/// A column of an extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
}

const fn text(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnType::Text,
    }
}

/// One source extract and the table it populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    /// File name inside the data directory.
    pub file: &'static str,
    /// Target table name.
    pub table: &'static str,
    pub columns: &'static [Column],
}

impl TableSpec {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Whether any column needs numeric coercion.
    pub fn has_coerced_columns(&self) -> bool {
        self.columns.iter().any(|c| c.kind != ColumnType::Text)
    }
}

pub const MEDICAMENTS: TableSpec = TableSpec {
    file: "CIS_bdpm.txt",
    table: "medicaments",
    columns: &[
        text("CIS"),
        text("DENOMINATION"),
        text("FORME"),
        text("VOIES"),
        text("STATUT_AMM"),
        text("TYPE_PROC"),
        text("ETAT_COMM"),
        text("DATE_AMM"),
        text("STATUT_BDM"),
        text("NUM_AMM"),
        text("TITULAIRES"),
        text("SURVEILLANCE"),
    ],
};

pub const PRESENTATIONS: TableSpec = TableSpec {
    file: "CIS_CIP_bdpm.txt",
    table: "presentations",
    columns: &[
        text("CIS"),
        text("CIP7"),
        text("LIBELLE"),
        text("STATUT_ADMIN"),
        text("ETAT_COMM"),
        text("DATE_DECL"),
        text("CIP13"),
        text("AGREMENT"),
        Column {
            name: "REMBOURSEMENT",
            kind: ColumnType::Rate,
        },
        Column {
            name: "PRIX",
            kind: ColumnType::Price,
        },
        text("HONORAIRE"),
        text("PRIX_HONO"),
        text("INDIC_REMBOURSEMENT"),
    ],
};

pub const COMPOSITIONS: TableSpec = TableSpec {
    file: "CIS_COMPO_bdpm.txt",
    table: "compositions",
    columns: &[
        text("CIS"),
        text("SUBSTANCE"),
        text("DOSAGE"),
        text("UNITE"),
        text("ROLE"),
        text("NATURE"),
    ],
};

pub const CONDITIONS_PRESCRIPTION: TableSpec = TableSpec {
    file: "CIS_CPD_bdpm.txt",
    table: "conditions_prescription",
    columns: &[text("CIS"), text("CONDITION")],
};

pub const GENERIQUES: TableSpec = TableSpec {
    file: "CIS_GENER_bdpm.txt",
    table: "generiques",
    columns: &[text("DENOMINATION_GEN"), text("CIS_GEN")],
};

/// All extracts, in load order.
pub const EXTRACTS: [TableSpec; 5] = [
    MEDICAMENTS,
    PRESENTATIONS,
    COMPOSITIONS,
    CONDITIONS_PRESCRIPTION,
    GENERIQUES,
];

/// A secondary index created once all tables are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: &'static str,
    pub table: &'static str,
    pub column: &'static str,
}

pub const INDEXES: [IndexSpec; 3] = [
    IndexSpec {
        name: "idx_cis_med",
        table: "medicaments",
        column: "CIS",
    },
    IndexSpec {
        name: "idx_cis_pres",
        table: "presentations",
        column: "CIS",
    },
    IndexSpec {
        name: "idx_substance",
        table: "compositions",
        column: "SUBSTANCE",
    },
];
