//! Static registry of every table the rebuild knows how to load.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Real,
}

impl ColumnType {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub required: bool,
}

impl Column {
    pub const fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            required: false,
        }
    }

    pub const fn required(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            required: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Index {
    pub name: &'static str,
    pub column: &'static str,
}

impl Index {
    pub const fn new(name: &'static str, column: &'static str) -> Self {
        Self { name, column }
    }
}

#[derive(Debug)]
pub struct TableSchema {
    pub name: &'static str,
    pub source_file: &'static str,
    pub columns: &'static [Column],
    pub unique_key: &'static [&'static str],
    pub indexes: &'static [Index],
}

// JCR impact factor tables, one per report year. Column sets drift from
// year to year and are kept exactly as the source exports spell them.

pub static JCR2020: TableSchema = TableSchema {
    name: "JCR2020",
    source_file: "JCR2020-UTF8.csv",
    columns: &[
        Column::required("Journal", ColumnType::Text),
        // the 2020 export wrote a space between IF and the year
        Column::new("IF (2020)", ColumnType::Real),
    ],
    unique_key: &["Journal"],
    indexes: &[Index::new("idx_jcr2020_journal", "Journal")],
};

pub static JCR2021: TableSchema = TableSchema {
    name: "JCR2021",
    source_file: "JCR2021-UTF8.csv",
    columns: &[
        Column::required("Journal", ColumnType::Text),
        Column::new("IF(2021)", ColumnType::Real),
    ],
    unique_key: &["Journal"],
    indexes: &[Index::new("idx_jcr2021_journal", "Journal")],
};

pub static JCR2022: TableSchema = TableSchema {
    name: "JCR2022",
    source_file: "JCR2022-UTF8.csv",
    columns: &[
        Column::required("Journal", ColumnType::Text),
        Column::new("IF(2022)", ColumnType::Real),
        Column::new("IF Quartile(2022)", ColumnType::Text),
    ],
    unique_key: &["Journal"],
    indexes: &[
        Index::new("idx_jcr2022_journal", "Journal"),
        Index::new("idx_jcr2022_quartile", "IF Quartile(2022)"),
    ],
};

pub static JCR2023: TableSchema = TableSchema {
    name: "JCR2023",
    source_file: "JCR2023-UTF8.csv",
    columns: &[
        Column::required("Journal", ColumnType::Text),
        Column::new("Country", ColumnType::Text),
        Column::new("ISSN", ColumnType::Text),
        Column::new("EISSN", ColumnType::Text),
        Column::new("Web of Science", ColumnType::Text),
        Column::new("IF(2023)", ColumnType::Real),
        Column::new("Category", ColumnType::Text),
        Column::new("IF Quartile(2023)", ColumnType::Text),
        Column::new("Category Rank(2023)", ColumnType::Text),
    ],
    unique_key: &["Journal"],
    indexes: &[
        Index::new("idx_jcr2023_journal", "Journal"),
        Index::new("idx_jcr2023_issn", "ISSN"),
        Index::new("idx_jcr2023_eissn", "EISSN"),
        Index::new("idx_jcr2023_quartile", "IF Quartile(2023)"),
        Index::new("idx_jcr2023_category", "Category"),
    ],
};

pub static JCR2024: TableSchema = TableSchema {
    name: "JCR2024",
    source_file: "JCR2024-UTF8.csv",
    columns: &[
        Column::required("Journal", ColumnType::Text),
        Column::new("ISSN", ColumnType::Text),
        Column::new("eISSN", ColumnType::Text),
        Column::new("Category", ColumnType::Text),
        Column::new("IF(2024)", ColumnType::Real),
        Column::new("IF Quartile(2024)", ColumnType::Text),
        Column::new("IF Rank(2024)", ColumnType::Text),
    ],
    unique_key: &["Journal"],
    indexes: &[
        Index::new("idx_jcr2024_journal", "Journal"),
        Index::new("idx_jcr2024_issn", "ISSN"),
        Index::new("idx_jcr2024_eissn", "eISSN"),
        Index::new("idx_jcr2024_quartile", "IF Quartile(2024)"),
        Index::new("idx_jcr2024_category", "Category"),
    ],
};

// CAS partition tables. 2021-2023 share one layout; 2025 merges the ISSN
// columns and adds the OA index and annotation fields.

const CAS_PARTITION_COLUMNS: &[Column] = &[
    Column::required("Journal", ColumnType::Text),
    Column::new("年份", ColumnType::Integer),
    Column::new("ISSN", ColumnType::Text),
    Column::new("Review", ColumnType::Text),
    Column::new("Open Access", ColumnType::Text),
    Column::new("Web of Science", ColumnType::Text),
    Column::new("大类", ColumnType::Text),
    Column::new("大类分区", ColumnType::Text),
    Column::new("Top", ColumnType::Text),
    Column::new("小类1", ColumnType::Text),
    Column::new("小类1分区", ColumnType::Text),
    Column::new("小类2", ColumnType::Text),
    Column::new("小类2分区", ColumnType::Text),
    Column::new("小类3", ColumnType::Text),
    Column::new("小类3分区", ColumnType::Text),
    Column::new("小类4", ColumnType::Text),
    Column::new("小类4分区", ColumnType::Text),
    Column::new("小类5", ColumnType::Text),
    Column::new("小类5分区", ColumnType::Text),
    Column::new("小类6", ColumnType::Text),
    Column::new("小类6分区", ColumnType::Text),
];

pub static FQBJCR2021: TableSchema = TableSchema {
    name: "FQBJCR2021",
    source_file: "FQBJCR2021-UTF8.csv",
    columns: CAS_PARTITION_COLUMNS,
    unique_key: &["Journal", "ISSN"],
    indexes: &[
        Index::new("idx_fqb2021_journal", "Journal"),
        Index::new("idx_fqb2021_issn", "ISSN"),
        Index::new("idx_fqb2021_major_cat", "大类"),
        Index::new("idx_fqb2021_major_part", "大类分区"),
        Index::new("idx_fqb2021_top", "Top"),
    ],
};

pub static FQBJCR2022: TableSchema = TableSchema {
    name: "FQBJCR2022",
    source_file: "FQBJCR2022-UTF8.csv",
    columns: CAS_PARTITION_COLUMNS,
    unique_key: &["Journal", "ISSN"],
    indexes: &[
        Index::new("idx_fqb2022_journal", "Journal"),
        Index::new("idx_fqb2022_issn", "ISSN"),
        Index::new("idx_fqb2022_major_cat", "大类"),
        Index::new("idx_fqb2022_major_part", "大类分区"),
        Index::new("idx_fqb2022_top", "Top"),
    ],
};

pub static FQBJCR2023: TableSchema = TableSchema {
    name: "FQBJCR2023",
    source_file: "FQBJCR2023-UTF8.csv",
    columns: CAS_PARTITION_COLUMNS,
    unique_key: &["Journal", "ISSN"],
    indexes: &[
        Index::new("idx_fqb2023_journal", "Journal"),
        Index::new("idx_fqb2023_issn", "ISSN"),
        Index::new("idx_fqb2023_major_cat", "大类"),
        Index::new("idx_fqb2023_major_part", "大类分区"),
        Index::new("idx_fqb2023_top", "Top"),
    ],
};

pub static FQBJCR2025: TableSchema = TableSchema {
    name: "FQBJCR2025",
    source_file: "FQBJCR2025-UTF8.csv",
    columns: &[
        Column::required("Journal", ColumnType::Text),
        Column::new("年份", ColumnType::Integer),
        Column::new("ISSN/EISSN", ColumnType::Text),
        Column::new("Review", ColumnType::Text),
        Column::new("OA Journal Index（OAJ）", ColumnType::Text),
        Column::new("Open Access", ColumnType::Text),
        Column::new("Web of Science", ColumnType::Text),
        Column::new("标注", ColumnType::Text),
        Column::new("大类", ColumnType::Text),
        Column::new("大类分区", ColumnType::Text),
        Column::new("Top", ColumnType::Text),
        Column::new("小类1", ColumnType::Text),
        Column::new("小类1分区", ColumnType::Text),
        Column::new("小类2", ColumnType::Text),
        Column::new("小类2分区", ColumnType::Text),
        Column::new("小类3", ColumnType::Text),
        Column::new("小类3分区", ColumnType::Text),
        Column::new("小类4", ColumnType::Text),
        Column::new("小类4分区", ColumnType::Text),
        Column::new("小类5", ColumnType::Text),
        Column::new("小类5分区", ColumnType::Text),
        Column::new("小类6", ColumnType::Text),
        Column::new("小类6分区", ColumnType::Text),
    ],
    unique_key: &["Journal", "ISSN/EISSN"],
    indexes: &[
        Index::new("idx_fqb2025_journal", "Journal"),
        Index::new("idx_fqb2025_issn", "ISSN/EISSN"),
        Index::new("idx_fqb2025_major_cat", "大类"),
        Index::new("idx_fqb2025_major_part", "大类分区"),
        Index::new("idx_fqb2025_top", "Top"),
    ],
};

// CCF venue classifications.

pub static CCF2019: TableSchema = TableSchema {
    name: "CCF2019",
    source_file: "CCF2019-UTF8.csv",
    columns: &[
        Column::new("刊物简称", ColumnType::Text),
        Column::new("Journal", ColumnType::Text),
        Column::new("年份", ColumnType::Integer),
        Column::new("出版社", ColumnType::Text),
        Column::new("网址", ColumnType::Text),
        Column::new("领域", ColumnType::Text),
        Column::new("CCF推荐类别（国际学术刊物/会议）", ColumnType::Text),
        Column::new("CCF推荐类型", ColumnType::Text),
        Column::new("合并/更名为", ColumnType::Text),
    ],
    unique_key: &["Journal"],
    indexes: &[Index::new("idx_ccf2019_journal", "Journal")],
};

pub static CCF2022: TableSchema = TableSchema {
    name: "CCF2022",
    source_file: "CCF2022-UTF8.csv",
    columns: &[
        Column::new("刊物名称", ColumnType::Text),
        Column::new("Journal", ColumnType::Text),
        Column::new("年份", ColumnType::Integer),
        Column::new("出版社", ColumnType::Text),
        Column::new("网址", ColumnType::Text),
        Column::new("领域", ColumnType::Text),
        Column::new("CCF推荐类别（国际学术刊物/会议）", ColumnType::Text),
        Column::new("CCF推荐类型", ColumnType::Text),
    ],
    unique_key: &["Journal"],
    indexes: &[Index::new("idx_ccf2022_journal", "Journal")],
};

pub static CCF_CHINESE2019: TableSchema = TableSchema {
    name: "CCFChinese2019",
    source_file: "CCFChinese2019-UTF8.csv",
    columns: &[
        Column::new("Journal", ColumnType::Text),
        Column::new("主办单位", ColumnType::Text),
        Column::new("网址", ColumnType::Text),
        Column::new("CCF推荐类型", ColumnType::Text),
    ],
    unique_key: &["Journal"],
    indexes: &[Index::new("idx_ccfcn2019_journal", "Journal")],
};

pub static CCFT2022: TableSchema = TableSchema {
    name: "CCFT2022",
    source_file: "CCFT2022-UTF8.csv",
    columns: &[
        Column::new("中文刊名", ColumnType::Text),
        Column::new("Journal", ColumnType::Text),
        Column::new("CN号", ColumnType::Text),
        Column::new("语种", ColumnType::Text),
        Column::new("主办单位", ColumnType::Text),
        Column::new("CCF推荐类别", ColumnType::Text),
        Column::new("T分区", ColumnType::Text),
    ],
    unique_key: &["Journal"],
    indexes: &[Index::new("idx_ccft2022_journal", "Journal")],
};

// Journal warning lists. No list was published for 2022, and from 2024 on
// the payload column changed from warning level to warning reason.

pub static GJQKYJMD2020: TableSchema = TableSchema {
    name: "GJQKYJMD2020",
    source_file: "GJQKYJMD2020.csv",
    columns: &[
        Column::required("Journal", ColumnType::Text),
        Column::new("预警等级（2020）", ColumnType::Text),
    ],
    unique_key: &["Journal"],
    indexes: &[Index::new("idx_gjqk2020_journal", "Journal")],
};

pub static GJQKYJMD2021: TableSchema = TableSchema {
    name: "GJQKYJMD2021",
    source_file: "GJQKYJMD2021.csv",
    columns: &[
        Column::required("Journal", ColumnType::Text),
        Column::new("预警等级（2021）", ColumnType::Text),
    ],
    unique_key: &["Journal"],
    indexes: &[Index::new("idx_gjqk2021_journal", "Journal")],
};

pub static GJQKYJMD2023: TableSchema = TableSchema {
    name: "GJQKYJMD2023",
    source_file: "GJQKYJMD2023.csv",
    columns: &[
        Column::required("Journal", ColumnType::Text),
        Column::new("预警等级（2023）", ColumnType::Text),
    ],
    unique_key: &["Journal"],
    indexes: &[Index::new("idx_gjqk2023_journal", "Journal")],
};

pub static GJQKYJMD2024: TableSchema = TableSchema {
    name: "GJQKYJMD2024",
    source_file: "GJQKYJMD2024.csv",
    columns: &[
        Column::required("Journal", ColumnType::Text),
        Column::new("预警原因（2024）", ColumnType::Text),
    ],
    unique_key: &["Journal"],
    indexes: &[Index::new("idx_gjqk2024_journal", "Journal")],
};

pub static GJQKYJMD2025: TableSchema = TableSchema {
    name: "GJQKYJMD2025",
    source_file: "GJQKYJMD2025.csv",
    columns: &[
        Column::required("Journal", ColumnType::Text),
        Column::new("预警原因（2025）", ColumnType::Text),
    ],
    unique_key: &["Journal"],
    indexes: &[Index::new("idx_gjqk2025_journal", "Journal")],
};

// Registry order is import order.
pub static ALL_TABLES: &[&TableSchema] = &[
    &JCR2020,
    &JCR2021,
    &JCR2022,
    &JCR2023,
    &JCR2024,
    &FQBJCR2021,
    &FQBJCR2022,
    &FQBJCR2023,
    &FQBJCR2025,
    &CCF2019,
    &CCF2022,
    &CCF_CHINESE2019,
    &CCFT2022,
    &GJQKYJMD2020,
    &GJQKYJMD2021,
    &GJQKYJMD2023,
    &GJQKYJMD2024,
    &GJQKYJMD2025,
];

pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}

/// Double-quote identifier quoting; the registry carries column names with
/// spaces, slashes, parentheses and CJK text, so every identifier that
/// reaches SQL goes through here.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn create_table_sql(table: &TableSchema) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(table.columns.len() + 2);
    parts.push("id INTEGER PRIMARY KEY AUTOINCREMENT".to_string());
    for column in table.columns {
        let mut definition = format!(
            "{} {}",
            quote_ident(column.name),
            column.column_type.as_sql()
        );
        if column.required {
            definition.push_str(" NOT NULL");
        }
        parts.push(definition);
    }
    if !table.unique_key.is_empty() {
        let key = table
            .unique_key
            .iter()
            .map(|column| quote_ident(column))
            .collect::<Vec<_>>()
            .join(", ");
        parts.push(format!("UNIQUE({key})"));
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        quote_ident(table.name),
        parts.join(",\n    ")
    )
}

pub fn create_index_sql(table: &TableSchema, index: &Index) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS {} ON {}({})",
        quote_ident(index.name),
        quote_ident(table.name),
        quote_ident(index.column)
    )
}
