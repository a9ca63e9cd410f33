//! CSV Data Loader Module
//! Loads the Olympic datasets with Polars and memoizes them per directory.

use crate::data::codes;
use crate::data::frame;
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Data directory not found: {0}")]
    MissingDirectory(PathBuf),
    #[error("Missing dataset file: {0}")]
    MissingFile(PathBuf),
    #[error("Failed to load {file}: {source}")]
    CsvError {
        file: String,
        #[source]
        source: PolarsError,
    },
    #[error("Failed to enrich NOC table: {0}")]
    Enrich(#[from] PolarsError),
}

/// The datasets shipped with the Games data export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Table {
    Athletes,
    Coaches,
    Events,
    Medals,
    MedalsTotal,
    Medallists,
    Nocs,
    Schedule,
    Teams,
    Venues,
}

impl Table {
    pub const ALL: [Table; 10] = [
        Table::Athletes,
        Table::Coaches,
        Table::Events,
        Table::Medals,
        Table::MedalsTotal,
        Table::Medallists,
        Table::Nocs,
        Table::Schedule,
        Table::Teams,
        Table::Venues,
    ];

    /// File name inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Table::Athletes => "athletes.csv",
            Table::Coaches => "coaches.csv",
            Table::Events => "events.csv",
            Table::Medals => "medals.csv",
            Table::MedalsTotal => "medals_total.csv",
            Table::Medallists => "medallists.csv",
            Table::Nocs => "nocs.csv",
            Table::Schedule => "schedules.csv",
            Table::Teams => "teams.csv",
            Table::Venues => "venues.csv",
        }
    }

    pub fn name(self) -> &'static str {
        self.file_name().trim_end_matches(".csv")
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Row and column counts of one loaded table.
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub table: Table,
    pub rows: usize,
    pub columns: Vec<String>,
}

/// All datasets, loaded once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct DataStore {
    dir: PathBuf,
    tables: HashMap<Table, DataFrame>,
}

impl DataStore {
    /// Load every CSV under `dir` and add the `continent` column to the NOC table.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, LoaderError> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(LoaderError::MissingDirectory(dir));
        }

        let start = Instant::now();
        let loaded: Result<Vec<(Table, DataFrame)>, LoaderError> = Table::ALL
            .par_iter()
            .map(|&table| Self::load_table(&dir, table).map(|df| (table, df)))
            .collect();
        let mut tables: HashMap<Table, DataFrame> = loaded?.into_iter().collect();

        if let Some(nocs) = tables.get_mut(&Table::Nocs) {
            Self::add_continents(nocs)?;
        }

        info!(
            "Loaded {} tables from {} in {:.2?}",
            tables.len(),
            dir.display(),
            start.elapsed()
        );
        Ok(Self { dir, tables })
    }

    /// Load once per directory for the life of the process.
    pub fn cached(dir: impl AsRef<Path>) -> Result<Arc<Self>, LoaderError> {
        static CACHE: OnceLock<Mutex<HashMap<PathBuf, Arc<DataStore>>>> = OnceLock::new();

        let dir = dir.as_ref();
        let key = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));

        if let Some(store) = cache.lock().ok().and_then(|c| c.get(&key).cloned()) {
            debug!("Data cache hit for {}", key.display());
            return Ok(store);
        }

        let store = Arc::new(Self::load(&key)?);
        if let Ok(mut cache) = cache.lock() {
            cache.entry(key).or_insert_with(|| store.clone());
        }
        Ok(store)
    }

    /// Build a store from frames already in memory. Absent tables are empty.
    pub fn from_frames(frames: impl IntoIterator<Item = (Table, DataFrame)>) -> Result<Self, LoaderError> {
        let mut tables: HashMap<Table, DataFrame> = frames.into_iter().collect();
        if let Some(nocs) = tables.get_mut(&Table::Nocs) {
            Self::add_continents(nocs)?;
        }
        Ok(Self {
            dir: PathBuf::new(),
            tables,
        })
    }

    fn load_table(dir: &Path, table: Table) -> Result<DataFrame, LoaderError> {
        let path = dir.join(table.file_name());
        if !path.is_file() {
            return Err(LoaderError::MissingFile(path));
        }

        let csv_error = |source| LoaderError::CsvError {
            file: table.file_name().to_string(),
            source,
        };
        let df = LazyCsvReader::new(&path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()
            .map_err(csv_error)?
            .collect()
            .map_err(csv_error)?;

        debug!("{}: {} rows, {} columns", table, df.height(), df.width());
        Ok(df)
    }

    fn add_continents(nocs: &mut DataFrame) -> Result<(), PolarsError> {
        let continents: Vec<&str> = frame::str_values(nocs, "code")
            .iter()
            .map(|code| code.as_deref().map(codes::continent_of).unwrap_or(codes::OTHER_CONTINENT))
            .collect();
        if continents.len() == nocs.height() {
            nocs.with_column(Column::new("continent".into(), continents))?;
        }
        Ok(())
    }

    /// Directory the store was loaded from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// A dataset; absent tables read as an empty frame.
    pub fn table(&self, table: Table) -> &DataFrame {
        static EMPTY: OnceLock<DataFrame> = OnceLock::new();
        self.tables
            .get(&table)
            .unwrap_or_else(|| EMPTY.get_or_init(DataFrame::empty))
    }

    pub fn athletes(&self) -> &DataFrame {
        self.table(Table::Athletes)
    }

    pub fn events(&self) -> &DataFrame {
        self.table(Table::Events)
    }

    pub fn medals(&self) -> &DataFrame {
        self.table(Table::Medals)
    }

    pub fn medals_total(&self) -> &DataFrame {
        self.table(Table::MedalsTotal)
    }

    pub fn medallists(&self) -> &DataFrame {
        self.table(Table::Medallists)
    }

    pub fn nocs(&self) -> &DataFrame {
        self.table(Table::Nocs)
    }

    pub fn schedule(&self) -> &DataFrame {
        self.table(Table::Schedule)
    }

    pub fn venues(&self) -> &DataFrame {
        self.table(Table::Venues)
    }

    /// Row and column counts for every table.
    pub fn summary(&self) -> Vec<TableSummary> {
        Table::ALL
            .iter()
            .map(|&table| {
                let df = self.table(table);
                TableSummary {
                    table,
                    rows: df.height(),
                    columns: df
                        .get_column_names()
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                }
            })
            .collect()
    }

    /// Display name for a NOC code from the NOC table, falling back to the code.
    pub fn country_name(&self, code: &str) -> String {
        let nocs = self.nocs();
        frame::str_values(nocs, "code")
            .iter()
            .zip(frame::str_values(nocs, "country"))
            .find(|(c, _)| c.as_deref() == Some(code))
            .and_then(|(_, name)| name)
            .unwrap_or_else(|| code.to_string())
    }
}
