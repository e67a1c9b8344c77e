#![allow(dead_code)]

use chrono::NaiveDate;
use indexdash::adapters::csv_adapter::CsvAdapter;
use indexdash::domain::dataset::Dataset;
use indexdash::ports::table_port::TableReader;
use std::io::Write;
use tempfile::NamedTempFile;

/// Two years of index data in the shape the dashboard expects: a blank
/// row-index header, `Date`, `Year`, four adjusted closes and three
/// precomputed returns columns.
pub const SAMPLE_CSV: &str = "\
,Date,Year,Nifty 50 Adj Close,Dow Jones Index Adj Close,Nasdaq Adj Close,Hang Seng Adj Close,Nifty 50 Returns,DAX Returns,Dow Jones Index Returns
0,2019-01-02,2019,100,200,50,400,,,
1,2019-01-03,2019,125,190,55,400,10,-5,-5
2,2019-01-04,2019,100,209,55,440,-10,10,10
3,2019-01-07,2019,100,209,44,440,0,0,0
4,2019-01-08,2019,108.9,188.1,44,396,10,-10,-10
5,2020-01-02,2020,120,200,50,400,2,1,0.5
6,2020-01-03,2020,126,210,52,404,5,3,5
7,2020-01-06,2020,113.4,189,52,400,-10,-4,-10
";

pub const SAMPLE_ROWS: usize = 8;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn sample_dataset() -> Dataset {
    let table = CsvAdapter::new().read_table(SAMPLE_CSV.as_bytes()).unwrap();
    Dataset::new("indices.csv", table)
}

fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn write_temp_csv(content: &str) -> NamedTempFile {
    write_temp(".csv", content)
}

pub fn write_temp_ini(content: &str) -> NamedTempFile {
    write_temp(".ini", content)
}
