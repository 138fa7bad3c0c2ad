use std::collections::HashMap;
use std::io::Read;

use crate::commodity::{Commodity, K};
use crate::error::{SimError, SimResult};
use crate::matrix::TechnicalCoefficientMatrix;

const FINAL_DEMAND_COLUMNS: [&str; 6] = ["HFCE", "NPISH", "GGFC", "GFCF", "INVNT", "DPABR"];
const SPECIAL_ROWS: [&str; 3] = ["VA", "TLS", "OUT"];

/// Fixed many-to-one mapping from ISIC Rev 4 (50-sector) tags to the
/// simulation's K = 12 commodities (§6). Sectors absent from this table are
/// folded into `Services`, the catch-all tertiary bucket.
pub const SECTOR_MAP: &[(&str, Commodity)] = &[
    ("A01_02", Commodity::Agriculture),
    ("A03", Commodity::Agriculture),
    ("B05_06", Commodity::Petroleum),
    ("B07_08T09", Commodity::Ore),
    ("B07", Commodity::RareEarths),
    ("B08", Commodity::Ore),
    ("B09", Commodity::Coal),
    ("C19", Commodity::Petroleum),
    ("D35T39", Commodity::Electricity),
    ("D35", Commodity::Electricity),
    ("C10T12", Commodity::ConsumerGoods),
    ("C13T15", Commodity::ConsumerGoods),
    ("C16T18", Commodity::ConsumerGoods),
    ("C20T22", Commodity::IndustrialGoods),
    ("C23", Commodity::IndustrialGoods),
    ("C24", Commodity::IndustrialGoods),
    ("C25", Commodity::IndustrialGoods),
    ("C26", Commodity::Electronics),
    ("C27", Commodity::Electronics),
    ("C28", Commodity::IndustrialGoods),
    ("C29", Commodity::IndustrialGoods),
    ("C30", Commodity::MilitaryGoods),
    ("C31T33", Commodity::ConsumerGoods),
];

/// Looks up an ISIC tag's K=12 bucket, defaulting unmapped tags to
/// `Services` rather than rejecting them — the ICIO table carries far more
/// sector granularity than this simulation tracks.
fn map_sector(isic_tag: &str) -> Commodity {
    SECTOR_MAP
        .iter()
        .find(|(tag, _)| *tag == isic_tag)
        .map(|(_, commodity)| *commodity)
        .unwrap_or(Commodity::Services)
}

/// Parses an OECD ICIO-style `COUNTRY_SECTOR` row/column label, returning
/// `(country, sector)`. The sector half may itself contain underscores (per
/// ISIC tags like `A01_02`), so the split is on the *last* underscore-joined
/// country prefix, matched against `country_code`.
fn split_label<'a>(label: &'a str, country_code: &str) -> Option<&'a str> {
    let prefix = format!("{country_code}_");
    label.strip_prefix(&prefix)
}

/// One country's technical coefficient matrix derived from an OECD ICIO
/// supply-use CSV (§6). `country_code` selects which country's intra-country
/// block (`COUNTRY_SECTOR` rows and columns where both sides share the
/// prefix) to aggregate; flows to/from other countries are ignored, since
/// this simulation's `TechnicalCoefficientMatrix` is intra-country only.
pub fn load_country_matrix(reader: impl Read, country_code: &str) -> SimResult<TechnicalCoefficientMatrix> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| SimError::schema(format!("failed to read MRIO header row: {e}")))?
        .clone();

    let mut column_sectors: Vec<Option<Commodity>> = Vec::with_capacity(headers.len());
    for header in headers.iter().skip(1) {
        if FINAL_DEMAND_COLUMNS.contains(&header) || SPECIAL_ROWS.contains(&header) {
            column_sectors.push(None);
        } else {
            column_sectors.push(split_label(header, country_code).map(map_sector));
        }
    }

    let mut z: HashMap<(Commodity, Commodity), f64> = HashMap::new();
    let mut total_output: HashMap<Commodity, f64> = HashMap::new();

    for record in csv_reader.records() {
        let record = record.map_err(|e| SimError::schema(format!("failed to read MRIO row: {e}")))?;
        let row_label = record.get(0).ok_or_else(|| SimError::schema("MRIO row missing label column".to_string()))?;

        if row_label == "OUT" {
            for (value, sector) in record.iter().skip(1).zip(&column_sectors) {
                let Some(sector) = sector else { continue };
                let amount: f64 = value.trim().parse().unwrap_or(0.0);
                *total_output.entry(*sector).or_insert(0.0) += amount;
            }
            continue;
        }
        if SPECIAL_ROWS.contains(&row_label) || FINAL_DEMAND_COLUMNS.contains(&row_label) {
            continue;
        }

        let Some(row_sector) = split_label(row_label, country_code).map(map_sector) else {
            continue;
        };

        for (value, column_sector) in record.iter().skip(1).zip(&column_sectors) {
            let Some(column_sector) = column_sector else { continue };
            let amount: f64 = value.trim().parse().unwrap_or(0.0);
            *z.entry((row_sector, *column_sector)).or_insert(0.0) += amount;
        }
    }

    let mut matrix = TechnicalCoefficientMatrix::zero();
    for input in Commodity::ALL {
        for output in Commodity::ALL {
            let flow = z.get(&(input, output)).copied().unwrap_or(0.0);
            let output_total = total_output.get(&output).copied().unwrap_or(0.0);
            let coefficient = if output_total > 0.0 { flow / output_total } else { 0.0 };
            matrix.set(input, output, coefficient.max(0.0));
        }
    }

    Ok(matrix)
}
