//! ADQL cone-search query for a sky region.

use crate::entities::QueryParameters;

/// Forced-photometry table queried when no other table is configured.
pub const DEFAULT_TABLE: &str = "dp02_dc2_catalogs.ForcedSource";

/// Row cap per requested object. Assumes at most ~1000 epochs per object.
pub const ROWS_PER_OBJECT: u64 = 1000;

/// Build the ADQL text selecting light-curve rows inside a circular region.
///
/// Rows are ordered by object then time and capped at
/// `object_limit × ROWS_PER_OBJECT`.
#[must_use]
pub fn build_region_query(params: &QueryParameters, table: &str) -> String {
    let row_limit = u64::from(params.object_limit) * ROWS_PER_OBJECT;
    format!(
        "SELECT objectId, ra, dec, mjd, psfFluxMag as mag, psfFluxMagErr as magerr, filter\n\
         FROM {table}\n\
         WHERE CONTAINS(POINT('ICRS', ra, dec), CIRCLE('ICRS', {ra}, {dec}, {radius}))=1\n\
         ORDER BY objectId, mjd\n\
         LIMIT {row_limit}\n",
        ra = literal(params.ra),
        dec = literal(params.dec),
        radius = literal(params.radius_deg),
    )
}

/// Numeric literal that keeps a trailing `.0` on integral values.
fn literal(value: f64) -> String {
    format!("{value:?}")
}
