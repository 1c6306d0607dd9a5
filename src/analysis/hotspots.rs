//! Ranked aggregate queries over an imported store.
//!
//! Grouping and counting happen in SQL; filtering by convention and the
//! final ordering happen here so that ties are broken the same way every
//! time (first inserted group first).

use super::convention::SymbolConvention;
use super::schema::{AnalysisReport, MetadataSummary, ProcessShare, SymbolHotspot};
use crate::store::Store;
use crate::utils::config::{DEFAULT_TOP_N, SCHEMA_VERSION, UNKNOWN_SYMBOL};
use crate::utils::error::StoreError;
use log::debug;

const SYMBOL_GROUPS_SQL: &str = "SELECT symbol, COALESCE(dso, ''), COUNT(*), MIN(id) \
     FROM call_stacks WHERE symbol != '' AND symbol != ?1 \
     GROUP BY symbol, COALESCE(dso, '')";

const PROCESS_GROUPS_SQL: &str =
    "SELECT comm, COUNT(*), MIN(id) FROM perf_samples GROUP BY comm ORDER BY MIN(id)";

/// Read-only query handle over one store
pub struct HotspotQuery<'a> {
    store: &'a Store,
    top_n: usize,
}

/// One `(symbol, dso)` group before ranking
struct SymbolGroup {
    symbol: String,
    dso: String,
    count: u64,
    first_id: i64,
}

impl<'a> HotspotQuery<'a> {
    /// Create a query handle with the default result limit
    ///
    /// **Public** - main entry point for analysis
    ///
    /// # Errors
    /// * `StoreError::SchemaMissing` - the store lacks a required table
    pub fn new(store: &'a Store) -> Result<Self, StoreError> {
        store.validate_schema()?;
        Ok(Self {
            store,
            top_n: DEFAULT_TOP_N,
        })
    }

    /// Limit every ranked list to `top_n` entries
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn total_samples(&self) -> Result<u64, StoreError> {
        self.store.sample_count()
    }

    pub fn total_frames(&self) -> Result<u64, StoreError> {
        self.store.frame_count()
    }

    /// Most frequent `(symbol, dso)` groups over all frames
    ///
    /// Empty and `[unknown]` symbols are excluded from the ranking but still
    /// count toward the percentage denominator.
    pub fn hotspots(&self) -> Result<Vec<SymbolHotspot>, StoreError> {
        self.ranked_symbols(|_| true, |symbol| symbol.to_string())
    }

    /// Same ranking restricted to symbols the convention calls managed
    ///
    /// Percentages are still relative to *all* frames.
    pub fn managed_hotspots(
        &self,
        convention: &dyn SymbolConvention,
    ) -> Result<Vec<SymbolHotspot>, StoreError> {
        self.ranked_symbols(
            |symbol| convention.is_managed(symbol),
            |symbol| convention.display_name(symbol),
        )
    }

    /// Sample count per process name, in order of first appearance
    ///
    /// Use `rank_by_count` for a ranking.
    pub fn process_share(&self) -> Result<Vec<ProcessShare>, StoreError> {
        let total = self.total_samples()?;

        let mut stmt = self.store.connection().prepare(PROCESS_GROUPS_SQL)?;
        let shares = stmt
            .query_map([], |row| {
                let count: i64 = row.get(1)?;
                Ok((row.get::<_, String>(0)?, count))
            })?
            .map(|row| {
                row.map(|(comm, count)| {
                    let count = u64::try_from(count).unwrap_or(0);
                    ProcessShare {
                        comm,
                        count,
                        percentage: percentage_of(count, total),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(shares)
    }

    pub fn metadata_summary(&self) -> Result<MetadataSummary, StoreError> {
        Ok(MetadataSummary::from_map(&self.store.metadata()?))
    }

    fn symbol_groups(&self) -> Result<Vec<SymbolGroup>, StoreError> {
        let mut stmt = self.store.connection().prepare(SYMBOL_GROUPS_SQL)?;
        let groups = stmt
            .query_map([UNKNOWN_SYMBOL], |row| {
                let count: i64 = row.get(2)?;
                Ok(SymbolGroup {
                    symbol: row.get(0)?,
                    dso: row.get(1)?,
                    count: u64::try_from(count).unwrap_or(0),
                    first_id: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(groups)
    }

    fn ranked_symbols(
        &self,
        keep: impl Fn(&str) -> bool,
        display: impl Fn(&str) -> String,
    ) -> Result<Vec<SymbolHotspot>, StoreError> {
        let total = self.total_frames()?;

        let mut groups: Vec<SymbolGroup> = self
            .symbol_groups()?
            .into_iter()
            .filter(|group| keep(&group.symbol))
            .collect();

        groups.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.first_id.cmp(&b.first_id))
        });
        groups.truncate(self.top_n);

        debug!(
            "Ranked {} symbol groups out of {} frames",
            groups.len(),
            total
        );

        Ok(groups
            .into_iter()
            .map(|group| SymbolHotspot {
                display_name: display(&group.symbol),
                percentage: percentage_of(group.count, total),
                symbol: group.symbol,
                dso: group.dso,
                count: group.count,
            })
            .collect())
    }
}

/// Build the full report the analyze command prints and writes
///
/// **Public** - used by the analyze command and tests
///
/// # Arguments
/// * `store` - Store to query (must pass schema validation)
/// * `top_n` - Maximum rows in each ranked list
/// * `convention` - Decides which symbols count as managed
///
/// # Errors
/// * `StoreError` - schema missing or a query failed
pub fn build_report(
    store: &Store,
    top_n: usize,
    convention: &dyn SymbolConvention,
) -> Result<AnalysisReport, StoreError> {
    let query = HotspotQuery::new(store)?.with_top_n(top_n);

    let mut process_share = query.process_share()?;
    rank_by_count(&mut process_share);

    Ok(AnalysisReport {
        version: SCHEMA_VERSION.to_string(),
        metadata: query.metadata_summary()?,
        total_samples: query.total_samples()?,
        total_frames: query.total_frames()?,
        process_share,
        hotspots: query.hotspots()?,
        managed_hotspots: query.managed_hotspots(convention)?,
        managed_convention: convention.name().to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Share of `count` in `total` as a percentage, 0.0 when `total` is zero
pub fn percentage_of(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64) * 100.0
}

/// Stable sort by count, descending; equal counts keep their order
pub fn rank_by_count(shares: &mut [ProcessShare]) {
    shares.sort_by(|a, b| b.count.cmp(&a.count));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::convention::{JvmPerfMap, ScopeSeparator};
    use crate::parser::{FrameRecord, SampleRecord};

    fn seed(store: &mut Store, samples: &[(&str, &[(&str, &str)])]) {
        let mut tx = store.begin_import().unwrap();
        for (i, (comm, frames)) in samples.iter().enumerate() {
            let id = tx
                .insert_sample(&SampleRecord {
                    timestamp: i as f64,
                    pid: 1,
                    tid: 1,
                    comm: comm.to_string(),
                    raw_line: String::new(),
                })
                .unwrap();
            for (level, (symbol, dso)) in frames.iter().enumerate() {
                let frame = FrameRecord {
                    ip: format!("{level:x}"),
                    symbol: symbol.to_string(),
                    dso: dso.to_string(),
                };
                tx.insert_frame(id, level as u32, &frame).unwrap();
            }
        }
        tx.commit().unwrap();
    }

    #[test]
    fn test_two_frame_sample() {
        let mut store = Store::open_in_memory().unwrap();
        seed(&mut store, &[("java", &[("foo", "/lib/a.so"), ("bar", "/lib/a.so")])]);

        let query = HotspotQuery::new(&store).unwrap();
        let hotspots = query.hotspots().unwrap();
        assert_eq!(hotspots.len(), 2);
        assert_eq!(hotspots[0].symbol, "foo");
        assert_eq!(hotspots[1].symbol, "bar");
        for hotspot in &hotspots {
            assert_eq!(hotspot.count, 1);
            assert_eq!(hotspot.percentage, 50.0);
        }
        assert!(query.managed_hotspots(&ScopeSeparator::default()).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_symbols_excluded_but_counted() {
        let mut store = Store::open_in_memory().unwrap();
        seed(
            &mut store,
            &[("java", &[("[unknown]", ""), ("[unknown]", ""), ("main", "/bin/app")])],
        );

        let hotspots = HotspotQuery::new(&store).unwrap().hotspots().unwrap();
        assert_eq!(hotspots.len(), 1);
        assert_eq!(hotspots[0].symbol, "main");
        assert!((hotspots[0].percentage - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_symbol_different_dso_are_separate() {
        let mut store = Store::open_in_memory().unwrap();
        seed(
            &mut store,
            &[
                ("a", &[("memcpy", "/lib/libc.so"), ("memcpy", "/lib/libc.so")]),
                ("a", &[("memcpy", "/lib/other.so")]),
            ],
        );

        let hotspots = HotspotQuery::new(&store).unwrap().hotspots().unwrap();
        assert_eq!(hotspots.len(), 2);
        assert_eq!(hotspots[0].dso, "/lib/libc.so");
        assert_eq!(hotspots[0].count, 2);
        assert_eq!(hotspots[1].dso, "/lib/other.so");
    }

    #[test]
    fn test_top_n_truncates_with_stable_ties() {
        let mut store = Store::open_in_memory().unwrap();
        seed(
            &mut store,
            &[("a", &[("c", ""), ("b", ""), ("a", ""), ("hot", ""), ("hot", "")])],
        );

        let hotspots = HotspotQuery::new(&store)
            .unwrap()
            .with_top_n(3)
            .hotspots()
            .unwrap();
        let symbols: Vec<_> = hotspots.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["hot", "c", "b"]);
    }

    #[test]
    fn test_managed_hotspots_use_convention() {
        let mut store = Store::open_in_memory().unwrap();
        seed(
            &mut store,
            &[(
                "java",
                &[
                    ("LTestFibonacci;::fibonacci", "/tmp/perf-1.map"),
                    ("LTestFibonacci;::fibonacci", "/tmp/perf-1.map"),
                    ("std::thread::run", "/lib/libstd.so"),
                    ("main", "/bin/java"),
                ],
            )],
        );
        let query = HotspotQuery::new(&store).unwrap();

        let scoped = query.managed_hotspots(&ScopeSeparator::default()).unwrap();
        assert_eq!(scoped.len(), 2);
        assert_eq!(scoped[0].display_name, "TestFibonacci.fibonacci");
        assert_eq!(scoped[0].percentage, 50.0);

        let jvm = query.managed_hotspots(&JvmPerfMap).unwrap();
        assert_eq!(jvm.len(), 1);
        assert_eq!(jvm[0].symbol, "LTestFibonacci;::fibonacci");
    }

    #[test]
    fn test_process_share_order_and_ranking() {
        let mut store = Store::open_in_memory().unwrap();
        seed(
            &mut store,
            &[("perf", &[]), ("java", &[]), ("java", &[]), ("java", &[]), ("gc", &[])],
        );

        let mut shares = HotspotQuery::new(&store).unwrap().process_share().unwrap();
        let names: Vec<_> = shares.iter().map(|s| s.comm.as_str()).collect();
        assert_eq!(names, vec!["perf", "java", "gc"]);

        rank_by_count(&mut shares);
        let names: Vec<_> = shares.iter().map(|s| s.comm.as_str()).collect();
        assert_eq!(names, vec!["java", "perf", "gc"]);
        assert_eq!(shares[0].percentage, 60.0);
    }

    #[test]
    fn test_empty_store() {
        let store = Store::open_in_memory().unwrap();
        let report = build_report(&store, 10, &ScopeSeparator::default()).unwrap();
        assert_eq!(report.total_samples, 0);
        assert_eq!(report.total_frames, 0);
        assert!(report.hotspots.is_empty());
        assert!(report.managed_hotspots.is_empty());
        assert!(report.process_share.is_empty());
        assert_eq!(report.metadata, MetadataSummary::default());
    }

    #[test]
    fn test_missing_table_is_reported() {
        let store = Store::open_in_memory().unwrap();
        store
            .connection()
            .execute_batch("DROP TABLE metadata")
            .unwrap();
        assert!(matches!(
            HotspotQuery::new(&store),
            Err(StoreError::SchemaMissing { table: "metadata" })
        ));
    }

    #[test]
    fn test_percentage_of_zero_total() {
        assert_eq!(percentage_of(5, 0), 0.0);
        assert_eq!(percentage_of(1, 4), 25.0);
    }
}
