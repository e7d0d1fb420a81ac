/// Options for configuring the [`RegionDatabase`](crate::RegionDatabase)
///
/// Default options:
/// ```
/// # use region_pathfinding::DatabaseConfig;
/// assert_eq!(
///     DatabaseConfig {
///         growth_percent: 10,
///         min_growth: 4,
///     },
///     Default::default()
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// How much the Region arrays grow when a Region is created and no slot is free,
    /// in percent of the current number of Regions (defaults to `10`)
    pub growth_percent: usize,
    /// The minimum number of slots added by a single growth step (defaults to `4`)
    pub min_growth: usize,
}

impl DatabaseConfig {
    /// an example DatabaseConfig that never reserves more than a single slot ahead
    ///
    /// Values:
    /// ```
    /// # use region_pathfinding::DatabaseConfig;
    /// assert_eq!(
    ///     DatabaseConfig {
    ///         growth_percent: 0,
    ///         min_growth: 1,
    ///     },
    ///     DatabaseConfig::COMPACT
    /// );
    /// ```
    pub const COMPACT: DatabaseConfig = DatabaseConfig {
        growth_percent: 0,
        min_growth: 1,
    };

    /// The number of slots to add when `live` Regions exist and none is free
    pub fn growth_for(&self, live: usize) -> usize {
        (live * self.growth_percent / 100).max(self.min_growth).max(1)
    }
}

impl Default for DatabaseConfig {
    fn default() -> DatabaseConfig {
        DatabaseConfig {
            growth_percent: 10,
            min_growth: 4,
        }
    }
}
