use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use super::{ViewerLocale, VisitorBucket};
use crate::storage::Visit;

/// 按观看者时区的日历日期计数，日期升序，不补零
pub fn bucket_visits_by_date(visits: &[Visit], locale: &ViewerLocale) -> Vec<VisitorBucket> {
    bucket_timestamps(visits.iter().map(|v| v.created_at), locale)
}

pub fn bucket_timestamps(
    timestamps: impl IntoIterator<Item = DateTime<Utc>>,
    locale: &ViewerLocale,
) -> Vec<VisitorBucket> {
    let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for at in timestamps {
        *per_day.entry(locale.calendar_date(at)).or_default() += 1;
    }

    per_day
        .into_iter()
        .map(|(day, count)| VisitorBucket {
            date: locale.format_date(day),
            count,
        })
        .collect()
}
