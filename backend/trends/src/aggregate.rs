use std::collections::{HashMap, hash_map::Entry};

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::{
    models::{Sale, TrendSeries},
    period::{TrendFilter, WeekStart, parse_sale_timestamp},
};

#[derive(Debug, Clone, Copy)]
pub struct TrendQuery<'a> {
    pub filter: TrendFilter,
    pub category: Option<&'a str>,
    pub now: NaiveDateTime,
    pub week_start: WeekStart,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub series: TrendSeries,
    /// Sales that landed in a bucket.
    pub matched: usize,
    /// Sales whose date could not be parsed. Under `all` they still land in a bucket keyed by
    /// the raw date, every other filter drops them.
    pub unparseable: usize,
}

/// Sums labels in first-seen order.
#[derive(Default)]
struct Buckets {
    order: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl Buckets {
    fn add(&mut self, label: String, count: u64) {
        match self.index.entry(label) {
            Entry::Occupied(entry) => {
                let total = &mut self.order[*entry.get()].1;
                *total = total.saturating_add(count);
            }
            Entry::Vacant(entry) => {
                self.order.push((entry.key().clone(), count));
                entry.insert(self.order.len() - 1);
            }
        }
    }
}

pub fn aggregate(sales: &[Sale], query: &TrendQuery) -> Aggregation {
    let category = query.category.map(str::to_lowercase);

    let mut buckets = Buckets::default();
    let mut matched = 0;
    let mut unparseable = 0;

    for sale in sales {
        if let Some(wanted) = &category {
            match &sale.category {
                Some(found) if found.to_lowercase() == *wanted => {}
                _ => continue,
            }
        }

        let timestamp = match parse_sale_timestamp(&sale.sale_date) {
            Ok(timestamp) => timestamp,
            Err(e) if query.filter == TrendFilter::All => {
                debug!("{e}, grouping under the raw date");
                unparseable += 1;
                buckets.add(sale.sale_date.clone(), sale.sale_count);
                matched += 1;
                continue;
            }
            Err(e) => {
                debug!("Skipping sale: {e}");
                unparseable += 1;
                continue;
            }
        };

        if !query.filter.contains(timestamp, query.now, query.week_start) {
            continue;
        }

        buckets.add(query.filter.label(timestamp), sale.sale_count);
        matched += 1;
    }

    if unparseable > 0 {
        warn!("{unparseable} sales with unparseable dates under {:?}", query.filter);
    }

    Aggregation {
        series: TrendSeries::from_buckets(buckets.order),
        matched,
        unparseable,
    }
}
