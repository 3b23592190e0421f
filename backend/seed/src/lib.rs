//! # Sales Seeding
//!
//! Back-fills the sales document so the trend chart has something to show.
//!
//! ## Plan
//! - One sale per category per day, `days_before` days before today through `days_after` days after
//! - Every sale carries the same `count`
//! - No categories means one uncategorized sale per day
//!
//! Sales are appended through the record store in a single write, existing sales are kept.
use std::{path::Path, time::Duration};

use anyhow::anyhow;
use chrono::{Days, Local, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};
use server::database::JsonStore;
use trends::Sale;

#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub days_before: u32,
    pub days_after: u32,
    pub categories: Vec<String>,
    pub count: u64,
}

pub async fn load_sales(data_dir: &Path, plan: &SeedPlan) -> anyhow::Result<()> {
    let store = JsonStore::new(data_dir);
    println!("Loaded Sales: {}\n", store.load_sales().await.sales.len());

    let sales = build_sales(Local::now().date_naive(), plan)?;
    let new_sales = sales.len();

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Writing {new_sales} sales"));

    let total = store.append_sales(sales).await?;

    pb.finish_with_message("done");

    println!("Total New Sales: {new_sales}");
    println!("Sale Verification: {total}");
    println!("Written to {}", store.sales_path().display());

    Ok(())
}

pub fn build_sales(today: NaiveDate, plan: &SeedPlan) -> anyhow::Result<Vec<Sale>> {
    let first = today
        .checked_sub_days(Days::new(plan.days_before.into()))
        .ok_or_else(|| anyhow!("{} days before {today} is out of range", plan.days_before))?;

    let categories: Vec<&str> = plan
        .categories
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect();

    let days = u64::from(plan.days_before) + u64::from(plan.days_after) + 1;
    let mut sales = Vec::new();

    for offset in 0..days {
        let date = first
            .checked_add_days(Days::new(offset))
            .ok_or_else(|| anyhow!("{offset} days after {first} is out of range"))?;
        let sale_date = date.format("%Y-%m-%d").to_string();

        if categories.is_empty() {
            sales.push(Sale::new(sale_date, plan.count, None));
        } else {
            for &category in &categories {
                sales.push(Sale::new(sale_date.clone(), plan.count, Some(category)));
            }
        }
    }

    Ok(sales)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn plan(days_before: u32, days_after: u32, categories: &[&str]) -> SeedPlan {
        SeedPlan {
            days_before,
            days_after,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            count: 5,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn test_range_and_categories() {
        let sales = build_sales(today(), &plan(2, 1, &["a", "b"])).unwrap();

        assert_eq!(sales.len(), 8);
        assert_eq!(sales[0].sale_date, "2024-01-08");
        assert_eq!(sales[0].category.as_deref(), Some("a"));
        assert_eq!(sales[1].category.as_deref(), Some("b"));
        assert_eq!(sales[7].sale_date, "2024-01-11");
        assert!(sales.iter().all(|sale| sale.sale_count == 5));
    }

    #[test]
    fn test_blank_categories_mean_uncategorized() {
        let sales = build_sales(today(), &plan(0, 0, &["", "  "])).unwrap();

        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].sale_date, "2024-01-10");
        assert_eq!(sales[0].category, None);
    }

    #[tokio::test]
    async fn test_load_sales_appends() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        store
            .append_sale(Sale::new("2020-01-01", 1, None))
            .await
            .unwrap();

        load_sales(dir.path(), &plan(1, 1, &["x"])).await.unwrap();

        let sales = store.load_sales().await.sales;
        assert_eq!(sales.len(), 4);
        assert_eq!(sales[0].sale_date, "2020-01-01");
    }
}
