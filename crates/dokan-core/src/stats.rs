//! # Aggregates
//!
//! Dashboard totals, per-status counts and the date-ranged analytics report.
//!
//! ## Profit Model
//! ```text
//! total_revenue  = Σ order.total
//! total_expenses = Σ expense.amount
//! net_profit     = total_revenue - total_expenses
//! gross_profit   = 45% of total_revenue        (flat margin estimate)
//! online_sold    = total_revenue
//! ```

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Expense, Order, OrderStatus};

/// Flat gross margin applied to revenue, in basis points.
pub const GROSS_MARGIN_BPS: u32 = 4500;

// =============================================================================
// Dashboard Stats
// =============================================================================

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub net_profit: Money,
    pub gross_profit: Money,
    pub total_expenses: Money,
    pub total_revenue: Money,
    pub online_sold: Money,
    pub orders: usize,
    pub customers: usize,
    pub total_products: usize,
}

impl DashboardStats {
    /// Computes stats over the given (already filtered) orders and expenses.
    pub fn compute(
        orders: &[Order],
        expenses: &[Expense],
        customer_count: usize,
        product_count: usize,
    ) -> Self {
        let total_revenue: Money = orders.iter().map(|o| o.total).sum();
        let total_expenses: Money = expenses.iter().map(|e| e.amount).sum();

        DashboardStats {
            net_profit: total_revenue - total_expenses,
            gross_profit: total_revenue.percent_bps(GROSS_MARGIN_BPS),
            total_expenses,
            total_revenue,
            online_sold: total_revenue,
            orders: orders.len(),
            customers: customer_count,
            total_products: product_count,
        }
    }
}

// =============================================================================
// Status Counts
// =============================================================================

/// Order counts per status tab.
///
/// Serializes as `{"All": n, "pending": n, ..., "failed": n}` with every
/// status present, zero or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusCounts {
    #[serde(rename = "All")]
    pub all: usize,
    pub pending: usize,
    pub processing: usize,
    #[serde(rename = "on-hold")]
    pub on_hold: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub refunded: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn get(&self, status: OrderStatus) -> usize {
        match status {
            OrderStatus::Pending => self.pending,
            OrderStatus::Processing => self.processing,
            OrderStatus::OnHold => self.on_hold,
            OrderStatus::Completed => self.completed,
            OrderStatus::Cancelled => self.cancelled,
            OrderStatus::Refunded => self.refunded,
            OrderStatus::Failed => self.failed,
        }
    }

    fn bump(&mut self, status: OrderStatus) {
        let slot = match status {
            OrderStatus::Pending => &mut self.pending,
            OrderStatus::Processing => &mut self.processing,
            OrderStatus::OnHold => &mut self.on_hold,
            OrderStatus::Completed => &mut self.completed,
            OrderStatus::Cancelled => &mut self.cancelled,
            OrderStatus::Refunded => &mut self.refunded,
            OrderStatus::Failed => &mut self.failed,
        };
        *slot += 1;
    }
}

/// Counts orders per status.
pub fn status_counts(orders: &[Order]) -> StatusCounts {
    let mut counts = StatusCounts {
        all: orders.len(),
        ..Default::default()
    };
    for order in orders {
        counts.bump(order.status);
    }
    counts
}

// =============================================================================
// Analytics
// =============================================================================

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "String")]
    pub from: NaiveDate,
    #[ts(as = "String")]
    pub to: NaiveDate,
}

impl DateRange {
    /// Builds a range, rejecting `from > to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> CoreResult<Self> {
        if from > to {
            return Err(CoreError::InvalidDateRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(DateRange { from, to })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Total sales for one weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WeekdaySales {
    /// Short name, `Mon`..`Sun`.
    pub day: String,
    pub total: Money,
}

/// Rounded percentage of in-range orders per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusBreakdown {
    pub completed: u32,
    pub processing: u32,
    pub cancelled: u32,
    pub refunded: u32,
}

/// Profit and sales report over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub range: DateRange,
    pub order_count: usize,
    /// Sum of completed order totals.
    pub delivered_sale: Money,
    pub total_expense: Money,
    /// `delivered_sale - total_expense`.
    pub net_profit: Money,
    /// Monday first.
    pub weekday_sales: Vec<WeekdaySales>,
    pub status_breakdown: StatusBreakdown,
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

impl AnalyticsReport {
    /// Builds the report for orders placed and expenses dated inside `range`.
    ///
    /// Weekday sales sum every in-range order, not only completed ones.
    pub fn compute(orders: &[Order], expenses: &[Expense], range: DateRange) -> Self {
        let in_range: Vec<&Order> = orders
            .iter()
            .filter(|o| range.contains(o.placed_on()))
            .collect();

        let delivered_sale: Money = in_range
            .iter()
            .filter(|o| o.status == OrderStatus::Completed)
            .map(|o| o.total)
            .sum();

        let total_expense: Money = expenses
            .iter()
            .filter(|e| range.contains(e.date))
            .map(|e| e.amount)
            .sum();

        let weekday_sales = WEEK
            .iter()
            .map(|day| WeekdaySales {
                day: day.to_string(),
                total: in_range
                    .iter()
                    .filter(|o| o.timestamp.weekday() == *day)
                    .map(|o| o.total)
                    .sum(),
            })
            .collect();

        let denominator = in_range.len().max(1) as f64;
        let percent = |status: OrderStatus| -> u32 {
            let count = in_range.iter().filter(|o| o.status == status).count();
            ((count as f64 / denominator) * 100.0).round() as u32
        };

        AnalyticsReport {
            range,
            order_count: in_range.len(),
            delivered_sale,
            total_expense,
            net_profit: delivered_sale - total_expense,
            weekday_sales,
            status_breakdown: StatusBreakdown {
                completed: percent(OrderStatus::Completed),
                processing: percent(OrderStatus::Processing),
                cancelled: percent(OrderStatus::Cancelled),
                refunded: percent(OrderStatus::Refunded),
            },
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::tests::order;
    use chrono::{TimeZone, Utc};

    fn expense(amount: i64, date: (i32, u32, u32)) -> Expense {
        Expense {
            id: format!("e-{amount}"),
            category: "Rent".to_string(),
            amount: Money::from_taka(amount),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            description: String::new(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        }
    }

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_net_profit_is_revenue_minus_expenses() {
        let mut a = order("1", OrderStatus::Completed, 1);
        a.total = Money::parse_decimal("1250.50");
        let mut b = order("2", OrderStatus::Cancelled, 2);
        b.total = Money::parse_decimal("749.50");
        let expenses = vec![expense(300, (2024, 5, 1)), expense(200, (2024, 5, 2))];

        let stats = DashboardStats::compute(&[a, b], &expenses, 5, 12);

        assert_eq!(stats.total_revenue, Money::from_taka(2000));
        assert_eq!(stats.total_expenses, Money::from_taka(500));
        assert_eq!(stats.net_profit, stats.total_revenue - stats.total_expenses);
        assert_eq!(stats.gross_profit, Money::from_taka(900));
        assert_eq!(stats.online_sold, stats.total_revenue);
        assert_eq!(stats.orders, 2);
        assert_eq!(stats.customers, 5);
        assert_eq!(stats.total_products, 12);
    }

    #[test]
    fn test_empty_stats_are_zero() {
        let stats = DashboardStats::compute(&[], &[], 0, 0);
        assert_eq!(stats, DashboardStats::default());
    }

    #[test]
    fn test_status_counts_include_every_status() {
        let orders = vec![
            order("1", OrderStatus::Completed, 1),
            order("2", OrderStatus::Completed, 1),
            order("3", OrderStatus::OnHold, 1),
        ];
        let counts = status_counts(&orders);

        assert_eq!(counts.all, 3);
        assert_eq!(counts.get(OrderStatus::Completed), 2);
        assert_eq!(counts.get(OrderStatus::OnHold), 1);
        assert_eq!(counts.get(OrderStatus::Failed), 0);

        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json["All"], 3);
        assert_eq!(json["on-hold"], 1);
        assert_eq!(json["refunded"], 0);
    }

    #[test]
    fn test_date_range_rejects_reversed() {
        assert!(DateRange::new(ymd(5), ymd(4)).is_err());
        assert!(DateRange::new(ymd(4), ymd(4)).is_ok());
    }

    #[test]
    fn test_analytics_report() {
        // 2024-05-06 is a Monday
        let mut done = order("1", OrderStatus::Completed, 6);
        done.total = Money::from_taka(1000);
        let mut cancelled = order("2", OrderStatus::Cancelled, 6);
        cancelled.total = Money::from_taka(400);
        let mut processing = order("3", OrderStatus::Processing, 7);
        processing.total = Money::from_taka(600);
        let mut late = order("4", OrderStatus::Completed, 20);
        late.total = Money::from_taka(9999);

        let expenses = vec![expense(250, (2024, 5, 7)), expense(5000, (2024, 5, 30))];
        let range = DateRange::new(ymd(6), ymd(12)).unwrap();

        let report = AnalyticsReport::compute(&[done, cancelled, processing, late], &expenses, range);

        assert_eq!(report.order_count, 3);
        assert_eq!(report.delivered_sale, Money::from_taka(1000));
        assert_eq!(report.total_expense, Money::from_taka(250));
        assert_eq!(report.net_profit, Money::from_taka(750));

        assert_eq!(report.weekday_sales.len(), 7);
        assert_eq!(report.weekday_sales[0].day, "Mon");
        assert_eq!(report.weekday_sales[0].total, Money::from_taka(1400));
        assert_eq!(report.weekday_sales[1].total, Money::from_taka(600));
        assert_eq!(report.weekday_sales[6].total, Money::zero());

        assert_eq!(report.status_breakdown.completed, 33);
        assert_eq!(report.status_breakdown.cancelled, 33);
        assert_eq!(report.status_breakdown.processing, 33);
        assert_eq!(report.status_breakdown.refunded, 0);
    }

    #[test]
    fn test_empty_range_has_zero_percentages() {
        let range = DateRange::new(ymd(1), ymd(2)).unwrap();
        let report = AnalyticsReport::compute(&[], &[], range);
        assert_eq!(report.status_breakdown, StatusBreakdown::default());
        assert_eq!(report.net_profit, Money::zero());
    }
}
