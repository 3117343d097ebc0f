//! Tests for the dividend and performance services over in-memory ledgers.

#[cfg(test)]
mod tests {
    use crate::cells::CellValue;
    use crate::enrich::{RateEnricher, INDEX_LAYOUT};
    use crate::errors::Error;
    use crate::fx::{ExchangeRate, FxRateServiceTrait, RatePeriod, RateSource};
    use crate::ledger::{
        AccountBalanceRecord, DepositRecord, DepositType, DividendRecord, InMemoryLedgerStore,
        LedgerMutator, RecordSource, BALANCE_LAYOUT, DEPOSIT_LAYOUT, DIVIDEND_LAYOUT,
    };
    use crate::mirror::MirrorSync;
    use crate::period::YearMonth;
    use crate::series::{
        DividendService, DividendServiceTrait, PerformanceService, PerformanceServiceTrait,
        ACCOUNT_SERIES_NAME, CUMULATIVE_FIELD, INDEX_SERIES_NAME, RAW_INDEX_SERIES_NAME,
        RETURN_PCT_FIELD, ROLLING_AVERAGE_FIELD, TOTAL_FIELD, YTD_PERIOD,
    };
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    struct StaticRates(BTreeMap<YearMonth, Decimal>);

    #[async_trait]
    impl FxRateServiceTrait for StaticRates {
        async fn get_current_rate(&self) -> ExchangeRate {
            ExchangeRate {
                period: RatePeriod::Today,
                rate: dec!(1380),
                source: RateSource::Fallback,
                fetched_at: Utc::now(),
            }
        }

        async fn get_historical_rates(&self) -> BTreeMap<YearMonth, Decimal> {
            self.0.clone()
        }

        async fn get_historical_exchange_rates(&self) -> Vec<ExchangeRate> {
            Vec::new()
        }

        async fn get_rate_for_period(&self, period: YearMonth) -> Decimal {
            self.0.get(&period).copied().unwrap_or(dec!(1380))
        }

        fn invalidate(&self) {}
    }

    fn rates() -> Arc<StaticRates> {
        let mut rates = BTreeMap::new();
        rates.insert(ym(2025, 1), dec!(1400));
        rates.insert(ym(2025, 3), dec!(1500));
        Arc::new(StaticRates(rates))
    }

    fn header(layout_sheet: &str) -> InMemoryLedgerStore {
        InMemoryLedgerStore::with_sheet(layout_sheet, vec![vec![CellValue::text("header")]])
    }

    fn dividend(date: (i32, u32, u32), local: Decimal, foreign: Decimal) -> DividendRecord {
        DividendRecord {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            symbol: "SCHD".to_string(),
            name: "Schwab US Dividend".to_string(),
            amount_local: local,
            amount_foreign: foreign,
            memo: None,
            source: RecordSource::Ledger,
        }
    }

    async fn dividend_service() -> (DividendService, Arc<InMemoryLedgerStore>) {
        let store = Arc::new(header(DIVIDEND_LAYOUT.sheet));
        let mutator: LedgerMutator<DividendRecord> =
            LedgerMutator::new(store.clone(), MirrorSync::disabled());
        for record in [
            dividend((2025, 1, 10), dec!(10000), dec!(0)),
            dividend((2025, 3, 15), dec!(0), dec!(10)),
        ] {
            mutator.append(record).await.unwrap();
        }

        let clock_instant = Utc.with_ymd_and_hms(2025, 4, 1, 3, 0, 0).unwrap();
        let service = DividendService::new(mutator, rates())
            .with_clock(Arc::new(move || clock_instant));
        (service, store)
    }

    // ==================== Dividend service ====================

    #[tokio::test]
    async fn test_monthly_series_has_rolling_and_cumulative() {
        let (service, _) = dividend_service().await;
        let series = service.monthly_series().await.unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].get(TOTAL_FIELD), Some(dec!(10000)));
        assert_eq!(series[1].get(TOTAL_FIELD), None);
        assert_eq!(series[2].get(TOTAL_FIELD), Some(dec!(15000)));
        assert_eq!(series[1].get(ROLLING_AVERAGE_FIELD), Some(dec!(10000)));
        assert_eq!(series[2].get(ROLLING_AVERAGE_FIELD), Some(dec!(12500)));
        assert_eq!(series[2].get(CUMULATIVE_FIELD), Some(dec!(25000)));
    }

    #[tokio::test]
    async fn test_year_over_year_and_summaries() {
        let (service, _) = dividend_service().await;

        let grid = service.year_over_year().await.unwrap();
        assert_eq!(grid[&2025][&3], Some(dec!(15000)));
        assert_eq!(grid[&2025][&2], None);

        let summaries = service.summaries().await.unwrap();
        let ytd = summaries.iter().find(|s| s.period == YTD_PERIOD).unwrap();
        assert_eq!(ytd.total, dec!(25000));
        assert_eq!(ytd.monthly_average, dec!(6250));
    }

    #[tokio::test]
    async fn test_ledger_failure_without_mirror_propagates() {
        let (service, store) = dividend_service().await;
        store.set_failing(true);
        let result = service.monthly_series().await;
        assert!(matches!(result, Err(Error::Ledger(_))));
    }

    // ==================== Performance service ====================

    async fn performance_service(with_index: bool) -> PerformanceService {
        let balance_store = Arc::new(header(BALANCE_LAYOUT.sheet));
        let deposit_store = Arc::new(header(DEPOSIT_LAYOUT.sheet));
        let balances: LedgerMutator<AccountBalanceRecord> =
            LedgerMutator::new(balance_store, MirrorSync::disabled());
        let deposits: LedgerMutator<DepositRecord> =
            LedgerMutator::new(deposit_store, MirrorSync::disabled());

        balances
            .append(AccountBalanceRecord::new(ym(2025, 1), dec!(1000000)))
            .await
            .unwrap();
        balances
            .append(AccountBalanceRecord::new(ym(2025, 3), dec!(1100000)))
            .await
            .unwrap();
        deposits
            .append(DepositRecord {
                date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
                deposit_type: DepositType::Deposit,
                amount: dec!(1000000),
                memo: None,
                source: RecordSource::Ledger,
            })
            .await
            .unwrap();

        let clock_instant = Utc.with_ymd_and_hms(2025, 4, 1, 3, 0, 0).unwrap();
        let service =
            PerformanceService::new(balances, deposits).with_clock(Arc::new(move || clock_instant));
        if !with_index {
            return service;
        }

        let index_store = Arc::new(InMemoryLedgerStore::with_sheet(
            INDEX_LAYOUT.sheet,
            vec![
                vec![CellValue::text("Period"), CellValue::text("Index")],
                vec![CellValue::text("25.01"), CellValue::Number(200.0)],
                vec![CellValue::text("25.03"), CellValue::Number(220.0)],
            ],
        ));
        let enricher = RateEnricher::new(index_store, rates(), INDEX_LAYOUT.clone());
        service.with_index(Arc::new(enricher))
    }

    #[tokio::test]
    async fn test_account_series_returns() {
        let service = performance_service(false).await;
        let series = service.account_series().await.unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].get(RETURN_PCT_FIELD), Some(dec!(0)));
        assert_eq!(series[2].get(RETURN_PCT_FIELD), Some(dec!(10)));
    }

    #[tokio::test]
    async fn test_yield_comparisons_without_index() {
        let service = performance_service(false).await;
        let yields = service.yield_comparisons().await.unwrap();
        assert_eq!(yields.len(), 1);
        assert_eq!(yields[0].name, ACCOUNT_SERIES_NAME);
        assert_eq!(yields[0].comparison.this_year, Some(dec!(10)));
    }

    #[tokio::test]
    async fn test_yield_comparisons_with_index() {
        let service = performance_service(true).await;
        let yields = service.yield_comparisons().await.unwrap();
        let names: Vec<&str> = yields.iter().map(|y| y.name.as_str()).collect();
        assert_eq!(
            names,
            vec![ACCOUNT_SERIES_NAME, INDEX_SERIES_NAME, RAW_INDEX_SERIES_NAME]
        );
        // 220 * (1500 / 1400) = 235.7143 against 200.
        assert_eq!(yields[1].comparison.this_year, Some(dec!(17.86)));
        assert_eq!(yields[2].comparison.this_year, Some(dec!(10)));
    }
}
