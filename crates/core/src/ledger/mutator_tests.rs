//! Tests for LedgerMutator against the in-memory ledger and mirror stores.

#[cfg(test)]
mod tests {
    use crate::cells::{CellValue, Row};
    use crate::errors::Error;
    use crate::ledger::{
        decode_records, AccountBalanceRecord, DeleteOutcome, DepositRecord, DepositType,
        HoldingRecord, InMemoryLedgerStore, LedgerMutator, LedgerRecord, LedgerStore,
        RecordSource, BALANCE_LAYOUT, DEPOSIT_LAYOUT, HOLDING_LAYOUT,
    };
    use crate::mirror::{InMemoryMirrorStore, MirrorFilter, MirrorStore, MirrorSync};
    use crate::period::YearMonth;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn text(s: &str) -> CellValue {
        CellValue::text(s)
    }

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn seeded_balances() -> Vec<Row> {
        vec![
            vec![text(""), text(""), text("")],
            vec![
                text("25"),
                text("8"),
                text("202508"),
                text("2025"),
                text("8월"),
                text(""),
                text("50000000"),
            ],
        ]
    }

    struct Fixture {
        ledger: Arc<InMemoryLedgerStore>,
        mirror: Arc<InMemoryMirrorStore>,
    }

    impl Fixture {
        fn new(sheet: &str, rows: Vec<Row>) -> Self {
            Self {
                ledger: Arc::new(InMemoryLedgerStore::with_sheet(sheet, rows)),
                mirror: Arc::new(InMemoryMirrorStore::new()),
            }
        }

        fn mutator<R: LedgerRecord>(&self) -> LedgerMutator<R> {
            LedgerMutator::new(self.ledger.clone(), MirrorSync::inline(self.mirror.clone()))
        }
    }

    // ==================== Balance ledger scenario ====================

    #[tokio::test]
    async fn test_balance_ledger_end_to_end() {
        let fx = Fixture::new(BALANCE_LAYOUT.sheet, seeded_balances());
        let balances = fx.mutator::<AccountBalanceRecord>();

        let rows = fx
            .ledger
            .read_range(&BALANCE_LAYOUT.block_range())
            .await
            .unwrap();
        assert_eq!(
            crate::ledger::find_by_key::<AccountBalanceRecord>(&rows, &ym(2025, 8)),
            Some(1)
        );

        let duplicate = balances
            .append(AccountBalanceRecord::new(ym(2025, 8), dec!(1)))
            .await;
        assert!(matches!(duplicate, Err(Error::DuplicateKey(_))));

        let outcome = balances
            .append(AccountBalanceRecord::new(ym(2025, 9), dec!(52000000)))
            .await
            .unwrap();
        assert_eq!(outcome.row, Some(3));

        let sheet = fx.ledger.sheet(BALANCE_LAYOUT.sheet);
        assert_eq!(sheet[1], seeded_balances()[1]);
        let added = AccountBalanceRecord::decode(&sheet[2]).unwrap();
        assert_eq!(added.year_month, ym(2025, 9));
        assert_eq!(added.balance, dec!(52000000));

        let listed = balances.list().await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn test_append_leaves_formula_column_untouched() {
        let mut rows = seeded_balances();
        rows.push(vec![
            text(""),
            text(""),
            text(""),
            text(""),
            text(""),
            text("=G3-G2"),
        ]);
        let fx = Fixture::new(BALANCE_LAYOUT.sheet, rows);
        let balances = fx.mutator::<AccountBalanceRecord>();

        balances
            .append(AccountBalanceRecord::new(ym(2025, 9), dec!(52000000)))
            .await
            .unwrap();

        let sheet = fx.ledger.sheet(BALANCE_LAYOUT.sheet);
        assert_eq!(sheet[2][5], text("=G3-G2"));
        assert_eq!(sheet[2][6], CellValue::Number(52000000.0));
    }

    #[tokio::test]
    async fn test_append_rejects_negative_balance() {
        let fx = Fixture::new(BALANCE_LAYOUT.sheet, seeded_balances());
        let balances = fx.mutator::<AccountBalanceRecord>();
        let result = balances
            .append(AccountBalanceRecord::new(ym(2025, 9), dec!(-5)))
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(fx.ledger.sheet(BALANCE_LAYOUT.sheet).len(), 2);
    }

    // ==================== Update ====================

    #[tokio::test]
    async fn test_update_same_key_writes_in_place() {
        let fx = Fixture::new(BALANCE_LAYOUT.sheet, seeded_balances());
        let balances = fx.mutator::<AccountBalanceRecord>();

        let outcome = balances
            .update(
                &ym(2025, 8),
                AccountBalanceRecord::new(ym(2025, 8), dec!(50500000)),
            )
            .await
            .unwrap();
        assert_eq!(outcome.row, Some(2));

        let found = balances.find(&ym(2025, 8)).await.unwrap().unwrap();
        assert_eq!(found.0, 2);
        assert_eq!(found.1.balance, dec!(50500000));
    }

    #[tokio::test]
    async fn test_update_changed_key_relocates() {
        let fx = Fixture::new(BALANCE_LAYOUT.sheet, seeded_balances());
        let balances = fx.mutator::<AccountBalanceRecord>();
        balances
            .append(AccountBalanceRecord::new(ym(2025, 9), dec!(52000000)))
            .await
            .unwrap();

        let outcome = balances
            .update(
                &ym(2025, 8),
                AccountBalanceRecord::new(ym(2025, 7), dec!(49000000)),
            )
            .await
            .unwrap();
        assert_eq!(outcome.row, Some(4));

        let sheet = fx.ledger.sheet(BALANCE_LAYOUT.sheet);
        assert!(sheet[1][6].is_blank());
        assert_eq!(sheet[1][0], text("25"));

        let months: Vec<YearMonth> = decode_records::<AccountBalanceRecord>(&sheet)
            .into_iter()
            .map(|r| r.year_month)
            .collect();
        assert_eq!(months, vec![ym(2025, 9), ym(2025, 7)]);
    }

    #[tokio::test]
    async fn test_update_to_existing_key_is_rejected_before_writing() {
        let fx = Fixture::new(BALANCE_LAYOUT.sheet, seeded_balances());
        let balances = fx.mutator::<AccountBalanceRecord>();
        balances
            .append(AccountBalanceRecord::new(ym(2025, 9), dec!(52000000)))
            .await
            .unwrap();
        let before = fx.ledger.sheet(BALANCE_LAYOUT.sheet);

        let result = balances
            .update(
                &ym(2025, 8),
                AccountBalanceRecord::new(ym(2025, 9), dec!(1)),
            )
            .await;
        assert!(matches!(result, Err(Error::DuplicateKey(_))));
        assert_eq!(fx.ledger.sheet(BALANCE_LAYOUT.sheet), before);
    }

    #[tokio::test]
    async fn test_update_missing_key_is_not_found() {
        let fx = Fixture::new(BALANCE_LAYOUT.sheet, seeded_balances());
        let balances = fx.mutator::<AccountBalanceRecord>();
        let result = balances
            .update(
                &ym(2024, 1),
                AccountBalanceRecord::new(ym(2024, 1), dec!(1)),
            )
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    // ==================== Soft delete ====================

    #[tokio::test]
    async fn test_soft_delete_blanks_value_only() {
        let fx = Fixture::new(BALANCE_LAYOUT.sheet, seeded_balances());
        let balances = fx.mutator::<AccountBalanceRecord>();

        let outcome = balances.soft_delete(&ym(2025, 8)).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted { row: 2 });

        let sheet = fx.ledger.sheet(BALANCE_LAYOUT.sheet);
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet[1][2], text("202508"));
        assert!(sheet[1][6].is_blank());
        assert!(balances.list().await.unwrap().is_empty());

        // The cleared row is reusable.
        let outcome = balances
            .append(AccountBalanceRecord::new(ym(2025, 8), dec!(51000000)))
            .await
            .unwrap();
        assert_eq!(outcome.row, Some(2));
    }

    #[tokio::test]
    async fn test_soft_delete_falls_back_to_mirror() {
        let fx = Fixture::new(BALANCE_LAYOUT.sheet, seeded_balances());
        let balances = fx.mutator::<AccountBalanceRecord>();
        let stale = AccountBalanceRecord::new(ym(2024, 12), dec!(40000000));
        fx.mirror
            .upsert(
                BALANCE_LAYOUT.mirror_table,
                &[stale.to_mirror_row().unwrap()],
                "naturalKey",
            )
            .await
            .unwrap();

        let outcome = balances.soft_delete(&ym(2024, 12)).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::MirrorOnly);

        let again = balances.soft_delete(&ym(2024, 12)).await;
        assert!(matches!(again, Err(Error::NotFound(_))));
    }

    // ==================== Mirror side channel ====================

    #[tokio::test]
    async fn test_mutations_are_mirrored() {
        let fx = Fixture::new(BALANCE_LAYOUT.sheet, seeded_balances());
        let balances = fx.mutator::<AccountBalanceRecord>();

        balances
            .append(AccountBalanceRecord::new(ym(2025, 9), dec!(52000000)))
            .await
            .unwrap();
        let rows = fx
            .mirror
            .select(
                BALANCE_LAYOUT.mirror_table,
                &MirrorFilter::eq("naturalKey", "2025-09"),
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);

        balances.soft_delete(&ym(2025, 9)).await.unwrap();
        assert_eq!(fx.mirror.count(BALANCE_LAYOUT.mirror_table), 0);
    }

    #[tokio::test]
    async fn test_mirror_failure_does_not_fail_the_write() {
        let fx = Fixture::new(BALANCE_LAYOUT.sheet, seeded_balances());
        fx.mirror.set_failing(true);
        let balances = fx.mutator::<AccountBalanceRecord>();
        let outcome = balances
            .append(AccountBalanceRecord::new(ym(2025, 9), dec!(52000000)))
            .await;
        assert!(outcome.is_ok());
    }

    #[tokio::test]
    async fn test_list_with_fallback_reads_mirror_when_ledger_fails() {
        let fx = Fixture::new(BALANCE_LAYOUT.sheet, seeded_balances());
        let record = AccountBalanceRecord::new(ym(2025, 8), dec!(50000000));
        fx.mirror
            .upsert(
                BALANCE_LAYOUT.mirror_table,
                &[record.to_mirror_row().unwrap()],
                "naturalKey",
            )
            .await
            .unwrap();
        fx.ledger.set_failing(true);

        let balances = fx.mutator::<AccountBalanceRecord>();
        let records = balances.list_with_fallback().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, RecordSource::Mirror);

        let direct = balances.list().await;
        assert!(matches!(direct, Err(Error::Ledger(_))));
    }

    #[tokio::test]
    async fn test_ledger_failure_propagates() {
        let fx = Fixture::new(BALANCE_LAYOUT.sheet, seeded_balances());
        fx.ledger.set_failing(true);
        let balances = fx.mutator::<AccountBalanceRecord>();
        let result = balances
            .append(AccountBalanceRecord::new(ym(2025, 9), dec!(1)))
            .await;
        assert!(matches!(result, Err(Error::Ledger(_))));
        assert_eq!(fx.mirror.count(BALANCE_LAYOUT.mirror_table), 0);
    }

    // ==================== Raw log and slot-based ledgers ====================

    #[tokio::test]
    async fn test_deposit_log_accepts_repeated_entries() {
        let header = vec![vec![text("날짜"), text("구분"), text("금액"), text("메모"), text("누계")]];
        let fx = Fixture::new(DEPOSIT_LAYOUT.sheet, header);
        let deposits = fx.mutator::<DepositRecord>();
        let deposit = DepositRecord {
            date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            deposit_type: DepositType::Deposit,
            amount: dec!(1000000),
            memo: Some("월급".to_string()),
            source: RecordSource::Ledger,
        };

        let first = deposits.append(deposit.clone()).await.unwrap();
        let second = deposits.append(deposit).await.unwrap();
        assert_eq!(first.row, Some(2));
        assert_eq!(second.row, Some(3));

        let sheet = fx.ledger.sheet(DEPOSIT_LAYOUT.sheet);
        assert_eq!(sheet[1].len(), 4);
        assert_eq!(sheet[1][1], text("입금"));
        assert_eq!(deposits.list().await.unwrap().len(), 2);
    }

    fn holding(symbol: &str, quantity: rust_decimal::Decimal) -> HoldingRecord {
        HoldingRecord {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            quantity,
            average_price: dec!(100),
            currency: "USD".to_string(),
            source: RecordSource::Ledger,
        }
    }

    #[tokio::test]
    async fn test_holdings_fill_first_empty_slot() {
        let rows = vec![
            vec![text("포트폴리오")],
            vec![text("합계"), text(""), text(""), text(""), text(""), text("=SUM(F4:F)")],
            vec![text("종목"), text("이름"), text("수량")],
            vec![text("AAPL"), text("Apple"), text("3"), text("180"), text("USD")],
            vec![text(""), text(""), text(""), text(""), text(""), text("=C5*D5")],
            vec![text("MSFT"), text("Microsoft"), text("1"), text("400"), text("USD")],
        ];
        let fx = Fixture::new(HOLDING_LAYOUT.sheet, rows);
        let holdings = fx.mutator::<HoldingRecord>();

        let outcome = holdings.append(holding("NVDA", dec!(2))).await.unwrap();
        assert_eq!(outcome.row, Some(5));
        let sheet = fx.ledger.sheet(HOLDING_LAYOUT.sheet);
        assert_eq!(sheet[4][0], text("NVDA"));
        assert_eq!(sheet[4][5], text("=C5*D5"));

        let duplicate = holdings.append(holding("aapl", dec!(1))).await;
        assert!(matches!(duplicate, Err(Error::DuplicateKey(_))));

        holdings.soft_delete(&"AAPL".to_string()).await.unwrap();
        let outcome = holdings.append(holding("TSLA", dec!(1))).await.unwrap();
        assert_eq!(outcome.row, Some(4));
    }

    #[tokio::test]
    async fn test_holdings_on_header_only_sheet_land_in_data_area() {
        let rows = vec![vec![text("포트폴리오")], vec![text("합계")]];
        let fx = Fixture::new(HOLDING_LAYOUT.sheet, rows);
        let holdings = fx.mutator::<HoldingRecord>();

        let outcome = holdings.append(holding("AAPL", dec!(3))).await.unwrap();
        assert_eq!(outcome.row, Some(HOLDING_LAYOUT.data_offset + 1));
        let sheet = fx.ledger.sheet(HOLDING_LAYOUT.sheet);
        assert_eq!(sheet[1][0], text("합계"));

        let listed = holdings.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].symbol, "AAPL");

        let duplicate = holdings.append(holding("AAPL", dec!(1))).await;
        assert!(matches!(duplicate, Err(Error::DuplicateKey(_))));
    }

    #[tokio::test]
    async fn test_holdings_on_empty_sheet_skip_header_rows() {
        let fx = Fixture::new(HOLDING_LAYOUT.sheet, Vec::new());
        let holdings = fx.mutator::<HoldingRecord>();

        let outcome = holdings.append(holding("MSFT", dec!(1))).await.unwrap();
        assert_eq!(outcome.row, Some(HOLDING_LAYOUT.data_offset + 1));
        assert_eq!(holdings.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_holding_symbol_change_rewrites_in_place() {
        let rows = vec![
            vec![text("포트폴리오")],
            vec![text("합계")],
            vec![text("종목")],
            vec![text("AAPL"), text("Apple"), text("3"), text("180"), text("USD")],
        ];
        let fx = Fixture::new(HOLDING_LAYOUT.sheet, rows);
        let holdings = fx.mutator::<HoldingRecord>();

        let outcome = holdings
            .update(&"AAPL".to_string(), holding("GOOGL", dec!(5)))
            .await
            .unwrap();
        assert_eq!(outcome.row, Some(4));
        let listed = holdings.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].symbol, "GOOGL");
    }
}
