/// quick start - set up a ledger and pay the first two months
use std::sync::Arc;

use fee_ledger_rs::{
    BatchPaymentCoordinator, EventStore, FeeRate, FeeScheduleRegistry, FeeType, MemoryLedgerStore,
    Money, Month, PaymentEngine, PaymentMethod, RateVariant, SafeTimeProvider, StaticDirectory,
    StatisticsAggregator, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::System);
    let mut events = EventStore::new();

    // streetlight fee: 10 pesos per month from january 2025
    let schedule = Arc::new(FeeScheduleRegistry::new());
    schedule.append_rate(
        FeeRate {
            fee_type: FeeType::Streetlight,
            variant: RateVariant::Standard,
            value: Money::from_major(10),
            effective_month: "2025-01".parse()?,
        },
        &mut events,
    )?;

    let store = MemoryLedgerStore::shared();
    let directory = StaticDirectory::new().shared();
    let engine = PaymentEngine::new(store.clone(), schedule.clone(), directory.clone());
    let coordinator = BatchPaymentCoordinator::new(engine);

    // pay january and february in one action
    let household = Uuid::new_v4();
    let months: Vec<Month> = vec!["2025-01".parse()?, "2025-02".parse()?];
    let report = coordinator.pay_months(
        household,
        FeeType::Streetlight,
        &months,
        Money::from_major(20),
        PaymentMethod::Cash,
        Some("OR-0001".to_string()),
        None,
        &time,
        &mut events,
    )?;
    println!("batch complete: {}", report.is_complete());

    // print the yearly grid
    let aggregator = StatisticsAggregator::new(store, schedule, directory);
    for row in aggregator.year_grid(household, FeeType::Streetlight, 2025)? {
        println!(
            "{}  charge {:>6}  paid {:>6}  balance {:>6}  {:?}",
            row.month, row.charge, row.amount_paid, row.balance, row.status
        );
    }

    Ok(())
}
