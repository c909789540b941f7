/// combined payment across fee types, a halted batch, and a ledger reset
use std::sync::Arc;

use fee_ledger_rs::{
    BatchPaymentCoordinator, EventStore, FeeRate, FeeScheduleRegistry, FeeType, FeeTypeBatch,
    LedgerResetter, MemoryLedgerStore, Money, Period, PaymentEngine, PaymentMethod, RateVariant,
    SafeTimeProvider, StaticDirectory, StatisticsAggregator, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::System);
    let mut events = EventStore::new();

    let schedule = Arc::new(FeeScheduleRegistry::new());
    for (fee_type, value) in [(FeeType::Streetlight, 10), (FeeType::Garbage, 30)] {
        schedule.append_rate(
            FeeRate {
                fee_type,
                variant: RateVariant::Standard,
                value: Money::from_major(value),
                effective_month: "2025-01".parse()?,
            },
            &mut events,
        )?;
    }

    let store = MemoryLedgerStore::shared();
    let directory = StaticDirectory::new().shared();
    let engine = PaymentEngine::new(store.clone(), schedule.clone(), directory.clone());
    let coordinator = BatchPaymentCoordinator::new(engine);
    let household = Uuid::new_v4();

    // pay two months of streetlight and one of garbage in one gesture
    let outcomes = coordinator.pay_across_fee_types(
        household,
        vec![
            FeeTypeBatch {
                fee_type: FeeType::Streetlight,
                months: vec!["2025-01".parse()?, "2025-02".parse()?],
                amount: Money::from_major(20),
                method: PaymentMethod::Cash,
                reference: Some("OR-0002".to_string()),
            },
            FeeTypeBatch {
                fee_type: FeeType::Garbage,
                months: vec!["2025-01".parse()?],
                amount: Money::from_major(30),
                method: PaymentMethod::Cash,
                reference: Some("OR-0002".to_string()),
            },
        ],
        Some("treasurer".to_string()),
        &time,
        &mut events,
    );
    for outcome in &outcomes {
        match &outcome.outcome {
            Ok(report) => println!(
                "{}: applied {:?}",
                outcome.fee_type,
                report.applied_months()
            ),
            Err(e) => println!("{}: rejected ({e})", outcome.fee_type),
        }
    }

    // skipping march is rejected before anything commits
    let skipped = coordinator.pay_months(
        household,
        FeeType::Streetlight,
        &["2025-04".parse()?],
        Money::from_major(10),
        PaymentMethod::Cash,
        None,
        None,
        &time,
        &mut events,
    );
    println!("paying april early: {skipped:?}");

    let aggregator = StatisticsAggregator::new(store.clone(), schedule, directory);
    let summary = aggregator.summarize(FeeType::Streetlight, Period::Year(2025), &[household])?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    // administrative reset returns every month to implicit unpaid
    let resetter = LedgerResetter::new(store);
    let deleted = resetter.reset_household(household, FeeType::Streetlight, &time, &mut events)?;
    println!("reset deleted {deleted} entries");

    Ok(())
}
