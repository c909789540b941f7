/// effective-dated rate changes - the new rate applies from its effective
/// month, earlier months keep the old charge
use std::sync::Arc;

use fee_ledger_rs::{
    EventStore, FeeRate, FeeScheduleRegistry, FeeType, Money, RateVariant,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut events = EventStore::new();
    let schedule = Arc::new(FeeScheduleRegistry::new());

    // 10 pesos from january, raised to 15 effective june
    for (value, effective) in [(10, "2025-01"), (15, "2025-06")] {
        schedule.append_rate(
            FeeRate {
                fee_type: FeeType::Streetlight,
                variant: RateVariant::Standard,
                value: Money::from_major(value),
                effective_month: effective.parse()?,
            },
            &mut events,
        )?;
    }

    // business households pay a variant rate once one exists, falling back
    // to the standard rate before that
    schedule.append_rate(
        FeeRate {
            fee_type: FeeType::Streetlight,
            variant: RateVariant::Business,
            value: Money::from_major(25),
            effective_month: "2025-06".parse()?,
        },
        &mut events,
    )?;

    for month in ["2025-05", "2025-06"] {
        let standard =
            schedule.resolve_charge(FeeType::Streetlight, month.parse()?, RateVariant::Standard)?;
        let business =
            schedule.resolve_charge(FeeType::Streetlight, month.parse()?, RateVariant::Business)?;
        println!("{month}: standard {standard}, business {business}");
    }

    println!(
        "chargeable since: {:?}",
        schedule.effective_since(FeeType::Streetlight, RateVariant::Business)
    );

    Ok(())
}
