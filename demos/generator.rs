//! This example generates an invocation CSV that seeds a ledger with a number
//! of users (supplied as a command-line argument), one sell order per user and
//! a settlement for every second order, then queries the results.
//!
//! The CSV file can then be replayed with the `energy-ledger` binary.
//!
//! Example (100 users):
//! ```bash
//! cargo run --example generator 100 > data/100_users.csv
//! cargo run -- data/100_users.csv
//! ```
//! ### Expected state
//! For user i (1-based):
//! - order `ord{i}` sells `BASE_KWH · i` kWh at `BASE_PRICE` per kWh, starting
//!   `i` slots after `START`
//! - if i is even, transaction `tx{i}` has user i buying `ord{i-1}` from user i-1
//!
//! So `get_all_orders` lists N orders in user order and `get_all_transactions`
//! lists ⌊N/2⌋ transactions. No order is marked sold: settlement does not
//! touch the order.

use csv::Writer;
use energy_ledger::{Invocation, Order, Quantity, Transaction, User};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::{env, error::Error};

const BASE_KWH: Decimal = dec!(2.5);
const BASE_PRICE: Decimal = dec!(0.21);
const START: i64 = 1_700_000_000;
const SLOT_SECONDS: i64 = 3600;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: cargo run --example generator <num_users>");
        std::process::exit(1);
    }

    let num_users: u32 = match args[1].parse() {
        Ok(n) if n > 0 => n,
        _ => {
            eprintln!("Error: <num_users> must be a positive integer.");
            std::process::exit(1);
        }
    };

    let mut wtr = Writer::from_writer(std::io::stdout());
    let mut emit = |function: &str, id: String, payload: String| {
        wtr.serialize(Invocation {
            function: function.to_owned(),
            id,
            payload,
        })
    };

    emit("reset_indexes", String::new(), String::new())?;

    for i in 1..=num_users {
        let user = User {
            user_id: format!("u{i}"),
            salt: format!("salt{i}"),
            hash: format!("hash{i}"),
            first_name: format!("User{i}"),
            last_name: "Prosumer".into(),
            things: vec![format!("ord{i}")],
            email_address: format!("u{i}@example.com"),
            ..User::default()
        };
        emit("add_user", user.user_id.clone(), serde_json::to_string(&user)?)?;
    }

    for i in 1..=num_users {
        let order = Order {
            id: format!("ord{i}"),
            kwh_amount: Quantity::from(BASE_KWH * Decimal::from(i)),
            price_kwh: Quantity::from(BASE_PRICE),
            time_start: START + i64::from(i) * SLOT_SECONDS,
            duration: SLOT_SECONDS,
            seller_id: format!("u{i}"),
            sold_bool: false,
        };
        emit("add_order", order.id.clone(), serde_json::to_string(&order)?)?;
    }

    for i in (2..=num_users).step_by(2) {
        let transaction = Transaction {
            id: format!("tx{i}"),
            order_id: format!("ord{}", i - 1),
            seller_id: format!("u{}", i - 1),
            buyer_id: format!("u{i}"),
        };
        emit(
            "add_transaction",
            transaction.id.clone(),
            serde_json::to_string(&transaction)?,
        )?;
    }

    emit("get_all_orders", String::new(), String::new())?;
    emit("get_all_transactions", String::new(), String::new())?;
    emit("authenticate", "u1".into(), "password".into())?;

    wtr.flush()?;
    Ok(())
}
